//! In-memory item store

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use chrono::{DateTime, Duration, Utc};
use crate::{Result, Error};
use crate::item::{Item, ItemId, ItemPatch, NewItem};

/// Lock-guarded item collection.
///
/// Mutations hold the write lock for their whole duration, so a snapshot
/// never sees a half-applied create, update or delete.
#[derive(Debug, Default)]
pub struct ItemStore {
    inner: RwLock<Collection>,
}

#[derive(Debug, Default)]
struct Collection {
    items: Vec<Item>,
    last_id: ItemId,
}

impl Collection {
    /// Next id: the current epoch millisecond, bumped past the last id
    /// handed out.
    fn allocate_id(&mut self) -> ItemId {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        id
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

impl ItemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Item Operations ==========

    /// Append a new item and return it
    pub fn create(&self, payload: NewItem) -> Result<Item> {
        let mut collection = self.write()?;
        let id = collection.allocate_id();
        let item = Item::new(id, payload, Utc::now());
        collection.items.push(item.clone());

        tracing::debug!("Created item {} ({} total)", id, collection.items.len());
        Ok(item)
    }

    /// Get an item by id
    pub fn get(&self, id: ItemId) -> Result<Item> {
        let collection = self.read()?;
        collection
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or(Error::ItemNotFound(id))
    }

    /// Point-in-time copy of the whole collection, in insertion order
    pub fn list_all(&self) -> Result<Vec<Item>> {
        Ok(self.read()?.items.clone())
    }

    /// Merge `patch` over an existing item
    pub fn update(&self, id: ItemId, patch: ItemPatch) -> Result<Item> {
        let mut collection = self.write()?;
        let index = collection.position(id).ok_or(Error::ItemNotFound(id))?;

        let item = &mut collection.items[index];
        let stamp = next_stamp(item.updated_at);
        item.apply(patch, stamp);

        tracing::debug!("Updated item {}", id);
        Ok(item.clone())
    }

    /// Remove an item, keeping the order of the rest
    pub fn delete(&self, id: ItemId) -> Result<Item> {
        let mut collection = self.write()?;
        let index = collection.position(id).ok_or(Error::ItemNotFound(id))?;
        let removed = collection.items.remove(index);

        tracing::debug!("Deleted item {} ({} left)", id, collection.items.len());
        Ok(removed)
    }

    /// Count all items
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.items.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    // ========== Locking ==========

    fn read(&self) -> Result<RwLockReadGuard<'_, Collection>> {
        self.inner
            .read()
            .map_err(|_| Error::Internal("item store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collection>> {
        self.inner
            .write()
            .map_err(|_| Error::Internal("item store lock poisoned".to_string()))
    }
}

/// Update timestamp that is strictly after `previous`, even when the clock
/// has not moved since.
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
