//! Item types - the single managed resource
//!
//! - `Item`: the stored record, serialized with camelCase keys
//! - `ItemInput`: raw JSON payload as it arrives from a client
//! - `NewItem` / `ItemPatch`: validated payloads for create and update
//! - `SortField` / `SortSpec`: the enumerated set of sortable fields

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// Item identifier. Clock-seeded and strictly increasing within a process.
pub type ItemId = u64;

/// A stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier, assigned on creation
    pub id: ItemId,
    /// Display name (3-50 characters)
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Exact-match filter key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a record from a validated payload
    pub fn new(id: ItemId, payload: NewItem, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category: payload.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the fields present in `patch`, keep the rest
    pub fn apply(&mut self, patch: ItemPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        self.updated_at = now;
    }

    /// Textual form of a field, as used for sorting.
    ///
    /// Missing optional fields read as the empty string.
    pub fn field_text(&self, field: SortField) -> String {
        match field {
            SortField::Id => self.id.to_string(),
            SortField::Name => self.name.clone(),
            SortField::Description => self.description.clone().unwrap_or_default(),
            SortField::Price => self.price.map(|p| p.to_string()).unwrap_or_default(),
            SortField::Category => self.category.clone().unwrap_or_default(),
            SortField::CreatedAt => timestamp_text(&self.created_at),
            SortField::UpdatedAt => timestamp_text(&self.updated_at),
        }
    }
}

// Fixed precision keeps lexicographic order equal to chronological order.
fn timestamp_text(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Raw item payload, before validation.
///
/// Create and update share this shape. Unknown keys are rejected, and so is
/// an explicit `null`: a key is either absent or carries a value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemInput {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<String>,
}

// Only called for keys that appear in the payload; absent keys fall back
// to `default`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Validated payload for creating an item
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            price: None,
            category: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Validated partial update. `None` leaves the stored field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
}

/// Fields a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Name,
    Description,
    Price,
    Category,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Get the wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Description => "description",
            SortField::Price => "price",
            SortField::Category => "category",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Get all sortable fields
    pub fn all() -> &'static [SortField] {
        &[
            SortField::Id,
            SortField::Name,
            SortField::Description,
            SortField::Price,
            SortField::Category,
            SortField::CreatedAt,
            SortField::UpdatedAt,
        ]
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "description" => Ok(SortField::Description),
            "price" => Ok(SortField::Price),
            "category" => Ok(SortField::Category),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            "updatedAt" | "updated_at" => Ok(SortField::UpdatedAt),
            _ => Err(Error::Validation(format!("Unknown sort field: {}", s))),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Parsed `field:direction` sort parameter.
///
/// `field` is `None` when the name is not a sortable field; such a sort
/// compares every item as the empty string and keeps the input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// Parse `field:direction`. Anything but a literal `desc` sorts ascending.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(':');
        let field = parts.next().unwrap_or("");
        let direction = match parts.next() {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        };

        let field = match field.parse::<SortField>() {
            Ok(field) => Some(field),
            Err(_) => {
                tracing::debug!("Ignoring unknown sort field {:?}", field);
                None
            }
        };

        Self { field, direction }
    }

    /// Sort key for one item
    pub fn key(&self, item: &Item) -> String {
        self.field.map(|f| item.field_text(f)).unwrap_or_default()
    }
}
