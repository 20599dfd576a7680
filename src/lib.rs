//! # Itemstore - in-memory item collection over HTTP
//!
//! Itemstore provides:
//! - A single homogeneous `Item` collection with CRUD operations
//! - A lock-guarded in-memory store that hands out point-in-time snapshots
//! - A query engine for category filtering, field sorting and pagination
//! - An axum HTTP surface with validation, rate limiting and security headers

pub mod item;
pub mod validation;
pub mod store;
pub mod query;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use item::{Item, ItemId, ItemPatch, NewItem, SortDirection, SortField, SortSpec};
pub use store::ItemStore;
pub use query::{ListQuery, Page, QueryEngine};

/// Result type alias for Itemstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Itemstore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}
