//! Storage Layer - in-memory resource store
//!
//! The item collection lives in process memory only:
//! - items kept in insertion order
//! - ids allocated from a clock-seeded counter
//! - one read/write lock around both

pub mod memory;

pub use memory::ItemStore;
