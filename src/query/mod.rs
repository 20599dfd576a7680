pub mod engine;

pub use engine::{ListParams, ListQuery, Page, QueryEngine, DEFAULT_LIMIT, DEFAULT_PAGE};
