//! Query engine implementation
//!
//! Turns a store snapshot and a `ListQuery` into one page of results:
//! 1. snapshot the collection
//! 2. keep items whose category matches exactly
//! 3. stable sort on the requested field's text
//! 4. count, then slice the `[(page-1)*limit, page*limit)` window

use std::cmp::Reverse;
use serde::Deserialize;
use crate::{Error, Result};
use crate::item::{Item, SortDirection, SortSpec};
use crate::store::ItemStore;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 10;

/// Raw listing parameters, straight from the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// A validated listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub sort: Option<SortSpec>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            category: None,
            sort: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Validate raw parameters.
    ///
    /// Empty `category`/`sort` values mean "not given". `page` and `limit`
    /// must be positive integers; anything else is a caller error.
    pub fn from_params(params: ListParams) -> Result<Self> {
        let category = params.category.filter(|c| !c.is_empty());
        let sort = params
            .sort
            .filter(|s| !s.is_empty())
            .map(|s| SortSpec::parse(&s));

        let page = parse_positive("page", params.page.as_deref(), DEFAULT_PAGE)?;
        let limit = parse_positive("limit", params.limit.as_deref(), DEFAULT_LIMIT)?;

        Ok(Self {
            category,
            sort,
            page,
            limit,
        })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_page(mut self, page: usize, limit: usize) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Filter, sort and paginate a snapshot
    pub fn apply(&self, mut items: Vec<Item>) -> Page {
        if let Some(category) = &self.category {
            items.retain(|item| item.category.as_deref() == Some(category.as_str()));
        }

        if let Some(sort) = &self.sort {
            // sort_by_cached_key is stable, so equal keys keep insertion order
            // in both directions.
            match sort.direction {
                SortDirection::Asc => items.sort_by_cached_key(|item| sort.key(item)),
                SortDirection::Desc => items.sort_by_cached_key(|item| Reverse(sort.key(item))),
            }
        }

        let total_count = items.len();
        let limit = self.limit.max(1);
        let start = self.page.saturating_sub(1).saturating_mul(limit);

        let page_items: Vec<Item> = items.into_iter().skip(start).take(limit).collect();

        Page {
            items: page_items,
            total_count,
            current_page: self.page,
            total_pages: total_count.div_ceil(limit),
        }
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: usize) -> Result<usize> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(Error::Validation(format!(
            "\"{}\" must be a positive integer, got {:?}",
            name, raw
        ))),
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Matching items across all pages
    pub total_count: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

/// Query engine over an item store
pub struct QueryEngine<'a> {
    store: &'a ItemStore,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a ItemStore) -> Self {
        Self { store }
    }

    /// Run a listing query against a fresh snapshot
    pub fn list(&self, query: &ListQuery) -> Result<Page> {
        let snapshot = self.store.list_all()?;
        let page = query.apply(snapshot);

        tracing::debug!(
            "Listed page {}/{} ({} of {} items)",
            page.current_page,
            page.total_pages,
            page.items.len(),
            page.total_count
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{NewItem, SortField};

    fn names(page: &Page) -> Vec<&str> {
        page.items.iter().map(|i| i.name.as_str()).collect()
    }

    fn widget_store() -> ItemStore {
        let store = ItemStore::new();
        store.create(NewItem::new("Widget A").with_category("tools")).unwrap();
        store.create(NewItem::new("Widget B").with_category("parts")).unwrap();
        store.create(NewItem::new("Widget C").with_category("tools")).unwrap();
        store
    }

    #[test]
    fn test_category_pages() {
        let store = widget_store();
        let engine = QueryEngine::new(&store);

        let first = engine
            .list(&ListQuery::default().with_category("tools").with_page(1, 1))
            .unwrap();
        assert_eq!(names(&first), vec!["Widget A"]);
        assert_eq!(first.total_count, 2);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.current_page, 1);

        let second = engine
            .list(&ListQuery::default().with_category("tools").with_page(2, 1))
            .unwrap();
        assert_eq!(names(&second), vec!["Widget C"]);
    }

    #[test]
    fn test_defaults_return_everything_in_insertion_order() {
        let store = widget_store();
        let page = QueryEngine::new(&store).list(&ListQuery::default()).unwrap();

        assert_eq!(names(&page), vec!["Widget A", "Widget B", "Widget C"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_category_is_exact_and_case_sensitive() {
        let store = widget_store();
        store.create(NewItem::new("Widget D")).unwrap();
        store.create(NewItem::new("Widget E").with_category("Tools")).unwrap();

        let page = QueryEngine::new(&store)
            .list(&ListQuery::default().with_category("tools"))
            .unwrap();
        assert_eq!(names(&page), vec!["Widget A", "Widget C"]);
    }

    #[test]
    fn test_filter_keeps_relative_sorted_order() {
        let store = ItemStore::new();
        for (name, category) in [("delta", "x"), ("alpha", "y"), ("charlie", "x"), ("bravo", "x")] {
            store.create(NewItem::new(name).with_category(category)).unwrap();
        }
        let sort = SortSpec::new(SortField::Name, SortDirection::Asc);
        let engine = QueryEngine::new(&store);

        let all = engine.list(&ListQuery::default().with_sort(sort)).unwrap();
        let filtered = engine
            .list(&ListQuery::default().with_sort(sort).with_category("x"))
            .unwrap();

        let expected: Vec<_> = all
            .items
            .iter()
            .filter(|i| i.category.as_deref() == Some("x"))
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(names(&filtered), expected);
        assert_eq!(names(&filtered), vec!["bravo", "charlie", "delta"]);
    }

    #[test]
    fn test_sort_descending() {
        let store = widget_store();
        let page = QueryEngine::new(&store)
            .list(&ListQuery::default().with_sort(SortSpec::parse("name:desc")))
            .unwrap();
        assert_eq!(names(&page), vec!["Widget C", "Widget B", "Widget A"]);
    }

    #[test]
    fn test_sort_is_lexicographic_on_text() {
        let store = ItemStore::new();
        store.create(NewItem::new("nine").with_price(9.0)).unwrap();
        store.create(NewItem::new("ten").with_price(10.0)).unwrap();
        store.create(NewItem::new("free")).unwrap();

        let page = QueryEngine::new(&store)
            .list(&ListQuery::default().with_sort(SortSpec::parse("price:asc")))
            .unwrap();
        // "" < "10" < "9"
        assert_eq!(names(&page), vec!["free", "ten", "nine"]);
    }

    #[test]
    fn test_sort_ties_keep_insertion_order() {
        let store = ItemStore::new();
        store.create(NewItem::new("first").with_category("same")).unwrap();
        store.create(NewItem::new("second").with_category("same")).unwrap();
        store.create(NewItem::new("third").with_category("other")).unwrap();

        let engine = QueryEngine::new(&store);
        let asc = engine
            .list(&ListQuery::default().with_sort(SortSpec::parse("category")))
            .unwrap();
        assert_eq!(names(&asc), vec!["third", "first", "second"]);

        let desc = engine
            .list(&ListQuery::default().with_sort(SortSpec::parse("category:desc")))
            .unwrap();
        assert_eq!(names(&desc), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unknown_sort_field_keeps_order() {
        let store = widget_store();
        let page = QueryEngine::new(&store)
            .list(&ListQuery::default().with_sort(SortSpec::parse("colour:desc")))
            .unwrap();
        assert_eq!(names(&page), vec!["Widget A", "Widget B", "Widget C"]);
    }

    #[test]
    fn test_pages_cover_the_set_exactly_once() {
        let store = ItemStore::new();
        for i in 0..23 {
            store.create(NewItem::new(format!("Item {:02}", 22 - i))).unwrap();
        }
        let engine = QueryEngine::new(&store);
        let sort = SortSpec::new(SortField::Name, SortDirection::Asc);
        let full = engine
            .list(&ListQuery::default().with_sort(sort).with_page(1, 100))
            .unwrap();

        for limit in [1, 4, 5, 10, 23, 50] {
            let total_pages = 23usize.div_ceil(limit);
            let mut collected = Vec::new();

            for page in 1..=total_pages {
                let result = engine
                    .list(&ListQuery::default().with_sort(sort).with_page(page, limit))
                    .unwrap();
                assert_eq!(result.total_count, 23);
                assert_eq!(result.total_pages, total_pages);
                collected.extend(result.items);
            }
            assert_eq!(collected, full.items, "limit {}", limit);

            let past_end = engine
                .list(&ListQuery::default().with_sort(sort).with_page(total_pages + 1, limit))
                .unwrap();
            assert!(past_end.items.is_empty());
        }
    }

    #[test]
    fn test_empty_collection() {
        let store = ItemStore::new();
        let page = QueryEngine::new(&store).list(&ListQuery::default()).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_from_params_defaults() {
        let query = ListQuery::from_params(ListParams::default()).unwrap();
        assert_eq!(query, ListQuery::default());

        let query = ListQuery::from_params(ListParams {
            category: Some(String::new()),
            sort: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(query.category, None);
        assert_eq!(query.sort, None);
    }

    #[test]
    fn test_from_params_parses_values() {
        let query = ListQuery::from_params(ListParams {
            category: Some("tools".into()),
            sort: Some("createdAt:desc".into()),
            page: Some("3".into()),
            limit: Some("25".into()),
        })
        .unwrap();

        assert_eq!(query.category.as_deref(), Some("tools"));
        assert_eq!(query.sort, Some(SortSpec::new(SortField::CreatedAt, SortDirection::Desc)));
        assert_eq!(query.page, 3);
        assert_eq!(query.limit, 25);
    }

    #[test]
    fn test_from_params_rejects_bad_page_and_limit() {
        for bad in ["0", "-1", "ten", "1.5", ""] {
            let limit = ListQuery::from_params(ListParams {
                limit: Some(bad.into()),
                ..Default::default()
            });
            assert!(matches!(limit, Err(Error::Validation(_))), "limit {:?}", bad);

            let page = ListQuery::from_params(ListParams {
                page: Some(bad.into()),
                ..Default::default()
            });
            assert!(matches!(page, Err(Error::Validation(_))), "page {:?}", bad);
        }
    }
}
