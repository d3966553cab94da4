//! Page queries: which slice of which question list to read, under which
//! filter and sort.
//!
//! A `PageQuery` is an immutable value. Every UI intent produces a new query
//! through one of the `with_*` builders, which apply the page-reset rules:
//! anything that changes the row set (view, delegated sort, search, tag,
//! unsolved filter) sends the query back to page 1; moving between pages or
//! re-ordering locally keeps the page.

pub mod sort;

use serde::{Deserialize, Serialize};

use crate::types::ViewKey;

pub use sort::{SortClass, SortField, SortOrder, sort_locally};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageQuery {
    pub view_key: ViewKey,
    /// 1-based
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<SortField>,
    pub order: SortOrder,
    pub search_text: Option<String>,
    pub tag_filter: Option<String>,
    pub unsolved_only: bool,
}

impl PageQuery {
    /// First page of a view with no filter or sort
    pub fn new(view_key: ViewKey, page_size: u32) -> Self {
        Self {
            view_key,
            page: 1,
            page_size: page_size.max(1),
            sort: None,
            order: SortOrder::Asc,
            search_text: None,
            tag_filter: None,
            unsolved_only: false,
        }
    }

    /// Switch to another company/bucket, keeping filters and sort
    pub fn with_view(&self, view_key: ViewKey) -> Self {
        Self {
            view_key,
            page: 1,
            ..self.clone()
        }
    }

    /// Move to another page; nothing else changes
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Apply a column-header click.
    ///
    /// Clicking the active column flips the order; clicking another column
    /// sorts it ascending. The page resets only when the old or the new sort
    /// is handled by the remote store.
    pub fn with_sort_toggled(&self, field: SortField) -> Self {
        let order = if self.sort == Some(field) {
            self.order.reversed()
        } else {
            SortOrder::Asc
        };
        self.with_sort(Some(field), order)
    }

    /// Set sort field and order explicitly (`None` clears sorting)
    pub fn with_sort(&self, sort: Option<SortField>, order: SortOrder) -> Self {
        let touches_remote = self.sort.is_some_and(|f| f.is_delegated())
            || sort.is_some_and(|f| f.is_delegated());
        let changed = self.sort != sort || self.order != order;
        Self {
            page: if changed && touches_remote { 1 } else { self.page },
            sort,
            order,
            ..self.clone()
        }
    }

    /// Set the search text; blank text clears the search
    pub fn with_search(&self, text: &str) -> Self {
        let trimmed = text.trim();
        let search_text = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.reset_if_changed(Self {
            search_text,
            ..self.clone()
        })
    }

    /// Set the tag filter; blank clears it
    pub fn with_tag_filter(&self, tag: Option<&str>) -> Self {
        let tag_filter = tag
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self.reset_if_changed(Self {
            tag_filter,
            ..self.clone()
        })
    }

    pub fn with_unsolved_only(&self, unsolved_only: bool) -> Self {
        self.reset_if_changed(Self {
            unsolved_only,
            ..self.clone()
        })
    }

    /// Number of pages for a total row count
    pub fn total_pages(&self, total_count: u64) -> u32 {
        let size = u64::from(self.page_size.max(1));
        u32::try_from(total_count.div_ceil(size)).unwrap_or(u32::MAX)
    }

    fn reset_if_changed(&self, next: Self) -> Self {
        if next == *self {
            next
        } else {
            Self { page: 1, ..next }
        }
    }
}
