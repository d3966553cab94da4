//! Remote question store.
//!
//! Every read and write of question state goes through a `RemoteStore`.
//! The controller only sees this trait; `http::HttpStore` talks to the real
//! service and `memory::InMemoryStore` backs demos and tests.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::{PageQuery, SortField, SortOrder};
use crate::types::{Fragment, ProgressStats, QuestionId, Record, RecordPatch, ViewKey};

pub use http::HttpStore;
pub use memory::InMemoryStore;

/// Read request as sent to the store.
///
/// The sort is only present when the store is responsible for it; locally
/// sorted fields are read unsorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub view_key: ViewKey,
    pub page: u32,
    pub page_size: u32,
    pub sort: Option<(SortField, SortOrder)>,
    pub search_text: Option<String>,
    pub tag_filter: Option<String>,
    pub unsolved_only: bool,
}

impl From<&PageQuery> for PageRequest {
    fn from(query: &PageQuery) -> Self {
        Self {
            view_key: query.view_key.clone(),
            page: query.page,
            page_size: query.page_size,
            sort: query
                .sort
                .filter(|field| field.is_delegated())
                .map(|field| (field, query.order)),
            search_text: query.search_text.clone(),
            tag_filter: query.tag_filter.clone(),
            unsolved_only: query.unsolved_only,
        }
    }
}

/// One page of rows plus the total row count across all pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub rows: Vec<Record>,
    pub total_count: u64,
}

/// Common interface for question stores
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Read one page of a company/bucket list
    async fn read_page(&self, request: &PageRequest) -> Result<PageResult>;

    /// Update one record. The store may touch other records too (e.g. other
    /// instances of the same question) and reports every record it changed.
    async fn write_record(&self, id: QuestionId, patch: &RecordPatch) -> Result<Vec<Fragment>>;

    /// Apply the same update to several records in one request
    async fn write_batch(&self, ids: &[QuestionId], patch: &RecordPatch)
    -> Result<Vec<Fragment>>;

    /// Overall solved counts
    async fn read_stats(&self) -> Result<ProgressStats>;
}
