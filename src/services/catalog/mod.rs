//! Remote show catalog abstraction
//!
//! The orchestration services only see this trait, so the concrete catalog
//! (TVMaze today) can be swapped or mocked. Every failure (transport, timeout,
//! non-2xx, malformed payload) surfaces as an `Err`; callers decide whether to
//! fall back to the local cache.

use crate::{
    error::AppResult,
    models::{Show, ShowId, ShowSearchResult},
};

pub mod tvmaze;

pub use tvmaze::TvMazeClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Free-text search, returning scored hits in catalog order
    async fn search(&self, query: &str) -> AppResult<Vec<ShowSearchResult>>;

    /// Single show by catalog id; unknown ids are `NotFound`
    async fn fetch_by_id(&self, show_id: ShowId) -> AppResult<Show>;

    /// One page of the full catalog index, starting at page 0
    async fn list_page(&self, page: u32) -> AppResult<Vec<Show>>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}
