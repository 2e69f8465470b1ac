use crate::error::Result;
use crate::model::{Link, Page, PageId, PageRef};
use std::collections::HashMap;

/// Persisted page and link records.
///
/// Every method is its own unit of work; the two writers are atomic.
pub trait GraphStore {
    fn get_page(&self, page: &PageRef) -> Result<Option<Page>>;

    /// Pages in `ids` plus the links whose endpoints are both in `ids`.
    fn get_subgraph(&self, ids: &[PageId]) -> Result<(Vec<Page>, Vec<Link>)>;

    /// Every page and every link, including links to pages not crawled yet.
    fn load_graph(&self) -> Result<(Vec<Page>, Vec<Link>)>;

    /// The first `limit` link targets of `source`, in the order they were stored.
    fn outgoing_targets(&self, source: PageId, limit: usize) -> Result<Vec<PageId>>;

    /// Replace the page row and its whole outgoing link set.
    fn upsert_page_with_links(&self, page: &Page, links: &[Link]) -> Result<()>;

    fn update_scores(&self, scores: &HashMap<PageId, f64>) -> Result<()>;
}
