use serde::{Deserialize, Serialize};
use wikigraph_scanner::FetchedPage;

pub use wikigraph_scanner::{PageId, PageRef};

/// A crawled encyclopedia page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_id: PageId,
    pub title: String,
    pub url: String,
    pub length_chars: i64,
    pub num_editors: i64,
    pub num_revisions: i64,
    pub links_out_count: i64,
    /// Derived from the link table on read; ignored on write.
    pub links_in_count: i64,
    /// Written only by the rank engine; ignored on upsert.
    pub pagerank_score: f64,
    /// Unix seconds of the last upsert.
    pub last_crawled: i64,
}

impl Page {
    pub fn new(page_id: PageId, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            page_id,
            title: title.into(),
            url: url.into(),
            length_chars: 0,
            num_editors: 0,
            num_revisions: 0,
            links_out_count: 0,
            links_in_count: 0,
            pagerank_score: 0.0,
            last_crawled: 0,
        }
    }

    pub fn from_fetched(fetched: &FetchedPage, links_out_count: usize) -> Self {
        Self {
            length_chars: fetched.length_chars,
            num_editors: fetched.num_editors,
            num_revisions: fetched.num_revisions,
            links_out_count: links_out_count as i64,
            ..Self::new(fetched.page_id, fetched.title.clone(), fetched.url.clone())
        }
    }
}

/// A directed link. The target may not have been crawled yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source_page_id: PageId,
    pub target_page_id: PageId,
    pub anchor_text: Option<String>,
}

impl Link {
    pub fn new(source_page_id: PageId, target_page_id: PageId) -> Self {
        Self {
            source_page_id,
            target_page_id,
            anchor_text: None,
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor_text = Some(anchor.into());
        self
    }
}
