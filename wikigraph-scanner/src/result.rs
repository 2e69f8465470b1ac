use serde::{Deserialize, Serialize};
use std::fmt;

pub type PageId = i64;

/// How a page is addressed when asking the source or the store for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageRef {
    Id(PageId),
    Title(String),
}

impl PageRef {
    pub fn title(title: impl Into<String>) -> Self {
        PageRef::Title(title.into())
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Id(id) => write!(f, "page #{}", id),
            PageRef::Title(title) => write!(f, "'{}'", title),
        }
    }
}

/// An outbound link as it appears in the page body, before title resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub title: String,
    pub anchor: String,
}

impl RawLink {
    pub fn new(title: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            anchor: anchor.into(),
        }
    }
}

/// Everything the source returns for a single page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub page_id: PageId,
    pub title: String,
    pub url: String,
    pub length_chars: i64,
    pub num_editors: i64,
    pub num_revisions: i64,
    pub links: Vec<RawLink>,
}

impl FetchedPage {
    pub fn new(page_id: PageId, title: String, url: String) -> Self {
        Self {
            page_id,
            title,
            url,
            length_chars: 0,
            num_editors: 0,
            num_revisions: 0,
            links: Vec::new(),
        }
    }

    pub fn target_titles(&self) -> Vec<String> {
        self.links.iter().map(|l| l.title.clone()).collect()
    }
}

/// One `from -> to` row of the normalization or redirect table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMapping {
    pub from: String,
    pub to: String,
}

impl TitleMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Page record returned by a title query. Missing and invalid titles carry no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStub {
    #[serde(rename = "pageid", default)]
    pub page_id: Option<PageId>,
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
}

impl PageStub {
    pub fn found(page_id: PageId, title: impl Into<String>) -> Self {
        Self {
            page_id: Some(page_id),
            title: title.into(),
            missing: false,
            invalid: false,
        }
    }

    pub fn missing(title: impl Into<String>) -> Self {
        Self {
            page_id: None,
            title: title.into(),
            missing: true,
            invalid: false,
        }
    }

    pub fn resolved_id(&self) -> Option<PageId> {
        if self.missing || self.invalid {
            return None;
        }
        self.page_id
    }
}

/// The `query` object of a batched title lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    pub normalized: Vec<TitleMapping>,
    #[serde(default)]
    pub redirects: Vec<TitleMapping>,
    #[serde(default)]
    pub pages: Vec<PageStub>,
}

/// Canonical identity a raw title resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTitle {
    pub page_id: PageId,
    pub title: String,
}
