// In-memory encyclopedia shared by the crawl and service tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use tempfile::TempDir;
use wikigraph_core::Database;
use wikigraph_scanner::{
    FetchedPage, PageRef, PageStub, RawLink, ScanError, TitleQuery, WikiSource,
};

pub struct FakePage {
    pub page_id: i64,
    pub title: String,
    pub links: Vec<RawLink>,
}

#[derive(Default)]
pub struct FakeWiki {
    pages: Vec<FakePage>,
    broken: HashSet<String>,
    pub fetches: RefCell<Vec<PageRef>>,
}

impl FakeWiki {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page whose links carry their target title as anchor text.
    pub fn page(mut self, page_id: i64, title: &str, links: &[&str]) -> Self {
        self.pages.push(FakePage {
            page_id,
            title: title.to_string(),
            links: links
                .iter()
                .map(|t| RawLink::new(*t, t.to_lowercase()))
                .collect(),
        });
        self
    }

    pub fn page_with_links(mut self, page_id: i64, title: &str, links: Vec<RawLink>) -> Self {
        self.pages.push(FakePage {
            page_id,
            title: title.to_string(),
            links,
        });
        self
    }

    /// Titles that resolve but whose fetch fails.
    pub fn broken(mut self, title: &str) -> Self {
        self.broken.insert(title.to_string());
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    fn find(&self, page: &PageRef) -> Option<&FakePage> {
        self.pages.iter().find(|p| match page {
            PageRef::Id(id) => p.page_id == *id,
            PageRef::Title(title) => p.title == *title,
        })
    }
}

impl WikiSource for FakeWiki {
    async fn fetch_page(&self, page: &PageRef) -> wikigraph_scanner::error::Result<FetchedPage> {
        self.fetches.borrow_mut().push(page.clone());

        let found = self
            .find(page)
            .filter(|p| !self.broken.contains(&p.title))
            .ok_or_else(|| ScanError::PageMissing(page.to_string()))?;

        let mut fetched = FetchedPage::new(
            found.page_id,
            found.title.clone(),
            format!("https://pt.wikipedia.org/wiki/{}", found.title.replace(' ', "_")),
        );
        fetched.length_chars = 1000 + found.page_id;
        fetched.num_editors = 3;
        fetched.num_revisions = 10;
        fetched.links = found.links.clone();
        Ok(fetched)
    }

    async fn query_titles(&self, titles: &[String]) -> wikigraph_scanner::error::Result<TitleQuery> {
        let pages = titles
            .iter()
            .map(|t| match self.find(&PageRef::Title(t.clone())) {
                Some(p) => PageStub::found(p.page_id, p.title.clone()),
                None => PageStub::missing(t.clone()),
            })
            .collect();

        Ok(TitleQuery {
            pages,
            ..Default::default()
        })
    }
}

pub fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).unwrap();
    (temp_dir, db)
}
