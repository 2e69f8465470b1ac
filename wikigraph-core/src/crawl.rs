use crate::error::{GraphError, Result};
use crate::model::{Link, Page, PageId, PageRef};
use crate::store::GraphStore;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wikigraph_scanner::{TitleResolver, WikiSource};

pub const DEFAULT_MAX_NEIGHBORS: usize = 50;

/// Callback for reporting crawl progress, one line per processed node
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Returns true for titles the crawler must not expand
pub type TitleFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Bare four-digit titles ("1998") are year hubs linked from almost everything.
pub fn is_year_title(title: &str) -> bool {
    title.len() == 4 && title.bytes().all(|b| b.is_ascii_digit())
}

/// Options for configuring a crawl operation
#[derive(Clone)]
pub struct CrawlPolicy {
    pub max_neighbors: usize,
    pub exclude: TitleFilter,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            max_neighbors: DEFAULT_MAX_NEIGHBORS,
            exclude: Arc::new(is_year_title),
        }
    }
}

impl fmt::Debug for CrawlPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlPolicy")
            .field("max_neighbors", &self.max_neighbors)
            .finish_non_exhaustive()
    }
}

impl CrawlPolicy {
    pub fn allow_all() -> Self {
        Self {
            exclude: Arc::new(|_: &str| false),
            ..Self::default()
        }
    }

    pub fn with_max_neighbors(mut self, max_neighbors: usize) -> Self {
        self.max_neighbors = max_neighbors;
        self
    }

    pub fn with_exclusion(mut self, exclude: TitleFilter) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn is_excluded(&self, title: &str) -> bool {
        (self.exclude)(title)
    }
}

/// FIFO of `(title, depth)` that accepts each title at most once per run.
#[derive(Debug, Default)]
pub struct Worklist {
    queue: VecDeque<(String, usize)>,
    enqueued: HashSet<String>,
}

impl Worklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the title was already enqueued in this run.
    pub fn push(&mut self, title: String, depth: usize) -> bool {
        if !self.enqueued.insert(title.clone()) {
            return false;
        }
        self.queue.push_back((title, depth));
        true
    }

    pub fn pop(&mut self) -> Option<(String, usize)> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Titles accepted so far, including ones already popped.
    pub fn enqueued_count(&self) -> usize {
        self.enqueued.len()
    }
}

/// Lazily fills the graph store by breadth-first crawling from a seed title.
pub struct CrawlScheduler<'a, S, G> {
    source: &'a S,
    store: &'a G,
    policy: CrawlPolicy,
    progress_callback: Option<CrawlProgressCallback>,
}

impl<'a, S: WikiSource, G: GraphStore> CrawlScheduler<'a, S, G> {
    pub fn new(source: &'a S, store: &'a G) -> Self {
        Self {
            source,
            store,
            policy: CrawlPolicy::default(),
            progress_callback: None,
        }
    }

    pub fn with_policy(mut self, policy: CrawlPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress_callback(mut self, callback: CrawlProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn policy(&self) -> &CrawlPolicy {
        &self.policy
    }

    fn report(&self, msg: String) {
        if let Some(ref callback) = self.progress_callback {
            callback(msg);
        }
    }

    /// Fetch one page, resolve its outbound titles and persist page and links in
    /// one transaction.
    pub async fn crawl_page(&self, page: &PageRef) -> Result<Page> {
        let fetched = self.source.fetch_page(page).await?;

        let resolved = TitleResolver::new(self.source)
            .resolve_batch(&fetched.target_titles())
            .await;

        let links: Vec<Link> = fetched
            .links
            .iter()
            .filter_map(|raw| {
                resolved.get(&raw.title).map(|target| Link {
                    source_page_id: fetched.page_id,
                    target_page_id: target.page_id,
                    anchor_text: (!raw.anchor.is_empty()).then(|| raw.anchor.clone()),
                })
            })
            .collect();

        debug!(
            "'{}': {} of {} raw links resolved",
            fetched.title,
            links.len(),
            fetched.links.len()
        );

        let node = Page::from_fetched(&fetched, links.len());
        self.store.upsert_page_with_links(&node, &links)?;

        let saved = self.store.get_page(&PageRef::Id(node.page_id))?;
        Ok(saved.unwrap_or(node))
    }

    /// Stored page, or a fresh crawl of it. Fetch failures are logged and yield
    /// `None`; store failures propagate.
    async fn lookup_or_crawl(&self, page: &PageRef) -> Result<Option<Page>> {
        if let Some(existing) = self.store.get_page(page)? {
            return Ok(Some(existing));
        }

        match self.crawl_page(page).await {
            Ok(crawled) => Ok(Some(crawled)),
            Err(GraphError::Scan(e)) => {
                warn!("Failed to crawl {}: {}", page, e);
                self.report(format!("[!]  Failed to crawl {}: {}", page, e));
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Make sure every page within `max_depth` hops of `seed_title` is stored,
    /// expanding at most `max_neighbors` links per page, and return their ids.
    pub async fn ensure_reachable(
        &self,
        seed_title: &str,
        max_depth: usize,
        max_neighbors: usize,
    ) -> Result<BTreeSet<PageId>> {
        info!(
            "Starting crawl from '{}' (max depth: {}, max neighbors/page: {})",
            seed_title, max_depth, max_neighbors
        );

        let mut worklist = Worklist::new();
        let mut visited_titles: HashSet<String> = HashSet::new();
        let mut visited_ids: BTreeSet<PageId> = BTreeSet::new();
        // fetch failures are not retried within a run
        let mut failed: HashSet<PageRef> = HashSet::new();

        worklist.push(seed_title.to_string(), 0);

        while let Some((title, depth)) = worklist.pop() {
            if depth > max_depth || visited_titles.contains(&title) {
                continue;
            }
            if self.policy.is_excluded(&title) {
                debug!("Excluded '{}'", title);
                continue;
            }
            visited_titles.insert(title.clone());

            let seed_ref = PageRef::Title(title.clone());
            let Some(page) = self.lookup_or_crawl(&seed_ref).await? else {
                failed.insert(seed_ref);
                continue;
            };
            visited_titles.insert(page.title.clone());
            visited_ids.insert(page.page_id);
            self.report(format!(
                "[depth {}] {} (ID: {}) - {} queued",
                depth,
                page.title,
                page.page_id,
                worklist.len()
            ));

            if depth >= max_depth {
                continue;
            }

            for target_id in self.store.outgoing_targets(page.page_id, max_neighbors)? {
                let target_ref = PageRef::Id(target_id);
                if failed.contains(&target_ref) {
                    continue;
                }
                let Some(target) = self.lookup_or_crawl(&target_ref).await? else {
                    failed.insert(target_ref);
                    continue;
                };
                if !visited_titles.contains(&target.title) {
                    worklist.push(target.title, depth + 1);
                }
            }
        }

        info!(
            "Crawl complete: {} pages reachable from '{}'",
            visited_ids.len(),
            seed_title
        );
        Ok(visited_ids)
    }
}
