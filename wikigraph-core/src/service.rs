//! Entry points used by the CLI. Each call is one unit of work against the store.

use crate::crawl::{CrawlPolicy, CrawlProgressCallback, CrawlScheduler};
use crate::error::{GraphError, Result};
use crate::model::{Link, Page, PageId, PageRef};
use crate::paths::{PathFinder, PathOutcome};
use crate::rank::{PageRankConfig, rank_store};
use crate::store::GraphStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;
use wikigraph_scanner::WikiSource;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TitleEdge {
    pub source: String,
    pub target: String,
}

/// The crawled neighborhood of a seed, by title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<String>,
    pub links: Vec<TitleEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPage {
    pub page_id: PageId,
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRankSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub iterations: usize,
    pub converged: bool,
    pub diff_l1: f64,
    pub score_total: f64,
    pub top_pages: Vec<RankedPage>,
    pub scores: BTreeMap<PageId, f64>,
}

pub struct GraphService<'a, S, G> {
    source: &'a S,
    store: &'a G,
    policy: CrawlPolicy,
    progress_callback: Option<CrawlProgressCallback>,
}

impl<'a, S: WikiSource, G: GraphStore> GraphService<'a, S, G> {
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

    fn scheduler(&self) -> CrawlScheduler<'a, S, G> {
        let scheduler = CrawlScheduler::new(self.source, self.store).with_policy(self.policy.clone());
        match &self.progress_callback {
            Some(callback) => scheduler.with_progress_callback(callback.clone()),
            None => scheduler,
        }
    }

    /// Store lookup only, never crawls.
    pub fn get_page_by_id(&self, page_id: PageId) -> Result<Option<Page>> {
        self.store.get_page(&PageRef::Id(page_id))
    }

    pub async fn get_or_crawl_page_by_title(&self, title: &str) -> Result<Option<Page>> {
        let page = PageRef::title(title);
        if let Some(existing) = self.store.get_page(&page)? {
            return Ok(Some(existing));
        }

        match self.scheduler().crawl_page(&page).await {
            Ok(crawled) => Ok(Some(crawled)),
            Err(GraphError::Scan(e)) => {
                warn!("Could not crawl {}: {}", page, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Crawl out to `depth` hops from `seed_title` and return the induced
    /// subgraph. `None` when not even the seed could be crawled.
    pub async fn build_graph(&self, seed_title: &str, depth: usize) -> Result<Option<GraphView>> {
        let ids: Vec<PageId> = self
            .scheduler()
            .ensure_reachable(seed_title, depth, self.policy.max_neighbors)
            .await?
            .into_iter()
            .collect();
        if ids.is_empty() {
            return Ok(None);
        }

        let (pages, links) = self.store.get_subgraph(&ids)?;
        Ok(Some(graph_view(&pages, &links)))
    }

    pub fn calculate_pagerank(&self, config: PageRankConfig, top: usize) -> Result<PageRankSummary> {
        summarize_pagerank(self.store, config, top)
    }

    pub fn find_paths(&self, source: PageId, target: PageId, max_depth: usize) -> Result<PathOutcome> {
        PathFinder::new(self.store).find_paths(source, target, max_depth)
    }
}

/// Rank every stored page, persist the scores and report the `top` pages.
///
/// Needs only the store, so offline callers can use it without a source.
pub fn summarize_pagerank<G: GraphStore>(store: &G, config: PageRankConfig, top: usize) -> Result<PageRankSummary> {
    let (run, edge_count) = rank_store(store, config)?;

    let mut ranked: Vec<(PageId, f64)> = run.scores.iter().map(|(&id, &s)| (id, s)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(top);

    let top_ids: Vec<PageId> = ranked.iter().map(|(id, _)| *id).collect();
    let (pages, _) = store.get_subgraph(&top_ids)?;
    let titles: HashMap<PageId, String> = pages.into_iter().map(|p| (p.page_id, p.title)).collect();

    let top_pages = ranked
        .into_iter()
        .map(|(page_id, score)| RankedPage {
            page_id,
            title: titles.get(&page_id).cloned().unwrap_or_default(),
            score,
        })
        .collect();

    Ok(PageRankSummary {
        node_count: run.scores.len(),
        edge_count,
        iterations: run.iterations,
        converged: run.converged,
        diff_l1: run.diff_l1,
        score_total: run.scores.values().sum(),
        top_pages,
        scores: run.scores.into_iter().collect(),
    })
}

/// Title pairs for every link of the subgraph, first occurrence wins.
pub fn graph_view(pages: &[Page], links: &[Link]) -> GraphView {
    let titles: HashMap<PageId, &str> = pages.iter().map(|p| (p.page_id, p.title.as_str())).collect();

    let mut seen = HashSet::new();
    let edges = links
        .iter()
        .filter_map(|link| {
            let source = titles.get(&link.source_page_id)?;
            let target = titles.get(&link.target_page_id)?;
            Some(TitleEdge {
                source: source.to_string(),
                target: target.to_string(),
            })
        })
        .filter(|edge| seen.insert(edge.clone()))
        .collect();

    GraphView {
        nodes: pages.iter().map(|p| p.title.clone()).collect(),
        links: edges,
    }
}
