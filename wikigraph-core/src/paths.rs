//! Path queries between two stored pages.
//!
//! Two strategies are offered: a plain BFS shortest path, and a "logical" path
//! that biases a BFS toward high-PageRank neighbors. The logical search keeps a
//! single visited set across the whole search, so each node is expanded at most
//! once and the result is a heuristic, not the maximum-score path.

use crate::error::Result;
use crate::model::{Link, Page, PageId};
use crate::store::GraphStore;
use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    pub page_id: PageId,
    pub title: String,
    pub url: String,
    pub pagerank_score: f64,
}

impl From<&Page> for PathStep {
    fn from(page: &Page) -> Self {
        Self {
            page_id: page.page_id,
            title: page.title.clone(),
            url: page.url.clone(),
            pagerank_score: page.pagerank_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathReport {
    pub source_page_id: PageId,
    pub target_page_id: PageId,
    pub shortest_path: Option<Vec<PathStep>>,
    pub logical_path: Option<Vec<PathStep>>,
    /// Number of pages on the shortest path, endpoints included.
    pub shortest_length: Option<usize>,
    pub logical_length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathOutcome {
    Found(PathReport),
    NotFound {
        source_page_id: PageId,
        target_page_id: PageId,
    },
}

impl PathOutcome {
    pub fn report(&self) -> Option<&PathReport> {
        match self {
            PathOutcome::Found(report) => Some(report),
            PathOutcome::NotFound { .. } => None,
        }
    }
}

/// An in-memory snapshot of the stored graph, with scores.
pub struct LinkGraph {
    graph: DiGraphMap<PageId, ()>,
    pages: HashMap<PageId, Page>,
}

impl LinkGraph {
    pub fn new(pages: Vec<Page>, links: &[Link]) -> Self {
        let mut graph = DiGraphMap::new();
        for page in &pages {
            graph.add_node(page.page_id);
        }
        for link in links {
            graph.add_edge(link.source_page_id, link.target_page_id, ());
        }

        Self {
            graph,
            pages: pages.into_iter().map(|p| (p.page_id, p)).collect(),
        }
    }

    pub fn load<G: GraphStore>(store: &G) -> Result<Self> {
        let (pages, links) = store.load_graph()?;
        debug!("Loaded graph: {} pages, {} links", pages.len(), links.len());
        Ok(Self::new(pages, &links))
    }

    pub fn contains_page(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Stored PageRank of a page, 0.0 for pages never crawled.
    pub fn score(&self, page_id: PageId) -> f64 {
        self.pages
            .get(&page_id)
            .map(|p| p.pagerank_score)
            .unwrap_or(0.0)
    }

    fn out_neighbors(&self, page_id: PageId) -> impl Iterator<Item = PageId> + '_ {
        self.graph.neighbors_directed(page_id, Direction::Outgoing)
    }

    /// Unweighted BFS; the first path found has the fewest edges.
    pub fn shortest_path(&self, source: PageId, target: PageId) -> Option<Vec<PageId>> {
        if !self.contains_page(source) || !self.contains_page(target) {
            return None;
        }
        if source == target {
            return Some(vec![source]);
        }

        let mut queue = VecDeque::from([vec![source]]);
        let mut visited = HashSet::from([source]);

        while let Some(path) = queue.pop_front() {
            let current = path[path.len() - 1];
            if current == target {
                return Some(path);
            }

            for neighbor in self.out_neighbors(current) {
                if visited.insert(neighbor) {
                    let mut next = path.clone();
                    next.push(neighbor);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    /// Rank-biased BFS. Paths never have more than `max_depth` edges.
    pub fn logical_path(&self, source: PageId, target: PageId, max_depth: usize) -> Option<Vec<PageId>> {
        if !self.contains_page(source) || !self.contains_page(target) {
            return None;
        }
        if source == target {
            return Some(vec![source]);
        }

        let mut queue = VecDeque::from([vec![source]]);
        let mut visited = HashSet::from([source]);
        let mut best: Option<(f64, Vec<PageId>)> = None;

        while let Some(path) = queue.pop_front() {
            let current = path[path.len() - 1];

            if current == target {
                let score = self.path_score(&path);
                if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
                    best = Some((score, path));
                }
                continue;
            }

            if path.len() - 1 >= max_depth {
                continue;
            }

            let mut neighbors: Vec<PageId> = self
                .out_neighbors(current)
                .filter(|n| !visited.contains(n))
                .collect();
            neighbors.sort_by(|a, b| self.score(*b).total_cmp(&self.score(*a)));

            for neighbor in neighbors {
                visited.insert(neighbor);
                let mut next = path.clone();
                next.push(neighbor);
                queue.push_back(next);
            }
        }

        best.map(|(_, path)| path)
    }

    pub fn path_score(&self, path: &[PageId]) -> f64 {
        path.iter().map(|&id| self.score(id)).sum()
    }

    /// Page records for a path; ids with no stored page are skipped.
    pub fn steps(&self, path: &[PageId]) -> Vec<PathStep> {
        path.iter()
            .filter_map(|id| self.pages.get(id))
            .map(PathStep::from)
            .collect()
    }
}

pub struct PathFinder<'a, G> {
    store: &'a G,
}

impl<'a, G: GraphStore> PathFinder<'a, G> {
    pub fn new(store: &'a G) -> Self {
        Self { store }
    }

    pub fn shortest_path(&self, source: PageId, target: PageId) -> Result<Option<Vec<PageId>>> {
        Ok(LinkGraph::load(self.store)?.shortest_path(source, target))
    }

    pub fn logical_path(
        &self,
        source: PageId,
        target: PageId,
        max_depth: usize,
    ) -> Result<Option<Vec<PageId>>> {
        Ok(LinkGraph::load(self.store)?.logical_path(source, target, max_depth))
    }

    /// Run both searches over one snapshot of the store.
    pub fn find_paths(&self, source: PageId, target: PageId, max_depth: usize) -> Result<PathOutcome> {
        let graph = LinkGraph::load(self.store)?;

        let shortest = graph.shortest_path(source, target);
        let logical = graph.logical_path(source, target, max_depth);

        if shortest.is_none() && logical.is_none() {
            debug!("No path from {} to {}", source, target);
            return Ok(PathOutcome::NotFound {
                source_page_id: source,
                target_page_id: target,
            });
        }

        Ok(PathOutcome::Found(PathReport {
            source_page_id: source,
            target_page_id: target,
            shortest_length: shortest.as_ref().map(Vec::len),
            logical_length: logical.as_ref().map(Vec::len),
            shortest_path: shortest.map(|p| graph.steps(&p)),
            logical_path: logical.map(|p| graph.steps(&p)),
        }))
    }
}
