//! PageRank over the crawled link graph.

use crate::error::{GraphError, Result};
use crate::model::{Link, PageId};
use crate::store::GraphStore;
use petgraph::Direction;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRankConfig {
    pub damping: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

impl PageRankConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.damping.is_finite() {
            return Err(GraphError::InvalidParameter(
                "damping must be finite".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(GraphError::InvalidParameter(
                "damping must be in [0,1]".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(GraphError::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(GraphError::InvalidParameter(
                "tolerance must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRankRun {
    pub scores: HashMap<PageId, f64>,
    pub iterations: usize,
    /// L1 distance between the last two rank vectors.
    pub diff_l1: f64,
    pub converged: bool,
}

/// Build the neighbor-set graph over `node_ids`.
///
/// Edges leaving the node set are dropped and parallel edges collapse into one.
pub fn link_graph(node_ids: &[PageId], edges: &[Link]) -> DiGraphMap<PageId, ()> {
    let mut graph = DiGraphMap::with_capacity(node_ids.len(), edges.len());
    for &id in node_ids {
        graph.add_node(id);
    }
    for edge in edges {
        if graph.contains_node(edge.source_page_id) && graph.contains_node(edge.target_page_id) {
            graph.add_edge(edge.source_page_id, edge.target_page_id, ());
        }
    }
    graph
}

pub fn pagerank(node_ids: &[PageId], edges: &[Link], config: PageRankConfig) -> HashMap<PageId, f64> {
    pagerank_run(node_ids, edges, config).scores
}

/// Power iteration with uniform redistribution of dangling mass.
pub fn pagerank_run(node_ids: &[PageId], edges: &[Link], config: PageRankConfig) -> PageRankRun {
    let graph = link_graph(node_ids, edges);
    let nodes: Vec<PageId> = graph.nodes().collect();
    let n = nodes.len();
    if n == 0 {
        return PageRankRun {
            scores: HashMap::new(),
            iterations: 0,
            diff_l1: 0.0,
            converged: true,
        };
    }

    let index: HashMap<PageId, usize> = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let out_neighbors: Vec<Vec<usize>> = nodes
        .iter()
        .map(|&u| {
            graph
                .neighbors_directed(u, Direction::Outgoing)
                .map(|v| index[&v])
                .collect()
        })
        .collect();

    let n_f64 = n as f64;
    let mut scores = vec![1.0 / n_f64; n];
    let mut new_scores = vec![0.0; n];

    let mut iters = 0usize;
    let mut last_diff = f64::INFINITY;
    let mut converged = false;
    for _ in 0..config.max_iterations {
        iters += 1;
        let dangling_sum: f64 = out_neighbors
            .iter()
            .enumerate()
            .filter(|(_, out)| out.is_empty())
            .map(|(i, _)| scores[i])
            .sum();
        let dangling_contrib = config.damping * dangling_sum / n_f64;
        let teleport = (1.0 - config.damping) / n_f64;
        new_scores.fill(teleport + dangling_contrib);

        for (u, out) in out_neighbors.iter().enumerate() {
            if out.is_empty() {
                continue;
            }
            let share = config.damping * scores[u] / out.len() as f64;
            for &v in out {
                new_scores[v] += share;
            }
        }

        let diff: f64 = scores
            .iter()
            .zip(new_scores.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();
        last_diff = diff;
        std::mem::swap(&mut scores, &mut new_scores);
        if diff < config.tolerance {
            converged = true;
            break;
        }
    }

    PageRankRun {
        scores: nodes.into_iter().zip(scores).collect(),
        iterations: iters,
        diff_l1: last_diff,
        converged,
    }
}

/// Rank every stored page and write the scores back.
pub fn rank_store<G: GraphStore>(store: &G, config: PageRankConfig) -> Result<(PageRankRun, usize)> {
    config.validate()?;

    let (pages, links) = store.load_graph()?;
    let node_ids: Vec<PageId> = pages.iter().map(|p| p.page_id).collect();
    let edge_count = link_graph(&node_ids, &links).edge_count();

    let run = pagerank_run(&node_ids, &links, config);
    store.update_scores(&run.scores)?;

    info!(
        "PageRank over {} pages and {} edges: {} iterations (converged: {})",
        node_ids.len(),
        edge_count,
        run.iterations,
        run.converged
    );
    Ok((run, edge_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_graph_collapses_duplicates_and_drops_outside_edges() {
        let edges = vec![
            Link::new(1, 2),
            Link::new(1, 2).with_anchor("again"),
            Link::new(2, 99),
        ];

        let graph = link_graph(&[1, 2], &edges);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(1, 2));
    }

    #[test]
    fn test_validate_rejects_bad_damping() {
        let config = PageRankConfig {
            damping: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = PageRankConfig {
            tolerance: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(PageRankConfig::default().validate().is_ok());
    }
}
