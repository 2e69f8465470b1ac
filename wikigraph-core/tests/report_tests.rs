// Tests for text report rendering

use std::collections::BTreeMap;
use tempfile::TempDir;
use wikigraph_core::paths::{PathReport, PathStep};
use wikigraph_core::report::{gather_stats, render_graph, render_page, render_paths, render_rank, render_stats};
use wikigraph_core::{Database, GraphStore, GraphView, Link, Page, PageRankSummary, PathOutcome, RankedPage, TitleEdge};

fn step(page_id: i64, title: &str, score: f64) -> PathStep {
    PathStep {
        page_id,
        title: title.to_string(),
        url: format!("https://pt.wikipedia.org/wiki/{}", title),
        pagerank_score: score,
    }
}

// ============================================================================
// Page / Graph Tests
// ============================================================================

#[test]
fn test_render_page() {
    let mut page = Page::new(42, "Cálculo", "https://pt.wikipedia.org/wiki/C%C3%A1lculo");
    page.links_out_count = 12;
    page.pagerank_score = 0.125;

    let text = render_page(&page);
    assert!(text.contains("Cálculo"));
    assert!(text.contains("Page ID:      42"));
    assert!(text.contains("Links out:    12"));
    assert!(text.contains("PageRank:     0.125000"));
}

#[test]
fn test_render_graph() {
    let view = GraphView {
        nodes: vec!["Física".to_string(), "Energia".to_string()],
        links: vec![TitleEdge {
            source: "Física".to_string(),
            target: "Energia".to_string(),
        }],
    };

    let text = render_graph("Física", &view);
    assert!(text.contains("GRAPH AROUND 'Física'"));
    assert!(text.contains("Nodes: 2"));
    assert!(text.contains("Edges: 1"));
    assert!(text.contains("Física → Energia"));
}

// ============================================================================
// Rank Tests
// ============================================================================

#[test]
fn test_render_rank_lists_top_pages_in_order() {
    let summary = PageRankSummary {
        node_count: 3,
        edge_count: 4,
        iterations: 17,
        converged: true,
        diff_l1: 1e-7,
        score_total: 1.0,
        top_pages: vec![
            RankedPage {
                page_id: 3,
                title: "Massa".to_string(),
                score: 0.5,
            },
            RankedPage {
                page_id: 1,
                title: "Física".to_string(),
                score: 0.3,
            },
        ],
        scores: BTreeMap::new(),
    };

    let text = render_rank(&summary);
    assert!(text.contains("Iterations:   17 (converged)"));
    let massa = text.find("Massa").unwrap();
    let fisica = text.find("Física").unwrap();
    assert!(massa < fisica);
}

// ============================================================================
// Path Tests
// ============================================================================

#[test]
fn test_render_paths_found() {
    let outcome = PathOutcome::Found(PathReport {
        source_page_id: 1,
        target_page_id: 3,
        shortest_path: Some(vec![step(1, "A", 0.1), step(3, "C", 0.2)]),
        logical_path: None,
        shortest_length: Some(2),
        logical_length: None,
    });

    let text = render_paths(&outcome);
    assert!(text.contains("Shortest path (2 pages)"));
    assert!(text.contains("Logical path: none"));
    assert!(text.contains("C (ID: 3"));
}

// ============================================================================
// Stats Tests
// ============================================================================

#[test]
fn test_gather_and_render_stats() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).unwrap();

    db.upsert_page_with_links(
        &Page::new(1, "Física", "url"),
        &[Link::new(1, 2).with_anchor("energia")],
    )
    .unwrap();

    let stats = gather_stats(&db).unwrap();
    assert_eq!(stats.page_count, 1);
    assert_eq!(stats.link_count, 1);
    assert_eq!(stats.recent_pages.len(), 1);
    assert_eq!(stats.recent_links[0].link.target_page_id, 2);

    let text = render_stats(&stats);
    assert!(text.contains("Pages: 1"));
    assert!(text.contains("[1] Física"));
    assert!(text.contains("1 → 2 \"energia\""));

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["recent_links"][0]["anchor_text"], "energia");
}
