// Plain-text rendering of query results

use crate::data::Database;
use crate::error::Result;
use crate::model::{Link, Page};
use crate::paths::{PathOutcome, PathStep};
use crate::service::{GraphView, PageRankSummary};
use serde::{Deserialize, Serialize};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

/// Number of pages and links listed by [`gather_stats`].
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub page_count: i64,
    pub link_count: i64,
    pub recent_pages: Vec<Page>,
    pub recent_links: Vec<RecentLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentLink {
    pub id: i64,
    #[serde(flatten)]
    pub link: Link,
}

pub fn gather_stats(db: &Database) -> Result<DatabaseStats> {
    Ok(DatabaseStats {
        page_count: db.count_pages()?,
        link_count: db.count_links()?,
        recent_pages: db.recent_pages(RECENT_LIMIT)?,
        recent_links: db
            .recent_links(RECENT_LIMIT)?
            .into_iter()
            .map(|(id, link)| RecentLink { id, link })
            .collect(),
    })
}

fn header(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push_str(&format!("  {}\n", title));
    report.push_str(RULE);
    report.push('\n');
}

pub fn render_page(page: &Page) -> String {
    let mut report = String::new();
    header(&mut report, &page.title);

    report.push_str(&format!("Page ID:      {}\n", page.page_id));
    report.push_str(&format!("URL:          {}\n", page.url));
    report.push_str(&format!("Length:       {} chars\n", page.length_chars));
    report.push_str(&format!("Editors:      {}\n", page.num_editors));
    report.push_str(&format!("Revisions:    {}\n", page.num_revisions));
    report.push_str(&format!("Links out:    {}\n", page.links_out_count));
    report.push_str(&format!("Links in:     {}\n", page.links_in_count));
    report.push_str(&format!("PageRank:     {:.6}\n", page.pagerank_score));
    report.push_str(&format!("Last crawled: {}\n", format_timestamp(page.last_crawled)));
    report
}

pub fn render_graph(seed: &str, view: &GraphView) -> String {
    let mut report = String::new();
    header(&mut report, &format!("GRAPH AROUND '{}'", seed));

    report.push_str(&format!("Nodes: {}\n", view.nodes.len()));
    report.push_str(&format!("Edges: {}\n\n", view.links.len()));

    for edge in &view.links {
        report.push_str(&format!("  {} → {}\n", edge.source, edge.target));
    }
    report
}

pub fn render_rank(summary: &PageRankSummary) -> String {
    let mut report = String::new();
    header(&mut report, "PAGERANK");

    report.push_str(&format!("Pages:        {}\n", summary.node_count));
    report.push_str(&format!("Edges:        {}\n", summary.edge_count));
    report.push_str(&format!(
        "Iterations:   {} ({})\n",
        summary.iterations,
        if summary.converged { "converged" } else { "not converged" }
    ));
    report.push_str(&format!("Score total:  {:.6}\n", summary.score_total));

    if !summary.top_pages.is_empty() {
        report.push_str("\nTop pages:\n");
        for (rank, page) in summary.top_pages.iter().enumerate() {
            report.push_str(&format!(
                "  {:>3}. {:.6}  {} (ID: {})\n",
                rank + 1,
                page.score,
                page.title,
                page.page_id
            ));
        }
    }
    report
}

fn render_path(report: &mut String, label: &str, path: Option<&[PathStep]>) {
    match path {
        Some(steps) => {
            report.push_str(&format!("{} ({} pages):\n", label, steps.len()));
            for (i, step) in steps.iter().enumerate() {
                report.push_str(&format!(
                    "  {:>2}. {} (ID: {}, PageRank: {:.6})\n",
                    i + 1,
                    step.title,
                    step.page_id,
                    step.pagerank_score
                ));
            }
        }
        None => report.push_str(&format!("{}: none\n", label)),
    }
    report.push('\n');
}

pub fn render_paths(outcome: &PathOutcome) -> String {
    let mut report = String::new();

    match outcome {
        PathOutcome::Found(found) => {
            header(
                &mut report,
                &format!("PATHS {} → {}", found.source_page_id, found.target_page_id),
            );
            render_path(&mut report, "Shortest path", found.shortest_path.as_deref());
            render_path(&mut report, "Logical path", found.logical_path.as_deref());
        }
        PathOutcome::NotFound {
            source_page_id,
            target_page_id,
        } => {
            header(&mut report, &format!("PATHS {} → {}", source_page_id, target_page_id));
            report.push_str("No path found between the two pages.\n");
        }
    }
    report
}

pub fn render_stats(stats: &DatabaseStats) -> String {
    let mut report = String::new();
    header(&mut report, "DATABASE");

    report.push_str(&format!("Pages: {}\n", stats.page_count));
    report.push_str(&format!("Links: {}\n\n", stats.link_count));

    if !stats.recent_pages.is_empty() {
        report.push_str("Recent pages:\n");
        for page in &stats.recent_pages {
            report.push_str(&format!(
                "  [{}] {} (out: {}, in: {})\n",
                page.page_id, page.title, page.links_out_count, page.links_in_count
            ));
        }
        report.push('\n');
    }

    if !stats.recent_links.is_empty() {
        report.push_str("Recent links:\n");
        for recent in &stats.recent_links {
            report.push_str(&format!(
                "  #{} {} → {} \"{}\"\n",
                recent.id,
                recent.link.source_page_id,
                recent.link.target_page_id,
                recent.link.anchor_text.as_deref().unwrap_or("")
            ));
        }
    }
    report
}

fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_render_paths_not_found() {
        let outcome = PathOutcome::NotFound {
            source_page_id: 1,
            target_page_id: 2,
        };
        let text = render_paths(&outcome);
        assert!(text.contains("PATHS 1 → 2"));
        assert!(text.contains("No path found"));
    }
}
