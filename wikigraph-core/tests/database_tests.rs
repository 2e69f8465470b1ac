// Tests for the SQLite graph store

use std::collections::HashMap;
use tempfile::TempDir;
use wikigraph_core::{Database, GraphStore, Link, Page, PageRef};

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path).unwrap();
    (temp_dir, db)
}

fn page(id: i64, title: &str) -> Page {
    Page::new(id, title, format!("https://pt.wikipedia.org/wiki/{}", title.replace(' ', "_")))
}

// ============================================================================
// Database Creation Tests
// ============================================================================

#[test]
fn test_database_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db = Database::new(&db_path);
    assert!(db.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_database_exists_and_drop() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    assert!(!Database::exists(&db_path));

    let db = Database::new(&db_path).unwrap();
    assert!(Database::exists(&db_path));
    drop(db);

    Database::drop(&db_path).unwrap();
    assert!(!Database::exists(&db_path));
}

#[test]
fn test_empty_database_counts() {
    let (_temp_dir, db) = create_test_db();
    assert_eq!(db.count_pages().unwrap(), 0);
    assert_eq!(db.count_links().unwrap(), 0);
    assert!(db.recent_pages(5).unwrap().is_empty());
}

// ============================================================================
// Page Tests
// ============================================================================

#[test]
fn test_get_page_by_id_and_title() {
    let (_temp_dir, db) = create_test_db();

    let mut fisica = page(10, "Física");
    fisica.length_chars = 5400;
    fisica.num_editors = 12;
    fisica.num_revisions = 80;
    db.upsert_page_with_links(&fisica, &[]).unwrap();

    let by_id = db.get_page(&PageRef::Id(10)).unwrap().unwrap();
    assert_eq!(by_id.title, "Física");
    assert_eq!(by_id.length_chars, 5400);
    assert_eq!(by_id.num_editors, 12);
    assert_eq!(by_id.num_revisions, 80);
    assert!(by_id.last_crawled > 0);

    let by_title = db.get_page(&PageRef::title("Física")).unwrap().unwrap();
    assert_eq!(by_title.page_id, 10);
}

#[test]
fn test_get_missing_page() {
    let (_temp_dir, db) = create_test_db();
    assert!(db.get_page(&PageRef::Id(404)).unwrap().is_none());
    assert!(db.get_page(&PageRef::title("Nada")).unwrap().is_none());
}

#[test]
fn test_upsert_preserves_pagerank_and_replaces_links() {
    let (_temp_dir, db) = create_test_db();

    db.upsert_page_with_links(
        &page(1, "Física"),
        &[Link::new(1, 2).with_anchor("energia"), Link::new(1, 3)],
    )
    .unwrap();
    db.update_scores(&HashMap::from([(1, 0.42)])).unwrap();

    let mut recrawled = page(1, "Física");
    recrawled.pagerank_score = 0.0;
    recrawled.links_out_count = 1;
    db.upsert_page_with_links(&recrawled, &[Link::new(1, 4)]).unwrap();

    let stored = db.get_page(&PageRef::Id(1)).unwrap().unwrap();
    assert!((stored.pagerank_score - 0.42).abs() < 1e-12);
    assert_eq!(stored.links_out_count, 1);

    assert_eq!(db.count_links().unwrap(), 1);
    assert_eq!(db.outgoing_targets(1, 10).unwrap(), vec![4]);
}

#[test]
fn test_upsert_renames_page() {
    let (_temp_dir, db) = create_test_db();

    db.upsert_page_with_links(&page(7, "Calculo"), &[]).unwrap();
    db.upsert_page_with_links(&page(7, "Cálculo"), &[]).unwrap();

    assert_eq!(db.count_pages().unwrap(), 1);
    assert!(db.get_page(&PageRef::title("Calculo")).unwrap().is_none());
    assert_eq!(
        db.get_page(&PageRef::title("Cálculo")).unwrap().unwrap().page_id,
        7
    );
}

#[test]
fn test_links_stored_under_upserted_page() {
    let (_temp_dir, db) = create_test_db();

    db.upsert_page_with_links(&page(1, "Física"), &[Link::new(99, 2)])
        .unwrap();

    let (_, links) = db.load_graph().unwrap();
    assert_eq!(links, vec![Link::new(1, 2)]);
}

// ============================================================================
// Link Tests
// ============================================================================

#[test]
fn test_links_in_count_includes_forward_references() {
    let (_temp_dir, db) = create_test_db();

    // 1 and 3 both point at 2 before 2 is crawled
    db.upsert_page_with_links(&page(1, "Física"), &[Link::new(1, 2)]).unwrap();
    db.upsert_page_with_links(&page(3, "Química"), &[Link::new(3, 2)]).unwrap();
    db.upsert_page_with_links(&page(2, "Energia"), &[]).unwrap();

    let energia = db.get_page(&PageRef::Id(2)).unwrap().unwrap();
    assert_eq!(energia.links_in_count, 2);

    let fisica = db.get_page(&PageRef::Id(1)).unwrap().unwrap();
    assert_eq!(fisica.links_in_count, 0);
}

#[test]
fn test_outgoing_targets_limit_and_order() {
    let (_temp_dir, db) = create_test_db();

    let links: Vec<Link> = [5, 3, 9, 1].iter().map(|&t| Link::new(1, t)).collect();
    db.upsert_page_with_links(&page(1, "Física"), &links).unwrap();

    assert_eq!(db.outgoing_targets(1, 2).unwrap(), vec![5, 3]);
    assert_eq!(db.outgoing_targets(1, 50).unwrap(), vec![5, 3, 9, 1]);
    assert!(db.outgoing_targets(2, 50).unwrap().is_empty());
}

#[test]
fn test_get_subgraph_drops_links_leaving_id_set() {
    let (_temp_dir, db) = create_test_db();

    db.upsert_page_with_links(&page(1, "A"), &[Link::new(1, 2), Link::new(1, 3)])
        .unwrap();
    db.upsert_page_with_links(&page(2, "B"), &[Link::new(2, 1), Link::new(2, 4)])
        .unwrap();
    db.upsert_page_with_links(&page(3, "C"), &[Link::new(3, 1)]).unwrap();

    let (pages, links) = db.get_subgraph(&[2, 1, 2]).unwrap();
    let ids: Vec<i64> = pages.iter().map(|p| p.page_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(links.len(), 2);
    assert!(links.contains(&Link::new(1, 2)));
    assert!(links.contains(&Link::new(2, 1)));
}

#[test]
fn test_get_subgraph_empty() {
    let (_temp_dir, db) = create_test_db();
    let (pages, links) = db.get_subgraph(&[]).unwrap();
    assert!(pages.is_empty());
    assert!(links.is_empty());
}

#[test]
fn test_update_scores() {
    let (_temp_dir, db) = create_test_db();

    db.upsert_page_with_links(&page(1, "A"), &[]).unwrap();
    db.upsert_page_with_links(&page(2, "B"), &[]).unwrap();
    db.update_scores(&HashMap::from([(1, 0.25), (2, 0.75), (3, 1.0)]))
        .unwrap();

    let (pages, _) = db.load_graph().unwrap();
    assert_eq!(pages.len(), 2);
    assert!((pages[0].pagerank_score - 0.25).abs() < 1e-12);
    assert!((pages[1].pagerank_score - 0.75).abs() < 1e-12);
}

// ============================================================================
// Inspection Tests
// ============================================================================

#[test]
fn test_recent_pages_and_links() {
    let (_temp_dir, db) = create_test_db();

    for id in 1..=7 {
        db.upsert_page_with_links(&page(id, &format!("P{}", id)), &[Link::new(id, id + 1)])
            .unwrap();
    }

    let recent = db.recent_pages(5).unwrap();
    let ids: Vec<i64> = recent.iter().map(|p| p.page_id).collect();
    assert_eq!(ids, vec![7, 6, 5, 4, 3]);

    let links = db.recent_links(3).unwrap();
    assert_eq!(links.len(), 3);
    assert_eq!(links[0].1, Link::new(7, 8));
    assert!(links[0].0 > links[1].0);
}
