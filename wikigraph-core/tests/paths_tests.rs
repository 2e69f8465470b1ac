// Tests for shortest and logical path search

use std::collections::HashMap;
use tempfile::TempDir;
use wikigraph_core::{Database, GraphStore, Link, Page, PathFinder, PathOutcome};

fn create_test_db() -> (TempDir, Database) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::new(&temp_dir.path().join("test.db")).unwrap();
    (temp_dir, db)
}

fn seed(db: &Database, pages: &[(i64, Vec<i64>)]) {
    for (id, targets) in pages {
        let links: Vec<Link> = targets.iter().map(|&t| Link::new(*id, t)).collect();
        let title = format!("P{}", id);
        db.upsert_page_with_links(&Page::new(*id, title.clone(), title), &links)
            .unwrap();
    }
}

// ============================================================================
// Shortest Path Tests
// ============================================================================

#[test]
fn test_shortest_path_prefers_direct_link() {
    let (_temp_dir, db) = create_test_db();
    // a -> b -> c and a -> c
    seed(&db, &[(1, vec![2, 3]), (2, vec![3]), (3, vec![])]);

    let finder = PathFinder::new(&db);
    assert_eq!(finder.shortest_path(1, 3).unwrap(), Some(vec![1, 3]));
}

#[test]
fn test_shortest_path_to_self() {
    let (_temp_dir, db) = create_test_db();
    seed(&db, &[(1, vec![2]), (2, vec![])]);

    let finder = PathFinder::new(&db);
    assert_eq!(finder.shortest_path(1, 1).unwrap(), Some(vec![1]));
}

#[test]
fn test_shortest_path_disconnected() {
    let (_temp_dir, db) = create_test_db();
    seed(&db, &[(1, vec![2]), (2, vec![]), (3, vec![1])]);

    let finder = PathFinder::new(&db);
    assert_eq!(finder.shortest_path(1, 3).unwrap(), None);
}

#[test]
fn test_shortest_path_unknown_endpoint() {
    let (_temp_dir, db) = create_test_db();
    // 2 is referenced but never crawled
    seed(&db, &[(1, vec![2])]);

    let finder = PathFinder::new(&db);
    assert_eq!(finder.shortest_path(1, 2).unwrap(), None);
    assert_eq!(finder.shortest_path(9, 1).unwrap(), None);
}

// ============================================================================
// Logical Path Tests
// ============================================================================

#[test]
fn test_logical_path_respects_max_depth() {
    let (_temp_dir, db) = create_test_db();
    // chain 1 -> 2 -> 3 -> 4 -> 5
    seed(&db, &[(1, vec![2]), (2, vec![3]), (3, vec![4]), (4, vec![5]), (5, vec![])]);

    let finder = PathFinder::new(&db);
    assert_eq!(finder.logical_path(1, 5, 3).unwrap(), None);
    assert_eq!(finder.logical_path(1, 5, 4).unwrap(), Some(vec![1, 2, 3, 4, 5]));
}

#[test]
fn test_logical_path_never_exceeds_max_depth() {
    let (_temp_dir, db) = create_test_db();
    seed(
        &db,
        &[(1, vec![2, 6]), (2, vec![3]), (3, vec![4]), (4, vec![5]), (5, vec![]), (6, vec![5])],
    );

    let finder = PathFinder::new(&db);
    for max_depth in 1..6 {
        if let Some(path) = finder.logical_path(1, 5, max_depth).unwrap() {
            assert!(path.len() - 1 <= max_depth);
        }
    }
}

#[test]
fn test_logical_path_follows_rank() {
    let (_temp_dir, db) = create_test_db();
    // two equal-length routes 1 -> 2 -> 4 and 1 -> 3 -> 4
    seed(&db, &[(1, vec![2, 3]), (2, vec![4]), (3, vec![4]), (4, vec![])]);
    db.update_scores(&HashMap::from([(1, 0.1), (2, 0.1), (3, 0.6), (4, 0.2)]))
        .unwrap();

    let finder = PathFinder::new(&db);
    assert_eq!(finder.shortest_path(1, 4).unwrap(), Some(vec![1, 2, 4]));
    assert_eq!(finder.logical_path(1, 4, 10).unwrap(), Some(vec![1, 3, 4]));
}

// ============================================================================
// find_paths Tests
// ============================================================================

#[test]
fn test_find_paths_same_source_and_target() {
    let (_temp_dir, db) = create_test_db();
    seed(&db, &[(1, vec![2]), (2, vec![])]);

    let outcome = PathFinder::new(&db).find_paths(1, 1, 10).unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.shortest_length, Some(1));
    assert_eq!(report.logical_length, Some(1));
    let shortest = report.shortest_path.as_ref().unwrap();
    let logical = report.logical_path.as_ref().unwrap();
    assert_eq!(shortest.len(), 1);
    assert_eq!(shortest[0].page_id, 1);
    assert_eq!(logical[0].title, "P1");
}

#[test]
fn test_find_paths_maps_records() {
    let (_temp_dir, db) = create_test_db();
    seed(&db, &[(1, vec![2]), (2, vec![3]), (3, vec![])]);
    db.update_scores(&HashMap::from([(2, 0.5)])).unwrap();

    let outcome = PathFinder::new(&db).find_paths(1, 3, 10).unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.shortest_length, Some(3));
    let shortest = report.shortest_path.as_ref().unwrap();
    let titles: Vec<&str> = shortest.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["P1", "P2", "P3"]);
    assert_eq!(shortest[1].pagerank_score, 0.5);
}

#[test]
fn test_find_paths_none_found() {
    let (_temp_dir, db) = create_test_db();
    seed(&db, &[(1, vec![]), (2, vec![])]);

    let outcome = PathFinder::new(&db).find_paths(1, 2, 10).unwrap();
    assert_eq!(
        outcome,
        PathOutcome::NotFound {
            source_page_id: 1,
            target_page_id: 2
        }
    );
    assert!(outcome.report().is_none());
}

#[test]
fn test_path_outcome_json_status() {
    let outcome = PathOutcome::NotFound {
        source_page_id: 4,
        target_page_id: 5,
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "not_found");
    assert_eq!(json["source_page_id"], 4);
}
