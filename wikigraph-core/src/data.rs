use crate::error::Result;
use crate::model::{Link, Page, PageId, PageRef};
use crate::store::GraphStore;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Upper bound on ids bound into a single `IN (...)` clause.
const ID_CHUNK: usize = 500;

const PAGE_COLUMNS: &str = "
    p.page_id, p.title, p.url, p.length_chars, p.num_editors, p.num_revisions,
    p.links_out_count,
    (SELECT COUNT(*) FROM links l WHERE l.target_page_id = p.page_id) AS links_in_count,
    p.pagerank_score, p.last_crawled";

pub struct Database {
    conn: Connection,
}

fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        page_id: row.get(0)?,
        title: row.get(1)?,
        url: row.get(2)?,
        length_chars: row.get(3)?,
        num_editors: row.get(4)?,
        num_revisions: row.get(5)?,
        links_out_count: row.get(6)?,
        links_in_count: row.get(7)?,
        pagerank_score: row.get(8)?,
        last_crawled: row.get(9)?,
    })
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<Link> {
    Ok(Link {
        source_page_id: row.get(0)?,
        target_page_id: row.get(1)?,
        anchor_text: row.get(2)?,
    })
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = -64000;  -- 64MB cache
            PRAGMA temp_store = MEMORY;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
CREATE TABLE IF NOT EXISTS pages (
    page_id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    length_chars INTEGER NOT NULL DEFAULT 0,
    num_editors INTEGER NOT NULL DEFAULT 0,
    num_revisions INTEGER NOT NULL DEFAULT 0,
    links_out_count INTEGER NOT NULL DEFAULT 0,
    pagerank_score REAL NOT NULL DEFAULT 0.0,
    last_crawled INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_pages_title ON pages(title);

-- No foreign key on target_page_id: links may point at pages not crawled yet.
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_page_id INTEGER NOT NULL,
    target_page_id INTEGER NOT NULL,
    anchor_text TEXT,

    FOREIGN KEY(source_page_id) REFERENCES pages(page_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_links_source ON links(source_page_id);
CREATE INDEX IF NOT EXISTS idx_links_target ON links(target_page_id);
            ",
        )?;
        Ok(())
    }

    pub fn count_pages(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn count_links(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Pages with the highest ids first.
    pub fn recent_pages(&self, limit: usize) -> Result<Vec<Page>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages p ORDER BY p.page_id DESC LIMIT ?1",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![limit as i64], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pages)
    }

    /// Most recently inserted links with their row ids.
    pub fn recent_links(&self, limit: usize) -> Result<Vec<(i64, Link)>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_page_id, target_page_id, anchor_text, id
             FROM links ORDER BY id DESC LIMIT ?1",
        )?;

        let links = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, i64>(3)?, link_from_row(row)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }

    fn pages_by_ids(&self, ids: &[PageId]) -> Result<Vec<Page>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages p WHERE p.page_id IN ({})",
            PAGE_COLUMNS,
            placeholders(ids.len())
        ))?;

        let pages = stmt
            .query_map(params_from_iter(ids.iter()), page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(pages)
    }

    fn links_from_sources(&self, ids: &[PageId]) -> Result<Vec<Link>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT source_page_id, target_page_id, anchor_text
             FROM links WHERE source_page_id IN ({}) ORDER BY id",
            placeholders(ids.len())
        ))?;

        let links = stmt
            .query_map(params_from_iter(ids.iter()), link_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(links)
    }
}

impl GraphStore for Database {
    fn get_page(&self, page: &PageRef) -> Result<Option<Page>> {
        let found = match page {
            PageRef::Id(id) => self
                .conn
                .query_row(
                    &format!("SELECT {} FROM pages p WHERE p.page_id = ?1", PAGE_COLUMNS),
                    params![id],
                    page_from_row,
                )
                .optional()?,
            PageRef::Title(title) => self
                .conn
                .query_row(
                    &format!(
                        "SELECT {} FROM pages p WHERE p.title = ?1
                         ORDER BY p.last_crawled DESC LIMIT 1",
                        PAGE_COLUMNS
                    ),
                    params![title],
                    page_from_row,
                )
                .optional()?,
        };
        Ok(found)
    }

    fn get_subgraph(&self, ids: &[PageId]) -> Result<(Vec<Page>, Vec<Link>)> {
        let mut seen = HashSet::new();
        let unique: Vec<PageId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

        let mut pages = Vec::new();
        let mut links = Vec::new();
        for chunk in unique.chunks(ID_CHUNK) {
            pages.extend(self.pages_by_ids(chunk)?);
            links.extend(
                self.links_from_sources(chunk)?
                    .into_iter()
                    .filter(|l| seen.contains(&l.target_page_id)),
            );
        }
        pages.sort_by_key(|p| p.page_id);

        debug!(
            "Subgraph of {} ids: {} pages, {} links",
            unique.len(),
            pages.len(),
            links.len()
        );
        Ok((pages, links))
    }

    fn load_graph(&self) -> Result<(Vec<Page>, Vec<Link>)> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM pages p ORDER BY p.page_id",
            PAGE_COLUMNS
        ))?;
        let pages = stmt
            .query_map([], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = self.conn.prepare(
            "SELECT source_page_id, target_page_id, anchor_text FROM links ORDER BY id",
        )?;
        let links = stmt
            .query_map([], link_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((pages, links))
    }

    fn outgoing_targets(&self, source: PageId, limit: usize) -> Result<Vec<PageId>> {
        let mut stmt = self.conn.prepare(
            "SELECT target_page_id FROM links WHERE source_page_id = ?1 ORDER BY id LIMIT ?2",
        )?;

        let targets = stmt
            .query_map(params![source, limit as i64], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(targets)
    }

    /// Links are stored under `page.page_id` whatever their own source field says.
    fn upsert_page_with_links(&self, page: &Page, links: &[Link]) -> Result<()> {
        let timestamp = current_timestamp();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO pages (
                page_id, title, url, length_chars, num_editors, num_revisions,
                links_out_count, last_crawled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(page_id) DO UPDATE SET
                title = excluded.title,
                url = excluded.url,
                length_chars = excluded.length_chars,
                num_editors = excluded.num_editors,
                num_revisions = excluded.num_revisions,
                links_out_count = excluded.links_out_count,
                last_crawled = excluded.last_crawled",
            params![
                page.page_id,
                &page.title,
                &page.url,
                page.length_chars,
                page.num_editors,
                page.num_revisions,
                page.links_out_count,
                timestamp,
            ],
        )?;

        tx.execute(
            "DELETE FROM links WHERE source_page_id = ?1",
            params![page.page_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (source_page_id, target_page_id, anchor_text) VALUES (?1, ?2, ?3)",
            )?;
            for link in links {
                stmt.execute(params![page.page_id, link.target_page_id, &link.anchor_text])?;
            }
        }

        tx.commit()?;
        debug!(
            "Saved page '{}' (ID: {}) with {} links",
            page.title,
            page.page_id,
            links.len()
        );
        Ok(())
    }

    fn update_scores(&self, scores: &HashMap<PageId, f64>) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE pages SET pagerank_score = ?1 WHERE page_id = ?2")?;
            for (page_id, score) in scores {
                stmt.execute(params![score, page_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
