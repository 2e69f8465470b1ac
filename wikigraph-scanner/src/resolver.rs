use crate::result::{ResolvedTitle, TitleMapping, TitleQuery};
use crate::source::WikiSource;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Titles per source request. MediaWiki rejects more than 50 for anonymous clients.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Batch-resolves raw link titles to canonical `(page_id, title)` pairs.
pub struct TitleResolver<'a, S> {
    source: &'a S,
    batch_size: usize,
}

impl<'a, S: WikiSource> TitleResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Resolve every title the source knows about.
    ///
    /// Titles that do not exist, and titles whose batch failed, are absent from the
    /// returned map. Several raw titles may map to the same page.
    pub async fn resolve_batch(&self, titles: &[String]) -> HashMap<String, ResolvedTitle> {
        let mut seen = HashSet::new();
        let unique: Vec<String> = titles
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        let mut results = HashMap::new();

        for chunk in unique.chunks(self.batch_size) {
            debug!("Resolving batch of {} titles", chunk.len());

            match self.source.query_titles(chunk).await {
                Ok(query) => {
                    for (raw, resolved) in resolve_chunk(chunk, &query) {
                        results.insert(raw, resolved);
                    }
                }
                Err(e) => {
                    warn!("Error resolving batch of {} titles: {}", chunk.len(), e);
                }
            }
        }

        results
    }
}

/// Trace each input of one batch through the normalization and redirect tables and
/// match the final titles against the returned pages.
pub fn resolve_chunk(chunk: &[String], query: &TitleQuery) -> Vec<(String, ResolvedTitle)> {
    let mut tracker: HashMap<String, Vec<String>> = chunk
        .iter()
        .map(|name| (name.clone(), vec![name.clone()]))
        .collect();

    forward_all(&mut tracker, &query.normalized);
    forward_all(&mut tracker, &query.redirects);

    let mut resolved = Vec::new();
    for page in &query.pages {
        let Some(page_id) = page.resolved_id() else {
            continue;
        };
        if let Some(originals) = tracker.get(&page.title) {
            for original in originals {
                resolved.push((
                    original.clone(),
                    ResolvedTitle {
                        page_id,
                        title: page.title.clone(),
                    },
                ));
            }
        }
    }

    resolved
}

fn forward_all(tracker: &mut HashMap<String, Vec<String>>, mappings: &[TitleMapping]) {
    for mapping in mappings {
        if let Some(names) = tracker.remove(&mapping.from) {
            tracker.entry(mapping.to.clone()).or_default().extend(names);
        }
    }
}
