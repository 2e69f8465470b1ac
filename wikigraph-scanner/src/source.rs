use crate::error::Result;
use crate::result::{FetchedPage, PageRef, TitleQuery};

/// The encyclopedia the graph is built from.
///
/// Implementations are awaited strictly one call at a time by the crawler, so they
/// need no internal synchronisation.
#[allow(async_fn_in_trait)]
pub trait WikiSource {
    /// Fetch metadata and outbound links of one page.
    ///
    /// Returns `ScanError::PageMissing` when the source has no such page.
    async fn fetch_page(&self, page: &PageRef) -> Result<FetchedPage>;

    /// Look up a batch of raw titles, returning the normalization table, the
    /// redirect table and one record per final title.
    async fn query_titles(&self, titles: &[String]) -> Result<TitleQuery>;
}

impl<S: WikiSource> WikiSource for &S {
    async fn fetch_page(&self, page: &PageRef) -> Result<FetchedPage> {
        (**self).fetch_page(page).await
    }

    async fn query_titles(&self, titles: &[String]) -> Result<TitleQuery> {
        (**self).query_titles(titles).await
    }
}
