use crate::error::{Result, ScanError};
use crate::links::extract_links;
use crate::result::{FetchedPage, PageId, PageRef, TitleQuery};
use crate::source::WikiSource;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://pt.wikipedia.org/w/api.php";
pub const DEFAULT_USER_AGENT: &str = concat!(
    "wikigraph/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/wikigraph/wikigraph)"
);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope<T> {
    query: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct InfoQuery {
    #[serde(default)]
    pages: Vec<PageInfo>,
}

/// Metadata of one page as returned by `prop=info|contributors|revisions`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "pageid", default)]
    pub page_id: Option<PageId>,
    pub title: String,
    #[serde(rename = "fullurl", default)]
    pub full_url: Option<String>,
    #[serde(default)]
    pub length: i64,
    #[serde(default)]
    pub contributors: Vec<Value>,
    #[serde(default)]
    pub revisions: Vec<Value>,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
}

#[derive(Debug, Deserialize)]
struct ParseEnvelope {
    parse: ParsedText,
}

#[derive(Debug, Deserialize)]
struct ParsedText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

/// HTTP client for the MediaWiki action API.
pub struct MediaWikiClient {
    client: Client,
    api_url: Url,
}

impl MediaWikiClient {
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;

        let client = Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs((config.timeout_secs / 2).max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self { client, api_url })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    async fn call_api<T: DeserializeOwned>(&self, params: &[(&str, String)]) -> Result<T> {
        debug!("Calling API with params: {:?}", params);

        let start = Instant::now();
        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;
        debug!(
            "HTTP {} in {}ms",
            response.status().as_u16(),
            start.elapsed().as_millis()
        );

        let body: Value = response.error_for_status()?.json().await?;
        if let Some(error) = body.get("error") {
            let error: ApiError = serde_json::from_value(error.clone())?;
            return Err(ScanError::Api {
                code: error.code,
                info: error.info,
            });
        }

        Ok(serde_json::from_value(body)?)
    }

    /// Fetch size, contributor and revision data plus the canonical url of a page.
    pub async fn fetch_metadata(&self, page: &PageRef) -> Result<PageInfo> {
        let mut params = vec![
            ("action", "query".to_string()),
            ("prop", "info|contributors|revisions".to_string()),
            ("inprop", "url".to_string()),
            ("rvprop", "ids".to_string()),
            ("pclimit", "max".to_string()),
        ];
        match page {
            PageRef::Id(id) => params.push(("pageids", id.to_string())),
            PageRef::Title(title) => {
                params.push(("titles", title.clone()));
                params.push(("redirects", "1".to_string()));
            }
        }

        let envelope: QueryEnvelope<InfoQuery> = self.call_api(&params).await?;
        let info = envelope
            .query
            .unwrap_or_default()
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| ScanError::PageMissing(page.to_string()))?;

        if info.missing || info.invalid || info.page_id.is_none() {
            return Err(ScanError::PageMissing(page.to_string()));
        }

        Ok(info)
    }

    pub async fn fetch_html(&self, page_id: PageId) -> Result<String> {
        let params = [
            ("action", "parse".to_string()),
            ("pageid", page_id.to_string()),
            ("prop", "text".to_string()),
        ];

        let envelope: ParseEnvelope = self.call_api(&params).await?;
        debug!("HTML received ({} chars)", envelope.parse.text.len());
        Ok(envelope.parse.text)
    }

    fn article_url(&self, title: &str) -> String {
        self.api_url
            .join(&format!("/wiki/{}", title.replace(' ', "_")))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| title.to_string())
    }
}

impl WikiSource for MediaWikiClient {
    async fn fetch_page(&self, page: &PageRef) -> Result<FetchedPage> {
        info!("Fetching {}", page);

        let info = self.fetch_metadata(page).await?;
        let page_id = info
            .page_id
            .ok_or_else(|| ScanError::PageMissing(page.to_string()))?;
        let url = info
            .full_url
            .clone()
            .unwrap_or_else(|| self.article_url(&info.title));

        let html = self.fetch_html(page_id).await?;
        let links = extract_links(&html)?;

        let mut fetched = FetchedPage::new(page_id, info.title, url);
        fetched.length_chars = info.length;
        fetched.num_editors = info.contributors.len() as i64;
        fetched.num_revisions = info.revisions.len() as i64;
        fetched.links = links;

        debug!(
            "Fetched '{}' (ID: {}) with {} raw links",
            fetched.title,
            fetched.page_id,
            fetched.links.len()
        );
        Ok(fetched)
    }

    async fn query_titles(&self, titles: &[String]) -> Result<TitleQuery> {
        let params = [
            ("action", "query".to_string()),
            ("titles", titles.join("|")),
            ("redirects", "1".to_string()),
        ];

        let envelope: QueryEnvelope<TitleQuery> = self.call_api(&params).await?;
        Ok(envelope.query.unwrap_or_default())
    }
}
