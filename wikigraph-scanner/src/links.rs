use crate::error::{Result, ScanError};
use crate::result::RawLink;
use percent_encoding::percent_decode_str;
use scraper::{Html, Selector};
use tracing::debug;

/// Namespaces whose pages are not articles (Portuguese and English wikis).
pub const EXCLUDED_NAMESPACES: &[&str] = &[
    "Ficheiro:",
    "Arquivo:",
    "Categoria:",
    "Especial:",
    "Ajuda:",
    "Portal:",
    "Predefinição:",
    "Wikipédia:",
    "Discussão:",
    "File:",
    "Category:",
    "Special:",
    "Help:",
    "Template:",
    "Wikipedia:",
    "Talk:",
];

const WIKI_PATH_PREFIX: &str = "/wiki/";

/// Extract internal article links from rendered page HTML.
///
/// Returns `(target title, anchor text)` pairs in document order. Anchor text is
/// lowercased with whitespace collapsed.
pub fn extract_links(html: &str) -> Result<Vec<RawLink>> {
    let document = Html::parse_fragment(html);
    let link_selector = Selector::parse("a[href]")
        .map_err(|e| ScanError::ParseError(format!("bad selector: {:?}", e)))?;

    let mut links = Vec::new();
    for element in document.select(&link_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(title) = href_to_title(href) else {
            continue;
        };
        if !is_article_title(&title) {
            debug!("Skipping non-article link: {}", title);
            continue;
        }

        let anchor = element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        links.push(RawLink::new(title, anchor));
    }

    debug!("Extracted {} links", links.len());
    Ok(links)
}

/// Turn a `/wiki/Some_Title#Section` href into `Some Title`.
pub fn href_to_title(href: &str) -> Option<String> {
    let rest = href.strip_prefix(WIKI_PATH_PREFIX)?;
    let rest = rest.split(['#', '?']).next().unwrap_or_default();
    if rest.is_empty() {
        return None;
    }

    let decoded = percent_decode_str(rest).decode_utf8().ok()?;
    let title = decoded.replace('_', " ").trim().to_string();

    if title.is_empty() { None } else { Some(title) }
}

pub fn is_article_title(title: &str) -> bool {
    !EXCLUDED_NAMESPACES
        .iter()
        .any(|prefix| title.starts_with(prefix))
}
