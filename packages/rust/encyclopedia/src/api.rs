//! MediaWiki Action API response shapes (`formatversion=2`).
//!
//! Only the fields wikicards reads are modelled; everything else is ignored.

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

use wikicards_shared::{Result, WikicardsError};

/// Every `action=query` response: either a `query` payload or an `error`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<Q> {
    #[serde(default)]
    pub error: Option<ApiError>,
    pub query: Option<Q>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

impl<Q> Envelope<Q> {
    /// Unwrap the `query` payload, mapping API-level errors to `Service`.
    pub fn into_query(self, what: &str) -> Result<Q> {
        if let Some(err) = self.error {
            return Err(WikicardsError::Service(format!(
                "{what}: API error {}: {}",
                err.code, err.info
            )));
        }
        self.query
            .ok_or_else(|| WikicardsError::Service(format!("{what}: response has no query")))
    }
}

// ---------------------------------------------------------------------------
// list=search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    pub search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub title: String,
}

// ---------------------------------------------------------------------------
// prop=extracts|pageprops
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PagesQuery {
    #[serde(default)]
    pub pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageEntry {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    #[serde(default)]
    pub extract: Option<String>,
    #[serde(default)]
    pub pageprops: Option<PageProps>,
}

impl PageEntry {
    pub fn is_disambiguation(&self) -> bool {
        self.pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageProps {
    #[serde(default)]
    pub disambiguation: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// action=parse
// ---------------------------------------------------------------------------

/// `action=parse` response: the rendered page HTML or an `error`.
#[derive(Debug, Deserialize)]
pub(crate) struct ParseEnvelope {
    #[serde(default)]
    pub error: Option<ApiError>,
    pub parse: Option<ParsedPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParsedPage {
    #[serde(default)]
    pub text: String,
}

impl ParseEnvelope {
    /// Unwrap the rendered HTML, mapping API-level errors to `Service`.
    pub fn into_html(self, what: &str) -> Result<String> {
        if let Some(err) = self.error {
            return Err(WikicardsError::Service(format!(
                "{what}: API error {}: {}",
                err.code, err.info
            )));
        }
        self.parse
            .map(|page| page.text)
            .ok_or_else(|| WikicardsError::Service(format!("{what}: response has no parse")))
    }
}

/// Title prefixes of project/meta namespaces, never disambiguation options.
const NON_ARTICLE_PREFIXES: [&str; 8] = [
    "Special:",
    "Help:",
    "Wikipedia:",
    "Category:",
    "Template:",
    "File:",
    "Portal:",
    "Talk:",
];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| WikicardsError::Service(format!("invalid selector '{css}': {e}")))
}

/// Option titles of a rendered disambiguation page, in page order.
///
/// Takes the first titled wiki link of each list item, skipping
/// table-of-contents entries and non-article namespaces.
pub(crate) fn disambiguation_links(html: &str) -> Result<Vec<String>> {
    let doc = Html::parse_fragment(html);
    let li_sel = selector("li")?;
    let link_sel = selector("a[title][href^='/wiki/']")?;

    let mut options: Vec<String> = Vec::new();
    for li in doc.select(&li_sel) {
        if is_toc_entry(li) {
            continue;
        }
        let Some(title) = li
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("title"))
        else {
            continue;
        };
        if NON_ARTICLE_PREFIXES.iter().any(|p| title.starts_with(p)) {
            continue;
        }
        if !options.iter().any(|o| o == title) {
            options.push(title.to_string());
        }
    }
    Ok(options)
}

fn is_toc_entry(li: ElementRef<'_>) -> bool {
    li.value().classes().any(|class| class.starts_with("toc"))
}
