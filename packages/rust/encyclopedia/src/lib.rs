//! Encyclopedia search and page fetching.
//!
//! The [`Encyclopedia`] trait is the seam the article retriever depends on.
//! [`MediaWikiClient`] implements it against the MediaWiki Action API
//! (Wikipedia by default): title search, plain-text page extracts, and the
//! two lookup conditions a fetch can raise (missing page, disambiguation).
//! Disambiguation options are read from the rendered page so they keep the
//! order the page lists them in.

mod api;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use wikicards_shared::{EncyclopediaConfig, Result, WikicardsError};

use api::{Envelope, PagesQuery, ParseEnvelope, SearchQuery};

/// Maximum number of redirects to follow per request.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for encyclopedia requests.
const USER_AGENT: &str = concat!("wikicards/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Encyclopedia trait
// ---------------------------------------------------------------------------

/// A fetched encyclopedia page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Canonical title (after redirects).
    pub title: String,
    /// Plain-text content.
    pub content: String,
}

/// Search/fetch collaborator used by the article retriever.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Return up to `limit` candidate titles in the service's relevance order.
    ///
    /// Fails with [`WikicardsError::Service`] on transport errors.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>>;

    /// Fetch the full plain-text content of a page.
    ///
    /// With `exact_title == false` the title is first resolved through search.
    /// Raises [`WikicardsError::Disambiguation`] when the title maps to several
    /// pages and [`WikicardsError::PageMissing`] when it does not exist.
    async fn fetch_page(&self, title: &str, exact_title: bool) -> Result<Page>;
}

// ---------------------------------------------------------------------------
// MediaWiki client
// ---------------------------------------------------------------------------

/// [`Encyclopedia`] backed by the MediaWiki Action API.
pub struct MediaWikiClient {
    client: Client,
    api_url: Url,
}

impl MediaWikiClient {
    /// Build a client for the configured API endpoint.
    pub fn new(config: &EncyclopediaConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WikicardsError::Service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
        })
    }

    /// Issue a GET against the API and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, what: &str, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(self.api_url.clone())
            .query(&[("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await
            .map_err(|e| WikicardsError::Service(format!("{what}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikicardsError::Service(format!("{what}: HTTP {status}")));
        }

        response
            .json()
            .await
            .map_err(|e| WikicardsError::Service(format!("{what}: invalid response body: {e}")))
    }

    /// `action=query` request, unwrapped to its `query` payload.
    async fn query<Q: DeserializeOwned>(&self, what: &str, params: &[(&str, &str)]) -> Result<Q> {
        let params = [&[("action", "query")][..], params].concat();
        let envelope: Envelope<Q> = self.get(what, &params).await?;
        envelope.into_query(what)
    }

    /// List the article titles a disambiguation page points to, in the
    /// order the page lists them.
    async fn disambiguation_options(&self, title: &str) -> Result<Vec<String>> {
        let what = format!("options of '{title}'");
        let envelope: ParseEnvelope = self
            .get(
                &what,
                &[
                    ("action", "parse"),
                    ("page", title),
                    ("prop", "text"),
                    ("redirects", "1"),
                    ("disableeditsection", "1"),
                ],
            )
            .await?;

        api::disambiguation_links(&envelope.into_html(&what)?)
    }
}

#[async_trait]
impl Encyclopedia for MediaWikiClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<String>> {
        let limit = limit.to_string();
        let result: SearchQuery = self
            .query(
                &format!("search '{query}'"),
                &[
                    ("list", "search"),
                    ("srsearch", query),
                    ("srlimit", limit.as_str()),
                    ("srprop", ""),
                ],
            )
            .await?;

        let titles: Vec<String> = result.search.into_iter().map(|hit| hit.title).collect();
        debug!(count = titles.len(), "search returned titles");
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, title: &str, exact_title: bool) -> Result<Page> {
        let resolved = if exact_title {
            title.to_string()
        } else {
            self.search(title, 1)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| WikicardsError::PageMissing {
                    title: title.to_string(),
                })?
        };

        let query: PagesQuery = self
            .query(
                &format!("fetch '{resolved}'"),
                &[
                    ("prop", "extracts|pageprops"),
                    ("explaintext", "1"),
                    ("ppprop", "disambiguation"),
                    ("redirects", "1"),
                    ("titles", resolved.as_str()),
                ],
            )
            .await?;

        let page = query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| WikicardsError::PageMissing {
                title: resolved.clone(),
            })?;

        if page.missing || page.invalid {
            return Err(WikicardsError::PageMissing { title: resolved });
        }

        if page.is_disambiguation() {
            let options = self.disambiguation_options(&page.title).await?;
            debug!(title = %page.title, options = options.len(), "title is a disambiguation page");
            return Err(WikicardsError::Disambiguation {
                title: page.title,
                options,
            });
        }

        Ok(Page {
            title: page.title,
            content: page.extract.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> MediaWikiClient {
        let config = EncyclopediaConfig {
            api_url: Url::parse(&format!("{}/w/api.php", server.uri())).unwrap(),
            search_limit: 10,
            timeout_secs: 5,
        };
        MediaWikiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_preserves_ranking() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "Quantum computing"))
            .and(query_param("srlimit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"query":{"search":[{"title":"Quantum computing"},{"title":"Qubit"},{"title":"Quantum supremacy"}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let titles = client.search("Quantum computing", 10).await.unwrap();
        assert_eq!(titles, vec!["Quantum computing", "Qubit", "Quantum supremacy"]);
    }

    #[tokio::test]
    async fn test_search_http_error_is_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.search("anything", 10).await.unwrap_err();
        assert!(matches!(err, WikicardsError::Service(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_page_follows_redirect_title() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("prop", "extracts|pageprops"))
            .and(query_param("titles", "QC"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"query":{"redirects":[{"from":"QC","to":"Quantum computing"}],"pages":[{"pageid":25220,"ns":0,"title":"Quantum computing","extract":"A quantum computer is a computer that exploits quantum mechanical phenomena."}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page = client.fetch_page("QC", true).await.unwrap();
        assert_eq!(page.title, "Quantum computing");
        assert!(page.content.starts_with("A quantum computer"));
    }

    #[tokio::test]
    async fn test_fetch_missing_page() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("titles", "Nonexistent article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"query":{"pages":[{"ns":0,"title":"Nonexistent article","missing":true}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_page("Nonexistent article", true).await.unwrap_err();
        match err {
            WikicardsError::PageMissing { title } => assert_eq!(title, "Nonexistent article"),
            other => panic!("expected PageMissing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_disambiguation_lists_options() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("prop", "extracts|pageprops"))
            .and(query_param("titles", "Mercury"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"query":{"pages":[{"pageid":19,"ns":0,"title":"Mercury","extract":"Mercury may refer to:","pageprops":{"disambiguation":""}}]}}"#,
            ))
            .mount(&server)
            .await;

        // Page order deliberately differs from alphabetical order.
        Mock::given(method("GET"))
            .and(query_param("action", "parse"))
            .and(query_param("page", "Mercury"))
            .and(query_param("prop", "text"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"parse":{"title":"Mercury","pageid":19,"text":"<div class=\"mw-parser-output\"><p>Mercury may refer to:</p><ul><li><a href=\"/wiki/Mercury_(planet)\" title=\"Mercury (planet)\">Mercury (planet)</a>, a planet</li><li><a href=\"/wiki/Mercury_(element)\" title=\"Mercury (element)\">Mercury (element)</a>, a metal</li></ul></div>"}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_page("Mercury", true).await.unwrap_err();
        match err {
            WikicardsError::Disambiguation { title, options } => {
                assert_eq!(title, "Mercury");
                assert_eq!(options, vec!["Mercury (planet)", "Mercury (element)"]);
            }
            other => panic!("expected Disambiguation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_inexact_resolves_through_search() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("list", "search"))
            .and(query_param("srsearch", "ada lovelace"))
            .and(query_param("srlimit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"query":{"search":[{"title":"Ada Lovelace"}]}}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("prop", "extracts|pageprops"))
            .and(query_param("titles", "Ada Lovelace"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"query":{"pages":[{"pageid":974,"ns":0,"title":"Ada Lovelace","extract":"Augusta Ada King, Countess of Lovelace, was an English mathematician."}]}}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let page = client.fetch_page("ada lovelace", false).await.unwrap();
        assert_eq!(page.title, "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_malformed_body_is_service_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_page("Anything", true).await.unwrap_err();
        assert!(matches!(err, WikicardsError::Service(_)));
    }
}
