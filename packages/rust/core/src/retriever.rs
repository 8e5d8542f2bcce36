//! Article retrieval: search the encyclopedia and pick 2-3 substantive articles.
//!
//! Candidates are tried in the service's ranking order. A fetch that hits a
//! disambiguation page gets exactly one fallback (the first listed option);
//! missing pages and other fetch failures skip the candidate. Every fetched
//! page must pass the acceptance filter (no stubs, no list/index/portal/category
//! pages) before it is kept.

use tracing::{debug, error, info, instrument, warn};

use wikicards_encyclopedia::{Encyclopedia, Page};
use wikicards_shared::{
    Article, MAX_ARTICLES, MIN_ARTICLE_CHARS, MIN_ARTICLES, Result, SearchResult, WikicardsError,
};

/// Lower-cased title fragments that mark meta / non-article pages.
const META_TITLE_MARKERS: [&str; 4] = ["list of", "index of", "portal:", "category:"];

/// Why a fetched page was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Content shorter than [`MIN_ARTICLE_CHARS`].
    Stub { chars: usize },
    /// Title contains a meta-page marker.
    MetaPage { marker: &'static str },
    /// The same article was already accepted (e.g. via a disambiguation fallback).
    Duplicate,
}

/// Apply the acceptance filter to a fetched page.
pub fn rejection_reason(title: &str, content: &str) -> Option<Rejection> {
    let chars = content.chars().count();
    if chars < MIN_ARTICLE_CHARS {
        return Some(Rejection::Stub { chars });
    }

    let lowered = title.to_lowercase();
    META_TITLE_MARKERS
        .into_iter()
        .find(|marker| lowered.contains(marker))
        .map(|marker| Rejection::MetaPage { marker })
}

/// Selects articles for a query from an [`Encyclopedia`].
pub struct ArticleRetriever<'a> {
    encyclopedia: &'a dyn Encyclopedia,
    search_limit: u32,
}

impl<'a> ArticleRetriever<'a> {
    pub fn new(encyclopedia: &'a dyn Encyclopedia, search_limit: u32) -> Self {
        Self {
            encyclopedia,
            search_limit,
        }
    }

    /// Retrieve 2-3 qualifying articles for `query`, in acceptance order.
    ///
    /// Fails with [`WikicardsError::NotFound`] when fewer than two qualify and
    /// propagates [`WikicardsError::Service`] if the search itself fails.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn retrieve(&self, query: &str) -> Result<SearchResult> {
        info!(limit = self.search_limit, "searching encyclopedia");

        let candidates = self
            .encyclopedia
            .search(query, self.search_limit)
            .await
            .inspect_err(|e| error!(error = %e, "encyclopedia search failed"))?;

        info!(count = candidates.len(), ?candidates, "search returned candidates");

        if candidates.is_empty() {
            warn!("no search results found");
            return Err(WikicardsError::NotFound {
                query: query.to_string(),
                found: 0,
            });
        }

        let mut articles: Vec<Article> = Vec::new();

        for candidate in &candidates {
            if articles.len() >= MAX_ARTICLES {
                break;
            }

            let Some(page) = self.fetch_candidate(candidate).await else {
                continue;
            };

            let rejection = if articles.iter().any(|a| a.title == page.title) {
                Some(Rejection::Duplicate)
            } else {
                rejection_reason(&page.title, &page.content)
            };

            match rejection {
                Some(reason) => {
                    debug!(title = %page.title, ?reason, "skipping page");
                }
                None => {
                    let article = Article::new(page.title, page.content);
                    info!(
                        title = %article.title,
                        chars = article.char_count(),
                        "added article"
                    );
                    articles.push(article);
                }
            }
        }

        if articles.len() < MIN_ARTICLES {
            error!(
                found = articles.len(),
                needed = MIN_ARTICLES,
                "not enough substantial articles"
            );
            return Err(WikicardsError::NotFound {
                query: query.to_string(),
                found: articles.len(),
            });
        }

        let result = SearchResult::new(articles)?;
        info!(
            count = result.articles().len(),
            total_chars = result.total_chars(),
            "retrieval complete"
        );
        Ok(result)
    }

    /// Fetch one candidate, applying the single-fallback disambiguation policy.
    /// Returns `None` when the candidate should be skipped.
    async fn fetch_candidate(&self, title: &str) -> Option<Page> {
        debug!(%title, "fetching page");

        match self.encyclopedia.fetch_page(title, true).await {
            Ok(page) => Some(page),
            Err(WikicardsError::Disambiguation { options, .. }) => {
                debug!(
                    %title,
                    options = ?options.iter().take(3).collect::<Vec<_>>(),
                    "title is ambiguous"
                );
                let Some(first) = options.first() else {
                    debug!(%title, "disambiguation page lists no options");
                    return None;
                };
                debug!(%title, option = %first, "trying first disambiguation option");
                match self.encyclopedia.fetch_page(first, true).await {
                    Ok(page) => Some(page),
                    Err(e) => {
                        debug!(option = %first, error = %e, "disambiguation option failed");
                        None
                    }
                }
            }
            Err(WikicardsError::PageMissing { .. }) => {
                debug!(%title, "page not found");
                None
            }
            Err(e) => {
                warn!(%title, error = %e, "unexpected error fetching page");
                None
            }
        }
    }
}
