//! End-to-end pipeline: query → articles → summary → flashcards → document.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, instrument};

use wikicards_encyclopedia::Encyclopedia;
use wikicards_llm::LanguageModel;
use wikicards_shared::{Result, RunId, SearchResult, WikicardsError, word_count};

use crate::document;
use crate::flashcards::FlashcardGenerator;
use crate::retriever::ArticleRetriever;
use crate::summarizer::{Summarizer, preview};

/// Characters of each article echoed to the log.
const ARTICLE_PREVIEW_CHARS: usize = 200;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Topic to build flashcards for.
    pub query: String,
    /// Directory the document is written to (created if absent).
    pub output_dir: PathBuf,
    /// Number of candidate titles requested from the search.
    pub search_limit: u32,
}

/// External services the pipeline calls, injected by the caller.
pub struct Collaborators<'a> {
    pub encyclopedia: &'a dyn Encyclopedia,
    pub summary_model: &'a dyn LanguageModel,
    pub flashcards_model: &'a dyn LanguageModel,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    /// Absolute path of the written document.
    pub output_path: PathBuf,
    /// Titles of the articles the summary was built from.
    pub article_titles: Vec<String>,
    pub summary_words: usize,
    pub flashcard_count: usize,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run all three stages and persist the document.
///
/// Nothing is written unless every stage succeeds.
#[instrument(skip_all, fields(run_id, query = %config.query))]
pub async fn run(
    config: &RunConfig,
    collaborators: &Collaborators<'_>,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();
    let run_id = RunId::new();
    tracing::Span::current().record("run_id", tracing::field::display(&run_id));

    let query = validate_query(&config.query)?;
    info!("starting flashcard pipeline");

    // --- Stage 1: Article retrieval ---
    progress.phase("Searching encyclopedia");
    let result = ArticleRetriever::new(collaborators.encyclopedia, config.search_limit)
        .retrieve(query)
        .await?;
    log_articles(&result);

    let combined_text = result.combined_text();
    info!(chars = combined_text.chars().count(), "articles concatenated");

    // --- Stage 2: Summary ---
    progress.phase("Generating summary");
    let summary = Summarizer::new(collaborators.summary_model)
        .summarize(&combined_text)
        .await?;

    // --- Stage 3: Flashcards ---
    progress.phase("Generating flashcards");
    let set = FlashcardGenerator::new(collaborators.flashcards_model)
        .generate(&summary)
        .await?;

    // --- Persist ---
    progress.phase("Writing flashcards");
    let timestamp = chrono::Local::now().naive_local();
    let output_path = document::write_document(&config.output_dir, query, &set, timestamp)?;

    let report = RunReport {
        run_id,
        output_path,
        article_titles: result.articles().iter().map(|a| a.title.clone()).collect(),
        summary_words: word_count(&summary),
        flashcard_count: set.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&report);

    info!(
        articles = report.article_titles.len(),
        flashcards = report.flashcard_count,
        output = %report.output_path.display(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "pipeline complete"
    );

    Ok(report)
}

/// Run only the article retrieval stage.
#[instrument(skip_all, fields(query = %config.query))]
pub async fn search_only(
    config: &RunConfig,
    encyclopedia: &dyn Encyclopedia,
    progress: &dyn ProgressReporter,
) -> Result<SearchResult> {
    let query = validate_query(&config.query)?;

    progress.phase("Searching encyclopedia");
    let result = ArticleRetriever::new(encyclopedia, config.search_limit)
        .retrieve(query)
        .await?;
    log_articles(&result);

    Ok(result)
}

fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(WikicardsError::validation("query must not be empty"));
    }
    Ok(trimmed)
}

fn log_articles(result: &SearchResult) {
    for (i, article) in result.articles().iter().enumerate() {
        info!(
            n = i + 1,
            title = %article.title,
            chars = article.char_count(),
            head = %preview(&article.content, ARTICLE_PREVIEW_CHARS),
            "article"
        );
    }
    info!(
        articles = result.articles().len(),
        total_chars = result.total_chars(),
        "retrieval stage complete"
    );
}
