//! CLI definition, tracing setup, and the run entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use wikicards_core::pipeline::{self, Collaborators, ProgressReporter, RunConfig, RunReport};
use wikicards_encyclopedia::MediaWikiClient;
use wikicards_llm::OpenAiClient;
use wikicards_shared::{AppConfig, load_config, load_config_from, resolve_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wikicards: build study flashcards from encyclopedia articles.
#[derive(Parser)]
#[command(
    name = "wikicards",
    version,
    about = "Summarize encyclopedia articles on a topic and turn them into Q/A flashcards.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Topic to study (multiple words are joined with spaces).
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Only retrieve and list the articles; no summary, no flashcards.
    #[arg(long)]
    pub search_only: bool,

    /// Output directory for the flashcard document (defaults to config, `tmp`).
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Model id used for both the summary and the flashcards.
    #[arg(short, long, value_name = "ID")]
    pub model: Option<String>,

    /// Config file to use instead of ~/.wikicards/wikicards.toml.
    #[arg(long, value_name = "PATH", env = "WIKICARDS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

impl Cli {
    /// The query words joined with single spaces, or `None` when empty.
    fn joined_query(&self) -> Option<String> {
        let query = self.query.join(" ");
        let query = query.trim();
        (!query.is_empty()).then(|| query.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout only
/// carries results.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wikicards=info",
        1 => "wikicards=debug",
        _ => "wikicards=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run the CLI. User-facing failures print one line and exit 1; anything
/// else is returned as a report with its full cause chain.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let Some(query) = cli.joined_query() else {
        eprintln!("{}", Cli::command().render_usage());
        return Ok(ExitCode::FAILURE);
    };

    // Credentials may live in a local .env; read it once, before anything
    // looks up the key.
    check_dotenv(dotenvy::dotenv().map(|path| debug!(path = %path.display(), ".env loaded")));

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let run_config = RunConfig {
        query,
        output_dir: cli
            .out
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.defaults.output_dir)),
        search_limit: config.encyclopedia.search_limit,
    };

    let outcome = if cli.search_only {
        cmd_search_only(&run_config, &config).await
    } else {
        cmd_generate(&run_config, &config, cli.model.as_deref()).await
    };

    exit_code(outcome)
}

/// Map a run outcome to the process exit code. User-facing errors become a
/// single `error:` line and exit 1; the rest propagate as a report.
fn exit_code(outcome: wikicards_shared::Result<()>) -> Result<ExitCode> {
    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_user_facing() => {
            error!(error = %e, "run aborted");
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            error!(error = %e, "run failed");
            Err(e.into())
        }
    }
}

/// State of the local `.env` file after a load attempt.
#[derive(Debug, PartialEq, Eq)]
enum DotenvFile {
    Loaded,
    Absent,
    Unreadable,
}

/// A missing `.env` is normal; anything else is worth a warning since the
/// key lookup that follows would otherwise fail without explanation.
fn check_dotenv(result: std::result::Result<(), dotenvy::Error>) -> DotenvFile {
    match result {
        Ok(()) => DotenvFile::Loaded,
        Err(e) if e.not_found() => DotenvFile::Absent,
        Err(e) => {
            warn!(error = %e, "could not load .env file");
            DotenvFile::Unreadable
        }
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_generate(
    run_config: &RunConfig,
    config: &AppConfig,
    model_override: Option<&str>,
) -> wikicards_shared::Result<()> {
    let api_key = resolve_api_key(&config.llm)?;

    let summary_model_id = model_override.unwrap_or(config.llm.summary_model.as_str());
    let flashcards_model_id = model_override.unwrap_or(config.llm.flashcards_model.as_str());

    let encyclopedia = MediaWikiClient::new(&config.encyclopedia)?;
    let summary_model = OpenAiClient::new(&config.llm, api_key.as_str(), summary_model_id)?;
    let flashcards_model = OpenAiClient::new(&config.llm, api_key, flashcards_model_id)?;

    info!(
        query = %run_config.query,
        summary_model = summary_model_id,
        flashcards_model = flashcards_model_id,
        out = %run_config.output_dir.display(),
        "generating flashcards"
    );

    let collaborators = Collaborators {
        encyclopedia: &encyclopedia,
        summary_model: &summary_model,
        flashcards_model: &flashcards_model,
    };

    let reporter = CliProgress::new();
    let report = pipeline::run(run_config, &collaborators, &reporter).await?;
    drop(reporter);

    println!();
    println!("  Flashcards created successfully!");
    println!("  Topic:      {}", run_config.query);
    println!("  Articles:   {}", report.article_titles.join(", "));
    println!("  Summary:    {} words", report.summary_words);
    println!("  Flashcards: {}", report.flashcard_count);
    println!("  Path:       {}", report.output_path.display());
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_search_only(
    run_config: &RunConfig,
    config: &AppConfig,
) -> wikicards_shared::Result<()> {
    let encyclopedia = MediaWikiClient::new(&config.encyclopedia)?;

    let reporter = CliProgress::new();
    let result = pipeline::search_only(run_config, &encyclopedia, &reporter).await?;
    drop(reporter);

    println!();
    println!("  Articles for '{}':", run_config.query);
    for (i, article) in result.articles().iter().enumerate() {
        println!("  {}. {} ({} chars)", i + 1, article.title, article.char_count());
    }
    println!("  Total: {} chars", result.total_chars());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner on stderr that shows the current pipeline phase.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}

// Failed runs never reach `done`.
impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikicards_shared::WikicardsError;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("wc-cli-test-{}", std::process::id()))
    }

    fn status(code: ExitCode) -> String {
        format!("{code:?}")
    }

    #[test]
    fn query_words_are_joined() {
        let cli = Cli::parse_from(["wikicards", "Ada", "Lovelace"]);
        assert_eq!(cli.joined_query().as_deref(), Some("Ada Lovelace"));
        assert!(!cli.search_only);
    }

    #[test]
    fn missing_query_is_none() {
        let cli = Cli::parse_from(["wikicards"]);
        assert_eq!(cli.joined_query(), None);

        let cli = Cli::parse_from(["wikicards", "  "]);
        assert_eq!(cli.joined_query(), None);
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from([
            "wikicards",
            "--search-only",
            "--out",
            "cards",
            "--model",
            "gpt-4o-mini",
            "-vv",
            "--log-format",
            "json",
            "Quantum",
            "computing",
        ]);
        assert!(cli.search_only);
        assert_eq!(cli.out, Some(PathBuf::from("cards")));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.log_format, LogFormat::Json));
        assert_eq!(cli.joined_query().as_deref(), Some("Quantum computing"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn empty_query_exits_with_failure() {
        let code = run(Cli::parse_from(["wikicards"])).await.unwrap();
        assert_eq!(status(code), status(ExitCode::FAILURE));
    }

    #[test]
    fn not_found_exits_with_failure() {
        let outcome = Err(WikicardsError::NotFound {
            query: "Obscure topic".into(),
            found: 1,
        });
        assert_eq!(status(exit_code(outcome).unwrap()), status(ExitCode::FAILURE));
    }

    #[test]
    fn success_exits_cleanly() {
        assert_eq!(status(exit_code(Ok(())).unwrap()), status(ExitCode::SUCCESS));
    }

    #[test]
    fn internal_errors_become_reports() {
        let outcome = Err(WikicardsError::generation(WikicardsError::Model(
            "HTTP 500 Internal Server Error: boom".into(),
        )));
        let report = exit_code(outcome).unwrap_err();
        assert!(report.to_string().contains("flashcard generation failed"));
    }

    #[test]
    fn dotenv_outcomes() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();

        let missing = dir.join("missing.env");
        assert_eq!(check_dotenv(dotenvy::from_path(&missing)), DotenvFile::Absent);

        let malformed = dir.join("malformed.env");
        std::fs::write(&malformed, "WC_CLI_TEST_KEY='unterminated\n").unwrap();
        assert_eq!(check_dotenv(dotenvy::from_path(&malformed)), DotenvFile::Unreadable);

        let valid = dir.join("valid.env");
        std::fs::write(&valid, "WC_CLI_TEST_VALID=1\n").unwrap();
        assert_eq!(check_dotenv(dotenvy::from_path(&valid)), DotenvFile::Loaded);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
