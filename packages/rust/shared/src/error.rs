//! Error types for wikicards.
//!
//! Library crates use [`WikicardsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all wikicards operations.
#[derive(Debug, thiserror::Error)]
pub enum WikicardsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Encyclopedia search/fetch transport failure.
    #[error("service error: {0}")]
    Service(String),

    /// Fewer qualifying articles than a run needs.
    #[error(
        "could not find enough substantial articles for '{query}': found {found} article(s), need at least 2"
    )]
    NotFound { query: String, found: usize },

    /// The requested title resolves to several distinct pages.
    #[error("'{title}' is ambiguous ({} options)", .options.len())]
    Disambiguation { title: String, options: Vec<String> },

    /// The requested title does not exist.
    #[error("page not found: '{title}'")]
    PageMissing { title: String },

    /// Language-model invocation error (transport, API, or response shape).
    #[error("language model error: {0}")]
    Model(String),

    /// Flashcard generation failed; wraps the underlying cause.
    #[error("flashcard generation failed: {source}")]
    Generation {
        #[source]
        source: Box<WikicardsError>,
    },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty query, contract violation, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WikicardsError>;

impl WikicardsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap any error as a flashcard generation failure.
    pub fn generation(source: WikicardsError) -> Self {
        Self::Generation {
            source: Box::new(source),
        }
    }

    /// Errors that are reported to the user as a one-line message rather than
    /// a full diagnostic.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Validation { .. })
    }
}
