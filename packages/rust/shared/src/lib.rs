//! Shared types, error model, and configuration for wikicards.
//!
//! This crate is the foundation depended on by all other wikicards crates.
//! It provides:
//! - [`WikicardsError`], the unified error type
//! - Domain types ([`Article`], [`SearchResult`], [`Flashcard`], [`FlashcardSet`], [`RunId`])
//! - The [`OutputContract`] trait for structured language-model output
//! - Configuration ([`AppConfig`], config loading, API key resolution)

pub mod config;
pub mod contract;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, EncyclopediaConfig, LlmConfig, config_dir, config_file_path,
    load_config, load_config_from, resolve_api_key,
};
pub use contract::OutputContract;
pub use error::{Result, WikicardsError};
pub use types::{
    Article, Flashcard, FlashcardSet, MAX_ARTICLES, MAX_FLASHCARDS, MAX_SUMMARY_WORDS,
    MIN_ARTICLE_CHARS, MIN_ARTICLES, MIN_FLASHCARDS, MIN_SUMMARY_WORDS, RunId, SearchResult,
    word_count,
};
