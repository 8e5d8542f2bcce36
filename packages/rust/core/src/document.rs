//! Flashcard document rendering and persistence.
//!
//! Renders a [`FlashcardSet`] as a Markdown study sheet and writes it to
//! `<output_dir>/flashcards_<slug>_<YYYYMMDD_HHMM>.md`.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, instrument};

use wikicards_shared::{FlashcardSet, Result, WikicardsError};

/// Maximum slug length in characters.
const MAX_SLUG_CHARS: usize = 50;

/// Derive the filename slug: lower-cased, spaces to hyphens, at most 50 chars.
/// Other punctuation is kept as is.
pub fn slugify(query: &str) -> String {
    query
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect()
}

/// File name for a document generated for `query` at `timestamp`.
pub fn file_name(query: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "flashcards_{}_{}.md",
        slugify(query),
        timestamp.format("%Y%m%d_%H%M")
    )
}

/// Render the Markdown document. Output depends only on the arguments.
pub fn render(query: &str, set: &FlashcardSet, timestamp: NaiveDateTime) -> String {
    let mut doc = String::new();
    let _ = write!(
        doc,
        "# Flashcards: {query}\n\nGenerated on: {}\n\n---\n\n",
        timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    for (i, card) in set.flashcards.iter().enumerate() {
        let _ = write!(
            doc,
            "## Flashcard {}\n\n**Q:** {}\n\n**A:** {}\n\n---\n\n",
            i + 1,
            card.question,
            card.answer
        );
    }

    doc
}

/// Render and write the document, creating `output_dir` if needed.
/// Returns the absolute path of the written file.
#[instrument(skip_all, fields(query = %query, cards = set.len()))]
pub fn write_document(
    output_dir: &Path,
    query: &str,
    set: &FlashcardSet,
    timestamp: NaiveDateTime,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| WikicardsError::io(output_dir, e))?;

    let path = output_dir.join(file_name(query, timestamp));
    let content = render(query, set, timestamp);
    std::fs::write(&path, &content).map_err(|e| WikicardsError::io(&path, e))?;

    let path = std::path::absolute(&path).map_err(|e| WikicardsError::io(&path, e))?;
    info!(path = %path.display(), chars = content.chars().count(), "flashcards saved");

    Ok(path)
}
