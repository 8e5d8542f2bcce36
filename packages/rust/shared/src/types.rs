//! Core domain types passed between the pipeline stages.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, WikicardsError};

/// Articles shorter than this many characters are treated as stubs.
pub const MIN_ARTICLE_CHARS: usize = 500;

/// Fewest articles a run can proceed with.
pub const MIN_ARTICLES: usize = 2;

/// Retrieval stops once this many articles are accepted.
pub const MAX_ARTICLES: usize = 3;

/// Target flashcard count range (inclusive).
pub const MIN_FLASHCARDS: usize = 20;
pub const MAX_FLASHCARDS: usize = 50;

/// Target summary word-count range (inclusive). Advisory only.
pub const MIN_SUMMARY_WORDS: usize = 500;
pub const MAX_SUMMARY_WORDS: usize = 1500;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Article / SearchResult
// ---------------------------------------------------------------------------

/// A single encyclopedia article with its plain-text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Canonical title of the article.
    pub title: String,
    /// Full plain-text content (no markup).
    pub content: String,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Content length in characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// The 2-3 articles selected for a query, in acceptance order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    articles: Vec<Article>,
}

impl SearchResult {
    /// Build a result, enforcing the `[MIN_ARTICLES, MAX_ARTICLES]` length.
    pub fn new(articles: Vec<Article>) -> Result<Self> {
        if !(MIN_ARTICLES..=MAX_ARTICLES).contains(&articles.len()) {
            return Err(WikicardsError::validation(format!(
                "a search result holds {MIN_ARTICLES}-{MAX_ARTICLES} articles, got {}",
                articles.len()
            )));
        }
        Ok(Self { articles })
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Total content length across all articles, in characters.
    pub fn total_chars(&self) -> usize {
        self.articles.iter().map(Article::char_count).sum()
    }

    /// Concatenate the articles into the summarizer input: each article as a
    /// titled section followed by a horizontal rule.
    pub fn combined_text(&self) -> String {
        let mut combined = String::new();
        for article in &self.articles {
            combined.push_str(&format!("# {}\n\n", article.title));
            combined.push_str(&format!("{}\n\n", article.content));
            combined.push_str("---\n\n");
        }
        combined
    }
}

// ---------------------------------------------------------------------------
// Flashcards
// ---------------------------------------------------------------------------

/// A single question/answer study card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// The question to ask.
    pub question: String,
    /// The answer (1-3 sentences).
    pub answer: String,
}

/// The structured output of the flashcard stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSet {
    pub flashcards: Vec<Flashcard>,
}

impl FlashcardSet {
    pub fn len(&self) -> usize {
        self.flashcards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flashcards.is_empty()
    }

    /// Whether the card count falls inside the target range.
    pub fn within_target(&self) -> bool {
        (MIN_FLASHCARDS..=MAX_FLASHCARDS).contains(&self.len())
    }
}

/// Whitespace-delimited word count, used for the advisory summary length check.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, len: usize) -> Article {
        Article::new(title, "x".repeat(len))
    }

    #[test]
    fn search_result_enforces_length() {
        assert!(SearchResult::new(vec![article("A", 600)]).is_err());
        assert!(SearchResult::new(vec![article("A", 600), article("B", 600)]).is_ok());
        assert!(
            SearchResult::new(vec![
                article("A", 600),
                article("B", 600),
                article("C", 600),
                article("D", 600),
            ])
            .is_err()
        );
    }

    #[test]
    fn combined_text_format() {
        let result = SearchResult::new(vec![
            Article::new("Alpha", "first body"),
            Article::new("Beta", "second body"),
        ])
        .unwrap();
        assert_eq!(
            result.combined_text(),
            "# Alpha\n\nfirst body\n\n---\n\n# Beta\n\nsecond body\n\n---\n\n"
        );
    }

    #[test]
    fn char_count_counts_code_points() {
        let a = Article::new("Zürich", "é".repeat(10));
        assert_eq!(a.char_count(), 10);
        assert_eq!(a.content.len(), 20);
    }

    #[test]
    fn flashcard_set_target_range() {
        let card = Flashcard {
            question: "Q?".into(),
            answer: "A.".into(),
        };
        let set = FlashcardSet {
            flashcards: vec![card.clone(); 20],
        };
        assert!(set.within_target());
        let set = FlashcardSet {
            flashcards: vec![card; 51],
        };
        assert!(!set.within_target());
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        assert_eq!(word_count("one two\nthree\t four  "), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn flashcard_set_deserializes() {
        let json = r#"{"flashcards":[{"question":"What is X?","answer":"X is Y."}]}"#;
        let set: FlashcardSet = serde_json::from_str(json).expect("deserialize");
        assert_eq!(set.len(), 1);
        assert_eq!(set.flashcards[0].answer, "X is Y.");
    }
}
