//! In-memory collaborators for stage and pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use wikicards_encyclopedia::{Encyclopedia, Page};
use wikicards_llm::LanguageModel;
use wikicards_shared::{Result, WikicardsError};

/// Body text of exactly `len` characters.
pub(crate) fn body(len: usize) -> String {
    "lorem ipsum ".chars().cycle().take(len).collect()
}

enum Entry {
    Article { title: String, content: String },
    Disambiguation(Vec<String>),
    Missing,
    Broken,
}

/// Scripted [`Encyclopedia`]: fixed search results plus per-title fetch outcomes.
#[derive(Default)]
pub(crate) struct FakeEncyclopedia {
    results: Vec<String>,
    entries: HashMap<String, Entry>,
    search_fails: bool,
    fetched: Mutex<Vec<String>>,
}

impl FakeEncyclopedia {
    pub fn new(results: &[&str]) -> Self {
        Self {
            results: results.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_search() -> Self {
        Self {
            search_fails: true,
            ..Self::default()
        }
    }

    /// `title` resolves to an article of `len` characters under the same title.
    pub fn article(self, title: &str, len: usize) -> Self {
        self.redirect(title, title, len)
    }

    /// `title` resolves to an article of `len` characters titled `canonical`.
    pub fn redirect(mut self, title: &str, canonical: &str, len: usize) -> Self {
        self.entries.insert(
            title.into(),
            Entry::Article {
                title: canonical.into(),
                content: body(len),
            },
        );
        self
    }

    pub fn disambiguation(mut self, title: &str, options: &[&str]) -> Self {
        self.entries.insert(
            title.into(),
            Entry::Disambiguation(options.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn missing(mut self, title: &str) -> Self {
        self.entries.insert(title.into(), Entry::Missing);
        self
    }

    pub fn broken(mut self, title: &str) -> Self {
        self.entries.insert(title.into(), Entry::Broken);
        self
    }

    /// Titles passed to `fetch_page`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encyclopedia for FakeEncyclopedia {
    async fn search(&self, _query: &str, limit: u32) -> Result<Vec<String>> {
        if self.search_fails {
            return Err(WikicardsError::Service("connection refused".into()));
        }
        Ok(self.results.iter().take(limit as usize).cloned().collect())
    }

    async fn fetch_page(&self, title: &str, _exact_title: bool) -> Result<Page> {
        self.fetched.lock().unwrap().push(title.to_string());
        match self.entries.get(title) {
            Some(Entry::Article { title, content }) => Ok(Page {
                title: title.clone(),
                content: content.clone(),
            }),
            Some(Entry::Disambiguation(options)) => Err(WikicardsError::Disambiguation {
                title: title.to_string(),
                options: options.clone(),
            }),
            Some(Entry::Broken) => Err(WikicardsError::Service(format!("{title}: HTTP 502"))),
            Some(Entry::Missing) | None => Err(WikicardsError::PageMissing {
                title: title.to_string(),
            }),
        }
    }
}

/// Scripted [`LanguageModel`] that records the prompts it receives.
pub(crate) struct FakeModel {
    text: Option<String>,
    json: Option<Value>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeModel {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            json: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn json(value: Value) -> Self {
        Self {
            text: None,
            json: Some(value),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a backend error.
    pub fn failing() -> Self {
        Self {
            text: None,
            json: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(system, user)` pairs received so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    fn model_id(&self) -> &str {
        "fake"
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.text
            .clone()
            .ok_or_else(|| WikicardsError::Model("HTTP 500 Internal Server Error: boom".into()))
    }

    async fn complete_json(
        &self,
        system: &str,
        user: &str,
        _schema_name: &str,
        _schema: &Value,
    ) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.json
            .clone()
            .ok_or_else(|| WikicardsError::Model("HTTP 500 Internal Server Error: boom".into()))
    }
}

/// A structured flashcard response with `count` cards.
pub(crate) fn flashcards_json(count: usize) -> Value {
    let cards: Vec<Value> = (1..=count)
        .map(|i| {
            json!({
                "question": format!("What is fact {i}?"),
                "answer": format!("Fact {i} is a thing."),
            })
        })
        .collect();
    json!({ "flashcards": cards })
}
