//! Summary stage: synthesize the retrieved articles into one narrative.

use tracing::{info, instrument, warn};

use wikicards_llm::LanguageModel;
use wikicards_shared::{MAX_SUMMARY_WORDS, MIN_SUMMARY_WORDS, Result, word_count};

/// System instruction for the summary model.
pub const SUMMARY_INSTRUCTION: &str = "\
You are an expert educational content synthesizer. Your role is to analyze \
multiple encyclopedia articles and create a comprehensive, coherent summary for learning purposes.

Your task:
- Read the provided articles (they are separated with headers and dividers)
- Synthesize the information into a single, well-structured narrative
- Output should be 500-1500 words in length
- Cover key facts, definitions, relationships, and chronology where applicable
- Include notable controversies or open questions if relevant
- Write in a clear, readable style suitable for educational flashcards
- Avoid bullet points unless necessary; aim for flowing, coherent paragraphs
- Be comprehensive but concise and capture the essential information

The summary will be used to generate educational flashcards, so make sure you cover:
- Core concepts and definitions
- Important relationships and connections
- Key historical developments or timeline events
- Notable examples or applications
- Contrasting viewpoints or debates (if any)

Write as a domain expert explaining the topic to an interested learner.";

/// Characters shown in the logged summary preview.
const PREVIEW_CHARS: usize = 300;

/// Rough characters-per-token ratio used for the input size estimate.
const CHARS_PER_TOKEN: usize = 4;

/// Turns combined article text into a free-form summary.
pub struct Summarizer<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> Summarizer<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    /// Summarize `combined_text`. The model's reply is returned verbatim; model
    /// errors propagate unchanged. Word counts outside 500-1500 only warn.
    #[instrument(skip_all, fields(model = %self.model.model_id()))]
    pub async fn summarize(&self, combined_text: &str) -> Result<String> {
        let input_chars = combined_text.chars().count();
        info!(
            input_chars,
            approx_tokens = input_chars / CHARS_PER_TOKEN,
            "generating summary"
        );

        let summary = self
            .model
            .complete(SUMMARY_INSTRUCTION, combined_text)
            .await
            .inspect_err(|e| warn!(error = %e, "summary generation failed"))?;

        let words = word_count(&summary);
        info!(chars = summary.chars().count(), words, "summary generated");

        if words < MIN_SUMMARY_WORDS {
            warn!(words, expected = "500-1500", "summary is shorter than expected");
        } else if words > MAX_SUMMARY_WORDS {
            warn!(words, expected = "500-1500", "summary is longer than expected");
        } else {
            info!(words, "summary word count within target range");
        }

        info!(preview = %preview(&summary, PREVIEW_CHARS), "summary preview");

        Ok(summary)
    }
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
