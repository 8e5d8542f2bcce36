//! Flashcard stage: convert a summary into 20-50 question/answer cards.

use tracing::{error, info, instrument, warn};

use wikicards_llm::{LanguageModel, complete_structured};
use wikicards_shared::{
    FlashcardSet, MAX_FLASHCARDS, MIN_FLASHCARDS, Result, WikicardsError, word_count,
};

/// System instruction for the flashcard model.
pub const FLASHCARD_INSTRUCTION: &str = "\
You are an expert educational content creator specializing in flashcard design.
Your role is to convert comprehensive summaries into effective learning flashcards.

Your task:
- Read the provided summary carefully
- Create 20-50 flashcards that test understanding of the material
- Each flashcard should have:
  - A clear, unambiguous question
  - A concise answer (1-3 sentences maximum)

Guidelines for creating effective flashcards:
1. Coverage: cover the breadth of the summary and touch on all major topics and subtopics
2. Variety: mix different question types:
   - Definitions: \"What is X?\"
   - Causes/effects: \"Why does X happen?\"
   - Comparisons: \"How does X differ from Y?\"
   - Timeline/chronology: \"When did X occur?\"
   - Examples: \"What is an example of X?\"
   - Relationships: \"How does X relate to Y?\"
3. Clarity: make questions specific and unambiguous
4. Precision: keep answers focused and accurate, without unnecessary detail
5. No duplicates: don't ask the same thing multiple times in different ways
6. Test understanding: go beyond rote memorization and test comprehension and application

Quality standards:
- Questions should be self-contained (understandable without the answer)
- Answers should be complete but concise (1-3 sentences)
- Avoid yes/no questions unless they include explanation
- Use proper grammar and punctuation
- Do not add information that is not present in the summary

Target: generate 20-50 flashcards. Aim for comprehensiveness while maintaining quality.";

/// Number of cards echoed to the log after generation.
const SAMPLE_CARDS: usize = 3;

/// Turns a summary into a [`FlashcardSet`] via a structured model call.
pub struct FlashcardGenerator<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> FlashcardGenerator<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    /// Generate flashcards for `summary`.
    ///
    /// Any model or contract failure is wrapped in
    /// [`WikicardsError::Generation`]. A count outside 20-50 is logged and the
    /// set is returned as is.
    #[instrument(skip_all, fields(model = %self.model.model_id()))]
    pub async fn generate(&self, summary: &str) -> Result<FlashcardSet> {
        info!(
            chars = summary.chars().count(),
            words = word_count(summary),
            "generating flashcards"
        );

        let set: FlashcardSet = complete_structured(self.model, FLASHCARD_INSTRUCTION, summary)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to generate flashcards");
                WikicardsError::generation(e)
            })?;

        let count = set.len();
        info!(count, "flashcards generated");

        if count < MIN_FLASHCARDS {
            warn!(count, expected = "20-50", "fewer flashcards than expected");
        } else if count > MAX_FLASHCARDS {
            warn!(count, expected = "20-50", "more flashcards than expected");
        } else {
            info!(count, "flashcard count within target range");
        }

        for (i, card) in set.flashcards.iter().take(SAMPLE_CARDS).enumerate() {
            info!(n = i + 1, question = %card.question, answer = %card.answer, "sample flashcard");
        }
        if count > SAMPLE_CARDS {
            info!(remaining = count - SAMPLE_CARDS, "more flashcards not shown");
        }

        Ok(set)
    }
}
