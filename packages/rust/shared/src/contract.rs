//! Output contracts for structured language-model responses.
//!
//! A contract pairs a JSON Schema (sent to the backend) with a validator that
//! runs on the decoded value before it reaches the caller.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{Result, WikicardsError};
use crate::types::{FlashcardSet, MAX_FLASHCARDS, MIN_FLASHCARDS};

/// A type that a language model can be asked to produce as structured JSON.
pub trait OutputContract: DeserializeOwned {
    /// Schema name reported to the backend.
    const NAME: &'static str;

    /// JSON Schema describing the expected response object.
    fn schema() -> Value;

    /// Checks that serde cannot express; runs after deserialization.
    fn validate(&self) -> Result<()>;
}

impl OutputContract for FlashcardSet {
    const NAME: &'static str = "flashcard_set";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "description": format!(
                        "List of {MIN_FLASHCARDS}-{MAX_FLASHCARDS} flashcards with Q/A pairs"
                    ),
                    "minItems": MIN_FLASHCARDS,
                    "maxItems": MAX_FLASHCARDS,
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The question to ask"
                            },
                            "answer": {
                                "type": "string",
                                "description": "The answer (1-3 sentences max)"
                            }
                        },
                        "required": ["question", "answer"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["flashcards"],
            "additionalProperties": false
        })
    }

    fn validate(&self) -> Result<()> {
        if self.flashcards.is_empty() {
            return Err(WikicardsError::validation("flashcard set is empty"));
        }
        for (i, card) in self.flashcards.iter().enumerate() {
            if card.question.trim().is_empty() {
                return Err(WikicardsError::validation(format!(
                    "flashcard {} has an empty question",
                    i + 1
                )));
            }
            if card.answer.trim().is_empty() {
                return Err(WikicardsError::validation(format!(
                    "flashcard {} has an empty answer",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Flashcard;

    fn card(q: &str, a: &str) -> Flashcard {
        Flashcard {
            question: q.into(),
            answer: a.into(),
        }
    }

    #[test]
    fn schema_carries_count_bounds() {
        let schema = FlashcardSet::schema();
        let items = &schema["properties"]["flashcards"];
        assert_eq!(items["minItems"], 20);
        assert_eq!(items["maxItems"], 50);
        assert_eq!(schema["required"][0], "flashcards");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        let set = FlashcardSet {
            flashcards: vec![card("What is X?", "Y."), card("  ", "Z.")],
        };
        let err = set.validate().unwrap_err();
        assert!(err.to_string().contains("flashcard 2 has an empty question"));

        let set = FlashcardSet {
            flashcards: vec![card("What is X?", "")],
        };
        assert!(set.validate().unwrap_err().to_string().contains("empty answer"));
    }

    #[test]
    fn validate_rejects_empty_set() {
        let set = FlashcardSet { flashcards: vec![] };
        assert!(set.validate().is_err());
    }

    #[test]
    fn validate_accepts_well_formed_set() {
        let set = FlashcardSet {
            flashcards: vec![card("What is X?", "X is Y."); 25],
        };
        assert!(set.validate().is_ok());
    }
}
