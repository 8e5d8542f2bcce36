//! Language-model collaborators for the summary and flashcard stages.
//!
//! [`LanguageModel`] is the seam the pipeline stages depend on; the
//! [`OpenAiClient`] implementation talks to any OpenAI-compatible
//! chat-completions endpoint. Structured responses go through
//! [`complete_structured`], which decodes and validates them against an
//! [`OutputContract`] before handing them to the caller.

mod openai;

use async_trait::async_trait;
use serde_json::Value;

use wikicards_shared::{OutputContract, Result, WikicardsError};

pub use openai::OpenAiClient;

/// A language-model backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logging.
    fn model_id(&self) -> &str;

    /// Free-text completion of `user` under the `system` instruction.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Completion constrained to a JSON Schema; returns the decoded JSON value.
    async fn complete_json(
        &self,
        system: &str,
        user: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value>;
}

/// Request a structured response and check it against `T`'s contract.
///
/// Shape mismatches and contract violations are reported as
/// [`WikicardsError::Model`], the same as any other backend failure.
pub async fn complete_structured<T: OutputContract>(
    model: &dyn LanguageModel,
    system: &str,
    user: &str,
) -> Result<T> {
    let value = model
        .complete_json(system, user, T::NAME, &T::schema())
        .await?;

    let parsed: T = serde_json::from_value(value).map_err(|e| {
        WikicardsError::Model(format!("response does not match the {} schema: {e}", T::NAME))
    })?;

    parsed
        .validate()
        .map_err(|e| WikicardsError::Model(format!("{} contract violated: {e}", T::NAME)))?;

    Ok(parsed)
}
