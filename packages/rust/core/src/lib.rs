//! Pipeline stages and orchestration for wikicards.
//!
//! This crate ties the encyclopedia and language-model collaborators together:
//! article retrieval, summary, flashcard generation, and the Markdown document
//! the run produces.

pub mod document;
pub mod flashcards;
pub mod pipeline;
pub mod retriever;
pub mod summarizer;

#[cfg(test)]
mod testing;
