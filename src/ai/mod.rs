//! Prompt construction for the language model

pub mod prompt_builder;

pub use prompt_builder::{CompletionParams, PromptTemplate};
