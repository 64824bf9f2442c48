//! Completion provider implementations
//!
//! This module contains concrete implementations of the CompletionProvider
//! trait for external LLM services.

pub mod openai;

pub use openai::{OpenAiClient, OpenAiProvider};
