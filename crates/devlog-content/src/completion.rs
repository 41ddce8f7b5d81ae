// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The text-generation capability
//!
//! The generator only knows [`TextCompletion`]; concrete services live behind
//! it (see [`crate::openai`]).

use async_trait::async_trait;

use crate::error::GenerationError;

/// Sampling options for a single completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionOptions {
    /// Short, fairly focused output suitable for a title
    #[must_use]
    pub fn title() -> Self {
        Self {
            max_output_tokens: 100,
            temperature: 0.7,
        }
    }

    /// Long-form output suitable for a post body
    #[must_use]
    pub fn body() -> Self {
        Self {
            max_output_tokens: 2000,
            temperature: 0.8,
        }
    }
}

/// Something that turns a prompt into text
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `context` and return the generated text
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` on any transport, authentication or
    /// malformed-response condition.
    async fn complete(
        &self,
        context: &str,
        options: CompletionOptions,
    ) -> Result<String, GenerationError>;
}
