//! Comparison synthesizer.
//!
//! A single stateless generation call producing a short comparative
//! narrative between two answers. Advisory output only; the loop never
//! consumes it.

use crate::error::Result;
use crate::llm::GenerationRequest;
use crate::prompts;

use super::refine::RefineEngine;

impl RefineEngine {
    /// Compare two answers to the same question and recommend one.
    pub async fn compare(&self, question: &str, answer_a: &str, answer_b: &str) -> Result<String> {
        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompts::comparison_prompt(question, answer_a, answer_b))
                    .with_max_tokens(self.config.llm.comparison_max_tokens)
                    .with_temperature(self.config.llm.comparison_temperature),
            )
            .await?;

        Ok(response.answer())
    }
}
