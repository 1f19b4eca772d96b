//! Fact Grounding Unit.
//!
//! Distills a small set of load-bearing facts from an initial answer,
//! then re-grounds revised answers against them. Both operations are
//! single generation calls at low temperature; a generator failure is
//! fatal to the run and propagates untouched.

use std::sync::Arc;

use log::debug;

use crate::llm::{GenerationError, GenerationRequest, TextGenerator};
use crate::prompts;

/// Temperature for fact extraction and checking - facts must not drift
const FACT_TEMPERATURE: f32 = 0.2;

/// Max tokens for the extracted fact list
const FACT_MAX_TOKENS: u32 = 300;

/// Max tokens for a fact-checked rewrite
const CHECK_MAX_TOKENS: u32 = 1000;

/// Text produced by a grounding call, with its token cost.
#[derive(Debug, Clone)]
pub struct GroundedText {
    pub text: String,
    pub tokens_used: u64,
}

/// Extracts core facts and verifies answers against them.
pub struct FactGrounder {
    generator: Arc<dyn TextGenerator>,
}

impl FactGrounder {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Distill 1-3 bullet facts strictly derivable from `answer` in
    /// relation to `question`. Returns the trimmed raw fact list.
    pub async fn extract_facts(
        &self,
        answer: &str,
        question: &str,
    ) -> Result<GroundedText, GenerationError> {
        let request = GenerationRequest::new(prompts::fact_extraction_prompt(answer, question))
            .with_max_tokens(FACT_MAX_TOKENS)
            .with_temperature(FACT_TEMPERATURE);

        let response = self.generator.generate(request).await?;
        Ok(GroundedText {
            text: response.answer(),
            tokens_used: response.tokens_used,
        })
    }

    /// Silently rewrite `answer` so it contains every core fact,
    /// returning the corrected answer (or the original unchanged).
    ///
    /// The output is trusted as-is; a missing fact is only noted at
    /// debug level, never retried.
    pub async fn verify(
        &self,
        answer: &str,
        core_facts: &str,
        question: &str,
    ) -> Result<GroundedText, GenerationError> {
        let request = GenerationRequest::new(prompts::fact_check_prompt(answer, core_facts, question))
            .with_max_tokens(CHECK_MAX_TOKENS)
            .with_temperature(FACT_TEMPERATURE);

        let response = self.generator.generate(request).await?;
        let checked = response.answer();

        for fact in fact_lines(core_facts) {
            if !checked.contains(fact) {
                debug!("fact not literally present after check: {}", fact);
            }
        }

        Ok(GroundedText {
            text: checked,
            tokens_used: response.tokens_used,
        })
    }
}

/// Individual fact lines, with bullet markers stripped.
fn fact_lines(core_facts: &str) -> Vec<&str> {
    core_facts
        .lines()
        .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|line| !line.is_empty())
        .collect()
}
