//! Refinement loop controller.
//!
//! Owns the iteration state machine: generate, evaluate, optimize the
//! prompt, regenerate, fact-check, track best-so-far, decide
//! termination, then synthesize the final answer. Generator failures
//! are never caught here - a run is atomic with respect to upstream
//! service errors. Scoring failures degrade instead (see rubric).

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::audit::AuditLog;
use crate::config::EngineConfig;
use crate::content::{ContentCache, ContentIngestor, PageExtractor};
use crate::error::Result;
use crate::grounding::FactGrounder;
use crate::llm::{GenerationRequest, TextGenerator};
use crate::prompts;
use crate::rubric::{Evaluation, PatternRubricParser, RubricParser};

use super::state::{IterationRecord, RunState};

/// Result of the single-shot direct path.
#[derive(Debug, Clone, Serialize)]
pub struct DirectReport {
    pub answer: String,
    pub tokens_used: u64,
    pub score: f64,
    pub core_facts: String,
}

/// Result of a full refinement run.
#[derive(Debug, Clone, Serialize)]
pub struct RefinementReport {
    pub initial_answer: String,
    pub final_answer: String,
    pub initial_score: f64,
    pub final_score: f64,
    pub total_tokens: u64,
    pub core_facts: String,
    pub iterations: Vec<IterationRecord>,
    pub comparison: Option<String>,
}

/// The refinement-and-grounding engine. One instance serves any number
/// of concurrent runs; only the content cache is shared between them.
pub struct RefineEngine {
    pub(super) generator: Arc<dyn TextGenerator>,
    parser: Box<dyn RubricParser>,
    ingestor: ContentIngestor,
    grounder: FactGrounder,
    audit: Option<AuditLog>,
    pub(super) config: EngineConfig,
}

impl RefineEngine {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        extractor: Arc<dyn PageExtractor>,
        config: EngineConfig,
    ) -> Self {
        let cache = Arc::new(ContentCache::with_capacity(config.content.cache_capacity));
        let ingestor =
            ContentIngestor::new(extractor, cache).with_token_limit(config.content.token_limit);
        let grounder = FactGrounder::new(Arc::clone(&generator));

        Self {
            generator,
            parser: Box::new(PatternRubricParser::new()),
            ingestor,
            grounder,
            audit: None,
            config,
        }
    }

    /// Swap in an alternate rubric parsing strategy.
    pub fn with_parser(mut self, parser: Box<dyn RubricParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Enable best-effort run logging.
    pub fn with_audit(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Single-shot path: one answer at the direct temperature, scored
    /// once, with facts extracted for the report. No refinement cycles.
    pub async fn run_direct(
        &self,
        question: &str,
        supplementary: Option<&str>,
    ) -> Result<DirectReport> {
        let sources = self.ingest_sources(supplementary).await;
        let mut tokens = 0u64;

        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompts::generation_prompt(question, &sources))
                    .with_max_tokens(self.config.llm.answer_max_tokens)
                    .with_temperature(self.config.llm.direct_temperature),
            )
            .await?;
        tokens += response.tokens_used;
        let answer = response.answer();

        let facts = self.grounder.extract_facts(&answer, question).await?;
        tokens += facts.tokens_used;

        let (evaluation, eval_tokens) = self
            .evaluate(question, &answer, &facts.text, &sources)
            .await?;
        tokens += eval_tokens;

        Ok(DirectReport {
            answer,
            tokens_used: tokens,
            score: evaluation.score,
            core_facts: facts.text,
        })
    }

    /// Full refinement run: bounded generate/evaluate/optimize cycles
    /// with fact-checking, then a final synthesis of best-so-far.
    pub async fn run_refinement(
        &self,
        question: &str,
        supplementary: Option<&str>,
        core_facts: Option<String>,
    ) -> Result<RefinementReport> {
        let run_key = format!("refine-{}", chrono::Utc::now().timestamp_millis());
        self.log_audit(&run_key, &format!("run start: {}", question));

        let sources = self.ingest_sources(supplementary).await;
        let mut state = RunState::new();

        // INIT: initial answer, then core facts unless the caller
        // supplied them
        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompts::generation_prompt(question, &sources))
                    .with_max_tokens(self.config.llm.answer_max_tokens)
                    .with_temperature(self.config.llm.answer_temperature),
            )
            .await?;
        state.add_tokens(response.tokens_used);
        let initial_tokens = response.tokens_used;
        let mut answer = response.answer();
        let initial_answer = answer.clone();

        let core_facts = match core_facts {
            Some(facts) => facts,
            None => {
                let facts = self.grounder.extract_facts(&answer, question).await?;
                state.add_tokens(facts.tokens_used);
                self.log_audit(&run_key, &format!("core facts:\n{}", facts.text));
                facts.text
            }
        };

        // EVALUATING the initial answer
        let (evaluation, eval_tokens) = self
            .evaluate(question, &answer, &core_facts, &sources)
            .await?;
        state.add_tokens(eval_tokens);
        let initial_score = evaluation.score;
        state.record(answer.clone(), evaluation, initial_tokens);
        self.log_audit(&run_key, &format!("iteration 0 score {:.2}", initial_score));

        let threshold = self.config.refinement.accept_threshold;
        let max_cycles = self.config.refinement.max_cycles;
        let mut cycles = 0u32;

        loop {
            // Termination predicate, checked after each evaluation.
            // Strictly greater: a score exactly at the threshold still
            // buys another cycle.
            let score = state.last().map(|r| r.evaluation.score).unwrap_or(0.0);
            if score > threshold {
                self.log_audit(&run_key, &format!("accepted at score {:.2}", score));
                break;
            }
            if cycles >= max_cycles {
                self.log_audit(&run_key, "iteration budget exhausted");
                break;
            }

            // OPTIMIZING: turn the rubric feedback into a better prompt
            let rubric_text = state
                .last()
                .map(|r| r.evaluation.raw.clone())
                .unwrap_or_default();
            let optimized = self
                .generator
                .generate(
                    GenerationRequest::new(prompts::optimizer_prompt(
                        question,
                        &answer,
                        &rubric_text,
                        &core_facts,
                    ))
                    .with_max_tokens(self.config.llm.optimizer_max_tokens)
                    .with_temperature(self.config.llm.optimizer_temperature),
                )
                .await?;
            state.add_tokens(optimized.tokens_used);
            let new_prompt = optimized.answer();

            // GENERATING: optimized prompt plus the full run history
            let history = prompts::history_context(state.iterations());
            let regenerated = self
                .generator
                .generate(
                    GenerationRequest::new(prompts::generation_prompt(&new_prompt, &history))
                        .with_max_tokens(self.config.llm.answer_max_tokens)
                        .with_temperature(self.config.llm.answer_temperature),
                )
                .await?;
            state.add_tokens(regenerated.tokens_used);
            let generation_tokens = regenerated.tokens_used;
            answer = regenerated.answer();

            // FACT_CHECKING before the next evaluation
            let checked = self.grounder.verify(&answer, &core_facts, question).await?;
            state.add_tokens(checked.tokens_used);
            answer = checked.text;

            // EVALUATING the refined answer
            let (evaluation, eval_tokens) = self
                .evaluate(question, &answer, &core_facts, &sources)
                .await?;
            state.add_tokens(eval_tokens);
            cycles += 1;
            self.log_audit(
                &run_key,
                &format!("iteration {} score {:.2}", cycles, evaluation.score),
            );
            state.record(answer.clone(), evaluation, generation_tokens);
        }

        // Final synthesis: restate best-so-far as a self-contained
        // answer; this text, not the raw best, is what callers get
        let best_answer = state
            .best()
            .map(|r| r.answer.clone())
            .unwrap_or_else(|| answer.clone());
        let final_score = state.best_score();

        let synthesized = self
            .generator
            .generate(
                GenerationRequest::new(prompts::synthesis_prompt(
                    question,
                    &best_answer,
                    &core_facts,
                ))
                .with_max_tokens(self.config.llm.answer_max_tokens)
                .with_temperature(self.config.llm.answer_temperature),
            )
            .await?;
        state.add_tokens(synthesized.tokens_used);
        let final_answer = synthesized.answer();

        // Advisory narrative against the initial baseline; its cost is
        // not part of the loop's token total
        let comparison = self.compare(question, &initial_answer, &final_answer).await?;

        info!(
            "refinement run finished: {} cycles, best score {:.2}, {} tokens",
            cycles,
            final_score,
            state.total_tokens()
        );
        self.log_audit(
            &run_key,
            &format!("run end: score {:.2}, {} tokens", final_score, state.total_tokens()),
        );

        let total_tokens = state.total_tokens();
        Ok(RefinementReport {
            initial_answer,
            final_answer,
            initial_score,
            final_score,
            total_tokens,
            core_facts,
            iterations: state.into_iterations(),
            comparison: Some(comparison),
        })
    }

    /// Score one candidate answer via a rubric generation call.
    async fn evaluate(
        &self,
        question: &str,
        answer: &str,
        core_facts: &str,
        sources: &str,
    ) -> Result<(Evaluation, u64)> {
        let response = self
            .generator
            .generate(
                GenerationRequest::new(prompts::rubric_prompt(question, answer, core_facts, sources))
                    .with_max_tokens(self.config.llm.rubric_max_tokens)
                    .with_temperature(self.config.llm.rubric_temperature),
            )
            .await?;

        let evaluation = self.parser.parse(&response.answer());
        Ok((evaluation, response.tokens_used))
    }

    async fn ingest_sources(&self, supplementary: Option<&str>) -> String {
        match supplementary {
            Some(raw) => self.ingestor.ingest(raw).await,
            None => String::new(),
        }
    }

    fn log_audit(&self, key: &str, entry: &str) {
        if let Some(audit) = &self.audit {
            audit.append(key, entry);
        }
    }
}
