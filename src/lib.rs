//! Anneal - bounded self-refinement over a text generation service
//!
//! Anneal answers a question, scores the answer against a rubric,
//! rewrites the prompt from the scoring feedback, and regenerates until
//! the score clears a threshold or the iteration budget runs out. The
//! chosen answer is re-grounded against a short list of core facts
//! extracted up front.

pub mod audit;
pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod grounding;
pub mod llm;
pub mod prompts;
pub mod rubric;

pub use error::{AnnealError, Result};
