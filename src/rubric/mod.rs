//! Rubric evaluation types and score extraction.
//!
//! The evaluator replies in free text; this module turns that text into
//! a normalized quality signal without ever failing the run.

pub mod parser;

pub use parser::{PatternRubricParser, RubricParser};

use serde::{Deserialize, Serialize};

/// The five aspects every rubric is scored on, in prompt order.
pub const ASPECTS: [&str; 5] = ["準確性", "全面性", "深度", "相關例子", "論證的邏輯性"];

/// Full marks for a rubric (five aspects at 10 points each).
pub const FULL_MARKS: f64 = 50.0;

/// Where the normalized score came from.
///
/// `Unparsed` keeps "the rubric did not parse" distinguishable from
/// "the answer scored zero"; both still rank as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// A literal "總評分：N/50" marker was found
    Total,
    /// Sum of per-aspect "n/10" scores
    AspectSum,
    /// Nothing recognizable; score degraded to zero
    Unparsed,
}

/// One aspect's parsed score (0-10).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectScore {
    pub name: String,
    pub score: u8,
}

/// Result of scoring a candidate answer against the rubric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Normalized score in [0, 1]
    pub score: f64,

    /// The raw rubric text the evaluator produced
    pub raw: String,

    /// Per-aspect breakdown, in ASPECTS order
    pub aspects: Vec<AspectScore>,

    /// Provenance of the score
    pub source: ScoreSource,
}

impl Evaluation {
    /// Degraded evaluation for rubric text with no recognizable markers
    pub fn unscored(raw: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            raw: raw.into(),
            aspects: ASPECTS
                .iter()
                .map(|name| AspectScore {
                    name: name.to_string(),
                    score: 0,
                })
                .collect(),
            source: ScoreSource::Unparsed,
        }
    }

    /// Whether the rubric text actually parsed into a score
    pub fn is_scored(&self) -> bool {
        self.source != ScoreSource::Unparsed
    }
}
