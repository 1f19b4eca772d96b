//! Score extraction from free-form rubric text.
//!
//! Fallback order: total marker, then per-aspect sum, then zero. A
//! rubric that matches nothing degrades to an unscored evaluation
//! rather than an error - the text comes from a non-deterministic
//! generator and must never crash the loop.

use log::warn;
use regex::Regex;

use super::{ASPECTS, AspectScore, Evaluation, FULL_MARKS, ScoreSource};

/// Strategy for turning rubric text into an Evaluation.
///
/// Implementations must be pure: byte-identical input yields an
/// identical evaluation, with no state mutation.
pub trait RubricParser: Send + Sync {
    fn parse(&self, rubric: &str) -> Evaluation;
}

/// Default regex-based parser for the "總評分：N/50" rubric dialect.
pub struct PatternRubricParser {
    total: Regex,
    aspects: Vec<(String, Regex)>,
}

impl PatternRubricParser {
    pub fn new() -> Self {
        // Hard-coded patterns; a failure here is a programming error
        let total = Regex::new(r"總評分：\s*(\d+(?:\.\d+)?)/50").unwrap();
        let aspects = ASPECTS
            .iter()
            .map(|name| {
                let pattern = format!(r"{}\s*[（(](\d+)\s*/\s*10[)）]", regex::escape(name));
                (name.to_string(), Regex::new(&pattern).unwrap())
            })
            .collect();

        Self { total, aspects }
    }

    /// Per-aspect matches; None where the aspect's marker is absent.
    fn aspect_scores(&self, rubric: &str) -> Vec<(String, Option<u8>)> {
        self.aspects
            .iter()
            .map(|(name, re)| {
                let score = re
                    .captures(rubric)
                    .and_then(|cap| cap[1].parse::<u8>().ok());
                (name.clone(), score)
            })
            .collect()
    }
}

impl Default for PatternRubricParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RubricParser for PatternRubricParser {
    fn parse(&self, rubric: &str) -> Evaluation {
        let raw = rubric.trim().to_string();
        let found = self.aspect_scores(rubric);
        let aspects: Vec<AspectScore> = found
            .iter()
            .map(|(name, score)| AspectScore {
                name: name.clone(),
                score: score.unwrap_or(0),
            })
            .collect();

        // Primary rule: a literal total marker wins outright
        if let Some(cap) = self.total.captures(rubric) {
            let total: f64 = cap[1].parse().unwrap_or(0.0);
            return Evaluation {
                score: total / FULL_MARKS,
                raw,
                aspects,
                source: ScoreSource::Total,
            };
        }

        // Fallback rule: sum whatever aspects did parse
        if found.iter().any(|(_, score)| score.is_some()) {
            let sum: u32 = aspects.iter().map(|a| a.score as u32).sum();
            return Evaluation {
                score: sum as f64 / FULL_MARKS,
                raw,
                aspects,
                source: ScoreSource::AspectSum,
            };
        }

        warn!("rubric text had no recognizable score markers, degrading to 0");
        Evaluation::unscored(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rubric: &str) -> Evaluation {
        PatternRubricParser::new().parse(rubric)
    }

    #[test]
    fn test_total_marker() {
        let eval = parse("評語很長很長。\n總評分：42/50\n建議：補充例子。");
        assert!((eval.score - 0.84).abs() < 1e-9);
        assert_eq!(eval.source, ScoreSource::Total);
    }

    #[test]
    fn test_total_marker_with_whitespace() {
        let eval = parse("總評分： 45/50");
        assert!((eval.score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_total_marker_decimal() {
        let eval = parse("總評分：37.5/50");
        assert!((eval.score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_total_wins_over_aspects() {
        // Per-aspect content must not affect a parsed total
        let rubric = "1. 準確性 (3/10)\n2. 全面性 (3/10)\n總評分：42/50";
        let eval = parse(rubric);
        assert!((eval.score - 0.84).abs() < 1e-9);
        assert_eq!(eval.source, ScoreSource::Total);
        // Breakdown is still reported
        assert_eq!(eval.aspects[0].score, 3);
    }

    #[test]
    fn test_aspect_sum_fallback() {
        let rubric = "1. 準確性 (7/10) 不錯\n2. 全面性 (7/10)\n3. 深度 (7/10)\n\
                      4. 相關例子 (7/10)\n5. 論證的邏輯性 (7/10)";
        let eval = parse(rubric);
        assert!((eval.score - 0.70).abs() < 1e-9);
        assert_eq!(eval.source, ScoreSource::AspectSum);
        assert!(eval.aspects.iter().all(|a| a.score == 7));
    }

    #[test]
    fn test_aspect_sum_fullwidth_parens() {
        let rubric = "準確性（8/10）全面性（6/10）";
        let eval = parse(rubric);
        assert!((eval.score - 14.0 / 50.0).abs() < 1e-9);
        assert_eq!(eval.source, ScoreSource::AspectSum);
    }

    #[test]
    fn test_missing_aspects_score_zero() {
        let rubric = "準確性 (9/10)，其餘方面無法評估。";
        let eval = parse(rubric);
        assert!((eval.score - 9.0 / 50.0).abs() < 1e-9);
        assert_eq!(eval.aspects[0].score, 9);
        assert!(eval.aspects[1..].iter().all(|a| a.score == 0));
    }

    #[test]
    fn test_matched_zero_still_counts_as_parsed() {
        let rubric = "準確性 (0/10)";
        let eval = parse(rubric);
        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.source, ScoreSource::AspectSum);
    }

    #[test]
    fn test_unparseable_degrades_to_zero() {
        let eval = parse("這個答案還可以，但我不想打分。");
        assert_eq!(eval.score, 0.0);
        assert_eq!(eval.source, ScoreSource::Unparsed);
        assert_eq!(eval.aspects.len(), 5);
        assert!(eval.aspects.iter().all(|a| a.score == 0));
    }

    #[test]
    fn test_determinism() {
        let rubric = "準確性 (7/10) 總評分：40/50";
        let parser = PatternRubricParser::new();
        let first = parser.parse(rubric);
        let second = parser.parse(rubric);
        assert_eq!(first.score, second.score);
        assert_eq!(first.source, second.source);
        assert_eq!(first.aspects, second.aspects);
    }

    #[test]
    fn test_boundary_45_is_exactly_090() {
        let eval = parse("總評分：45/50");
        assert!((eval.score - 0.9).abs() < 1e-12);
        // Strictly-greater termination must NOT fire at 0.9
        assert!(!(eval.score > 0.9));
    }
}
