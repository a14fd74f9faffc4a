//! Score Aggregator: fuses local signals and the external analysis into one breakdown.
//!
//! Policy: when the external analysis carries `match_percentage`, it replaces the
//! weighted average outright and the local scores become explanatory only. Otherwise
//! `overall = hard·w_hard + semantic·w_semantic + experience·w_experience`, with the
//! weights used exactly as given. The verdict is decided on the unrounded overall score.

use serde::{Deserialize, Serialize};

use crate::scoring::config::{ScoringWeights, VerdictThresholds};
use crate::scoring::signals::ExternalAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    High,
    Medium,
    Low,
}

impl Verdict {
    /// Pure function of the score and the two thresholds.
    pub fn from_score(score: f64, thresholds: &VerdictThresholds) -> Self {
        if score >= f64::from(thresholds.high) {
            Verdict::High
        } else if score >= f64::from(thresholds.medium) {
            Verdict::Medium
        } else {
            Verdict::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::High => "HIGH",
            Verdict::Medium => "MEDIUM",
            Verdict::Low => "LOW",
        }
    }
}

/// Which path produced `overall_score`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBasis {
    ExternalAnalysis,
    WeightedAverage,
}

impl ScoreBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreBasis::ExternalAnalysis => "external_analysis",
            ScoreBasis::WeightedAverage => "weighted_average",
        }
    }
}

/// The evaluation artifact handed to reporting and persistence. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub overall_score: f64,
    pub hard_match_score: f64,
    pub semantic_score: f64,
    pub experience_score: f64,
    pub verdict: Verdict,
    pub score_basis: ScoreBasis,
    pub matched_skills: Vec<String>,
    pub missing_required_skills: Vec<String>,
    pub missing_preferred_skills: Vec<String>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub recommendations: Vec<String>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted average of the three local signals. No renormalization.
pub fn weighted_score(
    hard_match: f64,
    semantic: f64,
    experience: f64,
    weights: &ScoringWeights,
) -> f64 {
    hard_match * weights.hard + semantic * weights.semantic + experience * weights.experience
}

/// Clamped overall score before display rounding, and the path that produced it.
pub fn overall_score(
    hard_match: f64,
    semantic: f64,
    experience: f64,
    analysis: &ExternalAnalysis,
    weights: &ScoringWeights,
) -> (f64, ScoreBasis) {
    let (overall, score_basis) = match analysis.match_percentage {
        Some(pct) => (pct, ScoreBasis::ExternalAnalysis),
        None => (
            weighted_score(hard_match, semantic, experience, weights),
            ScoreBasis::WeightedAverage,
        ),
    };
    (overall.clamp(0.0, 100.0), score_basis)
}

pub fn aggregate(
    hard_match: f64,
    semantic: f64,
    experience: f64,
    analysis: &ExternalAnalysis,
    weights: &ScoringWeights,
    thresholds: &VerdictThresholds,
) -> ScoreBreakdown {
    let (overall, score_basis) =
        overall_score(hard_match, semantic, experience, analysis, weights);
    let verdict = Verdict::from_score(overall, thresholds);

    ScoreBreakdown {
        overall_score: round2(overall),
        hard_match_score: round2(hard_match),
        semantic_score: round2(semantic),
        experience_score: round2(experience),
        verdict,
        score_basis,
        matched_skills: analysis.matched_skills.clone(),
        missing_required_skills: analysis.missing_required_skills.clone(),
        missing_preferred_skills: analysis.missing_preferred_skills.clone(),
        strengths: analysis.strengths.clone(),
        gaps: analysis.gaps.clone(),
        recommendations: analysis.recommendations.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::signals::SignalSource;

    fn analysis(match_percentage: Option<f64>) -> ExternalAnalysis {
        ExternalAnalysis {
            match_percentage,
            matched_skills: vec!["python".to_string()],
            missing_required_skills: vec!["sql".to_string()],
            missing_preferred_skills: vec![],
            strengths: vec!["Solid Python".to_string()],
            gaps: vec![],
            recommendations: vec!["Learn SQL".to_string()],
            source: SignalSource::External,
        }
    }

    #[test]
    fn test_weighted_path_with_default_weights() {
        // 0.4×80 + 0.4×60 + 0.2×50 = 66
        let b = aggregate(
            80.0,
            60.0,
            50.0,
            &analysis(None),
            &ScoringWeights::default(),
            &VerdictThresholds::default(),
        );
        assert!((b.overall_score - 66.0).abs() < 1e-9);
        assert_eq!(b.verdict, Verdict::Medium);
        assert_eq!(b.score_basis, ScoreBasis::WeightedAverage);
    }

    #[test]
    fn test_external_percentage_overrides_local_scores() {
        for (h, s, e) in [(0.0, 0.0, 0.0), (100.0, 100.0, 100.0), (12.5, 90.0, 25.0)] {
            let b = aggregate(
                h,
                s,
                e,
                &analysis(Some(82.0)),
                &ScoringWeights::default(),
                &VerdictThresholds::default(),
            );
            assert_eq!(b.overall_score, 82.0);
            assert_eq!(b.verdict, Verdict::High);
            assert_eq!(b.score_basis, ScoreBasis::ExternalAnalysis);
        }
    }

    #[test]
    fn test_weighted_path_stays_in_range_for_valid_weights() {
        let weight_sets = [
            ScoringWeights { hard: 1.0, semantic: 0.0, experience: 0.0 },
            ScoringWeights { hard: 0.4, semantic: 0.4, experience: 0.2 },
            ScoringWeights { hard: 0.1, semantic: 0.3, experience: 0.6 },
            ScoringWeights { hard: 0.33, semantic: 0.33, experience: 0.34 },
        ];
        let values = [0.0, 37.5, 100.0];
        for w in &weight_sets {
            for &h in &values {
                for &s in &values {
                    for &e in &values {
                        let score = weighted_score(h, s, e, w);
                        assert!(
                            (0.0..=100.0 + 1e-9).contains(&score),
                            "score {score} out of range for {w:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_verdict_is_monotonic_in_score() {
        let thresholds = VerdictThresholds::default();
        let rank = |v: Verdict| match v {
            Verdict::Low => 0,
            Verdict::Medium => 1,
            Verdict::High => 2,
        };
        let mut previous = rank(Verdict::from_score(0.0, &thresholds));
        for step in 1..=200 {
            let current = rank(Verdict::from_score(step as f64 * 0.5, &thresholds));
            assert!(current >= previous, "verdict dropped at {}", step as f64 * 0.5);
            previous = current;
        }
    }

    #[test]
    fn test_verdict_boundaries_are_inclusive() {
        let t = VerdictThresholds { high: 80, medium: 60 };
        assert_eq!(Verdict::from_score(80.0, &t), Verdict::High);
        assert_eq!(Verdict::from_score(79.99, &t), Verdict::Medium);
        assert_eq!(Verdict::from_score(60.0, &t), Verdict::Medium);
        assert_eq!(Verdict::from_score(59.99, &t), Verdict::Low);
    }

    #[test]
    fn test_rounding_does_not_change_verdict() {
        // 74.996 displays as 75.0 but stays below the HIGH threshold.
        let b = aggregate(
            0.0,
            0.0,
            0.0,
            &analysis(Some(74.996)),
            &ScoringWeights::default(),
            &VerdictThresholds::default(),
        );
        assert_eq!(b.overall_score, 75.0);
        assert_eq!(b.verdict, Verdict::Medium);

        let (raw, basis) = overall_score(
            0.0,
            0.0,
            0.0,
            &analysis(Some(74.996)),
            &ScoringWeights::default(),
        );
        assert_eq!(raw, 74.996);
        assert_eq!(basis, ScoreBasis::ExternalAnalysis);
    }

    #[test]
    fn test_component_scores_rounded_to_two_places() {
        let b = aggregate(
            33.33333,
            66.66666,
            50.0,
            &analysis(None),
            &ScoringWeights::default(),
            &VerdictThresholds::default(),
        );
        assert_eq!(b.hard_match_score, 33.33);
        assert_eq!(b.semantic_score, 66.67);
    }

    #[test]
    fn test_lists_copied_from_analysis() {
        let b = aggregate(
            50.0,
            50.0,
            50.0,
            &analysis(None),
            &ScoringWeights::default(),
            &VerdictThresholds::default(),
        );
        assert_eq!(b.matched_skills, vec!["python"]);
        assert_eq!(b.missing_required_skills, vec!["sql"]);
        assert_eq!(b.recommendations, vec!["Learn SQL"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let run = || {
            aggregate(
                71.234,
                48.9,
                75.0,
                &analysis(None),
                &ScoringWeights::default(),
                &VerdictThresholds::default(),
            )
        };
        let first = serde_json::to_string(&run()).unwrap();
        let second = serde_json::to_string(&run()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_verdict_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Verdict::High).unwrap(), "\"HIGH\"");
        assert_eq!(Verdict::Low.as_str(), "LOW");
    }
}
