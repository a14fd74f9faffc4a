//! Experience Evaluator: compares estimated candidate years against a parsed requirement.
//!
//! Candidate years are a heuristic: per entry, the span between the first and last
//! `20xx` token; spans are summed across entries. With no year tokens anywhere, the
//! estimate falls back to `entry_count × 2`, which is an approximation only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const NEUTRAL_SCORE: f64 = 50.0;
const YEARS_PER_UNDATED_ENTRY: f64 = 2.0;

static YEAR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b20\d{2}\b").unwrap());
static INTEGER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// One entry of a candidate's work history, as produced by the resume parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub description: String,
}

/// Estimates total years of experience. `None` when there are no entries at all.
pub fn estimate_candidate_years(entries: &[ExperienceEntry]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }

    let mut any_year_found = false;
    let mut total_span = 0.0;

    for entry in entries {
        let years: Vec<i32> = YEAR_TOKEN
            .find_iter(&entry.description)
            .filter_map(|m| m.as_str().parse().ok())
            .collect();

        if !years.is_empty() {
            any_year_found = true;
        }
        if let (Some(first), Some(last)) = (years.first(), years.last()) {
            if years.len() >= 2 {
                total_span += f64::from((last - first).abs());
            }
        }
    }

    if any_year_found {
        Some(total_span)
    } else {
        Some(entries.len() as f64 * YEARS_PER_UNDATED_ENTRY)
    }
}

/// Parses required years as the first integer in the requirement text.
/// "3+ years" → 3, "Not specified" → None.
pub fn parse_required_years(requirement: Option<&str>) -> Option<u32> {
    let text = requirement?;
    INTEGER_TOKEN
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Band score for determinable inputs; neutral when either side is unknown.
pub fn score_years(candidate_years: Option<f64>, required_years: Option<u32>) -> f64 {
    let (candidate, required) = match (candidate_years, required_years) {
        (Some(c), Some(r)) => (c, f64::from(r)),
        _ => return NEUTRAL_SCORE,
    };

    if candidate >= required {
        100.0
    } else if candidate >= 0.75 * required {
        75.0
    } else if candidate >= 0.5 * required {
        50.0
    } else {
        25.0
    }
}

/// Scores a candidate's experience record against the job's free-text requirement.
pub fn score_experience(entries: &[ExperienceEntry], requirement: Option<&str>) -> f64 {
    score_years(
        estimate_candidate_years(entries),
        parse_required_years(requirement),
    )
}
