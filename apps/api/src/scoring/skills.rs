//! Skill Matcher: hard keyword overlap between a candidate's skills and a job's requirements.
//!
//! Algorithm, per target skill:
//! 1. exact (case-insensitive) membership in the resume skill set → 1.0
//! 2. normalized Levenshtein similarity ≥ 85/100 against any resume skill → 0.8
//! 3. substring of the full resume text → 0.6
//! 4. otherwise → 0.0 (missing)
//!
//! Tier sub-score = Σ(weight) / |tier| × budget. Required and preferred budgets are
//! 60 / 40 when the job lists both, 100 for whichever is present alone, and the score
//! is a neutral 50 when the job lists neither.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

const EXACT_WEIGHT: f64 = 1.0;
const FUZZY_WEIGHT: f64 = 0.8;
const SUBSTRING_WEIGHT: f64 = 0.6;

/// Minimum similarity (0–100) for a fuzzy hit.
pub const FUZZY_THRESHOLD: f64 = 85.0;

const REQUIRED_BUDGET: f64 = 60.0;
const PREFERRED_BUDGET: f64 = 40.0;
const FULL_BUDGET: f64 = 100.0;
const NEUTRAL_SCORE: f64 = 50.0;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Lower-cased, trimmed, deduplicated skill strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

/// What a job asks for. Built once at JD parse time; read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementSpec {
    pub required_skills: SkillSet,
    pub preferred_skills: SkillSet,
    pub experience_requirement: Option<String>,
    pub education_requirement: Option<String>,
}

/// How strongly a single target skill was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Fuzzy,
    Substring,
    Missing,
}

impl MatchTier {
    pub fn weight(self) -> f64 {
        match self {
            MatchTier::Exact => EXACT_WEIGHT,
            MatchTier::Fuzzy => FUZZY_WEIGHT,
            MatchTier::Substring => SUBSTRING_WEIGHT,
            MatchTier::Missing => 0.0,
        }
    }
}

/// Output of the skill matcher. Any tier above `Missing` counts as matched for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMatch {
    pub hard_match_score: f64,
    pub matched_skills: Vec<String>,
    pub missing_required: Vec<String>,
    pub missing_preferred: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Matching
// ────────────────────────────────────────────────────────────────────────────

/// Classifies one (already lower-cased) target skill against the resume.
pub fn match_tier(target: &str, resume_skills: &SkillSet, resume_text_lower: &str) -> MatchTier {
    if resume_skills.contains(target) {
        return MatchTier::Exact;
    }

    let fuzzy_hit = resume_skills
        .iter()
        .any(|rs| normalized_levenshtein(target, rs) * 100.0 >= FUZZY_THRESHOLD);
    if fuzzy_hit {
        return MatchTier::Fuzzy;
    }

    if resume_text_lower.contains(target) {
        return MatchTier::Substring;
    }

    MatchTier::Missing
}

struct TierResult {
    weight_sum: f64,
    count: usize,
    matched: Vec<String>,
    missing: Vec<String>,
}

fn score_tier(targets: &SkillSet, resume_skills: &SkillSet, resume_text_lower: &str) -> TierResult {
    let mut result = TierResult {
        weight_sum: 0.0,
        count: targets.len(),
        matched: Vec::new(),
        missing: Vec::new(),
    };

    for target in targets.iter() {
        // An empty skill list means the resume could not be parsed for skills;
        // text-only evidence is not credited in that case.
        let tier = if resume_skills.is_empty() {
            MatchTier::Missing
        } else {
            match_tier(target, resume_skills, resume_text_lower)
        };

        if tier == MatchTier::Missing {
            result.missing.push(target.to_string());
        } else {
            result.weight_sum += tier.weight();
            result.matched.push(target.to_string());
        }
    }

    result
}

fn tier_points(tier: &TierResult, budget: f64) -> f64 {
    if tier.count == 0 {
        return 0.0;
    }
    tier.weight_sum / tier.count as f64 * budget
}

/// Scores resume skills against a job's requirement spec.
pub fn score_skills(
    resume_skills: &SkillSet,
    resume_text: &str,
    requirement: &RequirementSpec,
) -> SkillMatch {
    let text_lower = resume_text.to_lowercase();
    let required = score_tier(&requirement.required_skills, resume_skills, &text_lower);
    let preferred = score_tier(&requirement.preferred_skills, resume_skills, &text_lower);

    let hard_match_score = match (required.count > 0, preferred.count > 0) {
        (true, true) => {
            tier_points(&required, REQUIRED_BUDGET) + tier_points(&preferred, PREFERRED_BUDGET)
        }
        (true, false) => tier_points(&required, FULL_BUDGET),
        (false, true) => tier_points(&preferred, FULL_BUDGET),
        (false, false) => NEUTRAL_SCORE,
    };

    let matched_skills: BTreeSet<String> = required
        .matched
        .into_iter()
        .chain(preferred.matched)
        .collect();

    SkillMatch {
        hard_match_score: hard_match_score.clamp(0.0, 100.0),
        matched_skills: matched_skills.into_iter().collect(),
        missing_required: required.missing,
        missing_preferred: preferred.missing,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> SkillSet {
        items.iter().collect()
    }

    fn requirement(required: &[&str], preferred: &[&str]) -> RequirementSpec {
        RequirementSpec {
            required_skills: skills(required),
            preferred_skills: skills(preferred),
            ..Default::default()
        }
    }

    #[test]
    fn test_skill_set_normalizes_and_dedups() {
        let set = skills(&["Python", " python ", "SQL", ""]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("python"));
        assert!(set.contains("sql"));
    }

    #[test]
    fn test_case_only_difference_is_exact_not_fuzzy() {
        let resume = skills(&["JavaScript"]);
        let target = "Javascript".to_lowercase();
        assert_eq!(match_tier(&target, &resume, ""), MatchTier::Exact);
    }

    #[test]
    fn test_near_spelling_is_fuzzy() {
        let resume = skills(&["postgresql"]);
        assert_eq!(match_tier("postgressql", &resume, ""), MatchTier::Fuzzy);
    }

    #[test]
    fn test_dissimilar_skill_is_not_fuzzy() {
        let resume = skills(&["java"]);
        assert_eq!(match_tier("javascript", &resume, ""), MatchTier::Missing);
    }

    #[test]
    fn test_text_mention_is_substring() {
        let resume = skills(&["python"]);
        let text = "built data pipelines on kubernetes clusters";
        assert_eq!(match_tier("kubernetes", &resume, text), MatchTier::Substring);
    }

    #[test]
    fn test_required_only_half_matched() {
        let result = score_skills(
            &skills(&["python"]),
            "",
            &requirement(&["python", "sql"], &[]),
        );
        assert!((result.hard_match_score - 50.0).abs() < 1e-9);
        assert_eq!(result.matched_skills, vec!["python"]);
        assert_eq!(result.missing_required, vec!["sql"]);
    }

    #[test]
    fn test_required_half_matched_with_preferred_present() {
        // 60 × (1/2) + 40 × 0 = 30
        let result = score_skills(
            &skills(&["python"]),
            "",
            &requirement(&["python", "sql"], &["docker"]),
        );
        assert!((result.hard_match_score - 30.0).abs() < 1e-9);
        assert_eq!(result.missing_preferred, vec!["docker"]);
    }

    #[test]
    fn test_identical_sets_score_100() {
        let result = score_skills(
            &skills(&["rust", "tokio", "sql"]),
            "",
            &requirement(&["Rust", "Tokio", "SQL"], &[]),
        );
        assert!((result.hard_match_score - 100.0).abs() < 1e-9);
        assert!(result.missing_required.is_empty());
    }

    #[test]
    fn test_both_tiers_fully_matched_score_100() {
        let result = score_skills(
            &skills(&["rust", "docker"]),
            "",
            &requirement(&["rust"], &["docker"]),
        );
        assert!((result.hard_match_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_preferred_only_gets_full_budget() {
        let result = score_skills(&skills(&["docker"]), "", &requirement(&[], &["docker"]));
        assert!((result.hard_match_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_requirements_is_neutral() {
        let result = score_skills(&skills(&["rust"]), "", &requirement(&[], &[]));
        assert!((result.hard_match_score - 50.0).abs() < 1e-9);
        assert!(result.matched_skills.is_empty());
    }

    #[test]
    fn test_partial_credit_still_reported_as_matched() {
        // fuzzy (0.8) + substring (0.6) over 2 required = 0.7 × 100
        let result = score_skills(
            &skills(&["postgresql"]),
            "five years of terraform work",
            &requirement(&["postgressql", "terraform"], &[]),
        );
        assert!((result.hard_match_score - 70.0).abs() < 1e-9);
        assert_eq!(result.matched_skills.len(), 2);
        assert!(result.missing_required.is_empty());
    }

    #[test]
    fn test_empty_resume_skills_marks_everything_missing() {
        let result = score_skills(
            &SkillSet::default(),
            "python and sql everywhere",
            &requirement(&["python", "sql"], &["docker"]),
        );
        assert_eq!(result.hard_match_score, 0.0);
        assert_eq!(result.missing_required.len(), 2);
        assert_eq!(result.missing_preferred, vec!["docker"]);
        assert!(result.matched_skills.is_empty());
    }
}
