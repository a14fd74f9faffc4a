// Parsing collaborator: raw resume / JD text → structured records consumed by the scoring core.
// The regex heuristics are one implementation behind the `ResumeParser` / `JobParser` traits;
// a trained extractor can replace them without touching scoring.

pub mod document;
pub mod job;
pub mod resume;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::scoring::experience::ExperienceEntry;
use crate::scoring::skills::{RequirementSpec, SkillSet};

pub use job::RegexJobParser;
pub use resume::RegexResumeParser;

/// Skill strings at or above this length are treated as parse noise.
const MAX_SKILL_LEN: usize = 50;

static INLINE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\f\v]+").unwrap());
static LIST_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;|•·\n]").unwrap());

// ────────────────────────────────────────────────────────────────────────────
// Structured records
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    /// "bachelor" | "master" | "doctorate"
    pub level: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeData {
    pub contact: ContactInfo,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<String>,
    pub certifications: Vec<String>,
}

impl ResumeData {
    pub fn skill_set(&self) -> SkillSet {
        self.skills.iter().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobData {
    pub title: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub experience_required: Option<String>,
    pub education_required: Option<String>,
    pub responsibilities: Vec<String>,
}

impl JobData {
    pub fn requirement_spec(&self) -> RequirementSpec {
        RequirementSpec {
            required_skills: self.required_skills.iter().collect(),
            preferred_skills: self.preferred_skills.iter().collect(),
            experience_requirement: self.experience_required.clone(),
            education_requirement: self.education_required.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parser seams
// ────────────────────────────────────────────────────────────────────────────

pub trait ResumeParser: Send + Sync {
    fn parse_resume(&self, text: &str) -> ResumeData;
}

pub trait JobParser: Send + Sync {
    fn parse_job(&self, text: &str) -> JobData;
}

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

/// Collapses runs of inline whitespace and trims each line, keeping line breaks.
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(|line| INLINE_WS.replace_all(line.trim(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits a delimited list into clean items, dropping noise the scoring core must not see.
pub(crate) fn split_skill_list(text: &str) -> Vec<String> {
    LIST_SPLIT
        .split(text)
        .map(|s| s.trim().trim_start_matches(['-', '*']).trim())
        .filter(|s| is_plausible_skill(s))
        .map(str::to_string)
        .collect()
}

fn is_plausible_skill(s: &str) -> bool {
    !s.is_empty() && s.len() < MAX_SKILL_LEN && s.chars().any(char::is_alphanumeric)
}

/// Appends items not already present (case-insensitive), preserving first-seen order.
pub(crate) fn push_unique(target: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !target.iter().any(|t| t.eq_ignore_ascii_case(&item)) {
            target.push(item);
        }
    }
}
