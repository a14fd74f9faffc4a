//! Regex-driven job description extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{normalize_text, push_unique, split_skill_list, JobData, JobParser};

const MAX_RESPONSIBILITIES: usize = 10;
const MIN_RESPONSIBILITY_LEN: usize = 20;

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^(?:position|job title|role)\s*:\s*(.+)$").unwrap());

/// A skill block ends at a blank line or at a line opening with another section heading.
const BLOCK_END: &str = r"(?:\n[ \t]*\n|\n[ \t]*(?:preferred|desired|nice[- ]?to[- ]?have|optional|required|must[- ]?haves?|mandatory|responsibilities|requirements|qualifications|education|experience|about|duties|benefits|you will)\b|\z)";

fn block_patterns(headings: &[&str]) -> Vec<Regex> {
    headings
        .iter()
        .map(|h| Regex::new(&format!(r"(?is){h}\s*:[ \t]*\n?(.*?){BLOCK_END}")).unwrap())
        .collect()
}

static REQUIRED: Lazy<Vec<Regex>> = Lazy::new(|| {
    block_patterns(&[r"required skills?", r"must[- ]?haves?", r"mandatory skills?"])
});

static PREFERRED: Lazy<Vec<Regex>> = Lazy::new(|| {
    block_patterns(&[r"preferred skills?", r"nice[- ]?to[- ]?have", r"desired skills?"])
});

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

static EXPERIENCE_REQUIREMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:minimum\s+|at least\s+)?\d+\s*\+?\s*(?:(?:-|to)\s*\d+\s*\+?\s*)?years?")
        .unwrap()
});

static EDUCATION_LEVELS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "bachelor",
            Regex::new(r"(?i)\b(?:bachelor|btech|b\.tech|b\.sc|b\.s\.|b\.e\.)").unwrap(),
        ),
        (
            "master",
            Regex::new(r"(?i)\b(?:master|mtech|m\.tech|mba|m\.sc|m\.s\.)").unwrap(),
        ),
        (
            "graduate",
            Regex::new(r"(?i)\b(?:graduation|graduate|post[- ]?graduate)\b").unwrap(),
        ),
    ]
});

static RESPONSIBILITIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)(?:responsibilities|duties|you will)\s*:?(.*?)(?:requirements|qualifications|required skills?|preferred skills?|skills\s*:|\z)",
    )
    .unwrap()
});
static BULLET_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:•|·|-|\*|\d+\.)\s*").unwrap());

/// Default JD parser built on section-keyword regex heuristics.
pub struct RegexJobParser;

impl JobParser for RegexJobParser {
    fn parse_job(&self, text: &str) -> JobData {
        let text = normalize_text(text);
        JobData {
            title: extract_title(&text),
            required_skills: extract_skill_block(&text, &REQUIRED),
            preferred_skills: extract_skill_block(&text, &PREFERRED),
            experience_required: extract_experience_requirement(&text),
            education_required: extract_education_requirement(&text),
            responsibilities: extract_responsibilities(&text),
        }
    }
}

fn extract_title(text: &str) -> String {
    if let Some(caps) = TITLE.captures(text) {
        return caps[1].trim().to_string();
    }
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn extract_skill_block(text: &str, patterns: &[Regex]) -> Vec<String> {
    let mut skills = Vec::new();
    for re in patterns {
        if let Some(caps) = re.captures(text) {
            let block = PARENTHETICAL.replace_all(&caps[1], "");
            push_unique(&mut skills, split_skill_list(&block));
        }
    }
    skills
}

fn extract_experience_requirement(text: &str) -> Option<String> {
    EXPERIENCE_REQUIREMENT
        .find(text)
        .map(|m| m.as_str().trim().to_string())
}

fn extract_education_requirement(text: &str) -> Option<String> {
    let levels: Vec<&str> = EDUCATION_LEVELS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(level, _)| *level)
        .collect();

    if levels.is_empty() {
        None
    } else {
        Some(levels.join(", "))
    }
}

fn extract_responsibilities(text: &str) -> Vec<String> {
    let Some(caps) = RESPONSIBILITIES.captures(text) else {
        return Vec::new();
    };
    BULLET_SPLIT
        .split(&caps[1])
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|item| item.len() > MIN_RESPONSIBILITY_LEN)
        .take(MAX_RESPONSIBILITIES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = r#"Job Title: Senior Data Engineer
Acme Corp is hiring.

Required Skills: Python, SQL, Apache Spark
Preferred Skills: Docker, Kubernetes

Responsibilities:
- Design and operate batch and streaming data pipelines
- Partner with analysts on data modeling
- On call

Requirements
Minimum 5 years of experience in data engineering.
Bachelor's degree in Computer Science or related field.
"#;

    fn parsed() -> JobData {
        RegexJobParser.parse_job(JD)
    }

    #[test]
    fn test_title_from_label() {
        assert_eq!(parsed().title, "Senior Data Engineer");
    }

    #[test]
    fn test_title_falls_back_to_first_line() {
        let job = RegexJobParser.parse_job("\n  Backend Developer\nWe build things.");
        assert_eq!(job.title, "Backend Developer");
    }

    #[test]
    fn test_required_and_preferred_split() {
        let job = parsed();
        assert_eq!(job.required_skills, vec!["Python", "SQL", "Apache Spark"]);
        assert_eq!(job.preferred_skills, vec!["Docker", "Kubernetes"]);
    }

    #[test]
    fn test_required_block_stops_at_blank_line() {
        let job = RegexJobParser.parse_job(
            "Required Skills: Python, SQL\n\nQualifications\nBachelor's degree in Statistics\n3+ years of experience\n\nAbout Us\nWe are a fintech startup",
        );
        assert_eq!(job.required_skills, vec!["Python", "SQL"]);
        assert!(job.preferred_skills.is_empty());
        assert_eq!(job.experience_required.as_deref(), Some("3+ years"));
    }

    #[test]
    fn test_required_block_stops_at_next_heading_line() {
        let job = RegexJobParser.parse_job(
            "Must Have:\n- Go\n- gRPC\nQualifications\nExperience running services in production",
        );
        assert_eq!(job.required_skills, vec!["Go", "gRPC"]);
    }

    #[test]
    fn test_heading_word_inside_skill_line_does_not_end_block() {
        let job = RegexJobParser.parse_job("Required Skills: Python (preferred 3.10+), SQL, Spark");
        assert_eq!(job.required_skills, vec!["Python", "SQL", "Spark"]);
        assert!(job.preferred_skills.is_empty());
    }

    #[test]
    fn test_experience_requirement_phrase() {
        assert_eq!(parsed().experience_required.as_deref(), Some("Minimum 5 years"));

        let job = RegexJobParser.parse_job("We need 3+ years of Rust.");
        assert_eq!(job.experience_required.as_deref(), Some("3+ years"));

        let job = RegexJobParser.parse_job("We need 2 to 4 years of Go.");
        assert_eq!(job.experience_required.as_deref(), Some("2 to 4 years"));
    }

    #[test]
    fn test_missing_experience_requirement_is_none() {
        let job = RegexJobParser.parse_job("Required Skills: Rust");
        assert_eq!(job.experience_required, None);
        assert_eq!(job.education_required, None);
    }

    #[test]
    fn test_education_requirement() {
        assert_eq!(parsed().education_required.as_deref(), Some("bachelor"));
    }

    #[test]
    fn test_responsibilities_keep_long_items() {
        let job = parsed();
        assert_eq!(job.responsibilities.len(), 2);
        assert!(job.responsibilities[0].starts_with("Design and operate"));
    }
}
