//! Regex-driven resume section extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    normalize_text, push_unique, split_skill_list, ContactInfo, EducationEntry, ResumeData,
    ResumeParser,
};
use crate::scoring::experience::ExperienceEntry;

/// Minimum length of a bulleted item to count as a project description.
const MIN_PROJECT_LEN: usize = 20;
/// Education text kept per detected degree.
const EDUCATION_SNIPPET_LEN: usize = 200;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\(?\d[\d .\-()]{8,}\d").unwrap());

static SKILLS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:skills?|core competenc(?:y|ies))\s*:\s*([^\n]*)").unwrap()
});

static EXPERIENCE_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ims)^(?:work experience|professional experience|experience|employment history)\s*:?\s*$(.*?)(?:^(?:education|academic|skills|technical skills|projects?|certifications?)\b|\z)",
    )
    .unwrap()
});
static EDUCATION_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ims)^(?:education|academic background|qualifications?)\s*:?\s*$(.*?)(?:^(?:work experience|experience|skills|technical skills|projects?|certifications?)\b|\z)",
    )
    .unwrap()
});
static PROJECTS_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ims)^projects?\s*:?\s*$(.*?)(?:^(?:work experience|experience|skills|technical skills|education|certifications?)\b|\z)",
    )
    .unwrap()
});

static CERTIFICATIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)certifications?\s*:\s*(.*?)(?:\n\s*\n|\z)").unwrap());
static CERTIFIED_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)certified\s+in\s+([^\n]+)").unwrap());

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static BULLET_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:•|·|-|\*|\d+\.)\s*").unwrap());

static DEGREES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "bachelor",
            Regex::new(r"(?i)\b(?:bachelor|btech|b\.tech|b\.[a-z]+)").unwrap(),
        ),
        (
            "master",
            Regex::new(r"(?i)\b(?:master|mtech|m\.tech|mba|m\.[a-z]+)").unwrap(),
        ),
        ("doctorate", Regex::new(r"(?i)\b(?:phd|ph\.d|doctorate)").unwrap()),
    ]
});

/// Default resume parser built on line-oriented regex heuristics.
pub struct RegexResumeParser;

impl ResumeParser for RegexResumeParser {
    fn parse_resume(&self, text: &str) -> ResumeData {
        let text = normalize_text(text);
        ResumeData {
            contact: extract_contact(&text),
            skills: extract_skills(&text),
            experience: extract_experience(&text),
            education: extract_education(&text),
            projects: extract_projects(&text),
            certifications: extract_certifications(&text),
        }
    }
}

fn extract_contact(text: &str) -> ContactInfo {
    ContactInfo {
        email: EMAIL.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE.find(text).map(|m| m.as_str().trim().to_string()),
    }
}

fn extract_skills(text: &str) -> Vec<String> {
    let mut skills = Vec::new();
    for caps in SKILLS_LINE.captures_iter(text) {
        push_unique(&mut skills, split_skill_list(&caps[1]));
    }
    skills
}

/// A line with a year opens a new entry; following lines are appended to it.
fn extract_experience(text: &str) -> Vec<ExperienceEntry> {
    let Some(caps) = EXPERIENCE_SECTION.captures(text) else {
        return Vec::new();
    };

    let mut entries: Vec<ExperienceEntry> = Vec::new();
    for line in caps[1].lines().map(str::trim).filter(|l| !l.is_empty()) {
        if YEAR.is_match(line) {
            entries.push(ExperienceEntry {
                description: line.to_string(),
            });
        } else if let Some(current) = entries.last_mut() {
            current.description.push(' ');
            current.description.push_str(line);
        }
    }
    entries
}

fn extract_education(text: &str) -> Vec<EducationEntry> {
    let Some(caps) = EDUCATION_SECTION.captures(text) else {
        return Vec::new();
    };
    let section = caps[1].trim();
    let snippet: String = section.chars().take(EDUCATION_SNIPPET_LEN).collect();

    DEGREES
        .iter()
        .filter(|(_, re)| re.is_match(section))
        .map(|(level, _)| EducationEntry {
            level: level.to_string(),
            text: snippet.clone(),
        })
        .collect()
}

fn extract_projects(text: &str) -> Vec<String> {
    let Some(caps) = PROJECTS_SECTION.captures(text) else {
        return Vec::new();
    };
    BULLET_SPLIT
        .split(&caps[1])
        .map(|item| item.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|item| item.len() > MIN_PROJECT_LEN)
        .collect()
}

fn extract_certifications(text: &str) -> Vec<String> {
    let mut certs = Vec::new();
    for caps in CERTIFICATIONS.captures_iter(text) {
        push_unique(&mut certs, split_skill_list(&caps[1]));
    }
    for caps in CERTIFIED_IN.captures_iter(text) {
        push_unique(&mut certs, split_skill_list(&caps[1]));
    }
    certs
}
