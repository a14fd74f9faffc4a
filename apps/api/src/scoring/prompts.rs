// Prompt templates for the external fit analysis and candidate feedback calls.
// System prompts are assembled from llm_client::prompts fragments at call time.

/// Fit analysis prompt. Replace: {resume_json}, {job_json}, {required_skills}, {preferred_skills}
pub const FIT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze the candidate's resume against the job description.

RESUME (structured):
{resume_json}

JOB DESCRIPTION (structured):
{job_json}

Required skills: {required_skills}
Preferred skills: {preferred_skills}

Return a JSON object with this EXACT schema:
{
  "match_percentage": 72,
  "matched_skills": ["python"],
  "missing_required_skills": ["sql"],
  "missing_preferred_skills": ["docker"],
  "strengths": ["Five years of backend experience"],
  "gaps": ["No evidence of database work"],
  "recommendations": ["Add a project demonstrating SQL"]
}

Rules:
- match_percentage is an integer from 0 to 100 reflecting overall fit.
- Skill lists use the skill names exactly as given above.
- strengths, gaps and recommendations are short, specific sentences."#;

/// Feedback prompt. Replace: {score}, {analysis_json}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Based on a resume analysis with a relevance score of {score}%,
write constructive feedback that helps the candidate improve their application.

Analysis details:
{analysis_json}

Provide:
1. A brief summary of their current standing
2. The top 3 specific actions they can take to improve their match
3. Encouragement and positive reinforcement

Keep the tone professional but friendly. Plain text only, at most 200 words."#;
