// Shared prompt fragments.
// Each module that needs model calls defines its own prompts.rs alongside it;
// this file only holds cross-cutting pieces.

/// Persona used by every recruiter-facing prompt.
pub const RECRUITER_PERSONA: &str =
    "You are an expert technical recruiter evaluating how well a candidate fits a role.";

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
