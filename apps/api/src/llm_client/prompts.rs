// Shared prompt fragments.
// Each service that needs gateway calls defines its own prompts.rs alongside it.

/// Appended to every system prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
Do NOT include any text outside the JSON object. \
Do NOT use markdown code fences.";
