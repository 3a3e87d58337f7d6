// Cross-cutting prompt fragments shared by every generation call.
// Task-specific prompts live in interview::prompts.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are an AI assistant that always responds with compact JSON \
    matching exactly what the user instructs. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
