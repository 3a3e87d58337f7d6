// Interview orchestration core.
// Leaf-first: text heuristics → fallback synthesis → normalization → sessions → coach.
// All model calls go through llm_client::JsonGenerator.

pub mod coach;
pub mod fallback;
pub mod handlers;
pub mod normalize;
pub mod prompts;
pub mod session;
pub mod text;
