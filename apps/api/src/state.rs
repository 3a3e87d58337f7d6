use std::sync::Arc;

use crate::interview::session::SessionStore;
use crate::llm_client::JsonGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation backend. Default: `LlmClient`; tests inject stubs.
    pub llm: Arc<dyn JsonGenerator>,
    /// In-memory interview sessions, keyed by session id.
    pub sessions: SessionStore,
}
