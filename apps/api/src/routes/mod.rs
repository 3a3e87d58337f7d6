pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/analyze-job", post(handlers::handle_analyze_job))
        .route("/api/start-interview", post(handlers::handle_start_interview))
        .route("/api/evaluate-answer", post(handlers::handle_evaluate_answer))
        .route(
            "/api/sessions/:session_id",
            get(handlers::handle_get_session).delete(handlers::handle_close_session),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::interview::normalize::RawRecord;
    use crate::interview::session::{SessionStore, BEHAVIORAL_QUESTIONS};
    use crate::llm_client::{GenerationError, JsonGenerator};

    struct Offline;

    #[async_trait]
    impl JsonGenerator for Offline {
        async fn generate_json(&self, _prompt: &str) -> Result<RawRecord, GenerationError> {
            Err(GenerationError::Unavailable("no api key".to_string()))
        }
    }

    fn test_state() -> AppState {
        AppState {
            llm: Arc::new(Offline),
            sessions: SessionStore::new(),
        }
    }

    async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let (status, body) = send(build_router(test_state()), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_analyze_job_offline_returns_complete_analysis() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/analyze-job",
            Some(json!({"job_description": ""})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        for key in ["skills", "responsibilities", "competencies", "values", "themes"] {
            assert!(!body[key].as_array().unwrap().is_empty(), "{key} was empty");
        }
        assert!(!body["summary"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_mode_is_bad_request() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/start-interview",
            Some(json!({"mode": "technical", "job_analysis": {}})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (status, body) = send(
            build_router(test_state()),
            Method::POST,
            "/api/evaluate-answer",
            Some(json!({"session_id": "missing", "question": "Q", "answer": "A"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_behavioral_interview_round_trip() {
        let state = test_state();
        let router = build_router(state.clone());

        let (status, started) = send(
            router.clone(),
            Method::POST,
            "/api/start-interview",
            Some(json!({"mode": "behavioral", "job_analysis": {"themes": ["Ownership"]}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["question"], BEHAVIORAL_QUESTIONS[0]);
        assert_eq!(started["mode"], "behavioral");
        let session_id = started["session_id"].as_str().unwrap().to_string();

        let (status, evaluation) = send(
            router.clone(),
            Method::POST,
            "/api/evaluate-answer",
            Some(json!({
                "session_id": session_id,
                "question": BEHAVIORAL_QUESTIONS[0],
                "answer": "I rebuilt the deploy pipeline."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(evaluation["score"], 2);
        assert_eq!(evaluation["next_question"], BEHAVIORAL_QUESTIONS[1]);
        assert_eq!(evaluation["strengths"][1], "Relates to Ownership");

        let uri = format!("/api/sessions/{session_id}");
        let (status, snapshot) = send(router.clone(), Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["pointer"], 2);
        assert_eq!(snapshot["asked_questions"].as_array().unwrap().len(), 2);

        let (status, _) = send(router.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.sessions.is_empty());

        // Closing twice is still fine.
        let (status, _) = send(router.clone(), Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(router, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
