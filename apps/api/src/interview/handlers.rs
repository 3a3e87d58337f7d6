//! Axum route handlers for the interview API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::coach::{analyze_job, evaluate_answer, start_interview, StartedInterview};
use crate::interview::session::InterviewSession;
use crate::models::interview::AnswerEvaluation;
use crate::models::job::JobAnalysis;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeJobRequest {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    /// Parsed by the coach so unknown modes become a 400, not a body rejection.
    pub mode: String,
    #[serde(default)]
    pub job_analysis: JobAnalysis,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateAnswerRequest {
    pub session_id: String,
    pub question: String,
    pub answer: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/analyze-job
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeJobRequest>,
) -> Result<Json<JobAnalysis>, AppError> {
    let analysis = analyze_job(state.llm.as_ref(), &request.job_description).await?;
    Ok(Json(analysis))
}

/// POST /api/start-interview
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartedInterview>, AppError> {
    let started = start_interview(
        state.llm.as_ref(),
        &state.sessions,
        &request.mode,
        request.job_analysis,
    )
    .await?;
    Ok(Json(started))
}

/// POST /api/evaluate-answer
pub async fn handle_evaluate_answer(
    State(state): State<AppState>,
    Json(request): Json<EvaluateAnswerRequest>,
) -> Result<Json<AnswerEvaluation>, AppError> {
    let evaluation = evaluate_answer(
        state.llm.as_ref(),
        &state.sessions,
        &request.session_id,
        &request.question,
        &request.answer,
    )
    .await?;
    Ok(Json(evaluation))
}

/// GET /api/sessions/:session_id
///
/// Read-only snapshot: mode, job analysis, bank pointer, and question history.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<InterviewSession>, AppError> {
    Ok(Json(state.sessions.get(&session_id)?))
}

/// DELETE /api/sessions/:session_id
///
/// Always 204; closing an unknown session is not an error.
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> StatusCode {
    if state.sessions.close(&session_id) {
        info!("Closed interview session {session_id}");
    }
    StatusCode::NO_CONTENT
}
