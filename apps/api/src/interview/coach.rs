//! Interview orchestration: job analysis, interview start, and answer evaluation.
//!
//! Flow for each operation: build prompt → one generation attempt →
//! on a recoverable failure substitute the fallback synthesizer → normalize →
//! update the session store. Service faults surface as `AppError::Llm`.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::fallback::{
    synthesize_answer_evaluation, synthesize_job_analysis, synthesize_role_question,
};
use crate::interview::normalize::{
    extract_question, normalize_evaluation, normalize_job_analysis, to_raw, RawRecord,
};
use crate::interview::prompts::{
    build_job_analysis_prompt, build_role_question_prompt, build_star_prompt,
};
use crate::interview::session::{question_bank, SessionStore};
use crate::llm_client::JsonGenerator;
use crate::models::interview::{AnswerEvaluation, InterviewMode};
use crate::models::job::JobAnalysis;

/// Result of starting an interview.
#[derive(Debug, Clone, Serialize)]
pub struct StartedInterview {
    pub session_id: String,
    pub mode: InterviewMode,
    pub question: String,
    pub job_analysis: JobAnalysis,
}

/// Makes a single generation attempt. Unavailable or malformed output is
/// replaced by `fallback`; any other failure is returned to the caller.
async fn generate_or_fallback(
    llm: &dyn JsonGenerator,
    prompt: &str,
    task: &str,
    fallback: impl FnOnce() -> RawRecord,
) -> Result<RawRecord, AppError> {
    match llm.generate_json(prompt).await {
        Ok(raw) => Ok(raw),
        Err(e) if e.is_recoverable() => {
            warn!("{task}: generation unusable, using fallback ({e})");
            Ok(fallback())
        }
        Err(e) => Err(AppError::Llm(format!("{task} failed: {e}"))),
    }
}

/// Extracts skills, responsibilities, competencies, values, themes, and a
/// summary from a job description.
pub async fn analyze_job(
    llm: &dyn JsonGenerator,
    job_description: &str,
) -> Result<JobAnalysis, AppError> {
    let prompt = build_job_analysis_prompt(job_description);
    let raw = generate_or_fallback(llm, &prompt, "Job analysis", || {
        to_raw(&synthesize_job_analysis(job_description))
    })
    .await?;

    Ok(normalize_job_analysis(&raw))
}

/// Asks for one role-specific question, falling back to a templated one when
/// the model is unavailable or answers with an empty question.
pub async fn generate_role_question(
    llm: &dyn JsonGenerator,
    job_analysis: &JobAnalysis,
) -> Result<String, AppError> {
    let prompt = build_role_question_prompt(job_analysis);
    let raw = generate_or_fallback(llm, &prompt, "Role question generation", || {
        to_raw(&json!({ "question": synthesize_role_question(job_analysis) }))
    })
    .await?;

    Ok(extract_question(&raw, "question")
        .unwrap_or_else(|| synthesize_role_question(job_analysis)))
}

/// Opens a session and serves its first question.
pub async fn start_interview(
    llm: &dyn JsonGenerator,
    sessions: &SessionStore,
    mode: &str,
    job_analysis: JobAnalysis,
) -> Result<StartedInterview, AppError> {
    let mode: InterviewMode = mode.parse()?;

    let question = match question_bank(mode) {
        Some(bank) => bank[0].to_string(),
        None => generate_role_question(llm, &job_analysis).await?,
    };

    let session_id = sessions.create(mode, job_analysis.clone(), question.clone());
    info!(
        "Started {mode} interview session {session_id} ({} active)",
        sessions.len()
    );

    Ok(StartedInterview {
        session_id,
        mode,
        question,
        job_analysis,
    })
}

/// Scores an answer with STAR feedback and advances the session to its next question.
pub async fn evaluate_answer(
    llm: &dyn JsonGenerator,
    sessions: &SessionStore,
    session_id: &str,
    question: &str,
    answer: &str,
) -> Result<AnswerEvaluation, AppError> {
    let session = sessions.get(session_id)?;

    // A blank question means "the one I was just asked".
    let question = match question.trim() {
        "" => sessions.last_question(session_id)?.unwrap_or_default(),
        q => q.to_string(),
    };

    let prompt = build_star_prompt(&question, answer, &session.job_analysis, session.mode);
    let raw = generate_or_fallback(llm, &prompt, "Answer evaluation", || {
        to_raw(&synthesize_answer_evaluation(
            &question,
            answer,
            &session.job_analysis,
        ))
    })
    .await?;

    let mut evaluation = normalize_evaluation(&raw);

    let next_question = if session.mode.is_generative() {
        let next = match extract_question(&raw, "next_question") {
            Some(q) => q,
            None => generate_role_question(llm, &session.job_analysis).await?,
        };
        sessions.record_question(session_id, next.clone())?;
        next
    } else {
        sessions.next_fixed_question(session_id)?
    };
    evaluation.next_question = Some(next_question);

    info!(
        "Evaluated answer for session {session_id} ({}): score={}",
        session.mode, evaluation.score
    );

    Ok(evaluation)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::interview::session::GENERAL_QUESTIONS;
    use crate::llm_client::GenerationError;

    /// No credentials configured.
    struct Offline;

    #[async_trait]
    impl JsonGenerator for Offline {
        async fn generate_json(&self, _prompt: &str) -> Result<RawRecord, GenerationError> {
            Err(GenerationError::Unavailable("no api key".to_string()))
        }
    }

    /// Model answered with prose.
    struct Garbled;

    #[async_trait]
    impl JsonGenerator for Garbled {
        async fn generate_json(&self, _prompt: &str) -> Result<RawRecord, GenerationError> {
            Err(GenerationError::Malformed("not json".to_string()))
        }
    }

    /// Upstream service fault.
    struct Broken;

    #[async_trait]
    impl JsonGenerator for Broken {
        async fn generate_json(&self, _prompt: &str) -> Result<RawRecord, GenerationError> {
            Err(GenerationError::Api {
                status: 500,
                message: "overloaded".to_string(),
            })
        }
    }

    /// Replays canned records in order, then reports itself unavailable.
    struct Scripted(Mutex<VecDeque<Value>>);

    impl Scripted {
        fn new(responses: Vec<Value>) -> Self {
            Self(Mutex::new(responses.into()))
        }
    }

    #[async_trait]
    impl JsonGenerator for Scripted {
        async fn generate_json(&self, _prompt: &str) -> Result<RawRecord, GenerationError> {
            match self.0.lock().unwrap().pop_front() {
                Some(Value::Object(map)) => Ok(map),
                Some(_) => Err(GenerationError::Malformed("expected object".to_string())),
                None => Err(GenerationError::Unavailable("script exhausted".to_string())),
            }
        }
    }

    fn analysis_with_theme(theme: &str) -> JobAnalysis {
        JobAnalysis {
            themes: vec![theme.to_string()],
            summary: "Own the payments platform.".to_string(),
            ..JobAnalysis::default()
        }
    }

    fn answer_of(words: usize, tail: &str) -> String {
        format!("{} {tail}", vec!["delivered"; words - 1].join(" "))
    }

    #[tokio::test]
    async fn test_analyze_empty_description_offline_uses_defaults() {
        let analysis = analyze_job(&Offline, "").await.unwrap();
        assert!(!analysis.skills.is_empty());
        assert!(!analysis.responsibilities.is_empty());
        assert!(!analysis.competencies.is_empty());
        assert!(!analysis.values.is_empty());
        assert!(!analysis.themes.is_empty());
        assert!(!analysis.summary.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_malformed_output_matches_fallback() {
        let jd = "Lead platform engineering.\nValue customer trust.";
        let analysis = analyze_job(&Garbled, jd).await.unwrap();
        assert_eq!(analysis, synthesize_job_analysis(jd));
    }

    #[tokio::test]
    async fn test_analyze_normalizes_model_output() {
        let llm = Scripted::new(vec![json!({
            "skills": ["  Rust ", ""],
            "responsibilities": ["Ship features"],
            "themes": "Reliability"
        })]);
        let analysis = analyze_job(&llm, "Rust role").await.unwrap();
        assert_eq!(analysis.skills, vec!["Rust"]);
        assert_eq!(analysis.themes, vec!["Reliability"]);
        assert!(analysis.values.is_empty());
        assert_eq!(analysis.summary, "Ship features");
    }

    #[tokio::test]
    async fn test_analyze_surfaces_service_fault() {
        let err = analyze_job(&Broken, "Rust role").await.unwrap_err();
        match err {
            AppError::Llm(msg) => assert!(msg.contains("overloaded")),
            other => panic!("expected Llm error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_start_rejects_unsupported_mode() {
        let sessions = SessionStore::new();
        let err = start_interview(&Offline, &sessions, "technical", JobAnalysis::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn test_start_general_serves_first_bank_question() {
        let sessions = SessionStore::new();
        let started = start_interview(&Broken, &sessions, "general", JobAnalysis::default())
            .await
            .unwrap();
        assert_eq!(started.question, GENERAL_QUESTIONS[0]);
        assert_eq!(started.mode, InterviewMode::General);

        let session = sessions.get(&started.session_id).unwrap();
        assert_eq!(session.pointer, 1);
        assert_eq!(session.asked_questions, vec![GENERAL_QUESTIONS[0]]);
    }

    #[tokio::test]
    async fn test_start_role_offline_uses_templated_question() {
        let sessions = SessionStore::new();
        let started = start_interview(&Offline, &sessions, "role", analysis_with_theme("Reliability"))
            .await
            .unwrap();
        assert_eq!(
            started.question,
            "How have you demonstrated reliability in your previous roles?"
        );
    }

    #[tokio::test]
    async fn test_start_role_uses_generated_question() {
        let sessions = SessionStore::new();
        let llm = Scripted::new(vec![json!({"question": "  How do you run incident reviews?  "})]);
        let started = start_interview(&llm, &sessions, "role-specific", JobAnalysis::default())
            .await
            .unwrap();
        assert_eq!(started.question, "How do you run incident reviews?");
        assert_eq!(started.mode, InterviewMode::Role);
    }

    #[tokio::test]
    async fn test_start_role_blank_question_falls_back() {
        let sessions = SessionStore::new();
        let llm = Scripted::new(vec![json!({"question": ""})]);
        let started = start_interview(&llm, &sessions, "role", JobAnalysis::default())
            .await
            .unwrap();
        assert_eq!(
            started.question,
            "How have you demonstrated impact in your previous roles?"
        );
    }

    #[tokio::test]
    async fn test_evaluate_long_general_answer_offline() {
        let sessions = SessionStore::new();
        let started = start_interview(&Offline, &sessions, "general", JobAnalysis::default())
            .await
            .unwrap();
        let answer = answer_of(200, "and the result was a 30% cost cut");

        let evaluation = evaluate_answer(
            &Offline,
            &sessions,
            &started.session_id,
            &started.question,
            &answer,
        )
        .await
        .unwrap();

        assert_eq!(evaluation.score, 5);
        assert!(!evaluation
            .weaknesses
            .contains(&"Add more detail on the result".to_string()));
        assert_eq!(evaluation.next_question.as_deref(), Some(GENERAL_QUESTIONS[1]));
        assert_eq!(sessions.get(&started.session_id).unwrap().pointer, 2);
    }

    /// Echoes the prompt back so tests can inspect what was sent.
    struct Echo;

    #[async_trait]
    impl JsonGenerator for Echo {
        async fn generate_json(&self, prompt: &str) -> Result<RawRecord, GenerationError> {
            match json!({ "fit_summary": prompt, "score": 3 }) {
                Value::Object(map) => Ok(map),
                _ => unreachable!(),
            }
        }
    }

    #[tokio::test]
    async fn test_evaluate_blank_question_uses_last_asked() {
        let sessions = SessionStore::new();
        let id = sessions.create(
            InterviewMode::General,
            JobAnalysis::default(),
            GENERAL_QUESTIONS[0].to_string(),
        );

        let evaluation = evaluate_answer(&Echo, &sessions, &id, "  ", "I like building tools.")
            .await
            .unwrap();
        assert!(evaluation
            .fit_summary
            .contains(&format!("Question: {}", GENERAL_QUESTIONS[0])));
    }

    #[tokio::test]
    async fn test_evaluate_unknown_session_is_not_found() {
        let sessions = SessionStore::new();
        let err = evaluate_answer(&Offline, &sessions, "nope", "Q", "A")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_evaluate_clamps_model_score() {
        let sessions = SessionStore::new();
        let id = sessions.create(
            InterviewMode::Behavioral,
            JobAnalysis::default(),
            "Q0".to_string(),
        );
        let llm = Scripted::new(vec![json!({
            "star": {"situation": "Migration", "task": "Lead", "action": "Planned", "result": "Shipped"},
            "strengths": ["Ownership"],
            "weaknesses": [],
            "fit_summary": "Strong alignment.",
            "score": 9,
            "improvements": "Quantify impact"
        })]);

        let evaluation = evaluate_answer(&llm, &sessions, &id, "Q0", "answer").await.unwrap();
        assert_eq!(evaluation.score, 5);
        assert_eq!(evaluation.star.result, "Shipped");
        assert!(evaluation.weaknesses.is_empty());
        assert_eq!(evaluation.improvements, vec!["Quantify impact"]);
        assert_eq!(evaluation.fit_summary, "Strong alignment.");
    }

    #[tokio::test]
    async fn test_evaluate_role_uses_model_next_question() {
        let sessions = SessionStore::new();
        let id = sessions.create(InterviewMode::Role, JobAnalysis::default(), "Q0".to_string());
        let llm = Scripted::new(vec![json!({
            "score": 4,
            "next_question": "How did you measure success?"
        })]);

        let evaluation = evaluate_answer(&llm, &sessions, &id, "Q0", "answer").await.unwrap();
        assert_eq!(
            evaluation.next_question.as_deref(),
            Some("How did you measure success?")
        );

        let session = sessions.get(&id).unwrap();
        assert_eq!(session.pointer, 1);
        assert_eq!(session.asked_questions, vec!["Q0", "How did you measure success?"]);
    }

    #[tokio::test]
    async fn test_evaluate_role_generates_question_when_model_omits_it() {
        let sessions = SessionStore::new();
        let id = sessions.create(InterviewMode::Role, analysis_with_theme("Mentoring"), "Q0".to_string());
        let llm = Scripted::new(vec![
            json!({"score": 3}),
            json!({"question": "Tell me about a mentee you grew."}),
        ]);

        let evaluation = evaluate_answer(&llm, &sessions, &id, "Q0", "answer").await.unwrap();
        assert_eq!(
            evaluation.next_question.as_deref(),
            Some("Tell me about a mentee you grew.")
        );
    }

    #[tokio::test]
    async fn test_evaluate_role_offline_falls_back_twice() {
        let sessions = SessionStore::new();
        let id = sessions.create(InterviewMode::Role, analysis_with_theme("Mentoring"), "Q0".to_string());

        let evaluation = evaluate_answer(&Offline, &sessions, &id, "Q0", "short answer")
            .await
            .unwrap();
        assert_eq!(evaluation.score, 2);
        assert_eq!(evaluation.fit_summary, "Own the payments platform.");
        assert_eq!(
            evaluation.next_question.as_deref(),
            Some("How have you demonstrated mentoring in your previous roles?")
        );
    }

    #[tokio::test]
    async fn test_evaluate_service_fault_leaves_session_untouched() {
        let sessions = SessionStore::new();
        let id = sessions.create(InterviewMode::General, JobAnalysis::default(), "Q0".to_string());

        let err = evaluate_answer(&Broken, &sessions, &id, "Q0", "answer")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));

        let session = sessions.get(&id).unwrap();
        assert_eq!(session.pointer, 1);
        assert_eq!(session.asked_questions.len(), 1);
    }
}
