//! Interview sessions: one in-memory record per candidate conversation.
//!
//! The store is the sole owner of session state. Handlers receive snapshots;
//! every mutation goes through a store method under the map lock.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::interview::InterviewMode;
use crate::models::job::JobAnalysis;

pub static BEHAVIORAL_QUESTIONS: [&str; 10] = [
    "Tell me about a time you faced a challenge at work or school.",
    "Describe a time when you had to work under pressure.",
    "Tell me about a time you took initiative.",
    "Describe a time you worked on a team project.",
    "Tell me about a conflict you had and how you resolved it.",
    "Describe a time you solved a complex problem.",
    "Tell me about a time you had to learn something quickly.",
    "Describe a time you made a mistake and how you handled it.",
    "Tell me about a time you had to persuade someone.",
    "Describe a time you showed leadership.",
];

pub static GENERAL_QUESTIONS: [&str; 5] = [
    "Tell me about yourself.",
    "Why do you want this job?",
    "Why this company?",
    "What are your strengths?",
    "What is a weakness you're working on?",
];

/// The fixed question bank for a mode, or `None` for generated (role) questions.
pub fn question_bank(mode: InterviewMode) -> Option<&'static [&'static str]> {
    match mode {
        InterviewMode::Behavioral => Some(&BEHAVIORAL_QUESTIONS[..]),
        InterviewMode::General => Some(&GENERAL_QUESTIONS[..]),
        InterviewMode::Role => None,
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(String),

    #[error("No fixed question bank for {0} mode")]
    InvalidMode(InterviewMode),
}

/// State of one interview.
#[derive(Debug, Clone, Serialize)]
pub struct InterviewSession {
    pub session_id: String,
    pub mode: InterviewMode,
    pub job_analysis: JobAnalysis,
    /// Index of the next fixed-bank question. The first question is served at creation.
    pub pointer: usize,
    /// Every question served so far, oldest first.
    pub asked_questions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe session repository, cheap to clone into handler state.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, InterviewSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new session whose first question has already been served.
    pub fn create(
        &self,
        mode: InterviewMode,
        job_analysis: JobAnalysis,
        first_question: String,
    ) -> String {
        let session_id = Uuid::new_v4().to_string();
        let session = InterviewSession {
            session_id: session_id.clone(),
            mode,
            job_analysis,
            pointer: 1,
            asked_questions: vec![first_question],
            created_at: Utc::now(),
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), session);
        session_id
    }

    /// Returns a snapshot of the session.
    pub fn get(&self, session_id: &str) -> Result<InterviewSession, SessionError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Serves the next bank question, wrapping around when the bank is exhausted.
    pub fn next_fixed_question(&self, session_id: &str) -> Result<String, SessionError> {
        self.with_session(session_id, |session| {
            let bank = question_bank(session.mode).ok_or(SessionError::InvalidMode(session.mode))?;
            let question = bank[session.pointer % bank.len()].to_string();
            session.pointer += 1;
            session.asked_questions.push(question.clone());
            Ok(question)
        })
    }

    /// Appends an externally generated question; the bank pointer is untouched.
    pub fn record_question(&self, session_id: &str, question: String) -> Result<(), SessionError> {
        self.with_session(session_id, |session| {
            session.asked_questions.push(question);
            Ok(())
        })
    }

    pub fn last_question(&self, session_id: &str) -> Result<Option<String>, SessionError> {
        Ok(self.get(session_id)?.asked_questions.last().cloned())
    }

    /// Removes the session. Closing an unknown session is a no-op.
    pub fn close(&self, session_id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_session<T>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut InterviewSession) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        f(session)
    }
}
