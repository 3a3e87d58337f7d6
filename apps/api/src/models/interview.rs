use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interview mode. `Behavioral` and `General` draw from fixed question banks;
/// `Role` generates each question from the job analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    Behavioral,
    General,
    #[serde(alias = "role-specific", alias = "role_specific")]
    Role,
}

#[derive(Debug, Error)]
#[error("Unsupported interview mode: {0}")]
pub struct UnsupportedMode(pub String);

impl InterviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::Behavioral => "behavioral",
            InterviewMode::General => "general",
            InterviewMode::Role => "role",
        }
    }

    /// True when every next question has to be generated rather than read from a bank.
    pub fn is_generative(&self) -> bool {
        matches!(self, InterviewMode::Role)
    }
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewMode {
    type Err = UnsupportedMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "behavioral" => Ok(InterviewMode::Behavioral),
            "general" => Ok(InterviewMode::General),
            "role" | "role-specific" | "role_specific" => Ok(InterviewMode::Role),
            _ => Err(UnsupportedMode(s.to_string())),
        }
    }
}

/// STAR method breakdown of an answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarBreakdown {
    pub situation: String,
    pub task: String,
    pub action: String,
    pub result: String,
}

/// Structured feedback for one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub star: StarBreakdown,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub fit_summary: String,
    /// Always within 1..=5.
    pub score: u8,
    pub improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
}
