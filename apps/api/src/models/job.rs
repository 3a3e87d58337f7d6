use serde::{Deserialize, Serialize};

/// Structured insights extracted from a job description.
///
/// Every list defaults to empty when absent on the wire; `summary` is never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobAnalysis {
    pub skills: Vec<String>,
    pub responsibilities: Vec<String>,
    pub competencies: Vec<String>,
    pub values: Vec<String>,
    pub themes: Vec<String>,
    pub summary: String,
}
