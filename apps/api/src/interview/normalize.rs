//! Response normalizer: the only place loosely-typed generation output is read.
//!
//! Model output and fallback output both pass through here, so every result
//! leaving the core has complete list fields and an in-range score.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::interview::{AnswerEvaluation, StarBreakdown};
use crate::models::job::JobAnalysis;

/// A JSON object as returned by the generation collaborator.
pub type RawRecord = Map<String, Value>;

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 5.0;
const DEFAULT_SCORE: f64 = 3.0;

/// Coerces a job analysis record into the canonical shape.
///
/// An empty summary borrows the first responsibility.
pub fn normalize_job_analysis(raw: &RawRecord) -> JobAnalysis {
    let responsibilities = ensure_list(raw.get("responsibilities"));
    let mut summary = scalar_text(raw.get("summary"));
    if summary.is_empty() {
        if let Some(first) = responsibilities.first() {
            summary = first.clone();
        }
    }

    JobAnalysis {
        skills: ensure_list(raw.get("skills")),
        responsibilities,
        competencies: ensure_list(raw.get("competencies")),
        values: ensure_list(raw.get("values")),
        themes: ensure_list(raw.get("themes")),
        summary,
    }
}

/// Coerces an evaluation record into the canonical shape.
///
/// `next_question` is left unset; see [`extract_question`].
pub fn normalize_evaluation(raw: &RawRecord) -> AnswerEvaluation {
    let star = match raw.get("star") {
        Some(Value::Object(block)) => StarBreakdown {
            situation: scalar_text(block.get("situation")),
            task: scalar_text(block.get("task")),
            action: scalar_text(block.get("action")),
            result: scalar_text(block.get("result")),
        },
        _ => StarBreakdown::default(),
    };

    AnswerEvaluation {
        star,
        strengths: ensure_list(raw.get("strengths")),
        weaknesses: ensure_list(raw.get("weaknesses")),
        fit_summary: scalar_text(raw.get("fit_summary")),
        score: clamp_score(raw.get("score")),
        improvements: ensure_list(raw.get("improvements")),
        next_question: None,
    }
}

/// Reads a question-like field, returning `None` when missing or blank.
pub fn extract_question(raw: &RawRecord, key: &str) -> Option<String> {
    Some(scalar_text(raw.get(key))).filter(|q| !q.is_empty())
}

/// Normalizes any list-like value into trimmed, non-empty strings.
///
/// Missing or falsy values become an empty list; a scalar becomes a singleton.
pub fn ensure_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(v) if is_falsy(v) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item_text(item).trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
        Some(v) => {
            let text = item_text(v).trim().to_string();
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    }
}

/// Coerces a raw score to an integer in 1..=5; anything unparseable is 3.
///
/// Halves round to even, matching float rounding elsewhere in the pipeline.
pub fn clamp_score(value: Option<&Value>) -> u8 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .map(f64::round_ties_even)
        .unwrap_or(DEFAULT_SCORE)
        .clamp(MIN_SCORE, MAX_SCORE) as u8
}

/// Serializes a typed result back into a record so it can be normalized
/// through the same path as model output.
pub fn to_raw<T: Serialize>(value: &T) -> RawRecord {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => RawRecord::new(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Renders a JSON value as display text. Booleans are title-cased so
/// `[true]` reads as "True" in feedback lists.
fn item_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    value.map(item_text).unwrap_or_default().trim().to_string()
}
