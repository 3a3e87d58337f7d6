//! Fallback synthesizer: builds complete job analyses, answer evaluations,
//! and role questions from raw text alone.
//!
//! Used whenever the generation collaborator is unavailable or returns
//! unusable output. Unlike model output, every list produced here is non-empty.

use std::collections::HashSet;

use crate::interview::text::{extract_keywords, split_lines_and_sentences, word_count};
use crate::models::interview::{AnswerEvaluation, StarBreakdown};
use crate::models::job::JobAnalysis;

const MAX_SKILLS: usize = 6;
const MAX_RESPONSIBILITIES: usize = 6;
const MAX_COMPETENCIES: usize = 4;
const MIN_COMPETENCIES: usize = 2;
const MAX_THEMES: usize = 3;
const SITUATION_PREVIEW_CHARS: usize = 120;

const DEFAULT_SKILLS: [&str; 2] = ["Communication", "Problem solving"];
const DEFAULT_RESPONSIBILITIES: [&str; 2] =
    ["Deliver high-quality work", "Collaborate across teams"];
const DEFAULT_COMPETENCIES: [&str; 2] = ["Leadership", "Execution"];
const DEFAULT_VALUES: [&str; 2] = ["Customer focus", "Integrity"];
const DEFAULT_THEMES: [&str; 2] = ["Impact", "Ownership"];
const DEFAULT_SUMMARY: &str = "Review the full job description for details.";
const DEFAULT_FIT_SUMMARY: &str = "Demonstrate alignment with the employer's themes.";
const DEFAULT_ROLE_FOCUS: &str = "impact";

const VALUE_MARKERS: [&str; 3] = ["value", "culture", "mission"];
const COMPETENCY_SUFFIXES: [&str; 2] = ["ship", "ment"];

/// Answers at or above this length are not asked for more measurable outcomes.
const DETAILED_ANSWER_WORDS: usize = 200;
const NARRATIVE_ANSWER_WORDS: usize = 80;

// ────────────────────────────────────────────────────────────────────────────
// Job analysis
// ────────────────────────────────────────────────────────────────────────────

/// Derives a job analysis from the description text with keyword heuristics.
pub fn synthesize_job_analysis(job_description: &str) -> JobAnalysis {
    let keywords = extract_keywords(job_description);
    let (lines, sentences) = split_lines_and_sentences(job_description);

    let skills: Vec<String> = keywords.iter().take(MAX_SKILLS).cloned().collect();

    let responsibilities: Vec<String> = if lines.is_empty() {
        sentences.iter().take(MAX_RESPONSIBILITIES).cloned().collect()
    } else {
        lines.iter().take(MAX_RESPONSIBILITIES).cloned().collect()
    };

    let competencies = pick_competencies(&keywords);

    let mut values: Vec<String> = lines
        .iter()
        .filter(|line| {
            let lower = line.to_lowercase();
            VALUE_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .cloned()
        .collect();
    if values.is_empty() {
        values = keywords
            .iter()
            .take(2)
            .map(|kw| format!("Emphasis on {} excellence", kw.to_lowercase()))
            .collect();
    }

    let skill_set: HashSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let themes: Vec<String> = keywords
        .iter()
        .filter(|kw| !skill_set.contains(&kw.to_lowercase()))
        .take(MAX_THEMES)
        .cloned()
        .collect();

    let summary = sentences
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    JobAnalysis {
        skills: or_default(skills, &DEFAULT_SKILLS),
        responsibilities: or_default(responsibilities, &DEFAULT_RESPONSIBILITIES),
        competencies: or_default(competencies, &DEFAULT_COMPETENCIES),
        values: or_default(values, &DEFAULT_VALUES),
        themes: or_default(themes, &DEFAULT_THEMES),
        summary,
    }
}

/// Keywords ending in "ship"/"ment", capped at four. When fewer than two match,
/// the list is padded with the next keywords not already chosen (skills included).
fn pick_competencies(keywords: &[String]) -> Vec<String> {
    let mut competencies: Vec<String> = keywords
        .iter()
        .filter(|kw| {
            let lower = kw.to_lowercase();
            COMPETENCY_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
        })
        .take(MAX_COMPETENCIES)
        .cloned()
        .collect();

    if competencies.len() < MIN_COMPETENCIES {
        let padding: Vec<String> = keywords
            .iter()
            .filter(|kw| !competencies.contains(kw))
            .take(MIN_COMPETENCIES - competencies.len())
            .cloned()
            .collect();
        competencies.extend(padding);
    }

    competencies
}

fn or_default(list: Vec<String>, default: &[&str]) -> Vec<String> {
    if list.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        list
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Answer evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Step function over answer length: >180 → 5, >120 → 4, >60 → 3, otherwise 2.
pub fn score_for_word_count(words: usize) -> u8 {
    match words {
        w if w > 180 => 5,
        w if w > 120 => 4,
        w if w > 60 => 3,
        _ => 2,
    }
}

/// Scores an answer by length and fills the STAR block with coaching prompts.
///
/// Never sets `next_question`; the orchestration layer decides whether one is needed.
pub fn synthesize_answer_evaluation(
    _question: &str,
    answer: &str,
    job_analysis: &JobAnalysis,
) -> AnswerEvaluation {
    let words = word_count(answer);

    let strengths = vec![
        if words > NARRATIVE_ANSWER_WORDS {
            "Clear narrative structure".to_string()
        } else {
            "Concise overview".to_string()
        },
        match job_analysis.themes.first() {
            Some(theme) => format!("Relates to {theme}"),
            None => "Shows ownership".to_string(),
        },
    ];

    let mut weaknesses = Vec::new();
    if words < DETAILED_ANSWER_WORDS {
        weaknesses.push("Could include more measurable outcomes".to_string());
    }
    if !answer.to_lowercase().contains("result") {
        weaknesses.push("Add more detail on the result".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("Could add richer detail".to_string());
    }

    let fit_summary = if job_analysis.summary.is_empty() {
        DEFAULT_FIT_SUMMARY.to_string()
    } else {
        job_analysis.summary.clone()
    };

    AnswerEvaluation {
        star: StarBreakdown {
            situation: preview(answer, SITUATION_PREVIEW_CHARS),
            task: "Clarify the specific goal or expectation you owned.".to_string(),
            action: "Highlight 2-3 concrete actions you personally led.".to_string(),
            result: "Describe the measurable outcome and what you learned.".to_string(),
        },
        strengths,
        weaknesses,
        fit_summary,
        score: score_for_word_count(words),
        improvements: vec![
            "Incorporate quantifiable impact metrics".to_string(),
            "Tie the story back to the employer's current priorities".to_string(),
        ],
        next_question: None,
    }
}

/// First `max_chars` characters followed by "..." when the text is longer.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Role question
// ────────────────────────────────────────────────────────────────────────────

/// Builds a role-specific question around the first theme or responsibility.
pub fn synthesize_role_question(job_analysis: &JobAnalysis) -> String {
    let focus = job_analysis
        .themes
        .first()
        .or_else(|| job_analysis.responsibilities.first())
        .map(String::as_str)
        .unwrap_or(DEFAULT_ROLE_FOCUS);
    format!(
        "How have you demonstrated {} in your previous roles?",
        focus.to_lowercase()
    )
}
