//! Text heuristics: deterministic keyword, line, and sentence extraction.
//!
//! Everything here is pure: identical input always yields identical output,
//! which keeps the fallback synthesizer reproducible without a live model.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// An alphabetic run of at least four characters; `+` may appear after the first letter.
static KEYWORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z+]{3,}").expect("Invalid keyword regex"));

const BULLET_MARKERS: [char; 3] = ['•', '-', ' '];

/// Extracts capitalized keywords in first-seen order, without duplicates.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    KEYWORD_PATTERN
        .find_iter(text)
        .map(|m| capitalize(m.as_str()))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Splits text into bullet-stripped non-empty lines and period/newline sentences.
pub fn split_lines_and_sentences(text: &str) -> (Vec<String>, Vec<String>) {
    let lines = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_matches(&BULLET_MARKERS[..]).trim().to_string())
        .collect();

    let sentences = text
        .split(|c: char| c == '.' || c == '\n')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();

    (lines, sentences)
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
