//! Model Output Extraction
//!
//! Pulls a question or concept plus suggested search terms out of free-text
//! model output. The patterns are deliberately loose: when nothing matches,
//! callers get the input text back (its first line) and an empty term list,
//! so a malformed model response never breaks the flow.

use once_cell::sync::Lazy;
use regex::Regex;

static QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)question:?\s*([^?\n][^?]*\??)").expect("valid regex"));

static CONCEPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)concept:?\s*([^.\n][^.]*\.?)").expect("valid regex"));

static SEARCH_TERMS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)search terms:?\s*(.*?)(?:\n\n|\z)").expect("valid regex"));

/// Extract the question restated by the model, or fall back to the first
/// line of the input.
pub fn extract_question(text: &str) -> String {
    QUESTION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| first_line(text))
}

/// Extract the concept named by the model, or fall back to the first line
/// of the input.
pub fn extract_concept(text: &str) -> String {
    CONCEPT_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| first_line(text))
}

/// Extract a list of search terms from a "Search terms:" section. Returns
/// an empty list when no such section exists.
pub fn extract_search_terms(text: &str) -> Vec<String> {
    let Some(section) = SEARCH_TERMS_RE.captures(text).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };

    section
        .as_str()
        .lines()
        .map(clean_list_item)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip list markers ("- ", "* ", "1. ", "2) ") from a line
fn clean_list_item(line: &str) -> &str {
    let line = line.trim();
    let stripped = line
        .trim_start_matches(|c: char| c == '-' || c == '*')
        .trim_start();
    // Numbered markers: digits followed by '.' or ')'
    let digits = stripped.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &stripped[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim();
        }
    }
    stripped
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
