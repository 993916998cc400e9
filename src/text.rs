//! Text helpers for abstracts, titles and log output.
//!
//! - Paragraph reflow of abstracts as served by the arXiv API
//! - Word tokenization for token-set keyword matching
//! - Truncation and capitalization used by logging and rendering

use std::collections::BTreeSet;

/// Reflow abstract text into paragraphs.
///
/// arXiv hard-wraps abstract text. A newline is kept only when the character
/// right before it is a period, i.e. it ends a sentence; every kept newline is
/// then written as a blank-line paragraph break (`"\n\n"`). A newline at the
/// very start is always dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_abstract("Hello world.\nNext para starts."), "Hello world.\n\nNext para starts.");
/// assert_eq!(normalize_abstract("Hello\nworld"), "Helloworld");
/// ```
pub fn normalize_abstract(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        if c == '\n' {
            if prev == Some('.') {
                out.push_str("\n\n");
            }
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// Collapse every whitespace run (newlines included) into a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split text on whitespace into lowercase words stripped of surrounding punctuation.
///
/// `"We study large language models."` yields `{"we", "study", "large", "language", "models"}`.
pub fn word_set(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or below `max`
/// bytes and suffixed with `"…(+N bytes)"`.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Upper-case the first character, lower-case the rest.
pub fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + &c.as_str().to_lowercase(),
    }
}

/// Condense an abstract into `"<first sentence>. ... <last sentence>"`.
///
/// Sentences are split on `.`. When the text ends with a period the last
/// non-empty sentence is used instead of the trailing empty one.
pub fn first_and_last_sentence(text: &str) -> String {
    let sentences: Vec<&str> = text.split('.').collect();
    let first = capitalize(&format!("{}.", sentences[0].trim()));
    let last = sentences
        .iter()
        .rev()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or_default();
    format!("{} ... {}", first, capitalize(last))
}
