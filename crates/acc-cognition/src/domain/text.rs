//! Text normalization shared by recall, qualification and compression
//!
//! Tokens are ASCII word runs (lowercased) plus Japanese character runs. A
//! Japanese run of at least two characters contributes itself and every
//! two-character shingle; single-character runs are dropped.

use std::collections::HashSet;

/// Shingle width for Japanese runs
const SHINGLE_SIZE: usize = 2;

fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_japanese(c: char) -> bool {
    matches!(c,
        '\u{3041}'..='\u{3093}'     // hiragana ぁ-ん
        | '\u{30A1}'..='\u{30F6}'   // katakana ァ-ヶ
        | '\u{30FC}'                // ー
        | '\u{4E00}'..='\u{9FA0}'   // kanji 一-龠
        | '\u{3005}' | '\u{3006}' | '\u{3024}' // 々 〆 〤
    )
}

/// Collect maximal runs of characters matching `pred`
fn runs(text: &str, pred: fn(char) -> bool) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if pred(c) {
            current.push(c);
        } else if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Normalize text into a comparable token set
pub fn normalize_tokens(text: &str) -> HashSet<String> {
    let mut tokens: HashSet<String> = runs(text, is_ascii_word)
        .into_iter()
        .map(|token| token.to_ascii_lowercase())
        .collect();

    for chunk in runs(text, is_japanese) {
        let chars: Vec<char> = chunk.chars().collect();
        if chars.len() < SHINGLE_SIZE {
            continue;
        }
        for window in chars.windows(SHINGLE_SIZE) {
            tokens.insert(window.iter().collect());
        }
        tokens.insert(chunk);
    }

    tokens
}

/// Number of tokens shared by two sets
pub fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}

/// Collapse whitespace and cap the text at `max_chars` characters
///
/// Longer text keeps its first `max_chars - 3` characters followed by `...`.
pub fn summarize_text(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let head: String = collapsed
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect();
    format!("{head}...")
}

/// Trim values, drop blanks and repeats (first occurrence wins) and keep at
/// most `limit`
pub fn dedupe_and_bound<I, S>(values: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if out.len() >= limit {
            break;
        }
        let value = value.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.to_string()) {
            out.push(value.to_string());
        }
    }
    out
}
