//! Post-processing of raw backend output.

use crate::protect::PlaceholderMap;

/// Inputs shorter than this (in characters) get no time estimate.
pub const LONG_TEXT_THRESHOLD: usize = 5000;

const MIN_ESTIMATE_SECS: u64 = 5;
const SECS_PER_THOUSAND_CHARS: u64 = 3;

/// Lead-in phrases models like to put before the actual translation.
/// Longer phrases come first so they win over their own suffixes.
const KNOWN_PREFIXES: &[&str] = &[
    "Here is the English translation:",
    "Here is the Japanese translation:",
    "Here is the translation:",
    "Here's the translation:",
    "English translation:",
    "Japanese translation:",
    "Translated text:",
    "Translation:",
    "翻訳結果:",
    "翻訳結果：",
    "日本語訳:",
    "日本語訳：",
    "翻訳:",
    "翻訳：",
    "英訳:",
    "英訳：",
    "和訳:",
    "和訳：",
];

/// Remove one known lead-in phrase from the first non-blank line.
///
/// Content after the phrase on the same line is kept; the line is dropped
/// if nothing remains. The result is always trimmed. A reply that repeats
/// a prefix line loses one copy per call, so repeated calls are not
/// idempotent on such input.
pub fn strip_prefixes(text: &str) -> String {
    let trimmed = text.trim();
    let (first, rest) = match trimmed.split_once('\n') {
        Some((first, rest)) => (first, Some(rest)),
        None => (trimmed, None),
    };

    let Some(prefix) = KNOWN_PREFIXES.iter().find(|prefix| {
        first
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }) else {
        return trimmed.to_string();
    };

    let remainder = first[prefix.len()..].trim();
    match rest {
        Some(rest) if remainder.is_empty() => rest.trim().to_string(),
        Some(rest) => format!("{}\n{}", remainder, rest).trim_end().to_string(),
        None => remainder.to_string(),
    }
}

pub fn is_empty_translation(text: &str) -> bool {
    text.trim().is_empty()
}

/// Whether the input was essentially nothing but code.
///
/// True when at least one fragment was protected and the prose left over
/// (protected text minus the tokens) is under 10% of the original length.
pub fn is_code_only(protected: &str, placeholders: &PlaceholderMap, original_len: usize) -> bool {
    if placeholders.is_empty() {
        return false;
    }
    let remaining = protected
        .chars()
        .count()
        .saturating_sub(placeholders.total_token_len());
    remaining * 10 < original_len
}

/// Rough backend latency estimate in seconds for `char_count` characters.
pub fn estimate_time(char_count: usize) -> u64 {
    if char_count < LONG_TEXT_THRESHOLD {
        return 0;
    }
    let estimate = (char_count / 1000) as u64 * SECS_PER_THOUSAND_CHARS;
    estimate.max(MIN_ESTIMATE_SECS)
}

pub fn long_text_warning(estimated_secs: u64) -> String {
    format!(
        "長文のため翻訳に時間がかかります（約{}秒）",
        estimated_secs
    )
}
