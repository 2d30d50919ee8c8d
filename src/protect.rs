//! Code fragment protection.
//!
//! Fenced (```` ``` ````) and inline (`` ` ``) code spans are swapped for
//! `__CODE_BLOCK_<n>__` tokens before text goes to the backend, then put
//! back verbatim afterwards.

use regex::Regex;
use std::sync::LazyLock;

/// Fenced blocks are tried before inline spans at each position.
static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s:```.*?```)|`[^`\n]+`").expect("Invalid regex"));

pub fn placeholder_token(index: usize) -> String {
    format!("__CODE_BLOCK_{}__", index)
}

/// Tokens and the fragments they stand for, in order of discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(token, fragment)| (token.as_str(), fragment.as_str()))
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, fragment)| fragment.as_str())
    }

    /// Combined character length of every token.
    pub fn total_token_len(&self) -> usize {
        self.entries.iter().map(|(token, _)| token.chars().count()).sum()
    }

    fn push(&mut self, fragment: &str) -> String {
        let token = placeholder_token(self.entries.len());
        self.entries.push((token.clone(), fragment.to_string()));
        token
    }
}

/// Replace every code span in `text` with a placeholder token.
pub fn protect(text: &str) -> (String, PlaceholderMap) {
    let mut placeholders = PlaceholderMap::default();
    let protected = CODE_SPAN
        .replace_all(text, |caps: &regex::Captures<'_>| placeholders.push(&caps[0]))
        .into_owned();
    (protected, placeholders)
}

/// Put the original fragments back. Tokens missing from `text` and
/// unknown placeholder-shaped text are left alone.
pub fn restore(text: &str, placeholders: &PlaceholderMap) -> String {
    placeholders
        .iter()
        .fold(text.to_string(), |acc, (token, fragment)| {
            acc.replace(token, fragment)
        })
}
