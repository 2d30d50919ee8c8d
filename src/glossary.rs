//! Domain glossary loading and prompt hint rendering.
//!
//! Glossary files have historically come in three JSON shapes. They are
//! normalized on load into one per-direction term list, so hint rendering
//! never needs to know which shape the file used:
//!
//! 1. Per-direction tables:
//!    `{"ja_to_en": {"変数": "variable"}, "en_to_ja": {...}, "preserve_as_is": ["Python"]}`
//! 2. Nested per-term objects:
//!    `{"変数": {"ja_to_en": "variable", "en_to_ja": "変数", "preserve_as_is": false}}`
//! 3. Flat pairs applied to either direction:
//!    `{"変数": "variable", "_preserve_as_is": ["Python"]}`

use crate::direction::Direction;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Maximum number of terms rendered into a single prompt hint.
pub const MAX_HINT_ENTRIES: usize = 30;

const PRESERVE_KEY: &str = "preserve_as_is";
const FLAT_PRESERVE_KEY: &str = "_preserve_as_is";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlossaryEntry {
    pub source: String,
    pub target: String,
    /// The term must appear unchanged in the output.
    pub preserve: bool,
}

impl GlossaryEntry {
    fn render(&self) -> String {
        if self.preserve {
            format!("{} → {} (do not translate)", self.source, self.target)
        } else {
            format!("{} → {}", self.source, self.target)
        }
    }
}

/// Which on-disk shape a glossary was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossarySchema {
    PerDirection,
    NestedPerTerm,
    Flat,
}

/// Normalized, read-only glossary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    ja_to_en: Vec<GlossaryEntry>,
    en_to_ja: Vec<GlossaryEntry>,
}

impl Glossary {
    /// Load a glossary from a JSON file.
    ///
    /// Any failure (missing file, bad JSON, non-object root) yields an
    /// empty glossary.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("No glossary loaded from {}: {}", path.display(), e);
                return Self::default();
            }
        };

        let glossary = Self::from_json_str(&contents);
        if glossary.is_empty() {
            debug!("Glossary at {} has no usable terms", path.display());
        } else {
            debug!(
                "Loaded glossary from {} ({} ja_to_en, {} en_to_ja terms)",
                path.display(),
                glossary.ja_to_en.len(),
                glossary.en_to_ja.len()
            );
        }
        glossary
    }

    /// Parse and normalize glossary JSON; malformed input yields an empty glossary.
    pub fn from_json_str(contents: &str) -> Self {
        match serde_json::from_str::<Value>(contents) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!("Ignoring malformed glossary: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        let Value::Object(root) = value else {
            warn!("Ignoring glossary: root is not an object");
            return Self::default();
        };

        let schema = detect_schema(&root);
        debug!("Detected glossary schema: {:?}", schema);

        match schema {
            GlossarySchema::PerDirection => {
                let preserve = string_list(root.get(PRESERVE_KEY));
                Self {
                    ja_to_en: table_entries(root.get(Direction::JaToEn.as_str()), &preserve),
                    en_to_ja: table_entries(root.get(Direction::EnToJa.as_str()), &preserve),
                }
            }
            GlossarySchema::NestedPerTerm => Self {
                ja_to_en: nested_entries(&root, Direction::JaToEn),
                en_to_ja: nested_entries(&root, Direction::EnToJa),
            },
            GlossarySchema::Flat => {
                let preserve = string_list(root.get(FLAT_PRESERVE_KEY));
                let pairs: Map<String, Value> = root
                    .iter()
                    .filter(|(k, _)| !k.starts_with('_'))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                let entries = table_entries(Some(&Value::Object(pairs)), &preserve);
                Self {
                    ja_to_en: entries.clone(),
                    en_to_ja: entries,
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ja_to_en.is_empty() && self.en_to_ja.is_empty()
    }

    /// Terms for one direction, in the file's original order.
    pub fn terms(&self, direction: Direction) -> &[GlossaryEntry] {
        match direction {
            Direction::JaToEn => &self.ja_to_en,
            Direction::EnToJa => &self.en_to_ja,
        }
    }

    /// Render the first [`MAX_HINT_ENTRIES`] terms for `direction`, one per line.
    /// Returns an empty string when there are no terms.
    pub fn build_hint(&self, direction: Direction) -> String {
        self.terms(direction)
            .iter()
            .take(MAX_HINT_ENTRIES)
            .map(GlossaryEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Per-direction tables win over nested terms, which win over flat pairs.
fn detect_schema(root: &Map<String, Value>) -> GlossarySchema {
    let has_direction_table = Direction::ALL
        .iter()
        .any(|d| root.get(d.as_str()).is_some_and(Value::is_object));
    if has_direction_table {
        return GlossarySchema::PerDirection;
    }

    let has_nested_terms = root.values().any(|v| {
        v.as_object().is_some_and(|term| {
            Direction::ALL
                .iter()
                .any(|d| term.contains_key(d.as_str()))
        })
    });
    if has_nested_terms {
        GlossarySchema::NestedPerTerm
    } else {
        GlossarySchema::Flat
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let mut seen = HashSet::new();
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| seen.insert(s.to_string()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Entries from a `term -> translation` table, followed by preserve-as-is
/// terms the table does not mention (rendered as translating to themselves).
fn table_entries(table: Option<&Value>, preserve: &[String]) -> Vec<GlossaryEntry> {
    let Some(table) = table.and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut entries: Vec<GlossaryEntry> = table
        .iter()
        .filter_map(|(term, translation)| {
            translation.as_str().map(|target| GlossaryEntry {
                source: term.clone(),
                target: target.to_string(),
                preserve: preserve.contains(term),
            })
        })
        .collect();

    for term in preserve {
        if !table.contains_key(term) {
            entries.push(GlossaryEntry {
                source: term.clone(),
                target: term.clone(),
                preserve: true,
            });
        }
    }

    entries
}

fn nested_entries(root: &Map<String, Value>, direction: Direction) -> Vec<GlossaryEntry> {
    root.iter()
        .filter_map(|(term, data)| {
            let data = data.as_object()?;
            let target = data.get(direction.as_str())?.as_str()?;
            Some(GlossaryEntry {
                source: term.clone(),
                target: target.to_string(),
                preserve: data
                    .get(PRESERVE_KEY)
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            })
        })
        .collect()
}
