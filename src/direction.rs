use crate::error::TranslateError;
use serde::{Deserialize, Serialize};

/// Translation direction between the two supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    JaToEn,
    EnToJa,
}

/// Language names and locale codes used when prompting the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    pub source_lang: &'static str,
    pub source_code: &'static str,
    pub target_lang: &'static str,
    pub target_code: &'static str,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::JaToEn, Direction::EnToJa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::JaToEn => "ja_to_en",
            Direction::EnToJa => "en_to_ja",
        }
    }

    pub fn languages(&self) -> LanguagePair {
        match self {
            Direction::JaToEn => LanguagePair {
                source_lang: "Japanese",
                source_code: "ja",
                target_lang: "English",
                target_code: "en-US",
            },
            Direction::EnToJa => LanguagePair {
                source_lang: "English",
                source_code: "en-US",
                target_lang: "Japanese",
                target_code: "ja",
            },
        }
    }

    /// The opposite direction.
    pub fn toggle(&self) -> Self {
        match self {
            Direction::JaToEn => Direction::EnToJa,
            Direction::EnToJa => Direction::JaToEn,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = TranslateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ja_to_en" => Ok(Direction::JaToEn),
            "en_to_ja" => Ok(Direction::EnToJa),
            _ => Err(TranslateError::InvalidDirection(s.to_string())),
        }
    }
}
