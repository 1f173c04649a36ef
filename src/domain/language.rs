use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The script or locale a draft is written in.
///
/// This is descriptive only. Nothing checks that the content actually uses
/// the script named here.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Language {
    /// English (Latin script).
    #[default]
    English,
    /// Telugu.
    Telugu,
    /// Hindi (Devanagari).
    Hindi,
}

impl Language {
    /// Every supported language, in menu order.
    pub const ALL: [Self; 3] = [Self::English, Self::Telugu, Self::Hindi];

    /// The tag used in storage and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Telugu => "telugu",
            Self::Hindi => "hindi",
        }
    }

    /// A human-readable label, in the language's own script.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Telugu => "తెలుగు",
            Self::Hindi => "हिन्दी",
        }
    }

    /// Map an arbitrary tag onto the closed set, falling back to English.
    ///
    /// Stored collections and publish requests go through this so that an
    /// unknown tag never makes a whole collection unreadable.
    #[must_use]
    pub fn from_tag_lossy(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a language tag outside the supported set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown language '{0}': expected one of english, telugu, hindi")]
pub struct LanguageError(String);

impl FromStr for Language {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str() == tag)
            .ok_or_else(|| LanguageError(s.to_string()))
    }
}

impl From<String> for Language {
    fn from(tag: String) -> Self {
        Self::from_tag_lossy(&tag)
    }
}

impl From<Language> for &'static str {
    fn from(language: Language) -> Self {
        language.as_str()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("english", Language::English)]
    #[test_case("Telugu", Language::Telugu)]
    #[test_case(" HINDI ", Language::Hindi)]
    fn parses_known_tags(tag: &str, expected: Language) {
        assert_eq!(tag.parse::<Language>().unwrap(), expected);
    }

    #[test]
    fn strict_parse_rejects_unknown_tag() {
        let error = "klingon".parse::<Language>().unwrap_err();
        assert_eq!(error, LanguageError("klingon".to_string()));
    }

    #[test]
    fn unknown_stored_tag_falls_back_to_english() {
        let language: Language = serde_json::from_str("\"klingon\"").unwrap();
        assert_eq!(language, Language::English);
    }

    #[test]
    fn serializes_as_lowercase_tag() {
        let json = serde_json::to_string(&Language::Telugu).unwrap();
        assert_eq!(json, "\"telugu\"");
    }
}
