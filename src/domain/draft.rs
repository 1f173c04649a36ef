use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Language;

/// Opaque, stable identifier of a draft.
///
/// Fresh identifiers are random and never reused. Identifiers read back from
/// storage are accepted verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftId(String);

impl DraftId {
    /// Allocate a new, globally unique identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("draft-{}", Uuid::new_v4().simple()))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DraftId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for DraftId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A locally persisted, unpublished story.
///
/// The word count is derived from the content and is recomputed by every
/// write, so it cannot drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub(crate) id: DraftId,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) language: Language,
    pub(crate) last_edited: DateTime<Utc>,
    #[serde(default)]
    pub(crate) word_count: usize,
}

impl Draft {
    pub(crate) fn new(
        id: DraftId,
        title: String,
        content: String,
        language: Language,
        now: DateTime<Utc>,
    ) -> Self {
        let word_count = word_count(&content);
        Self {
            id,
            title,
            content,
            language,
            last_edited: now,
            word_count,
        }
    }

    /// Replace the editable fields and restamp the draft.
    pub(crate) fn apply(
        &mut self,
        title: String,
        content: String,
        language: Language,
        now: DateTime<Utc>,
    ) {
        self.word_count = word_count(&content);
        self.title = title;
        self.content = content;
        self.language = language;
        self.last_edited = now;
    }

    /// Recompute the word count from the content.
    ///
    /// Returns `true` if the stored value was wrong.
    pub(crate) fn repair_word_count(&mut self) -> bool {
        let actual = word_count(&self.content);
        let repaired = actual != self.word_count;
        self.word_count = actual;
        repaired
    }

    /// The draft's identifier.
    #[must_use]
    pub const fn id(&self) -> &DraftId {
        &self.id
    }

    /// The display title. May be empty if it was cleared after creation.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The body text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The language the draft is written in.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// When the draft was created or last updated.
    #[must_use]
    pub const fn last_edited(&self) -> DateTime<Utc> {
        self.last_edited
    }

    /// Number of whitespace-delimited words in the content.
    #[must_use]
    pub const fn word_count(&self) -> usize {
        self.word_count
    }

    /// Whether the content holds anything other than whitespace.
    #[must_use]
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// The first `limit` characters of the content, with `...` appended when
    /// the content is longer.
    #[must_use]
    pub fn preview(&self, limit: usize) -> String {
        let mut chars = self.content.chars();
        let mut preview: String = chars.by_ref().take(limit).collect();
        if chars.next().is_some() {
            preview.push_str("...");
        }
        preview
    }
}

/// Count whitespace-delimited, non-empty tokens.
#[must_use]
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}
