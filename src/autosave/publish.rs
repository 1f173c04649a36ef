//! Handing a draft over to the remote story store.

use std::error::Error;

use crate::{
    domain::{Language, word_count},
    storage::StoreError,
};

/// Longest title accepted by the publish endpoint, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Longest content accepted by the publish endpoint, in characters.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// A validated, sanitized story ready to be published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Trimmed title, at most [`MAX_TITLE_CHARS`] characters.
    pub title: String,
    /// Trimmed content, at most [`MAX_CONTENT_CHARS`] characters.
    pub content: String,
    /// Language of the content.
    pub language: Language,
    /// Word count of the sanitized content.
    pub word_count: usize,
}

impl PublishRequest {
    /// Validate and sanitize a story for publishing.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::Invalid`] if the title or content is blank.
    pub fn new(title: &str, content: &str, language: Language) -> Result<Self, PublishError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PublishError::Invalid("title"));
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(PublishError::Invalid("content"));
        }

        let content = truncate(content, MAX_CONTENT_CHARS);
        Ok(Self {
            title: truncate(title, MAX_TITLE_CHARS),
            word_count: word_count(&content),
            content,
            language,
        })
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// A story the remote store accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStory {
    /// Identifier assigned by the remote store.
    pub id: String,
    /// Title as stored remotely.
    pub title: String,
}

/// The remote publish endpoint.
pub trait Publisher {
    /// Publish a story.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote store did not confirm the story.
    fn publish(
        &mut self,
        request: &PublishRequest,
    ) -> Result<PublishedStory, Box<dyn Error + Send + Sync>>;
}

/// Why a publish did not complete.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// A required field was blank.
    #[error("{0} is required and must not be blank")]
    Invalid(&'static str),
    /// The remote store rejected the story or could not be reached.
    #[error("failed to publish story")]
    Remote(#[source] Box<dyn Error + Send + Sync>),
    /// The story was published but the local draft could not be removed.
    #[error("story {} published, but the local draft could not be removed", story.id)]
    Store {
        /// The story the remote store accepted.
        story: PublishedStory,
        /// Why the local draft could not be removed.
        #[source]
        source: StoreError,
    },
}
