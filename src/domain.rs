//! Domain models for story drafts.
//!
//! This module contains the draft document itself, the language tag attached
//! to it, and configuration.

/// The draft document and its identifier.
pub mod draft;
pub use draft::{Draft, DraftId, word_count};

mod language;
pub use language::{Language, LanguageError};

mod config;
pub use config::Config;
