//! Local Story Drafts
//!
//! Drafts are unpublished stories kept in a local key-value store. The
//! [`DraftStore`] owns the collection; the [`Autosave`] coordinator persists
//! a live editor session into it.

pub mod domain;
pub use domain::{Config, Draft, DraftId, Language};

/// Key-value storage and the draft store built on it.
pub mod storage;
pub use storage::{DraftStore, FileStorage, MemoryStorage, Storage, StoreError};

pub mod autosave;
pub use autosave::{Autosave, EditorState, IdentityPolicy, SaveStatus};
