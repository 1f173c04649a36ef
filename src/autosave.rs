//! Debounced autosave of an editor session.
//!
//! [`Autosave`] sits between a live editor and the [`DraftStore`](crate::DraftStore)
//! and turns a stream of edits into a bounded number of writes.

mod coordinator;
mod debounce;
pub mod publish;

pub use coordinator::{Autosave, AutosaveOptions, EditorState, IdentityPolicy, SaveStatus};
pub use debounce::Debounce;
pub use publish::{PublishError, PublishRequest, PublishedStory, Publisher};
