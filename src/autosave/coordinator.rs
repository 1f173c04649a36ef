use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    autosave::{
        Debounce,
        publish::{PublishError, PublishRequest, PublishedStory, Publisher},
    },
    domain::{DraftId, Language},
    storage::{DraftStore, Storage, StoreError},
};

/// What the editor shows about persistence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing to report.
    #[default]
    Idle,
    /// A commit is in progress.
    Saving,
    /// The last commit succeeded. Reverts to [`SaveStatus::Idle`] on its own.
    Saved,
    /// The last commit or publish failed.
    Error,
}

/// Whether autosave may allocate a draft identity by itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPolicy {
    /// The first autosave of a new story creates a draft; later autosaves
    /// update it. Content is never left unsaved.
    #[default]
    Eager,
    /// Autosave only updates a draft that already exists. A new story becomes
    /// a draft through an explicit save.
    Lazy,
}

/// Settings for an [`Autosave`] coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosaveOptions {
    /// Quiet period before an autosave commits.
    pub debounce: Duration,
    /// How long [`SaveStatus::Saved`] lingers.
    pub saved_display: Duration,
    /// Identity policy.
    pub identity: IdentityPolicy,
    /// Language of a blank new story.
    pub default_language: Language,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        crate::Config::default().autosave_options()
    }
}

/// The live contents of the editor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditorState {
    /// Story title.
    pub title: String,
    /// Story body.
    pub content: String,
    /// Story language.
    pub language: Language,
}

impl EditorState {
    /// An editor state with the given fields.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>, language: Language) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            language,
        }
    }

    /// A blank story in `language`.
    #[must_use]
    pub fn blank(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }
}

/// Debounced persistence of an editor session.
///
/// The coordinator owns the [`DraftStore`] for the duration of the session
/// and is driven by its caller: edits go in through the setters, and
/// [`Autosave::tick`] is called whenever the caller's event loop wakes. Time
/// is always passed in, never read, so a session can be replayed exactly.
///
/// The state observed when a session opens is the baseline and is never
/// saved by itself. Each later change restarts the debounce; the latest
/// state is committed once the debounce has elapsed without further changes.
#[derive(Debug)]
pub struct Autosave<S> {
    store: DraftStore<S>,
    options: AutosaveOptions,
    debounce: Debounce,
    state: EditorState,
    draft_id: Option<DraftId>,
    status: SaveStatus,
    saved_until: Option<Instant>,
    last_saved: Option<DateTime<Utc>>,
}

impl<S: Storage> Autosave<S> {
    /// Start a coordinator over `store` with a blank new story.
    #[must_use]
    pub fn new(store: DraftStore<S>, options: AutosaveOptions) -> Self {
        Self {
            store,
            debounce: Debounce::new(options.debounce),
            state: EditorState::blank(options.default_language),
            options,
            draft_id: None,
            status: SaveStatus::Idle,
            saved_until: None,
            last_saved: None,
        }
    }

    /// Switch the session to an existing draft.
    ///
    /// Any pending autosave of the previous state is cancelled. Returns
    /// `false`, and leaves the session untouched, pending autosave included,
    /// if there is no such draft.
    pub fn open_draft(&mut self, id: &DraftId) -> bool {
        let Some(draft) = self.store.get(id) else {
            return false;
        };
        let state = EditorState::new(draft.title(), draft.content(), draft.language());
        self.debounce.cancel();
        self.reset(state, Some(id.clone()));
        true
    }

    /// Switch the session to a new, unsaved story.
    ///
    /// Any pending autosave of the previous state is cancelled. `initial`
    /// becomes the baseline and is not saved until something changes.
    pub fn open_new(&mut self, initial: EditorState) {
        self.debounce.cancel();
        self.reset(initial, None);
    }

    fn reset(&mut self, state: EditorState, draft_id: Option<DraftId>) {
        tracing::debug!(draft = ?draft_id, "opening editor session");
        self.state = state;
        self.draft_id = draft_id;
        self.status = SaveStatus::Idle;
        self.saved_until = None;
    }

    /// Replace the title.
    pub fn set_title(&mut self, now: Instant, title: &str) {
        if self.state.title != title {
            self.state.title = title.to_string();
            self.changed(now);
        }
    }

    /// Replace the content.
    pub fn set_content(&mut self, now: Instant, content: &str) {
        if self.state.content != content {
            self.state.content = content.to_string();
            self.changed(now);
        }
    }

    /// Replace the language.
    pub fn set_language(&mut self, now: Instant, language: Language) {
        if self.state.language != language {
            self.state.language = language;
            self.changed(now);
        }
    }

    /// Replace the whole editor state.
    pub fn edit(&mut self, now: Instant, state: EditorState) {
        if self.state != state {
            self.state = state;
            self.changed(now);
        }
    }

    fn changed(&mut self, now: Instant) {
        self.debounce.cancel();
        if self.eligible() {
            self.debounce.schedule(now);
        }
    }

    /// Whether the current state may be autosaved at all.
    fn eligible(&self) -> bool {
        if self.state.content.trim().is_empty() {
            return false;
        }
        match self.options.identity {
            IdentityPolicy::Eager => true,
            IdentityPolicy::Lazy => self.draft_id.is_some(),
        }
    }

    /// Advance the session to `now`.
    ///
    /// Returns the id that was written if a debounced commit happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit could not be written. The status is
    /// then [`SaveStatus::Error`] and the store is unchanged.
    pub fn tick(&mut self, now: Instant) -> Result<Option<DraftId>, StoreError> {
        if self.status == SaveStatus::Saved && self.saved_until.is_some_and(|t| t <= now) {
            self.status = SaveStatus::Idle;
            self.saved_until = None;
        }

        if !self.debounce.fire(now) {
            return Ok(None);
        }

        match self.options.identity {
            IdentityPolicy::Eager => self.commit(now).map(Some),
            IdentityPolicy::Lazy => self.commit_existing(now),
        }
    }

    /// Save immediately, bypassing the debounce.
    ///
    /// This creates a draft if the session has none, whatever the identity
    /// policy. `title`, if given, replaces the current title first.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft could not be written.
    pub fn save_now(&mut self, now: Instant, title: Option<&str>) -> Result<DraftId, StoreError> {
        self.debounce.cancel();
        if let Some(title) = title {
            self.state.title = title.to_string();
        }
        self.commit(now)
    }

    fn commit(&mut self, now: Instant) -> Result<DraftId, StoreError> {
        self.status = SaveStatus::Saving;
        let result = self.store.save(
            self.draft_id.as_ref(),
            &self.state.title,
            &self.state.content,
            self.state.language,
        );
        self.finish(now, result)
    }

    fn commit_existing(&mut self, now: Instant) -> Result<Option<DraftId>, StoreError> {
        let Some(id) = self.draft_id.clone() else {
            return Ok(None);
        };

        self.status = SaveStatus::Saving;
        let result = self.store.update(
            &id,
            &self.state.title,
            &self.state.content,
            self.state.language,
        );
        match result {
            Ok(true) => self.finish(now, Ok(id)).map(Some),
            Ok(false) => {
                tracing::info!(%id, "draft no longer exists, dropping session identity");
                self.draft_id = None;
                self.status = SaveStatus::Idle;
                Ok(None)
            }
            Err(e) => self.finish(now, Err(e)).map(Some),
        }
    }

    fn finish(
        &mut self,
        now: Instant,
        result: Result<DraftId, StoreError>,
    ) -> Result<DraftId, StoreError> {
        match result {
            Ok(id) => {
                tracing::info!(%id, words = self.state.content.split_whitespace().count(), "saved draft");
                // a blank title was stored as the placeholder; later commits keep it
                if let Some(draft) = self.store.get(&id) {
                    self.state.title = draft.title().to_string();
                }
                self.draft_id = Some(id.clone());
                self.status = SaveStatus::Saved;
                self.saved_until = now.checked_add(self.options.saved_display);
                self.last_saved = Some(Utc::now());
                Ok(id)
            }
            Err(e) => {
                tracing::warn!("Failed to save draft: {e}");
                self.status = SaveStatus::Error;
                self.saved_until = None;
                Err(e)
            }
        }
    }

    /// Publish the current story and, once the remote store confirms it,
    /// delete the local draft.
    ///
    /// The local draft is never deleted unless the publish succeeded. After a
    /// successful publish the session continues with a blank new story.
    ///
    /// # Errors
    ///
    /// Returns an error if the story is invalid, the publisher fails, or the
    /// local draft cannot be removed afterwards. In the last case the story
    /// is already published: the error carries it, and the session has still
    /// moved on to a blank story so the same text is not published twice.
    pub fn publish<P: Publisher>(
        &mut self,
        publisher: &mut P,
    ) -> Result<PublishedStory, PublishError> {
        self.debounce.cancel();

        let request =
            PublishRequest::new(&self.state.title, &self.state.content, self.state.language)?;

        let story = match publisher.publish(&request) {
            Ok(story) => story,
            Err(e) => {
                tracing::warn!("Failed to publish story: {e}");
                self.status = SaveStatus::Error;
                return Err(PublishError::Remote(e));
            }
        };
        tracing::info!(remote = %story.id, "published story");

        let removed = self
            .draft_id
            .take()
            .map_or(Ok(false), |id| self.store.delete(&id));
        self.reset(EditorState::blank(self.options.default_language), None);

        match removed {
            Ok(_) => Ok(story),
            Err(source) => {
                tracing::warn!(remote = %story.id, "Failed to remove published draft: {source}");
                self.status = SaveStatus::Error;
                Err(PublishError::Store { story, source })
            }
        }
    }

    /// End the session, cancelling any pending autosave, and return the store.
    #[must_use]
    pub fn close(mut self) -> DraftStore<S> {
        self.debounce.cancel();
        self.store
    }

    /// The current save status.
    #[must_use]
    pub const fn status(&self) -> SaveStatus {
        self.status
    }

    /// The draft this session writes to, if it has one yet.
    #[must_use]
    pub const fn draft_id(&self) -> Option<&DraftId> {
        self.draft_id.as_ref()
    }

    /// The live editor state.
    #[must_use]
    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    /// When the session last committed successfully.
    #[must_use]
    pub const fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// When the pending autosave will fire, if one is pending.
    #[must_use]
    pub const fn pending_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &DraftStore<S> {
        &self.store
    }
}
