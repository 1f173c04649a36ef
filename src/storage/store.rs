//! The draft store.
//!
//! [`DraftStore`] keeps the authoritative collection of drafts in memory and
//! writes the whole collection through a [`Storage`] port after every
//! mutation. Memory is only replaced once the write has succeeded, so the
//! in-memory collection always equals the last persisted one.

use std::io;

use chrono::Utc;

use crate::{
    domain::{Draft, DraftId, Language},
    storage::{
        Storage,
        cleanup::{LoadReport, reconcile},
    },
};

/// The key the collection is stored under.
pub const DRAFTS_STORAGE_KEY: &str = "story-drafts";

/// Settings for a [`DraftStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Title given to drafts created with a blank title.
    pub untitled_title: String,
    /// Characters of trimmed content used in the duplicate-detection key.
    pub dedup_prefix_chars: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        crate::Config::default().store_options()
    }
}

/// A failed write of the draft collection.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The collection could not be serialized.
    #[error("failed to serialize drafts")]
    Serialize(#[from] serde_json::Error),
    /// The storage rejected the write.
    #[error("failed to write drafts to storage")]
    Write(#[from] io::Error),
}

/// The local collection of drafts.
#[derive(Debug)]
pub struct DraftStore<S> {
    storage: S,
    drafts: Vec<Draft>,
    options: StoreOptions,
    report: LoadReport,
}

impl<S: Storage> DraftStore<S> {
    /// Load the collection from storage and reconcile it.
    ///
    /// This never fails. Unreadable or unparseable storage is logged and
    /// treated as an empty collection. A single entry that does not decode
    /// is logged and dropped, and the rest still load. Blank drafts are
    /// purged, word counts repaired and near-duplicates merged; if that
    /// changed anything the cleaned collection is written back straight away.
    #[must_use]
    pub fn load(storage: S, options: StoreOptions) -> Self {
        let (stored, unreadable) = read_collection(&storage);
        let (drafts, mut report) = reconcile(stored, options.dedup_prefix_chars);
        report.read += unreadable;
        report.unreadable = unreadable;

        let mut store = Self {
            storage,
            drafts: Vec::new(),
            options,
            report,
        };

        if report.changed() {
            tracing::info!(
                unreadable = report.unreadable,
                purged = report.purged_empty,
                merged = report.merged_duplicates,
                repaired = report.repaired,
                "cleaning up stored drafts"
            );
            match store.persist(&drafts) {
                Ok(()) => report.healed = true,
                Err(e) => tracing::warn!("Failed to write cleaned drafts: {e}"),
            }
        }

        store.drafts = drafts;
        store.report = report;
        store
    }

    /// What the load-time pass found and fixed.
    #[must_use]
    pub const fn load_report(&self) -> LoadReport {
        self.report
    }

    /// All drafts, newest first.
    #[must_use]
    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    /// Number of drafts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Whether there are no drafts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// The store's settings.
    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The storage port.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Look up a draft by id.
    #[must_use]
    pub fn get(&self, id: &DraftId) -> Option<&Draft> {
        self.drafts.iter().find(|d| &d.id == id)
    }

    /// Whether a draft with this id exists.
    ///
    /// This reflects every mutation made so far, including one made
    /// immediately before.
    #[must_use]
    pub fn exists(&self, id: &DraftId) -> bool {
        self.position(id).is_some()
    }

    /// Create a new draft and return its id.
    ///
    /// A blank title is replaced by the configured placeholder. The new draft
    /// goes to the front of the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written, in which case
    /// nothing changes.
    pub fn create(
        &mut self,
        title: &str,
        content: &str,
        language: Language,
    ) -> Result<DraftId, StoreError> {
        let title = if title.trim().is_empty() {
            self.options.untitled_title.clone()
        } else {
            title.to_string()
        };

        let draft = Draft::new(
            DraftId::generate(),
            title,
            content.to_string(),
            language,
            Utc::now(),
        );
        let id = draft.id.clone();

        let mut next = Vec::with_capacity(self.drafts.len() + 1);
        next.push(draft);
        next.extend(self.drafts.iter().cloned());
        self.commit(next)?;

        tracing::debug!(%id, "created draft");
        Ok(id)
    }

    /// Update an existing draft.
    ///
    /// Returns `Ok(false)` without touching anything if there is no draft with
    /// this id. This never creates a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written, in which case
    /// nothing changes.
    pub fn update(
        &mut self,
        id: &DraftId,
        title: &str,
        content: &str,
        language: Language,
    ) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        let mut next = self.drafts.clone();
        next[index].apply(
            title.to_string(),
            content.to_string(),
            language,
            Utc::now(),
        );
        self.commit(next)?;

        tracing::debug!(%id, "updated draft");
        Ok(true)
    }

    /// Update the draft if `id` names one, otherwise create a new draft.
    ///
    /// Returns the id that was written: `id` itself when it existed, or the
    /// freshly allocated one.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn save(
        &mut self,
        id: Option<&DraftId>,
        title: &str,
        content: &str,
        language: Language,
    ) -> Result<DraftId, StoreError> {
        match id {
            Some(id) if self.exists(id) => {
                self.update(id, title, content, language)?;
                Ok(id.clone())
            }
            _ => self.create(title, content, language),
        }
    }

    /// Change a draft's title, keeping its content and language.
    ///
    /// Returns `Ok(false)` if there is no such draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn rename(&mut self, id: &DraftId, title: &str) -> Result<bool, StoreError> {
        let Some(draft) = self.get(id) else {
            return Ok(false);
        };
        let content = draft.content.clone();
        let language = draft.language;
        self.update(id, title, &content, language)
    }

    /// Delete a draft.
    ///
    /// Deleting an id that does not exist is not an error; it returns
    /// `Ok(false)` and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn delete(&mut self, id: &DraftId) -> Result<bool, StoreError> {
        if !self.exists(id) {
            return Ok(false);
        }

        let next = self.drafts.iter().filter(|d| &d.id != id).cloned().collect();
        self.commit(next)?;

        tracing::debug!(%id, "deleted draft");
        Ok(true)
    }

    /// Copy a draft's content and language into a new draft titled
    /// `"<title> (Copy)"`.
    ///
    /// Returns `Ok(None)` if the source does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn duplicate(&mut self, id: &DraftId) -> Result<Option<DraftId>, StoreError> {
        let Some(source) = self.get(id) else {
            return Ok(None);
        };

        let title = format!("{} (Copy)", source.title);
        let content = source.content.clone();
        let language = source.language;

        self.create(&title, &content, language).map(Some)
    }

    fn position(&self, id: &DraftId) -> Option<usize> {
        self.drafts.iter().position(|d| &d.id == id)
    }

    /// Write `next` through to storage, then adopt it.
    fn commit(&mut self, next: Vec<Draft>) -> Result<(), StoreError> {
        self.persist(&next)?;
        self.drafts = next;
        Ok(())
    }

    fn persist(&mut self, drafts: &[Draft]) -> Result<(), StoreError> {
        let json = serde_json::to_string(drafts)?;
        self.storage.set(DRAFTS_STORAGE_KEY, &json)?;
        tracing::debug!(count = drafts.len(), "persisted drafts");
        Ok(())
    }
}

/// Read the stored collection, decoding each entry on its own.
///
/// Returns the decodable drafts and the number of entries that were not.
/// Only a missing, unreadable or non-array blob yields an empty collection.
fn read_collection(storage: &impl Storage) -> (Vec<Draft>, usize) {
    let stored = match storage.get(DRAFTS_STORAGE_KEY) {
        Ok(Some(stored)) => stored,
        Ok(None) => return (Vec::new(), 0),
        Err(e) => {
            tracing::warn!("Failed to read drafts: {e}");
            return (Vec::new(), 0);
        }
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(&stored) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Failed to parse drafts: {e}");
            return (Vec::new(), 0);
        }
    };

    let total = entries.len();
    let drafts: Vec<Draft> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            serde_json::from_value(entry)
                .inspect_err(|e| tracing::warn!(index, "Skipping unreadable draft: {e}"))
                .ok()
        })
        .collect();

    let unreadable = total - drafts.len();
    (drafts, unreadable)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::storage::MemoryStorage;

    fn empty_store() -> (MemoryStorage, DraftStore<MemoryStorage>) {
        let storage = MemoryStorage::new();
        let store = DraftStore::load(storage.clone(), StoreOptions::default());
        (storage, store)
    }

    fn stored(storage: &MemoryStorage) -> Vec<Draft> {
        serde_json::from_str(&storage.raw(DRAFTS_STORAGE_KEY).unwrap()).unwrap()
    }

    #[test]
    fn created_ids_are_unique() {
        let (_storage, mut store) = empty_store();

        let ids: HashSet<DraftId> = (0..50)
            .map(|i| {
                store
                    .create(&format!("Draft {i}"), "content", Language::English)
                    .unwrap()
            })
            .collect();

        assert_eq!(ids.len(), 50);
        assert_eq!(store.len(), 50);
    }

    #[test]
    fn create_then_update_counts_words() {
        let (_storage, mut store) = empty_store();

        let id = store
            .create("My Tale", "Once upon a time", Language::English)
            .unwrap();
        assert_eq!(store.get(&id).unwrap().word_count(), 4);

        let updated = store
            .update(
                &id,
                "My Tale",
                "Once upon a time, there was a fox",
                Language::English,
            )
            .unwrap();
        assert!(updated);
        assert_eq!(store.get(&id).unwrap().word_count(), 8);
    }

    #[test]
    fn update_of_unknown_id_changes_nothing() {
        let (storage, mut store) = empty_store();
        store.create("Kept", "some words", Language::Hindi).unwrap();
        let before = storage.raw(DRAFTS_STORAGE_KEY);

        let updated = store
            .update(
                &DraftId::from("draft-missing"),
                "t",
                "c",
                Language::English,
            )
            .unwrap();

        assert!(!updated);
        assert_eq!(storage.raw(DRAFTS_STORAGE_KEY), before);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn save_with_same_id_does_not_grow() {
        let (_storage, mut store) = empty_store();
        let id = store.save(None, "Tale", "one", Language::English).unwrap();

        let first = store
            .save(Some(&id), "Tale", "one two", Language::English)
            .unwrap();
        let second = store
            .save(Some(&id), "Tale", "one two three", Language::English)
            .unwrap();

        assert_eq!(first, id);
        assert_eq!(second, id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().word_count(), 3);
    }

    #[test]
    fn save_with_stale_id_creates() {
        let (_storage, mut store) = empty_store();
        let stale = DraftId::from("draft-gone");

        let id = store
            .save(Some(&stale), "Tale", "words", Language::English)
            .unwrap();

        assert_ne!(id, stale);
        assert!(store.exists(&id));
    }

    #[test]
    fn blank_title_gets_placeholder() {
        let (_storage, mut store) = empty_store();

        let id = store.save(None, "  ", "Hello world", Language::English).unwrap();

        let draft = store.get(&id).unwrap();
        assert_eq!(draft.title(), "Untitled Story");
        assert_eq!(draft.word_count(), 2);
    }

    #[test]
    fn exists_sees_create_immediately() {
        let (_storage, mut store) = empty_store();

        let id = store.create("t", "c", Language::English).unwrap();

        assert!(store.exists(&id));
    }

    #[test]
    fn delete_is_idempotent() {
        let (_storage, mut store) = empty_store();
        let id = store.create("t", "c", Language::English).unwrap();

        assert!(store.delete(&id).unwrap());
        assert!(!store.exists(&id));
        assert!(store.get(&id).is_none());
        assert!(!store.delete(&id).unwrap());
    }

    #[test]
    fn duplicate_copies_under_new_title() {
        let (_storage, mut store) = empty_store();
        let id = store.create("Fox", "quick brown fox", Language::Telugu).unwrap();

        let copy = store.duplicate(&id).unwrap().unwrap();

        assert_ne!(copy, id);
        let copied = store.get(&copy).unwrap();
        assert_eq!(copied.title(), "Fox (Copy)");
        assert_eq!(copied.content(), "quick brown fox");
        assert_eq!(copied.language(), Language::Telugu);
        assert_eq!(store.drafts()[0].id(), &copy);
    }

    #[test]
    fn duplicate_of_missing_is_none() {
        let (_storage, mut store) = empty_store();

        assert_eq!(store.duplicate(&DraftId::from("nope")).unwrap(), None);
    }

    #[test]
    fn rename_keeps_content() {
        let (_storage, mut store) = empty_store();
        let id = store.create("Old", "body text", Language::Hindi).unwrap();

        assert!(store.rename(&id, "New").unwrap());

        let draft = store.get(&id).unwrap();
        assert_eq!(draft.title(), "New");
        assert_eq!(draft.content(), "body text");
        assert_eq!(draft.language(), Language::Hindi);
        assert!(!store.rename(&DraftId::from("nope"), "x").unwrap());
    }

    #[test]
    fn create_prepends() {
        let (_storage, mut store) = empty_store();
        let first = store.create("first", "a", Language::English).unwrap();
        let second = store.create("second", "b", Language::English).unwrap();

        let order: Vec<_> = store.drafts().iter().map(Draft::id).collect();
        assert_eq!(order, [&second, &first]);
    }

    #[test]
    fn every_mutation_writes_the_whole_collection() {
        let (storage, mut store) = empty_store();
        let a = store.create("a", "alpha", Language::English).unwrap();
        store.create("b", "beta", Language::English).unwrap();
        store.update(&a, "a", "alpha two", Language::English).unwrap();

        assert_eq!(stored(&storage), store.drafts());
    }

    #[test]
    fn failed_write_leaves_memory_untouched() {
        let (storage, mut store) = empty_store();
        let id = store.create("t", "before", Language::English).unwrap();
        storage.fail_writes(true);

        assert!(store.update(&id, "t", "after", Language::English).is_err());
        assert!(store.create("x", "y", Language::English).is_err());
        assert!(store.delete(&id).is_err());

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().content(), "before");
        assert_eq!(stored(&storage), store.drafts());
    }

    #[test]
    fn corrupt_storage_loads_empty() {
        let storage = MemoryStorage::with_value(DRAFTS_STORAGE_KEY, "{not json");

        let store = DraftStore::load(storage.clone(), StoreOptions::default());

        assert!(store.is_empty());
        assert!(!store.load_report().healed);
        assert_eq!(storage.raw(DRAFTS_STORAGE_KEY).as_deref(), Some("{not json"));
    }

    #[test]
    fn one_bad_entry_does_not_discard_the_rest() {
        let storage = MemoryStorage::with_value(
            DRAFTS_STORAGE_KEY,
            r#"[
                {"id":"novel","title":"Novel","content":"months of work","language":"english","lastEdited":"2024-01-01T00:00:00Z","wordCount":3},
                {"id":"broken","title":"Broken","content":null,"language":"english","lastEdited":"2024-01-02T00:00:00Z","wordCount":0},
                {"id":"clock","title":"Clock","content":"bad time","language":"english","lastEdited":"yesterday","wordCount":2}
            ]"#,
        );

        let mut store = DraftStore::load(storage.clone(), StoreOptions::default());
        store.create("New", "hello", Language::English).unwrap();

        let novel = DraftId::from("novel");
        assert_eq!(store.len(), 2);
        assert!(store.exists(&novel));
        assert_eq!(store.load_report().read, 3);
        assert_eq!(store.load_report().unreadable, 2);
        assert!(stored(&storage).iter().any(|d| d.id() == &novel));
    }

    #[test]
    fn non_array_storage_loads_empty() {
        let storage = MemoryStorage::with_value(DRAFTS_STORAGE_KEY, r#"{"id":"x"}"#);

        let store = DraftStore::load(storage, StoreOptions::default());

        assert!(store.is_empty());
        assert_eq!(store.load_report().unreadable, 0);
    }

    #[test]
    fn load_purges_whitespace_content_and_heals() {
        let storage = MemoryStorage::with_value(
            DRAFTS_STORAGE_KEY,
            r#"[
                {"id":"a","title":"Real","content":"words here","language":"english","lastEdited":"2024-01-01T00:00:00Z","wordCount":2},
                {"id":"b","title":"Blank","content":"   ","language":"english","lastEdited":"2024-01-02T00:00:00Z","wordCount":0}
            ]"#,
        );

        let store = DraftStore::load(storage.clone(), StoreOptions::default());

        assert_eq!(store.len(), 1);
        assert!(store.exists(&DraftId::from("a")));
        assert!(store.load_report().healed);
        assert_eq!(stored(&storage), store.drafts());
    }

    #[test]
    fn load_keeps_latest_duplicate() {
        let storage = MemoryStorage::with_value(
            DRAFTS_STORAGE_KEY,
            r#"[
                {"id":"old","title":"Tale","content":"Once upon a time","language":"english","lastEdited":"2024-01-01T00:00:00Z","wordCount":4},
                {"id":"new","title":"Tale","content":"Once upon a time","language":"english","lastEdited":"2024-03-01T00:00:00Z","wordCount":4}
            ]"#,
        );

        let store = DraftStore::load(storage, StoreOptions::default());

        assert_eq!(store.len(), 1);
        assert_eq!(store.drafts()[0].id().as_str(), "new");
        assert_eq!(store.load_report().merged_duplicates, 1);
    }

    #[test]
    fn clean_storage_is_not_rewritten() {
        let raw = r#"[{"id":"a","title":"t","content":"one","language":"english","lastEdited":"2024-01-01T00:00:00Z","wordCount":1}]"#;
        let storage = MemoryStorage::with_value(DRAFTS_STORAGE_KEY, raw);

        let store = DraftStore::load(storage.clone(), StoreOptions::default());

        assert_eq!(store.len(), 1);
        assert!(!store.load_report().healed);
        assert_eq!(storage.raw(DRAFTS_STORAGE_KEY).as_deref(), Some(raw));
    }

    #[test]
    fn failed_heal_still_serves_cleaned_drafts() {
        let storage = MemoryStorage::with_value(
            DRAFTS_STORAGE_KEY,
            r#"[{"id":"a","title":"t","content":"","language":"english","lastEdited":"2024-01-01T00:00:00Z","wordCount":0}]"#,
        );
        storage.fail_writes(true);

        let store = DraftStore::load(storage, StoreOptions::default());

        assert!(store.is_empty());
        assert!(!store.load_report().healed);
    }
}
