//! End-to-end scenarios against drafts stored on disk.

use std::time::{Duration, Instant};

use drafts::{
    Autosave, DraftId, DraftStore, EditorState, FileStorage, IdentityPolicy, Language,
    autosave::AutosaveOptions,
    storage::{DRAFTS_STORAGE_KEY, StoreOptions},
};
use tempfile::TempDir;

fn open(tmp: &TempDir) -> DraftStore<FileStorage> {
    DraftStore::load(FileStorage::new(tmp.path().join(".drafts")), StoreOptions::default())
}

#[test]
fn create_then_update_recounts_words() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(&tmp);

    let id = store
        .create("My Tale", "Once upon a time", Language::English)
        .unwrap();
    assert_eq!(store.get(&id).unwrap().word_count(), 4);

    assert!(
        store
            .update(
                &id,
                "My Tale",
                "Once upon a time, there was a fox",
                Language::English
            )
            .unwrap()
    );
    assert_eq!(store.get(&id).unwrap().word_count(), 8);

    let reopened = open(&tmp);
    assert_eq!(reopened.get(&id).unwrap().word_count(), 8);
}

#[test]
fn save_without_id_uses_placeholder_title() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(&tmp);

    let id = store
        .save(None, "", "Hello world", Language::English)
        .unwrap();

    let draft = store.get(&id).unwrap();
    assert_eq!(draft.title(), "Untitled Story");
    assert_eq!(draft.word_count(), 2);
}

#[test]
fn delete_twice_is_harmless() {
    let tmp = TempDir::new().unwrap();
    let mut store = open(&tmp);
    let id = store.create("Gone", "soon", Language::English).unwrap();

    store.delete(&id).unwrap();
    assert!(!store.exists(&id));
    assert!(store.get(&id).is_none());
    store.delete(&id).unwrap();

    assert!(!open(&tmp).exists(&id));
}

#[test]
fn load_heals_stored_collection() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".drafts");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join(format!("{DRAFTS_STORAGE_KEY}.json")),
        r#"[
            {"id":"draft-1","title":"Fox","content":"The quick fox","language":"english","lastEdited":"2024-01-01T10:00:00Z","wordCount":3},
            {"id":"draft-2","title":"Fox","content":"The quick fox ","language":"english","lastEdited":"2024-01-01T10:05:00Z","wordCount":3},
            {"id":"draft-3","title":"Empty","content":"   ","language":"telugu","lastEdited":"2024-01-02T00:00:00Z","wordCount":0}
        ]"#,
    )
    .unwrap();

    let store = open(&tmp);

    assert_eq!(store.len(), 1);
    assert!(store.exists(&DraftId::from("draft-2")));

    let on_disk = std::fs::read_to_string(dir.join(format!("{DRAFTS_STORAGE_KEY}.json"))).unwrap();
    assert!(!on_disk.contains("draft-1"));
    assert!(!on_disk.contains("draft-3"));
}

#[test]
fn autosave_session_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let options = AutosaveOptions {
        identity: IdentityPolicy::Eager,
        ..AutosaveOptions::default()
    };
    let mut session = Autosave::new(open(&tmp), options);
    let t0 = Instant::now();

    session.open_new(EditorState::blank(Language::Hindi));
    session.set_title(t0, "Night Train");
    session.set_content(t0 + Duration::from_millis(200), "The train left at midnight");
    let id = session
        .tick(t0 + Duration::from_millis(1700))
        .unwrap()
        .unwrap();
    drop(session.close());

    let store = open(&tmp);
    let draft = store.get(&id).unwrap();
    assert_eq!(draft.title(), "Night Train");
    assert_eq!(draft.language(), Language::Hindi);
    assert_eq!(draft.word_count(), 5);
}
