//! This bench test measures loading a large stored collection of drafts,
//! including the cleanup and duplicate-merging pass.

#![allow(missing_docs)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use drafts::{
    DraftStore, Language, MemoryStorage,
    storage::{DRAFTS_STORAGE_KEY, StoreOptions},
};

/// Builds a collection with a mix of real drafts, empty drafts and
/// near-duplicates left behind by repeated autosaves.
fn preseed_collection() -> String {
    let mut store = DraftStore::load(MemoryStorage::new(), StoreOptions::default());
    for i in 0..1000 {
        let content = format!("Chapter {}. ", i % 500).repeat(40);
        store
            .create(&format!("Story {}", i % 250), &content, Language::English)
            .unwrap();
        if i % 10 == 0 {
            store.create("Empty", "placeholder", Language::Telugu).unwrap();
        }
    }
    let raw = store.storage().raw(DRAFTS_STORAGE_KEY).unwrap();
    // blank out the placeholders so the cleanup pass has something to purge
    raw.replace("\"placeholder\"", "\"   \"")
}

fn load_drafts(c: &mut Criterion) {
    let raw = preseed_collection();
    c.bench_function("load drafts", |b| {
        b.iter_batched(
            || MemoryStorage::with_value(DRAFTS_STORAGE_KEY, raw.clone()),
            |storage| DraftStore::load(storage, StoreOptions::default()),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, load_drafts);
criterion_main!(benches);
