//! Load-time reconciliation of a stored draft collection.
//!
//! Earlier autosave logic could leave empty drafts and near-duplicates of
//! the same editing session behind. This pass purges the former and collapses
//! the latter before the store hands the collection to anyone.

use std::collections::{HashMap, hash_map::Entry};

use crate::domain::Draft;

/// What the load-time pass did to a collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Number of entries read from storage.
    pub read: usize,
    /// Entries dropped because they could not be decoded as drafts.
    pub unreadable: usize,
    /// Drafts dropped because their content was blank.
    pub purged_empty: usize,
    /// Drafts dropped because a newer draft shared their dedup key.
    pub merged_duplicates: usize,
    /// Drafts whose stored word count was wrong.
    pub repaired: usize,
    /// Whether the cleaned collection was written back to storage.
    pub healed: bool,
}

impl LoadReport {
    /// Whether the cleaned collection differs from what was read.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.unreadable > 0
            || self.purged_empty > 0
            || self.merged_duplicates > 0
            || self.repaired > 0
    }
}

/// Purge empty drafts, repair word counts, and collapse duplicates.
///
/// The result is ordered by `last_edited`, newest first.
#[must_use]
pub fn reconcile(drafts: Vec<Draft>, prefix_chars: usize) -> (Vec<Draft>, LoadReport) {
    let mut report = LoadReport {
        read: drafts.len(),
        ..LoadReport::default()
    };

    let mut drafts: Vec<Draft> = drafts.into_iter().filter(Draft::has_content).collect();
    report.purged_empty = report.read - drafts.len();

    for draft in &mut drafts {
        if draft.repair_word_count() {
            report.repaired += 1;
        }
    }

    let before = drafts.len();
    let mut drafts = dedup(drafts, prefix_chars);
    report.merged_duplicates = before - drafts.len();

    // stable, so equal timestamps keep storage order
    drafts.sort_by(|a, b| b.last_edited.cmp(&a.last_edited));

    (drafts, report)
}

/// The coarse identity of a draft: its title plus a prefix of its trimmed
/// content.
///
/// Two long documents that share a title and a long opening are conflated.
/// That is a known limitation of the key.
fn dedup_key(draft: &Draft, prefix_chars: usize) -> (String, String) {
    let prefix = draft.content.trim().chars().take(prefix_chars).collect();
    (draft.title.clone(), prefix)
}

/// Keep the latest draft for each key. On a tie the first one seen wins.
fn dedup(drafts: Vec<Draft>, prefix_chars: usize) -> Vec<Draft> {
    let mut kept: Vec<Draft> = Vec::with_capacity(drafts.len());
    let mut slots: HashMap<(String, String), usize> = HashMap::with_capacity(drafts.len());

    for draft in drafts {
        match slots.entry(dedup_key(&draft, prefix_chars)) {
            Entry::Occupied(slot) => {
                let existing = &mut kept[*slot.get()];
                if draft.last_edited > existing.last_edited {
                    tracing::debug!(kept = %draft.id, dropped = %existing.id, "merging duplicate draft");
                    *existing = draft;
                } else {
                    tracing::debug!(kept = %existing.id, dropped = %draft.id, "merging duplicate draft");
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(draft);
            }
        }
    }

    kept
}
