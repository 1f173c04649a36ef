mod backend;
mod cleanup;
pub mod store;

pub use backend::{FileStorage, MemoryStorage, Storage};
pub use cleanup::LoadReport;
pub use store::{DRAFTS_STORAGE_KEY, DraftStore, StoreError, StoreOptions};
