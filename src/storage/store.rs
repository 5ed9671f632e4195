//! Dataset stores.

mod store_sync;

pub use store_sync::filesystem_store::{FilesystemStore, FilesystemStoreCreateError};
pub use store_sync::memory_store::MemoryStore;
