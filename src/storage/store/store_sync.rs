pub mod filesystem_store;
pub mod memory_store;
