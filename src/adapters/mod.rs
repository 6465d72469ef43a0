// Adapters layer: concrete implementations for external formats and systems.

pub mod storage;
pub mod xml;

pub use storage::LocalStorage;
