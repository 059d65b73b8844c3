//! PC Regulation Store - Storage adapters and the versioned state store
//!
//! This crate provides the key/value substrate adapters (in-memory and
//! file-backed) and the state store that owns the live document: boot and
//! recovery, debounced autosave, snapshots and JSON import/export.

pub mod autosave;
pub mod file;
pub mod memory;
pub mod snapshots;
pub mod state;
pub mod transfer;

pub use autosave::AutosaveScheduler;
pub use file::FileKvStore;
pub use memory::MemoryKvStore;
pub use state::{BootOutcome, SaveSource, StateStore, StoreOptions};
