//! Live index of launchable programs.
//!
//! This crate keeps a queryable collection of launchable items
//! (executables, shortcuts, internet shortcuts) synchronized with ongoing
//! filesystem mutations while consumers iterate it concurrently:
//! - Identity-keyed concurrent collection with snapshot iteration
//! - Change resolution for noisy created/deleted/renamed/changed events,
//!   including identity reconstruction for link kinds
//! - Debounced settling of installer write bursts
//! - notify-backed watching of configured program roots
//! - Versioned JSON cache between runs

pub mod debounce;
pub mod error;
pub mod program;
pub mod repository;
pub mod resolver;
pub mod storage;
pub mod watcher;

// Re-export main types
pub use debounce::{DebounceConfig, DebounceQueue, DebounceWorker};
pub use error::{IndexError, Result};
pub use program::{Program, ProgramId, ProgramKind};
pub use repository::{ListRepository, ProgramRepository, ProgramScanner, RepositoryItem};
pub use resolver::{FsProgramResolver, ProgramResolver};
pub use storage::{JsonStorage, ProgramStorage, PROGRAM_CACHE_VERSION};
pub use watcher::{extension_is_watched, ProgramFileEvents, WatchSet, WATCHED_EXTENSIONS};
