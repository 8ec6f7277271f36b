//! Filesystem watching for program roots.
//!
//! - `events` - the handler trait raw watcher events are forwarded to,
//!   plus the watched-extension filter
//! - `backend` - notify-backed watch set, one recursive watcher per root
//!
//! Handlers run on whatever thread the OS delivers notifications on and
//! must return quickly; the only blocking points in the pipeline live in
//! the debounce worker.

mod backend;
mod events;

pub use backend::WatchSet;
pub use events::{extension_is_watched, ProgramFileEvents, WATCHED_EXTENSIONS};
