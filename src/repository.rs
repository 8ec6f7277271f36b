//! Repositories of indexed programs.
//!
//! - `list` - generic identity-keyed collection safe for concurrent
//!   iteration and mutation
//! - `programs` - the program repository facade that keeps the collection
//!   synchronized with filesystem events

mod list;
mod programs;

pub use list::{ListRepository, RepositoryItem};
pub use programs::{ProgramRepository, ProgramScanner};
