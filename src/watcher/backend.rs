//! notify-backed watch set.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use notify::event::{ModifyKind, RenameMode};
use notify::{
    recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};

use super::events::{extension_is_watched, ProgramFileEvents};
use crate::error::{IndexError, Result};

/// One recursive watcher per configured root, forwarding raw events to a
/// shared handler. Dropping the set stops watching.
pub struct WatchSet {
    watchers: Vec<RecommendedWatcher>,
}

impl std::fmt::Debug for WatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSet")
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

impl WatchSet {
    /// Starts watching every root. Startup failure for any root fails the
    /// whole set; runtime watch errors are logged and dropped.
    pub fn new(roots: &[PathBuf], handler: Arc<dyn ProgramFileEvents>) -> Result<Self> {
        let mut watchers = Vec::with_capacity(roots.len());

        for root in roots {
            let callback_handler = handler.clone();
            let mut watcher = recommended_watcher(
                move |event_result: notify::Result<Event>| match event_result {
                    Ok(event) => forward_event(callback_handler.as_ref(), &event),
                    Err(error) => warn!("watch error: {error}"),
                },
            )
            .map_err(|error| {
                IndexError::Watch(format!(
                    "failed to create watcher for {}: {error}",
                    root.display()
                ))
            })?;

            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|error| {
                    IndexError::Watch(format!("failed to watch {}: {error}", root.display()))
                })?;

            info!("watching program root {}", root.display());
            watchers.push(watcher);
        }

        Ok(Self { watchers })
    }

    /// Number of watched roots.
    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

/// Translates a notify event into handler calls, filtering paths to the
/// watched extension set. Runs on the notify callback thread.
pub(crate) fn forward_event(handler: &dyn ProgramFileEvents, event: &Event) {
    match event.kind {
        EventKind::Access(_) => {}
        EventKind::Create(_) => {
            for path in watched_paths(event) {
                handler.on_created(path);
            }
        }
        EventKind::Remove(_) => {
            for path in watched_paths(event) {
                handler.on_deleted(path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            if let [old_path, new_path] = event.paths.as_slice() {
                if extension_is_watched(old_path) || extension_is_watched(new_path) {
                    handler.on_renamed(old_path, new_path);
                }
            }
        }
        // Some backends report a rename as separate from/to events.
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            for path in watched_paths(event) {
                handler.on_deleted(path);
            }
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            for path in watched_paths(event) {
                handler.on_created(path);
            }
        }
        EventKind::Modify(_) => {
            for path in watched_paths(event) {
                handler.on_changed(path);
            }
        }
        _ => {}
    }
}

fn watched_paths(event: &Event) -> impl Iterator<Item = &std::path::Path> {
    event
        .paths
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| extension_is_watched(path))
}
