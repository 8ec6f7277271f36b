//! Debounced path queue between watcher callbacks and the index.
//!
//! Shortcut installs fire bursts of created/changed notifications before
//! the final file content is stable. Resolving on first sight risks
//! indexing a half-written link, so those paths are queued and a single
//! background worker resolves them after a settle delay.
//!
//! The queue is a bounded channel owned by whoever spawns the worker;
//! producers never block the notification thread (overflow drops the path
//! with a warning), and the worker exits when every sender is dropped.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, warn};

/// Timings and capacity for the debounce queue.
#[derive(Debug, Clone)]
pub struct DebounceConfig {
    /// Maximum queued paths before producers start dropping.
    pub capacity: usize,
    /// How long to wait after dequeuing a path before resolving it, so the
    /// installer has time to finish writing the file.
    pub settle_delay: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { capacity: 512, settle_delay: Duration::from_secs(5) }
    }
}

/// Producer handle for the debounce queue.
#[derive(Debug, Clone)]
pub struct DebounceQueue {
    tx: Sender<PathBuf>,
}

impl DebounceQueue {
    /// Spawns the worker thread and returns the producer handle plus the
    /// worker handle. `on_settled` runs on the worker thread once per
    /// distinct path, after that path has waited out a full settle window.
    pub fn start<F>(
        config: DebounceConfig,
        on_settled: F,
    ) -> crate::error::Result<(Self, DebounceWorker)>
    where
        F: Fn(PathBuf) + Send + 'static,
    {
        let (tx, rx) = bounded(config.capacity);
        let settle_delay = config.settle_delay;
        let handle = thread::Builder::new()
            .name("program-index-debounce".to_string())
            .spawn(move || worker_loop(rx, settle_delay, on_settled))?;

        Ok((Self { tx }, DebounceWorker { handle: Some(handle) }))
    }

    /// Enqueues a path. Never blocks: on a full queue the path is dropped
    /// and indexing degrades until the worker catches up.
    pub fn push(&self, path: PathBuf) {
        match self.tx.try_send(path) {
            Ok(()) => {}
            Err(TrySendError::Full(path)) => {
                warn!(
                    "debounce queue full, dropping change for {}",
                    path.display()
                );
            }
            Err(TrySendError::Disconnected(path)) => {
                debug!(
                    "debounce worker stopped, dropping change for {}",
                    path.display()
                );
            }
        }
    }
}

/// Join handle for the worker thread. Dropping it after every
/// `DebounceQueue` sender is gone joins the thread.
#[derive(Debug)]
pub struct DebounceWorker {
    handle: Option<JoinHandle<()>>,
}

impl Drop for DebounceWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop<F>(rx: Receiver<PathBuf>, settle_delay: Duration, on_settled: F)
where
    F: Fn(PathBuf),
{
    // Paths drained during another path's window, each still owed a full
    // settle delay of its own.
    let mut carried: VecDeque<PathBuf> = VecDeque::new();

    loop {
        // Blocking receive once the carry-over is empty; the loop ends
        // when the last sender disconnects.
        let current = match carried.pop_front() {
            Some(path) => path,
            None => match rx.recv() {
                Ok(path) => path,
                Err(_) => break,
            },
        };

        thread::sleep(settle_delay);

        // Drain whatever arrived during the window. Duplicates of the
        // current path coalesce into this resolution; distinct paths are
        // carried over so each gets its own window.
        while let Ok(path) = rx.try_recv() {
            if path != current && !carried.contains(&path) {
                carried.push_back(path);
            }
        }

        debug!("debounced path settled: {}", current.display());
        on_settled(current);
    }
}
