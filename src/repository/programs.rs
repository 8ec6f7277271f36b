//! Program repository facade.
//!
//! Owns the concurrent program collection and the machinery that keeps it
//! in sync with the filesystem: the watch set, the debounce queue worker,
//! the resolver, and the cache storage. The facade itself is the read
//! surface consumers iterate while events mutate it from other threads.
//!
//! Event handling follows kind-specific identity rules. A shortcut's
//! identity is its resolved target, so once the link file is deleted or
//! renamed the entry to remove can no longer be derived by re-reading the
//! file; it is reconstructed from what is still known, falling back to a
//! scan of the live collection. The scans are O(n) over current entries,
//! which is acceptable at program-index scale.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use log::{debug, info};
use parking_lot::Mutex;

use super::list::ListRepository;
use crate::debounce::{DebounceConfig, DebounceQueue, DebounceWorker};
use crate::error::Result;
use crate::program::{file_name, file_stem, parent_dir, Program, ProgramId, ProgramKind};
use crate::resolver::ProgramResolver;
use crate::storage::ProgramStorage;
use crate::watcher::{ProgramFileEvents, WatchSet};

/// Bulk enumerator producing the full program set for a rescan.
pub trait ProgramScanner: Send + Sync {
    fn scan(&self) -> Vec<Program>;
}

/// Live index of launchable programs.
pub struct ProgramRepository {
    programs: ListRepository<Program>,
    resolver: Arc<dyn ProgramResolver>,
    storage: Arc<dyn ProgramStorage>,
    queue: DebounceQueue,
    watchers: Mutex<Option<WatchSet>>,
    // Declared after `queue` so the sender disconnects before the join.
    _worker: DebounceWorker,
}

impl std::fmt::Debug for ProgramRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramRepository")
            .field("programs", &self.programs.len())
            .finish()
    }
}

impl ProgramRepository {
    /// Creates the repository and spawns its debounce worker.
    pub fn new(
        resolver: Arc<dyn ProgramResolver>,
        storage: Arc<dyn ProgramStorage>,
        debounce: DebounceConfig,
    ) -> Result<Self> {
        let programs = ListRepository::new();

        let worker_programs = programs.clone();
        let worker_resolver = resolver.clone();
        let (queue, worker) = DebounceQueue::start(debounce, move |path| {
            match worker_resolver.resolve(&path) {
                Ok(program) => worker_programs.add(program),
                Err(error) => {
                    debug!("dropping settled path {}: {error}", path.display());
                }
            }
        })?;

        Ok(Self {
            programs,
            resolver,
            storage,
            queue,
            watchers: Mutex::new(None),
            _worker: worker,
        })
    }

    /// Attaches filesystem watchers for the given roots, forwarding their
    /// events into this repository. Replaces any previously attached set.
    ///
    /// The watch set holds only a weak handle back to the repository, so
    /// dropping the last strong handle detaches the watchers.
    pub fn watch(self: &Arc<Self>, roots: &[PathBuf]) -> Result<()> {
        let handler: Arc<dyn ProgramFileEvents> =
            Arc::new(WeakEventHandler(Arc::downgrade(self)));
        let watch_set = WatchSet::new(roots, handler)?;
        *self.watchers.lock() = Some(watch_set);
        Ok(())
    }

    /// Full rescan: replaces the whole contents with the scanner's output.
    /// Used for initial population and forced refresh; does not go through
    /// the watcher pipeline.
    pub fn index_programs(&self, scanner: &dyn ProgramScanner) {
        let programs = scanner.scan();
        info!("indexed {} programs from full scan", programs.len());
        self.programs.set(programs);
    }

    /// Seeds the collection from the persisted cache. Storage errors
    /// propagate; the caller decides the fallback.
    pub fn load(&self) -> Result<()> {
        let programs = self.storage.load()?;
        self.programs.set(programs);
        Ok(())
    }

    /// Persists a snapshot of the current contents.
    pub fn save(&self) -> Result<()> {
        self.storage.save(&self.programs.snapshot())
    }

    pub fn add(&self, program: Program) {
        self.programs.add(program);
    }

    pub fn remove(&self, program: &Program) -> bool {
        self.programs.remove(program)
    }

    pub fn contains(&self, program: &Program) -> bool {
        self.programs.contains(program)
    }

    pub fn contains_id(&self, id: &ProgramId) -> bool {
        self.programs.contains_key(id)
    }

    /// A consistent copy of the current contents.
    pub fn snapshot(&self) -> Vec<Program> {
        self.programs.snapshot()
    }

    /// Iterates a fresh snapshot, safe against concurrent mutation.
    pub fn iter(&self) -> impl Iterator<Item = Program> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Finds the entry that was resolved from the given link file path,
    /// case-insensitively. O(n) scan of the live collection.
    fn find_by_resolved_link(&self, lnk_path: &Path) -> Option<Program> {
        let needle = lnk_path.to_string_lossy().to_lowercase();
        self.programs
            .iter()
            .find(|program| program.lnk_resolved_path.as_deref() == Some(needle.as_str()))
    }

    /// Finds the entry matching `(name, executable name)`
    /// case-insensitively. O(n) scan of the live collection.
    fn find_by_name_and_executable(&self, name: &str, executable_name: &str) -> Option<Program> {
        let name = name.to_lowercase();
        let executable_name = executable_name.to_lowercase();
        self.programs.iter().find(|program| {
            program.name.to_lowercase() == name
                && program.executable_name.to_lowercase() == executable_name
        })
    }

    /// Reconstructs the entry a rename removed. The old file is gone, so
    /// for link kinds the identity is rebuilt from the old name plus the
    /// freshly resolved new entry.
    fn reconstruct_renamed(
        &self,
        old_path: &Path,
        kind: ProgramKind,
        new_program: Option<&Program>,
    ) -> Option<Program> {
        match kind {
            ProgramKind::Shortcut => new_program.map(|new| Program {
                name: file_stem(old_path),
                executable_name: new.executable_name.clone(),
                full_path: new.full_path.clone(),
                kind,
                lnk_resolved_path: None,
                description: String::new(),
                location: parent_dir(old_path),
                enabled: true,
                valid: true,
            }),
            ProgramKind::InternetShortcut => new_program.map(|new| Program {
                name: file_stem(old_path),
                executable_name: file_name(old_path),
                full_path: new.full_path.clone(),
                kind,
                lnk_resolved_path: None,
                description: String::new(),
                location: parent_dir(old_path),
                enabled: true,
                valid: true,
            }),
            _ => Some(Program::from_path_components(old_path)),
        }
    }
}

/// Forwards watcher events to the repository without keeping it alive.
struct WeakEventHandler(Weak<ProgramRepository>);

impl ProgramFileEvents for WeakEventHandler {
    fn on_created(&self, path: &Path) {
        if let Some(repository) = self.0.upgrade() {
            repository.on_created(path);
        }
    }

    fn on_deleted(&self, path: &Path) {
        if let Some(repository) = self.0.upgrade() {
            repository.on_deleted(path);
        }
    }

    fn on_renamed(&self, old_path: &Path, new_path: &Path) {
        if let Some(repository) = self.0.upgrade() {
            repository.on_renamed(old_path, new_path);
        }
    }

    fn on_changed(&self, path: &Path) {
        if let Some(repository) = self.0.upgrade() {
            repository.on_changed(path);
        }
    }
}

impl ProgramFileEvents for ProgramRepository {
    fn on_created(&self, path: &Path) {
        let kind = ProgramKind::from_path(path);
        if kind.is_debounced() {
            // Installers fire created+changed bursts for link kinds before
            // the file content is stable; let the queue settle them.
            self.queue.push(path.to_path_buf());
            return;
        }

        match self.resolver.resolve(path) {
            Ok(program) => self.programs.add(program),
            Err(error) => {
                debug!("dropping created event for {}: {error}", path.display());
            }
        }
    }

    fn on_changed(&self, path: &Path) {
        if ProgramKind::from_path(path).is_debounced() {
            self.queue.push(path.to_path_buf());
        }
        // Executables are re-resolved only on create/delete/rename.
    }

    fn on_deleted(&self, path: &Path) {
        let program = match ProgramKind::from_path(path) {
            // The link file is gone and its target cannot be re-read;
            // match against what the live entries resolved to.
            ProgramKind::Shortcut => self.find_by_resolved_link(path),
            ProgramKind::InternetShortcut => {
                self.find_by_name_and_executable(&file_stem(path), &file_name(path))
            }
            _ => Some(Program::from_path_components(path)),
        };

        match program {
            Some(program) => {
                self.programs.remove(&program);
            }
            None => {
                debug!("no indexed program matched deleted {}", path.display());
            }
        }
    }

    fn on_renamed(&self, old_path: &Path, new_path: &Path) {
        let kind = ProgramKind::from_path(new_path);

        let new_program = match self.resolver.resolve(new_path) {
            Ok(program) => Some(program),
            Err(error) => {
                debug!(
                    "unable to resolve renamed program at {}: {error}",
                    new_path.display()
                );
                None
            }
        };

        let old_program = self.reconstruct_renamed(old_path, kind, new_program.as_ref());
        if old_program.is_none() {
            info!(
                "unable to reconstruct program renamed away from {}",
                old_path.display()
            );
        }

        if let Some(old_program) = old_program {
            self.programs.remove(&old_program);
        }
        if let Some(new_program) = new_program {
            self.programs.add(new_program);
        }
    }
}
