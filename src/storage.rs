//! Program cache persistence.
//!
//! The indexed program list is cached between runs as a versioned JSON
//! envelope. Writes are atomic (temp file + rename) so a crash mid-save
//! never leaves a torn cache; reads tolerate a missing, stale, or corrupt
//! file through `try_load`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::program::Program;

/// Cache format version - increment when changing the format.
pub const PROGRAM_CACHE_VERSION: u32 = 1;

/// Store for the indexed program list.
pub trait ProgramStorage: Send + Sync {
    /// Persists a snapshot. Errors propagate to the caller.
    fn save(&self, programs: &[Program]) -> Result<()>;

    /// Loads the persisted snapshot. Errors propagate to the caller.
    fn load(&self) -> Result<Vec<Program>>;

    /// Loads the persisted snapshot, falling back to `default` on any
    /// error. The failure is logged, never surfaced.
    fn try_load(&self, default: Vec<Program>) -> Vec<Program> {
        match self.load() {
            Ok(programs) => programs,
            Err(error) => {
                warn!("program cache load failed, using default: {error}");
                default
            }
        }
    }
}

/// On-disk envelope for the cached program list.
#[derive(Serialize, Deserialize)]
struct ProgramCache {
    version: u32,
    saved_at: u64,
    programs: Vec<Program>,
}

/// JSON-backed program storage.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgramStorage for JsonStorage {
    fn save(&self, programs: &[Program]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                IndexError::Cache(format!(
                    "failed to create cache directory {}: {error}",
                    parent.display()
                ))
            })?;
        }

        let cache = ProgramCache {
            version: PROGRAM_CACHE_VERSION,
            saved_at: unix_now_secs(),
            programs: programs.to_vec(),
        };

        // Write to temp file first for atomic operation
        let tmp_path = self.path.with_extension("tmp");
        {
            let output = File::create(&tmp_path).map_err(|error| {
                IndexError::Cache(format!(
                    "failed to create cache file {}: {error}",
                    tmp_path.display()
                ))
            })?;
            let writer = BufWriter::new(output);
            serde_json::to_writer(writer, &cache)
                .map_err(|error| IndexError::Serialization(error.to_string()))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|error| {
            IndexError::Cache(format!(
                "failed to finalize cache file {}: {error}",
                self.path.display()
            ))
        })?;

        debug!(
            "saved {} programs to {}",
            cache.programs.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Vec<Program>> {
        let input = File::open(&self.path)?;
        let reader = BufReader::new(input);
        let cache: ProgramCache = serde_json::from_reader(reader)
            .map_err(|error| IndexError::Serialization(error.to_string()))?;

        if cache.version != PROGRAM_CACHE_VERSION {
            return Err(IndexError::Cache(format!(
                "unsupported cache version {} in {}",
                cache.version,
                self.path.display()
            )));
        }

        debug!(
            "loaded {} programs from {}",
            cache.programs.len(),
            self.path.display()
        );
        Ok(cache.programs)
    }
}

pub(crate) fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
