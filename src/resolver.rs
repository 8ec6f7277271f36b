//! Path to program resolution.
//!
//! Turning a path into a `Program` may require opening the file: shortcuts
//! resolve to their target, internet shortcuts carry their URL in the file
//! body. Resolution failure is non-fatal everywhere in the pipeline; callers
//! log the failure and drop the event.

use std::fs;
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::program::{file_name, file_stem, parent_dir, Program, ProgramKind};

/// Resolves a filesystem path into a program entry.
///
/// Implemented by the filesystem-backed resolver below; tests substitute
/// their own implementation to drive the pipeline without real files.
pub trait ProgramResolver: Send + Sync {
    fn resolve(&self, path: &Path) -> Result<Program>;
}

/// Default resolver that reads the filesystem.
#[derive(Debug, Default)]
pub struct FsProgramResolver;

impl ProgramResolver for FsProgramResolver {
    fn resolve(&self, path: &Path) -> Result<Program> {
        match ProgramKind::from_path(path) {
            ProgramKind::Shortcut => resolve_shortcut(path),
            ProgramKind::InternetShortcut => resolve_internet_shortcut(path),
            kind => resolve_plain(path, kind),
        }
    }
}

/// Executables and other plain files: identity is the path itself.
fn resolve_plain(path: &Path, kind: ProgramKind) -> Result<Program> {
    // Stat to confirm the file is actually there; created events can
    // outlive the file that produced them.
    fs::metadata(path)
        .map_err(|error| IndexError::resolve(path, format!("unable to stat: {error}")))?;

    let mut program = Program::from_path_components(path);
    program.kind = kind;
    Ok(program)
}

/// Shortcuts resolve to their link target. The entry's path and identity
/// are the target's; `lnk_resolved_path` records the link file's own path
/// so a later delete of the link can still be matched.
fn resolve_shortcut(path: &Path) -> Result<Program> {
    let target = fs::read_link(path)
        .map_err(|error| IndexError::resolve(path, format!("unresolvable link: {error}")))?;
    let target = if target.is_absolute() {
        target
    } else {
        path.parent().map(|p| p.join(&target)).unwrap_or(target)
    };

    Ok(Program {
        name: file_stem(path),
        executable_name: file_name(&target),
        full_path: target.to_string_lossy().into_owned(),
        kind: ProgramKind::Shortcut,
        lnk_resolved_path: Some(path.to_string_lossy().to_lowercase()),
        description: String::new(),
        location: parent_dir(path),
        enabled: true,
        valid: true,
    })
}

/// Internet shortcuts are INI-ish files with a `URL=` line. Their full
/// path is the URL, so identity falls back to the (name, executable) pair.
fn resolve_internet_shortcut(path: &Path) -> Result<Program> {
    let contents = fs::read_to_string(path)
        .map_err(|error| IndexError::resolve(path, format!("unable to read: {error}")))?;

    let url = contents
        .lines()
        .map(str::trim)
        .find_map(|line| {
            let (key, value) = line.split_once('=')?;
            key.trim().eq_ignore_ascii_case("url").then(|| value.trim())
        })
        .filter(|url| !url.is_empty())
        .ok_or_else(|| IndexError::resolve(path, "no URL= line"))?;

    Ok(Program {
        name: file_stem(path),
        executable_name: file_name(path),
        full_path: url.to_string(),
        kind: ProgramKind::InternetShortcut,
        lnk_resolved_path: None,
        description: String::new(),
        location: parent_dir(path),
        enabled: true,
        valid: true,
    })
}
