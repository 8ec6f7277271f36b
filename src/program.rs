//! Program records and identity.
//!
//! A `Program` describes one launchable item found on disk: a plain
//! executable, a shortcut that points at something else, or an internet
//! shortcut whose "path" is the URL read from the file. Identity is
//! kind-specific, which is what makes delete/rename handling non-trivial:
//! a shortcut is identified by its resolved target, not by the link file
//! that triggered the event.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::repository::RepositoryItem;

/// The kind of launchable item, inferred from the path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramKind {
    Executable,
    Shortcut,
    AppReference,
    InternetShortcut,
    Other,
}

impl ProgramKind {
    /// Infers the kind from a path's extension (ASCII case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Other;
        };
        match extension.to_ascii_lowercase().as_str() {
            "exe" => Self::Executable,
            "lnk" => Self::Shortcut,
            "appref-ms" => Self::AppReference,
            "url" => Self::InternetShortcut,
            _ => Self::Other,
        }
    }

    /// Whether this kind goes through the debounce queue instead of being
    /// resolved on first sight. Installers emit bursts of created/changed
    /// notifications for these kinds before the file content is stable.
    pub fn is_debounced(self) -> bool {
        matches!(self, Self::Shortcut | Self::InternetShortcut)
    }
}

/// The key used to deduplicate and match programs.
///
/// Internet shortcuts are keyed by `(name, executable name)` because their
/// full path is the URL read from the file, which cannot be recovered from
/// the disk path once the file is gone. Everything else is keyed by the
/// resolved target path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramId {
    /// Case-insensitive resolved target path.
    Path(String),
    /// Case-insensitive `(name, executable name)` pair.
    NameExecutable(String, String),
}

impl ProgramId {
    /// Identity for an internet shortcut with the given display name and
    /// executable name.
    pub fn name_executable(name: &str, executable_name: &str) -> Self {
        Self::NameExecutable(
            name.to_lowercase(),
            executable_name.to_lowercase(),
        )
    }
}

/// One launchable item in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Display name, usually the file stem.
    pub name: String,
    /// File name of the launch target.
    pub executable_name: String,
    /// Resolved target path. For internet shortcuts this is the URL read
    /// from the file, not the disk path.
    pub full_path: String,
    /// Item kind.
    pub kind: ProgramKind,
    /// For shortcuts, the lowercased path of the link file this entry was
    /// resolved from. `full_path` holds the target; this field is what a
    /// deleted-link path can still be matched against once the file is
    /// gone.
    #[serde(default)]
    pub lnk_resolved_path: Option<String>,
    /// Free-form description, if the resolver produced one.
    #[serde(default)]
    pub description: String,
    /// Parent directory of the file that produced this entry.
    #[serde(default)]
    pub location: String,
    /// Whether consumers should surface this entry. Defaults to on; a
    /// host can flip it to hide an entry without forgetting it.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether resolution produced a launchable target. Entries rebuilt
    /// purely from path components are still considered valid; they exist
    /// to carry identity.
    #[serde(default = "default_true")]
    pub valid: bool,
}

fn default_true() -> bool {
    true
}

impl Program {
    /// Builds a program purely from path components, without touching the
    /// filesystem. Used to reconstruct identity for deleted or renamed
    /// files that can no longer be read.
    pub fn from_path_components(path: &Path) -> Self {
        Self {
            name: file_stem(path),
            executable_name: file_name(path),
            full_path: path.to_string_lossy().into_owned(),
            kind: ProgramKind::from_path(path),
            lnk_resolved_path: None,
            description: String::new(),
            location: parent_dir(path),
            enabled: true,
            valid: true,
        }
    }

    /// Kind-specific identity.
    pub fn id(&self) -> ProgramId {
        match self.kind {
            ProgramKind::InternetShortcut => {
                ProgramId::name_executable(&self.name, &self.executable_name)
            }
            _ => ProgramId::Path(self.full_path.to_lowercase()),
        }
    }
}

/// Two programs are the same logical program iff their identities match.
impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Program {}

impl RepositoryItem for Program {
    type Key = ProgramId;

    fn key(&self) -> ProgramId {
        self.id()
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn parent_dir(path: &Path) -> String {
    path.parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn kind_inference_is_case_insensitive() {
        assert_eq!(
            ProgramKind::from_path(Path::new("/apps/Foo.EXE")),
            ProgramKind::Executable
        );
        assert_eq!(
            ProgramKind::from_path(Path::new("/apps/foo.Lnk")),
            ProgramKind::Shortcut
        );
        assert_eq!(
            ProgramKind::from_path(Path::new("/apps/foo.appref-ms")),
            ProgramKind::AppReference
        );
        assert_eq!(
            ProgramKind::from_path(Path::new("/apps/foo.url")),
            ProgramKind::InternetShortcut
        );
        assert_eq!(
            ProgramKind::from_path(Path::new("/apps/foo.txt")),
            ProgramKind::Other
        );
        assert_eq!(ProgramKind::from_path(Path::new("/apps/foo")), ProgramKind::Other);
    }

    #[test]
    fn path_identity_is_case_insensitive() {
        let mut a = Program::from_path_components(Path::new("/Apps/Foo.exe"));
        let b = Program::from_path_components(Path::new("/apps/foo.exe"));
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());

        a.full_path = "/apps/other.exe".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn internet_shortcut_identity_ignores_disk_path() {
        let a = Program {
            name: "Radio".to_string(),
            executable_name: "Radio.url".to_string(),
            full_path: "https://example.com/radio".to_string(),
            kind: ProgramKind::InternetShortcut,
            lnk_resolved_path: None,
            description: String::new(),
            location: "/apps".to_string(),
            enabled: true,
            valid: true,
        };
        let mut b = a.clone();
        b.full_path = "https://example.com/changed".to_string();
        assert_eq!(a, b);

        b.name = "Other".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn enabled_and_valid_default_to_true() {
        let program = Program::from_path_components(Path::new("/apps/Foo.exe"));
        assert!(program.enabled);
        assert!(program.valid);

        // Records written before the flags existed deserialize with both on.
        let legacy = r#"{
            "name": "Foo",
            "executable_name": "Foo.exe",
            "full_path": "/apps/Foo.exe",
            "kind": "executable"
        }"#;
        let program: Program = serde_json::from_str(legacy).unwrap();
        assert!(program.enabled);
        assert!(program.valid);
    }

    #[test]
    fn from_path_components_fills_names() {
        let program = Program::from_path_components(&PathBuf::from("/apps/tools/Foo.exe"));
        assert_eq!(program.name, "Foo");
        assert_eq!(program.executable_name, "Foo.exe");
        assert_eq!(program.full_path, "/apps/tools/Foo.exe");
        assert_eq!(program.kind, ProgramKind::Executable);
        assert_eq!(program.location, "/apps/tools");
    }
}
