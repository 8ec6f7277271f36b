//! Raw filesystem event surface.

use std::path::Path;

/// Extensions the watch set cares about. Everything else is noise.
pub const WATCHED_EXTENSIONS: [&str; 4] = ["exe", "lnk", "appref-ms", "url"];

/// Whether a path carries one of the watched extensions
/// (ASCII case-insensitive).
pub fn extension_is_watched(path: &Path) -> bool {
    let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    WATCHED_EXTENSIONS
        .iter()
        .any(|watched| extension.eq_ignore_ascii_case(watched))
}

/// Handler that raw filesystem events are forwarded to.
///
/// One method per raw event kind. Implementations must be safe against
/// arbitrary concurrent callers: the backend invokes these on the OS
/// notification threads, possibly in parallel. Tests implement this to
/// inject synthetic events without a real filesystem.
pub trait ProgramFileEvents: Send + Sync + 'static {
    fn on_created(&self, path: &Path);
    fn on_deleted(&self, path: &Path);
    fn on_renamed(&self, old_path: &Path, new_path: &Path);
    fn on_changed(&self, path: &Path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watched_extensions_match_case_insensitively() {
        assert!(extension_is_watched(Path::new("/apps/Foo.exe")));
        assert!(extension_is_watched(Path::new("/apps/Foo.EXE")));
        assert!(extension_is_watched(Path::new("/apps/Foo.lnk")));
        assert!(extension_is_watched(Path::new("/apps/Foo.appref-ms")));
        assert!(extension_is_watched(Path::new("/apps/Foo.Url")));
    }

    #[test]
    fn other_paths_are_ignored() {
        assert!(!extension_is_watched(Path::new("/apps/Foo.txt")));
        assert!(!extension_is_watched(Path::new("/apps/Foo")));
        assert!(!extension_is_watched(Path::new("/apps/")));
    }
}
