//! Path normalization utilities
//!
//! Source paths in results use '/' as separator and are relative to root.

use std::path::Path;

/// Label used for outlines read from stdin
pub const STDIN_LABEL: &str = "-";

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Label for an input path: `-` for stdin, root-relative when possible,
/// otherwise the path as given
pub fn source_label(path: &Path, root: &Path) -> String {
    if path == Path::new(STDIN_LABEL) {
        return STDIN_LABEL.to_string();
    }
    make_relative(path, root).unwrap_or_else(|| normalize_path(path))
}

/// Resolve a user-supplied path against root, leaving stdin and absolute
/// paths untouched
pub fn resolve(path: &Path, root: &Path) -> std::path::PathBuf {
    if path == Path::new(STDIN_LABEL) || path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
