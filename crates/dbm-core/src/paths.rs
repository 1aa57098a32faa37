//! Workspace-relative path display.
//!
//! Files shown to the user (confirmation prompts, merged batch headers) are
//! written as `//relative/path` when they live under the project root.

use std::path::{Path, PathBuf};

/// Render `path` relative to `root` with a leading `//`, or as-is when it
/// lies outside the root.
pub fn display_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) => format!("//{}", relative.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Render a list of files, one per line, each line starting with `prefix`.
pub fn format_file_list(files: &[PathBuf], root: &Path, prefix: &str) -> String {
    files
        .iter()
        .map(|f| format!("{}{}", prefix, display_path(f, root)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn resolve_against(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        root.join(p)
    }
}
