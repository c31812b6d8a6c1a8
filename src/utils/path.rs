//! Path utilities: expand ~, path-safety checks, source-name sanitizing.

use std::env;
use std::path::{Component, Path, PathBuf};

/// Placeholder stored instead of a filename that fails [`validate_safe_path`].
pub const SANITIZED_FILENAME: &str = "sanitized_file.tcx";

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

/// True when `path` has no parent-traversal segment (under either `/` or
/// `\` separators) and resolves to an absolute path.
pub fn validate_safe_path(path: &str) -> bool {
    if path.trim().is_empty() || path.contains('\0') {
        return false;
    }
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return false;
    }

    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(p),
            Err(_) => return false,
        }
    };

    resolved.is_absolute()
        && !resolved
            .components()
            .any(|c| matches!(c, Component::ParentDir))
}

/// Base filename used as `_source_file`; unsafe names become
/// [`SANITIZED_FILENAME`].
pub fn sanitize_source_name(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

    if name.is_empty() || name.contains(['/', '\\']) || !validate_safe_path(name) {
        SANITIZED_FILENAME.to_string()
    } else {
        name.to_string()
    }
}
