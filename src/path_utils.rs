//! Path utilities for resolving inputs and naming archive entries.
//!
//! Input roots arrive in whatever form the caller typed them (relative, with
//! `.`/`..` segments, trailing separators). Everything that is compared or stored
//! goes through [`absolute_path`] first so that two spellings of the same
//! directory collapse to one key.

use crate::error::{Error, Result};

use std::path::{Component, Path, PathBuf};

/// Suffix appended by [`truncate_display`] when a string is shortened.
const ELLIPSIS: &str = "...";

/// Converts a path to a string with fallback to lossy conversion.
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Gets the file name from a path with fallback to lossy conversion.
///
/// Returns `"unknown"` for paths without a final component.
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Resolves `path` against the current directory and removes `.` and `..`
/// segments lexically. Symlinks are not resolved.
///
/// # Arguments
///
/// * `path` - The path to resolve
///
/// # Returns
///
/// * `Result<PathBuf>` - The absolute, cleaned path
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidPath(
            path.to_path_buf(),
            "Path is empty".to_string(),
        ));
    }

    let absolute = std::path::absolute(path).map_err(|e| {
        Error::InvalidPath(
            path.to_path_buf(),
            format!("Cannot resolve absolute path: {}", e),
        )
    })?;

    Ok(clean_path(&absolute))
}

/// Lexically normalizes a path: drops `.` segments and folds `..` into its parent.
/// A `..` directly under the root stays at the root.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !cleaned.pop() && !cleaned.has_root() {
                    cleaned.push(component);
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::Normal(_) => {
                cleaned.push(component)
            }
        }
    }
    cleaned
}

/// Builds the ZIP entry name of `file` inside `base`: the relative path with
/// forward-slash separators on every platform.
///
/// # Arguments
///
/// * `base` - Directory the archive is built from
/// * `file` - File below `base`
///
/// # Returns
///
/// * `Result<String>` - The entry name, or an error if `file` is not below `base`
pub fn archive_entry_name(base: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(base).map_err(|_| {
        Error::InvalidPath(
            file.to_path_buf(),
            format!("Not located below '{}'", path_to_string_lossy(base)),
        )
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        return Err(Error::InvalidPath(
            file.to_path_buf(),
            "Entry name would be empty".to_string(),
        ));
    }

    Ok(parts.join("/"))
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let kept: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    format!("{}{}", kept, ELLIPSIS)
}
