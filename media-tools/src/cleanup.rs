//! Startup cleanup of the work directory.

use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

fn refuse(dir: &Path, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("refusing to clean {}: {}", dir.display(), reason),
    )
}

/// `.`, `..`, `./`, `../..` and the like: the process directory or one of its ancestors.
fn is_relative_anchor(dir: &Path) -> bool {
    dir.components()
        .all(|c| matches!(c, Component::CurDir | Component::ParentDir))
}

/// Canonical form of `path`, resolved through its deepest existing ancestor.
async fn resolve(path: &Path) -> io::Result<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path.to_path_buf();
    loop {
        match tokio::fs::canonicalize(&current).await {
            Ok(found) => {
                return Ok(missing.iter().rev().fold(found, |acc, part| acc.join(part)));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let Some(name) = current.file_name().map(|n| n.to_os_string()) else {
                    return Err(e);
                };
                missing.push(name);
                current = match current.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => PathBuf::from("."),
                };
            }
            Err(e) => return Err(e),
        }
    }
}

/// Removes everything inside `dir`, keeping the directory itself. A missing directory is
/// created. Returns the number of entries removed.
///
/// Refuses the filesystem root, the process directory and its ancestors, and any directory
/// that contains one of `keep` (the topic database, the log file).
pub async fn clean_work_dir(dir: &Path, keep: &[&Path]) -> io::Result<usize> {
    if dir.as_os_str().is_empty() || dir.parent().is_none() {
        return Err(refuse(dir, "not a work directory"));
    }
    if is_relative_anchor(dir) {
        return Err(refuse(dir, "points at the working directory or above"));
    }

    tokio::fs::create_dir_all(dir).await?;
    let resolved = tokio::fs::canonicalize(dir).await?;
    if resolved.parent().is_none() {
        return Err(refuse(dir, "not a work directory"));
    }
    for kept in keep {
        if resolve(kept).await?.starts_with(&resolved) {
            return Err(refuse(dir, &format!("contains {}", kept.display())));
        }
    }

    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let result = if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => warn!(error = %e, path = %path.display(), "Failed to remove stale entry"),
        }
    }
    info!(dir = %dir.display(), removed = removed, "Work directory cleaned");
    Ok(removed)
}
