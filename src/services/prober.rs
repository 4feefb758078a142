use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::AppError;
use crate::models::file_entry::{ContentKind, DirectoryEntry};
use crate::models::snapshot::{DirMetadata, DirStats, DirectorySnapshot};

#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeOptions {
    /// Sort names case-insensitively instead of keeping iteration order.
    pub sort_entries: bool,
}

/// Lists the immediate children of `path`.
///
/// Never fails: any error reading the directory itself becomes an empty
/// snapshot carrying the error message. Children that cannot be inspected,
/// and anything that is neither a directory nor a regular file (symlinks,
/// devices, sockets), are left out.
pub fn scan_dir(path: &str, options: &ProbeOptions) -> DirectorySnapshot {
    match probe(path, options) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::debug!("scan of {path} failed: {e}");
            DirectorySnapshot::failed(path, e.to_string())
        }
    }
}

fn probe(path: &str, options: &ProbeOptions) -> Result<DirectorySnapshot, AppError> {
    let dir_path = Path::new(path);
    let dir_meta = fs::metadata(dir_path)?;
    if !dir_meta.is_dir() {
        return Err(AppError::NotADirectory(path.to_string()));
    }

    let mut subdirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping unreadable entry in {path}: {e}");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().to_string();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("skipping {name} in {path}: {e}");
                continue;
            }
        };

        if file_type.is_dir() {
            subdirs.push(name);
        } else if file_type.is_file() {
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("skipping {name} in {path}: {e}");
                    continue;
                }
            };
            files.push(DirectoryEntry {
                path: dir_path.join(&name).to_string_lossy().to_string(),
                size_bytes: metadata.len(),
                kind: ContentKind::classify(&name),
                created_at: timestamp(metadata.created()),
                modified_at: timestamp(metadata.modified()),
            });
        }
    }

    if options.sort_entries {
        subdirs.sort_by_key(|name| name.to_lowercase());
        files.sort_by_key(|file| file.name().to_lowercase());
    }

    Ok(DirectorySnapshot {
        path: path.to_string(),
        metadata: DirMetadata::Listed(DirStats {
            count_subdirs: subdirs.len(),
            count_files: files.len(),
            created_at: timestamp(dir_meta.created()),
            modified_at: timestamp(dir_meta.modified()),
        }),
        subdirs,
        files,
    })
}

fn timestamp(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}
