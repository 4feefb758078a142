use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::file_entry::DirectoryEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirStats {
    pub count_subdirs: usize,
    pub count_files: usize,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Outcome of a scan: stats on success, a message on failure. Never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirMetadata {
    Listed(DirStats),
    Failed { error: String },
}

/// The immutable result of one directory scan.
///
/// Snapshots are shared as `Arc<DirectorySnapshot>` between the cache, the
/// scan tasks and the UI context, so a newer scan replaces the whole value
/// rather than editing fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub path: String,
    pub subdirs: Vec<String>,
    pub files: Vec<DirectoryEntry>,
    pub metadata: DirMetadata,
}

impl DirectorySnapshot {
    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            subdirs: Vec::new(),
            files: Vec::new(),
            metadata: DirMetadata::Failed {
                error: error.into(),
            },
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.metadata {
            DirMetadata::Failed { error } => Some(error),
            DirMetadata::Listed(_) => None,
        }
    }

    pub fn stats(&self) -> Option<&DirStats> {
        match &self.metadata {
            DirMetadata::Listed(stats) => Some(stats),
            DirMetadata::Failed { .. } => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subdirs.is_empty() && self.files.is_empty()
    }

    pub fn find_file(&self, name: &str) -> Option<&DirectoryEntry> {
        self.files.iter().find(|f| f.name() == name)
    }

    pub fn has_subdir(&self, name: &str) -> bool {
        self.subdirs.iter().any(|d| d == name)
    }
}
