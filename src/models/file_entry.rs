use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "py", "log", "json", "xml", "csv", "ini", "css", "html", "js", "yaml", "yml",
    "bat", "cmd", "sh", "ps1", "rtf", "git",
];

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// Coarse content classification, decided from the file name alone so the
/// presentation layer knows how to preview a file before reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Unknown,
}

impl ContentKind {
    pub fn classify(file_name: &str) -> Self {
        let Some(ext) = Path::new(file_name).extension() else {
            return Self::Unknown;
        };
        let ext = ext.to_string_lossy().to_ascii_lowercase();

        if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Self::Text
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A regular file found by a directory scan. Content is never loaded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
    pub size_bytes: u64,
    pub kind: ContentKind,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl DirectoryEntry {
    pub fn name(&self) -> &str {
        self.path.rsplit(['/', '\\']).next().unwrap_or(&self.path)
    }
}
