use crate::error::AppError;
use std::path::{Component, Path};

const PROTECTED_ROOTS: &[&str] = &[
    "/Applications",
    "/bin",
    "/boot",
    "/sbin",
    "/usr",
    "/System",
    "/Library",
    "/etc",
    "/proc",
    "/sys",
    "C:\\Windows",
    "C:\\Program Files",
    "C:\\Program Files (x86)",
];

pub fn validate_path(path: &str) -> Result<(), AppError> {
    if path.trim().is_empty() {
        return Err(AppError::InvalidPath("path is empty".to_string()));
    }
    if path.contains('\0') {
        return Err(AppError::InvalidPath(format!(
            "path contains a NUL byte: {path:?}"
        )));
    }
    if Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(AppError::InvalidPath(format!(
            "path traversal (.. component) not allowed: {path}"
        )));
    }
    Ok(())
}

/// Checks a bare file name, as typed into a rename prompt.
pub fn validate_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::InvalidPath("name is empty".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(AppError::InvalidPath(format!("invalid name: {name}")));
    }
    Ok(())
}

/// True for volume roots and anything at or below a system directory.
pub fn is_protected_path(path: &str) -> bool {
    let target = normalize(path);
    is_volume_root(&target) || PROTECTED_ROOTS.iter().any(|root| is_within(&target, root))
}

pub fn validate_not_protected(path: &str) -> Result<(), AppError> {
    if is_protected_path(path) {
        return Err(AppError::ProtectedPath(path.to_string()));
    }
    Ok(())
}

/// Forward slashes, no trailing separator, drive-letter paths lowercased.
fn normalize(path: &str) -> String {
    let mut normalized = path.trim().replace('\\', "/");
    while normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    if has_drive_letter(&normalized) {
        normalized.make_ascii_lowercase();
    }
    normalized
}

fn is_within(target: &str, root: &str) -> bool {
    let root = normalize(root);
    target
        .strip_prefix(root.as_str())
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn is_volume_root(normalized: &str) -> bool {
    normalized == "/" || (has_drive_letter(normalized) && normalized.len() <= 3)
}

fn has_drive_letter(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic()
}
