use crate::error::AppError;
use crate::services::safety::{validate_name, validate_not_protected, validate_path};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Renames `source` within its parent directory. Returns the new path.
pub fn rename(source: &str, new_name: &str) -> Result<String, AppError> {
    validate_path(source)?;
    validate_name(new_name)?;
    validate_not_protected(source)?;

    let src_path = Path::new(source);
    if !src_path.exists() {
        return Err(AppError::General(format!(
            "source does not exist: {source}"
        )));
    }
    let parent = src_path
        .parent()
        .ok_or_else(|| AppError::InvalidPath(format!("cannot rename a root: {source}")))?;
    let dest = parent.join(new_name);
    if dest.exists() {
        return Err(AppError::General(format!(
            "destination already exists: {}",
            dest.display()
        )));
    }

    fs::rename(src_path, &dest)?;
    log::info!("renamed {source} -> {}", dest.display());
    Ok(dest.to_string_lossy().to_string())
}

/// Copies a file or directory tree into `dest_dir`, keeping its name.
pub fn copy_into(source: &str, dest_dir: &str) -> Result<String, AppError> {
    let (src_path, dest) = resolve_destination(source, dest_dir)?;
    if src_path.is_dir() && dest.starts_with(&src_path) {
        return Err(AppError::General(format!(
            "cannot copy a directory into itself: {source}"
        )));
    }

    copy_path(&src_path, &dest)?;
    log::info!("copied {source} -> {}", dest.display());
    Ok(dest.to_string_lossy().to_string())
}

/// Moves a file or directory tree into `dest_dir`, keeping its name. Falls
/// back to copy-then-delete when a plain rename is not possible, e.g. across
/// volumes.
pub fn move_into(source: &str, dest_dir: &str) -> Result<String, AppError> {
    validate_not_protected(source)?;
    let (src_path, dest) = resolve_destination(source, dest_dir)?;
    if src_path.is_dir() && dest.starts_with(&src_path) {
        return Err(AppError::General(format!(
            "cannot move a directory into itself: {source}"
        )));
    }

    if let Err(e) = fs::rename(&src_path, &dest) {
        log::debug!("rename of {source} failed ({e}), copying instead");
        copy_path(&src_path, &dest)?;
        remove_path(&src_path)?;
    }
    log::info!("moved {source} -> {}", dest.display());
    Ok(dest.to_string_lossy().to_string())
}

/// Permanently removes a file or a whole directory tree.
pub fn delete(path: &str) -> Result<(), AppError> {
    validate_path(path)?;
    validate_not_protected(path)?;

    let target = Path::new(path);
    if fs::symlink_metadata(target).is_err() {
        return Err(AppError::General(format!("path does not exist: {path}")));
    }
    remove_path(target)?;
    log::info!("deleted {path}");
    Ok(())
}

fn resolve_destination(source: &str, dest_dir: &str) -> Result<(PathBuf, PathBuf), AppError> {
    validate_path(source)?;
    validate_path(dest_dir)?;

    let src_path = Path::new(source);
    if !src_path.exists() {
        return Err(AppError::General(format!(
            "source does not exist: {source}"
        )));
    }
    if !Path::new(dest_dir).is_dir() {
        return Err(AppError::General(format!(
            "destination is not a directory: {dest_dir}"
        )));
    }
    let file_name = src_path
        .file_name()
        .ok_or_else(|| AppError::InvalidPath(format!("invalid source path: {source}")))?;
    let dest = Path::new(dest_dir).join(file_name);
    if dest.exists() {
        return Err(AppError::General(format!(
            "destination already exists: {}",
            dest.display()
        )));
    }
    Ok((src_path.to_path_buf(), dest))
}

fn copy_path(src: &Path, dest: &Path) -> Result<(), AppError> {
    if src.is_dir() {
        copy_dir_recursive(src, dest)
    } else {
        fs::copy(src, dest)?;
        Ok(())
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<(), AppError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| AppError::General(e.to_string()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target)?;
        } else {
            log::warn!("not copying special file {}", entry.path().display());
        }
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<(), AppError> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn s(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_rename() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("old.txt");
        File::create(&src).unwrap().write_all(b"content").unwrap();

        let dest = rename(&s(&src), "new.txt").unwrap();

        assert!(!src.exists());
        assert_eq!(dest, s(&base.path().join("new.txt")));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "content");
    }

    #[test]
    fn test_rename_refuses_existing_destination() {
        let base = TempDir::new().unwrap();
        fs::write(base.path().join("a.txt"), "a").unwrap();
        fs::write(base.path().join("b.txt"), "b").unwrap();

        let result = rename(&s(&base.path().join("a.txt")), "b.txt");

        assert!(result.unwrap_err().to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(base.path().join("b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_rename_missing_source() {
        let base = TempDir::new().unwrap();
        assert!(rename(&s(&base.path().join("ghost")), "x").is_err());
    }

    #[test]
    fn test_copy_file_into() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("file.txt");
        let dest_dir = base.path().join("target");
        fs::write(&src, "data").unwrap();
        fs::create_dir_all(&dest_dir).unwrap();

        let copied = copy_into(&s(&src), &s(&dest_dir)).unwrap();

        assert!(src.exists());
        assert_eq!(fs::read_to_string(&copied).unwrap(), "data");
    }

    #[test]
    fn test_copy_directory_tree() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("tree");
        fs::create_dir_all(src.join("inner/deeper")).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        fs::write(src.join("inner/deeper/leaf.txt"), "leaf").unwrap();
        let dest_dir = base.path().join("target");
        fs::create_dir_all(&dest_dir).unwrap();

        let copied = PathBuf::from(copy_into(&s(&src), &s(&dest_dir)).unwrap());

        assert_eq!(fs::read_to_string(copied.join("top.txt")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(copied.join("inner/deeper/leaf.txt")).unwrap(),
            "leaf"
        );
        assert!(src.join("top.txt").exists());
    }

    #[test]
    fn test_copy_refuses_existing_destination() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("file.txt");
        fs::write(&src, "new").unwrap();
        let dest_dir = base.path().join("target");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("file.txt"), "old").unwrap();

        assert!(copy_into(&s(&src), &s(&dest_dir)).is_err());
        assert_eq!(fs::read_to_string(dest_dir.join("file.txt")).unwrap(), "old");
    }

    #[test]
    fn test_copy_into_itself_rejected() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("tree");
        fs::create_dir_all(src.join("child")).unwrap();

        assert!(copy_into(&s(&src), &s(&src.join("child"))).is_err());
    }

    #[test]
    fn test_move_into() {
        let base = TempDir::new().unwrap();
        let src = base.path().join("file.txt");
        let dest_dir = base.path().join("target");
        fs::write(&src, "data").unwrap();
        fs::create_dir_all(&dest_dir).unwrap();

        let moved = move_into(&s(&src), &s(&dest_dir)).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(moved).unwrap(), "data");
    }

    #[test]
    fn test_delete_file_and_tree() {
        let base = TempDir::new().unwrap();
        let file = base.path().join("doomed.txt");
        fs::write(&file, "bye").unwrap();
        let tree = base.path().join("tree");
        fs::create_dir_all(tree.join("a/b")).unwrap();
        fs::write(tree.join("a/b/c.txt"), "c").unwrap();

        delete(&s(&file)).unwrap();
        delete(&s(&tree)).unwrap();

        assert!(!file.exists());
        assert!(!tree.exists());
        assert!(delete(&s(&file)).is_err());
    }

    #[test]
    fn test_protected_paths_rejected() {
        assert!(matches!(delete("/etc"), Err(AppError::ProtectedPath(_))));
        assert!(matches!(
            rename("/bin/ls", "ls_stolen"),
            Err(AppError::ProtectedPath(_))
        ));
    }
}
