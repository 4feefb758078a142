use std::fs;
use std::path::{Path, PathBuf};

use crate::models::volume::VolumeInfo;

/// Roots the user can browse from: drive letters on Windows, `/` plus
/// whatever is mounted under the usual mount directories elsewhere.
pub fn mounted_volumes() -> Vec<VolumeInfo> {
    #[cfg(windows)]
    {
        windows_drives()
    }
    #[cfg(not(windows))]
    {
        let mut volumes = vec![VolumeInfo {
            name: "/".to_string(),
            path: "/".to_string(),
        }];
        for mount_dir in mount_dirs() {
            volumes.extend(volumes_under(&mount_dir));
        }
        volumes
    }
}

#[cfg(windows)]
fn windows_drives() -> Vec<VolumeInfo> {
    (b'A'..=b'Z')
        .map(|letter| format!("{}:\\", letter as char))
        .filter(|root| Path::new(root).exists())
        .map(|path| VolumeInfo {
            name: path[..2].to_string(),
            path,
        })
        .collect()
}

#[cfg(not(windows))]
fn mount_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![PathBuf::from("/Volumes")];
    let user_media = std::env::var_os("USER").map(|user| Path::new("/media").join(user));
    match user_media {
        Some(dir) if dir.is_dir() => dirs.push(dir),
        _ => dirs.push(PathBuf::from("/media")),
    }
    dirs.push(PathBuf::from("/mnt"));
    dirs
}

/// Directories directly under `mount_dir`, sorted by name. Unreadable or
/// missing mount directories yield nothing.
pub fn volumes_under(mount_dir: &Path) -> Vec<VolumeInfo> {
    let Ok(entries) = fs::read_dir(mount_dir) else {
        return Vec::new();
    };
    let mut volumes: Vec<VolumeInfo> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| VolumeInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path().to_string_lossy().to_string(),
        })
        .collect();
    volumes.sort_by(|a, b| a.name.cmp(&b.name));
    volumes
}
