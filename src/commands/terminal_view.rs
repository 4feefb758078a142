use std::fs::File;
use std::io::Read;

use crate::models::file_entry::{ContentKind, DirectoryEntry};
use crate::models::snapshot::DirectorySnapshot;
use crate::models::volume::VolumeInfo;
use crate::ui::view::BrowserView;

const PREVIEW_LIMIT_BYTES: u64 = 4096;

/// Renders the browser as plain text on stdout, errors on stderr.
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    pub fn new() -> Self {
        Self
    }
}

/// The listing body as shown to the user, one line per item.
pub fn listing_lines(snapshot: &DirectorySnapshot) -> Vec<String> {
    if let Some(error) = snapshot.error() {
        return vec![format!("Error: {error}")];
    }
    if snapshot.is_empty() {
        return vec!["No accessible folders or files found.".to_string()];
    }
    let dirs = snapshot.subdirs.iter().map(|name| format!("[DIR] {name}"));
    let files = snapshot
        .files
        .iter()
        .map(|file| format!("[FILE] {}", file.name()));
    dirs.chain(files).collect()
}

fn read_preview(entry: &DirectoryEntry) -> std::io::Result<String> {
    let mut buf = Vec::new();
    File::open(&entry.path)?
        .take(PREVIEW_LIMIT_BYTES)
        .read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

impl BrowserView for TerminalView {
    fn show_volumes(&mut self, volumes: &[VolumeInfo]) {
        println!("Volumes:");
        for volume in volumes {
            println!("  {} ({})", volume.name, volume.path);
        }
    }

    fn show_loading(&mut self, path: &str) {
        println!("Loading {path} ...");
    }

    fn show_directory(&mut self, snapshot: &DirectorySnapshot) {
        println!("{}:", snapshot.path);
        for line in listing_lines(snapshot) {
            println!("  {line}");
        }
    }

    fn show_placeholder(&mut self) {
        println!("Select a drive to view its contents.");
    }

    fn preview_file(&mut self, entry: &DirectoryEntry) {
        match entry.kind {
            ContentKind::Text => match read_preview(entry) {
                Ok(text) => {
                    println!("--- {} ---", entry.name());
                    println!("{text}");
                    if entry.size_bytes > PREVIEW_LIMIT_BYTES {
                        println!("... ({} bytes total)", entry.size_bytes);
                    }
                }
                Err(e) => eprintln!("Error: could not read {}: {e}", entry.path),
            },
            ContentKind::Image => {
                println!("[image] {} ({} bytes)", entry.name(), entry.size_bytes);
            }
            ContentKind::Unknown => println!(
                "The selected file type is not supported for preview: {}",
                entry.name()
            ),
        }
    }

    fn show_status(&mut self, status: &str) {
        println!("{status}");
    }

    fn show_error(&mut self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}
