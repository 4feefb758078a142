use crate::models::file_entry::DirectoryEntry;
use crate::models::snapshot::DirectorySnapshot;
use crate::models::volume::VolumeInfo;

/// The presentation layer, as seen by the browser. Every method is called on
/// the UI context.
pub trait BrowserView {
    fn show_volumes(&mut self, volumes: &[VolumeInfo]);

    fn show_loading(&mut self, path: &str);

    /// Renders a listing, or the snapshot's error in place of the contents.
    fn show_directory(&mut self, snapshot: &DirectorySnapshot);

    /// Nothing is open; show the "pick a volume" placeholder.
    fn show_placeholder(&mut self);

    fn preview_file(&mut self, entry: &DirectoryEntry);

    fn show_status(&mut self, status: &str);

    fn show_error(&mut self, title: &str, message: &str);
}
