use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::BrowserConfig;
use crate::error::AppError;
use crate::models::file_entry::DirectoryEntry;
use crate::models::operation::{ClipboardAction, ClipboardItem, FileOperation};
use crate::models::snapshot::DirectorySnapshot;
use crate::services::cache::DirCache;
use crate::services::file_service;
use crate::services::refresh_timer::{RefreshHost, RefreshTimer, TokioTimerBackend};
use crate::services::scheduler::{ScanScheduler, SchedulerOptions};
use crate::services::volume_service;
use crate::ui::queue::UiHandle;
use crate::ui::view::BrowserView;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level application context. Lives on the UI context and owns
/// everything the presentation layer interacts with.
pub struct Browser {
    scheduler: ScanScheduler<Browser>,
    timer: RefreshTimer<TokioTimerBackend<Browser>>,
    view: Box<dyn BrowserView>,
    ui: UiHandle<Browser>,
    runtime: Handle,
    current: Option<Arc<DirectorySnapshot>>,
    requested_path: Option<String>,
    path_entry: String,
    clipboard: Option<ClipboardItem>,
    pending_ops: usize,
    closed: bool,
}

impl Browser {
    pub fn new(
        config: &BrowserConfig,
        view: Box<dyn BrowserView>,
        ui: UiHandle<Browser>,
        runtime: Handle,
    ) -> Self {
        let scheduler = ScanScheduler::new(
            Arc::new(DirCache::new()),
            ui.clone(),
            runtime.clone(),
            SchedulerOptions::from(config),
        );
        let timer = RefreshTimer::new(
            TokioTimerBackend::new(runtime.clone(), ui.clone()),
            config.refresh_policy(),
        );
        Self {
            scheduler,
            timer,
            view,
            ui,
            runtime,
            current: None,
            requested_path: None,
            path_entry: String::new(),
            clipboard: None,
            pending_ops: 0,
            closed: false,
        }
    }

    pub fn start(&mut self) {
        self.show_volumes();
        self.view.show_placeholder();
        self.timer.start();
        self.refresh_status();
    }

    /// Lists mounted volumes without touching the displayed directory.
    pub fn show_volumes(&mut self) {
        let volumes = volume_service::mounted_volumes();
        if volumes.is_empty() {
            self.view.show_error(
                "No drives found!",
                "No drives found! Check you have any storage devices connected and correctly mounted.",
            );
        }
        self.view.show_volumes(&volumes);
    }

    pub fn select_volume(&mut self, path: &str) {
        self.navigate(path.to_string());
    }

    /// Opens a path typed by the user, after checking it is a directory.
    pub fn browse_to(&mut self, path: &str) -> Result<(), AppError> {
        let target = Path::new(path);
        if path.is_empty() || !target.exists() {
            return Err(AppError::InvalidPath(format!(
                "The specified path does not exist: {path}"
            )));
        }
        if !target.is_dir() {
            return Err(AppError::NotADirectory(format!(
                "The specified path is not a directory: {path}"
            )));
        }
        self.navigate(path.to_string());
        Ok(())
    }

    pub fn open_subdir(&mut self, name: &str) -> Result<(), AppError> {
        let current = self.displayed()?;
        if !current.has_subdir(name) {
            return Err(AppError::General(format!("no such folder: {name}")));
        }
        let path = Path::new(&current.path).join(name);
        self.navigate(path.to_string_lossy().to_string());
        Ok(())
    }

    pub fn open_parent(&mut self) -> Result<(), AppError> {
        let current = self.displayed()?;
        let parent = Path::new(&current.path)
            .parent()
            .ok_or_else(|| AppError::General(format!("{} has no parent", current.path)))?;
        self.navigate(parent.to_string_lossy().to_string());
        Ok(())
    }

    /// Hands a file of the displayed directory to the view for preview.
    pub fn select_file(&mut self, name: &str) -> Result<DirectoryEntry, AppError> {
        let current = self.displayed()?;
        let entry = current
            .find_file(name)
            .cloned()
            .ok_or_else(|| AppError::General(format!("no such file: {name}")))?;
        self.view.preview_file(&entry);
        Ok(entry)
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.requested_path = None;
        self.path_entry.clear();
        self.timer.directory_changed(None);
        self.view.show_placeholder();
        self.refresh_status();
    }

    pub fn focus_gained(&mut self) {
        self.timer.focus_gained();
    }

    pub fn focus_lost(&mut self) {
        self.timer.focus_lost();
    }

    pub fn copy_selected(&mut self, name: &str) -> Result<(), AppError> {
        self.set_clipboard(name, ClipboardAction::Copy)
    }

    pub fn cut_selected(&mut self, name: &str) -> Result<(), AppError> {
        self.set_clipboard(name, ClipboardAction::Cut)
    }

    /// Pastes the clipboard item into the displayed directory.
    pub fn paste(&mut self) -> Result<(), AppError> {
        let item = self
            .clipboard
            .clone()
            .ok_or_else(|| AppError::General("Clipboard is empty.".to_string()))?;
        let dest_dir = self
            .current
            .as_ref()
            .map(|c| c.path.clone())
            .ok_or_else(|| AppError::General("No destination folder selected.".to_string()))?;

        let op = item.action.operation();
        self.run_fs_op(op, move || match item.action {
            ClipboardAction::Copy => file_service::copy_into(&item.path, &dest_dir).map(|_| ()),
            ClipboardAction::Cut => file_service::move_into(&item.path, &dest_dir).map(|_| ()),
        });
        Ok(())
    }

    pub fn rename_selected(&mut self, name: &str, new_name: &str) -> Result<(), AppError> {
        let source = self.resolve_selected(name)?;
        let new_name = new_name.to_string();
        self.run_fs_op(FileOperation::Rename, move || {
            file_service::rename(&source, &new_name).map(|_| ())
        });
        Ok(())
    }

    pub fn delete_selected(&mut self, name: &str) -> Result<(), AppError> {
        let path = self.resolve_selected(name)?;
        self.run_fs_op(FileOperation::Delete, move || file_service::delete(&path));
        Ok(())
    }

    pub fn report_error(&mut self, title: &str, err: &AppError) {
        log::warn!("{title}: {err}");
        self.view.show_error(title, &err.to_string());
    }

    pub fn status_line(&self) -> String {
        let dir_info = self
            .current
            .as_ref()
            .and_then(|c| c.stats())
            .map(|s| format!(" | {} dirs, {} files", s.count_subdirs, s.count_files))
            .unwrap_or_default();
        format!("Current Path: {}{dir_info} | Version: {VERSION}", self.path_entry)
    }

    pub fn current(&self) -> Option<&Arc<DirectorySnapshot>> {
        self.current.as_ref()
    }

    pub fn path_entry(&self) -> &str {
        &self.path_entry
    }

    pub fn clipboard(&self) -> Option<&ClipboardItem> {
        self.clipboard.as_ref()
    }

    pub fn scheduler(&self) -> &ScanScheduler<Browser> {
        &self.scheduler
    }

    pub fn timer(&self) -> &RefreshTimer<TokioTimerBackend<Browser>> {
        &self.timer
    }

    /// File operations started but not yet finished.
    pub fn pending_ops(&self) -> usize {
        self.pending_ops
    }

    pub fn close(&mut self) {
        self.timer.stop();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn navigate(&mut self, path: String) {
        log::info!("opening {path}");
        self.path_entry = path.clone();
        self.requested_path = Some(path.clone());
        self.view.show_loading(&path);
        self.refresh_status();

        let scheduler = self.scheduler.clone();
        scheduler.request_scan(self, &path, Browser::show_snapshot);
    }

    fn show_snapshot(&mut self, snapshot: Arc<DirectorySnapshot>) {
        if self.requested_path.as_deref() != Some(snapshot.path.as_str()) {
            log::debug!("ignoring stale listing of {}", snapshot.path);
            return;
        }
        let changed = self
            .current
            .as_ref()
            .map_or(true, |c| c.path != snapshot.path);

        self.view.show_directory(&snapshot);
        self.current = Some(snapshot.clone());
        if changed {
            self.timer.directory_changed(Some(snapshot.path.clone()));
        }
        self.refresh_status();
    }

    fn displayed(&self) -> Result<Arc<DirectorySnapshot>, AppError> {
        self.current
            .clone()
            .ok_or_else(|| AppError::General("no directory is open".to_string()))
    }

    /// Full path of a folder or file in the displayed listing.
    fn resolve_selected(&self, name: &str) -> Result<String, AppError> {
        let current = self.displayed()?;
        if current.has_subdir(name) {
            let path = Path::new(&current.path).join(name);
            return Ok(path.to_string_lossy().to_string());
        }
        current
            .find_file(name)
            .map(|f| f.path.clone())
            .ok_or_else(|| AppError::General(format!("no such item: {name}")))
    }

    fn set_clipboard(&mut self, name: &str, action: ClipboardAction) -> Result<(), AppError> {
        let path = self.resolve_selected(name)?;
        let verb = match action {
            ClipboardAction::Copy => "Copied",
            ClipboardAction::Cut => "Cut",
        };
        self.view.show_status(&format!("{verb} to clipboard: {name}"));
        self.clipboard = Some(ClipboardItem { path, action });
        Ok(())
    }

    fn run_fs_op<F>(&mut self, op: FileOperation, task: F)
    where
        F: FnOnce() -> Result<(), AppError> + Send + 'static,
    {
        log::info!("starting {op}");
        self.pending_ops += 1;
        let ui = self.ui.clone();
        self.runtime.spawn_blocking(move || {
            let result = task();
            ui.post(move |browser: &mut Browser| browser.finish_fs_op(op, result));
        });
    }

    fn finish_fs_op(&mut self, op: FileOperation, result: Result<(), AppError>) {
        self.pending_ops = self.pending_ops.saturating_sub(1);
        match result {
            Ok(()) => {
                log::info!("{op} finished");
                if op == FileOperation::Move {
                    self.clipboard = None;
                }
            }
            Err(e) => self.report_error("FS Error", &e),
        }

        if let Some(path) = self.requested_path.clone() {
            self.scheduler.request_fresh_scan(&path, Browser::show_snapshot);
        }
    }

    fn refresh_status(&mut self) {
        let status = self.status_line();
        self.view.show_status(&status);
    }
}

impl RefreshHost for Browser {
    fn refresh_tick(&mut self, generation: u64) {
        if let Some(path) = self.timer.fire(generation) {
            log::debug!("live refresh of {path}");
            let scheduler = self.scheduler.clone();
            scheduler.request_scan(self, &path, Browser::show_snapshot);
        }
    }
}
