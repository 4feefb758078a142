use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use nanofiler_lib::commands::shell_commands::handle_line;
use nanofiler_lib::config::BrowserConfig;
use nanofiler_lib::models::file_entry::DirectoryEntry;
use nanofiler_lib::models::snapshot::DirectorySnapshot;
use nanofiler_lib::models::volume::VolumeInfo;
use nanofiler_lib::state::Browser;
use nanofiler_lib::ui::queue::{ui_channel, UiQueue};
use nanofiler_lib::ui::view::BrowserView;
use tempfile::TempDir;
use tokio::runtime::Handle;

#[derive(Clone, Default)]
struct SharedView {
    listings: Arc<Mutex<Vec<DirectorySnapshot>>>,
    errors: Arc<Mutex<Vec<(String, String)>>>,
}

impl BrowserView for SharedView {
    fn show_volumes(&mut self, _volumes: &[VolumeInfo]) {}
    fn show_loading(&mut self, _path: &str) {}
    fn show_directory(&mut self, snapshot: &DirectorySnapshot) {
        self.listings.lock().unwrap().push(snapshot.clone());
    }
    fn show_placeholder(&mut self) {}
    fn preview_file(&mut self, _entry: &DirectoryEntry) {}
    fn show_status(&mut self, _status: &str) {}
    fn show_error(&mut self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

fn browser(config: BrowserConfig) -> (Browser, UiQueue<Browser>, SharedView) {
    let (ui, queue) = ui_channel();
    let view = SharedView::default();
    let browser = Browser::new(&config, Box::new(view.clone()), ui, Handle::current());
    (browser, queue, view)
}

/// Pumps the UI queue until `done` holds or five seconds pass.
async fn pump_until<F>(browser: &mut Browser, queue: &mut UiQueue<Browser>, mut done: F) -> bool
where
    F: FnMut(&Browser) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        queue.drain(browser);
        if done(browser) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn live_refresh_picks_up_new_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    let path = dir.path().to_string_lossy().to_string();
    let config = BrowserConfig {
        focused_refresh_ms: 50,
        unfocused_refresh_ms: 50,
        ..BrowserConfig::default()
    };
    let (mut browser, mut queue, view) = browser(config);

    browser.start();
    browser.browse_to(&path).unwrap();
    assert!(pump_until(&mut browser, &mut queue, |b| b.current().is_some()).await);

    fs::write(dir.path().join("b.md"), "b").unwrap();
    let refreshed = pump_until(&mut browser, &mut queue, |b| {
        b.current().is_some_and(|c| c.files.len() == 2)
    })
    .await;

    assert!(refreshed, "live refresh never showed the new file");
    assert!(view.listings.lock().unwrap().len() >= 2);
    browser.close();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shell_lines_drive_the_browser() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("inbox")).unwrap();
    fs::write(dir.path().join("note.txt"), "hello").unwrap();
    let root = dir.path().to_string_lossy().to_string();
    let (mut browser, mut queue, view) = browser(BrowserConfig::default());

    handle_line(&mut browser, &format!("cd \"{root}\""));
    assert!(pump_until(&mut browser, &mut queue, |b| b.current().is_some()).await);

    handle_line(&mut browser, "cut note.txt");
    handle_line(&mut browser, "open inbox");
    assert!(
        pump_until(&mut browser, &mut queue, |b| {
            b.current().is_some_and(|c| c.path.ends_with("inbox"))
        })
        .await
    );
    handle_line(&mut browser, "paste");
    assert!(
        pump_until(&mut browser, &mut queue, |b| {
            b.pending_ops() == 0 && b.current().is_some_and(|c| c.files.len() == 1)
        })
        .await
    );
    assert!(dir.path().join("inbox/note.txt").exists());
    assert!(!dir.path().join("note.txt").exists());

    handle_line(&mut browser, "cd /definitely/not/here");
    handle_line(&mut browser, "bogus");
    let errors = view.errors.lock().unwrap().clone();
    assert_eq!(errors[0].0, "Invalid Path");
    assert_eq!(errors[1].0, "Error");

    handle_line(&mut browser, "quit");
    assert!(browser.is_closed());
}
