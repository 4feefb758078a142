use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::sync::Semaphore;

use crate::config::BrowserConfig;
use crate::models::snapshot::DirectorySnapshot;
use crate::services::cache::DirCache;
use crate::services::prober::{self, ProbeOptions};
use crate::ui::queue::UiHandle;

/// Completion callback for a scan request, run on the UI context.
pub type ScanCallback<S> = Box<dyn FnOnce(&mut S, Arc<DirectorySnapshot>) + Send + 'static>;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    pub max_concurrent_scans: usize,
    pub dedupe_in_flight: bool,
    pub probe: ProbeOptions,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for SchedulerOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            max_concurrent_scans: config.max_concurrent_scans.max(1),
            dedupe_in_flight: config.dedupe_in_flight,
            probe: ProbeOptions {
                sort_entries: config.sort_entries,
            },
        }
    }
}

/// Serves directory snapshots from the cache or from background scans.
///
/// Scans run on the blocking pool, at most `max_concurrent_scans` at a time.
/// Results are written to the cache first and then handed to the UI context
/// through its queue. Scans are never cancelled; a result nobody waits for
/// still lands in the cache.
pub struct ScanScheduler<S> {
    cache: Arc<DirCache>,
    ui: UiHandle<S>,
    runtime: Handle,
    workers: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    launched: Arc<AtomicUsize>,
    waiters: Arc<Mutex<HashMap<String, Vec<ScanCallback<S>>>>>,
    options: SchedulerOptions,
}

impl<S> Clone for ScanScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            ui: self.ui.clone(),
            runtime: self.runtime.clone(),
            workers: self.workers.clone(),
            in_flight: self.in_flight.clone(),
            launched: self.launched.clone(),
            waiters: self.waiters.clone(),
            options: self.options,
        }
    }
}

impl<S: 'static> ScanScheduler<S> {
    pub fn new(
        cache: Arc<DirCache>,
        ui: UiHandle<S>,
        runtime: Handle,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            cache,
            ui,
            runtime,
            workers: Arc::new(Semaphore::new(options.max_concurrent_scans.max(1))),
            in_flight: Arc::new(AtomicUsize::new(0)),
            launched: Arc::new(AtomicUsize::new(0)),
            waiters: Arc::new(Mutex::new(HashMap::new())),
            options,
        }
    }

    /// Must be called from the UI context, which `host` belongs to.
    ///
    /// On a cache hit `on_complete` runs before this returns and a silent
    /// background scan refreshes the entry. On a miss the scan runs in the
    /// background and `on_complete` is posted to the UI queue once the
    /// result is cached.
    pub fn request_scan<F>(&self, host: &mut S, path: &str, on_complete: F)
    where
        F: FnOnce(&mut S, Arc<DirectorySnapshot>) + Send + 'static,
    {
        if let Some(cached) = self.cache.get(path) {
            log::debug!("cache hit for {path}, refreshing in background");
            on_complete(host, cached);
            if !self.options.dedupe_in_flight || self.claim(path, None) {
                self.launch(path.to_string(), None);
            }
            return;
        }

        log::debug!("cache miss for {path}");
        let callback: ScanCallback<S> = Box::new(on_complete);
        if !self.options.dedupe_in_flight {
            self.launch(path.to_string(), Some(callback));
        } else if self.claim(path, Some(callback)) {
            self.launch(path.to_string(), None);
        } else {
            log::debug!("joined in-flight scan of {path}");
        }
    }

    /// Like a cache miss regardless of what is cached: scans, caches, then
    /// posts `on_complete`. Used when the caller knows the directory changed,
    /// so it never joins a scan that may have started before the change.
    pub fn request_fresh_scan<F>(&self, path: &str, on_complete: F)
    where
        F: FnOnce(&mut S, Arc<DirectorySnapshot>) + Send + 'static,
    {
        self.launch(path.to_string(), Some(Box::new(on_complete)));
    }

    pub fn cache(&self) -> &Arc<DirCache> {
        &self.cache
    }

    /// Scans started but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Total background scans started since creation.
    pub fn scans_launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    /// Records interest in a scan of `path`; true when no scan is running yet
    /// and the caller has to start one.
    fn claim(&self, path: &str, waiter: Option<ScanCallback<S>>) -> bool {
        let mut waiters = self
            .waiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match waiters.get_mut(path) {
            Some(pending) => {
                pending.extend(waiter);
                false
            }
            None => {
                waiters.insert(path.to_string(), waiter.into_iter().collect());
                true
            }
        }
    }

    fn launch(&self, path: String, on_complete: Option<ScanCallback<S>>) {
        self.launch_with(path, on_complete, prober::scan_dir);
    }

    fn launch_with(
        &self,
        path: String,
        on_complete: Option<ScanCallback<S>>,
        scan: fn(&str, &ProbeOptions) -> DirectorySnapshot,
    ) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.launched.fetch_add(1, Ordering::SeqCst);

        let cache = self.cache.clone();
        let ui = self.ui.clone();
        let workers = self.workers.clone();
        let in_flight = self.in_flight.clone();
        let waiters = self.waiters.clone();
        let dedupe = self.options.dedupe_in_flight;
        let probe = self.options.probe;

        self.runtime.spawn(async move {
            let permit = workers.acquire_owned().await.ok();
            let scan_path = path.clone();
            let snapshot =
                match tokio::task::spawn_blocking(move || scan(&scan_path, &probe))
                    .await
                {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        log::warn!("scan task for {path} failed: {e}");
                        DirectorySnapshot::failed(path.as_str(), format!("scan task failed: {e}"))
                    }
                };
            drop(permit);

            let snapshot = Arc::new(snapshot);
            cache.put(&path, snapshot.clone());

            let mut callbacks: Vec<ScanCallback<S>> = on_complete.into_iter().collect();
            if dedupe {
                let joined = waiters
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .remove(&path)
                    .unwrap_or_default();
                callbacks.extend(joined);
            }

            if !callbacks.is_empty() {
                ui.post(move |host: &mut S| {
                    for callback in callbacks {
                        callback(host, snapshot.clone());
                    }
                });
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }
}
