use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::RefreshPolicy;
use crate::ui::queue::UiHandle;

/// Arms and cancels one-shot timers. A fired timer reports back with the
/// generation it was armed with.
pub trait TimerBackend {
    type Handle;

    fn arm(&mut self, delay: Duration, generation: u64) -> Self::Handle;
    fn cancel(&mut self, handle: Self::Handle);
}

/// UI-side receiver of refresh timer fires.
pub trait RefreshHost {
    fn refresh_tick(&mut self, generation: u64);
}

/// Sleeps on the tokio runtime and posts the fire onto the UI queue.
/// Cancelling aborts the sleeping task.
pub struct TokioTimerBackend<S> {
    runtime: Handle,
    ui: UiHandle<S>,
}

impl<S> TokioTimerBackend<S> {
    pub fn new(runtime: Handle, ui: UiHandle<S>) -> Self {
        Self { runtime, ui }
    }
}

impl<S: RefreshHost + 'static> TimerBackend for TokioTimerBackend<S> {
    type Handle = JoinHandle<()>;

    fn arm(&mut self, delay: Duration, generation: u64) -> JoinHandle<()> {
        let ui = self.ui.clone();
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            ui.post(move |host: &mut S| host.refresh_tick(generation));
        })
    }

    fn cancel(&mut self, handle: JoinHandle<()>) {
        handle.abort();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Armed { interval: Duration, generation: u64 },
}

/// Live refresh of the displayed directory.
///
/// Holds at most one pending timer. Every re-arm cancels the previous one
/// first and bumps the generation, so a fire that raced its own cancellation
/// is recognised as stale and ignored.
pub struct RefreshTimer<B: TimerBackend> {
    backend: B,
    policy: RefreshPolicy,
    is_focused: bool,
    current_path: Option<String>,
    pending: Option<B::Handle>,
    generation: u64,
    interval: Duration,
}

impl<B: TimerBackend> RefreshTimer<B> {
    pub fn new(backend: B, policy: RefreshPolicy) -> Self {
        Self {
            backend,
            policy,
            is_focused: true,
            current_path: None,
            pending: None,
            generation: 0,
            interval: policy.interval(true),
        }
    }

    pub fn start(&mut self) {
        self.reschedule();
    }

    pub fn directory_changed(&mut self, path: Option<String>) {
        self.current_path = path;
        self.reschedule();
    }

    pub fn focus_gained(&mut self) {
        self.is_focused = true;
        self.reschedule();
    }

    pub fn focus_lost(&mut self) {
        self.is_focused = false;
        self.reschedule();
    }

    /// Handles a fire of the timer armed with `generation`. Returns the
    /// directory to rescan, if any. Stale fires return `None` and leave the
    /// pending timer alone.
    pub fn fire(&mut self, generation: u64) -> Option<String> {
        if self.pending.is_none() || generation != self.generation {
            log::trace!("ignoring stale refresh tick {generation}");
            return None;
        }
        let path = self.current_path.clone();
        self.reschedule();
        path
    }

    /// Cancels the pending timer, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.backend.cancel(handle);
            log::trace!("refresh timer {} stopped", self.generation);
        }
    }

    pub fn state(&self) -> TimerState {
        if self.pending.is_some() {
            TimerState::Armed {
                interval: self.interval,
                generation: self.generation,
            }
        } else {
            TimerState::Idle
        }
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn current_path(&self) -> Option<&str> {
        self.current_path.as_deref()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn reschedule(&mut self) {
        self.stop();
        self.generation += 1;
        self.interval = self.policy.interval(self.is_focused);
        self.pending = Some(self.backend.arm(self.interval, self.generation));
        log::trace!(
            "refresh timer {} armed for {:?}",
            self.generation,
            self.interval
        );
    }
}

impl<B: TimerBackend> Drop for RefreshTimer<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
