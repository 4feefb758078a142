use tokio::sync::mpsc;

/// Work posted from any thread to run on the UI context with exclusive
/// access to the UI-owned state `S`.
pub type UiTask<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Sending half of the UI queue. Cheap to clone and safe to move into
/// background tasks.
pub struct UiHandle<S> {
    tx: mpsc::UnboundedSender<UiTask<S>>,
}

impl<S> Clone for UiHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> UiHandle<S> {
    /// Queues `task` for the UI context. Returns false once the queue is gone.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        if self.tx.send(Box::new(task)).is_err() {
            log::debug!("ui queue closed, dropping task");
            return false;
        }
        true
    }
}

/// Receiving half, owned by the single UI context. Tasks run one at a time
/// in the order they were posted.
pub struct UiQueue<S> {
    rx: mpsc::UnboundedReceiver<UiTask<S>>,
}

pub fn ui_channel<S>() -> (UiHandle<S>, UiQueue<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiHandle { tx }, UiQueue { rx })
}

impl<S> UiQueue<S> {
    /// Runs every task already queued without waiting for more.
    pub fn drain(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(state);
            ran += 1;
        }
        ran
    }

    /// Waits for the next task and runs it. False when all senders are gone.
    pub async fn next(&mut self, state: &mut S) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task(state);
                true
            }
            None => false,
        }
    }

    pub async fn run_until<F>(&mut self, state: &mut S, mut done: F)
    where
        F: FnMut(&S) -> bool,
    {
        while !done(state) {
            if !self.next(state).await {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_runs_tasks_in_post_order() {
        let (handle, mut queue) = ui_channel::<Vec<u32>>();
        let mut log = Vec::new();

        for i in 0..3 {
            assert!(handle.post(move |log: &mut Vec<u32>| log.push(i)));
        }

        assert_eq!(queue.drain(&mut log), 3);
        assert_eq!(log, vec![0, 1, 2]);
        assert_eq!(queue.drain(&mut log), 0);
    }

    #[test]
    fn tasks_posted_from_other_threads_run_on_the_owner() {
        let (handle, mut queue) = ui_channel::<Vec<std::thread::ThreadId>>();
        let worker = std::thread::spawn(move || {
            handle.post(|ids: &mut Vec<std::thread::ThreadId>| {
                ids.push(std::thread::current().id())
            });
        });
        worker.join().unwrap();

        let mut ids = Vec::new();
        queue.drain(&mut ids);
        assert_eq!(ids, vec![std::thread::current().id()]);
    }

    #[test]
    fn post_fails_after_queue_is_dropped() {
        let (handle, queue) = ui_channel::<()>();
        drop(queue);
        assert!(!handle.post(|_| {}));
    }

    #[tokio::test]
    async fn run_until_stops_on_predicate() {
        let (handle, mut queue) = ui_channel::<u32>();
        for _ in 0..5 {
            handle.post(|n: &mut u32| *n += 1);
        }
        let mut count = 0;
        queue.run_until(&mut count, |n| *n >= 3).await;
        assert_eq!(count, 3);
    }
}
