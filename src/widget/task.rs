use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

/// Yield once to the scheduler so a write lands after the work that is
/// currently running (event handling, other ready continuations).
pub async fn after_current_turn() {
    tokio::task::yield_now().await;
}

/// Asynchronous work owned by one widget instance.
///
/// Every continuation the widget spawns goes through here. `cancel()` marks
/// the widget dead and aborts whatever is still pending; continuations that
/// already run check `is_live()` before touching widget state.
#[derive(Debug)]
pub struct WidgetTasks {
    live: AtomicBool,
    set: Mutex<JoinSet<()>>,
}

impl WidgetTasks {
    pub fn new() -> Self {
        Self { live: AtomicBool::new(true), set: Mutex::new(JoinSet::new()) }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.is_live() {
            debug!("widget destroyed, task not spawned");
            return;
        }
        let mut set = self.lock();
        // reap finished tasks so a long-lived widget does not accumulate handles
        while let Some(result) = set.try_join_next() {
            log_failure(result);
        }
        set.spawn(task);
    }

    /// Tasks spawned and not reaped yet.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Wait until every spawned task, including tasks spawned by tasks, is done.
    pub async fn settled(&self) {
        loop {
            let mut set = std::mem::take(&mut *self.lock());
            if set.is_empty() {
                return;
            }
            while let Some(result) = set.join_next().await {
                log_failure(result);
            }
        }
    }

    pub fn cancel(&self) {
        self.live.store(false, Ordering::SeqCst);
        self.lock().abort_all();
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.set.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn log_failure(result: Result<(), JoinError>) {
    if let Err(e) = result {
        if e.is_panic() {
            warn!("widget task panicked: {}", e);
        }
    }
}

impl Default for WidgetTasks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn settled_waits_for_nested_tasks() {
        let tasks = Arc::new(WidgetTasks::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let (outer_tasks, outer_counter) = (tasks.clone(), counter.clone());
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let inner_counter = outer_counter.clone();
            outer_tasks.spawn(async move {
                inner_counter.fetch_add(1, Ordering::SeqCst);
            });
            outer_counter.fetch_add(1, Ordering::SeqCst);
        });

        tasks.settled().await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn finished_tasks_are_reaped_on_spawn() {
        let tasks = WidgetTasks::new();
        for _ in 0..1_000 {
            tasks.spawn(async {});
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        tasks.spawn(async {});

        assert!(tasks.pending() <= 2, "pending = {}", tasks.pending());
        tasks.settled().await;
        assert_eq!(tasks.pending(), 0);
    }

    #[tokio::test]
    async fn cancelled_tasks_never_complete() {
        let tasks = WidgetTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let pending = counter.clone();
        tasks.spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            pending.fetch_add(1, Ordering::SeqCst);
        });
        tasks.cancel();
        let late = counter.clone();
        tasks.spawn(async move {
            late.fetch_add(1, Ordering::SeqCst);
        });

        tasks.settled().await;
        assert!(!tasks.is_live());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
