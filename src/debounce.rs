use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Monotonic request counter. Only the response of the latest issued
/// request is applied.
#[derive(Debug, Default)]
pub struct Sequence {
    latest: AtomicU64,
}

impl Sequence {
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Makes every outstanding ticket stale.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

/// Single-slot task holder. Scheduling replaces (and aborts) whatever was
/// pending, including a request that already left the timer.
#[derive(Debug)]
pub struct Debouncer {
    runtime: Handle,
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            slot: Mutex::new(None),
        }
    }

    /// Runs `fut` after `delay` unless superseded first.
    pub fn schedule<F>(&self, delay: Duration, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.replace(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            fut.await;
        }));
    }

    /// Runs `fut` right away, still aborting the pending one.
    pub fn run_now<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.replace(self.runtime.spawn(fut));
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    fn replace(&self, handle: JoinHandle<()>) {
        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
