//! Loading indicators.
//!
//! Each in-flight query gets its own [`LoadingHandle`]. The indicator is
//! hidden when the [`LoadingGuard`] drops, so one query finishing never hides
//! another query's indicator, and an early return cannot leave one behind.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::presenter::Presenter;

/// Identifies one loading indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadingHandle(u64);

impl LoadingHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Issues loading handles and tracks which are still shown.
#[derive(Debug, Default)]
pub struct LoadingTracker {
    next_id: AtomicU64,
    active: Mutex<HashSet<LoadingHandle>>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a new indicator on `presenter`. It stays up until the guard drops.
    pub fn begin(&self, presenter: Arc<dyn Presenter>) -> LoadingGuard<'_> {
        let handle = LoadingHandle(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        if let Ok(mut active) = self.active.lock() {
            active.insert(handle);
        }
        trace!(handle = handle.0, "Loading indicator shown");
        presenter.show_loading(handle);
        LoadingGuard {
            tracker: self,
            presenter,
            handle,
        }
    }

    /// Number of indicators currently shown.
    pub fn active_count(&self) -> usize {
        self.active.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_active(&self, handle: LoadingHandle) -> bool {
        self.active
            .lock()
            .map(|a| a.contains(&handle))
            .unwrap_or(false)
    }

    fn finish(&self, handle: LoadingHandle) -> bool {
        self.active
            .lock()
            .map(|mut a| a.remove(&handle))
            .unwrap_or(false)
    }
}

/// Keeps one loading indicator visible for its lifetime.
pub struct LoadingGuard<'a> {
    tracker: &'a LoadingTracker,
    presenter: Arc<dyn Presenter>,
    handle: LoadingHandle,
}

impl LoadingGuard<'_> {
    pub fn handle(&self) -> LoadingHandle {
        self.handle
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.tracker.finish(self.handle) {
            trace!(handle = self.handle.0, "Loading indicator hidden");
            self.presenter.hide_loading(self.handle);
        }
    }
}
