//! Busy indicators shared between the core and whoever renders it.
//!
//! Long operations keep `&mut self` across their awaits, so a renderer cannot
//! ask the owner whether it is busy. It holds a cloned [`Indicator`] instead
//! and reads it while the operation is suspended.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Indicator(Arc<AtomicBool>);

impl Indicator {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn set(&self, active: bool) {
        self.0.store(active, Ordering::SeqCst);
    }

    /// Mark active until the guard drops, whatever the current state.
    pub(crate) fn hold(&self) -> ActiveGuard {
        self.set(true);
        ActiveGuard(self.clone())
    }

    /// Like [`hold`](Self::hold), but `None` if already active.
    pub(crate) fn try_hold(&self) -> Option<ActiveGuard> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ActiveGuard(self.clone()))
    }
}

/// Clears its indicator on drop, so an abandoned future never leaves it stuck.
#[derive(Debug)]
pub(crate) struct ActiveGuard(Indicator);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
