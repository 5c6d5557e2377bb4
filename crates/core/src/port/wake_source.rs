// Wake Source Port - scoped keep-awake resource held across a worker run

/// Host-supplied keep-awake resource (e.g. a platform wake lock).
///
/// The worker loop acquires a guard when it starts and drops it on every
/// exit path: exhaustion, pause, stop, and shutdown alike.
pub trait WakeSource: Send + Sync {
    fn acquire(&self) -> WakeGuard;
}

/// RAII guard for an acquired wake resource.
pub struct WakeGuard {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl WakeGuard {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for WakeGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Default wake source: holds nothing.
pub struct NoopWakeSource;

impl WakeSource for NoopWakeSource {
    fn acquire(&self) -> WakeGuard {
        WakeGuard::noop()
    }
}

pub mod mocks {
    use super::{WakeGuard, WakeSource};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    /// Records acquire/release pairs for balance assertions.
    pub struct CountingWakeSource {
        active: Arc<AtomicI64>,
        total: Arc<AtomicI64>,
    }

    impl CountingWakeSource {
        pub fn new() -> Self {
            Self {
                active: Arc::new(AtomicI64::new(0)),
                total: Arc::new(AtomicI64::new(0)),
            }
        }

        /// Guards currently held.
        pub fn active(&self) -> i64 {
            self.active.load(Ordering::SeqCst)
        }

        /// Guards ever acquired.
        pub fn total_acquired(&self) -> i64 {
            self.total.load(Ordering::SeqCst)
        }
    }

    impl Default for CountingWakeSource {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WakeSource for CountingWakeSource {
        fn acquire(&self) -> WakeGuard {
            self.active.fetch_add(1, Ordering::SeqCst);
            self.total.fetch_add(1, Ordering::SeqCst);
            let active = Arc::clone(&self.active);
            WakeGuard::new(move || {
                active.fetch_sub(1, Ordering::SeqCst);
            })
        }
    }

}
