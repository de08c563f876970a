//! Graceful shutdown coordinator (`spec.md` §5), grounded on the original core's
//! `shutdown.hpp` singleton — reworked here as an `Arc`-shared value rather than a
//! process-wide singleton, since each reactor worker and the signal-handling thread
//! already hold a handle to the same `Server`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// The framework's only explicitly synchronized structure besides the optional
/// cross-reactor work queue (`spec.md` §5 "Shared state"): a flag plus the instant
/// shutdown was requested, shared by every reactor worker.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    requested: AtomicBool,
    requested_at: Mutex<Option<Instant>>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        ShutdownCoordinator {
            inner: Arc::new(Inner {
                requested: AtomicBool::new(false),
                requested_at: Mutex::new(None),
            }),
        }
    }

    /// Mark shutdown as requested, recording the time of the first request.
    pub fn request_shutdown(&self) {
        let already = self.inner.requested.swap(true, Ordering::AcqRel);
        if !already {
            *self.inner.requested_at.lock().unwrap() = Some(Instant::now());
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    /// True once `deadline` has elapsed since shutdown was first requested. Always
    /// `false` if shutdown was never requested.
    pub fn is_deadline_exceeded(&self, deadline: Duration) -> bool {
        match *self.inner.requested_at.lock().unwrap() {
            Some(at) => at.elapsed() >= deadline,
            None => false,
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        ShutdownCoordinator::new()
    }
}

/// Install `SIGINT`/`SIGTERM` handlers that call [`ShutdownCoordinator::request_shutdown`].
/// Spawns a dedicated OS thread to drain the signal iterator; returns once the thread
/// is running.
#[cfg(unix)]
pub fn install_signal_handlers(coordinator: ShutdownCoordinator) -> std::io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("katana-shutdown-signal".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                tracing::info!(signal, "received shutdown signal");
                coordinator.request_shutdown();
            }
        })?;
    Ok(())
}
