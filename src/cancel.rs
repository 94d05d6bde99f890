// src/cancel.rs

//! Process-wide cancellation of the currently running invocation.
//!
//! The coordinator owns a single slot: either empty, or holding the handle of
//! the invocation a mode body is running right now. The interrupt path
//! atomically takes whatever is in the slot and asks it to stop; it never
//! waits for the stop to take effect. Mode bodies learn about cancellation by
//! checking [`Registration::finish`] after their run returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::InvocationHandle;

#[derive(Debug, Default)]
pub struct CancellationCoordinator {
    slot: Mutex<Option<InvocationHandle>>,
    canceled: AtomicBool,
}

impl CancellationCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn slot(&self) -> MutexGuard<'_, Option<InvocationHandle>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `handle` as the running invocation.
    ///
    /// The returned guard clears the slot when finished or dropped, so the
    /// registration never outlives the run it wraps.
    pub fn register(&self, handle: InvocationHandle) -> Registration<'_> {
        let previous = {
            let mut slot = self.slot();
            self.canceled.store(false, Ordering::SeqCst);
            slot.replace(handle)
        };
        debug_assert!(
            previous.is_none(),
            "an invocation was registered while another was still active"
        );
        debug!("invocation registered for cancellation");
        Registration {
            coordinator: self,
            cleared: false,
        }
    }

    /// Interrupt entry point: take the active handle (if any) and request a
    /// stop. Returns whether a stop was issued.
    ///
    /// Returns immediately; repeated calls with an empty slot do nothing.
    pub fn interrupt(&self) -> bool {
        let taken = {
            let mut slot = self.slot();
            let taken = slot.take();
            if taken.is_some() {
                self.canceled.store(true, Ordering::SeqCst);
            }
            taken
        };
        match taken {
            Some(handle) => {
                let delivered = handle.request_stop();
                info!(delivered, "interrupt: stop requested for running invocation");
                true
            }
            None => {
                debug!("interrupt with no active invocation; ignoring");
                false
            }
        }
    }

    pub fn has_active(&self) -> bool {
        self.slot().is_some()
    }

    fn clear(&self) {
        self.slot().take();
    }
}

/// Scope of one registered run. See [`CancellationCoordinator::register`].
#[derive(Debug)]
pub struct Registration<'a> {
    coordinator: &'a CancellationCoordinator,
    cleared: bool,
}

impl Registration<'_> {
    /// Deregister and report whether an interrupt hit this run.
    pub fn finish(mut self) -> bool {
        self.cleared = true;
        let mut slot = self.coordinator.slot();
        slot.take();
        self.coordinator.canceled.swap(false, Ordering::SeqCst)
    }
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        if !self.cleared {
            self.coordinator.clear();
        }
    }
}

/// Forward Ctrl-C to the coordinator for the lifetime of the process.
///
/// Runs on the Tokio runtime's worker threads, independent of whatever the
/// mode body is blocked on.
pub fn spawn_interrupt_listener(coordinator: Arc<CancellationCoordinator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C; interrupts disabled");
                return;
            }
            coordinator.interrupt();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StopSignal;

    #[test]
    fn interrupt_when_idle_is_a_noop() {
        let coord = CancellationCoordinator::new();
        assert!(!coord.interrupt());
        assert!(!coord.interrupt());
    }

    #[test]
    fn interrupt_stops_registered_invocation_once() {
        let coord = CancellationCoordinator::new();
        let signal = StopSignal::new();

        let reg = coord.register(InvocationHandle::new(&signal));
        assert!(coord.has_active());
        assert!(coord.interrupt());
        assert!(signal.is_requested());
        assert!(!coord.has_active());
        // Slot already empty: second interrupt reaches nothing.
        assert!(!coord.interrupt());
        assert!(reg.finish());
    }

    #[test]
    fn finish_without_interrupt_reports_not_canceled() {
        let coord = CancellationCoordinator::new();
        let signal = StopSignal::new();
        let reg = coord.register(InvocationHandle::new(&signal));
        assert!(!reg.finish());
        assert!(!coord.has_active());
        assert!(!coord.interrupt());
        assert!(!signal.is_requested());
    }

    #[test]
    fn dropping_registration_clears_slot() {
        let coord = CancellationCoordinator::new();
        let signal = StopSignal::new();
        {
            let _reg = coord.register(InvocationHandle::new(&signal));
            assert!(coord.has_active());
        }
        assert!(!coord.has_active());
    }

    #[test]
    fn cancellation_flag_does_not_leak_into_next_run() {
        let coord = CancellationCoordinator::new();
        let first = StopSignal::new();
        let reg = coord.register(InvocationHandle::new(&first));
        coord.interrupt();
        drop(reg);

        let second = StopSignal::new();
        let reg = coord.register(InvocationHandle::new(&second));
        assert!(!reg.finish());
        assert!(!second.is_requested());
    }
}
