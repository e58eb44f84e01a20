//! Computation lifecycle
//!
//! ```text
//!  NotRunning ──begin──▶ Running ──end──▶ Finished
//!                           │                 │
//!                         abort            begin (again)
//!                           ▼
//!                   PendingAbortion ──end──▶ Aborted
//! ```
//!
//! `Finished` and `Aborted` accept a new `begin`. Beginning while `Running`
//! or `PendingAbortion` fails with [`AlgorithmError::AlreadyRunning`]. The
//! state mutex only guards transitions; algorithm data is single-writer.
//!
//! Copyright (c) 2025 Quiver Contributors

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::cancellation::{CancelManager, CancelNotice};
use crate::algorithm::events::{SharedEvent, Subscription};
use crate::algorithm::services::ServiceRegistry;
use crate::algorithm::traits::AlgorithmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputationState {
    NotRunning,
    Running,
    PendingAbortion,
    Aborted,
    Finished,
}

impl ComputationState {
    /// `true` while a computation is in flight
    pub fn is_active(self) -> bool {
        matches!(self, Self::Running | Self::PendingAbortion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Started,
    Finished,
    Aborted,
    StateChanged {
        from: ComputationState,
        to: ComputationState,
    },
}

struct CoreShared {
    state: Mutex<ComputationState>,
    services: OnceLock<Arc<ServiceRegistry>>,
    hosted: bool,
    lifecycle: SharedEvent<LifecycleEvent>,
}

impl CoreShared {
    fn lock_state(&self) -> MutexGuard<'_, ComputationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn services(&self) -> &Arc<ServiceRegistry> {
        self.services.get_or_init(|| Arc::new(ServiceRegistry::new()))
    }

    fn abort(&self) {
        let mut state = self.lock_state();
        if *state != ComputationState::Running {
            debug!("Abort ignored in state {:?}", *state);
            return;
        }

        *state = ComputationState::PendingAbortion;
        let manager = self.services().cancel_manager();
        let requested = manager.request();
        drop(state);

        debug!("Abort requested");
        if requested {
            manager.notify(CancelNotice::Requested);
        }
        self.lifecycle.raise(&LifecycleEvent::StateChanged {
            from: ComputationState::Running,
            to: ComputationState::PendingAbortion,
        });
    }
}

/// Lifecycle state, services and notifications of one algorithm instance
///
/// Cloning yields another handle to the same instance.
#[derive(Clone)]
pub struct AlgorithmCore {
    shared: Arc<CoreShared>,
}

impl AlgorithmCore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(CoreShared {
                state: Mutex::new(ComputationState::NotRunning),
                services: OnceLock::new(),
                hosted: false,
                lifecycle: SharedEvent::new(),
            }),
        }
    }

    /// Core that borrows `host`'s services, so `host.abort()` reaches it
    pub fn with_host(host: &AlgorithmCore) -> Self {
        let services = OnceLock::new();
        // A fresh OnceLock cannot already be set.
        let _ = services.set(Arc::clone(host.services()));
        Self {
            shared: Arc::new(CoreShared {
                state: Mutex::new(ComputationState::NotRunning),
                services,
                hosted: true,
                lifecycle: SharedEvent::new(),
            }),
        }
    }

    pub fn state(&self) -> ComputationState {
        *self.shared.lock_state()
    }

    pub fn is_hosted(&self) -> bool {
        self.shared.hosted
    }

    /// Service registry, created on first use
    pub fn services(&self) -> &Arc<ServiceRegistry> {
        self.shared.services()
    }

    pub fn cancel_manager(&self) -> Arc<CancelManager> {
        self.services().cancel_manager()
    }

    #[inline]
    pub fn is_cancelling(&self) -> bool {
        self.cancel_manager().is_cancelling()
    }

    /// `Running -> PendingAbortion` plus a cancellation request. No-op otherwise.
    pub fn abort(&self) {
        self.shared.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn on_lifecycle(
        &self,
        handler: impl FnMut(&LifecycleEvent) + Send + 'static,
    ) -> Subscription {
        self.shared.lifecycle.subscribe(handler)
    }

    /// Moves to `Running`. The returned guard ends the computation.
    ///
    /// An owning core clears its cancellation flag here. A hosted core leaves
    /// the host's flag alone so that a pending host abort stays visible.
    pub fn begin_computation(&self) -> Result<ComputationGuard, AlgorithmError> {
        let mut state = self.shared.lock_state();
        let from = *state;
        if from.is_active() {
            return Err(AlgorithmError::AlreadyRunning);
        }

        let manager = self.cancel_manager();
        let was_cancelling = !self.shared.hosted && manager.clear();
        *state = ComputationState::Running;
        drop(state);

        debug!("Computation started ({from:?} -> Running)");
        if was_cancelling {
            manager.notify(CancelNotice::Reset);
        }
        self.raise_transition(from, ComputationState::Running);
        self.shared.lifecycle.raise(&LifecycleEvent::Started);

        Ok(ComputationGuard {
            core: self.clone(),
            ended: false,
        })
    }

    /// `Running -> Finished` or `PendingAbortion -> Aborted`
    pub fn end_computation(&self) -> Result<ComputationState, AlgorithmError> {
        let mut state = self.shared.lock_state();
        let from = *state;
        let to = match from {
            ComputationState::Running => ComputationState::Finished,
            ComputationState::PendingAbortion => ComputationState::Aborted,
            _ => {
                return Err(AlgorithmError::InvalidStateTransition {
                    from,
                    to: ComputationState::Finished,
                })
            }
        };
        *state = to;
        drop(state);

        debug!("Computation ended ({from:?} -> {to:?})");
        self.raise_transition(from, to);
        self.shared.lifecycle.raise(&match to {
            ComputationState::Aborted => LifecycleEvent::Aborted,
            _ => LifecycleEvent::Finished,
        });
        Ok(to)
    }

    fn raise_transition(&self, from: ComputationState, to: ComputationState) {
        self.shared
            .lifecycle
            .raise(&LifecycleEvent::StateChanged { from, to });
    }
}

impl Default for AlgorithmCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AlgorithmCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmCore")
            .field("state", &self.state())
            .field("hosted", &self.shared.hosted)
            .finish()
    }
}

/// Ends the computation when dropped, unless ended explicitly
#[must_use = "the computation ends when the guard is dropped"]
#[derive(Debug)]
pub struct ComputationGuard {
    core: AlgorithmCore,
    ended: bool,
}

impl ComputationGuard {
    pub fn finish(mut self) -> Result<ComputationState, AlgorithmError> {
        self.ended = true;
        self.core.end_computation()
    }
}

impl Drop for ComputationGuard {
    fn drop(&mut self) {
        if !self.ended {
            if let Err(err) = self.core.end_computation() {
                warn!("Failed to end computation on unwind: {err}");
            }
        }
    }
}

/// Send + Sync handle that can abort a computation from another thread
#[derive(Clone)]
pub struct AbortHandle {
    shared: Arc<CoreShared>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.shared.abort();
    }

    pub fn state(&self) -> ComputationState {
        *self.shared.lock_state()
    }

    pub fn is_cancelling(&self) -> bool {
        self.shared.services().cancel_manager().is_cancelling()
    }
}

impl fmt::Debug for AbortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortHandle")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(core: &AlgorithmCore) -> (Arc<Mutex<Vec<LifecycleEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let subscription = core.on_lifecycle(move |event| sink.lock().unwrap().push(*event));
        (events, subscription)
    }

    #[test]
    fn test_normal_lifecycle() {
        let core = AlgorithmCore::new();
        let (events, _subscription) = record(&core);

        let guard = core.begin_computation().unwrap();
        assert_eq!(core.state(), ComputationState::Running);
        assert_eq!(guard.finish().unwrap(), ComputationState::Finished);

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                LifecycleEvent::StateChanged {
                    from: ComputationState::NotRunning,
                    to: ComputationState::Running
                },
                LifecycleEvent::Started,
                LifecycleEvent::StateChanged {
                    from: ComputationState::Running,
                    to: ComputationState::Finished
                },
                LifecycleEvent::Finished,
            ]
        );
    }

    #[test]
    fn test_begin_twice_fails_fast() {
        let core = AlgorithmCore::new();
        let _guard = core.begin_computation().unwrap();
        assert_eq!(
            core.begin_computation().unwrap_err(),
            AlgorithmError::AlreadyRunning
        );
    }

    #[test]
    fn test_end_without_begin_is_rejected() {
        let core = AlgorithmCore::new();
        assert!(matches!(
            core.end_computation(),
            Err(AlgorithmError::InvalidStateTransition {
                from: ComputationState::NotRunning,
                ..
            })
        ));
    }

    #[test]
    fn test_abort_moves_to_aborted() {
        let core = AlgorithmCore::new();
        core.abort();
        assert_eq!(core.state(), ComputationState::NotRunning);
        assert!(!core.is_cancelling());

        let guard = core.begin_computation().unwrap();
        core.abort_handle().abort();
        assert_eq!(core.state(), ComputationState::PendingAbortion);
        assert!(core.is_cancelling());
        assert_eq!(guard.finish().unwrap(), ComputationState::Aborted);

        drop(core.begin_computation().unwrap());
        assert!(!core.is_cancelling());
        assert_eq!(core.state(), ComputationState::Finished);
    }

    #[test]
    fn test_hosted_core_shares_cancellation() {
        let host = AlgorithmCore::new();
        let hosted = AlgorithmCore::with_host(&host);
        assert!(hosted.is_hosted());

        let _outer = host.begin_computation().unwrap();
        host.abort();

        let inner = hosted.begin_computation().unwrap();
        assert!(hosted.is_cancelling());
        assert_eq!(inner.finish().unwrap(), ComputationState::Finished);
    }

    #[test]
    fn test_guard_drop_ends_computation() {
        let core = AlgorithmCore::new();
        {
            let _guard = core.begin_computation().unwrap();
        }
        assert_eq!(core.state(), ComputationState::Finished);
    }
}
