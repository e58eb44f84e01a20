//! Cooperative cancellation
//!
//! A [`CancelManager`] is a counter shared by an algorithm and every
//! computation it hosts. `cancel` raises a notification only on the
//! transition from idle to cancelling, `reset_cancel` only on the way back.
//! Running computations poll `is_cancelling` at their safepoints.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::algorithm::events::{SharedEvent, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelNotice {
    Requested,
    Reset,
}

#[derive(Debug, Default)]
pub struct CancelManager {
    requests: AtomicUsize,
    notices: SharedEvent<CancelNotice>,
}

impl CancelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        if self.request() {
            self.notify(CancelNotice::Requested);
        }
    }

    pub fn reset_cancel(&self) {
        if self.clear() {
            self.notify(CancelNotice::Reset);
        }
    }

    #[inline]
    pub fn is_cancelling(&self) -> bool {
        self.requests.load(Ordering::Acquire) > 0
    }

    /// Number of `cancel` calls since the last reset
    pub fn pending_requests(&self) -> usize {
        self.requests.load(Ordering::Acquire)
    }

    pub fn on_notice(&self, handler: impl FnMut(&CancelNotice) + Send + 'static) -> Subscription {
        self.notices.subscribe(handler)
    }

    /// Increments the counter; `true` on the idle-to-cancelling transition
    pub(crate) fn request(&self) -> bool {
        self.requests.fetch_add(1, Ordering::AcqRel) == 0
    }

    /// Zeroes the counter; `true` if it was cancelling
    pub(crate) fn clear(&self) -> bool {
        self.requests.swap(0, Ordering::AcqRel) != 0
    }

    pub(crate) fn notify(&self, notice: CancelNotice) {
        debug!("Cancellation {notice:?}");
        self.notices.raise(&notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_notices_fire_on_transitions_only() {
        let manager = CancelManager::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = manager.on_notice(move |notice| sink.lock().unwrap().push(*notice));

        manager.reset_cancel();
        manager.cancel();
        manager.cancel();
        assert!(manager.is_cancelling());
        assert_eq!(manager.pending_requests(), 2);

        manager.reset_cancel();
        manager.reset_cancel();
        assert!(!manager.is_cancelling());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CancelNotice::Requested, CancelNotice::Reset]
        );
    }
}
