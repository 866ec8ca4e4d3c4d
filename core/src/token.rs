use std::fmt;
use std::sync::Weak;

use tracing::debug;

use crate::center::{BroadcastCenter, ObserverHandle};

/// Owned handle for one active subscription.
///
/// Dropping the token (or calling [`release`](Self::release)) removes the
/// registration from the center exactly once. The token does not keep the
/// center alive; if the center is gone by the time the token is released
/// there is nothing left to unsubscribe from.
///
/// # Lifecycle
///
/// 1. **Active**: returned by [`ObserveExt::observe`](crate::ObserveExt::observe)
/// 2. **Released**: after the first `release()` or on drop; terminal
#[must_use = "dropping the token unsubscribes immediately"]
pub struct NotificationToken {
    handle: Option<ObserverHandle>,
    center: Weak<dyn BroadcastCenter>,
}

impl NotificationToken {
    pub fn new(handle: ObserverHandle, center: Weak<dyn BroadcastCenter>) -> Self {
        Self {
            handle: Some(handle),
            center,
        }
    }

    /// Raw registration handle, `None` once released.
    pub fn handle(&self) -> Option<&ObserverHandle> {
        self.handle.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Unsubscribes now.
    ///
    /// Returns `true` only for the call that actually removed the
    /// registration; later calls are no-ops.
    pub fn release(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        match self.center.upgrade() {
            Some(center) => center.remove_observer(&handle),
            None => {
                debug!(observer = handle.id(), name = %handle.name(), "Center dropped before token release");
                false
            }
        }
    }
}

impl Drop for NotificationToken {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for NotificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationToken")
            .field("handle", &self.handle)
            .finish()
    }
}
