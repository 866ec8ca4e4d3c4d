// Broadcast center capability and the in-memory implementation
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::config::{CenterConfig, FailurePolicy};
use crate::envelope::{Envelope, NotificationName};
use crate::Result;

/// Untyped observer registered with a center.
///
/// Returning `Err` reports a failed delivery (usually a decode error); what
/// happens next is up to the center.
pub type RawObserver = Arc<dyn Fn(&Envelope) -> Result<()> + Send + Sync>;

/// Raw registration handle issued by [`BroadcastCenter::add_observer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObserverHandle {
    id: u64,
    name: NotificationName,
}

impl ObserverHandle {
    pub fn new(id: u64, name: NotificationName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &NotificationName {
        &self.name
    }
}

/// Process-local publish/subscribe hub.
///
/// This is the capability typed subscriptions are built on. It knows names
/// and envelopes, never payload types.
pub trait BroadcastCenter: Send + Sync {
    /// Delivers `envelope` to every observer currently registered on its name.
    ///
    /// Returns the number of observers the envelope was handed to.
    fn post(&self, envelope: Envelope) -> Result<usize>;

    /// Registers `observer` on `name`.
    ///
    /// `queue` is an execution-context hint; implementations decide what it means.
    fn add_observer(
        &self,
        name: &NotificationName,
        queue: Option<Handle>,
        observer: RawObserver,
    ) -> ObserverHandle;

    /// Removes a registration. Returns `false` if it was already gone.
    fn remove_observer(&self, handle: &ObserverHandle) -> bool;
}

/// Per-name delivery statistics.
///
/// Kept only for names that have had at least one observer. For queued
/// observers `total_delivered` counts callbacks that actually ran, so it may
/// lag behind (or stay below) the counts returned by `post`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CenterStats {
    pub total_posted: u64,
    pub total_delivered: u64,
    pub failed_deliveries: u64,
    pub active_observers: usize,
}

#[derive(Clone)]
struct Observer {
    id: u64,
    queue: Option<Handle>,
    callback: RawObserver,
    // Cleared on removal so snapshots taken by an in-flight post skip it
    active: Arc<AtomicBool>,
}

/// In-memory [`BroadcastCenter`] keyed by notification name.
///
/// Delivery is synchronous on the posting thread unless the observer was
/// registered with a runtime handle, in which case the callback is spawned
/// onto that runtime.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use herald_core::{BroadcastCenter, Envelope, NotificationCenter, Result};
///
/// let center = NotificationCenter::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let seen = Arc::clone(&hits);
/// let handle = center.add_observer(
///     &"Ping".into(),
///     None,
///     Arc::new(move |_env: &Envelope| -> Result<()> {
///         seen.fetch_add(1, Ordering::SeqCst);
///         Ok(())
///     }),
/// );
///
/// assert_eq!(center.post(Envelope::new("Ping")).unwrap(), 1);
/// assert!(center.remove_observer(&handle));
/// assert_eq!(center.post(Envelope::new("Ping")).unwrap(), 0);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct NotificationCenter {
    // Name -> Observer list
    observers: Arc<DashMap<NotificationName, Vec<Observer>>>,

    // Statistics
    stats: Arc<DashMap<NotificationName, CenterStats>>,

    next_id: AtomicU64,

    config: CenterConfig,
}

static DEFAULT_CENTER: OnceLock<Arc<NotificationCenter>> = OnceLock::new();

impl NotificationCenter {
    pub fn new() -> Arc<Self> {
        Self::with_config(CenterConfig::default())
    }

    pub fn with_config(config: CenterConfig) -> Arc<Self> {
        info!(center = %config.label, "Notification center created");
        Arc::new(Self {
            observers: Arc::new(DashMap::new()),
            stats: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
            config,
        })
    }

    /// Process-wide shared center, created on first use.
    pub fn default_center() -> Arc<Self> {
        Arc::clone(DEFAULT_CENTER.get_or_init(Self::new))
    }

    pub fn config(&self) -> &CenterConfig {
        &self.config
    }

    /// Get stats
    pub fn stats(&self, name: &NotificationName) -> Option<CenterStats> {
        self.stats.get(name).map(|s| s.clone())
    }

    pub fn observer_count(&self, name: &NotificationName) -> usize {
        self.observers.get(name).map(|o| o.len()).unwrap_or(0)
    }

    fn dispatch_queued(&self, handle: &Handle, observer: &Observer, envelope: Arc<Envelope>) {
        let callback = Arc::clone(&observer.callback);
        let active = Arc::clone(&observer.active);
        let stats = Arc::clone(&self.stats);
        let label = self.config.label.clone();
        let id = observer.id;
        handle.spawn(async move {
            if !active.load(Ordering::Acquire) {
                return;
            }
            match callback(envelope.as_ref()) {
                Ok(()) => update_stats(&stats, &envelope.name, |s| s.total_delivered += 1),
                Err(e) => {
                    update_stats(&stats, &envelope.name, |s| s.failed_deliveries += 1);
                    error!(
                        center = %label,
                        name = %envelope.name,
                        observer = id,
                        error = %e,
                        "Queued delivery failed"
                    );
                }
            }
        });
    }
}

impl BroadcastCenter for NotificationCenter {
    fn post(&self, envelope: Envelope) -> Result<usize> {
        let name = envelope.name.clone();
        debug!(center = %self.config.label, name = %name, "Posting notification");
        update_stats(&self.stats, &name, |s| s.total_posted += 1);

        // Snapshot so observers may post, observe or release while being called
        let observers: Vec<Observer> = match self.observers.get(&name) {
            Some(entry) => entry.value().clone(),
            None => Vec::new(),
        };
        if observers.is_empty() {
            if self.config.warn_unobserved {
                warn!(center = %self.config.label, name = %name, "No observers for notification");
            }
            return Ok(0);
        }

        let envelope = Arc::new(envelope);
        let mut delivered = 0usize;
        let mut ran_inline = 0u64;
        let mut outcome = Ok(());
        for observer in &observers {
            if !observer.active.load(Ordering::Acquire) {
                continue;
            }
            if let Some(handle) = &observer.queue {
                self.dispatch_queued(handle, observer, Arc::clone(&envelope));
                delivered += 1;
                continue;
            }
            match (observer.callback)(envelope.as_ref()) {
                Ok(()) => {
                    delivered += 1;
                    ran_inline += 1;
                }
                Err(e) => {
                    update_stats(&self.stats, &name, |s| s.failed_deliveries += 1);
                    match self.config.failure_policy {
                        FailurePolicy::Propagate => {
                            outcome = Err(e);
                            break;
                        }
                        FailurePolicy::LogAndContinue => {
                            warn!(
                                center = %self.config.label,
                                name = %name,
                                observer = observer.id,
                                error = %e,
                                "Delivery failed; continuing"
                            );
                        }
                    }
                }
            }
        }

        update_stats(&self.stats, &name, |s| s.total_delivered += ran_inline);
        outcome.map(|()| delivered)
    }

    fn add_observer(
        &self,
        name: &NotificationName,
        queue: Option<Handle>,
        observer: RawObserver,
    ) -> ObserverHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let queued = queue.is_some();

        self.observers
            .entry(name.clone())
            .or_insert_with(Vec::new)
            .push(Observer {
                id,
                queue,
                callback: observer,
                active: Arc::new(AtomicBool::new(true)),
            });

        self.stats
            .entry(name.clone())
            .or_insert_with(CenterStats::default)
            .active_observers += 1;

        info!(
            center = %self.config.label,
            name = %name,
            observer = id,
            queued,
            "Added observer"
        );
        ObserverHandle::new(id, name.clone())
    }

    fn remove_observer(&self, handle: &ObserverHandle) -> bool {
        let removed = match self.observers.get_mut(handle.name()) {
            Some(mut entry) => match entry.iter().position(|o| o.id == handle.id()) {
                Some(pos) => {
                    let observer = entry.remove(pos);
                    observer.active.store(false, Ordering::Release);
                    true
                }
                None => false,
            },
            None => false,
        };
        if !removed {
            debug!(center = %self.config.label, observer = handle.id(), "Observer already removed");
            return false;
        }

        self.observers
            .remove_if(handle.name(), |_, observers| observers.is_empty());
        update_stats(&self.stats, handle.name(), |s| {
            s.active_observers = s.active_observers.saturating_sub(1);
        });

        info!(
            center = %self.config.label,
            name = %handle.name(),
            observer = handle.id(),
            "Removed observer"
        );
        true
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("label", &self.config.label)
            .field("names", &self.observers.len())
            .finish()
    }
}

// Update stats helper function; names never observed have no entry
fn update_stats<F>(stats: &DashMap<NotificationName, CenterStats>, name: &NotificationName, f: F)
where
    F: FnOnce(&mut CenterStats),
{
    if let Some(mut entry) = stats.get_mut(name) {
        f(entry.value_mut());
    }
}
