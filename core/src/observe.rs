//! Typed subscription entry point.
//!
//! [`ObserveExt::observe`] is the only place where a descriptor meets a
//! center: it wraps the user's typed callback in a raw observer that decodes
//! each envelope first, and hands back a [`NotificationToken`] for the
//! resulting registration.

use std::sync::{Arc, Weak};

use tokio::runtime::Handle;

use crate::center::{BroadcastCenter, RawObserver};
use crate::descriptor::NotificationDescriptor;
use crate::envelope::Envelope;
use crate::token::NotificationToken;
use crate::Result;

/// Typed `observe` for any shared [`BroadcastCenter`], concrete or `dyn`.
pub trait ObserveExt {
    /// Registers `block` for every envelope posted on `descriptor.name()`.
    ///
    /// Each delivered envelope goes through `descriptor.decode` before
    /// `block` sees it. A decode failure is returned from the raw observer
    /// and `block` is not called; the center decides whether that aborts
    /// the post. `queue` is forwarded to the center untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    /// use herald_core::{BroadcastCenter, NotificationCenter, NotificationDescriptor, NotificationName, ObserveExt};
    ///
    /// struct Counter;
    /// impl NotificationDescriptor for Counter {
    ///     type Payload = u32;
    ///     fn name(&self) -> NotificationName {
    ///         "Counter".into()
    ///     }
    /// }
    ///
    /// let center = NotificationCenter::new();
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&seen);
    /// let token = center.observe(Counter, None, move |n| sink.lock().unwrap().push(n));
    ///
    /// center.post(Counter.encode(7).unwrap()).unwrap();
    /// drop(token);
    /// center.post(Counter.encode(8).unwrap()).unwrap();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![7]);
    /// ```
    fn observe<D, F>(&self, descriptor: D, queue: Option<Handle>, block: F) -> NotificationToken
    where
        D: NotificationDescriptor + Send + Sync + 'static,
        F: Fn(D::Payload) + Send + Sync + 'static;
}

impl<C> ObserveExt for Arc<C>
where
    C: BroadcastCenter + 'static,
{
    fn observe<D, F>(&self, descriptor: D, queue: Option<Handle>, block: F) -> NotificationToken
    where
        D: NotificationDescriptor + Send + Sync + 'static,
        F: Fn(D::Payload) + Send + Sync + 'static,
    {
        let weak: Weak<C> = Arc::downgrade(self);
        let center: Weak<dyn BroadcastCenter> = weak;
        register(self.as_ref(), center, descriptor, queue, block)
    }
}

impl ObserveExt for Arc<dyn BroadcastCenter> {
    fn observe<D, F>(&self, descriptor: D, queue: Option<Handle>, block: F) -> NotificationToken
    where
        D: NotificationDescriptor + Send + Sync + 'static,
        F: Fn(D::Payload) + Send + Sync + 'static,
    {
        register(self.as_ref(), Arc::downgrade(self), descriptor, queue, block)
    }
}

fn register<D, F>(
    center: &dyn BroadcastCenter,
    weak: Weak<dyn BroadcastCenter>,
    descriptor: D,
    queue: Option<Handle>,
    block: F,
) -> NotificationToken
where
    D: NotificationDescriptor + Send + Sync + 'static,
    F: Fn(D::Payload) + Send + Sync + 'static,
{
    let name = descriptor.name();
    let observer: RawObserver = Arc::new(move |envelope: &Envelope| -> Result<()> {
        block(descriptor.decode(envelope)?);
        Ok(())
    });

    let handle = center.add_observer(&name, queue, observer);
    NotificationToken::new(handle, weak)
}
