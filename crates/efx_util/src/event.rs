/* 📖 # How does notify stay safe when callbacks change the manager?

Notification runs in two phases:
1. Under the lock, the subscriber list of the event is scanned once. Live
   subscribers are copied into a local batch in registration order. Once
   subscribers are removed from the list before they are batched, and weak
   subscribers whose target is gone are pruned without being batched.
2. The lock is released and the batch is invoked.

Because no lock is held while callbacks run, a callback may register, unregister
or notify on the same manager. Changes it makes take effect for the next notify;
the batch already taken is delivered as it is.

Each registration returns a `ListenerHandle`. The once flag is stored on the
subscription itself, so a callback can be once on one event and persistent on
another.
*/

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::log;

/// Identifier events are grouped under.
pub type EventId = i32;

/// A subscriber callback receiving the notification argument.
pub type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Weak form of [`Callback`], see [`EventManager::register_weak`].
pub type WeakCallback<A> = Weak<dyn Fn(&A) + Send + Sync>;

/// Identifies one registration, returned by [`EventManager::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle {
    event: EventId,
    id: u64,
}

impl ListenerHandle {
    pub fn event(&self) -> EventId {
        self.event
    }
}

enum Target<A: ?Sized> {
    Strong(Callback<A>),
    Weak(WeakCallback<A>),
}

impl<A: ?Sized> Target<A> {
    fn upgrade(&self) -> Option<Callback<A>> {
        match self {
            Target::Strong(callback) => Some(callback.clone()),
            Target::Weak(callback) => callback.upgrade(),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            Target::Strong(_) => true,
            Target::Weak(callback) => callback.strong_count() > 0,
        }
    }

    fn points_to(&self, callback: &Callback<A>) -> bool {
        match self {
            Target::Strong(own) => Arc::ptr_eq(own, callback),
            Target::Weak(own) => std::ptr::addr_eq(own.as_ptr(), Arc::as_ptr(callback)),
        }
    }
}

struct Subscription<A: ?Sized> {
    id: u64,
    target: Target<A>,
    once: bool,
}

/// Publish/subscribe registry keyed by [`EventId`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use efx_util::event::EventManager;
///
/// let manager = EventManager::<str>::new(true);
/// let seen = Arc::new(AtomicUsize::new(0));
/// let counter = seen.clone();
/// manager.register(1, Arc::new(move |_: &str| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }), true);
///
/// manager.notify(1, "first");
/// manager.notify(1, "second");
/// assert_eq!(seen.load(Ordering::SeqCst), 1);
/// ```
pub struct EventManager<A: ?Sized = ()> {
    multiple: bool,
    next_id: AtomicU64,
    subscriptions: Mutex<HashMap<EventId, Vec<Subscription<A>>>>,
}

impl<A: ?Sized> std::fmt::Debug for EventManager<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscriptions = self.subscriptions.lock();
        let mut events: Vec<(EventId, usize)> = subscriptions
            .iter()
            .map(|(event, subs)| (*event, subs.len()))
            .collect();
        events.sort();
        f.debug_struct("EventManager")
            .field("multiple", &self.multiple)
            .field("events", &events)
            .finish()
    }
}

impl<A: ?Sized> Default for EventManager<A> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<A: ?Sized> EventManager<A> {
    /// Creates an empty manager.
    ///
    /// With `multiple` false, an event that already has more than one live
    /// subscriber accepts no further registrations.
    pub fn new(multiple: bool) -> Self {
        Self {
            multiple,
            next_id: AtomicU64::new(1),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Subscribes `callback` to `event`.
    ///
    /// Returns `None` when the callback is already subscribed to the event, or
    /// when a single-subscriber manager rejects it.
    pub fn register(
        &self,
        event: EventId,
        callback: Callback<A>,
        once: bool,
    ) -> Option<ListenerHandle> {
        self.insert(event, Target::Strong(callback), once)
    }

    /// Subscribes `callback` without keeping it alive.
    ///
    /// Once every strong reference is dropped the subscription counts as absent
    /// and is pruned by the next notify. A callback that is already gone is
    /// rejected.
    pub fn register_weak(
        &self,
        event: EventId,
        callback: &WeakCallback<A>,
        once: bool,
    ) -> Option<ListenerHandle> {
        if callback.strong_count() == 0 {
            log::error("EventManager.register: nil callback, eid={0}", &[&event]);
            return None;
        }
        self.insert(event, Target::Weak(callback.clone()), once)
    }

    fn insert(&self, event: EventId, target: Target<A>, once: bool) -> Option<ListenerHandle> {
        let Some(callback) = target.upgrade() else {
            log::error("EventManager.register: nil callback, eid={0}", &[&event]);
            return None;
        };

        let mut subscriptions = self.subscriptions.lock();
        if let Some(existing) = subscriptions.get(&event) {
            let live = existing.iter().filter(|sub| sub.target.is_live()).count();
            if !self.multiple && live > 1 {
                drop(subscriptions);
                log::error(
                    "EventManager.register: not support multi-register, eid={0}",
                    &[&event],
                );
                return None;
            }
            if existing.iter().any(|sub| sub.target.points_to(&callback)) {
                debug!(event, "callback already registered");
                return None;
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let list = subscriptions.entry(event).or_default();
        list.push(Subscription { id, target, once });
        debug!(event, once, subscribers = list.len(), "callback registered");
        Some(ListenerHandle { event, id })
    }

    /// Removes the registration identified by `handle`.
    pub fn unregister(&self, event: EventId, handle: &ListenerHandle) -> bool {
        if handle.event != event {
            return false;
        }
        self.remove_first(event, |sub| sub.id == handle.id)
    }

    /// Removes the first registration of `callback` on `event`.
    pub fn unregister_callback(&self, event: EventId, callback: &Callback<A>) -> bool {
        self.remove_first(event, |sub| sub.target.points_to(callback))
    }

    fn remove_first(&self, event: EventId, matches: impl Fn(&Subscription<A>) -> bool) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let Some(list) = subscriptions.get_mut(&event) else {
            return false;
        };
        let Some(idx) = list.iter().position(matches) else {
            return false;
        };
        list.remove(idx);
        if list.is_empty() {
            subscriptions.remove(&event);
        }
        debug!(event, "callback unregistered");
        true
    }

    /// Removes every subscriber of `event`. Returns whether the event had any.
    pub fn unregister_all(&self, event: EventId) -> bool {
        let removed = self.subscriptions.lock().remove(&event);
        debug!(event, removed = removed.as_ref().map_or(0, Vec::len), "event cleared");
        removed.is_some()
    }

    /// Invokes every live subscriber of `event` with `args`, in registration order.
    pub fn notify(&self, event: EventId, args: &A) {
        let batch = {
            let mut subscriptions = self.subscriptions.lock();
            let Some(list) = subscriptions.get_mut(&event) else {
                return;
            };
            let mut batch = Vec::with_capacity(list.len());
            list.retain(|sub| match sub.target.upgrade() {
                Some(callback) => {
                    batch.push(callback);
                    !sub.once
                }
                None => false,
            });
            if list.is_empty() {
                subscriptions.remove(&event);
            }
            batch
        };

        for callback in &batch {
            callback(args);
        }
    }

    /// The live callbacks of `event`, or `None` if nothing is subscribed.
    pub fn get(&self, event: EventId) -> Option<Vec<Callback<A>>> {
        let subscriptions = self.subscriptions.lock();
        subscriptions
            .get(&event)
            .map(|list| list.iter().filter_map(|sub| sub.target.upgrade()).collect())
    }

    /// Number of registrations on `event`, including weak ones not yet pruned.
    pub fn len(&self, event: EventId) -> usize {
        self.subscriptions.lock().get(&event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }

    /// Removes every subscription of every event.
    pub fn clear(&self) {
        self.subscriptions.lock().clear();
    }
}
