#![forbid(unsafe_code)]

//! The toast registry: record store and publish/subscribe hub.
//!
//! # Design
//!
//! [`ToastRegistry`] is a cheap `Clone` handle over shared, single-threaded
//! state (`Rc<..>` with `RefCell` interiors). Every clone sees the same
//! records and the same subscribers. Each application context builds its own
//! registry; nothing is global.
//!
//! Records are never deleted by dismissal: the registry keeps every toast it
//! has seen (the history) and tracks dismissed ids in a separate set that the
//! active projection filters out.
//!
//! # Publication order
//!
//! | Operation        | Subscribers notified                         |
//! |------------------|----------------------------------------------|
//! | `create`         | before `create` returns                      |
//! | `add_toast`      | before `add_toast` returns                   |
//! | `dismiss(id)`    | on the next [`ToastRegistry::flush_frame`]   |
//! | `dismiss_all()`  | before `dismiss_all` returns                 |
//!
//! Deferring single dismissals to the next frame keeps a dismissal issued
//! during a render pass from landing in the middle of that pass.
//!
//! Only `dismiss(id)` adds to the dismissed set. `dismiss_all()` publishes
//! sentinels and nothing else, so the active projection is unchanged by it.
//!
//! # Invariants
//!
//! 1. Every dismissed id belongs to a stored record.
//! 2. Recreating a dismissed id removes it from the dismissed set before the
//!    new state is published.
//! 3. `create` on an existing id merges; it never replaces wholesale.
//! 4. Subscribers are notified in registration order.
//!
//! # Reentrancy
//!
//! No borrow of registry state is held while a subscriber runs, so callbacks
//! may create, dismiss, subscribe and unsubscribe freely. Publication walks a
//! snapshot of the subscriber map taken when it starts: subscribers added
//! during a publish miss that event, and subscribers removed during a publish
//! are skipped if they have not been called yet.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::config::ToasterConfig;
use crate::id::{IdAllocator, ToastId};
use crate::toast::{Content, RenderNode, Toast, ToastEvent, ToastOptions, ToastPatch, ToastToDismiss, ToastType};

type Callback = Rc<dyn Fn(&ToastEvent)>;

/// Record storage guarded by one `RefCell`.
struct RegistryState {
    /// Every record ever created, in creation order.
    toasts: Vec<Toast>,
    /// Ids excluded from the active projection.
    dismissed: HashSet<ToastId>,
    /// Ids whose dismissal sentinel waits for the next frame.
    deferred: VecDeque<ToastId>,
}

#[derive(Default)]
struct SubscriberMap {
    next_key: u64,
    /// Keys grow monotonically, so map order is registration order.
    entries: BTreeMap<u64, Callback>,
}

struct RegistryInner {
    state: RefCell<RegistryState>,
    subscribers: RefCell<SubscriberMap>,
    ids: IdAllocator,
    history_limit: Option<usize>,
}

/// Shared toast store with change notification.
#[derive(Clone)]
pub struct ToastRegistry {
    inner: Rc<RegistryInner>,
}

/// Non-owning handle to a [`ToastRegistry`].
#[derive(Clone)]
pub struct WeakRegistry {
    inner: Weak<RegistryInner>,
}

impl WeakRegistry {
    /// Recover the registry if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ToastRegistry> {
        self.inner.upgrade().map(|inner| ToastRegistry { inner })
    }
}

impl fmt::Debug for WeakRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRegistry")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl fmt::Debug for ToastRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("ToastRegistry")
            .field("toasts", &state.toasts.len())
            .field("dismissed", &state.dismissed.len())
            .field("deferred", &state.deferred.len())
            .field("subscribers", &self.inner.subscribers.borrow().entries.len())
            .field("next_id", &self.inner.ids.peek())
            .finish()
    }
}

impl Default for ToastRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastRegistry {
    /// Empty registry with unlimited history.
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_limit(None)
    }

    /// Empty registry honoring `config.history_limit`.
    #[must_use]
    pub fn with_config(config: &ToasterConfig) -> Self {
        Self::with_history_limit(config.history_limit)
    }

    /// Empty registry keeping at most `history_limit` records where it can.
    #[must_use]
    pub fn with_history_limit(history_limit: Option<usize>) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                state: RefCell::new(RegistryState {
                    toasts: Vec::new(),
                    dismissed: HashSet::new(),
                    deferred: VecDeque::new(),
                }),
                subscribers: RefCell::new(SubscriberMap::default()),
                ids: IdAllocator::new(),
                history_limit,
            }),
        }
    }

    /// Handle that does not keep the registry alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakRegistry {
        WeakRegistry {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The id allocator shared by every creation path.
    #[must_use]
    pub fn ids(&self) -> &IdAllocator {
        &self.inner.ids
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Register `callback` for every published event.
    ///
    /// The returned guard removes exactly this callback, either through
    /// [`ToastSubscription::unsubscribe`] or when it is dropped.
    pub fn subscribe(&self, callback: impl Fn(&ToastEvent) + 'static) -> ToastSubscription {
        let mut subscribers = self.inner.subscribers.borrow_mut();
        let key = subscribers.next_key;
        subscribers.next_key += 1;
        subscribers.entries.insert(key, Rc::new(callback));
        trace!(key, "toast subscriber added");
        ToastSubscription {
            registry: Rc::downgrade(&self.inner),
            key: Some(key),
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().entries.len()
    }

    fn publish(&self, event: &ToastEvent) {
        let snapshot: Vec<(u64, Callback)> = self
            .inner
            .subscribers
            .borrow()
            .entries
            .iter()
            .map(|(key, cb)| (*key, Rc::clone(cb)))
            .collect();
        trace!(id = %event.id(), dismiss = event.is_dismiss(), subscribers = snapshot.len(), "publish");

        for (key, cb) in snapshot {
            // Removed by an earlier callback of this same publish.
            if !self.inner.subscribers.borrow().entries.contains_key(&key) {
                continue;
            }
            cb(event);
        }
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a toast, or merge into the existing one with the same id.
    ///
    /// The patch id is used when it is a number or a non-empty string;
    /// otherwise a fresh id is allocated. Returns the resolved id.
    pub fn create(&self, patch: ToastPatch) -> ToastId {
        let id = self
            .inner
            .ids
            .resolve(patch.options.id.as_ref(), ToastId::is_usable);

        let published = {
            let mut state = self.inner.state.borrow_mut();
            if state.dismissed.remove(&id) {
                debug!(id = %id, "toast recreated after dismissal");
            }

            let mut updated = Vec::new();
            for toast in state.toasts.iter_mut().filter(|toast| toast.id == id) {
                patch.clone().apply_to(toast);
                updated.push(toast.clone());
            }

            if updated.is_empty() {
                let toast = patch.into_toast(id.clone());
                debug!(id = %id, kind = %toast.kind, "toast created");
                state.toasts.push(toast.clone());
                self.enforce_history_limit(&mut state);
                vec![toast]
            } else {
                debug!(id = %id, "toast updated");
                updated
            }
        };

        for toast in published {
            self.publish(&ToastEvent::Show(toast));
        }
        id
    }

    /// Store and publish `toast` without looking for an existing record.
    ///
    /// This is the bare-call path: it never merges, never undismisses, and
    /// appends even when the id is already present.
    pub fn add_toast(&self, toast: Toast) {
        {
            let mut state = self.inner.state.borrow_mut();
            debug!(id = %toast.id, kind = %toast.kind, "toast added");
            state.toasts.push(toast.clone());
            self.enforce_history_limit(&mut state);
        }
        self.publish(&ToastEvent::Show(toast));
    }

    fn typed(&self, kind: Option<ToastType>, message: Content, options: ToastOptions) -> ToastId {
        self.create(ToastPatch {
            message: Some(message),
            kind,
            jsx: None,
            options,
        })
    }

    /// Create or update a toast without touching its type.
    pub fn message(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(None, message.into(), options)
    }

    /// Create or update a success toast.
    pub fn success(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(Some(ToastType::Success), message.into(), options)
    }

    /// Create or update an error toast.
    pub fn error(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(Some(ToastType::Error), message.into(), options)
    }

    /// Create or update an info toast.
    pub fn info(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(Some(ToastType::Info), message.into(), options)
    }

    /// Create or update a warning toast.
    pub fn warning(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(Some(ToastType::Warning), message.into(), options)
    }

    /// Create or update a loading toast.
    pub fn loading(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.typed(Some(ToastType::Loading), message.into(), options)
    }

    /// Create a toast whose body is rendered by `render`.
    ///
    /// `render` receives the resolved id so the custom content can dismiss
    /// itself. The node is stored in [`Toast::jsx`]; the title stays empty.
    pub fn custom(
        &self,
        render: impl FnOnce(&ToastId) -> RenderNode,
        mut options: ToastOptions,
    ) -> ToastId {
        let id = self
            .inner
            .ids
            .resolve(options.id.as_ref(), ToastId::is_truthy);
        let node = render(&id);
        options.id = Some(id);
        self.create(ToastPatch {
            message: None,
            kind: None,
            jsx: Some(node),
            options,
        })
    }

    // ========================================================================
    // Dismissal
    // ========================================================================

    /// Mark `id` dismissed and queue its sentinel for the next frame.
    ///
    /// Subscribers are told on the next [`flush_frame`](Self::flush_frame),
    /// so code running after this call still sees the toast on screen.
    pub fn dismiss(&self, id: impl Into<ToastId>) -> ToastId {
        let id = id.into();
        let mut state = self.inner.state.borrow_mut();
        if state.toasts.iter().any(|toast| toast.id == id) {
            state.dismissed.insert(id.clone());
            debug!(id = %id, "toast dismissed");
        } else {
            warn!(id = %id, "dismissing unknown toast id");
        }
        state.deferred.push_back(id.clone());
        self.enforce_history_limit(&mut state);
        id
    }

    /// Publish a dismissal sentinel for every stored toast before returning.
    ///
    /// One sentinel is published per distinct id. The dismissed set is left
    /// alone, so [`active_toasts`](Self::active_toasts) still lists these
    /// records; subscribers such as the bridge drop them from their own
    /// views. Returns how many sentinels were published.
    pub fn dismiss_all(&self) -> usize {
        let ids: Vec<ToastId> = {
            let state = self.inner.state.borrow();
            let mut seen = HashSet::new();
            state
                .toasts
                .iter()
                .filter(|toast| seen.insert(toast.id.clone()))
                .map(|toast| toast.id.clone())
                .collect()
        };
        debug!(count = ids.len(), "all toasts dismissed");

        for id in &ids {
            self.publish(&ToastEvent::Dismiss(ToastToDismiss { id: id.clone() }));
        }
        ids.len()
    }

    /// Publish the sentinels queued by [`dismiss`](Self::dismiss).
    ///
    /// The renderer calls this once per frame. Dismissals requested while
    /// the queue is being flushed wait for the following frame. Returns how
    /// many sentinels were published.
    pub fn flush_frame(&self) -> usize {
        let pending: Vec<ToastId> = self.inner.state.borrow_mut().deferred.drain(..).collect();
        if !pending.is_empty() {
            debug!(count = pending.len(), "flushing deferred dismissals");
        }
        for id in &pending {
            self.publish(&ToastEvent::Dismiss(ToastToDismiss { id: id.clone() }));
        }
        pending.len()
    }

    /// Number of dismissals waiting for the next frame.
    #[must_use]
    pub fn pending_dismissals(&self) -> usize {
        self.inner.state.borrow().deferred.len()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Stored toasts whose id is not dismissed, in creation order.
    #[must_use]
    pub fn active_toasts(&self) -> Vec<Toast> {
        let state = self.inner.state.borrow();
        state
            .toasts
            .iter()
            .filter(|toast| !state.dismissed.contains(&toast.id))
            .cloned()
            .collect()
    }

    /// Every stored toast, dismissed ones included.
    #[must_use]
    pub fn history(&self) -> Vec<Toast> {
        self.inner.state.borrow().toasts.clone()
    }

    /// Latest record stored under `id`.
    #[must_use]
    pub fn get(&self, id: &ToastId) -> Option<Toast> {
        self.inner
            .state
            .borrow()
            .toasts
            .iter()
            .rev()
            .find(|toast| &toast.id == id)
            .cloned()
    }

    /// Whether `id` is excluded from the active projection.
    #[must_use]
    pub fn is_dismissed(&self, id: &ToastId) -> bool {
        self.inner.state.borrow().dismissed.contains(id)
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Retention
    // ========================================================================

    /// Evict the oldest dismissed records until the history fits.
    fn enforce_history_limit(&self, state: &mut RegistryState) {
        let Some(limit) = self.inner.history_limit else {
            return;
        };
        let mut excess = state.toasts.len().saturating_sub(limit);
        if excess == 0 {
            return;
        }

        let RegistryState {
            toasts, dismissed, ..
        } = state;
        let mut evicted = Vec::new();
        toasts.retain(|toast| {
            if excess > 0 && dismissed.contains(&toast.id) {
                excess -= 1;
                evicted.push(toast.id.clone());
                false
            } else {
                true
            }
        });
        for id in &evicted {
            if !toasts.iter().any(|toast| &toast.id == id) {
                dismissed.remove(id);
            }
        }
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), limit, "evicted dismissed toasts from history");
        }
    }
}

/// Guard returned by [`ToastRegistry::subscribe`].
///
/// Dropping the guard unsubscribes. [`unsubscribe`](Self::unsubscribe) does
/// the same explicitly; either way the callback is removed exactly once.
pub struct ToastSubscription {
    registry: Weak<RegistryInner>,
    key: Option<u64>,
}

impl ToastSubscription {
    /// Remove the callback now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Whether the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match (self.key, self.registry.upgrade()) {
            (Some(key), Some(inner)) => inner.subscribers.borrow().entries.contains_key(&key),
            _ => false,
        }
    }

    fn release(&mut self) {
        let Some(key) = self.key.take() else {
            return;
        };
        if let Some(inner) = self.registry.upgrade() {
            inner.subscribers.borrow_mut().entries.remove(&key);
            trace!(key, "toast subscriber removed");
        }
    }
}

impl Drop for ToastSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ToastSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastSubscription")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
