#![forbid(unsafe_code)]

//! Per-component reactive view of a toaster.
//!
//! [`ToastBridge`] subscribes to the registry when it is attached and keeps
//! two [`ToastList`]s in step with the published events:
//!
//! | Event               | `toasts`                          | `history`            |
//! |---------------------|-----------------------------------|----------------------|
//! | record `t`          | replace entry with `t.id`, or push | registry history    |
//! | sentinel for `id`   | remove entries with `id`          | registry history     |
//!
//! Both lists start empty: a bridge only reflects events published after it
//! was attached.
//!
//! The subscription lives exactly as long as the bridge is mounted. After
//! [`ToastBridge::unmount`] (or drop) the lists keep their last values and
//! no longer change.

use std::fmt;
use std::future::Future;

use tracing::debug;

use crate::error::ToastError;
use crate::facade::Toaster;
use crate::id::ToastId;
use crate::promise::{PromiseData, PromiseHandle};
use crate::registry::ToastSubscription;
use crate::toast::{Content, RenderNode, Toast, ToastEvent, ToastOptions};
use crate::toast_list::ToastList;

/// Reactive toast state for one UI component.
pub struct ToastBridge {
    toaster: Toaster,
    toasts: ToastList,
    history: ToastList,
    subscription: Option<ToastSubscription>,
}

impl fmt::Debug for ToastBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastBridge")
            .field("toasts", &self.toasts.len())
            .field("history", &self.history.len())
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl ToastBridge {
    pub(crate) fn attach(toaster: Toaster) -> Self {
        let toasts = ToastList::new();
        let history = ToastList::new();

        let registry = toaster.registry().downgrade();
        let active = toasts.clone();
        let all = history.clone();
        let subscription = toaster.registry().subscribe(move |event| {
            match event {
                ToastEvent::Dismiss(sentinel) => active.remove(&sentinel.id),
                ToastEvent::Show(toast) => active.upsert(toast),
            };
            if let Some(registry) = registry.upgrade() {
                all.reset(registry.history());
            }
        });
        debug!("toast bridge mounted");

        Self {
            toaster,
            toasts,
            history,
            subscription: Some(subscription),
        }
    }

    /// Stop following the registry. Calling this again does nothing.
    pub fn unmount(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            debug!("toast bridge unmounted");
        }
    }

    /// Whether the registry subscription is still held.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Toasts on screen, in display order.
    #[must_use]
    pub fn toasts(&self) -> &ToastList {
        &self.toasts
    }

    /// Registry history, refreshed on every event.
    #[must_use]
    pub fn history(&self) -> &ToastList {
        &self.history
    }

    /// Copy of [`toasts`](Self::toasts).
    #[must_use]
    pub fn get_toasts(&self) -> Vec<Toast> {
        self.toasts.snapshot()
    }

    /// Copy of [`history`](Self::history).
    #[must_use]
    pub fn get_history(&self) -> Vec<Toast> {
        self.history.snapshot()
    }

    /// The toaster behind this bridge.
    #[must_use]
    pub fn toast_fn(&self) -> &Toaster {
        &self.toaster
    }

    // ========================================================================
    // Delegates
    // ========================================================================

    /// Bare call through the toaster: always appends.
    pub fn toast(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.toaster.toast(message, options)
    }

    /// Create or update a success toast.
    pub fn success(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.toaster.success(message, options)
    }

    /// Create or update an error toast.
    pub fn error(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.toaster.error(message, options)
    }

    /// Create or update an info toast.
    pub fn info(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.toaster.info(message, options)
    }

    /// Create or update a warning toast.
    pub fn warning(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.toaster.warning(message, options)
    }

    /// Create or update a loading toast.
    pub fn loading(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.toaster.loading(message, options)
    }

    /// Create a toast rendered by `render`.
    pub fn custom(
        &self,
        render: impl FnOnce(&ToastId) -> RenderNode,
        options: ToastOptions,
    ) -> ToastId {
        self.toaster.custom(render, options)
    }

    /// Bind a toast to `op`; see [`Toaster::promise`].
    pub fn promise<T, E, Fut>(
        &self,
        op: Fut,
        data: Option<PromiseData<T, E>>,
    ) -> Result<Option<PromiseHandle<T, E>>, ToastError>
    where
        T: Clone + 'static,
        E: Clone + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
    {
        self.toaster.promise(op, data)
    }

    /// Dismiss `id` on the next frame.
    pub fn dismiss(&self, id: impl Into<ToastId>) -> ToastId {
        self.toaster.dismiss(id)
    }

    /// Publish a dismissal for every stored toast now.
    pub fn dismiss_all(&self) -> usize {
        self.toaster.dismiss_all()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast_list::ListChange;
    use futures::executor::LocalPool;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn toaster() -> (LocalPool, Toaster) {
        let pool = LocalPool::new();
        let toaster = Toaster::new(pool.spawner());
        (pool, toaster)
    }

    #[test]
    fn starts_empty_and_follows_events() {
        let (_pool, toaster) = toaster();
        toaster.info("before", ToastOptions::new());

        let bridge = toaster.use_toast();
        assert!(bridge.get_toasts().is_empty());
        assert!(bridge.get_history().is_empty());

        bridge.success("after", ToastOptions::new());
        assert_eq!(bridge.get_toasts().len(), 1);
        assert_eq!(bridge.get_history().len(), 2);
    }

    #[test]
    fn update_replaces_in_place() {
        let (_pool, toaster) = toaster();
        let bridge = toaster.use_toast();
        let id = bridge.loading("working", ToastOptions::new());
        bridge.info("other", ToastOptions::new());
        toaster.success("done", ToastOptions::new().id(id.clone()));

        let toasts = bridge.get_toasts();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].id, id);
        assert_eq!(toasts[0].title_text(), Some("done"));
    }

    #[test]
    fn dismissal_removes_on_flush() {
        let (_pool, toaster) = toaster();
        let bridge = toaster.use_toast();
        let id = bridge.success("x", ToastOptions::new());
        bridge.dismiss(id);
        assert_eq!(bridge.get_toasts().len(), 1);
        toaster.flush_frame();
        assert!(bridge.get_toasts().is_empty());
        assert_eq!(bridge.get_history().len(), 1);
    }

    #[test]
    fn dismiss_all_clears_immediately() {
        let (_pool, toaster) = toaster();
        let bridge = toaster.use_toast();
        bridge.success("a", ToastOptions::new());
        bridge.error("b", ToastOptions::new());
        assert_eq!(bridge.dismiss_all(), 2);
        assert!(bridge.get_toasts().is_empty());
        // The registry's own projection is untouched by the sentinels.
        assert_eq!(toaster.get_toasts().len(), 2);
        assert_eq!(bridge.get_history().len(), 2);
    }

    #[test]
    fn list_changes_name_the_toast() {
        let (_pool, toaster) = toaster();
        let bridge = toaster.use_toast();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let _watch = bridge
            .toasts()
            .watch(move |change| log_clone.borrow_mut().push(change.clone()));

        let id = bridge.loading("working", ToastOptions::new());
        bridge.success("done", ToastOptions::new().id(id.clone()));
        bridge.dismiss(id.clone());
        toaster.flush_frame();

        assert_eq!(
            log.borrow().as_slice(),
            [
                ListChange::Inserted(id.clone()),
                ListChange::Updated(id.clone()),
                ListChange::Removed(id),
            ]
        );
    }

    #[test]
    fn unmounted_bridge_stops_changing() {
        let (_pool, toaster) = toaster();
        let mut bridge = toaster.use_toast();
        bridge.info("seen", ToastOptions::new());
        let version = bridge.toasts().version();

        bridge.unmount();
        bridge.unmount();
        assert!(!bridge.is_mounted());
        assert_eq!(toaster.registry().subscriber_count(), 0);

        toaster.info("unseen", ToastOptions::new());
        assert_eq!(bridge.get_toasts().len(), 1);
        assert_eq!(bridge.toasts().version(), version);
    }

    #[test]
    fn drop_releases_subscription() {
        let (_pool, toaster) = toaster();
        let bridge = toaster.use_toast();
        assert_eq!(toaster.registry().subscriber_count(), 1);
        drop(bridge);
        assert_eq!(toaster.registry().subscriber_count(), 0);
    }

    #[test]
    fn watchers_see_list_changes() {
        let (_pool, toaster) = toaster();
        let bridge = toaster.use_toast();
        let redraws = Rc::new(Cell::new(0));
        let redraws_clone = Rc::clone(&redraws);
        let _watch = bridge.toasts().watch(move |_| redraws_clone.set(redraws_clone.get() + 1));

        bridge.warning("w", ToastOptions::new());
        toaster.flush_frame();
        assert_eq!(redraws.get(), 1);
        assert!(bridge.toast_fn().get_toasts().len() == 1);
        assert!(format!("{bridge:?}").contains("mounted"));
    }
}
