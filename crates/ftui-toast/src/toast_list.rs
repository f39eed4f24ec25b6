#![forbid(unsafe_code)]

//! Ordered toast list shared between a bridge and its renderer.
//!
//! A [`ToastList`] holds at most the records a bridge projects from the
//! registry, keyed by [`ToastId`]. Every mutation reports what it did to the
//! list as a [`ListChange`], and mutations that leave the list as it was are
//! silent:
//!
//! | Mutation        | Change reported           | Silent when                      |
//! |-----------------|---------------------------|----------------------------------|
//! | `upsert(t)`     | `Inserted` or `Updated`   | an equal record is already there |
//! | `remove(id)`    | `Removed`                 | no entry carries `id`            |
//! | `reset(list)`   | `Reset`                   | the new list equals the old one  |
//!
//! The version counts reported changes, so a renderer can skip a redraw by
//! comparing versions. Mutation is crate-private: only the bridge writes.
//!
//! Watchers run after the list borrow is released and may read the list.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::id::ToastId;
use crate::toast::Toast;

type Watcher = Rc<dyn Fn(&ListChange)>;

/// What a mutation did to a [`ToastList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange {
    /// A record with a new id was appended.
    Inserted(ToastId),
    /// The record with this id was replaced in place.
    Updated(ToastId),
    /// Every record with this id was removed.
    Removed(ToastId),
    /// The whole list was swapped for a different one.
    Reset,
}

impl ListChange {
    /// Id touched by the change; `None` for a reset.
    #[must_use]
    pub fn id(&self) -> Option<&ToastId> {
        match self {
            Self::Inserted(id) | Self::Updated(id) | Self::Removed(id) => Some(id),
            Self::Reset => None,
        }
    }
}

struct ListInner {
    toasts: Vec<Toast>,
    version: u64,
    next_key: u64,
    watchers: BTreeMap<u64, Watcher>,
}

/// Shared, id-keyed list of toasts with change notification.
///
/// Clones are handles to the same list.
#[derive(Clone)]
pub struct ToastList {
    inner: Rc<RefCell<ListInner>>,
}

impl Default for ToastList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToastList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ToastList")
            .field("len", &inner.toasts.len())
            .field("version", &inner.version)
            .field("watchers", &inner.watchers.len())
            .finish()
    }
}

impl ToastList {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                toasts: Vec::new(),
                version: 0,
                next_key: 0,
                watchers: BTreeMap::new(),
            })),
        }
    }

    /// Copy of the records in display order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Toast> {
        self.inner.borrow().toasts.clone()
    }

    /// Ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<ToastId> {
        self.inner.borrow().toasts.iter().map(|t| t.id.clone()).collect()
    }

    /// Record stored under `id`, if any.
    #[must_use]
    pub fn get(&self, id: &ToastId) -> Option<Toast> {
        self.inner.borrow().toasts.iter().find(|t| &t.id == id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &ToastId) -> bool {
        self.inner.borrow().toasts.iter().any(|t| &t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().toasts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of changes reported so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Call `watcher` after every reported change until the guard drops.
    pub fn watch(&self, watcher: impl Fn(&ListChange) + 'static) -> ListWatch {
        let mut inner = self.inner.borrow_mut();
        let key = inner.next_key;
        inner.next_key += 1;
        inner.watchers.insert(key, Rc::new(watcher));
        ListWatch {
            list: Rc::downgrade(&self.inner),
            key,
        }
    }

    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.inner.borrow().watchers.len()
    }

    // ========================================================================
    // Bridge-side mutation
    // ========================================================================

    /// Replace the entry with `toast.id` in place, or append it.
    pub(crate) fn upsert(&self, toast: &Toast) -> Option<ListChange> {
        let change = {
            let mut inner = self.inner.borrow_mut();
            let change = match inner.toasts.iter().position(|t| t.id == toast.id) {
                Some(index) if inner.toasts[index] == *toast => return None,
                Some(index) => {
                    inner.toasts[index] = toast.clone();
                    ListChange::Updated(toast.id.clone())
                }
                None => {
                    inner.toasts.push(toast.clone());
                    ListChange::Inserted(toast.id.clone())
                }
            };
            inner.version += 1;
            change
        };
        self.notify(&change);
        Some(change)
    }

    /// Drop every entry carrying `id`.
    pub(crate) fn remove(&self, id: &ToastId) -> Option<ListChange> {
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.toasts.len();
            inner.toasts.retain(|t| &t.id != id);
            if inner.toasts.len() == before {
                return None;
            }
            inner.version += 1;
        }
        let change = ListChange::Removed(id.clone());
        self.notify(&change);
        Some(change)
    }

    /// Swap in `toasts` wholesale.
    pub(crate) fn reset(&self, toasts: Vec<Toast>) -> Option<ListChange> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.toasts == toasts {
                return None;
            }
            inner.toasts = toasts;
            inner.version += 1;
        }
        self.notify(&ListChange::Reset);
        Some(ListChange::Reset)
    }

    fn notify(&self, change: &ListChange) {
        let watchers: Vec<Watcher> = self.inner.borrow().watchers.values().cloned().collect();
        for watcher in watchers {
            watcher(change);
        }
    }
}

/// Guard returned by [`ToastList::watch`]; dropping it stops the watcher.
pub struct ListWatch {
    list: Weak<RefCell<ListInner>>,
    key: u64,
}

impl Drop for ListWatch {
    fn drop(&mut self) {
        if let Some(inner) = self.list.upgrade() {
            inner.borrow_mut().watchers.remove(&self.key);
        }
    }
}

impl fmt::Debug for ListWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListWatch").field("key", &self.key).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toast::ToastType;

    fn toast(id: u64, title: &str) -> Toast {
        let mut toast = Toast::new(id);
        toast.title = Some(title.into());
        toast
    }

    fn recorder(list: &ToastList) -> (Rc<RefCell<Vec<ListChange>>>, ListWatch) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let watch = list.watch(move |change| log_clone.borrow_mut().push(change.clone()));
        (log, watch)
    }

    #[test]
    fn upsert_inserts_then_updates_in_place() {
        let list = ToastList::new();
        let (log, _watch) = recorder(&list);

        list.upsert(&toast(1, "a"));
        list.upsert(&toast(2, "b"));
        list.upsert(&toast(1, "a2"));

        assert_eq!(list.ids(), [ToastId::Num(1), ToastId::Num(2)]);
        assert_eq!(
            list.get(&ToastId::Num(1)).and_then(|t| t.title_text().map(str::to_owned)),
            Some("a2".to_owned())
        );
        assert_eq!(
            log.borrow().as_slice(),
            [
                ListChange::Inserted(ToastId::Num(1)),
                ListChange::Inserted(ToastId::Num(2)),
                ListChange::Updated(ToastId::Num(1)),
            ]
        );
        assert_eq!(list.version(), 3);
    }

    #[test]
    fn equal_upsert_is_silent() {
        let list = ToastList::new();
        list.upsert(&toast(1, "a"));
        let (log, _watch) = recorder(&list);

        assert_eq!(list.upsert(&toast(1, "a")), None);
        assert!(log.borrow().is_empty());
        assert_eq!(list.version(), 1);

        let mut retyped = toast(1, "a");
        retyped.kind = ToastType::Error;
        assert_eq!(list.upsert(&retyped), Some(ListChange::Updated(ToastId::Num(1))));
    }

    #[test]
    fn remove_unknown_id_is_silent() {
        let list = ToastList::new();
        list.upsert(&toast(1, "a"));
        assert_eq!(list.remove(&ToastId::Num(9)), None);
        assert_eq!(list.remove(&ToastId::Num(1)), Some(ListChange::Removed(ToastId::Num(1))));
        assert!(list.is_empty());
        assert_eq!(list.version(), 2);
    }

    #[test]
    fn reset_reports_only_real_changes() {
        let list = ToastList::new();
        assert_eq!(list.reset(Vec::new()), None);
        assert_eq!(list.reset(vec![toast(1, "a"), toast(1, "a")]), Some(ListChange::Reset));
        assert_eq!(list.reset(vec![toast(1, "a"), toast(1, "a")]), None);
        assert_eq!(list.len(), 2);
        assert_eq!(ListChange::Reset.id(), None);
    }

    #[test]
    fn watcher_may_read_the_list() {
        let list = ToastList::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let reader = list.clone();
        let _watch = list.watch(move |_| seen_clone.borrow_mut().push(reader.len()));

        list.upsert(&toast(1, "a"));
        list.upsert(&toast(2, "b"));
        list.remove(&ToastId::Num(1));
        assert_eq!(*seen.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn dropped_watch_stops_notifications() {
        let list = ToastList::new();
        let (log, watch) = recorder(&list);
        list.upsert(&toast(1, "a"));
        drop(watch);
        list.upsert(&toast(2, "b"));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(list.watcher_count(), 0);
        assert!(format!("{list:?}").contains("version"));
    }
}
