#![forbid(unsafe_code)]

//! Toast identities and the allocator that hands them out.
//!
//! A [`ToastId`] is either a number or a string. Callers may pick their own
//! ids (to update a toast in place later); when they don't, the registry's
//! [`IdAllocator`] issues the next value of a monotonically increasing
//! counter that starts at 1.
//!
//! # Invariants
//!
//! 1. The counter never goes backwards and is never reset.
//! 2. Two ids issued by the same allocator never compare equal.
//! 3. The counter is shared by every creation path of one registry.

use std::cell::Cell;
use std::fmt;

/// Identity of a toast: a number or a caller-chosen string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ToastId {
    /// Numeric id. Allocator-issued ids are always numeric.
    Num(u64),
    /// Caller-chosen string id.
    Str(String),
}

impl ToastId {
    /// Whether `create` accepts this id as supplied by the caller.
    ///
    /// Any number qualifies; strings must be non-empty.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        match self {
            Self::Num(_) => true,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Whether the id counts as "present" on the bare-call and `custom`
    /// paths, which also reject the number zero.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Num(n) => *n != 0,
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric value, if this is a numeric id.
    #[must_use]
    pub fn as_num(&self) -> Option<u64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ToastId {
    fn from(n: u64) -> Self {
        Self::Num(n)
    }
}

impl From<&str> for ToastId {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for ToastId {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&ToastId> for ToastId {
    fn from(id: &ToastId) -> Self {
        id.clone()
    }
}

/// Monotonic id source, one per registry.
#[derive(Debug)]
pub struct IdAllocator {
    next: Cell<u64>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// First id handed out by a fresh allocator.
    pub const FIRST: u64 = 1;

    /// Create an allocator whose first id is [`IdAllocator::FIRST`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: Cell::new(Self::FIRST),
        }
    }

    /// Issue the next id.
    pub fn allocate(&self) -> ToastId {
        let n = self.next.get();
        self.next.set(n.saturating_add(1));
        tracing::trace!(id = n, "allocated toast id");
        ToastId::Num(n)
    }

    /// Id the next call to [`allocate`](Self::allocate) will return.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.get()
    }

    /// Use `supplied` if `accept` says so, otherwise allocate.
    pub fn resolve(&self, supplied: Option<&ToastId>, accept: fn(&ToastId) -> bool) -> ToastId {
        match supplied {
            Some(id) if accept(id) => id.clone(),
            _ => self.allocate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_starts_at_one() {
        let ids = IdAllocator::new();
        assert_eq!(ids.allocate(), ToastId::Num(1));
        assert_eq!(ids.allocate(), ToastId::Num(2));
        assert_eq!(ids.peek(), 3);
    }

    #[test]
    fn supplied_ids_do_not_advance_counter() {
        let ids = IdAllocator::new();
        let id = ids.resolve(Some(&ToastId::from("upload")), ToastId::is_usable);
        assert_eq!(id, ToastId::from("upload"));
        assert_eq!(ids.peek(), 1);
    }

    #[test]
    fn empty_string_is_not_usable() {
        let ids = IdAllocator::new();
        let id = ids.resolve(Some(&ToastId::from("")), ToastId::is_usable);
        assert_eq!(id, ToastId::Num(1));
    }

    #[test]
    fn zero_is_usable_but_not_truthy() {
        let zero = ToastId::Num(0);
        assert!(zero.is_usable());
        assert!(!zero.is_truthy());

        let ids = IdAllocator::new();
        assert_eq!(ids.resolve(Some(&zero), ToastId::is_truthy), ToastId::Num(1));
        assert_eq!(ids.resolve(Some(&zero), ToastId::is_usable), zero);
    }

    #[test]
    fn display_matches_raw_value() {
        assert_eq!(ToastId::Num(7).to_string(), "7");
        assert_eq!(ToastId::from("save").to_string(), "save");
    }
}
