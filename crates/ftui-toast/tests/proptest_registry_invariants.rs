//! Property-based invariant tests for the toast registry.
//!
//! 1. Allocated ids start at 1 and strictly increase across creation paths.
//! 2. Repeated `create` on one id keeps a single record; unspecified fields
//!    survive.
//! 3. Every dismissed id belongs to a stored record.
//! 4. The active projection is exactly the records whose id is not dismissed.
//! 5. With a history limit, no active record is ever evicted, and the
//!    history only overshoots the limit while every record is active.
//! 6. `dismiss_all` publishes one sentinel per distinct stored id and leaves
//!    the dismissed set untouched.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use futures::executor::LocalPool;
use ftui_toast::{
    RenderNode, ToastEvent, ToastId, ToastOptions, ToastPatch, ToastRegistry, ToastType, Toaster,
};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Bare,
    Typed(ToastType),
    Custom,
    CreateNamed(u8),
    DismissNamed(u8),
    DismissAllocated(u8),
    DismissAll,
    Flush,
}

fn arb_kind() -> impl Strategy<Value = ToastType> {
    prop::sample::select(ToastType::ALL.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Bare),
        arb_kind().prop_map(Op::Typed),
        Just(Op::Custom),
        (0u8..6).prop_map(Op::CreateNamed),
        (0u8..6).prop_map(Op::DismissNamed),
        (1u8..20).prop_map(Op::DismissAllocated),
        Just(Op::DismissAll),
        Just(Op::Flush),
    ]
}

fn named(n: u8) -> ToastId {
    ToastId::from(format!("t{n}"))
}

fn apply(toaster: &Toaster, op: &Op) {
    match op {
        Op::Bare => {
            toaster.toast("bare", ToastOptions::new());
        }
        Op::Typed(kind) => {
            toaster.registry().create(ToastPatch::new().message("typed").kind(*kind));
        }
        Op::Custom => {
            toaster.custom(|_| RenderNode::new(()), ToastOptions::new());
        }
        Op::CreateNamed(n) => {
            toaster.info("named", ToastOptions::new().id(named(*n)));
        }
        Op::DismissNamed(n) => {
            toaster.dismiss(named(*n));
        }
        Op::DismissAllocated(n) => {
            toaster.dismiss(u64::from(*n));
        }
        Op::DismissAll => {
            toaster.dismiss_all();
        }
        Op::Flush => {
            toaster.flush_frame();
        }
    }
}

fn check_projection(registry: &ToastRegistry) -> Result<(), TestCaseError> {
    let history = registry.history();
    let expected: Vec<ToastId> = history
        .iter()
        .filter(|t| !registry.is_dismissed(&t.id))
        .map(|t| t.id.clone())
        .collect();
    let active: Vec<ToastId> = registry.active_toasts().into_iter().map(|t| t.id).collect();
    prop_assert_eq!(active, expected);
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Id monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn allocated_ids_strictly_increase(paths in prop::collection::vec(0u8..3, 1..40)) {
        let pool = LocalPool::new();
        let toaster = Toaster::new(pool.spawner());
        let mut last = 0u64;
        for path in paths {
            let id = match path {
                0 => toaster.toast("bare", ToastOptions::new()),
                1 => toaster.success("typed", ToastOptions::new()),
                _ => toaster.custom(|_| RenderNode::new(()), ToastOptions::new()),
            };
            let n = id.as_num().expect("allocated ids are numeric");
            prop_assert!(n > last, "id {} not greater than {}", n, last);
            prop_assert_eq!(n, last + 1);
            last = n;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Merge keeps one record and unspecified fields
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_create_merges(
        titles in prop::collection::vec("[a-z]{1,8}", 1..10),
        class in "[a-z]{1,8}",
    ) {
        let registry = ToastRegistry::new();
        registry.create(
            ToastPatch::new()
                .id("x")
                .message("first")
                .options(ToastOptions::new().id("x").class_name(class.clone())),
        );
        for title in &titles {
            registry.create(ToastPatch::new().id("x").message(title.as_str()));
        }
        let history = registry.history();
        prop_assert_eq!(history.len(), 1);
        prop_assert_eq!(history[0].class_name.as_deref(), Some(class.as_str()));
        prop_assert_eq!(history[0].title_text(), titles.last().map(String::as_str));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-4. Dismissed set and active projection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dismissed_ids_are_stored(ops in prop::collection::vec(arb_op(), 0..60)) {
        let pool = LocalPool::new();
        let toaster = Toaster::new(pool.spawner());
        for op in &ops {
            apply(&toaster, op);
            let registry = toaster.registry();
            let stored: HashSet<ToastId> = registry.history().into_iter().map(|t| t.id).collect();
            for n in 0u8..6 {
                let id = named(n);
                if registry.is_dismissed(&id) {
                    prop_assert!(stored.contains(&id), "dismissed {} is not stored", id);
                }
            }
            for n in 1u64..20 {
                let id = ToastId::Num(n);
                if registry.is_dismissed(&id) {
                    prop_assert!(stored.contains(&id), "dismissed {} is not stored", id);
                }
            }
            check_projection(registry)?;
        }
    }

    #[test]
    fn recreate_undismisses(n in 0u8..6, dismiss_first in any::<bool>()) {
        let registry = ToastRegistry::new();
        registry.info("a", ToastOptions::new().id(named(n)));
        if dismiss_first {
            registry.dismiss(named(n));
        }
        registry.create(ToastPatch::new().id(named(n)).message("b"));
        prop_assert!(!registry.is_dismissed(&named(n)));
        prop_assert_eq!(registry.active_toasts().len(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Retention never evicts active records
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn limit_keeps_active_records(
        limit in 0usize..8,
        ops in prop::collection::vec(arb_op(), 0..60),
    ) {
        let registry = ToastRegistry::with_history_limit(Some(limit));
        for op in &ops {
            let before: Vec<ToastId> = registry.active_toasts().into_iter().map(|t| t.id).collect();
            // A record dismissed by this very op becomes evictable.
            let dismissed_now = match op {
                Op::DismissNamed(n) => Some(named(*n)),
                Op::DismissAllocated(n) => Some(ToastId::Num(u64::from(*n))),
                _ => None,
            };
            match op {
                Op::Typed(kind) => {
                    registry.create(ToastPatch::new().message("m").kind(*kind));
                }
                Op::CreateNamed(n) => {
                    registry.info("named", ToastOptions::new().id(named(*n)));
                }
                Op::DismissNamed(n) => {
                    registry.dismiss(named(*n));
                }
                Op::DismissAllocated(n) => {
                    registry.dismiss(u64::from(*n));
                }
                Op::DismissAll => {
                    registry.dismiss_all();
                }
                Op::Bare | Op::Custom | Op::Flush => {
                    registry.flush_frame();
                }
            }
            for id in before.iter().filter(|id| dismissed_now.as_ref() != Some(*id)) {
                prop_assert!(registry.get(id).is_some(), "active {} evicted", id);
            }
            let active = registry.active_toasts().len();
            prop_assert!(
                registry.len() <= limit.max(active),
                "history {} over limit {} with {} active", registry.len(), limit, active
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. dismiss_all sentinels
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn dismiss_all_one_sentinel_per_distinct_id(names in prop::collection::vec(0u8..5, 0..20)) {
        let pool = LocalPool::new();
        let toaster = Toaster::new(pool.spawner());
        for n in &names {
            // Bare calls append duplicates; typed calls merge.
            toaster.toast("dup", ToastOptions::new().id(named(*n)));
        }
        let distinct: HashSet<ToastId> = names.iter().map(|n| named(*n)).collect();

        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = Rc::clone(&log);
        let _sub = toaster.subscribe(move |event| {
            if let ToastEvent::Dismiss(sentinel) = event {
                log_clone.borrow_mut().push(sentinel.id.clone());
            }
        });

        prop_assert_eq!(toaster.dismiss_all(), distinct.len());
        let published: HashSet<ToastId> = log.borrow().iter().cloned().collect();
        prop_assert_eq!(log.borrow().len(), distinct.len());
        prop_assert_eq!(published, distinct.clone());
        // Sentinels only: the dismissed set and the active projection are
        // unchanged.
        prop_assert_eq!(toaster.get_toasts().len(), names.len());
        for id in &distinct {
            prop_assert!(!toaster.registry().is_dismissed(id));
        }
    }
}
