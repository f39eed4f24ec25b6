#![forbid(unsafe_code)]

//! Toast notification state engine for FrankenTUI.
//!
//! Holds the toasts an application has raised, publishes every change to
//! subscribers, binds toasts to asynchronous operations, and exposes
//! per-component reactive views. Drawing, timers and gestures belong to the
//! rendering layer; this crate only decides what is on screen.
//!
//! # Example
//!
//! ```
//! use futures::executor::LocalPool;
//! use ftui_toast::{PromiseData, ToastOptions, Toaster};
//!
//! let mut pool = LocalPool::new();
//! let toaster = Toaster::new(pool.spawner());
//! let bridge = toaster.use_toast();
//!
//! toaster.success("Saved", ToastOptions::new());
//! let handle = toaster
//!     .promise(
//!         async { Ok::<_, String>(3) },
//!         Some(PromiseData::new().loading("Syncing").success_with(|n: u32| format!("{n} files synced"))),
//!     )
//!     .expect("spawn")
//!     .expect("handle");
//!
//! pool.run_until_stalled();
//! assert_eq!(handle.peek(), Some(Ok(3)));
//! assert_eq!(bridge.get_toasts().len(), 2);
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod facade;
pub mod id;
pub mod promise;
pub mod registry;
pub mod toast;
pub mod toast_list;

pub use bridge::ToastBridge;
pub use config::{Offset, SwipeDirection, TextDirection, Theme, ToasterConfig};
pub use error::{BuildError, ToastError};
pub use facade::Toaster;
pub use id::{IdAllocator, ToastId};
pub use promise::{
    Failure, Outcome, PromiseData, PromiseHandle, PromiseMessage, Resolve, Settlement,
};
pub use registry::{ToastRegistry, ToastSubscription, WeakRegistry};
pub use toast::{
    Action, Content, Position, RenderNode, Toast, ToastCallback, ToastEvent, ToastOptions,
    ToastPatch, ToastToDismiss, ToastType,
};
pub use toast_list::{ListChange, ListWatch, ToastList};
