#![forbid(unsafe_code)]

//! The callable toaster: the one handle applications pass around.
//!
//! A [`Toaster`] bundles a [`ToastRegistry`], the [`ToasterConfig`] it was
//! built from, and the local spawner promise settlements run on. Clones
//! share all three, so each UI context builds one toaster and hands clones
//! to whoever needs to raise toasts.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::task::LocalSpawn;
use tracing::debug;

use crate::bridge::ToastBridge;
use crate::config::ToasterConfig;
use crate::error::ToastError;
use crate::id::ToastId;
use crate::promise::{self, Outcome, PromiseData, PromiseHandle};
use crate::registry::{ToastRegistry, ToastSubscription};
use crate::toast::{Content, RenderNode, Toast, ToastEvent, ToastOptions};

/// Application-facing toast API.
#[derive(Clone)]
pub struct Toaster {
    registry: ToastRegistry,
    spawner: Rc<dyn LocalSpawn>,
    config: Rc<ToasterConfig>,
}

impl fmt::Debug for Toaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toaster")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Toaster {
    /// Toaster with default configuration.
    pub fn new(spawner: impl LocalSpawn + 'static) -> Self {
        Self::with_config(ToasterConfig::default(), spawner)
    }

    /// Toaster whose registry honors `config`.
    pub fn with_config(config: ToasterConfig, spawner: impl LocalSpawn + 'static) -> Self {
        debug!(history_limit = ?config.history_limit, "toaster created");
        Self {
            registry: ToastRegistry::with_config(&config),
            spawner: Rc::new(spawner),
            config: Rc::new(config),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ToastRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ToasterConfig {
        &self.config
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Show a plain toast.
    ///
    /// Unlike the typed creators this always appends a new record: an id
    /// that is already on screen is not merged into, and a dismissed id is
    /// not brought back. A supplied id of `0` or `""` is replaced with a
    /// fresh one.
    pub fn toast(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        let id = self
            .registry
            .ids()
            .resolve(options.id.as_ref(), ToastId::is_truthy);
        let mut toast = Toast::new(id.clone());
        toast.title = Some(message.into());
        options.apply(&mut toast);
        self.registry.add_toast(toast);
        id
    }

    /// Create or update a toast without setting its type.
    pub fn message(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.registry.message(message, options)
    }

    /// Create or update a success toast.
    pub fn success(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.registry.success(message, options)
    }

    /// Create or update an error toast.
    pub fn error(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.registry.error(message, options)
    }

    /// Create or update an info toast.
    pub fn info(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.registry.info(message, options)
    }

    /// Create or update a warning toast.
    pub fn warning(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.registry.warning(message, options)
    }

    /// Create or update a loading toast.
    pub fn loading(&self, message: impl Into<Content>, options: ToastOptions) -> ToastId {
        self.registry.loading(message, options)
    }

    /// Show renderer-specific content built from the toast's id.
    pub fn custom(
        &self,
        render: impl FnOnce(&ToastId) -> RenderNode,
        options: ToastOptions,
    ) -> ToastId {
        self.registry.custom(render, options)
    }

    // ========================================================================
    // Promises
    // ========================================================================

    /// Bind a toast to `op`; every `Ok` counts as success.
    ///
    /// Returns `Ok(None)` without touching the registry when `data` is
    /// `None`. Fails only if the settlement task cannot be spawned, in which
    /// case the loading toast is dismissed before returning.
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
        self.promise_fn(move || op, data)
    }

    /// Like [`promise`](Self::promise), but starts the operation itself.
    ///
    /// `start` runs after the loading toast has been created.
    pub fn promise_fn<T, E, F, Fut>(
        &self,
        start: F,
        data: Option<PromiseData<T, E>>,
    ) -> Result<Option<PromiseHandle<T, E>>, ToastError>
    where
        T: Clone + 'static,
        E: Clone + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + 'static,
    {
        promise::bind(&self.registry, &*self.spawner, start, data, Outcome::Success)
    }

    /// Bind a toast to an operation that reports a tagged [`Outcome`].
    ///
    /// The handle resolves to the outcome itself, so a caller can tell an
    /// HTTP failure from a success even though neither rejected.
    pub fn promise_outcome<T, E, Fut>(
        &self,
        op: Fut,
        data: Option<PromiseData<T, E>>,
    ) -> Result<Option<PromiseHandle<Outcome<T, E>, E>>, ToastError>
    where
        T: Clone + 'static,
        E: Clone + 'static,
        Fut: Future<Output = Result<Outcome<T, E>, E>> + 'static,
    {
        promise::bind(&self.registry, &*self.spawner, move || op, data, |outcome| outcome)
    }

    // ========================================================================
    // Dismissal and queries
    // ========================================================================

    /// Dismiss one toast on the next frame. Returns the id.
    pub fn dismiss(&self, id: impl Into<ToastId>) -> ToastId {
        self.registry.dismiss(id)
    }

    /// Tell subscribers to drop every stored toast now.
    ///
    /// The registry's dismissed set is unchanged; see
    /// [`ToastRegistry::dismiss_all`].
    pub fn dismiss_all(&self) -> usize {
        self.registry.dismiss_all()
    }

    /// Publish dismissals queued since the last frame.
    pub fn flush_frame(&self) -> usize {
        self.registry.flush_frame()
    }

    /// Every toast ever shown, dismissed ones included.
    #[must_use]
    pub fn get_history(&self) -> Vec<Toast> {
        self.registry.history()
    }

    /// Toasts currently on screen.
    #[must_use]
    pub fn get_toasts(&self) -> Vec<Toast> {
        self.registry.active_toasts()
    }

    /// Register `callback` for every registry event.
    pub fn subscribe(&self, callback: impl Fn(&ToastEvent) + 'static) -> ToastSubscription {
        self.registry.subscribe(callback)
    }

    /// Attach a reactive bridge for one UI component.
    #[must_use]
    pub fn use_toast(&self) -> ToastBridge {
        ToastBridge::attach(self.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
