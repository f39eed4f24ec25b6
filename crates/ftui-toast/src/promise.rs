#![forbid(unsafe_code)]

//! Promise binding: a toast that follows an asynchronous operation.
//!
//! # Lifecycle
//!
//! ```text
//! promise(op, data)
//!   │
//!   ├─ data.loading set? ──► create(type = loading)      (synchronous)
//!   │
//!   └─ spawn settlement ──► op resolves
//!                            │
//!        Ok(Rendered(node)) ─┼─► update(type = default, message = node)
//!        Ok(HttpFailure)     ─┼─► update(type = error,   data.error(Http{..}))
//!        Ok(Failure(e))      ─┼─► update(type = error,   data.error(Error(e)))
//!        Ok(Success(v))      ─┼─► update(type = success, data.success(v))   if set
//!        Err(e)              ─┼─► update(type = error,   data.error(Error(e)))  if set
//!                            │
//!                            ├─ nothing applied and a loading toast exists
//!                            │     ──► dismiss(loading id)
//!                            └─ data.finally()
//! ```
//!
//! The operation reports its outcome as an explicit [`Outcome`]; nothing is
//! inferred from the shape of the resolved value. [`Toaster::promise`] wraps a
//! plain `Result<T, E>` future (every `Ok` is a success),
//! [`Toaster::promise_outcome`] takes the tagged outcome directly.
//!
//! # Builder failures
//!
//! [`Resolve::future`] builders may fail. A failing builder does not escape
//! the settlement task: the phase falls back to an error toast carrying the
//! failure's display text and a warning is logged.
//!
//! [`Toaster::promise`]: crate::Toaster::promise
//! [`Toaster::promise_outcome`]: crate::Toaster::promise_outcome

use std::fmt;
use std::future::Future;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use futures::task::{LocalSpawn, LocalSpawnExt};
use tracing::{Instrument, debug, debug_span, trace, warn};

use crate::error::{BuildError, ToastError};
use crate::id::ToastId;
use crate::registry::ToastRegistry;
use crate::toast::{Content, RenderNode, ToastOptions, ToastPatch, ToastType};

/// What an operation reports when it completes normally.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    /// The operation produced UI content to show as-is.
    Rendered(RenderNode),
    /// An HTTP exchange completed with a non-success status.
    HttpFailure { status: u16 },
    /// The operation completed but reports an error value.
    Failure(E),
    Success(T),
}

/// Input handed to error builders.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure<E> {
    Http { status: u16, message: String },
    Error(E),
}

impl<E: fmt::Display> Failure<E> {
    /// Human-readable failure text.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Http { message, .. } => message.clone(),
            Self::Error(err) => err.to_string(),
        }
    }
}

/// Input handed to description builders.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement<T, E> {
    Success(T),
    Failure(Failure<E>),
}

/// A resolved phase message: plain content, or a full override bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseMessage {
    Message(Content),
    /// Merged over `{id, type, description}` of the settled toast.
    Extended(ToastPatch),
}

impl From<&str> for PromiseMessage {
    fn from(s: &str) -> Self {
        Self::Message(s.into())
    }
}

impl From<String> for PromiseMessage {
    fn from(s: String) -> Self {
        Self::Message(s.into())
    }
}

impl From<Content> for PromiseMessage {
    fn from(content: Content) -> Self {
        Self::Message(content)
    }
}

impl From<RenderNode> for PromiseMessage {
    fn from(node: RenderNode) -> Self {
        Self::Message(node.into())
    }
}

impl From<ToastPatch> for PromiseMessage {
    fn from(patch: ToastPatch) -> Self {
        Self::Extended(patch)
    }
}

type AsyncBuilder<A, O> = Box<dyn FnOnce(A) -> LocalBoxFuture<'static, Result<O, BuildError>>>;

/// How a phase value is produced: fixed, computed, or awaited.
pub enum Resolve<A, O = PromiseMessage> {
    Value(O),
    Map(Box<dyn FnOnce(A) -> O>),
    Async(AsyncBuilder<A, O>),
}

impl<A: 'static, O: 'static> Resolve<A, O> {
    pub fn value(value: impl Into<O>) -> Self {
        Self::Value(value.into())
    }

    /// Compute the value from the phase input.
    pub fn map<R: Into<O>>(f: impl FnOnce(A) -> R + 'static) -> Self {
        Self::Map(Box::new(move |arg| f(arg).into()))
    }

    /// Await the value; an `Err` turns into a fallback error toast.
    pub fn future<F, Fut, R>(f: F) -> Self
    where
        F: FnOnce(A) -> Fut + 'static,
        Fut: Future<Output = Result<R, BuildError>> + 'static,
        R: Into<O>,
    {
        Self::Async(Box::new(move |arg| {
            f(arg).map(|res| res.map(Into::into)).boxed_local()
        }))
    }

    /// The fixed value, if this is one.
    #[must_use]
    pub fn as_value(&self) -> Option<&O> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    async fn resolve(self, arg: A) -> Result<O, BuildError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Map(f) => Ok(f(arg)),
            Self::Async(f) => f(arg).await,
        }
    }
}

impl<A, O> From<&str> for Resolve<A, O>
where
    O: for<'a> From<&'a str>,
{
    fn from(s: &str) -> Self {
        Self::Value(O::from(s))
    }
}

impl<A, O: From<String>> From<String> for Resolve<A, O> {
    fn from(s: String) -> Self {
        Self::Value(O::from(s))
    }
}

impl<A> From<ToastPatch> for Resolve<A> {
    fn from(patch: ToastPatch) -> Self {
        Self::Value(PromiseMessage::Extended(patch))
    }
}

impl<A, O: fmt::Debug> fmt::Debug for Resolve<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Map(_) => f.debug_tuple("Map").finish_non_exhaustive(),
            Self::Async(_) => f.debug_tuple("Async").finish_non_exhaustive(),
        }
    }
}

/// Per-phase messages for a promise-bound toast.
pub struct PromiseData<T, E> {
    /// Shown immediately as a `loading` toast when set.
    pub loading: Option<Content>,
    pub success: Option<Resolve<T>>,
    pub error: Option<Resolve<Failure<E>>>,
    /// A fixed description is also shown on the loading toast.
    pub description: Option<Resolve<Settlement<T, E>, Content>>,
    /// Runs once after settlement, whatever the outcome.
    pub finally: Option<Box<dyn FnOnce()>>,
    /// Applied to the loading toast.
    pub options: ToastOptions,
}

impl<T, E> Default for PromiseData<T, E> {
    fn default() -> Self {
        Self {
            loading: None,
            success: None,
            error: None,
            description: None,
            finally: None,
            options: ToastOptions::default(),
        }
    }
}

impl<T, E> fmt::Debug for PromiseData<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseData")
            .field("loading", &self.loading)
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .field("description", &self.description.is_some())
            .field("finally", &self.finally.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl<T: 'static, E: 'static> PromiseData<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn loading(mut self, message: impl Into<Content>) -> Self {
        self.loading = Some(message.into());
        self
    }

    #[must_use]
    pub fn success(mut self, message: impl Into<Resolve<T>>) -> Self {
        self.success = Some(message.into());
        self
    }

    /// Build the success message from the resolved value.
    #[must_use]
    pub fn success_with<R: Into<PromiseMessage>>(mut self, f: impl FnOnce(T) -> R + 'static) -> Self {
        self.success = Some(Resolve::map(f));
        self
    }

    #[must_use]
    pub fn error(mut self, message: impl Into<Resolve<Failure<E>>>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Build the error message from the failure.
    #[must_use]
    pub fn error_with<R: Into<PromiseMessage>>(
        mut self,
        f: impl FnOnce(Failure<E>) -> R + 'static,
    ) -> Self {
        self.error = Some(Resolve::map(f));
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<Resolve<Settlement<T, E>, Content>>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn description_with<R: Into<Content>>(
        mut self,
        f: impl FnOnce(Settlement<T, E>) -> R + 'static,
    ) -> Self {
        self.description = Some(Resolve::map(f));
        self
    }

    #[must_use]
    pub fn finally(mut self, f: impl FnOnce() + 'static) -> Self {
        self.finally = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }
}

/// Handle returned by a promise binding.
///
/// [`id`](Self::id) is the bound toast (absent when no loading toast was
/// created). [`unwrap`](Self::unwrap) yields the operation's own result once
/// settlement has run, whatever the toast showed.
pub struct PromiseHandle<R, E> {
    id: Option<ToastId>,
    settled: Shared<LocalBoxFuture<'static, Result<R, E>>>,
}

impl<R: Clone, E: Clone> PromiseHandle<R, E> {
    /// Id of the loading toast, if one was created.
    #[must_use]
    pub fn id(&self) -> Option<&ToastId> {
        self.id.as_ref()
    }

    /// The result of the operation itself.
    ///
    /// Resolves after the toast has been updated and `finally` has run.
    /// May be awaited any number of times.
    pub fn unwrap(&self) -> impl Future<Output = Result<R, E>> + use<R, E> {
        self.settled.clone()
    }

    /// The result, if settlement has already completed.
    #[must_use]
    pub fn peek(&self) -> Option<Result<R, E>> {
        self.settled.peek().cloned()
    }
}

impl<R, E> From<&PromiseHandle<R, E>> for Option<ToastId> {
    fn from(handle: &PromiseHandle<R, E>) -> Self {
        handle.id.clone()
    }
}

impl<R, E> fmt::Debug for PromiseHandle<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Bind a toast to `op`.
///
/// `classify` turns a successful result into an [`Outcome`]; the handle
/// still reports the unclassified result.
pub(crate) fn bind<R, T, E, F, Fut>(
    registry: &ToastRegistry,
    spawner: &dyn LocalSpawn,
    op: F,
    data: Option<PromiseData<T, E>>,
    classify: fn(R) -> Outcome<T, E>,
) -> Result<Option<PromiseHandle<R, E>>, ToastError>
where
    R: Clone + 'static,
    T: Clone + 'static,
    E: Clone + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<R, E>> + 'static,
{
    let Some(data) = data else {
        trace!("promise bound without data, nothing to show");
        return Ok(None);
    };
    let PromiseData {
        loading,
        success,
        error,
        description,
        finally,
        options,
    } = data;

    let id = loading.map(|message| {
        let mut options = options;
        if let Some(text) = description.as_ref().and_then(Resolve::as_value) {
            options.description = Some(text.clone());
        }
        registry.create(ToastPatch {
            message: Some(message),
            kind: Some(ToastType::Loading),
            jsx: None,
            options,
        })
    });

    let pending = op();
    let settle = Settle {
        registry: registry.clone(),
        id: id.clone(),
        success,
        error,
        description,
        finally,
    };
    let span = debug_span!("promise_settle", id = ?id);
    let settled = async move {
        let result = pending.await;
        settle.run(&result, classify).await;
        result
    }
    .instrument(span)
    .boxed_local()
    .shared();

    if let Err(err) = spawner.spawn_local(settled.clone().map(|_| ())) {
        // Nothing will settle this toast, so take the loading state down now.
        if let Some(id) = &id {
            registry.dismiss(id.clone());
        }
        warn!(id = ?id, error = %err, "promise settlement could not be spawned");
        return Err(err.into());
    }
    debug!(id = ?id, "promise bound");

    Ok(Some(PromiseHandle { id, settled }))
}

/// Everything settlement needs, moved into the spawned task.
struct Settle<T, E> {
    registry: ToastRegistry,
    id: Option<ToastId>,
    success: Option<Resolve<T>>,
    error: Option<Resolve<Failure<E>>>,
    description: Option<Resolve<Settlement<T, E>, Content>>,
    finally: Option<Box<dyn FnOnce()>>,
}

impl<T: Clone + 'static, E: Clone + 'static> Settle<T, E> {
    async fn run<R: Clone>(self, result: &Result<R, E>, classify: fn(R) -> Outcome<T, E>) {
        let Self {
            registry,
            mut id,
            success,
            error,
            description,
            finally,
        } = self;
        let mut applied = false;

        match result {
            Ok(value) => match classify(value.clone()) {
                Outcome::Rendered(node) => {
                    applied = true;
                    registry.create(ToastPatch {
                        message: Some(node.into()),
                        kind: Some(ToastType::Default),
                        jsx: None,
                        options: ToastOptions {
                            id: id.clone(),
                            ..ToastOptions::default()
                        },
                    });
                }
                Outcome::HttpFailure { status } => {
                    applied = true;
                    let failure = Failure::Http {
                        status,
                        message: format!("HTTP error! status: {status}"),
                    };
                    let patch = phase_patch(
                        id.clone(),
                        ToastType::Error,
                        error,
                        failure.clone(),
                        description,
                        Settlement::Failure(failure),
                    )
                    .await;
                    registry.create(patch);
                }
                Outcome::Failure(err) => {
                    applied = true;
                    let failure = Failure::Error(err);
                    let patch = phase_patch(
                        id.clone(),
                        ToastType::Error,
                        error,
                        failure.clone(),
                        description,
                        Settlement::Failure(failure),
                    )
                    .await;
                    registry.create(patch);
                }
                Outcome::Success(value) => {
                    if let Some(success) = success {
                        applied = true;
                        let patch = phase_patch(
                            id.clone(),
                            ToastType::Success,
                            Some(success),
                            value.clone(),
                            description,
                            Settlement::Success(value),
                        )
                        .await;
                        registry.create(patch);
                    }
                }
            },
            Err(err) => {
                if let Some(error) = error {
                    applied = true;
                    let failure = Failure::Error(err.clone());
                    let patch = phase_patch(
                        id.clone(),
                        ToastType::Error,
                        Some(error),
                        failure.clone(),
                        description,
                        Settlement::Failure(failure),
                    )
                    .await;
                    registry.create(patch);
                }
            }
        }

        if !applied {
            if let Some(loading) = id.take() {
                debug!(id = %loading, "no handler for promise outcome, dismissing loading toast");
                registry.dismiss(loading);
            }
        }

        if let Some(finally) = finally {
            finally();
        }
    }
}

/// Resolve a phase's message and description into the update patch.
async fn phase_patch<A, T, E>(
    id: Option<ToastId>,
    kind: ToastType,
    message: Option<Resolve<A>>,
    arg: A,
    description: Option<Resolve<Settlement<T, E>, Content>>,
    settlement: Settlement<T, E>,
) -> ToastPatch
where
    A: 'static,
    T: 'static,
    E: 'static,
{
    let message = match message {
        Some(resolve) => resolve.resolve(arg).await,
        None => Ok(PromiseMessage::Message(Content::Text(String::new()))),
    };
    let description = match description {
        Some(resolve) => resolve.resolve(settlement).await.map(Some),
        None => Ok(None),
    };

    match (message, description) {
        (Ok(PromiseMessage::Message(content)), Ok(description)) => ToastPatch {
            message: Some(content),
            kind: Some(kind),
            jsx: None,
            options: ToastOptions {
                id,
                description,
                ..ToastOptions::default()
            },
        },
        (Ok(PromiseMessage::Extended(bundle)), Ok(description)) => {
            let ToastPatch {
                message,
                kind: bundle_kind,
                jsx,
                mut options,
            } = bundle;
            options.id = id;
            if options.description.is_none() {
                options.description = description;
            }
            ToastPatch {
                message,
                kind: Some(bundle_kind.unwrap_or(kind)),
                jsx,
                options,
            }
        }
        (Err(err), _) | (_, Err(err)) => {
            warn!(error = %err, phase = %kind, "toast message builder failed, showing fallback error");
            ToastPatch {
                message: Some(Content::Text(err.to_string())),
                kind: Some(ToastType::Error),
                jsx: None,
                options: ToastOptions {
                    id,
                    ..ToastOptions::default()
                },
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
