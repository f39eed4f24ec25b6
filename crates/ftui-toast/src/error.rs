#![forbid(unsafe_code)]

//! Errors surfaced by the toast engine.

use futures::task::SpawnError;

/// Failure produced by a caller-supplied message builder.
pub type BuildError = Box<dyn std::error::Error>;

/// Errors from toaster operations.
#[derive(Debug)]
pub enum ToastError {
    /// The executor refused the promise settlement task (it is shutting
    /// down). The loading toast, if one was shown, has been dismissed.
    Spawn(SpawnError),
}

impl std::fmt::Display for ToastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to spawn promise settlement: {err}"),
        }
    }
}

impl std::error::Error for ToastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
        }
    }
}

impl From<SpawnError> for ToastError {
    fn from(err: SpawnError) -> Self {
        Self::Spawn(err)
    }
}
