//! Errors returned by a protected call.

use thiserror::Error;

/// Outcome of [`Breaker::protect`](super::Breaker::protect) when it does not succeed.
///
/// `Open` means the operation was never invoked. `Operation` carries the
/// operation's own error unchanged: it displays as that error and is
/// returned from [`source`](std::error::Error::source).
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker rejected the call without executing it.
    #[error("breaker open")]
    Open,

    /// The protected operation ran and failed.
    #[error("{0}")]
    Operation(#[from] E),
}

impl<E> BreakerError<E> {
    /// Returns true if the call was short-circuited.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open)
    }

    /// Borrow the operation's error, if the operation ran.
    pub fn operation(&self) -> Option<&E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Open => None,
        }
    }

    /// Take the operation's error, if the operation ran.
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Open => None,
        }
    }
}
