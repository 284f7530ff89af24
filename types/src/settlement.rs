//! Settlement states of a deferred operation.

use thiserror::Error;

/// Terminal result of a deferred operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    #[inline]
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled(_))
    }

    #[inline]
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Settlement::Rejected(_))
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Settlement::Fulfilled(value) => Ok(value),
            Settlement::Rejected(reason) => Err(reason),
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Settlement::Fulfilled(value),
            Err(reason) => Settlement::Rejected(reason),
        }
    }
}

/// Snapshot of a deferred operation's state.
///
/// `Pending` moves to one of the two terminal states exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredState<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

impl<T, E> DeferredState<T, E> {
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, DeferredState::Pending)
    }

    #[must_use]
    pub fn into_settlement(self) -> Option<Settlement<T, E>> {
        match self {
            DeferredState::Pending => None,
            DeferredState::Fulfilled(value) => Some(Settlement::Fulfilled(value)),
            DeferredState::Rejected(reason) => Some(Settlement::Rejected(reason)),
        }
    }
}

impl<T, E> From<Settlement<T, E>> for DeferredState<T, E> {
    fn from(settlement: Settlement<T, E>) -> Self {
        match settlement {
            Settlement::Fulfilled(value) => DeferredState::Fulfilled(value),
            Settlement::Rejected(reason) => DeferredState::Rejected(reason),
        }
    }
}

/// A settlement attempt on an operation that had already settled.
///
/// The first settlement stands; the attempt changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deferred operation already settled")]
pub struct AlreadySettled;

/// A cell that lost its writer before settling normally.
///
/// Chained and awaited observers receive this as a rejection instead of
/// waiting forever, so the reason type must be constructible from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeferredFault {
    #[error("handler panicked: {0}")]
    HandlerPanicked(String),
    #[error("deferred operation abandoned before settling")]
    Abandoned,
}

impl From<DeferredFault> for String {
    fn from(fault: DeferredFault) -> Self {
        fault.to_string()
    }
}
