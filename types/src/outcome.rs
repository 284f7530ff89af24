//! Outcomes of the simulated unit of work.

use thiserror::Error;

/// Substring that marks a message as successful.
pub const SUCCESS_LABEL: &str = "success";

/// Which branch the unit of work took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Failure,
    Thrown,
}

impl OutcomeKind {
    /// Label appended to the timestamp in the outcome message.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            OutcomeKind::Success => SUCCESS_LABEL,
            OutcomeKind::Failure => "failure",
            OutcomeKind::Thrown => "exception",
        }
    }
}

/// A single result of the unit of work, formatted as `<time> : <label>`.
///
/// Immutable once built; the only way to get one is through the constructors
/// below, which keep the message and the tag consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Failure(String),
    Thrown(String),
}

impl Outcome {
    #[must_use]
    pub fn new(kind: OutcomeKind, time: &str) -> Self {
        let message = format!("{time} : {}", kind.label());
        match kind {
            OutcomeKind::Success => Outcome::Success(message),
            OutcomeKind::Failure => Outcome::Failure(message),
            OutcomeKind::Thrown => Outcome::Thrown(message),
        }
    }

    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success(_) => OutcomeKind::Success,
            Outcome::Failure(_) => OutcomeKind::Failure,
            Outcome::Thrown(_) => OutcomeKind::Thrown,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Outcome::Success(message) | Outcome::Failure(message) | Outcome::Thrown(message) => {
                message
            }
        }
    }

    #[must_use]
    pub fn into_message(self) -> String {
        match self {
            Outcome::Success(message) | Outcome::Failure(message) | Outcome::Thrown(message) => {
                message
            }
        }
    }
}

/// The unit of work bailed out instead of producing an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RaisedFault {
    message: String,
}

impl RaisedFault {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Fault labelled with the `exception` outcome at `time`.
    #[must_use]
    pub fn at(time: &str) -> Self {
        Self::new(Outcome::new(OutcomeKind::Thrown, time).into_message())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn into_message(self) -> String {
        self.message
    }
}

impl From<RaisedFault> for Outcome {
    fn from(fault: RaisedFault) -> Self {
        Outcome::Thrown(fault.message)
    }
}

/// True iff `message` contains the success label.
#[inline]
#[must_use]
pub fn is_successful(message: &str) -> bool {
    message.contains(SUCCESS_LABEL)
}
