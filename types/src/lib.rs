//! Core domain types for deferral.
//!
//! This crate contains pure domain types with no IO and no async. The
//! deferred primitive in `deferral-core` and the demo binary both build on
//! these.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod outcome;
mod settlement;
mod time;

pub use outcome::{Outcome, OutcomeKind, RaisedFault, SUCCESS_LABEL, is_successful};
pub use settlement::{AlreadySettled, DeferredFault, DeferredState, Settlement};
pub use time::{at_time, millis_of};
