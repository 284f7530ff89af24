//! Deferred operations and the two ways of consuming them.
//!
//! [`Deferred`] is the settlement primitive. [`start`] schedules the
//! simulated unit of work on a timer and returns a [`DeferredOperation`]
//! right away. [`consume_with_callbacks`] and [`consume_sequentially`]
//! observe the same settlement through chained handlers and `.await`.

mod clock;
mod console;
mod consumer;
mod deferred;
mod generator;
mod operation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use console::{Console, LineSink, StdoutSink, Transcript};
pub use consumer::{CALLBACK_TAG, SEQUENTIAL_TAG, consume_sequentially, consume_with_callbacks};
pub use deferred::{Deferred, Resolver, Settled};
pub use generator::generate;
pub use operation::{DEFAULT_DELAY, DeferredOperation, schedule, start};
