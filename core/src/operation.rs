//! Timer-delayed operation that settles from the unit of work's outcome.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use deferral_types::{Outcome, RaisedFault, Settlement, is_successful};

use crate::clock::Clock;
use crate::deferred::{Deferred, panic_message};
use crate::generator::generate;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(2_000);

/// Fulfills with a success message, rejects with any other message.
pub type DeferredOperation = Deferred<String, String>;

/// Start the simulated work, returning before the timer fires.
///
/// Must be called inside a tokio runtime.
pub fn start(delay: Duration, clock: Arc<dyn Clock>) -> DeferredOperation {
    schedule(delay, move || generate(clock.as_ref()))
}

/// Run `work` once after `delay` and settle from its result.
///
/// Failures, raised faults, and panics all become rejections; nothing
/// escapes the timer task.
pub fn schedule<W>(delay: Duration, work: W) -> DeferredOperation
where
    W: FnOnce() -> Result<Outcome, RaisedFault> + Send + 'static,
{
    Deferred::new(move |resolver| {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let settlement = run_work(work);
            // The resolver never leaves this task, so this is the only write.
            let _ = resolver.settle(settlement);
        });
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Scheduled deferred operation");
    })
}

fn run_work<W>(work: W) -> Settlement<String, String>
where
    W: FnOnce() -> Result<Outcome, RaisedFault>,
{
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(Ok(outcome)) if is_successful(outcome.message()) => {
            Settlement::Fulfilled(outcome.into_message())
        }
        Ok(Ok(outcome)) => {
            tracing::debug!(kind = ?outcome.kind(), "Unit of work reported a failure");
            Settlement::Rejected(outcome.into_message())
        }
        Ok(Err(fault)) => {
            tracing::debug!("Unit of work raised: {fault}");
            Settlement::Rejected(fault.into_message())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!("Unit of work panicked: {message}");
            Settlement::Rejected(message)
        }
    }
}
