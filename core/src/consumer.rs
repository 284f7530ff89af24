//! The two ways of observing a deferred operation.
//!
//! Both write one line when the operation settles and one `Finally!` line
//! after it. The callback consumer chains `then`/`catch`/`finally` and returns
//! immediately; the sequential consumer awaits and branches on the result.

use std::fmt::Display;

use deferral_types::DeferredFault;

use crate::console::Console;
use crate::deferred::Deferred;

pub const CALLBACK_TAG: &str = "(promise call)";
pub const SEQUENTIAL_TAG: &str = "(async call)";

fn finally_line(tag: &str) -> String {
    format!("    Finally! - {tag}")
}

/// Chain print handlers onto `op` and return without waiting.
///
/// The returned handle settles (always fulfilled) once the `Finally!` line
/// has been written. A value handler that panics is reported through the
/// rejection handler like any other reason.
pub fn consume_with_callbacks<T, E>(op: &Deferred<T, E>, console: &Console) -> Deferred<(), E>
where
    T: Display + Clone + Send + 'static,
    E: Display + Clone + Send + From<DeferredFault> + 'static,
{
    let on_fulfilled = console.clone();
    let on_rejected = console.clone();
    let on_settled = console.clone();

    op.then(move |value| on_fulfilled.emit(&format!("{value} - {CALLBACK_TAG}")))
        .catch(move |reason| on_rejected.emit(&format!("{reason} - {CALLBACK_TAG}")))
        .finally(move || on_settled.stamp(&finally_line(CALLBACK_TAG)))
}

/// Await `op`, print its value or reason, then print the `Finally!` line.
pub async fn consume_sequentially<T, E>(op: Deferred<T, E>, console: Console)
where
    T: Display + Clone + Send + 'static,
    E: Display + Clone + Send + From<DeferredFault> + 'static,
{
    match op.await {
        Ok(value) => console.emit(&format!("{value} - {SEQUENTIAL_TAG}")),
        Err(reason) => console.emit(&format!("{reason} - {SEQUENTIAL_TAG}")),
    }
    console.stamp(&finally_line(SEQUENTIAL_TAG));
}
