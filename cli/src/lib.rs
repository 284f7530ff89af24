//! Demo driver shared by the `deferral` binary and the integration tests.
//!
//! ```text
//! run_demo() -> start() -> consume_with_callbacks()   "done calling start()"
//!            -> start() -> spawn(consume_sequentially) "done calling sequential consumer"
//!            -> wait for both to print their Finally! line
//! ```
//!
//! Each style gets its own operation. The "done calling" marker is printed
//! right after initiation and so always precedes that style's settlement
//! lines.

use std::sync::Arc;

use anyhow::Result;

use deferral_config::{ConsumerStyle, DemoSettings};
use deferral_core::{Clock, Console, consume_sequentially, consume_with_callbacks, start};

pub const CALLBACK_STARTED: &str = "done calling start()";
pub const SEQUENTIAL_STARTED: &str = "done calling sequential consumer";

/// Run the configured consumers and wait until each has finished.
///
/// `work_clock` drives the outcome branch; the console clock only stamps
/// lifecycle lines.
pub async fn run_demo(
    settings: &DemoSettings,
    console: &Console,
    work_clock: Arc<dyn Clock>,
) -> Result<()> {
    let callback_chain = if settings.runs(ConsumerStyle::Callback) {
        let op = start(settings.delay, Arc::clone(&work_clock));
        let chain = consume_with_callbacks(&op, console);
        console.stamp(CALLBACK_STARTED);
        Some(chain)
    } else {
        None
    };

    let sequential_task = if settings.runs(ConsumerStyle::Sequential) {
        let op = start(settings.delay, Arc::clone(&work_clock));
        let task = tokio::spawn(consume_sequentially(op, console.clone()));
        console.stamp(SEQUENTIAL_STARTED);
        Some(task)
    } else {
        None
    };

    if callback_chain.is_none() && sequential_task.is_none() {
        tracing::warn!("No consumer styles configured; nothing to run");
    }

    if let Some(chain) = callback_chain
        && let Err(reason) = chain.await
    {
        tracing::warn!("Callback chain ended rejected: {reason}");
    }

    if let Some(task) = sequential_task {
        task.await?;
    }

    tracing::info!(styles = ?settings.styles, "Demo finished");
    Ok(())
}
