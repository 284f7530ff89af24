//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use deferral_config::{ConsumerStyle, DemoSettings};
use deferral_core::{Console, FixedClock, Transcript};

/// Millisecond reading that stamps lifecycle lines; picked to succeed so it
/// is never confused with a work clock.
pub const STAMP_MILLIS: u32 = 1;

/// A capturing console whose lifecycle stamps read `12:0:0.1`.
pub fn capture() -> (Transcript, Console) {
    let transcript = Transcript::new();
    let console = Console::new(
        Arc::new(transcript.clone()),
        Arc::new(FixedClock::at_millis(STAMP_MILLIS)),
    );
    (transcript, console)
}

pub fn work_clock(millis: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::at_millis(millis))
}

pub fn settings(styles: &[ConsumerStyle]) -> DemoSettings {
    DemoSettings {
        delay: Duration::from_millis(2_000),
        styles: styles.to_vec(),
    }
}

/// Lines ending with `tag`, in transcript order.
pub fn tagged(lines: &[String], tag: &str) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.ends_with(tag))
        .cloned()
        .collect()
}

/// Assert `lines` holds exactly one settlement line followed by one
/// `Finally!` line for `tag`, and return the settlement line.
pub fn settled_then_finally(lines: &[String], tag: &str) -> String {
    let ours = tagged(lines, tag);
    assert_eq!(ours.len(), 2, "expected two {tag} lines, got {ours:?}");
    assert!(
        !ours[0].contains("Finally!"),
        "settlement line must come first: {ours:?}"
    );
    assert_eq!(ours[1], format!("12:0:0.1 :     Finally! - {tag}"));
    ours[0].clone()
}
