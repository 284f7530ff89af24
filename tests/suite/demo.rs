//! End-to-end runs of the demo driver

use deferral::{CALLBACK_STARTED, SEQUENTIAL_STARTED, run_demo};
use deferral_config::ConsumerStyle;
use deferral_core::{CALLBACK_TAG, SEQUENTIAL_TAG};
use deferral_types::is_successful;

use crate::common::{capture, settings, settled_then_finally, work_clock};

const BOTH: [ConsumerStyle; 2] = [ConsumerStyle::Callback, ConsumerStyle::Sequential];

#[tokio::test(start_paused = true)]
async fn initiation_markers_precede_all_settlement_lines() {
    let (transcript, console) = capture();

    run_demo(&settings(&BOTH), &console, work_clock(7))
        .await
        .unwrap();

    let lines = transcript.lines();
    assert_eq!(lines.len(), 6, "{lines:?}");
    assert_eq!(lines[0], format!("12:0:0.1 : {CALLBACK_STARTED}"));
    assert_eq!(lines[1], format!("12:0:0.1 : {SEQUENTIAL_STARTED}"));
}

#[tokio::test(start_paused = true)]
async fn success_is_printed_by_both_consumers() {
    let (transcript, console) = capture();

    run_demo(&settings(&BOTH), &console, work_clock(7))
        .await
        .unwrap();

    let lines = transcript.lines();
    let callback = settled_then_finally(&lines, CALLBACK_TAG);
    let sequential = settled_then_finally(&lines, SEQUENTIAL_TAG);
    assert_eq!(callback, "12:0:0.7 : success - (promise call)");
    assert_eq!(sequential, "12:0:0.7 : success - (async call)");
    assert!(is_successful(&callback));
}

#[tokio::test(start_paused = true)]
async fn raised_fault_is_printed_as_rejection() {
    let (transcript, console) = capture();

    run_demo(&settings(&BOTH), &console, work_clock(15))
        .await
        .unwrap();

    let lines = transcript.lines();
    let callback = settled_then_finally(&lines, CALLBACK_TAG);
    let sequential = settled_then_finally(&lines, SEQUENTIAL_TAG);
    assert_eq!(callback, "12:0:0.15 : exception - (promise call)");
    assert_eq!(sequential, "12:0:0.15 : exception - (async call)");
}

#[tokio::test(start_paused = true)]
async fn logical_failure_is_printed_as_rejection() {
    let (transcript, console) = capture();

    run_demo(&settings(&BOTH), &console, work_clock(9))
        .await
        .unwrap();

    let lines = transcript.lines();
    assert!(settled_then_finally(&lines, CALLBACK_TAG).contains("failure"));
    assert!(settled_then_finally(&lines, SEQUENTIAL_TAG).contains("failure"));
}

#[tokio::test(start_paused = true)]
async fn only_configured_style_runs() {
    let (transcript, console) = capture();

    run_demo(
        &settings(&[ConsumerStyle::Sequential]),
        &console,
        work_clock(7),
    )
    .await
    .unwrap();

    let lines = transcript.lines();
    assert_eq!(
        lines,
        vec![
            format!("12:0:0.1 : {SEQUENTIAL_STARTED}"),
            "12:0:0.7 : success - (async call)".to_string(),
            "12:0:0.1 :     Finally! - (async call)".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn no_styles_finishes_without_output() {
    let (transcript, console) = capture();

    run_demo(&settings(&[]), &console, work_clock(7))
        .await
        .unwrap();

    assert!(transcript.lines().is_empty());
}
