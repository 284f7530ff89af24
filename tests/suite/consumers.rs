//! Both consumers observing timer-driven operations

use std::time::Duration;

use deferral_core::{
    CALLBACK_TAG, DEFAULT_DELAY, Deferred, SEQUENTIAL_TAG, consume_sequentially,
    consume_with_callbacks, start,
};
use deferral_types::DeferredState;

use crate::common::{capture, settled_then_finally, work_clock};

#[tokio::test(start_paused = true)]
async fn line_logged_after_start_precedes_settlement() {
    let (transcript, console) = capture();

    let op = start(DEFAULT_DELAY, work_clock(7));
    let done = consume_with_callbacks(&op, &console);
    console.emit("A");

    done.await.unwrap();
    let lines = transcript.lines();
    assert_eq!(lines[0], "A");
    assert_eq!(lines.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn one_operation_observed_by_both_consumers() {
    let (transcript, console) = capture();

    let op = start(DEFAULT_DELAY, work_clock(15));
    let done = consume_with_callbacks(&op, &console);
    let sequential = tokio::spawn(consume_sequentially(op.clone(), console.clone()));

    done.await.unwrap();
    sequential.await.unwrap();

    let lines = transcript.lines();
    assert_eq!(lines.len(), 4, "{lines:?}");
    assert!(settled_then_finally(&lines, CALLBACK_TAG).contains("exception"));
    assert!(settled_then_finally(&lines, SEQUENTIAL_TAG).contains("exception"));
    assert_eq!(
        op.state(),
        DeferredState::Rejected("12:0:0.15 : exception".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn consumer_attached_after_settlement_still_reports() {
    let (transcript, console) = capture();

    let op = start(Duration::from_millis(10), work_clock(7));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(op.is_settled());

    consume_with_callbacks(&op, &console).await.unwrap();
    consume_sequentially(op, console).await;

    let lines = transcript.lines();
    assert_eq!(
        settled_then_finally(&lines, CALLBACK_TAG),
        "12:0:0.7 : success - (promise call)"
    );
    assert_eq!(
        settled_then_finally(&lines, SEQUENTIAL_TAG),
        "12:0:0.7 : success - (async call)"
    );
}

#[tokio::test(start_paused = true)]
async fn fulfillment_fans_out_in_registration_order() {
    let (transcript, console) = capture();
    let (op, resolver) = Deferred::<String, String>::pending();

    let first = consume_with_callbacks(&op, &console);
    let second = consume_with_callbacks(&op, &console);
    resolver.resolve("v".to_string()).unwrap();
    assert!(resolver.reject("late".to_string()).is_err());

    first.await.unwrap();
    second.await.unwrap();

    let lines = transcript.lines();
    let settlements: Vec<_> = lines
        .iter()
        .filter(|line| !line.contains("Finally!"))
        .collect();
    assert_eq!(settlements, vec!["v - (promise call)", "v - (promise call)"]);
    assert_eq!(lines.len(), 4);
    // The first observer's value line precedes its own Finally! line.
    assert_eq!(lines[0], "v - (promise call)");
}
