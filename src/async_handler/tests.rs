//! Unit tests for the worker-pool handler.

use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use super::handler::await_acks;
use super::*;
use crate::buffer::BufferConfig;
use crate::error::{HandlerError, PublishError};
use crate::handlers::HandlerBuildError;
use crate::level::Level;
use crate::log_record::LogEvent;
use crate::test_utils::{CollectingSideChannel, CountingPublisher, StubClient};

const TOPIC: &str = "projects/test-project/topics/test-topic";

fn config(
    publisher: &CountingPublisher,
    side: &CollectingSideChannel,
    workers: usize,
    capacity: usize,
) -> AsyncHandlerConfig {
    let mut config = AsyncHandlerConfig::new(TOPIC, StubClient::new().shared());
    config.handler.publish_fn = publisher.shared();
    config.handler.buffer = BufferConfig {
        capacity,
        hard_limit: 10_000,
        flush_level: Level::Critical,
    };
    config.worker_num = workers;
    config.side_channel = side.shared();
    config.flush_timeout = Duration::from_secs(5);
    config
}

fn info(message: &str) -> LogEvent {
    LogEvent::new("async", Level::Info, message)
}

#[fixture]
fn side() -> CollectingSideChannel {
    CollectingSideChannel::new()
}

#[rstest]
fn round_robin_spreads_events(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new();
    let handler = AsyncPubsubHandler::with_config(config(&publisher, &side, 3, 1000)).expect("handler");
    for i in 0..6 {
        handler.emit(info(&format!("{i}"))).expect("emit");
    }
    handler.flush().expect("flush");
    // Each of the three workers held two events.
    assert_eq!(publisher.calls(), 3);
    assert!(publisher.bodies().iter().all(|b| b.len() == 2));
}

#[rstest]
fn close_publishes_everything(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new();
    let handler = AsyncPubsubHandler::with_config(config(&publisher, &side, 4, 1000)).expect("handler");
    for i in 0..100 {
        handler.emit(info(&format!("{i}"))).expect("emit");
    }
    handler.close();
    assert_eq!(publisher.message_count(), 100);
    assert!(handler.is_closed());
    assert_eq!(handler.worker_num(), 0);
}

#[rstest]
fn emit_after_close_is_rejected(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new();
    let handler = AsyncPubsubHandler::with_config(config(&publisher, &side, 1, 10)).expect("handler");
    handler.close();
    handler.close();
    assert!(matches!(handler.emit(info("late")), Err(HandlerError::Closed)));
    assert!(matches!(handler.flush(), Err(HandlerError::Closed)));
}

#[rstest]
fn fatal_failures_go_to_side_channel(side: CollectingSideChannel) {
    let publisher = CountingPublisher::failing_with(PublishError::status(400, "Bad Request"));
    let handler = AsyncPubsubHandler::with_config(config(&publisher, &side, 1, 1)).expect("handler");
    handler.emit(info("first")).expect("emit never sees publish errors");
    handler.emit(info("second")).expect("emit never sees publish errors");
    handler.close();
    assert_eq!(publisher.calls(), 2);
    let reports = side.reports();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.contains("fatal") && r.contains("400")));
}

#[rstest]
fn recoverable_failure_is_retried_on_next_flush(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new().with_script([Err(PublishError::status(503, "busy"))]);
    let handler = AsyncPubsubHandler::with_config(config(&publisher, &side, 1, 1000)).expect("handler");
    handler.emit(info("kept")).expect("emit");
    handler.flush().expect("flush");
    assert_eq!(publisher.message_count(), 0);
    handler.flush().expect("flush");
    assert_eq!(publisher.messages(), vec!["kept"]);
    assert_eq!(side.reports().len(), 1);
}

#[rstest]
fn flush_level_is_shared_with_workers(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new();
    let handler = AsyncPubsubHandler::with_config(config(&publisher, &side, 2, 1000)).expect("handler");
    handler.set_flush_level(Level::Warn);
    assert_eq!(handler.flush_level(), Level::Warn);
    handler
        .emit(LogEvent::new("async", Level::Error, "urgent"))
        .expect("emit");
    handler.close();
    assert_eq!(publisher.calls(), 1);
}

#[rstest]
fn flush_times_out_on_slow_publisher(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new().with_delay(Duration::from_millis(300));
    let mut cfg = config(&publisher, &side, 1, 1000);
    cfg.flush_timeout = Duration::from_millis(20);
    let handler = AsyncPubsubHandler::with_config(cfg).expect("handler");
    handler.emit(info("slow")).expect("emit");
    assert!(matches!(handler.flush(), Err(HandlerError::FlushTimeout)));
    handler.close();
    assert_eq!(publisher.message_count(), 1);
}

#[rstest]
fn missing_topic_fails_before_spawning(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new();
    let mut cfg = config(&publisher, &side, 2, 10);
    cfg.handler.client = StubClient::missing_topics().shared();
    assert!(matches!(
        AsyncPubsubHandler::with_config(cfg),
        Err(HandlerBuildError::TopicNotFound(_))
    ));
    assert_eq!(publisher.calls(), 0);
}

#[rstest]
fn zero_workers_is_invalid(side: CollectingSideChannel) {
    let publisher = CountingPublisher::new();
    assert!(matches!(
        AsyncPubsubHandler::with_config(config(&publisher, &side, 0, 10)),
        Err(HandlerBuildError::InvalidConfig(_))
    ));
}

#[rstest]
fn hard_limit_cut_is_reported_during_outage(side: CollectingSideChannel) {
    let publisher = CountingPublisher::failing_with(PublishError::status(503, "unavailable"));
    let mut cfg = config(&publisher, &side, 1, 5);
    cfg.handler.buffer.hard_limit = 2;
    cfg.shutdown_flush_attempts = 1;
    let handler = AsyncPubsubHandler::with_config(cfg).expect("handler");
    for i in 0..5 {
        handler.emit(info(&format!("{i}"))).expect("emit");
    }
    handler.close();

    assert_eq!(publisher.calls(), 2);
    assert_eq!(publisher.message_count(), 0);
    let sizes: Vec<_> = publisher.bodies().iter().map(|b| b.len()).collect();
    assert_eq!(sizes, [5, 2]);
    let reports = side.reports();
    assert!(
        reports
            .iter()
            .any(|r| r == "worker 0 dropped 3 events: buffer over hard limit")
    );
    assert!(
        reports
            .iter()
            .any(|r| r.contains("dropping 2 events still unpublished after 1 shutdown flush attempts"))
    );
}

#[test]
fn ack_wait_reports_closed_when_workers_exit() {
    let (tx, rx) = crossbeam_channel::bounded(2);
    tx.send(()).expect("ack");
    drop(tx);
    let deadline = Instant::now() + Duration::from_secs(5);
    assert!(matches!(await_acks(&rx, 2, deadline), Err(HandlerError::Closed)));
}

#[test]
fn ack_wait_times_out_on_missing_ack() {
    let (tx, rx) = crossbeam_channel::bounded::<()>(1);
    let deadline = Instant::now() + Duration::from_millis(10);
    assert!(matches!(await_acks(&rx, 1, deadline), Err(HandlerError::FlushTimeout)));
    drop(tx);
}

#[test]
fn ack_wait_succeeds_when_every_worker_acks() {
    let (tx, rx) = crossbeam_channel::bounded(2);
    tx.send(()).expect("ack");
    tx.send(()).expect("ack");
    let deadline = Instant::now() + Duration::from_secs(5);
    assert!(await_acks(&rx, 2, deadline).is_ok());
}
