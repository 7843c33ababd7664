//! State change subscriptions.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use breaker::{Breaker, State};

fn failure() -> Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::Other, "protected call failed"))
}

#[test]
fn test_prompt_subscriber_sees_every_transition() {
    let cb = Breaker::new().trip_after(1).reset_after(Duration::from_millis(10));
    let mut sink = cb.subscribe();

    let _ = cb.protect(failure);
    assert_eq!(sink.try_recv(), Some(State::Open));

    std::thread::sleep(Duration::from_millis(20));
    let _ = cb.protect(|| Ok::<_, io::Error>(()));
    assert_eq!(sink.try_recv(), Some(State::Closed));

    cb.reset();
    assert_eq!(sink.try_recv(), Some(State::Closed));
    assert_eq!(sink.try_recv(), None);
}

#[test]
fn test_trial_visible_from_inside_operation() {
    let cb = Breaker::new().trip_after(1).reset_after(Duration::from_millis(10));
    let mut sink = cb.subscribe();
    let _ = cb.protect(failure);
    assert_eq!(sink.try_recv(), Some(State::Open));

    std::thread::sleep(Duration::from_millis(20));
    let seen = cb.protect(|| Ok::<_, io::Error>(sink.try_recv())).unwrap();
    assert_eq!(seen, Some(State::Partial));
}

#[test]
fn test_slow_subscriber_only_sees_latest() {
    let cb = Breaker::new().trip_after(1).reset_after(Duration::from_millis(10));
    let mut slow = cb.subscribe();

    let _ = cb.protect(failure);
    std::thread::sleep(Duration::from_millis(20));
    let _ = cb.protect(failure);

    // Open, Partial, Open collapsed into the newest value.
    assert_eq!(slow.try_recv(), Some(State::Open));
    assert_eq!(slow.try_recv(), None);
    assert_eq!(slow.latest(), State::Open);
}

#[test]
fn test_subscribers_added_later_start_empty() {
    let cb = Breaker::new().trip_after(1);
    let _ = cb.protect(failure);

    let mut late = cb.subscribe();
    assert_eq!(late.try_recv(), None);
    assert_eq!(late.latest(), State::Open);

    cb.reset();
    assert_eq!(late.try_recv(), Some(State::Closed));
}

#[test]
fn test_dropped_subscriber_does_not_affect_others() {
    let cb = Breaker::new().trip_after(1);
    let dropped = cb.subscribe();
    let mut kept = cb.subscribe();
    drop(dropped);
    assert_eq!(cb.subscriber_count(), 1);

    let _ = cb.protect(failure);
    assert_eq!(kept.try_recv(), Some(State::Open));
}

#[tokio::test]
async fn test_async_subscriber() {
    let cb = Arc::new(Breaker::new().trip_after(2));
    let mut sink = cb.subscribe();

    let watcher = tokio::spawn(async move { sink.recv().await });

    let _ = cb.protect(failure);
    let _ = cb.protect(failure);

    let observed = tokio::time::timeout(Duration::from_secs(1), watcher)
        .await
        .expect("subscriber timed out")
        .unwrap();
    assert_eq!(observed, Some(State::Open));
}

#[tokio::test]
async fn test_stream_ends_when_breaker_dropped() {
    let cb = Breaker::new().trip_after(1);
    let mut sink = cb.subscribe();
    let _ = cb.protect(failure);
    drop(cb);

    assert_eq!(sink.recv().await, Some(State::Open));
    assert_eq!(sink.recv().await, None);
}
