//! Integration tests for effect execution in the Store
//!
//! Covers delayed feedback, cancellation, ordering of sequential effects and
//! the action broadcast used by presentation layers.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use marquee_core::{
    SmallVec,
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec,
};
use marquee_runtime::Store;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TimerAction {
    /// Schedule `Expired` after `after_ms`, cancellable under "expiry"
    Arm { after_ms: u64 },
    /// Cancel the pending expiry
    Disarm,
    /// Emitted by the delay
    Expired,
    /// Record a label, used for ordering checks
    Record(&'static str),
    /// Record two labels in sequence through effects
    RecordBoth,
}

#[derive(Debug, Clone, Default)]
struct TimerState {
    expirations: u32,
    log: Vec<&'static str>,
}

struct TimerReducer;

fn expiry() -> EffectId {
    EffectId::new("expiry")
}

impl Reducer for TimerReducer {
    type State = TimerState;
    type Action = TimerAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TimerAction::Arm { after_ms } => smallvec![
                Effect::Delay {
                    duration: Duration::from_millis(after_ms),
                    action: Box::new(TimerAction::Expired),
                }
                .cancellable(expiry())
            ],
            TimerAction::Disarm => smallvec![Effect::Cancel(expiry())],
            TimerAction::Expired => {
                state.expirations += 1;
                SmallVec::new()
            },
            TimerAction::Record(label) => {
                state.log.push(label);
                SmallVec::new()
            },
            TimerAction::RecordBoth => smallvec![Effect::chain(vec![
                Effect::Delay {
                    duration: Duration::from_millis(30),
                    action: Box::new(TimerAction::Record("first")),
                },
                Effect::Delay {
                    duration: Duration::from_millis(10),
                    action: Box::new(TimerAction::Record("second")),
                },
            ])],
        }
    }
}

fn new_store() -> Store<TimerState, TimerAction, (), TimerReducer> {
    Store::new(TimerState::default(), TimerReducer, ())
}

// ============================================================================
// Delays
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_delay_fires_after_duration() {
    let store = new_store();
    store.send(TimerAction::Arm { after_ms: 2000 }).await.unwrap();

    assert!(store.is_scheduled(&expiry()));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.state(|s| s.expirations).await, 0);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(store.state(|s| s.expirations).await, 1);
    assert!(!store.is_scheduled(&expiry()));
}

#[tokio::test(start_paused = true)]
async fn test_sequential_effects_run_in_order() {
    let store = new_store();
    let mut handle = store.send(TimerAction::RecordBoth).await.unwrap();

    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(store.state(|s| s.log.clone()).await, vec!["first", "second"]);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_effect_prevents_delayed_action() {
    let store = new_store();
    let mut handle = store.send(TimerAction::Arm { after_ms: 2000 }).await.unwrap();
    store.send(TimerAction::Disarm).await.unwrap();

    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(store.state(|s| s.expirations).await, 0);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_store_cancel_reports_whether_pending() {
    let store = new_store();
    store.send(TimerAction::Arm { after_ms: 100 }).await.unwrap();

    assert!(store.cancel(&expiry()));
    assert!(!store.cancel(&expiry()));
    assert!(!store.cancel(&EffectId::new("never-registered")));
}

#[tokio::test(start_paused = true)]
async fn test_rearming_replaces_previous_registration() {
    let store = new_store();
    store.send(TimerAction::Arm { after_ms: 100 }).await.unwrap();
    store.send(TimerAction::Arm { after_ms: 300 }).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(store.state(|s| s.expirations).await, 1);
}

// ============================================================================
// Broadcasting
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_effect_actions_are_broadcast() {
    let store = new_store();
    let mut actions = store.subscribe_actions();

    store.send(TimerAction::Arm { after_ms: 50 }).await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(1), actions.recv())
        .await
        .expect("broadcast within timeout")
        .expect("channel open");
    assert_eq!(received, TimerAction::Expired);
}

#[tokio::test]
async fn test_direct_sends_are_not_broadcast() {
    let store = new_store();
    let mut actions = store.subscribe_actions();

    store.send(TimerAction::Record("direct")).await.unwrap();

    assert!(actions.try_recv().is_err());
    assert_eq!(store.state(|s| s.log.len()).await, 1);
}
