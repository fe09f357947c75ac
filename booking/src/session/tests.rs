//! Reducer tests for the booking session.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code

use super::*;
use crate::catalog::StaticCatalog;
use crate::config::BookingConfig;
use crate::error::{BookingError, NoticeLevel};
use crate::types::{Format, Money, SeatId, ShowField, Step, TheaterId};
use chrono::NaiveDate;
use marquee_testing::{ReducerTest, assertions, test_clock};
use std::sync::Arc;
use std::time::Duration;

fn env() -> BookingEnvironment {
    BookingEnvironment::new(Arc::new(test_clock()), Arc::new(StaticCatalog::demo()))
}

fn seat(id: &str) -> SeatId {
    id.parse().unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

fn show_selected() -> Vec<BookingAction> {
    vec![
        BookingAction::SelectDate { date: date() },
        BookingAction::SelectTheater { theater_id: TheaterId::new("th1") },
        BookingAction::SelectShowtime { showtime: "10:30 AM".to_string() },
        BookingAction::SelectFormat { format: Format::Imax },
    ]
}

fn at_payment_with(seats: &[&str]) -> Vec<BookingAction> {
    let mut actions = show_selected();
    actions.push(BookingAction::Advance);
    actions.push(BookingAction::SetTicketCount {
        count: u32::try_from(seats.len()).unwrap(),
    });
    actions.extend(seats.iter().map(|id| BookingAction::ToggleSeat { seat: seat(id) }));
    actions.push(BookingAction::Advance);
    actions
}

fn rejected_with(state: &BookingState, code: &str) {
    match state.last_outcome() {
        Some(Outcome::Rejected(error)) => assert_eq!(error.code(), code),
        other => panic!("expected rejection {code}, got {other:?}"),
    }
}

// ============================================================================
// Show selection
// ============================================================================

#[test]
fn select_date_sets_date() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectDate { date: date() })
        .then_state(|state| {
            assert_eq!(state.selected_date(), Some(date()));
            assert_eq!(state.last_outcome(), Some(&Outcome::Applied));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn changing_theater_clears_showtime() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectTheater { theater_id: TheaterId::new("th1") })
        .when_action(BookingAction::SelectShowtime { showtime: "10:30 AM".to_string() })
        .when_action(BookingAction::SelectTheater { theater_id: TheaterId::new("th2") })
        .then_state(|state| {
            assert_eq!(state.selected_theater(), Some(&TheaterId::new("th2")));
            assert_eq!(state.selected_showtime(), None);
        })
        .run();
}

#[test]
fn unknown_theater_is_rejected() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectTheater { theater_id: TheaterId::new("th9") })
        .then_state(|state| {
            assert_eq!(state.selected_theater(), None);
            rejected_with(state, "unknown-theater");
            assert_eq!(state.last_notice().map(|n| n.level), Some(NoticeLevel::Error));
        })
        .run();
}

#[test]
fn showtime_requires_a_theater() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectShowtime { showtime: "10:30 AM".to_string() })
        .then_state(|state| {
            assert_eq!(state.selected_showtime(), None);
            rejected_with(state, "no-theater-selected");
        })
        .run();
}

#[test]
fn showtime_must_be_offered_by_the_theater() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectTheater { theater_id: TheaterId::new("th2") })
        .when_action(BookingAction::SelectShowtime { showtime: "10:30 AM".to_string() })
        .then_state(|state| {
            assert_eq!(state.selected_showtime(), None);
            assert_eq!(
                state.last_outcome(),
                Some(&Outcome::Rejected(BookingError::UnknownShowtime {
                    theater: TheaterId::new("th2"),
                    showtime: "10:30 AM".to_string(),
                }))
            );
        })
        .run();
}

#[test]
fn format_change_reprices_selection() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SetTicketCount { count: 2 })
        .when_action(BookingAction::ToggleSeat { seat: seat("A1") })
        .when_action(BookingAction::ToggleSeat { seat: seat("C1") })
        .when_action(BookingAction::SelectFormat { format: Format::ThreeD })
        .then_state(|state| {
            // A1 premium: 12 + 4 + 3, C1: 12 + 3
            assert_eq!(state.total_amount(), Money::from_cents(3400));
        })
        .run();
}

// ============================================================================
// Tickets and seats
// ============================================================================

#[test]
fn ticket_count_is_clamped() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SetTicketCount { count: 25 })
        .then_state(|state| {
            assert_eq!(state.ticket_count(), 10);
            assert_eq!(state.last_outcome(), Some(&Outcome::TicketCount(10)));
        })
        .run();

    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SetTicketCount { count: 0 })
        .then_state(|state| assert_eq!(state.ticket_count(), 1))
        .run();
}

#[test]
fn configured_ticket_maximum_never_exceeds_ten() {
    let mut config = BookingConfig::default();
    config.session.max_tickets = 50;
    let env = BookingEnvironment::from_config(
        Arc::new(test_clock()),
        Arc::new(StaticCatalog::demo()),
        &config,
    );
    assert_eq!(env.max_tickets(), 10);

    ReducerTest::new(BookingReducer::new())
        .with_env(env)
        .given_state(BookingState::new())
        .when_action(BookingAction::SetTicketCount { count: 50 })
        .then_state(|state| assert_eq!(state.ticket_count(), 10))
        .run();
}

#[test]
fn increment_and_decrement_stop_at_bounds() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions([
            BookingAction::DecrementTickets,
            BookingAction::IncrementTickets,
            BookingAction::IncrementTickets,
        ])
        .then_state(|state| assert_eq!(state.ticket_count(), 3))
        .run();

    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SetTicketCount { count: 10 })
        .when_action(BookingAction::IncrementTickets)
        .then_state(|state| assert_eq!(state.ticket_count(), 10))
        .run();
}

#[test]
fn lowering_ticket_count_keeps_earliest_seats() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SetTicketCount { count: 3 })
        .when_action(BookingAction::ToggleSeat { seat: seat("C3") })
        .when_action(BookingAction::ToggleSeat { seat: seat("A1") })
        .when_action(BookingAction::ToggleSeat { seat: seat("C4") })
        .when_action(BookingAction::SetTicketCount { count: 2 })
        .then_state(|state| {
            assert_eq!(state.selected_seats(), &[seat("C3"), seat("A1")]);
            assert_eq!(state.total_amount(), Money::from_cents(2800));
        })
        .run();
}

#[test]
fn booked_seat_is_ignored() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::ToggleSeat { seat: seat("A3") })
        .then_state(|state| {
            assert!(state.selected_seats().is_empty());
            assert_eq!(state.last_outcome(), Some(&Outcome::SeatIgnored(seat("A3"))));
            assert!(state.last_notice().is_none());
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn seat_outside_grid_is_rejected() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::ToggleSeat { seat: seat("H1") })
        .then_state(|state| {
            assert!(state.selected_seats().is_empty());
            rejected_with(state, "unknown-seat");
        })
        .run();
}

#[test]
fn toggling_selected_seat_deselects_it() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::ToggleSeat { seat: seat("A1") })
        .when_action(BookingAction::ToggleSeat { seat: seat("A1") })
        .then_state(|state| {
            assert!(state.selected_seats().is_empty());
            assert_eq!(state.total_amount(), Money::ZERO);
            assert_eq!(state.last_outcome(), Some(&Outcome::SeatDeselected(seat("A1"))));
        })
        .run();
}

#[test]
fn full_selection_rejects_another_seat_with_warning() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::ToggleSeat { seat: seat("A1") })
        .when_action(BookingAction::ToggleSeat { seat: seat("A2") })
        .then_state(|state| {
            assert_eq!(state.selected_seats(), &[seat("A1")]);
            assert_eq!(
                state.last_outcome(),
                Some(&Outcome::Rejected(BookingError::CapacityExceeded { ticket_count: 1 }))
            );
            assert_eq!(state.last_notice().map(|n| n.level), Some(NoticeLevel::Warning));
        })
        .run();
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn advance_lists_missing_show_fields() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SelectDate { date: date() })
        .when_action(BookingAction::Advance)
        .then_state(|state| {
            assert_eq!(state.step(), Step::ShowSelection);
            assert_eq!(
                state.last_outcome(),
                Some(&Outcome::Rejected(BookingError::IncompleteShowSelection {
                    missing: vec![ShowField::Theater, ShowField::Showtime, ShowField::Format],
                }))
            );
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn advance_with_complete_show_selection() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions(show_selected())
        .when_action(BookingAction::Advance)
        .then_state(|state| {
            assert_eq!(state.step(), Step::SeatSelection);
            assert_eq!(state.last_outcome(), Some(&Outcome::StepChanged(Step::SeatSelection)));
        })
        .run();
}

#[test]
fn advance_requires_exact_seat_count() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions(show_selected())
        .when_action(BookingAction::Advance)
        .when_action(BookingAction::SetTicketCount { count: 3 })
        .when_action(BookingAction::ToggleSeat { seat: seat("C3") })
        .when_action(BookingAction::ToggleSeat { seat: seat("C4") })
        .when_action(BookingAction::Advance)
        .then_state(|state| {
            assert_eq!(state.step(), Step::SeatSelection);
            assert_eq!(
                state.last_outcome(),
                Some(&Outcome::Rejected(BookingError::IncompleteSeatSelection {
                    required: 3,
                    selected: 2,
                }))
            );
        })
        .run();
}

#[test]
fn retreat_keeps_selections() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions(at_payment_with(&["A1"]))
        .when_action(BookingAction::Retreat)
        .when_action(BookingAction::Retreat)
        .then_state(|state| {
            assert_eq!(state.step(), Step::ShowSelection);
            assert_eq!(state.selected_seats(), &[seat("A1")]);
            assert_eq!(state.selected_showtime(), Some("10:30 AM"));
        })
        .run();
}

#[test]
fn retreat_on_first_step_is_a_no_op() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::Retreat)
        .then_state(|state| {
            assert_eq!(state.step(), Step::ShowSelection);
            assert_eq!(state.last_outcome(), Some(&Outcome::Unchanged));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

// ============================================================================
// Confirmation and reset
// ============================================================================

#[test]
fn confirmation_schedules_cancellable_reset() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions(at_payment_with(&["A1", "C1"]))
        .when_action(BookingAction::Advance)
        .then_state(|state| {
            assert_eq!(state.step(), Step::Payment);
            assert_eq!(state.last_notice().map(|n| n.level), Some(NoticeLevel::Success));

            let confirmation = state.confirmation().unwrap();
            assert_eq!(confirmation.reference, "MQ-20250301180000-A1C1");
            assert_eq!(confirmation.confirmed_at, test_clock_time());
            assert_eq!(confirmation.summary.subtotal, Money::from_cents(3800));
            assert_eq!(confirmation.summary.amount_due, Money::from_cents(4150));
            assert_eq!(confirmation.theater, Some(TheaterId::new("th1")));
        })
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_cancellable(effects, RESET_EFFECT_ID);
            let action = assertions::assert_delayed_action(effects, Duration::from_secs(2));
            assert_eq!(*action, BookingAction::ResetSession);
        })
        .run();
}

fn test_clock_time() -> chrono::DateTime<chrono::Utc> {
    use marquee_core::environment::Clock;
    test_clock().now()
}

#[test]
fn reset_delay_follows_environment() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env().with_reset_delay(Duration::from_millis(250)))
        .given_state(BookingState::new())
        .when_actions(at_payment_with(&["D5"]))
        .when_action(BookingAction::Advance)
        .then_effects(|effects| {
            assertions::assert_delayed_action(effects, Duration::from_millis(250));
        })
        .run();
}

#[test]
fn reset_restores_initial_state() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions(at_payment_with(&["A1"]))
        .when_action(BookingAction::Advance)
        .when_action(BookingAction::ResetSession)
        .then_state(|state| {
            let mut expected = BookingState::new();
            expected.last_outcome = Some(Outcome::Applied);
            assert_eq!(*state, expected);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn dismiss_notice_clears_it() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::Advance)
        .when_action(BookingAction::DismissNotice)
        .then_state(|state| {
            assert!(state.last_notice().is_none());
            assert_eq!(state.last_outcome(), Some(&Outcome::Applied));
        })
        .run();
}

#[test]
fn externally_supplied_events_are_ignored() {
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_action(BookingAction::SeatSelected { seat: seat("A3") })
        .when_action(BookingAction::SeatSelected { seat: seat("C1") })
        .when_action(BookingAction::TicketCountChanged { count: 0 })
        .when_action(BookingAction::SeatSelected { seat: seat("C3") })
        .then_state(|state| {
            assert!(state.selected_seats().is_empty());
            assert_eq!(state.ticket_count(), 1);
            assert_eq!(state.total_amount(), Money::ZERO);
            assert_eq!(state.last_outcome(), Some(&Outcome::Unchanged));
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn externally_supplied_step_and_reset_events_are_ignored() {
    let mut actions = show_selected();
    actions.push(BookingAction::StepChanged { step: Step::Payment });
    ReducerTest::new(BookingReducer::new())
        .with_env(env())
        .given_state(BookingState::new())
        .when_actions(actions)
        .when_action(BookingAction::SessionReset)
        .then_state(|state| {
            assert_eq!(state.step(), Step::ShowSelection);
            assert_eq!(state.selected_showtime(), Some("10:30 AM"));
        })
        .run();
}
