//! Actions of the booking session.

use crate::error::BookingError;
use crate::session::state::Confirmation;
use crate::types::{Format, SeatId, Step, TheaterId};
use chrono::NaiveDate;
use marquee_macros::Action;
use serde::{Deserialize, Serialize};

/// Everything the booking reducer understands
///
/// Commands are intents from the presentation layer; they are validated and
/// turned into events. Events are the only thing that changes session data.
#[derive(Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BookingAction {
    // Commands
    /// Pick the calendar date
    #[command]
    SelectDate {
        /// Date of the showing
        date: NaiveDate,
    },

    /// Pick a theater; clears the showtime
    #[command]
    SelectTheater {
        /// Theater id from the catalog
        theater_id: TheaterId,
    },

    /// Pick one of the selected theater's showtimes
    #[command]
    SelectShowtime {
        /// Showtime as displayed by the theater
        showtime: String,
    },

    /// Pick the presentation format
    #[command]
    SelectFormat {
        /// Format offered by the show
        format: Format,
    },

    /// Set the ticket count, clamped to the allowed range
    #[command]
    SetTicketCount {
        /// Requested count
        count: u32,
    },

    /// Add one ticket
    #[command]
    IncrementTickets,

    /// Remove one ticket
    #[command]
    DecrementTickets,

    /// Select or deselect a seat
    #[command]
    ToggleSeat {
        /// Seat to toggle
        seat: SeatId,
    },

    /// Move to the next step, or confirm the booking on the payment step
    #[command]
    Advance,

    /// Move to the previous step
    #[command]
    Retreat,

    /// Restore the initial session
    #[command]
    ResetSession,

    /// Clear the current notice
    #[command]
    DismissNotice,

    // Events
    /// Date was selected
    #[event]
    DateSelected {
        /// Selected date
        date: NaiveDate,
    },

    /// Theater was selected and the showtime cleared
    #[event]
    TheaterSelected {
        /// Selected theater
        theater_id: TheaterId,
    },

    /// Showtime was selected
    #[event]
    ShowtimeSelected {
        /// Selected showtime
        showtime: String,
    },

    /// Format was selected
    #[event]
    FormatSelected {
        /// Selected format
        format: Format,
    },

    /// Ticket count changed; the selection is truncated to fit
    #[event]
    TicketCountChanged {
        /// New ticket count
        count: u8,
    },

    /// Seat was added to the selection
    #[event]
    SeatSelected {
        /// Selected seat
        seat: SeatId,
    },

    /// Seat was removed from the selection
    #[event]
    SeatDeselected {
        /// Deselected seat
        seat: SeatId,
    },

    /// Wizard moved to another step
    #[event]
    StepChanged {
        /// New step
        step: Step,
    },

    /// Booking was confirmed
    #[event]
    BookingConfirmed {
        /// Receipt
        confirmation: Box<Confirmation>,
    },

    /// Session returned to its initial state
    #[event]
    SessionReset,

    /// Notice was cleared
    #[event]
    NoticeDismissed,

    /// A command was rejected
    #[event]
    CommandRejected {
        /// Reason
        error: BookingError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_and_events_are_classified() {
        assert!(BookingAction::Advance.is_command());
        assert!(!BookingAction::Advance.is_event());
        assert!(BookingAction::SessionReset.is_event());
        assert!(
            BookingAction::CommandRejected { error: BookingError::NoTheaterSelected }.is_event()
        );
        assert_eq!(BookingAction::DismissNotice.name(), "DismissNotice");
    }

    #[test]
    #[allow(clippy::unwrap_used)] // Test code
    fn actions_round_trip_through_json() {
        let action = BookingAction::ToggleSeat { seat: "b4".parse().unwrap() };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"ToggleSeat":{"seat":"B4"}}"#);
        let back: BookingAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }
}
