//! Booking session state.

use crate::catalog::Catalog;
use crate::error::{BookingError, Notice};
use crate::pricing::{OrderSummary, PriceSchedule};
use crate::types::{Format, Money, SeatId, ShowField, Step, TheaterId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Receipt of a confirmed booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Booking reference shown to the customer
    pub reference: String,
    /// When the booking was confirmed
    pub confirmed_at: DateTime<Utc>,
    /// Date of the showing
    pub date: Option<NaiveDate>,
    /// Theater
    pub theater: Option<TheaterId>,
    /// Showtime
    pub showtime: Option<String>,
    /// Format
    pub format: Option<Format>,
    /// Priced order
    pub summary: OrderSummary,
}

/// Result of the most recent command, read back by the store facade
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The command was applied
    Applied,
    /// The command changed nothing
    Unchanged,
    /// Seat added to the selection
    SeatSelected(SeatId),
    /// Seat removed from the selection
    SeatDeselected(SeatId),
    /// Booked seat; the toggle was ignored
    SeatIgnored(SeatId),
    /// Ticket count after the command
    TicketCount(u8),
    /// Step after a navigation command
    StepChanged(Step),
    /// Booking confirmed
    Confirmed(Box<Confirmation>),
    /// The command was rejected
    Rejected(BookingError),
}

/// State of one booking session
///
/// Fields are changed only by the booking reducer; read them through the
/// accessors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingState {
    pub(crate) step: Step,
    pub(crate) selected_date: Option<NaiveDate>,
    pub(crate) selected_theater: Option<TheaterId>,
    pub(crate) selected_showtime: Option<String>,
    pub(crate) selected_format: Option<Format>,
    pub(crate) ticket_count: u8,
    pub(crate) selected_seats: Vec<SeatId>,
    pub(crate) total_amount: Money,
    pub(crate) last_notice: Option<Notice>,
    pub(crate) last_outcome: Option<Outcome>,
    pub(crate) confirmation: Option<Confirmation>,
}

impl Default for BookingState {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingState {
    /// A fresh session on the first step with one ticket
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: Step::ShowSelection,
            selected_date: None,
            selected_theater: None,
            selected_showtime: None,
            selected_format: None,
            ticket_count: 1,
            selected_seats: Vec::new(),
            total_amount: Money::ZERO,
            last_notice: None,
            last_outcome: None,
            confirmation: None,
        }
    }

    /// Current wizard step
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Selected date
    #[must_use]
    pub const fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Selected theater
    #[must_use]
    pub const fn selected_theater(&self) -> Option<&TheaterId> {
        self.selected_theater.as_ref()
    }

    /// Selected showtime
    #[must_use]
    pub fn selected_showtime(&self) -> Option<&str> {
        self.selected_showtime.as_deref()
    }

    /// Selected format
    #[must_use]
    pub const fn selected_format(&self) -> Option<Format> {
        self.selected_format
    }

    /// Number of tickets
    #[must_use]
    pub const fn ticket_count(&self) -> u8 {
        self.ticket_count
    }

    /// Selected seats in selection order
    #[must_use]
    pub fn selected_seats(&self) -> &[SeatId] {
        &self.selected_seats
    }

    /// Sum of the selected seats' prices
    #[must_use]
    pub const fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Most recent notice for the user
    #[must_use]
    pub const fn last_notice(&self) -> Option<&Notice> {
        self.last_notice.as_ref()
    }

    /// Result of the most recent command
    #[must_use]
    pub const fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Receipt of the confirmed booking, until the session resets
    #[must_use]
    pub const fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Whether the seat is in the selection
    #[must_use]
    pub fn is_selected(&self, seat: &SeatId) -> bool {
        self.selected_seats.contains(seat)
    }

    /// Show-selection fields still missing, in wizard order
    #[must_use]
    pub fn missing_show_fields(&self) -> Vec<ShowField> {
        [
            (ShowField::Date, self.selected_date.is_some()),
            (ShowField::Theater, self.selected_theater.is_some()),
            (ShowField::Showtime, self.selected_showtime.is_some()),
            (ShowField::Format, self.selected_format.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, set)| (!set).then_some(field))
        .collect()
    }

    /// Whether the selection matches the ticket count
    #[must_use]
    pub fn seats_complete(&self) -> bool {
        self.selected_seats.len() == usize::from(self.ticket_count)
    }

    /// Priced order for the current selection
    #[must_use]
    pub fn order_summary(&self, catalog: &dyn Catalog, schedule: &PriceSchedule) -> OrderSummary {
        OrderSummary::new(
            &self.selected_seats,
            self.selected_format,
            catalog.seat_grid(),
            schedule,
        )
    }
}
