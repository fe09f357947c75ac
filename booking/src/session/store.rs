//! Store facade for the presentation layer.

use crate::catalog::SeatStatus;
use crate::error::SessionError;
use crate::pricing::OrderSummary;
use crate::session::actions::BookingAction;
use crate::session::environment::BookingEnvironment;
use crate::session::reducer::BookingReducer;
use crate::session::state::{BookingState, Confirmation, Outcome};
use crate::types::{Format, SeatId, Step, TheaterId};
use chrono::NaiveDate;
use marquee_runtime::error::StoreError;
use marquee_runtime::store::Store;
use std::time::Duration;
use tokio::sync::broadcast;

type SessionStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

/// Result of toggling a seat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeatToggle {
    /// The seat was added to the selection
    Selected,
    /// The seat was removed from the selection
    Deselected,
    /// The seat is booked; nothing changed
    Ignored,
}

/// Result of advancing the wizard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepChange {
    /// Moved to the given step
    Advanced(Step),
    /// Booking confirmed on the payment step; the session resets after the
    /// configured delay
    Confirmed(Box<Confirmation>),
}

/// Booking session driven through the runtime store
///
/// Each method sends one command and reports its outcome. The outcome is
/// read under the lock the reducer ran under, so concurrent callers cannot
/// observe each other's intermediate state.
#[derive(Clone)]
pub struct BookingStore {
    store: SessionStore,
    environment: BookingEnvironment,
}

impl BookingStore {
    /// Create a store holding a fresh session
    #[must_use]
    pub fn new(environment: BookingEnvironment) -> Self {
        Self {
            store: Store::new(BookingState::new(), BookingReducer::new(), environment.clone()),
            environment,
        }
    }

    async fn dispatch(&self, action: BookingAction) -> Result<Outcome, StoreError> {
        let (_handle, outcome) = self
            .store
            .send_then(action, |state| {
                state.last_outcome().cloned().unwrap_or(Outcome::Unchanged)
            })
            .await?;
        Ok(outcome)
    }

    async fn dispatch_checked(&self, action: BookingAction) -> Result<Outcome, SessionError> {
        match self.dispatch(action).await? {
            Outcome::Rejected(error) => Err(error.into()),
            outcome => Ok(outcome),
        }
    }

    /// Select the date of the showing
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn select_date(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.dispatch_checked(BookingAction::SelectDate { date }).await.map(|_| ())
    }

    /// Select a theater; the showtime is cleared
    ///
    /// # Errors
    ///
    /// Returns `BookingError::UnknownTheater` for ids not in the catalog.
    pub async fn select_theater(&self, theater_id: TheaterId) -> Result<(), SessionError> {
        self.dispatch_checked(BookingAction::SelectTheater { theater_id })
            .await
            .map(|_| ())
    }

    /// Select a showtime of the selected theater
    ///
    /// # Errors
    ///
    /// Returns `BookingError::NoTheaterSelected` or
    /// `BookingError::UnknownShowtime`.
    pub async fn select_showtime(&self, showtime: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch_checked(BookingAction::SelectShowtime {
            showtime: showtime.into(),
        })
        .await
        .map(|_| ())
    }

    /// Select the presentation format
    ///
    /// # Errors
    ///
    /// Returns `BookingError::UnknownFormat` if the show is not projected in it.
    pub async fn select_format(&self, format: Format) -> Result<(), SessionError> {
        self.dispatch_checked(BookingAction::SelectFormat { format })
            .await
            .map(|_| ())
    }

    /// Set the ticket count (clamped) and return the resulting count
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn set_ticket_count(&self, count: u32) -> Result<u8, SessionError> {
        let outcome = self.dispatch_checked(BookingAction::SetTicketCount { count }).await?;
        Ok(self.ticket_count_from(outcome).await)
    }

    /// Add one ticket and return the resulting count
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn increment_tickets(&self) -> Result<u8, SessionError> {
        let outcome = self.dispatch_checked(BookingAction::IncrementTickets).await?;
        Ok(self.ticket_count_from(outcome).await)
    }

    /// Remove one ticket and return the resulting count
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn decrement_tickets(&self) -> Result<u8, SessionError> {
        let outcome = self.dispatch_checked(BookingAction::DecrementTickets).await?;
        Ok(self.ticket_count_from(outcome).await)
    }

    async fn ticket_count_from(&self, outcome: Outcome) -> u8 {
        match outcome {
            Outcome::TicketCount(count) => count,
            _ => self.store.state(BookingState::ticket_count).await,
        }
    }

    /// Select or deselect a seat
    ///
    /// # Errors
    ///
    /// Returns `BookingError::CapacityExceeded` when the selection is full
    /// and `BookingError::UnknownSeat` for seats outside the grid.
    pub async fn toggle_seat(&self, seat: SeatId) -> Result<SeatToggle, SessionError> {
        Ok(match self.dispatch_checked(BookingAction::ToggleSeat { seat }).await? {
            Outcome::SeatSelected(_) => SeatToggle::Selected,
            Outcome::SeatDeselected(_) => SeatToggle::Deselected,
            _ => SeatToggle::Ignored,
        })
    }

    /// Move to the next step, or confirm the booking on the payment step
    ///
    /// # Errors
    ///
    /// Returns `BookingError::IncompleteShowSelection` or
    /// `BookingError::IncompleteSeatSelection` when the current step is not
    /// complete.
    pub async fn advance(&self) -> Result<StepChange, SessionError> {
        match self.dispatch_checked(BookingAction::Advance).await? {
            Outcome::Confirmed(confirmation) => Ok(StepChange::Confirmed(confirmation)),
            Outcome::StepChanged(step) => Ok(StepChange::Advanced(step)),
            _ => Ok(StepChange::Advanced(self.store.state(BookingState::step).await)),
        }
    }

    /// Move to the previous step; `None` on the first step
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn retreat(&self) -> Result<Option<Step>, SessionError> {
        match self.dispatch_checked(BookingAction::Retreat).await? {
            Outcome::StepChanged(step) => Ok(Some(step)),
            _ => Ok(None),
        }
    }

    /// Restore the initial session and drop any scheduled reset
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.cancel_scheduled_reset();
        self.dispatch_checked(BookingAction::ResetSession).await.map(|_| ())
    }

    /// Clear the current notice
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store is shutting down.
    pub async fn dismiss_notice(&self) -> Result<(), SessionError> {
        self.dispatch_checked(BookingAction::DismissNotice).await.map(|_| ())
    }

    /// Cancel the reset scheduled by a confirmation
    ///
    /// Returns `true` if a reset was pending.
    pub fn cancel_scheduled_reset(&self) -> bool {
        self.store.cancel(&BookingReducer::reset_effect_id())
    }

    /// Whether a reset is scheduled
    #[must_use]
    pub fn reset_scheduled(&self) -> bool {
        self.store.is_scheduled(&BookingReducer::reset_effect_id())
    }

    /// Clone of the current session
    pub async fn snapshot(&self) -> BookingState {
        self.store.state(BookingState::clone).await
    }

    /// Priced order for the current selection
    pub async fn order_summary(&self) -> OrderSummary {
        self.store
            .state(|state| state.order_summary(self.environment.catalog(), self.environment.pricing()))
            .await
    }

    /// Seat map rows with each seat's status
    pub async fn seat_map(&self) -> Vec<(char, Vec<(SeatId, SeatStatus)>)> {
        let catalog = self.environment.catalog();
        self.store
            .state(|state| {
                let grid = catalog.seat_grid();
                grid.rows()
                    .iter()
                    .map(|row| {
                        let seats = grid
                            .row_seats(*row)
                            .map(|seat| (seat, catalog.seat_status(&seat, state.selected_seats())))
                            .collect();
                        (*row, seats)
                    })
                    .collect()
            })
            .await
    }

    /// Actions dispatched by effects, such as the delayed reset
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingAction> {
        self.store.subscribe_actions()
    }

    /// Environment the session runs with
    #[must_use]
    pub const fn environment(&self) -> &BookingEnvironment {
        &self.environment
    }

    /// Stop accepting commands and wait for running effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }
}
