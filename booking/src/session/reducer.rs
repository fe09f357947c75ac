//! Reducer for the booking session.
//!
//! Commands are validated against the catalog and the current state, then
//! applied as events through [`BookingReducer::apply_event`]. A rejected
//! command applies a single `CommandRejected` event, which records a notice
//! and leaves every other field untouched. Events sent to the reducer from
//! outside are ignored, so every state change passes validation.

use crate::error::{BookingError, Notice};
use crate::pricing::{OrderSummary, compute_total};
use crate::session::actions::BookingAction;
use crate::session::environment::BookingEnvironment;
use crate::session::state::{BookingState, Confirmation, Outcome};
use crate::types::{Format, SeatId, Step, TheaterId};
use marquee_core::effect::{Effect, EffectId};
use marquee_core::reducer::Reducer;
use marquee_core::{cancellable, delay};
use smallvec::SmallVec;

/// Id of the delayed reset scheduled after a confirmed booking
pub const RESET_EFFECT_ID: &str = "booking-session-reset";

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

/// Reducer driving the booking wizard
#[derive(Clone, Copy, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Create a new booking reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Id under which the post-confirmation reset is scheduled
    #[must_use]
    pub fn reset_effect_id() -> EffectId {
        EffectId::new(RESET_EFFECT_ID)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    fn validate_theater(theater_id: &TheaterId, env: &BookingEnvironment) -> Result<(), BookingError> {
        env.catalog()
            .theater(theater_id)
            .map(|_| ())
            .ok_or_else(|| BookingError::UnknownTheater(theater_id.clone()))
    }

    fn validate_showtime(
        state: &BookingState,
        showtime: &str,
        env: &BookingEnvironment,
    ) -> Result<(), BookingError> {
        let theater_id = state
            .selected_theater
            .as_ref()
            .ok_or(BookingError::NoTheaterSelected)?;
        let offered = env
            .catalog()
            .theater(theater_id)
            .is_some_and(|theater| theater.offers(showtime));
        if offered {
            Ok(())
        } else {
            Err(BookingError::UnknownShowtime {
                theater: theater_id.clone(),
                showtime: showtime.to_string(),
            })
        }
    }

    fn validate_format(format: Format, env: &BookingEnvironment) -> Result<(), BookingError> {
        if env.catalog().show().offers(format) {
            Ok(())
        } else {
            Err(BookingError::UnknownFormat(format))
        }
    }

    fn validate_advance(state: &BookingState) -> Result<(), BookingError> {
        match state.step {
            Step::ShowSelection => {
                let missing = state.missing_show_fields();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(BookingError::IncompleteShowSelection { missing })
                }
            },
            Step::SeatSelection => {
                if state.seats_complete() {
                    Ok(())
                } else {
                    Err(BookingError::IncompleteSeatSelection {
                        required: state.ticket_count,
                        selected: state.selected_seats.len(),
                    })
                }
            },
            Step::Payment => Ok(()),
        }
    }

    // ========================================================================
    // Event application
    // ========================================================================

    /// Apply an event to the state
    ///
    /// This is the only place session data changes. Every change to the seats
    /// or the format recomputes the total.
    fn apply_event(state: &mut BookingState, event: &BookingAction, env: &BookingEnvironment) {
        match event {
            BookingAction::DateSelected { date } => {
                state.selected_date = Some(*date);
            },
            BookingAction::TheaterSelected { theater_id } => {
                state.selected_theater = Some(theater_id.clone());
                state.selected_showtime = None;
            },
            BookingAction::ShowtimeSelected { showtime } => {
                state.selected_showtime = Some(showtime.clone());
            },
            BookingAction::FormatSelected { format } => {
                state.selected_format = Some(*format);
                Self::recompute_total(state, env);
            },
            BookingAction::TicketCountChanged { count } => {
                state.ticket_count = *count;
                state.selected_seats.truncate(usize::from(*count));
                Self::recompute_total(state, env);
            },
            BookingAction::SeatSelected { seat } => {
                if !state.selected_seats.contains(seat) {
                    state.selected_seats.push(*seat);
                }
                Self::recompute_total(state, env);
            },
            BookingAction::SeatDeselected { seat } => {
                state.selected_seats.retain(|selected| selected != seat);
                Self::recompute_total(state, env);
            },
            BookingAction::StepChanged { step } => {
                state.step = *step;
            },
            BookingAction::BookingConfirmed { confirmation } => {
                state.last_notice = Some(Notice::success("Booking confirmed! Enjoy your movie."));
                state.confirmation = Some((**confirmation).clone());
            },
            BookingAction::SessionReset => {
                *state = BookingState::new();
            },
            BookingAction::NoticeDismissed => {
                state.last_notice = None;
            },
            BookingAction::CommandRejected { error } => {
                state.last_notice = Some(Notice::from(error));
            },
            // Commands are never applied directly
            BookingAction::SelectDate { .. }
            | BookingAction::SelectTheater { .. }
            | BookingAction::SelectShowtime { .. }
            | BookingAction::SelectFormat { .. }
            | BookingAction::SetTicketCount { .. }
            | BookingAction::IncrementTickets
            | BookingAction::DecrementTickets
            | BookingAction::ToggleSeat { .. }
            | BookingAction::Advance
            | BookingAction::Retreat
            | BookingAction::ResetSession
            | BookingAction::DismissNotice => {},
        }
    }

    fn recompute_total(state: &mut BookingState, env: &BookingEnvironment) {
        state.total_amount = compute_total(
            &state.selected_seats,
            state.selected_format,
            env.catalog().seat_grid(),
            env.pricing(),
        );
    }

    // ========================================================================
    // Command handling
    // ========================================================================

    fn handle_command(
        state: &mut BookingState,
        command: BookingAction,
        env: &BookingEnvironment,
        effects: &mut Effects,
    ) -> Result<Outcome, BookingError> {
        match command {
            BookingAction::SelectDate { date } => {
                Self::apply_event(state, &BookingAction::DateSelected { date }, env);
                tracing::debug!(%date, "Date selected");
                Ok(Outcome::Applied)
            },

            BookingAction::SelectTheater { theater_id } => {
                Self::validate_theater(&theater_id, env)?;
                tracing::debug!(theater = %theater_id, "Theater selected");
                Self::apply_event(state, &BookingAction::TheaterSelected { theater_id }, env);
                Ok(Outcome::Applied)
            },

            BookingAction::SelectShowtime { showtime } => {
                Self::validate_showtime(state, &showtime, env)?;
                tracing::debug!(%showtime, "Showtime selected");
                Self::apply_event(state, &BookingAction::ShowtimeSelected { showtime }, env);
                Ok(Outcome::Applied)
            },

            BookingAction::SelectFormat { format } => {
                Self::validate_format(format, env)?;
                Self::apply_event(state, &BookingAction::FormatSelected { format }, env);
                tracing::debug!(%format, total = %state.total_amount, "Format selected");
                Ok(Outcome::Applied)
            },

            BookingAction::SetTicketCount { count } => Ok(Self::change_ticket_count(state, count, env)),

            BookingAction::IncrementTickets => {
                let count = u32::from(state.ticket_count).saturating_add(1);
                Ok(Self::change_ticket_count(state, count, env))
            },

            BookingAction::DecrementTickets => {
                let count = u32::from(state.ticket_count).saturating_sub(1);
                Ok(Self::change_ticket_count(state, count, env))
            },

            BookingAction::ToggleSeat { seat } => Self::toggle_seat(state, seat, env),

            BookingAction::Advance => {
                Self::validate_advance(state)?;
                match state.step.next() {
                    Some(step) => {
                        Self::apply_event(state, &BookingAction::StepChanged { step }, env);
                        tracing::debug!(%step, "Advanced");
                        Ok(Outcome::StepChanged(step))
                    },
                    None => {
                        let confirmation = Box::new(Self::confirm(state, env));
                        tracing::info!(
                            reference = %confirmation.reference,
                            amount_due = %confirmation.summary.amount_due,
                            "Booking confirmed"
                        );
                        Self::apply_event(
                            state,
                            &BookingAction::BookingConfirmed {
                                confirmation: confirmation.clone(),
                            },
                            env,
                        );
                        effects.push(cancellable! {
                            id: RESET_EFFECT_ID,
                            effect: delay! {
                                duration: env.reset_delay(),
                                action: BookingAction::ResetSession
                            }
                        });
                        Ok(Outcome::Confirmed(confirmation))
                    },
                }
            },

            BookingAction::Retreat => match state.step.previous() {
                Some(step) => {
                    Self::apply_event(state, &BookingAction::StepChanged { step }, env);
                    tracing::debug!(%step, "Retreated");
                    Ok(Outcome::StepChanged(step))
                },
                None => Ok(Outcome::Unchanged),
            },

            BookingAction::ResetSession => {
                Self::apply_event(state, &BookingAction::SessionReset, env);
                tracing::debug!("Session reset");
                Ok(Outcome::Applied)
            },

            BookingAction::DismissNotice => {
                if state.last_notice.is_none() {
                    return Ok(Outcome::Unchanged);
                }
                Self::apply_event(state, &BookingAction::NoticeDismissed, env);
                Ok(Outcome::Applied)
            },

            // Events are filtered out by `reduce`
            _ => Ok(Outcome::Unchanged),
        }
    }

    fn change_ticket_count(state: &mut BookingState, requested: u32, env: &BookingEnvironment) -> Outcome {
        let max = env.max_tickets();
        let count = u8::try_from(requested.clamp(1, u32::from(max))).unwrap_or(max);
        if count == state.ticket_count {
            return Outcome::TicketCount(count);
        }

        let dropped = state.selected_seats.len().saturating_sub(usize::from(count));
        Self::apply_event(state, &BookingAction::TicketCountChanged { count }, env);
        tracing::debug!(ticket_count = count, dropped, "Ticket count changed");
        Outcome::TicketCount(count)
    }

    fn toggle_seat(
        state: &mut BookingState,
        seat: SeatId,
        env: &BookingEnvironment,
    ) -> Result<Outcome, BookingError> {
        let catalog = env.catalog();
        if catalog.booked_seats().contains(&seat) {
            tracing::debug!(%seat, "Ignoring booked seat");
            return Ok(Outcome::SeatIgnored(seat));
        }
        if !catalog.seat_grid().contains(&seat) {
            return Err(BookingError::UnknownSeat(seat));
        }

        if state.is_selected(&seat) {
            Self::apply_event(state, &BookingAction::SeatDeselected { seat }, env);
            tracing::debug!(%seat, total = %state.total_amount, "Seat deselected");
            return Ok(Outcome::SeatDeselected(seat));
        }

        if state.selected_seats.len() >= usize::from(state.ticket_count) {
            return Err(BookingError::CapacityExceeded {
                ticket_count: state.ticket_count,
            });
        }

        Self::apply_event(state, &BookingAction::SeatSelected { seat }, env);
        tracing::debug!(%seat, total = %state.total_amount, "Seat selected");
        Ok(Outcome::SeatSelected(seat))
    }

    fn confirm(state: &BookingState, env: &BookingEnvironment) -> Confirmation {
        let confirmed_at = env.clock().now();
        let seats: String = state.selected_seats.iter().map(ToString::to_string).collect();
        Confirmation {
            reference: format!("MQ-{}-{seats}", confirmed_at.format("%Y%m%d%H%M%S")),
            confirmed_at,
            date: state.selected_date,
            theater: state.selected_theater.clone(),
            showtime: state.selected_showtime.clone(),
            format: state.selected_format,
            summary: OrderSummary::new(
                &state.selected_seats,
                state.selected_format,
                env.catalog().seat_grid(),
                env.pricing(),
            ),
        }
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[tracing::instrument(
        skip_all,
        fields(action = action.name(), step = %state.step, ticket_count = state.ticket_count)
    )]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        // Events only originate from validated commands
        if action.is_event() {
            tracing::warn!(event = action.name(), "Ignoring externally supplied event");
            state.last_outcome = Some(Outcome::Unchanged);
            return SmallVec::new();
        }

        let mut effects = Effects::new();
        let outcome = match Self::handle_command(state, action, env, &mut effects) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::info!(code = error.code(), %error, "Command rejected");
                Self::apply_event(
                    state,
                    &BookingAction::CommandRejected {
                        error: error.clone(),
                    },
                    env,
                );
                Outcome::Rejected(error)
            },
        };
        state.last_outcome = Some(outcome);
        effects
    }
}
