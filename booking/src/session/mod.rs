//! Booking session: the wizard state machine.
//!
//! # Architecture
//!
//! ```text
//! Presentation → BookingStore method
//!                 ↓
//!                 BookingAction command
//!                 ↓
//! BookingReducer validates against catalog + state
//!                 ↓
//!                 events applied through apply_event (total recomputed)
//!                 ↓
//!                 Outcome recorded, read back under the same lock
//!                 ↓
//! Confirmation → cancellable Delay → ResetSession
//! ```
//!
//! The session moves through `ShowSelection → SeatSelection → Payment`.
//! Advancing from the payment step confirms the booking; the session then
//! resets to its initial state after the configured delay.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod state;
pub mod store;
#[cfg(test)]
mod tests;

pub use actions::BookingAction;
pub use environment::BookingEnvironment;
pub use reducer::{BookingReducer, RESET_EFFECT_ID};
pub use state::{BookingState, Confirmation, Outcome};
pub use store::{BookingStore, SeatToggle, StepChange};
