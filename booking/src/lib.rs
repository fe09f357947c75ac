//! # Marquee Booking
//!
//! Cinema seat booking: a three-step wizard that selects a showing, reserves
//! seats against a fixed inventory and prices the order.
//!
//! - [`catalog`]: the show, theaters, seat grid and booked seats
//! - [`pricing`]: per-seat prices, totals and the order summary
//! - [`session`]: the booking reducer, its state and the [`BookingStore`] facade
//! - [`config`]: environment-driven configuration
//!
//! ## Example
//!
//! ```no_run
//! use marquee_booking::{BookingEnvironment, BookingStore, Format, StaticCatalog, TheaterId};
//! use marquee_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), marquee_booking::SessionError> {
//! let env = BookingEnvironment::new(Arc::new(SystemClock), Arc::new(StaticCatalog::demo()));
//! let store = BookingStore::new(env);
//!
//! store.select_theater(TheaterId::new("th1")).await?;
//! store.select_showtime("10:30 AM").await?;
//! store.select_format(Format::Imax).await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod pricing;
pub mod session;
pub mod types;

pub use catalog::{
    BookableDate, BookedSeats, Catalog, SeatGrid, SeatStatus, ShowListing, StaticCatalog, Theater,
    upcoming_dates,
};
pub use config::{BookingConfig, TICKET_LIMIT};
pub use error::{BookingError, Notice, NoticeLevel, SessionError};
pub use pricing::{OrderSummary, PriceSchedule, compute_total};
pub use session::{
    BookingAction, BookingEnvironment, BookingReducer, BookingState, BookingStore, Confirmation,
    Outcome, SeatToggle, StepChange,
};
pub use types::{Format, FormatError, Money, SeatId, SeatIdError, ShowField, Step, TheaterId};
