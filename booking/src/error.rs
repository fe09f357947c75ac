//! Rejections returned to the presentation layer.

use crate::types::{Format, SeatId, ShowField, TheaterId};
use marquee_runtime::error::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a booking command was rejected
///
/// Rejections are soft: the session is left exactly as it was, apart from the
/// notice describing the rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingError {
    /// Selecting another seat would exceed the ticket count
    #[error("You can only select {ticket_count} seats. Deselect a seat first.")]
    CapacityExceeded {
        /// Current ticket count
        ticket_count: u8,
    },

    /// Date, theater, showtime or format is missing
    #[error("Please select all required booking details (missing: {})", join(.missing))]
    IncompleteShowSelection {
        /// Missing fields, in wizard order
        missing: Vec<ShowField>,
    },

    /// The selection does not match the ticket count
    #[error("Please select exactly {required} seats ({selected} selected)")]
    IncompleteSeatSelection {
        /// Ticket count
        required: u8,
        /// Seats currently selected
        selected: usize,
    },

    /// The theater is not in the catalog
    #[error("Unknown theater '{0}'")]
    UnknownTheater(TheaterId),

    /// A showtime was chosen before a theater
    #[error("Select a theater before choosing a showtime")]
    NoTheaterSelected,

    /// The selected theater does not offer the showtime
    #[error("{showtime} is not offered at theater '{theater}'")]
    UnknownShowtime {
        /// Selected theater
        theater: TheaterId,
        /// Requested showtime
        showtime: String,
    },

    /// The show is not projected in the format
    #[error("{0} is not available for this show")]
    UnknownFormat(Format),

    /// The seat is not part of the grid
    #[error("Seat {0} does not exist")]
    UnknownSeat(SeatId),
}

fn join(fields: &[ShowField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl BookingError {
    /// Stable reason code for the presentation layer
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "capacity-exceeded",
            Self::IncompleteShowSelection { .. } => "missing-show-fields",
            Self::IncompleteSeatSelection { .. } => "incomplete-seat-selection",
            Self::UnknownTheater(_) => "unknown-theater",
            Self::NoTheaterSelected => "no-theater-selected",
            Self::UnknownShowtime { .. } => "unknown-showtime",
            Self::UnknownFormat(_) => "unknown-format",
            Self::UnknownSeat(_) => "unknown-seat",
        }
    }

    /// Severity of the notice shown for this rejection
    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::CapacityExceeded { .. } => NoticeLevel::Warning,
            _ => NoticeLevel::Error,
        }
    }
}

/// Error returned by [`BookingStore`](crate::session::BookingStore) operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// The command was rejected by the session
    #[error(transparent)]
    Rejected(#[from] BookingError),

    /// The store could not accept the command
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// The rejection, if this is one
    #[must_use]
    pub const fn rejection(&self) -> Option<&BookingError> {
        match self {
            Self::Rejected(error) => Some(error),
            Self::Store(_) => None,
        }
    }
}

/// Severity of a user-visible notice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Completed successfully
    Success,
    /// Soft rejection the user can fix
    Warning,
    /// Invalid request
    Error,
}

/// The most recent message for the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Message text
    pub message: String,
    /// Reason code for rejections
    pub code: Option<String>,
}

impl Notice {
    /// A success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            code: None,
        }
    }
}

impl From<&BookingError> for Notice {
    fn from(error: &BookingError) -> Self {
        Self {
            level: error.level(),
            message: error.to_string(),
            code: Some(error.code().to_string()),
        }
    }
}
