//! Value objects shared by the catalog, pricing and session modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Money (cents-based to avoid floating point errors)
// ============================================================================

/// An amount of money in cents
///
/// Arithmetic saturates instead of overflowing; booking amounts never get
/// anywhere near `u64::MAX` cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Zero dollars
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Adds two amounts, saturating at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.saturating_add(other)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Seat identifiers
// ============================================================================

/// Errors produced when parsing a [`SeatId`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeatIdError {
    /// The input was empty
    #[error("seat id is empty")]
    Empty,

    /// The row is not a letter `A`..`Z`
    #[error("invalid seat row '{0}': expected a letter A-Z")]
    InvalidRow(char),

    /// The column is missing, zero or not a number
    #[error("invalid seat column '{0}': expected a positive number")]
    InvalidColumn(String),
}

/// A seat identifier: row letter followed by a 1-based column, e.g. `C10`
///
/// Ordering is row-major, which is also the order seats are rendered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeatId {
    row: char,
    column: u8,
}

impl SeatId {
    /// Creates a seat id, normalising the row to upper case
    ///
    /// # Errors
    ///
    /// Returns [`SeatIdError::InvalidRow`] if `row` is not an ASCII letter and
    /// [`SeatIdError::InvalidColumn`] if `column` is zero.
    pub const fn new(row: char, column: u8) -> Result<Self, SeatIdError> {
        if !row.is_ascii_alphabetic() {
            return Err(SeatIdError::InvalidRow(row));
        }
        if column == 0 {
            return Err(SeatIdError::InvalidColumn(String::new()));
        }
        Ok(Self {
            row: row.to_ascii_uppercase(),
            column,
        })
    }

    /// Row letter (upper case)
    #[must_use]
    pub const fn row(&self) -> char {
        self.row
    }

    /// 1-based column number
    #[must_use]
    pub const fn column(&self) -> u8 {
        self.column
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column)
    }
}

impl FromStr for SeatId {
    type Err = SeatIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let row = chars.next().ok_or(SeatIdError::Empty)?;
        let rest = chars.as_str();
        if !row.is_ascii_alphabetic() {
            return Err(SeatIdError::InvalidRow(row));
        }
        // `u8::from_str` accepts a leading '+', which is not a valid seat column.
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SeatIdError::InvalidColumn(rest.to_string()));
        }
        let column = rest
            .parse::<u8>()
            .map_err(|_| SeatIdError::InvalidColumn(rest.to_string()))?;
        if column == 0 {
            return Err(SeatIdError::InvalidColumn(rest.to_string()));
        }
        Self::new(row, column)
    }
}

impl TryFrom<String> for SeatId {
    type Error = SeatIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatId> for String {
    fn from(seat: SeatId) -> Self {
        seat.to_string()
    }
}

// ============================================================================
// Presentation format
// ============================================================================

/// Error produced when parsing a [`Format`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown format '{0}': expected 2D, 3D or IMAX")]
pub struct FormatError(pub String);

/// Presentation format of a showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Format {
    /// Standard projection
    #[serde(rename = "2D")]
    TwoD,
    /// Stereoscopic projection
    #[serde(rename = "3D")]
    ThreeD,
    /// Large-format projection
    #[serde(rename = "IMAX")]
    Imax,
}

impl Format {
    /// Every format, in display order
    pub const ALL: [Self; 3] = [Self::TwoD, Self::ThreeD, Self::Imax];

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoD => "2D",
            Self::ThreeD => "3D",
            Self::Imax => "IMAX",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Format {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FormatError(s.to_string()))
    }
}

// ============================================================================
// Theater ids
// ============================================================================

/// Identifier of a theater in the catalog, e.g. `th1`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheaterId(String);

impl TheaterId {
    /// Creates a theater id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TheaterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Wizard steps
// ============================================================================

/// A phase of the booking wizard
///
/// Steps are ordered; navigation only ever moves to an adjacent step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    /// Date, theater, showtime and format
    #[default]
    ShowSelection,
    /// Ticket count and seats
    SeatSelection,
    /// Order summary and confirmation
    Payment,
}

impl Step {
    /// The step after this one, `None` for the terminal step
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::ShowSelection => Some(Self::SeatSelection),
            Self::SeatSelection => Some(Self::Payment),
            Self::Payment => None,
        }
    }

    /// The step before this one, `None` for the first step
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::ShowSelection => None,
            Self::SeatSelection => Some(Self::ShowSelection),
            Self::Payment => Some(Self::SeatSelection),
        }
    }

    /// 1-based position, as shown in the progress indicator
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::ShowSelection => 1,
            Self::SeatSelection => 2,
            Self::Payment => 3,
        }
    }

    /// Heading shown for the step
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::ShowSelection => "Select Show",
            Self::SeatSelection => "Choose Seats",
            Self::Payment => "Payment",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A show-selection field required before leaving the first step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowField {
    /// Calendar date
    Date,
    /// Theater
    Theater,
    /// Showtime at the theater
    Showtime,
    /// Presentation format
    Format,
}

impl fmt::Display for ShowField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "date",
            Self::Theater => "theater",
            Self::Showtime => "showtime",
            Self::Format => "format",
        })
    }
}
