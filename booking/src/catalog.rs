//! Read-only catalog: the show, its theaters, the seat grid and booked seats.
//!
//! The catalog is immutable for the lifetime of a session and shared as
//! `Arc<dyn Catalog>` through the booking environment.

use crate::types::{Format, SeatId, TheaterId};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metadata of the show being booked
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowListing {
    /// Listing id
    pub id: String,
    /// Title
    pub title: String,
    /// Genre label
    pub genre: String,
    /// Running time in minutes
    pub duration_minutes: u16,
    /// Rating out of ten, one decimal place (e.g. `88` for 8.8)
    pub rating_tenths: u8,
    /// Director
    pub director: String,
    /// Release date
    pub release_date: NaiveDate,
    /// Synopsis
    pub description: String,
    /// Main cast
    pub cast: Vec<String>,
    /// Spoken languages
    pub languages: Vec<String>,
    /// Formats the show is projected in, in display order
    pub formats: Vec<Format>,
}

impl ShowListing {
    /// Whether the show is offered in `format`
    #[must_use]
    pub fn offers(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }
}

/// A theater with its showtimes for the show
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theater {
    /// Theater id
    pub id: TheaterId,
    /// Display name
    pub name: String,
    /// Location label
    pub location: String,
    /// Distance label, e.g. "2.5 miles"
    pub distance: String,
    /// Showtimes as displayed, e.g. "10:30 AM"
    pub showtimes: Vec<String>,
}

impl Theater {
    /// Whether `showtime` is one of this theater's showtimes
    #[must_use]
    pub fn offers(&self, showtime: &str) -> bool {
        self.showtimes.iter().any(|time| time == showtime)
    }
}

/// Rectangular seat layout with premium rows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrid {
    rows: Vec<char>,
    columns: u8,
    premium_rows: BTreeSet<char>,
}

impl SeatGrid {
    /// Creates a grid from its row letters, column count and premium rows
    ///
    /// Row letters are normalised to upper case; non-letters are dropped.
    #[must_use]
    pub fn new(
        rows: impl IntoIterator<Item = char>,
        columns: u8,
        premium_rows: impl IntoIterator<Item = char>,
    ) -> Self {
        let normalise = |row: char| row.is_ascii_alphabetic().then(|| row.to_ascii_uppercase());
        let mut seen = BTreeSet::new();
        let rows = rows
            .into_iter()
            .filter_map(normalise)
            .filter(|row| seen.insert(*row))
            .collect();
        Self {
            rows,
            columns,
            premium_rows: premium_rows.into_iter().filter_map(normalise).collect(),
        }
    }

    /// Row letters, front to back
    #[must_use]
    pub fn rows(&self) -> &[char] {
        &self.rows
    }

    /// Number of seats per row
    #[must_use]
    pub const fn columns(&self) -> u8 {
        self.columns
    }

    /// Whether the seat exists in this grid
    #[must_use]
    pub fn contains(&self, seat: &SeatId) -> bool {
        self.rows.contains(&seat.row()) && seat.column() <= self.columns
    }

    /// Whether the seat's row is premium
    #[must_use]
    pub fn is_premium(&self, seat: &SeatId) -> bool {
        self.premium_rows.contains(&seat.row())
    }

    /// Seats of one row, left to right
    pub fn row_seats(&self, row: char) -> impl Iterator<Item = SeatId> + '_ {
        let row = self.rows.iter().copied().find(|r| *r == row.to_ascii_uppercase());
        row.into_iter()
            .flat_map(move |row| (1..=self.columns).filter_map(move |column| SeatId::new(row, column).ok()))
    }

    /// Every seat, row by row
    pub fn seats(&self) -> impl Iterator<Item = SeatId> + '_ {
        self.rows.iter().flat_map(move |row| self.row_seats(*row))
    }
}

/// Seats already sold for the showing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedSeats(BTreeSet<SeatId>);

impl BookedSeats {
    /// Whether the seat is booked
    #[must_use]
    pub fn contains(&self, seat: &SeatId) -> bool {
        self.0.contains(seat)
    }

    /// Number of booked seats
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no seat is booked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Booked seats in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &SeatId> {
        self.0.iter()
    }
}

impl FromIterator<SeatId> for BookedSeats {
    fn from_iter<I: IntoIterator<Item = SeatId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How a seat is rendered on the seat map
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    /// Free to select
    Available,
    /// Part of the current selection
    Selected,
    /// Sold; cannot be selected
    Booked,
}

/// Catalog provider
///
/// Implementations are pure and synchronous.
pub trait Catalog: Send + Sync {
    /// The show being booked
    fn show(&self) -> &ShowListing;

    /// Theaters showing it
    fn theaters(&self) -> &[Theater];

    /// The seat layout
    fn seat_grid(&self) -> &SeatGrid;

    /// Seats that can never be selected
    fn booked_seats(&self) -> &BookedSeats;

    /// Look up a theater by id
    fn theater(&self, id: &TheaterId) -> Option<&Theater> {
        self.theaters().iter().find(|theater| &theater.id == id)
    }

    /// Classify a seat against the booked set and the current selection
    ///
    /// Booked wins over selected.
    fn seat_status(&self, seat: &SeatId, selection: &[SeatId]) -> SeatStatus {
        if self.booked_seats().contains(seat) {
            SeatStatus::Booked
        } else if selection.contains(seat) {
            SeatStatus::Selected
        } else {
            SeatStatus::Available
        }
    }
}

/// In-memory catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCatalog {
    show: ShowListing,
    theaters: Vec<Theater>,
    seat_grid: SeatGrid,
    booked_seats: BookedSeats,
}

impl StaticCatalog {
    /// Creates a catalog from its parts
    #[must_use]
    pub const fn new(
        show: ShowListing,
        theaters: Vec<Theater>,
        seat_grid: SeatGrid,
        booked_seats: BookedSeats,
    ) -> Self {
        Self {
            show,
            theaters,
            seat_grid,
            booked_seats,
        }
    }

    /// The demo catalog: one show, three theaters, a 6x10 grid
    #[must_use]
    pub fn demo() -> Self {
        let show = ShowListing {
            id: "dune-part-two".to_string(),
            title: "Dune: Part Two".to_string(),
            genre: "Sci-Fi, Adventure".to_string(),
            duration_minutes: 166,
            rating_tenths: 88,
            director: "Denis Villeneuve".to_string(),
            release_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
            description: "Paul Atreides unites with Chani and the Fremen while seeking \
                          revenge against the conspirators who destroyed his family."
                .to_string(),
            cast: strings(&["Timothée Chalamet", "Zendaya", "Rebecca Ferguson", "Josh Brolin"]),
            languages: strings(&["English", "Spanish", "French"]),
            formats: Format::ALL.to_vec(),
        };

        let theaters = vec![
            theater(
                "th1",
                "CineStar Multiplex",
                "Downtown",
                "2.5 miles",
                &["10:30 AM", "1:15 PM", "4:00 PM", "7:45 PM", "10:30 PM"],
            ),
            theater(
                "th2",
                "PVR Cinema",
                "Westfield Mall",
                "3.8 miles",
                &["11:00 AM", "2:30 PM", "5:15 PM", "8:00 PM", "11:15 PM"],
            ),
            theater(
                "th3",
                "INOX Cinemas",
                "City Center",
                "1.2 miles",
                &["9:45 AM", "12:30 PM", "3:45 PM", "6:30 PM", "9:15 PM"],
            ),
        ];

        let booked = [
            ('A', 3), ('A', 4),
            ('B', 5), ('B', 6), ('B', 7),
            ('C', 2), ('C', 9),
            ('D', 1), ('D', 2),
            ('E', 5), ('E', 6), ('E', 7),
            ('F', 8), ('F', 9),
        ];

        Self::new(
            show,
            theaters,
            SeatGrid::new('A'..='F', 10, ['A', 'B']),
            booked
                .into_iter()
                .filter_map(|(row, column)| SeatId::new(row, column).ok())
                .collect(),
        )
    }
}

impl Catalog for StaticCatalog {
    fn show(&self) -> &ShowListing {
        &self.show
    }

    fn theaters(&self) -> &[Theater] {
        &self.theaters
    }

    fn seat_grid(&self) -> &SeatGrid {
        &self.seat_grid
    }

    fn booked_seats(&self) -> &BookedSeats {
        &self.booked_seats
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn theater(id: &str, name: &str, location: &str, distance: &str, showtimes: &[&str]) -> Theater {
    Theater {
        id: TheaterId::new(id),
        name: name.to_string(),
        location: location.to_string(),
        distance: distance.to_string(),
        showtimes: strings(showtimes),
    }
}

/// A date offered in the date picker
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableDate {
    /// Calendar date (serialised as ISO `YYYY-MM-DD`)
    pub date: NaiveDate,
    /// Short weekday, e.g. "Sat"
    pub weekday: String,
    /// Day of month
    pub day: u32,
    /// Short month, e.g. "Mar"
    pub month: String,
}

impl From<NaiveDate> for BookableDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            date,
            weekday: date.format("%a").to_string(),
            day: date.day(),
            month: date.format("%b").to_string(),
        }
    }
}

/// The `days` consecutive dates starting at `today`
#[must_use]
pub fn upcoming_dates(today: NaiveDate, days: u32) -> Vec<BookableDate> {
    today
        .iter_days()
        .take(days as usize)
        .map(BookableDate::from)
        .collect()
}
