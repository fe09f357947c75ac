//! Ticket pricing.
//!
//! A seat costs the base fare, plus the premium surcharge when its row is
//! premium, plus the surcharge of the selected format. The booking fee is
//! charged once per order and is not part of the seat total.

use crate::catalog::SeatGrid;
use crate::types::{Format, Money, SeatId};
use serde::{Deserialize, Serialize};

/// Fares and surcharges used to price a selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    /// Price of a regular seat in 2D
    pub base_fare: Money,
    /// Added for seats in premium rows
    pub premium_surcharge: Money,
    /// Added per seat for 3D showings
    pub three_d_surcharge: Money,
    /// Added per seat for IMAX showings
    pub imax_surcharge: Money,
    /// Flat fee per order
    pub booking_fee: Money,
}

impl Default for PriceSchedule {
    fn default() -> Self {
        Self {
            base_fare: Money::from_cents(1200),
            premium_surcharge: Money::from_cents(400),
            three_d_surcharge: Money::from_cents(300),
            imax_surcharge: Money::from_cents(500),
            booking_fee: Money::from_cents(350),
        }
    }
}

impl PriceSchedule {
    /// Per-seat surcharge for a format; nothing when no format is chosen yet
    #[must_use]
    pub const fn format_surcharge(&self, format: Option<Format>) -> Money {
        match format {
            Some(Format::Imax) => self.imax_surcharge,
            Some(Format::ThreeD) => self.three_d_surcharge,
            Some(Format::TwoD) | None => Money::ZERO,
        }
    }

    /// Price of one seat
    #[must_use]
    pub fn seat_price(&self, seat: &SeatId, format: Option<Format>, grid: &SeatGrid) -> Money {
        let premium = if grid.is_premium(seat) {
            self.premium_surcharge
        } else {
            Money::ZERO
        };
        self.base_fare + premium + self.format_surcharge(format)
    }
}

/// Sum of the seat prices of a selection
#[must_use]
pub fn compute_total(
    seats: &[SeatId],
    format: Option<Format>,
    grid: &SeatGrid,
    schedule: &PriceSchedule,
) -> Money {
    seats
        .iter()
        .map(|seat| schedule.seat_price(seat, format, grid))
        .sum()
}

/// One priced seat of an order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatLine {
    /// The seat
    pub seat: SeatId,
    /// Whether the premium surcharge applies
    pub premium: bool,
    /// Price of the seat
    pub price: Money,
}

/// What the payment step shows: seats, subtotal, fee and amount due
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Priced seats in selection order
    pub lines: Vec<SeatLine>,
    /// Sum of seat prices
    pub subtotal: Money,
    /// Flat booking fee
    pub booking_fee: Money,
    /// Subtotal plus booking fee
    pub amount_due: Money,
}

impl OrderSummary {
    /// Price a selection
    #[must_use]
    pub fn new(
        seats: &[SeatId],
        format: Option<Format>,
        grid: &SeatGrid,
        schedule: &PriceSchedule,
    ) -> Self {
        let lines: Vec<SeatLine> = seats
            .iter()
            .map(|seat| SeatLine {
                seat: *seat,
                premium: grid.is_premium(seat),
                price: schedule.seat_price(seat, format, grid),
            })
            .collect();
        let subtotal = lines.iter().map(|line| line.price).sum();
        Self {
            lines,
            subtotal,
            booking_fee: schedule.booking_fee,
            amount_due: subtotal + schedule.booking_fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, StaticCatalog};

    #[allow(clippy::unwrap_used)] // Test code
    fn seats(ids: &[&str]) -> Vec<SeatId> {
        ids.iter().map(|id| id.parse().unwrap()).collect()
    }

    #[test]
    fn seat_price_stacks_surcharges() {
        let catalog = StaticCatalog::demo();
        let grid = catalog.seat_grid();
        let schedule = PriceSchedule::default();
        let a1 = seats(&["A1"])[0];
        let c1 = seats(&["C1"])[0];

        assert_eq!(schedule.seat_price(&c1, None, grid), Money::from_cents(1200));
        assert_eq!(schedule.seat_price(&c1, Some(Format::TwoD), grid), Money::from_cents(1200));
        assert_eq!(schedule.seat_price(&c1, Some(Format::ThreeD), grid), Money::from_cents(1500));
        assert_eq!(schedule.seat_price(&a1, Some(Format::ThreeD), grid), Money::from_cents(1900));
        assert_eq!(schedule.seat_price(&a1, Some(Format::Imax), grid), Money::from_cents(2100));
    }

    #[test]
    fn total_of_premium_and_regular_in_imax() {
        let catalog = StaticCatalog::demo();
        let total = compute_total(
            &seats(&["A1", "C1"]),
            Some(Format::Imax),
            catalog.seat_grid(),
            &PriceSchedule::default(),
        );
        assert_eq!(total, Money::from_cents(3800));
    }

    #[test]
    fn empty_selection_costs_nothing() {
        let catalog = StaticCatalog::demo();
        let total = compute_total(&[], Some(Format::Imax), catalog.seat_grid(), &PriceSchedule::default());
        assert_eq!(total, Money::ZERO);
    }

    #[test]
    fn order_summary_adds_booking_fee() {
        let catalog = StaticCatalog::demo();
        let summary = OrderSummary::new(
            &seats(&["B1", "D5"]),
            Some(Format::TwoD),
            catalog.seat_grid(),
            &PriceSchedule::default(),
        );
        assert_eq!(summary.lines.len(), 2);
        assert!(summary.lines[0].premium);
        assert!(!summary.lines[1].premium);
        assert_eq!(summary.subtotal, Money::from_cents(2800));
        assert_eq!(summary.booking_fee, Money::from_cents(350));
        assert_eq!(summary.amount_due.to_string(), "$31.50");
    }
}
