//! Configuration management for the booking service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Invalid values fall back to the default instead of failing.

use crate::pricing::PriceSchedule;
use crate::types::Money;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Booking configuration loaded from environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Fares and fees
    pub pricing: PriceSchedule,
    /// Session behaviour
    pub session: SessionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Largest ticket count a single booking can hold
pub const TICKET_LIMIT: u8 = 10;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound of the ticket count, within `1..=TICKET_LIMIT`
    pub max_tickets: u8,
    /// Delay between a confirmed booking and the session reset, in milliseconds
    pub reset_delay_ms: u64,
    /// Number of dates offered by the date picker, starting today
    pub bookable_days: u32,
}

impl SessionConfig {
    /// Reset delay as a `Duration`
    #[must_use]
    pub const fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_tickets: TICKET_LIMIT,
            reset_delay_ms: 2000,
            bookable_days: 7,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "marquee_booking=debug,marquee_runtime=info".to_string(),
        }
    }
}

impl BookingConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MARQUEE_BASE_FARE_CENTS`: Regular seat price (default: 1200)
    /// - `MARQUEE_PREMIUM_SURCHARGE_CENTS`: Premium row surcharge (default: 400)
    /// - `MARQUEE_3D_SURCHARGE_CENTS`: 3D surcharge per seat (default: 300)
    /// - `MARQUEE_IMAX_SURCHARGE_CENTS`: IMAX surcharge per seat (default: 500)
    /// - `MARQUEE_BOOKING_FEE_CENTS`: Booking fee per order (default: 350)
    /// - `MARQUEE_MAX_TICKETS`: Maximum ticket count, 1 to 10 (default: 10)
    /// - `MARQUEE_RESET_DELAY_MS`: Reset delay after confirmation (default: 2000)
    /// - `MARQUEE_BOOKABLE_DAYS`: Dates offered by the picker (default: 7)
    /// - `RUST_LOG`: Log filter (default: `marquee_booking=debug,marquee_runtime=info`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Used by [`BookingConfig::from_env`]; tests pass a map instead of
    /// touching the process environment.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cents = |key: &str, default: Money| {
            parse_or(&lookup, key, default.cents()).map_or(default, Money::from_cents)
        };

        Self {
            pricing: PriceSchedule {
                base_fare: cents("MARQUEE_BASE_FARE_CENTS", defaults.pricing.base_fare),
                premium_surcharge: cents(
                    "MARQUEE_PREMIUM_SURCHARGE_CENTS",
                    defaults.pricing.premium_surcharge,
                ),
                three_d_surcharge: cents(
                    "MARQUEE_3D_SURCHARGE_CENTS",
                    defaults.pricing.three_d_surcharge,
                ),
                imax_surcharge: cents("MARQUEE_IMAX_SURCHARGE_CENTS", defaults.pricing.imax_surcharge),
                booking_fee: cents("MARQUEE_BOOKING_FEE_CENTS", defaults.pricing.booking_fee),
            },
            session: SessionConfig {
                max_tickets: parse_or(&lookup, "MARQUEE_MAX_TICKETS", defaults.session.max_tickets)
                    .filter(|max| within("MARQUEE_MAX_TICKETS", *max, 1..=TICKET_LIMIT))
                    .unwrap_or(defaults.session.max_tickets),
                reset_delay_ms: parse_or(
                    &lookup,
                    "MARQUEE_RESET_DELAY_MS",
                    defaults.session.reset_delay_ms,
                )
                .unwrap_or(defaults.session.reset_delay_ms),
                bookable_days: parse_or(
                    &lookup,
                    "MARQUEE_BOOKABLE_DAYS",
                    defaults.session.bookable_days,
                )
                .unwrap_or(defaults.session.bookable_days),
            },
            logging: LoggingConfig {
                filter: lookup("RUST_LOG")
                    .filter(|filter| !filter.trim().is_empty())
                    .unwrap_or(defaults.logging.filter),
            },
        }
    }
}

/// Parse `key`; a missing key yields `Some(default)`, an unparsable one `None`
fn within(key: &str, value: u8, range: std::ops::RangeInclusive<u8>) -> bool {
    let ok = range.contains(&value);
    if !ok {
        tracing::warn!(
            key,
            value,
            min = range.start(),
            max = range.end(),
            "Ignoring out-of-range configuration value"
        );
    }
    ok
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Some(default),
        Some(raw) => raw.trim().parse().map_or_else(
            |_| {
                tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
                None
            },
            Some,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = BookingConfig::from_lookup(lookup(&[]));
        assert_eq!(config, BookingConfig::default());
        assert_eq!(config.pricing.base_fare, Money::from_cents(1200));
        assert_eq!(config.session.max_tickets, 10);
        assert_eq!(config.session.reset_delay(), Duration::from_secs(2));
        assert_eq!(config.session.bookable_days, 7);
    }

    #[test]
    fn overrides_are_applied() {
        let config = BookingConfig::from_lookup(lookup(&[
            ("MARQUEE_BASE_FARE_CENTS", "1000"),
            ("MARQUEE_IMAX_SURCHARGE_CENTS", " 650 "),
            ("MARQUEE_MAX_TICKETS", "6"),
            ("MARQUEE_RESET_DELAY_MS", "500"),
            ("RUST_LOG", "debug"),
        ]));
        assert_eq!(config.pricing.base_fare, Money::from_cents(1000));
        assert_eq!(config.pricing.imax_surcharge, Money::from_cents(650));
        assert_eq!(config.pricing.booking_fee, Money::from_cents(350));
        assert_eq!(config.session.max_tickets, 6);
        assert_eq!(config.session.reset_delay(), Duration::from_millis(500));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = BookingConfig::from_lookup(lookup(&[
            ("MARQUEE_BASE_FARE_CENTS", "twelve"),
            ("MARQUEE_MAX_TICKETS", "0"),
            ("MARQUEE_BOOKABLE_DAYS", "-1"),
            ("RUST_LOG", "  "),
        ]));
        assert_eq!(config, BookingConfig::default());
    }

    #[test]
    fn ticket_limit_above_ten_falls_back_to_default() {
        let config = BookingConfig::from_lookup(lookup(&[("MARQUEE_MAX_TICKETS", "50")]));
        assert_eq!(config.session.max_tickets, TICKET_LIMIT);

        let config = BookingConfig::from_lookup(lookup(&[("MARQUEE_MAX_TICKETS", "11")]));
        assert_eq!(config.session.max_tickets, 10);
    }
}
