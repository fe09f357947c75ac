//! Dependencies injected into the booking reducer.

use crate::catalog::Catalog;
use crate::config::{BookingConfig, TICKET_LIMIT};
use crate::pricing::PriceSchedule;
use marquee_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;

/// Environment of the booking reducer
///
/// Production uses `SystemClock`; tests use `FixedClock`.
#[derive(Clone)]
pub struct BookingEnvironment {
    clock: Arc<dyn Clock>,
    catalog: Arc<dyn Catalog>,
    pricing: PriceSchedule,
    max_tickets: u8,
    reset_delay: Duration,
}

impl BookingEnvironment {
    /// Environment with default pricing, ten tickets and a two second reset
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, catalog: Arc<dyn Catalog>) -> Self {
        Self::from_config(clock, catalog, &BookingConfig::default())
    }

    /// Environment using pricing and session settings from `config`
    #[must_use]
    pub fn from_config(
        clock: Arc<dyn Clock>,
        catalog: Arc<dyn Catalog>,
        config: &BookingConfig,
    ) -> Self {
        Self {
            clock,
            catalog,
            pricing: config.pricing.clone(),
            max_tickets: config.session.max_tickets.clamp(1, TICKET_LIMIT),
            reset_delay: config.session.reset_delay(),
        }
    }

    /// Replace the price schedule
    #[must_use]
    pub fn with_pricing(mut self, pricing: PriceSchedule) -> Self {
        self.pricing = pricing;
        self
    }

    /// Replace the delay before a confirmed session resets
    #[must_use]
    pub const fn with_reset_delay(mut self, reset_delay: Duration) -> Self {
        self.reset_delay = reset_delay;
        self
    }

    /// Clock used for confirmation timestamps
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Catalog of the show being booked
    #[must_use]
    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Fares and fees
    #[must_use]
    pub const fn pricing(&self) -> &PriceSchedule {
        &self.pricing
    }

    /// Upper bound of the ticket count
    #[must_use]
    pub const fn max_tickets(&self) -> u8 {
        self.max_tickets
    }

    /// Delay between confirmation and reset
    #[must_use]
    pub const fn reset_delay(&self) -> Duration {
        self.reset_delay
    }
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("show", &self.catalog.show().title)
            .field("pricing", &self.pricing)
            .field("max_tickets", &self.max_tickets)
            .field("reset_delay", &self.reset_delay)
            .finish_non_exhaustive()
    }
}
