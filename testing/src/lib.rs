//! # Marquee Testing
//!
//! Testing utilities for reducers built on `marquee-core`:
//! - [`FixedClock`] and [`test_clock`] for deterministic timestamps
//! - [`ReducerTest`] for Given-When-Then reducer tests
//! - [`assertions`] for inspecting returned effects
//!
//! ## Example
//!
//! ```ignore
//! use marquee_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(SessionReducer::new())
//!     .with_env(environment(test_clock()))
//!     .given_state(SessionState::default())
//!     .when_action(SessionAction::SetTicketCount { count: 2 })
//!     .then_state(|state| assert_eq!(state.ticket_count, 2))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use marquee_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// # Example
    ///
    /// ```
    /// use marquee_testing::mocks::FixedClock;
    /// use marquee_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-03-01 18:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        let time = DateTime::parse_from_rfc3339("2025-03-01T18:00:00Z")
            .map_or(DateTime::UNIX_EPOCH, |time| time.with_timezone(&Utc));
        FixedClock::new(time)
    }
}

pub use mocks::{FixedClock, test_clock};
