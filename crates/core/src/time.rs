use chrono::{DateTime, Utc};

/// Time source for session timestamps.
///
/// Services hold a `Clock` instead of calling `Utc::now()` directly, so tests
/// can pin every timestamp to a known instant.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// A clock that reads the system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// A clock pinned at `at`.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Instant used by deterministic tests: 2023-11-14T22:13:20Z.
pub const TEST_EPOCH_SECS: i64 = 1_700_000_000;

/// The deterministic test instant as a `DateTime<Utc>`.
///
/// # Panics
///
/// Panics if [`TEST_EPOCH_SECS`] falls outside chrono's representable range,
/// which it does not.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(TEST_EPOCH_SECS, 0)
        .expect("test epoch is representable")
}

/// A `Clock` pinned at the deterministic test instant.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
