use thiserror::Error;
use time::{Duration, UtcDateTime};

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Default, Hash)]
pub struct PositiveDuration(Duration);

impl PositiveDuration {
    #[must_use]
    pub fn new(duration: Duration) -> Option<Self> {
        duration.is_positive().then_some(Self(duration))
    }

    #[must_use]
    pub fn new_unchecked(duration: Duration) -> Self {
        Self::new(duration).expect("Duration was not positive.")
    }

    #[must_use]
    pub fn get(&self) -> Duration {
        self.0
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The duration is not positive: {0}")]
pub struct NonPositiveDurationError(Duration);

impl TryFrom<Duration> for PositiveDuration {
    type Error = NonPositiveDurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(NonPositiveDurationError(value))
    }
}

/// Current time truncated to whole seconds, the precision timestamps are
/// stored and compared at.
#[must_use]
pub fn now_seconds() -> UtcDateTime {
    truncate_to_seconds(UtcDateTime::now())
}

#[must_use]
pub fn truncate_to_seconds(date_time: UtcDateTime) -> UtcDateTime {
    date_time
        .replace_nanosecond(0)
        .expect("zero is a valid nanosecond")
}

/// Serde adapter serializing a [`UtcDateTime`] as an RFC 3339 string.
pub mod rfc3339_utc {
    use serde::{Deserializer, Serializer};
    use time::{OffsetDateTime, UtcDateTime};

    pub fn serialize<S>(date_time: &UtcDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        time::serde::rfc3339::serialize(&OffsetDateTime::from(*date_time), serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<UtcDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        time::serde::rfc3339::deserialize(deserializer).map(UtcDateTime::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::utc_datetime;

    #[test]
    fn positive_duration() {
        assert!(PositiveDuration::new(Duration::seconds(1)).is_some());
        assert!(PositiveDuration::new(Duration::seconds(0)).is_none());
        assert!(PositiveDuration::new(Duration::seconds(-1)).is_none());
    }

    #[test]
    fn seconds_truncation() {
        let with_nanos = utc_datetime!(2025-06-01 12:30:45).replace_nanosecond(500_000_000).unwrap();
        assert_eq!(
            truncate_to_seconds(with_nanos),
            utc_datetime!(2025-06-01 12:30:45)
        );
    }
}
