//! Cache entry lifetimes
//!
//! A duration is a single (unit, magnitude) pair; a magnitude of zero means
//! entries never expire. [`DurationOptions`] is the construction surface:
//! it carries at most one unit, and over-specifying is a configuration
//! error rather than a silently resolved ambiguity.

use chrono::{DateTime, Duration, Months, Utc};

use crate::error::CacheError;

/// Units a cache duration can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

/// Duration settings accepted at cache construction and by `set_duration`
///
/// Mirrors the owning client's configuration shape: each unit is an optional
/// magnitude, and at most one may be set. `DurationOptions::days(10)` reads
/// as "expire entries after ten days".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationOptions {
    pub months: Option<u64>,
    pub weeks: Option<u64>,
    pub days: Option<u64>,
    pub hours: Option<u64>,
    pub minutes: Option<u64>,
    pub seconds: Option<u64>,
}

impl DurationOptions {
    /// Expire entries after `value` months
    pub fn months(value: u64) -> Self {
        Self {
            months: Some(value),
            ..Self::default()
        }
    }

    /// Expire entries after `value` weeks
    pub fn weeks(value: u64) -> Self {
        Self {
            weeks: Some(value),
            ..Self::default()
        }
    }

    /// Expire entries after `value` days
    pub fn days(value: u64) -> Self {
        Self {
            days: Some(value),
            ..Self::default()
        }
    }

    /// Expire entries after `value` hours
    pub fn hours(value: u64) -> Self {
        Self {
            hours: Some(value),
            ..Self::default()
        }
    }

    /// Expire entries after `value` minutes
    pub fn minutes(value: u64) -> Self {
        Self {
            minutes: Some(value),
            ..Self::default()
        }
    }

    /// Expire entries after `value` seconds
    pub fn seconds(value: u64) -> Self {
        Self {
            seconds: Some(value),
            ..Self::default()
        }
    }

    /// Resolves the options into at most one concrete duration
    ///
    /// Returns `None` when no unit is set, the duration when exactly one is,
    /// and [`CacheError::InvalidDuration`] when several are.
    pub(crate) fn resolve(self) -> Result<Option<CacheDuration>, CacheError> {
        let units = [
            (DurationUnit::Months, self.months),
            (DurationUnit::Weeks, self.weeks),
            (DurationUnit::Days, self.days),
            (DurationUnit::Hours, self.hours),
            (DurationUnit::Minutes, self.minutes),
            (DurationUnit::Seconds, self.seconds),
        ];

        let mut configured = units
            .into_iter()
            .filter_map(|(unit, value)| value.map(|value| CacheDuration { unit, value }));

        match (configured.next(), configured.next()) {
            (Some(duration), None) => Ok(Some(duration)),
            (Some(_), Some(_)) => Err(CacheError::InvalidDuration),
            (None, _) => Ok(None),
        }
    }
}

/// How long cache entries stay valid
///
/// A value of zero means entries never expire; that is also the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheDuration {
    pub unit: DurationUnit,
    pub value: u64,
}

impl Default for CacheDuration {
    fn default() -> Self {
        Self {
            unit: DurationUnit::Seconds,
            value: 0,
        }
    }
}

impl CacheDuration {
    /// Whether entries governed by this duration live forever
    pub fn is_forever(&self) -> bool {
        self.value == 0
    }

    /// When an entry created at `created` expires
    ///
    /// Returns `None` for a forever duration. Durations too large for the
    /// calendar arithmetic also yield `None` and are treated as forever.
    pub fn expires_at(&self, created: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_forever() {
            return None;
        }
        let delta = match self.unit {
            DurationUnit::Months => {
                let months = u32::try_from(self.value).ok()?;
                return created.checked_add_months(Months::new(months));
            }
            DurationUnit::Weeks => Duration::try_weeks(i64::try_from(self.value).ok()?)?,
            DurationUnit::Days => Duration::try_days(i64::try_from(self.value).ok()?)?,
            DurationUnit::Hours => Duration::try_hours(i64::try_from(self.value).ok()?)?,
            DurationUnit::Minutes => Duration::try_minutes(i64::try_from(self.value).ok()?)?,
            DurationUnit::Seconds => Duration::try_seconds(i64::try_from(self.value).ok()?)?,
        };
        created.checked_add_signed(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_duration_never_expires() {
        let duration = CacheDuration::default();

        assert!(duration.is_forever());
        assert!(duration.expires_at(Utc::now()).is_none());
    }

    #[test]
    fn test_zero_value_never_expires_in_any_unit() {
        for unit in [
            DurationUnit::Months,
            DurationUnit::Weeks,
            DurationUnit::Days,
            DurationUnit::Hours,
            DurationUnit::Minutes,
            DurationUnit::Seconds,
        ] {
            let duration = CacheDuration { unit, value: 0 };
            assert!(duration.is_forever());
            assert!(duration.expires_at(Utc::now()).is_none());
        }
    }

    #[test]
    fn test_resolve_empty_options_is_none() {
        let resolved = DurationOptions::default()
            .resolve()
            .expect("Empty options should resolve");

        assert!(resolved.is_none());
    }

    #[test]
    fn test_resolve_single_unit() {
        let resolved = DurationOptions::days(10)
            .resolve()
            .expect("Single unit should resolve")
            .expect("A configured unit should produce a duration");

        assert_eq!(resolved.unit, DurationUnit::Days);
        assert_eq!(resolved.value, 10);
    }

    #[test]
    fn test_resolve_each_unit_constructor() {
        let cases = [
            (DurationOptions::months(1), DurationUnit::Months),
            (DurationOptions::weeks(2), DurationUnit::Weeks),
            (DurationOptions::days(3), DurationUnit::Days),
            (DurationOptions::hours(4), DurationUnit::Hours),
            (DurationOptions::minutes(5), DurationUnit::Minutes),
            (DurationOptions::seconds(6), DurationUnit::Seconds),
        ];

        for (options, expected_unit) in cases {
            let resolved = options
                .resolve()
                .expect("Single unit should resolve")
                .expect("A configured unit should produce a duration");
            assert_eq!(resolved.unit, expected_unit);
        }
    }

    #[test]
    fn test_resolve_two_units_is_a_configuration_error() {
        let options = DurationOptions {
            days: Some(1),
            hours: Some(2),
            ..DurationOptions::default()
        };

        let result = options.resolve();

        assert!(matches!(result, Err(CacheError::InvalidDuration)));
    }

    #[test]
    fn test_invalid_duration_message_names_the_units() {
        let options = DurationOptions {
            hours: Some(1),
            seconds: Some(30),
            ..DurationOptions::default()
        };

        let error = options.resolve().unwrap_err();

        assert!(error
            .to_string()
            .contains("months|weeks|days|hours|minutes|seconds"));
    }

    #[test]
    fn test_expires_at_seconds_arithmetic() {
        let created = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();
        let duration = CacheDuration {
            unit: DurationUnit::Seconds,
            value: 90,
        };

        let expiry = duration.expires_at(created).expect("Should have an expiry");

        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 7, 15, 12, 1, 30).unwrap());
    }

    #[test]
    fn test_expires_at_months_uses_calendar_arithmetic() {
        let created = Utc.with_ymd_and_hms(2024, 1, 31, 9, 0, 0).unwrap();
        let duration = CacheDuration {
            unit: DurationUnit::Months,
            value: 1,
        };

        let expiry = duration.expires_at(created).expect("Should have an expiry");

        // January 31 + 1 month clamps to the end of February
        assert_eq!(expiry, Utc.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_oversized_duration_is_treated_as_forever() {
        let duration = CacheDuration {
            unit: DurationUnit::Weeks,
            value: u64::MAX,
        };

        assert!(duration.expires_at(Utc::now()).is_none());
    }
}
