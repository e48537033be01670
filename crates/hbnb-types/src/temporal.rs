use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Wire format for timestamps: ISO-8601 without zone, microsecond fraction.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Accepted on parse. `%.f` makes the fractional part optional.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Longest fraction the wire form can carry without losing digits.
const MAX_FRACTION_DIGITS: usize = 6;

/// Creation/update time of a record.
///
/// Held at microsecond resolution so that the rendered form parses back to
/// an identical value. Times are taken from the UTC wall clock and carry no
/// zone on the wire.
///
/// Ordering is chronological.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// The current wall-clock time, truncated to microseconds.
    pub fn now() -> Self {
        Self(Utc::now().naive_utc().trunc_subsecs(6))
    }

    /// Wrap an existing date-time, truncating anything below a microsecond.
    pub fn from_naive(datetime: NaiveDateTime) -> Self {
        Self(datetime.trunc_subsecs(6))
    }

    /// The underlying date-time.
    pub fn as_naive(&self) -> &NaiveDateTime {
        &self.0
    }

    /// Parse the wire form (`2024-01-01T00:00:00.000000`).
    ///
    /// The fractional part may be omitted. More than six fractional digits
    /// is rejected rather than truncated.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let invalid = |reason: String| TypeError::InvalidTimestamp {
            value: value.to_string(),
            reason,
        };

        if let Some((_, fraction)) = value.rsplit_once('.') {
            if fraction.len() > MAX_FRACTION_DIGITS {
                return Err(invalid(format!(
                    "fraction has {} digits, at most {MAX_FRACTION_DIGITS} allowed",
                    fraction.len()
                )));
            }
        }

        NaiveDateTime::parse_from_str(value, PARSE_FORMAT)
            .map(Self::from_naive)
            .map_err(|e| invalid(e.to_string()))
    }

    /// Render in the wire form, always with six fractional digits.
    pub fn to_iso(&self) -> String {
        self.0.format(TIMESTAMP_FORMAT).to_string()
    }

    /// A timestamp strictly after `previous`.
    ///
    /// Uses the wall clock when it has moved past `previous`; otherwise
    /// steps one microsecond beyond it. Keeps `updated_at` moving forward on
    /// coarse or backwards-stepping clocks.
    pub fn advance(previous: &Self) -> Self {
        let now = Self::now();
        if now > *previous {
            return now;
        }
        let next = previous
            .0
            .checked_add_signed(TimeDelta::microseconds(1))
            .unwrap_or(previous.0);
        Self(next)
    }

    /// Returns `true` if this timestamp is strictly after `other`.
    pub fn is_after(&self, other: &Self) -> bool {
        self > other
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.to_iso())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl FromStr for Timestamp {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};
    use proptest::prelude::*;

    fn at(micros: u32) -> Timestamp {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_micro_opt(0, 0, 0, micros)
            .unwrap();
        Timestamp::from_naive(dt)
    }

    #[test]
    fn renders_six_fraction_digits() {
        assert_eq!(at(0).to_iso(), "2024-01-01T00:00:00.000000");
        assert_eq!(at(42).to_iso(), "2024-01-01T00:00:00.000042");
    }

    #[test]
    fn parses_wire_form() {
        let ts = Timestamp::parse("2017-09-28T21:05:54.119427").unwrap();
        let dt = ts.as_naive();
        assert_eq!(dt.year(), 2017);
        assert_eq!(dt.second(), 54);
        assert_eq!(dt.nanosecond(), 119_427_000);
    }

    #[test]
    fn parses_without_fraction() {
        let ts = Timestamp::parse("2024-01-01T00:00:00").unwrap();
        assert_eq!(ts, at(0));
    }

    #[test]
    fn rejects_sub_microsecond_digits() {
        for bad in ["2024-01-01T00:00:00.0000019", "2024-01-01T00:00:00.123456789"] {
            let err = Timestamp::parse(bad).unwrap_err();
            assert!(
                matches!(&err, TypeError::InvalidTimestamp { value, .. } if value == bad),
                "{bad}"
            );
        }
        assert_eq!(Timestamp::parse("2024-01-01T00:00:00.000001").unwrap(), at(1));
        assert_eq!(Timestamp::parse("2024-01-01T00:00:00.5").unwrap(), at(500_000));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "yesterday", "2024-01-01", "2024-13-01T00:00:00.000000", "2024-01-01T00:00:00.0Z"] {
            let err = Timestamp::parse(bad).unwrap_err();
            assert!(matches!(err, TypeError::InvalidTimestamp { .. }), "{bad}");
        }
    }

    #[test]
    fn now_is_microsecond_aligned() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_naive().nanosecond() % 1_000, 0);
        assert_eq!(Timestamp::parse(&ts.to_iso()).unwrap(), ts);
    }

    #[test]
    fn advance_is_strictly_after() {
        let past = at(5);
        assert!(Timestamp::advance(&past).is_after(&past));

        // A timestamp far in the future still gets advanced by one tick.
        let future = Timestamp::parse("9999-01-01T00:00:00.000000").unwrap();
        let next = Timestamp::advance(&future);
        assert_eq!(next.to_iso(), "9999-01-01T00:00:00.000001");
    }

    #[test]
    fn serde_uses_wire_form() {
        let ts = at(119_427);
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-01T00:00:00.119427\"");
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn serde_rejects_non_timestamp() {
        assert!(serde_json::from_str::<Timestamp>("\"noon\"").is_err());
        assert!(serde_json::from_str::<Timestamp>("null").is_err());
    }

    proptest! {
        #[test]
        fn rendered_form_parses_back(secs in 0i64..4_102_444_800, micros in 0u32..1_000_000) {
            let dt = chrono::DateTime::from_timestamp(secs, micros * 1_000).unwrap().naive_utc();
            let ts = Timestamp::from_naive(dt);
            prop_assert_eq!(Timestamp::parse(&ts.to_iso()).unwrap(), ts);
        }
    }
}
