//! Re-log interval policy.
//!
//! Decides whether an unchanged error may be emitted again. The policy is
//! tri-state: log every call, log only on change, or re-log after a fixed
//! cooldown.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, StateLogError};

/// Text units, largest first, with their length in nanoseconds.
const UNITS: &[(&str, u128)] = &[
    ("h", 3_600_000_000_000),
    ("m", 60_000_000_000),
    ("s", 1_000_000_000),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// How often an unchanged error is re-emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RelogInterval {
    /// Emit on every call. `fixed()` never emits in this mode.
    Always,
    /// Never re-emit an unchanged error, however much time passes.
    #[default]
    OnlyOnChange,
    /// Re-emit an unchanged error once this much time has elapsed since
    /// the last emission. `Every(Duration::ZERO)` behaves as [`Always`].
    ///
    /// [`Always`]: RelogInterval::Always
    Every(Duration),
}

impl RelogInterval {
    /// Build a policy from a duration. A zero duration means [`Always`].
    ///
    /// [`Always`]: RelogInterval::Always
    pub fn every(duration: Duration) -> Self {
        if duration.is_zero() {
            Self::Always
        } else {
            Self::Every(duration)
        }
    }

    /// The canonical form: `Every(Duration::ZERO)` becomes `Always`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Every(d) => Self::every(d),
            other => other,
        }
    }

    /// Whether an unchanged error may be emitted after `elapsed`.
    ///
    /// `elapsed` is `None` when nothing has been emitted yet.
    pub fn allows_relog(&self, elapsed: Option<Duration>) -> bool {
        match self.normalized() {
            Self::Always => true,
            Self::OnlyOnChange => false,
            Self::Every(period) => elapsed.is_none_or(|e| e >= period),
        }
    }

    /// Whether recovery (`fixed`) messages are emitted under this policy.
    pub fn reports_recovery(&self) -> bool {
        !matches!(self.normalized(), Self::Always)
    }
}

impl From<Duration> for RelogInterval {
    fn from(duration: Duration) -> Self {
        Self::every(duration)
    }
}

impl fmt::Display for RelogInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.normalized() {
            Self::Always => f.write_str("always"),
            Self::OnlyOnChange => f.write_str("on-change"),
            Self::Every(d) => {
                let nanos = d.as_nanos();
                // "ns" divides everything, so a unit is always found.
                let (unit, size) = UNITS
                    .iter()
                    .find(|(_, size)| nanos % size == 0)
                    .copied()
                    .unwrap_or(("ns", 1));
                write!(f, "{}{}", nanos / size, unit)
            }
        }
    }
}

impl FromStr for RelogInterval {
    type Err = StateLogError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_lowercase();
        match value.as_str() {
            "always" | "0" => return Ok(Self::Always),
            "on-change" | "changes" => return Ok(Self::OnlyOnChange),
            _ => {}
        }

        let split = value
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| StateLogError::invalid_interval(s))?;
        let (digits, unit) = value.split_at(split);
        let n: u128 = digits
            .parse()
            .map_err(|_| StateLogError::invalid_interval(s))?;
        let size = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, size)| *size)
            .ok_or_else(|| StateLogError::invalid_interval(s))?;

        let nanos = n
            .checked_mul(size)
            .ok_or_else(|| StateLogError::invalid_interval(s))?;
        let secs = u64::try_from(nanos / 1_000_000_000)
            .map_err(|_| StateLogError::invalid_interval(s))?;
        // Remainder is below one second, so it fits in u32.
        let subsec = (nanos % 1_000_000_000) as u32;

        Ok(Self::every(Duration::new(secs, subsec)))
    }
}

impl Serialize for RelogInterval {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RelogInterval {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_only_on_change() {
        assert_eq!(RelogInterval::default(), RelogInterval::OnlyOnChange);
    }

    #[test]
    fn test_zero_duration_is_always() {
        assert_eq!(RelogInterval::from(Duration::ZERO), RelogInterval::Always);
        assert_eq!(
            RelogInterval::from(Duration::from_millis(100)),
            RelogInterval::Every(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_allows_relog() {
        let every = RelogInterval::Every(Duration::from_secs(1));
        assert!(every.allows_relog(None));
        assert!(!every.allows_relog(Some(Duration::from_millis(999))));
        assert!(every.allows_relog(Some(Duration::from_secs(1))));

        assert!(RelogInterval::Always.allows_relog(Some(Duration::ZERO)));
        assert!(!RelogInterval::OnlyOnChange.allows_relog(None));
        assert!(!RelogInterval::OnlyOnChange.allows_relog(Some(Duration::MAX)));
    }

    #[test]
    fn test_reports_recovery() {
        assert!(!RelogInterval::Always.reports_recovery());
        assert!(RelogInterval::OnlyOnChange.reports_recovery());
        assert!(RelogInterval::Every(Duration::from_secs(5)).reports_recovery());
    }

    #[test]
    fn test_zero_every_behaves_as_always() {
        let zero = RelogInterval::Every(Duration::ZERO);
        assert_eq!(zero.normalized(), RelogInterval::Always);
        assert!(zero.allows_relog(Some(Duration::ZERO)));
        assert!(!zero.reports_recovery());
        assert_eq!(zero.to_string(), "always");
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!("always".parse::<RelogInterval>().unwrap(), RelogInterval::Always);
        assert_eq!("0".parse::<RelogInterval>().unwrap(), RelogInterval::Always);
        assert_eq!(
            " On-Change ".parse::<RelogInterval>().unwrap(),
            RelogInterval::OnlyOnChange
        );
        assert_eq!(
            "changes".parse::<RelogInterval>().unwrap(),
            RelogInterval::OnlyOnChange
        );
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(
            "250ms".parse::<RelogInterval>().unwrap(),
            RelogInterval::Every(Duration::from_millis(250))
        );
        assert_eq!(
            "30s".parse::<RelogInterval>().unwrap(),
            RelogInterval::Every(Duration::from_secs(30))
        );
        assert_eq!(
            "5m".parse::<RelogInterval>().unwrap(),
            RelogInterval::Every(Duration::from_secs(300))
        );
        assert_eq!(
            "2h".parse::<RelogInterval>().unwrap(),
            RelogInterval::Every(Duration::from_secs(7200))
        );
        assert_eq!("0s".parse::<RelogInterval>().unwrap(), RelogInterval::Always);
    }

    #[test]
    fn test_parse_sub_millisecond() {
        assert_eq!(
            "1500us".parse::<RelogInterval>().unwrap(),
            RelogInterval::Every(Duration::from_micros(1500))
        );
        assert_eq!(
            "500ns".parse::<RelogInterval>().unwrap(),
            RelogInterval::Every(Duration::from_nanos(500))
        );
        assert_eq!("0ns".parse::<RelogInterval>().unwrap(), RelogInterval::Always);
    }

    #[test]
    fn test_parse_invalid() {
        for bad in ["", "soon", "10", "ms", "10d", "-5s", "1.5s"] {
            let err = bad.parse::<RelogInterval>().unwrap_err();
            assert!(
                matches!(err, StateLogError::InvalidInterval { .. }),
                "expected invalid interval for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RelogInterval::Always.to_string(), "always");
        assert_eq!(RelogInterval::OnlyOnChange.to_string(), "on-change");
        assert_eq!(RelogInterval::Every(Duration::from_millis(1500)).to_string(), "1500ms");
        assert_eq!(RelogInterval::Every(Duration::from_secs(45)).to_string(), "45s");
        assert_eq!(RelogInterval::Every(Duration::from_secs(120)).to_string(), "2m");
        assert_eq!(RelogInterval::Every(Duration::from_secs(3600)).to_string(), "1h");
        assert_eq!(RelogInterval::Every(Duration::from_micros(1500)).to_string(), "1500us");
        assert_eq!(RelogInterval::Every(Duration::from_nanos(500)).to_string(), "500ns");
        assert_eq!(RelogInterval::Every(Duration::new(1, 1)).to_string(), "1000000001ns");
    }

    #[test]
    fn test_sub_millisecond_survives_serde() {
        let policy = RelogInterval::Every(Duration::from_nanos(500));
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, "\"500ns\"");
        assert_eq!(serde_json::from_str::<RelogInterval>(&json).unwrap(), policy);
    }

    #[test]
    fn test_serde_json() {
        let json = serde_json::to_string(&RelogInterval::Every(Duration::from_secs(10))).unwrap();
        assert_eq!(json, "\"10s\"");

        let parsed: RelogInterval = serde_json::from_str("\"on-change\"").unwrap();
        assert_eq!(parsed, RelogInterval::OnlyOnChange);

        assert!(serde_json::from_str::<RelogInterval>("\"whenever\"").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: rendering then parsing yields the same policy
            #[test]
            fn prop_display_parses_back(nanos in 1u64..u64::MAX) {
                let policy = RelogInterval::Every(Duration::from_nanos(nanos));
                let parsed: RelogInterval = policy.to_string().parse().unwrap();
                prop_assert_eq!(parsed, policy);
            }

            // Property: relog is allowed exactly once the period has elapsed
            #[test]
            fn prop_every_threshold(period in 1u64..100_000, elapsed in 0u64..200_000) {
                let policy = RelogInterval::Every(Duration::from_millis(period));
                let allowed = policy.allows_relog(Some(Duration::from_millis(elapsed)));
                prop_assert_eq!(allowed, elapsed >= period);
            }
        }
    }
}
