//! Service-day time handling.
//!
//! Timetables express times as "HH:MM" or "HH:MM:SS" relative to the start of
//! the service day. Trips running past midnight keep counting upwards, so
//! "25:10" is a valid time. Internally a time is a signed number of seconds,
//! which keeps the routing loop free of calendar arithmetic.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Largest hour accepted when parsing (two service days).
const MAX_HOUR: u32 = 47;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of the service day, in seconds since its start.
///
/// # Examples
///
/// ```
/// use trip_planner::domain::TransitTime;
///
/// let t = TransitTime::parse("10:00:15").unwrap();
/// assert_eq!(t.seconds(), 36_015);
/// assert_eq!(t.to_string(), "10:00:15");
///
/// // Whole minutes are printed without seconds
/// assert_eq!(TransitTime::parse("10:04").unwrap().to_string(), "10:04");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransitTime(i32);

impl TransitTime {
    /// Start of the service day.
    pub const MIDNIGHT: TransitTime = TransitTime(0);

    /// Create a time from seconds since the start of the service day.
    pub const fn from_seconds(seconds: i32) -> Self {
        Self(seconds)
    }

    /// Create a time from hour, minute and second components.
    pub const fn hms(hour: i32, minute: i32, second: i32) -> Self {
        Self(hour * 3600 + minute * 60 + second)
    }

    /// Parse "HH:MM" or "HH:MM:SS".
    ///
    /// Hours up to 47 are accepted for trips that run past midnight.
    ///
    /// ```
    /// use trip_planner::domain::TransitTime;
    ///
    /// assert!(TransitTime::parse("00:00").is_ok());
    /// assert!(TransitTime::parse("25:10").is_ok());
    /// assert!(TransitTime::parse("10:00:15").is_ok());
    ///
    /// assert!(TransitTime::parse("1000").is_err());
    /// assert!(TransitTime::parse("10:6").is_err());
    /// assert!(TransitTime::parse("48:00").is_err());
    /// assert!(TransitTime::parse("10:60").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let bytes = s.as_bytes();

        if bytes.len() != 5 && bytes.len() != 8 {
            return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
        }

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > MAX_HOUR {
            return Err(TimeError::new("hour must be 0-47"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = if bytes.len() == 8 {
            if bytes[5] != b':' {
                return Err(TimeError::new("expected colon at position 5"));
            }
            let second = parse_two_digits(&bytes[6..8])
                .ok_or_else(|| TimeError::new("invalid second digits"))?;
            if second > 59 {
                return Err(TimeError::new("second must be 0-59"));
            }
            second
        } else {
            0
        };

        Ok(Self::hms(hour as i32, minute as i32, second as i32))
    }

    /// Seconds since the start of the service day.
    pub const fn seconds(self) -> i32 {
        self.0
    }

    /// This time moved `seconds` later.
    pub const fn plus(self, seconds: i32) -> Self {
        Self(self.0 + seconds)
    }

    /// This time moved `seconds` earlier.
    pub const fn minus(self, seconds: i32) -> Self {
        Self(self.0 - seconds)
    }

    /// Seconds from `earlier` to `self`; negative if `earlier` is later.
    pub const fn seconds_since(self, earlier: Self) -> i32 {
        self.0 - earlier.0
    }

    /// Converts to a wall-clock time, wrapping times past midnight.
    pub fn to_naive_time(self) -> NaiveTime {
        let secs = self.0.rem_euclid(24 * 3600) as u32;
        NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Create a time from a wall-clock time on the first service day.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight() as i32)
    }
}

impl fmt::Debug for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitTime({self})")
    }
}

impl fmt::Display for TransitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let total = self.0.unsigned_abs();
        let (hour, minute, second) = (total / 3600, (total / 60) % 60, total % 60);
        if second == 0 {
            write!(f, "{sign}{hour:02}:{minute:02}")
        } else {
            write!(f, "{sign}{hour:02}:{minute:02}:{second:02}")
        }
    }
}

impl TryFrom<String> for TransitTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TransitTime> for String {
    fn from(value: TransitTime) -> Self {
        value.to_string()
    }
}

/// Format a duration in seconds compactly, e.g. `1h59m45s`, `3m`, `45s`.
///
/// ```
/// use trip_planner::domain::format_duration;
///
/// assert_eq!(format_duration(7185), "1h59m45s");
/// assert_eq!(format_duration(180), "3m");
/// assert_eq!(format_duration(0), "0s");
/// ```
pub fn format_duration(seconds: i32) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    let (hour, minute, second) = (total / 3600, (total / 60) % 60, total % 60);

    let mut out = String::from(sign);
    if hour > 0 {
        out.push_str(&format!("{hour}h"));
    }
    if minute > 0 {
        out.push_str(&format!("{minute}m"));
    }
    if second > 0 {
        out.push_str(&format!("{second}s"));
    }
    out
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}
