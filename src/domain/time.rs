use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{fmt, iter::Sum, ops::Add};

const MINUTES_PER_HOUR: u32 = 60;
const SECONDS_PER_MINUTE: u32 = 60;

/// Planned duration of a task, in whole hours and minutes.
///
/// Minutes are always normalized into `0..=59`; any overflow is carried into
/// the hours. The fields are private so a denormalized value cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawTimeEstimate")]
pub struct TimeEstimate {
    hours: u32,
    minutes: u32,
}

impl TimeEstimate {
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
    };

    /// Creates an estimate, carrying minutes beyond 59 into hours
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self {
            hours: hours.saturating_add(minutes / MINUTES_PER_HOUR),
            minutes: minutes % MINUTES_PER_HOUR,
        }
    }

    /// Creates an estimate from a total number of minutes
    pub fn from_minutes(total: u64) -> Self {
        let hours = total / u64::from(MINUTES_PER_HOUR);
        let minutes = (total % u64::from(MINUTES_PER_HOUR)) as u32;
        Self {
            hours: u32::try_from(hours).unwrap_or(u32::MAX),
            minutes,
        }
    }

    /// Builds an estimate from raw form input.
    ///
    /// Empty, negative or non-numeric input counts as zero. A leading run of
    /// digits is honoured, so `"12abc"` reads as 12.
    pub fn parse_lenient(hours: &str, minutes: &str) -> Self {
        Self::new(parse_leading_digits(hours), parse_leading_digits(minutes))
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn total_minutes(&self) -> u64 {
        u64::from(self.hours) * u64::from(MINUTES_PER_HOUR) + u64::from(self.minutes)
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0
    }
}

impl Add for TimeEstimate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.hours.saturating_add(rhs.hours),
            self.minutes + rhs.minutes,
        )
    }
}

impl Sum for TimeEstimate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a TimeEstimate> for TimeEstimate {
    fn sum<I: Iterator<Item = &'a TimeEstimate>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for TimeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Wire shape of [`TimeEstimate`]: missing or malformed fields read as zero.
#[derive(Deserialize)]
struct RawTimeEstimate {
    #[serde(default, deserialize_with = "lenient_u32")]
    hours: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    minutes: u32,
}

impl From<RawTimeEstimate> for TimeEstimate {
    fn from(raw: RawTimeEstimate) -> Self {
        Self::new(raw.hours, raw.minutes)
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_value).unwrap_or(0))
}

fn coerce_value(value: &Value) -> u32 {
    match value {
        Value::Number(n) => {
            if let Some(whole) = n.as_u64() {
                u32::try_from(whole).unwrap_or(u32::MAX)
            } else {
                // Negative integers and fractions
                n.as_f64()
                    .filter(|f| f.is_finite() && *f > 0.0)
                    .map(|f| f.trunc().min(f64::from(u32::MAX)) as u32)
                    .unwrap_or(0)
            }
        }
        Value::String(s) => parse_leading_digits(s),
        _ => 0,
    }
}

fn parse_leading_digits(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    if end == 0 {
        return 0;
    }

    trimmed[..end]
        .parse::<u32>()
        .unwrap_or(u32::MAX)
}

/// Live value of the countdown timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCountdown")]
pub struct Countdown {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl Countdown {
    pub const ZERO: Self = Self {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Creates a countdown, normalizing seconds and minutes into `0..=59`
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        let minutes = minutes.saturating_add(seconds / SECONDS_PER_MINUTE);
        Self {
            hours: hours.saturating_add(minutes / MINUTES_PER_HOUR),
            minutes: minutes % MINUTES_PER_HOUR,
            seconds: seconds % SECONDS_PER_MINUTE,
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn total_seconds(&self) -> u64 {
        (u64::from(self.hours) * u64::from(MINUTES_PER_HOUR) + u64::from(self.minutes))
            * u64::from(SECONDS_PER_MINUTE)
            + u64::from(self.seconds)
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    /// Removes one second, borrowing from minutes and then hours.
    ///
    /// Returns `false` and leaves the value untouched once it is at zero.
    pub fn tick_down(&mut self) -> bool {
        if self.is_zero() {
            return false;
        }

        if self.seconds > 0 {
            self.seconds -= 1;
        } else {
            self.seconds = SECONDS_PER_MINUTE - 1;
            if self.minutes > 0 {
                self.minutes -= 1;
            } else {
                self.minutes = MINUTES_PER_HOUR - 1;
                self.hours -= 1;
            }
        }
        true
    }
}

/// Wire shape of [`Countdown`], normalized through [`Countdown::new`]
#[derive(Deserialize)]
struct RawCountdown {
    #[serde(default, deserialize_with = "lenient_u32")]
    hours: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    minutes: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    seconds: u32,
}

impl From<RawCountdown> for Countdown {
    fn from(raw: RawCountdown) -> Self {
        Self::new(raw.hours, raw.minutes, raw.seconds)
    }
}

impl From<TimeEstimate> for Countdown {
    fn from(estimate: TimeEstimate) -> Self {
        Self {
            hours: estimate.hours,
            minutes: estimate.minutes,
            seconds: 0,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}
