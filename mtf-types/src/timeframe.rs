//! Human-readable timeframe tokens (`"1m"`, `"4h"`, `"1w"`) and their durations.

use std::borrow::Cow;
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::MtfError;

const SECOND: i64 = 1;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
// Calendar-approximate: 30 days and 365 days.
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Unit of a [`Timeframe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeframeUnit {
    /// `s`
    Second,
    /// `m`
    Minute,
    /// `h`
    Hour,
    /// `d`
    Day,
    /// `w`
    Week,
    /// `M` (30 days)
    Month,
    /// `y` (365 days)
    Year,
}

impl TimeframeUnit {
    /// Seconds represented by one unit.
    #[must_use]
    pub const fn scale_seconds(self) -> i64 {
        match self {
            Self::Second => SECOND,
            Self::Minute => MINUTE,
            Self::Hour => HOUR,
            Self::Day => DAY,
            Self::Week => WEEK,
            Self::Month => MONTH,
            Self::Year => YEAR,
        }
    }

    /// The single-character token suffix.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Second => 's',
            Self::Minute => 'm',
            Self::Hour => 'h',
            Self::Day => 'd',
            Self::Week => 'w',
            Self::Month => 'M',
            Self::Year => 'y',
        }
    }

    /// Months and years stand for calendar periods whose real length varies;
    /// their fixed durations are approximations.
    #[must_use]
    pub const fn is_calendar(self) -> bool {
        matches!(self, Self::Month | Self::Year)
    }

    /// Look up a unit by its token suffix. Case-sensitive: `m` is minutes, `M` months.
    #[must_use]
    pub const fn from_symbol(c: char) -> Option<Self> {
        match c {
            's' => Some(Self::Second),
            'm' => Some(Self::Minute),
            'h' => Some(Self::Hour),
            'd' => Some(Self::Day),
            'w' => Some(Self::Week),
            'M' => Some(Self::Month),
            'y' => Some(Self::Year),
            _ => None,
        }
    }
}

const fn nz(v: u32) -> NonZeroU32 {
    match NonZeroU32::new(v) {
        Some(n) => n,
        None => panic!("timeframe amount must be positive"),
    }
}

/// A candle resolution: a positive amount of a [`TimeframeUnit`].
///
/// Two timeframes with the same duration but different spelling (`60m`, `1h`)
/// are distinct values; compare [`Timeframe::duration_seconds`] when only the
/// length matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe {
    amount: NonZeroU32,
    unit: TimeframeUnit,
}

impl Timeframe {
    /// One minute.
    pub const M1: Self = Self::new(nz(1), TimeframeUnit::Minute);
    /// Five minutes.
    pub const M5: Self = Self::new(nz(5), TimeframeUnit::Minute);
    /// Fifteen minutes.
    pub const M15: Self = Self::new(nz(15), TimeframeUnit::Minute);
    /// Thirty minutes.
    pub const M30: Self = Self::new(nz(30), TimeframeUnit::Minute);
    /// One hour.
    pub const H1: Self = Self::new(nz(1), TimeframeUnit::Hour);
    /// Four hours.
    pub const H4: Self = Self::new(nz(4), TimeframeUnit::Hour);
    /// One day.
    pub const D1: Self = Self::new(nz(1), TimeframeUnit::Day);
    /// One week.
    pub const W1: Self = Self::new(nz(1), TimeframeUnit::Week);

    const fn new(amount: NonZeroU32, unit: TimeframeUnit) -> Self {
        Self { amount, unit }
    }

    /// Construct from a plain amount.
    ///
    /// # Errors
    /// Returns `InvalidTimeframeFormat` when `amount` is zero or one window
    /// would be longer than a `chrono::TimeDelta` can hold (only reachable
    /// with `M` and `y`).
    pub fn try_new(amount: u32, unit: TimeframeUnit) -> Result<Self, MtfError> {
        let token = || MtfError::invalid_timeframe_format(format!("{amount}{}", unit.symbol()));
        let amount = NonZeroU32::new(amount).ok_or_else(token)?;
        let tf = Self::new(amount, unit);
        TimeDelta::try_seconds(tf.duration_seconds()).ok_or_else(token)?;
        Ok(tf)
    }

    /// The positive amount of units.
    #[must_use]
    pub const fn amount(self) -> u32 {
        self.amount.get()
    }

    /// The unit.
    #[must_use]
    pub const fn unit(self) -> TimeframeUnit {
        self.unit
    }

    /// Length of one candle in seconds.
    #[must_use]
    pub const fn duration_seconds(self) -> i64 {
        self.amount.get() as i64 * self.unit.scale_seconds()
    }

    /// Length of one candle in whole minutes (floor; sub-minute timeframes yield 0).
    #[must_use]
    pub const fn duration_minutes(self) -> i64 {
        self.duration_seconds() / MINUTE
    }

    /// Length of one candle as a `chrono` delta.
    #[must_use]
    pub fn duration(self) -> TimeDelta {
        TimeDelta::try_seconds(self.duration_seconds()).unwrap_or(TimeDelta::MAX)
    }

    /// How many `finer` candles fit into one candle of `self`, when that is an
    /// exact positive integer.
    #[must_use]
    pub const fn ratio_to(self, finer: Self) -> Option<i64> {
        let coarse = self.duration_seconds();
        let fine = finer.duration_seconds();
        if coarse >= fine && coarse % fine == 0 {
            Some(coarse / fine)
        } else {
            None
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.symbol())
    }
}

impl FromStr for Timeframe {
    type Err = MtfError;

    /// Parse `<positive-integer><unit>`.
    ///
    /// The amount is validated before the unit, so `"xg"` reports a format
    /// error rather than an unsupported unit.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        let Some(unit) = chars.next_back() else {
            return Err(MtfError::invalid_timeframe_format(token));
        };
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MtfError::invalid_timeframe_format(token));
        }
        let amount = digits
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| MtfError::invalid_timeframe_format(token))?;
        let unit = TimeframeUnit::from_symbol(unit)
            .ok_or_else(|| MtfError::unsupported_unit(unit.to_string()))?;
        Self::try_new(amount, unit).map_err(|_| MtfError::invalid_timeframe_format(token))
    }
}

impl TryFrom<&str> for Timeframe {
    type Error = MtfError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl Serialize for Timeframe {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timeframe {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = Cow::<str>::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}
