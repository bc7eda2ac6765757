//! Normalized candles and the merged multi-timeframe table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Timeframe;

/// One OHLCV observation for a fixed time window.
///
/// `open_time` is the primary key within a (symbol, timeframe) series and is
/// serialized as `date`. `volume` is the quote-asset volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Start of the candle window.
    #[serde(rename = "date")]
    pub open_time: DateTime<Utc>,
    /// First traded price in the window.
    pub open: Decimal,
    /// Highest traded price in the window.
    pub high: Decimal,
    /// Lowest traded price in the window.
    pub low: Decimal,
    /// Last traded price in the window.
    pub close: Decimal,
    /// Quote-asset volume traded in the window.
    pub volume: Decimal,
}

impl Candle {
    /// Instant at which the candle's window ends and its values become final.
    ///
    /// Saturates at `DateTime::<Utc>::MAX_UTC` for windows reaching past the
    /// representable range.
    #[must_use]
    pub fn close_time(&self, timeframe: Timeframe) -> DateTime<Utc> {
        self.open_time
            .checked_add_signed(timeframe.duration())
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// How a [`MergedRow`]'s merge key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    /// The keyed main window contains the row.
    Covered,
    /// The main series skipped windows; the key is the nearest preceding main
    /// candle, whose window elapsed before the row opened.
    Gap,
    /// No main candle opened at or before the row; the merge key is undefined.
    Uncovered,
}

/// A detailed candle augmented with the key of its main-timeframe window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRow {
    /// The detailed-timeframe candle.
    pub candle: Candle,
    /// Open time of the associated main candle; `None` when undefined.
    pub merge_key: Option<DateTime<Utc>>,
    /// Classification of the merge key.
    pub coverage: Coverage,
    /// Main-timeframe columns joined onto the row.
    ///
    /// Only ever a main candle that had closed by `merge_key` (or, for equal
    /// timeframes, the candle of the very same window).
    pub main: Option<Candle>,
}

impl MergedRow {
    /// Returns true when the merge key is undefined.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        self.merge_key.is_none()
    }
}

/// Output of a multi-timeframe merge for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedSeries {
    /// Coarse timeframe that produced the merge keys.
    pub main_timeframe: Timeframe,
    /// Fine timeframe of the rows.
    pub detailed_timeframe: Timeframe,
    /// Rows in ascending detailed `open_time` order.
    pub rows: Vec<MergedRow>,
}

impl MergedSeries {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Merge keys in row order.
    #[must_use]
    pub fn merge_keys(&self) -> Vec<Option<DateTime<Utc>>> {
        self.rows.iter().map(|r| r.merge_key).collect()
    }

    /// Number of rows flagged with an undefined merge key.
    #[must_use]
    pub fn undefined_key_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_undefined()).count()
    }

    /// Number of rows keyed across a gap in the main series.
    #[must_use]
    pub fn gap_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.coverage == Coverage::Gap)
            .count()
    }

    /// Drop the leading rows whose merge key is undefined.
    ///
    /// Undefined keys can only occur before the first main candle, so this
    /// removes a prefix and keeps the rest untouched.
    #[must_use]
    pub fn truncate_uncovered(mut self) -> Self {
        self.rows.retain(|r| !r.is_undefined());
        self
    }

    /// Column layout used when exporting the merged table.
    ///
    /// Detailed columns keep their plain names; main columns are suffixed with
    /// the main timeframe token to avoid collisions.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut cols: Vec<String> = ["date", "open", "high", "low", "close", "volume"]
            .into_iter()
            .map(String::from)
            .collect();
        cols.push("merge_key".into());
        cols.push("coverage".into());
        let suffix = self.main_timeframe.to_string();
        for base in ["date", "open", "high", "low", "close", "volume"] {
            cols.push(format!("{base}_{suffix}"));
        }
        cols
    }
}
