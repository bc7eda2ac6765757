use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::timeseries::infer::validate_series;
use crate::{Candle, MtfError};

/// A kline exactly as exchanges ship it: a 12-element array
///
/// `[open_time, open, high, low, close, volume, close_time, qav, num_trades,
///   taker_based_vol, taker_quote_vol, ignore]`
///
/// with millisecond timestamps and string-encoded decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawKline {
    /// Open time in epoch milliseconds.
    pub open_time: i64,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Base-asset volume.
    pub volume: Decimal,
    /// Close time in epoch milliseconds (`open_time + duration - 1`).
    pub close_time: i64,
    /// Quote-asset volume.
    pub qav: Decimal,
    /// Number of trades.
    pub num_trades: u64,
    /// Taker buy base-asset volume.
    pub taker_based_vol: Decimal,
    /// Taker buy quote-asset volume.
    pub taker_quote_vol: Decimal,
    /// Unused trailing field.
    pub ignore: String,
}

impl RawKline {
    /// Keep the normalized columns and drop the exchange-specific ones.
    ///
    /// `open_time` becomes a UTC timestamp and `qav` becomes `volume`;
    /// `close_time`, base `volume`, `num_trades`, both taker volumes and
    /// `ignore` are dropped.
    ///
    /// # Errors
    /// Returns `Data` if `open_time` is outside the representable range.
    pub fn into_candle(self) -> Result<Candle, MtfError> {
        Ok(Candle {
            open_time: millis_to_datetime(self.open_time)?,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.qav,
        })
    }
}

/// Normalize a batch of raw klines into a validated candle series.
///
/// # Errors
/// Returns `Data` if a timestamp is out of range or if open times are not
/// strictly increasing.
pub fn normalize_klines(raw: Vec<RawKline>) -> Result<Vec<Candle>, MtfError> {
    let candles = raw
        .into_iter()
        .map(RawKline::into_candle)
        .collect::<Result<Vec<_>, _>>()?;
    validate_series(&candles)?;
    Ok(candles)
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn datetime_to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Convert epoch milliseconds to a UTC timestamp.
///
/// # Errors
/// Returns `Data` if `ms` is outside the representable range.
pub fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, MtfError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| MtfError::Data(format!("timestamp out of range: {ms}ms")))
}
