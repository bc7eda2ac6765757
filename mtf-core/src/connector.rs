use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::timeseries::normalize::RawKline;
use crate::{Candle, MtfError, Timeframe};

/// One page of klines to fetch from a source.
///
/// The range is `[start, end]` on kline open times; a source returns at most
/// `limit` klines in ascending order, beginning at the first kline that opens
/// at or after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineRequest {
    /// Exchange symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Requested resolution.
    pub timeframe: Timeframe,
    /// Inclusive lower bound on open time.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound on open time.
    pub end: DateTime<Utc>,
    /// Maximum number of klines in the page.
    pub limit: u32,
}

/// A provider of historical klines, such as an exchange REST client.
///
/// Implementations own their credentials and transport. They return raw
/// exchange records; normalization into [`Candle`]s happens in the core.
#[async_trait]
pub trait KlineSource: Send + Sync {
    /// Stable name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Fetch one page of klines.
    async fn klines(&self, req: &KlineRequest) -> Result<Vec<RawKline>, MtfError>;

    /// Earliest open time the source can serve for `symbol` at `timeframe`.
    ///
    /// Only used to bound the requested range; never consulted by the merge.
    async fn earliest_timestamp(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<DateTime<Utc>, MtfError>;
}

/// A destination for normalized candle tables, one per (symbol, timeframe).
///
/// The sink decides file paths and formats; the core only hands over rows
/// with normalized columns (`date`, `open`, `high`, `low`, `close`, `volume`).
#[async_trait]
pub trait CandleSink: Send + Sync {
    /// Stable name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Persist one series.
    async fn store_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<(), MtfError>;
}
