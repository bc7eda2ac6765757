//! Deterministic collaborators for mtf tests and demos.
//!
//! - [`MockSource`] synthesizes klines for a fixed set of symbols at any
//!   timeframe, on the same window grid as `mtf_core::window_start` (weeks
//!   open on Monday), without touching the network.
//! - [`MemorySink`] keeps stored series in memory so tests can inspect them.
//! - [`DynamicMockSource`] defers every answer to a test-side controller.
//!
//! Special symbols on [`MockSource`]: `FAIL` returns a connector error,
//! `TIMEOUT` sleeps before answering, `GAPPY` skips every fifth window at
//! hourly or coarser timeframes. Unknown symbols return `NotFound`.
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mtf_core::{
    Candle, CandleSink, KlineRequest, KlineSource, MtfError, RawKline, Timeframe, window_start,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};

/// Latency injected for the `TIMEOUT` symbol.
pub const TIMEOUT_DELAY: Duration = Duration::from_millis(200);

/// Mock kline source for CI-safe examples. Data is a pure function of the
/// symbol, timeframe and window start.
pub struct MockSource;

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn maybe_fail_or_timeout(symbol: &str, capability: &'static str) -> Result<(), MtfError> {
        match symbol {
            "FAIL" => Err(MtfError::connector(
                "mtf-mock",
                format!("forced failure: {capability}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(TIMEOUT_DELAY).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn profile(symbol: &str) -> Result<fixtures::SymbolProfile, MtfError> {
        fixtures::by_symbol(symbol).ok_or_else(|| MtfError::not_found(format!("symbol {symbol}")))
    }
}

/// Synthetic price in cents at `secs`: a slow triangle wave around `base`.
fn price_cents(base: i64, secs: i64) -> i64 {
    let minute = secs.div_euclid(60);
    let phase = minute.rem_euclid(240);
    let tri = if phase < 120 { phase } else { 240 - phase };
    base + base / 1_000 * (tri - 60) / 10
}

fn synth_kline(base: i64, open_secs: i64, step: i64) -> RawKline {
    let open = price_cents(base, open_secs);
    let close = price_cents(base, open_secs.saturating_add(step));
    let spread = (base / 2_000).max(1);
    let high = open.max(close) + spread;
    let low = (open.min(close) - spread).max(1);
    let volume = Decimal::from(10 + open_secs.div_euclid(step).rem_euclid(10));
    let close_px = Decimal::new(close, 2);
    RawKline {
        open_time: open_secs * 1_000,
        open: Decimal::new(open, 2),
        high: Decimal::new(high, 2),
        low: Decimal::new(low, 2),
        close: close_px,
        volume,
        close_time: open_secs.saturating_add(step).saturating_mul(1_000) - 1,
        qav: volume * close_px,
        num_trades: 100 + u64::try_from(open_secs.div_euclid(step).rem_euclid(50)).unwrap_or(0),
        taker_based_vol: volume / Decimal::TWO,
        taker_quote_vol: volume * close_px / Decimal::TWO,
        ignore: "0".to_string(),
    }
}

/// Window starts in `[start, end]` on the grid `origin + i * step`, skipping
/// gaps when asked.
fn window_starts(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    origin: i64,
    step: i64,
    skip_gaps: bool,
) -> impl Iterator<Item = i64> {
    let from = start.timestamp() - origin;
    let first = from.div_euclid(step) + i64::from(from.rem_euclid(step) != 0);
    let last = (end.timestamp() - origin).div_euclid(step);
    (first..=last)
        .filter(move |i| !(skip_gaps && i.rem_euclid(5) == 2))
        .map(move |i| origin + i * step)
}

#[async_trait]
impl KlineSource for MockSource {
    fn name(&self) -> &'static str {
        "mtf-mock"
    }

    async fn klines(&self, req: &KlineRequest) -> Result<Vec<RawKline>, MtfError> {
        Self::maybe_fail_or_timeout(&req.symbol, "klines").await?;
        let profile = Self::profile(&req.symbol)?;
        let step = req.timeframe.duration_seconds();
        let start = req.start.max(profile.listed_at());
        let skip_gaps = profile.gappy && step >= Timeframe::H1.duration_seconds();
        let limit = usize::try_from(req.limit).unwrap_or(usize::MAX);
        // Weeks open on Monday, so their grid is not anchored at the epoch.
        let origin = window_start(DateTime::UNIX_EPOCH, req.timeframe).map_or(0, |t| t.timestamp());
        Ok(window_starts(start, req.end, origin, step, skip_gaps)
            .take(limit)
            .map(|t| synth_kline(profile.base_cents, t, step))
            .collect())
    }

    async fn earliest_timestamp(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<DateTime<Utc>, MtfError> {
        Self::maybe_fail_or_timeout(symbol, "earliest_timestamp").await?;
        Ok(Self::profile(symbol)?.listed_at())
    }
}

/// In-memory sink keyed by (symbol, timeframe).
///
/// Later writes for the same key replace earlier ones.
#[derive(Default)]
pub struct MemorySink {
    stored: Mutex<HashMap<(String, Timeframe), Vec<Candle>>>,
    fail_symbols: Vec<String>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects writes for the given symbols.
    #[must_use]
    pub fn failing_on<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stored: Mutex::new(HashMap::new()),
            fail_symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Copy of the series stored for `symbol` at `timeframe`, if any.
    pub async fn get(&self, symbol: &str, timeframe: Timeframe) -> Option<Vec<Candle>> {
        let guard = self.stored.lock().await;
        guard.get(&(symbol.to_string(), timeframe)).cloned()
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<(String, Timeframe)> {
        let guard = self.stored.lock().await;
        let mut keys: Vec<_> = guard.keys().cloned().collect();
        keys.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then(a.1.duration_seconds().cmp(&b.1.duration_seconds()))
        });
        keys
    }
}

#[async_trait]
impl CandleSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn store_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<(), MtfError> {
        if self.fail_symbols.iter().any(|s| s == symbol) {
            return Err(MtfError::sink("memory", format!("write rejected for {symbol}")));
        }
        let mut guard = self.stored.lock().await;
        guard.insert((symbol.to_string(), timeframe), candles.to_vec());
        Ok(())
    }
}
