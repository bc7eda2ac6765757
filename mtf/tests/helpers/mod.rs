// Shared fixtures so tests can `use crate::helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mtf::{KlineSource, Mtf, MtfBuilder, RawKline, StartPoint, Timeframe};
use rust_decimal::Decimal;

/// Common symbol constants used across tests.
pub const BTC: &str = "BTCUSDT";
pub const ETH: &str = "ETHUSDT";
pub const GAPPY: &str = "GAPPY";

/// Monday 2024-01-01 00:00:00 UTC.
pub const T0: i64 = 1_704_067_200;

/// Construct a UTC `DateTime` from epoch seconds.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

/// One raw kline with flat prices at `px`.
pub fn raw(open_secs: i64, step: i64, px: i64) -> RawKline {
    let p = Decimal::from(px);
    RawKline {
        open_time: open_secs * 1_000,
        open: p,
        high: p,
        low: p,
        close: p,
        volume: Decimal::ONE,
        close_time: (open_secs + step) * 1_000 - 1,
        qav: p,
        num_trades: 1,
        taker_based_vol: Decimal::ZERO,
        taker_quote_vol: Decimal::ZERO,
        ignore: "0".into(),
    }
}

/// `n` consecutive klines of `tf` starting at `start`.
pub fn series(start: i64, tf: Timeframe, n: i64) -> Vec<RawKline> {
    let step = tf.duration_seconds();
    (0..n).map(|i| raw(start + i * step, step, 100 + i)).collect()
}

/// A builder over the deterministic mock with a fixed one-day range.
pub fn day_builder(source: Arc<dyn KlineSource>) -> MtfBuilder {
    Mtf::builder()
        .with_source(source)
        .main_timeframe(Timeframe::H1)
        .detailed_timeframe(Timeframe::M15)
        .start(StartPoint::At(at(T0)))
        .end(at(T0 + 86_400 - 1))
}
