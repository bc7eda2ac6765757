//! mtf-core
//!
//! Core types, collaborator traits, and time-series utilities shared across
//! the mtf workspace.
//!
//! - `types`: re-exported data structures (candles, timeframes, merged rows, config).
//! - `connector`: the `KlineSource` and `CandleSink` traits implemented by
//!   exchange clients and persistence backends.
//! - `timeseries`: timeframe parsing, kline normalization, the
//!   multi-timeframe merge engine, series inference, and resampling.
//!
//! Everything under `timeseries` is synchronous and pure: a merge is a
//! function of its two input series and may run on any thread, any number of
//! times. Async only appears at the `connector` boundary.
//!
//! ```
//! use mtf_core::{merge_timeframes, Candle, MergeOptions, Timeframe};
//! use chrono::DateTime;
//! use rust_decimal::Decimal;
//!
//! let c = |secs: i64| Candle {
//!     open_time: DateTime::from_timestamp(secs, 0).unwrap(),
//!     open: Decimal::ONE, high: Decimal::ONE, low: Decimal::ONE,
//!     close: Decimal::ONE, volume: Decimal::ZERO,
//! };
//! let main = vec![c(0), c(3_600), c(7_200)];
//! let detailed = vec![c(0), c(1_800), c(3_600), c(6_300)];
//! let merged = merge_timeframes(
//!     &main, &detailed, Timeframe::H1, Timeframe::M30, &MergeOptions::default(),
//! ).unwrap();
//! let keys: Vec<i64> = merged.rows.iter().map(|r| r.merge_key.unwrap().timestamp()).collect();
//! assert_eq!(keys, vec![0, 0, 3_600, 3_600]);
//! ```
#![warn(missing_docs)]

/// Data-source and persistence collaborator traits.
pub mod connector;
/// Time-series utilities: parsing, normalization, merging, inference, resampling.
pub mod timeseries;
pub mod types;

#[cfg(feature = "dataframe")]
/// Conversion of candle series and merged tables into `polars` data frames.
pub mod dataframe;

pub use connector::{CandleSink, KlineRequest, KlineSource};
pub use timeseries::infer::{
    SeriesGap, estimate_step_seconds, find_gaps, validate_series, validate_step,
};
pub use timeseries::merge::{merge_timeframes, merge_timeframes_str};
pub use timeseries::normalize::{RawKline, datetime_to_millis, millis_to_datetime, normalize_klines};
pub use timeseries::resample::{resample, window_start};
pub use timeseries::timeframe::{parse_timeframe, timeframe_to_minutes, timeframe_to_seconds};
pub use types::*;

#[cfg(feature = "dataframe")]
pub use dataframe::ToDataFrame;
