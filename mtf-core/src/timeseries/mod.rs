//! Time-series utilities shared by sources, sinks and the orchestrator.
//!
//! Modules include:
//! - `timeframe`: parse timeframe tokens into durations
//! - `normalize`: turn raw exchange klines into normalized candles
//! - `merge`: key detailed candles to their main-timeframe window without lookahead
//! - `infer`: infer cadence and detect gaps
//! - `resample`: aggregate candles to a coarser timeframe
/// Series inference and validation helpers.
pub mod infer;
/// Multi-timeframe merge engine.
pub mod merge;
/// Raw kline normalization.
pub mod normalize;
/// Resampling to coarser timeframes.
pub mod resample;
/// Timeframe token parsing helpers.
pub mod timeframe;
