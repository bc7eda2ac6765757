//! Configuration types shared by the orchestrator and the merge engine.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Timeframe;

/// Where a download range begins.
///
/// There is no implicit default date: callers pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartPoint {
    /// Ask each source for the earliest timestamp it can serve for the symbol.
    Earliest,
    /// Start at a fixed instant.
    At(DateTime<Utc>),
}

/// How the main-timeframe series is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MainSeries {
    /// Download the main timeframe from the source like the detailed one.
    #[default]
    Download,
    /// Aggregate the downloaded detailed series into main-timeframe candles.
    /// Halves the number of source requests at the cost of trusting the
    /// detailed series to be complete.
    ResampleDetailed,
}

/// Options for the multi-timeframe merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Join main OHLCV columns onto each row (most recently closed main candle only).
    pub attach_main: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { attach_main: true }
    }
}

/// Global configuration for the `Mtf` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MtfConfig {
    /// Coarse timeframe used for trading decisions.
    pub main_timeframe: Timeframe,
    /// Fine timeframe used to inspect intracandle movement.
    pub detailed_timeframe: Timeframe,
    /// Start of the download range. Required; the builder rejects `None`.
    pub start: Option<StartPoint>,
    /// End of the download range. `None` means "now", captured once per
    /// download so every symbol ends on the same bar.
    pub end: Option<DateTime<Utc>>,
    /// Maximum number of klines requested per page.
    pub page_limit: u32,
    /// How the main series is obtained.
    pub main_series: MainSeries,
    /// Merge behavior.
    pub merge: MergeOptions,
    /// Timeout for individual source requests.
    pub provider_timeout: Duration,
    /// Optional overall deadline for a multi-symbol download.
    pub request_timeout: Option<Duration>,
}

impl Default for MtfConfig {
    fn default() -> Self {
        Self {
            main_timeframe: Timeframe::H1,
            detailed_timeframe: Timeframe::M1,
            start: None,
            end: None,
            page_limit: 800,
            main_series: MainSeries::default(),
            merge: MergeOptions::default(),
            provider_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}
