//! Report envelopes produced by the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Candle, MergedSeries, MtfError};

/// Both timeframes and their merge for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolHistory {
    /// Exchange symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Main-timeframe candles, ascending.
    pub main: Vec<Candle>,
    /// Detailed-timeframe candles, ascending.
    pub detailed: Vec<Candle>,
    /// Detailed rows keyed to their main window.
    pub merged: MergedSeries,
}

/// Payload of a multi-symbol download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    /// End of the range, shared by every symbol in the batch.
    pub end: DateTime<Utc>,
    /// One entry per successfully downloaded symbol, in request order.
    pub entries: Vec<SymbolHistory>,
}

impl DownloadResponse {
    /// Look up the entry for a symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&SymbolHistory> {
        self.entries.iter().find(|e| e.symbol == symbol)
    }
}

/// Summary of a multi-symbol download.
///
/// Wraps a [`DownloadResponse`] when at least one symbol succeeded, plus any
/// per-symbol failures as `warnings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DownloadReport {
    /// Aggregated download payload.
    pub response: Option<DownloadResponse>,
    /// Non-fatal issues encountered while building the report.
    pub warnings: Vec<MtfError>,
}
