//! mtf downloads candle series at two resolutions and merges them without
//! lookahead bias.
//!
//! Overview
//! - Pulls a coarse *main* timeframe (trading decisions) and a fine *detailed*
//!   timeframe (intracandle movement) from sources implementing
//!   `mtf_core::KlineSource`.
//! - Keys every detailed candle to the main window it belongs to via
//!   `mtf_core::merge_timeframes`.
//! - Hands every downloaded series to the registered `mtf_core::CandleSink`s.
//!
//! Key behaviors and trade-offs
//! - Pagination: pages of `page_limit` klines are requested until a short
//!   page arrives or the range end is reached.
//! - Source fallback: sources are tried in registration order, one attempt
//!   each; a series is never stitched together from several sources.
//! - Timeouts: each source call is bounded by `provider_timeout`; a whole
//!   multi-symbol download can be bounded by `request_timeout`.
//! - Fixed end: a download captures its end time once so every symbol ends
//!   on the same bar.
//! - Explicit start: there is no default start date; the builder refuses to
//!   build without a `StartPoint`.
//!
//! Examples
//! Building an orchestrator:
//! ```rust,ignore
//! use std::sync::Arc;
//! use mtf::{Mtf, StartPoint, Timeframe};
//!
//! let mtf = Mtf::builder()
//!     .with_source(Arc::new(ExchangeClient::new()))
//!     .with_sink(Arc::new(CsvSink::new("data/")))
//!     .main_timeframe(Timeframe::H1)
//!     .detailed_timeframe(Timeframe::M1)
//!     .start(StartPoint::Earliest)
//!     .build()?;
//! ```
//!
//! Bulk download:
//! ```rust,ignore
//! let report = mtf
//!     .download()
//!     .symbols(["BTCUSDT", "ETHUSDT"])?
//!     .run()
//!     .await?;
//! if let Some(resp) = report.response.as_ref() {
//!     if let Some(btc) = resp.get("BTCUSDT") {
//!         // inspect btc.merged.rows
//!     }
//! }
//! ```
//!
//! See the `mtf-demos` crate for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use core::{Mtf, MtfBuilder};
pub use router::download::DownloadBuilder;
pub use router::util::{collapse_errors, join_with_deadline};

// Re-export core types for convenience
pub use mtf_core::{
    Candle, CandleSink, Coverage, DownloadReport, DownloadResponse, KlineRequest, KlineSource,
    MainSeries, MergeOptions, MergedRow, MergedSeries, MtfConfig, MtfError, RawKline, StartPoint,
    SymbolHistory, Timeframe, TimeframeUnit, merge_timeframes, merge_timeframes_str,
    parse_timeframe,
};
