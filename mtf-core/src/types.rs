//! Re-export of foundational types from `mtf-types`.
// Consolidated re-exports so downstream crates can depend on `mtf-core` only

pub use mtf_types::{
    Candle, Coverage, DownloadReport, DownloadResponse, MainSeries, MergeOptions, MergedRow,
    MergedSeries, MtfConfig, MtfError, StartPoint, SymbolHistory, Timeframe, TimeframeUnit,
};

pub use rust_decimal::Decimal;
