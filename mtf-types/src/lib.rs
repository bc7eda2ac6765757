//! Data transfer objects and configuration primitives shared across the mtf workspace.
#![warn(missing_docs)]

mod candle;
mod config;
mod error;
mod reports;
mod timeframe;

pub use candle::{Candle, Coverage, MergedRow, MergedSeries};
pub use config::{MainSeries, MergeOptions, MtfConfig, StartPoint};
pub use error::MtfError;
pub use reports::{DownloadReport, DownloadResponse, SymbolHistory};
pub use timeframe::{Timeframe, TimeframeUnit};
