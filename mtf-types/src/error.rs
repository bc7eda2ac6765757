use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the mtf workspace.
///
/// This covers timeframe parsing failures, merge precondition violations,
/// data-shape problems, and failures reported by the data-source and
/// persistence collaborators.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MtfError {
    /// The timeframe token is empty or its amount is not a positive integer.
    #[error("invalid timeframe format: {token:?}")]
    InvalidTimeframeFormat {
        /// The token as supplied by the caller.
        token: String,
    },

    /// The timeframe unit is not one of `s`, `m`, `h`, `d`, `w`, `M`, `y`.
    #[error("timeframe unit \"{unit}\" is not supported")]
    UnsupportedTimeframeUnit {
        /// The offending unit.
        unit: String,
    },

    /// The detailed timeframe is coarser than the main timeframe.
    #[error("detailed timeframe {detailed} is coarser than main timeframe {main}")]
    IncompatibleTimeframes {
        /// Main (coarse) timeframe token.
        main: String,
        /// Detailed (fine) timeframe token.
        detailed: String,
    },

    /// Issues with the returned or expected data (ordering, duplicates, bad fields).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// A data source returned an error.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Source name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A persistence sink rejected a series.
    #[error("sink {sink} failed: {msg}")]
    Sink {
        /// Sink name that failed.
        sink: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A symbol or resource could not be found.
    #[error("not found: {what}")]
    NotFound {
        /// Description of missing resource, e.g. "klines for BTCUSDT".
        what: String,
    },

    /// All configured sources failed; contains the individual failures.
    #[error("all sources failed: {0:?}")]
    AllProvidersFailed(Vec<MtfError>),

    /// An individual source call exceeded the configured timeout.
    #[error("source timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Source name that timed out.
        connector: String,
        /// Capability label (e.g. "klines", "earliest").
        capability: String,
    },

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Capability label for which the request timed out.
        capability: String,
    },

    /// All attempted sources timed out for the requested capability.
    #[error("all sources timed out: {capability}")]
    AllProvidersTimedOut {
        /// Capability label that timed out across all sources.
        capability: String,
    },
}

impl MtfError {
    /// Helper: build an `InvalidTimeframeFormat` error for a token.
    pub fn invalid_timeframe_format(token: impl Into<String>) -> Self {
        Self::InvalidTimeframeFormat {
            token: token.into(),
        }
    }

    /// Helper: build an `UnsupportedTimeframeUnit` error for a unit.
    pub fn unsupported_unit(unit: impl Into<String>) -> Self {
        Self::UnsupportedTimeframeUnit { unit: unit.into() }
    }

    /// Helper: build a `Connector` error with the source name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Sink` error with the sink name and message.
    pub fn sink(sink: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Flatten nested `AllProvidersFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllProvidersFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
