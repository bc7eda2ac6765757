use std::collections::HashSet;

use mtf_core::{DownloadReport, DownloadResponse, MtfError, SymbolHistory};

use crate::Mtf;
use crate::router::util::with_request_deadline;

/// Builder to orchestrate bulk downloads for multiple symbols.
pub struct DownloadBuilder<'a> {
    pub(crate) mtf: &'a Mtf,
    pub(crate) symbols: Vec<String>,
}

impl<'a> DownloadBuilder<'a> {
    /// Create a new builder bound to an `Mtf` instance.
    ///
    /// Behavior:
    /// - Starts with an empty symbol list.
    /// - Timeframes, range and sinks come from the orchestrator's configuration.
    #[must_use]
    pub const fn new(mtf: &'a Mtf) -> Self {
        Self {
            mtf,
            symbols: Vec::new(),
        }
    }

    /// Replace the symbol list.
    ///
    /// Trade-offs: Replaces any previously added symbols; use `add_symbol`
    /// if you need to append.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the list contains the same symbol twice.
    pub fn symbols<I, S>(mut self, symbols: I) -> Result<Self, MtfError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let symbols: Vec<String> = symbols.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for symbol in &symbols {
            if !seen.insert(symbol.as_str()) {
                return Err(MtfError::InvalidArg(format!(
                    "duplicate symbol '{symbol}' in symbols list"
                )));
            }
        }
        self.symbols = symbols;
        Ok(self)
    }

    /// Add a single symbol to the list.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the symbol is already in the list.
    pub fn add_symbol(mut self, symbol: impl Into<String>) -> Result<Self, MtfError> {
        let symbol = symbol.into();
        if self.symbols.iter().any(|existing| *existing == symbol) {
            return Err(MtfError::InvalidArg(format!(
                "duplicate symbol '{symbol}' already exists in symbols list"
            )));
        }
        self.symbols.push(symbol);
        Ok(self)
    }

    /// Execute the download for every symbol and aggregate the results.
    ///
    /// Behavior and trade-offs:
    /// - Captures the end of the range once, so every symbol ends on the
    ///   same bar even when the batch takes a while.
    /// - Symbols are fetched concurrently; each follows the same rules as
    ///   [`Mtf::history`].
    /// - Every successful symbol's main and detailed series are handed to
    ///   each registered sink, in symbol order.
    /// - Per-symbol failures and sink failures become `warnings` without
    ///   aborting the batch. `response` is `None` when no symbol succeeded.
    ///
    /// # Errors
    /// Returns an error only if no symbols are specified or if the overall
    /// request-level timeout elapses.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mtf::router::download",
            skip(self),
            fields(symbols = self.symbols.len()),
        )
    )]
    pub async fn run(self) -> Result<DownloadReport, MtfError> {
        if self.symbols.is_empty() {
            return Err(MtfError::InvalidArg(
                "no symbols specified for download".into(),
            ));
        }

        let mtf = self.mtf;
        let end = mtf.resolve_end();
        let tasks = self.symbols.iter().map(|symbol| async move {
            (symbol.as_str(), mtf.history_until(symbol, end).await)
        });

        let joined: Vec<(&str, Result<SymbolHistory, MtfError>)> = with_request_deadline(
            "download",
            mtf.cfg.request_timeout,
            futures::future::join_all(tasks),
        )
        .await?;

        let mut entries: Vec<SymbolHistory> = Vec::new();
        let mut warnings: Vec<MtfError> = Vec::new();
        for (_symbol, result) in joined {
            match result {
                Ok(history) => {
                    warnings.extend(mtf.persist(&history).await);
                    entries.push(history);
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    {
                        tracing::warn!(symbol = _symbol, error = %e, "symbol failed");
                    }
                    warnings.push(e);
                }
            }
        }

        let response = if entries.is_empty() {
            None
        } else {
            Some(DownloadResponse { end, entries })
        };

        Ok(DownloadReport { response, warnings })
    }
}

impl Mtf {
    /// Begin building a bulk download request.
    ///
    /// Typical usage: chain `symbols`/`add_symbol` then call `run()`.
    #[must_use]
    pub const fn download(&'_ self) -> DownloadBuilder<'_> {
        DownloadBuilder::new(self)
    }

    /// Hand both series of one symbol to every sink, collecting failures.
    async fn persist(&self, history: &SymbolHistory) -> Vec<MtfError> {
        let mut failures = Vec::new();
        let series = [
            (self.cfg.main_timeframe, &history.main),
            (self.cfg.detailed_timeframe, &history.detailed),
        ];
        for sink in &self.sinks {
            for (timeframe, candles) in series {
                if let Err(e) = sink.store_series(&history.symbol, timeframe, candles).await {
                    failures.push(match e {
                        e @ MtfError::Sink { .. } => e,
                        other => MtfError::sink(sink.name(), other.to_string()),
                    });
                }
            }
        }
        failures
    }
}
