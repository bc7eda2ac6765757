use std::sync::Arc;

use chrono::{DateTime, Utc};
use mtf_core::{
    CandleSink, KlineSource, MainSeries, MergeOptions, MtfConfig, MtfError, StartPoint, Timeframe,
};

/// Orchestrator that downloads both timeframes for a symbol, merges them and
/// hands the series to the registered sinks.
pub struct Mtf {
    pub(crate) sources: Vec<Arc<dyn KlineSource>>,
    pub(crate) sinks: Vec<Arc<dyn CandleSink>>,
    pub(crate) cfg: MtfConfig,
}

/// Builder for constructing an `Mtf` orchestrator with custom configuration.
pub struct MtfBuilder {
    sources: Vec<Arc<dyn KlineSource>>,
    sinks: Vec<Arc<dyn CandleSink>>,
    cfg: MtfConfig,
}

impl Default for MtfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MtfBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no sources and no sinks; register at least one source via
    ///   [`with_source`](Self::with_source).
    /// - Defaults: `1h` main, `1m` detailed, pages of 800 klines, 10s per
    ///   source call, no overall deadline.
    /// - There is no default start point. Pick one with [`start`](Self::start)
    ///   or `build()` fails.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(MtfConfig::default())
    }

    /// Start from a complete configuration, e.g. one deserialized from a file.
    #[must_use]
    pub const fn from_config(cfg: MtfConfig) -> Self {
        Self {
            sources: vec![],
            sinks: vec![],
            cfg,
        }
    }

    /// Register a kline source.
    ///
    /// Behavior and trade-offs:
    /// - Sources are tried in registration order. A source that fails, times
    ///   out or has no data for the symbol is skipped in favor of the next.
    /// - A series is always taken whole from one source; pages are never
    ///   stitched across sources.
    #[must_use]
    pub fn with_source(mut self, s: Arc<dyn KlineSource>) -> Self {
        self.sources.push(s);
        self
    }

    /// Register a sink that receives every downloaded series.
    ///
    /// Behavior and trade-offs:
    /// - Only [`DownloadBuilder::run`](crate::DownloadBuilder::run) persists;
    ///   [`Mtf::history`] never writes.
    /// - A sink failure is reported as a warning and does not drop the symbol
    ///   from the report.
    #[must_use]
    pub fn with_sink(mut self, s: Arc<dyn CandleSink>) -> Self {
        self.sinks.push(s);
        self
    }

    /// Set the coarse timeframe used for trading decisions.
    #[must_use]
    pub const fn main_timeframe(mut self, tf: Timeframe) -> Self {
        self.cfg.main_timeframe = tf;
        self
    }

    /// Set the fine timeframe used to inspect intracandle movement.
    #[must_use]
    pub const fn detailed_timeframe(mut self, tf: Timeframe) -> Self {
        self.cfg.detailed_timeframe = tf;
        self
    }

    /// Set where the download range begins.
    ///
    /// Behavior and trade-offs:
    /// - `StartPoint::At` fixes the same start for every symbol.
    /// - `StartPoint::Earliest` asks each source for the symbol's first
    ///   available kline, costing one extra call per series.
    #[must_use]
    pub const fn start(mut self, start: StartPoint) -> Self {
        self.cfg.start = Some(start);
        self
    }

    /// Set a fixed end of the download range.
    ///
    /// When unset, each download captures "now" once and uses it for every
    /// symbol so all series end on the same bar.
    #[must_use]
    pub const fn end(mut self, end: DateTime<Utc>) -> Self {
        self.cfg.end = Some(end);
        self
    }

    /// Set the maximum number of klines requested per page.
    ///
    /// Behavior and trade-offs:
    /// - Larger pages mean fewer round trips but bigger responses; exchanges
    ///   typically cap this around 1000.
    /// - A page shorter than this limit ends pagination.
    #[must_use]
    pub const fn page_limit(mut self, limit: u32) -> Self {
        self.cfg.page_limit = limit;
        self
    }

    /// Select how the main series is obtained.
    ///
    /// Behavior and trade-offs:
    /// - `Download`: one more paginated fetch per symbol; main candles are
    ///   exactly what the source publishes.
    /// - `ResampleDetailed`: no extra requests, but gaps in the detailed
    ///   series leak into the main candles.
    #[must_use]
    pub const fn main_series(mut self, mode: MainSeries) -> Self {
        self.cfg.main_series = mode;
        self
    }

    /// Set merge options.
    #[must_use]
    pub const fn merge_options(mut self, opts: MergeOptions) -> Self {
        self.cfg.merge = opts;
        self
    }

    /// Set the per-source request timeout.
    ///
    /// Behavior and trade-offs:
    /// - Bounds every single page request and earliest-timestamp lookup.
    /// - A timed-out source counts as failed and the next source is tried.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Set an overall deadline for multi-symbol downloads.
    ///
    /// Behavior and trade-offs:
    /// - Bounds total latency even when many pages are needed.
    /// - When exceeded, the whole download returns `RequestTimeout`.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Build the `Mtf` orchestrator.
    ///
    /// # Errors
    /// - `InvalidArg` if no sources are registered, no start point is set, the
    ///   page limit is zero, or a fixed start lies after a fixed end.
    /// - `IncompatibleTimeframes` if the detailed timeframe is coarser than
    ///   the main one.
    pub fn build(self) -> Result<Mtf, MtfError> {
        if self.sources.is_empty() {
            return Err(MtfError::InvalidArg(
                "no sources registered; add at least one via with_source(...)".to_string(),
            ));
        }
        let Some(start) = self.cfg.start else {
            return Err(MtfError::InvalidArg(
                "no start point set; choose one via start(StartPoint::...)".to_string(),
            ));
        };
        if self.cfg.page_limit == 0 {
            return Err(MtfError::InvalidArg("page_limit must be positive".to_string()));
        }
        if let (StartPoint::At(s), Some(e)) = (start, self.cfg.end)
            && s > e
        {
            return Err(MtfError::InvalidArg(format!("start {s} is after end {e}")));
        }
        let (main, detailed) = (self.cfg.main_timeframe, self.cfg.detailed_timeframe);
        if main.duration_seconds() < detailed.duration_seconds() {
            return Err(MtfError::IncompatibleTimeframes {
                main: main.to_string(),
                detailed: detailed.to_string(),
            });
        }

        Ok(Mtf {
            sources: self.sources,
            sinks: self.sinks,
            cfg: self.cfg,
        })
    }
}

pub fn tag_err(source: &str, e: MtfError) -> MtfError {
    match e {
        e @ (MtfError::NotFound { .. }
        | MtfError::ProviderTimeout { .. }
        | MtfError::Connector { .. }
        | MtfError::RequestTimeout { .. }
        | MtfError::AllProvidersTimedOut { .. }
        | MtfError::AllProvidersFailed(_)) => e,
        other => MtfError::Connector {
            connector: source.to_string(),
            msg: other.to_string(),
        },
    }
}

impl Mtf {
    /// Wrap a source future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mtf::core::provider_call_with_timeout",
            skip(fut),
            fields(
                source = source_name,
                capability = capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        source_name: &'static str,
        capability: &'static str,
        timeout: std::time::Duration,
        fut: Fut,
    ) -> Result<T, MtfError>
    where
        Fut: core::future::Future<Output = Result<T, MtfError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(MtfError::provider_timeout(source_name, capability)))
    }

    /// Start building a new `Mtf` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use mtf::{Mtf, StartPoint, Timeframe};
    ///
    /// let mtf = Mtf::builder()
    ///     .with_source(Arc::new(ExchangeClient::new()))
    ///     .main_timeframe(Timeframe::H4)
    ///     .detailed_timeframe(Timeframe::M15)
    ///     .start(StartPoint::Earliest)
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> MtfBuilder {
        MtfBuilder::new()
    }

    /// The configuration this orchestrator was built with.
    #[must_use]
    pub const fn config(&self) -> &MtfConfig {
        &self.cfg
    }

    /// End of the range for a download started now.
    pub(crate) fn resolve_end(&self) -> DateTime<Utc> {
        self.cfg.end.unwrap_or_else(Utc::now)
    }
}
