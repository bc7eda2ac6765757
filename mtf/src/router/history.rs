use chrono::{DateTime, Utc};
use mtf_core::{
    Candle, KlineRequest, KlineSource, MainSeries, MtfError, StartPoint, SymbolHistory, Timeframe,
    merge_timeframes, normalize_klines, resample, validate_step, window_start,
};

use crate::Mtf;
use crate::core::tag_err;
use crate::router::util::collapse_errors;

const KLINES: &str = "klines";
const EARLIEST: &str = "earliest_timestamp";

impl Mtf {
    /// Download both timeframes for `symbol` and merge them.
    ///
    /// Behavior and trade-offs:
    /// - The range ends at the configured end, or "now" captured once.
    /// - Each series comes whole from the first source that serves it.
    /// - Nothing is persisted; use [`download`](Self::download) to reach the sinks.
    ///
    /// # Errors
    /// - `InvalidArg` for an empty symbol.
    /// - `NotFound` if no source has data for the symbol, `AllProvidersTimedOut`
    ///   if every source timed out, otherwise `AllProvidersFailed`. Malformed
    ///   or unordered pages count as a failure of the source that sent them.
    /// - `Data` if the main series holds duplicate open times.
    pub async fn history(&self, symbol: &str) -> Result<SymbolHistory, MtfError> {
        self.history_until(symbol, self.resolve_end()).await
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mtf::router::history",
            skip(self),
            fields(
                main = %self.cfg.main_timeframe,
                detailed = %self.cfg.detailed_timeframe,
            ),
        )
    )]
    pub(crate) async fn history_until(
        &self,
        symbol: &str,
        end: DateTime<Utc>,
    ) -> Result<SymbolHistory, MtfError> {
        if symbol.trim().is_empty() {
            return Err(MtfError::InvalidArg("symbol must not be empty".into()));
        }
        let main_tf = self.cfg.main_timeframe;
        let detailed_tf = self.cfg.detailed_timeframe;

        let (main, detailed) = match self.cfg.main_series {
            MainSeries::Download => {
                futures::future::try_join(
                    self.fetch_series(symbol, main_tf, end),
                    self.fetch_series(symbol, detailed_tf, end),
                )
                .await?
            }
            MainSeries::ResampleDetailed => {
                let detailed = self.fetch_series(symbol, detailed_tf, end).await?;
                (resample(&detailed, main_tf), detailed)
            }
        };

        let merged = merge_timeframes(&main, &detailed, main_tf, detailed_tf, &self.cfg.merge)?;
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                symbol,
                main = main.len(),
                detailed = detailed.len(),
                uncovered = merged.undefined_key_count(),
                gaps = merged.gap_count(),
                "history merged"
            );
        }
        Ok(SymbolHistory {
            symbol: symbol.to_string(),
            main,
            detailed,
            merged,
        })
    }

    /// Fetch one series, trying each source in order until one returns data.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "mtf::router::fetch_series",
            skip(self),
            fields(timeframe = %timeframe),
        )
    )]
    pub(crate) async fn fetch_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MtfError> {
        let mut errors: Vec<MtfError> = Vec::new();
        for src in &self.sources {
            let outcome = self.fetch_from(src.as_ref(), symbol, timeframe, end).await;
            match outcome {
                Ok(candles) if !candles.is_empty() => {
                    #[cfg(feature = "tracing")]
                    {
                        if !timeframe.unit().is_calendar() {
                            let gaps = mtf_core::find_gaps(&candles, timeframe);
                            if !gaps.is_empty() {
                                tracing::debug!(
                                    source = src.name(),
                                    gaps = gaps.len(),
                                    missing = gaps.iter().map(|g| g.missing).sum::<i64>(),
                                    "series has missing windows"
                                );
                            }
                        }
                    }
                    return Ok(candles);
                }
                Ok(_) => errors.push(MtfError::not_found(format!(
                    "{timeframe} klines for {symbol} from {}",
                    src.name()
                ))),
                Err(e @ (MtfError::NotFound { .. } | MtfError::ProviderTimeout { .. })) => {
                    errors.push(e);
                }
                Err(e) => errors.push(tag_err(src.name(), e)),
            }
            #[cfg(feature = "tracing")]
            {
                if let Some(e) = errors.last() {
                    tracing::warn!(source = src.name(), error = %e, "source skipped");
                }
            }
        }
        Err(collapse_errors(
            KLINES,
            errors,
            Some(format!("{timeframe} klines for {symbol}")),
        ))
    }

    /// Page through one source from the resolved start up to `end`.
    ///
    /// Pagination stops at the first page shorter than the page limit, or
    /// once the next window would open after `end`. A page whose spacing does
    /// not fit `timeframe` fails the source.
    async fn fetch_from(
        &self,
        src: &dyn KlineSource,
        symbol: &str,
        timeframe: Timeframe,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MtfError> {
        let name = src.name();
        let timeout = self.cfg.provider_timeout;
        let start = match self.cfg.start {
            Some(StartPoint::At(t)) => window_start(t, timeframe).unwrap_or(t),
            Some(StartPoint::Earliest) => {
                Self::provider_call_with_timeout(
                    name,
                    EARLIEST,
                    timeout,
                    src.earliest_timestamp(symbol, timeframe),
                )
                .await?
            }
            None => return Err(MtfError::InvalidArg("no start point set".into())),
        };
        let limit = self.cfg.page_limit;
        let full_page = usize::try_from(limit).unwrap_or(usize::MAX);

        let mut out: Vec<Candle> = Vec::new();
        let mut cursor = start;
        while cursor <= end {
            let req = KlineRequest {
                symbol: symbol.to_string(),
                timeframe,
                start: cursor,
                end,
                limit,
            };
            let page =
                Self::provider_call_with_timeout(name, KLINES, timeout, src.klines(&req)).await?;
            let fetched = page.len();
            let candles = normalize_klines(page)?;
            validate_step(&candles, timeframe)?;
            let Some(last) = candles.last().map(|c| c.open_time) else {
                break;
            };
            out.extend(
                candles
                    .into_iter()
                    .filter(|c| c.open_time >= cursor && c.open_time <= end),
            );
            if fetched < full_page {
                break;
            }
            let Some(next) = last.checked_add_signed(timeframe.duration()) else {
                break;
            };
            if next <= cursor {
                return Err(MtfError::Data(format!(
                    "{name} returned a full page that does not advance past {cursor}"
                )));
            }
            cursor = next;
        }
        Ok(out)
    }
}
