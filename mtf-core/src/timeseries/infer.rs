use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{Candle, MtfError, Timeframe};

/// Dominant spacing, in seconds, between the distinct open times of `candles`.
///
/// The most frequent positive delta wins. When several deltas are equally
/// frequent, the lower median of all deltas is returned instead, so the
/// answer is always a spacing that actually occurs.
///
/// ```
/// use mtf_core::{estimate_step_seconds, Candle, Decimal};
/// use chrono::DateTime;
///
/// let mk = |ts: i64| Candle {
///     open_time: DateTime::from_timestamp(ts, 0).unwrap(),
///     open: Decimal::ONE, high: Decimal::ONE, low: Decimal::ONE,
///     close: Decimal::ONE, volume: Decimal::ZERO,
/// };
/// // Deltas 60, 60, 60, 120, 180.
/// let candles = vec![mk(0), mk(60), mk(120), mk(180), mk(300), mk(480)];
/// assert_eq!(estimate_step_seconds(&candles), Some(60));
/// ```
///
/// Order and duplicate stamps are ignored. `None` below two distinct stamps.
#[must_use]
pub fn estimate_step_seconds(candles: &[Candle]) -> Option<i64> {
    let mut stamps: Vec<i64> = candles.iter().map(|c| c.open_time.timestamp()).collect();
    stamps.sort_unstable();
    stamps.dedup();
    let mut deltas: Vec<i64> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
    deltas.sort_unstable();

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &d in &deltas {
        *counts.entry(d).or_default() += 1;
    }
    let top = counts.values().copied().max()?;
    let mut modes = counts.iter().filter(|(_, n)| **n == top).map(|(d, _)| *d);
    match (modes.next(), modes.next()) {
        (Some(mode), None) => Some(mode),
        _ => deltas.get((deltas.len() - 1) / 2).copied(),
    }
}

/// Check that the dominant spacing of `candles` is a whole multiple of one
/// `timeframe` window.
///
/// Catches a source answering with another resolution than the one asked
/// for. Missing windows keep the spacing a multiple, so gappy series pass.
/// Fewer than two candles always pass, and so do calendar units (`M`, `y`)
/// whose real windows vary in length.
///
/// # Errors
/// Returns `Data` naming the inferred spacing.
pub fn validate_step(candles: &[Candle], timeframe: Timeframe) -> Result<(), MtfError> {
    if timeframe.unit().is_calendar() {
        return Ok(());
    }
    let Some(step) = estimate_step_seconds(candles) else {
        return Ok(());
    };
    if step % timeframe.duration_seconds() == 0 {
        Ok(())
    } else {
        Err(MtfError::Data(format!(
            "candles are {step}s apart, which does not fit {timeframe} windows"
        )))
    }
}

/// A stretch of missing candles in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesGap {
    /// Open time of the last candle before the gap.
    pub after: DateTime<Utc>,
    /// Open time of the first candle after the gap.
    pub before: DateTime<Utc>,
    /// Number of window starts skipped between the two.
    pub missing: i64,
}

/// Find stretches where consecutive open times are further apart than one
/// `timeframe` window.
///
/// Expects an ascending series (see [`validate_series`]). A delta that is not
/// an exact multiple of the window still counts as a gap; `missing` is
/// `ceil(delta / window) - 1` in every case.
#[must_use]
pub fn find_gaps(candles: &[Candle], timeframe: Timeframe) -> Vec<SeriesGap> {
    let step = timeframe.duration_seconds();
    candles
        .windows(2)
        .filter_map(|w| {
            let delta = (w[1].open_time - w[0].open_time).num_seconds();
            (delta > step).then(|| SeriesGap {
                after: w[0].open_time,
                before: w[1].open_time,
                missing: (delta - 1) / step,
            })
        })
        .collect()
}

/// Ensure open times are strictly increasing (sorted, no duplicates).
///
/// # Errors
/// Returns `Data` naming the first offending pair.
pub fn validate_series(candles: &[Candle]) -> Result<(), MtfError> {
    for w in candles.windows(2) {
        if w[1].open_time <= w[0].open_time {
            return Err(MtfError::Data(format!(
                "open times must be strictly increasing: {} followed by {}",
                w[0].open_time, w[1].open_time
            )));
        }
    }
    Ok(())
}
