use chrono::{DateTime, TimeDelta, Utc};

use crate::{Candle, Coverage, MergeOptions, MergedRow, MergedSeries, MtfError, Timeframe};

/// Key every detailed candle to the main-timeframe window it belongs to.
///
/// Behavior:
/// - Equal durations: same-key inner join on `open_time`. Only detailed rows
///   with a main candle at the same instant are emitted; `main` is that candle
///   (same window, so nothing from the future).
/// - Coarser main: for each detailed row at `t`, the key is the greatest main
///   `open_time <= t`. The row is `Covered` when `t` falls inside that window
///   and `Gap` when the main series skipped windows. Rows before the first
///   main candle are kept with an undefined key (`Uncovered`).
/// - With `opts.attach_main`, each row carries the most recently *closed* main
///   candle, i.e. the greatest one with `open_time + duration <= merge_key`.
///
/// The key depends only on main open times and the two durations, never on
/// main OHLCV values. Main input may arrive unordered; detailed rows are
/// stable-sorted by `open_time`.
///
/// # Errors
/// - `IncompatibleTimeframes` if `detailed_tf` is coarser than `main_tf`
///   (durations compared in seconds).
/// - `Data` if the main series contains duplicate open times.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(main, detailed, opts),
        fields(main_len = main.len(), detailed_len = detailed.len()),
    )
)]
pub fn merge_timeframes(
    main: &[Candle],
    detailed: &[Candle],
    main_tf: Timeframe,
    detailed_tf: Timeframe,
    opts: &MergeOptions,
) -> Result<MergedSeries, MtfError> {
    let main_secs = main_tf.duration_seconds();
    let detailed_secs = detailed_tf.duration_seconds();
    if main_secs < detailed_secs {
        return Err(MtfError::IncompatibleTimeframes {
            main: main_tf.to_string(),
            detailed: detailed_tf.to_string(),
        });
    }
    #[cfg(feature = "tracing")]
    {
        if main_tf.ratio_to(detailed_tf).is_none() {
            tracing::debug!(
                main = %main_tf,
                detailed = %detailed_tf,
                "main duration is not a whole multiple of the detailed duration"
            );
        }
    }

    let mut coarse: Vec<&Candle> = main.iter().collect();
    coarse.sort_by_key(|c| c.open_time);
    if let Some(w) = coarse.windows(2).find(|w| w[0].open_time == w[1].open_time) {
        return Err(MtfError::Data(format!(
            "duplicate main open time {}",
            w[0].open_time
        )));
    }

    let mut fine: Vec<&Candle> = detailed.iter().collect();
    fine.sort_by_key(|c| c.open_time);

    let rows = if main_secs == detailed_secs {
        join_same_window(&coarse, &fine, opts)
    } else {
        join_as_of(&coarse, &fine, main_tf.duration(), opts)
    };

    #[cfg(feature = "tracing")]
    {
        let gaps = rows.iter().filter(|r| r.coverage == Coverage::Gap).count();
        let uncovered = rows.iter().filter(|r| r.is_undefined()).count();
        if gaps > 0 || uncovered > 0 {
            tracing::debug!(gaps, uncovered, "merge produced rows outside a main window");
        }
    }

    Ok(MergedSeries {
        main_timeframe: main_tf,
        detailed_timeframe: detailed_tf,
        rows,
    })
}

/// Parse both timeframe tokens, then [`merge_timeframes`].
///
/// # Errors
/// Parser errors are returned unmodified; otherwise see [`merge_timeframes`].
pub fn merge_timeframes_str(
    main: &[Candle],
    detailed: &[Candle],
    main_token: &str,
    detailed_token: &str,
    opts: &MergeOptions,
) -> Result<MergedSeries, MtfError> {
    let main_tf: Timeframe = main_token.parse()?;
    let detailed_tf: Timeframe = detailed_token.parse()?;
    merge_timeframes(main, detailed, main_tf, detailed_tf, opts)
}

fn join_same_window(coarse: &[&Candle], fine: &[&Candle], opts: &MergeOptions) -> Vec<MergedRow> {
    let mut out = Vec::with_capacity(fine.len().min(coarse.len()));
    let mut i = 0usize;
    for row in fine {
        while i < coarse.len() && coarse[i].open_time < row.open_time {
            i += 1;
        }
        let Some(hit) = coarse.get(i).filter(|c| c.open_time == row.open_time) else {
            continue;
        };
        out.push(MergedRow {
            candle: (*row).clone(),
            merge_key: Some(hit.open_time),
            coverage: Coverage::Covered,
            main: opts.attach_main.then(|| (*hit).clone()),
        });
    }
    out
}

fn join_as_of(
    coarse: &[&Candle],
    fine: &[&Candle],
    main_dur: TimeDelta,
    opts: &MergeOptions,
) -> Vec<MergedRow> {
    let mut out = Vec::with_capacity(fine.len());
    // `next` is the count of main candles with open_time <= current row.
    let mut next = 0usize;
    for row in fine {
        let t = row.open_time;
        while next < coarse.len() && coarse[next].open_time <= t {
            next += 1;
        }
        let Some(key_idx) = next.checked_sub(1) else {
            out.push(MergedRow {
                candle: (*row).clone(),
                merge_key: None,
                coverage: Coverage::Uncovered,
                main: None,
            });
            continue;
        };
        let key = coarse[key_idx].open_time;
        // A window end past the representable range never closes.
        let in_window = key.checked_add_signed(main_dur).is_none_or(|end| t < end);
        let coverage = if in_window {
            Coverage::Covered
        } else {
            Coverage::Gap
        };
        let main = if opts.attach_main {
            last_closed_before(&coarse[..key_idx], key, main_dur).map(|c| (*c).clone())
        } else {
            None
        };
        out.push(MergedRow {
            candle: (*row).clone(),
            merge_key: Some(key),
            coverage,
            main,
        });
    }
    out
}

/// Greatest candle in the ascending `prior` with `open_time + dur <= key`.
fn last_closed_before<'a>(
    prior: &[&'a Candle],
    key: DateTime<Utc>,
    dur: TimeDelta,
) -> Option<&'a Candle> {
    let n = prior.partition_point(|c| {
        c.open_time
            .checked_add_signed(dur)
            .is_some_and(|end| end <= key)
    });
    n.checked_sub(1).map(|i| prior[i])
}
