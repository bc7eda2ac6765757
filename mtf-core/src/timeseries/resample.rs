use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{Candle, Timeframe, TimeframeUnit};

const DAY: i64 = 86_400;
const MONDAY_ANCHOR: i64 = -3 * DAY;

const fn week_start_day(day: i64) -> i64 {
    day - ((day + 3).rem_euclid(7))
}

/// Start of the `timeframe` window containing `ts`, aligned to the Unix epoch.
///
/// Week windows start on Monday 00:00 UTC;
/// every other unit floors to a multiple of the timeframe duration.
/// `None` only when the start falls outside `DateTime`'s range.
#[must_use]
pub fn window_start(ts: DateTime<Utc>, timeframe: Timeframe) -> Option<DateTime<Utc>> {
    let secs = ts.timestamp();
    let step = timeframe.duration_seconds();
    let start = if timeframe.unit() == TimeframeUnit::Week {
        let monday = week_start_day(secs.div_euclid(DAY)) * DAY;
        // Multi-week buckets count from Monday 1969-12-29.
        monday - (monday - MONDAY_ANCHOR).rem_euclid(step)
    } else {
        secs - secs.rem_euclid(step)
    };
    DateTime::from_timestamp(start, 0)
}

struct BucketAgg {
    start: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl BucketAgg {
    fn new(start: DateTime<Utc>, c: &Candle) -> Self {
        Self {
            start,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
        }
    }

    fn push(&mut self, c: &Candle) {
        if c.high > self.high {
            self.high = c.high;
        }
        if c.low < self.low {
            self.low = c.low;
        }
        self.close = c.close;
        self.volume = self.volume.saturating_add(c.volume);
    }

    fn finish(self) -> Candle {
        Candle {
            open_time: self.start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// Aggregate candles into coarser `timeframe` buckets.
///
/// - Buckets are aligned to the Unix epoch; weeks start Monday 00:00 UTC.
/// - Open  = first open in the bucket (earliest `open_time`)
/// - High  = max high
/// - Low   = min low
/// - Close = last close in the bucket (latest `open_time`)
/// - Volume = sum of volumes
/// - Output candles have `open_time` at the **bucket start**.
///
/// Input order does not matter. Empty buckets are not synthesized, so gaps
/// in the input stay gaps in the output. Resampling to the input's own
/// timeframe returns the (sorted) input unchanged.
///
/// ```
/// use mtf_core::{resample, Candle, Decimal, Timeframe};
/// use chrono::DateTime;
///
/// let c = |ts: i64, px: i64| Candle {
///     open_time: DateTime::from_timestamp(ts, 0).unwrap(),
///     open: Decimal::from(px), high: Decimal::from(px), low: Decimal::from(px),
///     close: Decimal::from(px), volume: Decimal::ONE,
/// };
/// let hourly = resample(&[c(0, 1), c(1_800, 3), c(3_600, 2)], Timeframe::H1);
/// assert_eq!(hourly.len(), 2);
/// assert_eq!(hourly[0].high, Decimal::from(3));
/// assert_eq!(hourly[0].volume, Decimal::from(2));
/// ```
#[must_use]
pub fn resample(candles: &[Candle], timeframe: Timeframe) -> Vec<Candle> {
    let mut sorted: Vec<&Candle> = candles.iter().collect();
    sorted.sort_by_key(|c| c.open_time);

    let mut out: Vec<Candle> = Vec::new();
    let mut cur: Option<BucketAgg> = None;
    for c in sorted {
        let Some(bucket) = window_start(c.open_time, timeframe) else {
            continue;
        };
        match cur.as_mut() {
            Some(agg) if agg.start == bucket => agg.push(c),
            _ => {
                if let Some(done) = cur.replace(BucketAgg::new(bucket, c)) {
                    out.push(done.finish());
                }
            }
        }
    }
    if let Some(done) = cur {
        out.push(done.finish());
    }
    out
}
