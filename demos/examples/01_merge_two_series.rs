use chrono::{DateTime, Utc};
use mtf::{Candle, Coverage, MergeOptions, merge_timeframes_str};
use rust_decimal::Decimal;

fn candle(hh: i64, mm: i64, close: i64) -> Candle {
    let open_time: DateTime<Utc> =
        DateTime::from_timestamp(hh * 3_600 + mm * 60, 0).unwrap_or(DateTime::UNIX_EPOCH);
    let px = Decimal::from(close);
    Candle {
        open_time,
        open: px,
        high: px + Decimal::ONE,
        low: px - Decimal::ONE,
        close: px,
        volume: Decimal::TEN,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Hourly candles with 02:00 missing, and half-hourly candles around them.
    let main = vec![candle(0, 0, 100), candle(1, 0, 110), candle(3, 0, 130)];
    let detailed = vec![
        candle(0, 0, 101),
        candle(0, 30, 104),
        candle(1, 0, 109),
        candle(1, 30, 112),
        candle(2, 0, 118),
        candle(2, 30, 121),
        candle(3, 0, 128),
    ];

    let merged = merge_timeframes_str(&main, &detailed, "1h", "30m", &MergeOptions::default())?;

    println!("{:<22} {:<22} {:<10} closed main close", "detailed", "merge key", "coverage");
    for row in &merged.rows {
        let key = row
            .merge_key
            .map_or_else(|| "-".to_string(), |k| k.to_rfc3339());
        let coverage = match row.coverage {
            Coverage::Covered => "covered",
            Coverage::Gap => "gap",
            Coverage::Uncovered => "uncovered",
        };
        let attached = row
            .main
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| c.close.to_string());
        println!(
            "{:<22} {:<22} {:<10} {}",
            row.candle.open_time.to_rfc3339(),
            key,
            coverage,
            attached
        );
    }
    println!(
        "rows={} gaps={} uncovered={}",
        merged.len(),
        merged.gap_count(),
        merged.undefined_key_count()
    );

    Ok(())
}
