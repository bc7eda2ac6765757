use polars::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::{Candle, Coverage, MergedSeries};

/// Convert a table-like value into a `polars` [`DataFrame`].
///
/// Timestamps become millisecond `Datetime` columns and decimals become `f64`.
pub trait ToDataFrame {
    /// Build the frame.
    ///
    /// # Errors
    /// Returns the underlying `PolarsError` if the columns cannot be assembled.
    fn to_dataframe(&self) -> PolarsResult<DataFrame>;
}

fn f64_of(d: Decimal) -> Option<f64> {
    d.to_f64()
}

fn candle_columns<'a, I>(candles: I, suffix: Option<&str>) -> PolarsResult<Vec<Column>>
where
    I: Iterator<Item = Option<&'a Candle>> + Clone,
{
    let name = |base: &str| match suffix {
        Some(s) => format!("{base}_{s}"),
        None => base.to_string(),
    };
    let px = |f: fn(&Candle) -> Decimal| -> Vec<Option<f64>> {
        candles.clone().map(|c| c.and_then(|c| f64_of(f(c)))).collect()
    };
    let dates: Vec<Option<i64>> = candles
        .clone()
        .map(|c| c.map(|c| c.open_time.timestamp_millis()))
        .collect();
    Ok(vec![
        ms_datetime(Column::new(name("date").into(), dates))?,
        Column::new(name("open").into(), px(|c| c.open)),
        Column::new(name("high").into(), px(|c| c.high)),
        Column::new(name("low").into(), px(|c| c.low)),
        Column::new(name("close").into(), px(|c| c.close)),
        Column::new(name("volume").into(), px(|c| c.volume)),
    ])
}

fn ms_datetime(col: Column) -> PolarsResult<Column> {
    col.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

impl ToDataFrame for [Candle] {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(candle_columns(self.iter().map(Some), None)?)
    }
}

impl ToDataFrame for Vec<Candle> {
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        self.as_slice().to_dataframe()
    }
}

impl ToDataFrame for MergedSeries {
    /// Columns follow [`MergedSeries::column_names`]: detailed OHLCV,
    /// `merge_key`, `coverage`, then the attached main OHLCV suffixed with the
    /// main timeframe token (null where nothing is attached).
    fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut cols = candle_columns(self.rows.iter().map(|r| Some(&r.candle)), None)?;
        let keys: Vec<Option<i64>> = self
            .rows
            .iter()
            .map(|r| r.merge_key.map(|k| k.timestamp_millis()))
            .collect();
        let coverage: Vec<&str> = self
            .rows
            .iter()
            .map(|r| match r.coverage {
                Coverage::Covered => "covered",
                Coverage::Gap => "gap",
                Coverage::Uncovered => "uncovered",
            })
            .collect();
        cols.push(ms_datetime(Column::new("merge_key".into(), keys))?);
        cols.push(Column::new("coverage".into(), coverage));
        let suffix = self.main_timeframe.to_string();
        cols.extend(candle_columns(
            self.rows.iter().map(|r| r.main.as_ref()),
            Some(&suffix),
        )?);
        DataFrame::new(cols)
    }
}
