use std::sync::Arc;

use async_trait::async_trait;
use mtf::{Candle, CandleSink, Mtf, MtfError, StartPoint, Timeframe};
use mtf_demos::common::{demo_time, get_source};

/// A sink that prints a one-line summary of each series instead of writing it.
struct SummarySink;

#[async_trait]
impl CandleSink for SummarySink {
    fn name(&self) -> &'static str {
        "summary"
    }

    async fn store_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        candles: &[Candle],
    ) -> Result<(), MtfError> {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return Err(MtfError::sink(self.name(), format!("empty {timeframe} series for {symbol}")));
        };
        println!(
            "-> {symbol} @ {timeframe}: {} candles, {} .. {}",
            candles.len(),
            first.open_time,
            last.open_time
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mtf = Mtf::builder()
        .with_source(get_source())
        .with_sink(Arc::new(SummarySink))
        .main_timeframe(Timeframe::H1)
        .detailed_timeframe(Timeframe::M5)
        .start(StartPoint::At(demo_time(0)))
        .end(demo_time(12))
        .build()?;

    let report = mtf.download().symbols(["BNBUSDT", "GAPPY"])?.run().await?;
    println!("warnings: {}", report.warnings.len());

    Ok(())
}
