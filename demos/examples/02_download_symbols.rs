use std::sync::Arc;

use mtf::{Mtf, StartPoint, Timeframe};
use mtf_demos::common::{demo_time, get_source};
use mtf_mock::MemorySink;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(MemorySink::new());
    let mtf = Mtf::builder()
        .with_source(get_source())
        .with_sink(sink.clone())
        .main_timeframe(Timeframe::H4)
        .detailed_timeframe(Timeframe::M15)
        .start(StartPoint::At(demo_time(0)))
        .end(demo_time(24 * 3))
        .page_limit(100)
        .build()?;

    let report = mtf
        .download()
        .symbols(["BTCUSDT", "ETHUSDT", "NOPE"])?
        .run()
        .await?;

    if let Some(resp) = report.response.as_ref() {
        println!("download ends at {}", resp.end);
        for entry in &resp.entries {
            println!(
                "{}: {} main, {} detailed, {} merged rows ({} uncovered)",
                entry.symbol,
                entry.main.len(),
                entry.detailed.len(),
                entry.merged.len(),
                entry.merged.undefined_key_count()
            );
        }
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for (symbol, timeframe) in sink.keys().await {
        println!("stored {symbol} @ {timeframe}");
    }

    Ok(())
}
