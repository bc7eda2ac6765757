use mtf::{Mtf, StartPoint, Timeframe};
use mtf_demos::common::{demo_time, get_source};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,mtf=trace,mtf_core=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let mtf = Mtf::builder()
        .with_source(get_source())
        .main_timeframe(Timeframe::H1)
        .detailed_timeframe(Timeframe::M15)
        .start(StartPoint::At(demo_time(0)))
        .end(demo_time(6))
        .build()?;

    let _ = mtf.history("BTCUSDT").await?;
    // GAPPY skips hourly windows, which shows up as gap warnings in the merge.
    let _ = mtf.history("GAPPY").await?;

    Ok(())
}
