use mtf::{MainSeries, Mtf, MtfError, StartPoint, Timeframe};
use mtf_demos::common::{demo_time, get_source};

fn week_of_days(mode: MainSeries) -> Result<Mtf, MtfError> {
    Mtf::builder()
        .with_source(get_source())
        .main_timeframe(Timeframe::D1)
        .detailed_timeframe(Timeframe::H1)
        .start(StartPoint::At(demo_time(0)))
        .end(demo_time(24 * 7 - 1))
        .main_series(mode)
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let downloaded = week_of_days(MainSeries::Download)?.history("ETHUSDT").await?;
    let resampled = week_of_days(MainSeries::ResampleDetailed)?
        .history("ETHUSDT")
        .await?;

    println!("{:<26} {:>12} {:>12}", "day", "downloaded", "resampled");
    for (d, r) in downloaded.main.iter().zip(&resampled.main) {
        println!(
            "{:<26} {:>12} {:>12}",
            d.open_time.to_rfc3339(),
            d.close,
            r.close
        );
    }

    Ok(())
}
