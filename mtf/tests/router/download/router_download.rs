use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mtf::{Mtf, MtfError, StartPoint, Timeframe};
use mtf_mock::MockSource;

use crate::helpers::{BTC, ETH, T0, at, day_builder};

#[tokio::test]
async fn downloads_every_symbol_in_request_order() {
    let mtf = day_builder(Arc::new(MockSource::new())).build().unwrap();
    let report = mtf.download().symbols([ETH, BTC]).unwrap().run().await.unwrap();

    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let resp = report.response.unwrap();
    assert_eq!(resp.end, at(T0 + 86_400 - 1));
    let order: Vec<&str> = resp.entries.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(order, vec![ETH, BTC]);
    let btc = resp.get(BTC).unwrap();
    assert_eq!(btc.main.len(), 24);
    assert_eq!(btc.merged.len(), 96);
    assert!(resp.get("NOPE").is_none());
}

#[tokio::test]
async fn add_symbol_appends() {
    let mtf = day_builder(Arc::new(MockSource::new())).build().unwrap();
    let report = mtf
        .download()
        .add_symbol(BTC)
        .unwrap()
        .add_symbol(ETH)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.response.unwrap().entries.len(), 2);
}

#[test]
fn duplicate_symbols_are_rejected() {
    let mtf = day_builder(Arc::new(MockSource::new())).build().unwrap();
    let err = mtf.download().symbols([BTC, ETH, BTC]).err().unwrap();
    assert!(matches!(err, MtfError::InvalidArg(msg) if msg.contains(BTC)));

    let err = mtf
        .download()
        .add_symbol(BTC)
        .unwrap()
        .add_symbol(BTC)
        .err()
        .unwrap();
    assert!(matches!(err, MtfError::InvalidArg(_)));
}

#[tokio::test]
async fn empty_symbol_list_is_rejected() {
    let mtf = day_builder(Arc::new(MockSource::new())).build().unwrap();
    let err = mtf.download().run().await.unwrap_err();
    assert!(matches!(err, MtfError::InvalidArg(_)));
}

#[tokio::test]
async fn failed_symbols_become_warnings() {
    let mtf = day_builder(Arc::new(MockSource::new())).build().unwrap();
    let report = mtf
        .download()
        .symbols([BTC, "FAIL", "NOPE"])
        .unwrap()
        .run()
        .await
        .unwrap();

    let resp = report.response.unwrap();
    assert_eq!(resp.entries.len(), 1);
    assert_eq!(resp.entries[0].symbol, BTC);

    assert_eq!(report.warnings.len(), 2);
    match &report.warnings[0] {
        MtfError::AllProvidersFailed(errs) => {
            assert!(matches!(&errs[0], MtfError::Connector { connector, .. } if connector == "mtf-mock"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(matches!(&report.warnings[1], MtfError::NotFound { .. }));
}

#[tokio::test]
async fn no_successful_symbol_means_no_response() {
    let mtf = day_builder(Arc::new(MockSource::new())).build().unwrap();
    let report = mtf
        .download()
        .symbols(["FAIL", "NOPE"])
        .unwrap()
        .run()
        .await
        .unwrap();
    assert!(report.response.is_none());
    assert_eq!(report.warnings.len(), 2);
}

#[tokio::test]
async fn open_ended_download_shares_one_end() {
    let before = Utc::now();
    let mtf = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .main_timeframe(Timeframe::H1)
        .detailed_timeframe(Timeframe::M15)
        .start(StartPoint::At(before - chrono::Duration::hours(6)))
        .build()
        .unwrap();
    let report = mtf.download().symbols([BTC, ETH]).unwrap().run().await.unwrap();
    let resp = report.response.unwrap();
    assert!(resp.end >= before);

    let btc = resp.get(BTC).unwrap();
    let eth = resp.get(ETH).unwrap();
    for entry in [btc, eth] {
        assert!(entry.detailed.iter().all(|c| c.open_time <= resp.end));
        assert!(entry.main.iter().all(|c| c.open_time <= resp.end));
    }
    assert_eq!(
        btc.detailed.last().map(|c| c.open_time),
        eth.detailed.last().map(|c| c.open_time)
    );
}

#[tokio::test(start_paused = true)]
async fn request_deadline_aborts_the_whole_download() {
    let mtf = day_builder(Arc::new(MockSource::new()))
        .request_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = mtf
        .download()
        .symbols([BTC, "TIMEOUT"])
        .unwrap()
        .run()
        .await
        .unwrap_err();
    assert_eq!(err, MtfError::request_timeout("download"));
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out_per_symbol() {
    let mtf = day_builder(Arc::new(MockSource::new()))
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let report = mtf
        .download()
        .symbols([BTC, "TIMEOUT"])
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.response.unwrap().entries.len(), 1);
    assert_eq!(
        report.warnings,
        vec![MtfError::AllProvidersTimedOut {
            capability: "klines".into()
        }]
    );
}
