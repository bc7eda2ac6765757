use std::sync::Arc;
use std::time::Duration;

use mtf::{MainSeries, Mtf, MtfError, StartPoint, Timeframe};
use mtf_mock::{DynamicMockSource, MockBehavior, MockSource};

use crate::helpers::{BTC, T0, at, day_builder};

fn two_sources(
    first: Arc<dyn mtf::KlineSource>,
    second: Arc<dyn mtf::KlineSource>,
) -> mtf::MtfBuilder {
    day_builder(first).with_source(second)
}

#[tokio::test]
async fn failing_source_falls_back_to_next() {
    let (dyn_src, ctl) = DynamicMockSource::new_with_controller("flaky");
    ctl.set_klines_behavior(
        BTC,
        MockBehavior::Fail(MtfError::connector("flaky", "boom")),
    )
    .await;
    let mtf = two_sources(dyn_src, Arc::new(MockSource::new()))
        .build()
        .unwrap();
    let history = mtf.history(BTC).await.unwrap();
    assert_eq!(history.main.len(), 24);
    assert_eq!(history.detailed.len(), 96);
    // One attempt per series on the failing source.
    assert_eq!(ctl.requests().await.len(), 2);
}

#[tokio::test]
async fn unknown_symbol_falls_back_to_next() {
    let (dyn_src, _ctl) = DynamicMockSource::new_with_controller("empty");
    let mtf = two_sources(dyn_src, Arc::new(MockSource::new()))
        .build()
        .unwrap();
    assert_eq!(mtf.history(BTC).await.unwrap().detailed.len(), 96);
}

#[tokio::test]
async fn empty_result_falls_back_to_next() {
    let (dyn_src, ctl) = DynamicMockSource::new_with_controller("empty");
    ctl.set_klines_behavior(BTC, MockBehavior::Return(vec![])).await;
    let mtf = two_sources(dyn_src, Arc::new(MockSource::new()))
        .build()
        .unwrap();
    assert_eq!(mtf.history(BTC).await.unwrap().main.len(), 24);
}

#[tokio::test]
async fn first_serving_source_wins() {
    let (dyn_src, ctl) = DynamicMockSource::new_with_controller("second");
    ctl.set_klines_behavior(BTC, MockBehavior::Fail(MtfError::Data("unused".into())))
        .await;
    let mtf = two_sources(Arc::new(MockSource::new()), dyn_src)
        .build()
        .unwrap();
    mtf.history(BTC).await.unwrap();
    assert!(ctl.requests().await.is_empty());
}

#[tokio::test]
async fn earliest_failure_falls_back_to_next() {
    let (dyn_src, ctl) = DynamicMockSource::new_with_controller("no-earliest");
    ctl.set_earliest_behavior(
        "NEWUSDT",
        MockBehavior::Fail(MtfError::connector("no-earliest", "down")),
    )
    .await;
    let mtf = two_sources(dyn_src, Arc::new(MockSource::new()))
        .start(StartPoint::Earliest)
        .build()
        .unwrap();
    let history = mtf.history("NEWUSDT").await.unwrap();
    assert_eq!(history.main[0].open_time, at(T0));
    assert!(ctl.requests().await.is_empty());
}

#[tokio::test]
async fn all_not_found_collapses_to_not_found() {
    let (dyn_src, _ctl) = DynamicMockSource::new_with_controller("empty");
    let mtf = two_sources(dyn_src, Arc::new(MockSource::new()))
        .build()
        .unwrap();
    match mtf.history("NOPE").await.unwrap_err() {
        MtfError::NotFound { what } => assert!(what.ends_with("klines for NOPE"), "{what}"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn all_timeouts_collapse_to_all_timed_out() {
    let (a, ctl_a) = DynamicMockSource::new_with_controller("a");
    let (b, ctl_b) = DynamicMockSource::new_with_controller("b");
    ctl_a.set_klines_behavior(BTC, MockBehavior::Hang).await;
    ctl_b.set_klines_behavior(BTC, MockBehavior::Hang).await;
    let mtf = two_sources(a, b)
        .main_series(MainSeries::ResampleDetailed)
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = mtf.history(BTC).await.unwrap_err();
    assert_eq!(
        err,
        MtfError::AllProvidersTimedOut {
            capability: "klines".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn mixed_failures_keep_every_error() {
    let (a, ctl_a) = DynamicMockSource::new_with_controller("a");
    let (b, ctl_b) = DynamicMockSource::new_with_controller("b");
    ctl_a
        .set_klines_behavior(BTC, MockBehavior::Fail(MtfError::Data("bad row".into())))
        .await;
    ctl_b.set_klines_behavior(BTC, MockBehavior::Hang).await;
    let mtf = two_sources(a, b)
        .main_series(MainSeries::ResampleDetailed)
        .provider_timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let err = mtf.history(BTC).await.unwrap_err();
    assert_eq!(
        err,
        MtfError::AllProvidersFailed(vec![
            MtfError::connector("a", "data issue: bad row"),
            MtfError::provider_timeout("b", "klines"),
        ])
    );
}

#[tokio::test]
async fn empty_symbol_is_rejected() {
    let mtf = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .main_timeframe(Timeframe::H1)
        .detailed_timeframe(Timeframe::M15)
        .start(StartPoint::At(at(T0)))
        .build()
        .unwrap();
    assert!(matches!(
        mtf.history("  ").await,
        Err(MtfError::InvalidArg(_))
    ));
}
