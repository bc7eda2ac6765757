use mtf::{MainSeries, MtfError, StartPoint, Timeframe};
use mtf_mock::{DynamicMockSource, MockBehavior};

use crate::helpers::{BTC, T0, at, day_builder, series};

const THREE_HOURS: i64 = 3 * 3_600;

async fn paged(
    payload: usize,
    page_limit: u32,
) -> (Result<mtf::SymbolHistory, MtfError>, Vec<mtf::KlineRequest>) {
    let (src, ctl) = DynamicMockSource::new_with_controller("paged");
    let all = series(T0, Timeframe::M15, payload as i64);
    ctl.set_klines_behavior(BTC, MockBehavior::Return(all)).await;
    let mtf = day_builder(src)
        .end(at(T0 + THREE_HOURS - 1))
        .main_series(MainSeries::ResampleDetailed)
        .page_limit(page_limit)
        .build()
        .unwrap();
    let res = mtf.history(BTC).await;
    (res, ctl.requests().await)
}

#[tokio::test]
async fn pages_until_range_end() {
    let (res, requests) = paged(12, 4).await;
    let history = res.unwrap();
    assert_eq!(history.detailed.len(), 12);
    assert_eq!(history.main.len(), 3);
    let starts: Vec<_> = requests.iter().map(|r| r.start).collect();
    assert_eq!(starts, vec![at(T0), at(T0 + 3_600), at(T0 + 7_200)]);
    assert!(requests.iter().all(|r| r.limit == 4 && r.end == at(T0 + THREE_HOURS - 1)));
    assert!(requests.iter().all(|r| r.timeframe == Timeframe::M15));
}

#[tokio::test]
async fn short_page_stops_pagination() {
    let (res, requests) = paged(10, 4).await;
    assert_eq!(res.unwrap().detailed.len(), 10);
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn empty_page_after_exact_multiple_stops_pagination() {
    let (res, requests) = paged(8, 4).await;
    let history = res.unwrap();
    assert_eq!(history.detailed.len(), 8);
    assert_eq!(history.detailed.last().unwrap().open_time, at(T0 + 7 * 900));
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].start, at(T0 + 7_200));
}

#[tokio::test]
async fn single_page_when_limit_exceeds_range() {
    let (res, requests) = paged(12, 1_000).await;
    assert_eq!(res.unwrap().detailed.len(), 12);
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn fixed_start_is_aligned_to_the_window() {
    let (src, ctl) = DynamicMockSource::new_with_controller("paged");
    ctl.set_klines_behavior(BTC, MockBehavior::Return(series(T0, Timeframe::M15, 12)))
        .await;
    let mtf = day_builder(src)
        .start(StartPoint::At(at(T0 + 125)))
        .end(at(T0 + THREE_HOURS - 1))
        .main_series(MainSeries::ResampleDetailed)
        .build()
        .unwrap();
    let history = mtf.history(BTC).await.unwrap();
    assert_eq!(ctl.requests().await[0].start, at(T0));
    assert_eq!(history.detailed[0].open_time, at(T0));
}

#[tokio::test]
async fn earliest_start_comes_from_the_source() {
    let (src, ctl) = DynamicMockSource::new_with_controller("paged");
    ctl.set_klines_behavior(BTC, MockBehavior::Return(series(T0, Timeframe::M15, 12)))
        .await;
    ctl.set_earliest_behavior(BTC, MockBehavior::Return(at(T0 + 3_600)))
        .await;
    let mtf = day_builder(src)
        .start(StartPoint::Earliest)
        .end(at(T0 + THREE_HOURS - 1))
        .main_series(MainSeries::ResampleDetailed)
        .build()
        .unwrap();
    let history = mtf.history(BTC).await.unwrap();
    assert_eq!(ctl.requests().await[0].start, at(T0 + 3_600));
    assert_eq!(history.detailed.len(), 8);
    assert_eq!(history.main.len(), 2);
}

#[tokio::test]
async fn unordered_page_is_a_data_error() {
    let (src, ctl) = DynamicMockSource::new_with_controller("paged");
    let mut all = series(T0, Timeframe::M15, 4);
    all.swap(1, 2);
    ctl.set_klines_behavior(BTC, MockBehavior::Return(all)).await;
    let mtf = day_builder(src)
        .end(at(T0 + THREE_HOURS - 1))
        .main_series(MainSeries::ResampleDetailed)
        .build()
        .unwrap();
    let err = mtf.history(BTC).await.unwrap_err();
    match err {
        MtfError::AllProvidersFailed(errs) => {
            assert_eq!(errs.len(), 1);
            assert!(matches!(&errs[0], MtfError::Connector { connector, .. } if connector == "paged"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn page_at_another_resolution_fails_the_source() {
    let (src, ctl) = DynamicMockSource::new_with_controller("paged");
    ctl.set_klines_behavior(BTC, MockBehavior::Return(series(T0, Timeframe::M1, 30)))
        .await;
    let mtf = day_builder(src)
        .end(at(T0 + THREE_HOURS - 1))
        .main_series(MainSeries::ResampleDetailed)
        .build()
        .unwrap();
    match mtf.history(BTC).await.unwrap_err() {
        MtfError::AllProvidersFailed(errs) => {
            assert_eq!(errs.len(), 1);
            assert!(
                matches!(&errs[0], MtfError::Connector { connector, msg } if connector == "paged" && msg.contains("15m"))
            );
        }
        other => panic!("unexpected: {other:?}"),
    }
}
