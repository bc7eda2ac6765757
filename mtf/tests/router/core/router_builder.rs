use std::sync::Arc;
use std::time::Duration;

use mtf::{MainSeries, Mtf, MtfBuilder, MtfConfig, MtfError, StartPoint, Timeframe};
use mtf_mock::MockSource;

use crate::helpers::{T0, at};

#[test]
fn build_requires_a_source() {
    let err = Mtf::builder()
        .start(StartPoint::Earliest)
        .build()
        .err()
        .expect("must fail");
    assert!(matches!(err, MtfError::InvalidArg(_)));
}

#[test]
fn build_requires_an_explicit_start() {
    let err = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .build()
        .err()
        .expect("must fail");
    match err {
        MtfError::InvalidArg(msg) => assert!(msg.contains("start")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn build_rejects_zero_page_limit() {
    let err = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .start(StartPoint::Earliest)
        .page_limit(0)
        .build()
        .err()
        .expect("must fail");
    assert!(matches!(err, MtfError::InvalidArg(_)));
}

#[test]
fn build_rejects_detailed_coarser_than_main() {
    let err = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .start(StartPoint::Earliest)
        .main_timeframe(Timeframe::M15)
        .detailed_timeframe(Timeframe::H1)
        .build()
        .err()
        .expect("must fail");
    assert_eq!(
        err,
        MtfError::IncompatibleTimeframes {
            main: "15m".into(),
            detailed: "1h".into()
        }
    );
}

#[test]
fn build_rejects_start_after_end() {
    let err = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .start(StartPoint::At(at(T0 + 60)))
        .end(at(T0))
        .build()
        .err()
        .expect("must fail");
    assert!(matches!(err, MtfError::InvalidArg(_)));
}

#[test]
fn equal_timeframes_are_allowed() {
    let mtf = Mtf::builder()
        .with_source(Arc::new(MockSource::new()))
        .start(StartPoint::Earliest)
        .main_timeframe(Timeframe::H4)
        .detailed_timeframe(Timeframe::H4)
        .build()
        .unwrap();
    assert_eq!(mtf.config().main_timeframe, mtf.config().detailed_timeframe);
}

#[test]
fn config_from_json_drives_the_builder() {
    let json = r#"{
        "main_timeframe": "4h",
        "detailed_timeframe": "15m",
        "start": {"At": "2024-01-01T00:00:00Z"},
        "end": null,
        "page_limit": 500,
        "main_series": "ResampleDetailed",
        "merge": {"attach_main": false},
        "provider_timeout": {"secs": 3, "nanos": 0},
        "request_timeout": null
    }"#;
    let cfg: MtfConfig = serde_json::from_str(json).unwrap();
    let mtf = MtfBuilder::from_config(cfg)
        .with_source(Arc::new(MockSource::new()))
        .build()
        .unwrap();
    let got = mtf.config();
    assert_eq!(got.main_timeframe, Timeframe::H4);
    assert_eq!(got.detailed_timeframe, Timeframe::M15);
    assert_eq!(got.start, Some(StartPoint::At(at(T0))));
    assert_eq!(got.page_limit, 500);
    assert_eq!(got.main_series, MainSeries::ResampleDetailed);
    assert!(!got.merge.attach_main);
    assert_eq!(got.provider_timeout, Duration::from_secs(3));
}
