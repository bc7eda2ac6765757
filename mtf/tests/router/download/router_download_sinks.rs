use std::sync::Arc;

use async_trait::async_trait;
use mtf::{Candle, CandleSink, MtfError, Timeframe};
use mtf_mock::{MemorySink, MockSource};

use crate::helpers::{BTC, ETH, day_builder};

struct BrokenSink;

#[async_trait]
impl CandleSink for BrokenSink {
    fn name(&self) -> &'static str {
        "broken"
    }

    async fn store_series(
        &self,
        _symbol: &str,
        _timeframe: Timeframe,
        _candles: &[Candle],
    ) -> Result<(), MtfError> {
        Err(MtfError::Data("disk full".into()))
    }
}

#[tokio::test]
async fn sinks_receive_main_and_detailed_series() {
    let sink = Arc::new(MemorySink::new());
    let mtf = day_builder(Arc::new(MockSource::new()))
        .with_sink(sink.clone())
        .build()
        .unwrap();
    let report = mtf.download().symbols([BTC, ETH]).unwrap().run().await.unwrap();
    assert!(report.warnings.is_empty());

    assert_eq!(
        sink.keys().await,
        vec![
            (BTC.to_string(), Timeframe::M15),
            (BTC.to_string(), Timeframe::H1),
            (ETH.to_string(), Timeframe::M15),
            (ETH.to_string(), Timeframe::H1),
        ]
    );
    let resp = report.response.unwrap();
    let btc = resp.get(BTC).unwrap();
    assert_eq!(sink.get(BTC, Timeframe::H1).await.unwrap(), btc.main);
    assert_eq!(sink.get(BTC, Timeframe::M15).await.unwrap(), btc.detailed);
}

#[tokio::test]
async fn every_sink_gets_a_copy() {
    let first = Arc::new(MemorySink::new());
    let second = Arc::new(MemorySink::new());
    let mtf = day_builder(Arc::new(MockSource::new()))
        .with_sink(first.clone())
        .with_sink(second.clone())
        .build()
        .unwrap();
    mtf.download().symbols([BTC]).unwrap().run().await.unwrap();
    assert_eq!(first.keys().await, second.keys().await);
    assert_eq!(first.keys().await.len(), 2);
}

#[tokio::test]
async fn sink_failure_is_a_warning_and_keeps_the_entry() {
    let sink = Arc::new(MemorySink::failing_on([ETH]));
    let mtf = day_builder(Arc::new(MockSource::new()))
        .with_sink(sink.clone())
        .build()
        .unwrap();
    let report = mtf.download().symbols([BTC, ETH]).unwrap().run().await.unwrap();

    let resp = report.response.unwrap();
    assert_eq!(resp.entries.len(), 2);
    assert!(resp.get(ETH).is_some());
    assert_eq!(report.warnings.len(), 2);
    assert!(
        report
            .warnings
            .iter()
            .all(|w| matches!(w, MtfError::Sink { sink, .. } if sink == "memory"))
    );
    assert!(sink.get(BTC, Timeframe::H1).await.is_some());
    assert!(sink.get(ETH, Timeframe::H1).await.is_none());
}

#[tokio::test]
async fn foreign_sink_errors_are_tagged_with_the_sink() {
    let mtf = day_builder(Arc::new(MockSource::new()))
        .with_sink(Arc::new(BrokenSink))
        .build()
        .unwrap();
    let report = mtf.download().symbols([BTC]).unwrap().run().await.unwrap();
    assert_eq!(report.response.unwrap().entries.len(), 1);
    assert_eq!(
        report.warnings,
        vec![
            MtfError::sink("broken", "data issue: disk full"),
            MtfError::sink("broken", "data issue: disk full"),
        ]
    );
}
