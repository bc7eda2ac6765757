use std::sync::Arc;

use chrono::{DateTime, Utc};
use mtf::KlineSource;

/// Monday 2024-01-01 00:00:00 UTC, the first bar every demo downloads.
pub const DEMO_START: i64 = 1_704_067_200;

/// Return a kline source for demos.
///
/// The demos never touch the network: the deterministic mock stands in for an
/// exchange client.
#[must_use]
pub fn get_source() -> Arc<dyn KlineSource> {
    println!("--- (Using mock kline source) ---");
    Arc::new(mtf_mock::MockSource::new())
}

/// `DEMO_START` plus `hours`.
#[must_use]
pub fn demo_time(hours: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(DEMO_START + hours * 3_600, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
