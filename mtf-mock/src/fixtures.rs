use chrono::{DateTime, Utc};

/// Static description of a symbol the mock can serve.
#[derive(Debug, Clone, Copy)]
pub struct SymbolProfile {
    /// Price level around which the synthetic series oscillates, in cents.
    pub base_cents: i64,
    /// First open time the mock will serve, in epoch seconds.
    pub listed_at: i64,
    /// Skip every fifth hourly-or-coarser window.
    pub gappy: bool,
}

impl SymbolProfile {
    pub fn listed_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.listed_at, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }
}

pub fn by_symbol(symbol: &str) -> Option<SymbolProfile> {
    let p = |base_cents, listed_at, gappy| SymbolProfile {
        base_cents,
        listed_at,
        gappy,
    };
    match symbol {
        // 2017-08-17
        "BTCUSDT" => Some(p(4_300_000, 1_502_928_000, false)),
        "ETHUSDT" => Some(p(30_000, 1_502_928_000, false)),
        // 2020-09-22
        "BNBUSDT" => Some(p(2_500, 1_600_732_800, false)),
        // 2024-01-01
        "NEWUSDT" => Some(p(100, 1_704_067_200, false)),
        "GAPPY" => Some(p(10_000, 1_502_928_000, true)),
        // FAIL and TIMEOUT behave like a listed symbol once their hooks run.
        "FAIL" | "TIMEOUT" => Some(p(1_000, 1_502_928_000, false)),
        _ => None,
    }
}
