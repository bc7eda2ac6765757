use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use mtf_core::{KlineRequest, KlineSource, MtfError, RawKline, Timeframe};

/// Instruction for how a method should behave for a given symbol.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(MtfError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    kline_rules: HashMap<String, MockBehavior<Vec<RawKline>>>,
    earliest_rules: HashMap<String, MockBehavior<DateTime<Utc>>>,
    requests: Vec<KlineRequest>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for `klines` calls for a specific symbol.
    ///
    /// A `Return` payload is the full history; each request receives the
    /// klines within its `[start, end]` range, truncated to its `limit`.
    pub async fn set_klines_behavior(
        &self,
        symbol: impl Into<String>,
        behavior: MockBehavior<Vec<RawKline>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.kline_rules.insert(symbol.into(), behavior);
    }

    /// Set the behavior for `earliest_timestamp` calls for a specific symbol.
    pub async fn set_earliest_behavior(
        &self,
        symbol: impl Into<String>,
        behavior: MockBehavior<DateTime<Utc>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.earliest_rules.insert(symbol.into(), behavior);
    }

    /// Return a copy of every `klines` request received so far.
    pub async fn requests(&self) -> Vec<KlineRequest> {
        let guard = self.state.lock().await;
        guard.requests.clone()
    }

    /// Clear all configured behaviors and request logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.kline_rules.clear();
        guard.earliest_rules.clear();
        guard.requests.clear();
    }
}

/// A source that defers all behavior to an external controller.
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn KlineSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn KlineSource>, controller)
    }
}

#[async_trait]
impl KlineSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn klines(&self, req: &KlineRequest) -> Result<Vec<RawKline>, MtfError> {
        // Log and snapshot without holding the lock across the hang below.
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req.clone());
            guard.kline_rules.get(&req.symbol).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(all)) => {
                let start = req.start.timestamp_millis();
                let end = req.end.timestamp_millis();
                let limit = usize::try_from(req.limit).unwrap_or(usize::MAX);
                Ok(all
                    .into_iter()
                    .filter(|k| k.open_time >= start && k.open_time <= end)
                    .take(limit)
                    .collect())
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(MtfError::not_found(format!("symbol {}", req.symbol))),
        }
    }

    async fn earliest_timestamp(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
    ) -> Result<DateTime<Utc>, MtfError> {
        let behavior = {
            let guard = self.state.lock().await;
            guard.earliest_rules.get(symbol).cloned()
        };

        match behavior {
            Some(MockBehavior::Return(ts)) => Ok(ts),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(MtfError::not_found(format!("symbol {symbol}"))),
        }
    }
}
