use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend_domain::ports::TradeApi;
use backend_domain::{
    Catalog, FetchResponse, Listing, RuntimeConfig, SearchResponse, TradeListing, TradeQuery,
};
use serde_json::json;

use crate::{AppState, Metrics};

/// In-memory marketplace that records every call it receives.
#[derive(Default)]
pub struct FakeTradeApi {
    pub result_ids: Vec<String>,
    pub failing_ids: HashSet<String>,
    pub vanished_ids: HashSet<String>,
    pub transient_failures: AtomicU32,
    pub search_error: Option<String>,
    pub searches: Mutex<Vec<(TradeQuery, String, String)>>,
    pub fetches: Mutex<Vec<(Vec<String>, String, String)>>,
}

impl FakeTradeApi {
    pub fn with_ids(count: usize) -> Self {
        Self {
            result_ids: (0..count).map(|i| format!("id-{i}")).collect(),
            ..Self::default()
        }
    }

    pub fn fetch_sizes(&self) -> Vec<usize> {
        self.fetches
            .lock()
            .expect("fetch log")
            .iter()
            .map(|(ids, _, _)| ids.len())
            .collect()
    }
}

#[async_trait]
impl TradeApi for FakeTradeApi {
    async fn search(
        &self,
        query: &TradeQuery,
        league: &str,
        realm: &str,
    ) -> anyhow::Result<SearchResponse> {
        self.searches
            .lock()
            .expect("search log")
            .push((query.clone(), league.to_string(), realm.to_string()));
        if let Some(message) = &self.search_error {
            anyhow::bail!("{message}");
        }
        Ok(SearchResponse {
            id: "search-1".to_string(),
            complexity: Some(7),
            total: self.result_ids.len() as u64,
            result: self.result_ids.clone(),
        })
    }

    async fn fetch(
        &self,
        ids: &[String],
        search_id: &str,
        realm: &str,
    ) -> anyhow::Result<FetchResponse> {
        self.fetches.lock().expect("fetch log").push((
            ids.to_vec(),
            search_id.to_string(),
            realm.to_string(),
        ));
        if let Some(id) = ids.iter().find(|id| self.failing_ids.contains(*id)) {
            anyhow::bail!("listing {id} unavailable");
        }
        let pending_failures = self.transient_failures.load(Ordering::SeqCst);
        if pending_failures > 0 {
            self.transient_failures
                .store(pending_failures - 1, Ordering::SeqCst);
            anyhow::bail!("rate limited");
        }
        Ok(FetchResponse {
            result: ids
                .iter()
                .map(|id| {
                    (!self.vanished_ids.contains(id)).then(|| TradeListing {
                        id: id.clone(),
                        listing: Listing::default(),
                        item: json!({ "id": id }),
                    })
                })
                .collect(),
        })
    }
}

pub fn state_with(api: Arc<FakeTradeApi>) -> AppState {
    AppState {
        config: RuntimeConfig::default(),
        trade_api: api,
        catalog: Arc::new(Catalog::builtin()),
        metrics: Arc::new(Metrics::default()),
    }
}
