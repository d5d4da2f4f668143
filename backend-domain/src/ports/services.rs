use async_trait::async_trait;

use crate::entities::{FetchResponse, SearchResponse, TradeQuery};

/// Two-phase marketplace protocol: a search yields opaque ids scoped to a search id,
/// and the ids are resolved into listings by separate fetch calls.
#[async_trait]
pub trait TradeApi: Send + Sync {
    async fn search(
        &self,
        query: &TradeQuery,
        league: &str,
        realm: &str,
    ) -> anyhow::Result<SearchResponse>;

    async fn fetch(
        &self,
        ids: &[String],
        search_id: &str,
        realm: &str,
    ) -> anyhow::Result<FetchResponse>;
}
