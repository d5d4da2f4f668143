use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use backend_domain::ports::TradeApi;
use backend_domain::{FetchResponse, SearchResponse, TradeApiConfig, TradeQuery};

#[derive(Debug, Error)]
pub enum TradeApiError {
    #[error("invalid trade api url: {0}")]
    InvalidUrl(String),
    #[error("trade api returned {status}: {message}")]
    Remote { status: u16, message: String },
}

#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    error: Option<RemoteError>,
}

#[derive(Debug, Default, Deserialize)]
struct RemoteError {
    #[serde(default)]
    message: Option<String>,
}

/// reqwest-backed marketplace client.
pub struct TradeApiClient {
    client: Client,
    base_url: Url,
}

impl TradeApiClient {
    pub fn new(config: &TradeApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| TradeApiError::InvalidUrl(format!("{}: {}", config.base_url, err)))?;
        if base_url.cannot_be_a_base() {
            return Err(TradeApiError::InvalidUrl(config.base_url.clone()).into());
        }
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TradeApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl TradeApi for TradeApiClient {
    async fn search(
        &self,
        query: &TradeQuery,
        league: &str,
        realm: &str,
    ) -> Result<SearchResponse> {
        let url = self.endpoint(&["api", "trade2", "search", realm, league])?;
        debug!(%url, "trade search request");
        let response = self.client.post(url).json(query).send().await?;
        read_json(response).await
    }

    async fn fetch(&self, ids: &[String], search_id: &str, realm: &str) -> Result<FetchResponse> {
        let joined = ids.join(",");
        let mut url = self.endpoint(&["api", "trade2", "fetch", joined.as_str()])?;
        url.query_pairs_mut()
            .append_pair("query", search_id)
            .append_pair("realm", realm);
        debug!(count = ids.len(), %search_id, "trade fetch request");
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<RemoteErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                trimmed.to_string()
            }
        });
    Err(TradeApiError::Remote {
        status: status.as_u16(),
        message,
    }
    .into())
}
