use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use backend_domain::services::{clean_query, get_poe_query, input_to_item};
use backend_domain::{ParsedItem, ParsedQuery, SearchOptions, SearchResult, TradeListing, TradeQuery};

use crate::retry::retry_operation;
use crate::{AppError, AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct ItemSearchRequest {
    pub input: String,
    #[serde(default)]
    pub options: SearchOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuerySearchRequest {
    #[serde(default)]
    pub query: Value,
    #[serde(default)]
    pub options: SearchOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    pub search_id: String,
    pub ids: Vec<String>,
    #[serde(default)]
    pub realm: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ParsedItem>,
    pub query: ParsedQuery,
    pub data: SearchResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchPage {
    pub results: Vec<TradeListing>,
}

/// Parses copied item text, derives a query from it and runs the search.
pub async fn search_item(
    state: &AppState,
    request: ItemSearchRequest,
) -> Result<SearchEnvelope, AppError> {
    let item = input_to_item(&request.input, &state.catalog).map_err(|err| {
        state.metrics.record_search_error();
        AppError::BadRequest(err.to_string())
    })?;
    let query = get_poe_query(&item, &request.options, &state.catalog);
    debug!(
        category = item.category.as_deref().unwrap_or("-"),
        rarity = %item.rarity,
        stats = query.stats.len(),
        "item translated"
    );

    let data = execute_search(state, &query, &request.options).await?;
    Ok(SearchEnvelope {
        item: Some(item),
        query,
        data,
    })
}

/// Sanitizes a client-built query and runs the search.
pub async fn search_query(
    state: &AppState,
    request: QuerySearchRequest,
) -> Result<SearchEnvelope, AppError> {
    let query = clean_query(&request.query);
    let data = execute_search(state, &query, &request.options).await?;
    Ok(SearchEnvelope {
        item: None,
        query,
        data,
    })
}

/// Resolves ids left pending by an earlier search.
pub async fn fetch_page(state: &AppState, request: FetchRequest) -> Result<FetchPage, AppError> {
    let search_id = request.search_id.trim();
    if search_id.is_empty() {
        return Err(AppError::BadRequest("search_id is required".to_string()));
    }
    let ids = request
        .ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect::<Vec<_>>();
    if ids.len() > state.config.max_fetch_results {
        return Err(AppError::BadRequest(format!(
            "at most {} ids may be fetched at once",
            state.config.max_fetch_results
        )));
    }
    let realm = request
        .realm
        .as_deref()
        .map(str::trim)
        .filter(|realm| !realm.is_empty())
        .unwrap_or(&state.config.default_realm)
        .to_string();

    let results = fetch_listings(state, &ids, search_id, &realm).await?;
    Ok(FetchPage { results })
}

/// Search phase followed by the batched fetch phase.
pub async fn execute_search(
    state: &AppState,
    query: &ParsedQuery,
    options: &SearchOptions,
) -> Result<SearchResult, AppError> {
    let league = options.resolve_league(&state.config.default_league);
    let realm = options.resolve_realm(&state.config.default_realm);
    let request = TradeQuery::from_parsed(query, options.status);

    let response = match state.trade_api.search(&request, &league, &realm).await {
        Ok(response) => response,
        Err(err) => {
            state.metrics.record_search_error();
            warn!(%league, %realm, "trade search failed: {err:#}");
            return Err(AppError::upstream(err));
        }
    };
    info!(
        search_id = %response.id,
        total = response.total,
        ids = response.result.len(),
        "trade search completed"
    );

    let ids = &response.result;
    let limit = options
        .limit
        .unwrap_or(state.config.max_fetch_results)
        .min(state.config.max_fetch_results);
    let start = options.offset.min(ids.len());
    let end = start.saturating_add(limit).min(ids.len());

    let results = match fetch_listings(state, &ids[start..end], &response.id, &realm).await {
        Ok(results) => results,
        Err(err) => {
            state.metrics.record_search_error();
            return Err(err);
        }
    };

    state.metrics.record_search();
    Ok(SearchResult {
        id: response.id.clone(),
        complexity: response.complexity,
        total: response.total,
        results,
        pending: ids[end..].to_vec(),
    })
}

/// Fetches `ids` in chunks of `fetch_batch_size`, all chunks concurrently.
/// The first failing chunk fails the whole call; listings keep the order of `ids`.
async fn fetch_listings(
    state: &AppState,
    ids: &[String],
    search_id: &str,
    realm: &str,
) -> Result<Vec<TradeListing>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let batch_size = state.config.fetch_batch_size.max(1);
    let retries = state.config.fetch_retries;
    let batches = ids.chunks(batch_size).map(move |chunk| {
        retry_operation(retries, move || state.trade_api.fetch(chunk, search_id, realm))
    });

    let pages = try_join_all(batches).await.map_err(|err| {
        warn!(%search_id, "trade fetch failed: {err:#}");
        AppError::upstream(err)
    })?;

    let batch_count = pages.len();
    let listings = pages
        .into_iter()
        .flat_map(|page| page.result.into_iter().flatten())
        .collect::<Vec<_>>();
    state.metrics.record_fetch(batch_count, listings.len());
    debug!(%search_id, batches = batch_count, listings = listings.len(), "trade fetch completed");
    Ok(listings)
}
