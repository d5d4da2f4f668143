use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::warn;

use backend_application::commands::{
    search_commands, FetchPage, FetchRequest, ItemSearchRequest, QuerySearchRequest,
    SearchEnvelope,
};
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_body};

pub async fn search_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SearchEnvelope>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let request: ItemSearchRequest = parse_body(&body).map_err(|err| {
        warn!("rejected item search body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let envelope = search_commands::search_item(&state, request).await?;
    Ok(Json(envelope))
}

pub async fn search_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SearchEnvelope>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let request: QuerySearchRequest = parse_body(&body).map_err(|err| {
        warn!("rejected query search body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let envelope = search_commands::search_query(&state, request).await?;
    Ok(Json(envelope))
}

pub async fn fetch_listings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<FetchPage>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let request: FetchRequest =
        parse_body(&body).map_err(|err| HttpError::BadRequest(err.to_string()))?;
    let page = search_commands::fetch_page(&state, request).await?;
    Ok(Json(page))
}
