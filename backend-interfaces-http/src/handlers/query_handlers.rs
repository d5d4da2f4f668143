use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use backend_application::queries::{catalog_queries, validation_queries, QueryValidation};
use backend_application::AppState;
use backend_domain::CatalogOption;

use crate::error::HttpError;
use crate::middleware::{authorize, parse_body};

#[derive(Deserialize)]
struct ValidateRequest {
    #[serde(default)]
    query: Value,
}

pub async fn validate_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<QueryValidation>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let request: ValidateRequest =
        parse_body(&body).map_err(|err| HttpError::BadRequest(err.to_string()))?;
    Ok(Json(validation_queries::check_query(&state, &request.query)))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<CatalogOption>> {
    Json(catalog_queries::list_categories(&state))
}
