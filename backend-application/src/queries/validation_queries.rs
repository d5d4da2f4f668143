use serde::Serialize;
use serde_json::Value;

use backend_domain::services::{
    clean_query, find_unparsable_bounds, validate_query, ValidationIssue,
};
use backend_domain::ParsedQuery;

use crate::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct QueryValidation {
    pub query: ParsedQuery,
    pub issues: Vec<ValidationIssue>,
}

/// Cleans a client query and reports what the marketplace would likely reject.
/// Never contacts the marketplace.
pub fn check_query(state: &AppState, raw: &Value) -> QueryValidation {
    let query = clean_query(raw);
    let mut issues = find_unparsable_bounds(raw);
    issues.extend(validate_query(&query, &state.catalog));
    state.metrics.record_validation();
    QueryValidation { query, issues }
}
