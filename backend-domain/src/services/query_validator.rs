use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::{Catalog, FilterValue, ParsedQuery, RangeValue, TRADE_FILTERS};
use crate::services::query_cleaner::{coerce_number, coerce_option};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reports semantic problems in a cleaned query. Callers decide whether to submit anyway.
pub fn validate_query(query: &ParsedQuery, catalog: &Catalog) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (key, group) in &query.filters {
        if !catalog.has_filter_group(key) {
            issues.push(ValidationIssue::new(
                format!("filters.{key}"),
                format!("unknown filter group '{key}'"),
            ));
        }
        for (id, value) in &group.filters {
            let field = format!("filters.{key}.{id}");
            match value {
                FilterValue::Range { min, max, .. } => {
                    check_range(
                        &field,
                        &RangeValue {
                            min: *min,
                            max: *max,
                        },
                        false,
                        &mut issues,
                    );
                }
                FilterValue::Option { option, .. } => {
                    if key == TRADE_FILTERS && id == "price" && !catalog.has_currency(option) {
                        issues.push(ValidationIssue::new(
                            field,
                            format!("unknown currency '{option}'"),
                        ));
                    }
                }
            }
        }
    }

    for (group_index, group) in query.stats.iter().enumerate() {
        if let Some(value) = &group.value {
            check_range(&format!("stats[{group_index}].value"), value, false, &mut issues);
        }
        for (filter_index, filter) in group.filters.iter().enumerate() {
            let field = format!("stats[{group_index}].filters[{filter_index}]");
            if filter.id.trim().is_empty() {
                issues.push(ValidationIssue::new(field.clone(), "stat id is required"));
            }
            // stat rolls may legitimately be negative
            check_range(&format!("{field}.value"), &filter.value, true, &mut issues);
        }
    }

    issues
}

fn check_range(field: &str, range: &RangeValue, allow_negative: bool, issues: &mut Vec<ValidationIssue>) {
    for (side, bound) in [("min", range.min), ("max", range.max)] {
        let Some(bound) = bound else {
            continue;
        };
        if !allow_negative && bound < 0.0 {
            issues.push(ValidationIssue::new(field, format!("{side} must not be negative")));
        }
    }
    if let (Some(min), Some(max)) = (range.min, range.max) {
        if min > max {
            issues.push(ValidationIssue::new(field, "min must not exceed max"));
        }
    }
}

/// Reports bounds in a raw query that are present but not numbers.
///
/// The cleaner drops such bounds, so they never reach [`validate_query`]. Fields
/// use the positions of the submitted query.
pub fn find_unparsable_bounds(dirty: &Value) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let groups = dirty.get("filters").and_then(Value::as_object);
    for (key, group) in groups.into_iter().flatten() {
        let key = key.trim();
        let filters = group.get("filters").and_then(Value::as_object);
        for (id, value) in filters.into_iter().flatten() {
            let id = id.trim();
            let Some(map) = value.as_object() else {
                continue;
            };
            if key.is_empty() || id.is_empty() || coerce_option(map.get("option")).is_some() {
                continue;
            }
            check_bounds(&format!("filters.{key}.{id}"), map, &mut issues);
        }
    }

    let stats = dirty.get("stats").and_then(Value::as_array);
    for (group_index, group) in stats.into_iter().flatten().enumerate() {
        let filters = group.get("filters").and_then(Value::as_array);
        for (filter_index, filter) in filters.into_iter().flatten().enumerate() {
            let field = format!("stats[{group_index}].filters[{filter_index}].value");
            match filter.get("value") {
                Some(Value::Object(map)) => check_bounds(&field, map, &mut issues),
                Some(scalar @ Value::String(_)) if coerce_number(Some(scalar)).is_none() => {
                    issues.push(ValidationIssue::new(field, "min must be a number"));
                }
                _ => {}
            }
        }
    }

    issues
}

fn check_bounds(field: &str, map: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
    for side in ["min", "max"] {
        match map.get(side) {
            None | Some(Value::Null) => {}
            Some(bound) if coerce_number(Some(bound)).is_some() => {}
            Some(_) => issues.push(ValidationIssue::new(field, format!("{side} must be a number"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clean_query;
    use serde_json::json;

    fn validate(raw: serde_json::Value) -> Vec<ValidationIssue> {
        validate_query(&clean_query(&raw), &Catalog::builtin())
    }

    #[test]
    fn clean_query_has_no_issues() {
        let issues = validate(json!({
            "filters": {
                "type_filters": {"filters": {"ilvl": {"min": 70, "max": 86}}},
                "trade_filters": {"filters": {"price": {"option": "divine"}}}
            },
            "stats": [{"filters": [{"id": "explicit.stat_2923486259", "value": {"min": -20}}]}]
        }));
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn inverted_and_negative_ranges_are_flagged() {
        let issues = validate(json!({
            "filters": {"equipment_filters": {"filters": {"ar": {"min": 500, "max": 100}, "ev": {"min": "-3"}}}}
        }));
        assert_eq!(
            issues,
            vec![
                ValidationIssue::new("filters.equipment_filters.ar", "min must not exceed max"),
                ValidationIssue::new("filters.equipment_filters.ev", "min must not be negative"),
            ]
        );
    }

    #[test]
    fn unknown_group_and_currency_are_flagged() {
        let issues = validate(json!({
            "filters": {
                "mystery_filters": {"filters": {"x": {"min": 1}}},
                "trade_filters": {"filters": {"price": {"option": "seashells"}}}
            }
        }));
        let fields = issues.iter().map(|i| i.field.as_str()).collect::<Vec<_>>();
        assert_eq!(fields, vec!["filters.mystery_filters", "filters.trade_filters.price"]);
    }

    #[test]
    fn non_numeric_bounds_in_raw_query_are_flagged() {
        let raw = json!({
            "filters": {
                "type_filters": {"filters": {
                    "ilvl": {"min": "abc", "max": 5},
                    "quality": {"min": "x"},
                    "rarity": {"option": "rare", "min": "ignored"},
                    "gem_level": {"min": "12", "max": null}
                }}
            },
            "stats": [{"filters": [
                {"id": "explicit.stat_1", "value": {"max": []}},
                {"id": "explicit.stat_2", "value": "lots"}
            ]}]
        });

        let issues = find_unparsable_bounds(&raw);

        assert_eq!(
            issues,
            vec![
                ValidationIssue::new("filters.type_filters.ilvl", "min must be a number"),
                ValidationIssue::new("filters.type_filters.quality", "min must be a number"),
                ValidationIssue::new("stats[0].filters[0].value", "max must be a number"),
                ValidationIssue::new("stats[0].filters[1].value", "min must be a number"),
            ]
        );
        // the cleaned query alone no longer shows the dropped bounds
        assert!(validate(raw).is_empty());
    }

    #[test]
    fn well_formed_raw_query_has_no_unparsable_bounds() {
        let issues = find_unparsable_bounds(&json!({
            "filters": {"equipment_filters": {"filters": {"ar": {"min": "100", "max": 500.5}, "junk": {}}}},
            "stats": [{"filters": [{"id": "explicit.stat_1", "value": {"min": -4}}]}]
        }));
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn inverted_stat_range_is_flagged() {
        let issues = validate(json!({
            "stats": [{"filters": [{"id": "explicit.stat_3299347043", "value": {"min": 90, "max": 10}}]}]
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "stats[0].filters[0].value");
    }
}
