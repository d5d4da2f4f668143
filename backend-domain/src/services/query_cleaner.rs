//! Structural normalization of untrusted filter queries.
//!
//! The cleaner never rejects input. It removes what cannot be acted on, coerces
//! what can, and always returns a fully shaped [`ParsedQuery`]. Semantic checks
//! (ranges, known currencies) live in [`crate::services::query_validator`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::entities::{
    FilterGroup, FilterValue, ParsedQuery, RangeValue, StatFilter, StatGroup, DEFAULT_STAT_GROUP,
};
use crate::utils::parse_finite;

pub fn clean_query(dirty: &Value) -> ParsedQuery {
    let Some(root) = dirty.as_object() else {
        return ParsedQuery::default();
    };
    ParsedQuery {
        name: clean_text(root.get("name")),
        base_type: clean_text(root.get("type")),
        stats: clean_stats(root.get("stats")),
        filters: clean_filter_groups(root.get("filters")),
    }
}

fn clean_stats(value: Option<&Value>) -> Vec<StatGroup> {
    value
        .and_then(Value::as_array)
        .map(|groups| groups.iter().filter_map(clean_stat_group).collect())
        .unwrap_or_default()
}

fn clean_stat_group(raw: &Value) -> Option<StatGroup> {
    let map = raw.as_object()?;
    let group_type =
        clean_text(map.get("type")).unwrap_or_else(|| DEFAULT_STAT_GROUP.to_string());
    let mut group = StatGroup::new(group_type);
    let raw_filters = map.get("filters").and_then(Value::as_array);
    for raw_filter in raw_filters.into_iter().flatten() {
        if let Some(filter) = clean_stat_filter(raw_filter) {
            group.push_unique(filter);
        }
    }
    if group.filters.is_empty() {
        return None;
    }
    group.value = map
        .get("value")
        .and_then(clean_range)
        .filter(|range| !range.is_empty());
    Some(group)
}

fn clean_stat_filter(raw: &Value) -> Option<StatFilter> {
    let map = raw.as_object()?;
    let id = clean_text(map.get("id"))?;
    let text = map
        .get("text")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .unwrap_or_default();
    Some(StatFilter {
        id,
        text,
        value: map.get("value").and_then(clean_range).unwrap_or_default(),
        disabled: coerce_flag(map.get("disabled")),
    })
}

fn clean_filter_groups(value: Option<&Value>) -> BTreeMap<String, FilterGroup> {
    let Some(groups) = value.and_then(Value::as_object) else {
        return BTreeMap::new();
    };
    groups
        .iter()
        .filter_map(|(key, raw)| {
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            clean_filter_group(raw).map(|group| (key.to_string(), group))
        })
        .collect()
}

fn clean_filter_group(raw: &Value) -> Option<FilterGroup> {
    let map = raw.as_object()?;
    let filters = map.get("filters").and_then(Value::as_object)?;
    let states = map
        .get("filterStates")
        .or_else(|| map.get("filter_states"))
        .and_then(Value::as_object);
    let group_disabled = coerce_flag(map.get("disabled"));

    let mut group = FilterGroup::default();
    for (raw_id, raw_value) in filters {
        let id = raw_id.trim();
        if id.is_empty() {
            continue;
        }
        let Some(value) = clean_filter_value(raw_value) else {
            continue;
        };
        let enabled = !group_disabled && lookup_state(states, raw_id, id);
        group.insert_with_state(id, value, enabled);
    }
    if group.is_empty() {
        return None;
    }
    Some(group)
}

fn lookup_state(states: Option<&Map<String, Value>>, raw_id: &str, id: &str) -> bool {
    let Some(states) = states else {
        return true;
    };
    coerce_state(states.get(raw_id).or_else(|| states.get(id)))
}

/// A filter survives when it carries an option or at least one numeric bound.
fn clean_filter_value(raw: &Value) -> Option<FilterValue> {
    match raw {
        Value::Object(map) => {
            let original_value = coerce_option(
                map.get("originalValue")
                    .or_else(|| map.get("original_value")),
            );
            if let Some(option) = coerce_option(map.get("option")) {
                return Some(FilterValue::Option {
                    option,
                    original_value,
                });
            }
            let min = coerce_number(map.get("min"));
            let max = coerce_number(map.get("max"));
            if min.is_none() && max.is_none() {
                return None;
            }
            Some(FilterValue::Range {
                min,
                max,
                original_value,
            })
        }
        Value::Number(_) => coerce_number(Some(raw)).map(FilterValue::min),
        Value::String(text) => match parse_finite(text) {
            Some(number) => Some(FilterValue::min(number)),
            None => coerce_option(Some(raw)).map(FilterValue::option),
        },
        Value::Bool(flag) => Some(FilterValue::option(flag.to_string())),
        _ => None,
    }
}

fn clean_range(raw: &Value) -> Option<RangeValue> {
    match raw {
        Value::Object(map) => Some(RangeValue {
            min: coerce_number(map.get("min")),
            max: coerce_number(map.get("max")),
        }),
        Value::Number(_) | Value::String(_) => coerce_number(Some(raw)).map(|min| RangeValue {
            min: Some(min),
            max: None,
        }),
        _ => None,
    }
}

fn clean_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => parse_finite(text),
        _ => None,
    }
}

pub(crate) fn coerce_option(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn coerce_state(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => !matches!(
            text.trim().to_lowercase().as_str(),
            "false" | "0" | "off" | "no"
        ),
        Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        _ => true,
    }
}

fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => matches!(text.trim().to_lowercase().as_str(), "true" | "1"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EQUIPMENT_FILTERS, TYPE_FILTERS};
    use serde_json::json;

    fn reclean(query: &ParsedQuery) -> ParsedQuery {
        let value = serde_json::to_value(query).expect("serialize cleaned query");
        clean_query(&value)
    }

    fn dirty_fixture() -> Value {
        json!({
            "name": "  ",
            "type": " Recurve Bow ",
            "unexpected": {"nested": true},
            "stats": [
                {
                    "filters": [
                        {"id": "explicit.stat_3299347043", "text": "# to maximum Life", "value": {"min": "40"}},
                        {"id": "explicit.stat_3299347043", "value": {"min": 99}},
                        {"id": "", "value": {"min": 1}},
                        {"text": "no id"},
                        {"id": "explicit.stat_4220027924", "value": {"min": "abc"}, "disabled": "true"}
                    ]
                },
                {"type": "count", "filters": []},
                "garbage"
            ],
            "filters": {
                "type_filters": {
                    "filters": {
                        "category": {"option": "weapon.bow"},
                        "ilvl": {"min": "75", "max": ""},
                        "quality": {"min": "abc", "max": "x"},
                        "rarity": {"option": "", "min": 3}
                    }
                },
                "equipment_filters": {
                    "filters": {
                        "pdps": {"min": 150.5, "originalValue": 160},
                        "aps": "1.2",
                        "crit": null
                    },
                    "filterStates": {"pdps": false, "ghost": true}
                },
                "misc_filters": {"filters": {"corrupted": {}}},
                "req_filters": "nonsense",
                "  ": {"filters": {"x": {"min": 1}}}
            }
        })
    }

    #[test]
    fn non_object_input_yields_empty_query() {
        assert_eq!(clean_query(&json!(null)), ParsedQuery::default());
        assert_eq!(clean_query(&json!([1, 2])), ParsedQuery::default());
        assert_eq!(clean_query(&json!("query")), ParsedQuery::default());
    }

    #[test]
    fn clean_drops_filters_without_actionable_value() {
        let query = clean_query(&dirty_fixture());
        let type_filters = query.filters.get(TYPE_FILTERS).expect("type filters");
        assert!(!type_filters.filters.contains_key("quality"));
        assert!(query.filters.get("misc_filters").is_none());
        assert!(query.filters.get("req_filters").is_none());
        assert!(!query.filters.contains_key("  "));
        let equipment = query.filters.get(EQUIPMENT_FILTERS).expect("equipment filters");
        assert!(!equipment.filters.contains_key("crit"));
    }

    #[test]
    fn clean_coerces_numeric_strings() {
        let query = clean_query(&dirty_fixture());
        assert_eq!(
            query.filter(TYPE_FILTERS, "ilvl"),
            Some(&FilterValue::Range {
                min: Some(75.0),
                max: None,
                original_value: None,
            })
        );
        assert_eq!(query.filter(EQUIPMENT_FILTERS, "aps"), Some(&FilterValue::min(1.2)));
        let life = &query.stats[0].filters[0];
        assert_eq!(life.value.min, Some(40.0));
    }

    #[test]
    fn clean_prefers_option_over_range() {
        let query = clean_query(&json!({
            "filters": {"type_filters": {"filters": {"rarity": {"option": "rare", "min": 3}}}}
        }));
        assert_eq!(
            query.filter(TYPE_FILTERS, "rarity"),
            Some(&FilterValue::option("rare"))
        );
        // an empty option falls back to the range
        let query = clean_query(&dirty_fixture());
        assert_eq!(
            query.filter(TYPE_FILTERS, "rarity"),
            Some(&FilterValue::min(3.0))
        );
    }

    #[test]
    fn clean_keeps_disabled_filters_and_fills_states() {
        let query = clean_query(&dirty_fixture());
        let equipment = query.filters.get(EQUIPMENT_FILTERS).expect("equipment filters");
        assert_eq!(equipment.filter_states.get("pdps"), Some(&false));
        assert_eq!(equipment.filter_states.get("aps"), Some(&true));
        assert!(!equipment.filter_states.contains_key("ghost"));
        assert_eq!(
            equipment.filters.get("pdps"),
            Some(&FilterValue::Range {
                min: Some(150.5),
                max: None,
                original_value: Some("160".to_string()),
            })
        );
        let type_filters = query.filters.get(TYPE_FILTERS).expect("type filters");
        assert_eq!(type_filters.filter_states.len(), type_filters.filters.len());
    }

    #[test]
    fn clean_disabled_group_disables_every_filter() {
        let query = clean_query(&json!({
            "filters": {"misc_filters": {"disabled": true, "filters": {"corrupted": {"option": "true"}}}}
        }));
        let misc = query.filters.get("misc_filters").expect("misc filters");
        assert!(!misc.is_enabled("corrupted"));
    }

    #[test]
    fn clean_normalizes_stats() {
        let query = clean_query(&dirty_fixture());
        assert_eq!(query.stats.len(), 1);
        let group = &query.stats[0];
        assert_eq!(group.group_type, "and");
        let ids = group.filters.iter().map(|f| f.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["explicit.stat_3299347043", "explicit.stat_4220027924"]);
        assert_eq!(group.filters[0].value.min, Some(40.0));
        let cold = &group.filters[1];
        assert!(cold.disabled);
        assert!(cold.value.is_empty());
    }

    #[test]
    fn clean_trims_name_and_type() {
        let query = clean_query(&dirty_fixture());
        assert_eq!(query.name, None);
        assert_eq!(query.base_type.as_deref(), Some("Recurve Bow"));
    }

    #[test]
    fn clean_is_idempotent() {
        let fixtures = vec![
            dirty_fixture(),
            json!({}),
            json!({"filters": {"trade_filters": {"filters": {"price": {"max": "5", "option": "divine"}}}}}),
            json!({"stats": [{"type": "count", "value": {"min": "2"}, "filters": [{"id": "a"}, {"id": "b", "value": 3}]}]}),
        ];
        for fixture in fixtures {
            let once = clean_query(&fixture);
            let twice = reclean(&once);
            assert_eq!(once, twice);
        }
    }
}
