// Query entities
// Canonical, fully shaped form of a marketplace filter query

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TYPE_FILTERS: &str = "type_filters";
pub const REQ_FILTERS: &str = "req_filters";
pub const EQUIPMENT_FILTERS: &str = "equipment_filters";
pub const MISC_FILTERS: &str = "misc_filters";
pub const TRADE_FILTERS: &str = "trade_filters";

pub const DEFAULT_STAT_GROUP: &str = "and";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RangeValue {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// A single filter constraint: either a numeric range or a discrete option, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Option {
        option: String,
        #[serde(
            rename = "originalValue",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        original_value: Option<String>,
    },
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(
            rename = "originalValue",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        original_value: Option<String>,
    },
}

impl FilterValue {
    pub fn min(value: f64) -> Self {
        FilterValue::Range {
            min: Some(value),
            max: None,
            original_value: None,
        }
    }

    pub fn max(value: f64) -> Self {
        FilterValue::Range {
            min: None,
            max: Some(value),
            original_value: None,
        }
    }

    pub fn option(value: impl Into<String>) -> Self {
        FilterValue::Option {
            option: value.into(),
            original_value: None,
        }
    }

    pub fn range(&self) -> Option<RangeValue> {
        match self {
            FilterValue::Range { min, max, .. } => Some(RangeValue {
                min: *min,
                max: *max,
            }),
            FilterValue::Option { .. } => None,
        }
    }

    pub fn option_value(&self) -> Option<&str> {
        match self {
            FilterValue::Option { option, .. } => Some(option),
            FilterValue::Range { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub filters: BTreeMap<String, FilterValue>,
    #[serde(rename = "filterStates", alias = "filter_states", default)]
    pub filter_states: BTreeMap<String, bool>,
}

impl FilterGroup {
    pub fn insert(&mut self, id: impl Into<String>, value: FilterValue) {
        self.insert_with_state(id, value, true);
    }

    pub fn insert_with_state(&mut self, id: impl Into<String>, value: FilterValue, enabled: bool) {
        let id = id.into();
        self.filter_states.insert(id.clone(), enabled);
        self.filters.insert(id, value);
    }

    /// Filters without a state entry count as enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.filter_states.get(id).copied().unwrap_or(true)
    }

    pub fn enabled_filters(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.filters.iter().filter(|(id, _)| self.is_enabled(id))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatFilter {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: RangeValue,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    #[serde(default)]
    pub filters: Vec<StatFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<RangeValue>,
}

impl StatGroup {
    pub fn new(group_type: impl Into<String>) -> Self {
        Self {
            group_type: group_type.into(),
            filters: Vec::new(),
            value: None,
        }
    }

    /// Adds `filter` unless a filter with the same id is already present.
    pub fn push_unique(&mut self, filter: StatFilter) -> bool {
        if self.filters.iter().any(|existing| existing.id == filter.id) {
            return false;
        }
        self.filters.push(filter);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    #[serde(default)]
    pub stats: Vec<StatGroup>,
    #[serde(default)]
    pub filters: BTreeMap<String, FilterGroup>,
}

impl ParsedQuery {
    pub fn group_mut(&mut self, key: &str) -> &mut FilterGroup {
        self.filters.entry(key.to_string()).or_default()
    }

    pub fn filter(&self, group: &str, id: &str) -> Option<&FilterValue> {
        self.filters.get(group)?.filters.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_value_serializes_without_tags() {
        let range = serde_json::to_value(FilterValue::min(10.0)).expect("serialize range");
        assert_eq!(range, json!({"min": 10.0}));
        let option = serde_json::to_value(FilterValue::option("rare")).expect("serialize option");
        assert_eq!(option, json!({"option": "rare"}));
    }

    #[test]
    fn filter_value_prefers_option_when_deserializing() {
        let value: FilterValue =
            serde_json::from_value(json!({"option": "weapon.bow"})).expect("deserialize option");
        assert_eq!(value.option_value(), Some("weapon.bow"));
        let value: FilterValue =
            serde_json::from_value(json!({"min": 1, "max": 4})).expect("deserialize range");
        assert_eq!(
            value.range(),
            Some(RangeValue {
                min: Some(1.0),
                max: Some(4.0)
            })
        );
    }

    #[test]
    fn filter_group_tracks_states() {
        let mut group = FilterGroup::default();
        group.insert("ilvl", FilterValue::min(80.0));
        group.insert_with_state("quality", FilterValue::min(20.0), false);
        assert!(group.is_enabled("ilvl"));
        assert!(!group.is_enabled("quality"));
        let enabled = group.enabled_filters().map(|(id, _)| id.as_str()).collect::<Vec<_>>();
        assert_eq!(enabled, vec!["ilvl"]);
    }

    #[test]
    fn stat_group_rejects_duplicate_ids() {
        let mut group = StatGroup::new(DEFAULT_STAT_GROUP);
        let filter = StatFilter {
            id: "explicit.stat_3299347043".to_string(),
            text: "# to maximum Life".to_string(),
            value: RangeValue::default(),
            disabled: false,
        };
        assert!(group.push_unique(filter.clone()));
        assert!(!group.push_unique(filter));
        assert_eq!(group.filters.len(), 1);
    }
}
