// Trade marketplace wire types
// Search phase returns opaque result ids; fetch phase resolves them to listings

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::query::{FilterValue, ParsedQuery, RangeValue};
use crate::value_objects::TradeStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub id: String,
    #[serde(default)]
    pub complexity: Option<u32>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub result: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    /// The remote answers `null` for ids whose listing vanished.
    #[serde(default)]
    pub result: Vec<Option<TradeListing>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeListing {
    pub id: String,
    #[serde(default)]
    pub listing: Listing,
    #[serde(default)]
    pub item: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<ListingAccount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<ListingPrice>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingAccount {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingPrice {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub price_type: Option<String>,
    pub amount: f64,
    pub currency: String,
}

/// Outcome of a two-phase search handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub complexity: Option<u32>,
    pub total: u64,
    pub results: Vec<TradeListing>,
    /// Result ids past the requested page, resolvable later with the same search id.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending: Vec<String>,
}

/// Request body of the marketplace search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeQuery {
    pub query: TradeQueryBody,
    pub sort: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeQueryBody {
    pub status: WireOption,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    pub stats: Vec<WireStatGroup>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, WireFilterGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireOption {
    pub option: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireStatGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    pub filters: Vec<WireStatFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<RangeValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireStatFilter {
    pub id: String,
    #[serde(skip_serializing_if = "RangeValue::is_empty")]
    pub value: RangeValue,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireFilterGroup {
    pub filters: BTreeMap<String, WireFilterValue>,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireFilterValue {
    Option { option: String },
    Range(RangeValue),
}

impl From<&FilterValue> for WireFilterValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Option { option, .. } => WireFilterValue::Option {
                option: option.clone(),
            },
            FilterValue::Range { min, max, .. } => WireFilterValue::Range(RangeValue {
                min: *min,
                max: *max,
            }),
        }
    }
}

impl TradeQuery {
    /// Builds the marketplace request from a cleaned query, leaving out disabled filters
    /// and groups that end up empty.
    pub fn from_parsed(query: &ParsedQuery, status: TradeStatus) -> Self {
        let stats = query
            .stats
            .iter()
            .filter(|group| !group.filters.is_empty())
            .map(|group| WireStatGroup {
                group_type: group.group_type.clone(),
                filters: group
                    .filters
                    .iter()
                    .map(|filter| WireStatFilter {
                        id: filter.id.clone(),
                        value: filter.value.clone(),
                        disabled: filter.disabled,
                    })
                    .collect(),
                value: group.value.clone(),
            })
            .collect();

        let filters = query
            .filters
            .iter()
            .filter_map(|(key, group)| {
                let filters = group
                    .enabled_filters()
                    .map(|(id, value)| (id.clone(), WireFilterValue::from(value)))
                    .collect::<BTreeMap<_, _>>();
                if filters.is_empty() {
                    return None;
                }
                Some((
                    key.clone(),
                    WireFilterGroup {
                        filters,
                        disabled: false,
                    },
                ))
            })
            .collect();

        let mut sort = BTreeMap::new();
        sort.insert("price".to_string(), "asc".to_string());

        Self {
            query: TradeQueryBody {
                status: WireOption {
                    option: status.as_str().to_string(),
                },
                name: query.name.clone(),
                base_type: query.base_type.clone(),
                stats,
                filters,
            },
            sort,
        }
    }
}
