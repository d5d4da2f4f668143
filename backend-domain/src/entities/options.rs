// Per-request search options

use serde::{Deserialize, Serialize};

use crate::value_objects::TradeStatus;

pub const DEFAULT_RANGE_PERCENT: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub league: Option<String>,
    pub realm: Option<String>,
    pub status: TradeStatus,
    pub offset: usize,
    pub limit: Option<usize>,
    pub range_percent: Option<f64>,
    pub include_modifiers: Option<bool>,
}

impl SearchOptions {
    /// Percentage of an item's own value used as the lower bound of generated filters.
    pub fn effective_range_percent(&self) -> f64 {
        match self.range_percent {
            Some(value) if value.is_finite() && value > 0.0 => value,
            _ => DEFAULT_RANGE_PERCENT,
        }
    }

    pub fn effective_include_modifiers(&self) -> bool {
        self.include_modifiers.unwrap_or(true)
    }

    pub fn resolve_league(&self, fallback: &str) -> String {
        non_blank(self.league.as_deref()).unwrap_or(fallback).to_string()
    }

    pub fn resolve_realm(&self, fallback: &str) -> String {
        non_blank(self.realm.as_deref()).unwrap_or(fallback).to_string()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
