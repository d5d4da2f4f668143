// Listing status value object

use serde::{Deserialize, Serialize};

/// Which sellers a search should include.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    #[default]
    Online,
    OnlineLeague,
    Securable,
    Any,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Online => "online",
            TradeStatus::OnlineLeague => "onlineleague",
            TradeStatus::Securable => "securable",
            TradeStatus::Any => "any",
        }
    }
}
