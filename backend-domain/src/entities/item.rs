// Item entity
// Structured decomposition of a pasted item text block

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemProperty {
    Quality,
    PhysicalDps,
    ElementalDps,
    ChaosDps,
    TotalDps,
    AttacksPerSecond,
    CriticalChance,
    Armour,
    Evasion,
    EnergyShield,
    Block,
    Spirit,
    ItemLevel,
    RequiredLevel,
    RequiredStr,
    RequiredDex,
    RequiredInt,
    RuneSockets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    pub item_class: String,
    pub rarity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,
    /// Catalog category id, `None` when the item class matched nothing.
    pub category: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<ItemProperty, f64>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub corrupted: bool,
    #[serde(default = "default_identified")]
    pub identified: bool,
}

fn default_identified() -> bool {
    true
}

impl ParsedItem {
    pub fn property(&self, property: ItemProperty) -> Option<f64> {
        self.properties.get(&property).copied()
    }

    pub fn is_unique(&self) -> bool {
        self.rarity == "unique"
    }
}
