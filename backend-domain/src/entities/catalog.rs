// Reference catalog
// Loaded once at startup and passed to the cleaner, translator and validator

use serde::{Deserialize, Serialize};

use super::item::ItemProperty;
use super::query::{EQUIPMENT_FILTERS, MISC_FILTERS, REQ_FILTERS, TRADE_FILTERS, TYPE_FILTERS};
use crate::value_objects::FilterBound;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub id: String,
    pub text: String,
}

impl CatalogOption {
    fn new(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            text: text.to_string(),
        }
    }
}

/// Maps an item property onto a marketplace filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub property: ItemProperty,
    pub group: String,
    pub filter: String,
    #[serde(default)]
    pub bound: FilterBound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatEntry {
    pub id: String,
    pub text: String,
    #[serde(rename = "type", default)]
    pub stat_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<CatalogOption>,
    pub rarities: Vec<CatalogOption>,
    pub currencies: Vec<CatalogOption>,
    pub filter_groups: Vec<String>,
    pub property_filters: Vec<PropertyFilter>,
    pub stats: Vec<StatEntry>,
}

/// Partial catalog read from disk; absent sections keep the built-in tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogOverrides {
    pub categories: Option<Vec<CatalogOption>>,
    pub rarities: Option<Vec<CatalogOption>>,
    pub currencies: Option<Vec<CatalogOption>>,
    pub filter_groups: Option<Vec<String>>,
    pub property_filters: Option<Vec<PropertyFilter>>,
    pub stats: Option<Vec<StatEntry>>,
}

impl CatalogOverrides {
    pub fn apply_to(self, base: Catalog) -> Catalog {
        Catalog {
            categories: self.categories.unwrap_or(base.categories),
            rarities: self.rarities.unwrap_or(base.rarities),
            currencies: self.currencies.unwrap_or(base.currencies),
            filter_groups: self.filter_groups.unwrap_or(base.filter_groups),
            property_filters: self.property_filters.unwrap_or(base.property_filters),
            stats: self.stats.unwrap_or(base.stats),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    pub fn builtin() -> Self {
        // Texts follow the item class names pasted items carry. Order matters: the first
        // category whose text the class contains wins, so "Crossbow" must precede "Bow"
        // and "Quarterstaves" must precede "Staves".
        let categories = [
            ("weapon.crossbow", "Crossbow"),
            ("weapon.bow", "Bow"),
            ("weapon.warstaff", "Quarterstaves"),
            ("weapon.staff", "Staves"),
            ("weapon.wand", "Wand"),
            ("weapon.sceptre", "Sceptre"),
            ("weapon.spear", "Spear"),
            ("weapon.onemace", "One Hand Mace"),
            ("weapon.twomace", "Two Hand Mace"),
            ("armour.helmet", "Helmet"),
            ("armour.chest", "Body Armour"),
            ("armour.gloves", "Gloves"),
            ("armour.boots", "Boots"),
            ("armour.shield", "Shield"),
            ("armour.buckler", "Buckler"),
            ("armour.focus", "Foci"),
            ("armour.quiver", "Quiver"),
            ("accessory.amulet", "Amulet"),
            ("accessory.ring", "Ring"),
            ("accessory.belt", "Belt"),
            ("flask.life", "Life Flask"),
            ("flask.mana", "Mana Flask"),
            ("jewel", "Jewel"),
            ("azmeri.charm", "Charm"),
            ("gem.activegem", "Skill Gem"),
            ("gem.supportgem", "Support Gem"),
            ("map.waystone", "Waystone"),
        ]
        .into_iter()
        .map(|(id, text)| CatalogOption::new(id, text))
        .collect();

        let rarities = [
            ("normal", "Normal"),
            ("magic", "Magic"),
            ("rare", "Rare"),
            ("unique", "Unique"),
            ("nonunique", "Any Non-Unique"),
        ]
        .into_iter()
        .map(|(id, text)| CatalogOption::new(id, text))
        .collect();

        let currencies = [
            ("exalted", "Exalted Orb"),
            ("divine", "Divine Orb"),
            ("chaos", "Chaos Orb"),
            ("alch", "Orb of Alchemy"),
            ("aug", "Orb of Augmentation"),
            ("transmute", "Orb of Transmutation"),
            ("regal", "Regal Orb"),
            ("vaal", "Vaal Orb"),
            ("annul", "Orb of Annulment"),
            ("mirror", "Mirror of Kalandra"),
        ]
        .into_iter()
        .map(|(id, text)| CatalogOption::new(id, text))
        .collect();

        let filter_groups = [
            TYPE_FILTERS,
            EQUIPMENT_FILTERS,
            REQ_FILTERS,
            MISC_FILTERS,
            TRADE_FILTERS,
        ]
        .into_iter()
        .map(ToString::to_string)
        .collect();

        let property_filters = [
            (ItemProperty::ItemLevel, TYPE_FILTERS, "ilvl", FilterBound::Min),
            (ItemProperty::Quality, TYPE_FILTERS, "quality", FilterBound::Min),
            (ItemProperty::PhysicalDps, EQUIPMENT_FILTERS, "pdps", FilterBound::Min),
            (ItemProperty::ElementalDps, EQUIPMENT_FILTERS, "edps", FilterBound::Min),
            (ItemProperty::TotalDps, EQUIPMENT_FILTERS, "dps", FilterBound::Min),
            (ItemProperty::AttacksPerSecond, EQUIPMENT_FILTERS, "aps", FilterBound::Min),
            (ItemProperty::CriticalChance, EQUIPMENT_FILTERS, "crit", FilterBound::Min),
            (ItemProperty::Armour, EQUIPMENT_FILTERS, "ar", FilterBound::Min),
            (ItemProperty::Evasion, EQUIPMENT_FILTERS, "ev", FilterBound::Min),
            (ItemProperty::EnergyShield, EQUIPMENT_FILTERS, "es", FilterBound::Min),
            (ItemProperty::Block, EQUIPMENT_FILTERS, "block", FilterBound::Min),
            (ItemProperty::Spirit, EQUIPMENT_FILTERS, "spirit", FilterBound::Min),
            (ItemProperty::RuneSockets, EQUIPMENT_FILTERS, "rune_sockets", FilterBound::Min),
            (ItemProperty::RequiredLevel, REQ_FILTERS, "lvl", FilterBound::Max),
            (ItemProperty::RequiredStr, REQ_FILTERS, "str", FilterBound::Max),
            (ItemProperty::RequiredDex, REQ_FILTERS, "dex", FilterBound::Max),
            (ItemProperty::RequiredInt, REQ_FILTERS, "int", FilterBound::Max),
        ]
        .into_iter()
        .map(|(property, group, filter, bound)| PropertyFilter {
            property,
            group: group.to_string(),
            filter: filter.to_string(),
            bound,
        })
        .collect();

        let stats = [
            ("explicit.stat_3299347043", "# to maximum Life"),
            ("explicit.stat_1050105434", "# to maximum Mana"),
            ("explicit.stat_3372524247", "#% to Fire Resistance"),
            ("explicit.stat_4220027924", "#% to Cold Resistance"),
            ("explicit.stat_1671376347", "#% to Lightning Resistance"),
            ("explicit.stat_2923486259", "#% to Chaos Resistance"),
            ("explicit.stat_4080418644", "# to Strength"),
            ("explicit.stat_3261801346", "# to Dexterity"),
            ("explicit.stat_328541901", "# to Intelligence"),
            ("explicit.stat_1509134228", "#% increased Physical Damage"),
            ("explicit.stat_1940865751", "Adds # to # Physical Damage"),
            ("explicit.stat_681332047", "#% increased Attack Speed"),
            ("explicit.stat_2250533757", "#% increased Movement Speed"),
        ]
        .into_iter()
        .map(|(id, text)| StatEntry {
            id: id.to_string(),
            text: text.to_string(),
            stat_type: "explicit".to_string(),
        })
        .collect();

        Self {
            categories,
            rarities,
            currencies,
            filter_groups,
            property_filters,
            stats,
        }
    }

    /// Case-insensitive substring match. A category whose text is contained in the
    /// class beats one whose text merely contains the class; first match wins within each.
    pub fn match_category(&self, item_class: &str) -> Option<&CatalogOption> {
        let class = item_class.trim().to_lowercase();
        if class.is_empty() {
            return None;
        }
        let texts = self
            .categories
            .iter()
            .map(|option| (option, option.text.trim().to_lowercase()))
            .filter(|(_, text)| !text.is_empty())
            .collect::<Vec<_>>();
        texts
            .iter()
            .find(|(_, text)| class.contains(text.as_str()))
            .or_else(|| texts.iter().find(|(_, text)| text.contains(class.as_str())))
            .map(|(option, _)| *option)
    }

    pub fn property_filter(&self, property: ItemProperty) -> Option<&PropertyFilter> {
        self.property_filters
            .iter()
            .find(|entry| entry.property == property)
    }

    /// Looks up a stat by its `#` template, e.g. `# to maximum Life`.
    pub fn find_stat(&self, template: &str) -> Option<&StatEntry> {
        self.stats
            .iter()
            .find(|entry| entry.text.eq_ignore_ascii_case(template))
    }

    pub fn has_rarity(&self, id: &str) -> bool {
        self.rarities.iter().any(|option| option.id == id)
    }

    pub fn has_currency(&self, id: &str) -> bool {
        self.currencies.iter().any(|option| option.id == id)
    }

    pub fn has_filter_group(&self, key: &str) -> bool {
        self.filter_groups.iter().any(|group| group == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_matches_plural_item_class() {
        let catalog = Catalog::builtin();
        let amulet = catalog.match_category("Amulets").expect("amulet category");
        assert_eq!(amulet.id, "accessory.amulet");
        let chest = catalog.match_category("body armours").expect("chest category");
        assert_eq!(chest.id, "armour.chest");
    }

    #[test]
    fn category_first_match_wins() {
        let catalog = Catalog::builtin();
        let crossbow = catalog.match_category("Crossbows").expect("crossbow");
        assert_eq!(crossbow.id, "weapon.crossbow");
        let bow = catalog.match_category("Bows").expect("bow");
        assert_eq!(bow.id, "weapon.bow");
    }

    #[test]
    fn category_matches_irregular_plural_classes() {
        let catalog = Catalog::builtin();
        let ids = ["Quarterstaves", "Staves", "Foci"]
            .map(|class| catalog.match_category(class).map(|option| option.id.as_str()));
        assert_eq!(
            ids,
            [
                Some("weapon.warstaff"),
                Some("weapon.staff"),
                Some("armour.focus"),
            ]
        );
    }

    #[test]
    fn category_matches_when_class_is_contained_in_text() {
        let catalog = Catalog::builtin();
        let mace = catalog.match_category("mace").expect("mace");
        assert_eq!(mace.id, "weapon.onemace");
    }

    #[test]
    fn unknown_item_class_has_no_category() {
        let catalog = Catalog::builtin();
        assert!(catalog.match_category("Relics").is_none());
        assert!(catalog.match_category("   ").is_none());
    }

    #[test]
    fn overrides_keep_missing_sections() {
        let overrides = CatalogOverrides {
            categories: Some(vec![CatalogOption::new("custom.thing", "Thing")]),
            ..CatalogOverrides::default()
        };
        let catalog = overrides.apply_to(Catalog::builtin());
        assert_eq!(catalog.categories.len(), 1);
        assert!(catalog.has_rarity("rare"));
        assert!(catalog.has_currency("divine"));
    }
}
