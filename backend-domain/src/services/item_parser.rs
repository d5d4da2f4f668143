//! Parsing of item descriptions copied from the game client.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::entities::{Catalog, ItemProperty, ParsedItem};
use crate::utils::{extract_numbers, first_number, round_down_2};

pub const ITEM_SEPARATOR: &str = "--------";

const ITEM_CLASS_PREFIX: &str = "Item Class:";
const RARITY_PREFIX: &str = "Rarity:";
const REQUIREMENTS_HEADER: &str = "Requirements:";

static DAMAGE_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)").expect("damage range pattern"));
static MOD_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\((?:implicit|rune|enchant|crafted|fractured|desecrated|augmented)\)\s*$")
        .expect("mod suffix pattern")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemParseError {
    #[error("Invalid item header format")]
    InvalidHeader,
}

/// Splits a pasted item into sections and extracts header, properties and modifiers.
///
/// The `Item Class:` and `Rarity:` lines are mandatory; without them nothing is returned.
pub fn input_to_item(raw: &str, catalog: &Catalog) -> Result<ParsedItem, ItemParseError> {
    let sections = split_sections(raw);
    let header = sections.first().ok_or(ItemParseError::InvalidHeader)?;

    let item_class = header_value(header, ITEM_CLASS_PREFIX).ok_or(ItemParseError::InvalidHeader)?;
    let rarity = header_value(header, RARITY_PREFIX)
        .ok_or(ItemParseError::InvalidHeader)?
        .to_lowercase();

    let names = header
        .iter()
        .filter(|line| !line.starts_with(ITEM_CLASS_PREFIX) && !line.starts_with(RARITY_PREFIX))
        .map(|line| line.to_string())
        .collect::<Vec<_>>();
    let (name, base_type) = match names.as_slice() {
        [] => (None, None),
        [base] => (None, Some(base.clone())),
        [name, base, ..] => (Some(name.clone()), Some(base.clone())),
    };

    let mut scan = PropertyScan::default();
    let mut modifiers = Vec::new();
    let mut corrupted = false;
    let mut identified = true;
    for section in sections.iter().skip(1) {
        let mut in_requirements = false;
        let mut section_has_properties = false;
        let mut section_lines = Vec::new();
        for line in section {
            match *line {
                "Corrupted" => corrupted = true,
                "Unidentified" => identified = false,
                REQUIREMENTS_HEADER => {
                    in_requirements = true;
                    section_has_properties = true;
                }
                _ => {
                    if scan.apply(line, in_requirements) {
                        section_has_properties = true;
                    } else {
                        section_lines.push(*line);
                    }
                }
            }
        }
        if !section_has_properties {
            modifiers.extend(section_lines.into_iter().filter_map(clean_modifier));
        }
    }

    let category = catalog
        .match_category(item_class)
        .map(|option| option.id.clone());

    Ok(ParsedItem {
        item_class: item_class.to_string(),
        rarity,
        name,
        base_type,
        category,
        properties: scan.finish(),
        modifiers,
        corrupted,
        identified,
    })
}

fn split_sections(raw: &str) -> Vec<Vec<&str>> {
    let mut sections = vec![Vec::new()];
    for line in raw.lines().map(str::trim) {
        if line == ITEM_SEPARATOR {
            sections.push(Vec::new());
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.push(line);
        }
    }
    sections.retain(|section| !section.is_empty());
    sections
}

fn header_value<'a>(header: &[&'a str], prefix: &str) -> Option<&'a str> {
    header
        .iter()
        .copied()
        .find_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn clean_modifier(line: &str) -> Option<String> {
    if line.starts_with("Note:") || line.starts_with('{') {
        return None;
    }
    let cleaned = MOD_SUFFIX_RE.replace(line, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

#[derive(Default)]
struct PropertyScan {
    properties: BTreeMap<ItemProperty, f64>,
    physical_avg: f64,
    elemental_avg: f64,
    chaos_avg: f64,
}

impl PropertyScan {
    /// Records `line` if it is a known property; returns whether it was recognized.
    fn apply(&mut self, line: &str, in_requirements: bool) -> bool {
        if let Some(rest) = line.strip_prefix("Requires ").or_else(|| line.strip_prefix("Requires:")) {
            self.apply_requires(rest);
            return true;
        }
        let Some((key, value)) = line.split_once(':') else {
            return false;
        };
        let key = key.trim();
        let value = value.trim();

        if in_requirements {
            let property = match key {
                "Level" => Some(ItemProperty::RequiredLevel),
                "Str" | "Strength" => Some(ItemProperty::RequiredStr),
                "Dex" | "Dexterity" => Some(ItemProperty::RequiredDex),
                "Int" | "Intelligence" => Some(ItemProperty::RequiredInt),
                _ => None,
            };
            if let Some(property) = property {
                return self.set_first_number(property, value);
            }
        }

        match key {
            "Physical Damage" => {
                self.physical_avg += average_of_ranges(value);
                true
            }
            "Elemental Damage" | "Fire Damage" | "Cold Damage" | "Lightning Damage" => {
                self.elemental_avg += average_of_ranges(value);
                true
            }
            "Chaos Damage" => {
                self.chaos_avg += average_of_ranges(value);
                true
            }
            "Quality" => self.set_first_number(ItemProperty::Quality, value),
            "Critical Hit Chance" | "Critical Strike Chance" => {
                self.set_first_number(ItemProperty::CriticalChance, value)
            }
            "Attacks per Second" => self.set_first_number(ItemProperty::AttacksPerSecond, value),
            "Armour" => self.set_first_number(ItemProperty::Armour, value),
            "Evasion Rating" => self.set_first_number(ItemProperty::Evasion, value),
            "Energy Shield" => self.set_first_number(ItemProperty::EnergyShield, value),
            "Block chance" | "Chance to Block" => self.set_first_number(ItemProperty::Block, value),
            "Spirit" => self.set_first_number(ItemProperty::Spirit, value),
            "Item Level" => self.set_first_number(ItemProperty::ItemLevel, value),
            "Sockets" => {
                let count = value.split_whitespace().filter(|token| *token == "S").count();
                self.properties
                    .insert(ItemProperty::RuneSockets, count as f64);
                true
            }
            _ => false,
        }
    }

    /// `Requires: Level 45, 38 Str, 38 Int`
    fn apply_requires(&mut self, rest: &str) {
        for part in rest.split(',') {
            let part = part.trim();
            let Some(number) = first_number(part) else {
                continue;
            };
            let property = if part.starts_with("Level") {
                ItemProperty::RequiredLevel
            } else if part.ends_with("Str") {
                ItemProperty::RequiredStr
            } else if part.ends_with("Dex") {
                ItemProperty::RequiredDex
            } else if part.ends_with("Int") {
                ItemProperty::RequiredInt
            } else {
                continue;
            };
            self.properties.insert(property, number);
        }
    }

    fn set_first_number(&mut self, property: ItemProperty, value: &str) -> bool {
        match first_number(value) {
            Some(number) => {
                self.properties.insert(property, number);
                true
            }
            None => false,
        }
    }

    fn finish(mut self) -> BTreeMap<ItemProperty, f64> {
        if let Some(aps) = self.properties.get(&ItemProperty::AttacksPerSecond).copied() {
            let physical = self.physical_avg * aps;
            let elemental = self.elemental_avg * aps;
            let chaos = self.chaos_avg * aps;
            let total = physical + elemental + chaos;
            for (property, dps) in [
                (ItemProperty::PhysicalDps, physical),
                (ItemProperty::ElementalDps, elemental),
                (ItemProperty::ChaosDps, chaos),
                (ItemProperty::TotalDps, total),
            ] {
                if dps > 0.0 {
                    self.properties.insert(property, round_down_2(dps));
                }
            }
        }
        self.properties
    }
}

/// Sum of the averages of every `a-b` range in `value`.
fn average_of_ranges(value: &str) -> f64 {
    let ranges = DAMAGE_RANGE_RE
        .captures_iter(value)
        .filter_map(|caps| {
            let low = caps.get(1)?.as_str().parse::<f64>().ok()?;
            let high = caps.get(2)?.as_str().parse::<f64>().ok()?;
            Some((low + high) / 2.0)
        })
        .collect::<Vec<_>>();
    if ranges.is_empty() {
        return extract_numbers(value).into_iter().next().unwrap_or(0.0);
    }
    ranges.into_iter().sum()
}
