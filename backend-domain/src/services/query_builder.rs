use crate::entities::{
    Catalog, FilterValue, ParsedItem, ParsedQuery, RangeValue, SearchOptions, StatFilter,
    StatGroup, DEFAULT_STAT_GROUP, MISC_FILTERS, TYPE_FILTERS,
};
use crate::utils::{extract_numbers, round_down_2, to_stat_template};
use crate::value_objects::FilterBound;

/// Builds the initial marketplace query for a parsed item.
///
/// Only properties listed in the catalog's property table produce filters; anything
/// else the item carries is ignored.
pub fn get_poe_query(item: &ParsedItem, options: &SearchOptions, catalog: &Catalog) -> ParsedQuery {
    let mut query = ParsedQuery::default();
    let percent = options.effective_range_percent();

    if let Some(category) = &item.category {
        query
            .group_mut(TYPE_FILTERS)
            .insert("category", FilterValue::option(category.clone()));
    }
    if catalog.has_rarity(&item.rarity) {
        query
            .group_mut(TYPE_FILTERS)
            .insert("rarity", FilterValue::option(item.rarity.clone()));
    }
    if item.is_unique() {
        query.name = item.name.clone();
        query.base_type = item.base_type.clone();
    }

    for (property, value) in &item.properties {
        let Some(entry) = catalog.property_filter(*property) else {
            continue;
        };
        let filter = match entry.bound {
            FilterBound::Min => FilterValue::min(scale(*value, percent)),
            FilterBound::Max => FilterValue::max(*value),
        };
        query
            .group_mut(&entry.group)
            .insert(entry.filter.clone(), filter);
    }

    if item.corrupted {
        query
            .group_mut(MISC_FILTERS)
            .insert("corrupted", FilterValue::option("true"));
    }

    let disabled = !options.effective_include_modifiers();
    let mut stats = StatGroup::new(DEFAULT_STAT_GROUP);
    for line in &item.modifiers {
        let Some(stat) = catalog.find_stat(&to_stat_template(line)) else {
            continue;
        };
        let numbers = extract_numbers(line);
        let value = if numbers.is_empty() {
            RangeValue::default()
        } else {
            let average = numbers.iter().sum::<f64>() / numbers.len() as f64;
            RangeValue {
                min: Some(scale(average, percent)),
                max: None,
            }
        };
        stats.push_unique(StatFilter {
            id: stat.id.clone(),
            text: stat.text.clone(),
            value,
            disabled,
        });
    }
    if !stats.filters.is_empty() {
        query.stats.push(stats);
    }

    query
}

fn scale(value: f64, percent: f64) -> f64 {
    round_down_2(value * percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ItemProperty, EQUIPMENT_FILTERS, REQ_FILTERS};
    use crate::services::input_to_item;

    const RARE_HELMET: &str = "Item Class: Helmets
Rarity: Rare
Storm Crown
Iron Cap
--------
Armour: 120
Spirit: 30
--------
Requires: Level 33, 52 Str
--------
Item Level: 68
--------
+45 to maximum Life
+30% to Cold Resistance
Grants 1 additional Unknown Thing
";

    fn build(raw: &str, options: &SearchOptions) -> ParsedQuery {
        let catalog = Catalog::builtin();
        let item = input_to_item(raw, &catalog).expect("parse item");
        get_poe_query(&item, options, &catalog)
    }

    #[test]
    fn type_filters_carry_category_and_rarity() {
        let query = build(RARE_HELMET, &SearchOptions::default());
        assert_eq!(
            query.filter(TYPE_FILTERS, "category"),
            Some(&FilterValue::option("armour.helmet"))
        );
        assert_eq!(
            query.filter(TYPE_FILTERS, "rarity"),
            Some(&FilterValue::option("rare"))
        );
        assert_eq!(query.name, None);
        assert_eq!(query.base_type, None);
    }

    #[test]
    fn properties_map_to_filters_with_bounds() {
        let query = build(RARE_HELMET, &SearchOptions::default());
        assert_eq!(query.filter(EQUIPMENT_FILTERS, "ar"), Some(&FilterValue::min(120.0)));
        assert_eq!(query.filter(EQUIPMENT_FILTERS, "spirit"), Some(&FilterValue::min(30.0)));
        assert_eq!(query.filter(TYPE_FILTERS, "ilvl"), Some(&FilterValue::min(68.0)));
        assert_eq!(query.filter(REQ_FILTERS, "lvl"), Some(&FilterValue::max(33.0)));
        assert_eq!(query.filter(REQ_FILTERS, "str"), Some(&FilterValue::max(52.0)));
    }

    #[test]
    fn range_percent_scales_lower_bounds_only() {
        let options = SearchOptions {
            range_percent: Some(90.0),
            ..SearchOptions::default()
        };
        let query = build(RARE_HELMET, &options);
        assert_eq!(query.filter(EQUIPMENT_FILTERS, "ar"), Some(&FilterValue::min(108.0)));
        assert_eq!(query.filter(REQ_FILTERS, "lvl"), Some(&FilterValue::max(33.0)));
        let life = &query.stats[0].filters[0];
        assert_eq!(life.value.min, Some(40.5));
    }

    #[test]
    fn properties_missing_from_table_are_ignored() {
        let mut catalog = Catalog::builtin();
        catalog
            .property_filters
            .retain(|entry| entry.property != ItemProperty::Spirit);
        let item = input_to_item(RARE_HELMET, &catalog).expect("parse item");
        assert_eq!(item.property(ItemProperty::Spirit), Some(30.0));
        let query = get_poe_query(&item, &SearchOptions::default(), &catalog);
        assert!(query.filter(EQUIPMENT_FILTERS, "spirit").is_none());
        assert!(query.filter(EQUIPMENT_FILTERS, "ar").is_some());
    }

    #[test]
    fn known_modifiers_become_stat_filters() {
        let query = build(RARE_HELMET, &SearchOptions::default());
        assert_eq!(query.stats.len(), 1);
        let group = &query.stats[0];
        assert_eq!(group.group_type, "and");
        let ids = group.filters.iter().map(|f| f.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["explicit.stat_3299347043", "explicit.stat_4220027924"]);
        assert_eq!(group.filters[0].value.min, Some(45.0));
        assert_eq!(group.filters[1].value.min, Some(30.0));
        assert!(group.filters.iter().all(|f| !f.disabled));
    }

    #[test]
    fn modifiers_can_be_added_disabled() {
        let options = SearchOptions {
            include_modifiers: Some(false),
            ..SearchOptions::default()
        };
        let query = build(RARE_HELMET, &options);
        assert!(query.stats[0].filters.iter().all(|f| f.disabled));
    }

    #[test]
    fn unique_items_search_by_name_and_type() {
        let raw = "Item Class: Rings
Rarity: Unique
Ming's Heart
Amethyst Ring
--------
Item Level: 80
--------
Corrupted";
        let query = build(raw, &SearchOptions::default());
        assert_eq!(query.name.as_deref(), Some("Ming's Heart"));
        assert_eq!(query.base_type.as_deref(), Some("Amethyst Ring"));
        assert_eq!(
            query.filter(TYPE_FILTERS, "rarity"),
            Some(&FilterValue::option("unique"))
        );
        assert_eq!(
            query.filter(MISC_FILTERS, "corrupted"),
            Some(&FilterValue::option("true"))
        );
        assert!(query.stats.is_empty());
    }

    #[test]
    fn item_without_category_still_builds() {
        let raw = "Item Class: Relics\nRarity: Normal\nUrn Relic";
        let query = build(raw, &SearchOptions::default());
        assert!(query.filter(TYPE_FILTERS, "category").is_none());
        assert_eq!(
            query.filter(TYPE_FILTERS, "rarity"),
            Some(&FilterValue::option("normal"))
        );
    }
}
