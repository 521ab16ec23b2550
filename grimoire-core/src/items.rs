//! Starter item catalog.
//!
//! Contains the templates a new character can be outfitted with, one per
//! item category, so every slot and filter has something to work on.

use crate::world::{Item, ItemId, ItemSubtype, ItemType, Rarity, StatKey};

/// Get a catalog template by name (case-insensitive).
///
/// The returned item carries a fresh id.
pub fn find_template(name: &str) -> Option<Item> {
    let name_lower = name.to_lowercase();
    STARTER_KIT
        .iter()
        .find(|i| i.name.to_lowercase() == name_lower)
        .cloned()
        .map(|i| i.with_id(ItemId::new()))
}

/// A full starter kit with fresh item ids.
pub fn starter_kit() -> Vec<Item> {
    STARTER_KIT
        .iter()
        .cloned()
        .map(|i| i.with_id(ItemId::new()))
        .collect()
}

lazy_static::lazy_static! {
    /// Templates handed to every new adventurer.
    pub static ref STARTER_KIT: Vec<Item> = vec![
        Item::new("Elven Longbow +1", ItemType::Weapon)
            .with_subtype(ItemSubtype::Bow)
            .with_rarity(Rarity::Uncommon)
            .with_description("A finely crafted longbow etched with elven script.")
            .with_weight(2.0)
            .with_value(150.0)
            .with_stat(StatKey::Damage, 2)
            .with_stat(StatKey::Dexterity, 1),
        Item::new("Studded Leather +1", ItemType::Armor)
            .with_subtype(ItemSubtype::Armor)
            .with_rarity(Rarity::Uncommon)
            .with_description("Leather armor reinforced with enchanted rivets.")
            .with_weight(13.0)
            .with_value(200.0)
            .with_stat(StatKey::Ac, 3)
            .with_stat(StatKey::Dexterity, 1),
        Item::new("Shortsword", ItemType::Weapon)
            .with_subtype(ItemSubtype::Sword)
            .with_description("A plain, serviceable short blade.")
            .with_weight(2.0)
            .with_value(10.0)
            .with_stat(StatKey::Damage, 1),
        Item::new("War Helm", ItemType::Armor)
            .with_subtype(ItemSubtype::Helmet)
            .with_description("A forged steel helmet.")
            .with_weight(3.0)
            .with_value(25.0)
            .with_stat(StatKey::Ac, 1),
        Item::new("Gauntlets of Might", ItemType::Armor)
            .with_subtype(ItemSubtype::Gauntlets)
            .with_rarity(Rarity::Uncommon)
            .with_description("Enchanted gauntlets that lend their wearer strength.")
            .with_weight(1.0)
            .with_value(150.0)
            .with_stat(StatKey::Strength, 2),
        Item::new("Amulet of Warding", ItemType::Jewelry)
            .with_subtype(ItemSubtype::Amulet)
            .with_rarity(Rarity::Rare)
            .with_description("Turns aside hostile spells.")
            .with_weight(0.1)
            .with_value(300.0)
            .with_stat(StatKey::Ac, 1)
            .with_stat(StatKey::Wisdom, 1),
        Item::new("Ring of Agility", ItemType::Jewelry)
            .with_subtype(ItemSubtype::Ring)
            .with_rarity(Rarity::Uncommon)
            .with_description("A slim band that quickens the hands.")
            .with_weight(0.1)
            .with_value(200.0)
            .with_stat(StatKey::Dexterity, 2),
        Item::new("Explorer's Boots", ItemType::Armor)
            .with_subtype(ItemSubtype::Boots)
            .with_description("Sturdy boots for the long road.")
            .with_weight(2.0)
            .with_value(50.0)
            .with_stat(StatKey::Constitution, 1),
        Item::new("Potion of Healing", ItemType::Consumable)
            .with_description("Restores 2d4+2 hit points.")
            .with_weight(0.5)
            .with_value(50.0)
            .with_quantity(3),
        Item::new("Nightsight Gem", ItemType::Treasure)
            .with_rarity(Rarity::Rare)
            .with_description("A gem that glows with a silver light.")
            .with_weight(0.1)
            .with_value(500.0),
        Item::new("Silk Rope", ItemType::Gear)
            .with_description("Fifty feet of silk rope.")
            .with_weight(5.0)
            .with_value(2.0),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_template() {
        let bow = find_template("elven longbow +1").unwrap();
        assert_eq!(bow.subtype, Some(ItemSubtype::Bow));
        assert_eq!(bow.stats.as_ref().unwrap().get(StatKey::Damage), 2);
        assert!(find_template("Vorpal Spoon").is_none());
    }

    #[test]
    fn test_starter_kit_ids_are_fresh() {
        let a = starter_kit();
        let b = starter_kit();
        assert_eq!(a.len(), STARTER_KIT.len());
        assert!(a.iter().zip(&b).all(|(x, y)| x.id != y.id));
        assert!(a.iter().all(|i| !i.equipped));
    }

    #[test]
    fn test_starter_kit_covers_every_type() {
        let kit = starter_kit();
        for item_type in ItemType::all() {
            assert!(kit.iter().any(|i| i.item_type == item_type), "{item_type}");
        }
    }
}
