//! Derived inventory figures for one character.
//!
//! [`InventoryView`] borrows a character sheet and its slot map and computes
//! everything on demand. Nothing is cached, so the totals can never drift
//! from the underlying state.

use crate::equipment::{EquipmentSlot, SlotMap};
use crate::world::{Capacity, Character, Item, ItemType, StatKey};
use std::collections::BTreeMap;
use std::fmt;

/// Inventory filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Type(ItemType),
}

impl Category {
    /// `"all"` or an item type name.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case("all") {
            Some(Category::All)
        } else {
            ItemType::from_name(name).map(Category::Type)
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Category::All => true,
            Category::Type(t) => item.item_type == *t,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::All => write!(f, "all"),
            Category::Type(t) => write!(f, "{t}"),
        }
    }
}

/// Summed stat deltas of everything equipped. Every stat key is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquippedBonuses(BTreeMap<StatKey, i32>);

impl EquippedBonuses {
    fn zero() -> Self {
        Self(StatKey::all().into_iter().map(|k| (k, 0)).collect())
    }

    pub fn get(&self, key: StatKey) -> i32 {
        self.0.get(&key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, i32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_zero(&self) -> bool {
        self.0.values().all(|v| *v == 0)
    }
}

/// Read-only view over a character's items and equipment.
#[derive(Debug, Clone, Copy)]
pub struct InventoryView<'a> {
    character: &'a Character,
    slots: &'a SlotMap,
}

impl<'a> InventoryView<'a> {
    pub fn new(character: &'a Character, slots: &'a SlotMap) -> Self {
        Self { character, slots }
    }

    pub fn character(&self) -> &'a Character {
        self.character
    }

    pub fn items(&self) -> &'a [Item] {
        let character: &'a Character = self.character;
        &character.inventory.items
    }

    /// Items in the given category, in inventory order.
    pub fn filter(&self, category: Category) -> Vec<&'a Item> {
        self.items()
            .iter()
            .filter(|i| category.matches(i))
            .collect()
    }

    /// Equipped items, resolved through the inventory, in slot order.
    ///
    /// A slot whose item is no longer in the inventory is skipped.
    pub fn equipped(&self) -> Vec<(EquipmentSlot, &'a Item)> {
        let character: &'a Character = self.character;
        let inventory = &character.inventory;
        self.slots
            .iter()
            .filter_map(|(slot, id)| inventory.find_item(id).map(|item| (slot, item)))
            .collect()
    }

    pub fn equipped_count(&self) -> usize {
        self.equipped().len()
    }

    /// Sum of stat bonuses over every equipped item.
    pub fn equipped_bonuses(&self) -> EquippedBonuses {
        let mut totals = EquippedBonuses::zero();
        for (_, item) in self.equipped() {
            if let Some(stats) = &item.stats {
                for (key, delta) in stats.iter() {
                    *totals.0.entry(key).or_insert(0) += delta;
                }
            }
        }
        totals
    }

    /// Σ value × max(quantity, 1).
    pub fn total_value(&self) -> f32 {
        self.items().iter().map(Item::total_value).sum()
    }

    /// Σ weight × max(quantity, 1).
    pub fn carried_weight(&self) -> f32 {
        self.items().iter().map(Item::total_weight).sum()
    }

    /// Carried weight as recorded on the character sheet.
    pub fn capacity(&self) -> Capacity {
        self.character.inventory.weight
    }

    pub fn gold(&self) -> u32 {
        self.character.inventory.gold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentStore;
    use crate::world::{create_sample_character, ItemId, ItemSubtype};

    fn outfitted() -> (Character, EquipmentStore) {
        let mut character = create_sample_character("Aria");
        character.inventory.items = vec![
            Item::new("Helm", ItemType::Armor)
                .with_id("helm")
                .with_subtype(ItemSubtype::Helmet)
                .with_value(25.0)
                .with_weight(3.0)
                .with_stat(StatKey::Ac, 1),
            Item::new("Ring", ItemType::Jewelry)
                .with_id("ring")
                .with_subtype(ItemSubtype::Ring)
                .with_value(200.0)
                .with_stat(StatKey::Dexterity, 2)
                .with_stat(StatKey::Ac, 1),
            Item::new("Potion", ItemType::Consumable)
                .with_id("potion")
                .with_value(50.0)
                .with_weight(0.5)
                .with_quantity(3),
        ];
        (character, EquipmentStore::new())
    }

    #[test]
    fn test_bonuses_from_slots() {
        let (character, mut store) = outfitted();
        let helm = character.inventory.items[0].clone();
        let ring = character.inventory.items[1].clone();
        store.equip_item(character.id, EquipmentSlot::Head, &helm);
        store.equip_item(character.id, EquipmentSlot::Ring1, &ring);

        let slots = store.get_equipment(character.id);
        let view = InventoryView::new(&character, &slots);
        let bonuses = view.equipped_bonuses();
        assert_eq!(bonuses.get(StatKey::Ac), 2);
        assert_eq!(bonuses.get(StatKey::Dexterity), 2);
        assert_eq!(bonuses.get(StatKey::Strength), 0);
        assert_eq!(bonuses.iter().count(), StatKey::all().len());
    }

    #[test]
    fn test_bonuses_zero_after_unequip_all() {
        let (character, mut store) = outfitted();
        let helm = character.inventory.items[0].clone();
        store.equip_item(character.id, EquipmentSlot::Head, &helm);
        store.unequip_item(character.id, EquipmentSlot::Head);

        let slots = store.get_equipment(character.id);
        assert!(InventoryView::new(&character, &slots)
            .equipped_bonuses()
            .is_zero());
    }

    #[test]
    fn test_dangling_slot_is_ignored() {
        let (mut character, mut store) = outfitted();
        let helm = character.inventory.items[0].clone();
        store.equip_item(character.id, EquipmentSlot::Head, &helm);
        character.inventory.remove_item(&ItemId::from("helm"));

        let slots = store.get_equipment(character.id);
        let view = InventoryView::new(&character, &slots);
        assert_eq!(view.equipped_count(), 0);
        assert!(view.equipped_bonuses().is_zero());
    }

    #[test]
    fn test_totals() {
        let (character, _) = outfitted();
        let slots = SlotMap::new();
        let view = InventoryView::new(&character, &slots);
        assert_eq!(view.total_value(), 25.0 + 200.0 + 150.0);
        assert_eq!(view.carried_weight(), 3.0 + 0.0 + 1.5);
    }

    #[test]
    fn test_category_filter() {
        let (character, _) = outfitted();
        let slots = SlotMap::new();
        let view = InventoryView::new(&character, &slots);
        assert_eq!(view.filter(Category::All).len(), 3);
        let jewelry = view.filter(Category::Type(ItemType::Jewelry));
        assert_eq!(jewelry.len(), 1);
        assert_eq!(jewelry[0].name, "Ring");
        assert!(view.filter(Category::Type(ItemType::Weapon)).is_empty());

        assert_eq!(Category::from_name("ALL"), Some(Category::All));
        assert_eq!(
            Category::from_name("gear"),
            Some(Category::Type(ItemType::Gear))
        );
        assert_eq!(Category::from_name("spells"), None);
    }
}
