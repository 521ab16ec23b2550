//! Grimoire world types.
//!
//! Contains the data shared by every store: identifiers, the closed item
//! schema (types, subtypes, rarities, stat keys), and character sheets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for game-master secret items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretItemId(pub Uuid);

impl SecretItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SecretItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SecretItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an inventory item.
///
/// Equipment slots refer to items by this id, never by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id of the item minted when `character` redeems `secret`.
    ///
    /// Deterministic in both inputs, so a redeemed item can always be traced
    /// back to the secret item it came from.
    pub fn redeemed(secret: SecretItemId, character: CharacterId) -> Self {
        Self(format!("{secret}-{character}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// Item Schema
// ============================================================================

/// Broad item category. Also used as the inventory filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Treasure,
    Gear,
    Jewelry,
}

impl ItemType {
    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Consumable => "consumable",
            ItemType::Treasure => "treasure",
            ItemType::Gear => "gear",
            ItemType::Jewelry => "jewelry",
        }
    }

    pub fn all() -> [ItemType; 6] {
        [
            ItemType::Weapon,
            ItemType::Armor,
            ItemType::Consumable,
            ItemType::Treasure,
            ItemType::Gear,
            ItemType::Jewelry,
        ]
    }

    /// Parse a type name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::all().into_iter().find(|t| t.name() == lower)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Specific kind of item. Decides which equipment slots accept it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSubtype {
    Sword,
    Bow,
    Axe,
    Mace,
    Dagger,
    Staff,
    Helmet,
    Crown,
    Tiara,
    Armor,
    Robe,
    Shirt,
    Gauntlets,
    Gloves,
    Amulet,
    Pendant,
    Boots,
    Shoes,
    Ring,
    /// Anything the schema does not know. Never fits a slot.
    #[serde(other)]
    Other,
}

impl ItemSubtype {
    pub fn name(&self) -> &'static str {
        match self {
            ItemSubtype::Sword => "sword",
            ItemSubtype::Bow => "bow",
            ItemSubtype::Axe => "axe",
            ItemSubtype::Mace => "mace",
            ItemSubtype::Dagger => "dagger",
            ItemSubtype::Staff => "staff",
            ItemSubtype::Helmet => "helmet",
            ItemSubtype::Crown => "crown",
            ItemSubtype::Tiara => "tiara",
            ItemSubtype::Armor => "armor",
            ItemSubtype::Robe => "robe",
            ItemSubtype::Shirt => "shirt",
            ItemSubtype::Gauntlets => "gauntlets",
            ItemSubtype::Gloves => "gloves",
            ItemSubtype::Amulet => "amulet",
            ItemSubtype::Pendant => "pendant",
            ItemSubtype::Boots => "boots",
            ItemSubtype::Shoes => "shoes",
            ItemSubtype::Ring => "ring",
            ItemSubtype::Other => "other",
        }
    }

    pub fn all() -> [ItemSubtype; 20] {
        [
            ItemSubtype::Sword,
            ItemSubtype::Bow,
            ItemSubtype::Axe,
            ItemSubtype::Mace,
            ItemSubtype::Dagger,
            ItemSubtype::Staff,
            ItemSubtype::Helmet,
            ItemSubtype::Crown,
            ItemSubtype::Tiara,
            ItemSubtype::Armor,
            ItemSubtype::Robe,
            ItemSubtype::Shirt,
            ItemSubtype::Gauntlets,
            ItemSubtype::Gloves,
            ItemSubtype::Amulet,
            ItemSubtype::Pendant,
            ItemSubtype::Boots,
            ItemSubtype::Shoes,
            ItemSubtype::Ring,
            ItemSubtype::Other,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::all().into_iter().find(|s| s.name() == lower)
    }
}

impl fmt::Display for ItemSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Item rarity, ordered from common to legendary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn all() -> [Rarity; 5] {
        [
            Rarity::Common,
            Rarity::Uncommon,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.trim().to_lowercase();
        Self::all().into_iter().find(|r| r.name() == lower)
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stats an item can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKey {
    Ac,
    Damage,
    Hp,
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl StatKey {
    pub fn name(&self) -> &'static str {
        match self {
            StatKey::Ac => "ac",
            StatKey::Damage => "damage",
            StatKey::Hp => "hp",
            StatKey::Strength => "strength",
            StatKey::Dexterity => "dexterity",
            StatKey::Constitution => "constitution",
            StatKey::Intelligence => "intelligence",
            StatKey::Wisdom => "wisdom",
            StatKey::Charisma => "charisma",
        }
    }

    pub fn all() -> [StatKey; 9] {
        [
            StatKey::Ac,
            StatKey::Damage,
            StatKey::Hp,
            StatKey::Strength,
            StatKey::Dexterity,
            StatKey::Constitution,
            StatKey::Intelligence,
            StatKey::Wisdom,
            StatKey::Charisma,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stat deltas granted by an item.
///
/// Deserializes from any string-keyed map; keys that are not a [`StatKey`]
/// are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, i32>", into = "BTreeMap<String, i32>")]
pub struct StatBonuses(BTreeMap<StatKey, i32>);

impl StatBonuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: StatKey, delta: i32) -> Self {
        self.0.insert(key, delta);
        self
    }

    pub fn get(&self, key: StatKey) -> i32 {
        self.0.get(&key).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, i32)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, i32>> for StatBonuses {
    fn from(raw: BTreeMap<String, i32>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(name, delta)| StatKey::from_name(&name).map(|key| (key, delta)))
                .collect(),
        )
    }
}

impl From<StatBonuses> for BTreeMap<String, i32> {
    fn from(bonuses: StatBonuses) -> Self {
        bonuses
            .0
            .into_iter()
            .map(|(key, delta)| (key.name().to_string(), delta))
            .collect()
    }
}

/// Embedded item artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemImage {
    /// MIME type (e.g., "image/png")
    pub media_type: String,
    /// Base64 encoded image data
    pub data: String,
}

/// Inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<ItemSubtype>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub value: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatBonuses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ItemImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub equipped: bool,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            item_type,
            subtype: None,
            rarity: Rarity::Common,
            description: None,
            weight: 0.0,
            value: 0.0,
            stats: None,
            image: None,
            quantity: None,
            equipped: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_subtype(mut self, subtype: ItemSubtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn with_stat(mut self, key: StatKey, delta: i32) -> Self {
        self.stats = Some(self.stats.take().unwrap_or_default().with(key, delta));
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Number of units this entry stands for. Missing or zero counts as one.
    pub fn count(&self) -> u32 {
        self.quantity.unwrap_or(1).max(1)
    }

    pub fn total_value(&self) -> f32 {
        self.value * self.count() as f32
    }

    pub fn total_weight(&self) -> f32 {
        self.weight * self.count() as f32
    }
}

// ============================================================================
// Character Sheet
// ============================================================================

/// Lowest playable level.
pub const MIN_LEVEL: u8 = 1;

/// Highest playable level.
pub const MAX_LEVEL: u8 = 20;

/// Current and maximum hit points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub max: i32,
}

impl HitPoints {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Set current hit points, clamped to `0..=max`.
    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.max.max(0));
    }

    /// Percentage of health remaining, 0-100.
    pub fn percentage(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32 * 100.0).clamp(0.0, 100.0)
    }
}

/// The six ability scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// Combat-facing numbers on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    #[serde(rename = "hp")]
    pub hit_points: HitPoints,
    #[serde(rename = "ac")]
    pub armor_class: i32,
    pub proficiency_bonus: i32,
    #[serde(flatten)]
    pub abilities: AbilityScores,
    /// Dice code such as "1d6".
    pub weapon_damage: String,
}

impl CharacterStats {
    /// Starting numbers for a character of the given level.
    pub fn for_level(level: u8) -> Self {
        let level = i32::from(level);
        Self {
            hit_points: HitPoints::new(25 + 5 * level),
            armor_class: 10 + level,
            proficiency_bonus: proficiency_for_level(level),
            abilities: AbilityScores::default(),
            weapon_damage: "1d6".to_string(),
        }
    }
}

/// ceil(level / 4) + 1
pub fn proficiency_for_level(level: i32) -> i32 {
    (level + 3).div_euclid(4) + 1
}

/// Current and maximum of a bounded quantity (carried weight).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capacity {
    pub current: f32,
    pub max: f32,
}

impl Capacity {
    /// Fraction used, 0.0 when the maximum is not positive.
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// Character inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub gold: u32,
    pub weight: Capacity,
    pub equipped_items: u32,
    pub max_equipped: u32,
    pub items: Vec<Item>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            gold: 50,
            weight: Capacity {
                current: 0.0,
                max: 50.0,
            },
            equipped_items: 0,
            max_equipped: 10,
            items: Vec::new(),
        }
    }
}

impl Inventory {
    /// Find an item by id.
    pub fn find_item(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Find an item by id (mutable).
    pub fn find_item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| &i.id == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.find_item(id).is_some()
    }

    /// Newest items are listed first.
    pub fn add_item(&mut self, item: Item) {
        self.items.insert(0, item);
    }

    pub fn remove_item(&mut self, id: &ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|i| &i.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Recount `equipped_items` from the per-item flags.
    pub fn sync_equipped_count(&mut self) {
        self.equipped_items = self.items.iter().filter(|i| i.equipped).count() as u32;
    }
}

/// Quest titles, by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quests {
    pub active: Vec<String>,
    pub completed: Vec<String>,
}

/// Exploration counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exploration {
    pub locations_discovered: u32,
    pub dungeons_explored: u32,
    pub cities_visited: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub current: u32,
    pub total: u32,
}

/// A player character sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub race: String,
    pub class: String,
    pub level: u8,
    pub stats: CharacterStats,
    pub inventory: Inventory,
    pub quests: Quests,
    pub exploration: Exploration,
    #[serde(rename = "xp")]
    pub experience: Experience,
    pub sessions_played: u32,
}

impl Character {
    /// Build a fresh sheet with starting numbers derived from the level.
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        class: impl Into<String>,
        level: u8,
    ) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            race: race.into(),
            class: class.into(),
            level,
            stats: CharacterStats::for_level(level),
            inventory: Inventory::default(),
            quests: Quests::default(),
            exploration: Exploration::default(),
            experience: Experience {
                current: 0,
                total: u32::from(level) * 1000,
            },
            sessions_played: 0,
        }
    }
}

/// Create a sample character for testing.
pub fn create_sample_character(name: &str) -> Character {
    Character::new(name, "Elf", "Ranger", 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_stats_from_level() {
        let c = Character::new("Aria", "Elf", "Ranger", 5);
        assert_eq!(c.stats.hit_points.max, 50);
        assert_eq!(c.stats.hit_points.current, 50);
        assert_eq!(c.stats.armor_class, 15);
        assert_eq!(c.stats.proficiency_bonus, 3);
        assert_eq!(c.experience.total, 5000);
        assert_eq!(c.inventory.gold, 50);
        assert_eq!(c.stats.weapon_damage, "1d6");
    }

    #[test]
    fn test_proficiency_rounds_up() {
        assert_eq!(proficiency_for_level(1), 2);
        assert_eq!(proficiency_for_level(4), 2);
        assert_eq!(proficiency_for_level(5), 3);
        assert_eq!(proficiency_for_level(8), 3);
        assert_eq!(proficiency_for_level(9), 4);
        assert_eq!(proficiency_for_level(20), 6);
    }

    #[test]
    fn test_hit_points_clamp() {
        let mut hp = HitPoints::new(30);
        hp.set(45);
        assert_eq!(hp.current, 30);
        hp.set(-4);
        assert_eq!(hp.current, 0);
        hp.set(12);
        assert_eq!(hp.current, 12);
    }

    #[test]
    fn test_unknown_stat_keys_are_dropped() {
        let bonuses: StatBonuses =
            serde_json::from_str(r#"{"ac": 2, "luck": 7, "dexterity": 1}"#).unwrap();
        assert_eq!(bonuses.get(StatKey::Ac), 2);
        assert_eq!(bonuses.get(StatKey::Dexterity), 1);
        assert_eq!(bonuses.iter().count(), 2);
    }

    #[test]
    fn test_unknown_subtype_deserializes_as_other() {
        let item: Item = serde_json::from_str(
            r#"{"id": "7", "name": "Odd Cloak", "type": "gear", "subtype": "cloak"}"#,
        )
        .unwrap();
        assert_eq!(item.subtype, Some(ItemSubtype::Other));
        assert_eq!(item.rarity, Rarity::Common);
        assert!(!item.equipped);
    }

    #[test]
    fn test_item_count_treats_zero_as_one() {
        let potion = Item::new("Potion", ItemType::Consumable)
            .with_value(50.0)
            .with_quantity(3);
        assert_eq!(potion.total_value(), 150.0);

        let rope = Item::new("Rope", ItemType::Gear).with_value(2.0).with_quantity(0);
        assert_eq!(rope.total_value(), 2.0);
    }

    #[test]
    fn test_redeemed_item_id_is_deterministic() {
        let secret = SecretItemId::new();
        let character = CharacterId::new();
        assert_eq!(
            ItemId::redeemed(secret, character),
            ItemId::redeemed(secret, character)
        );
        assert_eq!(
            ItemId::redeemed(secret, character).as_str(),
            format!("{}-{}", secret.0, character.0)
        );
    }

    #[test]
    fn test_inventory_add_is_newest_first() {
        let mut inv = Inventory::default();
        inv.add_item(Item::new("First", ItemType::Gear).with_id("a"));
        inv.add_item(Item::new("Second", ItemType::Gear).with_id("b"));
        assert_eq!(inv.items[0].name, "Second");
        assert!(inv.remove_item(&ItemId::from("a")).is_some());
        assert!(inv.remove_item(&ItemId::from("a")).is_none());
    }
}
