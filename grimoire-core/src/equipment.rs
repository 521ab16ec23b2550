//! Equipment slots and the rules for filling them.
//!
//! The [`EquipmentStore`] keeps, per character, which item id occupies each
//! slot. It never validates anything; callers consult [`compatible_slots`]
//! before equipping.

use crate::world::{CharacterId, Item, ItemId, ItemSubtype, ItemType};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// Slots
// ============================================================================

/// A named equipment location on a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EquipmentSlot {
    Head,
    Neck,
    Chest,
    Arms,
    MainHand,
    OffHand,
    #[serde(rename = "ring1")]
    Ring1,
    #[serde(rename = "ring2")]
    Ring2,
    Legs,
}

impl EquipmentSlot {
    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Head => "head",
            EquipmentSlot::Neck => "neck",
            EquipmentSlot::Chest => "chest",
            EquipmentSlot::Arms => "arms",
            EquipmentSlot::MainHand => "main-hand",
            EquipmentSlot::OffHand => "off-hand",
            EquipmentSlot::Ring1 => "ring-1",
            EquipmentSlot::Ring2 => "ring-2",
            EquipmentSlot::Legs => "legs",
        }
    }

    pub fn all() -> [EquipmentSlot; 9] {
        [
            EquipmentSlot::Head,
            EquipmentSlot::Neck,
            EquipmentSlot::Chest,
            EquipmentSlot::Arms,
            EquipmentSlot::MainHand,
            EquipmentSlot::OffHand,
            EquipmentSlot::Ring1,
            EquipmentSlot::Ring2,
            EquipmentSlot::Legs,
        ]
    }

    /// Parse a slot name. Accepts `main-hand`, `mainhand` and `mainHand`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        Self::all()
            .into_iter()
            .find(|slot| slot.name().replace('-', "") == normalized)
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Slot contents for one character. Holds item ids, not items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMap(BTreeMap<EquipmentSlot, ItemId>);

impl SlotMap {
    pub const EMPTY: SlotMap = SlotMap(BTreeMap::new());

    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&ItemId> {
        self.0.get(&slot)
    }

    pub fn is_empty_slot(&self, slot: EquipmentSlot) -> bool {
        !self.0.contains_key(&slot)
    }

    /// The slot holding `item`, if any.
    pub fn slot_of(&self, item: &ItemId) -> Option<EquipmentSlot> {
        self.0
            .iter()
            .find(|(_, id)| *id == item)
            .map(|(slot, _)| *slot)
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &ItemId)> {
        self.0.iter().map(|(slot, id)| (*slot, id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Compatibility Rules
// ============================================================================

/// Families of slots an item can go into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotGroup {
    Head,
    Chest,
    Arms,
    Neck,
    Legs,
    Rings,
    Hands,
}

impl SlotGroup {
    /// Candidate slots, in order of preference.
    pub fn slots(&self) -> &'static [EquipmentSlot] {
        match self {
            SlotGroup::Head => &[EquipmentSlot::Head],
            SlotGroup::Chest => &[EquipmentSlot::Chest],
            SlotGroup::Arms => &[EquipmentSlot::Arms],
            SlotGroup::Neck => &[EquipmentSlot::Neck],
            SlotGroup::Legs => &[EquipmentSlot::Legs],
            SlotGroup::Rings => &[EquipmentSlot::Ring1, EquipmentSlot::Ring2],
            SlotGroup::Hands => &[EquipmentSlot::MainHand, EquipmentSlot::OffHand],
        }
    }
}

/// Subtype to slot group.
pub const SUBTYPE_SLOTS: &[(ItemSubtype, SlotGroup)] = &[
    (ItemSubtype::Helmet, SlotGroup::Head),
    (ItemSubtype::Crown, SlotGroup::Head),
    (ItemSubtype::Tiara, SlotGroup::Head),
    (ItemSubtype::Armor, SlotGroup::Chest),
    (ItemSubtype::Robe, SlotGroup::Chest),
    (ItemSubtype::Shirt, SlotGroup::Chest),
    (ItemSubtype::Gauntlets, SlotGroup::Arms),
    (ItemSubtype::Gloves, SlotGroup::Arms),
    (ItemSubtype::Amulet, SlotGroup::Neck),
    (ItemSubtype::Pendant, SlotGroup::Neck),
    (ItemSubtype::Boots, SlotGroup::Legs),
    (ItemSubtype::Shoes, SlotGroup::Legs),
    (ItemSubtype::Ring, SlotGroup::Rings),
    (ItemSubtype::Sword, SlotGroup::Hands),
    (ItemSubtype::Bow, SlotGroup::Hands),
    (ItemSubtype::Axe, SlotGroup::Hands),
    (ItemSubtype::Mace, SlotGroup::Hands),
    (ItemSubtype::Dagger, SlotGroup::Hands),
    (ItemSubtype::Staff, SlotGroup::Hands),
];

/// Type to slot group, consulted only when an item has no subtype.
pub const TYPE_SLOTS: &[(ItemType, SlotGroup)] = &[(ItemType::Armor, SlotGroup::Chest)];

/// The slot group an item belongs to, if any.
pub fn slot_group(item: &Item) -> Option<SlotGroup> {
    match item.subtype {
        Some(subtype) => SUBTYPE_SLOTS
            .iter()
            .find(|(s, _)| *s == subtype)
            .map(|(_, group)| *group),
        None => TYPE_SLOTS
            .iter()
            .find(|(t, _)| *t == item.item_type)
            .map(|(_, group)| *group),
    }
}

/// Every slot that accepts `item`. Empty means it cannot be equipped.
pub fn compatible_slots(item: &Item) -> &'static [EquipmentSlot] {
    slot_group(item).map(|g| g.slots()).unwrap_or(&[])
}

/// The slot an item goes to when the player does not pick one:
/// the first empty candidate, otherwise the first candidate.
pub fn auto_slot(item: &Item, current: &SlotMap) -> Option<EquipmentSlot> {
    let candidates = compatible_slots(item);
    candidates
        .iter()
        .copied()
        .find(|slot| current.is_empty_slot(*slot))
        .or_else(|| candidates.first().copied())
}

// ============================================================================
// Equipment Store
// ============================================================================

/// Per-character slot contents.
#[derive(Debug, Clone, Default)]
pub struct EquipmentStore {
    by_character: HashMap<CharacterId, SlotMap>,
}

impl EquipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot contents for a character. Unknown characters have empty slots.
    pub fn get_equipment(&self, character: CharacterId) -> SlotMap {
        self.by_character
            .get(&character)
            .cloned()
            .unwrap_or_default()
    }

    /// Borrowing variant of [`Self::get_equipment`].
    pub fn slots(&self, character: CharacterId) -> Option<&SlotMap> {
        self.by_character.get(&character)
    }

    /// Put `item` into `slot`, replacing whatever was there.
    ///
    /// Returns the id that was displaced, if it differs from `item`. An item
    /// occupies at most one slot, so if it already sat elsewhere that slot is
    /// vacated. Removing the displaced item from the inventory, or clearing
    /// its equipped flag, is up to the caller.
    pub fn equip_item(
        &mut self,
        character: CharacterId,
        slot: EquipmentSlot,
        item: &Item,
    ) -> Option<ItemId> {
        let slots = self.by_character.entry(character).or_default();

        if let Some(previous_slot) = slots.slot_of(&item.id) {
            if previous_slot != slot {
                slots.0.remove(&previous_slot);
            }
        }

        let previous = slots.0.insert(slot, item.id.clone());
        tracing::debug!(character = %character, slot = %slot, item = %item.id, "equipped");
        previous.filter(|id| *id != item.id)
    }

    /// Empty a slot. Emptying an empty slot is a no-op.
    pub fn unequip_item(&mut self, character: CharacterId, slot: EquipmentSlot) -> Option<ItemId> {
        let removed = self
            .by_character
            .get_mut(&character)
            .and_then(|slots| slots.0.remove(&slot));
        if let Some(id) = &removed {
            tracing::debug!(character = %character, slot = %slot, item = %id, "unequipped");
        }
        removed
    }

    /// The slot holding `item` for `character`.
    pub fn slot_of(&self, character: CharacterId, item: &ItemId) -> Option<EquipmentSlot> {
        self.by_character
            .get(&character)
            .and_then(|slots| slots.slot_of(item))
    }

    /// Forget everything equipped by a character.
    pub fn clear_character(&mut self, character: CharacterId) {
        if self.by_character.remove(&character).is_some() {
            tracing::debug!(character = %character, "cleared equipment");
        }
    }
}
