//! Grimoire - the primary public API for the companion.
//!
//! This module ties the character roster, the equipment store and the
//! secret item registry together behind one context object, and keeps the
//! cross-store invariants: equipped flags follow the slot map, redeemed
//! items land in the right inventory, and removed characters leave no
//! equipment behind.

use crate::character::{
    CharacterError, CharacterStore, CharacterUpdate, GroupSummary, NewCharacter,
};
use crate::equipment::{auto_slot, compatible_slots, EquipmentSlot, EquipmentStore, SlotMap};
use crate::images::{load_image, ImageError};
use crate::inventory::InventoryView;
use crate::items::starter_kit;
use crate::notify::{Notifier, TracingNotifier};
use crate::persist::{FileStorage, Storage, StorageError};
use crate::secret_items::{
    NewSecretItem, RedeemError, SecretItem, SecretItemError, SecretItemRegistry,
};
use crate::world::{Character, CharacterId, Item, ItemId, ItemImage, SecretItemId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Default party name shown on the group panel.
pub const DEFAULT_GROUP_NAME: &str = "Les Maraudeurs de Joyaux Tendres";

/// Default directory for persisted state.
pub const DEFAULT_DATA_DIR: &str = "./grimoire-data";

static NO_SLOTS: SlotMap = SlotMap::EMPTY;

/// Why an item could not be equipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),

    #[error("Item not in inventory: {0}")]
    ItemNotInInventory(ItemId),

    #[error("{0} cannot be equipped")]
    NoCompatibleSlot(String),

    #[error("{item} does not fit the {slot} slot")]
    IncompatibleSlot { item: String, slot: EquipmentSlot },
}

/// Any error a grimoire operation can produce.
#[derive(Debug, Error)]
pub enum GrimoireError {
    #[error(transparent)]
    Character(#[from] CharacterError),

    #[error(transparent)]
    SecretItem(#[from] SecretItemError),

    #[error(transparent)]
    Redeem(#[from] RedeemError),

    #[error(transparent)]
    Equip(#[from] EquipError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Secret item not found: {0}")]
    SecretItemNotFound(SecretItemId),
}

/// Configuration for a grimoire.
#[derive(Debug, Clone, PartialEq)]
pub struct GrimoireConfig {
    /// Where file-backed state lives.
    pub data_dir: PathBuf,

    /// Party name for the group panel.
    pub group_name: String,

    /// Seed for redemption code generation. Random when absent.
    pub rng_seed: Option<u64>,

    /// Give new characters the starter kit when they bring no items.
    pub starter_items: bool,
}

impl Default for GrimoireConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            group_name: DEFAULT_GROUP_NAME.to_string(),
            rng_seed: None,
            starter_items: false,
        }
    }
}

impl GrimoireConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `GRIMOIRE_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("GRIMOIRE_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = lookup("GRIMOIRE_GROUP_NAME").filter(|v| !v.trim().is_empty()) {
            config.group_name = name.trim().to_string();
        }
        if let Some(raw) = lookup("GRIMOIRE_RNG_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.rng_seed = Some(seed),
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring GRIMOIRE_RNG_SEED"),
            }
        }
        if let Some(raw) = lookup("GRIMOIRE_STARTER_ITEMS") {
            config.starter_items = matches!(
                raw.trim().to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        config
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = name.into();
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_starter_items(mut self, enabled: bool) -> Self {
        self.starter_items = enabled;
        self
    }
}

/// The companion's state: characters, their equipment, and the GM's
/// secret items.
pub struct Grimoire {
    config: GrimoireConfig,
    characters: CharacterStore,
    equipment: EquipmentStore,
    secrets: SecretItemRegistry,
    notifier: Arc<dyn Notifier>,
}

impl Grimoire {
    /// File-backed grimoire under `config.data_dir`, notifying through
    /// `tracing`.
    pub fn new(config: GrimoireConfig) -> Self {
        let storage = Arc::new(FileStorage::new(config.data_dir.clone()));
        Self::with_services(config, storage, Arc::new(TracingNotifier))
    }

    /// Grimoire over explicit storage and notifier implementations.
    pub fn with_services(
        config: GrimoireConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut secrets = SecretItemRegistry::load(storage, notifier.clone());
        if let Some(seed) = config.rng_seed {
            secrets = secrets.with_rng(StdRng::seed_from_u64(seed));
        }

        Self {
            config,
            characters: CharacterStore::new(),
            equipment: EquipmentStore::new(),
            secrets,
            notifier,
        }
    }

    pub fn config(&self) -> &GrimoireConfig {
        &self.config
    }

    pub fn characters(&self) -> &CharacterStore {
        &self.characters
    }

    pub fn equipment(&self) -> &EquipmentStore {
        &self.equipment
    }

    pub fn secrets(&self) -> &SecretItemRegistry {
        &self.secrets
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    // ========================================================================
    // Characters
    // ========================================================================

    /// Add a character, outfitting them with the starter kit if configured.
    pub fn add_character(&mut self, mut input: NewCharacter) -> Result<CharacterId, CharacterError> {
        if self.config.starter_items && input.items.is_empty() {
            input.items = starter_kit();
        }

        match self.characters.add_character(input) {
            Ok(id) => {
                if let Some(character) = self.characters.get_character(id) {
                    self.notifier
                        .success(&format!("{} joined the party", character.name));
                }
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "character rejected");
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Remove a character along with everything they had equipped.
    pub fn remove_character(&mut self, id: CharacterId) -> Option<Character> {
        let removed = self.characters.remove_character(id)?;
        self.equipment.clear_character(id);
        self.notifier
            .success(&format!("{} left the party", removed.name));
        Some(removed)
    }

    pub fn select_character(&mut self, id: CharacterId) -> bool {
        self.characters.select(id)
    }

    pub fn selected_character(&self) -> Option<&Character> {
        self.characters.selected()
    }

    pub fn get_character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get_character(id)
    }

    /// Apply a partial update.
    ///
    /// Replacing the inventory unequips every slot whose item is gone and
    /// resets the equipped flags and count from the slot map.
    pub fn update_character(&mut self, id: CharacterId, update: CharacterUpdate) -> bool {
        let inventory_replaced = update.inventory.is_some();
        if !self.characters.update_character(id, update) {
            return false;
        }
        if inventory_replaced {
            self.reconcile_equipment(id);
        }
        true
    }

    fn reconcile_equipment(&mut self, id: CharacterId) {
        let Some(character) = self.characters.get_character_mut(id) else {
            return;
        };
        let inventory = &mut character.inventory;

        let orphaned: Vec<EquipmentSlot> = self
            .equipment
            .slots(id)
            .unwrap_or(&NO_SLOTS)
            .iter()
            .filter(|(_, item)| !inventory.contains(item))
            .map(|(slot, _)| slot)
            .collect();
        for slot in orphaned {
            self.equipment.unequip_item(id, slot);
        }

        let slots = self.equipment.slots(id).unwrap_or(&NO_SLOTS);
        for item in &mut inventory.items {
            item.equipped = slots.slot_of(&item.id).is_some();
        }
        inventory.sync_equipped_count();
    }

    /// Set current hit points, clamped to the character's maximum.
    pub fn set_hit_points(&mut self, id: CharacterId, hit_points: i32) -> bool {
        self.characters.set_hit_points(id, hit_points)
    }

    pub fn group_summary(&self) -> GroupSummary {
        self.characters.group_summary(&self.config.group_name)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Equip an inventory item, into `slot` or the automatically chosen one.
    ///
    /// Whatever occupied the slot before is unequipped but stays in the
    /// inventory. Returns the slot the item went into.
    pub fn equip_item(
        &mut self,
        character_id: CharacterId,
        item_id: &ItemId,
        slot: Option<EquipmentSlot>,
    ) -> Result<EquipmentSlot, EquipError> {
        match self.try_equip(character_id, item_id, slot) {
            Ok((slot, name)) => {
                self.notifier.success(&format!("{name} equipped ({slot})"));
                Ok(slot)
            }
            Err(e) => {
                tracing::warn!(character = %character_id, item = %item_id, error = %e, "equip rejected");
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn try_equip(
        &mut self,
        character_id: CharacterId,
        item_id: &ItemId,
        requested: Option<EquipmentSlot>,
    ) -> Result<(EquipmentSlot, String), EquipError> {
        let character = self
            .characters
            .get_character(character_id)
            .ok_or(EquipError::CharacterNotFound(character_id))?;
        let item = character
            .inventory
            .find_item(item_id)
            .cloned()
            .ok_or_else(|| EquipError::ItemNotInInventory(item_id.clone()))?;

        let candidates = compatible_slots(&item);
        let slot = match requested {
            _ if candidates.is_empty() => return Err(EquipError::NoCompatibleSlot(item.name)),
            Some(slot) if candidates.contains(&slot) => slot,
            Some(slot) => {
                return Err(EquipError::IncompatibleSlot {
                    item: item.name,
                    slot,
                })
            }
            None => {
                let current = self.equipment.slots(character_id).unwrap_or(&NO_SLOTS);
                auto_slot(&item, current)
                    .ok_or_else(|| EquipError::NoCompatibleSlot(item.name.clone()))?
            }
        };

        let displaced = self.equipment.equip_item(character_id, slot, &item);

        if let Some(character) = self.characters.get_character_mut(character_id) {
            let inventory = &mut character.inventory;
            if let Some(previous) = displaced.as_ref().and_then(|id| inventory.find_item_mut(id)) {
                previous.equipped = false;
            }
            if let Some(equipped) = inventory.find_item_mut(&item.id) {
                equipped.equipped = true;
            }
            inventory.sync_equipped_count();
        }

        Ok((slot, item.name))
    }

    /// Empty a slot. Unknown characters and empty slots are a no-op.
    ///
    /// Returns the id of the item that was removed from the slot.
    pub fn unequip_slot(&mut self, character_id: CharacterId, slot: EquipmentSlot) -> Option<ItemId> {
        let character = self.characters.get_character_mut(character_id)?;
        let removed = self.equipment.unequip_item(character_id, slot)?;

        let inventory = &mut character.inventory;
        let name = inventory.find_item_mut(&removed).map(|item| {
            item.equipped = false;
            item.name.clone()
        });
        inventory.sync_equipped_count();

        if let Some(name) = name {
            self.notifier.success(&format!("{name} unequipped"));
        }
        Some(removed)
    }

    /// Unequip the item if it is equipped, otherwise equip it automatically.
    ///
    /// Returns the slot the item now occupies, `None` after unequipping.
    pub fn toggle_equip(
        &mut self,
        character_id: CharacterId,
        item_id: &ItemId,
    ) -> Result<Option<EquipmentSlot>, EquipError> {
        match self.equipment.slot_of(character_id, item_id) {
            Some(slot) => {
                self.unequip_slot(character_id, slot);
                Ok(None)
            }
            None => self.equip_item(character_id, item_id, None).map(Some),
        }
    }

    /// Read-only inventory figures for a character.
    pub fn inventory_view(&self, character_id: CharacterId) -> Option<InventoryView<'_>> {
        let character = self.characters.get_character(character_id)?;
        let slots = self.equipment.slots(character_id).unwrap_or(&NO_SLOTS);
        Some(InventoryView::new(character, slots))
    }

    // ========================================================================
    // Secret Items
    // ========================================================================

    pub fn create_secret_item(&mut self, input: NewSecretItem) -> Result<SecretItem, SecretItemError> {
        self.secrets.create_secret_item(input)
    }

    pub fn delete_secret_item(&mut self, id: SecretItemId) -> bool {
        self.secrets.delete_secret_item(id)
    }

    /// Redeem a code into a character's inventory.
    ///
    /// The character is checked before the code is touched, so a typo in
    /// the character never burns a code.
    pub fn redeem_code(&mut self, code: &str, character_id: CharacterId) -> Result<Item, RedeemError> {
        if self.characters.get_character(character_id).is_none() {
            let e = RedeemError::CharacterNotFound(character_id);
            tracing::warn!(character = %character_id, error = %e, "redemption failed");
            self.notifier.error(&e.to_string());
            return Err(e);
        }

        let item = self.secrets.redeem_code(code, character_id)?;
        if let Some(character) = self.characters.get_character_mut(character_id) {
            character.inventory.add_item(item.clone());
        }
        Ok(item)
    }

    /// Attach already-encoded artwork to a secret item.
    pub fn attach_image(&mut self, id: SecretItemId, image: ItemImage) -> bool {
        let attached = self.secrets.set_image(id, image);
        if attached {
            self.notifier.success("Image attached");
        }
        attached
    }

    /// Load an image file and attach it to a secret item.
    pub async fn attach_image_file(
        &mut self,
        id: SecretItemId,
        path: impl AsRef<Path>,
    ) -> Result<(), GrimoireError> {
        if self.secrets.get(id).is_none() {
            return Err(GrimoireError::SecretItemNotFound(id));
        }

        let image = match load_image(path).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "image rejected");
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };

        // The item may have been deleted while the file was loading.
        if self.attach_image(id, image) {
            Ok(())
        } else {
            Err(GrimoireError::SecretItemNotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Severity;
    use crate::testing::TestHarness;
    use crate::world::{ItemSubtype, ItemType};

    fn armed(harness: &mut TestHarness) -> (CharacterId, ItemId, ItemId) {
        let id = harness.add_character("Aria");
        let sword = Item::new("Sword", ItemType::Weapon)
            .with_id("sword")
            .with_subtype(ItemSubtype::Sword);
        let axe = Item::new("Axe", ItemType::Weapon)
            .with_id("axe")
            .with_subtype(ItemSubtype::Axe);
        harness.give_items(id, vec![sword, axe]);
        (id, ItemId::from("sword"), ItemId::from("axe"))
    }

    #[test]
    fn test_config_from_lookup() {
        let config = GrimoireConfig::from_lookup(|key| match key {
            "GRIMOIRE_DATA_DIR" => Some("/tmp/grimoire".to_string()),
            "GRIMOIRE_RNG_SEED" => Some("42".to_string()),
            "GRIMOIRE_STARTER_ITEMS" => Some("yes".to_string()),
            _ => None,
        });
        assert_eq!(config.data_dir, PathBuf::from("/tmp/grimoire"));
        assert_eq!(config.rng_seed, Some(42));
        assert!(config.starter_items);
        assert_eq!(config.group_name, DEFAULT_GROUP_NAME);
    }

    #[test]
    fn test_config_ignores_bad_seed() {
        let config = GrimoireConfig::from_lookup(|key| {
            (key == "GRIMOIRE_RNG_SEED").then(|| "not a number".to_string())
        });
        assert_eq!(config.rng_seed, None);
    }

    #[test]
    fn test_equip_sets_flags_and_count() {
        let mut harness = TestHarness::new();
        let (pc, sword, axe) = armed(&mut harness);

        let slot = harness.grimoire.equip_item(pc, &sword, None).unwrap();
        assert_eq!(slot, EquipmentSlot::MainHand);
        let slot = harness.grimoire.equip_item(pc, &axe, None).unwrap();
        assert_eq!(slot, EquipmentSlot::OffHand);

        let character = harness.grimoire.get_character(pc).unwrap();
        assert_eq!(character.inventory.equipped_items, 2);
        assert!(character.inventory.find_item(&sword).unwrap().equipped);
    }

    #[test]
    fn test_equip_into_taken_slot_swaps_flags() {
        let mut harness = TestHarness::new();
        let (pc, sword, axe) = armed(&mut harness);

        harness
            .grimoire
            .equip_item(pc, &sword, Some(EquipmentSlot::MainHand))
            .unwrap();
        harness
            .grimoire
            .equip_item(pc, &axe, Some(EquipmentSlot::MainHand))
            .unwrap();

        let character = harness.grimoire.get_character(pc).unwrap();
        assert!(!character.inventory.find_item(&sword).unwrap().equipped);
        assert!(character.inventory.find_item(&axe).unwrap().equipped);
        assert_eq!(character.inventory.equipped_items, 1);
        assert_eq!(character.inventory.items.len(), 2);
    }

    #[test]
    fn test_equip_errors() {
        let mut harness = TestHarness::new();
        let (pc, sword, _) = armed(&mut harness);
        let potion = Item::new("Potion", ItemType::Consumable).with_id("potion");
        harness.give_items(pc, vec![potion]);

        assert!(matches!(
            harness.grimoire.equip_item(CharacterId::new(), &sword, None),
            Err(EquipError::CharacterNotFound(_))
        ));
        assert!(matches!(
            harness.grimoire.equip_item(pc, &ItemId::from("ghost"), None),
            Err(EquipError::ItemNotInInventory(_))
        ));
        assert!(matches!(
            harness.grimoire.equip_item(pc, &ItemId::from("potion"), None),
            Err(EquipError::NoCompatibleSlot(_))
        ));
        assert!(matches!(
            harness
                .grimoire
                .equip_item(pc, &sword, Some(EquipmentSlot::Head)),
            Err(EquipError::IncompatibleSlot { .. })
        ));
        assert!(harness.grimoire.equipment().get_equipment(pc).is_empty());
        assert_eq!(harness.notifier.count(Severity::Error), 4);
    }

    #[test]
    fn test_unequip_and_toggle() {
        let mut harness = TestHarness::new();
        let (pc, sword, _) = armed(&mut harness);

        assert_eq!(
            harness.grimoire.toggle_equip(pc, &sword),
            Ok(Some(EquipmentSlot::MainHand))
        );
        assert_eq!(harness.grimoire.toggle_equip(pc, &sword), Ok(None));
        let character = harness.grimoire.get_character(pc).unwrap();
        assert!(!character.inventory.find_item(&sword).unwrap().equipped);
        assert_eq!(character.inventory.equipped_items, 0);

        assert_eq!(harness.grimoire.unequip_slot(pc, EquipmentSlot::Head), None);
        assert_eq!(
            harness
                .grimoire
                .unequip_slot(CharacterId::new(), EquipmentSlot::Head),
            None
        );
    }

    #[test]
    fn test_inventory_replacement_releases_slots() {
        let mut harness = TestHarness::new();
        let (pc, sword, _) = armed(&mut harness);
        let helm = Item::new("Helm", ItemType::Armor)
            .with_id("helm")
            .with_subtype(ItemSubtype::Helmet);
        harness.give_items(pc, vec![helm]);
        let helm = ItemId::from("helm");
        harness.grimoire.equip_item(pc, &helm, None).unwrap();
        harness.grimoire.equip_item(pc, &sword, None).unwrap();

        // Keep the sword, drop the helm.
        let mut inventory = harness.grimoire.get_character(pc).unwrap().inventory.clone();
        inventory.items.retain(|item| item.id != helm);
        assert!(harness.grimoire.update_character(
            pc,
            CharacterUpdate {
                inventory: Some(inventory),
                ..Default::default()
            },
        ));

        let slots = harness.grimoire.equipment().get_equipment(pc);
        assert_eq!(slots.get(EquipmentSlot::Head), None);
        assert_eq!(slots.get(EquipmentSlot::MainHand), Some(&sword));
        assert_eq!(harness.grimoire.equipment().slot_of(pc, &helm), None);
        let character = harness.grimoire.get_character(pc).unwrap();
        assert_eq!(character.inventory.equipped_items, 1);

        // A stale flag on an unslotted item is cleared too.
        let mut inventory = character.inventory.clone();
        for item in &mut inventory.items {
            item.equipped = true;
        }
        harness.grimoire.update_character(
            pc,
            CharacterUpdate {
                inventory: Some(inventory),
                ..Default::default()
            },
        );
        let character = harness.grimoire.get_character(pc).unwrap();
        assert!(!character.inventory.find_item(&ItemId::from("axe")).unwrap().equipped);
        assert_eq!(character.inventory.equipped_items, 1);

        // The dropped helm no longer toggles out of a slot.
        assert_eq!(
            harness.grimoire.toggle_equip(pc, &helm),
            Err(EquipError::ItemNotInInventory(helm.clone()))
        );
    }

    #[test]
    fn test_remove_character_clears_equipment() {
        let mut harness = TestHarness::new();
        let (pc, sword, _) = armed(&mut harness);
        harness.grimoire.equip_item(pc, &sword, None).unwrap();

        assert!(harness.grimoire.remove_character(pc).is_some());
        assert!(harness.grimoire.equipment().slots(pc).is_none());
        assert!(harness.grimoire.inventory_view(pc).is_none());
    }

    #[test]
    fn test_redeem_into_inventory_front() {
        let mut harness = TestHarness::new();
        let (pc, _, _) = armed(&mut harness);
        let secret = harness
            .grimoire
            .create_secret_item(NewSecretItem::new("Moon Tiara", ItemType::Jewelry))
            .unwrap();

        let item = harness.grimoire.redeem_code(&secret.code, pc).unwrap();
        let character = harness.grimoire.get_character(pc).unwrap();
        assert_eq!(character.inventory.items[0].id, item.id);
        assert_eq!(character.inventory.items.len(), 3);
    }

    #[test]
    fn test_redeem_for_unknown_character_keeps_code() {
        let mut harness = TestHarness::new();
        let secret = harness
            .grimoire
            .create_secret_item(NewSecretItem::new("Moon Tiara", ItemType::Jewelry))
            .unwrap();
        let ghost = CharacterId::new();

        assert_eq!(
            harness.grimoire.redeem_code(&secret.code, ghost),
            Err(RedeemError::CharacterNotFound(ghost))
        );
        assert!(!harness.grimoire.secrets().get(secret.id).unwrap().is_used());
    }

    #[test]
    fn test_starter_items_when_configured() {
        let mut harness = TestHarness::with_config(GrimoireConfig::new().with_starter_items(true));
        let pc = harness.add_character("Brom");
        let view = harness.grimoire.inventory_view(pc).unwrap();
        assert_eq!(view.items().len(), starter_kit().len());
        assert_eq!(view.equipped_count(), 0);
    }

    #[test]
    fn test_group_summary_uses_configured_name() {
        let mut harness = TestHarness::new();
        harness.add_character("Aria");
        let summary = harness.grimoire.group_summary();
        assert_eq!(summary.name, DEFAULT_GROUP_NAME);
        assert_eq!(summary.members, 1);
    }

    #[tokio::test]
    async fn test_attach_image_file() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("art.gif");
        std::fs::write(&path, b"GIF89a\x01\x00\x01\x00").unwrap();

        let mut harness = TestHarness::new();
        let secret = harness
            .grimoire
            .create_secret_item(NewSecretItem::new("Painted Shield", ItemType::Armor))
            .unwrap();

        harness
            .grimoire
            .attach_image_file(secret.id, &path)
            .await
            .unwrap();
        let stored = harness.grimoire.secrets().get(secret.id).unwrap();
        assert_eq!(stored.image.as_ref().unwrap().media_type, "image/gif");

        let missing = SecretItemId::new();
        assert!(matches!(
            harness.grimoire.attach_image_file(missing, &path).await,
            Err(GrimoireError::SecretItemNotFound(id)) if id == missing
        ));
    }
}
