//! Testing utilities for the grimoire.
//!
//! This module provides tools for integration testing:
//! - `RecordingNotifier` to capture user-facing messages
//! - `TestHarness` for scripted party scenarios over in-memory storage
//! - Assertion helpers for verifying inventory state

use crate::character::{CharacterUpdate, NewCharacter};
use crate::equipment::EquipmentSlot;
use crate::notify::{Notifier, Severity};
use crate::persist::MemoryStorage;
use crate::session::{Grimoire, GrimoireConfig};
use crate::world::{create_sample_character, Character, CharacterId, Item, ItemId};
use std::sync::{Arc, Mutex};

/// Seed used by harnesses unless the config names another.
pub const TEST_SEED: u64 = 0x6772_696d;

/// A notifier that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages so far, oldest first.
    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<(Severity, String)> {
        self.messages().pop()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }

    pub fn clear(&self) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((severity, message.to_string()));
        }
    }
}

/// A sample character, fresh id each call.
pub fn sample_character(name: &str) -> Character {
    create_sample_character(name)
}

/// Test harness for running party scenarios.
pub struct TestHarness {
    /// The grimoire under test.
    pub grimoire: Grimoire,
    /// Captures every notification.
    pub notifier: Arc<RecordingNotifier>,
    /// Backing storage, shared across [`Self::reload`].
    pub storage: Arc<MemoryStorage>,
}

impl TestHarness {
    /// Create a harness with a seeded RNG and empty storage.
    pub fn new() -> Self {
        Self::with_config(GrimoireConfig::new())
    }

    /// Create a harness with a custom config.
    pub fn with_config(config: GrimoireConfig) -> Self {
        Self::with_storage(config, Arc::new(MemoryStorage::new()))
    }

    /// Create a harness over existing storage.
    pub fn with_storage(mut config: GrimoireConfig, storage: Arc<MemoryStorage>) -> Self {
        if config.rng_seed.is_none() {
            config.rng_seed = Some(TEST_SEED);
        }
        let notifier = Arc::new(RecordingNotifier::new());
        let grimoire = Grimoire::with_services(config, storage.clone(), notifier.clone());

        Self {
            grimoire,
            notifier,
            storage,
        }
    }

    /// Start over from what the storage holds, as a new session would.
    pub fn reload(&self) -> Self {
        Self::with_storage(self.grimoire.config().clone(), self.storage.clone())
    }

    /// Add a level 3 elf ranger.
    #[track_caller]
    pub fn add_character(&mut self, name: &str) -> CharacterId {
        self.grimoire
            .add_character(NewCharacter::new(name, "Elf", "Ranger", 3))
            .expect("sample character is valid")
    }

    /// Put items at the end of a character's inventory.
    #[track_caller]
    pub fn give_items(&mut self, id: CharacterId, items: Vec<Item>) {
        let mut inventory = self
            .grimoire
            .get_character(id)
            .expect("character exists")
            .inventory
            .clone();
        inventory.items.extend(items);
        self.grimoire.update_character(
            id,
            CharacterUpdate {
                inventory: Some(inventory),
                ..Default::default()
            },
        );
    }

    /// The character, panicking if they are gone.
    #[track_caller]
    pub fn character(&self, id: CharacterId) -> &Character {
        self.grimoire.get_character(id).expect("character exists")
    }

    /// Whether the item sits in the given slot.
    pub fn is_in_slot(&self, id: CharacterId, slot: EquipmentSlot, item: &ItemId) -> bool {
        self.grimoire.equipment().get_equipment(id).get(slot) == Some(item)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that the item is flagged equipped and sits in `slot`.
#[track_caller]
pub fn assert_equipped(harness: &TestHarness, id: CharacterId, slot: EquipmentSlot, item: &ItemId) {
    assert!(
        harness.is_in_slot(id, slot, item),
        "Expected {item} in the {slot} slot"
    );
    let flagged = harness
        .character(id)
        .inventory
        .find_item(item)
        .map(|i| i.equipped);
    assert_eq!(flagged, Some(true), "Expected {item} to be flagged equipped");
}

/// Assert that the item is in the inventory and not equipped anywhere.
#[track_caller]
pub fn assert_unequipped(harness: &TestHarness, id: CharacterId, item: &ItemId) {
    assert_eq!(
        harness.grimoire.equipment().slot_of(id, item),
        None,
        "Expected {item} to be out of every slot"
    );
    let flagged = harness
        .character(id)
        .inventory
        .find_item(item)
        .map(|i| i.equipped);
    assert_eq!(flagged, Some(false), "Expected {item} in inventory, unequipped");
}

/// Assert the most recent notification.
#[track_caller]
pub fn assert_last_notification(harness: &TestHarness, severity: Severity, contains: &str) {
    match harness.notifier.last() {
        Some((s, message)) => {
            assert_eq!(s, severity, "Unexpected severity for '{message}'");
            assert!(
                message.contains(contains),
                "Expected '{message}' to contain '{contains}'"
            );
        }
        None => panic!("Expected a notification containing '{contains}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{ItemSubtype, ItemType};

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.success("ok");
        notifier.error("bad");
        assert_eq!(notifier.count(Severity::Success), 1);
        assert_eq!(notifier.last(), Some((Severity::Error, "bad".to_string())));
        notifier.clear();
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn test_harness_scenario() {
        let mut harness = TestHarness::new();
        let pc = harness.add_character("Aria");
        harness.give_items(
            pc,
            vec![Item::new("Boots", ItemType::Armor)
                .with_id("boots")
                .with_subtype(ItemSubtype::Boots)],
        );
        let boots = ItemId::from("boots");

        harness.grimoire.equip_item(pc, &boots, None).unwrap();
        assert_equipped(&harness, pc, EquipmentSlot::Legs, &boots);
        assert_last_notification(&harness, Severity::Success, "Boots");

        harness.grimoire.toggle_equip(pc, &boots).unwrap();
        assert_unequipped(&harness, pc, &boots);
    }

    #[test]
    fn test_reload_keeps_secret_items() {
        let mut harness = TestHarness::new();
        harness
            .grimoire
            .create_secret_item(crate::secret_items::NewSecretItem::new(
                "Relic",
                ItemType::Treasure,
            ))
            .unwrap();
        let reloaded = harness.reload();
        assert_eq!(reloaded.grimoire.secrets().len(), 1);
    }

    #[test]
    fn test_sample_character_ids_are_fresh() {
        assert_ne!(sample_character("A").id, sample_character("A").id);
    }
}
