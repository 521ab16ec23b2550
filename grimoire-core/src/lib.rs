//! Tabletop RPG companion engine.
//!
//! This crate provides:
//! - Character sheets and a party roster with group totals
//! - Equipment slots with per-subtype compatibility rules
//! - Game-master secret items, redeemable once through `LMJT###` codes
//! - Inventory aggregation (equipped bonuses, value, weight)
//! - JSON persistence behind a pluggable key-value store
//!
//! # Quick Start
//!
//! ```ignore
//! use grimoire_core::{Grimoire, GrimoireConfig, ItemType, NewCharacter, NewSecretItem};
//!
//! let mut grimoire = Grimoire::new(GrimoireConfig::from_env());
//! let aria = grimoire.add_character(NewCharacter::new("Aria", "Elf", "Ranger", 3))?;
//!
//! let secret = grimoire.create_secret_item(NewSecretItem::new("Moon Tiara", ItemType::Jewelry))?;
//! let item = grimoire.redeem_code(&secret.code, aria)?;
//! grimoire.equip_item(aria, &item.id, None)?;
//!
//! let bonuses = grimoire.inventory_view(aria).map(|v| v.equipped_bonuses());
//! ```

pub mod character;
pub mod equipment;
pub mod headless;
pub mod images;
pub mod inventory;
pub mod items;
pub mod notify;
pub mod persist;
pub mod secret_items;
pub mod session;
pub mod testing;
pub mod world;

// Primary public API
pub use character::{CharacterError, CharacterStore, CharacterUpdate, GroupSummary, NewCharacter};
pub use equipment::{compatible_slots, EquipmentSlot, EquipmentStore, SlotMap};
pub use headless::{Command, HeadlessSession};
pub use inventory::{Category, EquippedBonuses, InventoryView};
pub use notify::{Notifier, Severity, TracingNotifier};
pub use persist::{FileStorage, MemoryStorage, Storage, StorageError};
pub use secret_items::{NewSecretItem, RedeemError, SecretItem, SecretItemError, SecretItemRegistry};
pub use session::{EquipError, Grimoire, GrimoireConfig, GrimoireError};
pub use world::{
    Character, CharacterId, Item, ItemId, ItemImage, ItemSubtype, ItemType, Rarity, SecretItemId,
    StatBonuses, StatKey,
};
