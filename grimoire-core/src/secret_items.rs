//! Game-master secret items and their redemption codes.
//!
//! Each secret item carries a one-time code (`LMJT` + three digits). A player
//! redeeming the code receives a copy of the item, minus the code, and the
//! secret item is permanently marked as used.

use crate::notify::Notifier;
use crate::persist::{load_json, save_json, Storage};
use crate::world::{
    CharacterId, Item, ItemId, ItemImage, ItemSubtype, ItemType, Rarity, SecretItemId, StatBonuses,
};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Storage key of the registry document.
pub const STORAGE_KEY: &str = "grimoire_secret_items_v1";

/// Prefix shared by every redemption code.
pub const CODE_PREFIX: &str = "LMJT";

/// Number of distinct codes.
pub const CODE_SPACE: u32 = 1000;

/// Random draws before falling back to a scan of the code space.
const MAX_RANDOM_ATTEMPTS: u32 = 5000;

/// Errors from creating secret items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretItemError {
    #[error("A name is required")]
    MissingName,

    #[error("Invalid code {0}: expected LMJT followed by three digits")]
    InvalidCode(String),

    #[error("Code {0} already exists")]
    DuplicateCode(String),

    #[error("Every redemption code is already in use")]
    CodeSpaceExhausted,
}

/// Why a redemption did not produce an item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedeemError {
    #[error("Enter a code")]
    EmptyCode,

    #[error("Code not found: {0}")]
    NotFound(String),

    #[error("Code already used: {0}")]
    AlreadyUsed(String),

    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),
}

/// Trim and upper-case a code as typed by a player.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Whether a normalized code has the `LMJT` + three digits shape.
pub fn is_valid_code(code: &str) -> bool {
    match code.strip_prefix(CODE_PREFIX) {
        Some(digits) => digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn format_code(n: u32) -> String {
    format!("{CODE_PREFIX}{:03}", n % CODE_SPACE)
}

/// A game-master authored item, hidden behind a redemption code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretItem {
    pub id: SecretItemId,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<ItemSubtype>,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatBonuses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ItemImage>,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_by_character_id: Option<CharacterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl SecretItem {
    pub fn is_used(&self) -> bool {
        self.used_by_character_id.is_some()
    }

    /// The player-facing item minted for `character`. Never carries the code.
    pub fn to_inventory_item(&self, character: CharacterId) -> Item {
        Item {
            id: ItemId::redeemed(self.id, character),
            name: self.name.clone(),
            item_type: self.item_type,
            subtype: self.subtype,
            rarity: self.rarity,
            description: self.description.clone(),
            weight: self.weight.unwrap_or(0.0),
            value: self.value.unwrap_or(0.0),
            stats: self.stats.clone(),
            image: self.image.clone(),
            quantity: None,
            equipped: false,
        }
    }
}

/// Input for [`SecretItemRegistry::create_secret_item`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSecretItem {
    pub name: String,
    pub item_type: ItemType,
    pub subtype: Option<ItemSubtype>,
    pub rarity: Rarity,
    pub description: Option<String>,
    pub weight: Option<f32>,
    pub value: Option<f32>,
    pub stats: Option<StatBonuses>,
    pub image: Option<ItemImage>,
    /// Requested code. Generated when absent or blank.
    pub code: Option<String>,
}

impl NewSecretItem {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            name: name.into(),
            item_type,
            subtype: None,
            rarity: Rarity::Common,
            description: None,
            weight: None,
            value: None,
            stats: None,
            image: None,
            code: None,
        }
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
        self.weight = Some(weight);
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_stats(mut self, stats: StatBonuses) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_image(mut self, image: ItemImage) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// The catalog of secret items, most recent first.
pub struct SecretItemRegistry {
    items: Vec<SecretItem>,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    rng: StdRng,
}

impl SecretItemRegistry {
    /// Restore the registry from storage.
    ///
    /// A missing or unreadable document yields an empty registry; the
    /// failure is logged, never returned.
    pub fn load(storage: Arc<dyn Storage>, notifier: Arc<dyn Notifier>) -> Self {
        let items = match load_json::<Vec<SecretItem>>(storage.as_ref(), STORAGE_KEY) {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load secret items, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = items.len(), "secret item registry loaded");

        Self {
            items,
            storage,
            notifier,
            rng: StdRng::from_entropy(),
        }
    }

    /// Use a specific RNG for code generation.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// All secret items, most recent first.
    pub fn items(&self) -> &[SecretItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: SecretItemId) -> Option<&SecretItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Look up by code, after normalization.
    pub fn find_by_code(&self, code: &str) -> Option<&SecretItem> {
        let normalized = normalize_code(code);
        self.items.iter().find(|i| i.code == normalized)
    }

    /// Items whose code has not been redeemed yet.
    pub fn available(&self) -> impl Iterator<Item = &SecretItem> {
        self.items.iter().filter(|i| !i.is_used())
    }

    /// Items redeemed by `character`.
    pub fn redeemed_by(&self, character: CharacterId) -> impl Iterator<Item = &SecretItem> {
        self.items
            .iter()
            .filter(move |i| i.used_by_character_id == Some(character))
    }

    /// Create a secret item and persist the registry.
    pub fn create_secret_item(
        &mut self,
        input: NewSecretItem,
    ) -> Result<SecretItem, SecretItemError> {
        match self.try_create(input) {
            Ok(item) => {
                tracing::info!(id = %item.id, code = %item.code, "secret item created");
                self.notifier
                    .success(&format!("Secret item created. Code: {}", item.code));
                Ok(item)
            }
            Err(e) => {
                tracing::warn!(error = %e, "secret item rejected");
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn try_create(&mut self, input: NewSecretItem) -> Result<SecretItem, SecretItemError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(SecretItemError::MissingName);
        }

        let existing: HashSet<&str> = self.items.iter().map(|i| i.code.as_str()).collect();
        let requested = input
            .code
            .as_deref()
            .map(normalize_code)
            .filter(|c| !c.is_empty());

        let code = match requested {
            Some(code) => {
                if !is_valid_code(&code) {
                    return Err(SecretItemError::InvalidCode(code));
                }
                if existing.contains(code.as_str()) {
                    return Err(SecretItemError::DuplicateCode(code));
                }
                code
            }
            None => generate_code(&existing, &mut self.rng)?,
        };

        let item = SecretItem {
            id: SecretItemId::new(),
            name: name.to_string(),
            item_type: input.item_type,
            subtype: input.subtype,
            rarity: input.rarity,
            description: input.description,
            weight: input.weight,
            value: input.value,
            stats: input.stats,
            image: input.image,
            code,
            used_by_character_id: None,
            used_at: None,
        };

        self.items.insert(0, item.clone());
        self.persist();
        Ok(item)
    }

    /// Remove a secret item. Returns whether anything was removed.
    pub fn delete_secret_item(&mut self, id: SecretItemId) -> bool {
        let Some(idx) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        let removed = self.items.remove(idx);
        self.persist();
        tracing::info!(id = %id, code = %removed.code, "secret item deleted");
        self.notifier
            .success(&format!("Secret item {} deleted", removed.name));
        true
    }

    /// Attach artwork to a secret item. Returns false if the item is gone.
    pub fn set_image(&mut self, id: SecretItemId, image: ItemImage) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.id == id) else {
            return false;
        };
        item.image = Some(image);
        self.persist();
        true
    }

    /// Redeem a code for `character`.
    ///
    /// The first successful redemption burns the code; every later attempt
    /// fails with [`RedeemError::AlreadyUsed`] and changes nothing.
    pub fn redeem_code(&mut self, code: &str, character: CharacterId) -> Result<Item, RedeemError> {
        let result = self.try_redeem(code, character);
        match &result {
            Ok(item) => {
                tracing::info!(character = %character, item = %item.id, "code redeemed");
                self.notifier.success(&format!("Item added: {}", item.name));
            }
            Err(e) => {
                tracing::warn!(character = %character, error = %e, "redemption failed");
                self.notifier.error(&e.to_string());
            }
        }
        result
    }

    fn try_redeem(&mut self, code: &str, character: CharacterId) -> Result<Item, RedeemError> {
        let normalized = normalize_code(code);
        if normalized.is_empty() {
            return Err(RedeemError::EmptyCode);
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.code == normalized)
            .ok_or_else(|| RedeemError::NotFound(normalized.clone()))?;

        if item.is_used() {
            return Err(RedeemError::AlreadyUsed(normalized));
        }

        item.used_by_character_id = Some(character);
        item.used_at = Some(Utc::now());
        let minted = item.to_inventory_item(character);

        self.persist();
        Ok(minted)
    }

    /// Best-effort write of the whole registry.
    fn persist(&self) {
        if let Err(e) = save_json(self.storage.as_ref(), STORAGE_KEY, &self.items) {
            tracing::error!(error = %e, "failed to save secret items");
        }
    }
}

/// Draw an unused code.
///
/// Samples the code space uniformly; after too many collisions, scans
/// forward from a time-derived starting point instead.
fn generate_code<R: Rng>(existing: &HashSet<&str>, rng: &mut R) -> Result<String, SecretItemError> {
    for _ in 0..MAX_RANDOM_ATTEMPTS {
        let code = format_code(rng.gen_range(0..CODE_SPACE));
        if !existing.contains(code.as_str()) {
            return Ok(code);
        }
    }

    let start = (Utc::now().timestamp_millis().rem_euclid(i64::from(CODE_SPACE))) as u32;
    (0..CODE_SPACE)
        .map(|offset| format_code(start + offset))
        .find(|code| !existing.contains(code.as_str()))
        .ok_or(SecretItemError::CodeSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NullNotifier;
    use crate::persist::MemoryStorage;
    use crate::world::StatKey;

    fn registry() -> SecretItemRegistry {
        SecretItemRegistry::load(Arc::new(MemoryStorage::new()), Arc::new(NullNotifier))
            .with_rng(StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code("LMJT000"));
        assert!(is_valid_code("LMJT999"));
        assert!(!is_valid_code("LMJT12"));
        assert!(!is_valid_code("LMJT1234"));
        assert!(!is_valid_code("LMJTabc"));
        assert!(!is_valid_code("XYZT123"));
        assert_eq!(normalize_code("  lmjt042 "), "LMJT042");
    }

    #[test]
    fn test_generated_code_matches_format() {
        let mut reg = registry();
        let item = reg
            .create_secret_item(NewSecretItem::new("Tomb Blade", ItemType::Weapon))
            .unwrap();
        assert!(is_valid_code(&item.code), "{}", item.code);
        assert!(!item.is_used());
    }

    #[test]
    fn test_newest_first() {
        let mut reg = registry();
        reg.create_secret_item(NewSecretItem::new("First", ItemType::Gear))
            .unwrap();
        reg.create_secret_item(NewSecretItem::new("Second", ItemType::Gear))
            .unwrap();
        assert_eq!(reg.items()[0].name, "Second");
        assert_eq!(reg.items()[1].name, "First");
    }

    #[test]
    fn test_custom_code_is_normalized() {
        let mut reg = registry();
        let item = reg
            .create_secret_item(NewSecretItem::new("Crown", ItemType::Jewelry).with_code(" lmjt123 "))
            .unwrap();
        assert_eq!(item.code, "LMJT123");
    }

    #[test]
    fn test_blank_custom_code_generates_one() {
        let mut reg = registry();
        let item = reg
            .create_secret_item(NewSecretItem::new("Crown", ItemType::Jewelry).with_code("   "))
            .unwrap();
        assert!(is_valid_code(&item.code));
    }

    #[test]
    fn test_duplicate_code_rejected_without_change() {
        let mut reg = registry();
        reg.create_secret_item(NewSecretItem::new("A", ItemType::Gear).with_code("LMJT001"))
            .unwrap();
        let err = reg
            .create_secret_item(NewSecretItem::new("B", ItemType::Gear).with_code("lmjt001"))
            .unwrap_err();
        assert_eq!(err, SecretItemError::DuplicateCode("LMJT001".to_string()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_validation_errors() {
        let mut reg = registry();
        assert_eq!(
            reg.create_secret_item(NewSecretItem::new("  ", ItemType::Gear)),
            Err(SecretItemError::MissingName)
        );
        assert_eq!(
            reg.create_secret_item(NewSecretItem::new("X", ItemType::Gear).with_code("ABC")),
            Err(SecretItemError::InvalidCode("ABC".to_string()))
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn test_thousand_codes_are_unique() {
        let mut reg = registry();
        for n in 0..CODE_SPACE {
            reg.create_secret_item(NewSecretItem::new(format!("Item {n}"), ItemType::Treasure))
                .unwrap();
        }
        let codes: HashSet<&str> = reg.items().iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes.len(), CODE_SPACE as usize);

        assert_eq!(
            reg.create_secret_item(NewSecretItem::new("One too many", ItemType::Treasure)),
            Err(SecretItemError::CodeSpaceExhausted)
        );
        assert_eq!(reg.len(), CODE_SPACE as usize);
    }

    #[test]
    fn test_redeem_once() {
        let mut reg = registry();
        let secret = reg
            .create_secret_item(
                NewSecretItem::new("Ring of Stars", ItemType::Jewelry)
                    .with_subtype(ItemSubtype::Ring)
                    .with_stats(StatBonuses::new().with(StatKey::Charisma, 2)),
            )
            .unwrap();
        let alice = CharacterId::new();
        let bob = CharacterId::new();

        let item = reg.redeem_code(&secret.code.to_lowercase(), alice).unwrap();
        assert_eq!(item.id, ItemId::redeemed(secret.id, alice));
        assert_eq!(item.weight, 0.0);
        assert!(!item.equipped);

        let stored = reg.get(secret.id).unwrap();
        assert_eq!(stored.used_by_character_id, Some(alice));
        assert!(stored.used_at.is_some());

        assert_eq!(
            reg.redeem_code(&secret.code, bob),
            Err(RedeemError::AlreadyUsed(secret.code.clone()))
        );
        assert_eq!(
            reg.redeem_code(&secret.code, alice),
            Err(RedeemError::AlreadyUsed(secret.code.clone()))
        );
        assert_eq!(reg.get(secret.id).unwrap().used_by_character_id, Some(alice));
    }

    #[test]
    fn test_redeem_unknown_and_empty() {
        let mut reg = registry();
        assert_eq!(
            reg.redeem_code("lmjt404", CharacterId::new()),
            Err(RedeemError::NotFound("LMJT404".to_string()))
        );
        assert_eq!(
            reg.redeem_code("   ", CharacterId::new()),
            Err(RedeemError::EmptyCode)
        );
    }

    #[test]
    fn test_redeemed_payload_has_no_code() {
        let mut reg = registry();
        let secret = reg
            .create_secret_item(NewSecretItem::new("Hidden Dagger", ItemType::Weapon))
            .unwrap();
        let item = reg.redeem_code(&secret.code, CharacterId::new()).unwrap();

        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("code").is_none());
        assert!(!json.to_string().contains(&secret.code));
    }

    #[test]
    fn test_delete() {
        let mut reg = registry();
        let secret = reg
            .create_secret_item(NewSecretItem::new("Temp", ItemType::Gear))
            .unwrap();
        assert!(reg.delete_secret_item(secret.id));
        assert!(!reg.delete_secret_item(secret.id));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_available_and_redeemed_by() {
        let mut reg = registry();
        let a = reg
            .create_secret_item(NewSecretItem::new("A", ItemType::Gear))
            .unwrap();
        reg.create_secret_item(NewSecretItem::new("B", ItemType::Gear))
            .unwrap();
        let pc = CharacterId::new();
        reg.redeem_code(&a.code, pc).unwrap();

        assert_eq!(reg.available().count(), 1);
        assert_eq!(reg.redeemed_by(pc).map(|i| i.id).collect::<Vec<_>>(), vec![a.id]);
    }
}
