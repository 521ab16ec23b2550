//! The party roster.
//!
//! Owns every player character sheet and the currently selected character.

use crate::world::{
    Character, CharacterId, CharacterStats, Exploration, Experience, Inventory, Item, Quests,
    MAX_LEVEL, MIN_LEVEL,
};
use thiserror::Error;

/// Errors from roster operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Level must be between 1 and 20, got {0}")]
    InvalidLevel(u8),
}

/// Input for [`CharacterStore::add_character`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharacter {
    pub name: String,
    pub race: String,
    pub class: String,
    pub level: u8,
    pub items: Vec<Item>,
}

impl NewCharacter {
    pub fn new(
        name: impl Into<String>,
        race: impl Into<String>,
        class: impl Into<String>,
        level: u8,
    ) -> Self {
        Self {
            name: name.into(),
            race: race.into(),
            class: class.into(),
            level,
            items: Vec::new(),
        }
    }

    /// Starting inventory.
    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    fn validate(&self) -> Result<(), CharacterError> {
        if self.name.trim().is_empty() {
            return Err(CharacterError::MissingField("name"));
        }
        if self.race.trim().is_empty() {
            return Err(CharacterError::MissingField("race"));
        }
        if self.class.trim().is_empty() {
            return Err(CharacterError::MissingField("class"));
        }
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.level) {
            return Err(CharacterError::InvalidLevel(self.level));
        }
        Ok(())
    }
}

/// Partial update of a character sheet. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterUpdate {
    pub name: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub stats: Option<CharacterStats>,
    pub inventory: Option<Inventory>,
    pub quests: Option<Quests>,
    pub exploration: Option<Exploration>,
    pub experience: Option<Experience>,
    pub sessions_played: Option<u32>,
}

impl CharacterUpdate {
    fn apply(self, character: &mut Character) {
        if let Some(name) = self.name {
            character.name = name;
        }
        if let Some(race) = self.race {
            character.race = race;
        }
        if let Some(class) = self.class {
            character.class = class;
        }
        if let Some(stats) = self.stats {
            character.stats = stats;
        }
        if let Some(inventory) = self.inventory {
            character.inventory = inventory;
        }
        if let Some(quests) = self.quests {
            character.quests = quests;
        }
        if let Some(exploration) = self.exploration {
            character.exploration = exploration;
        }
        if let Some(experience) = self.experience {
            character.experience = experience;
        }
        if let Some(sessions) = self.sessions_played {
            character.sessions_played = sessions;
        }
    }
}

/// Party-wide numbers for the group panel.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub name: String,
    pub members: usize,
    pub total_levels: u32,
    pub total_hit_points: i32,
    /// Rounded mean armor class, 0 for an empty party.
    pub average_armor_class: i32,
}

/// All player characters, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CharacterStore {
    characters: Vec<Character>,
    selected: Option<CharacterId>,
}

impl CharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a new character. Returns its id.
    pub fn add_character(&mut self, input: NewCharacter) -> Result<CharacterId, CharacterError> {
        input.validate()?;

        let mut character = Character::new(
            input.name.trim(),
            input.race.trim(),
            input.class.trim(),
            input.level,
        );
        character.inventory.items = input.items;
        character.inventory.sync_equipped_count();

        let id = character.id;
        tracing::info!(character = %id, name = %character.name, "character added");
        self.characters.push(character);
        Ok(id)
    }

    pub fn list_characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn get_character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    /// Apply a partial update. Returns false for an unknown id.
    pub fn update_character(&mut self, id: CharacterId, update: CharacterUpdate) -> bool {
        match self.get_character_mut(id) {
            Some(character) => {
                update.apply(character);
                true
            }
            None => false,
        }
    }

    /// Set current hit points, clamped to `0..=max`.
    pub fn set_hit_points(&mut self, id: CharacterId, hit_points: i32) -> bool {
        match self.get_character_mut(id) {
            Some(character) => {
                character.stats.hit_points.set(hit_points);
                true
            }
            None => false,
        }
    }

    /// Remove a character. Clears the selection if it pointed at them.
    pub fn remove_character(&mut self, id: CharacterId) -> Option<Character> {
        let idx = self.characters.iter().position(|c| c.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        let removed = self.characters.remove(idx);
        tracing::info!(character = %id, name = %removed.name, "character removed");
        Some(removed)
    }

    /// Select a character. Unknown ids are ignored.
    pub fn select(&mut self, id: CharacterId) -> bool {
        if self.get_character(id).is_some() {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn selected_id(&self) -> Option<CharacterId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Character> {
        self.selected.and_then(|id| self.get_character(id))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Totals for the group panel.
    pub fn group_summary(&self, name: &str) -> GroupSummary {
        let members = self.characters.len();
        let total_levels = self.characters.iter().map(|c| u32::from(c.level)).sum();
        let total_hit_points = self
            .characters
            .iter()
            .map(|c| c.stats.hit_points.current)
            .sum();
        let average_armor_class = if members == 0 {
            0
        } else {
            let total: i32 = self.characters.iter().map(|c| c.stats.armor_class).sum();
            (total as f32 / members as f32).round() as i32
        };

        GroupSummary {
            name: name.to_string(),
            members,
            total_levels,
            total_hit_points,
            average_armor_class,
        }
    }
}
