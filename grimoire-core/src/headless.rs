//! Headless interface for programmatic use.
//!
//! A line-oriented protocol over a [`Grimoire`], designed for:
//! - Automated testing of whole party scenarios
//! - Scripted game-master sessions
//! - Coding agents managing the party
//!
//! Every command starts with `#`. Parsing ([`Command::parse`]) is pure;
//! [`HeadlessSession::execute`] applies a command and returns the lines to
//! print.
//!
//! # Example
//!
//! ```ignore
//! use grimoire_core::headless::{Command, HeadlessSession};
//! use grimoire_core::{Grimoire, GrimoireConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut session = HeadlessSession::new(Grimoire::new(GrimoireConfig::from_env()));
//!     for line in session.handle_line("#add Aria Elf Ranger 3").await {
//!         println!("{line}");
//!     }
//! }
//! ```

use crate::character::NewCharacter;
use crate::equipment::EquipmentSlot;
use crate::inventory::Category;
use crate::secret_items::{is_valid_code, normalize_code, NewSecretItem};
use crate::session::Grimoire;
use crate::world::{CharacterId, ItemId, ItemSubtype, ItemType, Rarity, SecretItemId, StatKey};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Why a line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Commands start with '#'")]
    NotACommand,

    #[error("Unknown command: #{0} (try #help)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },
}

fn invalid(what: &'static str, value: &str) -> ParseError {
    ParseError::InvalidArgument {
        what,
        value: value.to_string(),
    }
}

/// How `#select` names a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterRef {
    /// 1-based position in the roster.
    Index(usize),
    Id(CharacterId),
}

/// How `#delete` and `#image` name a secret item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretRef {
    Id(SecretItemId),
    Code(String),
}

impl SecretRef {
    fn parse(raw: &str) -> Result<Self, ParseError> {
        if let Ok(uuid) = Uuid::parse_str(raw) {
            return Ok(SecretRef::Id(SecretItemId(uuid)));
        }
        let code = normalize_code(raw);
        if is_valid_code(&code) {
            Ok(SecretRef::Code(code))
        } else {
            Err(invalid("secret item", raw))
        }
    }
}

/// A parsed headless command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Characters,
    Add {
        name: String,
        race: String,
        class: String,
        level: u8,
    },
    Select(CharacterRef),
    Hp(i32),
    Inventory(Category),
    Equip {
        item: ItemId,
        slot: Option<EquipmentSlot>,
    },
    Unequip(EquipmentSlot),
    Toggle(ItemId),
    Bonuses,
    Secret(NewSecretItem),
    Secrets,
    Delete(SecretRef),
    Redeem(String),
    Image {
        secret: SecretRef,
        path: PathBuf,
    },
    Group,
}

pub const HELP: &[&str] = &[
    "Commands:",
    "  #characters                         - List the party",
    "  #add <name> <race> <class> <level>  - Add a character",
    "  #select <n|id>                      - Select a character",
    "  #hp <value>                         - Set the selected character's HP",
    "  #inventory [category]               - Show the inventory",
    "  #equip <item-id> [slot]             - Equip an item",
    "  #unequip <slot>                     - Empty a slot",
    "  #toggle <item-id>                   - Equip or unequip an item",
    "  #bonuses                            - Show equipped bonuses",
    "  #secret <name> <type> <rarity> [code] [key=value...]",
    "                                      - Create a secret item; keys: subtype,",
    "                                        desc, weight, value, stat.<stat>",
    "  #secrets                            - List secret items",
    "  #delete <id|code>                   - Delete a secret item",
    "  #redeem <code>                      - Redeem a code",
    "  #image <id|code> <path>             - Attach artwork to a secret item",
    "  #group                              - Show the party summary",
    "  #help                               - Show this help",
    "  #quit                               - Exit",
];

impl Command {
    /// Parse one input line.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let rest = line.trim().strip_prefix('#').ok_or(ParseError::NotACommand)?;
        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((&head, args)) = parts.split_first() else {
            return Err(ParseError::Unknown(String::new()));
        };

        match head.to_lowercase().as_str() {
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "characters" | "party" => Ok(Command::Characters),
            "add" => parse_add(args),
            "select" => match args {
                [target] => parse_character_ref(target).map(Command::Select),
                _ => Err(ParseError::Usage("#select <n|id>")),
            },
            "hp" => match args {
                [value] => value
                    .parse()
                    .map(Command::Hp)
                    .map_err(|_| invalid("hit points", value)),
                _ => Err(ParseError::Usage("#hp <value>")),
            },
            "inventory" | "inv" => match args {
                [] => Ok(Command::Inventory(Category::All)),
                [category] => Category::from_name(category)
                    .map(Command::Inventory)
                    .ok_or_else(|| invalid("category", category)),
                _ => Err(ParseError::Usage("#inventory [category]")),
            },
            "equip" => match args {
                [item] => Ok(Command::Equip {
                    item: ItemId::from(*item),
                    slot: None,
                }),
                [item, slot] => Ok(Command::Equip {
                    item: ItemId::from(*item),
                    slot: Some(parse_slot(slot)?),
                }),
                _ => Err(ParseError::Usage("#equip <item-id> [slot]")),
            },
            "unequip" => match args {
                [slot] => parse_slot(slot).map(Command::Unequip),
                _ => Err(ParseError::Usage("#unequip <slot>")),
            },
            "toggle" => match args {
                [item] => Ok(Command::Toggle(ItemId::from(*item))),
                _ => Err(ParseError::Usage("#toggle <item-id>")),
            },
            "bonuses" => Ok(Command::Bonuses),
            "secret" => parse_secret(args),
            "secrets" => Ok(Command::Secrets),
            "delete" => match args {
                [target] => SecretRef::parse(target).map(Command::Delete),
                _ => Err(ParseError::Usage("#delete <id|code>")),
            },
            "redeem" => match args {
                [code] => Ok(Command::Redeem(code.to_string())),
                _ => Err(ParseError::Usage("#redeem <code>")),
            },
            "image" => match args {
                [target, path @ ..] if !path.is_empty() => Ok(Command::Image {
                    secret: SecretRef::parse(target)?,
                    path: PathBuf::from(path.join(" ")),
                }),
                _ => Err(ParseError::Usage("#image <id|code> <path>")),
            },
            "group" => Ok(Command::Group),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }
}

fn parse_slot(raw: &str) -> Result<EquipmentSlot, ParseError> {
    EquipmentSlot::from_name(raw).ok_or_else(|| invalid("slot", raw))
}

fn parse_character_ref(raw: &str) -> Result<CharacterRef, ParseError> {
    if let Ok(n) = raw.parse::<usize>() {
        return if n == 0 {
            Err(invalid("character number", raw))
        } else {
            Ok(CharacterRef::Index(n))
        };
    }
    Uuid::parse_str(raw)
        .map(|uuid| CharacterRef::Id(CharacterId(uuid)))
        .map_err(|_| invalid("character", raw))
}

/// `#add <name...> <race> <class> <level>`; the name may contain spaces.
fn parse_add(args: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "#add <name> <race> <class> <level>";
    let [name @ .., race, class, level] = args else {
        return Err(ParseError::Usage(USAGE));
    };
    if name.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    let level = level.parse().map_err(|_| invalid("level", level))?;
    Ok(Command::Add {
        name: name.join(" "),
        race: race.to_string(),
        class: class.to_string(),
        level,
    })
}

/// `#secret <name...> <type> <rarity> [code] [key=value...]`; the name may
/// contain spaces. Options start at the first `key=value` token, and a
/// `desc=` value runs on until the next option.
fn parse_secret(args: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "#secret <name> <type> <rarity> [code] [key=value...]";
    let split = args.iter().position(|a| a.contains('=')).unwrap_or(args.len());
    let (args, options) = args.split_at(split);
    let (args, code) = match args.split_last() {
        Some((last, rest)) if is_valid_code(&normalize_code(last)) => {
            (rest, Some(normalize_code(last)))
        }
        _ => (args, None),
    };
    let [name @ .., item_type, rarity] = args else {
        return Err(ParseError::Usage(USAGE));
    };
    if name.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    let item_type = ItemType::from_name(item_type).ok_or_else(|| invalid("item type", item_type))?;
    let rarity = Rarity::from_name(rarity).ok_or_else(|| invalid("rarity", rarity))?;

    let mut input = NewSecretItem::new(name.join(" "), item_type).with_rarity(rarity);
    if let Some(code) = code {
        input = input.with_code(code);
    }
    for (key, value) in secret_options(options) {
        input = apply_secret_option(input, &key, &value)?;
    }
    Ok(Command::Secret(input))
}

fn secret_options(tokens: &[&str]) -> Vec<(String, String)> {
    let mut options: Vec<(String, String)> = Vec::new();
    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) => options.push((key.to_lowercase(), value.to_string())),
            None => {
                if let Some((_, value)) = options.last_mut() {
                    value.push(' ');
                    value.push_str(token);
                }
            }
        }
    }
    options
}

fn apply_secret_option(
    mut input: NewSecretItem,
    key: &str,
    value: &str,
) -> Result<NewSecretItem, ParseError> {
    let amount = |what: &'static str| {
        value
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| invalid(what, value))
    };

    Ok(match key {
        "subtype" => input.with_subtype(
            ItemSubtype::from_name(value).ok_or_else(|| invalid("subtype", value))?,
        ),
        "desc" | "description" => input.with_description(value),
        "weight" => input.with_weight(amount("weight")?),
        "value" => input.with_value(amount("value")?),
        _ => {
            let stat = key
                .strip_prefix("stat.")
                .and_then(StatKey::from_name)
                .ok_or_else(|| invalid("option", key))?;
            let delta = value.parse::<i32>().map_err(|_| invalid("stat bonus", value))?;
            let stats = input.stats.take().unwrap_or_default().with(stat, delta);
            input.with_stats(stats)
        }
    })
}

/// A grimoire driven by headless commands.
pub struct HeadlessSession {
    grimoire: Grimoire,
}

impl HeadlessSession {
    pub fn new(grimoire: Grimoire) -> Self {
        Self { grimoire }
    }

    pub fn grimoire(&self) -> &Grimoire {
        &self.grimoire
    }

    pub fn grimoire_mut(&mut self) -> &mut Grimoire {
        &mut self.grimoire
    }

    /// Parse and run one line. Parse errors come back as an `[ERROR]` line.
    pub async fn handle_line(&mut self, line: &str) -> Vec<String> {
        match Command::parse(line) {
            Ok(command) => self.execute(command).await,
            Err(e) => vec![format!("[ERROR] {e}")],
        }
    }

    /// Run a command and return the lines to print.
    pub async fn execute(&mut self, command: Command) -> Vec<String> {
        match command {
            Command::Help => HELP.iter().map(|l| l.to_string()).collect(),
            Command::Quit => vec!["Goodbye!".to_string()],
            Command::Characters => self.characters(),
            Command::Add {
                name,
                race,
                class,
                level,
            } => match self
                .grimoire
                .add_character(NewCharacter::new(name, race, class, level))
            {
                Ok(id) => {
                    let number = self.grimoire.characters().len();
                    vec![format!("[ADDED] #{number} {id}")]
                }
                Err(e) => vec![format!("[ERROR] {e}")],
            },
            Command::Select(target) => self.select(target),
            Command::Hp(value) => self.with_selected(|g, id| {
                g.set_hit_points(id, value);
                match g.get_character(id).map(|c| c.stats.hit_points) {
                    Some(hp) => vec![format!("[HP] {}/{}", hp.current, hp.max)],
                    None => vec!["[ERROR] Character not found".to_string()],
                }
            }),
            Command::Inventory(category) => self.inventory(category),
            Command::Equip { item, slot } => self.with_selected(|g, id| {
                match g.equip_item(id, &item, slot) {
                    Ok(slot) => vec![format!("[EQUIPPED] {item} -> {slot}")],
                    Err(e) => vec![format!("[ERROR] {e}")],
                }
            }),
            Command::Unequip(slot) => self.with_selected(|g, id| match g.unequip_slot(id, slot) {
                Some(item) => vec![format!("[UNEQUIPPED] {item} <- {slot}")],
                None => vec![format!("[OK] {slot} is already empty")],
            }),
            Command::Toggle(item) => self.with_selected(|g, id| match g.toggle_equip(id, &item) {
                Ok(Some(slot)) => vec![format!("[EQUIPPED] {item} -> {slot}")],
                Ok(None) => vec![format!("[UNEQUIPPED] {item}")],
                Err(e) => vec![format!("[ERROR] {e}")],
            }),
            Command::Bonuses => self.bonuses(),
            Command::Secret(input) => match self.grimoire.create_secret_item(input) {
                Ok(item) => vec![format!("[SECRET] {} {} {}", item.code, item.id, item.name)],
                Err(e) => vec![format!("[ERROR] {e}")],
            },
            Command::Secrets => self.secrets(),
            Command::Delete(target) => {
                if let Some(id) = self.resolve_secret(&target) {
                    if self.grimoire.delete_secret_item(id) {
                        return vec![format!("[DELETED] {id}")];
                    }
                }
                vec!["[ERROR] Secret item not found".to_string()]
            }
            Command::Redeem(code) => self.with_selected(|g, id| match g.redeem_code(&code, id) {
                Ok(item) => vec![format!("[REDEEMED] {}", item.name)],
                Err(e) => vec![format!("[ERROR] {e}")],
            }),
            Command::Image { secret, path } => {
                let Some(id) = self.resolve_secret(&secret) else {
                    return vec!["[ERROR] Secret item not found".to_string()];
                };
                match self.grimoire.attach_image_file(id, &path).await {
                    Ok(()) => vec![format!("[IMAGE] {} attached to {id}", path.display())],
                    Err(e) => vec![format!("[ERROR] {e}")],
                }
            }
            Command::Group => {
                let summary = self.grimoire.group_summary();
                vec![
                    format!("=== {} ===", summary.name),
                    format!("Members: {}", summary.members),
                    format!("Total levels: {}", summary.total_levels),
                    format!("Total HP: {}", summary.total_hit_points),
                    format!("Average AC: {}", summary.average_armor_class),
                ]
            }
        }
    }

    fn with_selected(
        &mut self,
        f: impl FnOnce(&mut Grimoire, CharacterId) -> Vec<String>,
    ) -> Vec<String> {
        match self.grimoire.characters().selected_id() {
            Some(id) => f(&mut self.grimoire, id),
            None => vec!["[ERROR] No character selected (use #select)".to_string()],
        }
    }

    fn resolve_secret(&self, target: &SecretRef) -> Option<SecretItemId> {
        match target {
            SecretRef::Id(id) => self.grimoire.secrets().get(*id).map(|i| i.id),
            SecretRef::Code(code) => self.grimoire.secrets().find_by_code(code).map(|i| i.id),
        }
    }

    fn characters(&self) -> Vec<String> {
        let store = self.grimoire.characters();
        if store.is_empty() {
            return vec!["No characters yet (use #add)".to_string()];
        }
        let selected = store.selected_id();
        store
            .list_characters()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let marker = if Some(c.id) == selected { "*" } else { " " };
                format!(
                    "{marker}{}. {} ({} {}, level {}) HP {}/{} ({:.0}%) AC {} - {}",
                    i + 1,
                    c.name,
                    c.race,
                    c.class,
                    c.level,
                    c.stats.hit_points.current,
                    c.stats.hit_points.max,
                    c.stats.hit_points.percentage(),
                    c.stats.armor_class,
                    c.id
                )
            })
            .collect()
    }

    fn select(&mut self, target: CharacterRef) -> Vec<String> {
        let id = match target {
            CharacterRef::Index(n) => self
                .grimoire
                .characters()
                .list_characters()
                .get(n - 1)
                .map(|c| c.id),
            CharacterRef::Id(id) => Some(id),
        };
        match id {
            Some(id) if self.grimoire.select_character(id) => {
                let name = self
                    .grimoire
                    .selected_character()
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                vec![format!("[SELECTED] {name}")]
            }
            _ => vec!["[ERROR] Character not found".to_string()],
        }
    }

    fn inventory(&self, category: Category) -> Vec<String> {
        let Some(view) = self
            .grimoire
            .characters()
            .selected_id()
            .and_then(|id| self.grimoire.inventory_view(id))
        else {
            return vec!["[ERROR] No character selected (use #select)".to_string()];
        };

        let character = view.character();
        let mut lines = vec![format!("=== {} ({category}) ===", character.name)];
        let items = view.filter(category);
        if items.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for item in items {
            let mark = if item.equipped { "[E]" } else { "[ ]" };
            let quantity = match item.quantity {
                Some(q) if q > 1 => format!(" x{q}"),
                _ => String::new(),
            };
            lines.push(format!(
                "  {mark} {}{quantity} ({}, {}) - {}",
                item.name, item.item_type, item.rarity, item.id
            ));
        }
        lines.push(format!("Gold: {}", view.gold()));
        lines.push(format!("Total value: {} gp", view.total_value()));
        lines.push(format!(
            "Equipped: {}/{}",
            view.equipped_count(),
            character.inventory.max_equipped
        ));
        let capacity = view.capacity();
        lines.push(format!(
            "Weight: {} (sheet {}/{})",
            view.carried_weight(),
            capacity.current,
            capacity.max
        ));
        lines
    }

    fn bonuses(&self) -> Vec<String> {
        let Some(view) = self
            .grimoire
            .characters()
            .selected_id()
            .and_then(|id| self.grimoire.inventory_view(id))
        else {
            return vec!["[ERROR] No character selected (use #select)".to_string()];
        };

        let mut lines: Vec<String> = view
            .equipped()
            .into_iter()
            .map(|(slot, item)| format!("  {slot}: {}", item.name))
            .collect();
        let bonuses = view.equipped_bonuses();
        if bonuses.is_zero() {
            lines.push("No equipped bonuses".to_string());
        } else {
            lines.extend(
                bonuses
                    .iter()
                    .filter(|(_, v)| *v != 0)
                    .map(|(k, v)| format!("{k}: {v:+}")),
            );
        }
        lines
    }

    fn secrets(&self) -> Vec<String> {
        let registry = self.grimoire.secrets();
        if registry.is_empty() {
            return vec!["No secret items yet (use #secret)".to_string()];
        }
        registry
            .items()
            .iter()
            .map(|item| {
                let status = match item.used_by_character_id {
                    Some(owner) => {
                        let name = self
                            .grimoire
                            .get_character(owner)
                            .map(|c| c.name.as_str())
                            .unwrap_or("unknown");
                        format!("redeemed by {name}")
                    }
                    None => "available".to_string(),
                };
                format!(
                    "  {} {} ({}, {}) [{status}] - {}",
                    item.code, item.name, item.item_type, item.rarity, item.id
                )
            })
            .collect()
    }
}
