use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const CHALLENGE_SCHEMA_VERSION: u8 = 1;
pub const LEVEL_SCHEMA_VERSION: u8 = 1;

/// Identity of the sentinel entry level. Challenges created without an
/// explicit level land here.
pub const FREE_LEVEL: &str = "Free";

/// Normalized lookup key shared by the registry and the store. Identities are
/// case-insensitive; original casing is preserved on the records for display.
pub(crate) fn identity_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeType {
    /// Hand over a set of required items from the player's inventory.
    Inventory,
    /// Check the blocks and entities surrounding the player on their island.
    Island,
}

/// A quantity of one item kind. `kind` is the host game's raw type token
/// (e.g. `COBBLESTONE`); the registry never interprets it beyond display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemStack {
    pub kind: String,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(kind: &str, amount: u32) -> Self {
        Self {
            kind: kind.to_string(),
            amount,
        }
    }

    /// Placeholder stacks pad out snapshot slots and never become
    /// requirements.
    pub fn is_placeholder(&self) -> bool {
        self.amount == 0 || self.kind.is_empty() || self.kind.eq_ignore_ascii_case("air")
    }
}

/// Read-only capture of an item container handed in by the host game. The
/// title doubles as the identity of the challenge built from it.
#[derive(Debug, Clone, Default)]
pub struct ItemSnapshot {
    pub title: String,
    pub slots: Vec<Option<ItemStack>>,
}

impl ItemSnapshot {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            slots: Vec::new(),
        }
    }

    pub fn with_slot(mut self, stack: ItemStack) -> Self {
        self.slots.push(Some(stack));
        self
    }

    pub fn with_empty_slot(mut self) -> Self {
        self.slots.push(None);
        self
    }

    /// The stacks that become challenge requirements: occupied slots minus
    /// placeholders, in slot order.
    pub fn required_items(&self) -> Vec<ItemStack> {
        self.slots
            .iter()
            .flatten()
            .filter(|stack| !stack.is_placeholder())
            .cloned()
            .collect()
    }
}

/// Block and entity counts collected around a builder, as reported by the
/// host game's world inspection. The name doubles as the challenge identity.
#[derive(Debug, Clone, Default)]
pub struct SurroundSelection {
    pub name: String,
    pub required_blocks: BTreeMap<String, u32>,
    pub required_entities: BTreeMap<String, u32>,
}

impl SurroundSelection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            required_blocks: BTreeMap::new(),
            required_entities: BTreeMap::new(),
        }
    }

    pub fn with_block(mut self, kind: &str, count: u32) -> Self {
        self.required_blocks.insert(kind.to_string(), count);
        self
    }

    pub fn with_entity(mut self, kind: &str, count: u32) -> Self {
        self.required_entities.insert(kind.to_string(), count);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.required_blocks.is_empty() && self.required_entities.is_empty()
    }
}

/// Primary storage of the actor a consumed snapshot is handed back to.
/// Stacks merge by kind; a new kind takes a fresh slot while capacity allows,
/// anything past that lands in `dropped` (the host drops those at the
/// actor's feet).
#[derive(Debug, Clone)]
pub struct OwnerInventory {
    pub stacks: Vec<ItemStack>,
    pub max_stacks: usize,
    pub dropped: Vec<ItemStack>,
}

impl OwnerInventory {
    pub fn new(max_stacks: usize) -> Self {
        Self {
            stacks: Vec::new(),
            max_stacks,
            dropped: Vec::new(),
        }
    }

    pub fn accept(&mut self, stack: ItemStack) {
        if let Some(existing) = self
            .stacks
            .iter_mut()
            .find(|s| s.kind.eq_ignore_ascii_case(&stack.kind))
        {
            existing.amount += stack.amount;
            return;
        }
        if self.stacks.len() < self.max_stacks {
            self.stacks.push(stack);
        } else {
            self.dropped.push(stack);
        }
    }

    pub fn quantity_of(&self, kind: &str) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.kind.eq_ignore_ascii_case(kind))
            .map(|s| s.amount)
            .sum()
    }
}

/// A single completable task record. Identity is the case-insensitive
/// `unique_id`; a newer record with the same identity replaces the older one
/// wherever it is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub unique_id: String,
    /// Identity of the owning level (a resolvable relation, not a pointer).
    pub level: String,
    pub challenge_type: ChallengeType,
    pub friendly_name: String,
    #[serde(default)]
    pub description: Vec<String>,
    /// Display token for panels; the registry never interprets it.
    #[serde(default)]
    pub icon: String,
    /// Whether the challenge is live and visible to players.
    pub deployed: bool,
    /// Whether completing the challenge consumes the required items.
    pub take_items: bool,
    #[serde(default)]
    pub required_items: Vec<ItemStack>,
    #[serde(default)]
    pub required_blocks: BTreeMap<String, u32>,
    #[serde(default)]
    pub required_entities: BTreeMap<String, u32>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl Challenge {
    pub fn new(unique_id: &str, challenge_type: ChallengeType) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            level: FREE_LEVEL.to_string(),
            challenge_type,
            friendly_name: unique_id.to_string(),
            description: Vec::new(),
            icon: String::new(),
            deployed: false,
            take_items: false,
            required_items: Vec::new(),
            required_blocks: BTreeMap::new(),
            required_entities: BTreeMap::new(),
            created_at: Utc::now(),
            schema_version: CHALLENGE_SCHEMA_VERSION,
        }
    }

    pub fn with_friendly_name(mut self, name: &str) -> Self {
        self.friendly_name = name.to_string();
        self
    }

    pub fn with_level(mut self, level: &str) -> Self {
        self.level = level.to_string();
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn with_description(mut self, lines: Vec<String>) -> Self {
        self.description = lines;
        self
    }

    pub fn with_deployed(mut self, deployed: bool) -> Self {
        self.deployed = deployed;
        self
    }

    pub fn with_take_items(mut self, take_items: bool) -> Self {
        self.take_items = take_items;
        self
    }

    pub fn with_required_items(mut self, items: Vec<ItemStack>) -> Self {
        self.required_items = items;
        self
    }

    pub fn with_required_blocks(mut self, blocks: BTreeMap<String, u32>) -> Self {
        self.required_blocks = blocks;
        self
    }

    pub fn with_required_entities(mut self, entities: BTreeMap<String, u32>) -> Self {
        self.required_entities = entities;
        self
    }

    pub fn identity_key(&self) -> String {
        identity_key(&self.unique_id)
    }

    /// Case-insensitive identity comparison.
    pub fn matches(&self, name: &str) -> bool {
        self.unique_id.eq_ignore_ascii_case(name)
    }
}

/// An ordered tier grouping challenges. The identity is also the ordering
/// key; `"Free"` is the designated entry level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeLevel {
    pub unique_id: String,
    pub friendly_name: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl ChallengeLevel {
    pub fn new(unique_id: &str) -> Self {
        Self {
            unique_id: unique_id.to_string(),
            friendly_name: unique_id.to_string(),
            created_at: Utc::now(),
            schema_version: LEVEL_SCHEMA_VERSION,
        }
    }

    pub fn free() -> Self {
        Self::new(FREE_LEVEL)
    }

    pub fn with_friendly_name(mut self, name: &str) -> Self {
        self.friendly_name = name.to_string();
        self
    }

    pub fn is_free(&self) -> bool {
        self.unique_id.eq_ignore_ascii_case(FREE_LEVEL)
    }

    pub fn identity_key(&self) -> String {
        identity_key(&self.unique_id)
    }

    /// Case-insensitive identity comparison.
    pub fn matches(&self, name: &str) -> bool {
        self.unique_id.eq_ignore_ascii_case(name)
    }
}

// Levels are equal and ordered by identity alone, so a reloaded record with a
// fresher timestamp still keys the same registry entry.
impl PartialEq for ChallengeLevel {
    fn eq(&self, other: &Self) -> bool {
        self.identity_key() == other.identity_key()
    }
}

impl Eq for ChallengeLevel {}

impl Ord for ChallengeLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity_key().cmp(&other.identity_key())
    }
}

impl PartialOrd for ChallengeLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
