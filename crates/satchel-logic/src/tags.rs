//! Tag vocabularies: rarity, item class, element, and item type.
//!
//! These are opaque to the engine. Conditions name them as predicate
//! operands and the engine only ever tests membership; no tag carries
//! behavior of its own.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Godly,
    Unique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemClass {
    Neutral,
    Ranger,
    Reaper,
    Berserker,
    Pyromancer,
    Mage,
    Adventurer,
}

/// Elements carried by items, granted transiently by stars, and matched by
/// `requires_element` predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Element {
    Melee,
    Ranged,
    Effect,
    Nature,
    Magic,
    Holy,
    Dark,
    Vampiric,
    Fire,
    Ice,
    Treasure,
    Musical,
}

impl Element {
    pub const ALL: [Element; 12] = [
        Element::Melee,
        Element::Ranged,
        Element::Effect,
        Element::Nature,
        Element::Magic,
        Element::Holy,
        Element::Dark,
        Element::Vampiric,
        Element::Fire,
        Element::Ice,
        Element::Treasure,
        Element::Musical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Melee => "MELEE",
            Element::Ranged => "RANGED",
            Element::Effect => "EFFECT",
            Element::Nature => "NATURE",
            Element::Magic => "MAGIC",
            Element::Holy => "HOLY",
            Element::Dark => "DARK",
            Element::Vampiric => "VAMPIRIC",
            Element::Fire => "FIRE",
            Element::Ice => "ICE",
            Element::Treasure => "TREASURE",
            Element::Musical => "MUSICAL",
        }
    }

    /// Look up an element by its catalog name. `None` for unrecognized
    /// names, which conditions treat as never matching.
    pub fn from_name(name: &str) -> Option<Element> {
        Element::ALL.iter().copied().find(|e| e.as_str() == name)
    }
}

/// Item types ("WEAPON", "SHIELD", ...) matched by `requires_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Weapon,
    Shield,
    Accessory,
    Potion,
    Spell,
    Food,
    Book,
    Pet,
    Helmet,
}

impl ItemKind {
    pub const ALL: [ItemKind; 9] = [
        ItemKind::Weapon,
        ItemKind::Shield,
        ItemKind::Accessory,
        ItemKind::Potion,
        ItemKind::Spell,
        ItemKind::Food,
        ItemKind::Book,
        ItemKind::Pet,
        ItemKind::Helmet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "WEAPON",
            ItemKind::Shield => "SHIELD",
            ItemKind::Accessory => "ACCESSORY",
            ItemKind::Potion => "POTION",
            ItemKind::Spell => "SPELL",
            ItemKind::Food => "FOOD",
            ItemKind::Book => "BOOK",
            ItemKind::Pet => "PET",
            ItemKind::Helmet => "HELMET",
        }
    }

    pub fn from_name(name: &str) -> Option<ItemKind> {
        ItemKind::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}
