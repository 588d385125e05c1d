//! Catalog templates and placed-item state.
//!
//! [`ItemTemplate`] is the immutable catalog record. Placing an item takes
//! a deep clone into a [`PlacedItem`], which adds the grid anchor, the
//! current rotation, and the per-run calculation state the engine resets
//! at the start of every run.

use serde::{Deserialize, Serialize};

use crate::effect::{EffectDef, StarRules};
use crate::geometry::{ShapeMatrix, StarCounts, StarKind};
use crate::tags::{Element, ItemClass, ItemKind, Rarity};

/// One catalog entry. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    pub rarity: Rarity,
    #[serde(rename = "item_class")]
    pub class: ItemClass,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(rename = "types", default)]
    pub kinds: Vec<ItemKind>,
    pub shape: ShapeMatrix,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default)]
    pub star_effects: StarRules,
    #[serde(default)]
    pub passive_effects: Vec<EffectDef>,
    #[serde(default)]
    pub has_cooldown: bool,
    #[serde(default)]
    pub is_start_of_battle: bool,
}

/// An item on the grid. Owns a full copy of its template so rotation and
/// run state never touch the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub name: String,
    pub rarity: Rarity,
    pub class: ItemClass,
    pub elements: Vec<Element>,
    pub kinds: Vec<ItemKind>,
    pub shape: ShapeMatrix,
    pub base_score: f64,
    pub star_effects: StarRules,
    pub passive_effects: Vec<EffectDef>,
    pub has_cooldown: bool,
    pub is_start_of_battle: bool,

    /// Grid position of the shape matrix's top-left corner. May be
    /// negative as long as every Body cell stays in bounds.
    pub gx: i32,
    pub gy: i32,

    // Per-run calculation state, cleared by `reset_run_state`.
    pub final_score: f64,
    pub modifiers: Vec<String>,
    pub activated: StarCounts,
    pub occupying_stars: Vec<(StarKind, String)>,
    pub granted_elements: Vec<Element>,
}

impl PlacedItem {
    pub fn from_template(template: &ItemTemplate, gx: i32, gy: i32) -> Self {
        PlacedItem {
            name: template.name.clone(),
            rarity: template.rarity,
            class: template.class,
            elements: template.elements.clone(),
            kinds: template.kinds.clone(),
            shape: template.shape.clone(),
            base_score: template.base_score,
            star_effects: template.star_effects.clone(),
            passive_effects: template.passive_effects.clone(),
            has_cooldown: template.has_cooldown,
            is_start_of_battle: template.is_start_of_battle,
            gx,
            gy,
            final_score: 0.0,
            modifiers: Vec::new(),
            activated: StarCounts::default(),
            occupying_stars: Vec::new(),
            granted_elements: Vec::new(),
        }
    }

    /// Rotate the shape a quarter turn clockwise in place.
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated();
    }

    /// Membership test against innate plus granted elements, by catalog
    /// name. Unrecognized names match nothing.
    pub fn has_element(&self, name: &str) -> bool {
        self.elements.iter().any(|e| e.as_str() == name)
            || self.granted_elements.iter().any(|e| e.as_str() == name)
    }

    pub fn has_kind(&self, name: &str) -> bool {
        self.kinds.iter().any(|k| k.as_str() == name)
    }

    /// Add a transient element for this run. Idempotent.
    pub fn grant_element(&mut self, element: Element) {
        if !self.granted_elements.contains(&element) {
            self.granted_elements.push(element);
        }
    }

    pub fn reset_run_state(&mut self) {
        self.final_score = self.base_score;
        self.modifiers.clear();
        self.activated.clear();
        self.occupying_stars.clear();
        self.granted_elements.clear();
    }

    /// Grid coordinate of the first Body cell, the key this item sorts
    /// under in a layout. `None` for a body-less shape.
    pub fn anchor_key(&self) -> Option<(i32, i32)> {
        let (c, r) = self.shape.body_anchor()?;
        Some((self.gx + c, self.gy + r))
    }
}
