//! The layout: placed items keyed by their body-aligned anchor.
//!
//! Keys are the grid coordinate of each item's first Body cell in
//! row-major order. Body cells never overlap in a valid layout, so the
//! key is unique per item. A `BTreeMap` keeps iteration order
//! deterministic, which the engine relies on for reproducible logs as
//! well as totals.

use std::collections::BTreeMap;

use crate::item::{ItemTemplate, PlacedItem};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    items: BTreeMap<(i32, i32), PlacedItem>,
}

impl Layout {
    pub fn new() -> Self {
        Layout::default()
    }

    /// Insert an item under its anchor key. Returns the key, or `None`
    /// (without inserting) for a body-less shape.
    pub fn insert(&mut self, item: PlacedItem) -> Option<(i32, i32)> {
        let key = item.anchor_key()?;
        self.items.insert(key, item);
        Some(key)
    }

    pub fn remove(&mut self, key: &(i32, i32)) -> Option<PlacedItem> {
        self.items.remove(key)
    }

    pub fn get(&self, key: &(i32, i32)) -> Option<&PlacedItem> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &(i32, i32)) -> Option<&mut PlacedItem> {
        self.items.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.items.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), &PlacedItem)> {
        self.items.iter().map(|(k, v)| (*k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &PlacedItem> {
        self.items.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut PlacedItem> {
        self.items.values_mut()
    }

    /// Item counts by name, for manifest-preservation checks.
    pub fn manifest(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for item in self.items.values() {
            *counts.entry(item.name.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Sum of item scores after a run. Callers wanting the grand total
    /// should add the run report's neutral pool.
    pub fn item_score_total(&self) -> f64 {
        self.items.values().map(|item| item.final_score).sum()
    }
}

/// The manifest a solver must preserve: counts by template name.
pub fn required_manifest(templates: &[ItemTemplate]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for template in templates {
        *counts.entry(template.name.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_template(name: &str, shape: Vec<Vec<u8>>) -> ItemTemplate {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "rarity": "COMMON",
            "item_class": "NEUTRAL",
            "shape": shape,
            "base_score": 1.0
        }))
        .unwrap()
    }

    #[test]
    fn insert_keys_by_body_anchor() {
        let mut layout = Layout::new();
        // First Body cell is at (c=1, r=0) of the matrix.
        let t = make_template("Hook", vec![vec![0, 1], vec![1, 1]]);
        let key = layout
            .insert(PlacedItem::from_template(&t, 2, 3))
            .unwrap();
        assert_eq!(key, (3, 3));
        assert_eq!(layout.get(&key).unwrap().name, "Hook");
    }

    #[test]
    fn bodyless_item_is_rejected() {
        let mut layout = Layout::new();
        let t = make_template("Ghost", vec![vec![2]]);
        assert_eq!(layout.insert(PlacedItem::from_template(&t, 0, 0)), None);
        assert!(layout.is_empty());
    }

    #[test]
    fn iteration_is_key_ordered() {
        let mut layout = Layout::new();
        let t = make_template("Dot", vec![vec![1]]);
        layout.insert(PlacedItem::from_template(&t, 4, 0));
        layout.insert(PlacedItem::from_template(&t, 0, 0));
        layout.insert(PlacedItem::from_template(&t, 2, 1));
        let keys: Vec<_> = layout.keys().collect();
        assert_eq!(keys, vec![(0, 0), (2, 1), (4, 0)]);
    }

    #[test]
    fn manifest_counts_by_name() {
        let mut layout = Layout::new();
        let dot = make_template("Dot", vec![vec![1]]);
        let bar = make_template("Bar", vec![vec![1, 1]]);
        layout.insert(PlacedItem::from_template(&dot, 0, 0));
        layout.insert(PlacedItem::from_template(&dot, 1, 1));
        layout.insert(PlacedItem::from_template(&bar, 3, 0));
        let manifest = layout.manifest();
        assert_eq!(manifest.get("Dot"), Some(&2));
        assert_eq!(manifest.get("Bar"), Some(&1));
        assert_eq!(
            manifest,
            required_manifest(&[dot.clone(), bar, dot])
        );
    }
}
