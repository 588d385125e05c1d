//! Conditional predicates gating effect application.
//!
//! A [`ConditionSet`] holds up to seven predicates. Each predicate that is
//! present contributes one boolean to the check list; the list is then
//! folded under the effect's [`Logic`] (AND by default). An empty check
//! list passes. With no target item every present target predicate fails,
//! so only `requires_empty` can pass against an empty cell.
//!
//! Accepted element/type/name sets stay raw catalog strings. An
//! unrecognized name never matches anything; the catalog validation sweep
//! warns about it once at load time.

use serde::{Deserialize, Deserializer, Serialize};

use crate::item::PlacedItem;

/// How a condition set's individual checks are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logic {
    #[default]
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

/// Accepts both `"MELEE"` and `["MELEE", "FIRE"]` catalog spellings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(name)) => Some(vec![name]),
        Some(OneOrMany::Many(names)) => Some(names),
    })
}

/// The predicates an effect can gate on. A flag set to `false` or a set
/// left out contributes no check at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionSet {
    /// Passes only when the probed cell holds no item.
    pub requires_empty: bool,
    /// Passes when source and target names differ.
    pub must_be_different: bool,
    /// Passes when the target is flagged `has_cooldown`.
    pub requires_cooldown: bool,
    /// Passes when the target is flagged `is_start_of_battle`.
    pub requires_start_of_battle: bool,
    /// Passes when the target carries any listed element, innate or granted.
    #[serde(deserialize_with = "one_or_many")]
    pub requires_element: Option<Vec<String>>,
    /// Passes when the target has any listed item type.
    #[serde(deserialize_with = "one_or_many")]
    pub requires_type: Option<Vec<String>>,
    /// Passes when the target's name is in the list.
    #[serde(deserialize_with = "one_or_many")]
    pub requires_name: Option<Vec<String>>,
}

impl ConditionSet {
    pub fn is_empty(&self) -> bool {
        !self.requires_empty
            && !self.must_be_different
            && !self.requires_cooldown
            && !self.requires_start_of_battle
            && self.requires_element.is_none()
            && self.requires_type.is_none()
            && self.requires_name.is_none()
    }

    /// Evaluate against a target cell. `target` is `None` for an empty cell.
    pub fn evaluate(&self, source_name: &str, target: Option<&PlacedItem>, logic: Logic) -> bool {
        let mut checks: Vec<bool> = Vec::new();

        if self.requires_empty {
            checks.push(target.is_none());
        }

        match target {
            Some(item) => {
                if let Some(names) = &self.requires_element {
                    checks.push(names.iter().any(|name| item.has_element(name)));
                }
                if let Some(names) = &self.requires_type {
                    checks.push(names.iter().any(|name| item.has_kind(name)));
                }
                if let Some(names) = &self.requires_name {
                    checks.push(names.iter().any(|name| *name == item.name));
                }
                if self.must_be_different {
                    checks.push(source_name != item.name);
                }
                if self.requires_cooldown {
                    checks.push(item.has_cooldown);
                }
                if self.requires_start_of_battle {
                    checks.push(item.is_start_of_battle);
                }
            }
            None => {
                // Every present target predicate fails against an empty cell.
                let present = [
                    self.requires_element.is_some(),
                    self.requires_type.is_some(),
                    self.requires_name.is_some(),
                    self.must_be_different,
                    self.requires_cooldown,
                    self.requires_start_of_battle,
                ];
                checks.extend(present.into_iter().filter(|p| *p).map(|_| false));
            }
        }

        if checks.is_empty() {
            return true;
        }
        match logic {
            Logic::Or => checks.iter().any(|&c| c),
            Logic::And => checks.iter().all(|&c| c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemTemplate;

    fn make_item(name: &str, elements: &[&str], kinds: &[&str]) -> PlacedItem {
        let template: ItemTemplate = serde_json::from_value(serde_json::json!({
            "name": name,
            "rarity": "COMMON",
            "item_class": "NEUTRAL",
            "elements": elements,
            "types": kinds,
            "shape": [[1]],
            "base_score": 1.0
        }))
        .unwrap();
        PlacedItem::from_template(&template, 0, 0)
    }

    fn cond(json: serde_json::Value) -> ConditionSet {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn empty_condition_always_passes() {
        let c = ConditionSet::default();
        let item = make_item("Apple", &[], &["FOOD"]);
        assert!(c.evaluate("Apple", Some(&item), Logic::And));
        assert!(c.evaluate("Apple", None, Logic::And));
    }

    #[test]
    fn requires_empty_checks_occupancy() {
        let c = cond(serde_json::json!({ "requires_empty": true }));
        let item = make_item("Apple", &[], &[]);
        assert!(c.evaluate("Knife", None, Logic::And));
        assert!(!c.evaluate("Knife", Some(&item), Logic::And));
    }

    #[test]
    fn element_membership_accepts_single_or_list() {
        let single = cond(serde_json::json!({ "requires_element": "FIRE" }));
        let list = cond(serde_json::json!({ "requires_element": ["ICE", "FIRE"] }));
        let torch = make_item("Torch", &["FIRE"], &[]);
        let rock = make_item("Rock", &[], &[]);
        assert!(single.evaluate("Knife", Some(&torch), Logic::And));
        assert!(list.evaluate("Knife", Some(&torch), Logic::And));
        assert!(!single.evaluate("Knife", Some(&rock), Logic::And));
    }

    #[test]
    fn granted_elements_count_for_membership() {
        let c = cond(serde_json::json!({ "requires_element": "HOLY" }));
        let mut item = make_item("Rock", &[], &[]);
        assert!(!c.evaluate("Idol", Some(&item), Logic::And));
        item.grant_element(crate::tags::Element::Holy);
        assert!(c.evaluate("Idol", Some(&item), Logic::And));
    }

    #[test]
    fn unknown_element_name_never_matches() {
        let c = cond(serde_json::json!({ "requires_element": "PLASMA" }));
        let torch = make_item("Torch", &["FIRE"], &[]);
        assert!(!c.evaluate("Knife", Some(&torch), Logic::And));
    }

    #[test]
    fn must_be_different_compares_names() {
        let c = cond(serde_json::json!({ "must_be_different": true }));
        let apple = make_item("Apple", &[], &[]);
        assert!(!c.evaluate("Apple", Some(&apple), Logic::And));
        assert!(c.evaluate("Knife", Some(&apple), Logic::And));
    }

    #[test]
    fn target_predicates_fail_on_empty_cell() {
        let c = cond(serde_json::json!({ "requires_element": "FIRE" }));
        assert!(!c.evaluate("Knife", None, Logic::And));
        let c = cond(serde_json::json!({ "must_be_different": true }));
        assert!(!c.evaluate("Knife", None, Logic::And));
    }

    #[test]
    fn or_logic_passes_on_any_check() {
        let c = cond(serde_json::json!({
            "requires_element": "FIRE",
            "requires_type": "FOOD"
        }));
        let apple = make_item("Apple", &[], &["FOOD"]);
        assert!(!c.evaluate("Knife", Some(&apple), Logic::And));
        assert!(c.evaluate("Knife", Some(&apple), Logic::Or));
    }

    #[test]
    fn name_and_flag_predicates() {
        let c = cond(serde_json::json!({ "requires_name": ["Apple", "Pear"] }));
        let apple = make_item("Apple", &[], &[]);
        let rock = make_item("Rock", &[], &[]);
        assert!(c.evaluate("Knife", Some(&apple), Logic::And));
        assert!(!c.evaluate("Knife", Some(&rock), Logic::And));

        let c = cond(serde_json::json!({ "requires_cooldown": true }));
        assert!(!c.evaluate("Knife", Some(&rock), Logic::And));
    }
}
