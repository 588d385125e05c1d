//! Effect definitions: kinds, values, and per-star rule lists.
//!
//! An effect's value is either a constant, a dynamic record scaling with
//! the source's activation counter for one star kind, or the name of an
//! element (grant effects only). Anything else deserializes to
//! [`EffectValue::Malformed`] rather than failing the whole catalog; a
//! malformed value resolves to `None` and the effect is skipped with a
//! warning at apply time.

use serde::{Deserialize, Serialize};

use crate::condition::{ConditionSet, Logic};
use crate::geometry::{StarCounts, StarKind};
use crate::tags::Element;

/// Everything an effect can do. Grant effects (`AddElementToTarget`) are
/// applied in their own pass; the rest produce score records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    AddScoreToSelf,
    AddScoreToTarget,
    MultiplyScoreOfSelf,
    MultiplyScoreOfTarget,
    AddElementToTarget,
    ContributeToNeutral,
}

impl EffectKind {
    /// Kinds whose outcome lands on the source (or the shared pool), not on
    /// a target item.
    pub fn targets_self(&self) -> bool {
        matches!(
            self,
            EffectKind::AddScoreToSelf
                | EffectKind::MultiplyScoreOfSelf
                | EffectKind::ContributeToNeutral
        )
    }

    pub fn is_additive(&self) -> bool {
        matches!(self, EffectKind::AddScoreToSelf | EffectKind::AddScoreToTarget)
    }

    pub fn is_multiplicative(&self) -> bool {
        matches!(
            self,
            EffectKind::MultiplyScoreOfSelf | EffectKind::MultiplyScoreOfTarget
        )
    }

    /// Everything except the grant kind produces a score record.
    pub fn is_scoring(&self) -> bool {
        *self != EffectKind::AddElementToTarget
    }
}

/// An effect's value as loaded from the catalog.
///
/// Deserialization goes through `serde_json::Value` so that an
/// unrecognizable value degrades to `Malformed` instead of rejecting the
/// catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum EffectValue {
    /// A plain number.
    Constant(f64),
    /// `base + add_per_star * activations(per_star)`, read off the source's
    /// counters after the activation pass has finished.
    Dynamic {
        base: f64,
        per_star: StarKind,
        add_per_star: f64,
    },
    /// An element name, meaningful only to grant effects.
    Element(Element),
    /// Anything the catalog author got wrong. Never resolves.
    Malformed,
}

impl Default for EffectValue {
    fn default() -> Self {
        EffectValue::Constant(0.0)
    }
}

impl From<serde_json::Value> for EffectValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Number(n) => match n.as_f64() {
                Some(v) => EffectValue::Constant(v),
                None => EffectValue::Malformed,
            },
            Value::String(name) => match Element::from_name(&name) {
                Some(element) => EffectValue::Element(element),
                None => EffectValue::Malformed,
            },
            Value::Object(map) => {
                let base = match map.get("base") {
                    None => 0.0,
                    Some(v) => match v.as_f64() {
                        Some(b) => b,
                        None => return EffectValue::Malformed,
                    },
                };
                match map.get("dynamic_bonus") {
                    None => EffectValue::Constant(base),
                    Some(Value::Object(bonus)) => {
                        let per_star = bonus
                            .get("per_activated_star")
                            .and_then(Value::as_str)
                            .and_then(StarKind::from_name);
                        let add = match bonus.get("add") {
                            None => Some(0.0),
                            Some(v) => v.as_f64(),
                        };
                        match (per_star, add) {
                            (Some(per_star), Some(add_per_star)) => EffectValue::Dynamic {
                                base,
                                per_star,
                                add_per_star,
                            },
                            _ => EffectValue::Malformed,
                        }
                    }
                    Some(_) => EffectValue::Malformed,
                }
            }
            _ => EffectValue::Malformed,
        }
    }
}

impl From<EffectValue> for serde_json::Value {
    fn from(value: EffectValue) -> serde_json::Value {
        match value {
            EffectValue::Constant(v) => serde_json::json!(v),
            EffectValue::Element(element) => serde_json::json!(element.as_str()),
            EffectValue::Dynamic {
                base,
                per_star,
                add_per_star,
            } => serde_json::json!({
                "base": base,
                "dynamic_bonus": {
                    "per_activated_star": per_star.as_str(),
                    "add": add_per_star,
                }
            }),
            EffectValue::Malformed => serde_json::Value::Null,
        }
    }
}

impl EffectValue {
    /// Numeric value given the source's final activation counters.
    /// `None` means the effect cannot apply and is skipped.
    pub fn resolve(&self, counts: &StarCounts) -> Option<f64> {
        match self {
            EffectValue::Constant(v) => Some(*v),
            EffectValue::Dynamic {
                base,
                per_star,
                add_per_star,
            } => Some(base + counts.get(*per_star) as f64 * add_per_star),
            EffectValue::Element(_) | EffectValue::Malformed => None,
        }
    }

    /// The element this value grants, for `AddElementToTarget` effects.
    pub fn as_element(&self) -> Option<Element> {
        match self {
            EffectValue::Element(element) => Some(*element),
            _ => None,
        }
    }
}

/// One effect rule: kind, value, and gating condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectDef {
    #[serde(rename = "effect")]
    pub kind: EffectKind,
    #[serde(default)]
    pub value: EffectValue,
    #[serde(default)]
    pub condition: ConditionSet,
    #[serde(rename = "condition_logic", default)]
    pub logic: Logic,
}

/// Declaration-ordered rule lists, one per star kind. The order in the
/// catalog is the order rules are tried; the first whose condition passes
/// wins the cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarRules {
    #[serde(rename = "STAR_A")]
    pub a: Vec<EffectDef>,
    #[serde(rename = "STAR_B")]
    pub b: Vec<EffectDef>,
    #[serde(rename = "STAR_C")]
    pub c: Vec<EffectDef>,
}

impl StarRules {
    pub fn for_kind(&self, kind: StarKind) -> &[EffectDef] {
        match kind {
            StarKind::A => &self.a,
            StarKind::B => &self.b,
            StarKind::C => &self.c,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.b.is_empty() && self.c.is_empty()
    }

    /// All rules across the three kinds, for validation sweeps.
    pub fn iter_all(&self) -> impl Iterator<Item = (StarKind, &EffectDef)> {
        StarKind::ALL
            .into_iter()
            .flat_map(move |kind| self.for_kind(kind).iter().map(move |def| (kind, def)))
    }
}
