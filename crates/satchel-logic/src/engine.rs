//! The deterministic resolution engine.
//!
//! A run walks the layout in anchor order through five passes:
//!
//! 1. reset every item's run state
//! 2. rebuild the occupancy grid (Body cells only)
//! 3. grant pass: element grants from star cells, all applied before any
//!    activation check so later membership tests observe every grant
//! 4. activation pass: per-cell first-match-wins over each star kind's
//!    rule list, with per-(source, kind) duplicate-target suppression
//! 5. collect score records (values resolve here, after counters are
//!    final), then apply in fixed order: neutral pool, additive,
//!    multiplicative
//!
//! Identical layouts produce identical reports, including modifier logs,
//! because the layout map iterates in key order.

use std::collections::HashSet;

use log::warn;

use crate::effect::{EffectDef, EffectKind, StarRules};
use crate::geometry::{GridDims, StarKind};
use crate::item::PlacedItem;
use crate::layout::Layout;

/// One applied effect, for display and debugging downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub source: String,
    pub target: Option<String>,
    pub kind: EffectKind,
    pub value: f64,
}

/// Outcome of a run. Item scores and modifier logs live on the placed
/// items themselves; this carries the totals and the shared pool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Sum of item final scores plus the neutral pool.
    pub total_score: f64,
    pub neutral_total: f64,
    pub neutral_log: Vec<String>,
    pub interactions: Vec<Interaction>,
}

/// Which item's Body covers each grid cell, by anchor key.
struct OccupancyGrid {
    cells: Vec<Option<(i32, i32)>>,
    dims: GridDims,
}

impl OccupancyGrid {
    fn build(layout: &Layout, dims: GridDims) -> Self {
        let mut cells = vec![None; (dims.cols * dims.rows) as usize];
        for (key, item) in layout.iter() {
            for (c, r) in item.shape.body_cells() {
                let (x, y) = (item.gx + c, item.gy + r);
                if dims.contains(x, y) {
                    cells[(y * dims.cols + x) as usize] = Some(key);
                }
            }
        }
        OccupancyGrid { cells, dims }
    }

    fn occupant(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        if !self.dims.contains(x, y) {
            return None;
        }
        self.cells[(y * self.dims.cols + x) as usize]
    }
}

/// Per-source snapshot taken before the mutating passes, so rule scans
/// never alias the layout borrow.
struct SourceView {
    key: (i32, i32),
    name: String,
    /// Star cells in absolute grid coordinates, row-major.
    stars: Vec<(StarKind, i32, i32)>,
    rules: StarRules,
    passives: Vec<EffectDef>,
}

fn snapshot_sources(layout: &Layout) -> Vec<SourceView> {
    layout
        .iter()
        .map(|(key, item)| SourceView {
            key,
            name: item.name.clone(),
            stars: item
                .shape
                .star_cells()
                .into_iter()
                .map(|(kind, c, r)| (kind, item.gx + c, item.gy + r))
                .collect(),
            rules: item.star_effects.clone(),
            passives: item.passive_effects.clone(),
        })
        .collect()
}

fn kind_index(kind: StarKind) -> usize {
    match kind {
        StarKind::A => 0,
        StarKind::B => 1,
        StarKind::C => 2,
    }
}

/// A score record waiting for the apply stage. The value is already
/// resolved; `None` marks an unresolvable value to be skipped.
struct Pending {
    source_key: (i32, i32),
    source_name: String,
    target_key: Option<(i32, i32)>,
    target_name: Option<String>,
    kind: EffectKind,
    value: Option<f64>,
    reason: String,
}

/// Run the engine over a layout, mutating per-item scores and logs, and
/// return the report.
pub fn run(layout: &mut Layout, dims: GridDims) -> RunReport {
    for item in layout.values_mut() {
        item.reset_run_state();
    }

    let grid = OccupancyGrid::build(layout, dims);
    let sources = snapshot_sources(layout);

    grant_pass(layout, &grid, &sources);
    activation_pass(layout, &grid, &sources);
    let pending = collect_pass(layout, &grid, &sources);
    apply_pass(layout, pending)
}

/// Run a cloned copy and return just the total. The caller's layout is
/// untouched.
pub fn score(layout: &Layout, dims: GridDims) -> f64 {
    let mut copy = layout.clone();
    run(&mut copy, dims).total_score
}

/// Element grants. For each star cell the kind's rule list is scanned in
/// declaration order considering only grant rules; the first whose
/// condition passes ends the scan for that cell. Grants are idempotent.
fn grant_pass(layout: &mut Layout, grid: &OccupancyGrid, sources: &[SourceView]) {
    for source in sources {
        for &(kind, x, y) in &source.stars {
            let target_key = grid.occupant(x, y);
            for rule in source.rules.for_kind(kind) {
                if rule.kind != EffectKind::AddElementToTarget {
                    continue;
                }
                let target = target_key.and_then(|k| layout.get(&k));
                if !rule.condition.evaluate(&source.name, target, rule.logic) {
                    continue;
                }
                if let Some(key) = target_key {
                    match rule.value.as_element() {
                        Some(element) => {
                            if let Some(item) = layout.get_mut(&key) {
                                item.grant_element(element);
                            }
                        }
                        None => warn!(
                            "{}: ADD_ELEMENT_TO_TARGET value is not an element, grant skipped",
                            source.name
                        ),
                    }
                }
                break;
            }
        }
    }
}

/// Star activation. Per cell, the first rule whose condition passes wins.
/// A match against a target already counted for this (source, kind) pair
/// is a duplicate and bumps nothing; empty cells re-fire freely.
fn activation_pass(layout: &mut Layout, grid: &OccupancyGrid, sources: &[SourceView]) {
    for source in sources {
        let mut triggered: [HashSet<(i32, i32)>; 3] = Default::default();
        for &(kind, x, y) in &source.stars {
            let target_key = grid.occupant(x, y);
            for rule in source.rules.for_kind(kind) {
                let target = target_key.and_then(|k| layout.get(&k));
                if !rule.condition.evaluate(&source.name, target, rule.logic) {
                    continue;
                }
                let duplicate = target_key
                    .map(|k| triggered[kind_index(kind)].contains(&k))
                    .unwrap_or(false);
                if !duplicate {
                    if let Some(item) = layout.get_mut(&source.key) {
                        item.activated.bump(kind);
                    }
                    if let Some(key) = target_key {
                        triggered[kind_index(kind)].insert(key);
                        if let Some(item) = layout.get_mut(&key) {
                            item.occupying_stars.push((kind, source.name.clone()));
                        }
                    }
                }
                break;
            }
        }
    }
}

/// Collect score records. Values resolve here, after every activation
/// counter is final, so dynamic values see the finished counts.
fn collect_pass(layout: &Layout, grid: &OccupancyGrid, sources: &[SourceView]) -> Vec<Pending> {
    let mut pending = Vec::new();

    for source in sources {
        let counts = match layout.get(&source.key) {
            Some(item) => item.activated,
            None => continue,
        };

        // Passive effects. Kinds landing on the source itself fire once,
        // unconditioned by target predicates. Target kinds try the empty
        // candidacy first, then every other item in anchor order.
        for rule in &source.passives {
            if !rule.kind.is_scoring() {
                continue;
            }
            if rule.kind.targets_self() {
                pending.push(Pending {
                    source_key: source.key,
                    source_name: source.name.clone(),
                    target_key: None,
                    target_name: None,
                    kind: rule.kind,
                    value: rule.value.resolve(&counts),
                    reason: "Passive".to_string(),
                });
                continue;
            }
            if rule.condition.evaluate(&source.name, None, rule.logic) {
                pending.push(Pending {
                    source_key: source.key,
                    source_name: source.name.clone(),
                    target_key: None,
                    target_name: None,
                    kind: rule.kind,
                    value: rule.value.resolve(&counts),
                    reason: "Passive".to_string(),
                });
            }
            for (key, item) in layout.iter() {
                if key == source.key {
                    continue;
                }
                if rule.condition.evaluate(&source.name, Some(item), rule.logic) {
                    pending.push(Pending {
                        source_key: source.key,
                        source_name: source.name.clone(),
                        target_key: Some(key),
                        target_name: Some(item.name.clone()),
                        kind: rule.kind,
                        value: rule.value.resolve(&counts),
                        reason: format!("Passive from {}", item.name),
                    });
                }
            }
        }

        // Star records, re-running the scan under the activation pass's
        // first-match and duplicate rules.
        let mut recorded: [HashSet<(i32, i32)>; 3] = Default::default();
        for &(kind, x, y) in &source.stars {
            let target_key = grid.occupant(x, y);
            if let Some(key) = target_key {
                if recorded[kind_index(kind)].contains(&key) {
                    continue;
                }
            }
            for rule in source.rules.for_kind(kind) {
                let target = target_key.and_then(|k| layout.get(&k));
                if !rule.condition.evaluate(&source.name, target, rule.logic) {
                    continue;
                }
                if rule.kind.is_scoring() {
                    pending.push(Pending {
                        source_key: source.key,
                        source_name: source.name.clone(),
                        target_key,
                        target_name: target.map(|t| t.name.clone()),
                        kind: rule.kind,
                        value: rule.value.resolve(&counts),
                        reason: format!("Star {}", kind.label()),
                    });
                }
                if let Some(key) = target_key {
                    recorded[kind_index(kind)].insert(key);
                }
                break;
            }
        }
    }

    pending
}

/// Apply the collected records in fixed order: neutral contributions,
/// then additive, then multiplicative, each in collection order.
fn apply_pass(layout: &mut Layout, pending: Vec<Pending>) -> RunReport {
    let mut report = RunReport::default();

    let resolved = |p: &Pending| -> Option<f64> {
        if p.value.is_none() {
            warn!(
                "{}: unresolvable value for {:?}, effect skipped",
                p.source_name, p.kind
            );
        }
        p.value
    };

    for p in pending.iter().filter(|p| p.kind == EffectKind::ContributeToNeutral) {
        let Some(value) = resolved(p) else { continue };
        report.neutral_total += value;
        report
            .neutral_log
            .push(format!("+{:.1} from {}", value, p.source_name));
        report.interactions.push(Interaction {
            source: p.source_name.clone(),
            target: None,
            kind: p.kind,
            value,
        });
    }

    for p in pending.iter().filter(|p| p.kind.is_additive()) {
        let Some(value) = resolved(p) else { continue };
        match p.kind {
            EffectKind::AddScoreToSelf => {
                if let Some(item) = layout.get_mut(&p.source_key) {
                    item.final_score += value;
                    item.modifiers.push(format!("+{:.1} ({})", value, p.reason));
                }
            }
            EffectKind::AddScoreToTarget => {
                let Some(key) = p.target_key else { continue };
                if let Some(item) = layout.get_mut(&key) {
                    item.final_score += value;
                    item.modifiers
                        .push(format!("+{:.1} from {}", value, p.source_name));
                }
            }
            _ => unreachable!(),
        }
        report.interactions.push(Interaction {
            source: p.source_name.clone(),
            target: p.target_name.clone(),
            kind: p.kind,
            value,
        });
    }

    for p in pending.iter().filter(|p| p.kind.is_multiplicative()) {
        let Some(value) = resolved(p) else { continue };
        match p.kind {
            EffectKind::MultiplyScoreOfSelf => {
                if let Some(item) = layout.get_mut(&p.source_key) {
                    item.final_score *= value;
                    item.modifiers.push(format!("x{:.2} ({})", value, p.reason));
                }
            }
            EffectKind::MultiplyScoreOfTarget => {
                let Some(key) = p.target_key else { continue };
                if let Some(item) = layout.get_mut(&key) {
                    item.final_score *= value;
                    item.modifiers
                        .push(format!("x{:.2} from {}", value, p.source_name));
                }
            }
            _ => unreachable!(),
        }
        report.interactions.push(Interaction {
            source: p.source_name.clone(),
            target: p.target_name.clone(),
            kind: p.kind,
            value,
        });
    }

    report.total_score = layout.item_score_total() + report.neutral_total;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemTemplate, PlacedItem};

    fn dims() -> GridDims {
        GridDims::new(4, 4)
    }

    fn place(layout: &mut Layout, json: serde_json::Value, gx: i32, gy: i32) {
        let template: ItemTemplate = serde_json::from_value(json).unwrap();
        layout.insert(PlacedItem::from_template(&template, gx, gy));
    }

    fn plain(name: &str, base: f64) -> serde_json::Value {
        serde_json::json!({
            "name": name,
            "rarity": "COMMON",
            "item_class": "NEUTRAL",
            "shape": [[1]],
            "base_score": base
        })
    }

    #[test]
    fn empty_layout_scores_zero() {
        let mut layout = Layout::new();
        let report = run(&mut layout, dims());
        assert_eq!(report.total_score, 0.0);
        assert!(report.interactions.is_empty());
    }

    #[test]
    fn isolated_items_sum_base_scores() {
        let mut layout = Layout::new();
        place(&mut layout, plain("A", 3.0), 0, 0);
        place(&mut layout, plain("B", 4.0), 2, 2);
        let report = run(&mut layout, dims());
        assert_eq!(report.total_score, 7.0);
    }

    #[test]
    fn occupancy_grid_registers_body_only() {
        let mut layout = Layout::new();
        place(
            &mut layout,
            serde_json::json!({
                "name": "Wand",
                "rarity": "COMMON",
                "item_class": "MAGE",
                "shape": [[1, 2]],
                "base_score": 1.0
            }),
            0,
            0,
        );
        let grid = OccupancyGrid::build(&layout, dims());
        assert_eq!(grid.occupant(0, 0), Some((0, 0)));
        assert_eq!(grid.occupant(1, 0), None);
        assert_eq!(grid.occupant(-1, 0), None);
    }

    #[test]
    fn score_leaves_caller_layout_untouched() {
        let mut layout = Layout::new();
        place(&mut layout, plain("A", 3.0), 0, 0);
        let before = layout.clone();
        let total = score(&layout, dims());
        assert_eq!(total, 3.0);
        assert_eq!(layout, before);
    }
}
