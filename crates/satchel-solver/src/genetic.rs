//! Genetic layout search.
//!
//! Individuals are whole layouts. Selection is tournament, crossover is
//! manifest-based (inherit what fits from one parent, fill the gaps from
//! the other), mutation nudges a single item. Elites carry over
//! unchanged and the best layout ever scored is what the run returns,
//! so a lucky early individual is never lost to drift.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use satchel_logic::engine;
use satchel_logic::geometry::GridDims;
use satchel_logic::item::{ItemTemplate, PlacedItem};
use satchel_logic::layout::{required_manifest, Layout};
use satchel_logic::placement::{is_valid_against, occupied_cells};

use crate::support::{center_out_path, find_anchor_center_out, random_anchor, random_layout};

/// How crossover looks for a spot when a missing item fits nowhere at
/// its inherited position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// Uniform random probes, no rotation.
    #[default]
    Uniform,
    /// Walk the center-out path trying all four rotations.
    CenterOut,
}

#[derive(Debug, Clone, Copy)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub tournament_size: usize,
    pub elitism_count: usize,
    /// Random placement probes per item, for seeding and fallback.
    pub placement_retries: u32,
    /// Attempts before a mutation gives up and restores the layout.
    pub mutation_retries: u32,
    pub anchor_strategy: AnchorStrategy,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        GeneticConfig {
            population_size: 150,
            generations: 200,
            mutation_rate: 0.08,
            tournament_size: 7,
            elitism_count: 5,
            placement_retries: 20,
            mutation_retries: 10,
            anchor_strategy: AnchorStrategy::Uniform,
        }
    }
}

/// Best layout across the whole run plus the per-generation trace of
/// the running best score.
#[derive(Debug, Clone)]
pub struct GeneticOutcome {
    pub layout: Layout,
    pub score: f64,
    pub history: Vec<f64>,
}

pub struct GeneticSolver<'a> {
    config: GeneticConfig,
    templates: &'a [ItemTemplate],
    dims: GridDims,
    required: BTreeMap<String, usize>,
    path: Vec<(i32, i32)>,
    initial: Option<Layout>,
}

impl<'a> GeneticSolver<'a> {
    pub fn new(config: GeneticConfig, templates: &'a [ItemTemplate], dims: GridDims) -> Self {
        GeneticSolver {
            config,
            templates,
            dims,
            required: required_manifest(templates),
            path: center_out_path(dims),
            initial: None,
        }
    }

    /// Seed the first population with a hand-built layout. It competes
    /// like any other individual and survives only on merit.
    pub fn with_initial_layout(mut self, layout: Layout) -> Self {
        self.initial = Some(layout);
        self
    }

    pub fn solve(&self, rng: &mut impl Rng) -> GeneticOutcome {
        let mut population: Vec<Layout> = Vec::with_capacity(self.config.population_size);
        if let Some(initial) = &self.initial {
            population.push(initial.clone());
        }
        while population.len() < self.config.population_size {
            population.push(random_layout(
                self.templates,
                self.dims,
                self.config.placement_retries,
                rng,
            ));
        }

        let mut best: Option<(f64, Layout)> = None;
        let mut history = Vec::with_capacity(self.config.generations);

        for generation in 0..self.config.generations {
            let mut scored: Vec<(f64, Layout)> = population
                .drain(..)
                .map(|layout| (engine::score(&layout, self.dims), layout))
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

            if let Some(top) = scored.first() {
                if best.as_ref().map_or(true, |(score, _)| top.0 > *score) {
                    best = Some((top.0, top.1.clone()));
                }
            }
            let best_score = best.as_ref().map_or(0.0, |(score, _)| *score);
            history.push(best_score);
            debug!(
                "genetic solver: generation {}/{} best {best_score:.1}",
                generation + 1,
                self.config.generations
            );

            let mut next = Vec::with_capacity(self.config.population_size);
            for (_, elite) in scored.iter().take(self.config.elitism_count) {
                next.push(elite.clone());
            }
            while next.len() < self.config.population_size {
                let parent1 = self.tournament(&scored, rng);
                let parent2 = self.tournament(&scored, rng);
                let mut child = self.crossover(parent1, parent2, rng);
                if rng.gen::<f64>() < self.config.mutation_rate {
                    self.mutate(&mut child, rng);
                }
                next.push(child);
            }
            population = next;
        }

        match best {
            Some((score, layout)) => GeneticOutcome {
                layout,
                score,
                history,
            },
            None => GeneticOutcome {
                layout: Layout::new(),
                score: 0.0,
                history,
            },
        }
    }

    fn tournament<'b>(&self, scored: &'b [(f64, Layout)], rng: &mut impl Rng) -> &'b Layout {
        let entrants = self.config.tournament_size.min(scored.len()).max(1);
        let picks = rand::seq::index::sample(rng, scored.len(), entrants);
        let mut winner = picks.index(0);
        for i in picks.iter().skip(1) {
            if scored[i].0 > scored[winner].0 {
                winner = i;
            }
        }
        &scored[winner].1
    }

    /// Inherit whatever fits from `parent1` in random order, then walk
    /// `parent2` for copies still owed to the manifest, keeping their
    /// positions when possible and falling back to a fresh anchor when
    /// not. Items that fit nowhere stay missing; the child is simply a
    /// weaker individual.
    fn crossover(&self, parent1: &Layout, parent2: &Layout, rng: &mut impl Rng) -> Layout {
        let mut child = Layout::new();
        let mut occupied: HashSet<(i32, i32)> = HashSet::new();

        let mut inherited: Vec<&PlacedItem> = parent1.values().collect();
        inherited.shuffle(rng);
        for item in inherited {
            if is_valid_against(&item.shape, item.gx, item.gy, &occupied, self.dims) {
                stamp(&mut occupied, item);
                child.insert(item.clone());
            }
        }

        let mut missing = self.required.clone();
        for (name, count) in child.manifest() {
            if let Some(need) = missing.get_mut(&name) {
                *need = need.saturating_sub(count);
            }
        }

        let mut homeless: Vec<&PlacedItem> = Vec::new();
        let mut fillers: Vec<&PlacedItem> = parent2.values().collect();
        fillers.shuffle(rng);
        for item in fillers {
            let Some(need) = missing.get_mut(&item.name) else {
                continue;
            };
            if *need == 0 {
                continue;
            }
            if is_valid_against(&item.shape, item.gx, item.gy, &occupied, self.dims) {
                stamp(&mut occupied, item);
                child.insert(item.clone());
                *need -= 1;
            } else {
                homeless.push(item);
            }
        }

        for item in homeless {
            let Some(need) = missing.get_mut(&item.name) else {
                continue;
            };
            if *need == 0 {
                continue;
            }
            if let Some(placed) = self.place_fallback(item, &occupied, rng) {
                stamp(&mut occupied, &placed);
                child.insert(placed);
                *need -= 1;
            }
        }

        child
    }

    fn place_fallback(
        &self,
        item: &PlacedItem,
        occupied: &HashSet<(i32, i32)>,
        rng: &mut impl Rng,
    ) -> Option<PlacedItem> {
        match self.config.anchor_strategy {
            AnchorStrategy::Uniform => {
                for _ in 0..self.config.placement_retries {
                    let Some((gx, gy)) = random_anchor(&item.shape, self.dims, rng) else {
                        return None;
                    };
                    if is_valid_against(&item.shape, gx, gy, occupied, self.dims) {
                        let mut placed = item.clone();
                        placed.gx = gx;
                        placed.gy = gy;
                        return Some(placed);
                    }
                }
                None
            }
            AnchorStrategy::CenterOut => {
                let mut placed = item.clone();
                for _ in 0..4 {
                    if let Some((gx, gy)) =
                        find_anchor_center_out(&placed.shape, occupied, self.dims, &self.path)
                    {
                        placed.gx = gx;
                        placed.gy = gy;
                        return Some(placed);
                    }
                    placed.rotate();
                }
                None
            }
        }
    }

    /// Nudge one randomly chosen item: re-rotate it, move it, or swap
    /// anchors with another item. Each retry starts from the item's
    /// original state. On exhaustion the layout is restored untouched
    /// and `false` comes back.
    pub fn mutate(&self, layout: &mut Layout, rng: &mut impl Rng) -> bool {
        let keys: Vec<(i32, i32)> = layout.keys().collect();
        if keys.is_empty() {
            return false;
        }
        let key = keys[rng.gen_range(0..keys.len())];
        let Some(original) = layout.remove(&key) else {
            return false;
        };
        let rest = occupied_cells(layout);

        for _ in 0..self.config.mutation_retries {
            match rng.gen_range(0..3) {
                0 => {
                    // Move to a fresh random anchor.
                    let mut moved = original.clone();
                    if let Some((gx, gy)) = random_anchor(&moved.shape, self.dims, rng) {
                        if is_valid_against(&moved.shape, gx, gy, &rest, self.dims) {
                            moved.gx = gx;
                            moved.gy = gy;
                            layout.insert(moved);
                            return true;
                        }
                    }
                }
                1 => {
                    // One to three quarter turns in place.
                    let mut spun = original.clone();
                    for _ in 0..rng.gen_range(1..4) {
                        spun.rotate();
                    }
                    if is_valid_against(&spun.shape, spun.gx, spun.gy, &rest, self.dims) {
                        layout.insert(spun);
                        return true;
                    }
                }
                _ => {
                    let others: Vec<(i32, i32)> = layout.keys().collect();
                    if others.is_empty() {
                        continue;
                    }
                    let other_key = others[rng.gen_range(0..others.len())];
                    let Some(other) = layout.remove(&other_key) else {
                        continue;
                    };
                    let rest_without_other = occupied_cells(layout);

                    let mut moved = original.clone();
                    moved.gx = other.gx;
                    moved.gy = other.gy;
                    let mut moved_other = other.clone();
                    moved_other.gx = original.gx;
                    moved_other.gy = original.gy;

                    let mut rest_with_moved = rest_without_other.clone();
                    stamp(&mut rest_with_moved, &moved);
                    if is_valid_against(&moved.shape, moved.gx, moved.gy, &rest_without_other, self.dims)
                        && is_valid_against(
                            &moved_other.shape,
                            moved_other.gx,
                            moved_other.gy,
                            &rest_with_moved,
                            self.dims,
                        )
                    {
                        layout.insert(moved);
                        layout.insert(moved_other);
                        return true;
                    }
                    layout.insert(other);
                }
            }
        }

        layout.insert(original);
        false
    }
}

fn stamp(occupied: &mut HashSet<(i32, i32)>, item: &PlacedItem) {
    for (c, r) in item.shape.body_cells() {
        occupied.insert((item.gx + c, item.gy + r));
    }
}
