//! Random-placement baseline.
//!
//! Shuffle the manifest, place items at random spots, score, repeat, and
//! keep the best layout seen. No search pressure at all, which makes it
//! the honesty check the genetic solver has to beat.

use log::debug;
use rand::Rng;

use satchel_logic::engine;
use satchel_logic::geometry::GridDims;
use satchel_logic::item::ItemTemplate;
use satchel_logic::layout::Layout;

use crate::support::random_layout;

#[derive(Debug, Clone, Copy)]
pub struct RandomSolver {
    /// How many independent layouts to draw and score.
    pub iterations: usize,
    /// Placement probes per item before it is dropped from a draw.
    pub placement_retries: u32,
}

impl Default for RandomSolver {
    fn default() -> Self {
        RandomSolver {
            iterations: 1000,
            placement_retries: 20,
        }
    }
}

/// Best layout found by a solver run, with its score.
#[derive(Debug, Clone)]
pub struct RandomOutcome {
    pub layout: Layout,
    pub score: f64,
}

impl RandomSolver {
    pub fn solve(
        &self,
        templates: &[ItemTemplate],
        dims: GridDims,
        rng: &mut impl Rng,
    ) -> RandomOutcome {
        let mut best: Option<RandomOutcome> = None;
        for iteration in 0..self.iterations {
            let layout = random_layout(templates, dims, self.placement_retries, rng);
            let score = engine::score(&layout, dims);
            if best.as_ref().map_or(true, |b| score > b.score) {
                debug!("random solver: new best {score:.1} at iteration {iteration}");
                best = Some(RandomOutcome { layout, score });
            }
        }
        best.unwrap_or(RandomOutcome {
            layout: Layout::new(),
            score: 0.0,
        })
    }
}
