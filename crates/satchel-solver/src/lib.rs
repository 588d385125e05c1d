//! Layout search for Satchel.
//!
//! Two solvers over the deterministic engine in `satchel-logic`: a
//! random-placement baseline and a genetic algorithm. This is the only
//! crate that touches randomness; every entry point takes `&mut impl Rng`
//! so callers control seeding.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`genetic`] | Tournament/crossover/mutation search with elitism |
//! | [`random`] | Shuffle-place-score baseline, best of N iterations |
//! | [`support`] | Shared placement machinery (rotation, sampling, paths) |

pub mod genetic;
pub mod random;
pub mod support;
