//! Pure scoring logic for Satchel.
//!
//! This crate contains all backpack-scoring logic that is independent of any
//! UI, RNG, or runtime. Functions take plain data and return results, making
//! them unit-testable and portable across the headless harness, search
//! solvers, and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Item catalog ingestion from JSON plus a validation sweep |
//! | [`condition`] | Conditional predicates gating effects (AND/OR logic) |
//! | [`effect`] | Effect kinds, constant/dynamic values, per-star rule lists |
//! | [`engine`] | The deterministic resolution engine and its run report |
//! | [`geometry`] | Cell kinds, shape matrices, rotation, grid dimensions |
//! | [`item`] | Catalog templates and placed-item run state |
//! | [`layout`] | Anchor-keyed layout map and manifest extraction |
//! | [`placement`] | Body-only placement validation and anchor bounds |
//! | [`tags`] | Rarity, class, element, and item-type vocabularies |

pub mod catalog;
pub mod condition;
pub mod effect;
pub mod engine;
pub mod geometry;
pub mod item;
pub mod layout;
pub mod placement;
pub mod tags;
