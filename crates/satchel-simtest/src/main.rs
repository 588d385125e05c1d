//! Satchel Headless Validation Harness
//!
//! Exercises the catalog, the resolution engine, and both solvers
//! end to end, entirely in-process. No rendering, no persistence.
//!
//! Usage:
//!   cargo run -p satchel-simtest
//!   cargo run -p satchel-simtest -- --verbose

use rand::rngs::StdRng;
use rand::SeedableRng;

use satchel_logic::catalog;
use satchel_logic::engine;
use satchel_logic::geometry::GridDims;
use satchel_logic::item::{ItemTemplate, PlacedItem};
use satchel_logic::layout::{required_manifest, Layout};
use satchel_logic::placement;
use satchel_solver::genetic::{GeneticConfig, GeneticSolver};
use satchel_solver::random::RandomSolver;

// ── Item catalog (same JSON a frontend would ship) ──────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/item_catalog.json");

const GRID: GridDims = GridDims { cols: 8, rows: 8 };

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Satchel Validation Harness ===\n");

    let templates = match catalog::load_catalog(CATALOG_JSON) {
        Ok(t) => t,
        Err(e) => {
            println!("catalog failed to parse: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Catalog content sweep
    results.extend(validate_catalog(&templates, verbose));

    // 2. Shape geometry and placement bounds
    results.extend(validate_geometry(&templates, verbose));

    // 3. Engine scenarios on hand-built layouts
    results.extend(validate_engine(&templates, verbose));

    // 4. Random baseline solver
    results.extend(validate_random_solver(&templates, verbose));

    // 5. Genetic solver
    results.extend(validate_genetic_solver(&templates, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn find<'a>(templates: &'a [ItemTemplate], name: &str) -> &'a ItemTemplate {
    templates
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("catalog is missing {name}"))
}

fn place(layout: &mut Layout, template: &ItemTemplate, gx: i32, gy: i32) -> (i32, i32) {
    layout
        .insert(PlacedItem::from_template(template, gx, gy))
        .unwrap_or_else(|| panic!("{} has no body", template.name))
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(templates: &[ItemTemplate], verbose: bool) -> Vec<TestResult> {
    println!("--- Item Catalog ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: templates.len() >= 8,
        detail: format!("{} items loaded", templates.len()),
    });

    let findings = catalog::validate(templates);
    results.push(TestResult {
        name: "catalog_clean".into(),
        passed: findings.is_empty(),
        detail: if findings.is_empty() {
            "no content findings".into()
        } else {
            findings.join("; ")
        },
    });

    // Every star rule list should have a matching star cell to fire from.
    let mut unanchored = Vec::new();
    for t in templates {
        for (kind, _) in t.star_effects.iter_all() {
            let has_cell = t.shape.star_cells().iter().any(|(k, _, _)| *k == kind);
            if !has_cell {
                unanchored.push(format!("{} ({})", t.name, kind.as_str()));
            }
        }
    }
    results.push(TestResult {
        name: "catalog_star_rules_have_cells".into(),
        passed: unanchored.is_empty(),
        detail: if unanchored.is_empty() {
            "every star rule has a cell of its kind".into()
        } else {
            unanchored.join(", ")
        },
    });

    // The catalog should exercise the full effect vocabulary.
    let mut kinds_seen = std::collections::BTreeSet::new();
    for t in templates {
        for (_, def) in t.star_effects.iter_all() {
            kinds_seen.insert(format!("{:?}", def.kind));
        }
        for def in &t.passive_effects {
            kinds_seen.insert(format!("{:?}", def.kind));
        }
    }
    results.push(TestResult {
        name: "catalog_covers_effect_kinds".into(),
        passed: kinds_seen.len() == 6,
        detail: format!("{} of 6 effect kinds used", kinds_seen.len()),
    });

    if verbose {
        println!("  Items by rarity:");
        for t in templates {
            println!(
                "    {:14} {:?} base={:.1} stars={} passives={}",
                t.name,
                t.rarity,
                t.base_score,
                t.star_effects.iter_all().count(),
                t.passive_effects.len()
            );
        }
    }

    results
}

// ── 2. Geometry ─────────────────────────────────────────────────────────

fn validate_geometry(templates: &[ItemTemplate], _verbose: bool) -> Vec<TestResult> {
    println!("--- Shapes & Placement ---");
    let mut results = Vec::new();

    // Four quarter turns are the identity.
    let mut round_trips = true;
    for t in templates {
        let back = t.shape.rotated().rotated().rotated().rotated();
        if back != t.shape {
            round_trips = false;
        }
    }
    results.push(TestResult {
        name: "shapes_rotate_round_trip".into(),
        passed: round_trips,
        detail: "four quarter turns restore every shape".into(),
    });

    // Rotation preserves the cell population.
    let mut preserved = true;
    for t in templates {
        let rotated = t.shape.rotated();
        if rotated.body_cells().len() != t.shape.body_cells().len()
            || rotated.star_cells().len() != t.shape.star_cells().len()
        {
            preserved = false;
        }
    }
    results.push(TestResult {
        name: "shapes_rotation_preserves_cells".into(),
        passed: preserved,
        detail: "body and star counts survive rotation".into(),
    });

    // Every catalog shape fits the standard grid at some anchor.
    let unfittable: Vec<_> = templates
        .iter()
        .filter(|t| placement::anchor_bounds(&t.shape, GRID).is_none())
        .map(|t| t.name.as_str())
        .collect();
    results.push(TestResult {
        name: "shapes_fit_standard_grid".into(),
        passed: unfittable.is_empty(),
        detail: if unfittable.is_empty() {
            format!("all shapes fit {}x{}", GRID.cols, GRID.rows)
        } else {
            unfittable.join(", ")
        },
    });

    results
}

// ── 3. Engine scenarios ─────────────────────────────────────────────────

fn validate_engine(templates: &[ItemTemplate], verbose: bool) -> Vec<TestResult> {
    println!("--- Engine Scenarios ---");
    let mut results = Vec::new();

    // Whetstone sharpens an adjacent weapon; the blade's own star reads
    // its final activation count.
    let mut layout = Layout::new();
    place(&mut layout, find(templates, "Whetstone"), 0, 0);
    place(&mut layout, find(templates, "Ember Blade"), 0, 0);
    let report = engine::run(&mut layout, GRID);
    results.push(TestResult {
        name: "engine_star_activation".into(),
        passed: (report.total_score - 14.0).abs() < 1e-9,
        detail: format!("whetstone + blade scored {:.1} (want 14.0)", report.total_score),
    });

    // Sun Idol grants HOLY to a torch before the censer's passive looks
    // for holy items, so both the idol and the torch get multiplied.
    let mut layout = Layout::new();
    let torch_key = place(&mut layout, find(templates, "Torch"), 0, 0);
    place(&mut layout, find(templates, "Sun Idol"), 0, 0);
    place(&mut layout, find(templates, "Censer"), 2, 0);
    let grant_report = engine::run(&mut layout, GRID);
    let torch = layout.get(&torch_key).map(|t| t.final_score).unwrap_or(0.0);
    let torch_log = layout
        .get(&torch_key)
        .map(|t| t.modifiers.join(", "))
        .unwrap_or_default();
    results.push(TestResult {
        name: "engine_grant_then_multiply".into(),
        passed: (grant_report.total_score - 11.5).abs() < 1e-9
            && (torch - 4.5).abs() < 1e-9
            && torch_log.contains("x1.50 from Censer"),
        detail: format!(
            "total {:.1} (want 11.5), torch {:.1} [{}]",
            grant_report.total_score, torch, torch_log
        ),
    });

    // Neutral contributions pool outside item scores.
    let mut layout = Layout::new();
    let pouch = find(templates, "Coin Pouch");
    place(&mut layout, pouch, 0, 0);
    place(&mut layout, pouch, 1, 0);
    let report = engine::run(&mut layout, GRID);
    results.push(TestResult {
        name: "engine_neutral_pool".into(),
        passed: (report.neutral_total - 10.0).abs() < 1e-9
            && (report.total_score - 12.0).abs() < 1e-9
            && report.neutral_log.len() == 2,
        detail: format!(
            "neutral {:.1}, total {:.1}, {} log lines",
            report.neutral_total,
            report.total_score,
            report.neutral_log.len()
        ),
    });

    // Identical layouts produce identical reports, logs included.
    let build = || {
        let mut layout = Layout::new();
        place(&mut layout, find(templates, "Whetstone"), 0, 0);
        place(&mut layout, find(templates, "Ember Blade"), 0, 0);
        place(&mut layout, find(templates, "Censer"), 3, 3);
        place(&mut layout, find(templates, "Coin Pouch"), 5, 5);
        layout
    };
    let mut a = build();
    let mut b = build();
    let report_a = engine::run(&mut a, GRID);
    let report_b = engine::run(&mut b, GRID);
    results.push(TestResult {
        name: "engine_deterministic".into(),
        passed: report_a == report_b && a == b,
        detail: format!("two runs agree at {:.1}", report_a.total_score),
    });

    if verbose {
        println!("  Interactions in the grant scenario:");
        for i in &grant_report.interactions {
            println!(
                "    {} -> {} {:?} {:.2}",
                i.source,
                i.target.as_deref().unwrap_or("(pool)"),
                i.kind,
                i.value
            );
        }
    }

    results
}

// ── 4. Random solver ────────────────────────────────────────────────────

fn validate_random_solver(templates: &[ItemTemplate], _verbose: bool) -> Vec<TestResult> {
    println!("--- Random Solver ---");
    let mut results = Vec::new();

    let solver = RandomSolver {
        iterations: 150,
        placement_retries: 20,
    };
    let mut rng = StdRng::seed_from_u64(42);
    let outcome = solver.solve(templates, GRID, &mut rng);

    results.push(TestResult {
        name: "random_score_matches_rescore".into(),
        passed: (outcome.score - engine::score(&outcome.layout, GRID)).abs() < 1e-9,
        detail: format!("best of 150 draws scored {:.1}", outcome.score),
    });

    let required = required_manifest(templates);
    let overfilled = outcome
        .layout
        .manifest()
        .iter()
        .any(|(name, count)| count > required.get(name).unwrap_or(&0));
    results.push(TestResult {
        name: "random_respects_manifest".into(),
        passed: !overfilled && !outcome.layout.is_empty(),
        detail: format!("{} items placed", outcome.layout.len()),
    });

    let again = solver.solve(templates, GRID, &mut StdRng::seed_from_u64(42));
    results.push(TestResult {
        name: "random_seeded_reproduces".into(),
        passed: again.score == outcome.score && again.layout == outcome.layout,
        detail: "same seed, same outcome".into(),
    });

    results
}

// ── 5. Genetic solver ───────────────────────────────────────────────────

fn validate_genetic_solver(templates: &[ItemTemplate], verbose: bool) -> Vec<TestResult> {
    println!("--- Genetic Solver ---");
    let mut results = Vec::new();

    let config = GeneticConfig {
        population_size: 24,
        generations: 12,
        tournament_size: 5,
        elitism_count: 3,
        ..GeneticConfig::default()
    };
    let solver = GeneticSolver::new(config, templates, GRID);
    let outcome = solver.solve(&mut StdRng::seed_from_u64(42));

    results.push(TestResult {
        name: "genetic_history_monotone".into(),
        passed: outcome.history.len() == 12
            && outcome.history.windows(2).all(|w| w[1] >= w[0])
            && outcome.score == *outcome.history.last().unwrap(),
        detail: format!(
            "best {:.1} after 12 generations (started {:.1})",
            outcome.score, outcome.history[0]
        ),
    });

    results.push(TestResult {
        name: "genetic_score_matches_rescore".into(),
        passed: (outcome.score - engine::score(&outcome.layout, GRID)).abs() < 1e-9,
        detail: format!("winning layout rescores to {:.1}", outcome.score),
    });

    let required = required_manifest(templates);
    let overfilled = outcome
        .layout
        .manifest()
        .iter()
        .any(|(name, count)| count > required.get(name).unwrap_or(&0));
    results.push(TestResult {
        name: "genetic_respects_manifest".into(),
        passed: !overfilled,
        detail: format!(
            "{}/{} items placed",
            outcome.layout.len(),
            templates.len()
        ),
    });

    // Base scores alone sum to 31; a full placement plus the coin pouch
    // pool should clear that comfortably.
    results.push(TestResult {
        name: "genetic_beats_base_scores".into(),
        passed: outcome.score >= 31.0,
        detail: format!("{:.1} >= 31.0", outcome.score),
    });

    let baseline = RandomSolver {
        iterations: 30,
        placement_retries: 20,
    }
    .solve(templates, GRID, &mut StdRng::seed_from_u64(7));
    results.push(TestResult {
        name: "genetic_beats_random_baseline".into(),
        passed: outcome.score >= baseline.score,
        detail: format!(
            "genetic {:.1} vs random-30 {:.1}",
            outcome.score, baseline.score
        ),
    });

    let rerun = solver.solve(&mut StdRng::seed_from_u64(42));
    results.push(TestResult {
        name: "genetic_seeded_reproduces".into(),
        passed: rerun.score == outcome.score && rerun.layout == outcome.layout,
        detail: "same seed, same outcome".into(),
    });

    if verbose {
        println!("  Best-score trace:");
        for (generation, score) in outcome.history.iter().enumerate() {
            println!("    gen {:2}: {:.1}", generation + 1, score);
        }
    }

    results
}
