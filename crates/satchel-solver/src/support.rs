//! Shared placement machinery for the solvers.
//!
//! Everything here is stateless: helpers take a shape or layout plus an
//! `Rng` and try to find somewhere legal to put things. The center-out
//! path is the one piece of precomputed state, built once per grid size
//! and reused across a whole genetic run.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use satchel_logic::geometry::{GridDims, ShapeMatrix};
use satchel_logic::item::{ItemTemplate, PlacedItem};
use satchel_logic::layout::Layout;
use satchel_logic::placement::{anchor_bounds, is_valid_against, occupied_cells, AnchorBounds};

/// Give an item a uniformly random rotation: zero to three quarter turns.
pub fn spin_random(item: &mut PlacedItem, rng: &mut impl Rng) {
    for _ in 0..rng.gen_range(0..4) {
        item.rotate();
    }
}

/// Sample a uniform anchor from an inclusive bounds box.
pub fn sample_anchor(bounds: &AnchorBounds, rng: &mut impl Rng) -> (i32, i32) {
    (
        rng.gen_range(bounds.gx_min..=bounds.gx_max),
        rng.gen_range(bounds.gy_min..=bounds.gy_max),
    )
}

/// Uniform anchor for this shape at its current rotation, or `None` when
/// the shape cannot fit the grid at all.
pub fn random_anchor(shape: &ShapeMatrix, dims: GridDims, rng: &mut impl Rng) -> Option<(i32, i32)> {
    let bounds = anchor_bounds(shape, dims)?;
    Some(sample_anchor(&bounds, rng))
}

/// Try to place one item with a random rotation and random anchors,
/// giving up after `retries` failed probes. Returns whether it landed.
pub fn place_random(
    layout: &mut Layout,
    template: &ItemTemplate,
    dims: GridDims,
    retries: u32,
    rng: &mut impl Rng,
) -> bool {
    let occupied = occupied_cells(layout);
    for _ in 0..retries {
        let mut item = PlacedItem::from_template(template, 0, 0);
        spin_random(&mut item, rng);
        let Some((gx, gy)) = random_anchor(&item.shape, dims, rng) else {
            continue;
        };
        if is_valid_against(&item.shape, gx, gy, &occupied, dims) {
            item.gx = gx;
            item.gy = gy;
            layout.insert(item);
            return true;
        }
    }
    false
}

/// Build a layout by shuffling the templates and placing each in turn.
/// Items that find no spot within the retry budget are dropped, so the
/// result may fall short of the full manifest on a crowded grid.
pub fn random_layout(
    templates: &[ItemTemplate],
    dims: GridDims,
    retries: u32,
    rng: &mut impl Rng,
) -> Layout {
    let mut order: Vec<&ItemTemplate> = templates.iter().collect();
    order.shuffle(rng);
    let mut layout = Layout::new();
    for template in order {
        place_random(&mut layout, template, dims, retries, rng);
    }
    layout
}

/// Every grid coordinate ordered by squared distance from the grid
/// center, nearest first. Ties keep column-major generation order, so
/// the path is identical run to run.
pub fn center_out_path(dims: GridDims) -> Vec<(i32, i32)> {
    let mut path = Vec::with_capacity((dims.cols * dims.rows).max(0) as usize);
    for x in 0..dims.cols {
        for y in 0..dims.rows {
            path.push((x, y));
        }
    }
    // Doubled coordinates keep the comparison in integers: the true
    // center is ((cols-1)/2, (rows-1)/2), which may be fractional.
    let d2 = |&(x, y): &(i32, i32)| {
        let dx = 2 * x - (dims.cols - 1);
        let dy = 2 * y - (dims.rows - 1);
        dx * dx + dy * dy
    };
    path.sort_by_key(d2);
    path
}

/// Walk the path and try to align each of the shape's Body cells with
/// each spot, returning the first legal anchor. Central placements come
/// out first because the path is sorted center-out.
pub fn find_anchor_center_out(
    shape: &ShapeMatrix,
    occupied: &HashSet<(i32, i32)>,
    dims: GridDims,
    path: &[(i32, i32)],
) -> Option<(i32, i32)> {
    let handles = shape.body_cells();
    for &(sx, sy) in path {
        for &(hc, hr) in &handles {
            let (gx, gy) = (sx - hc, sy - hr);
            if is_valid_against(shape, gx, gy, occupied, dims) {
                return Some((gx, gy));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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
    fn spin_preserves_cell_population() {
        let mut rng = StdRng::seed_from_u64(42);
        let t = make_template("Elbow", vec![vec![1, 1], vec![2, 0]]);
        for _ in 0..20 {
            let mut item = PlacedItem::from_template(&t, 0, 0);
            spin_random(&mut item, &mut rng);
            assert_eq!(item.shape.body_cells().len(), 2);
            assert_eq!(item.shape.star_cells().len(), 1);
        }
    }

    #[test]
    fn sampled_anchors_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let dims = GridDims::new(4, 3);
        let t = make_template("Bar", vec![vec![1, 1, 1]]);
        for _ in 0..50 {
            let (gx, gy) = random_anchor(&t.shape, dims, &mut rng).unwrap();
            assert!((0..=1).contains(&gx));
            assert!((0..=2).contains(&gy));
        }
    }

    #[test]
    fn random_layout_is_collision_free() {
        let mut rng = StdRng::seed_from_u64(42);
        let templates: Vec<ItemTemplate> = (0..6)
            .map(|i| make_template(&format!("Piece {i}"), vec![vec![1, 1]]))
            .collect();
        let layout = random_layout(&templates, GridDims::new(5, 5), 20, &mut rng);
        let mut seen = HashSet::new();
        for item in layout.values() {
            for (c, r) in item.shape.body_cells() {
                assert!(seen.insert((item.gx + c, item.gy + r)));
            }
        }
        assert!(!layout.is_empty());
    }

    #[test]
    fn impossible_fit_gives_up_cleanly() {
        let mut rng = StdRng::seed_from_u64(42);
        let t = make_template("Slab", vec![vec![1, 1, 1, 1]]);
        let mut layout = Layout::new();
        assert!(!place_random(
            &mut layout,
            &t,
            GridDims::new(3, 3),
            20,
            &mut rng
        ));
        assert!(layout.is_empty());
    }

    #[test]
    fn path_covers_grid_and_starts_central() {
        let path = center_out_path(GridDims::new(5, 5));
        assert_eq!(path.len(), 25);
        assert_eq!(path[0], (2, 2));
        assert_eq!(path.iter().copied().collect::<HashSet<_>>().len(), 25);
        // Corners come last.
        let tail: HashSet<_> = path[21..].iter().copied().collect();
        assert_eq!(
            tail,
            HashSet::from([(0, 0), (0, 4), (4, 0), (4, 4)])
        );
    }

    #[test]
    fn center_out_search_prefers_central_spots() {
        let dims = GridDims::new(5, 5);
        let path = center_out_path(dims);
        let t = make_template("Dot", vec![vec![1]]);
        let anchor = find_anchor_center_out(&t.shape, &HashSet::new(), dims, &path);
        assert_eq!(anchor, Some((2, 2)));

        // With the center taken it slides to the next ring.
        let occupied = HashSet::from([(2, 2)]);
        let (gx, gy) = find_anchor_center_out(&t.shape, &occupied, dims, &path).unwrap();
        let d2 = (2 * gx - 4).pow(2) + (2 * gy - 4).pow(2);
        assert_eq!(d2, 4);
    }

    #[test]
    fn full_occupancy_finds_nothing() {
        let dims = GridDims::new(2, 2);
        let path = center_out_path(dims);
        let occupied: HashSet<_> = path.iter().copied().collect();
        let t = make_template("Dot", vec![vec![1]]);
        assert_eq!(
            find_anchor_center_out(&t.shape, &occupied, dims, &path),
            None
        );
    }
}
