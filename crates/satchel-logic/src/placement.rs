//! Placement validation: Body cells only.
//!
//! Star and Empty cells never participate. A star may hang over the grid
//! edge or over another item's Body; only Body cells must be in bounds
//! and collision-free. Anchors may therefore be negative when a shape has
//! leading star or empty rows/columns.

use std::collections::HashSet;

use crate::geometry::{GridDims, ShapeMatrix};
use crate::layout::Layout;

/// Grid cells covered by Body cells of every item in the layout.
pub fn occupied_cells(layout: &Layout) -> HashSet<(i32, i32)> {
    let mut occupied = HashSet::new();
    for item in layout.values() {
        for (c, r) in item.shape.body_cells() {
            occupied.insert((item.gx + c, item.gy + r));
        }
    }
    occupied
}

/// Validate a placement against a precomputed occupancy set. Solvers
/// probing many anchors reuse one set across probes.
pub fn is_valid_against(
    shape: &ShapeMatrix,
    gx: i32,
    gy: i32,
    occupied: &HashSet<(i32, i32)>,
    dims: GridDims,
) -> bool {
    for (c, r) in shape.body_cells() {
        let (x, y) = (gx + c, gy + r);
        if !dims.contains(x, y) || occupied.contains(&(x, y)) {
            return false;
        }
    }
    true
}

/// Validate a placement against a layout.
pub fn is_valid(shape: &ShapeMatrix, gx: i32, gy: i32, layout: &Layout, dims: GridDims) -> bool {
    is_valid_against(shape, gx, gy, &occupied_cells(layout), dims)
}

/// Inclusive anchor range keeping a shape's Body box in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorBounds {
    pub gx_min: i32,
    pub gx_max: i32,
    pub gy_min: i32,
    pub gy_max: i32,
}

/// Anchor range for this shape at its current rotation, or `None` when
/// the Body box cannot fit the grid at all.
pub fn anchor_bounds(shape: &ShapeMatrix, dims: GridDims) -> Option<AnchorBounds> {
    let bounds = shape.body_bounds()?;
    let out = AnchorBounds {
        gx_min: -bounds.min_c,
        gx_max: dims.cols - (bounds.max_c + 1),
        gy_min: -bounds.min_r,
        gy_max: dims.rows - (bounds.max_r + 1),
    };
    if out.gx_max < out.gx_min || out.gy_max < out.gy_min {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemTemplate, PlacedItem};

    fn shape(rows: Vec<Vec<u8>>) -> ShapeMatrix {
        ShapeMatrix::try_from(rows).unwrap()
    }

    fn layout_with(shape_rows: Vec<Vec<u8>>, gx: i32, gy: i32) -> Layout {
        let template: ItemTemplate = serde_json::from_value(serde_json::json!({
            "name": "Block",
            "rarity": "COMMON",
            "item_class": "NEUTRAL",
            "shape": shape_rows,
            "base_score": 1.0
        }))
        .unwrap();
        let mut layout = Layout::new();
        layout.insert(PlacedItem::from_template(&template, gx, gy));
        layout
    }

    #[test]
    fn bounds_checked_for_body_only() {
        let dims = GridDims::new(3, 3);
        // Star on top, body below: the star may poke out above the grid.
        let s = shape(vec![vec![2], vec![1]]);
        let layout = Layout::new();
        assert!(is_valid(&s, 0, -1, &layout, dims));
        assert!(is_valid(&s, 0, 1, &layout, dims));
        assert!(!is_valid(&s, 0, 2, &layout, dims));
        assert!(!is_valid(&s, 3, 0, &layout, dims));
    }

    #[test]
    fn body_overlap_rejected_star_overlap_allowed() {
        let dims = GridDims::new(4, 4);
        let layout = layout_with(vec![vec![1, 1]], 0, 0);
        let body = shape(vec![vec![1]]);
        assert!(!is_valid(&body, 1, 0, &layout, dims));
        assert!(is_valid(&body, 2, 0, &layout, dims));
        // A star sitting on the occupied cell is fine.
        let starred = shape(vec![vec![2], vec![1]]);
        assert!(is_valid(&starred, 1, 0, &layout, dims));
    }

    #[test]
    fn precomputed_set_matches_layout_validation() {
        let dims = GridDims::new(4, 4);
        let layout = layout_with(vec![vec![1], vec![1]], 2, 1);
        let occupied = occupied_cells(&layout);
        assert_eq!(occupied.len(), 2);
        let probe = shape(vec![vec![1]]);
        for x in 0..4 {
            for y in 0..4 {
                assert_eq!(
                    is_valid(&probe, x, y, &layout, dims),
                    is_valid_against(&probe, x, y, &occupied, dims),
                );
            }
        }
    }

    #[test]
    fn anchor_bounds_allow_negative_anchors() {
        let dims = GridDims::new(3, 3);
        // Leading star column shifts the body right, so gx may be -1.
        let s = shape(vec![vec![2, 1]]);
        let b = anchor_bounds(&s, dims).unwrap();
        assert_eq!((b.gx_min, b.gx_max), (-1, 1));
        assert_eq!((b.gy_min, b.gy_max), (0, 2));
    }

    #[test]
    fn oversized_body_has_no_anchor_range() {
        let dims = GridDims::new(2, 2);
        let s = shape(vec![vec![1, 1, 1]]);
        assert!(anchor_bounds(&s, dims).is_none());
        // But fits after rotation.
        assert!(anchor_bounds(&s.rotated(), dims).is_none());
        let tall = shape(vec![vec![1], vec![1]]);
        assert!(anchor_bounds(&tall, dims).is_some());
    }
}
