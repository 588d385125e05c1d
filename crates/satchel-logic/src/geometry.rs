//! Shape matrices and grid geometry.
//!
//! Items are irregular polyominoes described by a rectangular matrix of
//! [`CellKind`]s. Only `Body` cells occupy grid space; star cells hang off
//! the body and probe whatever sits underneath them. Rotation is a quarter
//! turn clockwise (transpose then reverse each row), so four rotations
//! return the original matrix.

use serde::{Deserialize, Serialize};

/// One cell of a shape matrix. Catalog JSON encodes these as `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CellKind {
    Empty,
    Body,
    StarA,
    StarB,
    StarC,
}

impl CellKind {
    /// The star kind this cell carries, if it is a star cell.
    pub fn star_kind(&self) -> Option<StarKind> {
        match self {
            CellKind::StarA => Some(StarKind::A),
            CellKind::StarB => Some(StarKind::B),
            CellKind::StarC => Some(StarKind::C),
            _ => None,
        }
    }
}

impl TryFrom<u8> for CellKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CellKind::Empty),
            1 => Ok(CellKind::Body),
            2 => Ok(CellKind::StarA),
            3 => Ok(CellKind::StarB),
            4 => Ok(CellKind::StarC),
            other => Err(format!("invalid cell code {other} (expected 0..=4)")),
        }
    }
}

impl From<CellKind> for u8 {
    fn from(cell: CellKind) -> u8 {
        match cell {
            CellKind::Empty => 0,
            CellKind::Body => 1,
            CellKind::StarA => 2,
            CellKind::StarB => 3,
            CellKind::StarC => 4,
        }
    }
}

/// The three star flavours. Each has its own rule list, activation counter,
/// and duplicate-target bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StarKind {
    #[serde(rename = "STAR_A")]
    A,
    #[serde(rename = "STAR_B")]
    B,
    #[serde(rename = "STAR_C")]
    C,
}

impl StarKind {
    pub const ALL: [StarKind; 3] = [StarKind::A, StarKind::B, StarKind::C];

    /// Short display label, as used in modifier-log reasons ("Star A").
    pub fn label(&self) -> &'static str {
        match self {
            StarKind::A => "A",
            StarKind::B => "B",
            StarKind::C => "C",
        }
    }

    /// Catalog spelling ("STAR_A").
    pub fn as_str(&self) -> &'static str {
        match self {
            StarKind::A => "STAR_A",
            StarKind::B => "STAR_B",
            StarKind::C => "STAR_C",
        }
    }

    pub fn from_name(name: &str) -> Option<StarKind> {
        StarKind::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Per-kind activation counters, reset at the start of every run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StarCounts {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl StarCounts {
    pub fn get(&self, kind: StarKind) -> u32 {
        match kind {
            StarKind::A => self.a,
            StarKind::B => self.b,
            StarKind::C => self.c,
        }
    }

    pub fn bump(&mut self, kind: StarKind) {
        match kind {
            StarKind::A => self.a += 1,
            StarKind::B => self.b += 1,
            StarKind::C => self.c += 1,
        }
    }

    pub fn clear(&mut self) {
        *self = StarCounts::default();
    }
}

/// Bounding box of a shape's Body cells, in matrix coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBounds {
    pub min_c: i32,
    pub max_c: i32,
    pub min_r: i32,
    pub max_r: i32,
}

/// A rectangular matrix of cells. Guaranteed non-empty and rectangular
/// (the `TryFrom` deserializer rejects ragged or empty input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct ShapeMatrix {
    cells: Vec<Vec<CellKind>>,
}

impl TryFrom<Vec<Vec<u8>>> for ShapeMatrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err("shape matrix must have at least one row and column".to_string());
        }
        let width = rows[0].len();
        let mut cells = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != width {
                return Err(format!(
                    "ragged shape matrix: expected {} columns, found {}",
                    width,
                    row.len()
                ));
            }
            let mut out = Vec::with_capacity(width);
            for code in row {
                out.push(CellKind::try_from(code)?);
            }
            cells.push(out);
        }
        Ok(ShapeMatrix { cells })
    }
}

impl From<ShapeMatrix> for Vec<Vec<u8>> {
    fn from(shape: ShapeMatrix) -> Vec<Vec<u8>> {
        shape
            .cells
            .iter()
            .map(|row| row.iter().map(|&c| u8::from(c)).collect())
            .collect()
    }
}

impl ShapeMatrix {
    pub fn rows(&self) -> i32 {
        self.cells.len() as i32
    }

    pub fn cols(&self) -> i32 {
        self.cells[0].len() as i32
    }

    pub fn cell(&self, r: i32, c: i32) -> CellKind {
        self.cells[r as usize][c as usize]
    }

    /// A quarter turn clockwise: transpose then reverse each row.
    /// Width and height swap; four applications are the identity.
    pub fn rotated(&self) -> ShapeMatrix {
        let rows = self.cells.len();
        let cols = self.cells[0].len();
        let mut out = vec![vec![CellKind::Empty; rows]; cols];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.cells[rows - 1 - j][i];
            }
        }
        ShapeMatrix { cells: out }
    }

    /// Matrix offsets `(c, r)` of every Body cell, row-major order.
    pub fn body_cells(&self) -> Vec<(i32, i32)> {
        let mut out = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if *cell == CellKind::Body {
                    out.push((c as i32, r as i32));
                }
            }
        }
        out
    }

    /// Matrix offsets of every star cell with its kind, row-major order.
    pub fn star_cells(&self) -> Vec<(StarKind, i32, i32)> {
        let mut out = Vec::new();
        for (r, row) in self.cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(kind) = cell.star_kind() {
                    out.push((kind, c as i32, r as i32));
                }
            }
        }
        out
    }

    /// Bounding box of the Body cells, or `None` for a body-less shape.
    pub fn body_bounds(&self) -> Option<BodyBounds> {
        let body = self.body_cells();
        let (first_c, first_r) = *body.first()?;
        let mut bounds = BodyBounds {
            min_c: first_c,
            max_c: first_c,
            min_r: first_r,
            max_r: first_r,
        };
        for (c, r) in body {
            bounds.min_c = bounds.min_c.min(c);
            bounds.max_c = bounds.max_c.max(c);
            bounds.min_r = bounds.min_r.min(r);
            bounds.max_r = bounds.max_r.max(r);
        }
        Some(bounds)
    }

    /// Offset of the first Body cell in row-major order. Layout keys are the
    /// item's grid anchor plus this offset.
    pub fn body_anchor(&self) -> Option<(i32, i32)> {
        self.body_cells().first().copied()
    }
}

/// Backpack grid dimensions, a per-run parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub cols: i32,
    pub rows: i32,
}

impl GridDims {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.cols && y >= 0 && y < self.rows
    }
}
