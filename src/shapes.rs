use anyhow::{bail, Result};

// ============================================================================
// Catalog
// ============================================================================

const I_ROWS: &[&[u8]] = &[&[1, 1, 1, 1]];
const O_ROWS: &[&[u8]] = &[&[1, 1], &[1, 1]];
const T_ROWS: &[&[u8]] = &[&[0, 1, 0], &[1, 1, 1]];
const L_ROWS: &[&[u8]] = &[&[1, 0, 0], &[1, 1, 1]];
const J_ROWS: &[&[u8]] = &[&[0, 0, 1], &[1, 1, 1]];
const S_ROWS: &[&[u8]] = &[&[1, 1, 0], &[0, 1, 1]];
const Z_ROWS: &[&[u8]] = &[&[0, 1, 1], &[1, 1, 0]];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    /// Catalog order. A piece index always refers to this ordering.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn index(self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::L => 3,
            PieceKind::J => 4,
            PieceKind::S => 5,
            PieceKind::Z => 6,
        }
    }

    pub fn shape(self) -> Shape {
        let rows = match self {
            PieceKind::I => I_ROWS,
            PieceKind::O => O_ROWS,
            PieceKind::T => T_ROWS,
            PieceKind::L => L_ROWS,
            PieceKind::J => J_ROWS,
            PieceKind::S => S_ROWS,
            PieceKind::Z => Z_ROWS,
        };
        Shape::from_catalog(rows)
    }

    pub fn color(self) -> Color {
        match self {
            PieceKind::I => Color::Turquoise,
            PieceKind::O => Color::Orange,
            PieceKind::T => Color::Purple,
            PieceKind::L => Color::Blue,
            PieceKind::J => Color::Carrot,
            PieceKind::S => Color::Emerald,
            PieceKind::Z => Color::Red,
        }
    }
}

/// Display color id of a locked or falling cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Turquoise,
    Orange,
    Purple,
    Blue,
    Carrot,
    Emerald,
    Red,
}

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Turquoise => (0x1a, 0xbc, 0x9c),
            Color::Orange => (0xf3, 0x9c, 0x12),
            Color::Purple => (0x8e, 0x44, 0xad),
            Color::Blue => (0x34, 0x98, 0xdb),
            Color::Carrot => (0xe6, 0x7e, 0x22),
            Color::Emerald => (0x2e, 0xcc, 0x71),
            Color::Red => (0xe7, 0x4c, 0x3c),
        }
    }
}

pub fn piece_count() -> usize {
    PieceKind::ALL.len()
}

/// Base orientation of the catalog entry at `index` (taken modulo the catalog size).
pub fn shape_of(index: usize) -> Shape {
    PieceKind::from_index(index).shape()
}

pub fn color_of(index: usize) -> Color {
    PieceKind::from_index(index).color()
}

// ============================================================================
// Shape
// ============================================================================

/// Rectangular matrix of occupied/empty cells, row-major, row 0 on top.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            bail!("shape must have at least one row");
        };
        let width = first.len();
        if width == 0 {
            bail!("shape rows must not be empty");
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                bail!("shape row {} has width {}, expected {}", i, row.len(), width);
            }
            if !row.iter().any(|&filled| filled) {
                bail!("shape row {} has no occupied cell", i);
            }
        }
        Ok(Self { rows })
    }

    fn from_catalog(rows: &[&[u8]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|&cell| cell != 0).collect())
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Offsets `(row, col)` of every occupied cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(c, _)| (r, c))
        })
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Quarter turn: transpose, then reverse the row order.
    pub fn rotated(&self) -> Self {
        let mut rows: Vec<Vec<bool>> = (0..self.width())
            .map(|c| self.rows.iter().map(|row| row[c]).collect())
            .collect();
        rows.reverse();
        Self { rows }
    }
}
