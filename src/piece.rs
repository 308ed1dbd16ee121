use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::shapes::{piece_count, Color, PieceKind, Shape};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

/// How many orientations a piece steps through before returning to its base shape.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationCycle {
    /// Base shape plus one and two quarter turns.
    #[default]
    Three,
    Four,
}

impl RotationCycle {
    pub fn orientations(self) -> usize {
        match self {
            RotationCycle::Three => 3,
            RotationCycle::Four => 4,
        }
    }
}

/// The falling tetromino.
///
/// Every orientation in the cycle is precomputed from the base shape when the
/// piece is built, so `rotation` is just an index into `orientations`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Piece {
    kind: PieceKind,
    pub position: Position,
    rotation: usize,
    orientations: Vec<Shape>,
}

impl Piece {
    pub fn new_at(kind: PieceKind, row: i32, col: i32, cycle: RotationCycle) -> Self {
        Self::with_shape(kind, kind.shape(), row, col, cycle)
    }

    /// Piece with an arbitrary base shape. `kind` only supplies the color.
    pub fn with_shape(
        kind: PieceKind,
        shape: Shape,
        row: i32,
        col: i32,
        cycle: RotationCycle,
    ) -> Self {
        let mut orientations = Vec::with_capacity(cycle.orientations());
        let mut shape = shape;
        for _ in 0..cycle.orientations() {
            let next = shape.rotated();
            orientations.push(shape);
            shape = next;
        }
        Self {
            kind,
            position: Position { row, col },
            rotation: 0,
            orientations,
        }
    }

    /// Piece at the top of a board `columns` wide, centered horizontally.
    pub fn spawn(kind: PieceKind, columns: usize, cycle: RotationCycle) -> Self {
        let width = kind.shape().width();
        let col = (columns / 2) as i32 - (width / 2) as i32;
        Self::new_at(kind, 0, col, cycle)
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn rotation(&self) -> usize {
        self.rotation
    }

    pub fn shape(&self) -> &Shape {
        &self.orientations[self.rotation % self.orientations.len()]
    }

    pub fn color(&self) -> Color {
        self.kind.color()
    }

    pub fn cycle_len(&self) -> usize {
        self.orientations.len()
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn blocks(&self) -> impl Iterator<Item = Position> + '_ {
        self.shape().cells().map(|(r, c)| Position {
            row: self.position.row + r as i32,
            col: self.position.col + c as i32,
        })
    }

    pub fn rotated(&self) -> Self {
        Self {
            rotation: (self.rotation + 1) % self.orientations.len(),
            ..self.clone()
        }
    }

    pub fn translated(&self, d_col: i32, d_row: i32) -> Self {
        Self {
            position: Position {
                row: self.position.row + d_row,
                col: self.position.col + d_col,
            },
            ..self.clone()
        }
    }
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// Source of catalog indices for newly spawned pieces.
pub trait PieceProvider {
    fn next_index(&mut self) -> usize;

    fn next_kind(&mut self) -> PieceKind {
        PieceKind::from_index(self.next_index())
    }
}

/// Uniform draw over the whole catalog.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_index(&mut self) -> usize {
        self.rng.gen_range(0..piece_count())
    }
}

pub struct SequencePieceProvider {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<PieceKind>) -> Self {
        Self { pieces, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_index(&mut self) -> usize {
        if self.pieces.is_empty() {
            return 0;
        }
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_centers_each_shape() {
        let i = Piece::spawn(PieceKind::I, 10, RotationCycle::Three);
        assert_eq!(i.position, Position { row: 0, col: 3 });

        let o = Piece::spawn(PieceKind::O, 10, RotationCycle::Three);
        assert_eq!(o.position, Position { row: 0, col: 4 });

        let t = Piece::spawn(PieceKind::T, 10, RotationCycle::Three);
        assert_eq!(t.position, Position { row: 0, col: 4 });
    }

    #[test]
    fn translated_leaves_original_untouched() {
        let piece = Piece::new_at(PieceKind::T, 5, 5, RotationCycle::Three);
        let moved = piece.translated(-1, 2);

        assert_eq!(piece.position, Position { row: 5, col: 5 });
        assert_eq!(moved.position, Position { row: 7, col: 4 });
        assert_eq!(moved.shape(), piece.shape());
    }

    #[test]
    fn rotated_selects_precomputed_orientation() {
        let piece = Piece::new_at(PieceKind::L, 0, 0, RotationCycle::Three);
        let once = piece.rotated();
        let twice = once.rotated();

        assert_eq!(once.rotation, 1);
        assert_eq!(*once.shape(), PieceKind::L.shape().rotated());
        assert_eq!(*twice.shape(), PieceKind::L.shape().rotated().rotated());
        assert_eq!(twice.rotated().rotation, 0);
    }

    #[test]
    fn four_cycle_reaches_every_quarter_turn() {
        let piece = Piece::new_at(PieceKind::J, 0, 0, RotationCycle::Four);
        let third = piece.rotated().rotated().rotated();

        assert_eq!(third.rotation, 3);
        assert_eq!(*third.shape(), PieceKind::J.shape().rotated().rotated().rotated());
        assert_eq!(third.rotated().shape(), piece.shape());
    }

    #[test]
    fn blocks_are_offset_by_origin() {
        let piece = Piece::new_at(PieceKind::O, 3, 7, RotationCycle::Three);
        let blocks: Vec<_> = piece.blocks().collect();

        assert_eq!(
            blocks,
            vec![
                Position { row: 3, col: 7 },
                Position { row: 3, col: 8 },
                Position { row: 4, col: 7 },
                Position { row: 4, col: 8 },
            ]
        );
    }

    #[test]
    fn out_of_cycle_rotation_wraps_instead_of_panicking() {
        let mut piece = Piece::new_at(PieceKind::T, 0, 4, RotationCycle::Three);
        piece.rotation = 3;

        assert_eq!(*piece.shape(), PieceKind::T.shape());
        assert_eq!(piece.blocks().count(), 4);
        assert!(!crate::board::Board::new(10, 20).collides(&piece));
        assert_eq!(piece.rotated().rotation(), 1);
    }

    #[test]
    fn custom_shape_keeps_kind_color_and_rotates() {
        let bar = Shape::from_rows(vec![vec![true, true]]).unwrap();
        let piece = Piece::with_shape(PieceKind::Z, bar.clone(), 2, 3, RotationCycle::Four);

        assert_eq!(piece.kind(), PieceKind::Z);
        assert_eq!(piece.color(), Color::Red);
        assert_eq!(*piece.shape(), bar);
        assert_eq!(
            piece.rotated().blocks().collect::<Vec<_>>(),
            vec![Position { row: 2, col: 3 }, Position { row: 3, col: 3 }]
        );
        assert_eq!(piece.cycle_len(), 4);
    }

    #[test]
    fn seeded_provider_is_reproducible() {
        let mut a = RandomPieceProvider::seeded(7);
        let mut b = RandomPieceProvider::seeded(7);
        for _ in 0..50 {
            let index = a.next_index();
            assert!(index < piece_count());
            assert_eq!(index, b.next_index());
        }
    }

    #[test]
    fn seeded_provider_draws_every_kind() {
        let mut provider = RandomPieceProvider::seeded(2024);
        let mut seen = [false; 7];
        for _ in 0..1000 {
            seen[provider.next_index()] = true;
        }
        assert!(seen.iter().all(|&drawn| drawn), "missing kinds: {:?}", seen);
    }

    #[test]
    fn sequence_provider_cycles() {
        let mut provider = SequencePieceProvider::new(vec![PieceKind::I, PieceKind::O]);

        assert_eq!(provider.next_kind(), PieceKind::I);
        assert_eq!(provider.next_kind(), PieceKind::O);
        assert_eq!(provider.next_kind(), PieceKind::I);
    }
}
