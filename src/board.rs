use crate::piece::Piece;
use crate::shapes::Color;

pub const BOARD_COLUMNS: usize = 10;
pub const BOARD_ROWS: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Empty,
    Filled(Color),
}

impl Cell {
    pub fn is_filled(self) -> bool {
        self != Cell::Empty
    }
}

/// Grid of locked cells. Row 0 is the top; dimensions never change.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    columns: usize,
    grid: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            grid: vec![vec![Cell::Empty; columns]; rows],
        }
    }

    /// Builds a board from explicit rows. Rows are padded or truncated to the
    /// width of the first row.
    pub fn from_rows(mut grid: Vec<Vec<Cell>>) -> Self {
        let columns = grid.first().map_or(0, Vec::len);
        for row in &mut grid {
            row.resize(columns, Cell::Empty);
        }
        Self { columns, grid }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    pub fn grid(&self) -> &[Vec<Cell>] {
        &self.grid
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    fn in_range(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows() && (col as usize) < self.columns
    }

    /// Out-of-range coordinates count as occupied.
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        if !self.in_range(row, col) {
            return true;
        }
        self.grid[row as usize][col as usize].is_filled()
    }

    /// True when any occupied cell of `piece` is below the floor, past either
    /// wall, or on a locked cell. Cells above the top row are free.
    pub fn collides(&self, piece: &Piece) -> bool {
        piece.blocks().any(|block| {
            if block.row >= self.rows() as i32 || block.col < 0 || block.col >= self.columns as i32 {
                return true;
            }
            block.row >= 0 && self.is_occupied(block.row, block.col)
        })
    }

    /// Writes the piece's color into every cell it covers. Cells outside the
    /// grid or already filled are left alone.
    pub fn merge(&mut self, piece: &Piece) {
        let color = piece.color();
        for block in piece.blocks() {
            if self.in_range(block.row, block.col) {
                let slot = &mut self.grid[block.row as usize][block.col as usize];
                if *slot == Cell::Empty {
                    *slot = Cell::Filled(color);
                }
            }
        }
    }

    /// Removes every full row, inserting empty rows at the top so the height is
    /// unchanged. Returns the number of rows removed.
    pub fn clear_full_lines(&mut self) -> u32 {
        let rows = self.rows();
        let columns = self.columns;
        self.grid.retain(|row| !row.iter().all(|cell| cell.is_filled()));

        let cleared = rows - self.grid.len();
        if cleared > 0 {
            let mut refilled = vec![vec![Cell::Empty; columns]; cleared];
            refilled.append(&mut self.grid);
            self.grid = refilled;
        }
        cleared as u32
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.grid
            .get(row)
            .is_some_and(|r| r.iter().all(|cell| cell.is_filled()))
    }

    pub fn filled_in_row(&self, row: usize) -> usize {
        self.grid
            .get(row)
            .map_or(0, |r| r.iter().filter(|cell| cell.is_filled()).count())
    }

    pub fn filled_cells(&self) -> usize {
        self.grid.iter().flatten().filter(|cell| cell.is_filled()).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_COLUMNS, BOARD_ROWS)
    }
}
