use crate::board::{Board, Cell};
use crate::config::GameConfig;
use crate::piece::{Piece, PieceProvider, RandomPieceProvider};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Running,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    SpeedChanged(u64),
    GameRestarted,
    GameOver,
}

/// What the driver needs after each tick: score for display, speed for
/// scheduling the next tick, and whether to stop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Status {
    pub score: u32,
    pub speed_ms: u64,
    pub game_over: bool,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    config: GameConfig,
    board: Board,
    current_piece: Piece,
    score: u32,
    lines_cleared: u32,
    speed_ms: u64,
    state: GameState,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self::with_provider(config, Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(config: GameConfig, mut provider: Box<dyn PieceProvider>) -> Self {
        let board = Board::new(config.columns, config.rows);
        let current_piece = Piece::spawn(
            provider.next_kind(),
            config.columns,
            config.rotation_cycle,
        );

        let mut game = Self {
            config,
            board,
            current_piece,
            score: 0,
            lines_cleared: 0,
            speed_ms: config.initial_speed_ms,
            state: GameState::Running,
            piece_provider: provider,
            events: Vec::new(),
        };
        game.check_spawn();
        game
    }

    /// Starts from an arbitrary board and falling piece. The board's
    /// dimensions replace the ones in `config`.
    pub fn with_board(config: GameConfig, board: Board, current_piece: Piece) -> Self {
        Self::with_board_and_provider(
            config,
            board,
            current_piece,
            Box::new(RandomPieceProvider::new()),
        )
    }

    pub fn with_board_and_provider(
        mut config: GameConfig,
        board: Board,
        current_piece: Piece,
        provider: Box<dyn PieceProvider>,
    ) -> Self {
        config.columns = board.columns();
        config.rows = board.rows();

        Self {
            config,
            board,
            current_piece,
            score: 0,
            lines_cleared: 0,
            speed_ms: config.initial_speed_ms,
            state: GameState::Running,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// Moves the piece down one row, or locks it and spawns the next one.
    pub fn tick(&mut self) -> Status {
        if self.state == GameState::GameOver {
            return self.status();
        }

        let candidate = self.current_piece.translated(0, 1);
        if self.board.collides(&candidate) {
            self.lock_and_spawn();
        } else {
            self.current_piece = candidate;
            self.events.push(GameEvent::PieceMoved);
        }
        self.status()
    }

    pub fn soft_drop(&mut self) -> Status {
        self.tick()
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1)
    }

    fn shift(&mut self, d_col: i32) -> bool {
        if self.state == GameState::GameOver {
            return false;
        }
        let candidate = self.current_piece.translated(d_col, 0);
        if self.board.collides(&candidate) {
            return false;
        }
        self.current_piece = candidate;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Advances to the next orientation in the cycle. Unless
    /// `rotation_validated` is set the rotation is committed even if it
    /// overlaps a wall or a locked cell.
    pub fn rotate(&mut self) -> bool {
        if self.state == GameState::GameOver {
            return false;
        }
        let candidate = self.current_piece.rotated();
        if self.config.rotation_validated && self.board.collides(&candidate) {
            return false;
        }
        self.current_piece = candidate;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    fn lock_and_spawn(&mut self) {
        // Lock the piece into the board
        self.board.merge(&self.current_piece);
        self.events.push(GameEvent::PieceLocked);

        // Clear full rows and score them
        let lines = self.board.clear_full_lines();
        if lines > 0 {
            self.events.push(GameEvent::LinesCleared(lines));
            self.add_score(lines);
        }
        self.spawn_next_piece();
    }

    /// Each line adds the bonus; every line that leaves the score at or past
    /// the threshold shortens the tick interval, down to the floor.
    fn add_score(&mut self, lines: u32) {
        for _ in 0..lines {
            self.score = self.score.saturating_add(self.config.line_bonus);
            self.lines_cleared += 1;

            if self.score >= self.config.speed_up_score {
                let next = self
                    .speed_ms
                    .saturating_sub(self.config.speed_step_ms)
                    .max(self.config.min_speed_ms);
                if next < self.speed_ms {
                    self.speed_ms = next;
                    self.events.push(GameEvent::SpeedChanged(next));
                }
            }
        }
    }

    pub fn spawn_next_piece(&mut self) {
        let kind = self.piece_provider.next_kind();
        self.current_piece = Piece::spawn(kind, self.board.columns(), self.config.rotation_cycle);
        self.check_spawn();
    }

    /// A piece that overlaps the board the moment it appears ends the game.
    fn check_spawn(&mut self) {
        if self.board.collides(&self.current_piece) {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    pub fn restart(&mut self) {
        // Empty board
        self.board = Board::new(self.config.columns, self.config.rows);

        // Reset score, lines, and speed
        self.score = 0;
        self.lines_cleared = 0;
        self.speed_ms = self.config.initial_speed_ms;
        self.state = GameState::Running;
        self.events.clear();
        self.events.push(GameEvent::GameRestarted);

        self.spawn_next_piece();
    }

    pub fn status(&self) -> Status {
        Status {
            score: self.score,
            speed_ms: self.speed_ms,
            game_over: self.is_game_over(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Locked cells only.
    pub fn board_snapshot(&self) -> Vec<Vec<Cell>> {
        self.board.grid().to_vec()
    }

    pub fn current_piece(&self) -> &Piece {
        &self.current_piece
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.lines_cleared
    }

    pub fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Vec<Vec<Cell>> {
        let mut visual_grid = self.board_snapshot();
        let color = self.current_piece.color();

        for block in self.current_piece.blocks() {
            if block.row < 0 || block.col < 0 {
                continue;
            }
            if let Some(cell) = visual_grid
                .get_mut(block.row as usize)
                .and_then(|row| row.get_mut(block.col as usize))
            {
                *cell = Cell::Filled(color);
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::shapes::Color;

    pub const FILLER: Cell = Cell::Filled(Color::Purple);

    pub fn empty_board() -> Board {
        Board::default()
    }

    pub fn fill_row(board: &mut Board, row: usize) {
        for col in 0..board.columns() {
            board.set(row, col, FILLER);
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, row: usize, gap_col: usize) {
        for col in 0..board.columns() {
            if col != gap_col {
                board.set(row, col, FILLER);
            }
        }
    }
}
