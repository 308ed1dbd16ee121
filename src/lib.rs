//! Falling-block puzzle engine.
//!
//! The library holds the whole game state: the shape catalog, the falling
//! piece, the board of locked cells and the controller that ties them
//! together. Rendering, input and timing live in the binary.

pub mod board;
pub mod config;
pub mod game;
pub mod piece;
pub mod shapes;

pub use board::{Board, Cell};
pub use config::{ConfigStore, GameConfig};
pub use game::{Game, GameEvent, GameState, Status};
pub use piece::{
    Piece, PieceProvider, Position, RandomPieceProvider, RotationCycle, SequencePieceProvider,
};
pub use shapes::{color_of, piece_count, shape_of, Color, PieceKind, Shape};
