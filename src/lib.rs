pub mod ai;
pub mod engine;
pub mod error;
pub mod goban;
pub mod handicap;
pub mod stone;
pub mod territory;
pub mod turn;

/// Board coordinate as `(col, row)`, zero-based.
pub type Point = (u8, u8);

pub use ai::choose_move;
pub use engine::{BotMove, Engine, GameState, MoveOutcome, PassOutcome, Stage};
pub use error::GoError;
pub use goban::{Captures, Goban, Group};
pub use stone::Stone;
pub use territory::{GameScore, PlayerPoints, Winner};
pub use turn::{Move, Turn};
