//! Core Connect Four game logic: board representation, players, the board
//! fingerprint, and the rules engine with its seated opponent.

mod board;
mod engine;
mod fingerprint;
mod player;

pub use board::{Board, Cell, MoveError, COLS, ROWS};
pub use engine::{EngineConfig, GameEngine, GameOutcome, Seat, AGENT_SIDE};
pub use fingerprint::{fingerprint, Fingerprint};
pub use player::Player;
