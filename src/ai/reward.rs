//! Reward signals delivered to a learning agent. Only terminal outcomes and
//! illegal suggestions are scored; other moves leave the table alone.

use crate::game::{GameOutcome, Player};

pub const WIN: f64 = 1.0;
pub const LOSS: f64 = -1.0;
pub const DRAW: f64 = 0.0;
/// Penalty for suggesting a full column.
pub const ILLEGAL_MOVE: f64 = -0.1;

/// Terminal reward for `me` given how the game ended.
pub fn terminal_reward(outcome: GameOutcome, me: Player) -> f64 {
    match outcome {
        GameOutcome::Winner(winner) if winner == me => WIN,
        GameOutcome::Winner(_) => LOSS,
        GameOutcome::Draw => DRAW,
    }
}
