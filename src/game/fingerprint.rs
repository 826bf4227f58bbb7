//! Board fingerprint used as the Q-table key.
//!
//! Every cell contributes `weight * (row + 7 * col)` with weights 1/2/3 for
//! empty/red/yellow. The sum is deterministic but not injective: distinct
//! boards can share a fingerprint, and the Q-table then treats them as one
//! state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{Board, Cell, COLS};

/// Integer key derived from the full contents of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(pub u32);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn weight(cell: Cell) -> u32 {
    match cell {
        Cell::Empty => 1,
        Cell::Red => 2,
        Cell::Yellow => 3,
    }
}

/// Compute the positional-sum fingerprint of a board.
pub fn fingerprint(board: &Board) -> Fingerprint {
    let sum: u32 = board
        .cells()
        .map(|(row, col, cell)| weight(cell) * (row + COLS * col) as u32)
        .sum();
    Fingerprint(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ROWS;

    #[test]
    fn test_empty_board_fingerprint() {
        // Sum of (row + 7 * col) over the grid with weight 1.
        let expected: usize = (0..COLS)
            .flat_map(|col| (0..ROWS).map(move |row| row + COLS * col))
            .sum();
        assert_eq!(fingerprint(&Board::new()), Fingerprint(expected as u32));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let mut board = Board::new();
        board.drop_piece(3, Cell::Red).unwrap();
        board.drop_piece(4, Cell::Yellow).unwrap();

        let first = fingerprint(&board);
        assert_eq!(first, fingerprint(&board));

        let copy = board;
        assert_eq!(first, fingerprint(&copy));
    }

    #[test]
    fn test_piece_changes_fingerprint_by_weight_delta() {
        let empty = fingerprint(&Board::new()).0;
        let mut board = Board::new();
        // Bottom of column 2 is row 5: index 5 + 14 = 19.
        board.drop_piece(2, Cell::Yellow).unwrap();
        assert_eq!(fingerprint(&board).0, empty + 2 * 19);
    }

    #[test]
    fn test_distinct_boards_can_collide() {
        // One yellow at the bottom of column 1 adds 2 * 12.
        let mut a = Board::new();
        a.drop_piece(1, Cell::Yellow).unwrap();

        // Reds at the bottom of columns 0 and 2 add 5 + 19.
        let mut b = Board::new();
        b.drop_piece(0, Cell::Red).unwrap();
        b.drop_piece(2, Cell::Red).unwrap();

        assert_ne!(a, b);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }
}
