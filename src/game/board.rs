use std::fmt;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// Pieces in a line needed to win.
const CONNECT: usize = 4;

/// Line directions as (row step, col step). Each direction is walked both
/// ways from the placed cell, except vertical which only needs the cells
/// below it.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Red,
    Yellow,
}

impl Cell {
    /// Digit used in the text dump: 0 empty, 1 red, 2 yellow.
    fn digit(self) -> char {
        match self {
            Cell::Empty => '0',
            Cell::Red => '1',
            Cell::Yellow => '2',
        }
    }
}

/// A 7x6 Connect Four grid.
///
/// Row 0 is the top, row 5 is the bottom. Pieces fall to the lowest empty
/// row of their column, so occupied cells in a column are always contiguous
/// from the bottom up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    ColumnFull,
    InvalidColumn,
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Iterate over every cell as `(row, col, cell)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, line)| line.iter().enumerate().map(move |(col, &c)| (row, col, c)))
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Row where a piece dropped into `col` would land.
    pub fn landing_row(&self, col: usize) -> Option<usize> {
        if col >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.cells[row][col] == Cell::Empty)
    }

    /// Drop a piece in a column, returns the row where it landed
    pub fn drop_piece(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::InvalidColumn);
        }
        let row = self.landing_row(col).ok_or(MoveError::ColumnFull)?;
        self.cells[row][col] = cell;
        Ok(row)
    }

    /// Check if every column's top cell is occupied
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.cells().filter(|&(_, _, c)| c != Cell::Empty).count()
    }

    /// Check if the piece at (row, col) completes a line of four.
    pub fn check_win(&self, row: usize, col: usize) -> bool {
        let cell = self.get(row, col);
        if cell == Cell::Empty {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            let forward = self.run_length(row, col, dr, dc, cell);
            // Nothing can sit above the newest piece in its column.
            let backward = if dc == 0 {
                0
            } else {
                self.run_length(row, col, -dr, -dc, cell)
            };
            1 + forward + backward >= CONNECT
        })
    }

    /// Count consecutive `cell` pieces starting one step away from (row, col).
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, cell: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;
        while (0..ROWS as isize).contains(&r)
            && (0..COLS as isize).contains(&c)
            && self.cells[r as usize][c as usize] == cell
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.cells {
            let digits: Vec<String> = line.iter().map(|c| c.digit().to_string()).collect();
            writeln!(f, "[{}]", digits.join(", "))?;
        }
        Ok(())
    }
}
