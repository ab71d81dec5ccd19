//! Digest → mirrored 5×5 grid.

use std::fmt;

use crate::digest::Digest;

/// Cells per row and per column.
pub const GRID_SIZE: usize = 5;

/// Columns read from the digest (left half plus the center column).
const SCAN_COLUMNS: usize = GRID_SIZE / 2 + 1;

/// A 5×5 on/off pattern, symmetric about the center column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PatternGrid {
    cells: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl PatternGrid {
    /// Builds the grid from the first 15 hex characters of `digest`.
    ///
    /// Character `i` fills cell `(row = i / 3, col = i % 3)` when its value is
    /// odd. A filled cell left of the center also fills its mirror at
    /// `4 - col`; the center column has no mirror.
    pub fn from_digest(digest: &Digest) -> Self {
        let mut grid = Self::default();

        for (i, nibble) in digest
            .nibbles()
            .take(GRID_SIZE * SCAN_COLUMNS)
            .enumerate()
        {
            if nibble % 2 == 0 {
                continue;
            }
            let (row, col) = (i / SCAN_COLUMNS, i % SCAN_COLUMNS);
            grid.cells[row][col] = true;
            if col < GRID_SIZE / 2 {
                grid.cells[row][GRID_SIZE - 1 - col] = true;
            }
        }

        grid
    }

    /// Whether the cell at column `x`, row `y` is filled.
    ///
    /// Out-of-range coordinates read as empty.
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.cells
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    /// Iterates `(x, y)` of every filled cell in row-major order.
    pub fn filled_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, filled)| **filled)
                .map(move |(x, _)| (x, y))
        })
    }

    pub fn filled_count(&self) -> usize {
        self.filled_cells().count()
    }

    pub fn is_symmetric(&self) -> bool {
        self.cells
            .iter()
            .all(|row| (0..GRID_SIZE / 2).all(|x| row[x] == row[GRID_SIZE - 1 - x]))
    }
}

impl fmt::Display for PatternGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                f.write_str(if *cell { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
