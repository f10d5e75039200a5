use super::piece::{PieceKind, Tetromino, CELL};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellState {
    Empty,
    Filled(PieceKind),
}

impl CellState {
    pub fn is_filled(self) -> bool {
        self != CellState::Empty
    }
}

// ============================================================================
// Playfield
// ============================================================================

/// Locked cells of the board, stored row-major in grid units.
///
/// The active piece is never written here until it locks, so the validator
/// can test candidate placements against the grid as-is.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Playfield {
    width: usize,
    depth: usize,
    rows: Vec<Vec<CellState>>,
}

impl Playfield {
    pub fn new(width: usize, depth: usize) -> Self {
        Self {
            width,
            depth,
            rows: vec![vec![CellState::Empty; width]; depth],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn rows(&self) -> &[Vec<CellState>] {
        &self.rows
    }

    pub fn get(&self, x: i16, y: i16) -> Option<CellState> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        self.rows.get(y)?.get(x).copied()
    }

    /// Out-of-bounds coordinates read as empty; bounds are the validator's job.
    pub fn is_occupied(&self, x: i16, y: i16) -> bool {
        self.get(x, y).is_some_and(CellState::is_filled)
    }

    /// Returns `false` without writing if the coordinate is off the board.
    pub fn set(&mut self, x: i16, y: i16, cell: CellState) -> bool {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return false;
        };
        match self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Fills the whole logical cell whose top-left unit is `(x, y)`.
    pub fn fill_block(&mut self, x: i16, y: i16, cell: CellState) {
        for dy in 0..CELL {
            for dx in 0..CELL {
                self.set(x + dx, y + dy, cell);
            }
        }
    }

    /// Writes the piece's full footprint as locked cells.
    pub fn lock(&mut self, piece: &Tetromino) {
        let cell = CellState::Filled(piece.kind);
        for block in piece.blocks() {
            self.fill_block(block.x, block.y, cell);
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(CellState::Empty);
        }
    }

    pub fn logical_rows(&self) -> usize {
        self.depth / CELL as usize
    }

    fn unit_rows(&self, logical_row: usize) -> std::ops::Range<usize> {
        let top = (logical_row * CELL as usize).min(self.depth);
        top..(top + CELL as usize).min(self.depth)
    }

    /// A logical row is complete when every unit of both its unit rows is filled.
    pub fn is_row_complete(&self, logical_row: usize) -> bool {
        let units = self.unit_rows(logical_row);
        !units.is_empty()
            && self.rows[units]
                .iter()
                .all(|row| row.iter().all(|cell| cell.is_filled()))
    }

    pub fn filled_count_in_row(&self, logical_row: usize) -> usize {
        self.rows[self.unit_rows(logical_row)]
            .iter()
            .flatten()
            .filter(|cell| cell.is_filled())
            .count()
    }

    pub fn total_filled_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.is_filled()).count()
    }

    // ========================================================================
    // Line Clearing
    // ========================================================================

    /// Removes every complete logical row in one pass and shifts everything
    /// above each removed row down by one logical row. Returns the count.
    pub fn clear_lines(&mut self) -> u32 {
        let mut cleared = 0;
        let mut row = 0;

        while row < self.logical_rows() {
            if self.is_row_complete(row) {
                let units = self.unit_rows(row);
                let height = units.len();
                self.rows.drain(units);
                for _ in 0..height {
                    self.rows.insert(0, vec![CellState::Empty; self.width]);
                }
                cleared += 1;
            }
            // Whatever shifted into this row was already scanned.
            row += 1;
        }

        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_fills_two_by_two_per_block() {
        let mut grid = Playfield::new(20, 36);
        grid.lock(&Tetromino::new_at(PieceKind::O, 4, 10));

        assert_eq!(grid.total_filled_cells(), 16);
        for (x, y) in [(4, 10), (5, 10), (4, 11), (5, 11), (7, 13)] {
            assert!(grid.is_occupied(x, y), "({x}, {y}) should be filled");
        }
        assert!(!grid.is_occupied(8, 10));
        assert!(!grid.is_occupied(3, 10));
    }

    #[test]
    fn out_of_bounds_reads_are_empty_and_writes_ignored() {
        let mut grid = Playfield::new(8, 8);
        assert_eq!(grid.get(-1, 0), None);
        assert!(!grid.is_occupied(8, 0));
        assert!(!grid.set(0, 8, CellState::Filled(PieceKind::T)));
        assert_eq!(grid.total_filled_cells(), 0);
    }

    #[test]
    fn clear_resets_every_cell() {
        let mut grid = Playfield::new(8, 8);
        grid.fill_block(0, 0, CellState::Filled(PieceKind::Z));
        grid.clear();
        assert_eq!(grid, Playfield::new(8, 8));
    }
}
