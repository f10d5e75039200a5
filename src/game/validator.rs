use super::grid::Playfield;
use super::piece::{Tetromino, CELL};

/// Outcome of testing a candidate placement, first failing check wins.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Placement {
    Valid,
    OutOfBoundsLeft,
    OutOfBoundsRight,
    OutOfBoundsBottom,
    OutOfBoundsTop,
    Overlap,
}

/// Classifies `piece` against the locked cells of `grid`.
///
/// Pure: the grid holds only locked cells, so the piece's own current
/// footprint can never be mistaken for an obstacle.
pub fn check_placement(grid: &Playfield, piece: &Tetromino) -> Placement {
    let geometry = piece.geometry();
    let Tetromino { position, .. } = *piece;

    if position.x < 0 {
        return Placement::OutOfBoundsLeft;
    }
    if i32::from(position.x) + i32::from(geometry.width) > grid.width() as i32 {
        return Placement::OutOfBoundsRight;
    }
    if i32::from(position.y) + i32::from(geometry.height) > grid.depth() as i32 {
        return Placement::OutOfBoundsBottom;
    }
    if position.y < 0 {
        return Placement::OutOfBoundsTop;
    }
    if piece.cells().any(|cell| grid.is_occupied(cell.x, cell.y)) {
        return Placement::Overlap;
    }
    Placement::Valid
}

pub fn can_place(grid: &Playfield, piece: &Tetromino) -> bool {
    check_placement(grid, piece) == Placement::Valid
}

/// The piece's bottom edge sits on the field floor (no room for another row).
pub fn reaches_floor(grid: &Playfield, piece: &Tetromino) -> bool {
    let bottom = i32::from(piece.position.y) + i32::from(piece.geometry().height);
    bottom + i32::from(CELL) > grid.depth() as i32
}

/// Advancing one more logical row would overlap a locked cell.
pub fn rests_on_stack(grid: &Playfield, piece: &Tetromino) -> bool {
    piece
        .moved(0, CELL)
        .cells()
        .any(|cell| grid.is_occupied(cell.x, cell.y))
}

/// Either lock condition holds: the piece cannot descend any further.
pub fn should_lock(grid: &Playfield, piece: &Tetromino) -> bool {
    reaches_floor(grid, piece) || rests_on_stack(grid, piece)
}
