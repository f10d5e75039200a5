pub mod gravity;
pub mod grid;
pub mod piece;
pub mod provider;
pub mod validator;

use std::time::Duration;

pub use grid::{CellState, Playfield};
pub use piece::{Geometry, PieceKind, Position, Rotation, Tetromino, CELL};
pub use provider::{PieceProvider, RandomPieceProvider, SequencePieceProvider};
pub use validator::{can_place, check_placement, Placement};

use crate::config::GameConfig;
use crate::error::GameError;
use gravity::GravityTimer;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Running,
    Paused,
    GameOver,
}

/// A discrete request from the input source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    TogglePause,
    Exit,
}

/// One grid unit whose visible state changed, with its new contents.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CellChange {
    pub position: Position,
    pub cell: CellState,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    CellsChanged(Vec<CellChange>),
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    Paused,
    Unpaused,
    GameRestarted,
    GameOver,
    ExitRequested,
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub grid: Playfield,
    pub current_piece: Tetromino,
    pub next_piece: PieceKind,
    pub score: u32,
    pub lines_cleared: u32,
    pub state: GameState,
    config: GameConfig,
    gravity: GravityTimer,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
    exit_requested: bool,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        Self::build(GameConfig::default(), provider)
    }

    pub fn with_config(
        config: GameConfig,
        provider: Box<dyn PieceProvider>,
    ) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self::build(config, provider))
    }

    /// Starts from an arbitrary board and active piece. The board's size
    /// overrides the default dimensions.
    pub fn with_grid(grid: Playfield, current_piece: Tetromino) -> Self {
        let config = GameConfig {
            board_width: grid.width(),
            board_depth: grid.depth(),
            ..GameConfig::default()
        };
        let mut provider: Box<dyn PieceProvider> = Box::new(RandomPieceProvider::new());
        let next_piece = provider.next_piece();

        Self {
            grid,
            current_piece,
            next_piece,
            score: 0,
            lines_cleared: 0,
            state: GameState::Running,
            gravity: GravityTimer::new(config.tick_interval),
            config,
            piece_provider: provider,
            events: Vec::new(),
            exit_requested: false,
        }
    }

    fn build(config: GameConfig, mut provider: Box<dyn PieceProvider>) -> Self {
        let current = provider.next_piece();
        let next_piece = provider.next_piece();
        let (x, y) = config.spawn_position();

        Self {
            grid: Playfield::new(config.board_width, config.board_depth),
            current_piece: Tetromino::new_at(current, x, y),
            next_piece,
            score: 0,
            lines_cleared: 0,
            state: GameState::Running,
            gravity: GravityTimer::new(config.tick_interval),
            config,
            piece_provider: provider,
            events: Vec::new(),
            exit_requested: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Promotes the lookahead piece to the spawn point and refills the slot.
    /// A blocked spawn ends the game.
    pub fn spawn_next(&mut self) {
        let kind = self.next_piece;
        self.next_piece = self.piece_provider.next_piece();

        let (x, y) = self.config.spawn_position();
        self.current_piece = Tetromino::new_at(kind, x, y);
        self.gravity.reset();

        if !can_place(&self.grid, &self.current_piece) {
            self.state = GameState::GameOver;
            self.events.push(GameEvent::GameOver);
        }
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Shifts the active piece by `(dx, dy)` grid units if the target is legal.
    /// A rejected move leaves the piece where it was.
    pub fn move_piece(&mut self, dx: i16, dy: i16) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        if dx == 0 && dy == 0 {
            return true;
        }
        let moved = self.current_piece.moved(dx, dy);
        if can_place(&self.grid, &moved) {
            self.current_piece = moved;
            self.events.push(GameEvent::PieceMoved);
            true
        } else {
            false
        }
    }

    /// Turns the active piece a quarter clockwise, shifting the anchor to
    /// compensate for the bounding box change. O pieces never turn.
    pub fn rotate_piece(&mut self) -> bool {
        if self.state != GameState::Running || !self.current_piece.kind.rotates() {
            return false;
        }
        let rotated = self.current_piece.rotated();
        if can_place(&self.grid, &rotated) {
            self.current_piece = rotated;
            self.events.push(GameEvent::PieceRotated);
            true
        } else {
            false
        }
    }

    /// Moves down one logical row, then locks if the piece cannot go further.
    pub fn soft_drop(&mut self) -> bool {
        if self.state != GameState::Running {
            return false;
        }
        let moved = self.move_piece(0, CELL);
        if validator::should_lock(&self.grid, &self.current_piece) {
            self.lock_and_spawn();
        }
        moved
    }

    pub fn advance_gravity(&mut self) {
        self.soft_drop();
    }

    // ========================================================================
    // Locking and Scoring
    // ========================================================================

    pub fn lock_and_spawn(&mut self) {
        self.grid.lock(&self.current_piece);
        self.events.push(GameEvent::PieceLocked);

        let lines = self.clear_lines();
        if lines > 0 {
            self.add_score(lines);
        }
        self.spawn_next();
    }

    pub fn clear_lines(&mut self) -> u32 {
        let cleared = self.grid.clear_lines();
        if cleared > 0 {
            self.events.push(GameEvent::LinesCleared(cleared));
        }
        cleared
    }

    pub fn add_score(&mut self, lines: u32) {
        let points = self.config.points_per_line.saturating_mul(lines);
        self.score = self.score.saturating_add(points);
        self.lines_cleared = self.lines_cleared.saturating_add(lines);
    }

    // ========================================================================
    // Session Control
    // ========================================================================

    pub fn toggle_pause(&mut self) {
        match self.state {
            GameState::Running => {
                self.state = GameState::Paused;
                self.events.push(GameEvent::Paused);
            }
            GameState::Paused => {
                self.state = GameState::Running;
                self.events.push(GameEvent::Unpaused);
            }
            GameState::GameOver => {}
        }
    }

    /// Routes one intent. Exit is honored in every state; while paused only
    /// the pause toggle gets through, and a finished game ignores the rest.
    pub fn apply_intent(&mut self, intent: Intent) -> bool {
        match (self.state, intent) {
            (_, Intent::Exit) => {
                self.exit_requested = true;
                self.events.push(GameEvent::ExitRequested);
                true
            }
            (GameState::GameOver, _) => false,
            (_, Intent::TogglePause) => {
                self.toggle_pause();
                true
            }
            (GameState::Paused, _) => false,
            (GameState::Running, Intent::MoveLeft) => self.move_piece(-CELL, 0),
            (GameState::Running, Intent::MoveRight) => self.move_piece(CELL, 0),
            (GameState::Running, Intent::SoftDrop) => self.soft_drop(),
            (GameState::Running, Intent::Rotate) => self.rotate_piece(),
        }
    }

    /// One step of the host loop: applies `intent`, runs gravity if the tick
    /// interval has elapsed, and returns everything that happened, including
    /// the visible cells that changed.
    pub fn tick(&mut self, elapsed: Duration, intent: Option<Intent>) -> Vec<GameEvent> {
        let before = self.render_grid();

        if let Some(intent) = intent {
            self.apply_intent(intent);
        }
        if self.state == GameState::Running && self.gravity.advance(elapsed) {
            self.advance_gravity();
        }

        let changes = diff_cells(&before, &self.render_grid());
        if !changes.is_empty() {
            self.events.push(GameEvent::CellsChanged(changes));
        }
        self.take_events()
    }

    pub fn restart(&mut self) {
        self.grid.clear();
        self.score = 0;
        self.lines_cleared = 0;
        self.state = GameState::Running;
        self.exit_requested = false;
        self.events.clear();
        self.gravity.reset();

        let current = self.piece_provider.next_piece();
        self.next_piece = self.piece_provider.next_piece();
        let (x, y) = self.config.spawn_position();
        self.current_piece = Tetromino::new_at(current, x, y);

        self.events.push(GameEvent::GameRestarted);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The locked grid with the active piece drawn over it. Once the game is
    /// over the piece that failed to spawn is left off.
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual = self.grid.rows().to_vec();
        if self.state == GameState::GameOver {
            return visual;
        }
        let cell = CellState::Filled(self.current_piece.kind);

        for unit in self.current_piece.cells() {
            let (Ok(x), Ok(y)) = (usize::try_from(unit.x), usize::try_from(unit.y)) else {
                continue;
            };
            if let Some(slot) = visual.get_mut(y).and_then(|row| row.get_mut(x)) {
                *slot = cell;
            }
        }
        visual
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn is_row_complete(&self, logical_row: usize) -> bool {
        self.grid.is_row_complete(logical_row)
    }

    pub fn filled_count_in_row(&self, logical_row: usize) -> usize {
        self.grid.filled_count_in_row(logical_row)
    }

    pub fn total_filled_cells(&self) -> usize {
        self.grid.total_filled_cells()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn diff_cells(before: &[Vec<CellState>], after: &[Vec<CellState>]) -> Vec<CellChange> {
    let mut changes = Vec::new();
    for (y, (old_row, new_row)) in before.iter().zip(after).enumerate() {
        for (x, (old, new)) in old_row.iter().zip(new_row).enumerate() {
            if old == new {
                continue;
            }
            let (Ok(x), Ok(y)) = (i16::try_from(x), i16::try_from(y)) else {
                continue;
            };
            changes.push(CellChange {
                position: Position { x, y },
                cell: *new,
            });
        }
    }
    changes
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::config::{DEFAULT_BOARD_DEPTH, DEFAULT_BOARD_WIDTH};

    pub fn empty_grid() -> Playfield {
        Playfield::new(DEFAULT_BOARD_WIDTH, DEFAULT_BOARD_DEPTH)
    }

    /// Fills every logical cell of `logical_row`.
    pub fn fill_row(grid: &mut Playfield, logical_row: usize) {
        fill_row_with_gap(grid, logical_row, usize::MAX);
    }

    /// Fills `logical_row` except for the logical column `gap_column`.
    pub fn fill_row_with_gap(grid: &mut Playfield, logical_row: usize, gap_column: usize) {
        let columns = grid.width() / CELL as usize;
        for column in (0..columns).filter(|&c| c != gap_column) {
            fill_cell(grid, column, logical_row, PieceKind::T);
        }
    }

    /// Fills the logical cell at `(column, row)`.
    pub fn fill_cell(grid: &mut Playfield, column: usize, row: usize, kind: PieceKind) {
        grid.fill_block(
            column as i16 * CELL,
            row as i16 * CELL,
            CellState::Filled(kind),
        );
    }

    pub fn sequence(pieces: &[PieceKind]) -> Box<dyn PieceProvider> {
        Box::new(SequencePieceProvider::new(pieces.to_vec()).expect("non-empty sequence"))
    }
}
