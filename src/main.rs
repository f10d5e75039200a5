use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};

use console_tetris::config::{DEFAULT_BOARD_DEPTH, DEFAULT_BOARD_WIDTH, DEFAULT_TICK_MS};
use console_tetris::game::{
    CellState, Game, GameEvent, GameState, Intent, PieceKind, PieceProvider, RandomPieceProvider,
    Rotation, SequencePieceProvider, CELL,
};
use console_tetris::GameConfig;

// ============================================================================
// Command Line
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "console-tetris", about = "Falling-block puzzle in the terminal")]
struct Args {
    /// Board width in grid units (two per column)
    #[arg(long, default_value_t = DEFAULT_BOARD_WIDTH)]
    width: usize,

    /// Board depth in grid units (two per row)
    #[arg(long, default_value_t = DEFAULT_BOARD_DEPTH)]
    depth: usize,

    /// Gravity interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// RNG seed for a repeatable piece order
    #[arg(long)]
    seed: Option<u64>,

    /// Fixed cyclic piece order, e.g. "IJLOSTZ" (overrides --seed)
    #[arg(long)]
    sequence: Option<String>,
}

impl Args {
    fn config(&self) -> GameConfig {
        GameConfig {
            board_width: self.width,
            board_depth: self.depth,
            tick_interval: Duration::from_millis(self.tick_ms),
            ..GameConfig::default()
        }
    }

    fn provider(&self) -> Result<Box<dyn PieceProvider>> {
        if let Some(letters) = &self.sequence {
            let provider = SequencePieceProvider::parse(letters).context("invalid --sequence")?;
            return Ok(Box::new(provider));
        }
        Ok(match self.seed {
            Some(seed) => Box::new(RandomPieceProvider::seeded(seed)),
            None => Box::new(RandomPieceProvider::new()),
        })
    }
}

// ============================================================================
// Visual Constants
// ============================================================================

const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

fn piece_color(kind: PieceKind) -> Color {
    match kind {
        PieceKind::I => Color::Cyan,
        PieceKind::J => Color::Blue,
        PieceKind::L => Color::Rgb(184, 134, 11),
        PieceKind::O => Color::Yellow,
        PieceKind::S => Color::Green,
        PieceKind::T => Color::Magenta,
        PieceKind::Z => Color::Red,
    }
}

// ============================================================================
// Rendering
// ============================================================================

struct View {
    /// Whether the blinking pause banner is currently shown.
    pause_banner: bool,
}

fn render(frame: &mut Frame, game: &Game, view: &View) {
    let area = frame.size();
    let config = game.config();

    let board_width = terminal_extent(config.logical_columns() * 2);
    let board_height = terminal_extent(config.logical_rows());
    let side_width: u16 = 18;
    let main_area = centered_rect(
        board_width.saturating_add(side_width * 2),
        board_height,
        area,
    );

    let columns = Layout::horizontal([
        Constraint::Length(side_width),
        Constraint::Length(board_width),
        Constraint::Length(side_width),
    ])
    .split(main_area);

    render_status(frame, game, view, columns[0]);
    render_board(frame, game, columns[1]);
    render_help(frame, columns[2]);

    if game.state == GameState::GameOver {
        render_game_over(frame, game, area);
    }
}

fn render_board(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual = game.render_grid();
    let step = CELL as usize;

    // One terminal row per logical row, sampled at each block's top-left unit.
    let lines: Vec<Line> = visual
        .iter()
        .step_by(step)
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .step_by(step)
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(kind) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(piece_color(*kind)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_status(frame: &mut Frame, game: &Game, view: &View, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("SCORE: "),
            Span::styled(game.score.to_string(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw("LINES: "),
            Span::styled(
                game.lines_cleared.to_string(),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(""),
        Line::from("NEXT"),
        Line::from(""),
    ];
    lines.extend(preview_lines(game.next_piece));

    if game.state == GameState::Paused && view.pause_banner {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Game Paused",
            Style::default().bg(Color::Green).fg(Color::Black),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn preview_lines(kind: PieceKind) -> Vec<Line<'static>> {
    let geometry = kind.geometry(Rotation::SPAWN);
    let color = piece_color(kind);

    (0..geometry.height / CELL)
        .map(|row| {
            let spans: Vec<Span> = (0..geometry.width / CELL)
                .map(|column| {
                    let offset = (column * CELL, row * CELL);
                    if geometry.offsets.contains(&offset) {
                        Span::styled(BLOCK_CHAR, Style::default().fg(color))
                    } else {
                        Span::raw(EMPTY_CHAR)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn render_help(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from("  H E L P"),
        Line::from(""),
        Line::from(" ←    Left"),
        Line::from(" →    Right"),
        Line::from(" ↑    Rotate"),
        Line::from(" ↓    Speed Up"),
        Line::from(" P    Pause"),
        Line::from(" ESC  Exit"),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score)),
        Line::from(format!("Lines: {}", game.lines_cleared)),
        Line::from(""),
        Line::from(Span::styled(
            "R to restart, ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(28, 9, area));
}

/// Terminal cells needed for `inner` cells plus a border on each side.
fn terminal_extent(inner: usize) -> u16 {
    u16::try_from(inner).unwrap_or(u16::MAX).saturating_add(2)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

enum Command {
    Intent(Intent),
    Restart,
}

fn read_command() -> Result<Option<Command>> {
    if !event::poll(Duration::ZERO)? {
        return Ok(None);
    }
    let Event::Key(key) = event::read()? else {
        return Ok(None);
    };
    if key.kind != KeyEventKind::Press {
        return Ok(None);
    }

    let command = match key.code {
        KeyCode::Left => Command::Intent(Intent::MoveLeft),
        KeyCode::Right => Command::Intent(Intent::MoveRight),
        KeyCode::Up => Command::Intent(Intent::Rotate),
        KeyCode::Down => Command::Intent(Intent::SoftDrop),
        KeyCode::Char('p') | KeyCode::Char('P') => Command::Intent(Intent::TogglePause),
        KeyCode::Esc => Command::Intent(Intent::Exit),
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Tui, game: &mut Game) -> Result<()> {
    let mut view = View { pause_banner: false };
    let mut last_poll = Instant::now();
    let mut since_blink = Duration::ZERO;
    let mut dirty = true;

    loop {
        if dirty {
            terminal.draw(|frame| render(frame, game, &view))?;
            dirty = false;
        }

        let intent = match read_command()? {
            Some(Command::Restart) if game.is_game_over() => {
                game.restart();
                game.take_events();
                dirty = true;
                None
            }
            Some(Command::Intent(intent)) => Some(intent),
            _ => None,
        };

        let elapsed = last_poll.elapsed();
        last_poll = Instant::now();

        let events = game.tick(elapsed, intent);
        if game.exit_requested() {
            return Ok(());
        }
        dirty |= !events.is_empty();

        if game.state == GameState::Paused {
            since_blink += elapsed;
            if since_blink >= game.config().tick_interval {
                since_blink = Duration::ZERO;
                view.pause_banner = !view.pause_banner;
                dirty = true;
            }
        } else if events.contains(&GameEvent::Unpaused) {
            view.pause_banner = false;
            since_blink = Duration::ZERO;
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

// ============================================================================
// Terminal Lifecycle
// ============================================================================

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("failed to enable raw mode")?;
    stdout()
        .execute(EnterAlternateScreen)
        .context("failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    Ok(terminal)
}

/// Runs every restore step even if an earlier one fails, then reports the
/// first failure.
fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("failed to disable raw mode");
    let screen = stdout()
        .execute(LeaveAlternateScreen)
        .map(|_| ())
        .context("failed to leave alternate screen");
    let shown = stdout()
        .execute(cursor::Show)
        .map(|_| ())
        .context("failed to show cursor");
    raw.and(screen).and(shown)
}

/// Calls `restore` after `setup` and `body`, whichever of them fails. An
/// error from `setup` or `body` takes precedence over one from `restore`.
fn with_terminal<T>(
    setup: impl FnOnce() -> Result<T>,
    body: impl FnOnce(&mut T) -> Result<()>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<()> {
    let result = setup().and_then(|mut terminal| body(&mut terminal));
    let restored = restore();
    result.and(restored)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut game = Game::with_config(args.config(), args.provider()?)
        .context("invalid board configuration")?;

    with_terminal(
        setup_terminal,
        |terminal| run(terminal, &mut game),
        restore_terminal,
    )?;

    println!("Score: {}  Lines: {}", game.score, game.lines_cleared);
    Ok(())
}
