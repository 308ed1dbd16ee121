use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
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

use blockfall::{
    Cell, ConfigStore, Game, GameConfig, GameEvent, RandomPieceProvider, RotationCycle,
};

#[derive(Debug, Parser)]
#[command(name = "blockfall")]
#[command(about = "Falling-block puzzle in the terminal")]
struct Cli {
    /// Config file (defaults to $BLOCKFALL_CONFIG or ~/.config/blockfall/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the piece sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Refuse rotations that would overlap a wall or locked cell
    #[arg(long, default_value_t = false)]
    validated_rotation: bool,
    /// Cycle through all four orientations instead of three
    #[arg(long, default_value_t = false)]
    four_way_rotation: bool,
    /// Write the effective config to the config path and exit
    #[arg(long, default_value_t = false)]
    write_config: bool,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

fn cell_color(color: blockfall::Color) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

// ============================================================================
// Rendering
// ============================================================================

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
}

fn render(frame: &mut Frame, game: &Game, last_clear: u32) {
    let area = frame.size();
    render_game(frame, game, last_clear, area);
    if game.is_game_over() {
        render_game_over(frame, game, area);
    }
}

fn render_game(frame: &mut Frame, game: &Game, last_clear: u32, area: Rect) {
    let columns = game.board().columns() as u16;
    let rows = game.board().rows() as u16;
    let grid_display_width = (columns * CELL_WIDTH) + 2;
    let grid_display_height = rows + 2;
    let info_width = 14;
    let total_width = grid_display_width + info_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, last_clear, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→/AD: Move | ↓/S: Drop | ↑/W: Rotate | R: Restart | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = panel(" Blockfall ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    Cell::Empty => Span::raw(EMPTY_CHAR),
                    Cell::Filled(color) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(cell_color(color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, last_clear: u32, area: Rect) {
    let stat = |label: &'static str, color: Color, value: String| {
        [
            Line::from(""),
            Line::from(Span::styled(label, Style::default().fg(color))),
            Line::from(value),
        ]
    };
    let lines: Vec<Line> = [
        stat("Score", Color::Yellow, game.score().to_string()),
        stat("Lines", Color::Cyan, game.lines_cleared().to_string()),
        stat("Tick", Color::Green, format!("{} ms", game.speed_ms())),
        stat("Last clear", Color::Magenta, last_clear.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(panel(" Info ")),
        area,
    );
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Lines: {}", game.lines_cleared())),
        Line::from(""),
        Line::from(Span::styled(
            "R to restart, ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let popup = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(panel(" Game Over ").style(Style::default().bg(Color::Black)));
    frame.render_widget(popup, centered_rect(28, 11, area));
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
// Main Loop
// ============================================================================

fn load_config(cli: &Cli) -> Result<(ConfigStore, GameConfig)> {
    let store = match &cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::from_env(),
    };
    let mut config = store.load()?;
    if cli.validated_rotation {
        config.rotation_validated = true;
    }
    if cli.four_way_rotation {
        config.rotation_cycle = RotationCycle::Four;
    }
    Ok((store, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (store, config) = load_config(&cli)?;

    if cli.write_config {
        store.save(&config)?;
        println!("wrote {}", store.path().display());
        return Ok(());
    }

    let provider = match cli.seed {
        Some(seed) => RandomPieceProvider::seeded(seed),
        None => RandomPieceProvider::new(),
    };
    let mut game = Game::with_provider(config, Box::new(provider));

    enable_raw_mode().context("enabling raw mode")?;
    stdout().execute(EnterAlternateScreen)?;

    let result = run(&mut game);

    // Always try to restore terminal state.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    result?;

    println!(
        "Final score: {} ({} lines)",
        game.score(),
        game.lines_cleared()
    );
    Ok(())
}

fn run(game: &mut Game) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut last_tick = Instant::now();
    let mut last_clear = 0;

    loop {
        // Render
        terminal.draw(|frame| render(frame, game, last_clear))?;

        // The interval can shrink after any tick, so re-read it every pass.
        let tick_duration = Duration::from_millis(game.speed_ms());
        let timeout = tick_duration
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        // Handle input
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            game.restart();
                            last_tick = Instant::now();
                        }
                        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
                            game.move_left();
                        }
                        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
                            game.move_right();
                        }
                        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
                            game.soft_drop();
                        }
                        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
                            game.rotate();
                        }
                        _ => {}
                    }
                }
            }
        }

        // Update game state
        if !game.is_game_over() && last_tick.elapsed() >= tick_duration {
            game.tick();
            last_tick = Instant::now();
        }

        // Drain events for the info panel
        for event in game.take_events() {
            match event {
                GameEvent::LinesCleared(lines) => last_clear = lines,
                GameEvent::GameRestarted => last_clear = 0,
                _ => {}
            }
        }
    }

    Ok(())
}
