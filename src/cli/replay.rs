//! Replay command implementation.

use super::{CliError, ReplayFormat};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use skirmish::replay::{render_text, Recording, ReplayEngine, ReplayError};
use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

/// Ticks skipped by the page keys in the TUI.
const PAGE_TICKS: u64 = 40;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the recording cannot be loaded or replayed.
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn execute(
    recording_path: PathBuf,
    format: ReplayFormat,
    tick: Option<u64>,
    every: u64,
) -> Result<(), CliError> {
    let recording = Recording::load(&recording_path).map_err(|e| {
        CliError::new(format!(
            "Failed to load recording {}: {e}",
            recording_path.display()
        ))
    })?;

    let engine = match tick {
        Some(target) => ReplayEngine::new_at_tick(recording, target)?,
        None => ReplayEngine::new(recording)?,
    };

    match format {
        ReplayFormat::Tui => run_replay_tui(engine),
        ReplayFormat::Text => print_replay(engine, every.max(1), |e| e.render_ascii()),
        ReplayFormat::Summary => print_replay(engine, every.max(1), |e| {
            render_text(e.state(), e.recording().config.max_ticks)
        }),
    }
}

fn run_replay_tui(mut engine: ReplayEngine) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(10),
                    Constraint::Length(3),
                ])
                .split(f.area());

            let status = if engine.is_game_over() { "GAME OVER" } else { "REPLAY" };
            let title = format!(
                " Skirmish Replay | Tick {}/{} | {status} | Seed: {} ",
                engine.tick(),
                engine.recording().config.max_ticks,
                engine.state().seed
            );
            let header = Paragraph::new(title)
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(header, chunks[0]);

            // The summary renders without ANSI escapes, so it is safe inside
            // a widget.
            let summary = render_text(engine.state(), engine.recording().config.max_ticks);
            let body = Paragraph::new(summary)
                .block(Block::default().borders(Borders::ALL).title(" State "));
            f.render_widget(body, chunks[1]);

            let controls = " [q] Quit  [←/→] Step  [PgUp/PgDn] Jump 40  [Home] Start ";
            let footer = Paragraph::new(controls)
                .style(Style::default().fg(Color::Gray))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(footer, chunks[2]);
        })?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let outcome = match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Right | KeyCode::Char('l') => engine.step_forward().map(|_| ()),
                KeyCode::Left | KeyCode::Char('h') => engine.step_backward(),
                KeyCode::PageDown => {
                    let target = (engine.tick() + PAGE_TICKS).min(engine.recording().config.max_ticks);
                    engine.goto_tick(target)
                }
                KeyCode::PageUp => engine.goto_tick(engine.tick().saturating_sub(PAGE_TICKS)),
                KeyCode::Home => engine.goto_tick(0),
                _ => Ok(()),
            };
            // Stepping past either end is not an error for the viewer.
            if let Err(e) = outcome
                && !matches!(e, ReplayError::GameOver | ReplayError::TickOutOfBounds { .. })
            {
                disable_raw_mode()?;
                execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
                return Err(e.into());
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

fn print_replay(
    mut engine: ReplayEngine,
    every: u64,
    render: impl Fn(&ReplayEngine) -> String,
) -> Result<(), CliError> {
    let config = engine.recording().config;
    println!(
        "Replay of match (seed: {})",
        config.seed.unwrap_or_default()
    );
    println!("Max ticks: {}", config.max_ticks);
    println!("Commands: {}", engine.recording().commands.len());
    println!();

    loop {
        if engine.tick() % every == 0 || engine.is_game_over() {
            println!("{}", render(&engine));
            println!();
        }

        if engine.is_game_over() {
            println!("=== GAME OVER ===");
            break;
        }

        let before = engine.tick();
        match engine.step_forward() {
            // A paused recording never advances.
            Ok(_) if engine.tick() == before => break,
            Ok(_) => {}
            Err(ReplayError::GameOver) => {
                println!("=== GAME OVER ===");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
