//! Watch command implementation - Interactive TUI for playing a match.
//!
//! The human slot is driven from the keyboard; every accepted command goes
//! through the runner so the session can be saved as a recording.

// CLI watch uses intentional casts for display and timing
#![allow(clippy::cast_possible_truncation)]

use super::{CliError, MatchArgs};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use skirmish::game::{pick_target, MatchState, MilitaryUnit, UnitOrder};
use skirmish::replay::{building_symbol, unit_symbol};
use skirmish::tournament::MatchRunner;
use skirmish::{BuildingKind, Command, Coord, PlayerId, TickEvents, UnitId, UnitKind};
use std::collections::{HashMap, VecDeque};
use std::io::stdout;
use std::path::Path;
use std::time::{Duration, Instant};

/// Lines kept in the event log panel.
const LOG_LINES: usize = 8;

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the match cannot be set up, the TUI fails, or the
/// recording cannot be saved.
pub(crate) fn execute(setup: &MatchArgs, speed: u64, save: Option<&Path>) -> Result<(), CliError> {
    let mut config = setup.resolve()?;
    // The keyboard drives the human slot.
    config.human_autopilot = false;
    let runner = MatchRunner::new(config)?;

    let runner = run_tui(runner, speed)?;

    if let Some(path) = save {
        runner.recording().save(path)?;
        println!("Recording saved to: {}", path.display());
    }
    Ok(())
}

/// App state for the TUI.
struct App {
    runner: MatchRunner,
    paused: bool,
    speed_ms: u64,
    last_step: Instant,
    log: VecDeque<String>,
}

impl App {
    fn new(runner: MatchRunner, speed_ms: u64) -> Self {
        Self {
            runner,
            paused: true, // Start paused
            speed_ms,
            last_step: Instant::now(),
            log: VecDeque::with_capacity(LOG_LINES),
        }
    }

    fn human(&self) -> PlayerId {
        self.runner.state().local_player
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() == LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }

    fn step_forward(&mut self) {
        if self.runner.is_finished() {
            return;
        }
        let tick = self.runner.state().tick;
        let events = self.runner.step();
        self.log_events(tick, &events);
        self.last_step = Instant::now();
    }

    fn log_events(&mut self, tick: u64, events: &TickEvents) {
        for player in &events.eliminated {
            self.push_log(format!("[{tick}] player {player} eliminated"));
        }
        for destroyed in &events.destroyed {
            self.push_log(format!(
                "[{tick}] {:?} of player {} destroyed by {}",
                destroyed.kind, destroyed.owner, destroyed.by
            ));
        }
        if let Some(winner) = events.winner {
            self.push_log(format!("[{tick}] player {winner} wins"));
        }
    }

    fn issue(&mut self, command: Command, label: &str) {
        let tick = self.runner.state().tick;
        match self.runner.issue(command) {
            Ok(()) => self.push_log(format!("[{tick}] {label}")),
            Err(e) => self.push_log(format!("[{tick}] {label} rejected: {e}")),
        }
    }

    fn train(&mut self, kind: UnitKind) {
        let player = self.human();
        self.issue(Command::TrainUnit { player, kind }, &format!("train {kind}"));
    }

    fn upgrade(&mut self) {
        let player = self.human();
        self.issue(Command::UpgradeAge { player }, "upgrade age");
    }

    fn own_units(&self, filter: impl Fn(&MilitaryUnit) -> bool) -> Vec<UnitId> {
        let state = self.runner.state();
        state
            .units_of(state.local_player)
            .filter(|u| filter(u))
            .map(|u| u.id)
            .collect()
    }

    fn attack(&mut self) {
        let state = self.runner.state();
        let Some(target) = pick_target(state, state.local_player) else {
            self.push_log("no target left".to_string());
            return;
        };
        let units = self.own_units(|u| !matches!(u.order, UnitOrder::Attack { .. }));
        if units.is_empty() {
            self.push_log("no free units".to_string());
            return;
        }
        let order = UnitOrder::Attack {
            target,
            target_owner: None,
        };
        let label = format!("{} units attack {target}", units.len());
        self.issue(Command::IssueOrder { units, order }, &label);
    }

    fn halt(&mut self) {
        let units = self.own_units(|_| true);
        let label = format!("{} units halt", units.len());
        self.issue(
            Command::IssueOrder {
                units,
                order: UnitOrder::Idle,
            },
            &label,
        );
    }

    fn select_all(&mut self) {
        let units = self.own_units(|_| true);
        let label = format!("{} units selected", units.len());
        self.issue(Command::SelectUnits { units }, &label);
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(25).max(10);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 25).min(1000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.runner.is_finished()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }
}

fn run_tui(runner: MatchRunner, speed: u64) -> Result<MatchRunner, CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(runner, speed);

    loop {
        terminal.draw(|f| ui(f, &app))?;

        if app.should_auto_step() {
            app.step_forward();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(20))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('1') => app.train(UnitKind::Infantry),
                KeyCode::Char('2') => app.train(UnitKind::Helicopter),
                KeyCode::Char('3') => app.train(UnitKind::Tank),
                KeyCode::Char('u') => app.upgrade(),
                KeyCode::Char('a') => app.attack(),
                KeyCode::Char('x') => app.halt(),
                KeyCode::Char('s') => app.select_all(),
                _ => {}
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(app.runner)
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Main content
            Constraint::Length(3),  // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(LOG_LINES as u16 + 2)])
        .split(main_chunks[1]);

    render_map(f, main_chunks[0], app.runner.state());
    render_stats(f, side_chunks[0], app.runner.state());
    render_log(f, side_chunks[1], app);
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let state = app.runner.state();
    let max_ticks = app.runner.config().max_ticks;

    let status = if state.is_over() {
        "GAME OVER"
    } else if app.runner.is_finished() {
        "TICK LIMIT"
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let title = format!(
        " Skirmish | Tick {}/{max_ticks} | {status} | Speed: {}ms | Seed: {} ",
        state.tick,
        app.speed_ms,
        state.seed
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

/// First visible coordinate on one axis, keeping `focus` centred.
fn viewport_start(focus: u16, visible: u16, extent: u16) -> u16 {
    if visible >= extent {
        return 0;
    }
    focus.saturating_sub(visible / 2).min(extent - visible)
}

fn render_map(f: &mut Frame, area: Rect, state: &MatchState) {
    let map = &state.map;
    let units: HashMap<Coord, &MilitaryUnit> = state.units.iter().map(|u| (u.tile, u)).collect();

    let visible_width = area.width.saturating_sub(2).min(map.width());
    let visible_height = area.height.saturating_sub(2).min(map.height());
    let focus = state
        .get_player(state.local_player)
        .map_or(Coord::new(0, 0), |p| p.base);
    let start_x = viewport_start(focus.x, visible_width, map.width());
    let start_y = viewport_start(focus.y, visible_height, map.height());

    let mut lines: Vec<Line> = Vec::with_capacity(usize::from(visible_height));
    for y in start_y..start_y + visible_height {
        let mut spans = Vec::with_capacity(usize::from(visible_width));
        for x in start_x..start_x + visible_width {
            let coord = Coord::new(x, y);
            let span = if let Some(unit) = units.get(&coord) {
                Span::styled(
                    unit_symbol(unit.kind).to_string(),
                    Style::default()
                        .fg(player_color(unit.owner))
                        .add_modifier(Modifier::BOLD),
                )
            } else if let Some(tile) = map.get(coord) {
                let color = match (tile.owner(), tile.kind()) {
                    (Some(owner), _) => player_color(owner),
                    (None, BuildingKind::Water) => Color::Cyan,
                    (None, BuildingKind::Tree) => Color::Green,
                    (None, _) => Color::DarkGray,
                };
                Span::styled(building_symbol(tile.kind()).to_string(), Style::default().fg(color))
            } else {
                Span::raw(" ")
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let map_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Map "));

    f.render_widget(map_widget, area);
}

fn render_stats(f: &mut Frame, area: Rect, state: &MatchState) {
    let mut lines = Vec::new();

    for player in &state.players {
        let color = player_color(player.id);
        let role = if player.id == state.local_player { " (you)" } else { "" };
        let status = if player.eliminated { " [ELIMINATED]" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(
                format!("P{} {}", player.id, player.name),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{role}{status}")),
        ]));

        if !player.eliminated {
            lines.push(Line::from(format!(
                "  Money: {:.0}  Age: {}",
                player.money,
                player.age.number()
            )));
            lines.push(Line::from(format!(
                "  Pop: {}/{}  Units: {}",
                state.population_used(player.id),
                player.pop_cap,
                state.units_of(player.id).count()
            )));
            lines.push(Line::from(format!("  Score: {}", player.score)));
        }
        lines.push(Line::from(""));
    }

    let stats_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Settlements "))
        .wrap(Wrap { trim: false });

    f.render_widget(stats_widget, area);
}

fn render_log(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = app.log.iter().map(|l| Line::from(l.as_str())).collect();
    let log_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Events "));
    f.render_widget(log_widget, area);
}

fn player_color(id: PlayerId) -> Color {
    match id {
        1 => Color::Blue,
        2 => Color::Red,
        3 => Color::Green,
        4 => Color::Yellow,
        _ => Color::White,
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.runner.is_finished() {
        " [q] Quit "
    } else {
        " [q] Quit  [Space] Pause  [→] Step  [+/-] Speed  [1/2/3] Train inf/heli/tank  [u] Upgrade  [a] Attack  [x] Halt  [s] Select "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
