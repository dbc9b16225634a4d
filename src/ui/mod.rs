// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Terminal UI for the trainer.
//!
//! Provides a ratatui-based host around a `Session`: the note timeline,
//! the pattern editor row, session statistics and a help overlay. The
//! host owns the monotonic clock and feeds it to the session as `now`.

mod pattern;
mod stats;
mod timeline;
mod transport;

pub use pattern::PatternWidget;
pub use stats::StatsWidget;
pub use timeline::TimelineWidget;
pub use transport::TransportWidget;

use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tracing::{debug, info, trace, warn};

use crate::audio::{AudioSink, Sound};
use crate::config::{BindingSettings, PresetEvent, PresetWatcher, Settings};
use crate::control::{
    format_shortcut, key_name, Command, ControlAction, KeyBinding, KeyEvent, KeyboardController,
    LogicalAction,
};
use crate::pattern::{PresetLibrary, PATTERN_LEN};
use crate::session::{Mode, Session, TickReport, View};

/// How long an instrument or metronome flash stays lit, in seconds
pub const FLASH_DURATION: f64 = 0.1;

/// How long a status message stays in the status bar
const STATUS_DURATION: Duration = Duration::from_secs(3);

/// Help overlay categories, left column then right column
const HELP_COLUMNS: [&[&str]; 2] = [
    &["Transport", "Tempo", "Scroll", "Volume"],
    &["Pattern", "Keys", "UI"],
];

/// Audio sink that turns sound requests into on-screen flashes
#[derive(Debug, Clone)]
pub struct FlashSink {
    epoch: Instant,
    last: HashMap<Sound, f64>,
}

impl FlashSink {
    /// Create a sink timing flashes against `epoch`
    pub fn new(epoch: Instant) -> Self {
        Self {
            epoch,
            last: HashMap::new(),
        }
    }

    /// When a sound was last requested, in seconds since the epoch
    pub fn last_played(&self, sound: Sound) -> Option<f64> {
        self.last.get(&sound).copied()
    }

    /// Whether a sound's flash is still lit at `now`
    pub fn is_lit(&self, sound: Sound, now: f64) -> bool {
        self.last_played(sound)
            .is_some_and(|at| now >= at && now - at < FLASH_DURATION)
    }
}

impl AudioSink for FlashSink {
    fn play(&mut self, sound: Sound, volume: f32) {
        trace!(?sound, volume, "flash");
        self.last.insert(sound, self.epoch.elapsed().as_secs_f64());
    }
}

/// UI-only state
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Help text visible
    pub show_help: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Status message timestamp
    pub status_time: Option<Instant>,
    /// Pattern editor cursor
    pub cursor: usize,
    /// Drum action waiting for its new key
    pub rebinding: Option<LogicalAction>,
    /// Last preset applied from the library
    pub preset_index: Option<usize>,
}

impl UiState {
    /// Set a status message that will be displayed temporarily
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_time = Some(Instant::now());
    }

    /// Clear expired status message
    pub fn clear_expired_status(&mut self) {
        if let Some(time) = self.status_time {
            if time.elapsed() > STATUS_DURATION {
                self.status_message = None;
                self.status_time = None;
            }
        }
    }

    /// Move the editor cursor, wrapping around the bar
    pub fn move_cursor(&mut self, delta: i32) {
        self.cursor = (self.cursor as i64 + delta as i64).rem_euclid(PATTERN_LEN as i64) as usize;
    }
}

/// Everything the terminal host drives, minus the terminal itself
pub struct AppState {
    pub session: Session,
    pub keyboard: KeyboardController,
    pub presets: PresetLibrary,
    pub ui: UiState,
    pub flashes: FlashSink,
    quit: bool,
}

impl AppState {
    pub fn new(session: Session, keyboard: KeyboardController, presets: PresetLibrary, epoch: Instant) -> Self {
        Self {
            session,
            keyboard,
            presets,
            ui: UiState::default(),
            flashes: FlashSink::new(epoch),
            quit: false,
        }
    }

    /// Whether a quit was requested
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Settings to persist, including the current drum keys
    pub fn settings(&self) -> Settings {
        Settings {
            bindings: BindingSettings::from(self.keyboard.drums()),
            ..self.session.to_settings()
        }
    }

    /// Handle a key press at `now`
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, now: f64) {
        if let Some(action) = self.ui.rebinding.take() {
            if code == KeyCode::Esc {
                self.ui.set_status("Rebind cancelled");
            } else {
                self.keyboard.rebind(action, code);
                info!(%action, key = %key_name(code), "drum key rebound");
                self.ui.set_status(format!("{} bound to '{}'", action, key_name(code)));
            }
            return;
        }

        let Some(action) = self.keyboard.process_key(code, modifiers) else {
            return;
        };
        let edits_pattern = action.is_pattern();

        match action {
            ControlAction::Drum(drum) => {
                self.session.key_down(KeyEvent::new(drum, now), &mut self.flashes);
            }
            ControlAction::Session(command) => self.dispatch(command, now),
            ControlAction::NextPreset => self.step_preset(1, now),
            ControlAction::PrevPreset => self.step_preset(-1, now),
            ControlAction::MoveCursor(delta) => self.ui.move_cursor(delta),
            ControlAction::CycleCursorSlot => {
                self.dispatch(Command::CycleSlot(self.ui.cursor), now);
            }
            ControlAction::Rebind(drum) => {
                self.ui.rebinding = Some(drum);
                self.ui.set_status(format!("Press a key for {} (Esc cancels)", drum));
            }
            ControlAction::ToggleHelp => self.ui.show_help = !self.ui.show_help,
            ControlAction::Quit => self.quit = true,
        }

        if edits_pattern && self.session.auto_randomize() {
            self.ui.set_status("Auto-randomize is on: edits last until the next bar");
        }
    }

    /// Handle a terminal event read at `now`; only key presses matter
    pub fn handle_event(&mut self, event: Event, now: f64) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code, key.modifiers, now);
            }
        }
    }

    /// Apply a preset watcher event
    pub fn handle_preset_event(&mut self, event: PresetEvent) {
        match event {
            PresetEvent::Reloaded(library) => {
                self.ui.set_status(format!("Reloaded {} presets", library.len()));
                self.presets = library;
                self.ui.preset_index = None;
            }
            PresetEvent::Error(err) => {
                warn!("preset reload failed: {}", err);
                self.ui.set_status(format!("Preset error: {}", err));
            }
        }
    }

    /// Advance the session to `now`
    pub fn tick(&mut self, now: f64) -> TickReport {
        let report = self.session.tick(now, &mut self.flashes);
        for judged in &report.judged {
            trace!(?judged, "judged");
        }
        if report.missed > 0 {
            trace!(missed = report.missed, "swept");
        }
        report
    }

    fn dispatch(&mut self, command: Command, now: f64) {
        if command.is_transport() {
            self.ui.show_help = false;
        }
        let status = match &command {
            Command::ToggleAutoRandomize => Some(if self.session.auto_randomize() {
                "Auto-randomize OFF"
            } else {
                "Auto-randomize ON"
            }),
            Command::UndoPattern if !self.session.can_undo() => Some("Nothing to undo"),
            Command::ToggleDemo if self.session.mode() != Mode::Game => {
                Some("Demo is only available in game mode")
            }
            _ => None,
        };

        match self.session.apply(command, now) {
            Ok(()) => {
                if let Some(status) = status {
                    self.ui.set_status(status);
                }
            }
            Err(err) => {
                warn!("{}", err);
                self.ui.set_status(err.to_string());
            }
        }
    }

    fn step_preset(&mut self, direction: i32, now: f64) {
        let len = self.presets.len();
        if len == 0 {
            self.ui.set_status("No presets loaded");
            return;
        }

        let index = match self.ui.preset_index {
            Some(current) => (current as i64 + direction as i64).rem_euclid(len as i64) as usize,
            None if direction >= 0 => 0,
            None => len - 1,
        };
        let Some(preset) = self.presets.get(index).cloned() else {
            return;
        };

        debug!(name = %preset.name, index, "applying preset");
        self.ui.preset_index = Some(index);
        self.ui.set_status(format!("Preset: {}", preset.name));
        self.dispatch(Command::ApplyPreset(preset), now);
    }
}

/// Terminal UI application
pub struct App {
    state: AppState,
    watcher: Option<PresetWatcher>,
    /// Terminal handle
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Monotonic time origin for `now`
    epoch: Instant,
    /// Target frame rate
    frame_rate: u32,
}

impl App {
    /// Take over the terminal and wrap a session
    pub fn new(session: Session, keyboard: KeyboardController, presets: PresetLibrary) -> io::Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let epoch = Instant::now();
        Ok(Self {
            state: AppState::new(session, keyboard, presets, epoch),
            watcher: None,
            terminal,
            epoch,
            frame_rate: 120,
        })
    }

    /// Hot-reload presets from a watcher
    pub fn with_watcher(mut self, watcher: PresetWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Set frame rate
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_rate = fps.clamp(1, 240);
    }

    /// Host state
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Seconds since the app started
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Run until quit
    pub fn run(&mut self) -> io::Result<()> {
        while !self.state.should_quit() {
            if let Some(watcher) = &self.watcher {
                for event in watcher.recv_all() {
                    self.state.handle_preset_event(event);
                }
            }

            for (event, at) in self.poll_events()? {
                self.state.handle_event(event, at);
            }

            let now = self.now();
            self.state.tick(now);
            self.state.ui.clear_expired_status();
            self.draw(now)?;
        }
        Ok(())
    }

    /// Wait up to one frame for input, then drain everything already queued.
    ///
    /// Each event is stamped when it is read, so a second press that arrived
    /// while the previous frame was drawing is not held back another frame.
    pub fn poll_events(&self) -> io::Result<Vec<(Event, f64)>> {
        let timeout = Duration::from_millis(1000 / self.frame_rate as u64);
        let mut events = Vec::new();
        if event::poll(timeout)? {
            events.push((event::read()?, self.now()));
            while event::poll(Duration::ZERO)? {
                events.push((event::read()?, self.now()));
            }
        }
        Ok(events)
    }

    /// Draw the UI
    pub fn draw(&mut self, now: f64) -> io::Result<()> {
        let state = &self.state;
        let view = state.session.view(now);

        self.terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: header, timeline, editor, stats, footer
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3), // Transport
                    Constraint::Min(5),    // Timeline
                    Constraint::Length(4), // Pattern
                    Constraint::Length(6), // Stats and drums
                    Constraint::Length(1), // Status bar
                ])
                .split(area);

            frame.render_widget(
                TransportWidget::new(&view)
                    .beat_flash(state.flashes.is_lit(Sound::MetronomeTick, now))
                    .block(Block::default().borders(Borders::ALL).title(" Taiko Trainer ")),
                chunks[0],
            );

            frame.render_widget(
                TimelineWidget::new(&view)
                    .block(Block::default().borders(Borders::ALL).title(" Timeline ")),
                chunks[1],
            );

            render_pattern(frame, chunks[2], &view, state.ui.cursor);
            render_bottom(frame, chunks[3], &view, state, now);
            render_status_bar(frame, chunks[4], &state.ui);

            if state.ui.show_help {
                render_help_overlay(frame, area, &state.keyboard);
            }
        })?;

        Ok(())
    }

    /// Cleanup terminal on drop
    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the pattern editor
fn render_pattern(frame: &mut Frame, area: Rect, view: &View, cursor: usize) {
    let title = if view.can_undo {
        " Pattern (u: undo) "
    } else {
        " Pattern "
    };
    frame.render_widget(
        PatternWidget::new(&view.pattern, cursor)
            .playing(view.sub_beat_index)
            .block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

/// Render statistics and the drum pad panel
fn render_bottom(frame: &mut Frame, area: Rect, view: &View, state: &AppState, now: f64) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let block = Block::default().borders(Borders::ALL).title(" Stats ");
    match view.mode {
        Mode::Game => frame.render_widget(
            StatsWidget::new(&view.stats, view.elapsed_secs)
                .tip(view.tip)
                .block(block),
            chunks[0],
        ),
        Mode::Visualizer => frame.render_widget(
            Paragraph::new("Visualizer: play freely, press g for game mode")
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            chunks[0],
        ),
    }

    render_drums(frame, chunks[1], state, now);
}

/// Render drum keys, lit while their sound flashes
fn render_drums(frame: &mut Frame, area: Rect, state: &AppState, now: f64) {
    let volumes = state.session.volumes();
    let mut lines: Vec<Line> = LogicalAction::ALL
        .iter()
        .map(|action| {
            let kind = action.kind();
            let lit = state.flashes.is_lit(Sound::from(kind), now);
            let style = if lit {
                Style::default()
                    .fg(timeline::rgb(kind.color()))
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(timeline::rgb(kind.color()))
            };
            Line::from(vec![
                Span::styled(format!(" {:<6}", key_name(state.keyboard.drums().get(*action))), style),
                Span::raw(action.to_string()),
            ])
        })
        .collect();

    lines.truncate(area.height.saturating_sub(2) as usize);
    let title = format!(
        " Drums  Don {:.0}%  Ka {:.0}%  Metro {:.0}% ",
        volumes.don * 100.0,
        volumes.ka * 100.0,
        volumes.metronome * 100.0
    );
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

/// Render status bar
fn render_status_bar(frame: &mut Frame, area: Rect, state: &UiState) {
    let text = if let Some(ref msg) = state.status_message {
        Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))
    } else {
        Span::styled(
            " Space: Start/Stop | g: Mode | m: Demo | ←/→: BPM | o/O: Offset | h: Help | q: Quit",
            Style::default().fg(Color::DarkGray),
        )
    };

    frame.render_widget(Paragraph::new(text), area);
}

/// Help lines for a column of binding categories
fn help_lines<'a>(grouped: &HashMap<String, Vec<&'a KeyBinding>>, categories: &[&str]) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for category in categories {
        let Some(bindings) = grouped.get(*category) else {
            continue;
        };
        let mut entries: Vec<(String, &str)> = bindings
            .iter()
            .map(|binding| (format_shortcut(&binding.shortcut), binding.description.as_str()))
            .collect();
        entries.sort();

        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            category.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(
            entries
                .into_iter()
                .map(|(keys, description)| Line::from(format!("  {:<10} {}", keys, description))),
        );
    }
    lines
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame, area: Rect, keyboard: &KeyboardController) {
    let grouped = keyboard.bindings_by_category();
    let mut columns: Vec<Vec<Line>> = HELP_COLUMNS
        .iter()
        .map(|categories| help_lines(&grouped, categories))
        .collect();

    columns[1].push(Line::from(""));
    columns[1].push(Line::from(Span::styled(
        "Drums",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for action in LogicalAction::ALL {
        columns[1].push(Line::from(format!(
            "  {:<10} {}",
            key_name(keyboard.drums().get(action)),
            action
        )));
    }

    // Calculate centered area
    let rows = columns.iter().map(Vec::len).max().unwrap_or(0) as u16 + 2;
    let width = 84.min(area.width.saturating_sub(4));
    let height = rows.min(area.height.saturating_sub(2));
    let x = area.x + (area.width - width) / 2;
    let y = area.y + (area.height - height) / 2;
    let help_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, help_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);
    for (column, half) in columns.into_iter().zip(halves.iter()) {
        frame.render_widget(Paragraph::new(column), *half);
    }
}
