// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Trainer session.
//!
//! `Session` owns every piece of mutable trainer state: transport, pattern,
//! scheduler, live targets, statistics, and the mode flags. The host talks
//! to it through three entry points:
//! - `apply` for commands (menu and keyboard controls)
//! - `key_down` for drum presses
//! - `tick` once per frame, which runs the clock, scheduler, judgment and
//!   sweep in that order
//!
//! Rendering reads a snapshot from `view`.

pub mod view;

pub use view::{GridLine, JudgmentDisplay, NoteMarker, View};

use std::fmt;

use tracing::{debug, info, warn};

use crate::audio::{AudioSink, Sound, Volumes};
use crate::config::{Settings, MAX_OFFSET};
use crate::control::{Command, KeyEvent};
use crate::error::{Result, TrainerError};
use crate::judge::{AutoHit, AutoPlayer, InputEvent, Judged, Judgment, JudgmentEngine, LastJudgment, SessionStats};
use crate::pattern::{NoteKind, Pattern, PatternStore};
use crate::sequencer::scheduler::lookahead_steps;
use crate::sequencer::{EchoTrack, ScrollSettings, TargetNote, TargetScheduler, Viewport, DEFAULT_TIMELINE_WIDTH};
use crate::timing::{Transport, MAX_BPM, MIN_BPM, STEPS_PER_BAR};

/// Lead-in before the first beat when a preset is applied mid-run, in seconds
pub const PRESET_LEAD_IN: f64 = 3.0;

/// What the timeline does with drum presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Notes scroll toward the hit marker and presses are judged
    Game,
    /// Presses are echoed as markers scrolling away from the hit marker
    Visualizer,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Game => write!(f, "GAME"),
            Mode::Visualizer => write!(f, "VISUALIZER"),
        }
    }
}

/// Everything that happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// A beat boundary was crossed
    pub metronome_tick: bool,
    /// Targets materialized this tick
    pub scheduled: usize,
    /// Judgments produced by player and demo inputs, in order
    pub judged: Vec<Judged>,
    /// Presses synthesized by the demo driver
    pub auto_hits: Vec<AutoHit>,
    /// Targets swept as misses
    pub missed: u32,
}

/// Explicit trainer state
#[derive(Debug, Clone)]
pub struct Session {
    transport: Transport,
    patterns: PatternStore,
    scheduler: TargetScheduler,
    engine: JudgmentEngine,
    autoplay: AutoPlayer,
    echoes: EchoTrack,
    volumes: Volumes,
    scroll: ScrollSettings,
    mode: Mode,
    demo: bool,
    auto_randomize: bool,
    /// Input offset in seconds
    offset: f64,
    /// Player inputs waiting for the next tick
    pending: Vec<InputEvent>,
    last_judgment: Option<LastJudgment>,
    /// Instrument and time of the last matched press
    last_hit: Option<(NoteKind, f64)>,
    /// When the transport was last started, lead-in included
    session_start: Option<f64>,
}

impl Session {
    /// Create a stopped session from settings
    pub fn new(settings: &Settings) -> Self {
        Self::with_store(settings, PatternStore::with_pattern(Pattern::from_raw(&settings.pattern)))
    }

    /// Create a session whose randomizer uses a fixed seed
    pub fn with_seed(settings: &Settings, seed: u64) -> Self {
        Self::with_store(settings, PatternStore::with_seed(Pattern::from_raw(&settings.pattern), seed))
    }

    fn with_store(settings: &Settings, patterns: PatternStore) -> Self {
        let settings = settings.clone().validated();
        Self {
            transport: Transport::new(settings.bpm),
            patterns,
            scheduler: TargetScheduler::new(),
            engine: JudgmentEngine::new(),
            autoplay: AutoPlayer::new(),
            echoes: EchoTrack::new(),
            volumes: settings.volume.into(),
            scroll: ScrollSettings {
                speed_multiplier: settings.speed_multiplier,
                scale_to_tempo: settings.scale_to_tempo,
            },
            mode: if settings.game_mode { Mode::Game } else { Mode::Visualizer },
            demo: false,
            auto_randomize: settings.auto_randomize,
            offset: settings.offset,
            pending: Vec::new(),
            last_judgment: None,
            last_hit: None,
            session_start: None,
        }
    }

    /// Settings record for persistence. Drum bindings are left at their
    /// defaults; they belong to the input host.
    pub fn to_settings(&self) -> Settings {
        Settings {
            bpm: self.transport.bpm(),
            offset: self.offset,
            speed_multiplier: self.scroll.speed_multiplier,
            scale_to_tempo: self.scroll.scale_to_tempo,
            game_mode: self.mode == Mode::Game,
            auto_randomize: self.auto_randomize,
            pattern: self.patterns.pattern().to_raw(),
            volume: self.volumes.into(),
            ..Settings::default()
        }
    }

    /// Apply a command at time `now`
    pub fn apply(&mut self, command: Command, now: f64) -> Result<()> {
        match command {
            Command::ToggleTransport => {
                if self.transport.is_active() {
                    self.stop();
                } else {
                    self.start(now, 0.0);
                }
            }
            Command::ToggleGameMode => {
                self.stop();
                self.mode = match self.mode {
                    Mode::Game => Mode::Visualizer,
                    Mode::Visualizer => Mode::Game,
                };
                self.demo = false;
                self.echoes.clear();
                self.engine.break_combo();
                info!(mode = %self.mode, "mode changed");
            }
            Command::ToggleDemo => {
                if self.mode != Mode::Game {
                    debug!("demo is only available in game mode");
                    return Ok(());
                }
                self.demo = !self.demo;
                info!(demo = self.demo, "demo toggled");
                if self.demo {
                    self.start(now, 0.0);
                } else {
                    self.stop();
                }
            }
            Command::SetBpm(bpm) => self.set_bpm(bpm, now)?,
            Command::AdjustBpm(delta) => {
                let bpm = (self.transport.bpm() + delta).clamp(MIN_BPM, MAX_BPM);
                self.set_bpm(bpm, now)?;
            }
            Command::SetOffset(offset) => self.set_offset(offset),
            Command::AdjustOffset(delta) => self.set_offset(self.offset + delta),
            Command::ResetOffset => self.offset = 0.0,
            Command::SetSpeed(speed) => {
                if !speed.is_finite() || speed <= 0.0 {
                    return Err(TrainerError::InvalidSpeed(speed));
                }
                self.scroll.speed_multiplier = speed;
            }
            Command::StepSpeed(direction) => {
                self.scroll.speed_multiplier = self.scroll.step_speed(direction);
            }
            Command::ToggleScaleToTempo => {
                self.scroll.scale_to_tempo = !self.scroll.scale_to_tempo;
            }
            Command::ChangeVolume(channel, delta) => self.volumes.adjust(channel, delta),
            Command::CycleSlot(index) => {
                if let Err(err) = self.patterns.cycle(index) {
                    debug!("{}, ignoring", err);
                }
            }
            Command::ClearPattern => self.patterns.clear(),
            Command::UndoPattern => {
                if !self.patterns.undo() {
                    debug!("nothing to undo");
                }
            }
            Command::RandomizePattern => self.patterns.randomize(),
            Command::ToggleAutoRandomize => {
                self.auto_randomize = !self.auto_randomize;
            }
            Command::ApplyPreset(preset) => {
                if let Err(err) = self.patterns.load_preset(&preset.to_steps()) {
                    warn!(preset = %preset.name, "{}, normalized", err);
                }
                info!(preset = %preset.name, "preset applied");
                if self.transport.is_active() {
                    self.start(now, PRESET_LEAD_IN);
                }
            }
        }
        Ok(())
    }

    /// Handle a drum press. The instrument sounds immediately; the press is
    /// queued for judgment (game mode) or echoed (visualizer) while running.
    /// Returns false when the press was ignored (demo mode).
    pub fn key_down(&mut self, event: KeyEvent, audio: &mut dyn AudioSink) -> bool {
        if self.demo {
            return false;
        }

        let kind = event.action.kind();
        let sound = Sound::from(kind);
        audio.play(sound, self.volumes.for_sound(sound));

        if self.transport.is_active() {
            match self.mode {
                Mode::Game => self.pending.push(InputEvent::player(kind, event.timestamp)),
                Mode::Visualizer => self.echoes.push(kind, event.timestamp),
            }
        }
        true
    }

    /// Advance the session to `now`
    pub fn tick(&mut self, now: f64, audio: &mut dyn AudioSink) -> TickReport {
        let mut report = TickReport::default();
        if !self.transport.is_active() {
            self.pending.clear();
            return report;
        }

        let update = self.transport.advance(now);
        if update.metronome_tick {
            report.metronome_tick = true;
            audio.play(Sound::MetronomeTick, self.volumes.for_sound(Sound::MetronomeTick));
        }

        let sub_beat = self.transport.sub_beat_interval();
        let lookahead = lookahead_steps(self.viewport().visible_width(), self.effective_scroll(), sub_beat);
        for step in update.crossed_steps() {
            if self.auto_randomize && step > 0 && step % STEPS_PER_BAR == 0 {
                self.patterns.randomize();
                debug!(step, "pattern randomized at bar line");
            }
            if self.mode == Mode::Game {
                let scheduled = self.scheduler.on_sub_beat(
                    step,
                    lookahead,
                    self.patterns.pattern(),
                    self.transport.start_epoch(),
                    sub_beat,
                );
                for note in scheduled {
                    self.engine.push(note);
                    report.scheduled += 1;
                }
            }
        }

        for input in std::mem::take(&mut self.pending) {
            if let Some(judged) = self.engine.judge(&input, self.offset) {
                self.record(input.kind, judged, now);
                report.judged.push(judged);
            }
        }

        if self.demo && self.mode == Mode::Game {
            let hits = self.autoplay.drive(&mut self.engine, now, self.offset);
            for hit in &hits {
                let sound = Sound::from(hit.kind);
                audio.play(sound, self.volumes.for_sound(sound));
                if let Some(judged) = hit.judged {
                    self.record(hit.kind, judged, now);
                    report.judged.push(judged);
                }
            }
            report.auto_hits = hits;
        }

        match self.mode {
            Mode::Game => {
                report.missed = self.engine.sweep(now);
                if report.missed > 0 {
                    self.last_judgment = Some(LastJudgment {
                        judgment: Judgment::Miss,
                        at: now,
                    });
                }
            }
            Mode::Visualizer => {
                let viewport = self.viewport();
                let scroll = self.effective_scroll();
                self.echoes.prune(now, &viewport, scroll);
            }
        }

        self.engine.compact();
        report
    }

    fn record(&mut self, kind: NoteKind, judged: Judged, now: f64) {
        self.last_judgment = Some(LastJudgment {
            judgment: judged.judgment,
            at: now,
        });
        self.last_hit = Some((kind, now));
    }

    /// Start the transport with beat 0 at `now + delay`, resetting stats
    fn start(&mut self, now: f64, delay: f64) {
        self.transport.start(now, delay);
        self.scheduler.reset();
        self.autoplay.reset();
        self.engine.reset();
        self.echoes.clear();
        self.pending.clear();
        self.last_judgment = None;
        self.last_hit = None;
        self.session_start = Some(now);
        info!(bpm = self.transport.bpm(), delay, mode = %self.mode, "transport started");
    }

    /// Stop the transport and discard live targets and queued inputs
    fn stop(&mut self) {
        if self.transport.is_active() {
            info!(stats = ?self.engine.stats(), "transport stopped");
        }
        self.transport.stop();
        self.scheduler.reset();
        self.autoplay.reset();
        self.engine.clear_targets();
        self.pending.clear();
        self.session_start = None;
    }

    fn set_bpm(&mut self, bpm: f64, now: f64) -> Result<()> {
        self.transport.retempo(bpm, now)?;
        let transport = &self.transport;
        self.engine.retime(|step| transport.step_time(step));
        debug!(bpm, "tempo changed");
        Ok(())
    }

    fn set_offset(&mut self, offset: f64) {
        if !offset.is_finite() {
            warn!(offset, "ignoring invalid offset");
            return;
        }
        // Whole milliseconds keep repeated nudges from drifting
        self.offset = ((offset * 1000.0).round() / 1000.0).clamp(-MAX_OFFSET, MAX_OFFSET);
    }

    /// Current timeline geometry for the active mode
    pub fn viewport(&self) -> Viewport {
        match self.mode {
            Mode::Game => Viewport::game(DEFAULT_TIMELINE_WIDTH),
            Mode::Visualizer => Viewport::visualizer(DEFAULT_TIMELINE_WIDTH),
        }
    }

    /// Scroll speed in timeline units per second
    pub fn effective_scroll(&self) -> f64 {
        self.scroll.effective_scroll(self.transport.bpm())
    }

    /// Transport clock
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Whether the transport is running
    pub fn is_running(&self) -> bool {
        self.transport.is_active()
    }

    /// Current pattern
    pub fn pattern(&self) -> &Pattern {
        self.patterns.pattern()
    }

    /// Whether a clear or preset can be undone
    pub fn can_undo(&self) -> bool {
        self.patterns.can_undo()
    }

    /// Unmatched targets in schedule order
    pub fn live_targets(&self) -> impl Iterator<Item = &TargetNote> {
        self.engine.live_targets()
    }

    /// Running statistics
    pub fn stats(&self) -> &SessionStats {
        self.engine.stats()
    }

    /// Most recent judgment
    pub fn last_judgment(&self) -> Option<LastJudgment> {
        self.last_judgment
    }

    /// Active mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether demo auto-play is on
    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Whether the pattern is randomized at every bar line
    pub fn auto_randomize(&self) -> bool {
        self.auto_randomize
    }

    /// Input offset in seconds
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Scroll configuration
    pub fn scroll(&self) -> &ScrollSettings {
        &self.scroll
    }

    /// Per-channel volumes
    pub fn volumes(&self) -> &Volumes {
        &self.volumes
    }

    /// Echo markers (visualizer mode)
    pub fn echoes(&self) -> &EchoTrack {
        &self.echoes
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
