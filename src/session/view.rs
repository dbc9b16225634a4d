// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Read-only render snapshot.

use super::{Mode, Session};
use crate::judge::{Judgment, SessionStats, Tip};
use crate::pattern::{NoteKind, Pattern};
use crate::sequencer::Viewport;

/// Notes further than this outside the timeline are not drawn
pub const DRAW_MARGIN: f64 = 100.0;

/// How long the hit marker glows after a matched press, in seconds
pub const HIT_GLOW: f64 = 0.15;

/// Combo counts below this are not shown
pub const COMBO_DISPLAY_MIN: u32 = 10;

/// A note on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteMarker {
    pub kind: NoteKind,
    /// Horizontal position in timeline units
    pub x: f64,
}

/// A beat line on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    /// Horizontal position in timeline units
    pub x: f64,
    /// Beat number relative to beat 0 (negative before it)
    pub beat: i64,
    /// Every fourth beat is drawn strong
    pub strong: bool,
}

/// The judgment currently fading out
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JudgmentDisplay {
    pub judgment: Judgment,
    /// Seconds since it fired
    pub age: f64,
    /// 1.0 when fresh, 0.0 once faded
    pub opacity: f64,
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub mode: Mode,
    pub running: bool,
    pub demo: bool,
    /// Seconds left before beat 0, while counting in
    pub lead_in: Option<f64>,
    pub bpm: f64,
    pub offset: f64,
    pub speed_multiplier: f64,
    pub scale_to_tempo: bool,
    pub auto_randomize: bool,
    pub effective_scroll: f64,
    pub viewport: Viewport,
    /// Playing position within the bar, while running
    pub sub_beat_index: Option<usize>,
    /// Targets (game) or echoes (visualizer) inside the drawable range
    pub notes: Vec<NoteMarker>,
    pub grid: Vec<GridLine>,
    pub judgment: Option<JudgmentDisplay>,
    /// Instrument of a matched press while the hit marker glows
    pub hit_glow: Option<(NoteKind, f64)>,
    pub stats: SessionStats,
    /// Combo, once it is worth showing
    pub combo: Option<u32>,
    /// Coaching tip, shown while stopped in game mode
    pub tip: Option<Tip>,
    /// Whole seconds since the transport was started
    pub elapsed_secs: u64,
    pub pattern: Pattern,
    pub can_undo: bool,
}

impl Session {
    /// Snapshot of the session for rendering at `now`
    pub fn view(&self, now: f64) -> View {
        let viewport = self.viewport();
        let scroll = self.effective_scroll();
        let running = self.transport.is_active();

        let in_range = |x: f64| -DRAW_MARGIN < x && x < viewport.width + DRAW_MARGIN;
        let notes = if !running {
            Vec::new()
        } else {
            match self.mode {
                Mode::Game => self
                    .engine
                    .live_targets()
                    .map(|note| NoteMarker {
                        kind: note.kind,
                        x: viewport.x_at(note.scheduled_time, now, scroll),
                    })
                    .filter(|marker| in_range(marker.x))
                    .collect(),
                Mode::Visualizer => self
                    .echoes
                    .notes()
                    .iter()
                    .map(|echo| NoteMarker {
                        kind: echo.kind,
                        x: viewport.x_at(echo.time, now, scroll),
                    })
                    .filter(|marker| in_range(marker.x))
                    .collect(),
            }
        };

        let grid = if running {
            self.grid_lines(now, &viewport, scroll)
        } else {
            Vec::new()
        };

        let judgment = self
            .last_judgment
            .filter(|last| running && last.is_visible(now))
            .map(|last| JudgmentDisplay {
                judgment: last.judgment,
                age: last.age(now),
                opacity: last.opacity(now),
            });

        let hit_glow = self
            .last_hit
            .filter(|(_, at)| running && now - at < HIT_GLOW)
            .map(|(kind, at)| (kind, 1.0 - (now - at) / HIT_GLOW));

        let stats = *self.engine.stats();
        let in_game = self.mode == Mode::Game;

        View {
            mode: self.mode,
            running,
            demo: self.demo,
            lead_in: self
                .transport
                .in_lead_in(now)
                .then(|| -self.transport.raw_elapsed(now)),
            bpm: self.transport.bpm(),
            offset: self.offset,
            speed_multiplier: self.scroll.speed_multiplier,
            scale_to_tempo: self.scroll.scale_to_tempo,
            auto_randomize: self.auto_randomize,
            effective_scroll: scroll,
            viewport,
            sub_beat_index: (running && !self.transport.in_lead_in(now))
                .then(|| self.transport.current_sub_beat_index(now)),
            notes,
            grid,
            judgment,
            hit_glow,
            stats,
            combo: (running && in_game && stats.combo >= COMBO_DISPLAY_MIN).then_some(stats.combo),
            tip: if !running && in_game { stats.tip() } else { None },
            elapsed_secs: self
                .session_start
                .map_or(0, |start| (now - start).max(0.0) as u64),
            pattern: *self.patterns.pattern(),
            can_undo: self.patterns.can_undo(),
        }
    }

    /// Beat lines crossing the visible timeline
    fn grid_lines(&self, now: f64, viewport: &Viewport, scroll: f64) -> Vec<GridLine> {
        let beat = self.transport.beat_interval();
        let start = self.transport.start_epoch();
        let relative = now - start;

        let first = ((-viewport.hit_x / scroll + relative) / beat).floor() as i64 - 1;
        let last = (((viewport.width - viewport.hit_x) / scroll + relative) / beat).floor() as i64 + 1;

        (first..last)
            .filter_map(|index| {
                let x = viewport.x_at(start + index as f64 * beat, now, scroll);
                (x > 0.0 && x < viewport.width).then_some(GridLine {
                    x,
                    beat: index,
                    strong: index.rem_euclid(4) == 0,
                })
            })
            .collect()
    }
}
