// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note scheduling and timeline geometry.
//!
//! This module provides:
//! - Target notes materialized from the pattern ahead of the scroll horizon
//! - Timeline geometry (viewport, scroll speed) shared with rendering
//! - The free-scroll echo track used by the visualizer mode

pub mod scheduler;
pub mod visualizer;

pub use scheduler::TargetScheduler;
pub use visualizer::{EchoNote, EchoTrack};

use crate::pattern::NoteKind;

/// Scroll speed in timeline units per second at the reference tempo
pub const BASE_SCROLL: f64 = 500.0;

/// Tempo at which a tempo-scaled scroll equals `BASE_SCROLL`
pub const REFERENCE_BPM: f64 = 120.0;

/// Extra distance past the far edge that notes are scheduled for
pub const SCHEDULE_MARGIN: f64 = 100.0;

/// Timeline width used until the renderer reports its own
pub const DEFAULT_TIMELINE_WIDTH: f64 = 1920.0;

/// Selectable scroll speed multipliers
pub const SPEED_OPTIONS: [f64; 11] = [1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];

/// A scheduled, judgeable note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetNote {
    /// Instrument type
    pub kind: NoteKind,
    /// Absolute time the note should be hit
    pub scheduled_time: f64,
    /// Absolute sub-beat step the note was scheduled for
    pub step: u64,
    /// Consumed by a judgment (tombstone until the next compaction)
    pub hit: bool,
}

impl TargetNote {
    /// Create an unmatched note
    pub fn new(kind: NoteKind, scheduled_time: f64, step: u64) -> Self {
        Self {
            kind,
            scheduled_time,
            step,
            hit: false,
        }
    }
}

/// Scroll configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    /// User speed multiplier
    pub speed_multiplier: f64,
    /// Scale the base scroll with tempo
    pub scale_to_tempo: bool,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            scale_to_tempo: true,
        }
    }
}

impl ScrollSettings {
    /// Effective scroll speed in timeline units per second
    pub fn effective_scroll(&self, bpm: f64) -> f64 {
        let base = if self.scale_to_tempo {
            bpm / REFERENCE_BPM * BASE_SCROLL
        } else {
            BASE_SCROLL
        };
        base * self.speed_multiplier
    }

    /// Next speed option above (`direction > 0`) or below the current one
    pub fn step_speed(&self, direction: i32) -> f64 {
        let current = self.speed_multiplier;
        if direction >= 0 {
            SPEED_OPTIONS
                .iter()
                .copied()
                .find(|option| *option > current + 1e-9)
                .unwrap_or(SPEED_OPTIONS[SPEED_OPTIONS.len() - 1])
        } else {
            SPEED_OPTIONS
                .iter()
                .rev()
                .copied()
                .find(|option| *option < current - 1e-9)
                .unwrap_or(SPEED_OPTIONS[0])
        }
    }
}

/// Horizontal timeline geometry in abstract units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Full timeline width
    pub width: f64,
    /// Position of the hit marker
    pub hit_x: f64,
}

impl Viewport {
    /// Game layout: hit marker a quarter of the way in, notes approach from the right
    pub fn game(width: f64) -> Self {
        Self {
            width,
            hit_x: (width / 4.0).floor(),
        }
    }

    /// Visualizer layout: hit marker near the right edge, echoes scroll left
    pub fn visualizer(width: f64) -> Self {
        Self {
            width,
            hit_x: width - 300.0,
        }
    }

    /// Distance from the hit marker to the far edge plus the scheduling margin
    pub fn visible_width(&self) -> f64 {
        self.width - self.hit_x + SCHEDULE_MARGIN
    }

    /// X position of an event at `time` when the clock reads `now`
    pub fn x_at(&self, time: f64, now: f64, scroll: f64) -> f64 {
        self.hit_x + (time - now) * scroll
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::game(DEFAULT_TIMELINE_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_scroll() {
        let mut scroll = ScrollSettings::default();
        assert_eq!(scroll.effective_scroll(120.0), 500.0);
        assert_eq!(scroll.effective_scroll(240.0), 1000.0);

        scroll.scale_to_tempo = false;
        assert_eq!(scroll.effective_scroll(240.0), 500.0);

        scroll.speed_multiplier = 2.0;
        assert_eq!(scroll.effective_scroll(60.0), 1000.0);
    }

    #[test]
    fn test_step_speed() {
        let scroll = ScrollSettings::default();
        assert_eq!(scroll.step_speed(1), 1.1);
        assert_eq!(scroll.step_speed(-1), 1.0);

        let fast = ScrollSettings {
            speed_multiplier: 1.5,
            scale_to_tempo: true,
        };
        assert_eq!(fast.step_speed(1), 2.0);
        assert_eq!(fast.step_speed(-1), 1.4);

        let max = ScrollSettings {
            speed_multiplier: 4.0,
            scale_to_tempo: true,
        };
        assert_eq!(max.step_speed(1), 4.0);
    }

    #[test]
    fn test_viewport_layouts() {
        let game = Viewport::game(1920.0);
        assert_eq!(game.hit_x, 480.0);
        assert_eq!(game.visible_width(), 1540.0);

        let visualizer = Viewport::visualizer(1920.0);
        assert_eq!(visualizer.hit_x, 1620.0);
    }

    #[test]
    fn test_x_at() {
        let viewport = Viewport::game(1920.0);
        assert_eq!(viewport.x_at(2.0, 2.0, 500.0), 480.0);
        assert_eq!(viewport.x_at(3.0, 2.0, 500.0), 980.0);
    }
}
