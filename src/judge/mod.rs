// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing judgment.
//!
//! This module provides:
//! - The three nested timing windows and judgment tiers
//! - The judgment engine matching inputs against live targets
//! - Running session statistics and coaching tips
//! - The auto-play driver used by demo mode

pub mod autoplay;
pub mod engine;
pub mod stats;

pub use autoplay::{AutoHit, AutoPlayer};
pub use engine::JudgmentEngine;
pub use stats::{SessionStats, Tip};

use std::fmt;

use crate::pattern::NoteKind;

/// Tightest window in seconds; auto-play always uses it
pub const WINDOW_PERFECT: f64 = 0.025;

/// Early/late window in seconds
pub const WINDOW_OK: f64 = 0.075;

/// Outermost window in seconds; targets older than this are missed
pub const WINDOW_BAD: f64 = 0.108;

/// How long a judgment stays on screen, in seconds
pub const JUDGMENT_FADE: f64 = 0.4;

/// Judgment tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Judgment {
    /// Within the perfect window
    Good,
    /// Within the ok window, ahead of the note
    Early,
    /// Within the ok window, behind the note
    Late,
    /// Within the bad window
    Bad,
    /// Window elapsed without a hit
    Miss,
}

impl Judgment {
    /// All tiers in display order
    pub const ALL: [Judgment; 5] = [
        Judgment::Good,
        Judgment::Early,
        Judgment::Late,
        Judgment::Bad,
        Judgment::Miss,
    ];

    /// Text shown when the judgment fires
    pub fn label(&self) -> &'static str {
        match self {
            Judgment::Good => "GOOD!",
            Judgment::Early => "EARLY",
            Judgment::Late => "LATE",
            Judgment::Bad => "BAD",
            Judgment::Miss => "MISS",
        }
    }

    /// Display color (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Judgment::Good => (255, 220, 50),
            Judgment::Early => (50, 150, 255),
            Judgment::Late => (255, 80, 80),
            Judgment::Bad => (180, 80, 255),
            Judgment::Miss => (120, 120, 120),
        }
    }

    /// Whether this judgment extends the combo (otherwise it resets it)
    pub fn continues_combo(&self) -> bool {
        matches!(self, Judgment::Good | Judgment::Early | Judgment::Late)
    }
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A timed drum input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    /// Instrument type
    pub kind: NoteKind,
    /// Absolute time of the press
    pub timestamp: f64,
    /// Synthesized by the demo driver
    pub is_auto: bool,
}

impl InputEvent {
    /// A player input
    pub fn player(kind: NoteKind, timestamp: f64) -> Self {
        Self {
            kind,
            timestamp,
            is_auto: false,
        }
    }

    /// A demo-mode input
    pub fn auto(kind: NoteKind, timestamp: f64) -> Self {
        Self {
            kind,
            timestamp,
            is_auto: true,
        }
    }
}

/// Outcome of matching an input against a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Judged {
    /// Tier
    pub judgment: Judgment,
    /// `scheduled - adjusted input` in seconds (positive = early)
    pub diff: f64,
    /// Absolute step of the matched target
    pub step: u64,
}

/// Classify a matched input by its signed timing difference
/// (`scheduled - adjusted input`, positive = early)
pub fn classify(diff: f64) -> Judgment {
    let abs_diff = diff.abs();
    if abs_diff <= WINDOW_PERFECT {
        Judgment::Good
    } else if abs_diff <= WINDOW_OK {
        if diff < 0.0 {
            Judgment::Late
        } else {
            Judgment::Early
        }
    } else {
        Judgment::Bad
    }
}

/// The most recent judgment, kept for fade-out display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastJudgment {
    /// Tier
    pub judgment: Judgment,
    /// Absolute time the judgment fired
    pub at: f64,
}

impl LastJudgment {
    /// Seconds since the judgment fired
    pub fn age(&self, now: f64) -> f64 {
        (now - self.at).max(0.0)
    }

    /// Remaining opacity (1.0 when fresh, 0.0 once faded)
    pub fn opacity(&self, now: f64) -> f64 {
        (1.0 - self.age(now) / JUDGMENT_FADE).clamp(0.0, 1.0)
    }

    /// Whether the judgment should still be drawn
    pub fn is_visible(&self, now: f64) -> bool {
        self.age(now) <= JUDGMENT_FADE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify(0.0), Judgment::Good);
        assert_eq!(classify(0.02), Judgment::Good);
        assert_eq!(classify(-0.02), Judgment::Good);
        assert_eq!(classify(0.05), Judgment::Early);
        assert_eq!(classify(-0.05), Judgment::Late);
        assert_eq!(classify(0.09), Judgment::Bad);
        assert_eq!(classify(-0.09), Judgment::Bad);
    }

    #[test]
    fn test_combo_rules() {
        assert!(Judgment::Good.continues_combo());
        assert!(Judgment::Early.continues_combo());
        assert!(Judgment::Late.continues_combo());
        assert!(!Judgment::Bad.continues_combo());
        assert!(!Judgment::Miss.continues_combo());
    }

    #[test]
    fn test_windows_are_nested() {
        assert!(WINDOW_PERFECT < WINDOW_OK);
        assert!(WINDOW_OK < WINDOW_BAD);
    }

    #[test]
    fn test_last_judgment_fade() {
        let last = LastJudgment {
            judgment: Judgment::Late,
            at: 10.0,
        };
        assert_eq!(last.opacity(10.0), 1.0);
        assert!((last.opacity(10.2) - 0.5).abs() < 1e-9);
        assert!(last.is_visible(10.3));
        assert!(!last.is_visible(10.5));
        assert_eq!(last.opacity(11.0), 0.0);
    }
}
