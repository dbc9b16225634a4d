// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Demo-mode auto-play driver.
//!
//! Presses every due target at the current time as an auto input. Each
//! note fires at most once: the driver remembers the last absolute step it
//! played, so a press that whiffs (a late tick pushed it outside the
//! perfect window) is not retried and the note is later swept as a miss.

use super::{InputEvent, Judged, JudgmentEngine};
use crate::pattern::NoteKind;

/// One synthesized press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoHit {
    /// Instrument that was played
    pub kind: NoteKind,
    /// Judgment produced, `None` if the press whiffed
    pub judged: Option<Judged>,
}

/// Synthesizes inputs for demo mode
#[derive(Debug, Clone, Default)]
pub struct AutoPlayer {
    /// Last absolute step played
    last_played: Option<u64>,
}

impl AutoPlayer {
    /// Create a driver that has played nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget played notes (transport restart)
    pub fn reset(&mut self) {
        self.last_played = None;
    }

    /// Play every unmatched target with `scheduled_time + offset <= now`
    pub fn drive(&mut self, engine: &mut JudgmentEngine, now: f64, offset: f64) -> Vec<AutoHit> {
        let due: Vec<(u64, NoteKind)> = engine
            .live_targets()
            .filter(|note| note.scheduled_time + offset <= now)
            .filter(|note| self.last_played.map_or(true, |last| note.step > last))
            .map(|note| (note.step, note.kind))
            .collect();

        let mut hits = Vec::with_capacity(due.len());
        for (step, kind) in due {
            self.last_played = Some(self.last_played.map_or(step, |last| last.max(step)));
            let judged = engine.judge_step(&InputEvent::auto(kind, now), step, offset);
            hits.push(AutoHit { kind, judged });
        }
        hits
    }
}
