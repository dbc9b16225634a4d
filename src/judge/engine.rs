// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Judgment engine.
//!
//! Owns the live target list and the session statistics. Inputs are matched
//! against the nearest unconsumed target of the same kind; targets whose bad
//! window has fully elapsed are swept as misses. Matched targets are
//! tombstoned and dropped by `compact`, so iteration indexes stay stable
//! for the whole tick.

use tracing::debug;

use super::{classify, InputEvent, Judged, Judgment, SessionStats, WINDOW_BAD, WINDOW_PERFECT};
use crate::sequencer::TargetNote;

/// Matches inputs against scheduled targets
#[derive(Debug, Clone, Default)]
pub struct JudgmentEngine {
    /// Targets in schedule order, including tombstoned ones until compaction
    targets: Vec<TargetNote>,
    /// Running statistics
    stats: SessionStats,
}

impl JudgmentEngine {
    /// Create an engine with no targets
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scheduled target
    pub fn push(&mut self, note: TargetNote) {
        self.targets.push(note);
    }

    /// Unmatched targets in schedule order
    pub fn live_targets(&self) -> impl Iterator<Item = &TargetNote> {
        self.targets.iter().filter(|note| !note.hit)
    }

    /// Number of unmatched targets
    pub fn live_count(&self) -> usize {
        self.live_targets().count()
    }

    /// Running statistics
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Judge an input against the live targets.
    ///
    /// The input time is corrected by `offset` before matching. Returns
    /// `None` for a whiff: no target of that kind, or the nearest one is
    /// outside the governing window (PERFECT for auto inputs, BAD otherwise).
    /// A whiff does not touch the statistics.
    pub fn judge(&mut self, input: &InputEvent, offset: f64) -> Option<Judged> {
        let adjusted = input.timestamp - offset;

        let mut best: Option<(usize, f64)> = None;
        for (index, note) in self.targets.iter().enumerate() {
            if note.hit || note.kind != input.kind {
                continue;
            }
            let distance = (note.scheduled_time - adjusted).abs();
            // Strict comparison keeps the earliest scheduled on ties
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((index, distance));
            }
        }

        let (index, _) = best?;
        self.resolve(index, input, offset)
    }

    /// Judge an input against the live target at absolute `step` only.
    ///
    /// Auto-play uses this so a press can never be claimed by a
    /// neighbouring note of the same kind. Returns `None` if that target is
    /// gone, of another kind, or outside the governing window.
    pub fn judge_step(&mut self, input: &InputEvent, step: u64, offset: f64) -> Option<Judged> {
        let index = self
            .targets
            .iter()
            .position(|note| !note.hit && note.step == step && note.kind == input.kind)?;
        self.resolve(index, input, offset)
    }

    fn resolve(&mut self, index: usize, input: &InputEvent, offset: f64) -> Option<Judged> {
        let adjusted = input.timestamp - offset;
        let window = if input.is_auto { WINDOW_PERFECT } else { WINDOW_BAD };

        let note = &mut self.targets[index];
        let diff = note.scheduled_time - adjusted;
        if diff.abs() > window {
            return None;
        }
        note.hit = true;

        let judgment = classify(diff);
        self.stats.record(judgment);

        debug!(%judgment, diff, step = note.step, auto = input.is_auto, "input judged");
        Some(Judged {
            judgment,
            diff,
            step: note.step,
        })
    }

    /// Remove unmatched targets scheduled before `now - WINDOW_BAD`, counting
    /// each as a miss. Returns the number of misses.
    pub fn sweep(&mut self, now: f64) -> u32 {
        let deadline = now - WINDOW_BAD;
        let mut missed = 0;
        self.targets.retain(|note| {
            if !note.hit && note.scheduled_time < deadline {
                missed += 1;
                false
            } else {
                true
            }
        });

        for _ in 0..missed {
            self.stats.record(Judgment::Miss);
        }
        if missed > 0 {
            debug!(missed, "targets expired");
        }
        missed
    }

    /// Recompute every target's time from its absolute step (tempo change)
    pub fn retime(&mut self, time_of_step: impl Fn(u64) -> f64) {
        for note in self.targets.iter_mut() {
            note.scheduled_time = time_of_step(note.step);
        }
    }

    /// Drop tombstoned targets
    pub fn compact(&mut self) {
        self.targets.retain(|note| !note.hit);
    }

    /// Drop every target and zero the statistics
    pub fn reset(&mut self) {
        self.targets.clear();
        self.stats.reset();
    }

    /// Drop every target, keeping the statistics
    pub fn clear_targets(&mut self) {
        self.targets.clear();
    }

    /// Reset the combo without recording a judgment
    pub fn break_combo(&mut self) {
        self.stats.combo = 0;
    }
}
