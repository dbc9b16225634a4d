// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Target scheduler.
//!
//! Each time the clock crosses a sub-beat, the scheduler looks `lookahead`
//! steps into the future (far enough that the note enters from beyond the
//! visible edge) and materializes a target note if that pattern slot holds
//! one. A high-water mark on the absolute step keeps every future slot from
//! being scheduled twice, even when the lookahead shrinks mid-run, and lets a
//! growing lookahead fill in the steps it jumped over.

use tracing::debug;

use super::TargetNote;
use crate::pattern::Pattern;
use crate::timing::STEPS_PER_BAR;

/// Number of sub-beats ahead of the current one that are scheduled
pub fn lookahead_steps(visible_width: f64, effective_scroll: f64, sub_beat_interval: f64) -> u64 {
    if effective_scroll <= 0.0 || sub_beat_interval <= 0.0 {
        return 0;
    }
    let seconds_visible = visible_width.max(0.0) / effective_scroll;
    (seconds_visible / sub_beat_interval).floor() as u64
}

/// Materializes target notes from the pattern
#[derive(Debug, Clone, Default)]
pub struct TargetScheduler {
    /// Highest absolute step already considered
    last_scheduled: Option<u64>,
}

impl TargetScheduler {
    /// Create a scheduler with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the high-water mark (transport restart)
    pub fn reset(&mut self) {
        self.last_scheduled = None;
    }

    /// Highest absolute step already considered
    pub fn last_scheduled(&self) -> Option<u64> {
        self.last_scheduled
    }

    /// Handle a newly crossed sub-beat.
    ///
    /// Inspects slot `(step + lookahead) mod 32` and returns a target for it
    /// if the slot holds a note and that absolute step was never considered
    /// before. When the lookahead has grown since the previous call, every
    /// skipped absolute step up to the new horizon is considered too, in
    /// order, so no pattern note is lost.
    pub fn on_sub_beat(
        &mut self,
        step: u64,
        lookahead: u64,
        pattern: &Pattern,
        start_epoch: f64,
        sub_beat_interval: f64,
    ) -> Vec<TargetNote> {
        let future = step + lookahead;
        let first = match self.last_scheduled {
            Some(last) if future <= last => return Vec::new(),
            Some(last) => last + 1,
            None => future,
        };
        self.last_scheduled = Some(future);

        if future > first {
            debug!(from = first, to = future, "lookahead grew, filling skipped steps");
        }

        (first..=future)
            .filter_map(|absolute| {
                let slot = (absolute % STEPS_PER_BAR) as usize;
                let kind = pattern.step_at(slot).note_kind()?;
                let scheduled_time = start_epoch + absolute as f64 * sub_beat_interval;
                debug!(step = absolute, slot, %kind, scheduled_time, "target scheduled");
                Some(TargetNote::new(kind, scheduled_time, absolute))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{NoteKind, Step, PATTERN_LEN};

    fn pattern_with(slots: &[(usize, Step)]) -> Pattern {
        let mut data = vec![Step::None; PATTERN_LEN];
        for (slot, step) in slots {
            data[*slot] = *step;
        }
        Pattern::from_steps(&data)
    }

    #[test]
    fn test_lookahead_steps() {
        // 1540 units at 500 u/s = 3.08 s; at 0.15 s per step = 20.5 steps
        assert_eq!(lookahead_steps(1540.0, 500.0, 0.15), 20);
        assert_eq!(lookahead_steps(1540.0, 0.0, 0.15), 0);
        assert_eq!(lookahead_steps(-10.0, 500.0, 0.15), 0);
    }

    #[test]
    fn test_schedules_future_slot() {
        let pattern = pattern_with(&[(10, Step::Don)]);
        let mut scheduler = TargetScheduler::new();

        assert!(scheduler.on_sub_beat(0, 9, &pattern, 0.0, 0.15).is_empty());
        let notes = scheduler.on_sub_beat(1, 9, &pattern, 0.0, 0.15);
        assert_eq!(notes.len(), 1);
        let note = notes[0];
        assert_eq!(note.kind, NoteKind::Don);
        assert_eq!(note.step, 10);
        assert!((note.scheduled_time - 1.5).abs() < 1e-9);
        assert!(!note.hit);
    }

    #[test]
    fn test_wraps_to_next_bar() {
        let pattern = pattern_with(&[(2, Step::Ka)]);
        let mut scheduler = TargetScheduler::new();

        let note = scheduler.on_sub_beat(30, 4, &pattern, 5.0, 0.1)[0];
        assert_eq!(note.kind, NoteKind::Ka);
        assert_eq!(note.step, 34);
        assert!((note.scheduled_time - 8.4).abs() < 1e-9);
    }

    #[test]
    fn test_never_double_schedules() {
        let pattern = pattern_with(&[(12, Step::Don)]);
        let mut scheduler = TargetScheduler::new();

        assert_eq!(scheduler.on_sub_beat(2, 10, &pattern, 0.0, 0.15).len(), 1);
        // Same absolute step reached again through a smaller lookahead
        assert!(scheduler.on_sub_beat(4, 8, &pattern, 0.0, 0.15).is_empty());
        assert!(scheduler.on_sub_beat(2, 10, &pattern, 0.0, 0.15).is_empty());
        assert_eq!(scheduler.last_scheduled(), Some(12));

        scheduler.reset();
        assert_eq!(scheduler.on_sub_beat(2, 10, &pattern, 0.0, 0.15).len(), 1);
    }

    #[test]
    fn test_growing_lookahead_fills_gap() {
        let pattern = Pattern::from_steps(&[Step::Don; PATTERN_LEN]);
        let mut scheduler = TargetScheduler::new();

        let first = scheduler.on_sub_beat(0, 8, &pattern, 0.0, 0.1);
        assert_eq!(first.iter().map(|n| n.step).collect::<Vec<_>>(), vec![8]);

        // Lookahead jumps from 8 to 12: steps 9..=13 all appear, in order
        let filled = scheduler.on_sub_beat(1, 12, &pattern, 0.0, 0.1);
        assert_eq!(
            filled.iter().map(|n| n.step).collect::<Vec<_>>(),
            vec![9, 10, 11, 12, 13]
        );
        assert!((filled[4].scheduled_time - 1.3).abs() < 1e-9);
        assert_eq!(scheduler.last_scheduled(), Some(13));
    }
}
