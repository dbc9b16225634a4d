// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport clock.
//!
//! Converts an absolute, monotonic time in seconds into a beat count and a
//! sub-beat grid position (4 sub-beats per beat, 32 steps per bar). The
//! transport does not read the system clock itself: every query takes `now`
//! so the host decides the time source and tests stay deterministic.

use std::ops::RangeInclusive;

use tracing::{debug, warn};

use crate::error::{Result, TrainerError};

/// Lowest supported tempo
pub const MIN_BPM: f64 = 40.0;

/// Highest supported tempo
pub const MAX_BPM: f64 = 400.0;

/// Tempo used when nothing else is configured
pub const DEFAULT_BPM: f64 = 100.0;

/// Sub-beats per beat
pub const SUB_BEATS_PER_BEAT: u64 = 4;

/// Steps in one bar of the pattern grid
pub const STEPS_PER_BAR: u64 = 32;

/// Check that a tempo is inside the supported range
pub fn validate_bpm(bpm: f64) -> Result<f64> {
    if bpm.is_finite() && (MIN_BPM..=MAX_BPM).contains(&bpm) {
        Ok(bpm)
    } else {
        Err(TrainerError::InvalidBpm(bpm))
    }
}

/// Seconds per beat at a tempo
pub fn beat_interval(bpm: f64) -> f64 {
    60.0 / bpm
}

/// Seconds per sub-beat at a tempo (`60 / bpm / 4`)
pub fn sub_beat_interval(bpm: f64) -> f64 {
    15.0 / bpm
}

/// What a single `advance` call observed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClockUpdate {
    /// A new beat boundary was crossed since the last advance
    pub metronome_tick: bool,
    /// Absolute sub-beat steps crossed since the last advance, oldest first
    pub crossed: Option<RangeInclusive<u64>>,
}

impl ClockUpdate {
    /// Iterate the newly crossed absolute steps
    pub fn crossed_steps(&self) -> impl Iterator<Item = u64> {
        self.crossed.clone().into_iter().flatten()
    }
}

/// Transport clock
#[derive(Debug, Clone)]
pub struct Transport {
    /// Current tempo in BPM
    bpm: f64,
    /// Absolute time of beat 0
    start_epoch: f64,
    /// Whether the transport is running
    active: bool,
    /// Last beat count reported through a metronome tick
    last_beat: Option<u64>,
    /// Last absolute sub-beat step reported as crossed
    last_step: Option<u64>,
}

impl Transport {
    /// Create a stopped transport. Out of range tempos fall back to the default.
    pub fn new(bpm: f64) -> Self {
        let bpm = validate_bpm(bpm).unwrap_or_else(|err| {
            warn!("{}, using {} BPM", err, DEFAULT_BPM);
            DEFAULT_BPM
        });

        Self {
            bpm,
            start_epoch: 0.0,
            active: false,
            last_beat: None,
            last_step: None,
        }
    }

    /// Get the current tempo in BPM
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set the tempo. Invalid values are rejected and the old tempo is kept.
    pub fn set_bpm(&mut self, bpm: f64) -> Result<()> {
        self.bpm = validate_bpm(bpm)?;
        Ok(())
    }

    /// Change the tempo at `now`.
    ///
    /// While running, beat 0 is moved so the grid position at `now` is kept
    /// and already crossed steps are not reported again. During a start delay
    /// the start time is kept.
    pub fn retempo(&mut self, bpm: f64, now: f64) -> Result<()> {
        let bpm = validate_bpm(bpm)?;
        if self.active && self.raw_elapsed(now) > 0.0 {
            let position = self.elapsed(now) / self.sub_beat_interval();
            self.start_epoch = now - position * sub_beat_interval(bpm);
        }
        self.bpm = bpm;
        Ok(())
    }

    /// Whether the transport is running
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Absolute time of beat 0
    pub fn start_epoch(&self) -> f64 {
        self.start_epoch
    }

    /// Seconds per beat
    pub fn beat_interval(&self) -> f64 {
        beat_interval(self.bpm)
    }

    /// Seconds per sub-beat
    pub fn sub_beat_interval(&self) -> f64 {
        sub_beat_interval(self.bpm)
    }

    /// Start the transport so that beat 0 lands at `now + delay`
    pub fn start(&mut self, now: f64, delay: f64) {
        self.start_epoch = now + delay.max(0.0);
        self.active = true;
        self.last_beat = None;
        self.last_step = None;
        debug!(start_epoch = self.start_epoch, bpm = self.bpm, "transport started");
    }

    /// Stop the transport
    pub fn stop(&mut self) {
        self.active = false;
        self.last_beat = None;
        self.last_step = None;
    }

    /// Time since beat 0, negative during a start delay
    pub fn raw_elapsed(&self, now: f64) -> f64 {
        now - self.start_epoch
    }

    /// Time since beat 0, clamped to zero for grid purposes
    pub fn elapsed(&self, now: f64) -> f64 {
        self.raw_elapsed(now).max(0.0)
    }

    /// Whether a start delay is still counting down
    pub fn in_lead_in(&self, now: f64) -> bool {
        self.active && self.raw_elapsed(now) < 0.0
    }

    /// Beat count since beat 0
    pub fn current_beat(&self, now: f64) -> u64 {
        (self.elapsed(now) / self.beat_interval()).floor() as u64
    }

    /// Absolute sub-beat step since beat 0 (not wrapped to the bar)
    pub fn current_step(&self, now: f64) -> u64 {
        (self.elapsed(now) / self.sub_beat_interval()).floor() as u64
    }

    /// Sub-beat index within the 32-step bar
    pub fn current_sub_beat_index(&self, now: f64) -> usize {
        (self.current_step(now) % STEPS_PER_BAR) as usize
    }

    /// Fractional position within the current sub-beat (0.0 - 1.0)
    pub fn phase(&self, now: f64) -> f64 {
        let steps = self.elapsed(now) / self.sub_beat_interval();
        steps - steps.floor()
    }

    /// Absolute time of an absolute sub-beat step
    pub fn step_time(&self, step: u64) -> f64 {
        self.start_epoch + step as f64 * self.sub_beat_interval()
    }

    /// Observe the clock at `now`.
    ///
    /// Reports at most one metronome tick per call, even if the poll skipped
    /// several beat boundaries, and the range of sub-beat steps crossed since
    /// the previous call. Nothing is reported while stopped or during a start
    /// delay. Catch-up after a stall is limited to the last bar.
    pub fn advance(&mut self, now: f64) -> ClockUpdate {
        if !self.active || self.raw_elapsed(now) < 0.0 {
            return ClockUpdate::default();
        }

        let mut update = ClockUpdate::default();

        let beat = self.current_beat(now);
        if self.last_beat.map_or(true, |last| beat > last) {
            self.last_beat = Some(beat);
            update.metronome_tick = true;
        }

        let step = self.current_step(now);
        let first = match self.last_step {
            None => 0,
            Some(last) if step > last => last + 1,
            Some(_) => return update,
        };

        let first = if step - first >= STEPS_PER_BAR {
            let skipped_to = step + 1 - STEPS_PER_BAR;
            warn!(skipped = skipped_to - first, "clock stalled, dropping sub-beats");
            skipped_to
        } else {
            first
        };

        self.last_step = Some(step);
        update.crossed = Some(first..=step);
        update
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_transport_creation() {
        let transport = Transport::new(120.0);
        assert_eq!(transport.bpm(), 120.0);
        assert!(!transport.is_active());
    }

    #[test]
    fn test_invalid_bpm_falls_back() {
        assert_eq!(Transport::new(10.0).bpm(), DEFAULT_BPM);
        assert_eq!(Transport::new(f64::NAN).bpm(), DEFAULT_BPM);
    }

    #[test]
    fn test_set_bpm_keeps_previous_on_error() {
        let mut transport = Transport::new(120.0);
        assert_eq!(transport.set_bpm(0.0), Err(TrainerError::InvalidBpm(0.0)));
        assert_eq!(transport.set_bpm(401.0), Err(TrainerError::InvalidBpm(401.0)));
        assert_eq!(transport.bpm(), 120.0);

        transport.set_bpm(40.0).unwrap();
        assert_eq!(transport.bpm(), 40.0);
    }

    #[test]
    fn test_sub_beat_interval_is_fifteen_over_bpm() {
        let mut bpm = MIN_BPM;
        while bpm <= MAX_BPM {
            assert_eq!(sub_beat_interval(bpm), 15.0 / bpm);
            assert_eq!(sub_beat_interval(bpm), 60.0 / bpm / 4.0);
            bpm += 7.5;
        }
        assert_eq!(sub_beat_interval(100.0), 0.15);
    }

    #[test]
    fn test_elapsed_clamped_during_delay() {
        let mut transport = Transport::new(100.0);
        transport.start(10.0, 3.0);

        assert_eq!(transport.start_epoch(), 13.0);
        assert_eq!(transport.raw_elapsed(11.0), -2.0);
        assert_eq!(transport.elapsed(11.0), 0.0);
        assert!(transport.in_lead_in(11.0));
        assert_eq!(transport.advance(11.0), ClockUpdate::default());
    }

    #[test]
    fn test_sub_beat_index_wraps() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);

        let sb = transport.sub_beat_interval();
        assert_eq!(transport.current_sub_beat_index(0.0), 0);
        assert_eq!(transport.current_sub_beat_index(5.0 * sb + EPS), 5);
        assert_eq!(transport.current_sub_beat_index(31.0 * sb + EPS), 31);
        assert_eq!(transport.current_sub_beat_index(32.0 * sb + EPS), 0);
        assert_eq!(transport.current_sub_beat_index(37.0 * sb + EPS), 5);
    }

    #[test]
    fn test_sub_beat_index_periodic() {
        let mut transport = Transport::new(137.0);
        transport.start(0.0, 0.0);
        let bar = STEPS_PER_BAR as f64 * transport.sub_beat_interval();

        for i in 0..50 {
            let t = i as f64 * 0.0371 + 0.001;
            let index = transport.current_sub_beat_index(t);
            assert!(index < STEPS_PER_BAR as usize);
            assert_eq!(index, transport.current_sub_beat_index(t + bar));
        }
    }

    #[test]
    fn test_metronome_tick_once_per_beat() {
        let mut transport = Transport::new(120.0);
        transport.start(0.0, 0.0);

        // Beat 0 is observed on the first advance
        assert!(transport.advance(0.0).metronome_tick);
        assert!(!transport.advance(0.1).metronome_tick);
        assert!(!transport.advance(0.4).metronome_tick);
        assert!(transport.advance(0.5 + EPS).metronome_tick);
        assert!(!transport.advance(0.6).metronome_tick);
    }

    #[test]
    fn test_skipped_beats_tick_once() {
        let mut transport = Transport::new(120.0);
        transport.start(0.0, 0.0);
        transport.advance(0.0);

        // Three beat boundaries skipped in one poll
        assert!(transport.advance(1.6).metronome_tick);
        assert_eq!(transport.current_beat(1.6), 3);
        // Same beat again does not retrigger
        assert!(!transport.advance(1.7).metronome_tick);
    }

    #[test]
    fn test_crossed_steps() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);

        let first = transport.advance(0.0);
        assert_eq!(first.crossed, Some(0..=0));

        let none = transport.advance(0.1);
        assert_eq!(none.crossed, None);

        // 0.15 s per step: at 0.61 we are in step 4
        let catch_up = transport.advance(0.61);
        assert_eq!(catch_up.crossed_steps().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_stall_catch_up_limited_to_bar() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);
        transport.advance(0.0);

        let update = transport.advance(100.0 * 0.15 + EPS);
        let steps: Vec<u64> = update.crossed_steps().collect();
        assert_eq!(steps.len(), STEPS_PER_BAR as usize);
        assert_eq!(steps.last(), Some(&100));
    }

    #[test]
    fn test_stop_is_silent() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);
        transport.stop();
        assert!(!transport.is_active());
        assert_eq!(transport.advance(1.0), ClockUpdate::default());
    }

    #[test]
    fn test_retempo_keeps_position() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);
        transport.advance(0.0);
        transport.advance(1.5 + EPS);
        assert_eq!(transport.current_step(1.5 + EPS), 10);

        transport.retempo(200.0, 1.5 + EPS).unwrap();
        assert_eq!(transport.bpm(), 200.0);
        assert!((transport.start_epoch() - 0.75).abs() < 1e-6);

        // Next step comes 0.075 s later, without replaying earlier ones
        assert_eq!(transport.advance(1.55).crossed, None);
        let update = transport.advance(1.58);
        assert_eq!(update.crossed_steps().collect::<Vec<_>>(), vec![11]);
    }

    #[test]
    fn test_retempo_rejects_invalid() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);
        assert_eq!(transport.retempo(500.0, 1.0), Err(TrainerError::InvalidBpm(500.0)));
        assert_eq!(transport.start_epoch(), 0.0);

        // During a lead-in only the tempo changes
        transport.start(10.0, 3.0);
        transport.retempo(150.0, 11.0).unwrap();
        assert_eq!(transport.start_epoch(), 13.0);
    }

    #[test]
    fn test_phase() {
        let mut transport = Transport::new(100.0);
        transport.start(0.0, 0.0);
        let phase = transport.phase(0.15 * 2.5);
        assert!((phase - 0.5).abs() < 1e-9);
    }
}
