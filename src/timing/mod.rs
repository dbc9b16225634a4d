// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides the transport clock that maps wall-clock time
//! onto the beat and sub-beat grid.

pub mod clock;

pub use clock::{
    beat_interval, sub_beat_interval, validate_bpm, ClockUpdate, Transport, DEFAULT_BPM, MAX_BPM,
    MIN_BPM, STEPS_PER_BAR, SUB_BEATS_PER_BEAT,
};
