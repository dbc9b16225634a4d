// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Metronome-driven DON/KA rhythm trainer.
//!
//! The core is a deterministic simulation: every operation takes the current
//! time as an explicit `now` in seconds, so it can be driven by a real clock
//! (the terminal host) or by a test.

pub mod audio;
pub mod config;
pub mod control;
pub mod error;
pub mod judge;
pub mod pattern;
pub mod sequencer;
pub mod session;
pub mod timing;
pub mod ui;

pub use error::{Result, TrainerError};
pub use session::{Mode, Session, TickReport, View};
