// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for the trainer core.
//!
//! None of these are fatal. Callers either keep the previous value
//! (tempo, speed), treat the request as a no-op (slot index) or
//! normalize the data (pattern length).

use thiserror::Error;

/// Recoverable errors raised by the trainer core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainerError {
    /// Tempo outside the supported range
    #[error("invalid tempo {0} BPM (supported range is 40-400)")]
    InvalidBpm(f64),

    /// Pattern slot outside the 32-step bar
    #[error("slot index {0} is outside the 32-step pattern")]
    InvalidSlotIndex(usize),

    /// Pattern data that had to be padded or truncated
    #[error("pattern has {0} steps, expected 32")]
    MalformedPatternLength(usize),

    /// Raw step value that is not NONE (0), DON (1) or KA (2)
    #[error("invalid step value {0}")]
    InvalidStep(u8),

    /// Key name that cannot be mapped to a terminal key
    #[error("unknown key name '{0}'")]
    UnknownKey(String),

    /// Scroll speed multiplier that is not a positive finite number
    #[error("invalid scroll speed multiplier {0}")]
    InvalidSpeed(f64),
}

/// Result alias for trainer core operations
pub type Result<T> = std::result::Result<T, TrainerError>;
