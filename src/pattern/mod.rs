// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! One-bar step pattern for the trainer.
//!
//! This module provides:
//! - Step values (NONE / DON / KA) and the note kinds they produce
//! - A fixed 32-step pattern with edit, randomize and clear operations
//! - A one-level undo buffer for destructive edits
//! - Built-in and file-based preset rudiments

pub mod presets;

pub use presets::{Preset, PresetLibrary};

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::error::{Result, TrainerError};
use crate::timing::STEPS_PER_BAR;

/// Number of slots in a pattern
pub const PATTERN_LEN: usize = STEPS_PER_BAR as usize;

/// Instrument type of a note or an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    /// Center hit
    Don,
    /// Rim hit
    Ka,
}

impl NoteKind {
    /// Display color (RGB)
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            NoteKind::Don => (235, 69, 44),
            NoteKind::Ka => (67, 142, 172),
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteKind::Don => write!(f, "DON"),
            NoteKind::Ka => write!(f, "KA"),
        }
    }
}

/// Value of a single pattern slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Rest
    #[default]
    None,
    /// DON note
    Don,
    /// KA note
    Ka,
}

impl Step {
    /// Next value in the edit cycle NONE -> DON -> KA -> NONE
    pub fn cycled(self) -> Self {
        match self {
            Step::None => Step::Don,
            Step::Don => Step::Ka,
            Step::Ka => Step::None,
        }
    }

    /// Note kind this step produces, if any
    pub fn note_kind(self) -> Option<NoteKind> {
        match self {
            Step::None => None,
            Step::Don => Some(NoteKind::Don),
            Step::Ka => Some(NoteKind::Ka),
        }
    }

    /// Raw value as stored in settings and preset files
    pub fn as_u8(self) -> u8 {
        match self {
            Step::None => 0,
            Step::Don => 1,
            Step::Ka => 2,
        }
    }
}

impl TryFrom<u8> for Step {
    type Error = TrainerError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Step::None),
            1 => Ok(Step::Don),
            2 => Ok(Step::Ka),
            other => Err(TrainerError::InvalidStep(other)),
        }
    }
}

/// Fixed-length, one-bar step pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pattern {
    steps: [Step; PATTERN_LEN],
}

impl Pattern {
    /// Create an empty pattern
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pattern from arbitrary-length data, padding with NONE or
    /// truncating to exactly 32 slots
    pub fn from_steps(data: &[Step]) -> Self {
        let mut pattern = Self::new();
        for (slot, step) in pattern.steps.iter_mut().zip(data) {
            *slot = *step;
        }
        pattern
    }

    /// Build a pattern from raw values. Unknown values become NONE.
    pub fn from_raw(data: &[u8]) -> Self {
        let steps: Vec<Step> = data
            .iter()
            .map(|&value| {
                Step::try_from(value).unwrap_or_else(|err| {
                    warn!("{}, treating as rest", err);
                    Step::None
                })
            })
            .collect();
        Self::from_steps(&steps)
    }

    /// Raw values for persistence
    pub fn to_raw(&self) -> Vec<u8> {
        self.steps.iter().map(|step| step.as_u8()).collect()
    }

    /// Get the step at a slot, wrapping the index to the bar
    pub fn step_at(&self, index: usize) -> Step {
        self.steps[index % PATTERN_LEN]
    }

    /// All steps in order
    pub fn steps(&self) -> &[Step; PATTERN_LEN] {
        &self.steps
    }

    /// Whether every slot is a rest
    pub fn is_empty(&self) -> bool {
        self.steps.iter().all(|step| *step == Step::None)
    }

    /// Count of non-rest slots
    pub fn note_count(&self) -> usize {
        self.steps.iter().filter(|step| **step != Step::None).count()
    }
}

/// Pattern with edit operations and one-level undo
#[derive(Debug, Clone)]
pub struct PatternStore {
    /// Current pattern
    pattern: Pattern,
    /// Pattern before the last clear or preset load
    undo: Option<Pattern>,
    /// Random source for randomize
    rng: StdRng,
}

impl PatternStore {
    /// Create a store holding an empty pattern
    pub fn new() -> Self {
        Self::with_pattern(Pattern::new())
    }

    /// Create a store holding the given pattern
    pub fn with_pattern(pattern: Pattern) -> Self {
        Self {
            pattern,
            undo: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a store with a fixed random seed
    pub fn with_seed(pattern: Pattern, seed: u64) -> Self {
        Self {
            pattern,
            undo: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Current pattern
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Get a single slot
    pub fn get(&self, index: usize) -> Option<Step> {
        self.pattern.steps.get(index).copied()
    }

    /// Set a single slot
    pub fn set(&mut self, index: usize, step: Step) -> Result<()> {
        let slot = self
            .pattern
            .steps
            .get_mut(index)
            .ok_or(TrainerError::InvalidSlotIndex(index))?;
        *slot = step;
        Ok(())
    }

    /// Advance a slot through NONE -> DON -> KA -> NONE.
    /// Out of range indexes leave the pattern untouched.
    pub fn cycle(&mut self, index: usize) -> Result<Step> {
        let slot = self
            .pattern
            .steps
            .get_mut(index)
            .ok_or(TrainerError::InvalidSlotIndex(index))?;
        *slot = slot.cycled();
        Ok(*slot)
    }

    /// Resample every slot from {NONE, NONE, DON, KA}
    pub fn randomize(&mut self) {
        const CHOICES: [Step; 4] = [Step::None, Step::None, Step::Don, Step::Ka];
        for slot in self.pattern.steps.iter_mut() {
            *slot = CHOICES[self.rng.gen_range(0..CHOICES.len())];
        }
    }

    /// Clear every slot, keeping the old pattern for undo
    pub fn clear(&mut self) {
        self.undo = Some(self.pattern);
        self.pattern = Pattern::new();
    }

    /// Replace the pattern with preset data, keeping the old pattern for undo.
    ///
    /// Returns `MalformedPatternLength` as a warning when the data had to be
    /// padded or truncated; the pattern is replaced either way.
    pub fn load_preset(&mut self, data: &[Step]) -> Result<()> {
        self.undo = Some(self.pattern);
        self.pattern = Pattern::from_steps(data);
        if data.len() == PATTERN_LEN {
            Ok(())
        } else {
            Err(TrainerError::MalformedPatternLength(data.len()))
        }
    }

    /// Restore the pattern saved by the last clear or preset load.
    /// Returns false when there is nothing to restore.
    pub fn undo(&mut self) -> bool {
        match self.undo.take() {
            Some(previous) => {
                self.pattern = previous;
                true
            }
            None => false,
        }
    }

    /// Whether an undo is available
    pub fn can_undo(&self) -> bool {
        self.undo.is_some()
    }
}

impl Default for PatternStore {
    fn default() -> Self {
        Self::new()
    }
}
