// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Control system for keyboard input and session commands.
//!
//! This module provides:
//! - The `Command` enum every session change is dispatched through
//! - Logical drum actions and the key events the host delivers
//! - Keyboard bindings with rebindable drum keys

pub mod keyboard;

pub use keyboard::{format_shortcut, key_name, parse_key, DrumBindings, KeyBinding, KeyboardController, Shortcut};

use std::fmt;

use crate::audio::VolumeChannel;
use crate::pattern::{NoteKind, Preset};

/// Tempo change per arrow key press
pub const BPM_STEP: f64 = 5.0;

/// Offset change per offset key press, in seconds
pub const OFFSET_STEP: f64 = 0.005;

/// A change to the session state
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Transport
    /// Start (resetting stats) or stop the transport
    ToggleTransport,
    /// Switch between game and visualizer mode
    ToggleGameMode,
    /// Turn demo auto-play on (restarting) or off (stopping)
    ToggleDemo,

    // Tempo and timing
    /// Set the tempo
    SetBpm(f64),
    /// Adjust the tempo by a delta, clamped to the supported range
    AdjustBpm(f64),
    /// Set the input offset in seconds
    SetOffset(f64),
    /// Adjust the input offset by a delta
    AdjustOffset(f64),
    /// Set the input offset back to zero
    ResetOffset,

    // Scroll
    /// Set the scroll speed multiplier
    SetSpeed(f64),
    /// Move to the next (positive) or previous speed option
    StepSpeed(i32),
    /// Toggle scaling the scroll speed with tempo
    ToggleScaleToTempo,

    // Audio
    /// Adjust a volume channel by a delta
    ChangeVolume(VolumeChannel, f32),

    // Pattern
    /// Cycle a pattern slot NONE -> DON -> KA -> NONE
    CycleSlot(usize),
    /// Clear the pattern (undoable)
    ClearPattern,
    /// Restore the pattern saved by the last clear or preset
    UndoPattern,
    /// Resample every slot
    RandomizePattern,
    /// Randomize the pattern at every bar line
    ToggleAutoRandomize,
    /// Load a preset (undoable)
    ApplyPreset(Preset),
}

impl Command {
    /// Check if this command can start or stop the transport
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Command::ToggleTransport
                | Command::ToggleGameMode
                | Command::ToggleDemo
                | Command::ApplyPreset(_)
        )
    }

    /// Check if this command edits the pattern
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Command::CycleSlot(_)
                | Command::ClearPattern
                | Command::UndoPattern
                | Command::RandomizePattern
                | Command::ApplyPreset(_)
        )
    }
}

/// Logical drum action delivered by the input host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAction {
    DonLeft,
    DonRight,
    KaLeft,
    KaRight,
}

impl LogicalAction {
    /// All actions in rebinding order
    pub const ALL: [LogicalAction; 4] = [
        LogicalAction::KaLeft,
        LogicalAction::DonLeft,
        LogicalAction::DonRight,
        LogicalAction::KaRight,
    ];

    /// Instrument played by this action
    pub fn kind(&self) -> NoteKind {
        match self {
            LogicalAction::DonLeft | LogicalAction::DonRight => NoteKind::Don,
            LogicalAction::KaLeft | LogicalAction::KaRight => NoteKind::Ka,
        }
    }
}

impl fmt::Display for LogicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalAction::DonLeft => write!(f, "Don (L)"),
            LogicalAction::DonRight => write!(f, "Don (R)"),
            LogicalAction::KaLeft => write!(f, "Ka (L)"),
            LogicalAction::KaRight => write!(f, "Ka (R)"),
        }
    }
}

/// A drum key press with its timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    /// Logical action the key is bound to
    pub action: LogicalAction,
    /// Absolute time of the press
    pub timestamp: f64,
}

impl KeyEvent {
    /// Create a key event
    pub fn new(action: LogicalAction, timestamp: f64) -> Self {
        Self { action, timestamp }
    }
}

/// Action that can be triggered by the keyboard
#[derive(Debug, Clone, PartialEq)]
pub enum ControlAction {
    /// Drum hit
    Drum(LogicalAction),
    /// Session change
    Session(Command),

    // Presets
    /// Apply the next preset in the library
    NextPreset,
    /// Apply the previous preset in the library
    PrevPreset,

    // Pattern editor
    /// Move the editor cursor by a number of slots
    MoveCursor(i32),
    /// Cycle the slot under the cursor
    CycleCursorSlot,

    // UI
    /// Wait for a key to bind to a drum action
    Rebind(LogicalAction),
    /// Toggle help display
    ToggleHelp,
    /// Quit application
    Quit,
}

impl ControlAction {
    /// Check if this action edits the pattern
    pub fn is_pattern(&self) -> bool {
        match self {
            ControlAction::Session(command) => command.is_pattern(),
            ControlAction::NextPreset
            | ControlAction::PrevPreset
            | ControlAction::CycleCursorSlot => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_action_kind() {
        assert_eq!(LogicalAction::DonLeft.kind(), NoteKind::Don);
        assert_eq!(LogicalAction::DonRight.kind(), NoteKind::Don);
        assert_eq!(LogicalAction::KaLeft.kind(), NoteKind::Ka);
        assert_eq!(LogicalAction::KaRight.kind(), NoteKind::Ka);
    }

    #[test]
    fn test_command_categories() {
        assert!(Command::ToggleTransport.is_transport());
        assert!(Command::ApplyPreset(Preset::repeated("x", &[1])).is_transport());
        assert!(!Command::SetBpm(120.0).is_transport());

        assert!(Command::ClearPattern.is_pattern());
        assert!(Command::CycleSlot(3).is_pattern());
        assert!(!Command::ToggleDemo.is_pattern());
    }

    #[test]
    fn test_control_action_categories() {
        assert!(!ControlAction::Drum(LogicalAction::KaLeft).is_pattern());
        assert!(ControlAction::Session(Command::UndoPattern).is_pattern());
        assert!(ControlAction::NextPreset.is_pattern());
        assert!(!ControlAction::ToggleHelp.is_pattern());
    }
}
