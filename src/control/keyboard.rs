// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keyboard shortcut handling.
//!
//! Provides the four rebindable drum keys plus fixed bindings for transport,
//! tempo, scroll, volume, and pattern editing.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};

use super::{Command, ControlAction, LogicalAction, BPM_STEP, OFFSET_STEP};
use crate::audio::{VolumeChannel, VOLUME_STEP};
use crate::error::{Result, TrainerError};

/// A keyboard shortcut definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcut {
    /// Key code
    pub code: KeyCode,
    /// Required modifiers
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    /// Create a new shortcut.
    ///
    /// Shift is folded into the character for printable keys, so `P` and
    /// `Shift+P` are the same shortcut.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        let modifiers = match code {
            KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        Self { code, modifiers }
    }

    /// Create a shortcut with no modifiers
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Create a shortcut with Ctrl modifier
    pub fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    /// Check if this shortcut matches a key event
    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        *self == Shortcut::new(code, modifiers)
    }
}

/// A keyboard binding (shortcut to action)
#[derive(Debug, Clone)]
pub struct KeyBinding {
    /// The shortcut
    pub shortcut: Shortcut,
    /// The action to perform
    pub action: ControlAction,
    /// Description for help display
    pub description: String,
    /// Category for grouping in help
    pub category: String,
}

impl KeyBinding {
    /// Create a new key binding
    pub fn new(shortcut: Shortcut, action: ControlAction, description: impl Into<String>) -> Self {
        Self {
            shortcut,
            action,
            description: description.into(),
            category: "General".to_string(),
        }
    }

    /// Set the category
    pub fn category(mut self, cat: impl Into<String>) -> Self {
        self.category = cat.into();
        self
    }
}

/// Keys bound to the four drum actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrumBindings {
    pub don_left: KeyCode,
    pub don_right: KeyCode,
    pub ka_left: KeyCode,
    pub ka_right: KeyCode,
}

impl Default for DrumBindings {
    fn default() -> Self {
        Self {
            don_left: KeyCode::Char('f'),
            don_right: KeyCode::Char('j'),
            ka_left: KeyCode::Char('d'),
            ka_right: KeyCode::Char('k'),
        }
    }
}

impl DrumBindings {
    /// Key bound to an action
    pub fn get(&self, action: LogicalAction) -> KeyCode {
        match action {
            LogicalAction::DonLeft => self.don_left,
            LogicalAction::DonRight => self.don_right,
            LogicalAction::KaLeft => self.ka_left,
            LogicalAction::KaRight => self.ka_right,
        }
    }

    /// Bind a key to an action. If another drum already uses the key the
    /// two actions swap keys.
    pub fn set(&mut self, action: LogicalAction, code: KeyCode) {
        let previous = self.get(action);
        if let Some(other) = self.action_for(code) {
            *self.slot_mut(other) = previous;
        }
        *self.slot_mut(action) = code;
    }

    /// Action bound to a key
    pub fn action_for(&self, code: KeyCode) -> Option<LogicalAction> {
        let code = fold_case(code);
        LogicalAction::ALL
            .into_iter()
            .find(|action| fold_case(self.get(*action)) == code)
    }

    fn slot_mut(&mut self, action: LogicalAction) -> &mut KeyCode {
        match action {
            LogicalAction::DonLeft => &mut self.don_left,
            LogicalAction::DonRight => &mut self.don_right,
            LogicalAction::KaLeft => &mut self.ka_left,
            LogicalAction::KaRight => &mut self.ka_right,
        }
    }
}

/// Drum keys are case-insensitive
fn fold_case(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Keyboard controller with configurable bindings
pub struct KeyboardController {
    bindings: HashMap<Shortcut, KeyBinding>,
    drums: DrumBindings,
}

impl KeyboardController {
    /// Create a controller with drum keys only
    pub fn new(drums: DrumBindings) -> Self {
        Self {
            bindings: HashMap::new(),
            drums,
        }
    }

    /// Create a keyboard controller with default bindings
    pub fn with_defaults() -> Self {
        Self::with_drums(DrumBindings::default())
    }

    /// Create a keyboard controller with the default command bindings and
    /// the given drum keys
    pub fn with_drums(drums: DrumBindings) -> Self {
        let mut controller = Self::new(drums);
        controller.add_default_bindings();
        controller
    }

    /// Add default keyboard bindings
    fn add_default_bindings(&mut self) {
        // Transport
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char(' ')),
            ControlAction::Session(Command::ToggleTransport),
            "Start/Stop",
        ).category("Transport"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('g')),
            ControlAction::Session(Command::ToggleGameMode),
            "Game/Visualizer Mode",
        ).category("Transport"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('m')),
            ControlAction::Session(Command::ToggleDemo),
            "Demo Mode",
        ).category("Transport"));

        // Tempo
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Right),
            ControlAction::Session(Command::AdjustBpm(BPM_STEP)),
            "Tempo +5 BPM",
        ).category("Tempo"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Left),
            ControlAction::Session(Command::AdjustBpm(-BPM_STEP)),
            "Tempo -5 BPM",
        ).category("Tempo"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('o')),
            ControlAction::Session(Command::AdjustOffset(OFFSET_STEP)),
            "Offset +5 ms",
        ).category("Tempo"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('O')),
            ControlAction::Session(Command::AdjustOffset(-OFFSET_STEP)),
            "Offset -5 ms",
        ).category("Tempo"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('0')),
            ControlAction::Session(Command::ResetOffset),
            "Reset Offset",
        ).category("Tempo"));

        // Scroll
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('+')),
            ControlAction::Session(Command::StepSpeed(1)),
            "Scroll Faster",
        ).category("Scroll"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('=')),
            ControlAction::Session(Command::StepSpeed(1)),
            "Scroll Faster",
        ).category("Scroll"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('-')),
            ControlAction::Session(Command::StepSpeed(-1)),
            "Scroll Slower",
        ).category("Scroll"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('s')),
            ControlAction::Session(Command::ToggleScaleToTempo),
            "Scale Scroll to Tempo",
        ).category("Scroll"));

        // Volume (1-6: down/up per channel)
        let channels = [VolumeChannel::Don, VolumeChannel::Ka, VolumeChannel::Metronome];
        for (i, channel) in channels.into_iter().enumerate() {
            let down = char::from(b'1' + (i as u8) * 2);
            let up = char::from(b'2' + (i as u8) * 2);
            self.add(KeyBinding::new(
                Shortcut::key(KeyCode::Char(down)),
                ControlAction::Session(Command::ChangeVolume(channel, -VOLUME_STEP)),
                format!("{} -", channel),
            ).category("Volume"));
            self.add(KeyBinding::new(
                Shortcut::key(KeyCode::Char(up)),
                ControlAction::Session(Command::ChangeVolume(channel, VOLUME_STEP)),
                format!("{} +", channel),
            ).category("Volume"));
        }

        // Pattern
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('r')),
            ControlAction::Session(Command::RandomizePattern),
            "Randomize Pattern",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('a')),
            ControlAction::Session(Command::ToggleAutoRandomize),
            "Auto-Randomize Every Bar",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('c')),
            ControlAction::Session(Command::ClearPattern),
            "Clear Pattern",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('u')),
            ControlAction::Session(Command::UndoPattern),
            "Undo Clear/Preset",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('p')),
            ControlAction::NextPreset,
            "Next Preset",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('P')),
            ControlAction::PrevPreset,
            "Previous Preset",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('[')),
            ControlAction::MoveCursor(-1),
            "Cursor Left",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char(']')),
            ControlAction::MoveCursor(1),
            "Cursor Right",
        ).category("Pattern"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Enter),
            ControlAction::CycleCursorSlot,
            "Cycle Slot",
        ).category("Pattern"));

        // Drum rebinding (F1-F4)
        for (i, action) in LogicalAction::ALL.into_iter().enumerate() {
            self.add(KeyBinding::new(
                Shortcut::key(KeyCode::F(i as u8 + 1)),
                ControlAction::Rebind(action),
                format!("Rebind {}", action),
            ).category("Keys"));
        }

        // UI
        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('?')),
            ControlAction::ToggleHelp,
            "Toggle Help",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('h')),
            ControlAction::ToggleHelp,
            "Toggle Help",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Char('q')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::key(KeyCode::Esc),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));

        self.add(KeyBinding::new(
            Shortcut::ctrl(KeyCode::Char('c')),
            ControlAction::Quit,
            "Quit",
        ).category("UI"));
    }

    /// Add a key binding
    pub fn add(&mut self, binding: KeyBinding) {
        self.bindings.insert(binding.shortcut.clone(), binding);
    }

    /// Remove a key binding
    pub fn remove(&mut self, shortcut: &Shortcut) -> Option<KeyBinding> {
        self.bindings.remove(shortcut)
    }

    /// Drum key bindings
    pub fn drums(&self) -> &DrumBindings {
        &self.drums
    }

    /// Bind a key to a drum action
    pub fn rebind(&mut self, action: LogicalAction, code: KeyCode) {
        self.drums.set(action, code);
    }

    /// Process a key event and return the action.
    ///
    /// Drum keys take priority over command bindings so a drum can be bound
    /// to any key. Ctrl chords are never drums.
    pub fn process_key(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<ControlAction> {
        if !modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(action) = self.drums.action_for(code) {
                return Some(ControlAction::Drum(action));
            }
        }

        let shortcut = Shortcut::new(code, modifiers);
        self.bindings.get(&shortcut).map(|b| b.action.clone())
    }

    /// Get all bindings for help display
    pub fn bindings(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.values()
    }

    /// Get bindings grouped by category
    pub fn bindings_by_category(&self) -> HashMap<String, Vec<&KeyBinding>> {
        let mut grouped: HashMap<String, Vec<&KeyBinding>> = HashMap::new();

        for binding in self.bindings.values() {
            grouped
                .entry(binding.category.clone())
                .or_default()
                .push(binding);
        }

        grouped
    }
}

impl Default for KeyboardController {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Parse a key name as stored in the settings file
pub fn parse_key(name: &str) -> Result<KeyCode> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let code = match lower.as_str() {
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        "delete" => KeyCode::Delete,
        _ => {
            return lower
                .strip_prefix('f')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=12).contains(n))
                .map(KeyCode::F)
                .ok_or_else(|| TrainerError::UnknownKey(name.to_string()));
        }
    };
    Ok(code)
}

/// Name of a key as stored in the settings file
pub fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_ascii_lowercase().to_string(),
        KeyCode::F(n) => format!("f{}", n),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pageup".to_string(),
        KeyCode::PageDown => "pagedown".to_string(),
        KeyCode::Insert => "insert".to_string(),
        KeyCode::Delete => "delete".to_string(),
        _ => "?".to_string(),
    }
}

/// Format a shortcut for display
pub fn format_shortcut(shortcut: &Shortcut) -> String {
    let mut parts = Vec::new();

    if shortcut.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl");
    }
    if shortcut.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt");
    }

    let key = match shortcut.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        other => key_name(other),
    };

    parts.push(&key);
    parts.join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_folds_shift_into_chars() {
        let s = Shortcut::new(KeyCode::Char('P'), KeyModifiers::SHIFT);
        assert_eq!(s, Shortcut::key(KeyCode::Char('P')));

        let s = Shortcut::new(KeyCode::Up, KeyModifiers::SHIFT);
        assert_eq!(s.modifiers, KeyModifiers::SHIFT);
    }

    #[test]
    fn test_shortcut_matches() {
        let s = Shortcut::ctrl(KeyCode::Char('c'));
        assert!(s.matches(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!s.matches(KeyCode::Char('c'), KeyModifiers::NONE));
        assert!(!s.matches(KeyCode::Char('x'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_default_drum_keys() {
        let controller = KeyboardController::with_defaults();

        let cases = [
            ('d', LogicalAction::KaLeft),
            ('f', LogicalAction::DonLeft),
            ('j', LogicalAction::DonRight),
            ('k', LogicalAction::KaRight),
        ];
        for (c, action) in cases {
            let result = controller.process_key(KeyCode::Char(c), KeyModifiers::NONE);
            assert_eq!(result, Some(ControlAction::Drum(action)));
        }

        // Caps lock still plays
        let result = controller.process_key(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(result, Some(ControlAction::Drum(LogicalAction::DonLeft)));
    }

    #[test]
    fn test_default_command_keys() {
        let controller = KeyboardController::with_defaults();

        let action = controller.process_key(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(action, Some(ControlAction::Session(Command::ToggleTransport)));

        let action = controller.process_key(KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(action, Some(ControlAction::Session(Command::AdjustBpm(5.0))));

        let action = controller.process_key(KeyCode::Char('P'), KeyModifiers::SHIFT);
        assert_eq!(action, Some(ControlAction::PrevPreset));

        let action = controller.process_key(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(action, Some(ControlAction::Quit));

        let action = controller.process_key(KeyCode::Char('z'), KeyModifiers::NONE);
        assert_eq!(action, None);
    }

    #[test]
    fn test_volume_keys() {
        let controller = KeyboardController::with_defaults();

        let action = controller.process_key(KeyCode::Char('1'), KeyModifiers::NONE);
        assert_eq!(
            action,
            Some(ControlAction::Session(Command::ChangeVolume(VolumeChannel::Don, -VOLUME_STEP)))
        );

        let action = controller.process_key(KeyCode::Char('6'), KeyModifiers::NONE);
        assert_eq!(
            action,
            Some(ControlAction::Session(Command::ChangeVolume(VolumeChannel::Metronome, VOLUME_STEP)))
        );
    }

    #[test]
    fn test_rebind_shadows_command_key() {
        let mut controller = KeyboardController::with_defaults();
        controller.rebind(LogicalAction::DonLeft, KeyCode::Char('r'));

        let action = controller.process_key(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(action, Some(ControlAction::Drum(LogicalAction::DonLeft)));

        // The old key goes back to being unbound
        let action = controller.process_key(KeyCode::Char('f'), KeyModifiers::NONE);
        assert_eq!(action, None);
    }

    #[test]
    fn test_rebind_swaps_conflicting_drum() {
        let mut drums = DrumBindings::default();
        drums.set(LogicalAction::DonLeft, KeyCode::Char('k'));
        assert_eq!(drums.don_left, KeyCode::Char('k'));
        assert_eq!(drums.ka_right, KeyCode::Char('f'));
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("f"), Ok(KeyCode::Char('f')));
        assert_eq!(parse_key("J"), Ok(KeyCode::Char('j')));
        assert_eq!(parse_key("space"), Ok(KeyCode::Char(' ')));
        assert_eq!(parse_key("F5"), Ok(KeyCode::F(5)));
        assert_eq!(parse_key("Left"), Ok(KeyCode::Left));
        assert_eq!(
            parse_key("hyper"),
            Err(TrainerError::UnknownKey("hyper".to_string()))
        );
        assert!(parse_key("f13").is_err());
        assert!(parse_key("").is_err());
    }

    #[test]
    fn test_key_name_parses_back() {
        for code in [KeyCode::Char('d'), KeyCode::Char(' '), KeyCode::F(2), KeyCode::Down] {
            assert_eq!(parse_key(&key_name(code)), Ok(code));
        }
    }

    #[test]
    fn test_format_shortcut() {
        assert_eq!(format_shortcut(&Shortcut::key(KeyCode::Char(' '))), "Space");
        assert_eq!(format_shortcut(&Shortcut::ctrl(KeyCode::Char('c'))), "Ctrl+c");
        assert_eq!(format_shortcut(&Shortcut::key(KeyCode::Char('P'))), "P");
        assert_eq!(format_shortcut(&Shortcut::key(KeyCode::F(3))), "F3");
    }

    #[test]
    fn test_bindings_by_category() {
        let controller = KeyboardController::with_defaults();
        let grouped = controller.bindings_by_category();

        assert!(grouped.contains_key("Transport"));
        assert!(grouped.contains_key("Tempo"));
        assert!(grouped.contains_key("Pattern"));
        assert_eq!(grouped["Keys"].len(), 4);
    }
}
