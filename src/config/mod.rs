// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for the trainer.
//!
//! Settings are stored as a versioned TOML file. Every field has a documented
//! default; missing fields take it, out of range values fall back to it (or
//! are clamped), and a file that fails to parse yields the full defaults.
//!
//! ```toml
//! version = 1
//! bpm = 100.0
//! offset = 0.0
//! speed_multiplier = 1.0
//! scale_to_tempo = true
//! game_mode = false
//! auto_randomize = false
//! pattern = [1, 0, 2, 0]
//!
//! [volume]
//! don = 0.8
//! ka = 0.8
//! metronome = 0.5
//!
//! [bindings]
//! ka_left = "d"
//! don_left = "f"
//! don_right = "j"
//! ka_right = "k"
//! ```

pub mod watcher;

pub use watcher::{PresetEvent, PresetWatcher};

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::audio::Volumes;
use crate::control::{key_name, parse_key, DrumBindings};
use crate::pattern::{Pattern, PATTERN_LEN};
use crate::timing::{validate_bpm, DEFAULT_BPM};

/// Settings format version written by this build
pub const SETTINGS_VERSION: u32 = 1;

/// Largest input offset magnitude, in seconds
pub const MAX_OFFSET: f64 = 0.1;

/// Persisted trainer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Format version
    pub version: u32,
    /// Tempo in BPM (40 - 400)
    pub bpm: f64,
    /// Input offset in seconds (-0.1 - 0.1)
    pub offset: f64,
    /// Scroll speed multiplier
    pub speed_multiplier: f64,
    /// Scale the scroll speed with tempo
    pub scale_to_tempo: bool,
    /// Start in game mode instead of the visualizer
    pub game_mode: bool,
    /// Randomize the pattern at every bar line
    pub auto_randomize: bool,
    /// Raw step values (0 = rest, 1 = DON, 2 = KA)
    pub pattern: Vec<u8>,
    /// Per-channel volumes
    pub volume: VolumeSettings,
    /// Drum key names
    pub bindings: BindingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            bpm: DEFAULT_BPM,
            offset: 0.0,
            speed_multiplier: 1.0,
            scale_to_tempo: true,
            game_mode: false,
            auto_randomize: false,
            pattern: vec![0; PATTERN_LEN],
            volume: VolumeSettings::default(),
            bindings: BindingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(?path, "no settings file, using defaults");
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|err| {
            warn!("{:#}, using default settings", err);
            Self::default()
        })
    }

    /// Parse and validate settings from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(contents).context("Failed to parse settings TOML")?;
        Ok(settings.validated())
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize settings to TOML")
    }

    /// Save settings to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = self.to_toml()?;
        fs::write(path.as_ref(), contents)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))
    }

    /// Replace invalid fields with their defaults
    pub fn validated(self) -> Self {
        let defaults = Self::default();

        if self.version > SETTINGS_VERSION {
            warn!(
                version = self.version,
                "settings written by a newer version, using defaults"
            );
            return defaults;
        }

        let bpm = validate_bpm(self.bpm).unwrap_or_else(|err| {
            warn!("{}, using {} BPM", err, defaults.bpm);
            defaults.bpm
        });

        let offset = if self.offset.is_finite() {
            self.offset.clamp(-MAX_OFFSET, MAX_OFFSET)
        } else {
            warn!(offset = self.offset, "invalid offset, using 0");
            defaults.offset
        };

        let speed_multiplier = if self.speed_multiplier.is_finite() && self.speed_multiplier > 0.0 {
            self.speed_multiplier
        } else {
            warn!(speed = self.speed_multiplier, "invalid scroll speed, using 1.0");
            defaults.speed_multiplier
        };

        if self.pattern.len() != PATTERN_LEN {
            warn!(len = self.pattern.len(), "pattern is not 32 steps, normalizing");
        }
        let pattern = Pattern::from_raw(&self.pattern).to_raw();

        Self {
            version: SETTINGS_VERSION,
            bpm,
            offset,
            speed_multiplier,
            scale_to_tempo: self.scale_to_tempo,
            game_mode: self.game_mode,
            auto_randomize: self.auto_randomize,
            pattern,
            volume: self.volume.validated(),
            bindings: self.bindings.validated(),
        }
    }
}

/// Per-channel volumes as stored on disk
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeSettings {
    pub don: f32,
    pub ka: f32,
    pub metronome: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self::from(Volumes::default())
    }
}

impl VolumeSettings {
    fn validated(self) -> Self {
        let clamp = |v: f32, default: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { default };
        let defaults = Self::default();
        Self {
            don: clamp(self.don, defaults.don),
            ka: clamp(self.ka, defaults.ka),
            metronome: clamp(self.metronome, defaults.metronome),
        }
    }
}

impl From<Volumes> for VolumeSettings {
    fn from(volumes: Volumes) -> Self {
        Self {
            don: volumes.don,
            ka: volumes.ka,
            metronome: volumes.metronome,
        }
    }
}

impl From<VolumeSettings> for Volumes {
    fn from(settings: VolumeSettings) -> Self {
        Self {
            don: settings.don,
            ka: settings.ka,
            metronome: settings.metronome,
        }
    }
}

/// Drum key names as stored on disk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BindingSettings {
    pub don_left: String,
    pub don_right: String,
    pub ka_left: String,
    pub ka_right: String,
}

impl Default for BindingSettings {
    fn default() -> Self {
        Self::from(&DrumBindings::default())
    }
}

impl BindingSettings {
    /// Resolve key names. Unknown names fall back to that binding's default.
    pub fn to_drums(&self) -> DrumBindings {
        let defaults = DrumBindings::default();
        let resolve = |name: &str, default| {
            parse_key(name).unwrap_or_else(|err| {
                warn!("{}, using '{}'", err, key_name(default));
                default
            })
        };

        DrumBindings {
            don_left: resolve(&self.don_left, defaults.don_left),
            don_right: resolve(&self.don_right, defaults.don_right),
            ka_left: resolve(&self.ka_left, defaults.ka_left),
            ka_right: resolve(&self.ka_right, defaults.ka_right),
        }
    }

    fn validated(self) -> Self {
        Self::from(&self.to_drums())
    }
}

impl From<&DrumBindings> for BindingSettings {
    fn from(drums: &DrumBindings) -> Self {
        Self {
            don_left: key_name(drums.don_left),
            don_right: key_name(drums.don_right),
            ka_left: key_name(drums.ka_left),
            ka_right: key_name(drums.ka_right),
        }
    }
}
