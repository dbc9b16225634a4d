// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Preset rudiments.
//!
//! The built-in list covers the basic streams and triplet figures. A
//! practice library can also be loaded from YAML:
//!
//! ```yaml
//! presets:
//!   - name: "Don 1/8 Stream"
//!     steps: [1, 0, 1, 0]
//! ```
//!
//! Steps use 0 = rest, 1 = DON, 2 = KA; short lists are padded with rests.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Step, PATTERN_LEN};

/// A named pattern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Display name
    pub name: String,
    /// Raw step values
    pub steps: Vec<u8>,
}

impl Preset {
    /// Create a preset by repeating a figure across the bar
    pub fn repeated(name: impl Into<String>, figure: &[u8]) -> Self {
        let steps = figure.iter().copied().cycle().take(PATTERN_LEN).collect();
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Steps as pattern values. Unknown values become rests.
    pub fn to_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .map(|&value| {
                Step::try_from(value).unwrap_or_else(|err| {
                    warn!(preset = %self.name, "{}, treating as rest", err);
                    Step::None
                })
            })
            .collect()
    }
}

/// Built-in rudiments
pub fn builtin() -> Vec<Preset> {
    vec![
        Preset::repeated("Don 1/8 Stream", &[1, 0]),
        Preset::repeated("Ka 1/8 Stream", &[2, 0]),
        Preset::repeated("Don-Ka 1/16 Alt", &[1, 2]),
        Preset::repeated("Triplets DON", &[1, 1, 1, 0]),
        Preset::repeated("Triplets KA", &[2, 2, 2, 0]),
        Preset::repeated("DDK Triplet", &[1, 1, 2, 0]),
        Preset::repeated("KKD Triplet", &[2, 2, 1, 0]),
        Preset::repeated("Don 1/16 Stream", &[1]),
        Preset::repeated("Ka 1/16 Stream", &[2]),
    ]
}

/// Ordered collection of presets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetLibrary {
    /// Presets in menu order
    #[serde(default)]
    pub presets: Vec<Preset>,
}

impl PresetLibrary {
    /// Library holding the built-in rudiments
    pub fn builtin() -> Self {
        Self { presets: builtin() }
    }

    /// Load a library from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read preset file: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a library from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse preset YAML")
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize presets to YAML")
    }

    /// Number of presets
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Whether the library is empty
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Get a preset by index
    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    /// Find a preset by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name))
    }
}

impl Default for PresetLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}
