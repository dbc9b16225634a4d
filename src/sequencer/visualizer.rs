// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Free-scroll echo track.
//!
//! In visualizer mode nothing is judged: each drum press is echoed as a
//! marker that leaves the hit line and scrolls left with the beat grid.

use super::Viewport;
use crate::pattern::NoteKind;

/// Markers further than this past the left edge are dropped
pub const ECHO_PRUNE_MARGIN: f64 = 100.0;

/// A decorative marker for a past key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoNote {
    /// Instrument type
    pub kind: NoteKind,
    /// Absolute time of the key press
    pub time: f64,
}

/// Echo markers in press order
#[derive(Debug, Clone, Default)]
pub struct EchoTrack {
    notes: Vec<EchoNote>,
}

impl EchoTrack {
    /// Create an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press
    pub fn push(&mut self, kind: NoteKind, time: f64) {
        self.notes.push(EchoNote { kind, time });
    }

    /// Drop markers that have scrolled off the left edge
    pub fn prune(&mut self, now: f64, viewport: &Viewport, scroll: f64) {
        self.notes
            .retain(|note| viewport.hit_x - (now - note.time) * scroll > -ECHO_PRUNE_MARGIN);
    }

    /// Remove every marker
    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Current markers
    pub fn notes(&self) -> &[EchoNote] {
        &self.notes
    }

    /// Number of markers
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Whether the track is empty
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
