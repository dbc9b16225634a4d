// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio collaborator interface.
//!
//! The trainer core never produces samples itself. It asks an `AudioSink`
//! to play one of three sounds with the current channel volume. Sinks must
//! return immediately: they are called from inside the simulation tick.

use std::fmt;

/// Volume change per step of the volume controls
pub const VOLUME_STEP: f32 = 0.05;

/// A sound the core can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    /// Center drum hit
    Don,
    /// Rim drum hit
    Ka,
    /// Metronome click on each beat
    MetronomeTick,
}

impl Sound {
    /// Volume channel the sound plays on
    pub fn channel(&self) -> VolumeChannel {
        match self {
            Sound::Don => VolumeChannel::Don,
            Sound::Ka => VolumeChannel::Ka,
            Sound::MetronomeTick => VolumeChannel::Metronome,
        }
    }
}

impl From<crate::pattern::NoteKind> for Sound {
    fn from(kind: crate::pattern::NoteKind) -> Self {
        match kind {
            crate::pattern::NoteKind::Don => Sound::Don,
            crate::pattern::NoteKind::Ka => Sound::Ka,
        }
    }
}

/// Independently adjustable volume channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeChannel {
    Don,
    Ka,
    Metronome,
}

impl fmt::Display for VolumeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeChannel::Don => write!(f, "Don Volume"),
            VolumeChannel::Ka => write!(f, "Ka Volume"),
            VolumeChannel::Metronome => write!(f, "Metronome"),
        }
    }
}

/// Per-channel volumes (0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volumes {
    pub don: f32,
    pub ka: f32,
    pub metronome: f32,
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            don: 0.8,
            ka: 0.8,
            metronome: 0.5,
        }
    }
}

impl Volumes {
    /// Volume of a channel
    pub fn get(&self, channel: VolumeChannel) -> f32 {
        match channel {
            VolumeChannel::Don => self.don,
            VolumeChannel::Ka => self.ka,
            VolumeChannel::Metronome => self.metronome,
        }
    }

    /// Set a channel, clamped to 0.0 - 1.0
    pub fn set(&mut self, channel: VolumeChannel, volume: f32) {
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 0.0 };
        match channel {
            VolumeChannel::Don => self.don = volume,
            VolumeChannel::Ka => self.ka = volume,
            VolumeChannel::Metronome => self.metronome = volume,
        }
    }

    /// Adjust a channel by a delta, clamped to 0.0 - 1.0
    pub fn adjust(&mut self, channel: VolumeChannel, delta: f32) {
        self.set(channel, self.get(channel) + delta);
    }

    /// Volume for a sound
    pub fn for_sound(&self, sound: Sound) -> f32 {
        self.get(sound.channel())
    }
}

/// Fire-and-forget sound output
pub trait AudioSink {
    /// Play a sound now at the given volume. Must not block.
    fn play(&mut self, sound: Sound, volume: f32);
}

/// Sink that discards every request
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _sound: Sound, _volume: f32) {}
}

/// Sink that records every request, in order
#[derive(Debug, Clone, Default)]
pub struct SoundLog {
    played: Vec<(Sound, f32)>,
}

impl SoundLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything played so far
    pub fn played(&self) -> &[(Sound, f32)] {
        &self.played
    }

    /// How many times a sound was played
    pub fn count(&self, sound: Sound) -> usize {
        self.played.iter().filter(|(played, _)| *played == sound).count()
    }

    /// Forget recorded sounds
    pub fn clear(&mut self) {
        self.played.clear();
    }
}

impl AudioSink for SoundLog {
    fn play(&mut self, sound: Sound, volume: f32) {
        self.played.push((sound, volume));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::NoteKind;

    #[test]
    fn test_volume_clamping() {
        let mut volumes = Volumes::default();
        volumes.adjust(VolumeChannel::Don, 0.5);
        assert_eq!(volumes.don, 1.0);

        volumes.adjust(VolumeChannel::Metronome, -2.0);
        assert_eq!(volumes.metronome, 0.0);

        volumes.set(VolumeChannel::Ka, f32::NAN);
        assert_eq!(volumes.ka, 0.0);
    }

    #[test]
    fn test_sound_channels() {
        let volumes = Volumes::default();
        assert_eq!(volumes.for_sound(Sound::MetronomeTick), 0.5);
        assert_eq!(volumes.for_sound(Sound::from(NoteKind::Ka)), 0.8);
        assert_eq!(Sound::from(NoteKind::Don).channel(), VolumeChannel::Don);
    }

    #[test]
    fn test_sound_log() {
        let mut log = SoundLog::new();
        log.play(Sound::Don, 0.8);
        log.play(Sound::MetronomeTick, 0.5);
        log.play(Sound::Don, 0.8);
        assert_eq!(log.count(Sound::Don), 2);
        assert_eq!(log.played()[1], (Sound::MetronomeTick, 0.5));

        log.clear();
        assert!(log.played().is_empty());
    }
}
