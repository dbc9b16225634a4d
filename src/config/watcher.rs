// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for hot-reloading the preset library.
//!
//! Watches the directory holding the preset file so editors that save by
//! replacing the file are still picked up. Bursts of change events are
//! debounced into one reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use crate::pattern::PresetLibrary;

/// Events emitted by the preset watcher
#[derive(Debug, Clone)]
pub enum PresetEvent {
    /// Preset file was modified and successfully reloaded
    Reloaded(PresetLibrary),
    /// Preset file was modified but failed to load
    Error(String),
}

/// Preset file watcher with debouncing
pub struct PresetWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<PresetEvent>,
    watched_path: PathBuf,
}

impl PresetWatcher {
    /// Create a new watcher for a preset file
    ///
    /// # Arguments
    /// * `path` - Preset YAML file
    /// * `debounce_ms` - Debounce duration in milliseconds (default: 500)
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(500));

        let file_name = watched_path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| anyhow!("Preset path has no file name: {:?}", watched_path))?;
        let dir = match watched_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, event_rx): (Sender<PresetEvent>, Receiver<PresetEvent>) = mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", dir, e))?;

        let reload_path = watched_path.clone();
        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(50)) {
                    Ok(event) => {
                        let relevant = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                            && event
                                .paths
                                .iter()
                                .any(|path| path.file_name() == Some(file_name.as_os_str()));
                        if relevant {
                            last_event_time = Some(Instant::now());
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        let settled = last_event_time
                            .is_some_and(|last_time| last_time.elapsed() >= debounce_duration);
                        if settled {
                            last_event_time = None;
                            let event = match PresetLibrary::load(&reload_path) {
                                Ok(library) => {
                                    debug!(presets = library.len(), "preset library reloaded");
                                    PresetEvent::Reloaded(library)
                                }
                                Err(e) => PresetEvent::Error(format!("{:#}", e)),
                            };
                            if event_tx.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        // Watcher was dropped, exit thread
                        break;
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next preset event (non-blocking)
    pub fn try_recv(&self) -> Option<PresetEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending preset events
    pub fn recv_all(&self) -> Vec<PresetEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Get the path being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}
