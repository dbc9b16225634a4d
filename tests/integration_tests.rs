// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for the trainer
//!
//! These tests verify that multiple components work together correctly.

use std::collections::BTreeSet;
use std::fs;

use taiko_trainer::audio::{NullSink, Sound, SoundLog};
use taiko_trainer::config::Settings;
use taiko_trainer::control::{Command, KeyEvent, LogicalAction};
use taiko_trainer::judge::{InputEvent, Judgment, JudgmentEngine};
use taiko_trainer::pattern::{NoteKind, Pattern, PatternStore, PresetLibrary, Step, PATTERN_LEN};
use taiko_trainer::sequencer::scheduler::lookahead_steps;
use taiko_trainer::sequencer::{TargetNote, Viewport};
use taiko_trainer::timing::{sub_beat_interval, Transport};
use taiko_trainer::{Mode, Session, TickReport};
use tempfile::tempdir;

/// Tick a session every 10 ms over `[from, to]`
fn run(session: &mut Session, from: f64, to: f64, log: &mut SoundLog) -> Vec<TickReport> {
    let mut reports = Vec::new();
    let mut i = 0;
    loop {
        let now = from + i as f64 * 0.01;
        if now > to {
            break;
        }
        reports.push(session.tick(now, log));
        i += 1;
    }
    reports
}

fn game_session(pattern: Vec<u8>) -> Session {
    Session::new(&Settings {
        game_mode: true,
        pattern,
        ..Settings::default()
    })
}

/// bpm 100, slot 0 = DON: the first target is the one whose lookahead
/// lands on the next bar, and hitting it on time is GOOD
#[test]
fn test_first_target_is_judged_good() {
    let mut raw = vec![0; PATTERN_LEN];
    raw[0] = 1;
    let mut session = game_session(raw);
    let mut log = SoundLog::new();

    assert_eq!(session.transport().sub_beat_interval(), 0.15);
    let viewport = session.viewport();
    assert_eq!(viewport, Viewport::game(1920.0));
    let lookahead = lookahead_steps(viewport.visible_width(), session.effective_scroll(), 0.15);
    assert_eq!(lookahead, 24);

    session.apply(Command::ToggleTransport, 0.0).unwrap();
    run(&mut session, 0.0, 4.0, &mut log);

    let targets: Vec<TargetNote> = session.live_targets().copied().collect();
    assert_eq!(targets.len(), 1);
    let target = targets[0];
    assert_eq!(target.kind, NoteKind::Don);
    assert_eq!(target.step, 32);
    assert!((target.scheduled_time - 0.15 * (8 + lookahead) as f64).abs() < 1e-9);

    session.key_down(
        KeyEvent::new(LogicalAction::DonLeft, target.scheduled_time),
        &mut log,
    );
    let report = session.tick(target.scheduled_time, &mut log);

    assert_eq!(report.judged.len(), 1);
    assert_eq!(report.judged[0].judgment, Judgment::Good);
    assert_eq!(session.stats().combo, 1);
    assert_eq!(session.stats().max_combo, 1);
    assert_eq!(session.live_targets().count(), 0);
    assert_eq!(log.count(Sound::Don), 1);
}

/// Slowing the scroll mid-run lengthens the lookahead; the steps it jumps
/// over are still scheduled, so every DON appears exactly once
#[test]
fn test_slower_scroll_keeps_every_note() {
    let mut session = Session::new(&Settings {
        game_mode: true,
        pattern: vec![1; PATTERN_LEN],
        speed_multiplier: 2.0,
        ..Settings::default()
    });
    let mut log = SoundLog::new();
    let mut seen = BTreeSet::new();
    let mut missed = 0;

    session.apply(Command::ToggleTransport, 0.0).unwrap();
    for i in 0..=800 {
        let now = i as f64 * 0.01;
        if i == 200 {
            session.apply(Command::StepSpeed(-1), now).unwrap();
            assert_eq!(session.scroll().speed_multiplier, 1.5);
        }
        missed += session.tick(now, &mut log).missed;
        seen.extend(session.live_targets().map(|note| note.step));
    }

    let first = *seen.first().unwrap();
    let last = *seen.last().unwrap();
    assert_eq!(seen.len() as u64, last - first + 1, "gap in scheduled steps: {:?}", seen);
    assert_eq!(missed as usize + session.live_targets().count(), seen.len());
}

#[test]
fn test_combo_resets_on_bad() {
    let mut engine = JudgmentEngine::new();
    for i in 0..5 {
        let t = 1.0 + i as f64 * 0.5;
        engine.push(TargetNote::new(NoteKind::Don, t, i));
        let judged = engine.judge(&InputEvent::player(NoteKind::Don, t), 0.0).unwrap();
        assert_eq!(judged.judgment, Judgment::Good);
    }
    assert_eq!(engine.stats().combo, 5);

    engine.push(TargetNote::new(NoteKind::Don, 10.0, 5));
    let judged = engine.judge(&InputEvent::player(NoteKind::Don, 10.09), 0.0).unwrap();
    assert_eq!(judged.judgment, Judgment::Bad);
    assert_eq!(engine.stats().combo, 0);
    assert_eq!(engine.stats().max_combo, 5);
}

#[test]
fn test_judgment_windows() {
    let mut engine = JudgmentEngine::new();
    engine.push(TargetNote::new(NoteKind::Ka, 5.0, 0));

    // Out of every window: a whiff, target stays live
    assert!(engine.judge(&InputEvent::player(NoteKind::Ka, 5.2), 0.0).is_none());
    assert_eq!(engine.live_count(), 1);
    assert_eq!(engine.stats().total(), 0);

    // Wrong instrument never matches
    assert!(engine.judge(&InputEvent::player(NoteKind::Don, 5.0), 0.0).is_none());

    let judged = engine.judge(&InputEvent::player(NoteKind::Ka, 5.05), 0.0).unwrap();
    assert_eq!(judged.judgment, Judgment::Late);

    engine.push(TargetNote::new(NoteKind::Ka, 6.0, 1));
    let judged = engine.judge(&InputEvent::player(NoteKind::Ka, 5.95), 0.0).unwrap();
    assert_eq!(judged.judgment, Judgment::Early);

    engine.push(TargetNote::new(NoteKind::Ka, 7.0, 2));
    let judged = engine.judge(&InputEvent::player(NoteKind::Ka, 7.09), 0.0).unwrap();
    assert_eq!(judged.judgment, Judgment::Bad);
}

#[test]
fn test_offset_shifts_inputs() {
    let mut engine = JudgmentEngine::new();
    engine.push(TargetNote::new(NoteKind::Don, 2.0, 0));

    // A press 50 ms late with a 50 ms offset lands on the note
    let judged = engine.judge(&InputEvent::player(NoteKind::Don, 2.05), 0.05).unwrap();
    assert_eq!(judged.judgment, Judgment::Good);
}

#[test]
fn test_miss_counted_once() {
    let mut engine = JudgmentEngine::new();
    engine.push(TargetNote::new(NoteKind::Don, 1.0, 0));
    engine.push(TargetNote::new(NoteKind::Ka, 1.05, 1));
    engine.judge(&InputEvent::player(NoteKind::Ka, 1.05), 0.0).unwrap();
    assert_eq!(engine.stats().combo, 1);

    assert_eq!(engine.sweep(1.2), 1);
    assert_eq!(engine.sweep(1.3), 0);
    assert_eq!(engine.stats().miss, 1);
    assert_eq!(engine.stats().combo, 0);
    assert_eq!(engine.live_count(), 0);
}

#[test]
fn test_unplayed_notes_are_missed() {
    let mut session = game_session(vec![1; PATTERN_LEN]);
    let mut log = SoundLog::new();
    session.apply(Command::ToggleTransport, 0.0).unwrap();

    let reports = run(&mut session, 0.0, 8.0, &mut log);
    let missed: u32 = reports.iter().map(|r| r.missed).sum();

    assert!(missed > 0);
    assert_eq!(session.stats().miss, missed);
    assert_eq!(session.stats().total(), missed);
    // Everything still live is not yet due
    assert!(session
        .live_targets()
        .all(|note| note.scheduled_time >= 8.0 - 0.108));
}

#[test]
fn test_demo_is_always_good() {
    let presets = PresetLibrary::builtin();
    let preset = presets.get(2).unwrap().clone();
    let mut session = Session::new(&Settings {
        game_mode: true,
        bpm: 160.0,
        ..Settings::default()
    });
    session.apply(Command::ApplyPreset(preset), 0.0).unwrap();

    let mut log = SoundLog::new();
    session.apply(Command::ToggleDemo, 0.0).unwrap();
    let reports = run(&mut session, 0.0, 10.0, &mut log);

    let judgments: Vec<Judgment> = reports
        .iter()
        .flat_map(|r| r.judged.iter().map(|j| j.judgment))
        .collect();
    assert!(!judgments.is_empty());
    assert!(judgments.iter().all(|j| *j == Judgment::Good));
    assert_eq!(session.stats().miss, 0);
    assert_eq!(session.stats().combo as usize, judgments.len());
}

#[test]
fn test_sub_beat_grid() {
    for bpm in [40.0, 100.0, 123.0, 400.0] {
        assert_eq!(sub_beat_interval(bpm), 15.0 / bpm);

        let mut transport = Transport::new(bpm);
        transport.start(0.0, 0.0);
        let period = 32.0 * transport.sub_beat_interval();
        for i in 0..200 {
            let now = i as f64 * 0.037;
            let index = transport.current_sub_beat_index(now);
            assert!(index < 32);
            // Compare away from step boundaries so rounding cannot flip the floor
            let phase = now / transport.sub_beat_interval();
            if phase - phase.floor() > 1e-6 && phase.ceil() - phase > 1e-6 {
                assert_eq!(transport.current_sub_beat_index(now + period), index);
            }
        }
    }
}

#[test]
fn test_pattern_editing() {
    let mut store = PatternStore::with_pattern(Pattern::from_raw(&[1, 2, 0, 1]));
    let original = *store.pattern();

    for index in 0..PATTERN_LEN {
        for _ in 0..3 {
            store.cycle(index).unwrap();
        }
    }
    assert_eq!(*store.pattern(), original);
    assert!(store.cycle(PATTERN_LEN).is_err());

    store.clear();
    assert!(store.pattern().is_empty());
    assert!(store.undo());
    assert_eq!(*store.pattern(), original);
    assert!(!store.undo());
    assert_eq!(*store.pattern(), original);
}

#[test]
fn test_auto_randomize_at_bar_line() {
    let mut session = Session::with_seed(
        &Settings {
            game_mode: true,
            auto_randomize: true,
            ..Settings::default()
        },
        7,
    );
    let mut log = SoundLog::new();
    session.apply(Command::ToggleTransport, 0.0).unwrap();

    // First bar at 100 BPM ends at 4.8 s
    run(&mut session, 0.0, 4.7, &mut log);
    assert!(session.pattern().is_empty());

    session.tick(4.85, &mut log);
    assert!(!session.pattern().is_empty());
}

#[test]
fn test_settings_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("taiko-trainer.toml");

    let mut session = game_session(vec![0; PATTERN_LEN]);
    session.apply(Command::SetBpm(140.0), 0.0).unwrap();
    session.apply(Command::AdjustOffset(0.01), 0.0).unwrap();
    session.apply(Command::CycleSlot(2), 0.0).unwrap();
    session.apply(Command::StepSpeed(1), 0.0).unwrap();
    session.to_settings().save(&path).unwrap();

    let restored = Session::new(&Settings::load(&path).unwrap());
    assert_eq!(restored.mode(), Mode::Game);
    assert_eq!(restored.transport().bpm(), 140.0);
    assert_eq!(restored.offset(), 0.01);
    assert_eq!(restored.pattern().step_at(2), Step::Don);
    assert_eq!(restored.scroll().speed_multiplier, 1.1);
    assert_eq!(restored.to_settings(), session.to_settings());
}

#[test]
fn test_corrupt_settings_fall_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "bpm = \"very fast\"\n").unwrap();

    let session = Session::new(&Settings::load_or_default(&path));
    assert_eq!(session.transport().bpm(), 100.0);
    assert_eq!(session.mode(), Mode::Visualizer);
}

#[test]
fn test_preset_file_applies_to_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("presets.yaml");
    let yaml = r#"
presets:
  - name: "Don Ka Ka"
    steps: [1, 0, 2, 2]
  - name: "Long"
    steps: [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2]
"#;
    fs::write(&path, yaml).unwrap();

    let library = PresetLibrary::load(&path).unwrap();
    assert_eq!(library.len(), 2);

    let mut session = Session::default();
    let preset = library.find("Don Ka Ka").unwrap().clone();
    session.apply(Command::ApplyPreset(preset), 0.0).unwrap();
    assert_eq!(session.pattern().step_at(0), Step::Don);
    assert_eq!(session.pattern().step_at(2), Step::Ka);
    assert_eq!(session.pattern().step_at(4), Step::None);

    let long = library.find("Long").unwrap().clone();
    session.apply(Command::ApplyPreset(long), 0.0).unwrap();
    assert_eq!(session.pattern().note_count(), 32);
    assert_eq!(session.pattern().step_at(31), Step::Don);

    session.apply(Command::UndoPattern, 0.0).unwrap();
    assert_eq!(session.pattern().step_at(3), Step::Ka);
}

#[test]
fn test_stop_discards_pending_input() {
    let mut session = game_session(vec![1; PATTERN_LEN]);
    session.apply(Command::ToggleTransport, 0.0).unwrap();
    run(&mut session, 0.0, 3.0, &mut SoundLog::new());
    assert!(session.live_targets().count() > 0);

    session.key_down(KeyEvent::new(LogicalAction::DonRight, 3.0), &mut NullSink);
    session.apply(Command::ToggleTransport, 3.0).unwrap();
    assert_eq!(session.live_targets().count(), 0);

    session.apply(Command::ToggleTransport, 4.0).unwrap();
    let report = session.tick(4.0, &mut NullSink);
    assert!(report.judged.is_empty());
    assert_eq!(session.stats().total(), 0);
}
