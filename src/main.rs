// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use taiko_trainer::audio::{AudioSink, Sound};
use taiko_trainer::config::{PresetWatcher, Settings};
use taiko_trainer::control::{Command, KeyboardController};
use taiko_trainer::pattern::PresetLibrary;
use taiko_trainer::timing::{DEFAULT_BPM, STEPS_PER_BAR};
use taiko_trainer::ui::App;
use taiko_trainer::Session;

const DEFAULT_CONFIG: &str = "taiko-trainer.toml";

fn print_usage() {
    println!("Taiko Trainer - DON/KA rhythm pattern trainer");
    println!();
    println!("Usage: taiko-trainer [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>       Settings file (default {})", DEFAULT_CONFIG);
    println!("  --presets <PATH>      Preset library YAML, reloaded when it changes");
    println!("  --log <PATH>          Write a debug log to PATH");
    println!("  --test-demo [BPM]     Play two bars of the demo without the UI (default 100)");
    println!("  --help                Show this help message");
}

/// Command line options
struct Options {
    config: PathBuf,
    presets: Option<PathBuf>,
    log: Option<PathBuf>,
    test_demo: Option<f64>,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        config: PathBuf::from(DEFAULT_CONFIG),
        presets: None,
        log: None,
        test_demo: None,
    };

    let mut iter = args.iter().skip(1).peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| anyhow!("--config requires a path"))?;
                options.config = PathBuf::from(path);
            }
            "--presets" => {
                let path = iter.next().ok_or_else(|| anyhow!("--presets requires a path"))?;
                options.presets = Some(PathBuf::from(path));
            }
            "--log" => {
                let path = iter.next().ok_or_else(|| anyhow!("--log requires a path"))?;
                options.log = Some(PathBuf::from(path));
            }
            "--test-demo" => {
                let bpm = match iter.next_if(|value| !value.starts_with("--")) {
                    Some(value) => value.parse::<f64>().map_err(|_| anyhow!("Invalid BPM: {}", value))?,
                    None => DEFAULT_BPM,
                };
                options.test_demo = Some(bpm);
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }

    Ok(options)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create log file: {:?}", path))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    Ok(())
}

fn load_presets(path: Option<&Path>) -> PresetLibrary {
    match path {
        Some(path) => PresetLibrary::load(path).unwrap_or_else(|err| {
            warn!("{:#}, using built-in presets", err);
            PresetLibrary::builtin()
        }),
        None => PresetLibrary::builtin(),
    }
}

/// Prints metronome beats; drum sounds are reported through judgments
#[derive(Default)]
struct ConsoleSink {
    beats: u64,
}

impl AudioSink for ConsoleSink {
    fn play(&mut self, sound: Sound, _volume: f32) {
        if sound == Sound::MetronomeTick {
            self.beats += 1;
            println!("Beat {}", self.beats);
        }
    }
}

fn run_test_demo(settings: Settings, presets: &PresetLibrary, bpm: f64) -> Result<()> {
    let mut session = Session::new(&Settings {
        game_mode: true,
        ..settings
    });
    let epoch = Instant::now();
    let now = || epoch.elapsed().as_secs_f64();

    session.apply(Command::SetBpm(bpm), now())?;
    if session.pattern().is_empty() {
        if let Some(preset) = presets.get(0) {
            println!("Pattern is empty, using preset '{}'", preset.name);
            session.apply(Command::ApplyPreset(preset.clone()), now())?;
        }
    }

    let expected = session.pattern().note_count() as u32 * 2;
    let bar = STEPS_PER_BAR as f64 * session.transport().sub_beat_interval();
    let deadline = 2.0 * bar + 10.0;

    println!("Playing two bars at {} BPM ({} notes)...", bpm, expected);
    let mut sink = ConsoleSink::default();
    session.apply(Command::ToggleDemo, now())?;

    while session.stats().total() < expected && now() < deadline {
        let report = session.tick(now(), &mut sink);
        for hit in &report.auto_hits {
            match hit.judged {
                Some(judged) => println!(
                    "  {:<3} step {:>3}  {:<5} {:+.1}ms",
                    hit.kind.to_string(),
                    judged.step,
                    judged.judgment.to_string(),
                    judged.diff * 1000.0
                ),
                None => println!("  {:<3} whiffed", hit.kind.to_string()),
            }
        }
        if report.missed > 0 {
            println!("  MISS x{}", report.missed);
        }
        thread::sleep(Duration::from_millis(1));
    }

    session.apply(Command::ToggleDemo, now())?;

    let stats = session.stats();
    println!();
    println!(
        "GOOD {}  EARLY {}  LATE {}  BAD {}  MISS {}  max combo {}",
        stats.good, stats.early, stats.late, stats.bad, stats.miss, stats.max_combo
    );
    Ok(())
}

fn run_tui(options: &Options, settings: Settings, presets: PresetLibrary) -> Result<()> {
    let keyboard = KeyboardController::with_drums(settings.bindings.to_drums());
    let session = Session::new(&settings);

    let mut app = App::new(session, keyboard, presets)?;
    if let Some(path) = &options.presets {
        match PresetWatcher::new(path, None) {
            Ok(watcher) => app = app.with_watcher(watcher),
            Err(err) => warn!("{:#}, preset hot reload disabled", err),
        }
    }

    let result = app.run();
    let settings = app.state().settings();
    // Restore the terminal before anything else is printed
    drop(app);

    settings.save(&options.config)?;
    info!(path = ?options.config, "settings saved");
    result.context("Terminal UI failed")
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args)?;

    if let Some(path) = &options.log {
        init_logging(path)?;
    }

    let settings = Settings::load_or_default(&options.config);
    let presets = load_presets(options.presets.as_deref());

    match options.test_demo {
        Some(bpm) => run_test_demo(settings, &presets, bpm),
        None => run_tui(&options, settings, presets),
    }
}
