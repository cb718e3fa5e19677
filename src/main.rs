use std::fs::{self, OpenOptions};
use std::io;
use std::process;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use ascii_fx::{
    config::FxConfig,
    effects::EffectCatalog,
    player::{Player, Scene},
    presets::PresetBook,
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "ascii-fx play <scene.json>";
const SHOW_USAGE: &str = "ascii-fx show <file.txt> [preset]";
const EFFECTS_USAGE: &str = "ascii-fx effects";

/// Where log lines go. The player owns the terminal, so while it runs they
/// are appended to a file instead.
enum LogTarget {
    Stderr,
    File,
}

/// Set `RUST_LOG` to raise the level above `warn`.
fn init_tracing(target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let path = FxConfig::log_path();
            if let Some(dir) = path.parent() {
                let _ = fs::create_dir_all(dir);
            }
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => builder
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init(),
                // Without a log file, drop log lines rather than draw over the scene.
                Err(_) => builder.with_writer(io::sink).try_init(),
            }
        }
    };
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            init_tracing(LogTarget::File);
            play(&path)
        }
        Some("show") => {
            let path = args.next().context(SHOW_USAGE)?;
            let preset = args.next().unwrap_or_else(|| "decrypt".into());
            init_tracing(LogTarget::File);
            show(&path, preset)
        }
        Some("effects") => {
            init_tracing(LogTarget::Stderr);
            list_effects();
            Ok(())
        }
        _ => bail!(
            "ascii-fx: terminal text animation\n\nUsage:\n  {PLAY_USAGE}\n  {SHOW_USAGE}\n  {EFFECTS_USAGE}"
        ),
    }
}

fn play(path: &str) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let scene: Scene =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))?;

    let mut player = Player::new(&scene, FxConfig::load())?;
    player.play()
}

fn show(path: &str, preset: String) -> Result<()> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let config = FxConfig::load();
    if !PresetBook::with_builtins().contains(&preset) {
        bail!("Unknown preset `{preset}`, see `{EFFECTS_USAGE}`");
    }

    let scene = Scene::single(text.trim_end_matches('\n'), Some(preset));
    let mut player = Player::new(&scene, config)?;
    player.play()
}

fn list_effects() {
    println!("Effects:");
    for name in EffectCatalog::with_builtins().names() {
        println!("  {name}");
    }
    println!("Presets:");
    for name in PresetBook::with_builtins().names() {
        println!("  {name}");
    }
}
