use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::render::{CanvasGridConfig, TextBlockConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    /// Start the engine as soon as an `AsciiFx` is built.
    pub auto_start: bool,
    /// Tick-rate cap; `None` ticks on every host frame.
    pub target_fps: Option<u32>,
    /// Defaults for `create_text`/`create_art`.
    pub text: TextBlockConfig,
    /// Defaults for `create_background`.
    pub grid: CanvasGridConfig,
    pub keys: KeyBindings,
}

impl Default for FxConfig {
    fn default() -> Self {
        FxConfig {
            auto_start: true,
            target_fps: None,
            text: TextBlockConfig::default(),
            grid: CanvasGridConfig::default(),
            keys: KeyBindings::default(),
        }
    }
}

/// Player key bindings, written as `"q"`, `"Esc"`, `"Ctrl-c"`, `"Space"`...
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: String,
    pub cancel: String,
    pub pause: String,
    pub restart: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            quit: "q".into(),
            cancel: "Esc".into(),
            pause: "Space".into(),
            restart: "r".into(),
        }
    }
}

impl FxConfig {
    /// Load `~/.config/ascii-fx/config.json`, falling back to defaults when
    /// the file is missing or invalid.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "Loaded config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn config_path() -> PathBuf {
        config_dir().join("config.json")
    }

    /// Where the player writes its logs: `$ASCII_FX_LOG`, or `ascii-fx.log`
    /// next to the config file.
    pub fn log_path() -> PathBuf {
        match std::env::var_os("ASCII_FX_LOG") {
            Some(path) => PathBuf::from(path),
            None => config_dir().join("ascii-fx.log"),
        }
    }
}

fn config_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
    let mut path = PathBuf::from(home);
    path.push(".config");
    path.push("ascii-fx");
    path
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(rest) = binding.strip_prefix("Ctrl-") {
        return event.modifiers.contains(KeyModifiers::CONTROL)
            && rest.chars().next().is_some_and(|c| event.code == KeyCode::Char(c));
    }

    // Plain bindings never fire with Ctrl or Alt held.
    if event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }

    match binding {
        "Esc" => event.code == KeyCode::Esc,
        "Enter" => event.code == KeyCode::Enter,
        "Space" => event.code == KeyCode::Char(' '),
        "Tab" => event.code == KeyCode::Tab,
        s => s.chars().next().is_some_and(|c| event.code == KeyCode::Char(c)),
    }
}
