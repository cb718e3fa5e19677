//! Named effect combinations.
//!
//! A preset turns one JSON config into an ordered list of effects built
//! through the catalog. Each preset has its own defaults; a nested object
//! per effect (for example `{"wave": {"amplitude": 5}}`) overrides them key
//! by key.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use crate::effects::{Effect, EffectCatalog};
use crate::error::{ConfigError, FxError};

pub type Preset = Box<dyn Fn(&Value, &EffectCatalog) -> Result<Vec<Box<dyn Effect>>, FxError>>;

pub struct PresetBook {
    presets: BTreeMap<String, Preset>,
}

impl Default for PresetBook {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl PresetBook {
    pub fn empty() -> Self {
        Self {
            presets: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut book = Self::empty();
        book.register("decrypt", decrypt);
        book.register("rainbow", rainbow);
        book.register("matrix", matrix);
        book.register("terminal", terminal);
        book
    }

    pub fn register<F>(&mut self, name: impl Into<String>, preset: F)
    where
        F: Fn(&Value, &EffectCatalog) -> Result<Vec<Box<dyn Effect>>, FxError> + 'static,
    {
        self.presets.insert(name.into(), Box::new(preset));
    }

    /// Build the effects of preset `name`.
    pub fn build(
        &self,
        name: &str,
        config: &Value,
        catalog: &EffectCatalog,
    ) -> Result<Vec<Box<dyn Effect>>, FxError> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))?;
        let effects = preset(config, catalog)?;
        tracing::debug!(preset = name, effects = effects.len(), "Built preset");
        Ok(effects)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.presets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }
}

/// `defaults` with the keys of `config[key]` laid over it.
fn layered(defaults: Value, config: &Value, key: &str) -> Value {
    let mut merged = match defaults {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Some(Value::Object(overrides)) = config.get(key) {
        for (k, v) in overrides {
            merged.insert(k.clone(), v.clone());
        }
    }
    Value::Object(merged)
}

fn decrypt(config: &Value, catalog: &EffectCatalog) -> Result<Vec<Box<dyn Effect>>, FxError> {
    let duration = config
        .get("duration")
        .and_then(Value::as_f64)
        .filter(|d| *d > 0.0)
        .unwrap_or(2000.0);

    Ok(vec![
        catalog.create(
            "scramble",
            &layered(
                json!({ "duration": duration * 0.4, "reveal_mode": "progressive" }),
                config,
                "scramble",
            ),
        )?,
        catalog.create(
            "reveal",
            &layered(json!({ "duration": duration * 0.6 }), config, "reveal"),
        )?,
    ])
}

fn rainbow(config: &Value, catalog: &EffectCatalog) -> Result<Vec<Box<dyn Effect>>, FxError> {
    Ok(vec![
        catalog.create(
            "wave",
            &layered(
                json!({ "amplitude": 3.0, "frequency": 0.3, "speed": 0.002 }),
                config,
                "wave",
            ),
        )?,
        catalog.create(
            "color_cycle",
            &layered(
                json!({ "speed": 0.002, "spread": 5.0, "saturation": 80.0, "lightness": 60.0 }),
                config,
                "color",
            ),
        )?,
    ])
}

fn matrix(config: &Value, catalog: &EffectCatalog) -> Result<Vec<Box<dyn Effect>>, FxError> {
    Ok(vec![
        catalog.create("matrix_rain", &layered(json!({ "speed": 0.1 }), config, "matrix"))?,
        catalog.create("scanlines", &layered(json!({}), config, "scanlines"))?,
    ])
}

fn terminal(config: &Value, catalog: &EffectCatalog) -> Result<Vec<Box<dyn Effect>>, FxError> {
    Ok(vec![
        catalog.create(
            "typewriter",
            &layered(json!({ "speed": 50.0, "show_cursor": true }), config, "typewriter"),
        )?,
        catalog.create(
            "scanlines",
            &layered(json!({ "line_height": 2 }), config, "scanlines"),
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(effects: &[Box<dyn Effect>]) -> Vec<&str> {
        effects.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn builtins() {
        let book = PresetBook::with_builtins();
        let catalog = EffectCatalog::with_builtins();
        assert_eq!(
            book.names().collect::<Vec<_>>(),
            ["decrypt", "matrix", "rainbow", "terminal"]
        );

        let rainbow = book.build("rainbow", &Value::Null, &catalog).unwrap();
        assert_eq!(names(&rainbow), ["wave", "color_cycle"]);
        let terminal = book.build("terminal", &json!({}), &catalog).unwrap();
        assert_eq!(names(&terminal), ["typewriter", "scanlines"]);
    }

    #[test]
    fn decrypt_splits_duration() {
        let book = PresetBook::with_builtins();
        let catalog = EffectCatalog::with_builtins();

        let effects = book.build("decrypt", &Value::Null, &catalog).unwrap();
        assert_eq!(names(&effects), ["scramble", "reveal"]);
        assert_eq!(effects[0].duration(), 800.0);
        assert_eq!(effects[1].duration(), 1200.0);

        let effects = book
            .build(
                "decrypt",
                &json!({ "duration": 1000, "reveal": { "duration": 50 } }),
                &catalog,
            )
            .unwrap();
        assert_eq!(effects[0].duration(), 400.0);
        assert_eq!(effects[1].duration(), 50.0);
    }

    #[test]
    fn unknown_preset() {
        let book = PresetBook::with_builtins();
        let catalog = EffectCatalog::with_builtins();
        let err = book.build("hologram", &Value::Null, &catalog).err().unwrap();
        assert!(matches!(err, FxError::Config(ConfigError::UnknownPreset(ref n)) if n == "hologram"));
        assert_eq!(err.to_string(), "preset not found: hologram");
    }

    #[test]
    fn bad_override_is_reported() {
        let book = PresetBook::with_builtins();
        let catalog = EffectCatalog::with_builtins();
        let err = book
            .build("rainbow", &json!({ "wave": { "amplitude": "big" } }), &catalog)
            .err()
            .unwrap();
        assert!(matches!(err, FxError::Config(ConfigError::InvalidEffectConfig { .. })));
    }
}
