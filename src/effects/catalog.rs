//! Name → factory table for effects.
//!
//! Populated with the built-in effects at construction; hosts may register
//! their own. Factories take a JSON config object so effects can be built
//! from config files and scene descriptions.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ConfigError, FxError};

use super::{
    ColorCycle, ColorCycleConfig, ColorGradient, ColorGradientConfig, Effect, Glitch,
    GlitchConfig, MatrixRain, MatrixRainConfig, Reveal, RevealConfig, Scanlines, ScanlinesConfig,
    Scramble, ScrambleConfig, Typewriter, TypewriterConfig, Wave, WaveConfig,
};

pub type EffectFactory = Box<dyn Fn(&Value) -> Result<Box<dyn Effect>, FxError>>;

pub struct EffectCatalog {
    factories: BTreeMap<String, EffectFactory>,
}

impl Default for EffectCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl EffectCatalog {
    /// A catalog with no entries.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut catalog = Self::empty();
        catalog.register_config("typewriter", Typewriter::new as fn(TypewriterConfig) -> Typewriter);
        catalog.register_config("reveal", Reveal::new as fn(RevealConfig) -> Reveal);
        catalog.register_config("scramble", Scramble::new as fn(ScrambleConfig) -> Scramble);
        catalog.register_config("glitch", Glitch::new as fn(GlitchConfig) -> Glitch);
        catalog.register_config("wave", Wave::new as fn(WaveConfig) -> Wave);
        catalog.register_config("color_cycle", ColorCycle::new as fn(ColorCycleConfig) -> ColorCycle);
        catalog.register_config(
            "color_gradient",
            ColorGradient::new as fn(ColorGradientConfig) -> ColorGradient,
        );
        catalog.register_config("matrix_rain", MatrixRain::new as fn(MatrixRainConfig) -> MatrixRain);
        catalog.register_config("scanlines", Scanlines::new as fn(ScanlinesConfig) -> Scanlines);
        catalog
    }

    /// Register (or replace) a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Value) -> Result<Box<dyn Effect>, FxError> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Register an effect built from a serde config struct. A missing
    /// (`null`) config means the config's defaults.
    pub fn register_config<C, E>(&mut self, name: &str, build: fn(C) -> E)
    where
        C: DeserializeOwned + Default + 'static,
        E: Effect + 'static,
    {
        let effect_name = name.to_string();
        self.register(name, move |config: &Value| {
            let config: C = parse_config(&effect_name, config)?;
            Ok(Box::new(build(config)) as Box<dyn Effect>)
        });
    }

    pub fn create(&self, name: &str, config: &Value) -> Result<Box<dyn Effect>, FxError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEffect(name.to_string()))?;
        let effect = factory(config)?;
        tracing::debug!(effect = name, "Built effect");
        Ok(effect)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

fn parse_config<C>(name: &str, config: &Value) -> Result<C, FxError>
where
    C: DeserializeOwned + Default,
{
    if config.is_null() {
        return Ok(C::default());
    }
    serde_json::from_value(config.clone()).map_err(|source| {
        ConfigError::InvalidEffectConfig {
            name: name.to_string(),
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::effects::{EffectContext, EffectOutput, from_fn};
    use crate::surface::BufferSurface;
    use crate::types::{Color, Extent};

    #[test]
    fn builtins_are_registered() {
        let catalog = EffectCatalog::with_builtins();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(
            names,
            [
                "color_cycle",
                "color_gradient",
                "glitch",
                "matrix_rain",
                "reveal",
                "scanlines",
                "scramble",
                "typewriter",
                "wave"
            ]
        );
    }

    #[test]
    fn builds_with_defaults_and_overrides() {
        let catalog = EffectCatalog::with_builtins();
        let reveal = catalog.create("reveal", &Value::Null).unwrap();
        assert_eq!(reveal.name(), "reveal");
        assert_eq!(reveal.duration(), 1000.0);

        let reveal = catalog.create("reveal", &json!({ "duration": 250 })).unwrap();
        assert_eq!(reveal.duration(), 250.0);
    }

    #[test]
    fn gradient_from_json() {
        let catalog = EffectCatalog::with_builtins();
        let mut gradient = catalog
            .create(
                "color_gradient",
                &json!({ "base_color": "green", "mode": "hue_shift", "speed": 0 }),
            )
            .unwrap();
        let mut surface = BufferSurface::new(Extent::new(2, 1));
        let mut ctx = EffectContext {
            original: "ok",
            surface: &mut surface,
        };
        let EffectOutput::Rich(rich) = gradient.render("ok", 0.0, &mut ctx).unwrap() else {
            panic!("color gradient must produce a rich result");
        };
        // The first glyph sits 30 degrees below the base hue.
        assert_eq!(rich.styled.lines[0][0].style.fg, Some(Color::from_hsl(90.0, 100.0, 50.0)));
    }

    #[test]
    fn unknown_name_is_a_config_error() {
        let catalog = EffectCatalog::with_builtins();
        let err = catalog.create("sparkle", &Value::Null).err().unwrap();
        assert!(matches!(err, FxError::Config(ConfigError::UnknownEffect(ref n)) if n == "sparkle"));
    }

    #[test]
    fn bad_config_is_a_config_error() {
        let catalog = EffectCatalog::with_builtins();
        let err = catalog
            .create("wave", &json!({ "amplitude": "tall" }))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            FxError::Config(ConfigError::InvalidEffectConfig { ref name, .. }) if name == "wave"
        ));
    }

    #[test]
    fn custom_factories() {
        let mut catalog = EffectCatalog::empty();
        catalog.register("shout", |_config: &Value| {
            Ok(Box::new(from_fn("shout", |text: &str, _elapsed: f64, _ctx: &mut EffectContext<'_>| {
                EffectOutput::Plain(text.to_uppercase())
            })) as Box<dyn Effect>)
        });

        let mut effect = catalog.create("shout", &Value::Null).unwrap();
        let mut surface = BufferSurface::new(Extent::new(3, 1));
        let mut ctx = EffectContext {
            original: "hey",
            surface: &mut surface,
        };
        let out = effect.render("hey", 0.0, &mut ctx).unwrap();
        assert_eq!(out.text(), "HEY");
    }
}
