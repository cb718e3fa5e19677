//! The orchestration layer.
//!
//! [`AsciiFx`] owns the engine, the registry and the named surfaces. It
//! creates instances, keeps the registry (strong references) and the engine
//! (weak references) in step, and hands out fluent handles for configuring
//! the instances it created.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::config::FxConfig;
use crate::core::{Clock, Engine, MonotonicClock, Registry, TickReport};
use crate::effects::{
    ColorCycle, ColorCycleConfig, ColorGradient, ColorGradientConfig, Effect, EffectCatalog,
    Glitch, GlitchConfig, MatrixRain, MatrixRainConfig, Reveal, RevealConfig, Scanlines,
    ScanlinesConfig, Scramble, ScrambleConfig, Typewriter, TypewriterConfig, Wave, WaveConfig,
};
use crate::error::{ConfigError, FxError};
use crate::presets::PresetBook;
use crate::render::{
    Animated, CanvasGrid, CanvasGridConfig, EventKind, InstanceHandle, LifecycleEvent, Noise,
    NoiseConfig, Status, TextBlock, TextBlockConfig,
};
use crate::surface::{SharedSurface, Surface};

/// Where a new instance draws: a surface attached under a name, or a
/// surface handed over directly.
pub enum Target {
    Named(String),
    Surface(SharedSurface),
}

impl Target {
    pub fn surface(surface: SharedSurface) -> Self {
        Target::Surface(surface)
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Named(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Named(name)
    }
}

impl<S: Surface + 'static> From<Rc<RefCell<S>>> for Target {
    fn from(surface: Rc<RefCell<S>>) -> Self {
        Target::Surface(surface)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EffectOptions {
    /// Clear the chain before adding the effect.
    pub replace: bool,
}

impl Default for EffectOptions {
    fn default() -> Self {
        Self { replace: true }
    }
}

impl EffectOptions {
    pub const APPEND: EffectOptions = EffectOptions { replace: false };
}

pub struct AsciiFx {
    engine: Engine,
    registry: Registry<InstanceHandle>,
    surfaces: HashMap<String, SharedSurface>,
    catalog: Rc<RefCell<EffectCatalog>>,
    presets: Rc<RefCell<PresetBook>>,
    config: FxConfig,
}

impl Default for AsciiFx {
    fn default() -> Self {
        Self::new(FxConfig::default())
    }
}

impl AsciiFx {
    pub fn new(config: FxConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    pub fn with_clock(config: FxConfig, clock: impl Clock + 'static) -> Self {
        let mut engine = Engine::with_clock(clock);
        engine.set_target_fps(config.target_fps);
        if config.auto_start {
            engine.start();
        }
        Self {
            engine,
            registry: Registry::new(),
            surfaces: HashMap::new(),
            catalog: Rc::new(RefCell::new(EffectCatalog::with_builtins())),
            presets: Rc::new(RefCell::new(PresetBook::with_builtins())),
            config,
        }
    }

    pub fn config(&self) -> &FxConfig {
        &self.config
    }

    /// Make `surface` resolvable by `name` in the `create_*` calls.
    pub fn attach_surface<S: Surface + 'static>(&mut self, name: impl Into<String>, surface: Rc<RefCell<S>>) {
        self.surfaces.insert(name.into(), surface);
    }

    pub fn surface(&self, name: &str) -> Option<SharedSurface> {
        self.surfaces.get(name).cloned()
    }

    pub fn catalog(&self) -> Rc<RefCell<EffectCatalog>> {
        Rc::clone(&self.catalog)
    }

    pub fn presets(&self) -> Rc<RefCell<PresetBook>> {
        Rc::clone(&self.presets)
    }

    fn resolve(&self, target: Target) -> Result<SharedSurface, FxError> {
        match target {
            Target::Surface(surface) => Ok(surface),
            Target::Named(name) => self
                .surfaces
                .get(&name)
                .cloned()
                .ok_or_else(|| ConfigError::SurfaceNotFound(name).into()),
        }
    }

    fn track(&mut self, id: &str, instance: InstanceHandle) {
        self.engine.register(id, &instance);
        self.registry.add(id, instance);
    }

    /// A text block over `target`, configured from `FxConfig::text`.
    pub fn create_text(&mut self, target: impl Into<Target>) -> Result<TextBlockApi, FxError> {
        let config = self.config.text.clone();
        self.create_text_with(target, config)
    }

    pub fn create_text_with(
        &mut self,
        target: impl Into<Target>,
        config: TextBlockConfig,
    ) -> Result<TextBlockApi, FxError> {
        let surface = self.resolve(target.into())?;
        let id = self.registry.create_id("text");
        let block = Rc::new(RefCell::new(TextBlock::new(id.clone(), surface, config)?));
        self.track(&id, block.clone());
        Ok(TextBlockApi {
            block,
            catalog: self.catalog(),
            presets: self.presets(),
        })
    }

    /// Same as [`create_text`](Self::create_text).
    pub fn create_art(&mut self, target: impl Into<Target>) -> Result<TextBlockApi, FxError> {
        self.create_text(target)
    }

    pub fn create_art_with(
        &mut self,
        target: impl Into<Target>,
        config: TextBlockConfig,
    ) -> Result<TextBlockApi, FxError> {
        self.create_text_with(target, config)
    }

    /// A procedural grid over `target`, configured from `FxConfig::grid`.
    pub fn create_background(&mut self, target: impl Into<Target>) -> Result<CanvasGridApi, FxError> {
        let config = self.config.grid.clone();
        self.create_background_with(target, config)
    }

    pub fn create_background_with(
        &mut self,
        target: impl Into<Target>,
        config: CanvasGridConfig,
    ) -> Result<CanvasGridApi, FxError> {
        let surface = self.resolve(target.into())?;
        let id = self.registry.create_id("grid");
        let grid = Rc::new(RefCell::new(CanvasGrid::new(id.clone(), surface, config)?));
        self.track(&id, grid.clone());
        Ok(CanvasGridApi {
            grid,
            catalog: self.catalog(),
        })
    }

    /// Unregister `id` from the engine and the registry, then stop it and
    /// tear down its effects. Returns false for unknown ids.
    pub fn destroy(&mut self, id: &str) -> bool {
        self.engine.unregister(id);
        let Some(instance) = self.registry.remove(id) else {
            return false;
        };
        instance.borrow_mut().destroy();
        tracing::debug!(instance = id, "Instance destroyed");
        true
    }

    /// Destroy every instance.
    pub fn destroy_all(&mut self) {
        let ids: Vec<String> = self.registry.ids().map(str::to_string).collect();
        for id in ids {
            self.destroy(&id);
        }
    }

    pub fn get_instance(&self, id: &str) -> Option<InstanceHandle> {
        self.registry.get(id).cloned()
    }

    /// A copy of the id → instance table.
    pub fn instances(&self) -> HashMap<String, InstanceHandle> {
        self.registry.get_all()
    }

    pub fn start(&mut self) -> &mut Self {
        self.engine.start();
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.engine.stop();
        self
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn instance_count(&self) -> usize {
        self.engine.instance_count()
    }

    /// Run one engine frame. See [`Engine::frame`].
    pub fn frame(&mut self) -> Option<TickReport> {
        self.engine.frame()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }
}

impl std::fmt::Debug for AsciiFx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsciiFx")
            .field("engine", &self.engine)
            .field("instances", &self.registry.len())
            .field("surfaces", &self.surfaces.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fluent handle to a text block.
///
/// Handles share the block with the registry. Calling into a handle from
/// inside that block's own event callbacks panics on the re-borrow.
#[derive(Clone)]
pub struct TextBlockApi {
    block: Rc<RefCell<TextBlock>>,
    catalog: Rc<RefCell<EffectCatalog>>,
    presets: Rc<RefCell<PresetBook>>,
}

impl TextBlockApi {
    pub fn use_effect(&self, effect: impl Effect + 'static, options: EffectOptions) -> &Self {
        self.block.borrow_mut().use_effect(Box::new(effect), options.replace);
        self
    }

    /// Append the catalog effect `name` built from `config`.
    pub fn effect(&self, name: &str, config: &Value) -> Result<&Self, FxError> {
        let effect = self.catalog.borrow().create(name, config)?;
        self.block.borrow_mut().use_effect(effect, false);
        Ok(self)
    }

    /// Apply preset `name`: its first effect replaces the chain, the rest
    /// are appended.
    pub fn preset(&self, name: &str, config: &Value) -> Result<&Self, FxError> {
        let effects = self
            .presets
            .borrow()
            .build(name, config, &self.catalog.borrow())?;
        let mut block = self.block.borrow_mut();
        for (i, effect) in effects.into_iter().enumerate() {
            block.use_effect(effect, i == 0);
        }
        Ok(self)
    }

    pub fn wave(&self, config: WaveConfig) -> &Self {
        self.use_effect(Wave::new(config), EffectOptions::APPEND)
    }

    pub fn color_cycle(&self, config: ColorCycleConfig) -> &Self {
        self.use_effect(ColorCycle::new(config), EffectOptions::APPEND)
    }

    pub fn color_gradient(&self, config: ColorGradientConfig) -> &Self {
        self.use_effect(ColorGradient::new(config), EffectOptions::APPEND)
    }

    pub fn scramble(&self, config: ScrambleConfig) -> &Self {
        self.use_effect(Scramble::new(config), EffectOptions::APPEND)
    }

    pub fn reveal(&self, config: RevealConfig) -> &Self {
        self.use_effect(Reveal::new(config), EffectOptions::APPEND)
    }

    pub fn glitch(&self, config: GlitchConfig) -> &Self {
        self.use_effect(Glitch::new(config), EffectOptions::APPEND)
    }

    pub fn typewriter(&self, config: TypewriterConfig) -> &Self {
        self.use_effect(Typewriter::new(config), EffectOptions::APPEND)
    }

    pub fn matrix(&self, config: MatrixRainConfig) -> &Self {
        self.use_effect(MatrixRain::new(config), EffectOptions::APPEND)
    }

    pub fn scanlines(&self, config: ScanlinesConfig) -> &Self {
        self.use_effect(Scanlines::new(config), EffectOptions::APPEND)
    }

    pub fn clear_effects(&self) -> &Self {
        self.block.borrow_mut().clear_effects();
        self
    }

    pub fn reset(&self) -> &Self {
        self.block.borrow_mut().reset();
        self
    }

    pub fn play(&self) -> &Self {
        self.block.borrow_mut().play();
        self
    }

    pub fn pause(&self) -> &Self {
        self.block.borrow_mut().pause();
        self
    }

    pub fn stop(&self) -> &Self {
        self.block.borrow_mut().stop();
        self
    }

    pub fn on<F>(&self, kind: EventKind, callback: F) -> &Self
    where
        F: FnMut(&LifecycleEvent<'_>) + 'static,
    {
        self.block.borrow_mut().base_mut().on(kind, callback);
        self
    }

    pub fn set_text(&self, text: &str) -> Result<&Self, FxError> {
        self.block.borrow_mut().set_text(text)?;
        Ok(self)
    }

    /// Stop the block and remove it from `fx`.
    pub fn destroy(self, fx: &mut AsciiFx) -> bool {
        let id = self.id();
        fx.destroy(&id)
    }

    pub fn id(&self) -> String {
        self.block.borrow().id().to_string()
    }

    pub fn status(&self) -> Status {
        self.block.borrow().status()
    }

    /// The payload produced by the last frame.
    pub fn text(&self) -> String {
        self.block.borrow().text().to_string()
    }

    pub fn instance(&self) -> Rc<RefCell<TextBlock>> {
        Rc::clone(&self.block)
    }
}

/// Fluent handle to a procedural background.
#[derive(Clone)]
pub struct CanvasGridApi {
    grid: Rc<RefCell<CanvasGrid>>,
    catalog: Rc<RefCell<EffectCatalog>>,
}

impl CanvasGridApi {
    pub fn set_generator<F>(&self, generator: F) -> &Self
    where
        F: FnMut(usize, usize, f64) -> f64 + 'static,
    {
        self.grid.borrow_mut().set_generator(generator);
        self
    }

    /// Drive the grid with value noise.
    pub fn noise(&self, config: NoiseConfig) -> &Self {
        self.set_generator(Noise::new(config).into_generator())
    }

    pub fn set_charset(&self, charset: &str) -> Result<&Self, FxError> {
        self.grid.borrow_mut().set_charset(charset)?;
        Ok(self)
    }

    pub fn use_effect(&self, effect: impl Effect + 'static, options: EffectOptions) -> &Self {
        let mut grid = self.grid.borrow_mut();
        if options.replace {
            grid.clear_effects();
        }
        grid.base_mut().effects_mut().push(Box::new(effect));
        self
    }

    /// Append the catalog effect `name` built from `config`.
    pub fn effect(&self, name: &str, config: &Value) -> Result<&Self, FxError> {
        let effect = self.catalog.borrow().create(name, config)?;
        self.grid.borrow_mut().base_mut().effects_mut().push(effect);
        Ok(self)
    }

    pub fn clear_effects(&self) -> &Self {
        self.grid.borrow_mut().clear_effects();
        self
    }

    pub fn play(&self) -> &Self {
        self.grid.borrow_mut().play();
        self
    }

    pub fn pause(&self) -> &Self {
        self.grid.borrow_mut().pause();
        self
    }

    pub fn stop(&self) -> &Self {
        self.grid.borrow_mut().stop();
        self
    }

    pub fn on<F>(&self, kind: EventKind, callback: F) -> &Self
    where
        F: FnMut(&LifecycleEvent<'_>) + 'static,
    {
        self.grid.borrow_mut().base_mut().on(kind, callback);
        self
    }

    /// Stop the grid and remove it from `fx`.
    pub fn destroy(self, fx: &mut AsciiFx) -> bool {
        let id = self.id();
        fx.destroy(&id)
    }

    pub fn id(&self) -> String {
        self.grid.borrow().id().to_string()
    }

    pub fn status(&self) -> Status {
        self.grid.borrow().status()
    }

    pub fn instance(&self) -> Rc<RefCell<CanvasGrid>> {
        Rc::clone(&self.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::core::ManualClock;
    use crate::surface::{BufferSurface, Content};
    use crate::types::Extent;

    fn fx() -> (AsciiFx, ManualClock) {
        let clock = ManualClock::new(0.0);
        (AsciiFx::with_clock(FxConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn auto_start_follows_config() {
        let (fx, _) = fx();
        assert!(fx.is_running());
        let idle = AsciiFx::with_clock(
            FxConfig {
                auto_start: false,
                ..FxConfig::default()
            },
            ManualClock::new(0.0),
        );
        assert!(!idle.is_running());
    }

    #[test]
    fn named_targets_resolve_like_selectors() {
        let (mut fx, _) = fx();
        let err = fx.create_text("#missing").err().unwrap();
        assert!(matches!(err, FxError::Config(ConfigError::SurfaceNotFound(ref n)) if n == "#missing"));

        fx.attach_surface("#title", Rc::new(RefCell::new(BufferSurface::with_text("hi"))));
        let title = fx.create_text("#title").unwrap();
        assert_eq!(title.id(), "text-1");
        let grid = fx
            .create_background(Rc::new(RefCell::new(BufferSurface::new(Extent::new(4, 2)))))
            .unwrap();
        assert_eq!(grid.id(), "grid-2");
        assert_eq!(fx.instance_count(), 2);
    }

    #[test]
    fn text_block_runs_through_the_engine() {
        let (mut fx, clock) = fx();
        let surface = Rc::new(RefCell::new(BufferSurface::with_text("hello")));
        let text = fx.create_text(surface.clone()).unwrap();
        text.effect("reveal", &json!({ "duration": 100, "easing": "linear" }))
            .unwrap()
            .play();

        clock.set(10.0);
        fx.frame().unwrap();
        assert_eq!(text.text(), "█████");
        clock.set(110.0);
        fx.frame().unwrap();
        assert_eq!(text.text(), "hello");
        assert_eq!(surface.borrow().content(), &Content::Text("hello".into()));
    }

    #[test]
    fn color_gradient_styles_the_surface() {
        let (mut fx, clock) = fx();
        let surface = Rc::new(RefCell::new(BufferSurface::with_text("azure")));
        let text = fx.create_text(surface.clone()).unwrap();
        text.color_gradient(ColorGradientConfig::default()).play();

        clock.set(16.0);
        fx.frame().unwrap();
        assert_eq!(text.instance().borrow().base().effects().names(), ["color_gradient"]);
        assert_eq!(text.text(), "azure");
        assert!(surface.borrow().is_styled());
    }

    #[test]
    fn noise_background_fills_the_surface() {
        let (mut fx, clock) = fx();
        let surface = Rc::new(RefCell::new(BufferSurface::new(Extent::new(6, 3))));
        let grid = fx.create_background(surface.clone()).unwrap();
        grid.noise(NoiseConfig::default()).play();

        clock.set(16.0);
        fx.frame().unwrap();
        let Content::Glyphs { lines, extent } = surface.borrow().content().clone() else {
            panic!("expected a glyph draw");
        };
        assert_eq!(extent, Extent::new(6, 3));
        assert_eq!(lines, grid.instance().borrow().frame().split('\n').collect::<Vec<_>>());
    }

    #[test]
    fn presets_replace_then_append() {
        let (mut fx, _) = fx();
        let text = fx
            .create_text(Rc::new(RefCell::new(BufferSurface::with_text("x"))))
            .unwrap();
        text.wave(WaveConfig::default());
        text.preset("decrypt", &Value::Null).unwrap();
        assert_eq!(
            text.instance().borrow().base().effects().names(),
            ["scramble", "reveal"]
        );

        let err = text.preset("nope", &Value::Null).err().unwrap();
        assert!(matches!(err, FxError::Config(ConfigError::UnknownPreset(_))));
    }

    #[test]
    fn destroy_unregisters_and_notifies() {
        let (mut fx, _) = fx();
        let text = fx
            .create_text(Rc::new(RefCell::new(BufferSurface::with_text("x"))))
            .unwrap();
        let destroyed = Rc::new(RefCell::new(false));
        {
            let destroyed = destroyed.clone();
            text.on(EventKind::Destroy, move |_| *destroyed.borrow_mut() = true);
        }
        text.play();
        let id = text.id();

        assert!(text.clone().destroy(&mut fx));
        assert!(*destroyed.borrow());
        assert_eq!(text.status(), Status::Stopped);
        assert!(fx.get_instance(&id).is_none());
        assert_eq!(fx.instance_count(), 0);
        assert!(!fx.destroy(&id));
    }
}
