//! Player: runs a scene in the terminal.
//!
//! Builds one buffer surface per scene element, animates them through an
//! `AsciiFx`, and composites the surfaces to the terminal every frame.

pub mod scene;

use std::cell::RefCell;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal;

use crate::config::{FxConfig, KeyBindings, matches_binding};
use crate::core::DEFAULT_FPS;
use crate::error::panic_message;
use crate::fx::{AsciiFx, CanvasGridApi, TextBlockApi};
use crate::surface::{BufferSurface, TerminalPresenter};
use crate::types::Extent;

pub use scene::{BackgroundSpec, BlockSpec, EffectSpec, Scene};

/// What a key press asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePause,
    Restart,
    None,
}

pub struct Player {
    fx: AsciiFx,
    presenter: TerminalPresenter,
    keys: KeyBindings,
    width: u16,
    height: u16,
    frame_interval: Duration,
    texts: Vec<TextBlockApi>,
    grid: Option<CanvasGridApi>,
}

impl Player {
    /// Build every element of `scene` and start it playing.
    pub fn new(scene: &Scene, config: FxConfig) -> Result<Self> {
        let fps = scene.fps.or(config.target_fps);
        let keys = config.keys.clone();
        let mut fx = AsciiFx::new(FxConfig {
            target_fps: fps,
            auto_start: true,
            ..config
        });
        let mut presenter = TerminalPresenter::new(scene.width, scene.height);

        let grid = match &scene.background {
            Some(spec) => {
                let surface = Rc::new(RefCell::new(BufferSurface::new(Extent::new(
                    scene.width,
                    scene.height,
                ))));
                presenter.mount(surface.clone(), 0, 0);
                let grid = fx
                    .create_background_with(surface, spec.grid.clone())
                    .context("Failed to create background")?;
                if let Some(noise) = &spec.noise {
                    grid.noise(noise.clone());
                }
                for effect in &spec.effects {
                    grid.effect(&effect.kind, &effect.config())
                        .with_context(|| format!("Background effect `{}`", effect.kind))?;
                }
                grid.play();
                Some(grid)
            }
            None => None,
        };

        let mut texts = Vec::with_capacity(scene.blocks.len());
        for (i, block) in scene.blocks.iter().enumerate() {
            let surface = Rc::new(RefCell::new(BufferSurface::with_text(&block.text)));
            presenter.mount(surface.clone(), block.x, block.y);
            let text = fx
                .create_text(surface)
                .with_context(|| format!("Failed to create block {i}"))?;
            if let Some(preset) = &block.preset {
                text.preset(preset, &block.preset_config)
                    .with_context(|| format!("Block {i}: preset `{preset}`"))?;
            }
            for effect in &block.effects {
                text.effect(&effect.kind, &effect.config())
                    .with_context(|| format!("Block {i}: effect `{}`", effect.kind))?;
            }
            text.play();
            texts.push(text);
        }

        tracing::info!(
            blocks = texts.len(),
            background = grid.is_some(),
            fps = ?fps,
            "Scene loaded"
        );

        Ok(Self {
            fx,
            presenter,
            keys,
            width: scene.width,
            height: scene.height,
            frame_interval: Duration::from_secs_f64(1.0 / fps.unwrap_or(DEFAULT_FPS).max(1) as f64),
            texts,
            grid,
        })
    }

    /// Play the scene in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error or panic). While the scene is up, panic reports
    /// go to the log instead of the screen; a panic that escapes the loop is
    /// returned as an error once the terminal is restored.
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        if term_w < self.width || term_h < self.height {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                self.width,
                self.height,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        TerminalPresenter::enter(&mut stdout)?;
        let outcome = with_logged_panics(|| self.run_loop(&mut stdout));
        TerminalPresenter::leave(&mut stdout);

        match outcome {
            Ok(result) => result,
            Err(message) => bail!("Player panicked: {message}"),
        }
    }

    fn run_loop(&mut self, out: &mut impl Write) -> Result<()> {
        loop {
            if event::poll(self.frame_interval)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(&key) == Action::Quit {
                            break;
                        }
                    }
                    Event::Resize(_, _) => self.presenter.invalidate(),
                    _ => {}
                }
            }
            self.step(out)?;
        }
        Ok(())
    }

    /// Run one engine frame and present the result.
    pub fn step(&mut self, out: &mut impl Write) -> Result<()> {
        self.fx.frame();
        self.presenter.present(out)
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Action {
        let action = self.action_for(key);
        match action {
            Action::TogglePause => {
                if self.fx.is_running() {
                    self.fx.stop();
                } else {
                    self.fx.start();
                }
            }
            Action::Restart => {
                for text in &self.texts {
                    text.play();
                }
                if let Some(grid) = &self.grid {
                    grid.play();
                }
                self.fx.start();
            }
            Action::Quit | Action::None => {}
        }
        action
    }

    fn action_for(&self, key: &KeyEvent) -> Action {
        if matches_binding(&self.keys.quit, key) || matches_binding(&self.keys.cancel, key) {
            Action::Quit
        } else if matches_binding(&self.keys.pause, key) {
            Action::TogglePause
        } else if matches_binding(&self.keys.restart, key) {
            Action::Restart
        } else {
            Action::None
        }
    }

    pub fn fx(&self) -> &AsciiFx {
        &self.fx
    }

    pub fn texts(&self) -> &[TextBlockApi] {
        &self.texts
    }

    /// Instances that are currently playing.
    pub fn active_count(&self) -> usize {
        self.fx
            .instances()
            .values()
            .filter(|instance| instance.borrow().is_active())
            .count()
    }
}

/// Run `f` with panic reports sent to the log, restoring the previous hook
/// afterwards. A panic escaping `f` comes back as its message.
fn with_logged_panics<T>(f: impl FnOnce() -> T) -> std::result::Result<T, String> {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(log_panic));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    panic::set_hook(previous);
    outcome.map_err(|payload| panic_message(payload.as_ref()))
}

fn log_panic(info: &panic::PanicHookInfo<'_>) {
    tracing::error!(%info, "Panic during playback");
}
