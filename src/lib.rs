pub mod config;
pub mod core;
pub mod effects;
pub mod error;
pub mod fx;
pub mod player;
pub mod presets;
pub mod render;
pub mod surface;
pub mod types;

pub use config::FxConfig;
pub use error::{ConfigError, FxError};
pub use fx::{AsciiFx, CanvasGridApi, EffectOptions, Target, TextBlockApi};
