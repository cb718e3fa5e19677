//! Error types for the animation core.

use thiserror::Error;

/// Problems with what a caller asked for. Reported at the offending call,
/// never deferred to a later tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("surface not found: {0}")]
    SurfaceNotFound(String),

    #[error("unknown effect: {0}")]
    UnknownEffect(String),

    #[error("preset not found: {0}")]
    UnknownPreset(String),

    #[error("invalid config for effect `{name}`: {source}")]
    InvalidEffectConfig {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("grid must have at least one column and one row (got {cols}x{rows})")]
    InvalidGrid { cols: u16, rows: u16 },

    #[error("charset must contain at least one character")]
    EmptyCharset,
}

#[derive(Debug, Error)]
pub enum FxError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A method that implementors are required to provide was called on a
    /// type that does not provide it.
    #[error("{method}() must be implemented")]
    ContractViolation { method: &'static str },

    #[error("effect `{effect}` failed: {message}")]
    Effect { effect: String, message: String },

    #[error("instance `{id}` panicked during update: {message}")]
    InstancePanicked { id: String, message: String },

    #[error("instance `{id}` is already borrowed")]
    InstanceBusy { id: String },

    #[error("surface of instance `{id}` is already borrowed")]
    SurfaceBusy { id: String },
}

impl FxError {
    pub fn effect(effect: impl Into<String>, message: impl Into<String>) -> Self {
        FxError::Effect {
            effect: effect.into(),
            message: message.into(),
        }
    }
}

/// Turn a caught panic payload into a readable message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
