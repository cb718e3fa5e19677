//! Scene files: what the player puts on screen.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::{CanvasGridConfig, NoiseConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub width: u16,
    pub height: u16,
    /// Overrides `FxConfig::target_fps` when set.
    #[serde(default)]
    pub fps: Option<u32>,
    #[serde(default)]
    pub background: Option<BackgroundSpec>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockSpec {
    pub text: String,
    #[serde(default)]
    pub x: u16,
    #[serde(default)]
    pub y: u16,
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default)]
    pub preset_config: Value,
    /// Appended after the preset's effects.
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundSpec {
    #[serde(flatten)]
    pub grid: CanvasGridConfig,
    /// Value noise instead of the default wave field.
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
    #[serde(default)]
    pub effects: Vec<EffectSpec>,
}

/// `{ "type": "wave", "amplitude": 2 }`: a catalog name plus its config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl EffectSpec {
    pub fn config(&self) -> Value {
        Value::Object(self.config.clone())
    }
}

impl Scene {
    /// A single block showing `text` at the origin, sized to fit it.
    pub fn single(text: &str, preset: Option<String>) -> Self {
        let extent = crate::types::Extent::of_text(text);
        Scene {
            width: extent.cols.max(1),
            height: extent.rows.max(1),
            fps: None,
            background: None,
            blocks: vec![BlockSpec {
                text: text.to_string(),
                x: 0,
                y: 0,
                preset,
                preset_config: Value::Null,
                effects: Vec::new(),
            }],
        }
    }
}
