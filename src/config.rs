//! Editor configuration.
//!
//! Every field has a default, so a host may pass `{}` or only the keys it
//! wants to override.

use serde::{Deserialize, Serialize};

use crate::editor::KeyMap;
use crate::error::ConfigError;

/// How the negative envelope is placed vertically in vector exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeLayerMode {
    /// `y = centerY - value * scaleY`, identical to the positive layer and
    /// to the on-screen rendering.
    #[default]
    Direct,
    /// `y = centerY + value * scaleY`, reflecting the layer about the
    /// centre line as older vector exports did.
    Mirrored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL of the project store; file URLs in project metadata are
    /// relative to it.
    pub backend_url: String,
    /// Vector export width in user units, independent of the on-screen surface.
    pub export_width: u32,
    /// Height of the plotted area in vector exports.
    pub export_height: u32,
    /// Title band above the plot in vector exports.
    pub export_header_height: u32,
    /// Maximum undo depth; `None` keeps every step for the session.
    pub history_limit: Option<usize>,
    pub waveform_stroke: f64,
    pub envelope_stroke: f64,
    pub negative_layer: NegativeLayerMode,
    pub key_bindings: KeyMap,
    /// Used when the store reports a sample rate of 0.
    pub default_sample_rate: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            backend_url: "http://localhost:8000".to_string(),
            export_width: 1600,
            export_height: 512,
            export_header_height: 40,
            history_limit: None,
            waveform_stroke: 1.0,
            envelope_stroke: 3.0,
            negative_layer: NegativeLayerMode::Direct,
            key_bindings: KeyMap::default(),
            default_sample_rate: 44100,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Join a store-relative path onto `backend_url`.
    pub fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.backend_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
