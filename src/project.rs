//! Wire types for the remote project store.
//!
//! These map directly to the JSON served by the store's
//! `/api/projects/{id}/` and `/api/projects/{id}/audio-data/` endpoints,
//! and to the body accepted by `/api/projects/{id}/envelope/`.

use serde::{Deserialize, Serialize};

use crate::color::{defaults, Rgba};

// ── Project Metadata ────────────────────────────────────────

/// Project descriptor as returned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub wave_type: WaveType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_parameters: Option<WaveParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positive_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_color: Option<String>,
    /// Store-relative URL of the original audio file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_file: Option<String>,
    /// Store-relative URL of the last server-rendered modified audio file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_file: Option<String>,
}

impl ProjectMetadata {
    pub fn palette(&self) -> Palette {
        Palette {
            background: Rgba::from_hex_or(self.background_color.as_deref(), defaults::BACKGROUND),
            positive: Rgba::from_hex_or(self.positive_color.as_deref(), defaults::POSITIVE),
            negative: Rgba::from_hex_or(self.negative_color.as_deref(), defaults::NEGATIVE),
        }
    }
}

/// Resolved project colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub background: Rgba,
    pub positive: Rgba,
    pub negative: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            background: defaults::BACKGROUND,
            positive: defaults::POSITIVE,
            negative: defaults::NEGATIVE,
        }
    }
}

/// Source of a project's audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveType {
    Sine,
    Square,
    Triangle,
    Sawtooth,
    #[default]
    Uploaded,
}

/// Parameters for synthetic waves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParameters {
    /// Frequency in Hz.
    pub freq: f64,
    /// Samples per wave period.
    pub spw: usize,
    /// Number of periods generated.
    pub periods: usize,
}

impl Default for WaveParameters {
    fn default() -> Self {
        WaveParameters {
            freq: 440.0,
            spw: 100,
            periods: 10,
        }
    }
}

// ── Audio Data ──────────────────────────────────────────────

/// Samples and baseline envelopes for one project.
/// `audio_data.len()` defines the session length `N`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioData {
    #[serde(default)]
    pub sample_rate: u32,
    pub audio_data: Vec<f64>,
    #[serde(default)]
    pub envelope_pos: Vec<f64>,
    #[serde(default)]
    pub envelope_neg: Vec<f64>,
}

// ── Envelope Save ───────────────────────────────────────────

/// Edited envelope arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
}

/// Request body for persisting an edited envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeSaveBody {
    pub envelope_data: EnvelopeData,
}
