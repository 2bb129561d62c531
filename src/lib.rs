pub mod color;
pub mod config;
pub mod dsp;
pub mod editor;
pub mod envelope;
pub mod error;
pub mod export;
pub mod history;
pub mod project;
pub mod render;
pub mod session;
#[cfg(feature = "store")]
pub mod store;
pub mod view;
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use config::EditorConfig;
pub use editor::{Action, EditingEngine, KeyMap};
pub use envelope::EnvelopePair;
pub use error::EditorError;
pub use session::{AudioSink, EditorSession};
pub use view::ViewTransform;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the wavedraw-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: generate a peak-normalised synthetic wave as mono f32
/// samples. `wave_type` is one of `sine`, `square`, `triangle`, `sawtooth`.
#[wasm_bindgen]
pub fn generate_wave_samples(wave_type: &str, freq: f64, samples_per_wave: usize, periods: usize) -> Result<Vec<f32>, JsValue> {
    let wave_type: project::WaveType = serde_json::from_value(serde_json::Value::String(wave_type.to_string()))
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let waveform = dsp::oscillator::Waveform::from_wave_type(wave_type)
        .ok_or_else(|| JsValue::from_str("uploaded audio has no generator"))?;
    let params = project::WaveParameters {
        freq,
        spw: samples_per_wave,
        periods,
    };
    let buffer = dsp::oscillator::generate_wave(waveform, params).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(buffer.to_f32())
}

/// WASM-exposed: decode a WAV file to mono, peak-normalised f32 samples.
#[wasm_bindgen]
pub fn decode_wav_samples(bytes: &[u8]) -> Result<Vec<f32>, JsValue> {
    let buffer = dsp::wav::decode_wav(bytes).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(buffer.to_f32())
}
