//! Browser bindings.
//!
//! `WaveEditor` wraps an [`EditorSession`] for JavaScript hosts: the host
//! forwards pointer and key events, blits the RGBA frame returned by
//! `render`, and plays the samples returned by `modified_samples` through
//! its own audio context.

use wasm_bindgen::prelude::*;

use crate::config::EditorConfig;
use crate::editor::Action;
use crate::error::EditorError;
use crate::project::{AudioData, ProjectMetadata};
use crate::session::EditorSession;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

fn config_from_js(config: JsValue) -> Result<EditorConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(EditorConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(js_error)
}

#[wasm_bindgen]
pub struct WaveEditor {
    session: EditorSession,
}

#[wasm_bindgen]
impl WaveEditor {
    /// Build an editor from the store's project and audio-data JSON objects.
    /// `config` may be `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        metadata: JsValue,
        audio_data: JsValue,
        config: JsValue,
        width: u32,
        height: u32,
    ) -> Result<WaveEditor, JsValue> {
        let metadata: ProjectMetadata = serde_wasm_bindgen::from_value(metadata).map_err(js_error)?;
        let audio: AudioData = serde_wasm_bindgen::from_value(audio_data).map_err(js_error)?;
        let config = config_from_js(config)?;
        let session = EditorSession::from_parts(metadata, audio, config, width, height)
            .map_err(|e| js_error(EditorError::from(e)))?;
        Ok(WaveEditor { session })
    }

    /// Build an editor around the synthetic wave the project describes.
    #[wasm_bindgen(js_name = fromWave)]
    pub fn from_wave(metadata: JsValue, config: JsValue, width: u32, height: u32) -> Result<WaveEditor, JsValue> {
        let metadata: ProjectMetadata = serde_wasm_bindgen::from_value(metadata).map_err(js_error)?;
        let config = config_from_js(config)?;
        let session = EditorSession::from_wave(metadata, config, width, height)
            .map_err(|e| js_error(EditorError::from(e)))?;
        Ok(WaveEditor { session })
    }

    // ── Input ───────────────────────────────────────────────

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_down(x, y)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_move(x, y)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.session.pointer_up();
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self) {
        self.session.pointer_leave();
    }

    /// Run the action bound to `key`. Returns its kebab-case name, or
    /// `undefined` when nothing ran. Playback actions are reported back so
    /// the host can drive its own audio output.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str) -> Option<String> {
        let action = self.session.config().key_bindings.lookup(key)?;
        match action {
            Action::PlayModified | Action::PlayOriginal => {}
            Action::Stop => self.session.stop(),
            _ => self.session.dispatch(action).ok()?,
        }
        serde_json::to_value(action)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.engine().can_undo()
    }

    // ── View ────────────────────────────────────────────────

    fn view_action(&mut self, action: Action) {
        let _ = self.session.dispatch(action);
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.view_action(Action::ZoomIn);
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.view_action(Action::ZoomOut);
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&mut self) {
        self.view_action(Action::ResetZoom);
    }

    #[wasm_bindgen(js_name = panLeft)]
    pub fn pan_left(&mut self) {
        self.view_action(Action::PanLeft);
    }

    #[wasm_bindgen(js_name = panRight)]
    pub fn pan_right(&mut self) {
        self.view_action(Action::PanRight);
    }

    #[wasm_bindgen(js_name = resetPan)]
    pub fn reset_pan(&mut self) {
        self.view_action(Action::ResetPan);
    }

    pub fn zoom(&self) -> f64 {
        self.session.view().zoom()
    }

    pub fn pan(&self) -> f64 {
        self.session.view().pan()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.session.resize(width, height);
    }

    // ── Rendering ───────────────────────────────────────────

    /// Redraw and return the frame as row-major RGBA8 (for `ImageData`).
    pub fn render(&mut self) -> Vec<u8> {
        self.session.render().pixels().to_vec()
    }

    #[wasm_bindgen(js_name = renderOverview)]
    pub fn render_overview(&self, width: u32, height: u32) -> Vec<u8> {
        self.session.render_overview(width, height).into_pixels()
    }

    #[wasm_bindgen(js_name = renderNatural)]
    pub fn render_natural(&self, width: u32, height: u32) -> Vec<u8> {
        self.session.render_natural(width, height).into_pixels()
    }

    #[wasm_bindgen(js_name = renderComparison)]
    pub fn render_comparison(&self, width: u32, height: u32) -> Vec<u8> {
        self.session.render_comparison(width, height).into_pixels()
    }

    // ── Export ──────────────────────────────────────────────

    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        self.session.export_png().map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportPngDataUrl)]
    pub fn export_png_data_url(&self) -> Result<String, JsValue> {
        self.session.export_png_data_url().map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportSvg)]
    pub fn export_svg(&self) -> Result<String, JsValue> {
        self.session.export_svg().map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportNaturalSvg)]
    pub fn export_natural_svg(&self) -> Result<String, JsValue> {
        self.session.export_natural_svg().map_err(js_error)
    }

    #[wasm_bindgen(js_name = exportComparisonSvg)]
    pub fn export_comparison_svg(&self) -> Result<String, JsValue> {
        self.session.export_comparison_svg().map_err(js_error)
    }

    /// `[{ file_name, url }]` for the project's store-hosted audio files.
    #[wasm_bindgen(js_name = audioDownloads)]
    pub fn audio_downloads(&self, project_id: u64) -> Result<JsValue, JsValue> {
        let downloads = self.session.audio_downloads(project_id).map_err(js_error)?;
        serde_wasm_bindgen::to_value(&downloads).map_err(js_error)
    }

    // ── Audio ───────────────────────────────────────────────

    /// Resynthesised samples for AudioWorklet playback.
    #[wasm_bindgen(js_name = modifiedSamples)]
    pub fn modified_samples(&self) -> Vec<f32> {
        self.session.modified().to_f32()
    }

    #[wasm_bindgen(js_name = originalSamples)]
    pub fn original_samples(&self) -> Vec<f32> {
        self.session.samples().to_f32()
    }

    #[wasm_bindgen(js_name = sampleRate)]
    pub fn sample_rate(&self) -> u32 {
        self.session.samples().sample_rate()
    }

    #[wasm_bindgen(js_name = modifiedWav)]
    pub fn modified_wav(&self) -> Result<Vec<u8>, JsValue> {
        self.session.export_modified_wav().map_err(js_error)
    }

    // ── Saving ──────────────────────────────────────────────

    /// Start a save: returns `{ generation, body }` where `body` is the JSON
    /// to PUT to the envelope endpoint.
    #[wasm_bindgen(js_name = beginSave)]
    pub fn begin_save(&mut self) -> Result<JsValue, JsValue> {
        let request = self.session.begin_save();
        serde_wasm_bindgen::to_value(&request).map_err(js_error)
    }

    /// Report a save outcome; `error` is `undefined` on success. Returns
    /// false if the request had been superseded or failed.
    #[wasm_bindgen(js_name = completeSave)]
    pub fn complete_save(&mut self, generation: u64, error: Option<String>) -> bool {
        let outcome = match error {
            Some(message) => Err(message),
            None => Ok(()),
        };
        matches!(
            self.session.complete_save(generation, outcome),
            crate::session::SaveStatus::Saved { generation: g } if *g == generation
        )
    }
}
