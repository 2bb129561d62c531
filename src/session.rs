//! Editing session: one loaded project and everything that hangs off it.
//!
//! A session owns the original samples, the editing engine, the raster
//! surface it renders into, an optional host-provided audio sink, and the
//! bookkeeping for envelope saves. It is only ever built from complete data;
//! a failed or partial load never yields a session.

use serde::Serialize;

use crate::config::EditorConfig;
use crate::dsp::oscillator::{generate_wave, Waveform};
use crate::dsp::resynth::resynthesize;
use crate::dsp::sample_buffer::SampleBuffer;
use crate::editor::{Action, EditingEngine};
use crate::envelope::EnvelopePair;
use crate::error::{AudioError, EditorError, ExportError, LoadError};
use crate::export;
use crate::history::HistoryStack;
use crate::project::{AudioData, EnvelopeSaveBody, Palette, ProjectMetadata};
use crate::render::{RenderStyle, Renderer, Surface};
use crate::view::ViewTransform;

// ── Playback ────────────────────────────────────────────────

/// Audio output supplied by the host.
pub trait AudioSink {
    /// Start playing `buffer`. Playback continues independently of edits.
    fn play(&mut self, buffer: &SampleBuffer) -> Result<(), AudioError>;
    /// Stop playback and release the output context. Must tolerate being
    /// called when nothing is playing.
    fn stop(&mut self);
}

// ── Save protocol ───────────────────────────────────────────

/// A snapshot of the envelopes ready to be sent to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub generation: u64,
    pub body: EnvelopeSaveBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Pending { generation: u64 },
    Saved { generation: u64 },
    Failed { generation: u64, message: String },
}

// ── Session ─────────────────────────────────────────────────

pub struct EditorSession {
    metadata: ProjectMetadata,
    config: EditorConfig,
    palette: Palette,
    samples: SampleBuffer,
    engine: EditingEngine,
    renderer: Renderer,
    surface: Surface,
    /// Whether `surface` holds a frame for the current size.
    rendered: bool,
    sink: Option<Box<dyn AudioSink>>,
    playback_context: u64,
    save_generation: u64,
    save_status: SaveStatus,
}

impl EditorSession {
    /// Build a session from fetched project metadata and audio data.
    ///
    /// Envelope arrays are padded or truncated to the sample count; a zero
    /// sample rate falls back to `config.default_sample_rate`.
    pub fn from_parts(
        metadata: ProjectMetadata,
        audio: AudioData,
        config: EditorConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, LoadError> {
        if audio.audio_data.is_empty() {
            return Err(LoadError::EmptyAudio);
        }
        let sample_rate = match audio.sample_rate {
            0 => config.default_sample_rate,
            rate => rate,
        };
        let samples = SampleBuffer::new(audio.audio_data, sample_rate);
        let baseline = EnvelopePair::new(audio.envelope_pos, audio.envelope_neg).reconciled(samples.len());
        log::info!(
            "loaded project {:?} ({} samples @ {} Hz)",
            metadata.name,
            samples.len(),
            sample_rate
        );
        Ok(Self::assemble(metadata, samples, baseline, config, width, height))
    }

    /// Build a session around a synthetic wave described by the project's
    /// `wave_type` and `wave_parameters`, starting from zero envelopes.
    pub fn from_wave(metadata: ProjectMetadata, config: EditorConfig, width: u32, height: u32) -> Result<Self, LoadError> {
        let waveform = Waveform::from_wave_type(metadata.wave_type).ok_or(LoadError::EmptyAudio)?;
        let samples = generate_wave(waveform, metadata.wave_parameters.unwrap_or_default())?;
        if samples.is_empty() {
            return Err(LoadError::EmptyAudio);
        }
        log::info!("generated {:?} wave for project {:?}", waveform, metadata.name);
        let baseline = EnvelopePair::zeros(samples.len());
        Ok(Self::assemble(metadata, samples, baseline, config, width, height))
    }

    fn assemble(
        metadata: ProjectMetadata,
        samples: SampleBuffer,
        baseline: EnvelopePair,
        config: EditorConfig,
        width: u32,
        height: u32,
    ) -> Self {
        let palette = metadata.palette();
        let view = ViewTransform::new(samples.len(), width as f64, height as f64);
        let engine = EditingEngine::new(baseline, view, HistoryStack::with_limit(config.history_limit));
        EditorSession {
            renderer: Renderer::new(RenderStyle::new(&config, palette)),
            surface: Surface::new(width, height),
            rendered: false,
            metadata,
            config,
            palette,
            samples,
            engine,
            sink: None,
            playback_context: 0,
            save_generation: 0,
            save_status: SaveStatus::Idle,
        }
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn engine(&self) -> &EditingEngine {
        &self.engine
    }

    pub fn envelopes(&self) -> &EnvelopePair {
        self.engine.envelopes()
    }

    pub fn view(&self) -> &ViewTransform {
        self.engine.view()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The resynthesised signal for the current envelopes.
    pub fn modified(&self) -> SampleBuffer {
        resynthesize(&self.samples, self.engine.envelopes())
    }

    // ── Input ───────────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.engine.pointer_down(x, y)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.engine.pointer_move(x, y)
    }

    pub fn pointer_up(&mut self) {
        self.engine.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.engine.pointer_leave();
    }

    /// Look `key` up in the configured bindings and run its action.
    /// Returns the action that ran, if any.
    pub fn key_down(&mut self, key: &str) -> Option<Action> {
        let action = self.config.key_bindings.lookup(key)?;
        match self.dispatch(action) {
            Ok(()) => Some(action),
            Err(e) => {
                log::warn!("{action:?} failed: {e}");
                None
            }
        }
    }

    /// Run one logical action.
    pub fn dispatch(&mut self, action: Action) -> Result<(), EditorError> {
        match action {
            Action::PlayModified => self.play_modified()?,
            Action::PlayOriginal => self.play_original()?,
            Action::Stop => self.stop(),
            _ => {
                self.engine.apply(action);
                if !matches!(action, Action::Undo | Action::Reset) {
                    let view = self.engine.view();
                    log::debug!("view zoom {:.1} pan {}", view.zoom(), view.pan());
                }
            }
        }
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.engine.undo()
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    // ── Rendering ───────────────────────────────────────────

    /// Resize the surface and the view mapping together.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.resize(width, height);
        self.rendered = false;
        self.engine.view_mut().resize(width as f64, height as f64);
    }

    /// Redraw the interactive frame into the session surface.
    pub fn render(&mut self) -> &Surface {
        self.renderer
            .render(&mut self.surface, self.engine.view(), &self.samples, self.engine.envelopes());
        self.rendered = true;
        &self.surface
    }

    /// Min/max overview of the original samples on a fresh surface.
    pub fn render_overview(&self, width: u32, height: u32) -> Surface {
        let mut surface = Surface::new(width, height);
        self.renderer.render_overview(&mut surface, &self.samples);
        surface
    }

    /// Sign-coloured view of the modified signal on a fresh surface.
    pub fn render_natural(&self, width: u32, height: u32) -> Surface {
        let mut surface = Surface::new(width, height);
        self.renderer.render_natural(&mut surface, &self.modified());
        surface
    }

    /// Original and modified overlaid on a fresh surface.
    pub fn render_comparison(&self, width: u32, height: u32) -> Surface {
        let mut surface = Surface::new(width, height);
        self.renderer
            .render_comparison(&mut surface, &self.samples, &self.modified());
        surface
    }

    // ── Export ──────────────────────────────────────────────

    fn rendered_surface(&self) -> Result<&Surface, ExportError> {
        if !self.rendered {
            return Err(ExportError::SurfaceUnavailable);
        }
        Ok(&self.surface)
    }

    /// PNG of the last rendered frame. Fails until `render` has run for
    /// the current surface size.
    pub fn export_png(&self) -> Result<Vec<u8>, EditorError> {
        Ok(export::export_png(self.rendered_surface()?)?)
    }

    pub fn export_png_data_url(&self) -> Result<String, EditorError> {
        Ok(export::export_png_data_url(self.rendered_surface()?)?)
    }

    pub fn export_svg(&self) -> Result<String, EditorError> {
        Ok(export::export_svg(
            &self.metadata.name,
            self.palette,
            self.samples.samples(),
            self.engine.envelopes(),
            &self.config,
        )?)
    }

    pub fn export_natural_svg(&self) -> Result<String, EditorError> {
        let modified = self.modified();
        Ok(export::export_natural_svg(
            &self.metadata.name,
            self.palette,
            modified.samples(),
            &self.config,
        )?)
    }

    pub fn export_comparison_svg(&self) -> Result<String, EditorError> {
        let modified = self.modified();
        Ok(export::export_comparison_svg(
            &self.metadata.name,
            self.palette,
            self.samples.samples(),
            modified.samples(),
            &self.config,
        )?)
    }

    /// Download list for the store-hosted audio files of this project.
    pub fn audio_downloads(&self, project_id: u64) -> Result<Vec<export::AudioDownload>, EditorError> {
        Ok(export::audio_downloads(&self.metadata, project_id, &self.config)?)
    }

    pub fn export_modified_wav(&self) -> Result<Vec<u8>, EditorError> {
        Ok(export::export_modified_wav(&self.samples, self.engine.envelopes())?)
    }

    // ── Playback ────────────────────────────────────────────

    pub fn set_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = Some(sink);
    }

    /// Counter bumped on every `stop`; a fresh output context per start.
    pub fn playback_context(&self) -> u64 {
        self.playback_context
    }

    pub fn play_modified(&mut self) -> Result<(), AudioError> {
        let modified = self.modified();
        self.play(&modified)
    }

    pub fn play_original(&mut self) -> Result<(), AudioError> {
        let original = self.samples.clone();
        self.play(&original)
    }

    fn play(&mut self, buffer: &SampleBuffer) -> Result<(), AudioError> {
        self.stop();
        let Some(sink) = self.sink.as_mut() else {
            log::warn!("no audio output; playback disabled");
            return Err(AudioError::Unavailable);
        };
        sink.play(buffer)
    }

    /// Stop playback. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.stop();
        }
        self.playback_context += 1;
    }

    // ── Saving ──────────────────────────────────────────────

    /// Snapshot the envelopes for sending. Editing may continue while the
    /// request is in flight; a later request supersedes this one.
    pub fn begin_save(&mut self) -> SaveRequest {
        self.save_generation += 1;
        let generation = self.save_generation;
        self.save_status = SaveStatus::Pending { generation };
        SaveRequest {
            generation,
            body: EnvelopeSaveBody {
                envelope_data: self.engine.envelopes().to_data(),
            },
        }
    }

    /// Record the outcome of a save. Completions for superseded requests
    /// are ignored. The envelopes are never modified here.
    pub fn complete_save(&mut self, generation: u64, outcome: Result<(), String>) -> &SaveStatus {
        if generation != self.save_generation {
            log::warn!("ignoring stale save completion {generation} (latest {})", self.save_generation);
            return &self.save_status;
        }
        self.save_status = match outcome {
            Ok(()) => {
                log::info!("envelope saved (request {generation})");
                SaveStatus::Saved { generation }
            }
            Err(message) => {
                log::warn!("envelope save failed: {message}");
                SaveStatus::Failed { generation, message }
            }
        };
        &self.save_status
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }
}
