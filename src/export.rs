//! Raster, vector and audio export.
//!
//! Vector documents are laid out at the configured export size rather than
//! the on-screen surface size, and always span the whole buffer, so the same
//! data yields the same document regardless of zoom and pan.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine as _;
use serde::Serialize;

use crate::color::Rgba;
use crate::config::{EditorConfig, NegativeLayerMode};
use crate::dsp::resynth::resynthesize;
use crate::dsp::sample_buffer::SampleBuffer;
use crate::dsp::wav::encode_wav;
use crate::envelope::{EnvelopePair, Polarity};
use crate::error::ExportError;
use crate::project::{Palette, ProjectMetadata};
use crate::render::surface::Surface;
use crate::render::split_by_sign;
use crate::view::AMPLITUDE_HEADROOM;

/// Faint waveform stroke in vector exports.
const SVG_WAVEFORM: Rgba = Rgba::rgb(64, 128, 255).with_alpha(0.15);

// ── File names ──────────────────────────────────────────────

pub fn png_file_name(project_id: u64) -> String {
    format!("project_{project_id}_envelope.png")
}

pub fn svg_file_name(project_id: u64) -> String {
    format!("project_{project_id}_envelope.svg")
}

// ── Raster ──────────────────────────────────────────────────

/// PNG bytes of the rendered surface.
pub fn export_png(surface: &Surface) -> Result<Vec<u8>, ExportError> {
    surface.encode_png()
}

/// `data:image/png;base64,...` URL of the rendered surface.
pub fn export_png_data_url(surface: &Surface) -> Result<String, ExportError> {
    let png = surface.encode_png()?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

// ── Vector ──────────────────────────────────────────────────

struct SvgWriter {
    out: String,
    center_y: f64,
    scale_y: f64,
    scale_x: f64,
}

impl SvgWriter {
    fn begin(title: &str, background: Rgba, num_samples: usize, config: &EditorConfig) -> Self {
        let width = config.export_width;
        let header = config.export_header_height;
        let mut out = String::new();
        let _ = write!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <svg width=\"{width}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n  \
             <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n  \
             <text x=\"10\" y=\"25\" font-family=\"Arial\" font-size=\"16\" fill=\"white\">{}</text>\n  \
             <g transform=\"translate(0, {header})\">",
            config.export_height + header,
            background.to_css(),
            escape_xml(title),
        );
        let center_y = config.export_height as f64 / 2.0;
        SvgWriter {
            out,
            center_y,
            scale_y: center_y * AMPLITUDE_HEADROOM,
            scale_x: width as f64 / num_samples as f64,
        }
    }

    /// One polyline through `(x, y)` points.
    fn path(&mut self, points: impl IntoIterator<Item = (f64, f64)>, color: Rgba, width: f64) {
        self.out.push_str("<path d=\"M");
        for (k, (x, y)) in points.into_iter().enumerate() {
            if k > 0 {
                self.out.push('L');
            }
            let _ = write!(self.out, "{x},{y}");
        }
        let _ = write!(
            self.out,
            "\" stroke=\"{}\" stroke-width=\"{width}\" fill=\"none\"/>",
            color.to_css()
        );
    }

    /// A layer of per-sample values using `y = centerY - sign * v * scaleY`.
    fn layer(&mut self, values: &[f64], sign: f64, color: Rgba, width: f64) {
        let (sx, cy, sy) = (self.scale_x, self.center_y, self.scale_y);
        self.path(
            values.iter().enumerate().map(|(i, &v)| (i as f64 * sx, cy - sign * v * sy)),
            color,
            width,
        );
    }

    fn finish(mut self) -> String {
        self.out.push_str("  </g>\n</svg>");
        self.out
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn export_title(name: &str) -> String {
    format!("Project: {name} - Envelope Visualization Export")
}

/// Envelope document: faint waveform, positive and negative layers.
pub fn export_svg(
    name: &str,
    palette: Palette,
    samples: &[f64],
    envelopes: &EnvelopePair,
    config: &EditorConfig,
) -> Result<String, ExportError> {
    if samples.is_empty() {
        return Err(ExportError::NoData);
    }
    let mut svg = SvgWriter::begin(&export_title(name), palette.background, samples.len(), config);
    svg.layer(samples, 1.0, SVG_WAVEFORM, config.waveform_stroke);
    svg.layer(&envelopes.positive, 1.0, palette.positive, config.envelope_stroke);
    let negative_sign = match config.negative_layer {
        NegativeLayerMode::Direct => 1.0,
        NegativeLayerMode::Mirrored => -1.0,
    };
    svg.layer(&envelopes.negative, negative_sign, palette.negative, config.envelope_stroke);
    Ok(svg.finish())
}

/// Modified signal split at zero crossings, coloured by sign.
pub fn export_natural_svg(
    name: &str,
    palette: Palette,
    modified: &[f64],
    config: &EditorConfig,
) -> Result<String, ExportError> {
    if modified.is_empty() {
        return Err(ExportError::NoData);
    }
    let mut svg = SvgWriter::begin(&export_title(name), palette.background, modified.len(), config);
    let points: Vec<(f64, f64)> = modified
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64 * svg.scale_x, v))
        .collect();
    for run in split_by_sign(&points) {
        let color = match run.polarity {
            Polarity::Positive => palette.positive,
            Polarity::Negative => palette.negative,
        };
        let (cy, sy) = (svg.center_y, svg.scale_y);
        svg.path(run.points.iter().map(|&(x, v)| (x, cy - v * sy)), color, 2.0);
    }
    Ok(svg.finish())
}

/// Original and modified signals overlaid.
pub fn export_comparison_svg(
    name: &str,
    palette: Palette,
    original: &[f64],
    modified: &[f64],
    config: &EditorConfig,
) -> Result<String, ExportError> {
    if original.is_empty() {
        return Err(ExportError::NoData);
    }
    let mut svg = SvgWriter::begin(&export_title(name), palette.background, original.len(), config);
    svg.layer(original, 1.0, palette.negative.with_alpha(0.6), 2.0);
    svg.layer(modified, 1.0, palette.positive.with_alpha(0.8), 2.0);
    Ok(svg.finish())
}

// ── Audio ───────────────────────────────────────────────────

/// A store-hosted audio file and the name to save it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioDownload {
    pub file_name: String,
    pub url: String,
}

/// Downloads for whichever of the original and modified files the project has.
pub fn audio_downloads(
    metadata: &ProjectMetadata,
    project_id: u64,
    config: &EditorConfig,
) -> Result<Vec<AudioDownload>, ExportError> {
    let files = [
        (metadata.original_file.as_deref(), "original"),
        (metadata.modified_file.as_deref(), "modified"),
    ];
    let downloads: Vec<AudioDownload> = files
        .into_iter()
        .filter_map(|(file, label)| {
            let file = file.filter(|f| !f.is_empty())?;
            Some(AudioDownload {
                file_name: format!("project_{project_id}_{label}.wav"),
                url: config.resolve_url(file),
            })
        })
        .collect();
    if downloads.is_empty() {
        return Err(ExportError::NoAudioFiles);
    }
    Ok(downloads)
}

/// Resynthesise and encode the modified signal as WAV.
pub fn export_modified_wav(samples: &SampleBuffer, envelopes: &EnvelopePair) -> Result<Vec<u8>, ExportError> {
    if samples.is_empty() {
        return Err(ExportError::NoData);
    }
    encode_wav(&resynthesize(samples, envelopes))
}

// ── Files ───────────────────────────────────────────────────

/// Sibling path used while a file is being written.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

/// Write `bytes` to `path` via a sibling temp file and a rename. On failure
/// the temp file is removed and `path` is left as it was.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let tmp = temp_path(path);
    let result = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        log::warn!("export to {} failed: {e}", path.display());
        return Err(ExportError::Io(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::defaults;

    fn meta(original: Option<&str>, modified: Option<&str>) -> ProjectMetadata {
        ProjectMetadata {
            id: Some(7),
            name: "demo".to_string(),
            wave_type: Default::default(),
            wave_parameters: None,
            background_color: None,
            positive_color: None,
            negative_color: None,
            original_file: original.map(str::to_string),
            modified_file: modified.map(str::to_string),
        }
    }

    fn small_config() -> EditorConfig {
        EditorConfig {
            export_width: 4,
            export_height: 100,
            ..EditorConfig::default()
        }
    }

    #[test]
    fn svg_layout_and_layers() {
        let env = EnvelopePair::new(vec![0.5, 0.5], vec![-0.5, -0.25]);
        let svg = export_svg("A&B", Palette::default(), &[0.0, 1.0], &env, &small_config()).unwrap();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("<svg width=\"4\" height=\"140\""));
        assert!(svg.contains("Project: A&amp;B - Envelope Visualization Export"));
        assert!(svg.contains("translate(0, 40)"));
        // scaleX = 2, centerY = 50, scaleY = 40.
        assert!(svg.contains("d=\"M0,50L2,10\" stroke=\"rgba(64,128,255,0.15)\" stroke-width=\"1\""));
        assert!(svg.contains("d=\"M0,30L2,30\" stroke=\"#22c55e\" stroke-width=\"3\""));
        assert!(svg.contains("d=\"M0,70L2,60\" stroke=\"#ef4444\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn mirrored_negative_layer() {
        let config = EditorConfig {
            negative_layer: NegativeLayerMode::Mirrored,
            ..small_config()
        };
        let env = EnvelopePair::new(vec![0.0, 0.0], vec![-0.5, -0.25]);
        let svg = export_svg("m", Palette::default(), &[0.0, 0.0], &env, &config).unwrap();
        assert!(svg.contains("d=\"M0,30L2,40\" stroke=\"#ef4444\""));
    }

    #[test]
    fn svg_without_data_fails() {
        let env = EnvelopePair::zeros(0);
        assert!(matches!(
            export_svg("x", Palette::default(), &[], &env, &EditorConfig::default()),
            Err(ExportError::NoData)
        ));
    }

    #[test]
    fn natural_svg_splits_by_sign() {
        let svg = export_natural_svg("n", Palette::default(), &[0.5, -0.5], &small_config()).unwrap();
        // Crossing at x = 1 (scaleX = 2).
        assert!(svg.contains("d=\"M0,30L1,50\" stroke=\"#22c55e\""));
        assert!(svg.contains("d=\"M1,50L2,70\" stroke=\"#ef4444\""));
    }

    #[test]
    fn comparison_svg_uses_alpha_strokes() {
        let svg = export_comparison_svg("c", Palette::default(), &[0.0, 0.5], &[0.0, 0.25], &small_config())
            .unwrap();
        assert!(svg.contains("stroke=\"rgba(239,68,68,0.6)\" stroke-width=\"2\""));
        assert!(svg.contains("stroke=\"rgba(34,197,94,0.8)\" stroke-width=\"2\""));
    }

    #[test]
    fn audio_downloads_use_project_names() {
        let config = EditorConfig::default();
        let all = audio_downloads(&meta(Some("/media/o.wav"), Some("/media/m.wav")), 7, &config).unwrap();
        assert_eq!(
            all,
            vec![
                AudioDownload {
                    file_name: "project_7_original.wav".to_string(),
                    url: "http://localhost:8000/media/o.wav".to_string(),
                },
                AudioDownload {
                    file_name: "project_7_modified.wav".to_string(),
                    url: "http://localhost:8000/media/m.wav".to_string(),
                },
            ]
        );
        let only = audio_downloads(&meta(None, Some("/m.wav")), 7, &config).unwrap();
        assert_eq!(only.len(), 1);
        assert!(matches!(
            audio_downloads(&meta(None, Some("")), 7, &config),
            Err(ExportError::NoAudioFiles)
        ));
    }

    #[test]
    fn modified_wav_has_riff_header() {
        let samples = SampleBuffer::new(vec![0.5, -0.5, 0.5], 8000);
        let env = EnvelopePair::new(vec![0.3; 3], vec![-0.3; 3]);
        let wav = export_modified_wav(&samples, &env).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert!(matches!(
            export_modified_wav(&SampleBuffer::new(Vec::new(), 8000), &env),
            Err(ExportError::NoData)
        ));
    }

    #[test]
    fn png_data_url_prefix() {
        let mut surface = Surface::new(2, 2);
        surface.fill(defaults::BACKGROUND);
        let url = export_png_data_url(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(png_file_name(3), "project_3_envelope.png");
        assert_eq!(svg_file_name(3), "project_3_envelope.svg");
    }

    #[test]
    fn atomic_write_replaces_or_leaves_nothing() {
        let dir = std::env::temp_dir().join(format!("wavedraw-export-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let target = dir.join("out.svg");
        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert!(!temp_path(&target).exists());

        let missing = dir.join("no-such-dir").join("out.svg");
        assert!(matches!(write_atomic(&missing, b"x"), Err(ExportError::Io(_))));
        assert!(!missing.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
