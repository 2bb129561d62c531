//! Renderer — draws the waveform and envelope layers onto a [`Surface`].
//!
//! The interactive view is three layers per frame, all mapped through the
//! same [`ViewTransform`]:
//!
//! 1. the original samples, faint;
//! 2. the positive envelope;
//! 3. the negative envelope, with the *same* vertical formula as the
//!    positive one (values are plotted where they are, not mirrored).
//!
//! Points are emitted only where `x ∈ [0, width]`; a new run starts at the
//! first visible point after an off-screen one.

pub mod surface;

use crate::color::{defaults, Rgba};
use crate::config::EditorConfig;
use crate::dsp::sample_buffer::SampleBuffer;
use crate::envelope::{EnvelopePair, Polarity};
use crate::project::Palette;
use crate::view::ViewTransform;

pub use surface::{Path, Point, Stroke, Surface};

/// Colours and widths for each layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub background: Rgba,
    pub waveform: Stroke,
    pub positive: Stroke,
    pub negative: Stroke,
    pub overview: Stroke,
}

impl RenderStyle {
    pub fn new(config: &EditorConfig, palette: Palette) -> Self {
        RenderStyle {
            background: palette.background,
            waveform: Stroke {
                color: defaults::WAVEFORM,
                width: config.waveform_stroke,
            },
            positive: Stroke {
                color: palette.positive,
                width: config.envelope_stroke,
            },
            negative: Stroke {
                color: palette.negative,
                width: config.envelope_stroke,
            },
            overview: Stroke {
                color: defaults::OVERVIEW,
                width: 1.0,
            },
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle::new(&EditorConfig::default(), Palette::default())
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub style: RenderStyle,
}

impl Renderer {
    pub fn new(style: RenderStyle) -> Self {
        Renderer { style }
    }

    /// Draw one interactive frame.
    pub fn render(&self, surface: &mut Surface, view: &ViewTransform, samples: &SampleBuffer, envelopes: &EnvelopePair) {
        surface.fill(self.style.background);
        surface.stroke_path(&visible_path(samples.samples(), view), self.style.waveform);
        surface.stroke_path(&visible_path(&envelopes.positive, view), self.style.positive);
        surface.stroke_path(&visible_path(&envelopes.negative, view), self.style.negative);
    }

    /// Whole-buffer min/max overview, one vertical bar per pixel column.
    /// Clears the surface to transparent first.
    pub fn render_overview(&self, surface: &mut Surface, samples: &SampleBuffer) {
        surface.fill(Rgba::rgb(0, 0, 0).with_alpha(0.0));
        let half = surface.height() as f64 / 2.0;
        let mut path = Path::new();
        for (column, bounds) in overview_columns(samples.samples(), surface.width() as usize)
            .into_iter()
            .enumerate()
        {
            if let Some((min, max)) = bounds {
                let x = column as f64;
                path.move_to(Point::new(x, (1.0 - max) * half));
                path.line_to(Point::new(x, (1.0 - min) * half));
            }
        }
        surface.stroke_path(&path, self.style.overview);
    }

    /// The modified signal fitted to the surface, coloured by sign with
    /// segments split exactly at zero crossings.
    pub fn render_natural(&self, surface: &mut Surface, modified: &SampleBuffer) {
        surface.fill(self.style.background);
        let view = fit_view(modified.len(), surface);
        let points: Vec<(f64, f64)> = modified
            .samples()
            .iter()
            .enumerate()
            .map(|(i, &v)| (view.index_to_x(i), v))
            .collect();
        for run in split_by_sign(&points) {
            let mut path = Path::new();
            for (k, &(x, v)) in run.points.iter().enumerate() {
                let p = Point::new(x, view.value_to_y(v));
                if k == 0 { path.move_to(p) } else { path.line_to(p) }
            }
            let stroke = match run.polarity {
                Polarity::Positive => self.style.positive,
                Polarity::Negative => self.style.negative,
            };
            surface.stroke_path(&path, Stroke { width: 2.0, ..stroke });
        }
    }

    /// Original and modified signals overlaid, fitted to the surface.
    pub fn render_comparison(&self, surface: &mut Surface, original: &SampleBuffer, modified: &SampleBuffer) {
        surface.fill(self.style.background);
        let view = fit_view(original.len(), surface);
        let original_stroke = Stroke {
            color: self.style.negative.color.with_alpha(0.6),
            width: 2.0,
        };
        let modified_stroke = Stroke {
            color: self.style.positive.color.with_alpha(0.8),
            width: 2.0,
        };
        surface.stroke_path(&visible_path(original.samples(), &view), original_stroke);
        surface.stroke_path(&visible_path(modified.samples(), &view), modified_stroke);
    }
}

/// A zoom 1, pan 0 view covering the whole surface.
fn fit_view(num_samples: usize, surface: &Surface) -> ViewTransform {
    ViewTransform::new(num_samples, surface.width() as f64, surface.height() as f64)
}

/// Polyline through `values` under `view`, clipped to `x ∈ [0, width]`.
pub fn visible_path(values: &[f64], view: &ViewTransform) -> Path {
    let mut path = Path::new();
    for (i, &value) in values.iter().enumerate() {
        let x = view.index_to_x(i);
        if x > view.width() {
            break;
        }
        if !view.is_visible(x) {
            continue;
        }
        let p = Point::new(x, view.value_to_y(value));
        if i == 0 || view.index_to_x(i - 1) < 0.0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

/// Per-column `(min, max)` of `samples` split into `columns` spans of
/// `ceil(N / columns)` samples. Columns past the end of the data are `None`.
pub fn overview_columns(samples: &[f64], columns: usize) -> Vec<Option<(f64, f64)>> {
    if columns == 0 {
        return Vec::new();
    }
    let step = samples.len().div_ceil(columns).max(1);
    (0..columns)
        .map(|column| {
            let start = column * step;
            let span = samples.get(start..(start + step).min(samples.len()))?;
            span.iter().fold(None, |acc: Option<(f64, f64)>, &s| match acc {
                Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
                None => Some((s, s)),
            })
        })
        .collect()
}

/// A run of consecutive points sharing one sign.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRun {
    pub polarity: Polarity,
    pub points: Vec<(f64, f64)>,
}

/// Split `(x, value)` points into same-sign runs, inserting an exact
/// zero-crossing point (shared by both neighbouring runs) wherever the sign
/// flips. Zero counts as positive.
pub fn split_by_sign(points: &[(f64, f64)]) -> Vec<SignedRun> {
    let mut runs = Vec::new();
    let Some(&first) = points.first() else {
        return runs;
    };
    let mut current = SignedRun {
        polarity: Polarity::of(first.1),
        points: vec![first],
    };
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let next = Polarity::of(b.1);
        if next != current.polarity {
            let dy = b.1 - a.1;
            let t = if dy.abs() > 1e-12 { -a.1 / dy } else { 0.5 };
            let crossing = (a.0 + t * (b.0 - a.0), 0.0);
            current.points.push(crossing);
            let finished = std::mem::replace(
                &mut current,
                SignedRun {
                    polarity: next,
                    points: vec![crossing],
                },
            );
            runs.push(finished);
        }
        current.points.push(b);
    }
    runs.push(current);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_path_single_run_at_rest() {
        let view = ViewTransform::new(4, 300.0, 100.0);
        let path = visible_path(&[0.0, 1.0, -1.0, 0.5], &view);
        assert_eq!(path.subpaths.len(), 1);
        let run = &path.subpaths[0];
        assert_eq!(run.len(), 4);
        assert_eq!(run[1], Point::new(75.0, 10.0));
        assert_eq!(run[2], Point::new(150.0, 90.0));
    }

    #[test]
    fn visible_path_clips_to_width() {
        let mut view = ViewTransform::new(1000, 100.0, 100.0);
        view.set_zoom(2.0);
        view.set_pan(50.0);
        let values = vec![0.0; 1000];
        let path = visible_path(&values, &view);
        assert_eq!(path.subpaths.len(), 1);
        let run = &path.subpaths[0];
        assert!(run.iter().all(|p| p.x >= 0.0 && p.x <= 100.0));
        // x = 0.2 * i - 50 is visible for i in 250..=750.
        assert_eq!(run.len(), 501);
        assert_eq!(run[0].x, 0.0);
    }

    #[test]
    fn negative_layer_uses_positive_formula() {
        let view = ViewTransform::new(2, 10.0, 100.0);
        let pos = visible_path(&[0.5, 0.5], &view);
        let neg = visible_path(&[-0.5, -0.5], &view);
        assert_eq!(pos.subpaths[0][0].y, 30.0);
        assert_eq!(neg.subpaths[0][0].y, 70.0);
    }

    #[test]
    fn overview_min_max() {
        let samples = [0.1, -0.4, 0.9, 0.2, -0.1];
        let cols = overview_columns(&samples, 2);
        assert_eq!(cols, vec![Some((-0.4, 0.9)), Some((-0.1, 0.2))]);

        let sparse = overview_columns(&samples, 4);
        assert_eq!(sparse.len(), 4);
        assert_eq!(sparse[2], Some((-0.1, -0.1)));
        assert_eq!(sparse[3], None);
        assert!(overview_columns(&samples, 0).is_empty());
    }

    #[test]
    fn sign_split_inserts_crossings() {
        let runs = split_by_sign(&[(0.0, 0.5), (1.0, -0.5), (2.0, -0.2), (3.0, 0.2)]);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].polarity, Polarity::Positive);
        assert_eq!(runs[0].points, vec![(0.0, 0.5), (0.5, 0.0)]);
        assert_eq!(runs[1].polarity, Polarity::Negative);
        assert_eq!(runs[1].points, vec![(0.5, 0.0), (1.0, -0.5), (2.0, -0.2), (2.5, 0.0)]);
        assert_eq!(runs[2].points, vec![(2.5, 0.0), (3.0, 0.2)]);
        assert!(split_by_sign(&[]).is_empty());
    }

    #[test]
    fn render_draws_layers_over_background() {
        let view = ViewTransform::new(100, 100.0, 100.0);
        let samples = SampleBuffer::new(vec![0.0; 100], 1000);
        let envelopes = EnvelopePair::new(vec![0.5; 100], vec![-0.5; 100]);
        let mut surface = Surface::new(100, 100);
        Renderer::new(RenderStyle::default()).render(&mut surface, &view, &samples, &envelopes);

        // Positive at y = 50 - 0.5 * 40 = 30, negative at y = 70.
        let p = defaults::POSITIVE;
        let n = defaults::NEGATIVE;
        assert_eq!(surface.pixel(40, 30), Some([p.r, p.g, p.b, 255]));
        assert_eq!(surface.pixel(40, 70), Some([n.r, n.g, n.b, 255]));
        assert_eq!(surface.pixel(40, 10), Some([0, 0, 0, 255]));
    }

    #[test]
    fn overview_draws_columns() {
        let samples = SampleBuffer::new(vec![1.0, -1.0, 0.0, 0.0], 100);
        let mut surface = Surface::new(2, 20);
        Renderer::new(RenderStyle::default()).render_overview(&mut surface, &samples);
        let blue = defaults::OVERVIEW;
        assert_eq!(surface.pixel(0, 2), Some([blue.r, blue.g, blue.b, 255]));
        assert_eq!(surface.pixel(0, 18), Some([blue.r, blue.g, blue.b, 255]));
        assert_eq!(surface.pixel(1, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn natural_view_colours_by_sign() {
        let modified = SampleBuffer::new(vec![0.5, 0.5, -0.5, -0.5], 100);
        let mut surface = Surface::new(40, 100);
        Renderer::new(RenderStyle::default()).render_natural(&mut surface, &modified);
        let p = defaults::POSITIVE;
        let n = defaults::NEGATIVE;
        assert_eq!(surface.pixel(5, 30), Some([p.r, p.g, p.b, 255]));
        assert_eq!(surface.pixel(25, 70), Some([n.r, n.g, n.b, 255]));
    }
}
