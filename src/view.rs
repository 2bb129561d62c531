//! Zoom/pan state and the pixel ↔ sample ↔ amplitude mapping.
//!
//! Input and render paths share the same scale factors so that
//! `pointer_to_index(index_to_x(i) + δ) == i` for any `δ` inside the
//! sample's pixel span.

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;
pub const ZOOM_STEP: f64 = 0.1;
pub const PAN_STEP: f64 = 100.0;
/// Fraction of the half-height used by full-scale amplitude.
pub const AMPLITUDE_HEADROOM: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    zoom: f64,
    pan: f64,
    num_samples: usize,
    width: f64,
    height: f64,
}

impl ViewTransform {
    pub fn new(num_samples: usize, width: f64, height: f64) -> Self {
        ViewTransform {
            zoom: 1.0,
            pan: 0.0,
            num_samples,
            width,
            height,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> f64 {
        self.pan
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    // ── Zoom / Pan ──────────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// Largest allowed pan offset: `max(0, N - 100)`.
    pub fn max_pan(&self) -> f64 {
        (self.num_samples as f64 - PAN_STEP).max(0.0)
    }

    pub fn set_pan(&mut self, pan: f64) {
        self.pan = pan.clamp(0.0, self.max_pan());
    }

    pub fn pan_left(&mut self) {
        self.set_pan(self.pan - PAN_STEP);
    }

    pub fn pan_right(&mut self) {
        self.set_pan(self.pan + PAN_STEP);
    }

    pub fn reset_pan(&mut self) {
        self.pan = 0.0;
    }

    // ── Scales ──────────────────────────────────────────────

    /// Samples per pixel on the input path.
    pub fn input_scale(&self) -> f64 {
        self.num_samples as f64 / (self.width * self.zoom)
    }

    /// Pixels per sample on the render path.
    pub fn render_scale(&self) -> f64 {
        (self.width * self.zoom) / self.num_samples as f64
    }

    pub fn center_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Pixels per unit of amplitude.
    pub fn amplitude_scale(&self) -> f64 {
        self.center_y() * AMPLITUDE_HEADROOM
    }

    // ── Input path ──────────────────────────────────────────

    /// Whether a pointer position lies on the surface.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width && y >= 0.0 && y < self.height
    }

    /// Sample index under pixel column `x`, or `None` when outside `[0, N)`.
    pub fn pointer_to_index(&self, x: f64) -> Option<usize> {
        if self.num_samples == 0 || self.width <= 0.0 {
            return None;
        }
        let idx = ((x + self.pan) * self.input_scale()).floor();
        if !idx.is_finite() || idx < 0.0 || idx >= self.num_samples as f64 {
            return None;
        }
        Some(idx as usize)
    }

    /// Signed amplitude at pixel row `y`. Unclamped: rows near the edges
    /// map beyond ±1.
    pub fn pointer_to_amplitude(&self, y: f64) -> f64 {
        let scale = self.amplitude_scale();
        if scale <= 0.0 {
            return 0.0;
        }
        (self.center_y() - y) / scale
    }

    // ── Render path ─────────────────────────────────────────

    pub fn index_to_x(&self, index: usize) -> f64 {
        index as f64 * self.render_scale() - self.pan
    }

    pub fn value_to_y(&self, value: f64) -> f64 {
        self.center_y() - value * self.amplitude_scale()
    }

    /// Whether a render-path x coordinate falls in the drawn range `[0, width]`.
    pub fn is_visible(&self, x: f64) -> bool {
        x >= 0.0 && x <= self.width
    }
}
