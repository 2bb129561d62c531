//! Software RGBA8 raster surface.
//!
//! Strokes are drawn by clipping each segment to the surface, stepping along
//! it one pixel at a time, and stamping a square brush of the stroke width.
//! Covered pixels are then alpha-blended over the existing contents.

use crate::color::Rgba;
use crate::error::ExportError;

/// A 2D point in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// A list of polylines; each inner list is drawn as one connected run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub subpaths: Vec<Vec<Point>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) {
        self.subpaths.push(vec![p]);
    }

    /// Extend the current run, starting one if none is open.
    pub fn line_to(&mut self, p: Point) {
        match self.subpaths.last_mut() {
            Some(run) => run.push(p),
            None => self.subpaths.push(vec![p]),
        }
    }
}

/// Stroke colour and width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// A transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Surface {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, alpha]);
        }
    }

    /// Source-over blend of `color` onto one pixel. Off-surface is ignored.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let src_a = color.a.clamp(0.0, 1.0);
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let s = src[c] as f32;
            let d = self.pixels[i + c] as f32;
            self.pixels[i + c] = ((s * src_a + d * dst_a * (1.0 - src_a)) / out_a).round() as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Draw every run of `path` with `stroke`.
    ///
    /// Each pixel is blended at most once per call, so translucent strokes
    /// keep a uniform opacity where segments overlap.
    pub fn stroke_path(&mut self, path: &Path, stroke: Stroke) {
        let mut mask = Coverage::new(self.width, self.height);
        for run in &path.subpaths {
            match run.as_slice() {
                [] => {}
                [only] => mask.stamp(only.x, only.y, stroke.width),
                _ => {
                    for seg in run.windows(2) {
                        mask.segment(seg[0], seg[1], stroke.width);
                    }
                }
            }
        }
        for (i, hit) in mask.cells.iter().enumerate() {
            if *hit {
                let x = (i % self.width as usize) as i64;
                let y = (i / self.width as usize) as i64;
                self.blend_pixel(x, y, stroke.color);
            }
        }
    }

    /// Encode the current pixels as a PNG image.
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        if self.width == 0 || self.height == 0 {
            return Err(ExportError::SurfaceUnavailable);
        }
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| ExportError::Encode(e.to_string()))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
            writer.finish().map_err(|e| ExportError::Encode(e.to_string()))?;
        }
        Ok(out)
    }
}

/// Pixels touched by one stroke call.
struct Coverage {
    width: i64,
    height: i64,
    cells: Vec<bool>,
}

impl Coverage {
    fn new(width: u32, height: u32) -> Self {
        Coverage {
            width: width as i64,
            height: height as i64,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// Mark a `size`-pixel square centred on the pixel containing `(x, y)`.
    fn stamp(&mut self, x: f64, y: f64, size: f64) {
        let size = size.max(1.0);
        let in_reach = x >= -size
            && x <= self.width as f64 + size
            && y >= -size
            && y <= self.height as f64 + size;
        if !in_reach {
            return;
        }
        let extent = size.round() as i64;
        let x0 = x.floor() as i64 - (extent - 1) / 2;
        let y0 = y.floor() as i64 - (extent - 1) / 2;
        for py in y0.max(0)..(y0 + extent).min(self.height) {
            for px in x0.max(0)..(x0 + extent).min(self.width) {
                self.cells[(py * self.width + px) as usize] = true;
            }
        }
    }

    /// Stamp along the visible part of `a → b` at one-pixel intervals.
    fn segment(&mut self, a: Point, b: Point, size: f64) {
        let margin = size.max(1.0);
        let bounds = (-margin, self.width as f64 + margin, -margin, self.height as f64 + margin);
        let Some((a, b)) = clip_segment(a, b, bounds) else {
            return;
        };
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            self.stamp(a.x + dx * t, a.y + dy * t, size);
        }
    }
}

/// Liang–Barsky clip of `a → b` to `(x_min, x_max, y_min, y_max)`.
fn clip_segment(a: Point, b: Point, bounds: (f64, f64, f64, f64)) -> Option<(Point, Point)> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    let (x_min, x_max, y_min, y_max) = bounds;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, a.x - x_min), (dx, x_max - a.x), (-dy, a.y - y_min), (dy, y_max - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }
    }
    Some((
        Point::new(a.x + dx * t0, a.y + dy * t0),
        Point::new(a.x + dx * t1, a.y + dy * t1),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    #[test]
    fn fill_sets_every_pixel() {
        let mut s = Surface::new(3, 2);
        s.fill(Rgba::rgb(1, 2, 3));
        assert!(s.pixels().chunks(4).all(|px| px == [1, 2, 3, 255]));
    }

    #[test]
    fn horizontal_stroke_covers_row() {
        let mut s = Surface::new(10, 5);
        let mut path = Path::new();
        path.move_to(Point::new(1.0, 2.0));
        path.line_to(Point::new(8.0, 2.0));
        s.stroke_path(&path, Stroke { color: RED, width: 1.0 });
        for x in 1..=8 {
            assert_eq!(s.pixel(x, 2), Some([255, 0, 0, 255]), "x={x}");
        }
        assert_eq!(s.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(s.pixel(5, 4), Some([0, 0, 0, 0]));
    }

    #[test]
    fn translucent_overlap_blends_once() {
        let mut s = Surface::new(8, 8);
        s.fill(Rgba::rgb(0, 0, 0));
        let mut path = Path::new();
        path.move_to(Point::new(0.0, 4.0));
        path.line_to(Point::new(7.0, 4.0));
        path.line_to(Point::new(0.0, 4.0));
        s.stroke_path(&path, Stroke { color: Rgba::rgb(200, 200, 200).with_alpha(0.5), width: 1.0 });
        assert_eq!(s.pixel(3, 4), Some([100, 100, 100, 255]));
    }

    #[test]
    fn strokes_clip_at_edges() {
        let mut s = Surface::new(4, 4);
        let mut path = Path::new();
        path.move_to(Point::new(-10.0, -10.0));
        path.line_to(Point::new(20.0, 20.0));
        s.stroke_path(&path, Stroke { color: RED, width: 3.0 });
        assert_eq!(s.pixel(2, 2), Some([255, 0, 0, 255]));
    }

    #[test]
    fn clip_rejects_outside_segments() {
        let bounds = (0.0, 10.0, 0.0, 10.0);
        assert!(clip_segment(Point::new(-5.0, -5.0), Point::new(-1.0, 20.0), bounds).is_none());
        let (a, b) = clip_segment(Point::new(-10.0, 5.0), Point::new(20.0, 5.0), bounds).unwrap();
        assert!(a.x.abs() < 1e-9 && (a.y - 5.0).abs() < 1e-9);
        assert!((b.x - 10.0).abs() < 1e-9 && (b.y - 5.0).abs() < 1e-9);
        assert!(clip_segment(Point::new(f64::NAN, 0.0), Point::new(1.0, 1.0), bounds).is_none());
    }

    #[test]
    fn png_signature_and_size() {
        let mut s = Surface::new(16, 9);
        s.fill(RED);
        let png = s.encode_png().unwrap();
        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 16);
        assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 9);
    }

    #[test]
    fn empty_surface_cannot_export() {
        assert!(matches!(Surface::new(0, 10).encode_png(), Err(ExportError::SurfaceUnavailable)));
    }
}
