//! RGBA colours for layer strokes and backgrounds.

use crate::error::ConfigError;

/// An 8-bit RGB colour with a fractional alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Rgba { a, ..self }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, ConfigError> {
        let hex = text.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ConfigError::InvalidColor(text.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ConfigError::InvalidColor(text.to_string()))
        };
        Ok(Rgba::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Parse a hex colour, falling back to `default` when absent or malformed.
    pub fn from_hex_or(text: Option<&str>, default: Rgba) -> Self {
        match text {
            Some(t) => Rgba::from_hex(t).unwrap_or_else(|_| {
                log::warn!("ignoring malformed color {t:?}");
                default
            }),
            None => default,
        }
    }

    /// CSS colour string, `#rrggbb` when opaque and `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

/// Default colours used when the project leaves a slot empty.
pub mod defaults {
    use super::Rgba;

    pub const BACKGROUND: Rgba = Rgba::rgb(0x00, 0x00, 0x00);
    pub const POSITIVE: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
    pub const NEGATIVE: Rgba = Rgba::rgb(0xef, 0x44, 0x44);
    pub const WAVEFORM: Rgba = Rgba::rgb(64, 128, 255).with_alpha(0.35);
    pub const OVERVIEW: Rgba = Rgba::rgb(0x3b, 0x82, 0xf6);
}
