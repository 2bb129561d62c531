//! Synthetic project waves.
//!
//! Shapes are ideal (not band-limited): synthetic projects are short,
//! exact-period signals that users draw over.

use std::f64::consts::PI;

use super::sample_buffer::SampleBuffer;
use crate::error::LoadError;
use crate::project::{WaveParameters, WaveType};

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Map a project wave type; uploaded audio has no waveform.
    pub fn from_wave_type(wave_type: WaveType) -> Option<Self> {
        match wave_type {
            WaveType::Sine => Some(Waveform::Sine),
            WaveType::Square => Some(Waveform::Square),
            WaveType::Triangle => Some(Waveform::Triangle),
            WaveType::Sawtooth => Some(Waveform::Sawtooth),
            WaveType::Uploaded => None,
        }
    }

    /// Value at `phase` in [0, 1).
    pub fn value(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (2.0 * PI * phase).sin(),
            // Sign of the sine, so exact zero crossings stay at 0.
            Waveform::Square => {
                let s = (2.0 * PI * phase).sin();
                if s > 0.0 {
                    1.0
                } else if s < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Waveform::Sawtooth => 2.0 * phase - 1.0,
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    3.0 - 4.0 * phase
                }
            }
        }
    }
}

/// Generate `spw * periods` samples of `waveform` at `freq * spw` Hz,
/// peak-normalised.
///
/// The phase of sample `k` is computed directly from `k` rather than
/// accumulated, so every period is identical. Fails when the sample count
/// overflows or the rate is not a whole number of Hz in `1..=u32::MAX`.
pub fn generate_wave(waveform: Waveform, params: WaveParameters) -> Result<SampleBuffer, LoadError> {
    let total = params
        .spw
        .checked_mul(params.periods)
        .ok_or_else(|| LoadError::InvalidWave(format!("{} x {} samples overflows", params.spw, params.periods)))?;
    let rate = params.freq * params.spw as f64;
    if !(1.0..=u32::MAX as f64).contains(&rate) {
        return Err(LoadError::InvalidWave(format!("sample rate {rate} Hz out of range")));
    }
    let sample_rate = rate as u32;

    let cycles_per_sample = params.freq / sample_rate as f64;
    let data: Vec<f64> = (0..total)
        .map(|k| waveform.value((k as f64 * cycles_per_sample).fract()))
        .collect();

    Ok(SampleBuffer::new(data, sample_rate).normalized())
}
