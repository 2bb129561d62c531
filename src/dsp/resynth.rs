//! Resynthesis: rebuild a signal from the original samples and the
//! edited envelope pair.
//!
//! Each output sample takes its value from the positive envelope when the
//! original sample is above zero, and from the negative envelope otherwise.
//! The result is clamped to [-1, 1].

use super::sample_buffer::SampleBuffer;
use crate::envelope::EnvelopePair;

/// Resynthesize a modified buffer at the source sample rate.
///
/// Pure function of its inputs; envelope slots past the end read as 0.
pub fn resynthesize(source: &SampleBuffer, envelopes: &EnvelopePair) -> SampleBuffer {
    let modified: Vec<f64> = source
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &sample)| {
            let value = if sample > 0.0 {
                envelopes.positive_at(i)
            } else {
                envelopes.negative_at(i)
            };
            clamp_unit(value)
        })
        .collect();

    SampleBuffer::new(modified, source.sample_rate())
}

/// Clamp to [-1, 1]; NaN becomes silence.
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) }
}
