//! Immutable mono sample buffer.

/// The loaded audio: mono samples in [-1, 1] and their sample rate.
///
/// Created once per editing session and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    data: Vec<f64>,
    sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(data: Vec<f64>, sample_rate: u32) -> Self {
        SampleBuffer { data, sample_rate }
    }

    /// Scale so the largest magnitude becomes 1. Silent buffers are left as-is.
    pub fn normalized(mut self) -> Self {
        let peak = self.data.iter().fold(0.0f64, |m, s| m.max(s.abs()));
        if peak > 0.0 {
            for s in &mut self.data {
                *s /= peak;
            }
        }
        self
    }

    pub fn samples(&self) -> &[f64] {
        &self.data
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Sample at `index`, or 0 past the end.
    pub fn at(&self, index: usize) -> f64 {
        self.data.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Playback length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f64 / self.sample_rate as f64
    }

    pub fn to_f32(&self) -> Vec<f32> {
        self.data.iter().map(|&s| s as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_f32() {
        let buf = SampleBuffer::new(vec![0.0, 0.5, -1.0], 8000);
        assert_eq!(buf.to_f32(), vec![0.0f32, 0.5, -1.0]);
        assert_eq!(buf.sample_rate(), 8000);
    }

    #[test]
    fn normalize_to_unit_peak() {
        let buf = SampleBuffer::new(vec![0.1, -0.4, 0.2], 100).normalized();
        assert!((buf.at(1) + 1.0).abs() < 1e-12);
        assert!((buf.at(0) - 0.25).abs() < 1e-12);

        let silent = SampleBuffer::new(vec![0.0; 4], 100).normalized();
        assert!(silent.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn reads_past_end_as_zero() {
        let buf = SampleBuffer::new(vec![0.3], 100);
        assert_eq!(buf.at(0), 0.3);
        assert_eq!(buf.at(5), 0.0);
        assert!((buf.duration() - 0.01).abs() < 1e-12);
    }
}
