//! The editable envelope pair.
//!
//! `positive` and `negative` are index-aligned with the session's samples.
//! Despite the names, neither array is sign-constrained: drawing routes
//! each written value by its own sign, so after a zero-crossing drag a
//! slot holds whatever same-signed value was written there last.

use crate::project::EnvelopeData;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvelopePair {
    pub positive: Vec<f64>,
    pub negative: Vec<f64>,
}

/// Which of the two arrays a value is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// `>= 0` routes to positive, everything else to negative.
    pub fn of(value: f64) -> Self {
        if value >= 0.0 { Polarity::Positive } else { Polarity::Negative }
    }
}

impl EnvelopePair {
    pub fn new(positive: Vec<f64>, negative: Vec<f64>) -> Self {
        EnvelopePair { positive, negative }
    }

    pub fn zeros(len: usize) -> Self {
        EnvelopePair::new(vec![0.0; len], vec![0.0; len])
    }

    /// Pad with zeros or truncate both arrays to exactly `len`.
    pub fn reconciled(mut self, len: usize) -> Self {
        self.positive.resize(len, 0.0);
        self.negative.resize(len, 0.0);
        self
    }

    pub fn is_aligned(&self, len: usize) -> bool {
        self.positive.len() == len && self.negative.len() == len
    }

    pub fn positive_at(&self, index: usize) -> f64 {
        self.positive.get(index).copied().unwrap_or(0.0)
    }

    pub fn negative_at(&self, index: usize) -> f64 {
        self.negative.get(index).copied().unwrap_or(0.0)
    }

    pub fn at(&self, polarity: Polarity, index: usize) -> f64 {
        match polarity {
            Polarity::Positive => self.positive_at(index),
            Polarity::Negative => self.negative_at(index),
        }
    }

    /// Write `value` into the array matching its sign. Out-of-range is a no-op.
    pub fn write_routed(&mut self, index: usize, value: f64) {
        let target = match Polarity::of(value) {
            Polarity::Positive => &mut self.positive,
            Polarity::Negative => &mut self.negative,
        };
        if let Some(slot) = target.get_mut(index) {
            *slot = value;
        }
    }

    pub fn to_data(&self) -> EnvelopeData {
        EnvelopeData {
            positive: self.positive.clone(),
            negative: self.negative.clone(),
        }
    }
}

impl From<EnvelopeData> for EnvelopePair {
    fn from(data: EnvelopeData) -> Self {
        EnvelopePair::new(data.positive, data.negative)
    }
}
