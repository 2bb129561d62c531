//! DSP — sample storage, synthetic waves, resynthesis, and WAV I/O.
//!
//! Everything here is synchronous and operates on whole buffers; the same
//! code serves the browser bindings and native hosts.

pub mod oscillator;
pub mod resynth;
pub mod sample_buffer;
pub mod wav;
