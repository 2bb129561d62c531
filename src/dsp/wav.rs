//! WAV encoding and decoding for session audio.

use std::io::Cursor;

use super::sample_buffer::SampleBuffer;
use crate::error::{ExportError, LoadError};

/// Encode a buffer as mono 16-bit PCM WAV bytes.
///
/// Samples are clipped to [-1, 1] and scaled by 32767.
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, ExportError> {
    if buffer.sample_rate() == 0 {
        return Err(ExportError::Encode("sample rate is 0".to_string()));
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + buffer.len() * 2));
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| ExportError::Encode(e.to_string()))?;
        for &sample in buffer.samples() {
            let pcm = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
        writer.finalize().map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

/// Decode WAV bytes into a peak-normalised mono buffer.
/// Multi-channel audio is averaged down to one channel.
pub fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer, LoadError> {
    let mut reader =
        hound::WavReader::new(Cursor::new(bytes)).map_err(|e| LoadError::Decode(e.to_string()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<Vec<f64>, hound::Error>>(),
        hound::SampleFormat::Int => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<Vec<f64>, hound::Error>>(),
    }
    .map_err(|e| LoadError::Decode(e.to_string()))?;

    let mono: Vec<f64> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
        .collect();

    Ok(SampleBuffer::new(mono, spec.sample_rate).normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_valid() {
        let wav = encode_wav(&SampleBuffer::new(vec![0.0, 0.5, -0.5], 44100)).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");

        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 1);
        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);
    }

    #[test]
    fn clips_out_of_range_samples() {
        let wav = encode_wav(&SampleBuffer::new(vec![2.0, -3.0], 8000)).unwrap();
        let decoded = hound::WavReader::new(Cursor::new(&wav[..]))
            .unwrap()
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(decoded, vec![32767, -32767]);
    }

    #[test]
    fn decodes_stereo_to_normalised_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in [1000i16, 3000, -2000, -2000, 0, 0] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }

        let buf = decode_wav(&cursor.into_inner()).unwrap();
        assert_eq!(buf.sample_rate(), 22050);
        assert_eq!(buf.len(), 3);
        assert!((buf.at(0) - 1.0).abs() < 1e-12);
        assert!((buf.at(1) + 1.0).abs() < 1e-12);
        assert_eq!(buf.at(2), 0.0);
    }

    #[test]
    fn zero_rate_is_an_encode_error() {
        let result = encode_wav(&SampleBuffer::new(vec![0.1, 0.2], 0));
        assert!(matches!(result, Err(ExportError::Encode(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_wav(b"not a wav"), Err(LoadError::Decode(_))));
    }
}
