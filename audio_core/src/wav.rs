use std::io::Cursor;

use crate::buffer::AudioBuffer;
use crate::error::AudioError;

/// Encode a buffer as 16-bit PCM WAV bytes.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: buffer.channels.max(1),
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    // WAV header (44 bytes) + 2 bytes per sample
    let mut cursor = Cursor::new(Vec::<u8>::with_capacity(44 + buffer.samples.len() * 2));
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &s in &buffer.samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_roundtrip_preserves_shape() {
        let buf = AudioBuffer::new(vec![0.0, 0.5, -0.5, 0.25], 24_000, 1);
        let bytes = encode_wav(&buf).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn samples_survive_within_quantization() {
        let buf = AudioBuffer::new(vec![0.5, -0.25], 24_000, 1);
        let bytes = encode_wav(&buf).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.unwrap() as f32 / 32768.0)
            .collect();
        assert!((decoded[0] - 0.5).abs() < 1e-3);
        assert!((decoded[1] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let buf = AudioBuffer::new(vec![2.0, -2.0], 24_000, 1);
        let bytes = encode_wav(&buf).unwrap();

        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded[0], i16::MAX);
        assert_eq!(decoded[1], -i16::MAX);
    }
}
