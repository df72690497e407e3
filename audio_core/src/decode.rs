//! Provider payload decoding.
//!
//! The remote service tags each audio payload with a mime-style encoding
//! string. Decoding dispatches on that tag: raw 16-bit PCM is built
//! directly from the bytes, container formats go through a symphonia
//! probe, and unrecognized tags get one best-effort probe before being
//! rejected. Decoding failures are terminal — they are never retried the
//! way an empty provider response is.

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::probe::Hint;

use crate::buffer::AudioBuffer;
use crate::error::AudioError;

/// Sample rate assumed for PCM payloads whose tag carries no `rate=` parameter.
pub const DEFAULT_PCM_RATE: u32 = 24_000;

/// Audio encoding declared by the provider's payload tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEncoding {
    /// Raw little-endian 16-bit PCM, mono, e.g. `audio/L16;codec=pcm;rate=24000`.
    PcmL16 { rate: u32 },
    /// A container format the audio subsystem can parse (WAV, MP3).
    Container { tag: String },
    /// Anything else; gets one best-effort decode attempt.
    Unknown { tag: String },
}

impl AudioEncoding {
    /// Parse a provider encoding tag such as `audio/L16;codec=pcm;rate=24000`.
    pub fn parse(tag: &str) -> Self {
        let mut params = tag.split(';').map(str::trim);
        let base = params.next().unwrap_or("").to_ascii_lowercase();
        match base.as_str() {
            "audio/l16" => {
                let rate = params
                    .filter_map(|p| p.strip_prefix("rate="))
                    .find_map(|r| r.parse().ok())
                    .unwrap_or(DEFAULT_PCM_RATE);
                AudioEncoding::PcmL16 { rate }
            }
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/mpeg" | "audio/mp3" => {
                AudioEncoding::Container {
                    tag: tag.to_string(),
                }
            }
            _ => AudioEncoding::Unknown {
                tag: tag.to_string(),
            },
        }
    }
}

/// Decode a provider audio payload into a buffer.
pub fn decode_payload(data: &[u8], tag: &str) -> Result<AudioBuffer, AudioError> {
    match AudioEncoding::parse(tag) {
        AudioEncoding::PcmL16 { rate } => decode_pcm_l16(data, rate),
        AudioEncoding::Container { tag } => decode_with_symphonia(data, Some(&tag)),
        AudioEncoding::Unknown { tag } => {
            tracing::debug!(%tag, "unrecognized audio encoding, attempting generic decode");
            decode_with_symphonia(data, None)
                .map_err(|_| AudioError::UnsupportedEncoding(tag))
        }
    }
}

/// Raw PCM: little-endian 16-bit mono samples at the tagged rate.
fn decode_pcm_l16(data: &[u8], rate: u32) -> Result<AudioBuffer, AudioError> {
    if data.len() % 2 != 0 {
        return Err(AudioError::MalformedPayload(
            "odd byte count for 16-bit PCM".to_string(),
        ));
    }
    let samples = data
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
        .collect();
    Ok(AudioBuffer::new(samples, rate, 1))
}

fn convert_channel<T>(
    samples: &mut Vec<f32>,
    data: std::borrow::Cow<symphonia::core::audio::AudioBuffer<T>>,
) where
    T: symphonia::core::sample::Sample,
    f32: symphonia::core::conv::FromSample<T>,
{
    use symphonia::core::conv::FromSample;
    samples.extend(data.chan(0).iter().map(|v| f32::from_sample(*v)))
}

/// Decode a container payload through symphonia's format probe, taking the
/// first channel of the first decodable track.
fn decode_with_symphonia(data: &[u8], mime: Option<&str>) -> Result<AudioBuffer, AudioError> {
    let cursor = std::io::Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    if let Some(mime) = mime {
        hint.mime_type(mime);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &Default::default(), &Default::default())
        .map_err(|e| AudioError::MalformedPayload(format!("container probe failed: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::MalformedPayload("no decodable audio track".to_string()))?;
    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(DEFAULT_PCM_RATE);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::MalformedPayload(format!("unsupported codec: {e}")))?;

    let mut samples = Vec::new();
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::MalformedPayload(format!("decode failed: {e}")))?;
        match decoded {
            AudioBufferRef::F32(buf) => samples.extend(buf.chan(0)),
            AudioBufferRef::U8(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::U16(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::U24(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::U32(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::S8(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::S16(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::S24(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::S32(buf) => convert_channel(&mut samples, buf),
            AudioBufferRef::F64(buf) => convert_channel(&mut samples, buf),
        }
    }

    if samples.is_empty() {
        return Err(AudioError::MalformedPayload(
            "container held no samples".to_string(),
        ));
    }
    Ok(AudioBuffer::new(samples, sample_rate, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_wav;

    #[test]
    fn parses_pcm_tag_with_rate() {
        let enc = AudioEncoding::parse("audio/L16;codec=pcm;rate=24000");
        assert_eq!(enc, AudioEncoding::PcmL16 { rate: 24_000 });
    }

    #[test]
    fn pcm_tag_defaults_rate() {
        let enc = AudioEncoding::parse("audio/L16");
        assert_eq!(enc, AudioEncoding::PcmL16 { rate: DEFAULT_PCM_RATE });
    }

    #[test]
    fn parses_container_tags() {
        assert!(matches!(
            AudioEncoding::parse("audio/wav"),
            AudioEncoding::Container { .. }
        ));
        assert!(matches!(
            AudioEncoding::parse("audio/mpeg"),
            AudioEncoding::Container { .. }
        ));
    }

    #[test]
    fn unrecognized_tag_is_unknown() {
        assert!(matches!(
            AudioEncoding::parse("application/octet-stream"),
            AudioEncoding::Unknown { .. }
        ));
    }

    #[test]
    fn decodes_pcm_l16_bytes() {
        // 0x4000 = 16384 -> 0.5, 0xC000 = -16384 -> -0.5
        let data = [0x00u8, 0x40, 0x00, 0xC0];
        let buf = decode_payload(&data, "audio/L16;rate=24000").unwrap();
        assert_eq!(buf.sample_rate, 24_000);
        assert_eq!(buf.channels, 1);
        assert!((buf.samples[0] - 0.5).abs() < 1e-4);
        assert!((buf.samples[1] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn odd_pcm_payload_is_malformed() {
        let result = decode_payload(&[0x00, 0x40, 0x00], "audio/L16");
        assert!(matches!(result, Err(AudioError::MalformedPayload(_))));
    }

    #[test]
    fn decodes_wav_container() {
        let original = AudioBuffer::new(vec![0.25, -0.25, 0.5, 0.0], 22_050, 1);
        let bytes = encode_wav(&original).unwrap();

        let decoded = decode_payload(&bytes, "audio/wav").unwrap();
        assert_eq!(decoded.sample_rate, 22_050);
        assert_eq!(decoded.samples.len(), 4);
        assert!((decoded.samples[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn garbage_with_unknown_tag_is_unsupported() {
        let result = decode_payload(&[0xDE, 0xAD, 0xBE, 0xEF], "application/x-mystery");
        assert!(matches!(result, Err(AudioError::UnsupportedEncoding(tag)) if tag == "application/x-mystery"));
    }

    #[test]
    fn garbage_with_container_tag_is_malformed() {
        let result = decode_payload(&[0xDE, 0xAD, 0xBE, 0xEF], "audio/wav");
        assert!(matches!(result, Err(AudioError::MalformedPayload(_))));
    }
}
