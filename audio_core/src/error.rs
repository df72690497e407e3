use thiserror::Error;

/// Audio decoding and assembly error types
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unsupported audio encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("malformed audio payload: {0}")]
    MalformedPayload(String),

    #[error("no audio segments provided")]
    EmptyAssembly,

    #[error("segment sample rate mismatch: expected {expected} Hz, got {got} Hz")]
    SampleRateMismatch { expected: u32, got: u32 },

    #[error("WAV encoding error: {0}")]
    WavEncode(#[from] hound::Error),
}
