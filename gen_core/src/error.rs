use thiserror::Error;

use crate::provider::ProviderError;

/// Transcript segmentation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmenterError {
    #[error("transcript contains no speaker turns")]
    EmptyTranscript,
}

/// Errors surfaced by the audio generation pipeline. Any of these aborts
/// the whole run; the pipeline never skips a failed turn.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Segmenter(#[from] SegmenterError),

    #[error("no voice mapping found for speaker: {speaker}")]
    UnmappedSpeaker { speaker: String, turn: usize },

    #[error("no candidates for {speaker} (turn {turn}) after {attempts} attempts")]
    SynthesisExhausted {
        speaker: String,
        turn: usize,
        attempts: u32,
    },

    #[error(transparent)]
    Audio(#[from] audio_core::AudioError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("failed to persist segment: {0}")]
    Persistence(#[from] std::io::Error),
}
