//! Generation core: the transcript-to-audio pipeline and the remote
//! provider it drives.
//!
//! The pipeline turns a multi-speaker transcript into persisted audio
//! segments and an assembled track, reporting progress through a typed
//! event stream. Turns run strictly in transcript order; the provider call
//! and retry sleeps are the only suspension points.

pub mod error;
pub mod naming;
pub mod persona;
pub mod pipeline;
pub mod provider;
pub mod segmenter;
pub mod synthesizer;
pub mod transcript;

pub use error::{PipelineError, SegmenterError};
pub use persona::{PersonaDescriptor, VoiceMapping};
pub use pipeline::{AudioPipeline, PipelineConfig, PipelineEvent, Progress, SegmentRef};
pub use provider::{AudioPayload, GeminiClient, ProviderError, SpeechProvider};
pub use segmenter::{segment_transcript, Turn};
pub use synthesizer::{RetryPolicy, SegmentSynthesizer};
pub use transcript::{ConceptRequest, TranscriptError, TranscriptGenerator};
