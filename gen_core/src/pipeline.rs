//! Pipeline orchestrator and its event stream.
//!
//! One run drives: segmentation, then per turn resolve → synthesize →
//! normalize → persist, then assembly for multi-turn requests. Events are
//! yielded in strict turn order; the first unrecoverable failure emits an
//! `error` event and ends the stream. Dropping the stream (a disconnected
//! caller) abandons remaining turns; already-persisted segments stay on
//! disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_stream::stream;
use futures::Stream;
use serde::Serialize;
use tracing::{error, info};

use audio_core::{concatenate, encode_wav, normalize, AssemblyConfig, AudioBuffer};

use crate::error::PipelineError;
use crate::naming::{sanitize_filename, unique_run_id};
use crate::persona::{resolve, VoiceMapping};
use crate::provider::SpeechProvider;
use crate::segmenter::segment_transcript;
use crate::synthesizer::{RetryPolicy, SegmentSynthesizer};

/// Where and how a pipeline run persists and shapes its audio.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for generated audio. Event paths are relative to this
    /// root so the file-serving boundary stays stable.
    pub audio_root: PathBuf,
    pub target_dbfs: f64,
    pub assembly: AssemblyConfig,
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    pub fn new(audio_root: impl Into<PathBuf>) -> Self {
        Self {
            audio_root: audio_root.into(),
            target_dbfs: audio_core::DEFAULT_TARGET_DBFS,
            assembly: AssemblyConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
    pub percentage: f64,
}

impl Progress {
    fn at(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            current as f64 / total as f64 * 100.0
        };
        Self {
            current,
            total,
            percentage,
        }
    }
}

/// Reference to one persisted segment; `path` is relative to the audio root.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRef {
    pub speaker: String,
    pub path: String,
    pub duration: Option<f64>,
}

/// Typed pipeline event reported to the caller over a push channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Progress {
        stage: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        speaker: Option<String>,
        progress: Progress,
    },
    SegmentComplete {
        stage: String,
        speaker: String,
        segment_path: String,
        duration: Option<f64>,
        progress: Progress,
    },
    Error {
        stage: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        speaker: Option<String>,
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        progress: Option<Progress>,
    },
    Complete {
        stage: String,
        message: String,
        segments: Vec<SegmentRef>,
        #[serde(skip_serializing_if = "Option::is_none")]
        track_path: Option<String>,
        progress: Progress,
    },
}

impl PipelineEvent {
    /// Event name used as the SSE `event:` field.
    pub fn event_name(&self) -> &'static str {
        match self {
            PipelineEvent::Progress { .. } => "progress",
            PipelineEvent::SegmentComplete { .. } => "segment_complete",
            PipelineEvent::Error { .. } => "error",
            PipelineEvent::Complete { .. } => "complete",
        }
    }
}

/// Drives one generation run end to end.
pub struct AudioPipeline<P> {
    provider: Arc<P>,
    config: PipelineConfig,
}

impl<P> Clone for AudioPipeline<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: SpeechProvider + 'static> AudioPipeline<P> {
    pub fn new(provider: Arc<P>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// Multi-turn generation. Consumes the pipeline handle so the returned
    /// stream is `'static`; turns are processed sequentially in transcript
    /// order.
    pub fn generate(
        self,
        transcript: String,
        mappings: HashMap<String, VoiceMapping>,
    ) -> impl Stream<Item = PipelineEvent> + Send {
        stream! {
            let run_id = unique_run_id();
            info!(run_id = %run_id, "starting audio generation run");

            let turns = match segment_transcript(&transcript) {
                Ok(turns) => turns,
                Err(e) => {
                    error!(run_id = %run_id, "segmentation failed: {e}");
                    yield PipelineEvent::Error {
                        stage: "generation_failed".to_string(),
                        speaker: None,
                        error: e.to_string(),
                        progress: None,
                    };
                    return;
                }
            };
            let total = turns.len();
            let synthesizer = SegmentSynthesizer::new(self.provider.clone(), self.config.retry);

            let mut segments: Vec<SegmentRef> = Vec::new();
            let mut buffers: Vec<AudioBuffer> = Vec::new();

            for turn in &turns {
                let current = turn.index + 1;
                let progress = Progress::at(current, total);

                let mapping = match resolve(&turn.speaker, current, &mappings) {
                    Ok(mapping) => mapping,
                    Err(e) => {
                        error!(run_id = %run_id, speaker = %turn.speaker, "turn {current} failed: {e}");
                        yield PipelineEvent::Error {
                            stage: "segment_failed".to_string(),
                            speaker: Some(turn.speaker.clone()),
                            error: e.to_string(),
                            progress: Some(progress),
                        };
                        return;
                    }
                };

                yield PipelineEvent::Progress {
                    stage: "generating".to_string(),
                    message: format!("Generating audio for {}", turn.speaker),
                    speaker: Some(turn.speaker.clone()),
                    progress: progress.clone(),
                };

                match self
                    .render_turn(&synthesizer, &run_id, mapping, &turn.speaker, &turn.text, current)
                    .await
                {
                    Ok((buffer, path)) => {
                        let duration = buffer.duration;
                        yield PipelineEvent::SegmentComplete {
                            stage: "segment_generated".to_string(),
                            speaker: turn.speaker.clone(),
                            segment_path: path.clone(),
                            duration,
                            progress: progress.clone(),
                        };
                        segments.push(SegmentRef {
                            speaker: turn.speaker.clone(),
                            path,
                            duration,
                        });
                        buffers.push(buffer);
                    }
                    Err(e) => {
                        error!(run_id = %run_id, speaker = %turn.speaker, "turn {current} failed: {e}");
                        yield PipelineEvent::Error {
                            stage: "segment_failed".to_string(),
                            speaker: Some(turn.speaker.clone()),
                            error: e.to_string(),
                            progress: Some(progress),
                        };
                        return;
                    }
                }
            }

            let mut track_path = None;
            if buffers.len() > 1 {
                yield PipelineEvent::Progress {
                    stage: "assembling".to_string(),
                    message: "Combining segments into final track".to_string(),
                    speaker: None,
                    progress: Progress::at(total, total),
                };
                match self.assemble_track(&run_id, &buffers).await {
                    Ok(path) => track_path = Some(path),
                    Err(e) => {
                        error!(run_id = %run_id, "assembly failed: {e}");
                        yield PipelineEvent::Error {
                            stage: "generation_failed".to_string(),
                            speaker: None,
                            error: e.to_string(),
                            progress: Some(Progress::at(total, total)),
                        };
                        return;
                    }
                }
            }

            info!(run_id = %run_id, segments = segments.len(), "audio generation complete");
            yield PipelineEvent::Complete {
                stage: "generation_complete".to_string(),
                message: "Audio generation complete".to_string(),
                segments,
                track_path,
                progress: Progress::at(total, total),
            };
        }
    }

    /// Single-segment generation: no assembly, the normalized segment is
    /// the artifact.
    pub fn generate_single(
        self,
        speaker: String,
        text: String,
        mapping: VoiceMapping,
    ) -> impl Stream<Item = PipelineEvent> + Send {
        stream! {
            let run_id = unique_run_id();
            info!(run_id = %run_id, speaker = %speaker, "starting single-segment run");
            let synthesizer = SegmentSynthesizer::new(self.provider.clone(), self.config.retry);

            yield PipelineEvent::Progress {
                stage: "generating".to_string(),
                message: format!("Generating audio for {speaker}"),
                speaker: Some(speaker.clone()),
                progress: Progress::at(0, 1),
            };
            yield PipelineEvent::Progress {
                stage: "processing".to_string(),
                message: format!("Processing audio for {speaker}"),
                speaker: Some(speaker.clone()),
                progress: Progress {
                    current: 0,
                    total: 1,
                    percentage: 50.0,
                },
            };

            match self
                .render_turn(&synthesizer, &run_id, &mapping, &speaker, &text, 1)
                .await
            {
                Ok((buffer, path)) => {
                    let duration = buffer.duration;
                    yield PipelineEvent::SegmentComplete {
                        stage: "segment_generated".to_string(),
                        speaker: speaker.clone(),
                        segment_path: path.clone(),
                        duration,
                        progress: Progress::at(1, 1),
                    };
                    yield PipelineEvent::Complete {
                        stage: "generation_complete".to_string(),
                        message: "Audio generation complete".to_string(),
                        segments: vec![SegmentRef {
                            speaker: speaker.clone(),
                            path,
                            duration,
                        }],
                        track_path: None,
                        progress: Progress::at(1, 1),
                    };
                }
                Err(e) => {
                    error!(run_id = %run_id, speaker = %speaker, "segment failed: {e}");
                    yield PipelineEvent::Error {
                        stage: "segment_failed".to_string(),
                        speaker: Some(speaker.clone()),
                        error: e.to_string(),
                        progress: Some(Progress::at(0, 1)),
                    };
                }
            }
        }
    }

    /// Synthesize, normalize and persist one turn. Returns the normalized
    /// buffer and its path relative to the audio root.
    async fn render_turn(
        &self,
        synthesizer: &SegmentSynthesizer<P>,
        run_id: &str,
        mapping: &VoiceMapping,
        speaker: &str,
        text: &str,
        turn: usize,
    ) -> Result<(AudioBuffer, String), PipelineError> {
        let style = mapping.config.style_prompt();
        let raw = synthesizer
            .synthesize(&style, text, &mapping.voice, speaker, turn)
            .await?;
        let normalized = normalize(&raw, self.config.target_dbfs);
        let relative = self.persist_segment(run_id, speaker, &normalized).await?;
        Ok((normalized, relative))
    }

    /// Write one segment under `segments/` with a run-scoped unique name.
    async fn persist_segment(
        &self,
        run_id: &str,
        speaker: &str,
        buffer: &AudioBuffer,
    ) -> Result<String, PipelineError> {
        let dir = self.config.audio_root.join("segments");
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!(
            "audio_{}_{}_{}.wav",
            run_id,
            sanitize_filename(speaker),
            uuid::Uuid::new_v4().simple()
        );
        let bytes = encode_wav(buffer)?;
        tokio::fs::write(dir.join(&filename), bytes).await?;
        Ok(format!("segments/{filename}"))
    }

    async fn assemble_track(
        &self,
        run_id: &str,
        buffers: &[AudioBuffer],
    ) -> Result<String, PipelineError> {
        let track = concatenate(buffers, self.config.assembly)?;
        let filename = format!("podcast_{run_id}.wav");
        let bytes = encode_wav(&track)?;
        tokio::fs::create_dir_all(&self.config.audio_root).await?;
        tokio::fs::write(self.config.audio_root.join(&filename), bytes).await?;
        Ok(filename)
    }
}
