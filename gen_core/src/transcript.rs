//! Transcript generation and validation via the provider's text modality.
//!
//! Separate from the audio path: a single text request, no retry loop.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::provider::{GeminiClient, ProviderError};

/// Maximum allowed ratio between the most- and least-active speaker.
const PARTICIPATION_TOLERANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpertiseLevel {
    Beginner,
    Intermediate,
    Expert,
    Mixed,
}

impl ExpertiseLevel {
    pub fn description(&self) -> &'static str {
        match self {
            ExpertiseLevel::Beginner => {
                "using simple terms and basic concepts, making it accessible to newcomers"
            }
            ExpertiseLevel::Intermediate => {
                "balancing basic and advanced concepts, with some technical terminology"
            }
            ExpertiseLevel::Expert => {
                "using advanced concepts and technical terminology for a knowledgeable audience"
            }
            ExpertiseLevel::Mixed => {
                "varying the complexity to accommodate different knowledge levels"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatStyle {
    Casual,
    Interview,
    Debate,
    Educational,
    Storytelling,
}

impl FormatStyle {
    pub fn description(&self) -> &'static str {
        match self {
            FormatStyle::Casual => {
                "a relaxed, conversational style with natural back-and-forth dialogue"
            }
            FormatStyle::Interview => {
                "a structured interview format with clear questions and detailed responses"
            }
            FormatStyle::Debate => {
                "a balanced debate with different viewpoints and respectful disagreements"
            }
            FormatStyle::Educational => {
                "an informative discussion that breaks down complex topics clearly"
            }
            FormatStyle::Storytelling => {
                "an engaging narrative style that weaves information into a compelling story"
            }
        }
    }
}

/// Podcast concept supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptRequest {
    pub topic: String,
    pub num_speakers: usize,
    pub character_names: Vec<String>,
    pub expertise_level: ExpertiseLevel,
    pub duration_minutes: u32,
    pub format_style: FormatStyle,
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("number of speakers must match number of character names")]
    SpeakerCountMismatch,

    #[error("transcript format invalid; every line must start with a speaker name followed by ':' (offending line: {0:?})")]
    InvalidFormat(String),

    #[error("speakers missing from the transcript: {0}")]
    MissingSpeakers(String),

    #[error("speaker participation is too unbalanced")]
    UnbalancedParticipation,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Build the generation prompt for a podcast concept.
pub fn podcast_prompt(request: &ConceptRequest) -> String {
    let names = request.character_names.join(", ");
    format!(
        "Create a natural and engaging podcast transcript about {topic}.\n\n\
         Context:\n\
         - Format: {format}\n\
         - Expertise Level: {expertise}\n\
         - Duration: Aim for {minutes} minutes of spoken content\n\
         - Speakers: {names}\n\n\
         Requirements:\n\
         1. Each line must follow the exact format \"SpeakerName: Their dialogue text\", \
         one line per speaker turn, with no empty lines between speakers.\n\
         2. Speaker names must exactly match: {names}.\n\
         3. Start with a brief introduction of the speakers and topic, develop the \
         discussion naturally through {minutes} minutes, and end with clear takeaways.\n\
         4. Maintain distinct personalities and roughly equal speaking time per speaker.\n\n\
         Begin the transcript:",
        topic = request.topic,
        format = request.format_style.description(),
        expertise = request.expertise_level.description(),
        minutes = request.duration_minutes,
        names = names,
    )
}

/// Validate a generated transcript: every non-blank line must be
/// `Name: text` with a known speaker (matched case-sensitively), every
/// speaker must appear, and participation must stay within tolerance.
pub fn validate_transcript(transcript: &str, speakers: &[String]) -> Result<(), TranscriptError> {
    let lines: Vec<&str> = transcript
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let speaker_of = |line: &str| -> Option<&String> {
        speakers.iter().find(|name| {
            line.strip_prefix(name.as_str())
                .map(|rest| rest.trim_start().starts_with(':'))
                .unwrap_or(false)
        })
    };

    if let Some(bad) = lines.iter().find(|l| speaker_of(l).is_none()) {
        return Err(TranscriptError::InvalidFormat((*bad).to_string()));
    }

    let mut counts: HashMap<&String, usize> = HashMap::new();
    for line in &lines {
        if let Some(name) = speaker_of(line) {
            *counts.entry(name).or_default() += 1;
        }
    }

    let missing: Vec<&str> = speakers
        .iter()
        .filter(|s| !counts.contains_key(s))
        .map(|s| s.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(TranscriptError::MissingSpeakers(missing.join(", ")));
    }

    let min = counts.values().copied().min().unwrap_or(0);
    let max = counts.values().copied().max().unwrap_or(0);
    if max > min * PARTICIPATION_TOLERANCE {
        return Err(TranscriptError::UnbalancedParticipation);
    }

    Ok(())
}

/// Distinct speaker names in order of first appearance.
pub fn extract_speakers(transcript: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for line in transcript.lines() {
        if let Some((name, _)) = line.split_once(':') {
            let name = name.trim();
            if !name.is_empty() && !seen.iter().any(|s| s == name) {
                seen.push(name.to_string());
            }
        }
    }
    seen
}

/// Generates and validates podcast transcripts.
pub struct TranscriptGenerator {
    client: Arc<GeminiClient>,
}

impl TranscriptGenerator {
    pub fn new(client: Arc<GeminiClient>) -> Self {
        Self { client }
    }

    pub async fn generate(&self, request: &ConceptRequest) -> Result<String, TranscriptError> {
        if request.character_names.len() != request.num_speakers {
            return Err(TranscriptError::SpeakerCountMismatch);
        }

        let prompt = podcast_prompt(request);
        let transcript = self.client.generate_text(&prompt).await?;
        validate_transcript(&transcript, &request.character_names)?;

        info!(
            speakers = request.num_speakers,
            chars = transcript.len(),
            "transcript generated"
        );
        Ok(transcript)
    }
}
