use std::collections::HashMap;

use gen_core::persona::VoiceMapping;
use gen_core::transcript::ConceptRequest;

use crate::error::ApiError;

/// Maximum transcript length for audio generation requests
const MAX_TRANSCRIPT_LENGTH: usize = 50_000;
/// Maximum text length for a single segment
const MAX_SEGMENT_TEXT_LENGTH: usize = 5000;
/// Maximum topic length for transcript generation
const MAX_TOPIC_LENGTH: usize = 500;

/// Validate an audio generation request
pub fn validate_podcast_request(
    transcript: &str,
    voice_mappings: &HashMap<String, VoiceMapping>,
) -> Result<(), ApiError> {
    if transcript.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "Transcript cannot be empty".to_string(),
        ));
    }
    if transcript.len() > MAX_TRANSCRIPT_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Transcript too long (max {} characters)",
            MAX_TRANSCRIPT_LENGTH
        )));
    }
    if voice_mappings.is_empty() {
        return Err(ApiError::InvalidInput(
            "At least one voice mapping is required".to_string(),
        ));
    }
    Ok(())
}

/// Validate a single-segment generation request
pub fn validate_single_segment_request(speaker: &str, text: &str) -> Result<(), ApiError> {
    if speaker.trim().is_empty() {
        return Err(ApiError::InvalidInput(
            "Speaker cannot be empty".to_string(),
        ));
    }
    if text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.len() > MAX_SEGMENT_TEXT_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Text too long (max {} characters)",
            MAX_SEGMENT_TEXT_LENGTH
        )));
    }
    Ok(())
}

/// Validate a transcript generation concept
pub fn validate_concept_request(request: &ConceptRequest) -> Result<(), ApiError> {
    if request.topic.trim().is_empty() {
        return Err(ApiError::InvalidInput("Topic cannot be empty".to_string()));
    }
    if request.topic.len() > MAX_TOPIC_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "Topic too long (max {} characters)",
            MAX_TOPIC_LENGTH
        )));
    }
    if !(2..=4).contains(&request.num_speakers) {
        return Err(ApiError::InvalidInput(
            "Number of speakers must be between 2 and 4".to_string(),
        ));
    }
    if request.character_names.len() != request.num_speakers {
        return Err(ApiError::InvalidInput(
            "Number of speakers must match number of character names".to_string(),
        ));
    }
    if request.character_names.iter().any(|n| n.trim().is_empty()) {
        return Err(ApiError::InvalidInput(
            "Character names cannot be empty".to_string(),
        ));
    }
    if !(5..=30).contains(&request.duration_minutes) {
        return Err(ApiError::InvalidInput(
            "Duration must be between 5 and 30 minutes".to_string(),
        ));
    }
    Ok(())
}
