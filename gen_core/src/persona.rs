//! Voice persona descriptors and style-prompt rendering.
//!
//! Callers supply a fully-resolved descriptor per speaker; the resolver
//! renders it into the natural-language style prompt the provider consumes
//! together with the prebuilt voice id. Pure data, never mutated by the
//! pipeline.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accent {
    Neutral,
    British,
    American,
    Australian,
    Indian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceTone {
    Warm,
    Professional,
    Energetic,
    Calm,
    Authoritative,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Neutral => "neutral",
        }
    }
}

impl Accent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::Neutral => "neutral",
            Accent::British => "british",
            Accent::American => "american",
            Accent::Australian => "australian",
            Accent::Indian => "indian",
        }
    }
}

impl VoiceTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceTone::Warm => "warm",
            VoiceTone::Professional => "professional",
            VoiceTone::Energetic => "energetic",
            VoiceTone::Calm => "calm",
            VoiceTone::Authoritative => "authoritative",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Accent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VoiceTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Words-per-minute figures for the three delivery modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakingRate {
    pub normal: u32,
    pub excited: u32,
    pub analytical: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceCharacteristics {
    pub pitch_range: String,
    pub resonance: String,
    pub breathiness: String,
    pub vocal_energy: String,
    pub pause_pattern: String,
    pub emphasis_pattern: String,
    pub emotional_range: String,
    pub breathing_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechPatterns {
    pub phrasing: String,
    pub rhythm: String,
    pub articulation: String,
    pub modulation: String,
}

/// Fully-resolved voice persona for one speaker, supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub age: u32,
    pub gender: Gender,
    pub persona: String,
    pub background: String,
    pub voice_tone: VoiceTone,
    pub accent: Accent,
    pub speaking_rate: SpeakingRate,
    pub voice_characteristics: VoiceCharacteristics,
    pub speech_patterns: SpeechPatterns,
}

impl PersonaDescriptor {
    /// Linearize every descriptor field into the natural-language style
    /// prompt consumed by the synthesis request.
    pub fn style_prompt(&self) -> String {
        let mut prompt = vec![
            format!(
                "You are a {} speaker aged {} with a {} voice.",
                self.gender, self.age, self.voice_tone
            ),
            format!("Your accent is {}.", self.accent),
            format!("You are {} with {}.", self.persona, self.background),
            format!(
                "Your speaking rate varies: {} words/min normally, {} words/min when excited, \
                 and {} words/min during analysis.",
                self.speaking_rate.normal, self.speaking_rate.excited, self.speaking_rate.analytical
            ),
        ];

        let c = &self.voice_characteristics;
        prompt.extend([
            "Voice characteristics:".to_string(),
            format!("- Pitch range: {}", c.pitch_range),
            format!("- Resonance: {}", c.resonance),
            format!("- Breathiness: {}", c.breathiness),
            format!("- Vocal energy: {}", c.vocal_energy),
            format!("- Pausing: {}", c.pause_pattern),
            format!("- Emphasis: {}", c.emphasis_pattern),
            format!("- Emotional range: {}", c.emotional_range),
            format!("- Breathing: {}", c.breathing_pattern),
        ]);

        let p = &self.speech_patterns;
        prompt.extend([
            "Speech patterns:".to_string(),
            format!("- Phrasing: {}", p.phrasing),
            format!("- Rhythm: {}", p.rhythm),
            format!("- Articulation: {}", p.articulation),
            format!("- Modulation: {}", p.modulation),
        ]);

        prompt.join("\n")
    }
}

/// A speaker's provider voice id plus their persona descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceMapping {
    pub voice: String,
    pub config: PersonaDescriptor,
}

/// Look up the voice mapping for a turn's speaker. Matching is
/// case-sensitive; a missing mapping aborts the whole batch.
pub fn resolve<'a>(
    speaker: &str,
    turn: usize,
    mappings: &'a HashMap<String, VoiceMapping>,
) -> Result<&'a VoiceMapping, PipelineError> {
    mappings.get(speaker).ok_or_else(|| PipelineError::UnmappedSpeaker {
        speaker: speaker.to_string(),
        turn,
    })
}
