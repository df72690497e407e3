//! Remote generation provider client.
//!
//! Speaks the provider's `generateContent` contract: a list of text parts
//! plus a generation config selecting the response modality, answered by a
//! candidate list. Audio candidates carry base64 payload bytes and a
//! mime-style encoding tag; text candidates carry plain text. An answered
//! request with no usable candidate is reported as `Ok(None)` so the
//! synthesizer can apply its retry policy.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_AUDIO_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash-001";

/// Transport-level bound on a hung provider call; the pipeline itself has
/// no timeout beyond the retry/backoff ceiling.
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} must be set in the environment")]
    MissingApiKey(&'static str),

    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// One synthesized audio candidate: raw bytes plus the declared encoding tag.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub data: Vec<u8>,
    pub encoding: String,
}

/// Seam between the synthesizer and the remote service.
///
/// `Ok(None)` means the provider answered but produced no usable candidate
/// this attempt — the only retryable outcome.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn generate_speech(
        &self,
        style_prompt: &str,
        text: &str,
        voice_id: &str,
    ) -> Result<Option<AudioPayload>, ProviderError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceSelection<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    prebuilt_voice_config: PrebuiltVoice<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoice<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// HTTP client for the remote generation service.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    audio_model: String,
    text_model: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        audio_model: impl Into<String>,
        text_model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            audio_model: audio_model.into(),
            text_model: text_model.into(),
        })
    }

    /// Create a client from `GEMINI_API_KEY` plus optional `GEMINI_BASE_URL`,
    /// `AUDIO_MODEL` and `TEXT_MODEL` overrides.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ProviderError::MissingApiKey("GEMINI_API_KEY"))?;
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let audio_model =
            std::env::var("AUDIO_MODEL").unwrap_or_else(|_| DEFAULT_AUDIO_MODEL.to_string());
        let text_model =
            std::env::var("TEXT_MODEL").unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string());
        Self::new(api_key, base_url, audio_model, text_model)
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Text modality: returns the first candidate's text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: None,
                max_output_tokens: Some(8192),
                speech_config: None,
            }),
        };
        let response = self.generate(&self.text_model, &request).await?;
        extract_text(response).ok_or_else(|| {
            ProviderError::MalformedResponse("no text candidate in response".to_string())
        })
    }
}

#[async_trait]
impl SpeechProvider for GeminiClient {
    async fn generate_speech(
        &self,
        style_prompt: &str,
        text: &str,
        voice_id: &str,
    ) -> Result<Option<AudioPayload>, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: style_prompt }, Part { text }],
            }],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO"]),
                max_output_tokens: None,
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceSelection {
                        prebuilt_voice_config: PrebuiltVoice {
                            voice_name: voice_id,
                        },
                    },
                }),
            }),
        };
        let response = self.generate(&self.audio_model, &request).await?;
        extract_audio(response)
    }
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
}

fn extract_audio(
    response: GenerateContentResponse,
) -> Result<Option<AudioPayload>, ProviderError> {
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.inline_data));

    let Some(inline) = inline else {
        return Ok(None);
    };
    let data = base64::engine::general_purpose::STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid base64 audio: {e}")))?;
    Ok(Some(AudioPayload {
        data,
        encoding: inline.mime_type,
    }))
}
