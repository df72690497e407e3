//! HTTP surface for the podcast audio generation service.
//!
//! Thin plumbing around `gen_core`: JSON endpoints for transcript work and
//! configuration data, SSE endpoints streaming pipeline events, and static
//! serving of generated audio under `/audio`.

pub mod config;
pub mod error;
pub mod validation;
pub mod voices;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use gen_core::persona::VoiceMapping;
use gen_core::pipeline::{AudioPipeline, PipelineConfig, PipelineEvent};
use gen_core::provider::GeminiClient;
use gen_core::transcript::{extract_speakers, ConceptRequest, TranscriptGenerator};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::{
    validate_concept_request, validate_podcast_request, validate_single_segment_request,
};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<GeminiClient>,
    pub request_count: Arc<AtomicU64>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(provider: Arc<GeminiClient>, config: ServerConfig) -> Self {
        Self {
            provider,
            request_count: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    /// A fresh pipeline per request; runs share nothing but the audio root,
    /// and filenames are namespaced per run.
    fn pipeline(&self) -> AudioPipeline<GeminiClient> {
        let mut pipeline_config = PipelineConfig::new(&self.config.audio_root);
        pipeline_config.target_dbfs = self.config.target_dbfs;
        pipeline_config.assembly = self.config.assembly();
        AudioPipeline::new(self.provider.clone(), pipeline_config)
    }
}

#[derive(Deserialize)]
pub struct PodcastRequest {
    pub transcript: String,
    #[serde(rename = "voiceMappings")]
    pub voice_mappings: HashMap<String, VoiceMapping>,
}

#[derive(Deserialize)]
pub struct SingleSegmentRequest {
    pub speaker: String,
    pub text: String,
    #[serde(rename = "voiceConfig")]
    pub voice_config: VoiceMapping,
}

#[derive(Deserialize)]
pub struct TranscriptEditRequest {
    pub transcript: String,
}

#[derive(Serialize)]
pub struct TranscriptResponse {
    pub transcript: String,
}

#[derive(Serialize)]
pub struct EditTranscriptResponse {
    pub success: bool,
    pub transcript: String,
    pub characters: Vec<String>,
}

/// Routes, mounted both at the root and under `/api`, plus static audio.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/voices", get(list_voices))
        .route("/config", get(podcast_config))
        .route("/config/voice", get(voice_config_options))
        .route("/generate-transcript", post(generate_transcript))
        .route("/edit-transcript", post(edit_transcript))
        .route("/generate-audio", post(generate_audio))
        .route("/generate-segment", post(generate_segment))
        .route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(api.clone())
        .nest("/api", api)
        .nest_service("/audio", ServeDir::new(&state.config.audio_root))
        .with_state(state)
}

/// Environment-aware CORS: explicit origins in production, permissive in
/// development.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let methods = [
        axum::http::Method::GET,
        axum::http::Method::POST,
        axum::http::Method::OPTIONS,
    ];
    if let Some(ref allowed_origins) = config.cors_allowed_origins {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
            .collect();
        if origins.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(methods)
                .allow_headers(tower_http::cors::Any)
        } else {
            info!("CORS configured for {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::list(origins))
                .allow_methods(methods)
                .allow_headers(tower_http::cors::Any)
        }
    } else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

/// Request ID middleware for tracing.
pub async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    if let Ok(value) = axum::http::HeaderValue::from_str(&request_id) {
        request.headers_mut().insert("x-request-id", value.clone());
        let mut response = next.run(request).await;
        response.headers_mut().insert("x-request-id", value);
        return response;
    }
    next.run(request).await
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_voices() -> Json<serde_json::Value> {
    Json(voices::voice_metadata())
}

pub async fn podcast_config() -> Json<serde_json::Value> {
    Json(voices::podcast_config_options())
}

pub async fn voice_config_options() -> Json<serde_json::Value> {
    Json(voices::voice_config_options())
}

pub async fn generate_transcript(
    State(state): State<AppState>,
    Json(req): Json<ConceptRequest>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_concept_request(&req)?;

    let generator = TranscriptGenerator::new(state.provider.clone());
    let transcript = generator.generate(&req).await?;
    Ok(Json(TranscriptResponse { transcript }))
}

pub async fn edit_transcript(
    State(state): State<AppState>,
    Json(req): Json<TranscriptEditRequest>,
) -> Json<EditTranscriptResponse> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let characters = extract_speakers(&req.transcript);
    Json(EditTranscriptResponse {
        success: true,
        transcript: req.transcript,
        characters,
    })
}

/// Stream pipeline events for a whole transcript as server-sent events.
pub async fn generate_audio(
    State(state): State<AppState>,
    Json(req): Json<PodcastRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_podcast_request(&req.transcript, &req.voice_mappings)?;

    let stream = state.pipeline().generate(req.transcript, req.voice_mappings);
    Ok(sse_response(stream))
}

/// Stream pipeline events for one segment as server-sent events.
pub async fn generate_segment(
    State(state): State<AppState>,
    Json(req): Json<SingleSegmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_single_segment_request(&req.speaker, &req.text)?;

    let stream = state
        .pipeline()
        .generate_single(req.speaker, req.text, req.voice_config);
    Ok(sse_response(stream))
}

fn sse_response(
    stream: impl Stream<Item = PipelineEvent> + Send + 'static,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>> + Send> {
    Sse::new(stream.map(|event| Event::default().event(event.event_name()).json_data(&event)))
        .keep_alive(KeepAlive::default())
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub memory_usage_percent: f32,
    pub request_count: u64,
    pub uptime_seconds: u64,
}

static START_TIME: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

/// Record process start for uptime reporting; call once from `main`.
pub fn init_uptime_clock() {
    let _ = START_TIME.get_or_init(std::time::Instant::now);
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    let mut system = sysinfo::System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage();
    let memory_used = system.used_memory();
    let memory_total = system.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f64 / memory_total as f64 * 100.0) as f32
    } else {
        0.0
    };

    let request_count = state.request_count.load(Ordering::Relaxed);
    let uptime = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    Json(MetricsResponse {
        cpu_usage_percent: cpu_usage,
        memory_used_mb: memory_used / 1024 / 1024,
        memory_total_mb: memory_total / 1024 / 1024,
        memory_usage_percent,
        request_count,
        uptime_seconds: uptime,
    })
}
