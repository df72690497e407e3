//! Integration tests for the HTTP surface.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use gen_core::provider::GeminiClient;
use server::config::ServerConfig;
use server::{build_router, AppState};

/// App wired to an unreachable provider endpoint; only requests that never
/// reach the provider (or that surface provider failures as events) are
/// exercised here.
fn test_app(audio_root: &std::path::Path) -> Router {
    let provider = Arc::new(
        GeminiClient::new(
            "test-key",
            "http://127.0.0.1:9",
            "audio-model",
            "text-model",
        )
        .expect("client construction"),
    );
    let mut config = ServerConfig::default();
    config.audio_root = audio_root.to_path_buf();
    build_router(AppState::new(provider, config))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn voice_mapping() -> Value {
    json!({
        "voice": "Puck",
        "config": {
            "name": "A",
            "age": 30,
            "gender": "male",
            "persona": "Podcast Host",
            "background": "Experienced host",
            "voice_tone": "warm",
            "accent": "american",
            "speaking_rate": {"normal": 150, "excited": 170, "analytical": 130},
            "voice_characteristics": {
                "pitch_range": "medium", "resonance": "mixed",
                "breathiness": "low", "vocal_energy": "moderate",
                "pause_pattern": "natural", "emphasis_pattern": "balanced",
                "emotional_range": "neutral", "breathing_pattern": "relaxed"
            },
            "speech_patterns": {
                "phrasing": "natural", "rhythm": "regular",
                "articulation": "clear", "modulation": "subtle"
            }
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");

    let (status, _) = get(test_app(dir.path()), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_voices() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/voices").await;
    assert_eq!(status, StatusCode::OK);

    let voices: Value = serde_json::from_slice(&body).unwrap();
    let map = voices.as_object().unwrap();
    assert_eq!(map.len(), 8);
    assert!(map.contains_key("Puck"));
    assert!(voices["Puck"]["description"].is_string());
}

#[tokio::test]
async fn test_config_options() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/api/config").await;
    assert_eq!(status, StatusCode::OK);
    let config: Value = serde_json::from_slice(&body).unwrap();
    assert!(config["duration_options"].is_array());
    assert_eq!(config["speaker_options"], json!([2, 3, 4]));

    let (status, body) = get(test_app(dir.path()), "/api/config/voice").await;
    assert_eq!(status, StatusCode::OK);
    let options: Value = serde_json::from_slice(&body).unwrap();
    assert!(options["genders"].is_array());
    assert_eq!(
        options["voice_characteristics_options"]
            .as_object()
            .unwrap()
            .len(),
        8
    );
}

#[tokio::test]
async fn test_edit_transcript_extracts_characters() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({"transcript": "John: hi\nSarah: hello\nJohn: bye"});
    let (status, response) = post_json(test_app(dir.path()), "/api/edit-transcript", &body).await;
    assert_eq!(status, StatusCode::OK);

    let parsed: Value = serde_json::from_slice(&response).unwrap();
    assert_eq!(parsed["success"], json!(true));
    assert_eq!(parsed["characters"], json!(["John", "Sarah"]));
}

#[tokio::test]
async fn test_generate_audio_rejects_empty_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({"transcript": "   ", "voiceMappings": {"A": voice_mapping()}});
    let (status, response) = post_json(test_app(dir.path()), "/generate-audio", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let parsed: Value = serde_json::from_slice(&response).unwrap();
    assert!(parsed["error"].as_str().unwrap().contains("empty"));
    assert_eq!(parsed["code"], json!(400));
}

#[tokio::test]
async fn test_generate_audio_rejects_missing_mappings() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({"transcript": "A: hello", "voiceMappings": {}});
    let (status, _) = post_json(test_app(dir.path()), "/generate-audio", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_segment_rejects_blank_text() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({"speaker": "A", "text": "  ", "voiceConfig": voice_mapping()});
    let (status, _) = post_json(test_app(dir.path()), "/generate-segment", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_transcript_rejects_speaker_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({
        "topic": "space",
        "num_speakers": 3,
        "character_names": ["John", "Sarah"],
        "expertise_level": "mixed",
        "duration_minutes": 10,
        "format_style": "casual"
    });
    let (status, _) = post_json(test_app(dir.path()), "/api/generate-transcript", &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_audio_streams_error_event_when_provider_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let body = json!({"transcript": "A: hello there", "voiceMappings": {"A": voice_mapping()}});

    let response = test_app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/generate-audio")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    // The stream ends after the terminal error event for the first turn.
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("event: progress"), "got: {text}");
    assert!(text.contains("event: error"), "got: {text}");
    assert!(!text.contains("event: complete"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(test_app(dir.path()), "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let metrics: Value = serde_json::from_slice(&body).unwrap();
    assert!(metrics["memory_total_mb"].is_number());
    assert!(metrics["request_count"].is_number());
    assert!(metrics["uptime_seconds"].is_number());
}
