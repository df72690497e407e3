// Configuration constants for the server

use std::path::PathBuf;
use std::time::Duration;

use audio_core::AssemblyConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Root directory for generated audio, served under `/audio`.
    pub audio_root: PathBuf,
    pub rate_limit_per_minute: u32,
    pub request_timeout_secs: u64,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub target_dbfs: f64,
    pub silence_ms: u32,
    pub crossfade_ms: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let assembly = AssemblyConfig::default();
        Self {
            port: 8000,
            audio_root: PathBuf::from("podcast_outputs"),
            rate_limit_per_minute: 60,
            request_timeout_secs: 60,
            cors_allowed_origins: None,
            target_dbfs: audio_core::DEFAULT_TARGET_DBFS,
            silence_ms: assembly.silence_ms,
            crossfade_ms: assembly.crossfade_ms,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let audio_root = std::env::var("AUDIO_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.audio_root);

        let rate_limit_per_minute = std::env::var("RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_limit_per_minute);

        let request_timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect());

        let target_dbfs = std::env::var("AUDIO_TARGET_DBFS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.target_dbfs);

        let silence_ms = std::env::var("AUDIO_SILENCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.silence_ms);

        let crossfade_ms = std::env::var("AUDIO_CROSSFADE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.crossfade_ms);

        Self {
            port,
            audio_root,
            rate_limit_per_minute,
            request_timeout_secs,
            cors_allowed_origins,
            target_dbfs,
            silence_ms,
            crossfade_ms,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn assembly(&self) -> AssemblyConfig {
        AssemblyConfig {
            silence_ms: self.silence_ms,
            crossfade_ms: self.crossfade_ms,
        }
    }
}
