use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use gen_core::provider::GeminiClient;
use server::config::ServerConfig;
use server::{add_request_id, build_router, cors_layer, init_uptime_clock, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _ = dotenv::dotenv();

    info!("Starting podcast generation server...");

    let config = ServerConfig::from_env();
    let provider = Arc::new(GeminiClient::from_env()?);

    tokio::fs::create_dir_all(config.audio_root.join("segments")).await?;

    init_uptime_clock();
    let state = AppState::new(provider, config.clone());
    info!(
        "Server configuration loaded: port={}, rate_limit={}/min, audio_root={}",
        config.port,
        config.rate_limit_per_minute,
        config.audio_root.display()
    );

    let cors = cors_layer(&config);

    // Global rate limit; per-IP extraction is unreliable behind proxies.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(((config.rate_limit_per_minute / 60).max(1)) as u64)
            .burst_size(config.rate_limit_per_minute)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("invalid rate limiter configuration"))?,
    );
    info!("Rate limiting: {} requests per minute", config.rate_limit_per_minute);

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors)
        .into_inner();

    let app = build_router(state)
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different PORT."))?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
