mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use newsvox_pipeline::{NewsSentimentPipeline, PipelineConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, prune_audio_dir, AppState},
    middleware::RateLimitState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = newsvox_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pipeline = NewsSentimentPipeline::new(&PipelineConfig::from_app_config(&config))?;
    tokio::fs::create_dir_all(&config.audio_dir).await?;
    let pruned = prune_audio_dir(&config.audio_dir, config.audio_retain_files, None).await?;
    if pruned > 0 {
        tracing::info!(
            pruned,
            audio_dir = %config.audio_dir.display(),
            "pruned old narration files"
        );
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
        audio_dir: config.audio_dir.clone(),
        audio_retain_files: config.audio_retain_files,
        default_max_items: config.max_items,
    };
    let rate_limit = RateLimitState::new(config.rate_limit_per_minute, Duration::from_secs(60));
    let app = build_app(state, rate_limit);

    tracing::info!(
        env = %config.env,
        bind_addr = %config.bind_addr,
        target_language = %config.target_language,
        "newsvox server listening"
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
