use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "musegen", about = "Text-to-music generation server")]
struct Cli {
    /// Path to the configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => musegen_core::AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {:?}", path))?,
        None => musegen_core::AppConfig::default(),
    };

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!("musegen starting");

    let registry = musegen_engine::ModelRegistry::new();
    tracing::info!(
        "loading audio model '{}' (available: {:?})",
        config.audio.engine,
        registry.list_audio_models(),
    );
    let service = musegen_engine::ModelService::from_config(&config, &registry)
        .await
        .with_context(|| format!("failed to load models for engine '{}'", config.audio.engine))?;
    let service = Arc::new(service);

    let state = musegen_server::AppState::new(Arc::clone(&service), &config);
    let router = musegen_server::create_router(state, &config.server)
        .context("failed to build HTTP router")?;

    let addr = config
        .server
        .socket_addr()
        .context("invalid server bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        "serving /generate ({:?} mode, image model: {})",
        config.server.response_mode,
        service.image_model_name().unwrap_or("none"),
    );

    musegen_server::serve(listener, router, shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    service.shutdown().await;

    Ok(())
}
