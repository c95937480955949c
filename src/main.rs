use anyhow::Context as _;
use clap::Parser;
use image_uploader::api::{ApiState, start_http_server};
use image_uploader::config::{Config, Overrides};
use image_uploader::images::ImageLibrary;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "image_uploader=info,tower_http=info";

#[derive(Parser, Debug)]
#[command(name = "image-uploader", version, about = "Upload images and view them by id")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file).
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Directory holding `uploads/` and `images.json`.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        bind: args.bind,
        data_dir: args.data_dir,
    };
    let config = Config::load(args.config.as_deref(), &overrides)
        .context("failed to load configuration")?;

    let _log_guard = init_logging(config.log_dir.as_deref())?;

    let library = ImageLibrary::open(&config.data_dir)
        .await
        .with_context(|| format!("failed to open image library at {}", config.data_dir.display()))?;
    tracing::info!(
        upload_dir = %library.upload_dir().display(),
        metadata = %library.metadata_path().display(),
        "image library ready"
    );

    let state = Arc::new(ApiState::new(library).context("failed to load page templates")?);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let server = start_http_server(&config, state, shutdown_rx).await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");
    shutdown_tx.send(true).ok();

    server.await.context("HTTP server task panicked")?;
    Ok(())
}

/// Install the global subscriber. The returned guard flushes the file writer on drop.
fn init_logging(
    log_dir: Option<&Path>,
) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer());

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "image-uploader.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}
