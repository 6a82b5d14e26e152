use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tarnish_app::{build_from_config, router, AppState};
use tarnish_common::observability::{init_logging, LogConfig, LogFormat};
use tarnish_config::{TarnishConfig, TarnishConfigLoader};

#[derive(Debug, Parser)]
#[command(name = "tarnish", about = "Scan the web for negative mentions of a brand")]
struct Args {
    /// YAML config file; optional, environment variables work on their own.
    #[arg(short, long, env = "TARNISH_CONFIG", default_value = "tarnish.yaml")]
    config: PathBuf,

    /// Override `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Override `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg: TarnishConfig = TarnishConfigLoader::new()
        .with_optional_file(&args.config)
        .load()?;
    if let Some(host) = args.host {
        cfg.server.host = host;
    }
    if let Some(port) = args.port {
        cfg.server.port = port;
    }

    let format: LogFormat = cfg.logging.format.parse().map_err(anyhow::Error::msg)?;
    let log_path = init_logging(LogConfig {
        app_name: cfg.logging.app_name.clone(),
        log_dir: cfg.logging.dir.clone(),
        emit_stderr: cfg.logging.stderr,
        format,
        default_filter: cfg.logging.filter.clone(),
    })?;
    tracing::info!(log = %log_path.display(), config = %args.config.display(), "tarnish.start");

    let scanner = build_from_config(&cfg)?;
    let app = router(Arc::new(AppState { scanner }));

    let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "tarnish.listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("tarnish.shutdown");
        })
        .await?;
    Ok(())
}
