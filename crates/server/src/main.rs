use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use shifttrack_config::{CONFIG_FILE_NAME, ServerConfig};
use shifttrack_server::{AppConfig, AppState, build_router, serve_on, storage};

#[derive(Parser, Debug)]
#[command(name = "shifttrack-server", version, about = "ShiftTrack scheduling server")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, env = "SHIFTTRACK_CONFIG", default_value = CONFIG_FILE_NAME)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shifttrack_server=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)?;
    config.apply_env()?;
    config.validate()?;

    if config.auth.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET not set; login and all authenticated routes are disabled");
    }
    if !config.auth.registration_open {
        tracing::info!("registration is closed");
    }

    let data_dir = &config.server.data_dir;
    tracing::info!("data directory: {}", data_dir.display());
    let db = storage::init_db(data_dir).context("initializing database")?;
    tracing::info!("database initialized");

    let app_config = AppConfig::from(&config);
    let base_url = app_config.base_url.clone();
    let state = AppState {
        db,
        config: app_config,
    };
    let app = build_router(state, Some(&config.server.web_dir));

    tracing::info!("starting server at {base_url}");
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.server.port))
        .await
        .with_context(|| format!("binding port {}", config.server.port))?;
    serve_on(listener, app).await
}
