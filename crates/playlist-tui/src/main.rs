mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod poller;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use playlist_proto::api::PlaylistClient;
use playlist_proto::config::Config;
use playlist_proto::platform;
use playlist_proto::view::DisplayMode;

#[derive(Parser)]
#[command(name = "npq")]
#[command(about = "Terminal view of a media server's playlist: now playing, played and queued")]
#[command(version)]
struct Cli {
    /// Server base URL, e.g. http://192.168.1.20:8080
    #[arg(long, short)]
    server: Option<String>,

    /// Layout to start in: "queue" or "flat"
    #[arg(long, short)]
    mode: Option<DisplayMode>,

    /// Seconds between playlist polls (minimum 1)
    #[arg(long, short, value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Don't poll /api/current for the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Read this config file instead of the default one
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("npq log: {}", log_path.display());
    tracing::info!("npq starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("config: {}, using defaults", e);
            Config::default()
        }),
    };

    if let Some(server) = cli.server {
        config.server.base_url = server;
    }
    if let Some(mode) = cli.mode {
        config.display.mode = mode;
    }
    if let Some(secs) = cli.interval {
        config.polling.interval_secs = secs;
    }
    if cli.no_progress {
        config.polling.show_progress = false;
    }

    let client = PlaylistClient::new(&config.server.base_url, config.server.request_timeout())?;
    tracing::info!(
        "server {} mode {} interval {:?}",
        client.base_url(),
        config.display.mode,
        config.polling.interval()
    );

    app::App::new(
        client,
        config.display.mode,
        config.polling.interval(),
        config.polling.show_progress,
    )
    .run()
    .await
}
