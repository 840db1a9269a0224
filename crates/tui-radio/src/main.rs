mod action;
mod app;
mod component;
mod components;
mod events;
mod layout;
mod player;
mod terminal;
mod theme;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;

use radio_core::config::Config;
use radio_core::launch::LaunchSpec;
use radio_core::platform;

/// Minimal terminal radio: pick a station, watch the track titles roll in.
#[derive(Parser, Debug)]
#[command(name = "tui-radio")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to <config dir>/tui-radio/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Player executable to launch instead of mpv
    #[arg(short, long)]
    player: Option<PathBuf>,

    /// Write logs to this file; nothing is logged without it
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log filter directives, overridden by RUST_LOG
    #[arg(long, default_value = "debug")]
    log_filter: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout belongs to the TUI, so logs only ever go to a file.
    if let Some(log_path) = &args.log_file {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("failed to open log file {}", log_path.display()))?;
        let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_filter.clone());
        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_env_filter(log_filter.as_str())
            .with_ansi(false)
            .init();
    }

    tracing::info!("tui-radio starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load(args.config.as_deref())?;
    tracing::debug!("{} stations in catalog", config.stations.len());

    // ── Resolve the player before touching the terminal ─────────────────────
    let requested = args.player.as_deref().or(config.player.binary.as_deref());
    let Some(player) = platform::find_player_binary(requested) else {
        anyhow::bail!(
            "player binary {} not found beside the executable or on PATH",
            requested
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| platform::player_binary_name().to_string())
        );
    };
    tracing::info!("player: {}", player.display());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    terminal::install_panic_hook();
    let mut guard = terminal::TerminalGuard::enter().context("failed to set up terminal")?;

    let (input_tx, input_rx) = mpsc::channel(256);
    terminal::spawn_input_reader(input_tx);

    let app = app::App::new(&config, LaunchSpec::mpv(player));
    let result = app.run(guard.terminal_mut(), input_rx).await;

    // Restore before the error, if any, is printed.
    drop(guard);
    if let Err(e) = &result {
        tracing::error!("tui-radio exited with error: {:#}", e);
    }
    result
}
