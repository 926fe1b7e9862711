//! ORIA Shell Entry Point
//!
//! Runs the ORIA client against a server with a headless page, reading
//! commands from stdin and printing what the page would show.
//!
//! Usage:
//!   oria-shell [OPTIONS]
//!
//! Options:
//!   -s, --server <URL>      ORIA server base URL
//!       --cookie <COOKIE>   Session cookie sent with every request
//!   -c, --config <FILE>     Config file (default: ~/.config/oria/client.toml)
//!   -t, --timeout <SECS>    Request timeout
//!   -w, --width <COLS>      Wrap printed lines at this width
//!
//! Environment Variables:
//!   ORIA_CONFIG             Config file path
//!   ORIA_SERVER_URL         Server base URL (overridden by --server)
//!   RUST_LOG                Log filter (default: oria=info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use oria_core::mascot::spawn_mascot;
use oria_core::{
    default_config_path, load_config_from_path, ConfigOverrides, Controller, HttpApi, UiEvent,
};
use oria_shell::{
    parse_line, AssetCache, DocumentMascot, DomSurface, HeadlessDocument, HttpAssetSource,
    ParseError, ShellCommand, SurfaceOutput, HELP, MASCOT_ID,
};

/// ORIA Shell - headless ORIA client
#[derive(Parser, Debug)]
#[command(name = "oria-shell")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ORIA server base URL
    #[arg(short, long, value_name = "URL")]
    server: Option<String>,

    /// Session cookie sent with every request
    #[arg(long, value_name = "COOKIE")]
    cookie: Option<String>,

    /// Config file path
    #[arg(short, long, env = "ORIA_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Wrap printed lines at this width
    #[arg(short, long, default_value_t = 100, value_name = "COLS")]
    width: usize,
}

/// Initialize logging to stderr so it never interleaves with page output
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oria=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_wrapped(text: &str, width: usize) {
    for line in text.lines() {
        println!("{}", textwrap::fill(line, width));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    info!("ORIA Shell v{}", env!("CARGO_PKG_VERSION"));

    // Config: file, then env, then CLI
    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;
    let mut overrides = ConfigOverrides::new();
    if let Some(url) = args.server {
        overrides = overrides.with_base_url(url);
    }
    if let Some(cookie) = args.cookie {
        overrides = overrides.with_session_cookie(cookie);
    }
    if let Some(secs) = args.timeout {
        overrides = overrides.with_request_timeout_secs(secs);
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(server = %config.server.base_url, source = %config.source(), "Configuration resolved");

    let api = HttpApi::from_config(&config.server).context("Failed to create API client")?;
    let assets = Arc::new(AssetCache::new(
        HttpAssetSource::from_config(&config.server).context("Failed to create asset client")?,
    ));

    let document = HeadlessDocument::oria_page();
    let mascot = spawn_mascot(
        DocumentMascot::bind(&document, MASCOT_ID),
        config.mascot.frames.clone(),
        config.mascot.timing.clone(),
        &oria_core::SkinId::default(),
    );
    let mut surface = DomSurface::new(document).with_mascot(mascot);

    let (view_tx, mut view_rx) = mpsc::channel(256);
    let (event_tx, event_rx) = mpsc::channel(64);
    let mut controller = Controller::new(api, config, view_tx);
    let controller_task = tokio::spawn(async move { controller.run(event_rx).await });

    // Precache off the startup path
    let installer = Arc::clone(&assets);
    let install_task = tokio::spawn(async move {
        match installer.install().await {
            Ok(count) => info!(count, cache = installer.name(), "Offline cache installed"),
            Err(e) => warn!(error = %e, "Offline cache not installed"),
        }
    });

    event_tx
        .send(UiEvent::Started)
        .await
        .context("Controller stopped before start")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let width = args.width;

    loop {
        tokio::select! {
            message = view_rx.recv() => match message {
                Some(message) => match surface.apply(message) {
                    SurfaceOutput::Line(line) => print_wrapped(&line, width),
                    SurfaceOutput::Silent => {}
                    SurfaceOutput::Quit => break,
                },
                None => break,
            },

            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    // EOF: ask the controller to wind down
                    stdin_open = false;
                    let _ = event_tx.send(UiEvent::QuitRequested).await;
                    continue;
                };
                match parse_line(&line) {
                    Ok(ShellCommand::Event(event)) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(ShellCommand::Poke) => {
                        if !surface.poke() {
                            println!("The mascot is not on this page");
                        }
                    }
                    Ok(ShellCommand::Show(region)) => match surface.region_text(region) {
                        Some(text) if !text.is_empty() => print_wrapped(&text, width),
                        _ => println!("(empty)"),
                    },
                    Ok(ShellCommand::Asset(path)) => match assets.fetch(&path).await {
                        Ok(asset) => println!(
                            "{path}: {} bytes ({})",
                            asset.bytes.len(),
                            if asset.from_cache { "cache" } else { "network" }
                        ),
                        Err(e) => println!("{e}"),
                    },
                    Ok(ShellCommand::Help) => println!("{HELP}"),
                    Err(ParseError::Empty) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
    }

    install_task.abort();
    if let Some(mascot) = surface.take_mascot() {
        mascot.shutdown().await;
    }
    drop(event_tx);

    // The controller may still be sending until it drops its sender
    let drain = async { while view_rx.recv().await.is_some() {} };
    let (joined, ()) = tokio::join!(controller_task, drain);
    let result = joined.context("Controller task panicked")?;
    match &result {
        Ok(()) => info!("ORIA Shell stopped"),
        Err(e) => error!(error = %e, "Controller error"),
    }
    result
}
