//! camview — shared-camera recording viewer
//!
//! Usage:
//!   camview serve    --config config.toml                   # run the HTTP API
//!   camview cameras  --token TOKEN                          # list shared cameras
//!   camview timeline --token TOKEN --camera 42 --order asc  # list recorded segments
//!   camview locate   --token TOKEN --camera 42 --position 0.5
//!   camview stream   --token TOKEN --camera 42 [--start .. --end ..]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use camview::api::{self, AppState};
use camview::client::VideoApiClient;
use camview::config::Config;
use camview::playback::PlaybackSession;
use camview::session;
use camview::timeline::segment::format_timestamp;
use camview::timeline::{Segment, SortDirection, Timestamp, WindowClamp};

#[derive(Parser)]
#[command(name = "camview", about = "Shared-camera recording viewer", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArg {
    /// Path to the TOML configuration file. Defaults are used if it is missing.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Args)]
struct AuthArgs {
    #[command(flatten)]
    config: ConfigArg,
    /// Personal access token.
    #[arg(long, env = "CAMVIEW_TOKEN", hide_env_values = true)]
    token: String,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[command(flatten)]
        config: ConfigArg,
        /// Override the configured listen port.
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the token owner and the cameras shared with them.
    Cameras {
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// List recorded segments of a camera.
    Timeline {
        #[command(flatten)]
        auth: AuthArgs,
        #[arg(long)]
        camera: String,
        /// Segment order: asc (oldest first) or desc (newest first).
        #[arg(long)]
        order: Option<SortDirection>,
    },
    /// Pick the segment nearest to a timeline position and print its stream URL.
    Locate {
        #[command(flatten)]
        auth: AuthArgs,
        #[arg(long)]
        camera: String,
        /// Position along the timeline, 0.0 (start) to 1.0 (end).
        #[arg(long)]
        position: f64,
    },
    /// Print a stream URL for the whole recording window or a given range.
    Stream {
        #[command(flatten)]
        auth: AuthArgs,
        #[arg(long)]
        camera: String,
        /// Range start (RFC 3339). Requires --end.
        #[arg(long, requires = "end")]
        start: Option<Timestamp>,
        /// Range end (RFC 3339). Requires --start.
        #[arg(long, requires = "start")]
        end: Option<Timestamp>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve { config, port } => run_serve(config.config, port).await,
        Command::Cameras { auth } => run_cameras(auth).await,
        Command::Timeline { auth, camera, order } => run_timeline(auth, &camera, order).await,
        Command::Locate { auth, camera, position } => run_locate(auth, &camera, position).await,
        Command::Stream { auth, camera, start, end } => {
            run_stream(auth, &camera, start.zip(end)).await
        }
    };

    if let Err(e) = result {
        error!("Command failed: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load_or_default(path).with_context(|| format!("loading {}", path.display()))
}

async fn open_playback(
    auth: &AuthArgs,
    camera: &str,
) -> anyhow::Result<(VideoApiClient, PlaybackSession)> {
    let cfg = load_config(&auth.config.config)?;
    let client = VideoApiClient::new(&cfg.upstream)?;
    let clamp = WindowClamp::new(cfg.playback.max_span()?);
    let playback = PlaybackSession::open(
        &client,
        &auth.token,
        camera,
        &clamp,
        cfg.playback.default_order,
    )
    .await
    .with_context(|| format!("opening playback for camera {camera}"))?;
    Ok((client, playback))
}

fn print_segments(segments: &[Segment]) {
    for (i, seg) in segments.iter().enumerate() {
        println!("{:>4}  {}", i, seg.label());
    }
}

async fn run_serve(config_path: PathBuf, port: Option<u16>) -> anyhow::Result<()> {
    let cfg = load_config(&config_path)?;
    let port = port.unwrap_or(cfg.api.port);

    info!(
        upstream = cfg.upstream.base_url,
        max_span_hours = cfg.playback.max_span_hours,
        port,
        "Starting camview"
    );

    let state = Arc::new(AppState::new(cfg)?);
    tokio::select! {
        res = api::start_server(state, port) => res?,
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Received CTRL+C, shutting down…");
        }
    }
    Ok(())
}

async fn run_cameras(auth: AuthArgs) -> anyhow::Result<()> {
    let cfg = load_config(&auth.config.config)?;
    let client = VideoApiClient::new(&cfg.upstream)?;
    let session = session::login(&client, &auth.token).await?;

    println!("Welcome, {}", session.user.display_name());
    println!("These are your shared cameras:");
    for cam in &session.cameras {
        println!("  {:<10} {:<30} {}", cam.id, cam.name, cam.status);
    }
    Ok(())
}

async fn run_timeline(
    auth: AuthArgs,
    camera: &str,
    order: Option<SortDirection>,
) -> anyhow::Result<()> {
    let (_, playback) = open_playback(&auth, camera).await?;
    let window = playback.clamped.window;

    println!("Camera     : {}", camera);
    println!("Window     : {} → {}", format_timestamp(window.start), format_timestamp(window.end));
    if let Some(raw_end) = playback.clamped.truncated_from {
        println!("Truncated  : recording continues until {}", format_timestamp(raw_end));
    }
    println!("Stream     : {}", playback.stream_url);

    let order = order.unwrap_or_else(|| playback.store.direction());
    let segments = playback.store.sorted_view(order);
    println!("Segments   : {} ({})", segments.len(), order);
    print_segments(&segments);
    Ok(())
}

async fn run_locate(auth: AuthArgs, camera: &str, position: f64) -> anyhow::Result<()> {
    let (client, mut playback) = open_playback(&auth, camera).await?;
    let selection = playback.select_at(&client, &auth.token, position).await?;
    println!("{}", selection.segment.label());
    println!("{}", selection.stream_url);
    Ok(())
}

async fn run_stream(
    auth: AuthArgs,
    camera: &str,
    range: Option<(Timestamp, Timestamp)>,
) -> anyhow::Result<()> {
    match range {
        Some((start, end)) => {
            let cfg = load_config(&auth.config.config)?;
            let client = VideoApiClient::new(&cfg.upstream)?;
            let segment = Segment::new(start, end)?;
            let stream = client.stream(&auth.token, camera, segment.start, segment.end).await?;
            println!("{}", stream.url);
        }
        None => {
            let (_, playback) = open_playback(&auth, camera).await?;
            println!("{}", playback.stream_url);
        }
    }
    Ok(())
}
