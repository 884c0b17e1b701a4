use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Server;
use clap::Parser;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::EnvFilter;

use track_sorcerer::serve;
use track_sorcerer::source::TrackSource;

#[derive(Parser)]
#[command(name = "track-sorcerer")]
#[command(about = "Serve Mapbox Vector Tiles of recorded tracks from SQLite", long_about = None)]
struct Args {
    /// Path to the tile-indexed SQLite database
    #[arg(long)]
    db: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8000")]
    listen: SocketAddr,

    /// Optional YAML tile source description
    #[arg(long)]
    source: Option<PathBuf>,

    /// Disable the permissive CORS layer
    #[arg(long)]
    no_cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let source = match &args.source {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read source file {}", path.display()))?;
            TrackSource::from_yaml(&data)?
        }
        None => TrackSource::default(),
    };

    // The server only reads; open the database accordingly.
    let options = SqliteConnectOptions::new()
        .filename(&args.db)
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database {}", args.db.display()))?;

    let config = serve::Config {
        cors: !args.no_cors,
    };
    let router = config.build_router(pool, source);

    tracing::info!("starting server on http://{}", args.listen);
    tracing::info!("/:z/:x/:y (vector tiles)");

    Server::bind(&args.listen)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}
