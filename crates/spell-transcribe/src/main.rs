//! HTTP transcription fallback for Spell Racer.
//!
//! Accepts a multipart `audio` upload on `POST /transcribe`, forwards it to a
//! cloud speech-to-text provider and answers `{ "transcription": ... }`.

mod config;
mod error;
mod routes;
mod speech_api;
mod upload;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Args;
use routes::AppState;
use speech_api::SpeechClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.api_key.is_none() {
        warn!("SPEECH_API_KEY not set; provider requests will be unauthenticated");
    }

    tokio::fs::create_dir_all(&args.upload_dir)
        .await
        .with_context(|| format!("cannot create upload dir {}", args.upload_dir.display()))?;

    let state = AppState {
        speech: SpeechClient::new(args.endpoint.clone(), args.api_key.clone(), args.audio_settings()),
        upload_dir: args.upload_dir.clone(),
    };
    let app = routes::router(state, args.max_upload_bytes);

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("cannot bind {}", args.bind))?;
    info!(addr = %args.bind, language = %args.language, "transcription service listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
