use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;

use crate::error::TranscribeError;
use crate::speech_api::SpeechClient;
use crate::upload::TempUpload;

/// Multipart field carrying the recording.
pub const AUDIO_FIELD: &str = "audio";

pub struct AppState {
    pub speech: SpeechClient,
    pub upload_dir: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct Transcription {
    pub transcription: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(Arc::new(state))
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Transcription>, TranscribeError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(AUDIO_FIELD) {
            let bytes = field.bytes().await?;
            upload = Some(TempUpload::write(&state.upload_dir, &bytes).await?);
            break;
        }
    }
    let upload = upload.ok_or(TranscribeError::MissingAudio)?;

    let audio = upload.read().await?;
    info!(bytes = audio.len(), path = %upload.path().display(), "transcribing upload");
    let transcription = state.speech.recognize(&audio).await?;
    info!(chars = transcription.len(), "transcription complete");

    Ok(Json(Transcription { transcription }))
}
