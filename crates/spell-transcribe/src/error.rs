use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Any failure while handling a transcription request. Every variant is
/// reported to the client as a 500 with `{ "error": message }`.
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("no audio file was uploaded")]
    MissingAudio,
    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("speech request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The provider answered with an error; carries its message.
    #[error("{0}")]
    Provider(String),
}

impl IntoResponse for TranscribeError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "transcription request failed");
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
