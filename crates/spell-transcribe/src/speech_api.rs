use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::TranscribeError;

/// How the uploaded audio is described to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSettings {
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub language_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'a str,
    sample_rate_hertz: u32,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

impl RecognizeResponse {
    /// Top alternative of each result, one per line.
    fn transcription(&self) -> String {
        self.results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Client for a synchronous `speech:recognize` style endpoint.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    settings: AudioSettings,
}

impl SpeechClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, settings: AudioSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
            settings,
        }
    }

    fn request_body(&self, audio: &[u8]) -> RecognizeRequest<'_> {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: &self.settings.encoding,
                sample_rate_hertz: self.settings.sample_rate_hertz,
                language_code: &self.settings.language_code,
            },
            audio: RecognitionAudio { content: STANDARD.encode(audio) },
        }
    }

    /// Send `audio` for recognition and return the joined transcription.
    pub async fn recognize(&self, audio: &[u8]) -> Result<String, TranscribeError> {
        let mut request = self.http.post(&self.endpoint).json(&self.request_body(audio));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| format!("speech provider returned HTTP {}", status));
            return Err(TranscribeError::Provider(message));
        }

        let parsed: RecognizeResponse = resp.json().await?;
        Ok(parsed.transcription())
    }
}
