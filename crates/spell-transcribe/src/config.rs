use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::speech_api::AudioSettings;

#[derive(Parser, Debug, Clone)]
#[command(name = "spell-transcribe")]
#[command(about = "Transcription fallback for Spell Racer: POST /transcribe with an `audio` file")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "TRANSCRIBE_BIND", default_value = "0.0.0.0:3001")]
    pub bind: SocketAddr,

    /// Directory for temporary uploads
    #[arg(long, env = "TRANSCRIBE_UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// BCP 47 language sent to the provider
    #[arg(long, env = "TRANSCRIBE_LANGUAGE", default_value = "es-MX")]
    pub language: String,

    /// Sample rate of the uploaded audio
    #[arg(long, default_value_t = 44100)]
    pub sample_rate: u32,

    /// Audio encoding name understood by the provider
    #[arg(long, default_value = "LINEAR16")]
    pub encoding: String,

    /// Provider recognize endpoint
    #[arg(
        long,
        env = "SPEECH_API_ENDPOINT",
        default_value = "https://speech.googleapis.com/v1/speech:recognize"
    )]
    pub endpoint: String,

    /// Provider API key, sent as the `key` query parameter
    #[arg(long, env = "SPEECH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 25 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Args {
    pub fn audio_settings(&self) -> AudioSettings {
        AudioSettings {
            encoding: self.encoding.clone(),
            sample_rate_hertz: self.sample_rate,
            language_code: self.language.clone(),
        }
    }
}
