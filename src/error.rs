use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChoraleError {
    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Speaker parse error: {0}")]
    SpeakerParse(String),

    #[error("Duration probe failed for channel {channel}: {reason}")]
    DurationProbe { channel: String, reason: String },

    #[error("Batch contains no channels")]
    EmptyBatch,

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Transcription of channel {channel} timed out after {secs}s")]
    TranscriptionTimeout { channel: String, secs: u64 },

    #[error("Merge error: {0}")]
    Merge(String),

    #[error("Whisper model not found: {0}")]
    WhisperModelNotFound(PathBuf),

    #[error("Config error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChoraleError>;
