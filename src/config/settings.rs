use crate::batch::offset::OffsetPrecision;
use crate::batch::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoraleConfig {
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for ChoraleConfig {
    fn default() -> Self {
        Self {
            transcription: TranscriptionConfig::default(),
            batch: BatchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Transcription engine: "whisper" or "hosted"
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Whisper model: tiny, base, small, medium, large-v3, large-v3-turbo
    #[serde(default = "default_model")]
    pub whisper_model: String,
    pub whisper_model_path: Option<PathBuf>,
    #[serde(default)]
    pub use_gpu: bool,
    /// Endpoint for the hosted speech-to-text API
    pub hosted_url: Option<String>,
    pub hosted_api_key: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            engine: "whisper".to_string(),
            whisper_model: "base".to_string(),
            whisper_model_path: None,
            use_gpu: false,
            hosted_url: None,
            hosted_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum channels transcribed concurrently (bounded by the shared model)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Per-channel transcription deadline in seconds
    #[serde(default = "default_channel_timeout")]
    pub channel_timeout_secs: u64,
    /// What a failed channel does to the batch: fail-fast or best-effort
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Offset precision: whole-seconds or exact
    #[serde(default)]
    pub offset_precision: OffsetPrecision,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            channel_timeout_secs: default_channel_timeout(),
            failure_policy: FailurePolicy::default(),
            offset_precision: OffsetPrecision::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for merged transcript artifacts (default: alongside the session)
    pub output_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { output_dir: None }
    }
}

fn default_engine() -> String {
    "whisper".to_string()
}

fn default_model() -> String {
    "base".to_string()
}

fn default_max_concurrent() -> usize {
    2
}

fn default_channel_timeout() -> u64 {
    600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_creates() {
        let config = ChoraleConfig::default();
        assert_eq!(config.transcription.engine, "whisper");
        assert_eq!(config.batch.max_concurrent, 2);
        assert_eq!(config.batch.failure_policy, FailurePolicy::FailFast);
    }

    #[test]
    fn test_transcription_config_defaults() {
        let trans = TranscriptionConfig::default();
        assert_eq!(trans.whisper_model, "base");
        assert!(!trans.use_gpu);
        assert!(trans.hosted_url.is_none());
    }

    #[test]
    fn test_batch_config_defaults() {
        let batch = BatchConfig::default();
        assert_eq!(batch.channel_timeout_secs, 600);
        assert_eq!(batch.offset_precision, OffsetPrecision::WholeSeconds);
    }

    #[test]
    fn test_policy_parses_from_toml() {
        let config: ChoraleConfig = toml::from_str(
            r#"
            [batch]
            failure_policy = "best-effort"
            offset_precision = "exact"
            "#,
        )
        .unwrap();
        assert_eq!(config.batch.failure_policy, FailurePolicy::BestEffort);
        assert_eq!(config.batch.offset_precision, OffsetPrecision::Exact);
    }
}
