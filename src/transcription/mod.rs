#![allow(dead_code)]

use crate::batch::ChannelId;
use crate::config;
use crate::config::settings::TranscriptionConfig;
use crate::error::{ChoraleError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod channel;
pub mod hosted;
pub mod models;
pub mod whisper;

/// One timestamped span as returned by a speech-to-text engine,
/// seconds relative to the start of the audio it was given
#[derive(Debug, Clone, PartialEq)]
pub struct RawSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl RawSegment {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A speaker-attributed transcript chunk with both local and shared-timeline
/// timestamps. Global timestamps are fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub text: String,
    pub speaker: String,
    pub local_start: f64,
    pub local_end: f64,
    pub global_start: f64,
    pub global_end: f64,
}

/// Ordered transcript of a single channel, in engine output order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelTranscript {
    pub channel: ChannelId,
    pub chunks: Vec<TranscriptChunk>,
}

impl ChannelTranscript {
    pub fn new(channel: ChannelId, chunks: Vec<TranscriptChunk>) -> Self {
        Self { channel, chunks }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }
}

/// Speech-to-text capability. Implementations must return segments ordered
/// by start time; that contract is assumed, not re-validated.
pub trait SpeechToText: Send + Sync {
    /// Transcribe 16kHz mono f32 samples
    fn transcribe(&self, samples: &[f32]) -> Result<Vec<RawSegment>>;

    /// Name of the engine/model, for logging
    fn name(&self) -> &str;
}

/// Build the configured engine. Called once at startup; the returned handle
/// is shared read-only across the whole batch.
pub fn build_engine(config: &TranscriptionConfig) -> Result<Arc<dyn SpeechToText>> {
    match config.engine.as_str() {
        "whisper" => {
            let engine = match &config.whisper_model_path {
                Some(path) => whisper::WhisperEngine::new(path, config.use_gpu)?,
                None => {
                    let model = models::WhisperModel::from_str(&config.whisper_model)
                        .ok_or_else(|| {
                            ChoraleError::Config(format!(
                                "Unknown whisper model: {}",
                                config.whisper_model
                            ))
                        })?;
                    let manager = models::ModelManager::new(config::loader::models_dir()?);
                    whisper::WhisperEngine::from_model(&manager, model, config.use_gpu)?
                }
            };
            Ok(Arc::new(engine))
        }
        "hosted" => {
            let url = config.hosted_url.clone().ok_or_else(|| {
                ChoraleError::Config("hosted engine requires hosted_url".to_string())
            })?;
            Ok(Arc::new(hosted::HostedEngine::new(
                url,
                config.hosted_api_key.clone(),
            )))
        }
        other => Err(ChoraleError::Config(format!(
            "Unknown transcription engine: {}",
            other
        ))),
    }
}

/// Mock engine for testing
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    segments: Vec<RawSegment>,
    should_fail: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to return the given segments
    pub fn with_segments(mut self, segments: Vec<RawSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeechToText for MockEngine {
    fn transcribe(&self, _samples: &[f32]) -> Result<Vec<RawSegment>> {
        if self.should_fail {
            return Err(ChoraleError::Transcription(
                "mock transcription failure".to_string(),
            ));
        }
        Ok(self.segments.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_engine_returns_segments() {
        let engine = MockEngine::new().with_segments(vec![RawSegment::new("hi", 0.0, 1.0)]);
        let segments = engine.transcribe(&[0.0; 100]).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hi");
    }

    #[test]
    fn test_mock_engine_failure() {
        let engine = MockEngine::new().with_failure();
        assert!(engine.transcribe(&[]).is_err());
    }

    #[test]
    fn test_mock_engine_empty_output_is_ok() {
        let engine = MockEngine::new();
        let segments = engine.transcribe(&[0.0; 100]).unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn test_engine_trait_is_object_safe() {
        let engine: Box<dyn SpeechToText> =
            Box::new(MockEngine::new().with_segments(vec![RawSegment::new("boxed", 0.0, 0.5)]));
        assert_eq!(engine.name(), "mock");
        assert_eq!(engine.transcribe(&[]).unwrap().len(), 1);
    }

    #[test]
    fn test_build_engine_rejects_unknown() {
        let config = TranscriptionConfig {
            engine: "telepathy".to_string(),
            ..Default::default()
        };
        assert!(build_engine(&config).is_err());
    }

    #[test]
    fn test_build_engine_hosted_requires_url() {
        let config = TranscriptionConfig {
            engine: "hosted".to_string(),
            ..Default::default()
        };
        assert!(build_engine(&config).is_err());
    }
}
