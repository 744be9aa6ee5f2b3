use crate::error::{ChoraleError, Result};
use crate::transcription::models::{ModelManager, WhisperModel};
use crate::transcription::{RawSegment, SpeechToText};
use std::path::Path;
use std::sync::Arc;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Local Whisper engine. The context is loaded once and shared for the
/// lifetime of the process; states are created per transcription.
pub struct WhisperEngine {
    ctx: Arc<WhisperContext>,
    model_name: String,
}

impl WhisperEngine {
    pub fn new<P: AsRef<Path>>(model_path: P, use_gpu: bool) -> Result<Self> {
        let mut params = WhisperContextParameters::default();
        params.use_gpu = use_gpu;

        let path = model_path.as_ref();
        let ctx = WhisperContext::new_with_params(path.to_str().unwrap_or_default(), params)
            .map_err(|e| ChoraleError::Transcription(format!("Failed to load model: {}", e)))?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper")
            .to_string();

        Ok(Self {
            ctx: Arc::new(ctx),
            model_name,
        })
    }

    pub fn from_model(manager: &ModelManager, model: WhisperModel, use_gpu: bool) -> Result<Self> {
        let path = manager.model_path(model);
        if !path.exists() {
            return Err(ChoraleError::WhisperModelNotFound(path));
        }
        Self::new(path, use_gpu)
    }
}

impl SpeechToText for WhisperEngine {
    /// Transcribe audio samples (must be 16kHz mono f32)
    fn transcribe(&self, samples: &[f32]) -> Result<Vec<RawSegment>> {
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| ChoraleError::Transcription(format!("Failed to create state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, samples)
            .map_err(|e| ChoraleError::Transcription(format!("Transcription failed: {}", e)))?;

        let num_segments = state.full_n_segments();

        let mut segments = Vec::new();
        for i in 0..num_segments {
            if let Some(segment) = state.get_segment(i) {
                let text = segment.to_str_lossy().map_err(|e| {
                    ChoraleError::Transcription(format!("Failed to get text: {}", e))
                })?;

                // whisper reports centiseconds
                segments.push(RawSegment::new(
                    text.trim(),
                    segment.start_timestamp() as f64 / 100.0,
                    segment.end_timestamp() as f64 / 100.0,
                ));
            }
        }

        Ok(segments)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
