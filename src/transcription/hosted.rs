use crate::audio;
use crate::error::{ChoraleError, Result};
use crate::transcription::{RawSegment, SpeechToText};
use reqwest::blocking::multipart;
use serde::Deserialize;

/// Remote speech-to-text engine. Posts the channel audio to a hosted
/// transcription endpoint that answers with the per-channel chunk array
/// `[{"text": ..., "start": ..., "end": ...}, ...]`.
pub struct HostedEngine {
    url: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct HostedSegment {
    text: String,
    start: f64,
    end: f64,
}

impl HostedEngine {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            url,
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl SpeechToText for HostedEngine {
    fn transcribe(&self, samples: &[f32]) -> Result<Vec<RawSegment>> {
        let wav_bytes = audio::encode_wav(samples)?;

        let file_part = multipart::Part::bytes(wav_bytes)
            .file_name("channel.wav")
            .mime_str("audio/wav")
            .map_err(|e| ChoraleError::Api(format!("Failed to create multipart: {}", e)))?;

        let form = multipart::Form::new().part("file", file_part);

        let mut request = self.client.post(&self.url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .map_err(|e| ChoraleError::Api(format!("Hosted request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ChoraleError::Api(format!(
                "Hosted engine error {}: {}",
                status, body
            )));
        }

        let segments: Vec<HostedSegment> = response
            .json()
            .map_err(|e| ChoraleError::Api(format!("Failed to parse hosted response: {}", e)))?;

        Ok(segments
            .into_iter()
            .map(|s| RawSegment::new(s.text.trim(), s.start, s.end))
            .collect())
    }

    fn name(&self) -> &str {
        "hosted"
    }
}
