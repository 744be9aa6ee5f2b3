use crate::audio;
use crate::batch::offset::compute_offsets;
use crate::batch::speaker::resolve_speaker;
use crate::batch::{AudioChannel, BatchId, BatchOutcome, ChannelId, FailurePolicy};
use crate::config::settings::BatchConfig;
use crate::error::{ChoraleError, Result};
use crate::merge;
use crate::transcription::channel::{transcribe_channel, TranscribeOptions};
use crate::transcription::{ChannelTranscript, SpeechToText};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// A channel as found on disk, before speakers and durations are known
#[derive(Debug, Clone)]
pub struct DiscoveredChannel {
    pub id: ChannelId,
    pub path: PathBuf,
    pub filename: String,
}

/// Enumerate the WAV tracks of a session directory, sorted by filename
pub fn discover_channels(dir: &Path) -> Result<Vec<DiscoveredChannel>> {
    let mut channels = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if !is_wav {
            continue;
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        channels.push(DiscoveredChannel {
            id: ChannelId::from_string(stem),
            path,
            filename,
        });
    }

    channels.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(channels)
}

/// Drives a batch end to end: speaker resolution and duration probing for
/// every channel up front, offsets, bounded-concurrency transcription with a
/// per-channel deadline, then the policy-driven merge.
pub struct BatchRunner {
    engine: Arc<dyn SpeechToText>,
    config: BatchConfig,
}

impl BatchRunner {
    pub fn new(engine: Arc<dyn SpeechToText>, config: BatchConfig) -> Self {
        Self { engine, config }
    }

    pub async fn run(
        &self,
        discovered: Vec<DiscoveredChannel>,
        output_path: &Path,
    ) -> Result<BatchOutcome> {
        if discovered.is_empty() {
            return Err(ChoraleError::EmptyBatch);
        }

        let batch_id = BatchId::new();
        info!(
            "Batch {}: {} channels, policy {}",
            batch_id,
            discovered.len(),
            self.config.failure_policy
        );

        // Speaker resolution and duration probing must both complete for the
        // whole batch before any transcription starts: a failure here aborts
        // the batch while it is still cheap.
        let mut speakers = HashMap::new();
        for channel in &discovered {
            speakers.insert(channel.id.clone(), resolve_speaker(&channel.filename)?);
        }

        let mut durations = HashMap::new();
        for channel in &discovered {
            let duration = audio::probe_duration(&channel.path).map_err(|e| {
                ChoraleError::DurationProbe {
                    channel: channel.id.to_string(),
                    reason: e.to_string(),
                }
            })?;
            durations.insert(channel.id.clone(), duration);
        }

        let offsets = compute_offsets(&durations, self.config.offset_precision)?;

        let channels: Vec<AudioChannel> = discovered
            .into_iter()
            .map(|ch| {
                let speaker = speakers[&ch.id].clone();
                let duration = durations[&ch.id];
                let offset = offsets[&ch.id];
                info!(
                    "Channel {}: speaker {}, duration {:.2}s, offset {:.2}s",
                    ch.id, speaker, duration, offset
                );
                AudioChannel {
                    id: ch.id,
                    path: ch.path,
                    speaker,
                    duration,
                    offset,
                }
            })
            .collect();

        let (transcripts, failures) = self.transcribe_all(channels).await?;
        let failed_ids: Vec<ChannelId> = failures.iter().map(|(id, _)| id.clone()).collect();

        match self.config.failure_policy {
            FailurePolicy::FailFast => {
                if let Some((_, error)) = failures.into_iter().next() {
                    return Err(error);
                }
            }
            FailurePolicy::BestEffort => {
                if transcripts.is_empty() && !failures.is_empty() {
                    return Err(ChoraleError::Transcription(format!(
                        "All {} channels failed",
                        failures.len()
                    )));
                }
            }
        }

        let merged = merge::merge_transcripts(&transcripts);
        merge::write_artifact(&merged, output_path)?;

        info!(
            "Batch {}: merged {} chunks from {} channels into {}",
            batch_id,
            merged.chunk_count(),
            transcripts.len(),
            output_path.display()
        );

        Ok(BatchOutcome {
            batch_id,
            artifact_path: output_path.to_path_buf(),
            channels_merged: transcripts.len(),
            channels_failed: failed_ids,
            chunk_count: merged.chunk_count(),
            generated_at: merged.generated_at,
        })
    }

    /// Fan transcription out over a bounded pool and drain every task.
    /// Returns per-channel successes and failures; the merge decision is the
    /// caller's.
    async fn transcribe_all(
        &self,
        channels: Vec<AudioChannel>,
    ) -> Result<(Vec<ChannelTranscript>, Vec<(ChannelId, ChoraleError)>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let deadline = Duration::from_secs(self.config.channel_timeout_secs);
        let mut tasks: JoinSet<(ChannelId, Result<ChannelTranscript>)> = JoinSet::new();

        for channel in channels {
            let engine = self.engine.clone();
            let semaphore = semaphore.clone();
            let id = channel.id.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = tokio::time::timeout(deadline, transcribe_one(engine, channel))
                    .await
                    .unwrap_or_else(|_| {
                        Err(ChoraleError::TranscriptionTimeout {
                            channel: id.to_string(),
                            secs: deadline.as_secs(),
                        })
                    });
                (id, result)
            });
        }

        let mut transcripts = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            let (id, result) = joined.map_err(|e| {
                ChoraleError::Transcription(format!("Channel task panicked: {}", e))
            })?;
            match result {
                Ok(transcript) => {
                    info!("Channel {}: {} chunks", id, transcript.len());
                    transcripts.push(transcript);
                }
                Err(error) => {
                    warn!("Channel {} failed: {}", id, error);
                    failures.push((id, error));
                }
            }
        }

        Ok((transcripts, failures))
    }
}

async fn transcribe_one(
    engine: Arc<dyn SpeechToText>,
    channel: AudioChannel,
) -> Result<ChannelTranscript> {
    let path = channel.path.clone();
    let samples = tokio::task::spawn_blocking(move || audio::load_samples(&path))
        .await
        .map_err(|e| ChoraleError::Transcription(format!("Load task panicked: {}", e)))??;

    let options = TranscribeOptions::new(channel.speaker.clone(), channel.offset);
    let id = channel.id.clone();
    tokio::task::spawn_blocking(move || transcribe_channel(engine.as_ref(), &samples, id, &options))
        .await
        .map_err(|e| ChoraleError::Transcription(format!("Transcription task panicked: {}", e)))?
}
