use crate::batch::ChannelId;
use crate::error::Result;
use crate::transcription::{ChannelTranscript, SpeechToText, TranscriptChunk};

/// Per-call options for a single-channel transcription: who the chunks
/// belong to and how far the channel's local clock lags the shared timeline.
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    pub speaker: String,
    pub offset_seconds: f64,
}

impl TranscribeOptions {
    pub fn new(speaker: impl Into<String>, offset_seconds: f64) -> Self {
        Self {
            speaker: speaker.into(),
            offset_seconds,
        }
    }
}

/// Run one channel through the engine and attach speaker and timeline data.
///
/// Engine output order is preserved. Global timestamps are derived here,
/// exactly once. An engine returning no segments (silence) yields a valid
/// empty transcript; engine failure propagates as a channel-scoped error
/// for the caller's failure policy to handle.
pub fn transcribe_channel(
    engine: &dyn SpeechToText,
    samples: &[f32],
    channel: ChannelId,
    options: &TranscribeOptions,
) -> Result<ChannelTranscript> {
    let segments = engine.transcribe(samples)?;

    let chunks = segments
        .into_iter()
        .map(|seg| TranscriptChunk {
            text: seg.text,
            speaker: options.speaker.clone(),
            local_start: seg.start,
            local_end: seg.end,
            global_start: seg.start + options.offset_seconds,
            global_end: seg.end + options.offset_seconds,
        })
        .collect();

    Ok(ChannelTranscript::new(channel, chunks))
}
