use crate::error::{ChoraleError, Result};
use crate::transcription::ChannelTranscript;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One entry of the persisted artifact: timestamps are on the shared
/// timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactChunk {
    pub text: String,
    pub speaker: String,
    pub start: f64,
    pub end: f64,
}

impl ArtifactChunk {
    pub fn format_timestamp(&self) -> String {
        let total = self.start as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Artifact {
    output: Vec<ArtifactChunk>,
}

/// The merged, globally ordered transcript of one batch. The generation
/// timestamp is metadata only and never serialized, so merging the same
/// inputs again reproduces the artifact byte for byte.
#[derive(Debug, Clone)]
pub struct MergedTranscript {
    pub output: Vec<ArtifactChunk>,
    pub generated_at: DateTime<Utc>,
}

impl MergedTranscript {
    pub fn chunk_count(&self) -> usize {
        self.output.len()
    }
}

/// Flatten all channel transcripts and sort by global start time.
///
/// Ties are broken by channel id, then intra-channel chunk index, so the
/// result is identical no matter what order the transcripts arrive in.
pub fn merge_transcripts(transcripts: &[ChannelTranscript]) -> MergedTranscript {
    let mut entries: Vec<_> = transcripts
        .iter()
        .flat_map(|t| {
            t.chunks
                .iter()
                .enumerate()
                .map(move |(index, chunk)| (&t.channel, index, chunk))
        })
        .collect();

    entries.sort_by(|a, b| {
        a.2.global_start
            .total_cmp(&b.2.global_start)
            .then_with(|| a.0.cmp(b.0))
            .then_with(|| a.1.cmp(&b.1))
    });

    let output = entries
        .into_iter()
        .map(|(_, _, chunk)| ArtifactChunk {
            text: chunk.text.clone(),
            speaker: chunk.speaker.clone(),
            start: chunk.global_start,
            end: chunk.global_end,
        })
        .collect();

    MergedTranscript {
        output,
        generated_at: Utc::now(),
    }
}

/// Serialize the merged transcript to its artifact form
pub fn render_artifact(merged: &MergedTranscript) -> Result<String> {
    let artifact = Artifact {
        output: merged.output.clone(),
    };
    Ok(serde_json::to_string_pretty(&artifact)?)
}

/// Persist the artifact atomically: write a temp file next to the
/// destination, then rename over it. A failed write never leaves a partial
/// artifact visible.
pub fn write_artifact(merged: &MergedTranscript, path: &Path) -> Result<()> {
    let json = render_artifact(merged)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| ChoraleError::Merge(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &json)
        .map_err(|e| ChoraleError::Merge(format!("Failed to write artifact: {}", e)))?;
    fs::rename(&temp_path, path)
        .map_err(|e| ChoraleError::Merge(format!("Failed to commit artifact: {}", e)))?;

    Ok(())
}

/// Read a persisted artifact back into its ordered chunk sequence
pub fn read_artifact(path: &Path) -> Result<Vec<ArtifactChunk>> {
    let content = fs::read_to_string(path)?;
    let artifact: Artifact = serde_json::from_str(&content)?;
    Ok(artifact.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ChannelId;
    use crate::transcription::TranscriptChunk;
    use tempfile::tempdir;

    fn chunk(text: &str, speaker: &str, start: f64, end: f64) -> TranscriptChunk {
        TranscriptChunk {
            text: text.to_string(),
            speaker: speaker.to_string(),
            local_start: start,
            local_end: end,
            global_start: start,
            global_end: end,
        }
    }

    fn transcript(channel: &str, chunks: Vec<TranscriptChunk>) -> ChannelTranscript {
        ChannelTranscript::new(ChannelId::from(channel), chunks)
    }

    #[test]
    fn test_merge_orders_by_global_start() {
        let merged = merge_transcripts(&[
            transcript("a", vec![chunk("late", "alice", 5.0, 6.0)]),
            transcript("b", vec![chunk("early", "bob", 1.0, 2.0)]),
        ]);

        assert_eq!(merged.output[0].text, "early");
        assert_eq!(merged.output[1].text, "late");
        assert!(merged
            .output
            .windows(2)
            .all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn test_merge_is_deterministic_across_input_orders() {
        let a = transcript(
            "a",
            vec![chunk("a1", "alice", 0.0, 1.0), chunk("a2", "alice", 2.0, 3.0)],
        );
        let b = transcript(
            "b",
            vec![chunk("b1", "bob", 0.0, 1.0), chunk("b2", "bob", 2.0, 3.0)],
        );

        let forward = merge_transcripts(&[a.clone(), b.clone()]);
        let backward = merge_transcripts(&[b, a]);

        assert_eq!(forward.output, backward.output);
    }

    #[test]
    fn test_tie_break_by_channel_then_index() {
        // both channels start talking at 0.0
        let merged = merge_transcripts(&[
            transcript("zeta", vec![chunk("z", "zoe", 0.0, 1.0)]),
            transcript(
                "alpha",
                vec![chunk("a1", "abe", 0.0, 1.0), chunk("a2", "abe", 0.0, 1.0)],
            ),
        ]);

        let texts: Vec<_> = merged.output.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a1", "a2", "z"]);
    }

    #[test]
    fn test_merge_empty_set_is_empty() {
        let merged = merge_transcripts(&[]);
        assert_eq!(merged.chunk_count(), 0);
    }

    #[test]
    fn test_empty_channel_contributes_nothing() {
        let merged = merge_transcripts(&[
            transcript("quiet", vec![]),
            transcript("talk", vec![chunk("words", "carol", 0.0, 1.0)]),
        ]);
        assert_eq!(merged.chunk_count(), 1);
    }

    #[test]
    fn test_artifact_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");

        let merged = merge_transcripts(&[transcript(
            "a",
            vec![chunk("hello", "alice", 0.5, 1.5), chunk("again", "alice", 2.0, 2.5)],
        )]);
        write_artifact(&merged, &path).unwrap();

        let chunks = read_artifact(&path).unwrap();
        assert_eq!(chunks, merged.output);
    }

    #[test]
    fn test_remerge_of_readback_is_byte_identical() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");

        let merged = merge_transcripts(&[
            transcript("a", vec![chunk("one", "alice", 0.0, 1.0)]),
            transcript("b", vec![chunk("two", "bob", 0.25, 0.75)]),
        ]);
        write_artifact(&merged, &path).unwrap();
        let first_bytes = fs::read(&path).unwrap();

        // read back, rebuild a transcript whose local timeline is the shared
        // one, merge again
        let readback = read_artifact(&path).unwrap();
        let rebuilt = transcript(
            "readback",
            readback
                .iter()
                .map(|c| chunk(&c.text, &c.speaker, c.start, c.end))
                .collect(),
        );
        let remerged = merge_transcripts(&[rebuilt]);
        write_artifact(&remerged, &path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), first_bytes);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");

        let merged = merge_transcripts(&[transcript("a", vec![chunk("x", "s", 0.0, 1.0)])]);
        write_artifact(&merged, &path).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_write_failure_is_merge_error() {
        let merged = merge_transcripts(&[]);
        let result = write_artifact(&merged, Path::new("/proc/invalid/output.json"));
        assert!(matches!(result, Err(ChoraleError::Merge(_))));
    }

    #[test]
    fn test_format_timestamp() {
        let entry = ArtifactChunk {
            text: "x".to_string(),
            speaker: "s".to_string(),
            start: 125.7,
            end: 126.0,
        };
        assert_eq!(entry.format_timestamp(), "02:05");
    }
}
