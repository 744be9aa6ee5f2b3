#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

pub mod offset;
pub mod runner;
pub mod speaker;

/// Unique channel identifier within a batch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique batch identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub String);

impl BatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recorded track of a session, fully described before transcription.
/// Immutable once the offset has been assigned.
#[derive(Debug, Clone)]
pub struct AudioChannel {
    pub id: ChannelId,
    pub path: PathBuf,
    pub speaker: String,
    /// Recorded length in seconds
    pub duration: f64,
    /// Shift into the shared timeline, in seconds
    pub offset: f64,
}

/// What a failed channel does to the rest of its batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Any channel failure fails the whole batch; no artifact is written
    #[default]
    FailFast,
    /// Failed channels are dropped; the artifact covers the survivors
    BestEffort,
}

impl std::str::FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail-fast" => Ok(Self::FailFast),
            "best-effort" => Ok(Self::BestEffort),
            other => Err(format!(
                "unknown failure policy '{}' (expected fail-fast or best-effort)",
                other
            )),
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Summary of a completed batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_id: BatchId,
    pub artifact_path: PathBuf,
    pub channels_merged: usize,
    pub channels_failed: Vec<ChannelId>,
    pub chunk_count: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_channel_id_ordering_is_lexicographic() {
        let a = ChannelId::from("alpha");
        let b = ChannelId::from("beta");
        assert!(a < b);
    }

    #[test]
    fn test_batch_ids_are_unique() {
        assert_ne!(BatchId::new(), BatchId::new());
    }

    #[test]
    fn test_failure_policy_from_str() {
        assert_eq!(
            FailurePolicy::from_str("fail-fast").unwrap(),
            FailurePolicy::FailFast
        );
        assert_eq!(
            FailurePolicy::from_str("best-effort").unwrap(),
            FailurePolicy::BestEffort
        );
        assert!(FailurePolicy::from_str("shrug").is_err());
    }

    #[test]
    fn test_failure_policy_display_roundtrip() {
        for policy in [FailurePolicy::FailFast, FailurePolicy::BestEffort] {
            assert_eq!(FailurePolicy::from_str(&policy.to_string()).unwrap(), policy);
        }
    }
}
