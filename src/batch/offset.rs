use crate::batch::ChannelId;
use crate::error::{ChoraleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How channel offsets are quantized.
///
/// The channels of a batch stop recording together but may start at
/// different times, so each channel is shifted by how much shorter it is
/// than the longest one. Whether that shift keeps sub-second precision is a
/// deployment choice, not a hidden constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OffsetPrecision {
    /// Truncate offsets to whole seconds
    #[default]
    WholeSeconds,
    /// Keep sub-second precision
    Exact,
}

/// Compute each channel's shift into the shared timeline:
/// `offset = max(durations) - duration`. Requires a non-empty batch.
pub fn compute_offsets(
    durations: &HashMap<ChannelId, f64>,
    precision: OffsetPrecision,
) -> Result<HashMap<ChannelId, f64>> {
    if durations.is_empty() {
        return Err(ChoraleError::EmptyBatch);
    }

    let max = durations.values().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

    Ok(durations
        .iter()
        .map(|(id, &duration)| {
            let offset = max - duration;
            let offset = match precision {
                OffsetPrecision::WholeSeconds => offset.trunc(),
                OffsetPrecision::Exact => offset,
            };
            (id.clone(), offset)
        })
        .collect())
}
