use std::collections::HashMap;

use crate::error::ScoringError;
use crate::types::{ClassicQuality, ClassicUnit, NcibiQuality, NcibiUnit, QualifiedUnit, WardQuality, WardUnit};

/// Relabel classic units by their neighbor context.
///
/// Unit i is looked up under the triple (Q[i-1], Q[i], Q[i+1]) with the
/// boundary clamped to the unit itself: the first unit is its own
/// predecessor and the last its own successor, so a single-unit sequence
/// forms the triple (Q[0], Q[0], Q[0]). Spans carry over unchanged, and
/// neighboring units that end up with the same ward label stay separate.
pub fn contextualize(
    units: &[ClassicUnit],
    rules: &HashMap<[ClassicQuality; 3], WardQuality>,
) -> Result<Vec<WardUnit>, ScoringError> {
    let last = units.len().saturating_sub(1);
    units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            let prev = units[i.saturating_sub(1)].quality;
            let next = units[(i + 1).min(last)].quality;
            let quality = rules
                .get(&[prev, unit.quality, next])
                .copied()
                .ok_or_else(|| ScoringError::unknown_context(prev, unit.quality, next))?;
            Ok(QualifiedUnit {
                quality,
                start: unit.start,
                end: unit.end,
            })
        })
        .collect()
}

/// Relabel ward units into duration/frequency buckets, unit-wise.
pub fn bucketize(
    units: &[WardUnit],
    rules: &HashMap<WardQuality, NcibiQuality>,
) -> Result<Vec<NcibiUnit>, ScoringError> {
    units
        .iter()
        .map(|unit| {
            let quality = rules
                .get(&unit.quality)
                .copied()
                .ok_or(ScoringError::UnknownBucket {
                    quality: unit.quality,
                })?;
            Ok(QualifiedUnit {
                quality,
                start: unit.start,
                end: unit.end,
            })
        })
        .collect()
}
