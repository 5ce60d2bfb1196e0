use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::ScoringError;
use crate::types::{AnnotatedSegment, Cluster, QualifiedUnit, QualityLabel};

/// Keep only units whose quality the metric's formula actually references.
pub fn filter_units<Q: QualityLabel>(
    units: &[QualifiedUnit<Q>],
    required: &BTreeSet<Q>,
) -> Vec<QualifiedUnit<Q>> {
    units
        .iter()
        .filter(|unit| required.contains(&unit.quality))
        .copied()
        .collect()
}

/// Quantity map for classic/ward metrics: units per quality.
///
/// A quality with no units is absent from the map, not present with zero;
/// downstream refill relies on the distinction.
pub fn count_units<Q: QualityLabel>(units: &[QualifiedUnit<Q>]) -> BTreeMap<Q, f64> {
    let mut quantities = BTreeMap::new();
    for unit in units {
        *quantities.entry(unit.quality).or_insert(0.0) += 1.0;
    }
    quantities
}

/// Quantity map for ncibi metrics: summed wall-clock seconds per quality.
///
/// A unit's duration runs from the start of its first covered segment to the
/// end of its last, so inter-segment gaps inside the span are counted.
pub fn sum_durations<Q: QualityLabel>(
    units: &[QualifiedUnit<Q>],
    segments: &[AnnotatedSegment],
) -> BTreeMap<Q, f64> {
    let mut quantities = BTreeMap::new();
    for unit in units {
        let span_secs = (segments[unit.end - 1].end - segments[unit.start].start)
            .num_milliseconds() as f64
            / 1000.0;
        *quantities.entry(unit.quality).or_insert(0.0) += span_secs;
    }
    quantities
}

/// Rescale quantities to fractions within their cluster.
///
/// For every present quality the denominator is the sum over present
/// qualities of the same cluster, so each non-empty cluster's fractions sum
/// to 1. A cluster whose present quantities sum to zero (zero-duration units
/// only) is dropped instead of divided: its qualities fall back to the
/// configured default at refill, the same fallback evaluation-time zero
/// division uses.
pub fn normalize<Q: QualityLabel>(
    quantities: &BTreeMap<Q, f64>,
    clusters: &HashMap<Q, Cluster>,
) -> Result<BTreeMap<Q, f64>, ScoringError> {
    let mut cluster_sums: BTreeMap<Cluster, f64> = BTreeMap::new();
    for (&quality, &quantity) in quantities {
        let cluster = cluster_for(quality, clusters)?;
        *cluster_sums.entry(cluster).or_insert(0.0) += quantity;
    }

    let mut normalized = BTreeMap::new();
    for (&quality, &quantity) in quantities {
        let cluster = cluster_for(quality, clusters)?;
        let denominator = cluster_sums[&cluster];
        if denominator == 0.0 {
            tracing::warn!(
                quality = %quality,
                cluster = %cluster,
                "cluster quantities sum to zero; deferring to the default value"
            );
            continue;
        }
        normalized.insert(quality, quantity / denominator);
    }
    Ok(normalized)
}

fn cluster_for<Q: QualityLabel>(
    quality: Q,
    clusters: &HashMap<Q, Cluster>,
) -> Result<Cluster, ScoringError> {
    clusters
        .get(&quality)
        .copied()
        .ok_or_else(|| ScoringError::unknown_cluster(quality))
}
