use std::collections::HashMap;

use crate::rules;
use crate::types::{ClassicQuality, Cluster, Metric, NcibiQuality, WardQuality};

/// Rule tables and fallback value consumed by a scorer.
///
/// Every table is caller-owned configuration: the scorer looks entries up
/// and never mutates or extends them. `Default` yields the standard
/// catalogue from [`crate::rules`].
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Metric -> arithmetic formula over `lambda_` quality placeholders.
    pub formulas: HashMap<Metric, String>,
    pub classic_rules: HashMap<(bool, bool), ClassicQuality>,
    pub ward_rules: HashMap<[ClassicQuality; 3], WardQuality>,
    pub ncibi_rules: HashMap<WardQuality, NcibiQuality>,
    pub classic_clusters: HashMap<ClassicQuality, Cluster>,
    pub ward_clusters: HashMap<WardQuality, Cluster>,
    pub ncibi_clusters: HashMap<NcibiQuality, Cluster>,
    /// Substituted for qualities absent from the normalized map and returned
    /// whenever a formula denominator evaluates to zero.
    pub default_value: f64,
}

impl ScoringConfig {
    pub const DEFAULT_VALUE: f64 = 0.0;
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            formulas: rules::metric_formulas(),
            classic_rules: rules::classic_rules(),
            ward_rules: rules::ward_rules(),
            ncibi_rules: rules::ncibi_rules(),
            classic_clusters: rules::classic_clusters(),
            ward_clusters: rules::ward_clusters(),
            ncibi_clusters: rules::ncibi_clusters(),
            default_value: Self::DEFAULT_VALUE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_carries_the_standard_catalogue() {
        let config = ScoringConfig::default();
        assert_eq!(config.formulas.len(), 23);
        assert_eq!(config.classic_rules.len(), 4);
        assert_eq!(config.ward_rules.len(), 64);
        assert_eq!(config.ncibi_rules.len(), 10);
        assert_eq!(config.classic_clusters.len(), 4);
        assert_eq!(config.ward_clusters.len(), 10);
        assert_eq!(config.ncibi_clusters.len(), 6);
        assert_eq!(config.default_value, 0.0);
        assert_eq!(config.default_value, ScoringConfig::DEFAULT_VALUE);
    }

    #[test]
    fn default_config_covers_every_catalogue_metric() {
        let config = ScoringConfig::default();
        for metric in Metric::all() {
            assert!(config.formulas.contains_key(&metric), "missing {metric}");
        }
    }
}
