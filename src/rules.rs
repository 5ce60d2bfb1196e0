//! Standard rule catalogue: the classification, cluster and formula tables
//! used by [`crate::config::ScoringConfig::default`]. Callers that need
//! different behavior build their own tables; the scorer treats every table
//! as opaque configuration.

use std::collections::HashMap;

use crate::types::{
    ClassicMetric, ClassicQuality, Cluster, Metric, NcibiMetric, NcibiQuality, WardMetric,
    WardQuality,
};

/// Per-segment qualification: (truth, pred) -> classic quality.
pub fn classic_rules() -> HashMap<(bool, bool), ClassicQuality> {
    HashMap::from([
        ((true, true), ClassicQuality::Tp),
        ((true, false), ClassicQuality::Fn),
        ((false, true), ClassicQuality::Fp),
        ((false, false), ClassicQuality::Tn),
    ])
}

/// Context qualification: (prev, current, next) classic triple -> ward quality.
///
/// Total over all 64 triples. Interior units never repeat their neighbor's
/// quality, but boundary clamping makes (X,X,Y), (Y,X,X) and - for a
/// single-unit sequence - (X,X,X) reachable, so the table covers them all:
/// a lone all-FP unit is an INSERTION, a lone all-FN unit a DELETION.
pub fn ward_rules() -> HashMap<[ClassicQuality; 3], WardQuality> {
    const ALPHABET: [ClassicQuality; 4] = [
        ClassicQuality::Tp,
        ClassicQuality::Tn,
        ClassicQuality::Fp,
        ClassicQuality::Fn,
    ];

    let mut table = HashMap::with_capacity(64);
    for prev in ALPHABET {
        for current in ALPHABET {
            for next in ALPHABET {
                table.insert([prev, current, next], ward_label(prev, current, next));
            }
        }
    }
    table
}

fn ward_label(prev: ClassicQuality, current: ClassicQuality, next: ClassicQuality) -> WardQuality {
    let tp = ClassicQuality::Tp;
    match current {
        ClassicQuality::Tp => WardQuality::Tp,
        ClassicQuality::Tn => WardQuality::Tn,
        ClassicQuality::Fp => match (prev == tp, next == tp) {
            (true, true) => WardQuality::Merge,
            (true, false) => WardQuality::EndOverfill,
            (false, true) => WardQuality::StartOverfill,
            (false, false) => WardQuality::Insertion,
        },
        ClassicQuality::Fn => match (prev == tp, next == tp) {
            (true, true) => WardQuality::Fragmentation,
            (true, false) => WardQuality::EndUnderfill,
            (false, true) => WardQuality::StartUnderfill,
            (false, false) => WardQuality::Deletion,
        },
    }
}

/// Duration/frequency bucketing: ward quality -> ncibi quality.
pub fn ncibi_rules() -> HashMap<WardQuality, NcibiQuality> {
    HashMap::from([
        (WardQuality::Insertion, NcibiQuality::FrequencyPlus),
        (WardQuality::Fragmentation, NcibiQuality::FrequencyPlus),
        (WardQuality::Deletion, NcibiQuality::FrequencyMinus),
        (WardQuality::Merge, NcibiQuality::FrequencyMinus),
        (WardQuality::StartOverfill, NcibiQuality::DurationPlus),
        (WardQuality::EndOverfill, NcibiQuality::DurationPlus),
        (WardQuality::StartUnderfill, NcibiQuality::DurationMinus),
        (WardQuality::EndUnderfill, NcibiQuality::DurationMinus),
        (WardQuality::Tp, NcibiQuality::Tp),
        (WardQuality::Tn, NcibiQuality::Tn),
    ])
}

pub fn classic_clusters() -> HashMap<ClassicQuality, Cluster> {
    HashMap::from([
        (ClassicQuality::Tp, Cluster::Positive),
        (ClassicQuality::Fn, Cluster::Positive),
        (ClassicQuality::Tn, Cluster::Negative),
        (ClassicQuality::Fp, Cluster::Negative),
    ])
}

pub fn ward_clusters() -> HashMap<WardQuality, Cluster> {
    HashMap::from([
        (WardQuality::Tp, Cluster::Positive),
        (WardQuality::Deletion, Cluster::Positive),
        (WardQuality::StartUnderfill, Cluster::Positive),
        (WardQuality::EndUnderfill, Cluster::Positive),
        (WardQuality::Fragmentation, Cluster::Positive),
        (WardQuality::Tn, Cluster::Negative),
        (WardQuality::Insertion, Cluster::Negative),
        (WardQuality::StartOverfill, Cluster::Negative),
        (WardQuality::EndOverfill, Cluster::Negative),
        (WardQuality::Merge, Cluster::Negative),
    ])
}

/// Minus buckets under-detect the positive class and normalize with TP;
/// plus buckets over-detect it and normalize with TN.
pub fn ncibi_clusters() -> HashMap<NcibiQuality, Cluster> {
    HashMap::from([
        (NcibiQuality::Tp, Cluster::Positive),
        (NcibiQuality::DurationMinus, Cluster::Positive),
        (NcibiQuality::FrequencyMinus, Cluster::Positive),
        (NcibiQuality::Tn, Cluster::Negative),
        (NcibiQuality::DurationPlus, Cluster::Negative),
        (NcibiQuality::FrequencyPlus, Cluster::Negative),
    ])
}

/// Metric -> formula string, one row per catalogue metric. Placeholders are
/// `lambda_` followed by a quality token of the metric's own family.
pub fn metric_formulas() -> HashMap<Metric, String> {
    let mut table = HashMap::new();

    let classic: [(ClassicMetric, &str); 7] = [
        (ClassicMetric::Accuracy, "(lambda_TP + lambda_TN)/2"),
        (ClassicMetric::F1, "(2 * lambda_TP)/(2 + lambda_TP - lambda_TN)"),
        (
            ClassicMetric::Mcc,
            "0.5 * (((lambda_TP+lambda_TN-1)/(((lambda_TP+1-lambda_TN)*(lambda_TN+1-lambda_TP))**0.5)) + 1)",
        ),
        (ClassicMetric::Precision, "lambda_TP/(lambda_TP + (1-lambda_TN))"),
        (ClassicMetric::Sensitivity, "lambda_TP"),
        (ClassicMetric::Specificity, "lambda_TN"),
        (ClassicMetric::Npv, "lambda_TN/(lambda_TN + (1-lambda_TP))"),
    ];
    for (metric, formula) in classic {
        table.insert(Metric::Classic(metric), formula.to_string());
    }

    let ward: [(WardMetric, &str); 10] = [
        (WardMetric::Insertion, "lambda_IN"),
        (WardMetric::Deletion, "lambda_DE"),
        (WardMetric::StartOverfill, "lambda_SO"),
        (WardMetric::StartUnderfill, "lambda_SU"),
        (WardMetric::EndOverfill, "lambda_EO"),
        (WardMetric::EndUnderfill, "lambda_EU"),
        (WardMetric::Merge, "lambda_ME"),
        (WardMetric::Fragmentation, "lambda_FR"),
        (WardMetric::Tp, "lambda_TP"),
        (WardMetric::Tn, "lambda_TN"),
    ];
    for (metric, formula) in ward {
        table.insert(Metric::Ward(metric), formula.to_string());
    }

    let ncibi: [(NcibiMetric, &str); 6] = [
        (NcibiMetric::DurationPlus, "lambda_DURPLUS"),
        (NcibiMetric::DurationMinus, "lambda_DURMINUS"),
        (NcibiMetric::FrequencyPlus, "lambda_FREQPLUS"),
        (NcibiMetric::FrequencyMinus, "lambda_FREQMINUS"),
        (NcibiMetric::Tp, "lambda_TP"),
        (NcibiMetric::Tn, "lambda_TN"),
    ];
    for (metric, formula) in ncibi {
        table.insert(Metric::Ncibi(metric), formula.to_string());
    }

    table
}
