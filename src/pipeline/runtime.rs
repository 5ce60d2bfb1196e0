use std::collections::{BTreeMap, BTreeSet};

use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::traits::{ContextClassifier, FormulaEvaluator, SegmentClassifier};
use crate::scoring::{aggregate, context, formula};
use crate::types::{AnnotatedSegment, Metric, NcibiQuality, QualityLabel};

/// Scores segment sequences against configured metrics.
///
/// One pipeline per metric family, composed from the stage seams: classic
/// classification always runs first, ward classification only for ward and
/// ncibi metrics, and duration aggregation only for ncibi metrics. A scorer
/// is immutable after construction; concurrent `score` calls share nothing
/// mutable.
pub struct Scorer {
    config: ScoringConfig,
    classifier: Box<dyn SegmentClassifier>,
    contextualizer: Box<dyn ContextClassifier>,
    evaluator: Box<dyn FormulaEvaluator>,
}

pub(crate) struct ScorerParts {
    pub config: ScoringConfig,
    pub classifier: Box<dyn SegmentClassifier>,
    pub contextualizer: Box<dyn ContextClassifier>,
    pub evaluator: Box<dyn FormulaEvaluator>,
}

impl Scorer {
    pub(crate) fn from_parts(parts: ScorerParts) -> Self {
        Self {
            config: parts.config,
            classifier: parts.classifier,
            contextualizer: parts.contextualizer,
            evaluator: parts.evaluator,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(
        &self,
        segments: &[AnnotatedSegment],
        metric: Metric,
    ) -> Result<f64, ScoringError> {
        validate_segments(segments)?;

        let formula_src = self
            .config
            .formulas
            .get(&metric)
            .ok_or(ScoringError::UnsupportedMetric { metric })?;
        let expr = formula::parse(formula_src)?;
        let placeholders = expr.placeholder_set();

        match metric {
            Metric::Classic(_) => self.score_classic(segments, metric, &expr, &placeholders),
            Metric::Ward(_) => self.score_ward(segments, metric, &expr, &placeholders),
            Metric::Ncibi(_) => self.score_ncibi(segments, metric, &expr, &placeholders),
        }
    }

    fn score_classic(
        &self,
        segments: &[AnnotatedSegment],
        metric: Metric,
        expr: &formula::Expr,
        placeholders: &BTreeSet<String>,
    ) -> Result<f64, ScoringError> {
        let resolved = resolve_placeholders(metric, placeholders)?;
        let required = resolved.values().copied().collect();

        let units = self.classifier.classify(segments, &self.config.classic_rules)?;
        let kept = aggregate::filter_units(&units, &required);
        let quantities = aggregate::count_units(&kept);
        let normalized = aggregate::normalize(&quantities, &self.config.classic_clusters)?;
        Ok(self.finish(metric, expr, &resolved, &normalized))
    }

    fn score_ward(
        &self,
        segments: &[AnnotatedSegment],
        metric: Metric,
        expr: &formula::Expr,
        placeholders: &BTreeSet<String>,
    ) -> Result<f64, ScoringError> {
        let resolved = resolve_placeholders(metric, placeholders)?;
        let required = resolved.values().copied().collect();

        let units = self.classifier.classify(segments, &self.config.classic_rules)?;
        let ward_units = self
            .contextualizer
            .contextualize(&units, &self.config.ward_rules)?;
        let kept = aggregate::filter_units(&ward_units, &required);
        let quantities = aggregate::count_units(&kept);
        let normalized = aggregate::normalize(&quantities, &self.config.ward_clusters)?;
        Ok(self.finish(metric, expr, &resolved, &normalized))
    }

    fn score_ncibi(
        &self,
        segments: &[AnnotatedSegment],
        metric: Metric,
        expr: &formula::Expr,
        placeholders: &BTreeSet<String>,
    ) -> Result<f64, ScoringError> {
        let resolved: BTreeMap<String, NcibiQuality> =
            resolve_placeholders(metric, placeholders)?;
        let required = resolved.values().copied().collect();

        let units = self.classifier.classify(segments, &self.config.classic_rules)?;
        let ward_units = self
            .contextualizer
            .contextualize(&units, &self.config.ward_rules)?;
        let ncibi_units = context::bucketize(&ward_units, &self.config.ncibi_rules)?;
        let kept = aggregate::filter_units(&ncibi_units, &required);
        let quantities = aggregate::sum_durations(&kept, segments);
        let normalized = aggregate::normalize(&quantities, &self.config.ncibi_clusters)?;
        Ok(self.finish(metric, expr, &resolved, &normalized))
    }

    /// Bind each placeholder (under its as-written token) to its normalized
    /// value and evaluate; placeholders whose quality is absent stay unbound
    /// and pick up the configured default inside the evaluator.
    fn finish<Q: QualityLabel>(
        &self,
        metric: Metric,
        expr: &formula::Expr,
        resolved: &BTreeMap<String, Q>,
        normalized: &BTreeMap<Q, f64>,
    ) -> f64 {
        let bindings: BTreeMap<String, f64> = resolved
            .iter()
            .filter_map(|(token, quality)| {
                normalized.get(quality).map(|value| (token.clone(), *value))
            })
            .collect();
        let value = self
            .evaluator
            .evaluate(expr, &bindings, self.config.default_value);
        tracing::debug!(metric = %metric, bound = bindings.len(), value, "evaluated metric");
        value
    }
}

/// Convenience wrapper mirroring the plain-function entry point: build a
/// scorer with the default stages and score one metric.
pub fn score_annotated_segments(
    segments: &[AnnotatedSegment],
    metric: Metric,
    config: &ScoringConfig,
) -> Result<f64, ScoringError> {
    crate::pipeline::builder::ScorerBuilder::new(config.clone())
        .build()?
        .score(segments, metric)
}

/// Resolve placeholder tokens against the metric family's own alphabet,
/// case-insensitively. Short tokens like `TP` exist in several alphabets,
/// so resolution is scoped by the family rather than probed across them.
fn resolve_placeholders<Q: QualityLabel>(
    metric: Metric,
    placeholders: &BTreeSet<String>,
) -> Result<BTreeMap<String, Q>, ScoringError> {
    placeholders
        .iter()
        .map(|token| {
            Q::from_token(token)
                .map(|quality| (token.clone(), quality))
                .ok_or_else(|| ScoringError::UnknownMetricQuality {
                    metric,
                    placeholder: token.clone(),
                })
        })
        .collect()
}

fn validate_segments(segments: &[AnnotatedSegment]) -> Result<(), ScoringError> {
    for (index, segment) in segments.iter().enumerate() {
        if segment.end < segment.start {
            return Err(ScoringError::invalid_input(format!(
                "segment {index} ends before it starts"
            )));
        }
    }
    for (index, pair) in segments.windows(2).enumerate() {
        if pair[1].start < pair[0].end {
            return Err(ScoringError::invalid_input(format!(
                "segments {index} and {} overlap",
                index + 1
            )));
        }
        if pair[1].start > pair[0].end {
            tracing::warn!(
                index,
                "gap between consecutive segments; durations will span it"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::pipeline::builder::ScorerBuilder;
    use crate::types::{ActivityState, ClassicMetric, NcibiMetric, WardMetric};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 10, 1, 12 + minute / 60, minute % 60, 0)
            .unwrap()
    }

    fn segment(start_min: u32, end_min: u32, truth: bool, pred: bool) -> AnnotatedSegment {
        AnnotatedSegment {
            start: at(start_min),
            end: at(end_min),
            state: ActivityState { truth, pred },
        }
    }

    /// 5, 10, 30 and 10 minute segments; prediction misses the third.
    fn reference_day() -> Vec<AnnotatedSegment> {
        vec![
            segment(0, 5, true, true),
            segment(5, 15, true, true),
            segment(15, 45, true, false),
            segment(45, 55, true, true),
        ]
    }

    fn scorer() -> Scorer {
        ScorerBuilder::new(ScoringConfig::default())
            .build()
            .expect("default config should build")
    }

    #[test]
    fn accuracy_on_the_reference_day() {
        let value = scorer()
            .score(&reference_day(), Metric::Classic(ClassicMetric::Accuracy))
            .unwrap();
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_input_falls_back_to_the_default_value() {
        let value = scorer()
            .score(&[], Metric::Classic(ClassicMetric::Accuracy))
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn single_negative_segment_scores_half_accuracy() {
        let segments = vec![segment(0, 5, false, false)];
        let value = scorer()
            .score(&segments, Metric::Classic(ClassicMetric::Accuracy))
            .unwrap();
        assert!((value - 0.5).abs() < 1e-12);
    }

    #[test]
    fn fragmentation_on_the_reference_day() {
        let value = scorer()
            .score(&reference_day(), Metric::Ward(WardMetric::Fragmentation))
            .unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn absent_ward_quality_scores_the_default() {
        let value = scorer()
            .score(&reference_day(), Metric::Ward(WardMetric::Insertion))
            .unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn ncibi_durations_flow_through_the_bucket_pipeline() {
        // The fragmented FN run becomes FREQPLUS; it is the only quality in
        // its cluster, so it normalizes to 1.
        let value = scorer()
            .score(&reference_day(), Metric::Ncibi(NcibiMetric::FrequencyPlus))
            .unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn missing_formula_row_is_unsupported_metric() {
        let mut config = ScoringConfig::default();
        config.formulas.remove(&Metric::Ward(WardMetric::Merge));
        let scorer = ScorerBuilder::new(config).build().unwrap();
        let err = scorer
            .score(&reference_day(), Metric::Ward(WardMetric::Merge))
            .unwrap_err();
        assert!(matches!(err, ScoringError::UnsupportedMetric { .. }));
    }

    #[test]
    fn placeholder_outside_the_family_alphabet_is_rejected() {
        let mut config = ScoringConfig::default();
        config.formulas.insert(
            Metric::Classic(ClassicMetric::Sensitivity),
            "lambda_IN".to_string(),
        );
        let scorer = ScorerBuilder::new(config).build().unwrap();
        let err = scorer
            .score(&reference_day(), Metric::Classic(ClassicMetric::Sensitivity))
            .unwrap_err();
        match err {
            ScoringError::UnknownMetricQuality { placeholder, .. } => {
                assert_eq!(placeholder, "IN");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overlapping_segments_are_rejected() {
        let segments = vec![segment(0, 10, true, true), segment(5, 15, true, true)];
        let err = scorer()
            .score(&segments, Metric::Classic(ClassicMetric::Accuracy))
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { .. }));
    }

    #[test]
    fn reversed_segment_is_rejected() {
        let segments = vec![AnnotatedSegment {
            start: at(10),
            end: at(5),
            state: ActivityState { truth: true, pred: true },
        }];
        let err = scorer()
            .score(&segments, Metric::Classic(ClassicMetric::Accuracy))
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput { .. }));
    }

    #[test]
    fn lowercase_placeholders_resolve_case_insensitively() {
        let mut config = ScoringConfig::default();
        config.formulas.insert(
            Metric::Classic(ClassicMetric::Sensitivity),
            "lambda_tp".to_string(),
        );
        let scorer = ScorerBuilder::new(config).build().unwrap();
        let value = scorer
            .score(&reference_day(), Metric::Classic(ClassicMetric::Sensitivity))
            .unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }
}
