use std::collections::{BTreeMap, HashMap};

use crate::error::ScoringError;
use crate::pipeline::traits::{ContextClassifier, FormulaEvaluator, SegmentClassifier};
use crate::scoring::classify::classify;
use crate::scoring::context::contextualize;
use crate::scoring::formula::{evaluate, Expr};
use crate::types::{AnnotatedSegment, ClassicQuality, ClassicUnit, WardQuality, WardUnit};

pub struct RunLengthClassifier;

impl SegmentClassifier for RunLengthClassifier {
    fn classify(
        &self,
        segments: &[AnnotatedSegment],
        rules: &HashMap<(bool, bool), ClassicQuality>,
    ) -> Result<Vec<ClassicUnit>, ScoringError> {
        classify(segments, rules)
    }
}

pub struct TripleContextClassifier;

impl ContextClassifier for TripleContextClassifier {
    fn contextualize(
        &self,
        units: &[ClassicUnit],
        rules: &HashMap<[ClassicQuality; 3], WardQuality>,
    ) -> Result<Vec<WardUnit>, ScoringError> {
        contextualize(units, rules)
    }
}

pub struct AstFormulaEvaluator;

impl FormulaEvaluator for AstFormulaEvaluator {
    fn evaluate(&self, expr: &Expr, bindings: &BTreeMap<String, f64>, default_value: f64) -> f64 {
        evaluate(expr, bindings, default_value)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::rules::{classic_rules, ward_rules};
    use crate::scoring::formula::parse;
    use crate::types::{ActivityState, QualifiedUnit, WardQuality};

    #[test]
    fn run_length_classifier_matches_free_function() {
        let segments: Vec<AnnotatedSegment> = [(true, true), (true, false)]
            .iter()
            .enumerate()
            .map(|(i, &(truth, pred))| AnnotatedSegment {
                start: Utc.with_ymd_and_hms(2023, 10, 1, 12, i as u32, 0).unwrap(),
                end: Utc
                    .with_ymd_and_hms(2023, 10, 1, 12, i as u32 + 1, 0)
                    .unwrap(),
                state: ActivityState { truth, pred },
            })
            .collect();
        let classifier = RunLengthClassifier;
        let units = classifier.classify(&segments, &classic_rules()).unwrap();
        let expected = classify(&segments, &classic_rules()).unwrap();
        assert_eq!(units, expected);
    }

    #[test]
    fn triple_context_classifier_matches_free_function() {
        let units = [
            QualifiedUnit { quality: ClassicQuality::Tp, start: 0, end: 1 },
            QualifiedUnit { quality: ClassicQuality::Fn, start: 1, end: 2 },
        ];
        let contextualizer = TripleContextClassifier;
        let ward = contextualizer.contextualize(&units, &ward_rules()).unwrap();
        let expected = contextualize(&units, &ward_rules()).unwrap();
        assert_eq!(ward, expected);
        assert_eq!(ward[1].quality, WardQuality::EndUnderfill);
    }

    #[test]
    fn ast_evaluator_applies_default_for_unbound_placeholders() {
        let expr = parse("(lambda_TP + lambda_TN)/2").unwrap();
        let bindings = BTreeMap::from([("TP".to_string(), 1.0)]);
        let evaluator = AstFormulaEvaluator;
        let value = evaluator.evaluate(&expr, &bindings, 0.0);
        assert!((value - 0.5).abs() < 1e-12);
    }
}
