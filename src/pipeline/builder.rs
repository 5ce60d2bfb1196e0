use crate::config::ScoringConfig;
use crate::error::ScoringError;
use crate::pipeline::defaults::{AstFormulaEvaluator, RunLengthClassifier, TripleContextClassifier};
use crate::pipeline::runtime::{Scorer, ScorerParts};
use crate::pipeline::traits::{ContextClassifier, FormulaEvaluator, SegmentClassifier};

pub struct ScorerBuilder {
    config: ScoringConfig,
    classifier: Option<Box<dyn SegmentClassifier>>,
    contextualizer: Option<Box<dyn ContextClassifier>>,
    evaluator: Option<Box<dyn FormulaEvaluator>>,
}

impl ScorerBuilder {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            classifier: None,
            contextualizer: None,
            evaluator: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Box<dyn SegmentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_contextualizer(mut self, contextualizer: Box<dyn ContextClassifier>) -> Self {
        self.contextualizer = Some(contextualizer);
        self
    }

    pub fn with_evaluator(mut self, evaluator: Box<dyn FormulaEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn build(self) -> Result<Scorer, ScoringError> {
        if !self.config.default_value.is_finite() {
            return Err(ScoringError::invalid_input(format!(
                "default value must be finite, got {}",
                self.config.default_value
            )));
        }

        Ok(Scorer::from_parts(ScorerParts {
            config: self.config,
            classifier: self
                .classifier
                .unwrap_or_else(|| Box::new(RunLengthClassifier)),
            contextualizer: self
                .contextualizer
                .unwrap_or_else(|| Box::new(TripleContextClassifier)),
            evaluator: self
                .evaluator
                .unwrap_or_else(|| Box::new(AstFormulaEvaluator)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_the_stock_stages() {
        let builder = ScorerBuilder::new(ScoringConfig::default());
        assert!(builder.classifier.is_none());
        assert!(builder.contextualizer.is_none());
        assert!(builder.evaluator.is_none());
        assert!(builder.build().is_ok());
    }

    #[test]
    fn build_rejects_non_finite_default_value() {
        let config = ScoringConfig {
            default_value: f64::NAN,
            ..ScoringConfig::default()
        };
        let result = ScorerBuilder::new(config).build();
        assert!(result.is_err());
    }

    #[test]
    fn build_accepts_stage_overrides() {
        use std::collections::HashMap;

        use crate::pipeline::traits::SegmentClassifier;
        use crate::types::{AnnotatedSegment, ClassicQuality, ClassicUnit};

        struct EmptyClassifier;

        impl SegmentClassifier for EmptyClassifier {
            fn classify(
                &self,
                _segments: &[AnnotatedSegment],
                _rules: &HashMap<(bool, bool), ClassicQuality>,
            ) -> Result<Vec<ClassicUnit>, ScoringError> {
                Ok(Vec::new())
            }
        }

        let scorer = ScorerBuilder::new(ScoringConfig::default())
            .with_classifier(Box::new(EmptyClassifier))
            .build()
            .unwrap();
        let value = scorer
            .score(
                &[],
                crate::types::Metric::Classic(crate::types::ClassicMetric::Accuracy),
            )
            .unwrap();
        assert_eq!(value, 0.0);
    }
}
