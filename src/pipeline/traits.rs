use std::collections::{BTreeMap, HashMap};

use crate::error::ScoringError;
use crate::scoring::formula::Expr;
use crate::types::{AnnotatedSegment, ClassicQuality, ClassicUnit, WardQuality, WardUnit};

pub trait SegmentClassifier: Send + Sync {
    fn classify(
        &self,
        segments: &[AnnotatedSegment],
        rules: &HashMap<(bool, bool), ClassicQuality>,
    ) -> Result<Vec<ClassicUnit>, ScoringError>;
}

pub trait ContextClassifier: Send + Sync {
    fn contextualize(
        &self,
        units: &[ClassicUnit],
        rules: &HashMap<[ClassicQuality; 3], WardQuality>,
    ) -> Result<Vec<WardUnit>, ScoringError>;
}

pub trait FormulaEvaluator: Send + Sync {
    /// Bindings are keyed by the placeholder token as written in the
    /// formula; unbound placeholders and zero denominators both fall back
    /// to `default_value`.
    fn evaluate(&self, expr: &Expr, bindings: &BTreeMap<String, f64>, default_value: f64) -> f64;
}
