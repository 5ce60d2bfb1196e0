pub mod config;
pub mod error;
pub mod pipeline;
pub mod rules;
pub mod scoring;
pub mod types;

pub use config::ScoringConfig;
pub use error::ScoringError;
pub use pipeline::builder::ScorerBuilder;
pub use pipeline::runtime::{score_annotated_segments, Scorer};
pub use pipeline::traits::{ContextClassifier, FormulaEvaluator, SegmentClassifier};
pub use types::{
    ActivityState, AnnotatedSegment, ClassicMetric, ClassicQuality, ClassicUnit, Cluster, Metric,
    NcibiMetric, NcibiQuality, NcibiUnit, QualifiedUnit, QualityLabel, WardMetric, WardQuality,
    WardUnit,
};
