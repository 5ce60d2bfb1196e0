use thiserror::Error;

use crate::types::{ClassicQuality, Metric, WardQuality};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("no classic rule for activity state (truth={truth}, pred={pred})")]
    UnknownActivityState { truth: bool, pred: bool },
    #[error("no context rule for classic triple ({prev}, {current}, {next})")]
    UnknownContext {
        prev: ClassicQuality,
        current: ClassicQuality,
        next: ClassicQuality,
    },
    #[error("no duration/frequency bucket for ward quality {quality}")]
    UnknownBucket { quality: WardQuality },
    #[error("metric {metric} references unknown quality placeholder '{placeholder}'")]
    UnknownMetricQuality { metric: Metric, placeholder: String },
    #[error("no cluster assignment for quality {quality}")]
    UnknownCluster { quality: String },
    #[error("no formula registered for metric {metric}")]
    UnsupportedMetric { metric: Metric },
    #[error("malformed formula '{formula}' at offset {offset}: {message}")]
    MalformedFormula {
        formula: String,
        offset: usize,
        message: String,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl ScoringError {
    pub(crate) fn unknown_context(
        prev: ClassicQuality,
        current: ClassicQuality,
        next: ClassicQuality,
    ) -> Self {
        Self::UnknownContext {
            prev,
            current,
            next,
        }
    }

    pub(crate) fn unknown_cluster(quality: impl ToString) -> Self {
        Self::UnknownCluster {
            quality: quality.to_string(),
        }
    }

    pub(crate) fn malformed_formula(
        formula: impl Into<String>,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedFormula {
            formula: formula.into(),
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
