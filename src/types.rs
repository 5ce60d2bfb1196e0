use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ground-truth/predicted boolean pair carried by one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityState {
    pub truth: bool,
    pub pred: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSegment {
    /// Segment interval is [start, end), i.e. start inclusive/end exclusive.
    pub start: DateTime<Utc>,
    /// Segment interval is [start, end), i.e. start inclusive/end exclusive.
    pub end: DateTime<Utc>,
    pub state: ActivityState,
}

impl AnnotatedSegment {
    pub fn duration_secs(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}

/// Maximal run of consecutive segments sharing one quality label.
///
/// The span is [start, end) over segment indices of the scored sequence;
/// reclassification (ward, ncibi) relabels a unit but never changes its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualifiedUnit<Q> {
    pub quality: Q,
    pub start: usize,
    pub end: usize,
}

pub type ClassicUnit = QualifiedUnit<ClassicQuality>;
pub type WardUnit = QualifiedUnit<WardQuality>;
pub type NcibiUnit = QualifiedUnit<NcibiQuality>;

/// Quality alphabets share the operations the aggregation and formula stages
/// need: a stable placeholder token and case-insensitive resolution from one.
pub trait QualityLabel:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    fn token(self) -> &'static str;
    fn from_token(token: &str) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClassicQuality {
    Tp,
    Tn,
    Fp,
    Fn,
}

impl QualityLabel for ClassicQuality {
    fn token(self) -> &'static str {
        match self {
            Self::Tp => "TP",
            Self::Tn => "TN",
            Self::Fp => "FP",
            Self::Fn => "FN",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TP" => Some(Self::Tp),
            "TN" => Some(Self::Tn),
            "FP" => Some(Self::Fp),
            "FN" => Some(Self::Fn),
            _ => None,
        }
    }
}

impl fmt::Display for ClassicQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Event-relation label assigned per classic unit from its neighbor context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WardQuality {
    Insertion,
    Deletion,
    StartOverfill,
    StartUnderfill,
    EndOverfill,
    EndUnderfill,
    Merge,
    Fragmentation,
    Tp,
    Tn,
}

impl QualityLabel for WardQuality {
    fn token(self) -> &'static str {
        match self {
            Self::Insertion => "IN",
            Self::Deletion => "DE",
            Self::StartOverfill => "SO",
            Self::StartUnderfill => "SU",
            Self::EndOverfill => "EO",
            Self::EndUnderfill => "EU",
            Self::Merge => "ME",
            Self::Fragmentation => "FR",
            Self::Tp => "TP",
            Self::Tn => "TN",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "IN" => Some(Self::Insertion),
            "DE" => Some(Self::Deletion),
            "SO" => Some(Self::StartOverfill),
            "SU" => Some(Self::StartUnderfill),
            "EO" => Some(Self::EndOverfill),
            "EU" => Some(Self::EndUnderfill),
            "ME" => Some(Self::Merge),
            "FR" => Some(Self::Fragmentation),
            "TP" => Some(Self::Tp),
            "TN" => Some(Self::Tn),
            _ => None,
        }
    }
}

impl fmt::Display for WardQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Duration/frequency error bucket derived from a ward label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NcibiQuality {
    DurationPlus,
    DurationMinus,
    FrequencyPlus,
    FrequencyMinus,
    Tp,
    Tn,
}

impl QualityLabel for NcibiQuality {
    fn token(self) -> &'static str {
        match self {
            Self::DurationPlus => "DURPLUS",
            Self::DurationMinus => "DURMINUS",
            Self::FrequencyPlus => "FREQPLUS",
            Self::FrequencyMinus => "FREQMINUS",
            Self::Tp => "TP",
            Self::Tn => "TN",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "DURPLUS" => Some(Self::DurationPlus),
            "DURMINUS" => Some(Self::DurationMinus),
            "FREQPLUS" => Some(Self::FrequencyPlus),
            "FREQMINUS" => Some(Self::FrequencyMinus),
            "TP" => Some(Self::Tp),
            "TN" => Some(Self::Tn),
            _ => None,
        }
    }
}

impl fmt::Display for NcibiQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Normalization group; every quality of every family belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Cluster {
    Positive,
    Negative,
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassicMetric {
    Accuracy,
    F1,
    Mcc,
    Precision,
    Sensitivity,
    Specificity,
    Npv,
}

impl ClassicMetric {
    pub const ALL: [Self; 7] = [
        Self::Accuracy,
        Self::F1,
        Self::Mcc,
        Self::Precision,
        Self::Sensitivity,
        Self::Specificity,
        Self::Npv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Accuracy => "ACCURACY",
            Self::F1 => "F1",
            Self::Mcc => "MCC",
            Self::Precision => "PRC",
            Self::Sensitivity => "SNS",
            Self::Specificity => "SPC",
            Self::Npv => "NPV",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WardMetric {
    Insertion,
    Deletion,
    StartOverfill,
    StartUnderfill,
    EndOverfill,
    EndUnderfill,
    Merge,
    Fragmentation,
    Tp,
    Tn,
}

impl WardMetric {
    pub const ALL: [Self; 10] = [
        Self::Insertion,
        Self::Deletion,
        Self::StartOverfill,
        Self::StartUnderfill,
        Self::EndOverfill,
        Self::EndUnderfill,
        Self::Merge,
        Self::Fragmentation,
        Self::Tp,
        Self::Tn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Insertion => "INSERTION",
            Self::Deletion => "DELETION",
            Self::StartOverfill => "START-OVERFILL",
            Self::StartUnderfill => "START-UNDERFILL",
            Self::EndOverfill => "END-OVERFILL",
            Self::EndUnderfill => "END-UNDERFILL",
            Self::Merge => "MERGE",
            Self::Fragmentation => "FRAGMENTATION",
            Self::Tp => "TP",
            Self::Tn => "TN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NcibiMetric {
    DurationPlus,
    DurationMinus,
    FrequencyPlus,
    FrequencyMinus,
    Tp,
    Tn,
}

impl NcibiMetric {
    pub const ALL: [Self; 6] = [
        Self::DurationPlus,
        Self::DurationMinus,
        Self::FrequencyPlus,
        Self::FrequencyMinus,
        Self::Tp,
        Self::Tn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::DurationPlus => "DURATION-PLUS",
            Self::DurationMinus => "DURATION-MINUS",
            Self::FrequencyPlus => "FREQUENCY-PLUS",
            Self::FrequencyMinus => "FREQUENCY-MINUS",
            Self::Tp => "TP",
            Self::Tn => "TN",
        }
    }
}

/// Metric identifier tagged with its family.
///
/// The scorer matches on the family arm, so adding a family is a
/// compile-time-enforced change rather than a runtime branch that can fall
/// through to a silent empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Classic(ClassicMetric),
    Ward(WardMetric),
    Ncibi(NcibiMetric),
}

impl Metric {
    pub fn family(self) -> &'static str {
        match self {
            Self::Classic(_) => "classic",
            Self::Ward(_) => "ward",
            Self::Ncibi(_) => "ncibi",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Classic(m) => m.name(),
            Self::Ward(m) => m.name(),
            Self::Ncibi(m) => m.name(),
        }
    }

    pub fn all() -> impl Iterator<Item = Metric> {
        ClassicMetric::ALL
            .into_iter()
            .map(Metric::Classic)
            .chain(WardMetric::ALL.into_iter().map(Metric::Ward))
            .chain(NcibiMetric::ALL.into_iter().map(Metric::Ncibi))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family(), self.name())
    }
}
