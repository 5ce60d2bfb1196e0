use std::collections::HashMap;

use crate::error::ScoringError;
use crate::types::{AnnotatedSegment, ClassicQuality, ClassicUnit, QualifiedUnit};

/// Look up the classic quality of every segment in input order.
///
/// The rule table must be total over the four boolean pairs; a gap is a
/// configuration error, not a skippable segment.
pub fn tag_segments(
    segments: &[AnnotatedSegment],
    rules: &HashMap<(bool, bool), ClassicQuality>,
) -> Result<Vec<ClassicQuality>, ScoringError> {
    segments
        .iter()
        .map(|segment| {
            rules
                .get(&(segment.state.truth, segment.state.pred))
                .copied()
                .ok_or(ScoringError::UnknownActivityState {
                    truth: segment.state.truth,
                    pred: segment.state.pred,
                })
        })
        .collect()
}

/// Collapse consecutive equal qualities into maximal units.
///
/// The scan preserves positional order; runs are contiguous by construction,
/// so the emitted units tile [0, N) with no gap or overlap and no two
/// consecutive units share a quality.
pub fn collapse_runs(qualities: &[ClassicQuality]) -> Vec<ClassicUnit> {
    let mut units = Vec::new();
    let mut run_start = 0usize;
    let mut run_quality: Option<ClassicQuality> = None;

    for (index, &quality) in qualities.iter().enumerate() {
        match run_quality {
            Some(current) if current == quality => {}
            Some(current) => {
                units.push(QualifiedUnit {
                    quality: current,
                    start: run_start,
                    end: index,
                });
                run_start = index;
                run_quality = Some(quality);
            }
            None => {
                run_start = index;
                run_quality = Some(quality);
            }
        }
    }

    if let Some(current) = run_quality {
        units.push(QualifiedUnit {
            quality: current,
            start: run_start,
            end: qualities.len(),
        });
    }

    tracing::debug!(
        segments = qualities.len(),
        units = units.len(),
        "collapsed classic runs"
    );
    units
}

pub fn classify(
    segments: &[AnnotatedSegment],
    rules: &HashMap<(bool, bool), ClassicQuality>,
) -> Result<Vec<ClassicUnit>, ScoringError> {
    let qualities = tag_segments(segments, rules)?;
    Ok(collapse_runs(&qualities))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::rules::classic_rules;
    use crate::types::ActivityState;

    fn segments_from_states(states: &[(bool, bool)]) -> Vec<AnnotatedSegment> {
        states
            .iter()
            .enumerate()
            .map(|(i, &(truth, pred))| AnnotatedSegment {
                start: Utc.with_ymd_and_hms(2023, 10, 1, 12, i as u32, 0).unwrap(),
                end: Utc
                    .with_ymd_and_hms(2023, 10, 1, 12, i as u32 + 1, 0)
                    .unwrap(),
                state: ActivityState { truth, pred },
            })
            .collect()
    }

    #[test]
    fn tags_follow_the_rule_table() {
        let segments =
            segments_from_states(&[(true, true), (true, false), (false, true), (false, false)]);
        let tags = tag_segments(&segments, &classic_rules()).unwrap();
        assert_eq!(
            tags,
            [
                ClassicQuality::Tp,
                ClassicQuality::Fn,
                ClassicQuality::Fp,
                ClassicQuality::Tn,
            ]
        );
    }

    #[test]
    fn unmapped_pair_is_a_fatal_config_error() {
        let mut rules = classic_rules();
        rules.remove(&(false, true));
        let segments = segments_from_states(&[(false, true)]);
        let err = tag_segments(&segments, &rules).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::UnknownActivityState {
                truth: false,
                pred: true
            }
        ));
    }

    #[test]
    fn empty_input_yields_no_units() {
        assert!(collapse_runs(&[]).is_empty());
        assert!(classify(&[], &classic_rules()).unwrap().is_empty());
    }

    #[test]
    fn consecutive_equal_qualities_merge() {
        let segments = segments_from_states(&[
            (true, true),
            (true, true),
            (true, false),
            (true, true),
        ]);
        let units = classify(&segments, &classic_rules()).unwrap();
        assert_eq!(
            units,
            [
                QualifiedUnit { quality: ClassicQuality::Tp, start: 0, end: 2 },
                QualifiedUnit { quality: ClassicQuality::Fn, start: 2, end: 3 },
                QualifiedUnit { quality: ClassicQuality::Tp, start: 3, end: 4 },
            ]
        );
    }

    #[test]
    fn units_partition_the_input_exactly() {
        let states: Vec<(bool, bool)> = (0..17)
            .map(|i| (i % 3 != 0, i % 4 != 0))
            .collect();
        let segments = segments_from_states(&states);
        let units = classify(&segments, &classic_rules()).unwrap();

        let mut expected_start = 0usize;
        for pair in units.windows(2) {
            assert_ne!(pair[0].quality, pair[1].quality);
        }
        for unit in &units {
            assert_eq!(unit.start, expected_start);
            assert!(unit.end > unit.start);
            expected_start = unit.end;
        }
        assert_eq!(expected_start, segments.len());
    }
}
