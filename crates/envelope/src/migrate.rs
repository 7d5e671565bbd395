//! Conversion of the legacy envelope format, where each point carried a named
//! outgoing curve, into the segment-based representation. Lives here so no
//! higher-level state module needs to reach back into the envelope model.

use serde::{Deserialize, Serialize};

use crate::point::{EnvelopePoint, EnvelopeSegment, PointId, SegmentId, TrackEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyCurveKind {
    Linear,
    EaseIn,
    EaseOut,
    SCurve,
}

/// A point from the old format: the curve describes the span from this point
/// to the next one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LegacyPoint {
    pub id: u64,
    pub ms: f64,
    pub value: f64,
    pub curve: LegacyCurveKind,
    pub shape: f64,
}

/// Convert legacy points into a segment-based envelope.
///
/// EaseIn maps to a negative signed curve, EaseOut to a positive one, both
/// scaled so the legacy `power = 1 + shape*3` is preserved. Linear spans get
/// no segment. SCurve has no signed-scalar equivalent and degrades to linear.
pub fn from_legacy_points(legacy: &[LegacyPoint]) -> TrackEnvelope {
    let mut ordered = legacy.to_vec();
    ordered.sort_by(|a, b| a.ms.partial_cmp(&b.ms).expect("finite point times"));

    let points: Vec<EnvelopePoint> = ordered
        .iter()
        .map(|p| EnvelopePoint {
            id: PointId(p.id),
            ms: p.ms,
            value: if p.value.is_finite() {
                p.value.clamp(0.0, crate::point::MAX_MULTIPLIER)
            } else {
                0.0
            },
        })
        .collect();

    let mut segments = Vec::new();
    let mut next_segment_id = 0u64;
    for pair in ordered.windows(2) {
        let signed = match pair[0].curve {
            LegacyCurveKind::Linear | LegacyCurveKind::SCurve => continue,
            LegacyCurveKind::EaseIn => -(legacy_shape(pair[0].shape) * 99.0).round(),
            LegacyCurveKind::EaseOut => (legacy_shape(pair[0].shape) * 99.0).round(),
        };
        if signed == 0.0 {
            continue;
        }
        segments.push(EnvelopeSegment {
            id: SegmentId(next_segment_id),
            from: PointId(pair[0].id),
            to: PointId(pair[1].id),
            curve: signed,
        });
        next_segment_id += 1;
    }

    TrackEnvelope {
        enabled: true,
        points,
        segments,
    }
}

fn legacy_shape(shape: f64) -> f64 {
    if shape.is_finite() {
        shape.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(id: u64, ms: f64, value: f64, curve: LegacyCurveKind, shape: f64) -> LegacyPoint {
        LegacyPoint {
            id,
            ms,
            value,
            curve,
            shape,
        }
    }

    #[test]
    fn test_points_carried_over_sorted() {
        let env = from_legacy_points(&[
            legacy(2, 2000.0, 1.0, LegacyCurveKind::Linear, 0.0),
            legacy(1, 1000.0, 0.5, LegacyCurveKind::Linear, 0.0),
        ]);
        assert_eq!(env.points.len(), 2);
        assert_eq!(env.points[0].ms, 1000.0);
        assert!(env.segments.is_empty());
    }

    #[test]
    fn test_ease_in_becomes_negative_segment() {
        let env = from_legacy_points(&[
            legacy(1, 0.0, 0.0, LegacyCurveKind::EaseIn, 1.0),
            legacy(2, 1000.0, 1.0, LegacyCurveKind::Linear, 0.0),
        ]);
        assert_eq!(env.segments.len(), 1);
        assert_eq!(env.segments[0].curve, -99.0);
        assert_eq!(env.segments[0].from, PointId(1));
        assert_eq!(env.segments[0].to, PointId(2));
    }

    #[test]
    fn test_ease_out_becomes_positive_segment() {
        let env = from_legacy_points(&[
            legacy(1, 0.0, 0.0, LegacyCurveKind::EaseOut, 0.5),
            legacy(2, 1000.0, 1.0, LegacyCurveKind::Linear, 0.0),
        ]);
        assert_eq!(env.segments.len(), 1);
        assert_eq!(env.segments[0].curve, (0.5f64 * 99.0).round());
    }

    #[test]
    fn test_shaping_preserved_through_migration() {
        // legacy easeIn with shape 1.0 == power 4 == signed curve -99
        let env = from_legacy_points(&[
            legacy(1, 0.0, 0.0, LegacyCurveKind::EaseIn, 1.0),
            legacy(2, 1000.0, 1.0, LegacyCurveKind::Linear, 0.0),
        ]);
        let mid = env.multiplier_at(500.0);
        assert!((mid - 0.5f64.powf(4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_s_curve_degrades_to_linear() {
        let env = from_legacy_points(&[
            legacy(1, 0.0, 0.0, LegacyCurveKind::SCurve, 1.0),
            legacy(2, 1000.0, 1.0, LegacyCurveKind::Linear, 0.0),
        ]);
        assert!(env.segments.is_empty());
        assert!((env.multiplier_at(500.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_shape_emits_no_segment() {
        let env = from_legacy_points(&[
            legacy(1, 0.0, 0.0, LegacyCurveKind::EaseIn, 0.0),
            legacy(2, 1000.0, 1.0, LegacyCurveKind::Linear, 0.0),
        ]);
        assert!(env.segments.is_empty(), "power 1 is already linear");
    }
}
