use serde::{Deserialize, Serialize};

use crate::curve::interpolate;

/// Envelope values are linear gain multipliers in this range.
pub const MAX_MULTIPLIER: f64 = 4.0;

/// Signed segment curve range; 0 is linear.
pub const MAX_SEGMENT_CURVE: f64 = 99.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub u64);

/// One automation point: a gain multiplier at a timeline position.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub id: PointId,
    pub ms: f64,
    pub value: f64,
}

/// Curve shape between two adjacent points. Absence of a segment for a pair
/// means linear interpolation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnvelopeSegment {
    pub id: SegmentId,
    pub from: PointId,
    pub to: PointId,
    /// Signed shape in [-99, 99]: negative exponential, positive logarithmic.
    pub curve: f64,
}

/// A track's volume automation lane.
///
/// Points are kept sorted by time with unique ids; the mutation methods below
/// maintain both invariants so evaluation never has to check them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackEnvelope {
    pub enabled: bool,
    pub points: Vec<EnvelopePoint>,
    pub segments: Vec<EnvelopeSegment>,
}

impl TrackEnvelope {
    pub fn new() -> Self {
        Self {
            enabled: true,
            points: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Gain multiplier at a timeline position.
    ///
    /// Before the first point the first point's value holds; after the last
    /// the last value holds. An empty envelope is unity gain.
    pub fn multiplier_at(&self, ms: f64) -> f64 {
        let points = &self.points;
        let Some(first) = points.first() else {
            return 1.0;
        };
        if ms <= first.ms {
            return first.value;
        }
        let last = points.last().expect("non-empty");
        if ms >= last.ms {
            return last.value;
        }

        // Bracketing pair: p1.ms <= ms < p2.ms
        let idx = points.partition_point(|p| p.ms <= ms);
        let p1 = points[idx - 1];
        let p2 = points[idx];

        let span = p2.ms - p1.ms;
        if span < 1e-9 {
            return p1.value;
        }
        let t = (ms - p1.ms) / span;
        interpolate(p1.value, p2.value, t, self.segment_curve(p1.id, p2.id))
    }

    /// Curve for a point pair; missing segment means linear (0).
    pub fn segment_curve(&self, from: PointId, to: PointId) -> f64 {
        self.segments
            .iter()
            .find(|s| s.from == from && s.to == to)
            .map(|s| s.curve)
            .unwrap_or(0.0)
    }

    /// Insert a point, keeping points time-sorted. Returns the new id.
    pub fn add_point(&mut self, ms: f64, value: f64) -> PointId {
        let id = PointId(self.next_point_id());
        let value = clamp_multiplier(value);
        let idx = self.points.partition_point(|p| p.ms <= ms);
        self.points.insert(idx, EnvelopePoint { id, ms, value });
        id
    }

    /// Remove a point and any segment referencing it.
    pub fn remove_point(&mut self, id: PointId) {
        self.points.retain(|p| p.id != id);
        self.segments.retain(|s| s.from != id && s.to != id);
    }

    /// Move a point in time and/or value, re-sorting as needed.
    pub fn move_point(&mut self, id: PointId, ms: f64, value: f64) {
        if let Some(p) = self.points.iter_mut().find(|p| p.id == id) {
            p.ms = ms;
            p.value = clamp_multiplier(value);
            self.points
                .sort_by(|a, b| a.ms.partial_cmp(&b.ms).expect("finite point times"));
        }
    }

    /// Set the curve for a point pair, creating the segment if absent.
    pub fn set_segment_curve(&mut self, from: PointId, to: PointId, curve: f64) -> SegmentId {
        let curve = if curve.is_finite() {
            curve.clamp(-MAX_SEGMENT_CURVE, MAX_SEGMENT_CURVE)
        } else {
            0.0
        };
        if let Some(s) = self
            .segments
            .iter_mut()
            .find(|s| s.from == from && s.to == to)
        {
            s.curve = curve;
            return s.id;
        }
        let id = SegmentId(self.next_segment_id());
        self.segments.push(EnvelopeSegment {
            id,
            from,
            to,
            curve,
        });
        id
    }

    fn next_point_id(&self) -> u64 {
        self.points.iter().map(|p| p.id.0 + 1).max().unwrap_or(0)
    }

    fn next_segment_id(&self) -> u64 {
        self.segments.iter().map(|s| s.id.0 + 1).max().unwrap_or(0)
    }
}

fn clamp_multiplier(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, MAX_MULTIPLIER)
    } else {
        0.0
    }
}
