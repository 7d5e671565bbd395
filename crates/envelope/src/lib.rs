//! Per-track volume automation: point/segment data model, curve evaluation,
//! and dB conversions. Evaluation here is the single source of truth for
//! envelope values - UI preview, live playback, and offline render all call
//! into the same functions.

mod curve;
mod db;
mod migrate;
mod point;

pub use curve::{Curve, interpolate, shape_curve};
pub use db::{db_to_multiplier, db_to_volume, effective_db, multiplier_to_db, volume_to_db};
pub use migrate::{LegacyCurveKind, LegacyPoint, from_legacy_points};
pub use point::{EnvelopePoint, EnvelopeSegment, PointId, SegmentId, TrackEnvelope};
