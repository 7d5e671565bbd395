//! Coordinate translation between domain time (ms), musical time (bars/beats)
//! and screen pixels, plus grid/snap generation for the arrangement view.

mod grid;
mod scale;
mod settings;

pub use grid::{BeatMarker, GridLabel, GridMode, MeasureMarker, Timebase};
pub use scale::{Scale, align_hairline, scroll_for_zoom_anchor, snap_ms};
pub use settings::{SnapGranularity, Timeline};
