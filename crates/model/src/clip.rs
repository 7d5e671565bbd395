use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub u64);

/// Identifier of a decoded audio source, resolved through `DecodedAudio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u64);

/// A bounded, trimmed reference to a decoded audio source on a track.
///
/// The audible window is `[trim_start_ms, trim_end_ms)` of the source,
/// placed at `start_ms` on the timeline. When `looped`, that window tiles
/// forward with its own duration as the period, up to `loop_end_ms`
/// (indefinitely when unset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub source: SourceId,
    pub start_ms: f64,
    pub trim_start_ms: f64,
    pub trim_end_ms: f64,
    pub fade_in_ms: f64,
    pub fade_out_ms: f64,
    pub looped: bool,
    pub loop_end_ms: Option<f64>,
}

impl Clip {
    pub fn new(id: ClipId, source: SourceId, start_ms: f64, duration_ms: f64) -> Self {
        Self {
            id,
            source,
            start_ms,
            trim_start_ms: 0.0,
            trim_end_ms: duration_ms,
            fade_in_ms: 0.0,
            fade_out_ms: 0.0,
            looped: false,
            loop_end_ms: None,
        }
    }

    /// Audible duration of one pass through the clip.
    pub fn audible_ms(&self) -> f64 {
        (self.trim_end_ms - self.trim_start_ms).max(0.0)
    }

    /// Timeline end of the first (or only) pass.
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.audible_ms()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trim_end_ms < self.trim_start_ms {
            return Err(ModelError::InvalidTrim { clip: self.id });
        }
        if self.looped
            && let Some(loop_end) = self.loop_end_ms
            && loop_end < self.end_ms()
        {
            return Err(ModelError::InvalidLoopEnd { clip: self.id });
        }
        Ok(())
    }
}
