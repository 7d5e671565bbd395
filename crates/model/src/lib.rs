//! Shared data model for the timing/automation/rendering core: clips, tracks,
//! markers, the looping policy, and refcounted PCM buffers. Mutation of this
//! state happens in the editing layer above; everything here is read by the
//! scheduler and renderer.

mod audio;
mod clip;
mod error;
mod looping;
mod marker;
mod source;
mod track;

pub use audio::{AudioArc, AudioBuffer, resample_audio_arc};
pub use clip::{Clip, ClipId, SourceId};
pub use error::ModelError;
pub use looping::{LoopingPolicy, compute_loop_end_ms};
pub use marker::{Marker, MarkerId};
pub use source::{AudioRegistry, DecodedAudio};
pub use track::{Track, TrackId, audible_tracks};

/// Offline render request: a half-open time window plus output format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRange {
    pub start_ms: f64,
    pub end_ms: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RenderRange {
    /// Output length in frames: `ceil(duration_secs * sample_rate)`.
    pub fn frames(&self) -> usize {
        let duration_ms = (self.end_ms - self.start_ms).max(0.0);
        (duration_ms / 1000.0 * self.sample_rate as f64).ceil() as usize
    }
}

/// Transport state, mutated only by the session's play/pause/stop/seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_range_frames_rounds_up() {
        let range = RenderRange {
            start_ms: 0.0,
            end_ms: 1000.5,
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(range.frames(), 44123);
    }

    #[test]
    fn test_render_range_degenerate_is_empty() {
        let range = RenderRange {
            start_ms: 500.0,
            end_ms: 500.0,
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(range.frames(), 0);
        let inverted = RenderRange {
            start_ms: 900.0,
            end_ms: 100.0,
            sample_rate: 44100,
            channels: 2,
        };
        assert_eq!(inverted.frames(), 0);
    }
}
