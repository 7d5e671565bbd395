use serde::{Deserialize, Serialize};

use crate::clip::Clip;

/// Defaults for where a newly enabled loop should end.
///
/// Short one-shots (drum hits) get several repetitions so the loop is
/// audible at all; longer clips get a single extra pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoopingPolicy {
    pub short_clip_ms_threshold: f64,
    pub min_repetitions_default: u32,
    pub min_repetitions_short: u32,
}

impl Default for LoopingPolicy {
    fn default() -> Self {
        Self {
            short_clip_ms_threshold: 15_000.0,
            min_repetitions_default: 1,
            min_repetitions_short: 4,
        }
    }
}

/// Default loop boundary for a clip: start plus `(min_reps + 1)` passes.
/// A clip with no audible duration gets a no-op boundary at its start.
pub fn compute_loop_end_ms(clip: &Clip, policy: &LoopingPolicy) -> f64 {
    let duration = clip.audible_ms();
    if duration <= 0.0 {
        return clip.start_ms;
    }
    let min_reps = if duration < policy.short_clip_ms_threshold {
        policy.min_repetitions_short
    } else {
        policy.min_repetitions_default
    };
    clip.start_ms + duration * (min_reps + 1) as f64
}
