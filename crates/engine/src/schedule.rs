//! Pure scheduling primitives, shared by the live session and the offline
//! renderer so both produce identical gain and clip timing decisions.

use waveline_envelope::{TrackEnvelope, interpolate};
use waveline_model::Clip;

/// When canceling future automation, segments that started within this many
/// ms of "now" are canceled too; they may still be in flight at the backend.
pub const LOOKAHEAD_CANCEL_MS: f64 = 10.0;

/// Consecutive automation commands must not touch; the backend rejects
/// overlapping segments.
pub const MIN_SEGMENT_GAP_MS: f64 = 1.0;

/// Segments shorter than this are dropped; the backend rejects zero-length
/// commands.
pub const MIN_SEGMENT_DURATION_MS: f64 = 1.0;

/// One pass of a clip on the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cycle {
    pub start_ms: f64,
    pub duration_ms: f64,
}

impl Cycle {
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.duration_ms
    }
}

/// The cycle containing `ms`, if any. This is what the live mixer asks every
/// frame; looped clips re-arm through here rather than being unrolled.
pub fn cycle_at(clip: &Clip, ms: f64) -> Option<Cycle> {
    let period = clip.audible_ms();
    if period <= 0.0 || ms < clip.start_ms {
        return None;
    }
    if !clip.looped {
        let cycle = Cycle {
            start_ms: clip.start_ms,
            duration_ms: period,
        };
        return (ms < cycle.end_ms()).then_some(cycle);
    }
    if let Some(loop_end) = clip.loop_end_ms
        && ms >= loop_end
    {
        return None;
    }
    let k = ((ms - clip.start_ms) / period).floor();
    let start_ms = clip.start_ms + k * period;
    let duration_ms = match clip.loop_end_ms {
        Some(loop_end) => period.min(loop_end - start_ms),
        None => period,
    };
    (duration_ms > 0.0).then_some(Cycle {
        start_ms,
        duration_ms,
    })
}

/// All cycles of a clip overlapping `[window_start, window_end)`.
///
/// Only overlapping repetitions are enumerated; a loop running to minute 60
/// costs nothing when the window covers minute 2.
pub fn cycles_in(clip: &Clip, window_start: f64, window_end: f64) -> Vec<Cycle> {
    let period = clip.audible_ms();
    if period <= 0.0 || window_end <= window_start {
        return Vec::new();
    }

    if !clip.looped {
        let cycle = Cycle {
            start_ms: clip.start_ms,
            duration_ms: period,
        };
        if cycle.start_ms < window_end && cycle.end_ms() > window_start {
            return vec![cycle];
        }
        return Vec::new();
    }

    let tile_end = match clip.loop_end_ms {
        Some(loop_end) => loop_end.min(window_end),
        None => window_end,
    };

    let first = (((window_start - clip.start_ms) / period).floor()).max(0.0) as u64;
    let mut cycles = Vec::new();
    let mut k = first;
    loop {
        let start_ms = clip.start_ms + k as f64 * period;
        if start_ms >= tile_end {
            break;
        }
        let duration_ms = match clip.loop_end_ms {
            Some(loop_end) => period.min(loop_end - start_ms),
            None => period,
        };
        if duration_ms <= 0.0 {
            break;
        }
        let cycle = Cycle {
            start_ms,
            duration_ms,
        };
        if cycle.end_ms() > window_start {
            cycles.push(cycle);
        }
        k += 1;
    }
    cycles
}

/// Per-clip fade gain at an offset into one cycle. Fade-in and fade-out are
/// independent ramps and compose multiplicatively when they overlap.
pub fn clip_gain_at(clip: &Clip, offset_in_cycle_ms: f64, cycle_duration_ms: f64) -> f32 {
    let mut gain = 1.0f64;
    if clip.fade_in_ms > 0.0 && offset_in_cycle_ms < clip.fade_in_ms {
        gain *= (offset_in_cycle_ms / clip.fade_in_ms).clamp(0.0, 1.0);
    }
    if clip.fade_out_ms > 0.0 {
        let fade_start = cycle_duration_ms - clip.fade_out_ms;
        if offset_in_cycle_ms > fade_start {
            gain *= ((cycle_duration_ms - offset_in_cycle_ms) / clip.fade_out_ms).clamp(0.0, 1.0);
        }
    }
    gain as f32
}

/// One automation command on a track's gain stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainSegment {
    pub start_ms: f64,
    pub end_ms: f64,
    pub from: f64,
    pub to: f64,
    pub curve: f64,
}

/// The compiled automation command list for one track: fader gain times the
/// envelope, sampled into backend-safe segments.
///
/// Compilation enforces the backend's hard rules: every segment is at least
/// `MIN_SEGMENT_DURATION_MS` long (shorter ones are dropped and their value
/// picked up by the hold), and consecutive segments sit at least
/// `MIN_SEGMENT_GAP_MS` apart. During a gap the value holds.
#[derive(Debug, Clone)]
pub struct GainTimeline {
    base: f64,
    initial: f64,
    segments: Vec<GainSegment>,
}

impl GainTimeline {
    /// Fader-only timeline, no automation.
    pub fn unity(volume: f32) -> Self {
        Self {
            base: fader_gain(volume),
            initial: 1.0,
            segments: Vec::new(),
        }
    }

    /// Compile a track's envelope into segments starting at the play origin.
    /// Points entirely before `from_ms` collapse into the initial value.
    pub fn compile(volume: f32, envelope: Option<&TrackEnvelope>, from_ms: f64) -> Self {
        let Some(env) = envelope.filter(|e| e.enabled && !e.points.is_empty()) else {
            return Self::unity(volume);
        };

        let initial = env.multiplier_at(from_ms);
        let mut segments: Vec<GainSegment> = Vec::new();

        for pair in env.points.windows(2) {
            let (p1, p2) = (pair[0], pair[1]);
            if p2.ms <= from_ms {
                continue;
            }
            let mut start_ms = p1.ms.max(from_ms);
            if let Some(prev) = segments.last() {
                start_ms = start_ms.max(prev.end_ms + MIN_SEGMENT_GAP_MS);
            }
            let end_ms = p2.ms;
            if end_ms - start_ms < MIN_SEGMENT_DURATION_MS {
                continue;
            }
            segments.push(GainSegment {
                start_ms,
                end_ms,
                from: env.multiplier_at(start_ms),
                to: p2.value,
                curve: env.segment_curve(p1.id, p2.id),
            });
        }

        Self {
            base: fader_gain(volume),
            initial,
            segments,
        }
    }

    /// Cancel automation from `now_ms` forward, including segments that
    /// started inside the lookahead window. Values hold at the last
    /// surviving segment's target.
    pub fn cancel_after(&mut self, now_ms: f64) {
        let cutoff = now_ms - LOOKAHEAD_CANCEL_MS;
        self.segments.retain(|s| s.start_ms < cutoff);
    }

    /// Total linear gain at a timeline position.
    pub fn value_at(&self, ms: f64) -> f32 {
        let mut gain = self.initial;
        for seg in &self.segments {
            if ms >= seg.end_ms {
                gain = seg.to;
            } else if ms >= seg.start_ms {
                let t = (ms - seg.start_ms) / (seg.end_ms - seg.start_ms);
                gain = interpolate(seg.from, seg.to, t, seg.curve);
                break;
            } else {
                break;
            }
        }
        (self.base * gain) as f32
    }

    pub fn segments(&self) -> &[GainSegment] {
        &self.segments
    }
}

fn fader_gain(volume: f32) -> f64 {
    let volume = if volume.is_finite() { volume } else { 0.0 };
    (volume as f64 / 100.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveline_model::{ClipId, SourceId};

    fn clip(start_ms: f64, duration_ms: f64) -> Clip {
        Clip::new(ClipId(1), SourceId(1), start_ms, duration_ms)
    }

    fn looped_clip(start_ms: f64, duration_ms: f64, loop_end_ms: Option<f64>) -> Clip {
        let mut c = clip(start_ms, duration_ms);
        c.looped = true;
        c.loop_end_ms = loop_end_ms;
        c
    }

    #[test]
    fn test_cycle_at_single_pass() {
        let c = clip(1000.0, 2000.0);
        assert_eq!(cycle_at(&c, 999.0), None);
        let cycle = cycle_at(&c, 1500.0).expect("inside clip");
        assert_eq!(cycle.start_ms, 1000.0);
        assert_eq!(cycle.duration_ms, 2000.0);
        assert_eq!(cycle_at(&c, 3000.0), None, "end is exclusive");
    }

    #[test]
    fn test_cycle_at_looped_re_arms() {
        let c = looped_clip(0.0, 1000.0, None);
        assert_eq!(cycle_at(&c, 250.0).unwrap().start_ms, 0.0);
        assert_eq!(cycle_at(&c, 1250.0).unwrap().start_ms, 1000.0);
        assert_eq!(cycle_at(&c, 987_654.0).unwrap().duration_ms, 1000.0);
    }

    #[test]
    fn test_cycle_at_respects_loop_end() {
        let c = looped_clip(0.0, 1000.0, Some(2500.0));
        // third cycle truncated to 500ms
        let cycle = cycle_at(&c, 2400.0).expect("truncated cycle");
        assert_eq!(cycle.start_ms, 2000.0);
        assert_eq!(cycle.duration_ms, 500.0);
        assert_eq!(cycle_at(&c, 2500.0), None);
    }

    #[test]
    fn test_cycle_at_degenerate_clip() {
        let mut c = clip(0.0, 1000.0);
        c.trim_start_ms = 1000.0;
        assert_eq!(cycle_at(&c, 0.0), None);
    }

    #[test]
    fn test_cycles_in_only_overlapping() {
        let c = looped_clip(0.0, 1000.0, None);
        let cycles = cycles_in(&c, 2500.0, 4500.0);
        let starts: Vec<f64> = cycles.iter().map(|cy| cy.start_ms).collect();
        assert_eq!(starts, vec![2000.0, 3000.0, 4000.0]);
    }

    #[test]
    fn test_cycles_in_never_unrolls_outside_window() {
        let c = looped_clip(0.0, 10.0, None);
        // an hour-long loop, 100ms window: ~10 cycles, not 360k
        let cycles = cycles_in(&c, 3_600_000.0, 3_600_100.0);
        assert_eq!(cycles.len(), 10);
    }

    #[test]
    fn test_cycles_in_loop_end_truncates_tail() {
        let c = looped_clip(0.0, 1000.0, Some(2500.0));
        let cycles = cycles_in(&c, 0.0, 10_000.0);
        assert_eq!(cycles.len(), 3);
        assert_eq!(cycles[2].duration_ms, 500.0);
    }

    #[test]
    fn test_cycles_in_non_looped() {
        let c = clip(500.0, 1000.0);
        assert_eq!(cycles_in(&c, 0.0, 400.0), Vec::new());
        assert_eq!(cycles_in(&c, 1400.0, 2000.0).len(), 1);
        assert_eq!(cycles_in(&c, 1500.0, 2000.0), Vec::new());
    }

    #[test]
    fn test_cycles_in_window_before_clip() {
        let c = looped_clip(5000.0, 1000.0, None);
        assert!(cycles_in(&c, 0.0, 4000.0).is_empty());
    }

    #[test]
    fn test_clip_gain_fade_in() {
        let mut c = clip(0.0, 1000.0);
        c.fade_in_ms = 100.0;
        assert_eq!(clip_gain_at(&c, 0.0, 1000.0), 0.0);
        assert!((clip_gain_at(&c, 50.0, 1000.0) - 0.5).abs() < 1e-6);
        assert_eq!(clip_gain_at(&c, 100.0, 1000.0), 1.0);
        assert_eq!(clip_gain_at(&c, 500.0, 1000.0), 1.0);
    }

    #[test]
    fn test_clip_gain_fade_out() {
        let mut c = clip(0.0, 1000.0);
        c.fade_out_ms = 200.0;
        assert_eq!(clip_gain_at(&c, 700.0, 1000.0), 1.0);
        assert!((clip_gain_at(&c, 900.0, 1000.0) - 0.5).abs() < 1e-6);
        assert!(clip_gain_at(&c, 999.0, 1000.0) < 0.01);
    }

    #[test]
    fn test_overlapping_fades_compose() {
        let mut c = clip(0.0, 100.0);
        c.fade_in_ms = 100.0;
        c.fade_out_ms = 100.0;
        let g = clip_gain_at(&c, 50.0, 100.0);
        assert!((g - 0.25).abs() < 1e-6, "0.5 in * 0.5 out, got {g}");
    }

    #[test]
    fn test_no_fades_is_unity() {
        let c = clip(0.0, 1000.0);
        assert_eq!(clip_gain_at(&c, 0.0, 1000.0), 1.0);
        assert_eq!(clip_gain_at(&c, 999.0, 1000.0), 1.0);
    }

    fn ramp_envelope() -> TrackEnvelope {
        let mut env = TrackEnvelope::new();
        env.add_point(1000.0, 0.0);
        env.add_point(2000.0, 2.0);
        env.add_point(3000.0, 1.0);
        env
    }

    #[test]
    fn test_unity_timeline() {
        let tl = GainTimeline::unity(100.0);
        assert_eq!(tl.value_at(0.0), 1.0);
        let tl = GainTimeline::unity(50.0);
        assert_eq!(tl.value_at(12_345.0), 0.5);
    }

    #[test]
    fn test_compile_matches_envelope_preview() {
        let env = ramp_envelope();
        let tl = GainTimeline::compile(100.0, Some(&env), 0.0);
        for ms in [0.0, 500.0, 1500.0, 2500.0, 4000.0] {
            let preview = env.multiplier_at(ms) as f32;
            let scheduled = tl.value_at(ms);
            assert!(
                (preview - scheduled).abs() < 2e-3,
                "at {ms}ms preview {preview} vs scheduled {scheduled}"
            );
        }
    }

    #[test]
    fn test_compile_disabled_envelope_is_unity() {
        let mut env = ramp_envelope();
        env.enabled = false;
        let tl = GainTimeline::compile(100.0, Some(&env), 0.0);
        assert!(tl.segments().is_empty());
        assert_eq!(tl.value_at(1500.0), 1.0);
    }

    #[test]
    fn test_compile_mid_segment_start() {
        let env = ramp_envelope();
        let tl = GainTimeline::compile(100.0, Some(&env), 1500.0);
        // first command starts at the play origin with the mid-ramp value
        let first = tl.segments()[0];
        assert_eq!(first.start_ms, 1500.0);
        assert!((first.from - 1.0).abs() < 1e-9, "ramp is 0..2, mid is 1.0");
        assert_eq!(first.to, 2.0);
    }

    #[test]
    fn test_compiled_segments_keep_minimum_gap() {
        let env = ramp_envelope();
        let tl = GainTimeline::compile(100.0, Some(&env), 0.0);
        for pair in tl.segments().windows(2) {
            assert!(
                pair[1].start_ms - pair[0].end_ms >= MIN_SEGMENT_GAP_MS - 1e-9,
                "segments {pair:?} closer than the minimum gap"
            );
        }
    }

    #[test]
    fn test_compiled_segments_have_minimum_duration() {
        let mut env = TrackEnvelope::new();
        env.add_point(0.0, 1.0);
        env.add_point(1000.0, 2.0);
        env.add_point(1000.4, 0.5); // 0.4ms span, below the minimum
        env.add_point(2000.0, 1.0);
        let tl = GainTimeline::compile(100.0, Some(&env), 0.0);
        for seg in tl.segments() {
            assert!(
                seg.end_ms - seg.start_ms >= MIN_SEGMENT_DURATION_MS - 1e-9,
                "zero-length command {seg:?}"
            );
        }
    }

    #[test]
    fn test_cancel_after_drops_future_and_lookahead() {
        let env = ramp_envelope();
        let mut tl = GainTimeline::compile(100.0, Some(&env), 0.0);
        assert_eq!(tl.segments().len(), 2);
        // now = 2005: the segment starting at ~2001 is within the 10ms
        // lookahead window and must go too
        tl.cancel_after(2005.0);
        assert_eq!(tl.segments().len(), 1);
        assert_eq!(tl.segments()[0].start_ms, 1000.0);
        // value holds at the surviving segment's target
        assert!((tl.value_at(2500.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_cancel_after_is_idempotent() {
        let env = ramp_envelope();
        let mut tl = GainTimeline::compile(100.0, Some(&env), 0.0);
        tl.cancel_after(2005.0);
        let before = tl.segments().len();
        tl.cancel_after(2005.0);
        assert_eq!(tl.segments().len(), before);
    }

    #[test]
    fn test_fader_and_envelope_compose_multiplicatively() {
        let env = ramp_envelope();
        let tl = GainTimeline::compile(50.0, Some(&env), 0.0);
        // envelope 2.0 at 2000ms, fader 0.5 -> total 1.0
        assert!((tl.value_at(2000.0) - 1.0).abs() < 2e-3);
    }

    #[test]
    fn test_nonfinite_volume_is_silent() {
        let tl = GainTimeline::unity(f32::NAN);
        assert_eq!(tl.value_at(0.0), 0.0);
    }
}
