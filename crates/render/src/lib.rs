//! Deterministic offline rendering of an arbitrary timeline window.
//!
//! The renderer drives the same scheduling primitives as the live session
//! (`waveline_engine::schedule`), so a bounce is the playback you heard.
//! Rendering the same tracks and range twice yields bit-identical output:
//! no wall clock, no unseeded randomness.

mod wav;

pub use wav::{BitDepth, write_wav_bytes, write_wav_file};

use rayon::prelude::*;
use waveline_engine::schedule::{GainTimeline, clip_gain_at, cycles_in};
use waveline_model::{
    AudioBuffer, Clip, DecodedAudio, RenderRange, Track, audible_tracks,
};

/// Render every audible track into one interleaved buffer.
///
/// Tracks render in parallel but are summed in track order, keeping float
/// accumulation deterministic. Clips without decoded audio are skipped.
pub fn render(tracks: &[Track], range: &RenderRange, audio: &dyn DecodedAudio) -> AudioBuffer {
    let frames = range.frames();
    let channels = range.channels.max(1) as usize;

    let mut samples = vec![0.0f32; frames * channels];
    if frames > 0 {
        let audible = audible_tracks(tracks);
        let track_buffers: Vec<Vec<f32>> = audible
            .par_iter()
            .map(|track| render_track(track, range, audio))
            .collect();

        for buffer in track_buffers {
            for (dst, src) in samples.iter_mut().zip(buffer) {
                *dst += src;
            }
        }
    }

    AudioBuffer {
        samples,
        sample_rate: range.sample_rate,
        channels: range.channels,
    }
}

fn render_track(track: &Track, range: &RenderRange, audio: &dyn DecodedAudio) -> Vec<f32> {
    let frames = range.frames();
    let channels = range.channels.max(1) as usize;
    let rate = range.sample_rate as f64;
    let mut buffer = vec![0.0f32; frames * channels];

    // Envelope commands anchored at the window start, exactly as a live
    // session starting there would schedule them.
    let gain = GainTimeline::compile(track.volume, track.envelope.as_ref(), range.start_ms);

    for clip in &track.clips {
        if clip.audible_ms() <= 0.0 {
            continue;
        }
        let Some(decoded) = audio.decoded(clip.source) else {
            log::warn!(
                "render: clip {:?} has no decoded audio for source {:?}, skipping",
                clip.id,
                clip.source
            );
            continue;
        };
        let source = match decoded.resample(range.sample_rate) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("render: clip {:?} resample failed: {err}, skipping", clip.id);
                continue;
            }
        };

        for cycle in cycles_in(clip, range.start_ms, range.end_ms) {
            mix_cycle(&mut buffer, clip, &cycle, &source, &gain, range, channels, rate);
        }
    }

    buffer
}

#[allow(clippy::too_many_arguments)]
fn mix_cycle(
    buffer: &mut [f32],
    clip: &Clip,
    cycle: &waveline_engine::schedule::Cycle,
    source: &waveline_model::AudioArc,
    gain: &GainTimeline,
    range: &RenderRange,
    channels: usize,
    rate: f64,
) {
    let frames = buffer.len() / channels;
    let first = ((cycle.start_ms - range.start_ms) / 1000.0 * rate).ceil().max(0.0) as usize;
    let last = (((cycle.end_ms() - range.start_ms) / 1000.0 * rate).ceil() as usize).min(frames);

    let source_channels = source.channels() as usize;
    let source_samples = source.samples();
    let source_frames = source.frames();

    for frame_idx in first..last {
        let ms = range.start_ms + frame_idx as f64 / rate * 1000.0;
        let offset_ms = ms - cycle.start_ms;
        if offset_ms < 0.0 || offset_ms >= cycle.duration_ms {
            continue;
        }
        let source_ms = clip.trim_start_ms + offset_ms;
        let source_frame = (source_ms / 1000.0 * rate) as usize;
        if source_frame >= source_frames {
            continue;
        }
        let g = clip_gain_at(clip, offset_ms, cycle.duration_ms) * gain.value_at(ms);
        if g == 0.0 {
            continue;
        }
        for ch in 0..channels {
            let src_idx = source_frame * source_channels + ch % source_channels;
            buffer[frame_idx * channels + ch] += source_samples[src_idx] * g;
        }
    }
}
