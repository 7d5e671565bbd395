//! Render a tiny two-track arrangement offline and write it to bounce.wav.
//! No audio device needed; everything goes through the offline renderer.

use std::sync::Arc;

use waveline_core::{
    AudioArc, AudioRegistry, BitDepth, Clip, ClipId, RenderRange, SourceId, Track, TrackEnvelope,
    TrackId, compute_loop_end_ms, render, write_wav_file,
};

fn sine(freq: f32, ms: f64, sample_rate: u32) -> AudioArc {
    let frames = (ms / 1000.0 * sample_rate as f64) as usize;
    let samples = (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (std::f32::consts::TAU * freq * t).sin() * 0.4
        })
        .collect();
    AudioArc::new(samples, sample_rate, 1)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut registry = AudioRegistry::new();
    registry.insert(SourceId(1), sine(220.0, 2000.0, 44100));
    registry.insert(SourceId(2), sine(440.0, 250.0, 44100));

    // a pad with a fade-in and a volume ramp
    let mut pad_clip = Clip::new(ClipId(1), SourceId(1), 0.0, 2000.0);
    pad_clip.fade_in_ms = 500.0;
    let mut pad = Track::new(TrackId(1), "Pad");
    pad.clips.push(pad_clip);
    let mut envelope = TrackEnvelope::new();
    envelope.add_point(0.0, 1.0);
    envelope.add_point(4000.0, 0.25);
    pad.envelope = Some(envelope);

    // a short blip looping with the default policy boundary
    let mut blip_clip = Clip::new(ClipId(2), SourceId(2), 0.0, 250.0);
    blip_clip.looped = true;
    blip_clip.loop_end_ms = Some(compute_loop_end_ms(&blip_clip, &Default::default()));
    let mut blip = Track::new(TrackId(2), "Blip");
    blip.volume = 60.0;
    blip.clips.push(blip_clip);

    let range = RenderRange {
        start_ms: 0.0,
        end_ms: 4000.0,
        sample_rate: 44100,
        channels: 2,
    };
    let buffer = render(&[pad, blip], &range, &registry);
    write_wav_file(&buffer, "bounce.wav".as_ref(), BitDepth::Sixteen, true)?;
    println!("wrote bounce.wav ({} frames)", buffer.frames());
    Ok(())
}
