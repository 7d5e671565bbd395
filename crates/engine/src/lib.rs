//! Playback scheduler and live audio session.
//!
//! The session owns a cpal output stream and feeds it through lock-free ring
//! buffers: commands in, position status out, resolved track snapshots
//! swapped via basedrop so the realtime callback never locks, allocates, or
//! frees. All timing decisions inside the callback go through the pure
//! primitives in [`schedule`], which the offline renderer shares.

mod command;
pub mod schedule;
mod snapshot;

pub use command::{Command, Status};
pub use schedule::{
    Cycle, GainSegment, GainTimeline, LOOKAHEAD_CANCEL_MS, MIN_SEGMENT_DURATION_MS,
    MIN_SEGMENT_GAP_MS, clip_gain_at, cycle_at, cycles_in,
};
pub use snapshot::{EngineClip, EngineTrack, resolve_tracks};

use basedrop::{Collector, Handle, Shared};
use cpal::{
    FromSample, SizedSample,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};

type SharedTracks = Shared<Vec<EngineTrack>>;

struct TransportState {
    playing: bool,
    position_ms: f64,
}

pub struct AudioEngineHandle {
    pub commands: rtrb::Producer<Command>,
    pub status: rtrb::Consumer<Status>,
    pub tracks: rtrb::Producer<SharedTracks>,
    pub collector: Collector,
    pub handle: Handle,
    pub sample_rate: u32,
    _stream: cpal::Stream,
}

pub fn start(tracks: Vec<EngineTrack>) -> anyhow::Result<AudioEngineHandle> {
    let collector = Collector::new();
    let handle = collector.handle();

    let (command_tx, command_rx) = rtrb::RingBuffer::<Command>::new(64);
    let (status_tx, status_rx) = rtrb::RingBuffer::<Status>::new(64);
    let (tracks_tx, tracks_rx) = rtrb::RingBuffer::<SharedTracks>::new(4);

    let initial_tracks = Shared::new(&handle, tracks);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device found"))?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0;

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(
            &device,
            &config.into(),
            initial_tracks,
            command_rx,
            tracks_rx,
            status_tx,
        )?,
        sample_format => anyhow::bail!("unsupported sample format '{sample_format}'"),
    };

    stream.play()?;
    log::info!("audio session started at {sample_rate} Hz");

    Ok(AudioEngineHandle {
        commands: command_tx,
        status: status_rx,
        tracks: tracks_tx,
        collector,
        handle,
        sample_rate,
        _stream: stream,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    initial_tracks: SharedTracks,
    mut command_rx: rtrb::Consumer<Command>,
    mut tracks_rx: rtrb::Consumer<SharedTracks>,
    mut status_tx: rtrb::Producer<Status>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let output_channels = config.channels as usize;
    let sample_rate = config.sample_rate.0;
    let ms_per_frame = 1000.0 / sample_rate as f64;

    let mut state = TransportState {
        playing: false,
        position_ms: 0.0,
    };

    let mut current_tracks = initial_tracks;
    let mut mixed = vec![0.0f32; output_channels];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            // Swap in edited tracks if available (lock-free). New snapshots
            // replace scheduling inputs without touching the playhead.
            while let Ok(new_tracks) = tracks_rx.pop() {
                current_tracks = new_tracks;
            }

            // Drain the whole queue before mixing so cancel-and-reschedule
            // pairs apply atomically within one callback.
            while let Ok(cmd) = command_rx.pop() {
                match cmd {
                    Command::Play { from_ms } => {
                        if let Some(ms) = from_ms {
                            state.position_ms = ms.max(0.0);
                        }
                        state.playing = true;
                    }
                    Command::Pause => state.playing = false,
                    Command::Seek { ms } => state.position_ms = ms.max(0.0),
                }
            }

            let _ = status_tx.push(Status::Position(state.position_ms));

            for frame in data.chunks_mut(output_channels) {
                if state.playing {
                    mixed.fill(0.0);
                    mix_frame(&current_tracks, state.position_ms, &mut mixed);
                    for (ch, sample) in frame.iter_mut().enumerate() {
                        *sample = T::from_sample(mixed[ch]);
                    }
                    state.position_ms += ms_per_frame;
                } else {
                    for sample in frame.iter_mut() {
                        *sample = T::from_sample(0.0);
                    }
                }
            }
        },
        |err| log::error!("stream error: {err}"),
        None,
    )?;

    Ok(stream)
}

/// Mix one output frame at a timeline position. Also used by tests as the
/// reference for what the callback plays.
pub fn mix_frame(tracks: &[EngineTrack], position_ms: f64, out: &mut [f32]) {
    for track in tracks {
        let track_gain = track.gain.value_at(position_ms);
        if track_gain == 0.0 {
            continue;
        }
        for engine_clip in &track.clips {
            let clip = &engine_clip.clip;
            let Some(cycle) = schedule::cycle_at(clip, position_ms) else {
                continue;
            };
            let offset_ms = position_ms - cycle.start_ms;
            let source_ms = clip.trim_start_ms + offset_ms;
            let audio = &engine_clip.audio;
            let frame_index = (source_ms / 1000.0 * audio.sample_rate() as f64) as usize;
            if frame_index >= audio.frames() {
                continue;
            }
            let fade = schedule::clip_gain_at(clip, offset_ms, cycle.duration_ms);
            if fade == 0.0 {
                continue;
            }
            let clip_channels = audio.channels() as usize;
            let samples = audio.samples();
            for (ch, mix_sample) in out.iter_mut().enumerate() {
                let clip_ch = ch % clip_channels;
                let idx = frame_index * clip_channels + clip_ch;
                if idx < samples.len() {
                    *mix_sample += samples[idx] * fade * track_gain;
                }
            }
        }
    }
}
