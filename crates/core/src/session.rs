use std::sync::Arc;

use basedrop::Shared;
use waveline_encode::{AudioConverter, ExportFormat};
use waveline_engine::{AudioEngineHandle, Command, Status, resolve_tracks};
use waveline_model::{
    AudioBuffer, ClipId, DecodedAudio, LoopingPolicy, PlaybackState, RenderRange, Track, TrackId,
    compute_loop_end_ms,
};
use waveline_render::{BitDepth, render, write_wav_bytes};
use waveline_timeline::{Scale, Timebase, align_hairline};

/// Draw hint for the playhead, emitted once per poll so the presentation
/// layer never computes timeline geometry itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayheadHint {
    pub ms: f64,
    /// Hairline-aligned viewport x for a crisp 1px line.
    pub viewport_px: f64,
}

pub fn playhead_hint(ms: f64, scale: &Scale) -> PlayheadHint {
    PlayheadHint {
        ms,
        viewport_px: align_hairline(scale.ms_to_viewport_px(ms)),
    }
}

/// One playback session over a project's tracks.
///
/// Owns the live engine handle and serializes every play/seek/stop/edit into
/// the engine's command and snapshot queues, so cancel-then-reschedule is
/// atomic from the caller's side. Track data is re-read and re-resolved at
/// every scheduling decision point; nothing is cached across edits.
pub struct Session {
    engine: AudioEngineHandle,
    tracks: Vec<Track>,
    audio: Arc<dyn DecodedAudio>,
    policy: LoopingPolicy,
    timebase: Timebase,
    playback_state: PlaybackState,
    current_ms: f64,
}

impl Session {
    pub fn new(tracks: Vec<Track>, audio: Arc<dyn DecodedAudio>) -> anyhow::Result<Self> {
        // The device sample rate is only known once the stream exists, so the
        // engine starts empty and gets its first snapshot immediately after.
        let engine = waveline_engine::start(Vec::new())?;
        let mut session = Self {
            engine,
            tracks,
            audio,
            policy: LoopingPolicy::default(),
            timebase: Timebase::default(),
            playback_state: PlaybackState::Stopped,
            current_ms: 0.0,
        };
        session.push_snapshot(0.0);
        Ok(session)
    }

    /// Start playback from an explicit position.
    pub fn play_from(&mut self, ms: f64) {
        let ms = ms.max(0.0);
        self.push_snapshot(ms);
        let _ = self.engine.commands.push(Command::Play { from_ms: Some(ms) });
        self.current_ms = ms;
        self.playback_state = PlaybackState::Playing;
    }

    /// Resume from the current position.
    pub fn play(&mut self) {
        self.push_snapshot(self.current_ms);
        let _ = self.engine.commands.push(Command::Play { from_ms: None });
        self.playback_state = PlaybackState::Playing;
    }

    pub fn pause(&mut self) {
        let _ = self.engine.commands.push(Command::Pause);
        self.playback_state = PlaybackState::Paused;
    }

    /// Cancel pending playback. The position is preserved; rewinding is the
    /// caller's decision, via `seek(0)`.
    pub fn stop(&mut self) {
        let _ = self.engine.commands.push(Command::Pause);
        self.playback_state = PlaybackState::Stopped;
    }

    /// Jump to a position. While playing this is one atomic
    /// cancel-and-reschedule: the callback drains both the snapshot and the
    /// seek before mixing, so the old schedule never double-triggers.
    pub fn seek(&mut self, ms: f64) {
        let ms = ms.max(0.0);
        self.push_snapshot(ms);
        let _ = self.engine.commands.push(Command::Seek { ms });
        self.current_ms = ms;
    }

    /// Drain engine status. Returns the new position if it moved.
    pub fn poll(&mut self) -> Option<f64> {
        let mut position_changed = None;
        while let Ok(status) = self.engine.status.pop() {
            match status {
                Status::Position(ms) => {
                    if ms != self.current_ms {
                        position_changed = Some(ms);
                    }
                    self.current_ms = ms;
                }
            }
        }
        position_changed
    }

    /// Replace one track after an edit and reschedule its future commands.
    /// Playback position and the other tracks' audio are untouched.
    pub fn update_track(&mut self, track: Track) {
        if let Some(existing) = self.tracks.iter_mut().find(|t| t.id == track.id) {
            *existing = track;
        } else {
            self.tracks.push(track);
        }
        self.push_snapshot(self.current_ms);
    }

    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.push_snapshot(self.current_ms);
    }

    /// Turn looping on for a clip, filling in the default loop boundary when
    /// none is set. Returns the clip's loop end.
    pub fn enable_clip_loop(&mut self, track_id: TrackId, clip_id: ClipId) -> Option<f64> {
        let policy = self.policy;
        let track = self.tracks.iter_mut().find(|t| t.id == track_id)?;
        let clip = track.clips.iter_mut().find(|c| c.id == clip_id)?;
        clip.looped = true;
        if clip.loop_end_ms.is_none() {
            clip.loop_end_ms = Some(compute_loop_end_ms(clip, &policy));
        }
        let loop_end = clip.loop_end_ms;
        self.push_snapshot(self.current_ms);
        loop_end
    }

    pub fn current_ms(&self) -> f64 {
        self.current_ms
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback_state
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state.is_playing()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn timebase(&self) -> &Timebase {
        &self.timebase
    }

    pub fn timebase_mut(&mut self) -> &mut Timebase {
        &mut self.timebase
    }

    pub fn looping_policy(&self) -> &LoopingPolicy {
        &self.policy
    }

    pub fn playhead_hint(&self, scale: &Scale) -> PlayheadHint {
        playhead_hint(self.current_ms, scale)
    }

    /// Offline-render a window of this session's tracks. Runs on its own
    /// buffers; safe to call while playing.
    pub fn render_range(&self, range: &RenderRange) -> AudioBuffer {
        render(&self.tracks, range, &*self.audio)
    }

    /// Render and encode a window for export.
    pub fn export(
        &self,
        range: &RenderRange,
        format: ExportFormat,
        bit_depth: BitDepth,
        dither: bool,
        converter: Option<&dyn AudioConverter>,
        on_progress: impl FnMut(f64),
    ) -> anyhow::Result<Vec<u8>> {
        let buffer = self.render_range(range);
        let wav = write_wav_bytes(&buffer, bit_depth, dither)?;
        let encoded = waveline_encode::encode(wav, format, converter, on_progress)?;
        Ok(encoded)
    }

    fn push_snapshot(&mut self, from_ms: f64) {
        let resolved = resolve_tracks(
            &self.tracks,
            &*self.audio,
            self.engine.sample_rate,
            from_ms,
        );
        let shared = Shared::new(&self.engine.handle, resolved);
        if self.engine.tracks.push(shared).is_err() {
            log::warn!("snapshot queue full, edit dropped until next reschedule");
        }
        self.engine.collector.collect();
    }
}
