//! Resolved track snapshots handed to the realtime callback. Resolution
//! (mute/solo filtering, source lookup, resampling, envelope compilation)
//! happens here, at schedule time; the callback only mixes.

use waveline_model::{AudioArc, Clip, DecodedAudio, Track, TrackId, audible_tracks};

use crate::schedule::GainTimeline;

#[derive(Debug, Clone)]
pub struct EngineClip {
    pub clip: Clip,
    pub audio: AudioArc,
}

#[derive(Debug, Clone)]
pub struct EngineTrack {
    pub id: TrackId,
    pub clips: Vec<EngineClip>,
    pub gain: GainTimeline,
}

/// Build the playable snapshot for `play(from_ms)` or an edit-time
/// reschedule. Clips without decoded audio are skipped, not fatal.
pub fn resolve_tracks(
    tracks: &[Track],
    audio: &dyn DecodedAudio,
    device_sample_rate: u32,
    from_ms: f64,
) -> Vec<EngineTrack> {
    audible_tracks(tracks)
        .into_iter()
        .map(|track| {
            let clips = track
                .clips
                .iter()
                .filter(|clip| clip.audible_ms() > 0.0)
                .filter_map(|clip| {
                    let Some(decoded) = audio.decoded(clip.source) else {
                        log::warn!(
                            "clip {:?}: no decoded audio for source {:?}, skipping",
                            clip.id,
                            clip.source
                        );
                        return None;
                    };
                    match decoded.resample(device_sample_rate) {
                        Ok(resampled) => Some(EngineClip {
                            clip: clip.clone(),
                            audio: resampled,
                        }),
                        Err(err) => {
                            log::warn!("clip {:?}: resample failed: {err}, skipping", clip.id);
                            None
                        }
                    }
                })
                .collect();
            EngineTrack {
                id: track.id,
                clips,
                gain: GainTimeline::compile(track.volume, track.envelope.as_ref(), from_ms),
            }
        })
        .collect()
}
