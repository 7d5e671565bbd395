use serde::{Deserialize, Serialize};
use waveline_envelope::TrackEnvelope;

use crate::clip::Clip;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub clips: Vec<Clip>,
    /// Fader position in percent, 0-100.
    pub volume: f32,
    pub muted: bool,
    pub soloed: bool,
    pub envelope: Option<TrackEnvelope>,
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            clips: Vec::new(),
            volume: 100.0,
            muted: false,
            soloed: false,
            envelope: None,
        }
    }
}

/// Which tracks produce sound right now: if any track is soloed only the
/// solo set plays; mute always silences.
pub fn audible_tracks(tracks: &[Track]) -> Vec<&Track> {
    let any_soloed = tracks.iter().any(|t| t.soloed);
    tracks
        .iter()
        .filter(|t| !t.muted && (!any_soloed || t.soloed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: u64, muted: bool, soloed: bool) -> Track {
        Track {
            muted,
            soloed,
            ..Track::new(TrackId(id), format!("Track {id}"))
        }
    }

    #[test]
    fn test_all_audible_by_default() {
        let tracks = vec![track(1, false, false), track(2, false, false)];
        assert_eq!(audible_tracks(&tracks).len(), 2);
    }

    #[test]
    fn test_mute_silences() {
        let tracks = vec![track(1, true, false), track(2, false, false)];
        let audible = audible_tracks(&tracks);
        assert_eq!(audible.len(), 1);
        assert_eq!(audible[0].id, TrackId(2));
    }

    #[test]
    fn test_solo_wins_over_unsoloed() {
        let tracks = vec![track(1, false, true), track(2, false, false)];
        let audible = audible_tracks(&tracks);
        assert_eq!(audible.len(), 1);
        assert_eq!(audible[0].id, TrackId(1));
    }

    #[test]
    fn test_muted_solo_stays_silent() {
        let tracks = vec![track(1, true, true), track(2, false, false)];
        assert!(audible_tracks(&tracks).is_empty());
    }
}
