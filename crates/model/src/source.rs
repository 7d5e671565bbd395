use std::collections::HashMap;

use crate::audio::AudioArc;
use crate::clip::SourceId;

/// Narrow interface to the decoded-audio collaborator.
///
/// Consumers treat a missing source as "skip this clip", never as an error.
pub trait DecodedAudio: Send + Sync {
    fn decoded(&self, source: SourceId) -> Option<AudioArc>;
}

/// In-memory source table. The decode crate fills one of these from files;
/// tests fill it with synthetic buffers.
#[derive(Debug, Default)]
pub struct AudioRegistry {
    sources: HashMap<SourceId, AudioArc>,
}

impl AudioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: SourceId, audio: AudioArc) {
        self.sources.insert(source, audio);
    }

    pub fn remove(&mut self, source: SourceId) -> Option<AudioArc> {
        self.sources.remove(&source)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl DecodedAudio for AudioRegistry {
    fn decoded(&self, source: SourceId) -> Option<AudioArc> {
        self.sources.get(&source).cloned()
    }
}
