use crate::clip::ClipId;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("clip {clip:?} has trim_end before trim_start")]
    InvalidTrim { clip: ClipId },

    #[error("clip {clip:?} has a loop end before its first pass completes")]
    InvalidLoopEnd { clip: ClipId },
}
