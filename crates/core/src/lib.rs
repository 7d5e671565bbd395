pub mod session;

pub use session::{PlayheadHint, Session, playhead_hint};

pub use waveline_decode::{decode_file, load_source};
pub use waveline_encode::{AudioConverter, ConversionJob, EncodeError, ExportFormat, encode};
pub use waveline_envelope::{
    Curve, EnvelopePoint, EnvelopeSegment, TrackEnvelope, db_to_multiplier, db_to_volume,
    effective_db, interpolate, multiplier_to_db, volume_to_db,
};
pub use waveline_model::{
    AudioArc, AudioBuffer, AudioRegistry, Clip, ClipId, DecodedAudio, LoopingPolicy, Marker,
    PlaybackState, RenderRange, SourceId, Track, TrackId, compute_loop_end_ms,
};
pub use waveline_render::{BitDepth, render, write_wav_bytes, write_wav_file};
pub use waveline_timeline::{
    GridMode, Scale, SnapGranularity, Timebase, Timeline, align_hairline, scroll_for_zoom_anchor,
    snap_ms,
};
