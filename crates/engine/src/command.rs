/// Commands pushed from the session into the realtime callback.
///
/// The callback drains the whole queue before touching the output buffer, so
/// a `Play { from_ms: Some(..) }` is one atomic reposition-and-start: there is
/// no callback where the old position plays after a seek was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play { from_ms: Option<f64> },
    Pause,
    Seek { ms: f64 },
}

/// Status reported back to the session, polled on the UI cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Position(f64),
}
