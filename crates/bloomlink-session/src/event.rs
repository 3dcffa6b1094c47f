use bloomlink_proto::Record;

/// Everything a consumer can observe from a session's inbound direction.
///
/// Events arrive on the dispatch channel in production order; a `Closed`
/// event is always the last one delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// One decoded telemetry record.
    Record(Record),
    /// The reader loop terminated; no further events follow.
    Closed(CloseReason),
}

/// Why the reader loop terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// [`Session::cancel`](crate::Session::cancel) was called locally.
    Cancelled,
    /// The remote end closed the stream.
    EndOfStream,
    /// The stream read failed.
    ReadFailed(String),
    /// The remote sent an unterminated record past the configured cap.
    RecordTooLarge { size: usize, max: usize },
}

impl CloseReason {
    /// Whether this close was requested locally rather than forced by the
    /// stream.
    pub fn is_local(&self) -> bool {
        matches!(self, CloseReason::Cancelled)
    }
}
