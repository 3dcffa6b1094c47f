/// Errors that can occur while decoding the telemetry stream.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The unterminated portion of the stream exceeds the configured cap.
    ///
    /// A remote that never sends the record delimiter would otherwise grow
    /// the accumulation buffer without bound.
    #[error("unterminated record too large ({size} bytes, max {max})")]
    RecordTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ProtoError>;
