/// Errors that can occur while establishing a session.
///
/// Steady-state read failures are not errors at this surface; they terminate
/// the reader loop and arrive as a final
/// [`SessionEvent::Closed`](crate::SessionEvent) instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Device resolution or connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] bloomlink_transport::TransportError),

    /// Protocol-level decode failure.
    #[error("protocol error: {0}")]
    Proto(#[from] bloomlink_proto::ProtoError),

    /// The reader thread could not be spawned.
    #[error("failed to spawn reader thread: {0}")]
    Spawn(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
