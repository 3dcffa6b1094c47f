//! Session lifecycle for the garden-monitor link.
//!
//! This is the "just works" layer. [`connect`] resolves the device, opens the
//! serial stream, and spawns a dedicated reader thread that frames inbound
//! telemetry into [`Record`](bloomlink_proto::Record)s and hands each one to
//! the consumer through an ordered, non-blocking dispatch channel. The
//! returned [`Session`] carries the outbound direction (`write`/`send`) and
//! teardown (`cancel`).

pub mod config;
pub mod connector;
pub mod error;
pub mod event;
pub mod session;

pub use config::{SessionConfig, DEFAULT_DEVICE_PATTERN, DEFAULT_READ_CHUNK_SIZE};
pub use connector::{connect, connect_with_config};
pub use error::{Result, SessionError};
pub use event::{CloseReason, SessionEvent};
pub use session::Session;
