use bloomlink_proto::DEFAULT_MAX_RECORD_SIZE;
use bloomlink_transport::{BtAddr, DEFAULT_RFCOMM_CHANNEL, FALLBACK_DEVICE};

/// Name fragment identifying the serial-adapter hardware among bonded
/// devices.
pub const DEFAULT_DEVICE_PATTERN: &str = "firefly";

/// Bytes requested per blocking read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Configuration for session establishment and the reader loop.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Case-insensitive substring matched against bonded-device names.
    pub device_pattern: String,
    /// Address used when no bonded device matches; `None` makes a failed
    /// match fatal.
    pub fallback_addr: Option<BtAddr>,
    /// RFCOMM channel carrying the serial service.
    pub rfcomm_channel: u8,
    /// Cap on an unterminated inbound record.
    pub max_record_size: usize,
    /// Read buffer size for the reader loop.
    pub read_chunk_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_pattern: DEFAULT_DEVICE_PATTERN.to_string(),
            fallback_addr: Some(FALLBACK_DEVICE),
            rfcomm_channel: DEFAULT_RFCOMM_CHANNEL,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}
