//! Telemetry record framing and command encoding.
//!
//! This is the protocol core. Inbound telemetry is a text stream of
//! `key=value` lines, one record terminated by a blank line (`\r\n\r\n`);
//! outbound commands are fixed-layout binary frames identified by a two-byte
//! opcode. Both directions are pure transformations — no I/O lives here.

pub mod command;
pub mod decoder;
pub mod error;
pub mod fields;
pub mod record;

pub use command::{
    encode_reset, encode_set_time, Command, OPCODE_RESET, OPCODE_SET_TIME, TIME_BIAS_SECS,
};
pub use decoder::{RecordDecoder, DEFAULT_MAX_RECORD_SIZE, RECORD_DELIMITER};
pub use error::{ProtoError, Result};
pub use record::{DeviceState, Record};
