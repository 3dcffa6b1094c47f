use std::time::{SystemTime, UNIX_EPOCH};

/// Opcode marker for the reset command.
pub const OPCODE_RESET: [u8; 2] = [0xFF, 0x2A];

/// Opcode marker for the set-time command.
pub const OPCODE_SET_TIME: [u8; 2] = [0xFF, 0x2B];

/// Fixed bias subtracted from the wall-clock epoch before encoding.
///
/// A protocol constant of the device firmware (the controller keeps its
/// clock pre-shifted by eight hours); not derived from the local timezone.
pub const TIME_BIAS_SECS: i64 = 8 * 60 * 60;

/// Encode wire layout:
/// ```text
/// ┌──────────────┬─────────────────────────┐
/// │ Opcode (2B)  │ Timestamp (4B BE)        │
/// │ 0xFF 0x2A    │ reset: absent            │
/// │ 0xFF 0x2B    │ set-time: biased seconds │
/// └──────────────┴─────────────────────────┘
/// ```
/// Frames carry no delimiter or length prefix; length is implied by the
/// opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reboot the controller.
    Reset,
    /// Set the controller clock from the given wall-clock instant.
    SetTime(SystemTime),
}

impl Command {
    /// Encode into the fixed-layout wire bytes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::Reset => encode_reset().to_vec(),
            Command::SetTime(now) => encode_set_time(*now).to_vec(),
        }
    }
}

/// Encode the reset command.
pub fn encode_reset() -> [u8; 2] {
    OPCODE_RESET
}

/// Encode the set-time command for the given wall-clock instant.
///
/// The timestamp bytes are the big-endian low 32 bits of
/// `unix_seconds - TIME_BIAS_SECS`. No bounds check is performed: values
/// outside the 32-bit range truncate, and instants before the bias encode as
/// two's complement. Both are the defined wire behavior.
pub fn encode_set_time(now: SystemTime) -> [u8; 6] {
    let seconds = unix_seconds(now) - TIME_BIAS_SECS;
    let ts = (seconds as u32).to_be_bytes();
    [
        OPCODE_SET_TIME[0],
        OPCODE_SET_TIME[1],
        ts[0],
        ts[1],
        ts[2],
        ts[3],
    ]
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(since) => since.as_secs() as i64,
        Err(err) => -(err.duration().as_secs() as i64),
    }
}
