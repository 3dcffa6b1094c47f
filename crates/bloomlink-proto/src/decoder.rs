use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::error::{ProtoError, Result};
use crate::record::Record;

/// Blank line terminating one record's serialized form.
pub const RECORD_DELIMITER: &[u8] = b"\r\n\r\n";

/// Default cap on the unterminated remainder retained between feeds: 64 KiB.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 64 * 1024;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Turns a raw byte stream into decoded [`Record`]s.
///
/// Stateful and destructive: bytes are appended to an accumulation buffer,
/// every complete record is cut out of it, and at most one unterminated
/// partial record remains buffered between calls. Framing is chunk-boundary
/// independent — feeding a stream in arbitrary splits yields the same record
/// sequence as feeding it whole.
pub struct RecordDecoder {
    buf: BytesMut,
    max_record_size: usize,
}

impl RecordDecoder {
    /// Decoder with the default remainder cap.
    pub fn new() -> Self {
        Self::with_max_record_size(DEFAULT_MAX_RECORD_SIZE)
    }

    /// Decoder with an explicit remainder cap.
    pub fn with_max_record_size(max_record_size: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_record_size,
        }
    }

    /// Append bytes and return every record completed by them.
    ///
    /// A single call may yield zero, one, or several records. Returns
    /// [`ProtoError::RecordTooLarge`] when the *unterminated* remainder
    /// exceeds the cap — data consumed as complete records is never counted
    /// against it. The error is terminal; the decoder should be discarded.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Record>> {
        self.buf.extend_from_slice(bytes);

        let mut records = Vec::new();
        while let Some(idx) = find_delimiter(&self.buf) {
            let body = self.buf.split_to(idx);
            self.buf.advance(RECORD_DELIMITER.len());
            records.push(parse_record(&body));
        }

        if self.buf.len() > self.max_record_size {
            return Err(ProtoError::RecordTooLarge {
                size: self.buf.len(),
                max: self.max_record_size,
            });
        }

        Ok(records)
    }

    /// Bytes of unterminated partial record currently buffered.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// The configured remainder cap.
    pub fn max_record_size(&self) -> usize {
        self.max_record_size
    }
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.windows(RECORD_DELIMITER.len())
        .position(|window| window == RECORD_DELIMITER)
}

/// Parse one record body into key/value fields.
///
/// The body is decoded as text lossily (the wire format is ASCII); lines are
/// trimmed and split once on `=`. Lines that do not split into two parts are
/// dropped without failing the record. No escaping exists for `=` or newlines
/// inside values; that is a constraint of the wire format.
fn parse_record(body: &[u8]) -> Record {
    let text = String::from_utf8_lossy(body);
    let mut record = Record::new();
    for line in text.split('\n') {
        let line = line.trim();
        let mut parts = line.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some(key), Some(value)) => record.insert(key, value),
            _ => {
                if !line.is_empty() {
                    debug!(line, "dropping malformed field");
                }
            }
        }
    }
    record
}
