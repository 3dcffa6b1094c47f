use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use bloomlink_proto::{Command, ProtoError, RecordDecoder};
use bloomlink_transport::SerialStream;
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, warn};

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::event::{CloseReason, SessionEvent};

/// A live connection to the garden monitor.
///
/// Owns the outbound direction and teardown. The inbound direction runs on a
/// dedicated reader thread for the lifetime of the connection and delivers
/// [`SessionEvent`]s through the receiver returned by [`Session::spawn`]:
/// strict FIFO, never blocking the reader, one event in the consumer's hands
/// at a time.
pub struct Session {
    writer: Mutex<SerialStream>,
    control: SerialStream,
    cancelled: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl Session {
    /// Spawn a session over an already-connected stream.
    ///
    /// Clones the stream for the reader thread; reads and writes travel on
    /// independent directions of the socket, so neither side locks the other.
    pub fn spawn(
        stream: SerialStream,
        config: &SessionConfig,
    ) -> Result<(Self, Receiver<SessionEvent>)> {
        let reader_stream = stream.try_clone()?;
        let control = stream.try_clone()?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let cancelled = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));

        let reader = std::thread::Builder::new()
            .name("bloomlink-reader".to_string())
            .spawn({
                let cancelled = Arc::clone(&cancelled);
                let alive = Arc::clone(&alive);
                let max_record_size = config.max_record_size;
                let read_chunk_size = config.read_chunk_size;
                move || {
                    read_loop(
                        reader_stream,
                        tx,
                        cancelled,
                        alive,
                        max_record_size,
                        read_chunk_size,
                    )
                }
            })
            .map_err(SessionError::Spawn)?;

        Ok((
            Self {
                writer: Mutex::new(stream),
                control,
                cancelled,
                alive,
                reader: Some(reader),
            },
            rx,
        ))
    }

    /// Write raw bytes to the device, from any thread.
    ///
    /// Fire-and-forget: the write blocks until handed to the socket, and
    /// failures are logged rather than returned. The session stays usable
    /// after a failed write.
    pub fn write(&self, bytes: &[u8]) {
        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writer.write_all(bytes).and_then(|()| writer.flush()) {
            warn!(error = %err, len = bytes.len(), "write to device failed");
        }
    }

    /// Encode and write a command.
    pub fn send(&self, command: &Command) {
        self.write(&command.encode());
    }

    /// Close the connection.
    ///
    /// Shuts the socket down so the reader's in-flight blocking read fails
    /// promptly; the reader then delivers a final
    /// [`SessionEvent::Closed`]`(`[`CloseReason::Cancelled`]`)`. Idempotent,
    /// and safe to call after the reader has already terminated.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("cancelling session");
        if let Err(err) = self.control.shutdown() {
            debug!(error = %err, "socket shutdown during cancel failed");
        }
    }

    /// Whether the reader loop is still running.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                error!("reader thread panicked");
            }
        }
    }
}

/// Reader loop: blocking read, frame, dispatch; exits on stream fault or
/// cancellation.
fn read_loop(
    mut stream: SerialStream,
    tx: Sender<SessionEvent>,
    cancelled: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    max_record_size: usize,
    read_chunk_size: usize,
) {
    let mut decoder = RecordDecoder::with_max_record_size(max_record_size);
    let mut chunk = vec![0u8; read_chunk_size];

    let reason = 'reading: loop {
        let read = match stream.read(&mut chunk) {
            Ok(0) => {
                let reason = if cancelled.load(Ordering::SeqCst) {
                    CloseReason::Cancelled
                } else {
                    CloseReason::EndOfStream
                };
                break 'reading reason;
            }
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                if cancelled.load(Ordering::SeqCst) {
                    break 'reading CloseReason::Cancelled;
                }
                error!(error = %err, "stream read failed");
                break 'reading CloseReason::ReadFailed(err.to_string());
            }
        };

        match decoder.feed(&chunk[..read]) {
            Ok(records) => {
                for record in records {
                    if tx.send(SessionEvent::Record(record)).is_err() {
                        debug!("consumer dropped the receiver; stopping reader");
                        alive.store(false, Ordering::SeqCst);
                        return;
                    }
                }
            }
            Err(ProtoError::RecordTooLarge { size, max }) => {
                error!(size, max, "unterminated record exceeds cap");
                break 'reading CloseReason::RecordTooLarge { size, max };
            }
        }
    };

    alive.store(false, Ordering::SeqCst);
    debug!(?reason, "reader loop terminated");
    let _ = tx.send(SessionEvent::Closed(reason));
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use bloomlink_proto::Record;

    use super::*;

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn loopback_session() -> (Session, Receiver<SessionEvent>, SerialStream) {
        let (local, remote) = SerialStream::pair().unwrap();
        let (session, events) = Session::spawn(local, &SessionConfig::default()).unwrap();
        (session, events, remote)
    }

    fn expect_record(events: &Receiver<SessionEvent>) -> Record {
        match events.recv_timeout(RECV_TIMEOUT).unwrap() {
            SessionEvent::Record(record) => record,
            other => panic!("expected record, got {other:?}"),
        }
    }

    fn expect_closed(events: &Receiver<SessionEvent>) -> CloseReason {
        match events.recv_timeout(RECV_TIMEOUT).unwrap() {
            SessionEvent::Closed(reason) => reason,
            other => panic!("expected close, got {other:?}"),
        }
    }

    #[test]
    fn delivers_decoded_records() {
        let (_session, events, mut remote) = loopback_session();

        remote
            .write_all(b"state=DAYTIME\nlight_on=1\r\n\r\n")
            .unwrap();

        let record = expect_record(&events);
        assert_eq!(record.get("state"), Some("DAYTIME"));
        assert_eq!(record.light_on(), Some(true));
    }

    #[test]
    fn records_split_across_reads_still_decode() {
        let (_session, events, mut remote) = loopback_session();

        remote.write_all(b"state=DAY").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        remote.write_all(b"TIME\r\n\r\n").unwrap();

        let record = expect_record(&events);
        assert_eq!(record.get("state"), Some("DAYTIME"));
    }

    #[test]
    fn thousand_records_arrive_in_fifo_order() {
        let (_session, events, mut remote) = loopback_session();

        let producer = std::thread::spawn(move || {
            for i in 0..1000u32 {
                remote
                    .write_all(format!("seq={i}\r\n\r\n").as_bytes())
                    .unwrap();
            }
            remote
        });

        for expected in 0..1000u32 {
            let record = expect_record(&events);
            assert_eq!(record.get("seq"), Some(expected.to_string().as_str()));
        }

        let _remote = producer.join().unwrap();
    }

    #[test]
    fn remote_close_delivers_end_of_stream() {
        let (_session, events, mut remote) = loopback_session();

        remote.write_all(b"a=1\r\n\r\n").unwrap();
        drop(remote);

        assert_eq!(expect_record(&events).get("a"), Some("1"));
        assert_eq!(expect_closed(&events), CloseReason::EndOfStream);
    }

    #[test]
    fn cancel_mid_read_exits_promptly() {
        let (session, events, _remote) = loopback_session();

        // The reader is parked in a blocking read with nothing inbound.
        std::thread::sleep(Duration::from_millis(50));
        session.cancel();

        assert_eq!(expect_closed(&events), CloseReason::Cancelled);
        assert!(!session.is_alive());

        // Idempotent, and safe after the loop is gone.
        session.cancel();
    }

    #[test]
    fn partial_record_is_dropped_on_cancel() {
        let (session, events, mut remote) = loopback_session();

        remote.write_all(b"state=DAY").unwrap();
        std::thread::sleep(Duration::from_millis(50));
        session.cancel();

        // The unterminated partial never surfaces as a record.
        assert_eq!(expect_closed(&events), CloseReason::Cancelled);
    }

    #[test]
    fn oversized_record_closes_session() {
        let (local, mut remote) = SerialStream::pair().unwrap();
        let config = SessionConfig {
            max_record_size: 64,
            ..SessionConfig::default()
        };
        let (_session, events) = Session::spawn(local, &config).unwrap();

        remote.write_all(&[b'x'; 256]).unwrap();

        match expect_closed(&events) {
            CloseReason::RecordTooLarge { size, max: 64 } => assert!(size > 64),
            other => panic!("expected RecordTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn commands_reach_the_wire() {
        let (session, _events, mut remote) = loopback_session();

        session.send(&Command::Reset);

        let mut buf = [0u8; 2];
        remote.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0x2A]);
    }

    #[test]
    fn write_is_usable_from_another_thread() {
        let (session, _events, mut remote) = loopback_session();
        let session = Arc::new(session);

        let writer = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || session.write(&[0xFF, 0x2A]))
        };
        writer.join().unwrap();

        let mut buf = [0u8; 2];
        remote.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0x2A]);
    }

    #[test]
    fn write_after_close_is_swallowed() {
        let (session, events, remote) = loopback_session();

        drop(remote);
        assert_eq!(expect_closed(&events), CloseReason::EndOfStream);

        // Logged, not returned, and must not panic.
        session.write(b"late");
    }

    #[test]
    fn dropping_the_session_cancels() {
        let (session, events, _remote) = loopback_session();

        drop(session);

        assert_eq!(expect_closed(&events), CloseReason::Cancelled);
    }

    #[test]
    fn reader_stops_when_consumer_goes_away() {
        let (session, events, mut remote) = loopback_session();

        drop(events);
        remote.write_all(b"a=1\r\n\r\n").unwrap();

        let deadline = std::time::Instant::now() + RECV_TIMEOUT;
        while session.is_alive() {
            assert!(
                std::time::Instant::now() < deadline,
                "reader did not stop after receiver drop"
            );
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}
