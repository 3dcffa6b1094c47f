use crate::addr::BtAddr;
use crate::error::Result;
use crate::stream::SerialStream;

/// RFCOMM channel carrying the serial-port service on SPP adapter hardware.
///
/// The service is advertised under [`SERIAL_PORT_UUID`](crate::SERIAL_PORT_UUID);
/// resolving the channel dynamically would require an SDP query, which this
/// transport does not perform.
pub const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// Open a blocking RFCOMM stream to `addr` on the given channel.
///
/// Performs the connection handshake synchronously; failure is returned to
/// the caller without retrying.
#[cfg(target_os = "linux")]
pub fn rfcomm_connect(addr: BtAddr, channel: u8) -> Result<SerialStream> {
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

    use tracing::debug;

    use crate::error::TransportError;

    // Not provided by libc; layout per the kernel's rfcomm.h.
    #[repr(C)]
    struct SockaddrRc {
        rc_family: libc::sa_family_t,
        rc_bdaddr: [u8; 6],
        rc_channel: u8,
    }

    // Not provided by libc; value per the kernel's bluetooth.h.
    const BTPROTO_RFCOMM: libc::c_int = 3;

    // SAFETY: no arguments besides plain integers.
    let raw = unsafe {
        libc::socket(
            libc::AF_BLUETOOTH,
            libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
            BTPROTO_RFCOMM,
        )
    };
    if raw < 0 {
        return Err(TransportError::Connect {
            addr,
            source: std::io::Error::last_os_error(),
        });
    }
    // SAFETY: `socket` succeeded, so `raw` is an open descriptor owned by
    // nothing else.
    let fd = unsafe { OwnedFd::from_raw_fd(raw) };

    // The kernel expects bdaddr bytes transposed relative to display order.
    let mut bdaddr = addr.octets();
    bdaddr.reverse();
    let sockaddr = SockaddrRc {
        rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
        rc_bdaddr: bdaddr,
        rc_channel: channel,
    };

    // SAFETY: `sockaddr` is a valid SockaddrRc for the provided length and
    // `fd` is an open RFCOMM socket descriptor.
    let rc = unsafe {
        libc::connect(
            fd.as_raw_fd(),
            (&sockaddr as *const SockaddrRc).cast::<libc::sockaddr>(),
            std::mem::size_of::<SockaddrRc>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(TransportError::Connect {
            addr,
            source: std::io::Error::last_os_error(),
        });
    }

    debug!(%addr, channel, "connected rfcomm stream");
    Ok(SerialStream::from_fd(fd))
}

/// Open a blocking RFCOMM stream to `addr` on the given channel.
///
/// Always fails on platforms without an RFCOMM socket implementation.
#[cfg(not(target_os = "linux"))]
pub fn rfcomm_connect(addr: BtAddr, channel: u8) -> Result<SerialStream> {
    let _ = (addr, channel);
    Err(crate::error::TransportError::Unsupported)
}
