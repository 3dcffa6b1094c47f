use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A connected duplex serial stream — implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations. On
/// Unix it wraps an owned socket descriptor (an RFCOMM socket in production,
/// a socketpair end from [`SerialStream::pair`] in tests). Reads and writes
/// go through independent directions of the socket, so a cloned handle can
/// read while the original writes without locking.
pub struct SerialStream {
    inner: SerialStreamInner,
}

enum SerialStreamInner {
    #[cfg(unix)]
    Fd(std::os::fd::OwnedFd),
}

impl Read for SerialStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => {
                use std::os::fd::AsRawFd;
                // SAFETY: `buf` is a valid writable region of `buf.len()` bytes
                // and `fd` is an open descriptor owned by this stream.
                let n = unsafe {
                    libc::read(fd.as_raw_fd(), buf.as_mut_ptr().cast::<libc::c_void>(), buf.len())
                };
                if n < 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(n as usize)
            }
        }
    }
}

impl Write for SerialStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => {
                use std::os::fd::AsRawFd;

                // Suppress SIGPIPE; a closed peer must surface as EPIPE.
                #[cfg(any(target_os = "linux", target_os = "android"))]
                const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
                #[cfg(not(any(target_os = "linux", target_os = "android")))]
                const SEND_FLAGS: libc::c_int = 0;

                // SAFETY: `buf` is a valid readable region of `buf.len()` bytes
                // and `fd` is an open socket descriptor owned by this stream.
                let n = unsafe {
                    libc::send(
                        fd.as_raw_fd(),
                        buf.as_ptr().cast::<libc::c_void>(),
                        buf.len(),
                        SEND_FLAGS,
                    )
                };
                if n < 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(n as usize)
            }
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // Socket writes are unbuffered at this layer.
        Ok(())
    }
}

impl SerialStream {
    /// Wrap an owned socket descriptor.
    #[cfg(unix)]
    pub(crate) fn from_fd(fd: std::os::fd::OwnedFd) -> Self {
        Self {
            inner: SerialStreamInner::Fd(fd),
        }
    }

    /// Create a connected loopback pair.
    ///
    /// Both ends behave like a connected serial link; used by tests and local
    /// diagnostics in place of a radio connection.
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        use std::os::fd::FromRawFd;

        let mut fds = [0 as libc::c_int; 2];
        // SAFETY: `fds` is a valid writable array of two c_ints.
        let rc = unsafe {
            libc::socketpair(
                libc::AF_UNIX,
                libc::SOCK_STREAM | libc::SOCK_CLOEXEC,
                0,
                fds.as_mut_ptr(),
            )
        };
        if rc != 0 {
            return Err(std::io::Error::last_os_error().into());
        }
        // SAFETY: socketpair succeeded, so both descriptors are open and
        // owned by nothing else.
        let (left, right) = unsafe {
            (
                std::os::fd::OwnedFd::from_raw_fd(fds[0]),
                std::os::fd::OwnedFd::from_raw_fd(fds[1]),
            )
        };
        Ok((Self::from_fd(left), Self::from_fd(right)))
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Clones refer to the same socket: a [`shutdown`](Self::shutdown) on any
    /// handle is observed by all of them.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => {
                let cloned = fd.try_clone().map_err(crate::error::TransportError::Io)?;
                Ok(Self::from_fd(cloned))
            }
        }
    }

    /// Shut down both directions of the socket.
    ///
    /// An in-flight blocking read on any clone fails promptly instead of
    /// hanging. Repeated shutdowns are harmless.
    pub fn shutdown(&self) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => {
                use std::os::fd::AsRawFd;
                // SAFETY: `fd` is an open socket descriptor owned by this stream.
                let rc = unsafe { libc::shutdown(fd.as_raw_fd(), libc::SHUT_RDWR) };
                if rc != 0 {
                    let err = std::io::Error::last_os_error();
                    // ENOTCONN after the peer already closed is not a fault.
                    if err.raw_os_error() != Some(libc::ENOTCONN) {
                        return Err(err.into());
                    }
                }
                Ok(())
            }
        }
    }

    /// Set read timeout on the underlying socket.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => set_socket_timeout(fd, libc::SO_RCVTIMEO, timeout),
        }
    }

    /// Set write timeout on the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => set_socket_timeout(fd, libc::SO_SNDTIMEO, timeout),
        }
    }
}

#[cfg(unix)]
fn set_socket_timeout(
    fd: &std::os::fd::OwnedFd,
    option: libc::c_int,
    timeout: Option<Duration>,
) -> Result<()> {
    use std::os::fd::AsRawFd;

    let tv = match timeout {
        Some(duration) => libc::timeval {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_usec: duration.subsec_micros() as libc::suseconds_t,
        },
        None => libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
    };
    // SAFETY: `tv` is a valid timeval and `fd` is an open socket descriptor
    // owned by the calling stream.
    let rc = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            option,
            (&tv as *const libc::timeval).cast::<libc::c_void>(),
            std::mem::size_of::<libc::timeval>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    Ok(())
}

impl std::fmt::Debug for SerialStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            SerialStreamInner::Fd(fd) => {
                use std::os::fd::AsRawFd;
                f.debug_struct("SerialStream")
                    .field("fd", &fd.as_raw_fd())
                    .finish()
            }
        }
    }
}
