use std::io::Read;
use std::os::fd::RawFd;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::PollRead;

/// The inbound half of the host stream (process stdin).
///
/// Reads go straight to the file descriptor. `std::io::Stdin` keeps its own
/// userspace buffer, which would hide pending bytes from `poll(2)`.
pub struct HostInput {
    fd: RawFd,
}

impl HostInput {
    /// Wrap the process stdin.
    pub fn stdin() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }

    fn poll_events(&self, timeout_ms: libc::c_int) -> Result<libc::c_short> {
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };

        loop {
            // SAFETY: `pfd` is a valid, exclusively borrowed pollfd and the count is 1.
            let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if rc >= 0 {
                return Ok(pfd.revents);
            }
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(TransportError::Poll(err));
        }
    }

    /// Bytes buffered in the kernel and ready to read without blocking.
    fn available(&self) -> Result<usize> {
        let mut avail: libc::c_int = 0;
        // SAFETY: FIONREAD writes a single c_int through the provided pointer.
        let rc = unsafe { libc::ioctl(self.fd, libc::FIONREAD, &mut avail as *mut libc::c_int) };
        if rc < 0 {
            return Err(TransportError::Io(std::io::Error::last_os_error()));
        }
        Ok(usize::try_from(avail).unwrap_or(0))
    }
}

impl Read for HostInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes for the duration of the call.
        let rc = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast::<libc::c_void>(), buf.len()) };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(rc as usize)
    }
}

impl PollRead for HostInput {
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool> {
        let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
        let revents = self.poll_events(timeout_ms)?;
        trace!(revents, "host input poll");
        Ok(revents & (libc::POLLIN | libc::POLLHUP) != 0)
    }

    fn hung_up(&mut self) -> bool {
        match self.poll_events(0) {
            // Pending bytes are still processed after the writer closes.
            Ok(revents) if revents & (libc::POLLERR | libc::POLLNVAL) != 0 => {
                debug!(revents, "host input errored");
                true
            }
            Ok(revents) if revents & libc::POLLHUP != 0 => match self.available() {
                Ok(0) => {
                    debug!(revents, "host hung up");
                    true
                }
                Ok(_) => false,
                Err(err) => {
                    debug!(%err, "host input unreadable; treating as hang-up");
                    true
                }
            },
            Ok(_) => false,
            Err(err) => {
                debug!(%err, "host input poll failed; treating as hang-up");
                true
            }
        }
    }
}

impl std::fmt::Debug for HostInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostInput").field("fd", &self.fd).finish()
    }
}

#[cfg(test)]
impl HostInput {
    fn from_raw_fd(fd: RawFd) -> Self {
        Self { fd }
    }
}
