use std::io::{Cursor, Read, Write};
use std::time::Duration;

use crate::error::Result;

/// An input stream that can be waited on with a deadline.
///
/// The driver never blocks indefinitely on its host: each tick it waits at
/// most one frame interval for the next length prefix, then goes back to
/// rendering and input polling.
pub trait PollRead: Read {
    /// Wait up to `timeout` for input.
    ///
    /// Returns `Ok(true)` when a read would not block (data is pending or the
    /// stream reached end-of-file) and `Ok(false)` when the timeout elapsed.
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool>;

    /// True once the host has hung up and no buffered input remains.
    fn hung_up(&mut self) -> bool;
}

impl<T: AsRef<[u8]>> PollRead for Cursor<T> {
    fn wait_readable(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }

    fn hung_up(&mut self) -> bool {
        self.position() >= self.get_ref().as_ref().len() as u64
    }
}

impl<P: PollRead + ?Sized> PollRead for &mut P {
    fn wait_readable(&mut self, timeout: Duration) -> Result<bool> {
        (**self).wait_readable(timeout)
    }

    fn hung_up(&mut self) -> bool {
        (**self).hung_up()
    }
}

/// The outbound half of the host stream (process stdout).
///
/// Stdout is the protocol channel, so nothing else in the process may write
/// to it. Logging goes to stderr.
pub struct HostOutput {
    inner: std::io::Stdout,
}

impl HostOutput {
    /// Wrap the process stdout.
    pub fn stdout() -> Self {
        Self {
            inner: std::io::stdout(),
        }
    }
}

impl Write for HostOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl std::fmt::Debug for HostOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostOutput").field("fd", &"stdout").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_is_always_ready() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        assert!(cursor.wait_readable(Duration::from_millis(1)).unwrap());
    }

    #[test]
    fn cursor_hangs_up_when_exhausted() {
        let mut cursor = Cursor::new(vec![1u8, 2]);
        assert!(!cursor.hung_up());

        let mut buf = [0u8; 2];
        cursor.read_exact(&mut buf).unwrap();
        assert!(cursor.hung_up());
    }

    #[test]
    fn empty_cursor_is_hung_up() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(cursor.hung_up());
    }

    #[test]
    fn mutable_reference_forwards() {
        let mut cursor = Cursor::new(vec![9u8]);
        let mut by_ref = &mut cursor;
        assert!(!PollRead::hung_up(&mut by_ref));
        assert!(by_ref.wait_readable(Duration::ZERO).unwrap());
    }
}
