use std::io::ErrorKind;
use std::time::Duration;

use tracing::debug;
use vgport_transport::PollRead;

use crate::body::FrameBody;
use crate::codec::{decode_length, FrameConfig, LENGTH_PREFIX_SIZE};

/// Reads inbound frames from the host stream one length prefix at a time.
///
/// Unlike a buffering reader, the frame body stays in the stream: after
/// [`FrameReader::read_frame_length`] reports a frame, the dispatcher
/// consumes it through [`FrameReader::body`].
pub struct FrameReader<T> {
    inner: T,
    config: FrameConfig,
    closed: bool,
}

impl<T: PollRead> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            config,
            closed: false,
        }
    }

    /// Wait up to `timeout` for the next length prefix.
    ///
    /// Returns `None` when nothing arrived in time or the stream failed. This
    /// never errors: a quiet host simply means no frame this tick, and a dead
    /// one is picked up by [`FrameReader::caller_down`].
    pub fn read_frame_length(&mut self, timeout: Duration) -> Option<usize> {
        if self.closed {
            return None;
        }

        match self.inner.wait_readable(timeout) {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => {
                debug!(error = %err, "poll on host stream failed");
                return None;
            }
        }

        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let mut filled = 0usize;
        while filled < prefix.len() {
            match self.inner.read(&mut prefix[filled..]) {
                Ok(0) => {
                    debug!(filled, "host stream ended inside a length prefix");
                    self.closed = true;
                    return None;
                }
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => {
                    debug!(error = %err, "failed reading length prefix");
                    self.closed = true;
                    return None;
                }
            }
        }

        Some(decode_length(prefix) as usize)
    }

    /// Borrow the next `len` bytes of the stream as a bounded frame body.
    pub fn body(&mut self, len: usize) -> FrameBody<'_, T> {
        FrameBody::new(&mut self.inner, len)
    }

    /// True once the host has gone away.
    pub fn caller_down(&mut self) -> bool {
        self.closed || self.inner.hung_up()
    }

    /// Mark the stream unusable after a fatal body read.
    pub fn mark_closed(&mut self) {
        self.closed = true;
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
