use std::io::{ErrorKind, Read};

use crate::error::{FrameError, Result};

/// The unread remainder of one inbound frame.
///
/// Every read a handler performs goes through [`FrameBody::read_bounded`],
/// which never consumes past the frame boundary. Whatever a handler leaves
/// behind is removed with [`FrameBody::drain`], so the stream stays framed
/// even when a handler bails out early.
pub struct FrameBody<'a, R: Read + ?Sized> {
    inner: &'a mut R,
    remaining: usize,
}

impl<'a, R: Read + ?Sized> FrameBody<'a, R> {
    pub fn new(inner: &'a mut R, len: usize) -> Self {
        Self {
            inner,
            remaining: len,
        }
    }

    /// Bytes of this frame not yet consumed.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Fill `dest` from the frame.
    ///
    /// Returns `Ok(false)` when `dest` is longer than what is left. In that
    /// case the remaining bytes are still consumed into the front of `dest`
    /// and the counter is clamped to zero, so every later read also fails.
    /// Stream errors are returned as `Err` and are fatal to the caller.
    pub fn read_bounded(&mut self, dest: &mut [u8]) -> Result<bool> {
        if dest.len() > self.remaining {
            let available = self.remaining;
            self.remaining = 0;
            read_exact(self.inner, &mut dest[..available])?;
            return Ok(false);
        }

        self.remaining -= dest.len();
        read_exact(self.inner, dest)?;
        Ok(true)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<Option<[u8; N]>> {
        let mut buf = [0u8; N];
        Ok(self.read_bounded(&mut buf)?.then_some(buf))
    }

    pub fn read_u32(&mut self) -> Result<Option<u32>> {
        Ok(self.read_array::<4>()?.map(u32::from_be_bytes))
    }

    pub fn read_i32(&mut self) -> Result<Option<i32>> {
        Ok(self.read_array::<4>()?.map(i32::from_be_bytes))
    }

    /// Read `len` bytes into a fresh buffer.
    ///
    /// The buffer is reserved with `try_reserve_exact` before anything is
    /// consumed, so an absurd wire length yields
    /// [`FrameError::AllocationFailed`] and leaves the frame untouched for
    /// [`FrameBody::drain`]. A length longer than the frame never allocates
    /// more than the frame holds.
    pub fn read_vec(&mut self, len: usize) -> Result<Option<Vec<u8>>> {
        let capacity = len.min(self.remaining);
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)
            .map_err(|_| FrameError::AllocationFailed { size: capacity })?;
        buf.resize(capacity, 0);

        if len > capacity {
            self.read_bounded(&mut buf)?;
            self.remaining = 0;
            return Ok(None);
        }

        Ok(self.read_bounded(&mut buf)?.then_some(buf))
    }

    /// Read everything left in the frame.
    pub fn read_rest(&mut self) -> Result<Option<Vec<u8>>> {
        self.read_vec(self.remaining)
    }

    /// Consume and discard the unread remainder. Returns how many bytes were
    /// dropped.
    pub fn drain(&mut self) -> Result<usize> {
        let pending = self.remaining;
        let mut scratch = [0u8; 4096];
        while self.remaining > 0 {
            let step = self.remaining.min(scratch.len());
            read_exact(self.inner, &mut scratch[..step])?;
            self.remaining -= step;
        }
        Ok(pending)
    }
}

fn read_exact<R: Read + ?Sized>(inner: &mut R, dest: &mut [u8]) -> Result<()> {
    let mut filled = 0usize;
    while filled < dest.len() {
        match inner.read(&mut dest[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_within_frame_decrement_remaining() {
        let mut src = Cursor::new(vec![1, 2, 3, 4, 5, 6]);
        let mut body = FrameBody::new(&mut src, 6);

        let mut dest = [0u8; 4];
        assert!(body.read_bounded(&mut dest).unwrap());
        assert_eq!(dest, [1, 2, 3, 4]);
        assert_eq!(body.remaining(), 2);
    }

    #[test]
    fn overread_consumes_what_is_left_and_clamps() {
        let mut src = Cursor::new(vec![9, 8, 7, 0xAA]);
        let mut body = FrameBody::new(&mut src, 3);

        let mut dest = [0u8; 5];
        assert!(!body.read_bounded(&mut dest).unwrap());
        assert_eq!(&dest[..3], &[9, 8, 7]);
        assert_eq!(body.remaining(), 0);

        let mut more = [0u8; 1];
        assert!(!body.read_bounded(&mut more).unwrap());
        assert_eq!(src.position(), 3);
    }

    #[test]
    fn empty_read_always_succeeds() {
        let mut src = Cursor::new(Vec::new());
        let mut body = FrameBody::new(&mut src, 0);
        assert!(body.read_bounded(&mut []).unwrap());
    }

    #[test]
    fn integers_are_big_endian() {
        let mut src = Cursor::new(vec![0, 0, 1, 0, 0xFF, 0xFF, 0xFF, 0xFE]);
        let mut body = FrameBody::new(&mut src, 8);
        assert_eq!(body.read_u32().unwrap(), Some(256));
        assert_eq!(body.read_i32().unwrap(), Some(-2));
        assert_eq!(body.read_u32().unwrap(), None);
    }

    #[test]
    fn read_vec_past_frame_consumes_frame() {
        let mut src = Cursor::new(vec![1, 2, 3, 0x55]);
        let mut body = FrameBody::new(&mut src, 3);
        assert_eq!(body.read_vec(usize::MAX).unwrap(), None);
        assert_eq!(body.remaining(), 0);
        assert_eq!(src.position(), 3);
    }

    #[test]
    fn read_rest_takes_everything() {
        let mut src = Cursor::new(b"abcdef".to_vec());
        let mut body = FrameBody::new(&mut src, 6);
        body.read_array::<2>().unwrap();
        assert_eq!(body.read_rest().unwrap().as_deref(), Some(&b"cdef"[..]));
        assert!(body.is_exhausted());
    }

    #[test]
    fn drain_leaves_next_frame_intact() {
        let mut data = vec![0xEE; 10_000];
        data.extend_from_slice(b"next");
        let mut src = Cursor::new(data);

        let mut body = FrameBody::new(&mut src, 10_000);
        body.read_array::<16>().unwrap();
        assert_eq!(body.drain().unwrap(), 10_000 - 16);
        assert_eq!(body.remaining(), 0);

        let mut next = [0u8; 4];
        src.read_exact(&mut next).unwrap();
        assert_eq!(&next, b"next");
    }

    #[test]
    fn short_stream_is_connection_closed() {
        let mut src = Cursor::new(vec![1, 2]);
        let mut body = FrameBody::new(&mut src, 8);
        let err = body.read_array::<4>().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert!(err.is_fatal());
    }
}
