//! Inputs a [`super::Reader`] can consume.

use crate::Error;
use bytes::Bytes;
use std::io;
use tracing::trace;

/// An input of encoded bytes.
pub trait Source {
    /// Whether [`Source::rewind`] is supported.
    const SEEKABLE: bool = false;

    /// Returns the number of bytes consumed.
    fn position(&self) -> usize;

    /// Returns the number of bytes available without further I/O.
    fn buffered(&self) -> usize;

    /// Returns the number of bytes left in the input, if known.
    fn remaining(&self) -> Option<usize> {
        None
    }

    /// Returns true if at least `n` more bytes can be consumed, pulling them
    /// from the underlying input if needed.
    fn ensure(&mut self, n: usize) -> Result<bool, Error>;

    /// Consumes `n` bytes previously guaranteed by [`Source::ensure`].
    fn consume(&mut self, n: usize) -> &[u8];

    /// Consumes exactly `n` bytes, or returns `None` if the input ends first.
    fn take_bytes(&mut self, n: usize) -> Result<Option<Bytes>, Error> {
        if !self.ensure(n)? {
            return Ok(None);
        }
        Ok(Some(Bytes::copy_from_slice(self.consume(n))))
    }

    /// Consumes exactly `n` bytes without returning them, or returns false if
    /// the input ends first.
    fn discard(&mut self, n: usize) -> Result<bool, Error> {
        if !self.ensure(n)? {
            return Ok(false);
        }
        self.consume(n);
        Ok(true)
    }

    /// Moves the cursor back to `position`.
    fn rewind(&mut self, _position: usize) -> Result<(), Error> {
        Err(Error::Unsupported("goto_position"))
    }
}

/// Reads from a fixed in-memory region.
#[derive(Clone, Debug, Default)]
pub struct SliceSource {
    data: Bytes,
    index: usize,
}

impl SliceSource {
    /// Creates a source over `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            index: 0,
        }
    }

    /// Returns the full input, including consumed bytes.
    pub fn get_ref(&self) -> &Bytes {
        &self.data
    }
}

impl Source for SliceSource {
    const SEEKABLE: bool = true;

    fn position(&self) -> usize {
        self.index
    }

    fn buffered(&self) -> usize {
        self.data.len() - self.index
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.data.len() - self.index)
    }

    #[inline]
    fn ensure(&mut self, n: usize) -> Result<bool, Error> {
        Ok(n <= self.data.len() - self.index)
    }

    #[inline]
    fn consume(&mut self, n: usize) -> &[u8] {
        let start = self.index;
        self.index += n;
        &self.data[start..self.index]
    }

    fn take_bytes(&mut self, n: usize) -> Result<Option<Bytes>, Error> {
        if n > self.data.len() - self.index {
            return Ok(None);
        }
        let start = self.index;
        self.index += n;
        Ok(Some(self.data.slice(start..self.index)))
    }

    fn rewind(&mut self, position: usize) -> Result<(), Error> {
        debug_assert!(position <= self.index);
        self.index = position;
        Ok(())
    }
}

/// Reads from an [`io::Read`] through a staging buffer refilled in chunks.
#[derive(Debug)]
pub struct StreamSource<R: io::Read> {
    inner: R,
    /// Staging buffer. Its length is its capacity.
    staging: Vec<u8>,
    /// Offset of the first unconsumed byte in `staging`.
    start: usize,
    /// Offset one past the last valid byte in `staging`.
    end: usize,
    /// Bytes consumed before `staging[0]`.
    offset: usize,
    /// Preferred refill size.
    chunk_size: usize,
}

impl<R: io::Read> StreamSource<R> {
    /// Creates a source over `inner`, refilling `chunk_size` bytes at a time.
    pub fn new(inner: R, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            inner,
            staging: vec![0; chunk_size],
            start: 0,
            end: 0,
            offset: 0,
            chunk_size,
        }
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the underlying stream. Staged but unconsumed bytes are lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Buffers `n` bytes without consuming any, growing the staging buffer
    /// one chunk at a time.
    ///
    /// A hostile length header cannot force a large allocation before the
    /// data arrives, and a short stream leaves the position untouched.
    fn stage(&mut self, n: usize) -> Result<bool, Error> {
        let mut want = n.min(self.chunk_size);
        loop {
            if !self.ensure(want)? {
                return Ok(false);
            }
            if want == n {
                return Ok(true);
            }
            want = want.saturating_add(self.chunk_size).min(n);
        }
    }

    /// Moves unconsumed bytes to the front of the staging buffer.
    fn compact(&mut self) {
        if self.start == 0 {
            return;
        }
        self.staging.copy_within(self.start..self.end, 0);
        self.offset += self.start;
        self.end -= self.start;
        self.start = 0;
    }
}

impl<R: io::Read> Source for StreamSource<R> {
    fn position(&self) -> usize {
        self.offset + self.start
    }

    fn buffered(&self) -> usize {
        self.end - self.start
    }

    fn ensure(&mut self, n: usize) -> Result<bool, Error> {
        if self.end - self.start >= n {
            return Ok(true);
        }
        self.compact();
        if n > self.staging.len() {
            trace!(from = self.staging.len(), to = n, "growing staging buffer");
            self.staging.resize(n, 0);
        }
        while self.end < n {
            match self.inner.read(&mut self.staging[self.end..]) {
                Ok(0) => return Ok(false),
                Ok(read) => {
                    trace!(read, "refilled staging buffer");
                    self.end += read;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(true)
    }

    fn consume(&mut self, n: usize) -> &[u8] {
        debug_assert!(n <= self.end - self.start);
        let start = self.start;
        self.start += n;
        &self.staging[start..self.start]
    }

    fn take_bytes(&mut self, n: usize) -> Result<Option<Bytes>, Error> {
        if !self.stage(n)? {
            return Ok(None);
        }
        Ok(Some(Bytes::copy_from_slice(self.consume(n))))
    }

    fn discard(&mut self, n: usize) -> Result<bool, Error> {
        if !self.stage(n)? {
            return Ok(false);
        }
        self.consume(n);
        Ok(true)
    }
}
