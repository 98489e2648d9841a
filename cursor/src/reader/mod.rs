//! Decode values at a cursor over a fixed buffer or an input stream.
//!
//! # Overview
//!
//! A [`Reader`] is generic over its [`Source`]:
//! - [`SliceSource`] reads from an in-memory [`Bytes`] and supports
//!   [`Reader::goto_position`].
//! - [`StreamSource`] pulls chunks from an [`io::Read`] into a staging buffer.
//!
//! # Failure policy
//!
//! Running out of input is an overflow. With
//! [`ReaderConfig::throw_on_error`] set (the default), an overflow returns
//! [`Error::BufferOverflow`]. Otherwise the read returns the default value of
//! its type (an empty collection for strings and arrays, never a partial one)
//! and the reader remembers the failure in [`Reader::has_failed`] until it is
//! reloaded. This lets callers decode a batch of values and check once at the
//! end.
//!
//! # Example
//!
//! ```
//! use commonware_cursor::{Reader, ReaderConfig};
//!
//! let mut reader = Reader::with_config(
//!     vec![7, 0],
//!     ReaderConfig {
//!         throw_on_error: false,
//!         ..Default::default()
//!     },
//! );
//! assert_eq!(reader.read_u16().unwrap(), 7);
//! assert_eq!(reader.read_u32().unwrap(), 0);
//! assert!(reader.has_failed());
//! ```

mod source;

pub use source::{SliceSource, Source, StreamSource};

use crate::{
    codec::{Read, WireEnum},
    config::ReaderConfig,
    endian::normalize,
    prefix::Prefix,
    scalar::{int24_from_parts, uint24_from_parts, Scalar},
    types::{datetime_from_ticks, timedelta_from_ticks, Decimal},
    Error,
};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use std::{collections::BTreeMap, io};
use uuid::Uuid;

/// Upper bound on elements reserved ahead of decoding a collection.
///
/// Length headers come from untrusted input, so larger collections grow as
/// their elements are actually decoded.
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Widest scalar that can be normalized on the stack.
const MAX_SCALAR_WIDTH: usize = 16;

/// Encoded size of a 24-bit integer.
const INT24_WIDTH: usize = 3;

/// Encoded size of a [`Decimal`].
const DECIMAL_WIDTH: usize = 16;

/// Decodes values at a cursor.
#[derive(Debug)]
pub struct Reader<S: Source = SliceSource> {
    source: S,
    cfg: ReaderConfig,
    failures: usize,
}

impl Reader<SliceSource> {
    /// Creates a buffer-mode reader with the default configuration.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_config(data, ReaderConfig::default())
    }

    /// Creates a buffer-mode reader.
    pub fn with_config(data: impl Into<Bytes>, cfg: ReaderConfig) -> Self {
        Self {
            source: SliceSource::new(data),
            cfg,
            failures: 0,
        }
    }

    /// Replaces the input, rewinding and clearing any recorded failure.
    pub fn load(&mut self, data: impl Into<Bytes>) {
        self.reload(SliceSource::new(data));
    }

    /// Switches to stream mode, dropping the current input.
    pub fn into_stream<R: io::Read>(self, inner: R) -> Reader<StreamSource<R>> {
        Reader::stream_with_config(inner, self.cfg)
    }
}

impl<R: io::Read> Reader<StreamSource<R>> {
    /// Creates a stream-mode reader with the default configuration.
    pub fn stream(inner: R) -> Self {
        Self::stream_with_config(inner, ReaderConfig::default())
    }

    /// Creates a stream-mode reader.
    pub fn stream_with_config(inner: R, cfg: ReaderConfig) -> Self {
        Self {
            source: StreamSource::new(inner, cfg.chunk_size.get()),
            cfg,
            failures: 0,
        }
    }

    /// Replaces the input stream, clearing any recorded failure.
    pub fn load_stream(&mut self, inner: R) {
        let source = StreamSource::new(inner, self.cfg.chunk_size.get());
        self.reload(source);
    }
}

impl<S: Source> Reader<S> {
    /// Replaces the source, clearing any recorded failure.
    pub fn reload(&mut self, source: S) {
        self.source = source;
        self.failures = 0;
    }

    /// Returns true if any read has overflowed since the input was loaded.
    pub fn has_failed(&self) -> bool {
        self.failures > 0
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.cfg
    }

    /// Returns a mutable reference to the configuration.
    ///
    /// Failure policy changes apply to subsequent reads.
    pub fn config_mut(&mut self) -> &mut ReaderConfig {
        &mut self.cfg
    }

    /// Returns the source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the source, consuming the reader.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Returns the number of bytes consumed.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Returns the number of unread bytes, if the input has a known length.
    pub fn remaining(&self) -> Option<usize> {
        self.source.remaining()
    }

    /// Returns true if at least `n` more bytes can be read, refilling from
    /// the stream if needed.
    pub fn ensure_more_length(&mut self, n: usize) -> Result<bool, Error> {
        self.source.ensure(n)
    }

    /// Records an overflow of `requested` bytes and applies the failure policy.
    fn overflow(&mut self, requested: usize) -> Result<(), Error> {
        self.failures += 1;
        let remaining = self.source.buffered();
        if self.cfg.log_on_error {
            self.cfg.logger.log(&format!(
                "buffer overflow at {}: requested {requested} bytes, {remaining} remaining",
                self.source.position()
            ));
        }
        if self.cfg.throw_on_error {
            return Err(Error::BufferOverflow {
                requested,
                remaining,
            });
        }
        Ok(())
    }

    /// Snapshot of the failure count, for use with [`Reader::failed_since`].
    #[inline]
    pub(crate) fn failure_mark(&self) -> usize {
        self.failures
    }

    /// Returns true if an overflow was recorded after `mark` was taken.
    #[inline]
    pub(crate) fn failed_since(&self, mark: usize) -> bool {
        self.failures != mark
    }

    /// Logs a malformed run-length record and returns it as an error.
    ///
    /// Always logged, regardless of `log_on_error`.
    pub(crate) fn zero_compressed_error(&self, message: String) -> Error {
        self.cfg.logger.log(&message);
        Error::ZeroCompressedFormat(message)
    }

    /// Advances past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        if !self.source.discard(n)? {
            self.overflow(n)?;
        }
        Ok(())
    }

    /// Moves the cursor to `position`.
    ///
    /// Fails with [`Error::Unsupported`] in stream mode.
    pub fn goto_position(&mut self, position: usize) -> Result<(), Error> {
        if !S::SEEKABLE {
            return Err(Error::Unsupported("goto_position"));
        }
        let current = self.source.position();
        if position >= current {
            self.skip(position - current)
        } else {
            self.source.rewind(position)
        }
    }

    /// Reads any [`Read`] value.
    pub fn read<T: Read>(&mut self) -> Result<T, Error> {
        T::read(self)
    }

    /// Reads a fixed-width value through the untyped scalar path.
    pub fn read_scalar<T: Scalar>(&mut self) -> Result<T, Error> {
        if !self.source.ensure(T::WIDTH)? {
            self.overflow(T::WIDTH)?;
            return Ok(T::default());
        }
        let host = self.cfg.host_order;
        let bytes = self.source.consume(T::WIDTH);
        if !host.needs_swap() {
            return Ok(T::from_native(bytes));
        }
        let mut raw = [0u8; MAX_SCALAR_WIDTH];
        let raw = &mut raw[..T::WIDTH];
        raw.copy_from_slice(bytes);
        normalize(raw, host);
        Ok(T::from_native(raw))
    }

    /// Reads `n` bytes with no length header.
    ///
    /// Returns an empty buffer if the input ends first and the reader does
    /// not throw.
    pub fn read_raw(&mut self, n: usize) -> Result<Bytes, Error> {
        match self.source.take_bytes(n)? {
            Some(bytes) => Ok(bytes),
            None => {
                self.overflow(n)?;
                Ok(Bytes::new())
            }
        }
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_u128(&mut self) -> Result<u128, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_i128(&mut self) -> Result<i128, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_scalar()
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_scalar()
    }

    /// Reads a boolean. Any non-zero byte is `true`.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_u8()? != 0)
    }

    /// Returns true if `width` bytes are available for a value made of several
    /// scalars, applying the failure policy otherwise.
    ///
    /// Nothing is consumed when this returns false.
    fn ensure_whole(&mut self, width: usize) -> Result<bool, Error> {
        if self.source.ensure(width)? {
            return Ok(true);
        }
        self.overflow(width)?;
        Ok(false)
    }

    /// Reads a signed 24-bit integer.
    pub fn read_i24(&mut self) -> Result<i32, Error> {
        if !self.ensure_whole(INT24_WIDTH)? {
            return Ok(0);
        }
        let low = self.read_u16()?;
        let high = self.read_u8()?;
        Ok(int24_from_parts(low, high))
    }

    /// Reads an unsigned 24-bit integer.
    pub fn read_u24(&mut self) -> Result<u32, Error> {
        if !self.ensure_whole(INT24_WIDTH)? {
            return Ok(0);
        }
        let low = self.read_u16()?;
        let high = self.read_u8()?;
        Ok(uint24_from_parts(low, high))
    }

    /// Reads a single UTF-16 code unit. Unpaired surrogates decode as
    /// [`char::REPLACEMENT_CHARACTER`].
    pub fn read_char(&mut self) -> Result<char, Error> {
        let unit = self.read_u16()?;
        Ok(char::decode_utf16([unit])
            .next()
            .and_then(Result::ok)
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Reads a decimal from its `lo`, `mid`, `hi` and `flags` words.
    pub fn read_decimal(&mut self) -> Result<Decimal, Error> {
        if !self.ensure_whole(DECIMAL_WIDTH)? {
            return Ok(Decimal::default());
        }
        let lo = self.read_u32()?;
        let mid = self.read_u32()?;
        let hi = self.read_u32()?;
        let flags = self.read_u32()?;
        Decimal::from_parts(lo, mid, hi, flags)
    }

    /// Reads a GUID in its mixed-endian 16-byte layout.
    pub fn read_uuid(&mut self) -> Result<Uuid, Error> {
        let raw = self.read::<[u8; 16]>()?;
        Ok(Uuid::from_bytes_le(raw))
    }

    /// Reads a timestamp. An overflow yields the Unix epoch.
    pub fn read_datetime(&mut self) -> Result<DateTime<Utc>, Error> {
        let mark = self.failure_mark();
        let ticks = self.read_i64()?;
        if self.failed_since(mark) {
            return Ok(DateTime::<Utc>::default());
        }
        datetime_from_ticks(ticks)
    }

    /// Reads a duration. An overflow yields zero.
    pub fn read_timedelta(&mut self) -> Result<TimeDelta, Error> {
        let ticks = self.read_i64()?;
        Ok(timedelta_from_ticks(ticks))
    }

    /// Reads an enumeration from its underlying integer.
    ///
    /// Fails with [`Error::InvalidEnum`] if the integer names no variant. An
    /// overflow yields the variant for zero, if there is one.
    pub fn read_enum<E: WireEnum>(&mut self) -> Result<E, Error> {
        let repr = self.read_scalar::<E::Repr>()?;
        E::from_repr(repr)
            .ok_or_else(|| Error::InvalidEnum(std::any::type_name::<E>(), repr.into()))
    }

    /// Reads a presence flag followed by the value, if present.
    pub fn read_nullable<T: Read>(&mut self) -> Result<Option<T>, Error> {
        if !self.read_bool()? {
            return Ok(None);
        }
        T::read(self).map(Some)
    }

    /// Reads a UTF-8 string with a `u16` byte-length header.
    pub fn read_str(&mut self) -> Result<String, Error> {
        self.read_text(Prefix::Short)
    }

    /// Reads a UTF-8 string with a `u8` byte-length header.
    pub fn read_tiny_str(&mut self) -> Result<String, Error> {
        self.read_text(Prefix::Tiny)
    }

    /// Reads a UTF-8 string with a `u32` byte-length header.
    pub fn read_long_str(&mut self) -> Result<String, Error> {
        self.read_text(Prefix::Long)
    }

    /// Reads an ASCII string with a `u8` length header. Bytes outside the
    /// ASCII range decode as `?`.
    pub fn read_tiny_ascii(&mut self) -> Result<String, Error> {
        let bytes = self.read_payload(Prefix::Tiny)?;
        Ok(bytes
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect())
    }

    /// Reads an optional string with a `u16` byte-length header.
    pub fn read_nullable_str(&mut self) -> Result<Option<String>, Error> {
        self.read_nullable()
    }

    /// Reads bytes with a `u16` length header.
    pub fn read_bytes(&mut self) -> Result<Bytes, Error> {
        self.read_payload(Prefix::Short)
    }

    /// Reads bytes with a `u32` length header.
    pub fn read_long_bytes(&mut self) -> Result<Bytes, Error> {
        self.read_payload(Prefix::Long)
    }

    /// Reads elements with a `u16` count header.
    pub fn read_array<T: Read>(&mut self) -> Result<Vec<T>, Error> {
        self.read_sequence(Prefix::Short)
    }

    /// Reads elements with a `u32` count header.
    pub fn read_long_array<T: Read>(&mut self) -> Result<Vec<T>, Error> {
        self.read_sequence(Prefix::Long)
    }

    /// Reads a presence flag followed by the array, if present.
    pub fn read_nullable_array<T: Read>(&mut self) -> Result<Option<Vec<T>>, Error> {
        self.read_nullable()
    }

    /// Reads booleans packed eight to a byte behind a `u16` count header.
    pub fn read_bools(&mut self) -> Result<Vec<bool>, Error> {
        let len = self.read_prefix(Prefix::Short)?;
        let packed = self.read_raw(len.div_ceil(8))?;
        if packed.len() * 8 < len {
            return Ok(Vec::new());
        }
        Ok((0..len).map(|i| packed[i / 8] & (1 << (i % 8)) != 0).collect())
    }

    /// Reads entries behind a `u16` count header.
    pub fn read_map<K: Read + Ord, V: Read>(&mut self) -> Result<BTreeMap<K, V>, Error> {
        let mark = self.failure_mark();
        let len = self.read_prefix(Prefix::Short)?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = K::read(self)?;
            let value = V::read(self)?;
            if self.failed_since(mark) {
                return Ok(BTreeMap::new());
            }
            map.insert(key, value);
        }
        Ok(map)
    }

    pub(crate) fn read_prefix(&mut self, prefix: Prefix) -> Result<usize, Error> {
        Ok(match prefix {
            Prefix::Tiny => self.read_u8()? as usize,
            Prefix::Short => self.read_u16()? as usize,
            Prefix::Long => self.read_u32()? as usize,
        })
    }

    fn read_payload(&mut self, prefix: Prefix) -> Result<Bytes, Error> {
        let len = self.read_prefix(prefix)?;
        self.read_raw(len)
    }

    fn read_text(&mut self, prefix: Prefix) -> Result<String, Error> {
        let bytes = self.read_payload(prefix)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_sequence<T: Read>(&mut self, prefix: Prefix) -> Result<Vec<T>, Error> {
        let mark = self.failure_mark();
        let len = self.read_prefix(prefix)?;
        let mut values = Vec::with_capacity(len.min(MAX_PREALLOC));
        for _ in 0..len {
            let value = T::read(self)?;
            if self.failed_since(mark) {
                return Ok(Vec::new());
            }
            values.push(value);
        }
        Ok(values)
    }
}
