//! Encode values at a cursor backed by a growable buffer or an output stream.
//!
//! # Overview
//!
//! A [`Writer`] is generic over its [`Sink`]:
//! - [`BufferSink`] accumulates bytes in memory and supports
//!   [`Writer::backtrack`]/[`Writer::return_to_mark`] for patching earlier
//!   fields.
//! - [`StreamSink`] passes every value straight to an [`io::Write`].
//!
//! Both produce identical bytes for the same sequence of writes.
//!
//! # Example
//!
//! ```
//! use commonware_cursor::Writer;
//!
//! let mut writer = Writer::new();
//! writer.write_u16(7).unwrap();
//! writer.write_str("hi").unwrap();
//! assert_eq!(writer.to_vec().unwrap(), vec![7, 0, 2, 0, b'h', b'i']);
//! ```

mod sink;

pub use sink::{BufferSink, Sink, StreamSink};

use crate::{
    codec::{WireEnum, Write},
    config::{OverflowMode, WriterConfig},
    prefix::Prefix,
    scalar::{int24_parts, uint24_parts, Scalar},
    types::{datetime_to_ticks, timedelta_to_ticks, Decimal},
    Error,
};
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use std::{collections::BTreeMap, io};
use uuid::Uuid;

/// Replacement written for characters outside the ASCII range.
const ASCII_REPLACEMENT: u8 = b'?';

/// Encodes values at a cursor.
#[derive(Debug)]
pub struct Writer<S: Sink = BufferSink> {
    sink: S,
    cfg: WriterConfig,
}

impl Writer<BufferSink> {
    /// Creates a buffer-mode writer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(WriterConfig::default())
    }

    /// Creates a buffer-mode writer.
    pub fn with_config(cfg: WriterConfig) -> Self {
        Self {
            sink: BufferSink::new(cfg.initial_capacity),
            cfg,
        }
    }

    /// Returns the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        self.sink.as_slice()
    }

    /// Discards everything written so far.
    pub fn reset(&mut self) {
        self.sink.reset();
    }

    /// Switches to stream mode, discarding anything buffered.
    pub fn into_stream<W: io::Write>(self, inner: W) -> Writer<StreamSink<W>> {
        Writer::stream_with_config(inner, self.cfg)
    }
}

impl Default for Writer<BufferSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: io::Write> Writer<StreamSink<W>> {
    /// Creates a stream-mode writer with the default configuration.
    pub fn stream(inner: W) -> Self {
        Self::stream_with_config(inner, WriterConfig::default())
    }

    /// Creates a stream-mode writer.
    pub fn stream_with_config(inner: W, cfg: WriterConfig) -> Self {
        Self {
            sink: StreamSink::new(inner, cfg.staging_capacity),
            cfg,
        }
    }

    /// Switches to buffer mode, returning the stream.
    ///
    /// The stream is not flushed.
    pub fn into_buffer(self) -> (Writer<BufferSink>, W) {
        let inner = self.sink.into_inner();
        (Writer::with_config(self.cfg), inner)
    }
}

impl<S: Sink> Writer<S> {
    /// Returns the number of bytes written.
    pub fn position(&self) -> usize {
        self.sink.position()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &WriterConfig {
        &self.cfg
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the sink, consuming the writer.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Copies out everything written so far.
    ///
    /// Fails with [`Error::Unsupported`] in stream mode.
    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        self.sink.to_vec()
    }

    /// Hands out everything written so far and resets the writer.
    ///
    /// Fails with [`Error::Unsupported`] in stream mode.
    pub fn take(&mut self) -> Result<Bytes, Error> {
        self.sink.take()
    }

    /// Flushes the underlying stream. Does nothing in buffer mode.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.sink.flush()
    }

    /// Rewinds the cursor to `position` (clamped to what has been written),
    /// remembering how far the writer had gone. Subsequent writes overwrite
    /// from `position` forward.
    ///
    /// Fails with [`Error::Unsupported`] in stream mode.
    pub fn backtrack(&mut self, position: usize) -> Result<(), Error> {
        self.sink.backtrack(position)
    }

    /// Moves the cursor back to the furthest point reached before the last
    /// [`Writer::backtrack`], or leaves it where it is if it is already past
    /// that point.
    ///
    /// Fails with [`Error::NoMark`] without a prior backtrack, and with
    /// [`Error::Unsupported`] in stream mode.
    pub fn return_to_mark(&mut self) -> Result<(), Error> {
        self.sink.return_to_mark()
    }

    /// Writes any [`Write`] value.
    pub fn write<T: Write + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.write(self)
    }

    /// Writes a fixed-width value through the untyped scalar path.
    #[inline]
    pub fn write_scalar<T: Scalar>(&mut self, value: T) -> Result<(), Error> {
        self.sink.put_scalar(value, self.cfg.host_order)
    }

    /// Writes `bytes` with no length header.
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.sink.put_slice(bytes)
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_u64(&mut self, value: u64) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_u128(&mut self, value: u128) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_i16(&mut self, value: i16) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_i128(&mut self, value: i128) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) -> Result<(), Error> {
        self.write_scalar(value)
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        self.write_scalar(value)
    }

    /// Writes a boolean as a single `0` or `1` byte.
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_u8(value as u8)
    }

    /// Writes a signed 24-bit integer, saturating at `±INT24_MAX`.
    pub fn write_i24(&mut self, value: i32) -> Result<(), Error> {
        let (low, high) = int24_parts(value);
        self.write_u16(low)?;
        self.write_u8(high)
    }

    /// Writes an unsigned 24-bit integer, saturating at `UINT24_MAX`.
    pub fn write_u24(&mut self, value: u32) -> Result<(), Error> {
        let (low, high) = uint24_parts(value);
        self.write_u16(low)?;
        self.write_u8(high)
    }

    /// Writes a character as a single UTF-16 code unit.
    ///
    /// Characters outside the Basic Multilingual Plane need two code units and
    /// are rejected with [`Error::LengthExceeded`].
    pub fn write_char(&mut self, value: char) -> Result<(), Error> {
        let mut units = [0u16; 2];
        match value.encode_utf16(&mut units) {
            [unit] => self.write_u16(*unit),
            units => Err(Error::LengthExceeded(units.len(), 1)),
        }
    }

    /// Writes a decimal as its `lo`, `mid`, `hi` and `flags` words.
    pub fn write_decimal(&mut self, value: Decimal) -> Result<(), Error> {
        let (lo, mid, hi, flags) = value.parts();
        self.write_u32(lo)?;
        self.write_u32(mid)?;
        self.write_u32(hi)?;
        self.write_u32(flags)
    }

    /// Writes a GUID in its mixed-endian 16-byte layout.
    pub fn write_uuid(&mut self, value: &Uuid) -> Result<(), Error> {
        self.write_raw(&value.to_bytes_le())
    }

    /// Writes a timestamp as signed 100ns ticks since 0001-01-01 UTC.
    pub fn write_datetime(&mut self, value: &DateTime<Utc>) -> Result<(), Error> {
        let ticks = datetime_to_ticks(value)?;
        self.write_i64(ticks)
    }

    /// Writes a duration as signed 100ns ticks.
    pub fn write_timedelta(&mut self, value: &TimeDelta) -> Result<(), Error> {
        let ticks = timedelta_to_ticks(value)?;
        self.write_i64(ticks)
    }

    /// Writes an enumeration as its underlying integer.
    pub fn write_enum<E: WireEnum>(&mut self, value: E) -> Result<(), Error> {
        self.write_scalar(value.to_repr())
    }

    /// Writes a presence flag followed by the value, if any.
    pub fn write_nullable<T: Write + ?Sized>(&mut self, value: Option<&T>) -> Result<(), Error> {
        self.write_bool(value.is_some())?;
        match value {
            Some(value) => value.write(self),
            None => Ok(()),
        }
    }

    /// Writes a UTF-8 string with a `u16` byte-length header.
    pub fn write_str(&mut self, value: &str) -> Result<(), Error> {
        self.write_text(value, Prefix::Short)
    }

    /// Writes a UTF-8 string with a `u8` byte-length header.
    pub fn write_tiny_str(&mut self, value: &str) -> Result<(), Error> {
        self.write_text(value, Prefix::Tiny)
    }

    /// Writes a UTF-8 string with a `u32` byte-length header.
    pub fn write_long_str(&mut self, value: &str) -> Result<(), Error> {
        self.write_text(value, Prefix::Long)
    }

    /// Writes an ASCII string with a `u8` length header. Characters outside
    /// the ASCII range become `?`.
    pub fn write_tiny_ascii(&mut self, value: &str) -> Result<(), Error> {
        let ascii: Vec<u8> = value
            .chars()
            .map(|c| if c.is_ascii() { c as u8 } else { ASCII_REPLACEMENT })
            .collect();
        self.write_payload(&ascii, Prefix::Tiny, "ascii string")
    }

    /// Writes an optional string with a `u16` byte-length header.
    pub fn write_nullable_str(&mut self, value: Option<&str>) -> Result<(), Error> {
        self.write_nullable(value)
    }

    /// Writes bytes with a `u16` length header.
    pub fn write_bytes(&mut self, value: &[u8]) -> Result<(), Error> {
        self.write_payload(value, Prefix::Short, "byte array")
    }

    /// Writes bytes with a `u32` length header.
    pub fn write_long_bytes(&mut self, value: &[u8]) -> Result<(), Error> {
        self.write_payload(value, Prefix::Long, "byte array")
    }

    /// Writes elements with a `u16` count header.
    pub fn write_array<T: Write>(&mut self, values: &[T]) -> Result<(), Error> {
        self.write_sequence(values, Prefix::Short)
    }

    /// Writes elements with a `u32` count header.
    pub fn write_long_array<T: Write>(&mut self, values: &[T]) -> Result<(), Error> {
        self.write_sequence(values, Prefix::Long)
    }

    /// Writes a presence flag followed by the array, if any.
    pub fn write_nullable_array<T: Write>(&mut self, values: Option<&[T]>) -> Result<(), Error> {
        self.write_nullable(values)
    }

    /// Writes booleans packed eight to a byte behind a `u16` count header.
    ///
    /// Element `i` is bit `i % 8` of byte `i / 8`.
    pub fn write_bools(&mut self, values: &[bool]) -> Result<(), Error> {
        let len = self.admit(values.len(), Prefix::Short, "bool array")?;
        self.write_prefix(Prefix::Short, len)?;
        let mut packed = vec![0u8; len.div_ceil(8)];
        for (i, _) in values[..len].iter().enumerate().filter(|(_, set)| **set) {
            packed[i / 8] |= 1 << (i % 8);
        }
        self.write_raw(&packed)
    }

    /// Writes entries in key order behind a `u16` count header.
    pub fn write_map<K: Write, V: Write>(&mut self, map: &BTreeMap<K, V>) -> Result<(), Error> {
        let len = self.admit(map.len(), Prefix::Short, "map")?;
        self.write_prefix(Prefix::Short, len)?;
        for (key, value) in map.iter().take(len) {
            key.write(self)?;
            value.write(self)?;
        }
        Ok(())
    }

    /// Applies the overflow policy to a collection of `len` elements, returning
    /// how many of them to write.
    pub(crate) fn admit(
        &self,
        len: usize,
        prefix: Prefix,
        what: &'static str,
    ) -> Result<usize, Error> {
        let max = prefix.max();
        if len <= max {
            return Ok(len);
        }
        match self.cfg.overflow {
            OverflowMode::Throw => Err(Error::LengthExceeded(len, max)),
            OverflowMode::Truncate => {
                self.cfg
                    .logger
                    .log(&format!("{what} of length {len} truncated to {max}"));
                Ok(max)
            }
            OverflowMode::LogAndWriteEmpty => {
                self.cfg.logger.log(&format!(
                    "{what} of length {len} exceeds {max}; writing empty"
                ));
                Ok(0)
            }
        }
    }

    pub(crate) fn write_prefix(&mut self, prefix: Prefix, len: usize) -> Result<(), Error> {
        debug_assert!(len <= prefix.max());
        match prefix {
            Prefix::Tiny => self.write_u8(len as u8),
            Prefix::Short => self.write_u16(len as u16),
            Prefix::Long => self.write_u32(len as u32),
        }
    }

    fn write_payload(
        &mut self,
        bytes: &[u8],
        prefix: Prefix,
        what: &'static str,
    ) -> Result<(), Error> {
        let len = self.admit(bytes.len(), prefix, what)?;
        self.write_prefix(prefix, len)?;
        self.write_raw(&bytes[..len])
    }

    fn write_text(&mut self, text: &str, prefix: Prefix) -> Result<(), Error> {
        // Never split a character when truncating.
        let mut len = self.admit(text.len(), prefix, "string")?;
        while !text.is_char_boundary(len) {
            len -= 1;
        }
        self.write_prefix(prefix, len)?;
        self.write_raw(&text.as_bytes()[..len])
    }

    fn write_sequence<T: Write>(&mut self, values: &[T], prefix: Prefix) -> Result<(), Error> {
        let len = self.admit(values.len(), prefix, "array")?;
        self.write_prefix(prefix, len)?;
        for value in &values[..len] {
            value.write(self)?;
        }
        Ok(())
    }
}
