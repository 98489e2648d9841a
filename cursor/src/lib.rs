//! Read and write binary data through buffer and stream cursors.
//!
//! # Overview
//!
//! A pair of cursors that encode and decode values with a fixed,
//! little-endian wire layout:
//! - [`Writer`] appends to a growable in-memory buffer, or forwards to any
//!   [`std::io::Write`].
//! - [`Reader`] decodes from an in-memory [`bytes::Bytes`], or pulls from any
//!   [`std::io::Read`] through a staging buffer.
//!
//! Both sides are symmetric: every `write_*` has a `read_*` that consumes
//! exactly the bytes it produced. Sparse integer arrays can additionally be
//! run-length encoded (see [`zero`]).
//!
//! # Supported Types
//!
//! - Primitives: `u8`..`u128`, `i8`..`i128`, `f32`, `f64`, `bool`, and
//!   24-bit integers
//! - `char` as a single UTF-16 code unit
//! - [`Decimal`], [`uuid::Uuid`], [`chrono::DateTime<Utc>`](chrono::DateTime)
//!   and [`chrono::TimeDelta`]
//! - Strings and byte payloads with 8, 16, or 32-bit length headers
//! - Arrays, packed booleans, maps, and optional ("nullable") variants
//! - Enumerations through [`WireEnum`]
//!
//! User-defined types plug into the same machinery by implementing [`Write`]
//! and [`Read`].
//!
//! # Failure Policy
//!
//! Writers decide what happens to collections longer than their length
//! header through [`OverflowMode`]. Readers either fail fast on truncated
//! input or record the failure and continue (see
//! [`ReaderConfig::throw_on_error`]).
//!
//! # Example
//!
//! ```
//! use commonware_cursor::{Error, Read, Reader, Sink, Source, Write, Writer};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: Option<String>,
//! }
//!
//! impl Write for Point {
//!     fn write(&self, writer: &mut Writer<impl Sink>) -> Result<(), Error> {
//!         self.x.write(writer)?;
//!         self.y.write(writer)?;
//!         self.label.write(writer)
//!     }
//! }
//!
//! impl Read for Point {
//!     fn read(reader: &mut Reader<impl Source>) -> Result<Self, Error> {
//!         Ok(Self {
//!             x: i32::read(reader)?,
//!             y: i32::read(reader)?,
//!             label: Option::<String>::read(reader)?,
//!         })
//!     }
//! }
//!
//! let point = Point { x: 3, y: -4, label: Some("origin".into()) };
//!
//! // Buffer mode
//! let mut writer = Writer::new();
//! writer.write(&point).unwrap();
//! let bytes = writer.take().unwrap();
//!
//! // Stream mode produces the same bytes
//! let mut writer = Writer::stream(Vec::new());
//! writer.write(&point).unwrap();
//! let (_, streamed) = writer.into_buffer();
//! assert_eq!(&bytes[..], &streamed[..]);
//!
//! let mut reader = Reader::new(bytes);
//! assert_eq!(reader.read::<Point>().unwrap(), point);
//! ```

pub mod buffer;
pub mod codec;
pub mod config;
pub mod endian;
pub mod error;
pub mod log;
mod prefix;
pub mod reader;
pub mod scalar;
pub mod types;
pub mod writer;
pub mod zero;

// Re-export main types and traits
pub use buffer::Buffer;
pub use codec::{Read, WireEnum, Write};
pub use config::{OverflowMode, ReaderConfig, WriterConfig};
pub use endian::ByteOrder;
pub use error::Error;
pub use log::Logger;
pub use reader::{Reader, SliceSource, Source, StreamSource};
pub use scalar::{Integer, Scalar, INT24_MAX, UINT24_MAX};
pub use types::Decimal;
pub use writer::{BufferSink, Sink, StreamSink, Writer};
