//! Cursor configuration.

use crate::{endian::ByteOrder, log::Logger};
use std::num::NonZeroUsize;

/// Default initial capacity of a writer's growable buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Default capacity of a stream writer's staging buffer.
pub const DEFAULT_STAGING_CAPACITY: usize = 16;

/// Default number of bytes requested from a stream per refill.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(size) => size,
    None => panic!("chunk size must be non-zero"),
};

/// What a writer does when a collection is longer than its length header can
/// express.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum OverflowMode {
    /// Fail with [`crate::Error::LengthExceeded`].
    #[default]
    Throw,
    /// Write as many leading elements as fit and log a warning.
    Truncate,
    /// Log and write an empty collection.
    LogAndWriteEmpty,
}

/// Configuration for a [`crate::Writer`].
#[derive(Clone, Debug)]
pub struct WriterConfig {
    /// Policy applied to oversized collections.
    pub overflow: OverflowMode,

    /// Initial (and post-reset) capacity of the growable buffer.
    pub initial_capacity: usize,

    /// Initial capacity of the staging buffer used in stream mode.
    pub staging_capacity: usize,

    /// Byte order scalars are rendered in before normalization.
    ///
    /// Leave at [`ByteOrder::NATIVE`] unless emulating another host.
    pub host_order: ByteOrder,

    /// Receives overflow-policy diagnostics.
    pub logger: Logger,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            overflow: OverflowMode::default(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            staging_capacity: DEFAULT_STAGING_CAPACITY,
            host_order: ByteOrder::NATIVE,
            logger: Logger::default(),
        }
    }
}

/// Configuration for a [`crate::Reader`].
#[derive(Clone, Debug)]
pub struct ReaderConfig {
    /// Return [`crate::Error::BufferOverflow`] when a read runs past the end
    /// of the input. When false, the reader records the failure and yields
    /// default values instead.
    pub throw_on_error: bool,

    /// Log every overflow through `logger`.
    pub log_on_error: bool,

    /// Bytes requested from a stream per refill.
    pub chunk_size: NonZeroUsize,

    /// Byte order scalars are rebuilt in after normalization.
    ///
    /// Leave at [`ByteOrder::NATIVE`] unless emulating another host.
    pub host_order: ByteOrder,

    /// Receives overflow and format diagnostics.
    pub logger: Logger,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            throw_on_error: true,
            log_on_error: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            host_order: ByteOrder::NATIVE,
            logger: Logger::default(),
        }
    }
}
