//! Run-length encoding for integer arrays dominated by zeros.
//!
//! # Format
//!
//! A length header (`u16`, or `u32` for the `long` variants) is followed by
//! run records until the declared number of elements has been produced:
//!
//! - A byte `n` in `0..=254` stands for `n + 1` zeros.
//! - The byte [`LITERAL_MARKER`] is followed by a count byte `n` and then
//!   `n + 1` values, each in its plain fixed-width encoding.
//!
//! A zero run never absorbs the final element of the array, and a literal run
//! only ends early once [`LITERAL_BREAK_ZEROS`] zeros in a row lie ahead, so
//! isolated zeros stay inside the surrounding literal.
//!
//! Records that would produce more elements than the header declares are
//! rejected with [`Error::ZeroCompressedFormat`], regardless of the reader's
//! failure policy.
//!
//! # Example
//!
//! ```
//! use commonware_cursor::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.write_zero_compressed(&[0u8, 0, 5]).unwrap();
//! let bytes = writer.take().unwrap();
//! assert_eq!(&bytes[..], &[3, 0, 1, 255, 0, 5]);
//!
//! let mut reader = Reader::new(bytes);
//! assert_eq!(reader.read_zero_compressed::<u8>().unwrap(), vec![0, 0, 5]);
//! ```

use crate::{
    prefix::Prefix,
    reader::{Reader, Source, MAX_PREALLOC},
    scalar::Integer,
    writer::{Sink, Writer},
    Error,
};

/// Record byte announcing a literal run.
pub const LITERAL_MARKER: u8 = 255;

/// Most zeros a single zero-run record can stand for, beyond the first.
pub const MAX_ZERO_RUN: usize = 254;

/// Most values a single literal-run record can carry.
pub const MAX_LITERAL_RUN: usize = 255;

/// Number of consecutive zeros that ends a literal run.
pub const LITERAL_BREAK_ZEROS: usize = 3;

/// Returns the number of zeros after `values[start]` folded into its run.
fn zero_run<T: Integer>(values: &[T], start: usize) -> usize {
    let last = values.len() - 1;
    let mut extra = 0;
    while extra < MAX_ZERO_RUN
        && start + extra + 1 < last
        && values[start + extra + 1].is_zero()
    {
        extra += 1;
    }
    extra
}

/// Returns the number of values, starting at `values[start]`, carried by a
/// literal run.
fn literal_run<T: Integer>(values: &[T], start: usize) -> usize {
    let mut run = 1;
    while run < MAX_LITERAL_RUN && start + run < values.len() {
        let ahead = &values[start + run..];
        if ahead.len() >= LITERAL_BREAK_ZEROS
            && ahead[..LITERAL_BREAK_ZEROS].iter().all(Integer::is_zero)
        {
            break;
        }
        run += 1;
    }
    run
}

impl<S: Sink> Writer<S> {
    /// Writes integers as zero/literal run records behind a `u16` count
    /// header.
    pub fn write_zero_compressed<T: Integer>(&mut self, values: &[T]) -> Result<(), Error> {
        self.write_runs(values, Prefix::Short)
    }

    /// Writes integers as zero/literal run records behind a `u32` count
    /// header.
    pub fn write_zero_compressed_long<T: Integer>(&mut self, values: &[T]) -> Result<(), Error> {
        self.write_runs(values, Prefix::Long)
    }

    fn write_runs<T: Integer>(&mut self, values: &[T], prefix: Prefix) -> Result<(), Error> {
        let len = self.admit(values.len(), prefix, "zero-compressed array")?;
        self.write_prefix(prefix, len)?;
        let values = &values[..len];

        let mut i = 0;
        while i < len {
            if values[i].is_zero() {
                let extra = zero_run(values, i);
                self.write_u8(extra as u8)?;
                i += extra + 1;
                continue;
            }
            let run = literal_run(values, i);
            self.write_u8(LITERAL_MARKER)?;
            self.write_u8((run - 1) as u8)?;
            for value in &values[i..i + run] {
                self.write_scalar(*value)?;
            }
            i += run;
        }
        Ok(())
    }
}

impl<S: Source> Reader<S> {
    /// Reads integers written by [`Writer::write_zero_compressed`].
    pub fn read_zero_compressed<T: Integer>(&mut self) -> Result<Vec<T>, Error> {
        self.read_runs(Prefix::Short)
    }

    /// Reads integers written by [`Writer::write_zero_compressed_long`].
    pub fn read_zero_compressed_long<T: Integer>(&mut self) -> Result<Vec<T>, Error> {
        self.read_runs(Prefix::Long)
    }

    fn read_runs<T: Integer>(&mut self, prefix: Prefix) -> Result<Vec<T>, Error> {
        let mark = self.failure_mark();
        let len = self.read_prefix(prefix)?;

        // Grow with the decoded data rather than trusting the header up front.
        let mut out = Vec::with_capacity(len.min(MAX_PREALLOC));
        while out.len() < len {
            let record = self.read_u8()?;
            if self.failed_since(mark) {
                return Ok(Vec::new());
            }
            if record != LITERAL_MARKER {
                let count = record as usize + 1;
                if out.len() + count > len {
                    return Err(self.zero_compressed_error(format!(
                        "zero run of {count} at element {} exceeds declared length {len}",
                        out.len()
                    )));
                }
                out.resize(out.len() + count, T::default());
                continue;
            }

            let count = self.read_u8()? as usize + 1;
            if self.failed_since(mark) {
                return Ok(Vec::new());
            }
            if out.len() + count > len {
                return Err(self.zero_compressed_error(format!(
                    "literal run of {count} at element {} exceeds declared length {len}",
                    out.len()
                )));
            }
            for _ in 0..count {
                let value = self.read_scalar::<T>()?;
                if self.failed_since(mark) {
                    return Ok(Vec::new());
                }
                out.push(value);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ReaderConfig, log::tests::capture, OverflowMode, WriterConfig};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::io::Cursor;

    fn roundtrip<T: Integer + std::fmt::Debug>(values: &[T]) {
        let mut writer = Writer::new();
        writer.write_zero_compressed(values).unwrap();
        writer.write_zero_compressed_long(values).unwrap();
        let mut reader = Reader::new(writer.take().unwrap());
        assert_eq!(reader.read_zero_compressed::<T>().unwrap(), values);
        assert_eq!(reader.read_zero_compressed_long::<T>().unwrap(), values);
        assert_eq!(reader.remaining(), Some(0));
    }

    #[test]
    fn test_leading_zeros() {
        let mut writer = Writer::new();
        writer.write_zero_compressed(&[0u8, 0, 5]).unwrap();
        assert_eq!(writer.as_slice(), &[3, 0, 1, 255, 0, 5]);
    }

    #[test]
    fn test_sparse_layout() {
        let values: [u32; 19] = [
            1, 0, 0, 30, 16, 255, 2224, 99248240, 0, 0, 0, 0, 0, 0, 0, 21, 0, 4, 52,
        ];
        let mut writer = Writer::new();
        writer.write_zero_compressed(&values).unwrap();
        let bytes = writer.take().unwrap();

        // Header, a literal of eight, a run of seven zeros, a literal of four.
        assert_eq!(&bytes[..4], &[19, 0, LITERAL_MARKER, 7]);
        assert_eq!(bytes[4 + 8 * 4], 6);
        assert_eq!(&bytes[5 + 8 * 4..7 + 8 * 4], &[LITERAL_MARKER, 3]);
        assert_eq!(bytes.len(), 2 + (2 + 8 * 4) + 1 + (2 + 4 * 4));

        let mut reader = Reader::new(bytes);
        assert_eq!(reader.read_zero_compressed::<u32>().unwrap(), values);
        roundtrip(&values);
    }

    #[test]
    fn test_single_value_expands() {
        let mut writer = Writer::new();
        writer.write_zero_compressed(&[7i64]).unwrap();
        assert_eq!(writer.as_slice().len(), 2 + 2 + 8);
    }

    #[test]
    fn test_empty() {
        let mut writer = Writer::new();
        writer.write_zero_compressed::<u16>(&[]).unwrap();
        assert_eq!(writer.as_slice(), &[0, 0]);
        roundtrip::<u16>(&[]);
    }

    #[test]
    fn test_all_zero() {
        roundtrip(&[0u8]);
        roundtrip(&[0i16; 2]);
        roundtrip(&[0u32; 3]);
        roundtrip(&vec![0i64; 1000]);
    }

    #[test]
    fn test_no_zero() {
        roundtrip(&(1..=600).map(|v| v as u16).collect::<Vec<_>>());
        roundtrip(&[-1i8, i8::MIN, i8::MAX]);
    }

    #[test]
    fn test_long_runs() {
        let mut values = vec![0u32; 600];
        values.push(7);
        values.extend(std::iter::repeat(0).take(300));
        values.extend(1..=400);
        roundtrip(&values);

        // A zero run stops short of the final element.
        let mut writer = Writer::new();
        writer.write_zero_compressed(&[0u8; 3]).unwrap();
        assert_eq!(writer.as_slice(), &[3, 0, 1, 0]);
    }

    #[test]
    fn test_isolated_zeros_stay_literal() {
        let mut writer = Writer::new();
        writer.write_zero_compressed(&[4u8, 0, 0, 4, 0, 4]).unwrap();
        assert_eq!(writer.as_slice(), &[6, 0, 255, 5, 4, 0, 0, 4, 0, 4]);
    }

    #[test]
    fn test_randomized() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            let len = rng.gen_range(0..2000);
            let density = rng.gen_range(0.0..1.0);
            let values: Vec<i32> = (0..len)
                .map(|_| if rng.gen_bool(density) { rng.gen() } else { 0 })
                .collect();
            roundtrip(&values);
        }
    }

    #[test]
    fn test_stream_mode() {
        let values: Vec<u64> = (0..500).map(|i| if i % 7 == 0 { i } else { 0 }).collect();
        let mut writer = Writer::stream(Vec::new());
        writer.write_zero_compressed_long(&values).unwrap();
        let (_, bytes) = writer.into_buffer();

        let mut buffered = Writer::new();
        buffered.write_zero_compressed_long(&values).unwrap();
        assert_eq!(buffered.as_slice(), &bytes[..]);

        let mut reader = Reader::stream(Cursor::new(bytes));
        assert_eq!(reader.read_zero_compressed_long::<u64>().unwrap(), values);
    }

    #[test]
    fn test_truncate_policy() {
        let (logger, messages) = capture();
        let mut writer = Writer::with_config(WriterConfig {
            overflow: OverflowMode::Truncate,
            logger,
            ..Default::default()
        });
        let values = vec![1u8; u16::MAX as usize + 10];
        writer.write_zero_compressed(&values).unwrap();
        assert_eq!(messages.lock().unwrap().len(), 1);

        let mut reader = Reader::new(writer.take().unwrap());
        assert_eq!(
            reader.read_zero_compressed::<u8>().unwrap().len(),
            u16::MAX as usize
        );
    }

    #[test]
    fn test_malformed_zero_run() {
        let (logger, messages) = capture();
        let mut reader = Reader::with_config(
            vec![2, 0, 5],
            ReaderConfig {
                throw_on_error: false,
                logger,
                ..Default::default()
            },
        );
        assert!(matches!(
            reader.read_zero_compressed::<u16>(),
            Err(Error::ZeroCompressedFormat(_))
        ));
        assert_eq!(messages.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_literal_run() {
        let mut reader = Reader::new(vec![1, 0, 255, 1, 9, 9]);
        assert!(matches!(
            reader.read_zero_compressed::<u8>(),
            Err(Error::ZeroCompressedFormat(_))
        ));

        // Runs that sum past the header across records.
        let mut reader = Reader::new(vec![3, 0, 1, 255, 1, 9, 9]);
        assert!(matches!(
            reader.read_zero_compressed::<u8>(),
            Err(Error::ZeroCompressedFormat(_))
        ));
    }

    #[test]
    fn test_truncated_input() {
        // Header promises more records than follow.
        let mut reader = Reader::with_config(
            vec![10, 0, 255, 4, 1, 2],
            ReaderConfig {
                throw_on_error: false,
                ..Default::default()
            },
        );
        assert!(reader.read_zero_compressed::<u8>().unwrap().is_empty());
        assert!(reader.has_failed());

        let mut reader = Reader::new(vec![10, 0, 0]);
        assert!(matches!(
            reader.read_zero_compressed::<u8>(),
            Err(Error::BufferOverflow { .. })
        ));
    }
}
