#![no_main]

use arbitrary::Arbitrary;
use commonware_cursor::{Integer, Reader, Writer};
use libfuzzer_sys::fuzz_target;
use std::{fmt::Debug, io::Cursor};

#[derive(Arbitrary, Debug)]
enum Input {
    U8(Vec<u8>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    /// Mostly zeros, with values sprinkled at the given offsets.
    Sparse { len: u16, hits: Vec<(u16, u32)> },
}

fn roundtrip<T: Integer + Debug>(values: &[T], long: bool) {
    let mut writer = Writer::new();
    if long {
        writer.write_zero_compressed_long(values).unwrap();
    } else {
        writer.write_zero_compressed(values).unwrap();
    }
    let bytes = writer.take().unwrap();

    let mut reader = Reader::new(bytes.clone());
    let decoded = if long {
        reader.read_zero_compressed_long::<T>()
    } else {
        reader.read_zero_compressed::<T>()
    }
    .expect("failed to decode a successfully encoded array");
    assert_eq!(decoded, values);
    assert_eq!(reader.remaining(), Some(0));

    let mut reader = Reader::stream(Cursor::new(bytes.to_vec()));
    let decoded = if long {
        reader.read_zero_compressed_long::<T>()
    } else {
        reader.read_zero_compressed::<T>()
    }
    .expect("failed to decode from a stream");
    assert_eq!(decoded, values);
}

fn fuzz(input: Input) {
    match input {
        Input::U8(values) => {
            roundtrip(&values, false);
            roundtrip(&values, true);
        }
        Input::I16(values) => roundtrip(&values, false),
        Input::U32(values) => roundtrip(&values, true),
        Input::I64(values) => roundtrip(&values, false),
        Input::Sparse { len, hits } => {
            let mut values = vec![0u32; len as usize];
            for (offset, value) in hits {
                if let Some(slot) = values.get_mut(offset as usize) {
                    *slot = value;
                }
            }
            roundtrip(&values, false);
            roundtrip(&values, true);
        }
    }
}

fuzz_target!(|input: Input| {
    fuzz(input);
});
