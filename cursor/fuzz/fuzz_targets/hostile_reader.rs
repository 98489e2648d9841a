#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use commonware_cursor::{Error, Reader, ReaderConfig, Source};
use libfuzzer_sys::fuzz_target;
use std::{collections::BTreeMap, io::Cursor};

#[derive(Arbitrary, Debug, Clone, Copy)]
enum Op {
    U8,
    I16,
    U32,
    I64,
    U128,
    F64,
    Bool,
    I24,
    U24,
    Char,
    Decimal,
    Uuid,
    DateTime,
    TimeDelta,
    Str,
    TinyStr,
    LongStr,
    TinyAscii,
    Bytes,
    LongBytes,
    Array,
    LongArray,
    NullableArray,
    Bools,
    Map,
    ZeroCompressed,
    ZeroCompressedLong,
    Skip(u16),
}

#[derive(Arbitrary, Debug)]
struct Input {
    data: Vec<u8>,
    ops: Vec<Op>,
    stream: bool,
    throw_on_error: bool,
}

fn apply(reader: &mut Reader<impl Source>, op: Op) -> Result<(), Error> {
    match op {
        Op::U8 => reader.read_u8().map(drop),
        Op::I16 => reader.read_i16().map(drop),
        Op::U32 => reader.read_u32().map(drop),
        Op::I64 => reader.read_i64().map(drop),
        Op::U128 => reader.read_u128().map(drop),
        Op::F64 => reader.read_f64().map(drop),
        Op::Bool => reader.read_bool().map(drop),
        Op::I24 => reader.read_i24().map(drop),
        Op::U24 => reader.read_u24().map(drop),
        Op::Char => reader.read_char().map(drop),
        Op::Decimal => reader.read_decimal().map(drop),
        Op::Uuid => reader.read_uuid().map(drop),
        Op::DateTime => reader.read_datetime().map(drop),
        Op::TimeDelta => reader.read_timedelta().map(drop),
        Op::Str => reader.read_str().map(drop),
        Op::TinyStr => reader.read_tiny_str().map(drop),
        Op::LongStr => reader.read_long_str().map(drop),
        Op::TinyAscii => reader.read_tiny_ascii().map(drop),
        Op::Bytes => reader.read_bytes().map(drop),
        Op::LongBytes => reader.read_long_bytes().map(drop),
        Op::Array => reader.read_array::<Option<u16>>().map(drop),
        Op::LongArray => reader.read_long_array::<u64>().map(drop),
        Op::NullableArray => reader.read_nullable_array::<String>().map(drop),
        Op::Bools => reader.read_bools().map(drop),
        Op::Map => reader.read::<BTreeMap<u8, Vec<i32>>>().map(drop),
        Op::ZeroCompressed => reader.read_zero_compressed::<i32>().map(drop),
        Op::ZeroCompressedLong => reader.read_zero_compressed_long::<u8>().map(drop),
        Op::Skip(n) => reader.skip(n as usize),
    }
}

fn run(reader: &mut Reader<impl Source>, ops: &[Op], throw_on_error: bool) {
    for &op in ops {
        match apply(reader, op) {
            Ok(()) => {}
            Err(Error::BufferOverflow { .. }) => {
                assert!(throw_on_error, "overflow escaped a non-throwing reader");
                assert!(reader.has_failed());
                return;
            }
            // Structurally invalid input is always reported.
            Err(_) => return,
        }
    }
}

fn fuzz(input: Input) {
    let cfg = ReaderConfig {
        throw_on_error: input.throw_on_error,
        log_on_error: false,
        ..Default::default()
    };
    if input.stream {
        let mut reader = Reader::stream_with_config(Cursor::new(input.data), cfg);
        run(&mut reader, &input.ops, input.throw_on_error);
    } else {
        let mut reader = Reader::with_config(Bytes::from(input.data), cfg);
        run(&mut reader, &input.ops, input.throw_on_error);
        assert!(reader.position() <= reader.source().get_ref().len());
    }
}

fuzz_target!(|input: Input| {
    fuzz(input);
});
