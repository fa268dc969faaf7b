//! Byte-exact layouts of small files, pinned as hex dumps.
//!
//! The dumps assume a little-endian host.
#![cfg(target_endian = "little")]

use insta::assert_snapshot;
use unf_storage::{
    AccessMode, Complex32, FileSession, MemoryStorage, OpenMode, SeekOrigin, SessionConfig, Status,
    Value,
};
use unf_test::hex;

fn session(access: AccessMode, record_length: Option<u64>) -> FileSession<MemoryStorage> {
    FileSession::from_storage(
        MemoryStorage::new(),
        OpenMode::Write,
        access,
        record_length,
        SessionConfig::default(),
    )
    .unwrap()
}

fn dump(file: FileSession<MemoryStorage>) -> String {
    hex(&file.into_storage().unwrap().into_bytes())
}

#[test]
fn test_sequential_short_integers() {
    let mut file = session(AccessMode::Sequential, None);
    file.write(
        "i1,i2,i4,i8",
        &[
            Value::from(101i8),
            Value::from(102i16),
            Value::from(104i32),
            Value::from(108i64),
        ],
    );
    assert_snapshot!(dump(file), @r"
    0000: 0f 00 00 00 65 66 00 68 00 00 00 6c 00 00 00 00
    0010: 00 00 00 0f 00 00 00
    ");
}

#[test]
fn test_sequential_padded_chars_and_array() {
    let mut file = session(AccessMode::Sequential, None);
    file.write("c5", &[Value::from("ab")]);
    file.write("i2[i4]", &[Value::from(&[1i16, 2, 3][..])]);
    assert_snapshot!(dump(file), @r"
    0000: 05 00 00 00 61 62 20 20 20 05 00 00 00 06 00 00
    0010: 00 01 00 02 00 03 00 06 00 00 00
    ");
}

#[test]
fn test_sequential_empty_record() {
    let mut file = session(AccessMode::Sequential, None);
    file.write("", &[]);
    assert_snapshot!(dump(file), @"0000: 00 00 00 00 00 00 00 00");
}

#[test]
fn test_sequential_rewrite_after_backspace() {
    let mut file = session(AccessMode::Sequential, None);
    file.write("i4", &[Value::from(1i32)]);
    file.write("i4", &[Value::from(2i32)]);
    assert_eq!(file.backspace(), Status::Success);
    file.write("i8", &[Value::from(3i64)]);
    assert_snapshot!(dump(file), @r"
    0000: 04 00 00 00 01 00 00 00 04 00 00 00 08 00 00 00
    0010: 03 00 00 00 00 00 00 00 08 00 00 00
    ");
}

#[test]
fn test_sequential_seek_then_rewrite() {
    let mut file = session(AccessMode::Sequential, None);
    file.write("i4", &[Value::from(1i32)]);
    file.write("i4", &[Value::from(2i32)]);
    file.write("i4", &[Value::from(2i32)]);
    assert_eq!(file.seek(SeekOrigin::Begin, 1), Status::Success);
    file.write("i8", &[Value::from(3i64)]);
    assert_snapshot!(dump(file), @r"
    0000: 04 00 00 00 01 00 00 00 04 00 00 00 08 00 00 00
    0010: 03 00 00 00 00 00 00 00 08 00 00 00
    ");
}

#[test]
fn test_direct_slots_out_of_order() {
    let mut file = session(AccessMode::Direct, Some(8));
    file.write_rec(2, "i4", &[Value::from(7i32)]);
    file.write_rec(1, "i2", &[Value::from(-1i16)]);
    assert_snapshot!(dump(file), @"0000: ff ff 00 00 00 00 00 00 07 00 00 00 00 00 00 00");
}

#[test]
fn test_stream_reals() {
    let mut file = session(AccessMode::Stream, None);
    file.write("r4", &[Value::from(1.0f32)]);
    file.write("z4", &[Value::from(Complex32::new(0.5, -2.0))]);
    assert_snapshot!(dump(file), @"0000: 00 00 80 3f 00 00 00 3f 00 00 00 c0");
}
