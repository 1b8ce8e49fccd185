//! In-memory MAT-file fixture builder shared by the integration tests.
#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use mat5_reader::Endianness;

pub const MI_INT8: u32 = 1;
pub const MI_MATRIX: u32 = 14;
pub const MI_COMPRESSED: u32 = 15;
pub const MI_UTF8: u32 = 16;
pub const MI_UTF16: u32 = 17;
pub const MI_UTF32: u32 = 18;

pub const CLASS_CELL: u8 = 1;
pub const CLASS_STRUCT: u8 = 2;
pub const CLASS_OBJECT: u8 = 3;
pub const CLASS_CHAR: u8 = 4;
pub const CLASS_SPARSE: u8 = 5;
pub const CLASS_DOUBLE: u8 = 6;
pub const CLASS_INT8: u8 = 8;
pub const CLASS_UINT8: u8 = 9;
pub const CLASS_INT32: u8 = 12;
pub const CLASS_FUNCTION: u8 = 16;
pub const CLASS_OPAQUE: u8 = 17;

pub const FLAG_LOGICAL: u8 = 0x02;
pub const FLAG_GLOBAL: u8 = 0x04;
pub const FLAG_COMPLEX: u8 = 0x08;

/// A numeric type that can be written to a fixture.
pub trait Wire: Copy {
    const TYPE_ID: u32;
    fn put(self, order: Endianness, out: &mut Vec<u8>);
}

macro_rules! wire {
    ($ty:ty, $id:expr) => {
        impl Wire for $ty {
            const TYPE_ID: u32 = $id;
            fn put(self, order: Endianness, out: &mut Vec<u8>) {
                match order {
                    Endianness::Little => out.extend_from_slice(&self.to_le_bytes()),
                    Endianness::Big => out.extend_from_slice(&self.to_be_bytes()),
                }
            }
        }
    };
}

wire!(i8, 1);
wire!(u8, 2);
wire!(i16, 3);
wire!(u16, 4);
wire!(i32, 5);
wire!(u32, 6);
wire!(f32, 7);
wire!(f64, 9);
wire!(i64, 12);
wire!(u64, 13);

pub fn u32_bytes(order: Endianness, value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    value.put(order, &mut out);
    out
}

pub fn bytes_of<T: Wire>(order: Endianness, values: &[T]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        v.put(order, &mut out);
    }
    out
}

pub fn pad(out: &mut Vec<u8>) {
    while out.len() % 8 != 0 {
        out.push(0);
    }
}

/// The 128-byte header for a file written in `order`.
pub fn header(order: Endianness) -> Vec<u8> {
    let mut out = vec![b' '; 116];
    let text = b"MATLAB 5.0 MAT-file, Platform: TEST, Created on: Mon Oct 19 12:00:00 2026";
    out[..text.len()].copy_from_slice(text);
    out.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);
    0x0100u16.put(order, &mut out);
    out.extend_from_slice(match order {
        Endianness::Little => b"IM",
        Endianness::Big => b"MI",
    });
    out
}

/// A regular element: 8-byte tag, payload, padding.
pub fn raw_element(order: Endianness, type_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = u32_bytes(order, type_id);
    out.extend(u32_bytes(order, payload.len() as u32));
    out.extend_from_slice(payload);
    pad(&mut out);
    out
}

/// A small data element with the payload packed into the tag.
pub fn small_element(order: Endianness, type_id: u32, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= 4, "small element payload too long");
    let word0 = ((payload.len() as u32) << 16) | type_id;
    let mut out = u32_bytes(order, word0);
    out.extend_from_slice(payload);
    pad(&mut out);
    out
}

pub fn numeric<T: Wire>(order: Endianness, values: &[T]) -> Vec<u8> {
    raw_element(order, T::TYPE_ID, &bytes_of(order, values))
}

pub fn small_numeric<T: Wire>(order: Endianness, values: &[T]) -> Vec<u8> {
    small_element(order, T::TYPE_ID, &bytes_of(order, values))
}

pub fn flags(order: Endianness, class: u8, flag_bits: u8, nzmax: u32) -> Vec<u8> {
    numeric::<u32>(order, &[((flag_bits as u32) << 8) | class as u32, nzmax])
}

pub fn dims(order: Endianness, extents: &[i32]) -> Vec<u8> {
    numeric(order, extents)
}

pub fn name(order: Endianness, text: &str) -> Vec<u8> {
    raw_element(order, MI_INT8, text.as_bytes())
}

pub fn utf16_text(order: Endianness, text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    raw_element(order, MI_UTF16, &bytes_of(order, &units))
}

pub fn utf32_text(order: Endianness, text: &str) -> Vec<u8> {
    let units: Vec<u32> = text.chars().map(|c| c as u32).collect();
    raw_element(order, MI_UTF32, &bytes_of(order, &units))
}

/// A matrix element wrapping the given subelements.
pub fn matrix(order: Endianness, parts: &[Vec<u8>]) -> Vec<u8> {
    raw_element(order, MI_MATRIX, &parts.concat())
}

pub fn double_matrix(order: Endianness, var: &str, extents: &[i32], values: &[f64]) -> Vec<u8> {
    matrix(
        order,
        &[
            flags(order, CLASS_DOUBLE, 0, 0),
            dims(order, extents),
            name(order, var),
            numeric(order, values),
        ],
    )
}

/// A compressed element. Compressed elements carry no trailing padding.
pub fn compressed(order: Endianness, inner: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(inner).expect("zlib write");
    let payload = encoder.finish().expect("zlib finish");
    compressed_raw(order, &payload)
}

pub fn compressed_raw(order: Endianness, payload: &[u8]) -> Vec<u8> {
    let mut out = u32_bytes(order, MI_COMPRESSED);
    out.extend(u32_bytes(order, payload.len() as u32));
    out.extend_from_slice(payload);
    out
}

pub fn document(order: Endianness, elements: &[Vec<u8>]) -> Vec<u8> {
    let mut out = header(order);
    for element in elements {
        out.extend_from_slice(element);
    }
    out
}
