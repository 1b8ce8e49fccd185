//! Byte-order-aware decoding of primitive and text payloads.
//!
//! Every value is read from the payload slice in the file's byte order;
//! nothing is reinterpreted in place.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8};
use log::trace;

use crate::mat::types::array::NumericData;
use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness};

/// Reads a `$ty` buffer with the byte-order function `$read`.
macro_rules! read_into {
    ($bytes:expr, $order:expr, $ty:ty, $size:expr, $read:ident) => {{
        let mut out: Vec<$ty> = vec![Default::default(); $bytes.len() / $size];
        match $order {
            Endianness::Little => LittleEndian::$read($bytes, &mut out),
            Endianness::Big => BigEndian::$read($bytes, &mut out),
        }
        out
    }};
}

/// Decodes a primitive payload into a typed buffer.
///
/// The payload length must be a whole multiple of the element width.
pub fn decode_numeric(
    data_type: DataType,
    bytes: &[u8],
    order: Endianness,
    offset: u64,
) -> Result<NumericData> {
    let size = data_type.element_size().ok_or(MatError::UnsupportedType {
        type_id: data_type.id(),
        offset,
    })?;
    if bytes.len() % size != 0 {
        return Err(MatError::SizeMismatch {
            context: "primitive payload length",
            offset,
            expected: (bytes.len() / size * size + size) as u64,
            found: bytes.len() as u64,
        });
    }
    trace!(
        "Decoding {} {:?} values ({:?})",
        bytes.len() / size,
        data_type,
        order
    );

    let data = match data_type {
        DataType::Int8 => NumericData::Int8(bytes.iter().map(|&b| b as i8).collect()),
        DataType::UInt8 => NumericData::UInt8(bytes.to_vec()),
        DataType::Int16 => NumericData::Int16(read_into!(bytes, order, i16, 2, read_i16_into)),
        DataType::UInt16 => NumericData::UInt16(read_into!(bytes, order, u16, 2, read_u16_into)),
        DataType::Int32 => NumericData::Int32(read_into!(bytes, order, i32, 4, read_i32_into)),
        DataType::UInt32 => NumericData::UInt32(read_into!(bytes, order, u32, 4, read_u32_into)),
        DataType::Single => NumericData::Single(read_into!(bytes, order, f32, 4, read_f32_into)),
        DataType::Double => NumericData::Double(read_into!(bytes, order, f64, 8, read_f64_into)),
        DataType::Int64 => NumericData::Int64(read_into!(bytes, order, i64, 8, read_i64_into)),
        DataType::UInt64 => NumericData::UInt64(read_into!(bytes, order, u64, 8, read_u64_into)),
        _ => {
            return Err(MatError::UnsupportedType {
                type_id: data_type.id(),
                offset,
            })
        }
    };
    Ok(data)
}

/// Decodes a UTF-8, UTF-16 or UTF-32 payload into one string.
///
/// Malformed sequences are replaced with U+FFFD. UTF-16 and UTF-32 code
/// units are read in the file's byte order.
pub fn decode_text(data_type: DataType, bytes: &[u8], order: Endianness, offset: u64) -> Result<String> {
    let text = match data_type {
        DataType::Utf8 => {
            let (s, _) = UTF_8.decode_without_bom_handling(bytes);
            s.into_owned()
        }
        DataType::Utf16 => {
            let encoding = match order {
                Endianness::Little => UTF_16LE,
                Endianness::Big => UTF_16BE,
            };
            let (s, _) = encoding.decode_without_bom_handling(bytes);
            s.into_owned()
        }
        DataType::Utf32 => bytes
            .chunks(4)
            .map(|unit| {
                if unit.len() < 4 {
                    return char::REPLACEMENT_CHARACTER;
                }
                char::from_u32(order.read_u32(unit)).unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect(),
        _ => {
            return Err(MatError::UnsupportedType {
                type_id: data_type.id(),
                offset,
            })
        }
    };
    trace!("Decoded {:?} text of {} chars", data_type, text.chars().count());
    Ok(text)
}
