//! Core data structures for MAT-file format components.
//!
//! This module defines the descriptors the decoder works with:
//! - The file header and its byte-order context
//! - Element tags and the data-type registry
//! - Matrix classes and array flags
//! - Reader configuration

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order of the multi-byte values stored in a MAT-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// The byte order of the platform running this code.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    /// The opposite byte order.
    pub fn swapped(self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }

    pub fn read_u16(self, buf: &[u8]) -> u16 {
        match self {
            Endianness::Little => LittleEndian::read_u16(buf),
            Endianness::Big => BigEndian::read_u16(buf),
        }
    }

    pub fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Little => LittleEndian::read_u32(buf),
            Endianness::Big => BigEndian::read_u32(buf),
        }
    }
}

/// MAT-file format version. Only Level 5 (header version `0x0100`) exists here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatVersion {
    Level5,
}

/// Parsed 128-byte MAT-file header.
///
/// Created once per document and shared read-only by every decode call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatHeader {
    /// Descriptive text (116 ASCII characters, not trimmed).
    pub text: String,
    /// Subsystem data offset, read in host order without byte-order correction.
    pub subsystem_offset: u64,
    /// The raw 8 bytes of the subsystem data offset field.
    pub subsystem_offset_bytes: [u8; 8],
    pub version: MatVersion,
    /// Byte order declared by the endian indicator.
    pub byte_order: Endianness,
}

impl MatHeader {
    /// Whether the file's byte order matches the host's.
    pub fn is_same_endian(&self) -> bool {
        self.byte_order == Endianness::native()
    }

    /// The descriptive text with trailing NULs and spaces removed.
    pub fn description(&self) -> &str {
        self.text.trim_end_matches(['\0', ' '])
    }
}

/// Broad category of an element data type, used for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Primitive,
    Matrix,
    Compressed,
    Text,
    Invalid,
}

/// Element data types known to the type registry.
///
/// Ids with no registry entry resolve to `Invalid`, which only fails once a
/// caller actually tries to decode the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Single,
    Double,
    Int64,
    UInt64,
    Matrix,
    Compressed,
    Utf8,
    Utf16,
    Utf32,
    Invalid(u32),
}

impl From<u32> for DataType {
    fn from(id: u32) -> Self {
        match id {
            1 => DataType::Int8,
            2 => DataType::UInt8,
            3 => DataType::Int16,
            4 => DataType::UInt16,
            5 => DataType::Int32,
            6 => DataType::UInt32,
            7 => DataType::Single,
            9 => DataType::Double,
            12 => DataType::Int64,
            13 => DataType::UInt64,
            14 => DataType::Matrix,
            15 => DataType::Compressed,
            16 => DataType::Utf8,
            17 => DataType::Utf16,
            18 => DataType::Utf32,
            other => DataType::Invalid(other),
        }
    }
}

impl DataType {
    /// The numeric id used on the wire.
    pub fn id(&self) -> u32 {
        match self {
            DataType::Int8 => 1,
            DataType::UInt8 => 2,
            DataType::Int16 => 3,
            DataType::UInt16 => 4,
            DataType::Int32 => 5,
            DataType::UInt32 => 6,
            DataType::Single => 7,
            DataType::Double => 9,
            DataType::Int64 => 12,
            DataType::UInt64 => 13,
            DataType::Matrix => 14,
            DataType::Compressed => 15,
            DataType::Utf8 => 16,
            DataType::Utf16 => 17,
            DataType::Utf32 => 18,
            DataType::Invalid(id) => *id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            DataType::Matrix => ElementKind::Matrix,
            DataType::Compressed => ElementKind::Compressed,
            DataType::Utf8 | DataType::Utf16 | DataType::Utf32 => ElementKind::Text,
            DataType::Invalid(_) => ElementKind::Invalid,
            _ => ElementKind::Primitive,
        }
    }

    /// Width in bytes of one element, for primitive numeric types only.
    pub fn element_size(&self) -> Option<usize> {
        match self {
            DataType::Int8 | DataType::UInt8 => Some(1),
            DataType::Int16 | DataType::UInt16 => Some(2),
            DataType::Int32 | DataType::UInt32 | DataType::Single => Some(4),
            DataType::Double | DataType::Int64 | DataType::UInt64 => Some(8),
            _ => None,
        }
    }
}

/// An 8-byte element descriptor.
///
/// Consumed by exactly one decoder call. `embedded` is set only for the
/// small-data-element form, in which case `length <= 4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub data_type: DataType,
    /// Payload length in bytes, without padding.
    pub length: u32,
    /// The 4 inline bytes of a small data element, exactly as stored.
    pub embedded: Option<[u8; 4]>,
    /// Offset of the tag itself.
    pub offset: u64,
}

impl Tag {
    pub fn is_embedded(&self) -> bool {
        self.embedded.is_some()
    }

    /// The inline payload of a small data element.
    pub fn embedded_payload(&self) -> Option<&[u8]> {
        self.embedded
            .as_ref()
            .map(|bytes| &bytes[..self.length as usize])
    }
}

/// Matrix class codes (the low byte of the first array-flags word).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixClass {
    Cell,
    Struct,
    Object,
    Char,
    Sparse,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    FunctionHandle,
    /// Class 17: a type-system name, a class name and one nested array.
    Opaque,
    LittleEndianPacked,
}

impl MatrixClass {
    /// Resolves a class code; codes outside `1..=18` are not valid.
    pub fn from_code(code: u8) -> Option<Self> {
        let class = match code {
            1 => MatrixClass::Cell,
            2 => MatrixClass::Struct,
            3 => MatrixClass::Object,
            4 => MatrixClass::Char,
            5 => MatrixClass::Sparse,
            6 => MatrixClass::Double,
            7 => MatrixClass::Single,
            8 => MatrixClass::Int8,
            9 => MatrixClass::UInt8,
            10 => MatrixClass::Int16,
            11 => MatrixClass::UInt16,
            12 => MatrixClass::Int32,
            13 => MatrixClass::UInt32,
            14 => MatrixClass::Int64,
            15 => MatrixClass::UInt64,
            16 => MatrixClass::FunctionHandle,
            17 => MatrixClass::Opaque,
            18 => MatrixClass::LittleEndianPacked,
            _ => return None,
        };
        Some(class)
    }

    pub fn code(&self) -> u8 {
        match self {
            MatrixClass::Cell => 1,
            MatrixClass::Struct => 2,
            MatrixClass::Object => 3,
            MatrixClass::Char => 4,
            MatrixClass::Sparse => 5,
            MatrixClass::Double => 6,
            MatrixClass::Single => 7,
            MatrixClass::Int8 => 8,
            MatrixClass::UInt8 => 9,
            MatrixClass::Int16 => 10,
            MatrixClass::UInt16 => 11,
            MatrixClass::Int32 => 12,
            MatrixClass::UInt32 => 13,
            MatrixClass::Int64 => 14,
            MatrixClass::UInt64 => 15,
            MatrixClass::FunctionHandle => 16,
            MatrixClass::Opaque => 17,
            MatrixClass::LittleEndianPacked => 18,
        }
    }
}

/// Array flags subelement of a matrix.
///
/// Word 0 holds the class code in its low byte and the flag bits in the
/// byte above it; word 1 is the sparse `nzmax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayFlags {
    pub class: MatrixClass,
    pub complex: bool,
    pub global: bool,
    pub logical: bool,
    /// Maximum number of non-zero elements; only meaningful for sparse matrices.
    pub nzmax: u32,
}

impl ArrayFlags {
    pub const LOGICAL: u8 = 0x02;
    pub const GLOBAL: u8 = 0x04;
    pub const COMPLEX: u8 = 0x08;

    pub fn new(class: MatrixClass, flag_bits: u8, nzmax: u32) -> Self {
        Self {
            class,
            complex: flag_bits & Self::COMPLEX != 0,
            global: flag_bits & Self::GLOBAL != 0,
            logical: flag_bits & Self::LOGICAL != 0,
            nzmax,
        }
    }
}

/// Limits applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Maximum nesting of matrix and compressed containers.
    pub max_depth: usize,
    /// Maximum size in bytes of one inflated compressed block.
    pub max_inflated_size: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_inflated_size: 1 << 30,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_inflated_size(mut self, bytes: u64) -> Self {
        self.max_inflated_size = bytes;
        self
    }
}
