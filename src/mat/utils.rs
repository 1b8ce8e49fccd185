//! Low-level byte helpers shared by the format parsers.

/// Alignment of stream elements, in bytes.
pub const ALIGNMENT: u64 = 8;

/// Number of padding bytes needed to reach the next 8-byte boundary.
pub fn padding_for(offset: u64) -> u64 {
    (ALIGNMENT - offset % ALIGNMENT) % ALIGNMENT
}

/// Decodes an int8/uint8 name buffer as ASCII; other bytes become `'?'`.
pub fn ascii_to_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect()
}
