//! MAT-file header parsing.
//!
//! # Header Structure
//! ```text
//! [116 bytes] Descriptive text (ASCII)
//! [  8 bytes] Subsystem data offset
//! [  2 bytes] Version (0x0100)
//! [  2 bytes] Endian indicator ("IM" little-endian writer, "MI" big-endian)
//! ```

use std::io::{ErrorKind, Read};

use log::{debug, info};

use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{Endianness, MatHeader, MatVersion};
use crate::mat::utils;

pub const HEADER_LEN: usize = 128;
const TEXT_LEN: usize = 116;
const VERSION_5: u16 = 0x0100;

/// Reads and parses the 128-byte header from the start of a stream.
pub fn parse<R: Read>(reader: &mut R) -> Result<MatHeader> {
    let mut bytes = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match reader.read(&mut bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    parse_bytes(&bytes[..filled])
}

/// Parses a header from exactly 128 bytes.
pub fn parse_bytes(bytes: &[u8]) -> Result<MatHeader> {
    if bytes.len() != HEADER_LEN {
        return Err(MatError::Header(format!(
            "header must be {} bytes, got {}",
            HEADER_LEN,
            bytes.len()
        )));
    }

    // The indicator is 'M' << 8 | 'I' in the writer's byte order.
    let byte_order = match &bytes[126..128] {
        b"IM" => Endianness::Little,
        b"MI" => Endianness::Big,
        other => {
            return Err(MatError::Header(format!(
                "invalid endian indicator {:02x?}",
                other
            )))
        }
    };

    let version = byte_order.read_u16(&bytes[124..126]);
    if version != VERSION_5 {
        return Err(MatError::Header(format!(
            "unsupported version {:#06x}",
            version
        )));
    }

    let text = utils::ascii_to_string(&bytes[..TEXT_LEN]);

    let mut subsystem_offset_bytes = [0u8; 8];
    subsystem_offset_bytes.copy_from_slice(&bytes[TEXT_LEN..124]);

    let header = MatHeader {
        text,
        subsystem_offset: u64::from_ne_bytes(subsystem_offset_bytes),
        subsystem_offset_bytes,
        version: MatVersion::Level5,
        byte_order,
    };
    debug!(
        "Header description: '{}', subsystem offset bytes {:02x?}",
        header.description(),
        subsystem_offset_bytes
    );
    info!(
        "Header parsed: byte order {:?}, same endian as host: {}",
        header.byte_order,
        header.is_same_endian()
    );
    Ok(header)
}
