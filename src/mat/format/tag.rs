//! Element tag decoding.
//!
//! # Tag Structure
//! ```text
//! Regular:        [u32 type id][u32 payload length]  payload follows in the stream
//! Small element:  [u16 type id][u16 length][4 bytes payload]
//! ```
//!
//! Both words are in the file's byte order. The small form is selected when
//! the first word, read as a `u32`, exceeds 255.

use log::trace;

use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, Endianness, Tag};

pub const TAG_LEN: usize = 8;

/// Decodes an 8-byte tag read at `offset`.
pub fn decode_tag(bytes: &[u8; TAG_LEN], order: Endianness, offset: u64) -> Result<Tag> {
    let word0 = order.read_u32(&bytes[0..4]);

    if word0 > 255 {
        let type_id = word0 & 0xFFFF;
        let length = (word0 >> 16) & 0xFFFF;
        if length > 4 {
            return Err(MatError::Tag {
                context: "small data element tag",
                offset,
                message: format!("embedded length {} exceeds 4 bytes", length),
            });
        }
        let mut embedded = [0u8; 4];
        embedded.copy_from_slice(&bytes[4..8]);
        trace!(
            "Tag at {:#x}: small element, type {}, {} bytes",
            offset,
            type_id,
            length
        );
        Ok(Tag {
            data_type: DataType::from(type_id),
            length,
            embedded: Some(embedded),
            offset,
        })
    } else {
        let length = order.read_u32(&bytes[4..8]);
        trace!("Tag at {:#x}: type {}, {} bytes", offset, word0, length);
        Ok(Tag {
            data_type: DataType::from(word0),
            length,
            embedded: None,
            offset,
        })
    }
}
