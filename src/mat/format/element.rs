//! Generic element decoding.
//!
//! [`ElementReader`] is the recursive entry point of the decoder. It reads a
//! tag, dispatches on the registry category and returns one [`Array`]:
//!
//! - primitive payloads are decoded in the file's byte order, then the cursor
//!   skips to the next 8-byte boundary (small elements need no skip);
//! - text payloads follow the same sourcing and padding rules;
//! - compressed elements are inflated and exactly one nested element is read
//!   from the inflated buffer;
//! - matrix elements are handled in [`super::matrix`].
//!
//! The reader tracks its own offset and a window end (`limit`). Every read is
//! checked against the window, so a nested element can never consume bytes
//! that belong to its parent's sibling.

use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom};

use log::{trace, warn};

use crate::mat::codec::{compression, convert, numeric};
use crate::mat::types::array::{Array, ArrayData, NumericData};
use crate::mat::types::element::MatElement;
use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{DataType, ElementKind, MatHeader, ReadOptions, Tag};
use crate::mat::utils;

use super::tag::{self, TAG_LEN};

/// A forward-only element cursor over a byte source.
pub struct ElementReader<'a, R> {
    inner: R,
    header: &'a MatHeader,
    options: &'a ReadOptions,
    /// Current offset from the start of the document (or inflated buffer).
    pos: u64,
    /// End of the region the cursor may read from.
    limit: u64,
    depth: usize,
}

impl<'a, R: Read + Seek> ElementReader<'a, R> {
    /// Creates a reader positioned at `pos` that may read up to `limit`.
    ///
    /// # Parameters
    /// * `inner` - Byte source, already positioned at `pos`
    /// * `header` - Parsed header; supplies the byte order
    /// * `options` - Depth and inflation limits
    /// * `pos` - Offset of the first element, used in error offsets and for padding
    /// * `limit` - Offset at which reading must stop
    pub fn new(inner: R, header: &'a MatHeader, options: &'a ReadOptions, pos: u64, limit: u64) -> Self {
        Self {
            inner,
            header,
            options,
            pos,
            limit,
            depth: 0,
        }
    }

    /// Current offset, counted like the `pos` given to [`ElementReader::new`].
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Bytes left before the end of the current window.
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(self.pos)
    }

    /// True once the cursor has reached the end of the current window.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.limit
    }

    /// Decodes the next element, whatever its type.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The tag or payload runs past the window (`TruncatedStream`)
    /// - The tag names an unknown data type (`UnsupportedType`)
    /// - A payload length or element count is inconsistent (`SizeMismatch`, `Tag`)
    /// - A matrix uses an unimplemented class (`UnsupportedMatrixClass`)
    /// - A compressed block is corrupt or too large (`Compression`)
    /// - Containers nest deeper than `max_depth` (`NestingTooDeep`)
    pub fn read_array(&mut self) -> Result<Array> {
        let tag = self.read_tag()?;
        self.read_element(&tag)
    }

    /// Decodes the payload described by an already-read tag.
    ///
    /// # Errors
    /// Same as [`ElementReader::read_array`], minus failures reading the tag itself.
    pub fn read_element(&mut self, tag: &Tag) -> Result<Array> {
        match tag.data_type.kind() {
            ElementKind::Primitive => Ok(Array::unnamed(ArrayData::Primitive(self.read_primitive(tag)?))),
            ElementKind::Text => Ok(Array::unnamed(ArrayData::Text(self.read_text(tag)?))),
            ElementKind::Matrix => self.read_matrix(tag),
            ElementKind::Compressed => self.read_compressed(tag),
            ElementKind::Invalid => Err(MatError::UnsupportedType {
                type_id: tag.data_type.id(),
                offset: tag.offset,
            }),
        }
    }

    pub(crate) fn read_tag(&mut self) -> Result<Tag> {
        let offset = self.pos;
        let mut bytes = [0u8; TAG_LEN];
        self.read_exact_bounded(&mut bytes, "element tag")?;
        tag::decode_tag(&bytes, self.header.byte_order, offset)
    }

    /// Decodes a primitive numeric element.
    ///
    /// # Errors
    /// `SizeMismatch` if the payload is not a whole number of elements,
    /// `TruncatedStream` if it runs past the window.
    pub fn read_primitive(&mut self, tag: &Tag) -> Result<NumericData> {
        let bytes = self.read_payload(tag, "primitive payload")?;
        numeric::decode_numeric(tag.data_type, &bytes, self.header.byte_order, tag.offset)
    }

    /// Decodes a UTF-8/16/32 text element into one string.
    pub fn read_text(&mut self, tag: &Tag) -> Result<String> {
        let bytes = self.read_payload(tag, "text payload")?;
        numeric::decode_text(tag.data_type, &bytes, self.header.byte_order, tag.offset)
    }

    /// Reads a primitive sub-element and widens it to `T`.
    pub(crate) fn read_primitive_as<T: MatElement>(&mut self, context: &'static str) -> Result<Vec<T>> {
        let tag = self.read_tag()?;
        if tag.data_type.kind() != ElementKind::Primitive {
            return Err(MatError::Tag {
                context,
                offset: tag.offset,
                message: format!("expected a numeric element, found {:?}", tag.data_type),
            });
        }
        let data = self.read_primitive(&tag)?;
        convert::convert(data)
    }

    /// Reads an int8/uint8 (or UTF-8) sub-element as an ASCII string.
    pub(crate) fn read_ascii(&mut self, context: &'static str) -> Result<String> {
        let tag = self.read_tag()?;
        match tag.data_type {
            DataType::Int8 | DataType::UInt8 => {
                let bytes = self.read_payload(&tag, context)?;
                Ok(utils::ascii_to_string(&bytes))
            }
            DataType::Utf8 => self.read_text(&tag),
            other => Err(MatError::Tag {
                context,
                offset: tag.offset,
                message: format!("expected an int8 string, found {:?}", other),
            }),
        }
    }

    fn read_compressed(&mut self, tag: &Tag) -> Result<Array> {
        self.enter(tag.offset)?;
        let result = self.read_compressed_body(tag);
        self.leave();
        result
    }

    fn read_compressed_body(&mut self, tag: &Tag) -> Result<Array> {
        let compressed = match tag.embedded_payload() {
            Some(bytes) => bytes.to_vec(),
            None => self.read_bytes(tag.length as u64, "compressed element")?,
        };
        let inflated = compression::inflate(&compressed, self.options.max_inflated_size, tag.offset)?;
        drop(compressed);

        let inflated_len = inflated.len() as u64;
        let mut nested = ElementReader {
            inner: Cursor::new(inflated),
            header: self.header,
            options: self.options,
            pos: 0,
            limit: inflated_len,
            depth: self.depth,
        };
        let array = nested.read_array()?;
        if !nested.is_at_end() {
            warn!(
                "Ignoring {} bytes after the first element of the compressed block at {:#x}",
                nested.remaining(),
                tag.offset
            );
        }
        Ok(array)
    }

    /// Fetches a payload from the tag (small element) or the stream, then
    /// skips stream padding.
    fn read_payload(&mut self, tag: &Tag, context: &'static str) -> Result<Vec<u8>> {
        if let Some(bytes) = tag.embedded_payload() {
            return Ok(bytes.to_vec());
        }
        let bytes = self.read_bytes(tag.length as u64, context)?;
        self.align()?;
        Ok(bytes)
    }

    /// Skips to the next 8-byte boundary, clamped to the current window.
    fn align(&mut self) -> Result<()> {
        let padding = utils::padding_for(self.pos);
        let skip = padding.min(self.remaining());
        if skip < padding {
            warn!(
                "Element ending at {:#x} lacks {} padding bytes",
                self.pos,
                padding - skip
            );
        }
        if skip > 0 {
            trace!("Skipping {} padding bytes at {:#x}", skip, self.pos);
            self.skip(skip)?;
        }
        Ok(())
    }

    pub(crate) fn read_bytes(&mut self, len: u64, context: &'static str) -> Result<Vec<u8>> {
        self.ensure_available(len, context)?;
        let mut buf = vec![0u8; len as usize];
        self.read_exact_bounded(&mut buf, context)?;
        Ok(buf)
    }

    fn read_exact_bounded(&mut self, buf: &mut [u8], context: &'static str) -> Result<()> {
        let needed = buf.len() as u64;
        self.ensure_available(needed, context)?;
        self.inner.read_exact(buf).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                MatError::TruncatedStream {
                    context,
                    offset: self.pos,
                    needed,
                    available: 0,
                }
            } else {
                MatError::Io(e)
            }
        })?;
        self.pos += needed;
        Ok(())
    }

    pub(crate) fn ensure_available(&self, needed: u64, context: &'static str) -> Result<()> {
        if needed > self.remaining() {
            return Err(MatError::TruncatedStream {
                context,
                offset: self.pos,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub(crate) fn skip(&mut self, len: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Current(len as i64))?;
        self.pos += len;
        Ok(())
    }

    /// Narrows the window to `[pos, end)` and returns the previous end.
    pub(crate) fn narrow(&mut self, end: u64) -> u64 {
        std::mem::replace(&mut self.limit, end)
    }

    pub(crate) fn restore(&mut self, limit: u64) {
        self.limit = limit;
    }

    /// Enters one level of container nesting.
    pub(crate) fn enter(&mut self, offset: u64) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(MatError::NestingTooDeep {
                limit: self.options.max_depth,
                offset,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
