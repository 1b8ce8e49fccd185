use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};

use super::format::element::ElementReader;
use super::format::header::{self, HEADER_LEN};
use super::types::array::{Array, ArrayData, MatrixData};
use super::types::error::Result;
use super::types::models::{MatHeader, ReadOptions};

/// A decoded MAT-file: the header plus every top-level variable.
///
/// Variables keep the order in which they first appeared. Elements without a
/// name are stored as `"Unnamed {k}"`, where `k` is the number of variables
/// stored before them. When two elements share a name the later one replaces
/// the earlier one.
#[derive(Debug, Clone)]
pub struct MatFile {
    header: MatHeader,
    arrays: IndexMap<String, Array>,
}

impl MatFile {
    /// Read a MAT-file from the given path with default [`ReadOptions`].
    ///
    /// # Errors
    /// Returns an error if:
    /// - File cannot be opened
    /// - The header is invalid or the version is not Level 5
    /// - Any element is malformed, unsupported or truncated
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, ReadOptions::default())
    }

    pub fn open_with_options(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening MAT-file: {}", path.display());
        let file = File::open(path)?;
        Self::from_reader_with_options(BufReader::new(file), options)
    }

    /// Decode a document from any seekable byte source, starting at its
    /// current position.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ReadOptions::default())
    }

    pub fn from_reader_with_options<R: Read + Seek>(mut reader: R, options: ReadOptions) -> Result<Self> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;
        let stream_len = end.saturating_sub(start);

        let header = header::parse(&mut reader)?;
        let arrays = {
            let mut elements = ElementReader::new(reader, &header, &options, HEADER_LEN as u64, stream_len);
            read_arrays(&mut elements)?
        };

        info!("MAT-file decoded: {} variables", arrays.len());
        Ok(Self { header, arrays })
    }

    /// Decode a document held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn header(&self) -> &MatHeader {
        &self.header
    }

    pub fn get(&self, name: &str) -> Option<&Array> {
        self.arrays.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    /// Variable names in storage order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array)> {
        self.arrays.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn arrays(&self) -> &IndexMap<String, Array> {
        &self.arrays
    }

    pub fn into_arrays(self) -> IndexMap<String, Array> {
        self.arrays
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// One line per variable: name, kind, dimensions and element type.
    pub fn describe(&self) -> String {
        self.iter()
            .map(|(name, array)| format!("{}: {}", name, summarize(array)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decodes top-level elements until the stream is exhausted.
fn read_arrays<R: Read + Seek>(elements: &mut ElementReader<'_, R>) -> Result<IndexMap<String, Array>> {
    let mut arrays: IndexMap<String, Array> = IndexMap::new();

    while !elements.is_at_end() {
        let offset = elements.position();
        let mut array = elements.read_array()?;
        if array.name.is_empty() {
            array.name = format!("Unnamed {}", arrays.len());
            debug!("Element at {:#x} has no name, stored as '{}'", offset, array.name);
        }
        debug!("Decoded {} '{}' at {:#x}", array.kind_name(), array.name, offset);

        if arrays.insert(array.name.clone(), array).is_some() {
            debug!("Variable name collision at {:#x}: earlier value replaced", offset);
        }
    }
    Ok(arrays)
}

fn summarize(array: &Array) -> String {
    match &array.data {
        ArrayData::Primitive(n) => format!("{} [{}] {}", array.kind_name(), n.len(), n.type_name()),
        ArrayData::Text(s) => format!("{} \"{}\"", array.kind_name(), s),
        ArrayData::Matrix(m) => {
            let dims = m
                .dimensions
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("x");
            let element_type = match &m.data {
                MatrixData::Numeric(n) => n.real.type_name().to_string(),
                MatrixData::Sparse(s) => format!("{}, {} stored", s.real.type_name(), s.nnz()),
                MatrixData::Cell(c) => format!("{} elements", c.len()),
                MatrixData::Opaque(o) => format!("{}::{}", o.type_system, o.class_name),
            };
            let complex = if m.is_complex() { " complex" } else { "" };
            format!(
                "{} [{}] {:?}{} ({})",
                array.kind_name(),
                dims,
                m.class(),
                complex,
                element_type
            )
        }
    }
}
