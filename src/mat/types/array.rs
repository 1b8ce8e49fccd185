//! The decoded array tree.
//!
//! Every decode call yields an [`Array`]: a name plus one of a primitive
//! numeric buffer, a text value or a composite [`Matrix`]. Matrices own their
//! nested arrays outright, so a document is a plain tree.

use num_traits::ToPrimitive;

use super::models::{ArrayFlags, MatrixClass};

/// One decoded element, top-level variable or nested sub-array.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    /// ASCII name; empty for anonymous elements such as cell entries.
    pub name: String,
    pub data: ArrayData,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    /// A homogeneous numeric buffer (a bare primitive element).
    Primitive(NumericData),
    /// A single decoded text value.
    Text(String),
    Matrix(Matrix),
}

impl Array {
    pub fn new(name: impl Into<String>, data: ArrayData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// An anonymous array.
    pub fn unnamed(data: ArrayData) -> Self {
        Self::new(String::new(), data)
    }

    pub fn as_matrix(&self) -> Option<&Matrix> {
        match &self.data {
            ArrayData::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            ArrayData::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric buffer of a primitive element or the real part of a
    /// dense numeric matrix.
    pub fn as_numeric(&self) -> Option<&NumericData> {
        match &self.data {
            ArrayData::Primitive(n) => Some(n),
            ArrayData::Matrix(Matrix {
                data: MatrixData::Numeric(n),
                ..
            }) => Some(&n.real),
            _ => None,
        }
    }

    /// Short human-readable description of the variant.
    pub fn kind_name(&self) -> &'static str {
        match &self.data {
            ArrayData::Primitive(_) => "primitive",
            ArrayData::Text(_) => "text",
            ArrayData::Matrix(m) => match m.data {
                MatrixData::Numeric(_) => "numeric matrix",
                MatrixData::Sparse(_) => "sparse matrix",
                MatrixData::Cell(_) => "cell array",
                MatrixData::Opaque(_) => "opaque object",
            },
        }
    }
}

/// A homogeneous buffer of one of the wire numeric types.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Single(Vec<f32>),
    Double(Vec<f64>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
}

/// Applies `$body` to the inner vector of any `NumericData` variant.
macro_rules! with_values {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            NumericData::Int8($v) => $body,
            NumericData::UInt8($v) => $body,
            NumericData::Int16($v) => $body,
            NumericData::UInt16($v) => $body,
            NumericData::Int32($v) => $body,
            NumericData::UInt32($v) => $body,
            NumericData::Single($v) => $body,
            NumericData::Double($v) => $body,
            NumericData::Int64($v) => $body,
            NumericData::UInt64($v) => $body,
        }
    };
}
pub(crate) use with_values;

impl NumericData {
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NumericData::Int8(_) => "int8",
            NumericData::UInt8(_) => "uint8",
            NumericData::Int16(_) => "int16",
            NumericData::UInt16(_) => "uint16",
            NumericData::Int32(_) => "int32",
            NumericData::UInt32(_) => "uint32",
            NumericData::Single(_) => "single",
            NumericData::Double(_) => "double",
            NumericData::Int64(_) => "int64",
            NumericData::UInt64(_) => "uint64",
        }
    }

    /// Element `index` as `f64`. 64-bit integers beyond 2^53 are rounded.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        with_values!(self, v => v.get(index).and_then(|x| x.to_f64()))
    }

    /// Every element as `f64`, failing if any value would lose precision.
    pub fn to_f64_vec(&self) -> super::error::Result<Vec<f64>> {
        crate::mat::codec::convert::convert_ref::<f64>(self)
    }
}

/// A composite matrix element.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub flags: ArrayFlags,
    /// Extents per dimension; empty for the opaque class.
    pub dimensions: Vec<i32>,
    pub data: MatrixData,
}

/// Class-specific payload of a matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixData {
    Numeric(NumericMatrix),
    Sparse(SparseMatrix),
    Cell(CellMatrix),
    Opaque(OpaqueMatrix),
}

impl Matrix {
    pub fn class(&self) -> MatrixClass {
        self.flags.class
    }

    /// Product of all dimensions; 0 when there are none.
    pub fn total_elements(&self) -> usize {
        total_elements(&self.dimensions).unwrap_or(0)
    }

    pub fn is_complex(&self) -> bool {
        self.flags.complex
    }

    pub fn is_logical(&self) -> bool {
        self.flags.logical
    }

    pub fn is_global(&self) -> bool {
        self.flags.global
    }

    /// The flat text of a character matrix. Row/column shape is not applied.
    pub fn as_string(&self) -> Option<String> {
        match (&self.data, self.flags.class) {
            (MatrixData::Numeric(n), MatrixClass::Char) => match &n.real {
                NumericData::UInt16(units) => Some(String::from_utf16_lossy(units)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Product of `dims` as an element count.
///
/// Returns `Some(0)` for an empty list and `None` for negative extents or
/// overflow.
pub fn total_elements(dims: &[i32]) -> Option<usize> {
    if dims.is_empty() {
        return Some(0);
    }
    dims.iter().try_fold(1usize, |acc, &d| {
        let d = usize::try_from(d).ok()?;
        acc.checked_mul(d)
    })
}

/// Dense numeric payload, already widened to the class's element type.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericMatrix {
    pub real: NumericData,
    pub imag: Option<NumericData>,
}

/// Compressed-sparse-column payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    pub rows: usize,
    pub cols: usize,
    /// Row index of every stored value.
    pub row_indices: Vec<i32>,
    /// `cols + 1` offsets into `row_indices` / `real`.
    pub column_pointers: Vec<i32>,
    /// Stored values in whatever element type the writer chose.
    pub real: NumericData,
    pub imag: Option<NumericData>,
}

impl SparseMatrix {
    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.column_pointers
            .last()
            .and_then(|&n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    /// Index range into the stored values for column `col`.
    fn column_range(&self, col: usize) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(*self.column_pointers.get(col)?).ok()?;
        let end = usize::try_from(*self.column_pointers.get(col + 1)?).ok()?;
        (start <= end && end <= self.row_indices.len()).then_some(start..end)
    }

    /// The real value at (`row`, `col`); 0 for entries that are not stored.
    ///
    /// `None` when the position is outside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let range = self.column_range(col)?;
        for k in range {
            if usize::try_from(self.row_indices[k]).ok() == Some(row) {
                return self.real.get_f64(k);
            }
        }
        Some(0.0)
    }

    /// Stored `(row, col, value)` triples in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.cols).flat_map(move |col| {
            self.column_range(col)
                .unwrap_or(0..0)
                .filter_map(move |k| {
                    let row = usize::try_from(self.row_indices[k]).ok()?;
                    Some((row, col, self.real.get_f64(k)?))
                })
        })
    }

    /// The real part expanded to a dense column-major buffer.
    ///
    /// Allocates `rows * cols` values. Returns `None` when that count
    /// overflows or the allocation cannot be made.
    pub fn to_dense(&self) -> Option<Vec<f64>> {
        let len = self.rows.checked_mul(self.cols)?;
        let mut dense = Vec::new();
        dense.try_reserve_exact(len).ok()?;
        dense.resize(len, 0.0);
        for (row, col, value) in self.iter() {
            if row < self.rows {
                dense[col * self.rows + row] = value;
            }
        }
        Some(dense)
    }
}

/// Cell array payload: one nested array per element.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMatrix {
    /// Elements in stream order.
    pub elements: Vec<Array>,
    pub dimensions: Vec<i32>,
}

impl CellMatrix {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The element at a multi-dimensional index, using row-major strides.
    pub fn get(&self, index: &[usize]) -> Option<&Array> {
        if index.len() != self.dimensions.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &extent) in index.iter().zip(&self.dimensions) {
            let extent = usize::try_from(extent).ok()?;
            if i >= extent {
                return None;
            }
            flat = flat.checked_mul(extent)?.checked_add(i)?;
        }
        self.elements.get(flat)
    }
}

/// Class 17 payload: two names and one nested array.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueMatrix {
    pub type_system: String,
    pub class_name: String,
    pub data: Box<Array>,
}
