//! Matrix element decoding.
//!
//! # Matrix Structure
//! ```text
//! Array flags   uint32[2]   class code, flag bits, sparse nzmax
//! Dimensions    int32[n]    (absent for the opaque class)
//! Name          int8[]      ASCII, possibly empty
//! Class payload             see below
//! ```
//!
//! Class payloads:
//! - numeric and char: real part, then imaginary part if complex
//! - sparse: row indices, column pointers, real values, imaginary values
//! - cell: one nested element per cell
//! - opaque (17): type-system name, class name, one nested element
//!
//! The whole matrix is decoded inside a window of its declared length.

use std::io::{Read, Seek};

use log::{debug, trace, warn};

use crate::mat::codec::convert;
use crate::mat::types::array::{
    total_elements, Array, ArrayData, CellMatrix, Matrix, MatrixData, NumericData, NumericMatrix,
    OpaqueMatrix, SparseMatrix,
};
use crate::mat::types::element::MatElement;
use crate::mat::types::error::{MatError, Result};
use crate::mat::types::models::{ArrayFlags, DataType, MatrixClass, Tag};

use super::element::ElementReader;
use super::tag::TAG_LEN;

impl<'a, R: Read + Seek> ElementReader<'a, R> {
    pub(crate) fn read_matrix(&mut self, tag: &Tag) -> Result<Array> {
        if tag.is_embedded() {
            return Err(MatError::Tag {
                context: "matrix element",
                offset: tag.offset,
                message: "matrix cannot use the small data element form".to_string(),
            });
        }
        let length = tag.length as u64;
        if length == 0 {
            trace!("Empty matrix element at {:#x}", tag.offset);
            return Ok(empty_matrix());
        }
        self.ensure_available(length, "matrix element")?;

        self.enter(tag.offset)?;
        let end = self.position() + length;
        let outer_limit = self.narrow(end);
        let result = self.read_matrix_body(tag);
        self.restore(outer_limit);
        self.leave();
        let array = result?;

        if self.position() < end {
            warn!(
                "Skipping {} unread bytes at the end of matrix '{}' ({:#x})",
                end - self.position(),
                array.name,
                tag.offset
            );
            self.skip(end - self.position())?;
        }
        Ok(array)
    }

    fn read_matrix_body(&mut self, tag: &Tag) -> Result<Array> {
        let flags = self.read_array_flags()?;
        trace!("Matrix at {:#x}: {:?}", tag.offset, flags);

        match flags.class {
            MatrixClass::Struct
            | MatrixClass::Object
            | MatrixClass::FunctionHandle
            | MatrixClass::LittleEndianPacked => {
                return Err(MatError::UnsupportedMatrixClass {
                    class: flags.class,
                    offset: tag.offset,
                })
            }
            MatrixClass::Opaque => return self.read_opaque(flags),
            _ => {}
        }

        let dimensions = self.read_dimensions()?;
        let name = self.read_ascii("matrix name")?;
        let total = total_elements(&dimensions).ok_or_else(|| MatError::Tag {
            context: "matrix dimensions",
            offset: tag.offset,
            message: format!("invalid dimensions {:?}", dimensions),
        })?;

        let data = match flags.class {
            MatrixClass::Cell => MatrixData::Cell(self.read_cell(&dimensions, total)?),
            MatrixClass::Sparse => MatrixData::Sparse(self.read_sparse(&flags, &dimensions, tag.offset)?),
            MatrixClass::Char => MatrixData::Numeric(self.read_char_data(&flags, total)?),
            MatrixClass::Double => MatrixData::Numeric(self.read_numeric::<f64>(&flags, total)?),
            MatrixClass::Single => MatrixData::Numeric(self.read_numeric::<f32>(&flags, total)?),
            MatrixClass::Int8 => MatrixData::Numeric(self.read_numeric::<i8>(&flags, total)?),
            MatrixClass::UInt8 => MatrixData::Numeric(self.read_numeric::<u8>(&flags, total)?),
            MatrixClass::Int16 => MatrixData::Numeric(self.read_numeric::<i16>(&flags, total)?),
            MatrixClass::UInt16 => MatrixData::Numeric(self.read_numeric::<u16>(&flags, total)?),
            MatrixClass::Int32 => MatrixData::Numeric(self.read_numeric::<i32>(&flags, total)?),
            MatrixClass::UInt32 => MatrixData::Numeric(self.read_numeric::<u32>(&flags, total)?),
            MatrixClass::Int64 => MatrixData::Numeric(self.read_numeric::<i64>(&flags, total)?),
            MatrixClass::UInt64 => MatrixData::Numeric(self.read_numeric::<u64>(&flags, total)?),
            MatrixClass::Struct
            | MatrixClass::Object
            | MatrixClass::FunctionHandle
            | MatrixClass::LittleEndianPacked
            | MatrixClass::Opaque => {
                return Err(MatError::UnsupportedMatrixClass {
                    class: flags.class,
                    offset: tag.offset,
                })
            }
        };

        debug!(
            "Decoded {:?} matrix '{}' with dimensions {:?}",
            flags.class, name, dimensions
        );
        Ok(Array::new(
            name,
            ArrayData::Matrix(Matrix {
                flags,
                dimensions,
                data,
            }),
        ))
    }

    /// Reads the array flags: exactly two uint32 words.
    fn read_array_flags(&mut self) -> Result<ArrayFlags> {
        let tag = self.read_tag()?;
        if tag.data_type != DataType::UInt32 || tag.length != 8 {
            return Err(MatError::Tag {
                context: "array flags",
                offset: tag.offset,
                message: format!(
                    "expected 8 bytes of uint32, found {} bytes of {:?}",
                    tag.length, tag.data_type
                ),
            });
        }
        let words: Vec<u32> = convert::convert(self.read_primitive(&tag)?)?;
        let &[word0, nzmax] = words.as_slice() else {
            return Err(MatError::SizeMismatch {
                context: "array flags",
                offset: tag.offset,
                expected: 2,
                found: words.len() as u64,
            });
        };

        let code = (word0 & 0xFF) as u8;
        let flag_bits = ((word0 >> 8) & 0xFF) as u8;
        let class = MatrixClass::from_code(code).ok_or_else(|| MatError::Tag {
            context: "array flags",
            offset: tag.offset,
            message: format!("invalid matrix class code {}", code),
        })?;
        Ok(ArrayFlags::new(class, flag_bits, nzmax))
    }

    fn read_dimensions(&mut self) -> Result<Vec<i32>> {
        let offset = self.position();
        let dimensions: Vec<i32> = self.read_primitive_as("dimensions")?;
        if let Some(&bad) = dimensions.iter().find(|&&d| d < 0) {
            return Err(MatError::Tag {
                context: "dimensions",
                offset,
                message: format!("negative extent {}", bad),
            });
        }
        Ok(dimensions)
    }

    /// Reads the next element and widens its buffer to `T`.
    fn read_widened<T: MatElement>(&mut self, context: &'static str) -> Result<Vec<T>> {
        convert::convert(self.read_numeric_data(context)?)
    }

    /// Reads the next element and requires it to be a numeric buffer of any type.
    fn read_numeric_data(&mut self, context: &'static str) -> Result<NumericData> {
        let offset = self.position();
        let array = self.read_array()?;
        match array.data {
            ArrayData::Primitive(data) => Ok(data),
            other => Err(unexpected_element(context, offset, &other)),
        }
    }

    fn read_numeric<T: MatElement>(&mut self, flags: &ArrayFlags, total: usize) -> Result<NumericMatrix> {
        let offset = self.position();
        let real = self.read_widened::<T>("real part")?;
        check_count("real part", offset, total, real.len())?;

        let imag = if flags.complex {
            let offset = self.position();
            let imag = self.read_widened::<T>("imaginary part")?;
            check_count("imaginary part", offset, total, imag.len())?;
            Some(T::wrap(imag))
        } else {
            None
        };
        Ok(NumericMatrix {
            real: T::wrap(real),
            imag,
        })
    }

    /// Character data arrives as 16-bit code units or as UTF-8 text.
    fn read_char_data(&mut self, flags: &ArrayFlags, total: usize) -> Result<NumericMatrix> {
        let mut parts = Vec::with_capacity(2);
        let count = if flags.complex { 2 } else { 1 };
        for _ in 0..count {
            let offset = self.position();
            let array = self.read_array()?;
            let units: Vec<u16> = match array.data {
                ArrayData::Primitive(data) => convert::convert(data)?,
                ArrayData::Text(text) => text.encode_utf16().collect(),
                other => return Err(unexpected_element("character data", offset, &other)),
            };
            check_count("character data", offset, total, units.len())?;
            parts.push(NumericData::UInt16(units));
        }
        let imag = if flags.complex { parts.pop() } else { None };
        let real = parts.pop().unwrap_or(NumericData::UInt16(Vec::new()));
        Ok(NumericMatrix { real, imag })
    }

    fn read_sparse(&mut self, flags: &ArrayFlags, dimensions: &[i32], offset: u64) -> Result<SparseMatrix> {
        let &[rows, cols] = dimensions else {
            return Err(MatError::Tag {
                context: "sparse dimensions",
                offset,
                message: format!("expected 2 dimensions, found {:?}", dimensions),
            });
        };
        // Extents were checked to be non-negative.
        let (rows, cols) = (rows as usize, cols as usize);

        let row_indices: Vec<i32> = self.read_primitive_as("sparse row indices")?;
        let pointers_offset = self.position();
        let column_pointers: Vec<i32> = self.read_primitive_as("sparse column pointers")?;
        check_count("sparse column pointers", pointers_offset, cols + 1, column_pointers.len())?;

        let valid_pointers = column_pointers.first() == Some(&0)
            && column_pointers.windows(2).all(|w| w[0] <= w[1]);
        let nnz = column_pointers.last().map_or(0, |&n| n.max(0) as usize);
        if !valid_pointers || nnz > row_indices.len() {
            return Err(MatError::Tag {
                context: "sparse column pointers",
                offset: pointers_offset,
                message: format!(
                    "pointers {:?} are inconsistent with {} row indices",
                    column_pointers,
                    row_indices.len()
                ),
            });
        }
        if row_indices[..nnz].iter().any(|&r| r < 0 || r as usize >= rows) {
            return Err(MatError::Tag {
                context: "sparse row indices",
                offset,
                message: format!("row index outside 0..{}", rows),
            });
        }

        let real_offset = self.position();
        let real = self.read_numeric_data("sparse real part")?;
        check_at_least("sparse real part", real_offset, nnz, real.len())?;
        let imag = if flags.complex {
            let imag_offset = self.position();
            let imag = self.read_numeric_data("sparse imaginary part")?;
            check_at_least("sparse imaginary part", imag_offset, nnz, imag.len())?;
            Some(imag)
        } else {
            None
        };

        trace!("Sparse {}x{} matrix with {} stored values (nzmax {})", rows, cols, nnz, flags.nzmax);
        Ok(SparseMatrix {
            rows,
            cols,
            row_indices,
            column_pointers,
            real,
            imag,
        })
    }

    fn read_cell(&mut self, dimensions: &[i32], total: usize) -> Result<CellMatrix> {
        // Every element needs at least one tag.
        self.ensure_available((total as u64).saturating_mul(TAG_LEN as u64), "cell elements")?;
        let mut elements = Vec::with_capacity(total);
        for index in 0..total {
            trace!("Reading cell element {} of {}", index + 1, total);
            elements.push(self.read_array()?);
        }
        Ok(CellMatrix {
            elements,
            dimensions: dimensions.to_vec(),
        })
    }

    fn read_opaque(&mut self, flags: ArrayFlags) -> Result<Array> {
        let name = self.read_ascii("matrix name")?;
        let type_system = self.read_ascii("opaque type system name")?;
        let class_name = self.read_ascii("opaque class name")?;
        let data = self.read_array()?;
        debug!(
            "Decoded opaque object '{}' of class {}::{}",
            name, type_system, class_name
        );
        Ok(Array::new(
            name,
            ArrayData::Matrix(Matrix {
                flags,
                dimensions: Vec::new(),
                data: MatrixData::Opaque(OpaqueMatrix {
                    type_system,
                    class_name,
                    data: Box::new(data),
                }),
            }),
        ))
    }
}

/// The decoded form of a zero-length matrix element.
fn empty_matrix() -> Array {
    Array::unnamed(ArrayData::Matrix(Matrix {
        flags: ArrayFlags::new(MatrixClass::Double, 0, 0),
        dimensions: vec![0, 0],
        data: MatrixData::Numeric(NumericMatrix {
            real: NumericData::Double(Vec::new()),
            imag: None,
        }),
    }))
}

fn check_count(context: &'static str, offset: u64, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(MatError::SizeMismatch {
            context,
            offset,
            expected: expected as u64,
            found: found as u64,
        });
    }
    Ok(())
}

fn check_at_least(context: &'static str, offset: u64, expected: usize, found: usize) -> Result<()> {
    if found < expected {
        return Err(MatError::SizeMismatch {
            context,
            offset,
            expected: expected as u64,
            found: found as u64,
        });
    }
    Ok(())
}

fn unexpected_element(context: &'static str, offset: u64, data: &ArrayData) -> MatError {
    let found = match data {
        ArrayData::Primitive(n) => n.type_name(),
        ArrayData::Text(_) => "text",
        ArrayData::Matrix(_) => "matrix",
    };
    MatError::Tag {
        context,
        offset,
        message: format!("expected numeric data, found {}", found),
    }
}
