//! Numeric element types that decoded buffers can be widened into.

use std::fmt::{Debug, Display};

use num_traits::{NumCast, ToPrimitive};

use super::array::NumericData;

/// A Rust scalar that corresponds to one `NumericData` variant.
pub trait MatElement: Copy + PartialEq + Debug + Display + NumCast + ToPrimitive + 'static {
    /// Name used in conversion errors.
    const NAME: &'static str;

    fn wrap(values: Vec<Self>) -> NumericData;

    /// Takes the buffer out if it already holds this type, or hands it back.
    fn unwrap(data: NumericData) -> Result<Vec<Self>, NumericData>;

    fn as_slice(data: &NumericData) -> Option<&[Self]>;
}

macro_rules! impl_mat_element {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl MatElement for $ty {
            const NAME: &'static str = $name;

            fn wrap(values: Vec<Self>) -> NumericData {
                NumericData::$variant(values)
            }

            fn unwrap(data: NumericData) -> Result<Vec<Self>, NumericData> {
                match data {
                    NumericData::$variant(values) => Ok(values),
                    other => Err(other),
                }
            }

            fn as_slice(data: &NumericData) -> Option<&[Self]> {
                match data {
                    NumericData::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }
    };
}

impl_mat_element!(i8, Int8, "int8");
impl_mat_element!(u8, UInt8, "uint8");
impl_mat_element!(i16, Int16, "int16");
impl_mat_element!(u16, UInt16, "uint16");
impl_mat_element!(i32, Int32, "int32");
impl_mat_element!(u32, UInt32, "uint32");
impl_mat_element!(f32, Single, "single");
impl_mat_element!(f64, Double, "double");
impl_mat_element!(i64, Int64, "int64");
impl_mat_element!(u64, UInt64, "uint64");
