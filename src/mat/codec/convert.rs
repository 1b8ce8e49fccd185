//! Checked numeric widening.
//!
//! MATLAB stores each buffer in the narrowest type that holds its values
//! losslessly, so a `double` matrix may arrive as `uint8` on the wire. These
//! functions bring a decoded buffer to the type the reader requires and fail
//! rather than clamp or truncate when a value does not fit exactly.

use num_traits::{NumCast, ToPrimitive};

use crate::mat::types::array::{with_values, NumericData};
use crate::mat::types::element::MatElement;
use crate::mat::types::error::{MatError, Result};

/// Converts an owned buffer to `T`, reusing the allocation when the stored
/// type already is `T`.
pub fn convert<T: MatElement>(data: NumericData) -> Result<Vec<T>> {
    match T::unwrap(data) {
        Ok(values) => Ok(values),
        Err(other) => convert_ref(&other),
    }
}

/// Converts a borrowed buffer to `T`.
pub fn convert_ref<T: MatElement>(data: &NumericData) -> Result<Vec<T>> {
    if let Some(values) = T::as_slice(data) {
        return Ok(values.to_vec());
    }
    with_values!(data, v => convert_slice(v.as_slice()))
}

fn convert_slice<S: MatElement, T: MatElement>(values: &[S]) -> Result<Vec<T>> {
    values.iter().map(|&v| convert_value(v)).collect()
}

/// Converts one value, succeeding only if it round-trips unchanged.
pub fn convert_value<S: MatElement, T: MatElement>(value: S) -> Result<T> {
    let converted: Option<T> = <T as NumCast>::from(value);
    let exact = converted.filter(|&t| {
        let round_trip = <S as NumCast>::from(t).map_or(false, |back| back == value);
        round_trip || (is_nan(value) && is_nan(t))
    });
    exact.ok_or_else(|| MatError::NumericConversion {
        value: value.to_string(),
        from: S::NAME,
        to: T::NAME,
    })
}

fn is_nan<N: ToPrimitive>(n: N) -> bool {
    n.to_f64().map_or(false, f64::is_nan)
}
