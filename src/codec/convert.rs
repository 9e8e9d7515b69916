//! Fixed-width numeric <-> byte conversion.
//!
//! Mirrors numpy's `ndarray.tobytes()` for the handful of element types the
//! inference backend accepts in non-BYTES tensors: every element is written
//! little-endian, back to back, with no header.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// An element type with a fixed little-endian wire width.
pub trait LeBytes: Sized + Copy {
    /// Encoded width in bytes
    const WIDTH: usize;

    fn put_le<B: BufMut>(self, buf: &mut B);

    fn get_le<B: Buf>(buf: &mut B) -> Self;
}

macro_rules! impl_le_bytes {
    ($($ty:ty => $put:ident, $get:ident);* $(;)?) => {
        $(
            impl LeBytes for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn put_le<B: BufMut>(self, buf: &mut B) {
                    buf.$put(self)
                }

                fn get_le<B: Buf>(buf: &mut B) -> Self {
                    buf.$get()
                }
            }
        )*
    };
}

impl_le_bytes! {
    u8 => put_u8, get_u8;
    i32 => put_i32_le, get_i32_le;
    u32 => put_u32_le, get_u32_le;
    i64 => put_i64_le, get_i64_le;
    u64 => put_u64_le, get_u64_le;
    f32 => put_f32_le, get_f32_le;
    f64 => put_f64_le, get_f64_le;
}

// numpy stores bool as a single 0/1 byte
impl LeBytes for bool {
    const WIDTH: usize = 1;

    fn put_le<B: BufMut>(self, buf: &mut B) {
        buf.put_u8(self as u8)
    }

    fn get_le<B: Buf>(buf: &mut B) -> Self {
        buf.get_u8() != 0
    }
}

/// Serializes a slice element by element, little-endian.
pub fn slice_to_bytes<T: LeBytes>(values: &[T]) -> Bytes {
    let mut buf = BytesMut::with_capacity(values.len() * T::WIDTH);
    for &value in values {
        value.put_le(&mut buf);
    }
    buf.freeze()
}

/// Serializes a 2-D slice row-major, with no row separators.
pub fn slice_2d_to_bytes<T: LeBytes>(rows: &[Vec<T>]) -> Bytes {
    let total: usize = rows.iter().map(Vec::len).sum();
    let mut buf = BytesMut::with_capacity(total * T::WIDTH);
    for row in rows {
        for &value in row {
            value.put_le(&mut buf);
        }
    }
    buf.freeze()
}

/// Inverse of [`slice_to_bytes`].
///
/// Fails with [`Error::Format`] when the buffer is not a whole number of
/// elements long.
pub fn bytes_to_slice<T: LeBytes>(mut bytes: &[u8]) -> Result<Vec<T>> {
    if bytes.len() % T::WIDTH != 0 {
        return Err(Error::Format(format!(
            "{} bytes is not a multiple of element width {}",
            bytes.len(),
            T::WIDTH
        )));
    }
    let mut values = Vec::with_capacity(bytes.len() / T::WIDTH);
    while bytes.has_remaining() {
        values.push(T::get_le(&mut bytes));
    }
    Ok(values)
}

/// Right-pads `slice` with `pad_value` up to `length`. Longer input is returned as is.
pub fn pad(slice: &[i32], pad_value: i32, length: usize) -> Vec<i32> {
    let mut padded = slice.to_vec();
    if padded.len() < length {
        padded.resize(length, pad_value);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_slice_is_one_byte_per_flag() {
        assert_eq!(slice_to_bytes(&[false]).as_ref(), &[0u8]);
        assert_eq!(slice_to_bytes(&[true, false, true]).as_ref(), &[1u8, 0, 1]);
    }

    #[test]
    fn test_u32_little_endian_layout() {
        let bytes = slice_to_bytes(&[1u32, 0x0102_0304]);
        assert_eq!(bytes.as_ref(), &[1, 0, 0, 0, 4, 3, 2, 1]);
        assert_eq!(bytes_to_slice::<u32>(&bytes).unwrap(), vec![1, 0x0102_0304]);
    }

    #[test]
    fn test_f32_values_survive_conversion() {
        let values = [0.1f32, -2.5, f32::MAX];
        let bytes = slice_to_bytes(&values);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_slice::<f32>(&bytes).unwrap(), values.to_vec());
    }

    #[test]
    fn test_2d_flattens_row_major() {
        let bytes = slice_2d_to_bytes(&[vec![1i32, 2], vec![3]]);
        assert_eq!(bytes_to_slice::<i32>(&bytes).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_misaligned_buffer_is_rejected() {
        let err = bytes_to_slice::<u32>(&[1, 2, 3, 4, 5]).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad(&[1, 2], 0, 4), vec![1, 2, 0, 0]);
        assert_eq!(pad(&[1, 2, 3], 9, 2), vec![1, 2, 3]);
        assert_eq!(pad(&[], 7, 2), vec![7, 7]);
    }
}
