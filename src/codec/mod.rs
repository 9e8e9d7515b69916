//! Binary tensor codecs.
//!
//! - [`convert`]: fixed-width little-endian element arrays (BOOL, INT32, ...)
//! - [`bytes_tensor`]: length-prefixed BYTES tensors

pub mod bytes_tensor;
pub mod convert;

pub use bytes_tensor::{
    decode_bytes_tensor, encode_bytes_tensor, encode_bytes_tensor_elements, BytesElements,
    EncodedTensor,
};
pub use convert::{bytes_to_slice, pad, slice_2d_to_bytes, slice_to_bytes, LeBytes};
