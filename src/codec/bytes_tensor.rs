//! BYTES tensor serialization.
//!
//! The python backend expects every element of a BYTES tensor to be framed as
//! a little-endian `u32` length followed by exactly that many raw bytes; a
//! tensor payload is the concatenation of zero or more such elements. Both the
//! prompt and the JSON sampling-parameter blob travel this way, and the
//! backend answers with its JSON document framed the same way.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::convert::slice_to_bytes;
use crate::constants::tensors::{BOOL, BYTES, LENGTH_PREFIX_SIZE};
use crate::error::{Error, Result};

/// A named, typed, shaped input tensor paired with its raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTensor {
    pub name: String,
    pub datatype: &'static str,
    pub shape: Vec<i64>,
    pub payload: Bytes,
}

impl EncodedTensor {
    /// One-dimensional BOOL tensor, one byte per flag.
    pub fn bool_tensor(name: impl Into<String>, flags: &[bool]) -> Self {
        Self {
            name: name.into(),
            datatype: BOOL,
            shape: vec![flags.len() as i64],
            payload: slice_to_bytes(flags),
        }
    }
}

/// Encodes a single payload as a shape `[1]` BYTES tensor.
///
/// Empty payloads are valid and encode to a bare zero-length prefix.
pub fn encode_bytes_tensor(name: impl Into<String>, payload: &[u8]) -> Result<EncodedTensor> {
    encode_bytes_tensor_elements(name, [payload])
}

/// Encodes several payloads as a shape `[n]` BYTES tensor.
pub fn encode_bytes_tensor_elements<I, E>(name: impl Into<String>, elements: I) -> Result<EncodedTensor>
where
    I: IntoIterator<Item = E>,
    E: AsRef<[u8]>,
{
    let mut buf = BytesMut::new();
    let mut count: i64 = 0;
    for element in elements {
        put_element(&mut buf, element.as_ref())?;
        count += 1;
    }
    Ok(EncodedTensor {
        name: name.into(),
        datatype: BYTES,
        shape: vec![count],
        payload: buf.freeze(),
    })
}

fn put_element(buf: &mut BytesMut, element: &[u8]) -> Result<()> {
    let len = u32::try_from(element.len()).map_err(|_| {
        Error::Format(format!(
            "element of {} bytes does not fit a u32 length prefix",
            element.len()
        ))
    })?;
    buf.reserve(LENGTH_PREFIX_SIZE + element.len());
    buf.put_u32_le(len);
    buf.put_slice(element);
    Ok(())
}

/// Iterator over the elements of a serialized BYTES tensor.
///
/// Yields a [`Error::Format`] once and then stops if the buffer is truncated.
pub struct BytesElements<'a> {
    remaining: &'a [u8],
    failed: bool,
}

impl<'a> BytesElements<'a> {
    pub fn new(encoded: &'a [u8]) -> Self {
        Self {
            remaining: encoded,
            failed: false,
        }
    }

    fn fail(&mut self, msg: String) -> Option<Result<&'a [u8]>> {
        self.failed = true;
        Some(Err(Error::Format(msg)))
    }
}

impl<'a> Iterator for BytesElements<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }
        if self.remaining.len() < LENGTH_PREFIX_SIZE {
            let have = self.remaining.len();
            return self.fail(format!(
                "{} trailing bytes cannot hold a {}-byte length prefix",
                have, LENGTH_PREFIX_SIZE
            ));
        }
        let len = self.remaining.get_u32_le() as usize;
        if self.remaining.len() < len {
            let have = self.remaining.len();
            return self.fail(format!(
                "element declares {} bytes but only {} remain",
                len, have
            ));
        }
        let remaining = self.remaining;
        let (element, rest) = remaining.split_at(len);
        self.remaining = rest;
        Some(Ok(element))
    }
}

/// Decodes a serialized BYTES tensor, concatenating every element's bytes.
///
/// The response normally carries a single JSON document, but any number of
/// elements is accepted.
pub fn decode_bytes_tensor(encoded: &[u8]) -> Result<Vec<u8>> {
    let mut tensor = Vec::with_capacity(encoded.len());
    for element in BytesElements::new(encoded) {
        tensor.extend_from_slice(element?);
    }
    Ok(tensor)
}
