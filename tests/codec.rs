use vllm_triton_core::{
    codec::{
        bytes_to_slice, decode_bytes_tensor, encode_bytes_tensor, encode_bytes_tensor_elements, pad,
        slice_2d_to_bytes, slice_to_bytes, BytesElements,
    },
    Error,
};

#[test]
fn test_bytes_tensor_layout() {
    let tensor = encode_bytes_tensor("PROMPT", b"abc").unwrap();
    assert_eq!(tensor.datatype, "BYTES");
    assert_eq!(tensor.shape, vec![1]);
    assert_eq!(&tensor.payload[..], &[3, 0, 0, 0, b'a', b'b', b'c'][..]);
}

#[test]
fn test_multi_element_tensor_decodes_per_element() {
    let tensor = encode_bytes_tensor_elements("TEXT", [&b"ab"[..], &b""[..], &b"xyz"[..]]).unwrap();
    assert_eq!(tensor.shape, vec![3]);

    let elements: Vec<&[u8]> = BytesElements::new(&tensor.payload)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(elements, vec![&b"ab"[..], &b""[..], &b"xyz"[..]]);
    assert_eq!(decode_bytes_tensor(&tensor.payload).unwrap(), b"abxyz".to_vec());
}

#[test]
fn test_truncated_buffers_are_format_errors() {
    assert!(matches!(decode_bytes_tensor(&[1, 0]), Err(Error::Format(_))));

    let mut declared_too_long = 10u32.to_le_bytes().to_vec();
    declared_too_long.extend_from_slice(b"short");
    assert!(matches!(decode_bytes_tensor(&declared_too_long), Err(Error::Format(_))));
}

#[test]
fn test_empty_buffer_decodes_to_nothing() {
    assert!(decode_bytes_tensor(&[]).unwrap().is_empty());
}

#[test]
fn test_fixed_width_arrays() {
    let ids = [1i32, -2, 300];
    let encoded = slice_to_bytes(&ids);
    assert_eq!(encoded.len(), 12);
    assert_eq!(bytes_to_slice::<i32>(&encoded).unwrap(), ids.to_vec());

    let rows = vec![vec![1i32, 2], vec![3, 4]];
    let flat = slice_2d_to_bytes(&rows);
    assert_eq!(bytes_to_slice::<i32>(&flat).unwrap(), vec![1, 2, 3, 4]);

    assert!(matches!(bytes_to_slice::<i32>(&[0, 0, 0]), Err(Error::Format(_))));
}

#[test]
fn test_pad_to_sequence_length() {
    assert_eq!(pad(&[101, 2054], 0, 4), vec![101, 2054, 0, 0]);
    assert_eq!(pad(&[1, 2, 3], 0, 2), vec![1, 2]);
}
