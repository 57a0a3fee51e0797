//! NPY (NumPy array file) encoding for `uint8` frame tensors.
//!
//! Produces version 1.0 files: an 8-byte magic/version preamble, a
//! little-endian `u16` header length, the Python dict literal describing the
//! array, and ASCII space padding so the whole header is a multiple of 16
//! bytes. The payload follows immediately in C order.

use crate::error::{CoreError, CoreResult};

use std::fs;
use std::path::Path;

/// Magic string followed by format version 1.0.
pub const NPY_PREAMBLE: [u8; 8] = [0x93, b'N', b'U', b'M', b'P', b'Y', 0x01, 0x00];

/// Preamble plus the two header-length bytes.
const PREFIX_LEN: usize = NPY_PREAMBLE.len() + 2;

const HEADER_ALIGNMENT: usize = 16;

/// Builds the full header (preamble, length, dict literal, padding) for `shape`.
pub fn encode_header(shape: &[usize]) -> CoreResult<Vec<u8>> {
    let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
    // A one-element tuple needs its trailing comma to stay a tuple.
    let shape_literal = if dims.len() == 1 {
        format!("({},)", dims[0])
    } else {
        format!("({})", dims.join(", "))
    };
    let dict = format!("{{'descr': '<u1', 'fortran_order': False, 'shape': {shape_literal}}}");

    let unpadded = PREFIX_LEN + dict.len();
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    let header_len = u16::try_from(dict.len() + padding).map_err(|_| {
        CoreError::NpyHeader(format!("header for shape {shape:?} exceeds 65535 bytes"))
    })?;

    let mut header = Vec::with_capacity(unpadded + padding);
    header.extend_from_slice(&NPY_PREAMBLE);
    header.extend_from_slice(&header_len.to_le_bytes());
    header.extend_from_slice(dict.as_bytes());
    header.resize(unpadded + padding, b' ');
    Ok(header)
}

/// Encodes `data` as an NPY byte stream with the given shape.
///
/// The caller guarantees `data.len()` equals the product of `shape`.
pub fn encode(data: &[u8], shape: &[usize]) -> CoreResult<Vec<u8>> {
    let mut out = encode_header(shape)?;
    out.reserve_exact(data.len());
    out.extend_from_slice(data);
    Ok(out)
}

/// Writes an NPY file in a single write call.
pub fn write_npy(path: &Path, data: &[u8], shape: &[usize]) -> CoreResult<()> {
    let bytes = encode(data, shape)?;
    fs::write(path, bytes)?;
    log::debug!("Wrote NPY array {:?} to {}", shape, path.display());
    Ok(())
}

/// Parsed view of an NPY v1.0 header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    /// Offset of the first payload byte.
    pub data_offset: usize,
}

/// Reads back the header of an NPY byte stream produced by [`encode`].
pub fn read_header(bytes: &[u8]) -> CoreResult<NpyHeader> {
    if bytes.len() < PREFIX_LEN || bytes[..6] != NPY_PREAMBLE[..6] {
        return Err(CoreError::NpyHeader("missing NPY magic string".to_string()));
    }
    if bytes[6] != 1 {
        return Err(CoreError::NpyHeader(format!(
            "unsupported version {}.{}",
            bytes[6], bytes[7]
        )));
    }

    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let data_offset = PREFIX_LEN + header_len;
    let dict = bytes
        .get(PREFIX_LEN..data_offset)
        .ok_or_else(|| CoreError::NpyHeader("truncated header".to_string()))?;
    let dict = std::str::from_utf8(dict)
        .map_err(|e| CoreError::NpyHeader(format!("header is not UTF-8: {e}")))?
        .trim_end();

    let descr = dict_value(dict, "descr")?
        .trim_matches('\'')
        .to_string();
    let fortran_order = match dict_value(dict, "fortran_order")? {
        "True" => true,
        "False" => false,
        other => {
            return Err(CoreError::NpyHeader(format!(
                "invalid fortran_order value: {other}"
            )));
        }
    };

    let shape = dict_value(dict, "shape")?
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.parse::<usize>()
                .map_err(|_| CoreError::NpyHeader(format!("invalid shape dimension: {dim}")))
        })
        .collect::<CoreResult<Vec<usize>>>()?;

    Ok(NpyHeader {
        descr,
        fortran_order,
        shape,
        data_offset,
    })
}

/// Extracts the raw text of `key`'s value from the dict literal.
fn dict_value<'a>(dict: &'a str, key: &str) -> CoreResult<&'a str> {
    let needle = format!("'{key}': ");
    let start = dict
        .find(&needle)
        .map(|i| i + needle.len())
        .ok_or_else(|| CoreError::NpyHeader(format!("missing key '{key}'")))?;
    let rest = &dict[start..];
    let end = if rest.starts_with('(') {
        rest.find(')').map(|i| i + 1)
    } else {
        rest.find([',', '}'])
    }
    .ok_or_else(|| CoreError::NpyHeader(format!("unterminated value for '{key}'")))?;
    Ok(rest[..end].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout_for_frame_tensor() {
        let header = encode_header(&[10, 256, 256, 3]).unwrap();
        let dict = b"{'descr': '<u1', 'fortran_order': False, 'shape': (10, 256, 256, 3)}";

        assert_eq!(&header[..8], &NPY_PREAMBLE);
        assert_eq!(header.len() % 16, 0);
        let header_len = u16::from_le_bytes([header[8], header[9]]) as usize;
        assert_eq!(header_len + 10, header.len());
        assert_eq!(&header[10..10 + dict.len()], dict);
        assert!(header[10 + dict.len()..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_header_padding_arithmetic() {
        // 10 + 68 = 78 bytes, so two spaces bring the header to 80.
        let dict_len = "{'descr': '<u1', 'fortran_order': False, 'shape': (10, 256, 256, 3)}".len();
        let header = encode_header(&[10, 256, 256, 3]).unwrap();
        assert_eq!(dict_len, 68);
        assert_eq!(header.len(), 80);
        assert_eq!(&header[78..], b"  ");
    }

    #[test]
    fn test_one_dimensional_shape_keeps_tuple_comma() {
        let header = read_header(&encode(&[1, 2, 3], &[3]).unwrap()).unwrap();
        assert_eq!(header.shape, vec![3]);
        let text = String::from_utf8_lossy(&encode_header(&[3]).unwrap()).to_string();
        assert!(text.contains("'shape': (3,)}"));
    }

    #[test]
    fn test_read_header_recovers_shape_and_payload() {
        let data: Vec<u8> = (0..(2 * 4 * 5 * 3)).map(|i| i as u8).collect();
        let bytes = encode(&data, &[2, 4, 5, 3]).unwrap();

        let header = read_header(&bytes).unwrap();
        assert_eq!(header.descr, "<u1");
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![2, 4, 5, 3]);
        assert_eq!(&bytes[header.data_offset..], data.as_slice());
    }

    #[test]
    fn test_read_header_rejects_garbage() {
        assert!(matches!(
            read_header(b"not an npy file at all"),
            Err(CoreError::NpyHeader(_))
        ));
    }
}
