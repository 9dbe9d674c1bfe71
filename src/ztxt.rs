//! The `zTXt` chunk: zlib-compressed Latin-1 keyword/text pairs.

use crate::error::DecodeError;

/// Text larger than this after inflation is rejected rather than allocated
/// without bound; `zTXt` text is metadata, not image data.
const MAX_ZTXT_TEXT_LEN: usize = 8 * 1024;

/// Splits and inflates a `zTXt` chunk body into its keyword and text.
///
/// Body shape is `keyword NUL compression_method zlib_data`; only
/// `compression_method == 0` (zlib/deflate) is defined.
pub(crate) fn parse_ztxt(data: &[u8]) -> Result<(&[u8], Vec<u8>), DecodeError> {
  let nul_pos = data
    .iter()
    .position(|&b| b == 0)
    .ok_or(DecodeError::BadAttribute("zTXt is missing its keyword terminator"))?;
  let keyword = &data[..nul_pos];
  if keyword.is_empty() || keyword.len() > 79 {
    return Err(DecodeError::BadAttribute("zTXt keyword must be 1 to 79 bytes"));
  }
  let &[compression_method, ref compressed @ ..] = &data[nul_pos + 1..] else {
    return Err(DecodeError::BadAttribute("zTXt is missing its compression method byte"));
  };
  if compression_method != 0 {
    return Err(DecodeError::BadAttribute("unknown zTXt compression method"));
  }
  let text = miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(compressed, MAX_ZTXT_TEXT_LEN).map_err(|e| {
    // The limited decompressor reports the same status whether the data is
    // corrupt or simply inflates past the cap; tell the two apart by how
    // much output it managed before giving up.
    if e.output.len() >= MAX_ZTXT_TEXT_LEN {
      DecodeError::NotImplemented("zTXt text larger than the decoder's bound")
    } else {
      DecodeError::ZlibError
    }
  })?;
  Ok((keyword, text))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn zlib_compress(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
  }

  #[test]
  fn inflates_keyword_and_text() {
    let mut body = b"Title\0".to_vec();
    body.push(0);
    body.extend(zlib_compress(b"hello"));
    let (keyword, text) = parse_ztxt(&body).unwrap();
    assert_eq!(keyword, b"Title");
    assert_eq!(text, b"hello");
  }

  #[test]
  fn rejects_unknown_compression_method() {
    let mut body = b"Title\0".to_vec();
    body.push(1);
    body.extend(zlib_compress(b"hello"));
    assert!(parse_ztxt(&body).is_err());
  }

  #[test]
  fn oversized_text_is_not_implemented_rather_than_a_zlib_error() {
    let mut body = b"Title\0".to_vec();
    body.push(0);
    let huge = vec![b'x'; MAX_ZTXT_TEXT_LEN + 1];
    body.extend(zlib_compress(&huge));
    assert!(matches!(parse_ztxt(&body), Err(DecodeError::NotImplemented(_))));
  }
}
