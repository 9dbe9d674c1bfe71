//! The `tEXt` chunk: uncompressed Latin-1 keyword/text pairs.

use crate::error::DecodeError;

/// Splits a `tEXt` chunk body into its keyword and text payload.
///
/// The keyword and text are separated by the first NUL byte; the keyword
/// must be 1 to 79 bytes. Returns borrowed slices, both still Latin-1 and
/// not validated as UTF-8 (the format doesn't require it).
pub(crate) fn parse_text(data: &[u8]) -> Result<(&[u8], &[u8]), DecodeError> {
  let nul_pos = data
    .iter()
    .position(|&b| b == 0)
    .ok_or(DecodeError::BadAttribute("tEXt is missing its keyword terminator"))?;
  let keyword = &data[..nul_pos];
  if keyword.is_empty() || keyword.len() > 79 {
    return Err(DecodeError::BadAttribute("tEXt keyword must be 1 to 79 bytes"));
  }
  Ok((keyword, &data[nul_pos + 1..]))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_keyword_and_text() {
    let data = b"Title\0hello";
    let (keyword, text) = parse_text(data).unwrap();
    assert_eq!(keyword, b"Title");
    assert_eq!(text, b"hello");
  }

  #[test]
  fn allows_empty_text() {
    let data = b"Title\0";
    let (keyword, text) = parse_text(data).unwrap();
    assert_eq!(keyword, b"Title");
    assert_eq!(text, b"");
  }

  #[test]
  fn rejects_missing_terminator() {
    assert!(parse_text(b"Title").is_err());
  }

  #[test]
  fn rejects_empty_keyword() {
    assert!(parse_text(b"\0hello").is_err());
  }

  #[test]
  fn rejects_overlong_keyword() {
    let mut data = vec![b'a'; 80];
    data.push(0);
    assert!(parse_text(&data).is_err());
  }
}
