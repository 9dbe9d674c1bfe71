//! The `gAMA` chunk: image gamma, expressed as an integer scaled by 100000.

use crate::error::DecodeError;

/// Parses a 4-byte `gAMA` chunk body into a gamma value.
///
/// `0` means "no gamma information" per the format; callers should treat
/// that the same as `gAMA` being entirely absent.
pub(crate) fn parse_gama(data: &[u8]) -> Result<u32, DecodeError> {
  let &[b0, b1, b2, b3] = data else {
    return Err(DecodeError::BadAttribute("gAMA must be 4 bytes"));
  };
  Ok(u32::from_be_bytes([b0, b1, b2, b3]))
}

/// Converts the raw `gAMA` integer into the conventional floating gamma.
#[inline]
pub fn gamma_as_f32(raw: u32) -> f32 {
  raw as f32 / 100_000.0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_typical_gamma() {
    let raw = parse_gama(&45455u32.to_be_bytes()).unwrap();
    assert_eq!(raw, 45455);
    assert!((gamma_as_f32(raw) - 0.45455).abs() < 0.00001);
  }

  #[test]
  fn zero_means_absent() {
    let raw = parse_gama(&0u32.to_be_bytes()).unwrap();
    assert_eq!(raw, 0);
  }

  #[test]
  fn rejects_wrong_length() {
    assert!(parse_gama(&[1, 2, 3]).is_err());
  }
}
