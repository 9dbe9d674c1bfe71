//! The `PLTE` chunk: an RGB palette for indexed-color images.

use crate::error::DecodeError;
use crate::ihdr::{ColorType, ImageInfo};

/// Parses a `PLTE` chunk body into palette entries.
///
/// The length must be a positive multiple of 3 and, for paletted images, no
/// more than `2 ^ bit_depth` entries.
pub(crate) fn parse_plte(data: &[u8], info: &ImageInfo) -> Result<Vec<[u8; 3]>, DecodeError> {
  if data.is_empty() || data.len() % 3 != 0 || data.len() > 768 {
    return Err(DecodeError::BadAttribute("PLTE length must be a positive multiple of 3, up to 768"));
  }
  let entries: &[[u8; 3]] = bytemuck::cast_slice(data);
  if info.color_type == ColorType::Palette {
    let max_entries = 1usize << info.bit_depth;
    if entries.len() > max_entries {
      return Err(DecodeError::BadAttribute("PLTE has more entries than the bit depth allows"));
    }
  }
  let mut owned = Vec::new();
  owned.try_reserve_exact(entries.len()).map_err(|_| DecodeError::AllocFailed)?;
  owned.extend_from_slice(entries);
  Ok(owned)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ihdr::ImageInfo;

  fn info(color_type: ColorType, bit_depth: u8) -> ImageInfo {
    ImageInfo { width: 1, height: 1, bit_depth, color_type, interlaced: false }
  }

  #[test]
  fn parses_three_entries() {
    let data = [1, 2, 3, 4, 5, 6, 7, 8, 9];
    let plte = parse_plte(&data, &info(ColorType::Palette, 8)).unwrap();
    assert_eq!(plte, vec![[1, 2, 3], [4, 5, 6], [7, 8, 9]]);
  }

  #[test]
  fn rejects_length_not_multiple_of_three() {
    let data = [1, 2, 3, 4];
    assert!(parse_plte(&data, &info(ColorType::Palette, 8)).is_err());
  }

  #[test]
  fn rejects_too_many_entries_for_bit_depth() {
    // bit_depth 1 allows at most 2 entries.
    let data = [1, 2, 3, 4, 5, 6, 7, 8, 9];
    assert!(parse_plte(&data, &info(ColorType::Palette, 1)).is_err());
  }

  #[test]
  fn rejects_more_than_768_bytes_regardless_of_color_type() {
    let data = vec![0u8; 771]; // 257 entries, not a multiple-of-3 bound issue
    assert!(parse_plte(&data, &info(ColorType::Rgb, 8)).is_err());
  }
}
