//! The `tRNS` chunk: simple transparency without a full alpha channel.

use crate::error::DecodeError;
use crate::ihdr::{ColorType, ImageInfo};

/// Transparency data from `tRNS`, shaped according to the image's color type.
///
/// A genuine enum rather than a struct carrying every possible shape at
/// once, since exactly one variant is ever meaningful for a given image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransparencyInfo {
  /// One alpha value (0-255) per palette entry, indexed by sample value.
  /// Entries beyond the end of this vec are fully opaque.
  Indexed(Vec<u8>),
  /// The single gray sample value (not scaled to 8bpp) that is transparent.
  Gray16(u16),
  /// The single RGB sample triple (not scaled to 8bpp) that is transparent.
  Rgb16 { r: u16, g: u16, b: u16 },
}

/// Parses a `tRNS` chunk body, given the image's already-known color type
/// and bit depth. `palette_len` is the number of `PLTE` entries already
/// seen; an indexed `tRNS` longer than that is truncated to it, since
/// there's no palette entry for the extra bytes to describe.
pub(crate) fn parse_trns(data: &[u8], info: &ImageInfo, palette_len: usize) -> Result<TransparencyInfo, DecodeError> {
  match info.color_type {
    ColorType::Palette => {
      let data = &data[..data.len().min(palette_len)];
      let mut alphas = Vec::new();
      alphas.try_reserve_exact(data.len()).map_err(|_| DecodeError::AllocFailed)?;
      alphas.extend_from_slice(data);
      Ok(TransparencyInfo::Indexed(alphas))
    }
    ColorType::Gray => {
      let &[hi, lo] = data else {
        return Err(DecodeError::BadAttribute("grayscale tRNS must be 2 bytes"));
      };
      Ok(TransparencyInfo::Gray16(u16::from_be_bytes([hi, lo])))
    }
    ColorType::Rgb => {
      let &[r0, r1, g0, g1, b0, b1] = data else {
        return Err(DecodeError::BadAttribute("truecolor tRNS must be 6 bytes"));
      };
      Ok(TransparencyInfo::Rgb16 {
        r: u16::from_be_bytes([r0, r1]),
        g: u16::from_be_bytes([g0, g1]),
        b: u16::from_be_bytes([b0, b1]),
      })
    }
    ColorType::GrayAlpha | ColorType::Rgba => {
      Err(DecodeError::BadAttribute("tRNS is not valid for a color type with its own alpha channel"))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn info(color_type: ColorType, bit_depth: u8) -> ImageInfo {
    ImageInfo { width: 1, height: 1, bit_depth, color_type, interlaced: false }
  }

  #[test]
  fn indexed_trns_keeps_per_entry_alpha() {
    let data = [0, 128, 255];
    let t = parse_trns(&data, &info(ColorType::Palette, 8), 3).unwrap();
    assert_eq!(t, TransparencyInfo::Indexed(vec![0, 128, 255]));
  }

  #[test]
  fn indexed_trns_longer_than_the_palette_is_truncated() {
    let data = [10, 20, 30, 40, 50];
    let t = parse_trns(&data, &info(ColorType::Palette, 8), 2).unwrap();
    assert_eq!(t, TransparencyInfo::Indexed(vec![10, 20]));
  }

  #[test]
  fn gray_trns_reads_one_sample() {
    let data = [0x01, 0x02];
    let t = parse_trns(&data, &info(ColorType::Gray, 16), 0).unwrap();
    assert_eq!(t, TransparencyInfo::Gray16(0x0102));
  }

  #[test]
  fn rgb_trns_reads_three_samples() {
    let data = [0, 1, 0, 2, 0, 3];
    let t = parse_trns(&data, &info(ColorType::Rgb, 8), 0).unwrap();
    assert_eq!(t, TransparencyInfo::Rgb16 { r: 1, g: 2, b: 3 });
  }

  #[test]
  fn rejects_trns_on_alpha_carrying_color_types() {
    assert!(parse_trns(&[], &info(ColorType::Rgba, 8), 0).is_err());
    assert!(parse_trns(&[], &info(ColorType::GrayAlpha, 8), 0).is_err());
  }
}
