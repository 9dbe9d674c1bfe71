//! The `IHDR` chunk: image dimensions, bit depth, and color type.

use crate::color_mask;
use crate::error::DecodeError;

/// The color type byte from `IHDR`, decoded into a Rust enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ColorType {
  /// Grayscale, one channel.
  Gray = 0,
  /// Red, Green, Blue.
  Rgb = 2,
  /// Index into the `PLTE` palette.
  Palette = 3,
  /// Grayscale with an alpha channel.
  GrayAlpha = 4,
  /// Red, Green, Blue, Alpha.
  Rgba = 6,
}
impl ColorType {
  /// Number of channels a raw (pre-transform) sample carries.
  #[inline]
  pub const fn channel_count(self) -> usize {
    match self {
      Self::Gray => 1,
      Self::Rgb => 3,
      Self::Palette => 1,
      Self::GrayAlpha => 2,
      Self::Rgba => 4,
    }
  }

  #[inline]
  const fn raw_mask(self) -> u8 {
    self as u8
  }

  /// True if this color type has an alpha channel of its own (not via `tRNS`).
  #[inline]
  pub const fn has_alpha_channel(self) -> bool {
    (self.raw_mask() & color_mask::ALPHA) != 0
  }

  /// True if this color type is paletted.
  #[inline]
  pub const fn is_palette(self) -> bool {
    matches!(self, Self::Palette)
  }
}
impl TryFrom<u8> for ColorType {
  type Error = DecodeError;
  #[inline]
  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Ok(match value {
      0 => Self::Gray,
      2 => Self::Rgb,
      3 => Self::Palette,
      4 => Self::GrayAlpha,
      6 => Self::Rgba,
      _ => return Err(DecodeError::BadAttribute("unknown color type")),
    })
  }
}

/// The image's dimensions and pixel format, as read from `IHDR`.
///
/// Valid to read from the decoder once the info callback has fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
  /// Width in pixels. Never zero for a successfully-parsed `IHDR`.
  pub width: u32,
  /// Height in pixels. Never zero for a successfully-parsed `IHDR`.
  pub height: u32,
  /// Bits per channel: one of 1, 2, 4, 8, 16, restricted further by `color_type`.
  pub bit_depth: u8,
  /// The image's pixel format.
  pub color_type: ColorType,
  /// Always `false`: an `interlace_method` of 1 is rejected at parse time.
  pub interlaced: bool,
}
impl ImageInfo {
  /// Bits needed to store one raw (pre-transform) pixel.
  #[inline]
  pub const fn bits_per_pixel(&self) -> usize {
    self.color_type.channel_count() * (self.bit_depth as usize)
  }

  /// Bytes per unfiltered scanline, filter-type byte not included.
  #[inline]
  pub fn bytes_per_scanline(&self) -> usize {
    (self.bits_per_pixel() * (self.width as usize) + 7) / 8
  }

  /// Bytes per scanline including the leading filter-type byte.
  #[inline]
  pub fn stride(&self) -> usize {
    1 + self.bytes_per_scanline()
  }

  /// Bytes occupied by one raw pixel when `bit_depth >= 8` (the "step" used
  /// by filter reconstruction to look left). For sub-byte depths this is 1.
  #[inline]
  pub fn bytes_per_pixel(&self) -> usize {
    ((self.bits_per_pixel() + 7) / 8).max(1)
  }
}

/// Parses a 13-byte `IHDR` chunk body.
///
/// Rejects any bit depth / color type combination the format doesn't allow,
/// a zero width or height, an unknown compression or filter method, and an
/// `interlace_method` other than 0 (see `DecodeError::NotImplemented`).
pub(crate) fn parse_ihdr(data: &[u8]) -> Result<ImageInfo, DecodeError> {
  let &[w0, w1, w2, w3, h0, h1, h2, h3, bit_depth, color_type, compression_method, filter_method, interlace_method] =
    data
  else {
    return Err(DecodeError::BadAttribute("IHDR must be 13 bytes"));
  };
  let width = u32::from_be_bytes([w0, w1, w2, w3]);
  let height = u32::from_be_bytes([h0, h1, h2, h3]);
  if width == 0 || width >= 0x8000_0000 {
    return Err(DecodeError::BadAttribute("width must be in 1..=2^31-1"));
  }
  if height == 0 || height >= 0x8000_0000 {
    return Err(DecodeError::BadAttribute("height must be in 1..=2^31-1"));
  }
  if compression_method != 0 {
    return Err(DecodeError::BadAttribute("unknown compression method"));
  }
  if filter_method != 0 {
    return Err(DecodeError::BadAttribute("unknown filter method"));
  }
  let color_type = ColorType::try_from(color_type)?;
  let depth_ok = match color_type {
    ColorType::Gray => matches!(bit_depth, 1 | 2 | 4 | 8 | 16),
    ColorType::Rgb => matches!(bit_depth, 8 | 16),
    ColorType::Palette => matches!(bit_depth, 1 | 2 | 4 | 8),
    ColorType::GrayAlpha => matches!(bit_depth, 8 | 16),
    ColorType::Rgba => matches!(bit_depth, 8 | 16),
  };
  if !depth_ok {
    return Err(DecodeError::BadAttribute("illegal bit depth for color type"));
  }
  let interlaced = match interlace_method {
    0 => false,
    1 => return Err(DecodeError::NotImplemented("Adam7 interlacing")),
    _ => return Err(DecodeError::BadAttribute("unknown interlace method")),
  };
  Ok(ImageInfo { width, height, bit_depth, color_type, interlaced })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ihdr_bytes(w: u32, h: u32, depth: u8, color: u8, interlace: u8) -> Vec<u8> {
    let mut v = Vec::with_capacity(13);
    v.extend_from_slice(&w.to_be_bytes());
    v.extend_from_slice(&h.to_be_bytes());
    v.push(depth);
    v.push(color);
    v.push(0);
    v.push(0);
    v.push(interlace);
    v
  }

  #[test]
  fn accepts_every_legal_depth_color_combo() {
    let combos: &[(u8, &[u8])] = &[
      (0, &[1, 2, 4, 8, 16]),
      (2, &[8, 16]),
      (3, &[1, 2, 4, 8]),
      (4, &[8, 16]),
      (6, &[8, 16]),
    ];
    for &(color, depths) in combos {
      for &depth in depths {
        let bytes = ihdr_bytes(4, 4, depth, color, 0);
        assert!(parse_ihdr(&bytes).is_ok(), "color {color} depth {depth} should be legal");
      }
    }
  }

  #[test]
  fn rejects_illegal_depth_for_color_type() {
    let bytes = ihdr_bytes(4, 4, 16, 3, 0);
    assert!(parse_ihdr(&bytes).is_err());
  }

  #[test]
  fn rejects_zero_dimensions() {
    assert!(parse_ihdr(&ihdr_bytes(0, 4, 8, 0, 0)).is_err());
    assert!(parse_ihdr(&ihdr_bytes(4, 0, 8, 0, 0)).is_err());
  }

  #[test]
  fn rejects_interlace_as_not_implemented() {
    let bytes = ihdr_bytes(4, 4, 8, 2, 1);
    assert!(matches!(parse_ihdr(&bytes), Err(DecodeError::NotImplemented(_))));
  }

  #[test]
  fn stride_accounts_for_sub_byte_packing() {
    let info = parse_ihdr(&ihdr_bytes(5, 1, 1, 0, 0)).unwrap();
    // 5 pixels @ 1 bit = 5 bits -> 1 byte, plus the filter byte.
    assert_eq!(info.stride(), 2);
  }
}
