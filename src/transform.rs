//! Turns one decoded (unfiltered) scanline into 8-bits-per-channel RGBA.
//!
//! This is a pure function of its inputs: it does not read or write any
//! decoder state, matching how the original source's transform step has no
//! side effects on the decoder beyond producing pixel bytes.

use bitfrob::{u8_bit_split_1x8_rev, u8_bit_split_2x4_rev, u8_bit_split_4x2_rev};

use crate::error::DecodeError;
use crate::ihdr::{ColorType, ImageInfo};
use crate::trns::TransparencyInfo;

/// Scales an N-bit sample up to 8 bits by replicating its high bits, the
/// same "bit replication" scaling the format uses for display.
#[inline]
fn scale_sample(value: u16, bit_depth: u8) -> u8 {
  match bit_depth {
    8 => value as u8,
    16 => (value >> 8) as u8,
    1 => if value != 0 { 0xff } else { 0x00 },
    2 => (value * 0x55) as u8,
    4 => (value * 0x11) as u8,
    _ => unreachable!("bit depths are restricted to 1, 2, 4, 8, 16"),
  }
}

/// Reads raw samples out of `row` for pixel `x`, returning up to four
/// unscaled channel values (padded with 0) and how many channels there are.
fn read_raw_samples(row: &[u8], x: u32, info: &ImageInfo) -> ([u16; 4], usize) {
  let channels = info.color_type.channel_count();
  let mut out = [0u16; 4];
  match info.bit_depth {
    1 | 2 | 4 => {
      let byte = row[(x as usize * info.bit_depth as usize) / 8];
      let bit_index = (x as usize * info.bit_depth as usize) % 8;
      let value = match info.bit_depth {
        1 => u8_bit_split_1x8_rev(byte)[bit_index],
        2 => u8_bit_split_2x4_rev(byte)[bit_index / 2],
        4 => u8_bit_split_4x2_rev(byte)[bit_index / 4],
        _ => unreachable!(),
      };
      out[0] = u16::from(value);
    }
    8 => {
      let base = x as usize * channels;
      for c in 0..channels {
        out[c] = u16::from(row[base + c]);
      }
    }
    16 => {
      let base = x as usize * channels * 2;
      for c in 0..channels {
        out[c] = u16::from_be_bytes([row[base + c * 2], row[base + c * 2 + 1]]);
      }
    }
    _ => unreachable!("bit depths are restricted to 1, 2, 4, 8, 16"),
  }
  (out, channels)
}

/// Transforms one unfiltered scanline into `width * 4` bytes of RGBA8.
///
/// `palette` is required (and indexed) for [`ColorType::Palette`] images;
/// `trans` supplies simple transparency for color types that don't carry
/// their own alpha channel.
pub fn transform_scanline(
  info: &ImageInfo, palette: Option<&[[u8; 3]]>, trans: Option<&TransparencyInfo>, row: &[u8], out: &mut [u8],
) -> Result<(), DecodeError> {
  let expected_out_len = info.width as usize * 4;
  if out.len() != expected_out_len {
    return Err(DecodeError::BadAttribute("output buffer is the wrong size for this row"));
  }

  for x in 0..info.width {
    let (samples, _channels) = read_raw_samples(row, x, info);
    let value = samples[0];

    let (r, g, b, a): (u8, u8, u8, u8) = match info.color_type {
      ColorType::Gray => {
        let gray = scale_sample(value, info.bit_depth);
        let a = match trans {
          Some(TransparencyInfo::Gray16(key)) if *key == value => 0,
          _ => 255,
        };
        (gray, gray, gray, a)
      }
      ColorType::GrayAlpha => {
        let gray = scale_sample(samples[0], info.bit_depth);
        let a = scale_sample(samples[1], info.bit_depth);
        (gray, gray, gray, a)
      }
      ColorType::Rgb => {
        let r = scale_sample(samples[0], info.bit_depth);
        let g = scale_sample(samples[1], info.bit_depth);
        let b = scale_sample(samples[2], info.bit_depth);
        let a = match trans {
          Some(TransparencyInfo::Rgb16 { r: tr, g: tg, b: tb })
            if *tr == samples[0] && *tg == samples[1] && *tb == samples[2] =>
          {
            0
          }
          _ => 255,
        };
        (r, g, b, a)
      }
      ColorType::Rgba => {
        let r = scale_sample(samples[0], info.bit_depth);
        let g = scale_sample(samples[1], info.bit_depth);
        let b = scale_sample(samples[2], info.bit_depth);
        let a = scale_sample(samples[3], info.bit_depth);
        (r, g, b, a)
      }
      ColorType::Palette => {
        let palette = palette.ok_or(DecodeError::BadAttribute("indexed image has no palette"))?;
        let index = value as usize;
        // An index past the end of the palette is tolerated rather than
        // rejected, matching the reference decoder's permissive fallback.
        let [r, g, b] = palette.get(index).copied().unwrap_or([0, 0, 0]);
        let a = match trans {
          Some(TransparencyInfo::Indexed(alphas)) => alphas.get(index).copied().unwrap_or(255),
          _ => 255,
        };
        (r, g, b, a)
      }
    };

    let base = x as usize * 4;
    out[base] = r;
    out[base + 1] = g;
    out[base + 2] = b;
    out[base + 3] = a;
  }
  Ok(())
}
