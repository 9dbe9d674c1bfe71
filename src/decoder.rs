//! The push-style decoder: feed it bytes, it calls you back.

use crate::byte_reader::fill_buffer;
use crate::crc32::png_crc;
use crate::error::DecodeError;
use crate::gama::{self, parse_gama};
use crate::idat::IdatPipeline;
use crate::ihdr::{parse_ihdr, ImageInfo};
use crate::filter::reconstruct_scanline;
use crate::plte::parse_plte;
use crate::text::parse_text;
use crate::transform::transform_scanline;
use crate::trns::{parse_trns, TransparencyInfo};
use crate::ztxt::parse_ztxt;
use crate::PNG_SIGNATURE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
  Signature,
  ChunkHeader,
  ChunkData,
  ChunkCrc,
}

/// 5.6 Chunk ordering: a forward-only state machine over which critical
/// chunks have been seen so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ChunkState {
  None,
  Ihdr,
  Plte,
  Idat,
  Iend,
}

/// A streaming, push-style PNG decoder.
///
/// Bytes are handed to [`Decoder::write`] in whatever slices are
/// convenient for the caller; the decoder advances its internal state
/// machine and invokes whichever callbacks are registered as soon as it has
/// enough information to do so. Once `write` returns an error the decoder
/// is dead: every subsequent call returns a clone of that same error.
pub struct Decoder<'cb> {
  info_cb: Option<Box<dyn FnMut(&ImageInfo) + 'cb>>,
  row_cb: Option<Box<dyn FnMut(u32, &[u8]) + 'cb>>,
  text_cb: Option<Box<dyn FnMut(&str, &[u8]) + 'cb>>,
  unknown_chunk_cb: Option<Box<dyn FnMut([u8; 4], &[u8]) + 'cb>>,

  frame_state: FrameState,
  in_buf: [u8; 8],
  in_len: usize,

  chunk_state: ChunkState,
  chunk_len: u32,
  chunk_type: [u8; 4],
  chunk_buf: Vec<u8>,

  info: Option<ImageInfo>,
  palette: Vec<[u8; 3]>,
  gamma: u32,
  trans: Option<TransparencyInfo>,

  idat: IdatPipeline,
  scanline_buf: [Vec<u8>; 2],
  scanline_cur: usize,
  scanline_row: u32,
  /// bytes of the current scanline (stride, filter byte included) already filled.
  scanline_have: usize,

  dead: Option<DecodeError>,
}

impl<'cb> Default for Decoder<'cb> {
  fn default() -> Self {
    Self::new()
  }
}

impl<'cb> Decoder<'cb> {
  /// Creates a decoder with no callbacks registered. Calling `write`
  /// before registering at least a row callback is legal, it just means
  /// decoded pixels go nowhere.
  pub fn new() -> Self {
    Self {
      info_cb: None,
      row_cb: None,
      text_cb: None,
      unknown_chunk_cb: None,
      frame_state: FrameState::Signature,
      in_buf: [0; 8],
      in_len: 0,
      chunk_state: ChunkState::None,
      chunk_len: 0,
      chunk_type: [0; 4],
      chunk_buf: Vec::new(),
      info: None,
      palette: Vec::new(),
      gamma: 0,
      trans: None,
      idat: IdatPipeline::new(),
      scanline_buf: [Vec::new(), Vec::new()],
      scanline_cur: 0,
      scanline_row: 0,
      scanline_have: 0,
      dead: None,
    }
  }

  /// Registers the callback fired once, right before row 0 is emitted (so
  /// any `PLTE`/`gAMA`/`tRNS` between `IHDR` and the first `IDAT` have
  /// already been parsed and are visible from the callback).
  pub fn set_info_callback(&mut self, f: impl FnMut(&ImageInfo) + 'cb) {
    self.info_cb = Some(Box::new(f));
  }

  /// Registers the callback fired once per fully-reconstructed, untransformed scanline.
  pub fn set_row_callback(&mut self, f: impl FnMut(u32, &[u8]) + 'cb) {
    self.row_cb = Some(Box::new(f));
  }

  /// Registers the callback fired for each `tEXt`/`zTXt` chunk, after any
  /// `zTXt` payload has been inflated.
  pub fn set_text_callback(&mut self, f: impl FnMut(&str, &[u8]) + 'cb) {
    self.text_cb = Some(Box::new(f));
  }

  /// Registers the callback fired for any chunk type this decoder does not
  /// otherwise interpret.
  pub fn set_unknown_chunk_callback(&mut self, f: impl FnMut([u8; 4], &[u8]) + 'cb) {
    self.unknown_chunk_cb = Some(Box::new(f));
  }

  /// The image's dimensions and pixel format, valid after the info callback fires.
  pub fn info(&self) -> Option<&ImageInfo> {
    self.info.as_ref()
  }

  /// The palette read from `PLTE`, if any.
  pub fn palette(&self) -> &[[u8; 3]] {
    &self.palette
  }

  /// True if a `gAMA` chunk with a nonzero value was seen.
  pub fn has_gamma(&self) -> bool {
    self.gamma > 0
  }

  /// The image gamma as a float, or `None` if absent.
  pub fn gamma(&self) -> Option<f32> {
    self.has_gamma().then(|| gama::gamma_as_f32(self.gamma))
  }

  /// The transparency data read from `tRNS`, if any.
  pub fn transparency(&self) -> Option<&TransparencyInfo> {
    self.trans.as_ref()
  }

  /// Transforms `row` using this decoder's own stored info, palette and
  /// transparency, as a convenience over the free function
  /// [`transform_scanline`].
  pub fn transform_row(&self, row: &[u8], out: &mut [u8]) -> Result<(), DecodeError> {
    let info = self.info.as_ref().ok_or(DecodeError::BadAttribute("no IHDR seen yet"))?;
    transform_scanline(info, Some(&self.palette), self.trans.as_ref(), row, out)
  }

  /// Feeds `bytes` into the decoder. An empty slice signals end-of-stream:
  /// the decoder checks that it reached `IEND` and returns `Eof` if not.
  ///
  /// Once this returns `Err`, the decoder is dead and every later call
  /// returns a clone of the same error without doing any further work.
  pub fn write(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
    if let Some(err) = &self.dead {
      return Err(DecodeError::AlreadyDead(Box::new(err.clone())));
    }
    let result = self.write_inner(bytes);
    if let Err(err) = &result {
      self.dead = Some(err.clone());
    }
    result
  }

  fn write_inner(&mut self, mut bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.is_empty() {
      return if self.chunk_state == ChunkState::Iend {
        Ok(())
      } else {
        Err(DecodeError::Eof)
      };
    }
    while !bytes.is_empty() {
      match self.frame_state {
        FrameState::Signature => {
          let used = fill_buffer(&mut self.in_buf, &mut self.in_len, 8, bytes);
          bytes = &bytes[used..];
          if self.in_len == 8 {
            if self.in_buf != PNG_SIGNATURE {
              return Err(DecodeError::BadSignature);
            }
            self.in_len = 0;
            self.frame_state = FrameState::ChunkHeader;
          }
        }
        FrameState::ChunkHeader => {
          let used = fill_buffer(&mut self.in_buf[..8], &mut self.in_len, 8, bytes);
          bytes = &bytes[used..];
          if self.in_len == 8 {
            let len = u32::from_be_bytes([self.in_buf[0], self.in_buf[1], self.in_buf[2], self.in_buf[3]]);
            if len & 0x8000_0000 != 0 {
              return Err(DecodeError::BadAttribute("chunk length must fit in a signed i32"));
            }
            self.chunk_len = len;
            self.chunk_type = [self.in_buf[4], self.in_buf[5], self.in_buf[6], self.in_buf[7]];
            self.in_len = 0;
            self.chunk_buf.clear();
            self
              .chunk_buf
              .try_reserve_exact(len as usize)
              .map_err(|_| DecodeError::AllocFailed)?;
            self.frame_state = FrameState::ChunkData;
          }
        }
        FrameState::ChunkData => {
          let want = self.chunk_len as usize;
          let have = self.chunk_buf.len();
          let take = (want - have).min(bytes.len());
          self.chunk_buf.extend_from_slice(&bytes[..take]);
          bytes = &bytes[take..];
          if self.chunk_buf.len() == want {
            self.in_len = 0;
            self.frame_state = FrameState::ChunkCrc;
          }
        }
        FrameState::ChunkCrc => {
          let used = fill_buffer(&mut self.in_buf[..4], &mut self.in_len, 4, bytes);
          bytes = &bytes[used..];
          if self.in_len == 4 {
            let claimed = u32::from_be_bytes([self.in_buf[0], self.in_buf[1], self.in_buf[2], self.in_buf[3]]);
            let actual = png_crc(self.chunk_type, &self.chunk_buf);
            if claimed != actual {
              return Err(DecodeError::BadCrc { chunk_type: self.chunk_type });
            }
            self.process_chunk()?;
            self.in_len = 0;
            self.frame_state = FrameState::ChunkHeader;
          }
        }
      }
    }
    Ok(())
  }

  fn process_chunk(&mut self) -> Result<(), DecodeError> {
    let chunk_type = self.chunk_type;
    let data = core::mem::take(&mut self.chunk_buf);
    let result = self.dispatch_chunk(chunk_type, &data);
    self.chunk_buf = data;
    result
  }

  fn dispatch_chunk(&mut self, chunk_type: [u8; 4], data: &[u8]) -> Result<(), DecodeError> {
    match &chunk_type {
      b"IHDR" => {
        if self.chunk_state != ChunkState::None {
          return Err(DecodeError::BadAttribute("IHDR must be the first chunk"));
        }
        let info = parse_ihdr(data)?;
        let stride = info.stride();
        self.scanline_buf[0].clear();
        self.scanline_buf[1].clear();
        for buf in &mut self.scanline_buf {
          buf.try_reserve_exact(stride).map_err(|_| DecodeError::AllocFailed)?;
          buf.resize(stride, 0);
        }
        self.scanline_row = 0;
        self.scanline_have = 0;
        self.scanline_cur = 0;
        self.info = Some(info);
        self.chunk_state = ChunkState::Ihdr;
        Ok(())
      }
      b"PLTE" => {
        if self.chunk_state != ChunkState::Ihdr {
          return Err(DecodeError::BadAttribute("PLTE must follow IHDR and precede IDAT"));
        }
        let info = self.info.as_ref().ok_or(DecodeError::BadAttribute("PLTE before IHDR"))?;
        self.palette = parse_plte(data, info)?;
        self.chunk_state = ChunkState::Plte;
        Ok(())
      }
      b"tRNS" => {
        if self.chunk_state != ChunkState::Ihdr && self.chunk_state != ChunkState::Plte {
          return Err(DecodeError::BadAttribute("tRNS must follow IHDR/PLTE and precede IDAT"));
        }
        let info = self.info.as_ref().ok_or(DecodeError::BadAttribute("tRNS before IHDR"))?;
        if info.color_type == crate::ihdr::ColorType::Palette && self.chunk_state != ChunkState::Plte {
          return Err(DecodeError::BadAttribute("indexed tRNS must follow PLTE"));
        }
        self.trans = Some(parse_trns(data, info, self.palette.len())?);
        Ok(())
      }
      b"gAMA" => {
        if self.chunk_state != ChunkState::Ihdr {
          return Err(DecodeError::BadAttribute("gAMA must follow IHDR and precede PLTE/IDAT"));
        }
        self.gamma = parse_gama(data)?;
        Ok(())
      }
      b"IDAT" => {
        match self.chunk_state {
          ChunkState::Ihdr | ChunkState::Plte | ChunkState::Idat => {}
          _ => return Err(DecodeError::BadAttribute("IDAT out of order")),
        }
        let info = self
          .info
          .clone()
          .ok_or(DecodeError::BadAttribute("IDAT before IHDR"))?;
        if info.color_type == crate::ihdr::ColorType::Palette && self.palette.is_empty() {
          return Err(DecodeError::BadAttribute("indexed image has no PLTE"));
        }
        self.chunk_state = ChunkState::Idat;
        self.feed_idat(&info, data)
      }
      b"IEND" => {
        if self.chunk_state != ChunkState::Idat {
          return Err(DecodeError::BadAttribute("IEND seen before any IDAT"));
        }
        if !data.is_empty() {
          return Err(DecodeError::BadAttribute("IEND must be empty"));
        }
        let info = self.info.as_ref().ok_or(DecodeError::BadAttribute("IEND before IHDR"))?;
        if self.scanline_row != info.height {
          return Err(DecodeError::Eof);
        }
        if !self.idat.is_finished() {
          return Err(DecodeError::ZlibError);
        }
        self.chunk_state = ChunkState::Iend;
        Ok(())
      }
      b"tEXt" => {
        let (keyword, text) = parse_text(data)?;
        self.fire_text(keyword, text);
        Ok(())
      }
      b"zTXt" => {
        let (keyword, text) = parse_ztxt(data)?;
        self.fire_text(keyword, &text);
        Ok(())
      }
      b"pHYs" => {
        if data.len() != 9 {
          return Err(DecodeError::BadAttribute("pHYs must be 9 bytes"));
        }
        Ok(())
      }
      b"cHRM" | b"sBIT" | b"bKGD" | b"hIST" | b"tIME" => {
        #[cfg(feature = "log")]
        log::trace!("ignoring ancillary chunk {:?}", core::str::from_utf8(&chunk_type));
        Ok(())
      }
      other => {
        let ancillary = other[0].is_ascii_lowercase();
        if !ancillary {
          return Err(DecodeError::BadAttribute("unknown critical chunk"));
        }
        #[cfg(feature = "log")]
        log::warn!("unknown ancillary chunk {:?}", core::str::from_utf8(other));
        if let Some(cb) = &mut self.unknown_chunk_cb {
          cb(chunk_type, data);
        }
        Ok(())
      }
    }
  }

  fn fire_text(&mut self, keyword: &[u8], text: &[u8]) {
    if let Some(cb) = &mut self.text_cb {
      // Keywords are restricted to Latin-1; treat non-ASCII as lossy so a
      // hostile/unusual keyword can't panic the caller's callback site.
      let keyword_str = core::str::from_utf8(keyword).unwrap_or("");
      cb(keyword_str, text);
    }
  }

  fn feed_idat(&mut self, info: &ImageInfo, data: &[u8]) -> Result<(), DecodeError> {
    let stride = info.stride();
    let total_rows = info.height;
    self.drive_inflate(info, data, stride, total_rows)
  }

  fn drive_inflate(&mut self, info: &ImageInfo, data: &[u8], stride: usize, total_rows: u32) -> Result<(), DecodeError> {
    let mut pending_error: Option<DecodeError> = None;
    let scanline_cur = &mut self.scanline_cur;
    let scanline_buf = &mut self.scanline_buf;
    let scanline_have = &mut self.scanline_have;
    let scanline_row = &mut self.scanline_row;
    let row_cb = &mut self.row_cb;
    let info_cb = &mut self.info_cb;
    self.idat.push(data, |chunk| {
      let mut chunk = chunk;
      while !chunk.is_empty() {
        if *scanline_row >= total_rows {
          pending_error = Some(DecodeError::BadAttribute("more scanlines than IHDR declared"));
          return;
        }
        let cur = *scanline_cur;
        let have = *scanline_have;
        let want = stride - have;
        let take = want.min(chunk.len());
        scanline_buf[cur][have..have + take].copy_from_slice(&chunk[..take]);
        *scanline_have += take;
        chunk = &chunk[take..];
        if *scanline_have == stride {
          let prev = 1 - cur;
          let filter_type = scanline_buf[cur][0];
          let bpp = info.bytes_per_pixel();
          // reconstruct using two disjoint mutable/immutable halves of the pair.
          let (a, b) = scanline_buf.split_at_mut(1);
          let (cur_slice, prev_slice) = if cur == 0 {
            (&mut a[0][1..], &b[0][1..])
          } else {
            (&mut b[0][1..], &a[0][1..])
          };
          if let Err(e) = reconstruct_scanline(filter_type, cur_slice, prev_slice, bpp) {
            pending_error = Some(e);
            return;
          }
          if *scanline_row == 0 {
            if let Some(cb) = info_cb {
              cb(info);
            }
          }
          if let Some(cb) = row_cb {
            cb(*scanline_row, &scanline_buf[cur][1..]);
          }
          *scanline_row += 1;
          *scanline_have = 0;
          *scanline_cur = prev;
        }
      }
    })?;
    if let Some(e) = pending_error {
      return Err(e);
    }
    Ok(())
  }
}
