//! Streaming inflate of the concatenated `IDAT` stream.

use miniz_oxide::inflate::stream::{inflate, InflateState};
use miniz_oxide::inflate::TINFLStatus;
use miniz_oxide::{DataFormat, MZFlush};

use crate::error::DecodeError;

/// Bytes of scratch space used to receive one round of decompressed output.
/// Arbitrary: `InflateState` keeps the sliding dictionary window needed for
/// back-references internally, so this buffer doesn't need to persist
/// between calls, only be big enough to make reasonable progress per call.
const SCRATCH_LEN: usize = 4096;

/// Wraps the inflate state needed to decompress `IDAT` data incrementally,
/// one push at a time, without ever holding the whole compressed or
/// decompressed stream in memory at once.
pub(crate) struct IdatPipeline {
  state: Box<InflateState>,
  scratch: Box<[u8; SCRATCH_LEN]>,
  finished: bool,
}
impl IdatPipeline {
  pub(crate) fn new() -> Self {
    Self {
      state: InflateState::new_boxed(DataFormat::Zlib),
      scratch: Box::new([0u8; SCRATCH_LEN]),
      finished: false,
    }
  }

  /// Feeds `input` through the inflate engine, calling `emit` with each
  /// nonempty span of decompressed bytes as it becomes available.
  ///
  /// Loops internally until all of `input` has been consumed, matching the
  /// source's `process_image_data_chunk`, which refeeds the output window
  /// every time it fills rather than requiring one call per output buffer.
  pub(crate) fn push(&mut self, mut input: &[u8], mut emit: impl FnMut(&[u8])) -> Result<(), DecodeError> {
    if self.finished {
      return if input.is_empty() { Ok(()) } else { Err(DecodeError::ZlibError) };
    }
    loop {
      let result = inflate(&mut self.state, input, &mut *self.scratch, MZFlush::None);
      if result.bytes_written > 0 {
        emit(&self.scratch[..result.bytes_written]);
      }
      input = &input[result.bytes_consumed..];
      match result.status {
        Ok(TINFLStatus::Done) => {
          self.finished = true;
          return Ok(());
        }
        Ok(TINFLStatus::NeedsMoreInput) => return Ok(()),
        Ok(TINFLStatus::HasMoreOutput) => continue,
        _ => return Err(DecodeError::ZlibError),
      }
    }
  }

  /// True once the inflate stream has reached its natural end.
  pub(crate) fn is_finished(&self) -> bool {
    self.finished
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn zlib_compress(data: &[u8]) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(data, 6)
  }

  #[test]
  fn inflates_in_one_shot() {
    let compressed = zlib_compress(b"hello world, this is scanline data");
    let mut pipeline = IdatPipeline::new();
    let mut collected = Vec::new();
    pipeline.push(&compressed, |bytes| collected.extend_from_slice(bytes)).unwrap();
    assert_eq!(collected, b"hello world, this is scanline data");
  }

  #[test]
  fn inflates_when_fed_one_byte_at_a_time() {
    let original = b"the quick brown fox jumps over the lazy dog, repeated. the quick brown fox jumps over the lazy dog.";
    let compressed = zlib_compress(original);
    let mut pipeline = IdatPipeline::new();
    let mut collected = Vec::new();
    for byte in &compressed {
      pipeline.push(core::slice::from_ref(byte), |bytes| collected.extend_from_slice(bytes)).unwrap();
    }
    assert_eq!(collected, original);
  }

  #[test]
  fn rejects_garbage_input() {
    let mut pipeline = IdatPipeline::new();
    let result = pipeline.push(&[0xff, 0xff, 0xff, 0xff], |_| {});
    assert!(result.is_err());
  }

  #[test]
  fn is_finished_reflects_stream_end() {
    let compressed = zlib_compress(b"x");
    let mut pipeline = IdatPipeline::new();
    assert!(!pipeline.is_finished());
    pipeline.push(&compressed, |_| {}).unwrap();
    assert!(pipeline.is_finished());
  }
}
