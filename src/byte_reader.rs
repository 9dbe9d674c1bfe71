//! A small fixed-capacity cursor used to assemble framing fields (the
//! signature, a chunk header, a chunk's CRC trailer) out of however many
//! bytes happen to arrive in a single `write` call.

/// Copies bytes from `src` into `buf[have..]` until either `buf` reaches
/// `want_len` or `src` is exhausted, advancing both `have` and the slice
/// that `src` points at.
///
/// Returns the number of bytes consumed from `src`. This is the single
/// primitive that makes feeding a decoder one byte at a time and feeding it
/// the whole file at once produce identical results: every framing field is
/// filled through this same routine regardless of how the input is sliced.
pub fn fill_buffer(buf: &mut [u8], have: &mut usize, want_len: usize, src: &[u8]) -> usize {
  debug_assert!(want_len <= buf.len());
  let room = want_len - *have;
  let take = room.min(src.len());
  buf[*have..*have + take].copy_from_slice(&src[..take]);
  *have += take;
  take
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_partially_when_source_is_short() {
    let mut buf = [0u8; 8];
    let mut have = 0usize;
    let used = fill_buffer(&mut buf, &mut have, 8, &[1, 2, 3]);
    assert_eq!(used, 3);
    assert_eq!(have, 3);
    assert_eq!(&buf[..3], &[1, 2, 3]);
  }

  #[test]
  fn stops_at_want_len_even_with_more_source() {
    let mut buf = [0u8; 4];
    let mut have = 0usize;
    let used = fill_buffer(&mut buf, &mut have, 4, &[1, 2, 3, 4, 5, 6]);
    assert_eq!(used, 4);
    assert_eq!(have, 4);
    assert_eq!(buf, [1, 2, 3, 4]);
  }

  #[test]
  fn resumes_from_partial_fill() {
    let mut buf = [0u8; 4];
    let mut have = 0usize;
    fill_buffer(&mut buf, &mut have, 4, &[1, 2]);
    let used = fill_buffer(&mut buf, &mut have, 4, &[3, 4, 5]);
    assert_eq!(used, 2);
    assert_eq!(buf, [1, 2, 3, 4]);
  }
}
