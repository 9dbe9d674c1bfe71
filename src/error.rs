//! The error type returned from decoder operations.

/// Everything that can go wrong while pushing bytes through a [`Decoder`](crate::Decoder).
///
/// Variant names follow the status taxonomy of the format this crate is
/// modeled on; `SUCCESS` has no analog here since success is just `Ok(())`.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
  /// A `Vec` growth point could not reserve the memory it needed.
  #[error("allocation failed")]
  AllocFailed,

  /// The stream asks for something this decoder does not implement, such as
  /// an interlaced image.
  #[error("not implemented: {0}")]
  NotImplemented(&'static str),

  /// The first 8 bytes of the stream were not the PNG signature.
  #[error("bad PNG signature")]
  BadSignature,

  /// A chunk's CRC-32 did not match the one computed over its type and data.
  #[error("bad CRC for chunk {chunk_type:?}")]
  BadCrc {
    /// The four-character chunk type code.
    chunk_type: [u8; 4],
  },

  /// A chunk appeared out of order, had an illegal length, or otherwise
  /// violated a structural rule of the format.
  #[error("bad attribute: {0}")]
  BadAttribute(&'static str),

  /// The stream ended before the decoder reached a terminal state.
  #[error("unexpected end of stream")]
  Eof,

  /// The inflate engine reported an error decompressing `IDAT` data.
  #[error("zlib/deflate error")]
  ZlibError,

  /// A scanline declared a filter type byte outside `0..=4`.
  #[error("bad filter type byte {0}")]
  BadFilter(u8),

  /// A previous call already put this decoder into a failed state; `write`
  /// is no longer valid. Carries a copy of the error that killed it.
  #[error("decoder already failed: {0}")]
  AlreadyDead(Box<DecodeError>),
}
