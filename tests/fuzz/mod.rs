use sfpng::Decoder;

#[test]
fn random_bytes_never_panic_the_decoder() {
  // Totally random data should never panic the decoder; it should just
  // return some `Err` (almost always `BadSignature`, since random data
  // basically never starts with the real signature).
  for _ in 0..20 {
    let v = super::rand_bytes(1024);
    let mut decoder = Decoder::new();
    let _ = decoder.write(&v);
  }
}

#[test]
fn random_bytes_after_a_valid_signature_never_panic() {
  // A valid signature followed by garbage should also never panic, even
  // though it gets further into the state machine before failing.
  for _ in 0..20 {
    let mut v = sfpng::PNG_SIGNATURE.to_vec();
    v.extend(super::rand_bytes(1024));
    let mut decoder = Decoder::new();
    let _ = decoder.write(&v);
  }
}

#[test]
fn feeding_one_byte_at_a_time_never_panics() {
  let mut v = sfpng::PNG_SIGNATURE.to_vec();
  v.extend(super::rand_bytes(256));
  let mut decoder = Decoder::new();
  for byte in &v {
    if decoder.write(core::slice::from_ref(byte)).is_err() {
      break;
    }
  }
}
