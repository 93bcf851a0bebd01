pub use ::getrandom::{self, getrandom};
use std::mem::size_of;

pub use oorandom::Rand32;

pub fn init_rand32() -> Result<Rand32, getrandom::Error> {
  let mut seed_bytes = [0u8; size_of::<u64>()];
  getrandom(&mut seed_bytes)?;
  Ok(Rand32::new(u64::from_le_bytes(seed_bytes)))
}

/// Fills `len` bytes with noise scaled to the full `u8` range, the kind of data
/// the demos upload as a placeholder texture.
pub fn random_bytes(rng: &mut Rand32, len: usize) -> Vec<u8> {
  (0..len).map(|_| (rng.rand_float() * u8::MAX as f32) as u8).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn random_bytes_are_deterministic_for_a_seed() {
    let a = random_bytes(&mut Rand32::new(42), 16);
    let b = random_bytes(&mut Rand32::new(42), 16);
    assert_eq!(a.len(), 16);
    assert_eq!(a, b);
  }
}
