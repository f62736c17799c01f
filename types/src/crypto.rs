//! Hashing primitives.

use tiny_keccak::{Hasher, Keccak};

/// Length in bytes of a Keccak-256 digest.
pub const KECCAK256_LENGTH: usize = 32;

/// Returns the Keccak-256 digest of `data`.
pub fn keccak256<T: AsRef<[u8]>>(data: T) -> [u8; KECCAK256_LENGTH] {
    let mut hasher = Keccak::v256();
    hasher.update(data.as_ref());
    let mut output = [0u8; KECCAK256_LENGTH];
    hasher.finalize(&mut output);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_hash_empty_input() {
        assert_eq!(
            hex::encode(keccak256([])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
