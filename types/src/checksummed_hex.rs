//! Mixed-case checksummed hex encoding of 20-byte addresses following [EIP-55][1].
//!
//! [1]: https://eips.ethereum.org/EIPS/eip-55

use std::ops::RangeInclusive;

use crate::crypto;

/// Returns the lowercase hex encoding of `input` with the letters uppercased wherever the
/// corresponding nibble of the Keccak-256 hash of the lowercase encoding is 8 or higher.
///
/// For input longer than 32 bytes the hash nibbles are cycled.
pub fn encode<T: AsRef<[u8]>>(input: T) -> String {
    let lower = hex::encode(input.as_ref());
    let hash = crypto::keccak256(lower.as_bytes());
    lower
        .bytes()
        .zip(hash_nibbles_cycle(hash))
        .map(|(byte, nibble)| {
            if byte.is_ascii_alphabetic() && nibble >= 8 {
                byte.to_ascii_uppercase() as char
            } else {
                byte as char
            }
        })
        .collect()
}

/// Yields the nibbles of `hash`, high nibble first, repeating forever.
fn hash_nibbles_cycle(hash: [u8; crypto::KECCAK256_LENGTH]) -> impl Iterator<Item = u8> {
    hash.into_iter()
        .flat_map(|byte| [byte >> 4, byte & 0x0f])
        .cycle()
}

/// Returns true if all hex letters in a string are uppercase or all are lowercase.
///
/// Strings without any hex letters count as same case.
fn string_is_same_case<T: AsRef<[u8]>>(s: T) -> bool {
    const LOWER_RANGE: RangeInclusive<u8> = b'a'..=b'f';
    const UPPER_RANGE: RangeInclusive<u8> = b'A'..=b'F';

    let mut chars = s
        .as_ref()
        .iter()
        .filter(|c| LOWER_RANGE.contains(c) || UPPER_RANGE.contains(c));

    match chars.next() {
        Some(first) => {
            let is_upper = UPPER_RANGE.contains(first);
            chars.all(|c| UPPER_RANGE.contains(c) == is_upper)
        }
        None => true,
    }
}

/// Error returned by [`decode`].
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// The input is mixed case, but the casing does not match the checksum.
    #[error("checksum mismatch at character {index}")]
    ChecksumMismatch {
        /// Index of the first character whose case differs from the checksummed encoding.
        index: usize,
    },
}

/// Decodes a hex string (without `0x` prefix), verifying the EIP-55 checksum if the input is
/// mixed case.
///
/// All-lowercase and all-uppercase input carries no checksum and is accepted as is.
pub fn decode<T: AsRef<[u8]>>(input: T) -> Result<Vec<u8>, DecodeError> {
    let bytes = hex::decode(input.as_ref())?;

    if string_is_same_case(input.as_ref()) {
        return Ok(bytes);
    }

    encode(&bytes)
        .bytes()
        .zip(input.as_ref().iter())
        .position(|(expected, &actual)| expected != actual)
        .map_or(Ok(bytes), |index| {
            Err(DecodeError::ChecksumMismatch { index })
        })
}

#[cfg(test)]
mod tests {
    use proptest::{
        collection::vec,
        prelude::{any, prop_assert, prop_assert_eq},
    };
    use proptest_attr_macro::proptest;

    use super::*;

    // Test vectors taken from EIP-55.
    const CHECKSUMMED: [&str; 4] = [
        "5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "fB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "dbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "D1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn should_encode_eip55_vectors() {
        for expected in CHECKSUMMED {
            let bytes = hex::decode(expected).unwrap();
            assert_eq!(encode(bytes), expected);
        }
    }

    #[test]
    fn should_decode_eip55_vectors() {
        for input in CHECKSUMMED {
            assert_eq!(decode(input).unwrap(), hex::decode(input).unwrap());
        }
    }

    #[test]
    fn should_skip_checksum_for_same_case_input() {
        for input in CHECKSUMMED {
            assert!(decode(input.to_lowercase()).is_ok());
            assert!(decode(input.to_uppercase()).is_ok());
        }
    }

    #[test]
    fn should_reject_wrong_checksum() {
        // First letter of the first vector flipped to uppercase.
        let mutated = "5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(
            decode(mutated).unwrap_err(),
            DecodeError::ChecksumMismatch { index: 1 }
        );
    }

    #[test]
    fn should_reject_invalid_hex() {
        assert!(matches!(
            decode("zz").unwrap_err(),
            DecodeError::InvalidHex(_)
        ));
    }

    #[test]
    fn string_is_same_case_no_alphabetic_chars_in_string() {
        assert!(string_is_same_case("424242424242"));
    }

    #[test]
    fn should_cycle_hash_for_long_input() {
        let input = vec![0xab; 33];
        let encoded = encode(&input);
        assert_eq!(encoded.len(), 66);
        assert_eq!(encoded.to_lowercase(), hex::encode(&input));
        assert_eq!(decode(&encoded).unwrap(), input);

        let nibbles: Vec<u8> = hash_nibbles_cycle([0x12; crypto::KECCAK256_LENGTH])
            .skip(62)
            .take(4)
            .collect();
        assert_eq!(nibbles, vec![1, 2, 1, 2]);
    }

    #[test]
    fn should_verify_checksum_past_hash_length() {
        let encoded = encode(vec![0xab; 33]);
        // Flip the case of the last letter, which is checked against a cycled nibble.
        let mut flipped = encoded.into_bytes();
        flipped[65] ^= 0x20;
        let flipped = String::from_utf8(flipped).unwrap();
        if !string_is_same_case(&flipped) {
            assert_eq!(
                decode(&flipped).unwrap_err(),
                DecodeError::ChecksumMismatch { index: 65 }
            );
        }
    }

    #[proptest]
    fn hex_roundtrip(input: Vec<u8>) {
        prop_assert_eq!(&input, &decode(encode(&input)).expect("Failed to decode input."));
    }

    proptest::proptest! {
        #[test]
        fn checksummed_output_is_lowercase_when_lowercased(input in vec(any::<u8>(), 20)) {
            let encoded = encode(&input);
            prop_assert_eq!(encoded.to_lowercase(), hex::encode(&input));
            prop_assert!(decode(encoded.to_uppercase()).is_ok());
        }
    }
}
