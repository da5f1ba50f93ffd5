// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Repeating-key XOR keystream.
//!
//! Reversible obfuscation of the message bytes before embedding. This is not
//! encryption: the keystream is the key's UTF-8 bytes repeated, so anyone
//! with the carrier and a guess at the key length can recover the message.
//!
//! The cipher is byte-oriented. Text is XORed as its UTF-8 encoding against
//! the key's UTF-8 encoding, so the same definition applies to every scheme
//! and to every character, ASCII or not.

use zeroize::Zeroizing;

/// A repeating XOR keystream.
///
/// Holds a private copy of the key bytes which is wiped on drop.
pub struct Keystream {
    key: Zeroizing<Vec<u8>>,
}

impl Keystream {
    pub fn new(key: &str) -> Self {
        Self { key: Zeroizing::new(key.as_bytes().to_vec()) }
    }

    /// True when the key is empty and [`apply`](Self::apply) is the identity.
    pub fn is_identity(&self) -> bool {
        self.key.is_empty()
    }

    /// XOR `data` in place: `data[i] ^= key[i % key.len()]`.
    pub fn apply(&self, data: &mut [u8]) {
        if self.key.is_empty() {
            return;
        }
        for (byte, k) in data.iter_mut().zip(self.key.iter().cycle()) {
            *byte ^= k;
        }
    }
}

/// XOR a copy of `data` with `key`. Self-inverse: `apply(&apply(x, k), k) == x`.
pub fn apply(data: &[u8], key: &str) -> Vec<u8> {
    let mut out = data.to_vec();
    Keystream::new(key).apply(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_identity() {
        assert_eq!(apply(b"HELLO", ""), b"HELLO");
        assert!(Keystream::new("").is_identity());
    }

    #[test]
    fn single_byte_key() {
        let out = apply(b"HELLO", "K");
        let expected: Vec<u8> = b"HELLO".iter().map(|b| b ^ 0x4B).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn key_repeats() {
        let out = apply(&[0, 0, 0, 0, 0], "ab");
        assert_eq!(out, b"ababa");
    }

    #[test]
    fn self_inverse() {
        let msg = "Grüße, wavelets! \u{1F600}".as_bytes();
        for key in ["", "k", "longer key than message, much longer", "ключ"] {
            let once = apply(msg, key);
            assert_eq!(apply(&once, key), msg, "key {key:?}");
        }
    }

    #[test]
    fn non_ascii_key_uses_utf8_bytes() {
        // 'é' is 0xC3 0xA9 in UTF-8.
        let out = apply(&[0, 0, 0], "é");
        assert_eq!(out, vec![0xC3, 0xA9, 0xC3]);
    }
}
