// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Steganographic encoding and decoding pipelines.
//!
//! Four embedding methods share one keystream (repeating-key XOR over the
//! UTF-8 message):
//!
//! - **Bitmap LSB** (`Method::BitmapLsb`): length-prefixed bitstream in the
//!   low bits of every RGB byte of a bitmap carrier.
//! - **Wavelet** (`Method::Wavelet`): transformed bytes in the detail
//!   subbands of a single-level Haar decomposition of one channel.
//! - **Append** (`Method::AppendNew`): start/end-marked frame appended after
//!   the carrier bytes. Works with any container.
//! - **Legacy append** (`Method::AppendLegacy`): the older `STEGO` frame,
//!   still written on request and always read.
//!
//! [`smart_decode`] auto-detects the method by trying the candidates in a
//! fixed order: bitmap LSB, append, legacy append. Wavelet carriers are read
//! with [`wavelet_decode`] since their metadata slots cannot be told apart
//! from ordinary image content.

pub mod error;
pub mod cipher;
pub mod frame;
pub mod lsb;
pub mod wavelet;
pub mod capacity;
mod pipeline;

use std::fmt;
use std::str::FromStr;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bmp::PixelPlane;
use crate::config::StegoConfig;
use cipher::Keystream;

pub use error::StegoError;
pub use pipeline::{encode, encode_with_config};
pub use capacity::{append_capacity, estimate_capacity, lsb_capacity, wavelet_capacity};
pub use lsb::{psnr, LsbParams, PSNR_IDENTICAL};

/// Embedding method, also reported as the tag of a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Method {
    #[default]
    BitmapLsb,
    Wavelet,
    AppendNew,
    AppendLegacy,
}

impl Method {
    pub const ALL: [Method; 4] = [Method::BitmapLsb, Method::Wavelet, Method::AppendNew, Method::AppendLegacy];

    /// Stable short name, used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BitmapLsb => "bitmap-lsb",
            Self::Wavelet => "wavelet",
            Self::AppendNew => "append-new",
            Self::AppendLegacy => "append-legacy",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(StegoError::InvalidParams("unknown method (bitmap-lsb, wavelet, append-new, append-legacy)"))
    }
}

/// A recovered message and the method that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub method: Method,
}

/// One decode strategy: carrier in, still-keyed payload out.
type Attempt = fn(&[u8], &StegoConfig) -> Result<Vec<u8>, StegoError>;

/// Decode candidates in precedence order.
const CANDIDATES: [(Method, Attempt); 3] = [
    (Method::BitmapLsb, try_bitmap_lsb),
    (Method::AppendNew, try_append_new),
    (Method::AppendLegacy, try_append_legacy),
];

fn try_bitmap_lsb(carrier: &[u8], config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    let plane = PixelPlane::from_bytes(carrier)?;
    lsb::decode_lsb(&plane, &config.lsb)
}

fn try_append_new(carrier: &[u8], _config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    frame::parse_append_frame(carrier).map(<[u8]>::to_vec)
}

fn try_append_legacy(carrier: &[u8], _config: &StegoConfig) -> Result<Vec<u8>, StegoError> {
    frame::parse_legacy_frame(carrier).map(<[u8]>::to_vec)
}

/// Unified decode with the default configuration.
///
/// Tries bitmap LSB, then the append frame, then the legacy append frame.
/// The first candidate that yields a payload wins; later candidates are not
/// consulted even if they would also succeed.
///
/// # Errors
/// - [`StegoError::NotFound`] if no candidate finds a message.
/// - [`StegoError::InvalidUtf8`] if the winning payload does not decode as
///   UTF-8 under `key`.
pub fn smart_decode(carrier: &[u8], key: &str) -> Result<Decoded, StegoError> {
    decode_with_config(carrier, key, &StegoConfig::default())
}

/// Unified decode using `config` for the LSB parameters.
pub fn decode_with_config(carrier: &[u8], key: &str, config: &StegoConfig) -> Result<Decoded, StegoError> {
    config.validate()?;
    let (method, payload) = first_success(carrier, config)?;
    let text = unkey(payload, key)?;
    info!("decoded {} bytes via {method}", text.len());
    Ok(Decoded { text, method })
}

/// Serial candidate loop (default build).
#[cfg(not(feature = "parallel"))]
fn first_success(carrier: &[u8], config: &StegoConfig) -> Result<(Method, Vec<u8>), StegoError> {
    for (method, attempt) in CANDIDATES {
        match attempt(carrier, config) {
            Ok(payload) => return Ok((method, payload)),
            Err(e) => debug!("{method} candidate failed: {e}"),
        }
    }
    Err(StegoError::NotFound)
}

/// Parallel candidate evaluation via rayon.
///
/// All candidates run concurrently; the result is still chosen by the fixed
/// precedence order, so the outcome matches the serial build.
#[cfg(feature = "parallel")]
fn first_success(carrier: &[u8], config: &StegoConfig) -> Result<(Method, Vec<u8>), StegoError> {
    use rayon::prelude::*;

    let results: Vec<(Method, Result<Vec<u8>, StegoError>)> = CANDIDATES
        .par_iter()
        .map(|&(method, attempt)| (method, attempt(carrier, config)))
        .collect();

    for (method, result) in results {
        match result {
            Ok(payload) => return Ok((method, payload)),
            Err(e) => debug!("{method} candidate failed: {e}"),
        }
    }
    Err(StegoError::NotFound)
}

/// Decode a wavelet-embedded message from a bitmap carrier.
///
/// # Errors
/// - [`StegoError::InvalidBitmap`] if `carrier` is not a supported bitmap.
/// - [`StegoError::NotFound`] / [`StegoError::Malformed`] from the slot checks.
/// - [`StegoError::InvalidUtf8`] if the payload does not decode under `key`.
pub fn wavelet_decode(carrier: &[u8], key: &str, config: &StegoConfig) -> Result<Decoded, StegoError> {
    let plane = PixelPlane::from_bytes(carrier)?;
    let payload = wavelet::extract_from_plane(&plane, config.wavelet_channel)?;
    let text = unkey(payload, key)?;
    Ok(Decoded { text, method: Method::Wavelet })
}

fn unkey(mut payload: Vec<u8>, key: &str) -> Result<String, StegoError> {
    Keystream::new(key).apply(&mut payload);
    String::from_utf8(payload).map_err(|_| StegoError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: u32, height: u32) -> Vec<u8> {
        let rgb = (0..width * height * 3).map(|i| (i * 29 % 256) as u8).collect();
        PixelPlane::new(width, height, rgb).unwrap().to_bytes()
    }

    #[test]
    fn method_names_roundtrip() {
        for m in Method::ALL {
            assert_eq!(m.as_str().parse::<Method>().unwrap(), m);
        }
        assert!("bogus".parse::<Method>().is_err());
    }

    #[test]
    fn decode_each_method_with_key() {
        let bmp = bitmap(24, 24);
        for m in [Method::BitmapLsb, Method::AppendNew, Method::AppendLegacy] {
            let stego = encode(&bmp, "per-method message", "s3cret", m).unwrap();
            let out = smart_decode(&stego, "s3cret").unwrap();
            assert_eq!(out.text, "per-method message");
            assert_eq!(out.method, m);
        }
    }

    #[test]
    fn lsb_wins_over_appended_legacy() {
        let bmp = bitmap(24, 24);
        let lsb = encode(&bmp, "from pixels", "", Method::BitmapLsb).unwrap();
        let both = encode(&lsb, "from tail", "", Method::AppendLegacy).unwrap();
        let out = smart_decode(&both, "").unwrap();
        assert_eq!(out.text, "from pixels");
        assert_eq!(out.method, Method::BitmapLsb);
    }

    #[test]
    fn nothing_found() {
        assert_eq!(smart_decode(b"just some bytes", ""), Err(StegoError::NotFound));
        let clean = PixelPlane::filled(16, 16, [0, 0, 0]).unwrap().to_bytes();
        assert_eq!(smart_decode(&clean, ""), Err(StegoError::NotFound));
    }

    #[test]
    fn non_bitmap_falls_through_to_append() {
        let stego = encode(b"\x89PNG\r\n\x1a\nrest", "png tail", "", Method::AppendNew).unwrap();
        let out = smart_decode(&stego, "").unwrap();
        assert_eq!(out.method, Method::AppendNew);
        assert_eq!(out.text, "png tail");
    }

    #[test]
    fn wrong_key_with_non_ascii_is_invalid_utf8() {
        let stego = encode(b"", "é", "", Method::AppendNew).unwrap();
        // 0xC3 ^ 'A' = 0x82, a continuation byte with no lead byte.
        assert_eq!(smart_decode(&stego, "A"), Err(StegoError::InvalidUtf8));
        assert_eq!(smart_decode(&stego, "").unwrap().text, "é");
    }

    #[test]
    fn wavelet_decode_needs_bitmap() {
        assert!(matches!(
            wavelet_decode(b"nope", "", &StegoConfig::default()),
            Err(StegoError::InvalidBitmap(_))
        ));
    }
}
