// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Encode pipeline: keystream, then the selected embedding scheme.
//!
//! 1. Reject empty messages (every decoder reads length 0 as "nothing here").
//! 2. XOR the UTF-8 message bytes with the key.
//! 3. Embed with the chosen [`Method`]:
//!    - `BitmapLsb`: parse the bitmap, write a Generation C bitstream into
//!      the plane LSBs, re-serialize as 24-bit BMP.
//!    - `Wavelet`: parse the bitmap, embed into the Haar detail subbands of
//!      the configured channel, read the exported plane back, re-serialize.
//!    - `AppendNew` / `AppendLegacy`: carrier bytes untouched, frame appended.
//!
//! Every capacity check runs before the carrier copy is modified.

use log::{debug, warn};

use crate::bmp::PixelPlane;
use crate::config::StegoConfig;
use crate::stego::cipher::Keystream;
use crate::stego::error::StegoError;
use crate::stego::{frame, lsb, wavelet, Method};

/// Encode `message` into `carrier` with the default configuration.
///
/// # Errors
/// - [`StegoError::EmptyMessage`] if `message` is empty.
/// - [`StegoError::InvalidBitmap`] if a pixel method is used on a carrier
///   that is not a supported bitmap.
/// - [`StegoError::CapacityExceeded`] if the message does not fit.
/// - [`StegoError::SampleRangeExceeded`] if a wavelet payload would not
///   survive the 8-bit bitmap export.
pub fn encode(carrier: &[u8], message: &str, key: &str, method: Method) -> Result<Vec<u8>, StegoError> {
    encode_with_config(carrier, message, key, method, &StegoConfig::default())
}

/// Encode `message` into `carrier` using `config` for method parameters.
pub fn encode_with_config(
    carrier: &[u8],
    message: &str,
    key: &str,
    method: Method,
    config: &StegoConfig,
) -> Result<Vec<u8>, StegoError> {
    config.validate()?;
    if message.is_empty() {
        return Err(StegoError::EmptyMessage);
    }

    let mut payload = message.as_bytes().to_vec();
    Keystream::new(key).apply(&mut payload);
    debug!("encode: {} payload bytes via {method}", payload.len());

    match method {
        Method::BitmapLsb => {
            let mut plane = PixelPlane::from_bytes(carrier)?;
            lsb::encode_lsb(&mut plane, &payload, &config.lsb)?;
            Ok(plane.to_bytes())
        }
        Method::Wavelet => {
            let plane = PixelPlane::from_bytes(carrier)?;
            let stego = wavelet::embed_in_plane(&plane, &payload, config.wavelet_channel).map_err(|e| {
                if e == StegoError::SampleRangeExceeded {
                    warn!("wavelet payload does not survive 8-bit export, nothing written");
                }
                e
            })?;
            Ok(stego.to_bytes())
        }
        Method::AppendNew => append(carrier, frame::build_append_frame(&payload)?),
        Method::AppendLegacy => append(carrier, frame::build_legacy_frame(&payload)?),
    }
}

fn append(carrier: &[u8], frame: Vec<u8>) -> Result<Vec<u8>, StegoError> {
    let mut out = Vec::with_capacity(carrier.len() + frame.len());
    out.extend_from_slice(carrier);
    out.extend_from_slice(&frame);
    Ok(out)
}
