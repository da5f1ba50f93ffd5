// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Capacity estimation per embedding method.
//!
//! All figures are in message bytes (UTF-8 bytes of the text). The keystream
//! does not change the length, so the key plays no part here.

use crate::bmp::PixelPlane;
use crate::config::StegoConfig;
use crate::stego::error::StegoError;
use crate::stego::frame::MAX_PAYLOAD_LEN;
use crate::stego::lsb::LsbParams;
use crate::stego::wavelet;
use crate::stego::Method;

/// Maximum message size for bitmap LSB embedding.
///
/// Counts the slots inside the decoder's scan window minus the 32-bit length
/// and, when enabled, the 56-bit sentinel.
///
/// # Errors
/// - [`StegoError::InvalidBitmap`] if `carrier` is not a supported bitmap.
/// - [`StegoError::InvalidParams`] if `params` fails validation.
pub fn lsb_capacity(carrier: &[u8], params: &LsbParams) -> Result<usize, StegoError> {
    params.validate()?;
    let plane = PixelPlane::from_bytes(carrier)?;
    Ok(params.capacity(plane.rgb().len()))
}

/// Maximum message size for wavelet embedding: `len(cV) + len(cD)`, capped
/// at the length slot's limit.
///
/// This counts subband slots. Writing the result back into 8-bit samples is
/// a separate check that encode performs
/// ([`StegoError::SampleRangeExceeded`]).
///
/// # Errors
/// [`StegoError::InvalidBitmap`] if `carrier` is not a supported bitmap.
pub fn wavelet_capacity(carrier: &[u8]) -> Result<usize, StegoError> {
    let plane = PixelPlane::from_bytes(carrier)?;
    Ok(wavelet::capacity(plane.width() as usize, plane.height() as usize))
}

/// Maximum message size for either append frame. Independent of the carrier.
pub fn append_capacity() -> usize {
    MAX_PAYLOAD_LEN
}

/// Capacity of `carrier` for `method`.
pub fn estimate_capacity(carrier: &[u8], method: Method, config: &StegoConfig) -> Result<usize, StegoError> {
    match method {
        Method::BitmapLsb => lsb_capacity(carrier, &config.lsb),
        Method::Wavelet => wavelet_capacity(carrier),
        Method::AppendNew | Method::AppendLegacy => Ok(append_capacity()),
    }
}
