// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Pixel-domain LSB embedding over an RGB plane.
//!
//! Every plane byte (R, G and B of every pixel, row-major) is one embedding
//! slot. A slot carries the lowest `depth` bits of the stream, MSB first;
//! with the default depth of 1 only bit 0 of each byte changes, which keeps
//! the per-sample error at most 1.
//!
//! The stream is a Generation C frame (see [`frame`](super::frame)): 32-bit
//! length, payload, optional `<<END>>` sentinel. Decoding only looks at the
//! first `scan_limit` plane bytes, so encoding refuses payloads that would
//! reach past it.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bmp::PixelPlane;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, MAX_PAYLOAD_LEN};

/// Largest supported bits-per-slot.
pub const MAX_DEPTH: u8 = 4;

/// Default number of plane bytes scanned by the decoder.
pub const DEFAULT_SCAN_LIMIT: usize = 100_000;

/// PSNR reported for identical planes (MSE = 0), in dB.
///
/// A clamp, not a measurement: the true value is unbounded.
pub const PSNR_IDENTICAL: f64 = 100.0;

/// Parameters shared by the LSB encoder and decoder. Both sides must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsbParams {
    /// Low-order bits used per plane byte (1..=4).
    pub depth: u8,
    /// Number of leading plane bytes available to the bitstream.
    pub scan_limit: usize,
    /// Append the `<<END>>` sentinel after the payload.
    pub sentinel: bool,
}

impl Default for LsbParams {
    fn default() -> Self {
        Self { depth: 1, scan_limit: DEFAULT_SCAN_LIMIT, sentinel: true }
    }
}

impl LsbParams {
    /// Check ranges.
    ///
    /// # Errors
    /// [`StegoError::InvalidParams`] if `depth` is outside 1..=4 or
    /// `scan_limit` is zero.
    pub fn validate(&self) -> Result<(), StegoError> {
        if self.depth == 0 || self.depth > MAX_DEPTH {
            return Err(StegoError::InvalidParams("lsb depth must be 1..=4"));
        }
        if self.scan_limit == 0 {
            return Err(StegoError::InvalidParams("lsb scan_limit must be non-zero"));
        }
        Ok(())
    }

    /// Bits available to the bitstream in a plane of `plane_len` bytes.
    pub fn usable_bits(&self, plane_len: usize) -> usize {
        plane_len.min(self.scan_limit) * self.depth as usize
    }

    /// Largest payload (bytes) that fits in a plane of `plane_len` bytes.
    pub fn capacity(&self, plane_len: usize) -> usize {
        let overhead = frame::bitstream_len(0, self.sentinel);
        let bits = self.usable_bits(plane_len).saturating_sub(overhead);
        (bits / 8).min(MAX_PAYLOAD_LEN)
    }
}

/// Write `bits` into the low `depth` bits of successive bytes of `plane`.
///
/// Bit `j` of the stream lands in byte `j / depth` at bit position
/// `depth - 1 - j % depth`. Bits of the final slot not covered by the stream
/// are left as they were.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if `bits` does not fit. Nothing is
/// modified in that case.
pub fn embed_bits(plane: &mut [u8], bits: &[u8], depth: u8) -> Result<(), StegoError> {
    let depth = depth as usize;
    if bits.len() > plane.len() * depth {
        return Err(StegoError::CapacityExceeded);
    }

    for (j, &bit) in bits.iter().enumerate() {
        let byte = &mut plane[j / depth];
        let pos = depth - 1 - j % depth;
        *byte = (*byte & !(1 << pos)) | ((bit & 1) << pos);
    }
    Ok(())
}

/// Read the low `depth` bits of the first `limit` bytes of `plane`,
/// MSB first within each byte.
pub fn extract_bits(plane: &[u8], depth: u8, limit: usize) -> Vec<u8> {
    let end = plane.len().min(limit);
    let mut bits = Vec::with_capacity(end * depth as usize);
    for &byte in &plane[..end] {
        for pos in (0..depth).rev() {
            bits.push((byte >> pos) & 1);
        }
    }
    bits
}

/// Embed `payload` as a Generation C bitstream into `plane`.
///
/// # Errors
/// - [`StegoError::InvalidParams`] if `params` fails validation.
/// - [`StegoError::CapacityExceeded`] if the frame does not fit in the
///   scanned region. The plane is untouched on error.
pub fn encode_lsb(plane: &mut PixelPlane, payload: &[u8], params: &LsbParams) -> Result<(), StegoError> {
    params.validate()?;

    let bits = frame::build_bitstream(payload, params.sentinel)?;
    let usable = params.usable_bits(plane.rgb().len());
    if bits.len() > usable {
        debug!("lsb frame needs {} bits, carrier offers {usable}", bits.len());
        return Err(StegoError::CapacityExceeded);
    }

    trace!("lsb embed: {} payload bytes, {} bits, depth {}", payload.len(), bits.len(), params.depth);
    embed_bits(plane.rgb_mut(), &bits, params.depth)
}

/// Extract a Generation C bitstream payload from `plane`.
///
/// # Errors
/// - [`StegoError::InvalidParams`] if `params` fails validation.
/// - [`StegoError::NotFound`] / [`StegoError::Malformed`] from
///   [`frame::parse_bitstream`].
pub fn decode_lsb(plane: &PixelPlane, params: &LsbParams) -> Result<Vec<u8>, StegoError> {
    params.validate()?;
    let bits = extract_bits(plane.rgb(), params.depth, params.scan_limit);
    frame::parse_bitstream(&bits)
}

/// Peak signal-to-noise ratio between two planes, in dB.
///
/// `10 * log10(255² / MSE)` over every plane byte. Identical planes return
/// [`PSNR_IDENTICAL`].
///
/// # Errors
/// [`StegoError::InvalidParams`] if the planes differ in size.
pub fn psnr(original: &PixelPlane, modified: &PixelPlane) -> Result<f64, StegoError> {
    if original.width() != modified.width() || original.height() != modified.height() {
        return Err(StegoError::InvalidParams("psnr planes differ in size"));
    }

    let a = original.rgb();
    let b = modified.rgb();
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum();
    let mse = sum / a.len() as f64;

    if mse == 0.0 {
        return Ok(PSNR_IDENTICAL);
    }
    Ok(10.0 * (255.0 * 255.0 / mse).log10())
}
