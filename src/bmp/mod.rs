// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Pure-Rust bitmap (BMP) pixel codec.
//!
//! Reads uncompressed 24- and 32-bit bitmaps into a row-major, top-to-bottom
//! RGB [`PixelPlane`], and writes planes back as 24-bit bottom-up bitmaps.
//! This is the carrier for the pixel-domain (LSB) and frequency-domain
//! (wavelet) embedding schemes.
//!
//! Supports:
//! - 24 bpp (BGR) and 32 bpp (BGRA / BGRX, alpha dropped)
//! - Bottom-up (positive height) and top-down (negative height) row order
//! - Arbitrary pixel data offsets (extra header bytes, colour masks)
//!
//! Does NOT support:
//! - Palettized (1/4/8 bpp) or 16 bpp images -- rejected at parse time
//! - RLE or embedded PNG/JPEG compression -- rejected at parse time

pub mod error;
pub mod header;

use serde::{Deserialize, Serialize};

use error::{BmpError, Result};
use header::{parse_header, row_stride, write_header};

/// One of the three colour channels of a [`PixelPlane`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChannel {
    Red,
    #[default]
    Green,
    Blue,
}

impl ColorChannel {
    /// Offset of this channel within an RGB triplet.
    pub fn offset(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Row-major RGB pixel data, top row first.
///
/// Invariant: `rgb.len() == width * height * 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelPlane {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

impl PixelPlane {
    /// Wrap an existing RGB buffer.
    ///
    /// Returns [`BmpError::InvalidDimensions`] if the buffer length does not
    /// match `width * height * 3` or either dimension is zero.
    pub fn new(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self> {
        let expected = plane_len(width, height)?;
        if rgb.len() != expected {
            return Err(BmpError::InvalidDimensions);
        }
        Ok(Self { width, height, rgb })
    }

    /// A plane filled with a single colour.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Result<Self> {
        let len = plane_len(width, height)?;
        let mut rgb = Vec::with_capacity(len);
        for _ in 0..len / 3 {
            rgb.extend_from_slice(&color);
        }
        Ok(Self { width, height, rgb })
    }

    /// Parse a bitmap file.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let hdr = parse_header(data)?;
        let bpp = hdr.bytes_per_pixel();
        let stride = hdr.row_stride();
        let width = hdr.width as usize;
        let height = hdr.height as usize;

        let offset = hdr.pixel_offset as usize;
        let needed = stride
            .checked_mul(height)
            .and_then(|n| n.checked_add(offset))
            .ok_or(BmpError::InvalidDimensions)?;
        // The last row may legally omit its padding in some writers; require
        // only the pixel bytes of the final row.
        let minimum = needed - (stride - width * bpp);
        if data.len() < minimum {
            return Err(BmpError::UnexpectedEof);
        }

        let mut rgb = vec![0u8; plane_len(hdr.width, hdr.height)?];
        for y in 0..height {
            let stored_row = if hdr.bottom_up { height - 1 - y } else { y };
            let src = &data[offset + stored_row * stride..];
            let dst = &mut rgb[y * width * 3..(y + 1) * width * 3];
            for x in 0..width {
                let p = &src[x * bpp..x * bpp + 3];
                dst[x * 3] = p[2];
                dst[x * 3 + 1] = p[1];
                dst[x * 3 + 2] = p[0];
            }
        }

        Ok(Self { width: hdr.width, height: hdr.height, rgb })
    }

    /// Serialize as a 24-bit bottom-up bitmap.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(self.width, self.height, &self.rgb)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGB bytes in row-major order.
    pub fn rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// Mutable RGB bytes. The length cannot change through this slice.
    pub fn rgb_mut(&mut self) -> &mut [u8] {
        &mut self.rgb
    }

    /// Consume the plane and return its RGB buffer.
    pub fn into_rgb(self) -> Vec<u8> {
        self.rgb
    }

    /// Get one channel sample.
    pub fn get(&self, x: u32, y: u32, channel: ColorChannel) -> u8 {
        self.rgb[self.index(x, y, channel)]
    }

    /// Set one channel sample.
    pub fn set(&mut self, x: u32, y: u32, channel: ColorChannel, val: u8) {
        let idx = self.index(x, y, channel);
        self.rgb[idx] = val;
    }

    fn index(&self, x: u32, y: u32, channel: ColorChannel) -> usize {
        debug_assert!(x < self.width, "x {x} >= {}", self.width);
        debug_assert!(y < self.height, "y {y} >= {}", self.height);
        (y as usize * self.width as usize + x as usize) * 3 + channel.offset()
    }
}

fn plane_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(BmpError::InvalidDimensions);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(BmpError::InvalidDimensions)
}

/// Write a 24-bit bottom-up bitmap from row-major RGB data.
///
/// `rgb` must hold `width * height * 3` bytes; [`PixelPlane::to_bytes`] is the
/// checked entry point.
pub fn serialize(width: u32, height: u32, rgb: &[u8]) -> Vec<u8> {
    debug_assert_eq!(rgb.len(), width as usize * height as usize * 3, "rgb length mismatch");

    let w = width as usize;
    let stride = row_stride(w, 3);
    let padding = stride - w * 3;

    let mut out = Vec::with_capacity(header::PIXEL_OFFSET as usize + stride * height as usize);
    write_header(&mut out, width, height);

    for y in (0..height as usize).rev() {
        let row = &rgb[y * w * 3..(y + 1) * w * 3];
        for px in row.chunks_exact(3) {
            out.extend_from_slice(&[px[2], px[1], px[0]]);
        }
        out.extend(std::iter::repeat(0u8).take(padding));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> PixelPlane {
        let mut rgb = Vec::new();
        for y in 0..height {
            for x in 0..width {
                rgb.extend_from_slice(&[(x * 20) as u8, (y * 30) as u8, ((x + y) * 7) as u8]);
            }
        }
        PixelPlane::new(width, height, rgb).unwrap()
    }

    #[test]
    fn serialize_parse_roundtrip_odd_width() {
        // Width 5 → 15 pixel bytes per row + 1 padding byte.
        let plane = gradient(5, 3);
        let bytes = plane.to_bytes();
        assert_eq!(bytes.len(), 54 + 16 * 3);
        assert_eq!(PixelPlane::from_bytes(&bytes).unwrap(), plane);
    }

    #[test]
    fn rows_written_bottom_up_as_bgr() {
        let plane = gradient(2, 2);
        let bytes = plane.to_bytes();
        // First stored row is the bottom image row (y = 1), pixel (0, 1).
        let first = &bytes[54..57];
        assert_eq!(first, &[plane.get(0, 1, ColorChannel::Blue), plane.get(0, 1, ColorChannel::Green), plane.get(0, 1, ColorChannel::Red)]);
    }

    #[test]
    fn top_down_bitmap_parsed_in_order() {
        let plane = gradient(3, 2);
        let mut bytes = plane.to_bytes();
        // Flip to top-down: negate height and swap the two stored rows.
        bytes[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        let stride = row_stride(3, 3);
        let (a, b) = bytes[54..54 + 2 * stride].split_at_mut(stride);
        a.swap_with_slice(b);
        assert_eq!(PixelPlane::from_bytes(&bytes).unwrap(), plane);
    }

    #[test]
    fn parses_32bpp_and_drops_alpha() {
        let mut bytes = Vec::new();
        write_header(&mut bytes, 1, 1);
        bytes[28..30].copy_from_slice(&32u16.to_le_bytes());
        bytes.extend_from_slice(&[10, 20, 30, 255]); // B G R A
        let plane = PixelPlane::from_bytes(&bytes).unwrap();
        assert_eq!(plane.rgb(), &[30, 20, 10]);
    }

    #[test]
    fn truncated_pixels_rejected() {
        let bytes = gradient(4, 4).to_bytes();
        assert_eq!(PixelPlane::from_bytes(&bytes[..bytes.len() - 20]), Err(BmpError::UnexpectedEof));
    }

    #[test]
    fn new_validates_length() {
        assert_eq!(PixelPlane::new(2, 2, vec![0; 11]), Err(BmpError::InvalidDimensions));
        assert_eq!(PixelPlane::new(0, 2, vec![]), Err(BmpError::InvalidDimensions));
        assert!(PixelPlane::new(2, 2, vec![0; 12]).is_ok());
    }

    #[test]
    fn get_set_channel() {
        let mut plane = PixelPlane::filled(3, 3, [1, 2, 3]).unwrap();
        assert_eq!(plane.get(2, 2, ColorChannel::Green), 2);
        plane.set(1, 2, ColorChannel::Blue, 99);
        assert_eq!(plane.rgb()[(2 * 3 + 1) * 3 + 2], 99);
    }
}
