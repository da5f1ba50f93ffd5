// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Bitmap file header (`BITMAPFILEHEADER`) and info header
//! (`BITMAPINFOHEADER`) parsing and writing.
//!
//! Only the fields the pixel codec needs are interpreted. All multi-byte
//! values are little-endian.
//!
//! ```text
//! offset  size  field
//!  0      2     signature "BM"
//!  2      4     file size
//! 10      4     pixel data offset
//! 14      4     info header size (40)
//! 18      4     width  (i32)
//! 22      4     height (i32, positive = bottom-up rows)
//! 26      2     color planes (1)
//! 28      2     bits per pixel
//! 30      4     compression
//! 34      4     image size
//! 38      4     horizontal resolution (px/m)
//! 42      4     vertical resolution (px/m)
//! 46      4     palette colors
//! 50      4     important colors
//! ```

use super::error::{BmpError, Result};

/// Size of the file header in bytes.
pub const FILE_HEADER_LEN: usize = 14;
/// Size of the `BITMAPINFOHEADER` in bytes.
pub const INFO_HEADER_LEN: usize = 40;
/// Pixel data offset for files written by this crate.
pub const PIXEL_OFFSET: u32 = (FILE_HEADER_LEN + INFO_HEADER_LEN) as u32;
/// 72 DPI expressed in pixels per metre.
pub const RESOLUTION_72_DPI: u32 = 2835;

/// `BI_RGB`: uncompressed pixel rows.
const BI_RGB: u32 = 0;
/// `BI_BITFIELDS`: uncompressed with channel masks. Accepted for 32 bpp only,
/// where the common masks are plain BGRA.
const BI_BITFIELDS: u32 = 3;

/// Header fields needed to locate and decode the pixel array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    /// Offset of the first pixel row from the start of the file.
    pub pixel_offset: u32,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels (absolute value of the stored field).
    pub height: u32,
    /// True when rows are stored bottom-up (positive height field).
    pub bottom_up: bool,
    /// Bits per pixel (24 or 32).
    pub bits_per_pixel: u16,
}

impl BmpHeader {
    /// Bytes per pixel in the stored rows.
    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Stored row length including padding to a 4-byte boundary.
    pub fn row_stride(&self) -> usize {
        row_stride(self.width as usize, self.bytes_per_pixel())
    }
}

/// Row length in bytes, rounded up to a multiple of four.
pub fn row_stride(width: usize, bytes_per_pixel: usize) -> usize {
    (width * bytes_per_pixel + 3) / 4 * 4
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// Parse the file and info headers at the start of `data`.
///
/// Validates the signature, bit depth and compression. Does not check that
/// the pixel array is present; the caller does that once it knows the stride.
pub fn parse_header(data: &[u8]) -> Result<BmpHeader> {
    if data.len() < 2 {
        return Err(BmpError::UnexpectedEof);
    }
    if &data[0..2] != b"BM" {
        return Err(BmpError::InvalidSignature);
    }
    if data.len() < FILE_HEADER_LEN + INFO_HEADER_LEN {
        return Err(BmpError::UnexpectedEof);
    }

    let pixel_offset = read_u32(data, 10);
    let raw_width = read_u32(data, 18) as i32;
    let raw_height = read_u32(data, 22) as i32;
    let bits_per_pixel = read_u16(data, 28);
    let compression = read_u32(data, 30);

    if bits_per_pixel != 24 && bits_per_pixel != 32 {
        return Err(BmpError::UnsupportedFormat(bits_per_pixel));
    }
    match compression {
        BI_RGB => {}
        BI_BITFIELDS if bits_per_pixel == 32 => {}
        other => return Err(BmpError::UnsupportedCompression(other)),
    }

    if raw_width <= 0 || raw_height == 0 || raw_height == i32::MIN {
        return Err(BmpError::InvalidDimensions);
    }

    Ok(BmpHeader {
        pixel_offset,
        width: raw_width as u32,
        height: raw_height.unsigned_abs(),
        bottom_up: raw_height > 0,
        bits_per_pixel,
    })
}

/// Write a 24-bit bottom-up file header + info header for the given size.
pub fn write_header(out: &mut Vec<u8>, width: u32, height: u32) {
    let image_size = (row_stride(width as usize, 3) * height as usize) as u32;
    let file_size = PIXEL_OFFSET + image_size;

    // File header
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&PIXEL_OFFSET.to_le_bytes());

    // Info header
    out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&BI_RGB.to_le_bytes());
    out.extend_from_slice(&image_size.to_le_bytes());
    out.extend_from_slice(&RESOLUTION_72_DPI.to_le_bytes());
    out.extend_from_slice(&RESOLUTION_72_DPI.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_four_byte_aligned() {
        assert_eq!(row_stride(1, 3), 4);
        assert_eq!(row_stride(2, 3), 8);
        assert_eq!(row_stride(4, 3), 12);
        assert_eq!(row_stride(5, 3), 16);
        assert_eq!(row_stride(3, 4), 12);
    }

    #[test]
    fn written_header_parses_back() {
        let mut out = Vec::new();
        write_header(&mut out, 7, 3);
        assert_eq!(out.len(), FILE_HEADER_LEN + INFO_HEADER_LEN);

        let hdr = parse_header(&out).unwrap();
        assert_eq!(hdr.pixel_offset, 54);
        assert_eq!(hdr.width, 7);
        assert_eq!(hdr.height, 3);
        assert!(hdr.bottom_up);
        assert_eq!(hdr.bits_per_pixel, 24);
        assert_eq!(hdr.row_stride(), 24);

        // file size = 54 + 24 * 3
        assert_eq!(read_u32(&out, 2), 54 + 72);
        assert_eq!(read_u32(&out, 34), 72);
        assert_eq!(read_u32(&out, 38), RESOLUTION_72_DPI);
    }

    #[test]
    fn bad_signature_rejected() {
        let mut out = Vec::new();
        write_header(&mut out, 2, 2);
        out[0] = b'P';
        assert_eq!(parse_header(&out), Err(BmpError::InvalidSignature));
        assert_eq!(parse_header(b"X"), Err(BmpError::UnexpectedEof));
    }

    #[test]
    fn unsupported_depth_rejected() {
        let mut out = Vec::new();
        write_header(&mut out, 2, 2);
        out[28..30].copy_from_slice(&8u16.to_le_bytes());
        assert_eq!(parse_header(&out), Err(BmpError::UnsupportedFormat(8)));
    }

    #[test]
    fn compressed_rejected() {
        let mut out = Vec::new();
        write_header(&mut out, 2, 2);
        out[30..34].copy_from_slice(&1u32.to_le_bytes()); // BI_RLE8
        assert_eq!(parse_header(&out), Err(BmpError::UnsupportedCompression(1)));
    }

    #[test]
    fn negative_height_is_top_down() {
        let mut out = Vec::new();
        write_header(&mut out, 2, 2);
        out[22..26].copy_from_slice(&(-2i32).to_le_bytes());
        let hdr = parse_header(&out).unwrap();
        assert_eq!(hdr.height, 2);
        assert!(!hdr.bottom_up);
    }

    #[test]
    fn zero_width_rejected() {
        let mut out = Vec::new();
        write_header(&mut out, 2, 2);
        out[18..22].copy_from_slice(&0i32.to_le_bytes());
        assert_eq!(parse_header(&out), Err(BmpError::InvalidDimensions));
    }

    #[test]
    fn truncated_header_rejected() {
        let mut out = Vec::new();
        write_header(&mut out, 2, 2);
        assert_eq!(parse_header(&out[..30]), Err(BmpError::UnexpectedEof));
    }
}
