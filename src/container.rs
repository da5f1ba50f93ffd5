// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Header-only inspection of carrier containers.
//!
//! Identifies the container format and reads the image dimensions without
//! decoding pixel data. Only bitmaps are decoded by this crate; every other
//! format is carried as an opaque blob by the append schemes, and this probe
//! is all the crate knows about them.

use std::fmt;

/// Recognized carrier container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Bmp,
    Png,
    Jpeg,
    Gif,
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bmp => "BMP",
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Gif => "GIF",
        };
        f.write_str(name)
    }
}

/// Format and pixel dimensions read from a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub format: ContainerFormat,
    pub width: u32,
    pub height: u32,
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Identify `data` and read its dimensions.
///
/// Returns `None` for unknown formats and for headers too short or too
/// inconsistent to yield dimensions.
pub fn probe(data: &[u8]) -> Option<ContainerInfo> {
    if data.starts_with(b"BM") {
        probe_bmp(data)
    } else if data.starts_with(PNG_SIGNATURE) {
        probe_png(data)
    } else if data.starts_with(&[0xFF, 0xD8]) {
        probe_jpeg(data)
    } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        probe_gif(data)
    } else {
        None
    }
}

fn probe_bmp(data: &[u8]) -> Option<ContainerInfo> {
    let w = i32::from_le_bytes(data.get(18..22)?.try_into().ok()?);
    let h = i32::from_le_bytes(data.get(22..26)?.try_into().ok()?);
    if w <= 0 || h == 0 {
        return None;
    }
    Some(ContainerInfo { format: ContainerFormat::Bmp, width: w as u32, height: h.unsigned_abs() })
}

fn probe_png(data: &[u8]) -> Option<ContainerInfo> {
    // First chunk must be IHDR: length(4) "IHDR" width(4) height(4).
    if data.get(12..16)? != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data.get(16..20)?.try_into().ok()?);
    let height = u32::from_be_bytes(data.get(20..24)?.try_into().ok()?);
    Some(ContainerInfo { format: ContainerFormat::Png, width, height })
}

fn probe_gif(data: &[u8]) -> Option<ContainerInfo> {
    let width = u16::from_le_bytes(data.get(6..8)?.try_into().ok()?) as u32;
    let height = u16::from_le_bytes(data.get(8..10)?.try_into().ok()?) as u32;
    Some(ContainerInfo { format: ContainerFormat::Gif, width, height })
}

/// Walk marker segments until a start-of-frame marker.
fn probe_jpeg(data: &[u8]) -> Option<ContainerInfo> {
    let mut pos = 2; // skip SOI
    while pos + 3 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let m = data[pos + 1];
        // Fill bytes, standalone markers.
        if m == 0xFF || m == 0x00 || m == 0x01 || (0xD0..=0xD8).contains(&m) {
            pos += if m == 0xFF { 1 } else { 2 };
            continue;
        }
        if m == 0xD9 || m == 0xDA {
            return None; // EOI or SOS before any frame header
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        // SOF0..SOF15 except DHT (C4), JPG (C8), DAC (CC).
        if (0xC0..=0xCF).contains(&m) && m != 0xC4 && m != 0xC8 && m != 0xCC {
            let seg = data.get(pos + 4..pos + 2 + len)?;
            if seg.len() < 5 {
                return None;
            }
            let height = u16::from_be_bytes([seg[1], seg[2]]) as u32;
            let width = u16::from_be_bytes([seg[3], seg[4]]) as u32;
            return Some(ContainerInfo { format: ContainerFormat::Jpeg, width, height });
        }
        pos += 2 + len;
    }
    None
}
