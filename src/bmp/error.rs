// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Error types for bitmap parsing and serialization.

use std::fmt;

/// Errors that can occur while parsing or writing a bitmap container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BmpError {
    /// Input data is too short or truncated.
    UnexpectedEof,
    /// Missing `BM` signature at the start of the data.
    InvalidSignature,
    /// Bit depth other than 24 or 32.
    UnsupportedFormat(u16),
    /// Compressed pixel storage (RLE, bitfields, embedded PNG/JPEG).
    UnsupportedCompression(u32),
    /// Width or height is zero, negative where not allowed, or overflows.
    InvalidDimensions,
}

impl fmt::Display for BmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of bitmap data"),
            Self::InvalidSignature => write!(f, "missing BM signature (not a bitmap)"),
            Self::UnsupportedFormat(bpp) => write!(f, "unsupported bit depth: {bpp} bpp (need 24 or 32)"),
            Self::UnsupportedCompression(c) => write!(f, "unsupported bitmap compression: {c}"),
            Self::InvalidDimensions => write!(f, "invalid bitmap dimensions"),
        }
    }
}

impl std::error::Error for BmpError {}

pub type Result<T> = std::result::Result<T, BmpError>;
