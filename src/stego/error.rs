// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers all failure modes from bitmap parsing through
//! frame extraction and text recovery.

use core::fmt;

use crate::bmp::error::BmpError;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StegoError {
    /// The carrier could not be parsed as a supported bitmap
    /// (bad signature, unsupported bit depth, truncated data).
    InvalidBitmap(BmpError),
    /// The message is larger than the carrier's embedding capacity.
    CapacityExceeded,
    /// The embedded coefficients do not survive export to 8-bit samples,
    /// so the message could not be read back from the output.
    SampleRangeExceeded,
    /// A length or metadata field is inconsistent with the buffer bounds
    /// or outside its valid range.
    Malformed,
    /// No recognized frame, marker or bitstream was found.
    NotFound,
    /// Empty messages cannot be embedded: every decoder reads length 0 as
    /// "no message".
    EmptyMessage,
    /// The recovered payload is not valid UTF-8 (usually a wrong key).
    InvalidUtf8,
    /// Codec parameters are out of range.
    InvalidParams(&'static str),
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBitmap(e) => write!(f, "invalid bitmap: {e}"),
            Self::CapacityExceeded => write!(f, "message too large for this carrier"),
            Self::SampleRangeExceeded => write!(f, "embedded values exceed the 8-bit sample range"),
            Self::Malformed => write!(f, "embedded frame is malformed"),
            Self::NotFound => write!(f, "no hidden message found"),
            Self::EmptyMessage => write!(f, "message is empty"),
            Self::InvalidUtf8 => write!(f, "extracted text is not valid UTF-8 (wrong key?)"),
            Self::InvalidParams(msg) => write!(f, "invalid codec parameters: {msg}"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBitmap(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BmpError> for StegoError {
    fn from(e: BmpError) -> Self {
        Self::InvalidBitmap(e)
    }
}
