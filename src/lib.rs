// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! # veil-core
//!
//! Pure-Rust steganography codec for hiding text messages in images.
//! Provides four embedding methods:
//!
//! - **Bitmap LSB**: length-prefixed bitstream in the least significant bits
//!   of a 24/32-bit BMP carrier. Visually lossless (each sample changes by
//!   at most 1 at the default depth).
//! - **Wavelet**: bytes stored in the detail subbands of a single-level Haar
//!   decomposition of one colour channel.
//! - **Append** / **Legacy append**: marker-delimited frames appended after
//!   the bytes of any container (PNG, JPEG, ...), which image viewers ignore.
//!
//! Messages pass through a repeating-key XOR keystream before embedding.
//! This obscures the payload; it is not encryption.
//!
//! The bitmap codec (`bmp` module) and all stego formats are implemented
//! here with no image library. Other containers are only probed for their
//! dimensions (`container` module).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use veil_core::{encode, smart_decode, Method};
//!
//! let cover_bmp = std::fs::read("photo.bmp").unwrap();
//! let stego = encode(&cover_bmp, "secret message", "key", Method::BitmapLsb).unwrap();
//! let decoded = smart_decode(&stego, "key").unwrap();
//! assert_eq!(decoded.text, "secret message");
//! assert_eq!(decoded.method, Method::BitmapLsb);
//! ```

pub mod bmp;
pub mod config;
pub mod container;
pub mod stego;

pub use bmp::error::{BmpError, Result as BmpResult};
pub use bmp::{ColorChannel, PixelPlane};
pub use config::{load_config, ConfigError, StegoConfig};
pub use container::{probe, ContainerFormat, ContainerInfo};
pub use stego::{encode, encode_with_config, smart_decode, decode_with_config, wavelet_decode, Decoded, Method, StegoError};
pub use stego::{estimate_capacity, lsb_capacity, wavelet_capacity, append_capacity};
pub use stego::{psnr, LsbParams, PSNR_IDENTICAL};
