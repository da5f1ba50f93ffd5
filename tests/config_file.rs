// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Loading configuration files and running the codec with them.

use std::io::Write;

use veil_core::{
    decode_with_config, encode_with_config, load_config, ColorChannel, ConfigError, Method,
    PixelPlane, StegoConfig, StegoError,
};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_full_config() {
    let file = write_config(
        "default_method = \"append-new\"\n\
         wavelet_channel = \"red\"\n\
         \n\
         [lsb]\n\
         depth = 3\n\
         scan_limit = 5000\n\
         sentinel = false\n",
    );
    let cfg = load_config(file.path()).unwrap();
    assert_eq!(cfg.default_method, Method::AppendNew);
    assert_eq!(cfg.wavelet_channel, ColorChannel::Red);
    assert_eq!(cfg.lsb.depth, 3);
    assert_eq!(cfg.lsb.scan_limit, 5000);
    assert!(!cfg.lsb.sentinel);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

#[test]
fn invalid_depth_is_rejected() {
    let file = write_config("[lsb]\ndepth = 0\n");
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Invalid(StegoError::InvalidParams(_)))
    ));
}

#[test]
fn saved_config_loads_back() {
    let mut cfg = StegoConfig::default();
    cfg.lsb.depth = 2;
    cfg.wavelet_channel = ColorChannel::Blue;
    let file = write_config(&cfg.to_toml_string().unwrap());
    assert_eq!(load_config(file.path()).unwrap(), cfg);
}

#[test]
fn loaded_lsb_params_drive_the_codec() {
    let file = write_config("[lsb]\ndepth = 2\nsentinel = false\n");
    let cfg = load_config(file.path()).unwrap();

    let cover = PixelPlane::filled(20, 20, [10, 20, 30]).unwrap().to_bytes();
    let stego = encode_with_config(&cover, "configured", "k", Method::BitmapLsb, &cfg).unwrap();
    assert_eq!(decode_with_config(&stego, "k", &cfg).unwrap().text, "configured");

    // Reading at depth 1 interleaves the wrong bits.
    let default = StegoConfig::default();
    assert_ne!(
        decode_with_config(&stego, "k", &default).map(|d| d.text),
        Ok("configured".to_string())
    );
}
