// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Codec configuration.
//!
//! Every field has a default matching the canonical formats, so an empty TOML
//! file is a valid configuration:
//!
//! ```toml
//! default_method = "bitmap-lsb"
//! wavelet_channel = "green"
//!
//! [lsb]
//! depth = 1
//! scan_limit = 100000
//! sentinel = true
//! ```
//!
//! Encoder and decoder must use the same `lsb` section.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bmp::ColorChannel;
use crate::stego::{LsbParams, Method, StegoError};

/// Parameters for every embedding method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Method used when the caller does not pick one.
    pub default_method: Method,
    /// Channel carrying the wavelet payload.
    pub wavelet_channel: ColorChannel,
    /// Bitmap LSB parameters.
    pub lsb: LsbParams,
}

impl StegoConfig {
    /// Check every parameter range.
    pub fn validate(&self) -> Result<(), StegoError> {
        self.lsb.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(ConfigError::Serialize)
    }
}

/// Load a TOML configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<StegoConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    StegoConfig::from_toml_str(&content)
}

/// Errors from loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The TOML is syntactically invalid or has wrong field types.
    Parse(toml::de::Error),
    /// The configuration could not be rendered.
    Serialize(toml::ser::Error),
    /// A value is out of range.
    Invalid(StegoError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "cannot read config: {e}"),
            Self::Parse(e) => write!(f, "cannot parse config: {e}"),
            Self::Serialize(e) => write!(f, "cannot write config: {e}"),
            Self::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Serialize(e) => Some(e),
            Self::Invalid(e) => Some(e),
        }
    }
}
