// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! `veil` command-line front end for veil-core.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use log::debug;

use veil_core::{
    decode_with_config, encode_with_config, estimate_capacity, load_config, probe, psnr,
    wavelet_decode, Method, PixelPlane, StegoConfig,
};

/// Hide text messages in images.
#[derive(Parser)]
#[command(name = "veil")]
#[command(version)]
#[command(about = "Text steganography for BMP, PNG, JPEG and GIF carriers", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message in a carrier image
    Encode {
        /// Carrier image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output stego image path
        #[arg(short, long)]
        output: PathBuf,

        /// Secret message (text)
        #[arg(short, long, conflicts_with = "file")]
        message: Option<String>,

        /// File holding the UTF-8 message
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Keystream key (empty leaves the message as is)
        #[arg(short, long, default_value = "")]
        key: String,

        /// bitmap-lsb, wavelet, append-new or append-legacy
        #[arg(short = 'M', long)]
        method: Option<Method>,
    },
    /// Recover a hidden message
    Decode {
        /// Stego image path
        #[arg(short, long)]
        input: PathBuf,

        /// Keystream key used at encode time
        #[arg(short, long, default_value = "")]
        key: String,

        /// Read a wavelet carrier (other methods are auto-detected)
        #[arg(short, long)]
        wavelet: bool,

        /// Write the message here instead of stdout
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },
    /// Show container format and dimensions
    Info {
        /// Image file path
        input: PathBuf,
    },
    /// Show capacity per method
    Capacity {
        /// Carrier image path
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => StegoConfig::default(),
    };
    debug!("config: {config:?}");

    match cli.command {
        Commands::Encode { input, output, message, file, key, method } => {
            let carrier = read(&input)?;
            let message = match (message, file) {
                (Some(m), _) => m,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("reading message from {}", path.display()))?,
                (None, None) => return Err(anyhow!("provide either --message or --file")),
            };
            let method = method.unwrap_or(config.default_method);

            let stego = encode_with_config(&carrier, &message, &key, method, &config)
                .with_context(|| format!("encoding {} bytes via {method}", message.len()))?;
            fs::write(&output, &stego).with_context(|| format!("writing {}", output.display()))?;
            println!("embedded {} bytes via {method} into {}", message.len(), output.display());

            if matches!(method, Method::BitmapLsb | Method::Wavelet) {
                let before = PixelPlane::from_bytes(&carrier)?;
                let after = PixelPlane::from_bytes(&stego)?;
                println!("PSNR: {:.2} dB", psnr(&before, &after)?);
            }
        }

        Commands::Decode { input, key, wavelet, output } => {
            let carrier = read(&input)?;
            let decoded = if wavelet {
                wavelet_decode(&carrier, &key, &config)
            } else {
                decode_with_config(&carrier, &key, &config)
            }
            .with_context(|| format!("decoding {}", input.display()))?;

            match output {
                Some(path) => {
                    fs::write(&path, decoded.text.as_bytes())
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("recovered {} bytes via {} into {}", decoded.text.len(), decoded.method, path.display());
                }
                None => {
                    eprintln!("method: {}", decoded.method);
                    println!("{}", decoded.text);
                }
            }
        }

        Commands::Info { input } => {
            let data = read(&input)?;
            match probe(&data) {
                Some(info) => {
                    println!("format:     {}", info.format);
                    println!("dimensions: {}x{}", info.width, info.height);
                }
                None => println!("format:     unknown"),
            }
            println!("size:       {} bytes", data.len());
        }

        Commands::Capacity { input } => {
            let data = read(&input)?;
            for method in Method::ALL {
                match estimate_capacity(&data, method, &config) {
                    Ok(bytes) => println!("{:<14} {bytes} bytes", method.as_str()),
                    Err(e) => println!("{:<14} n/a ({e})", method.as_str()),
                }
            }
        }
    }

    Ok(())
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}
