// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Payload frame construction and parsing.
//!
//! Three frame generations are supported. Decoders accept all of them so
//! carriers written by older releases stay readable.
//!
//! Generation A, legacy append (after the carrier's own bytes):
//!
//! ```text
//! [5 bytes ] "STEGO"
//! [4 bytes ] payload length (big-endian u32)
//! [N bytes ] payload
//! ```
//!
//! Generation B, append with start and end markers:
//!
//! ```text
//! [15 bytes] "<<STEGO_START>>"
//! [4 bytes ] payload length (big-endian u32)
//! [N bytes ] payload
//! [13 bytes] "<<STEGO_END>>"
//! ```
//!
//! Generation C, LSB bitstream (one bit per carrier slot, MSB first):
//!
//! ```text
//! [32 bits ] payload length (big-endian u32)
//! [N*8 bits] payload
//! [56 bits ] "<<END>>" sentinel (optional, mismatch tolerated)
//! ```
//!
//! Builders never fail on a valid payload size; parsers validate every length
//! field against the buffer before slicing.

use log::{debug, trace};

use crate::stego::error::StegoError;

/// Generation A marker.
pub const LEGACY_MARKER: &[u8] = b"STEGO";
/// Generation B start marker.
pub const START_MARKER: &[u8] = b"<<STEGO_START>>";
/// Generation B end marker.
pub const END_MARKER: &[u8] = b"<<STEGO_END>>";
/// Generation C trailing sentinel.
pub const END_SENTINEL: &[u8] = b"<<END>>";

/// Width of the big-endian length field in every generation.
pub const LENGTH_BYTES: usize = 4;
/// [`LENGTH_BYTES`] in bits.
pub const LENGTH_BITS: usize = LENGTH_BYTES * 8;
/// [`END_SENTINEL`] in bits.
pub const SENTINEL_BITS: usize = 7 * 8;

/// Largest payload any generation accepts.
pub const MAX_PAYLOAD_LEN: usize = 100_000;

/// Generation A overhead: marker + length.
pub const LEGACY_OVERHEAD: usize = 5 + LENGTH_BYTES; // 9
/// Generation B overhead: start marker + length + end marker.
pub const APPEND_OVERHEAD: usize = 15 + LENGTH_BYTES + 13; // 32

fn check_payload_len(payload: &[u8]) -> Result<(), StegoError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(StegoError::CapacityExceeded);
    }
    Ok(())
}

/// Build a Generation A frame (marker, length, payload).
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if the payload exceeds [`MAX_PAYLOAD_LEN`].
pub fn build_legacy_frame(payload: &[u8]) -> Result<Vec<u8>, StegoError> {
    check_payload_len(payload)?;

    let mut frame = Vec::with_capacity(LEGACY_OVERHEAD + payload.len());
    frame.extend_from_slice(LEGACY_MARKER);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    Ok(frame)
}

/// Parse a Generation A frame from the end of `data`.
///
/// Every [`LEGACY_MARKER`] occurrence is a candidate. A candidate matches
/// when its length is non-zero, at most [`MAX_PAYLOAD_LEN`], and its payload
/// ends exactly at the end of `data`. The earliest match wins, so a payload
/// that itself contains the marker bytes is still read whole.
///
/// # Errors
/// - [`StegoError::NotFound`] if the marker does not occur.
/// - [`StegoError::Malformed`] if no candidate has a consistent length.
pub fn parse_legacy_frame(data: &[u8]) -> Result<&[u8], StegoError> {
    let mut saw_marker = false;
    for pos in positions(data, LEGACY_MARKER) {
        saw_marker = true;
        let len_pos = pos + LEGACY_MARKER.len();
        let Some(length) = read_length(data, len_pos) else {
            continue;
        };
        let body = len_pos + LENGTH_BYTES;
        if length == 0 || length > MAX_PAYLOAD_LEN || body + length != data.len() {
            debug!("legacy frame candidate at {pos}: length {length} does not end the buffer");
            continue;
        }
        trace!("legacy frame at {pos}: {length} payload bytes");
        return Ok(&data[body..]);
    }

    if saw_marker {
        Err(StegoError::Malformed)
    } else {
        Err(StegoError::NotFound)
    }
}

/// Build a Generation B frame (start marker, length, payload, end marker).
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if the payload exceeds [`MAX_PAYLOAD_LEN`].
pub fn build_append_frame(payload: &[u8]) -> Result<Vec<u8>, StegoError> {
    check_payload_len(payload)?;

    let mut frame = Vec::with_capacity(APPEND_OVERHEAD + payload.len());
    frame.extend_from_slice(START_MARKER);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(END_MARKER);
    Ok(frame)
}

/// Parse a Generation B frame from `data`.
///
/// A frame matches when a [`START_MARKER`] is followed by a non-zero length
/// of at most [`MAX_PAYLOAD_LEN`], that many payload bytes, and an
/// [`END_MARKER`] immediately after them. End markers are tried from the last
/// one backward, and for each the earliest matching start wins. This picks
/// the most recently appended frame, and reads a payload that contains
/// marker bytes of its own as a whole.
///
/// # Errors
/// - [`StegoError::NotFound`] if no start marker precedes an end marker.
/// - [`StegoError::Malformed`] if no candidate pair is consistent.
pub fn parse_append_frame(data: &[u8]) -> Result<&[u8], StegoError> {
    let starts: Vec<usize> = positions(data, START_MARKER).collect();
    let ends: Vec<usize> = positions(data, END_MARKER).collect();
    match (starts.first(), ends.last()) {
        (Some(&first), Some(&last)) if first < last => {}
        _ => return Err(StegoError::NotFound),
    }

    for &end in ends.iter().rev() {
        for &start in starts.iter().take_while(|&&s| s < end) {
            let len_pos = start + START_MARKER.len();
            let Some(length) = read_length(data, len_pos) else {
                continue;
            };
            let body = len_pos + LENGTH_BYTES;
            if length != 0 && length <= MAX_PAYLOAD_LEN && body + length == end {
                trace!("append frame at {start}..{end}: {length} payload bytes");
                return Ok(&data[body..end]);
            }
        }
    }

    debug!("{} start and {} end markers, no consistent frame", starts.len(), ends.len());
    Err(StegoError::Malformed)
}

/// Build a Generation C bitstream: length, payload and (optionally) the
/// end sentinel, one bit per element, MSB first.
///
/// # Errors
/// [`StegoError::CapacityExceeded`] if the payload exceeds [`MAX_PAYLOAD_LEN`].
pub fn build_bitstream(payload: &[u8], sentinel: bool) -> Result<Vec<u8>, StegoError> {
    check_payload_len(payload)?;

    let mut bytes = Vec::with_capacity(LENGTH_BYTES + payload.len() + END_SENTINEL.len());
    bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);
    if sentinel {
        bytes.extend_from_slice(END_SENTINEL);
    }
    Ok(bytes_to_bits(&bytes))
}

/// Number of bits [`build_bitstream`] produces for a payload of `len` bytes.
pub fn bitstream_len(len: usize, sentinel: bool) -> usize {
    LENGTH_BITS + len * 8 + if sentinel { SENTINEL_BITS } else { 0 }
}

/// Parse a Generation C bitstream.
///
/// `bits` holds one bit per element (0 or 1) and may be longer than the
/// frame. If enough bits remain after the payload, the end sentinel is
/// compared; a mismatch is logged and otherwise ignored.
///
/// # Errors
/// - [`StegoError::NotFound`] if fewer than 32 bits are available or the
///   length field is zero.
/// - [`StegoError::Malformed`] if the length exceeds [`MAX_PAYLOAD_LEN`] or
///   the available bits.
pub fn parse_bitstream(bits: &[u8]) -> Result<Vec<u8>, StegoError> {
    if bits.len() < LENGTH_BITS {
        return Err(StegoError::NotFound);
    }

    let length = bits[..LENGTH_BITS]
        .iter()
        .fold(0usize, |acc, &b| (acc << 1) | (b & 1) as usize);
    if length == 0 {
        return Err(StegoError::NotFound);
    }
    let payload_end = LENGTH_BITS + length * 8;
    if length > MAX_PAYLOAD_LEN || payload_end > bits.len() {
        debug!("bitstream length {length} invalid for {} available bits", bits.len());
        return Err(StegoError::Malformed);
    }

    let payload = bits_to_bytes(&bits[LENGTH_BITS..payload_end]);

    if let Some(tail) = bits.get(payload_end..payload_end + SENTINEL_BITS) {
        if bits_to_bytes(tail) != END_SENTINEL {
            debug!("bitstream end sentinel mismatch, accepting payload anyway");
        }
    }

    Ok(payload)
}

/// Read a big-endian u32 length at `pos`, or `None` if truncated.
fn read_length(data: &[u8], pos: usize) -> Option<usize> {
    let b = data.get(pos..pos + LENGTH_BYTES)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize)
}

/// Start offsets of every occurrence of `needle` in `haystack`, ascending.
fn positions<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = usize> + 'a {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(move |(_, w)| *w == needle)
        .map(|(i, _)| i)
}

/// Expand bytes into one element per bit, most significant bit first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&b| (0..8).rev().map(move |shift| (b >> shift) & 1))
        .collect()
}

/// Pack bits (MSB first) into bytes. A trailing partial byte is zero-padded
/// on the right.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << (7 - i)))
        })
        .collect()
}
