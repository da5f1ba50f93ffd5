// Copyright (c) 2026 The veil-core Authors
// SPDX-License-Identifier: GPL-3.0-only
// This file is part of veil-core.

//! Frequency-domain embedding with a single-level 2D Haar transform.
//!
//! The transform is the unnormalized average/difference form: each stage maps
//! a pair `(a, b)` to `((a + b) / 2, (a - b) / 2)`, with no `sqrt(2)` factor.
//! A row pass runs first, then a column pass over each row-pass output:
//!
//! ```text
//! row pass          column pass
//! rows → low  ──→   low  → cA,  high → cH
//! rows → high ──→   low  → cV,  high → cD
//! ```
//!
//! Embedding layout:
//! - `cH[0]` = message length `n`, `cH[1]` = largest byte value `M`
//! - the first `ceil(n/2)` transformed values go to `cV[0..]`, the rest to
//!   `cD[0..]`
//! - each byte `c` is stored as `(255 - c) + M`
//!
//! Every 2×2 block whose coefficients are written is snapped to integer
//! coefficients, so the reconstructed samples are integers and the round trip
//! through [`embed_text`] / [`extract_text`] is exact. The stored values are
//! far outside the 8-bit range though. Every stored byte maps to at least
//! 255, while a detail coefficient of 8-bit samples is at most 127.5 in
//! magnitude. Exporting the channel into an 8-bit plane with
//! [`Channel::write_to_plane`] therefore clips samples and destroys the
//! message; [`embed_in_plane`] detects this and fails with
//! [`StegoError::SampleRangeExceeded`]. Keep the [`Channel`] when the payload
//! has to survive.
//!
//! Odd widths or heights lose their last column or row to the transform; those
//! samples pass through unchanged.

use log::{debug, trace};

use crate::bmp::{ColorChannel, PixelPlane};
use crate::stego::error::StegoError;

/// Largest message length (in bytes) the length slot may announce.
pub const MAX_TEXT_LEN: usize = 10_000;

/// Index of the length slot in `cH`.
const LEN_SLOT: usize = 0;
/// Index of the max-code slot in `cH`.
const MAX_SLOT: usize = 1;

/// One colour channel as real-valued samples, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    width: usize,
    height: usize,
    samples: Vec<f64>,
}

impl Channel {
    /// Wrap a sample buffer.
    ///
    /// # Errors
    /// [`StegoError::InvalidParams`] if `samples.len() != width * height`.
    pub fn new(width: usize, height: usize, samples: Vec<f64>) -> Result<Self, StegoError> {
        if width.checked_mul(height) != Some(samples.len()) {
            return Err(StegoError::InvalidParams("channel sample count mismatch"));
        }
        Ok(Self { width, height, samples })
    }

    /// Copy one colour channel out of a plane.
    pub fn from_plane(plane: &PixelPlane, channel: ColorChannel) -> Self {
        let samples = plane
            .rgb()
            .iter()
            .skip(channel.offset())
            .step_by(3)
            .map(|&v| v as f64)
            .collect();
        Self {
            width: plane.width() as usize,
            height: plane.height() as usize,
            samples,
        }
    }

    /// Round (ties up) and clamp every sample to `0..=255` and store it in
    /// `channel` of `plane`. The other channels are not touched.
    ///
    /// Returns the number of samples that had to be clamped.
    ///
    /// # Errors
    /// [`StegoError::InvalidParams`] if the plane has different dimensions.
    pub fn write_to_plane(&self, plane: &mut PixelPlane, channel: ColorChannel) -> Result<usize, StegoError> {
        if plane.width() as usize != self.width || plane.height() as usize != self.height {
            return Err(StegoError::InvalidParams("channel and plane differ in size"));
        }

        let mut clipped = 0;
        let offset = channel.offset();
        for (dst, &s) in plane.rgb_mut().iter_mut().skip(offset).step_by(3).zip(&self.samples) {
            let v = round_half_up(s);
            if !(0.0..=255.0).contains(&v) {
                clipped += 1;
            }
            *dst = v.clamp(0.0, 255.0) as u8;
        }
        Ok(clipped)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample at `(x, y)`, or `None` outside the channel.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.at(x, y))
    }

    fn at(&self, x: usize, y: usize) -> f64 {
        self.samples[y * self.width + x]
    }
}

/// The four subbands of a single-level decomposition. Each is
/// `width × height` with `width = floor(W/2)`, `height = floor(H/2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subbands {
    pub width: usize,
    pub height: usize,
    pub ca: Vec<f64>,
    pub ch: Vec<f64>,
    pub cv: Vec<f64>,
    pub cd: Vec<f64>,
}

impl Subbands {
    /// Coefficients per subband.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Forward single-level 2D Haar transform.
pub fn dwt2(channel: &Channel) -> Subbands {
    let hw = channel.width / 2;
    let hh = channel.height / 2;
    let rows = hh * 2;

    // Row pass over the even-sized region: rows × hw each.
    let mut row_low = vec![0.0f64; rows * hw];
    let mut row_high = vec![0.0f64; rows * hw];
    for y in 0..rows {
        for i in 0..hw {
            let a = channel.at(2 * i, y);
            let b = channel.at(2 * i + 1, y);
            row_low[y * hw + i] = (a + b) / 2.0;
            row_high[y * hw + i] = (a - b) / 2.0;
        }
    }

    let (ca, ch) = column_pass(&row_low, hw, hh);
    let (cv, cd) = column_pass(&row_high, hw, hh);

    Subbands { width: hw, height: hh, ca, ch, cv, cd }
}

/// Pairwise average/difference down each column of a `2*hh × hw` buffer.
fn column_pass(input: &[f64], hw: usize, hh: usize) -> (Vec<f64>, Vec<f64>) {
    let mut low = vec![0.0f64; hw * hh];
    let mut high = vec![0.0f64; hw * hh];
    for j in 0..hh {
        for i in 0..hw {
            let a = input[2 * j * hw + i];
            let b = input[(2 * j + 1) * hw + i];
            low[j * hw + i] = (a + b) / 2.0;
            high[j * hw + i] = (a - b) / 2.0;
        }
    }
    (low, high)
}

/// Inverse of [`dwt2`]. The result is `2*width × 2*height`.
pub fn idwt2(sb: &Subbands) -> Channel {
    let hw = sb.width;
    let hh = sb.height;
    let rows = hh * 2;

    let row_low = inverse_column_pass(&sb.ca, &sb.ch, hw, hh);
    let row_high = inverse_column_pass(&sb.cv, &sb.cd, hw, hh);

    let width = hw * 2;
    let mut samples = vec![0.0f64; width * rows];
    for y in 0..rows {
        for i in 0..hw {
            let l = row_low[y * hw + i];
            let h = row_high[y * hw + i];
            samples[y * width + 2 * i] = l + h;
            samples[y * width + 2 * i + 1] = l - h;
        }
    }

    Channel { width, height: rows, samples }
}

fn inverse_column_pass(low: &[f64], high: &[f64], hw: usize, hh: usize) -> Vec<f64> {
    let mut out = vec![0.0f64; 2 * hh * hw];
    for j in 0..hh {
        for i in 0..hw {
            let l = low[j * hw + i];
            let h = high[j * hw + i];
            out[2 * j * hw + i] = l + h;
            out[(2 * j + 1) * hw + i] = l - h;
        }
    }
    out
}

/// Message bytes mapped to the integers stored in the detail subbands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// `(255 - byte) + max_code` per message byte.
    pub values: Vec<i32>,
    /// Largest byte value in the message.
    pub max_code: u8,
}

/// Complement each byte and offset it by the message's largest byte.
pub fn process_encryption(text: &[u8]) -> Transformed {
    let max_code = text.iter().copied().max().unwrap_or(0);
    let values = text
        .iter()
        .map(|&c| (255 - c as i32) + max_code as i32)
        .collect();
    Transformed { values, max_code }
}

/// Message capacity in bytes for a `width × height` channel:
/// `len(cV) + len(cD)`, capped at [`MAX_TEXT_LEN`].
pub fn capacity(width: usize, height: usize) -> usize {
    let quad = (width / 2) * (height / 2);
    if quad < 2 {
        return 0;
    }
    (2 * quad).min(MAX_TEXT_LEN)
}

/// Embed `text` into the detail subbands of `channel`.
///
/// # Errors
/// - [`StegoError::EmptyMessage`] if `text` is empty.
/// - [`StegoError::InvalidParams`] if every byte is zero (`M` would be 0,
///   which the extractor rejects).
/// - [`StegoError::CapacityExceeded`] if `text` is longer than
///   [`capacity`] allows.
pub fn embed_text(channel: &Channel, text: &[u8]) -> Result<Channel, StegoError> {
    if text.is_empty() {
        return Err(StegoError::EmptyMessage);
    }
    let n = text.len();
    let cap = capacity(channel.width, channel.height);
    if n > cap {
        debug!("wavelet embed: {n} bytes > capacity {cap}");
        return Err(StegoError::CapacityExceeded);
    }

    let Transformed { values, max_code } = process_encryption(text);
    if max_code == 0 {
        return Err(StegoError::InvalidParams("message bytes are all zero"));
    }

    let mut sb = dwt2(channel);
    let mid = (n + 1) / 2;

    sb.ch[LEN_SLOT] = n as f64;
    sb.ch[MAX_SLOT] = max_code as f64;
    for (dst, &v) in sb.cv.iter_mut().zip(&values[..mid]) {
        *dst = v as f64;
    }
    for (dst, &v) in sb.cd.iter_mut().zip(&values[mid..]) {
        *dst = v as f64;
    }

    // Snap every written block to integer coefficients so its four samples
    // reconstruct as integers.
    let touched = mid.max(MAX_SLOT + 1);
    for band in [&mut sb.ca, &mut sb.ch, &mut sb.cv, &mut sb.cd] {
        for c in &mut band[..touched] {
            *c = round_half_up(*c);
        }
    }

    trace!("wavelet embed: n={n} M={max_code} cv={mid} cd={}", n - mid);

    let rec = idwt2(&sb);
    let mut out = channel.clone();
    for y in 0..rec.height {
        let src = &rec.samples[y * rec.width..(y + 1) * rec.width];
        let dst = &mut out.samples[y * out.width..y * out.width + rec.width];
        for (d, &s) in dst.iter_mut().zip(src) {
            *d = round_half_up(s);
        }
    }
    Ok(out)
}

/// Recover a message embedded by [`embed_text`].
///
/// # Errors
/// - [`StegoError::NotFound`] if the channel is too small or the length slot
///   is outside `1..=10000`.
/// - [`StegoError::Malformed`] if the max-code slot is outside `1..=255` or
///   the length exceeds the subband capacity.
pub fn extract_text(channel: &Channel) -> Result<Vec<u8>, StegoError> {
    let sb = dwt2(channel);
    if sb.len() <= MAX_SLOT {
        return Err(StegoError::NotFound);
    }

    let n = round_half_up(sb.ch[LEN_SLOT]);
    let m = round_half_up(sb.ch[MAX_SLOT]);
    if !(1.0..=MAX_TEXT_LEN as f64).contains(&n) {
        return Err(StegoError::NotFound);
    }
    if !(1.0..=255.0).contains(&m) {
        return Err(StegoError::Malformed);
    }
    let n = n as usize;
    let m = m as i64;
    if n > 2 * sb.len() {
        return Err(StegoError::Malformed);
    }

    let mid = (n + 1) / 2;
    let text = sb.cv[..mid]
        .iter()
        .chain(&sb.cd[..n - mid])
        .map(|&v| {
            let rev = round_half_up(v) as i64 - m;
            255 - (rev & 0xFF) as u8
        })
        .collect();
    Ok(text)
}

/// Embed into one channel of a bitmap plane, exporting through
/// [`Channel::write_to_plane`].
///
/// The exported plane is read back before it is returned.
///
/// # Errors
/// - Everything [`embed_text`] returns.
/// - [`StegoError::SampleRangeExceeded`] if the 8-bit export no longer
///   yields `text`.
pub fn embed_in_plane(plane: &PixelPlane, text: &[u8], channel: ColorChannel) -> Result<PixelPlane, StegoError> {
    let stego = embed_text(&Channel::from_plane(plane, channel), text)?;
    let mut out = plane.clone();
    let clipped = stego.write_to_plane(&mut out, channel)?;
    if extract_from_plane(&out, channel).as_deref() != Ok(text) {
        debug!("wavelet export clipped {clipped} samples, payload lost");
        return Err(StegoError::SampleRangeExceeded);
    }
    Ok(out)
}

/// Extract from one channel of a bitmap plane.
pub fn extract_from_plane(plane: &PixelPlane, channel: ColorChannel) -> Result<Vec<u8>, StegoError> {
    extract_text(&Channel::from_plane(plane, channel))
}

/// Round to nearest, ties toward positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: usize, height: usize) -> Channel {
        let samples = (0..width * height)
            .map(|i| ((i * 73 + i / width * 31) % 256) as f64)
            .collect();
        Channel::new(width, height, samples).unwrap()
    }

    #[test]
    fn dwt_of_constant_has_zero_details() {
        let c = Channel::new(4, 4, vec![100.0; 16]).unwrap();
        let sb = dwt2(&c);
        assert_eq!(sb.len(), 4);
        assert!(sb.ca.iter().all(|&v| v == 100.0));
        assert!(sb.ch.iter().chain(&sb.cv).chain(&sb.cd).all(|&v| v == 0.0));
    }

    #[test]
    fn dwt_single_block_values() {
        // [a b]   [1 2]
        // [c d] = [3 5]
        let c = Channel::new(2, 2, vec![1.0, 2.0, 3.0, 5.0]).unwrap();
        let sb = dwt2(&c);
        // row low: 1.5, 4 → cA = 2.75, cH = -1.25
        // row high: -0.5, -1 → cV = -0.75, cD = 0.25
        assert_eq!(sb.ca, vec![2.75]);
        assert_eq!(sb.ch, vec![-1.25]);
        assert_eq!(sb.cv, vec![-0.75]);
        assert_eq!(sb.cd, vec![0.25]);
    }

    #[test]
    fn idwt_inverts_dwt() {
        let c = textured(8, 6);
        assert_eq!(idwt2(&dwt2(&c)), c);
    }

    #[test]
    fn odd_dimensions_truncate() {
        let c = textured(5, 3);
        let sb = dwt2(&c);
        assert_eq!((sb.width, sb.height), (2, 1));
        let rec = idwt2(&sb);
        assert_eq!((rec.width(), rec.height()), (4, 2));
        for y in 0..2 {
            for x in 0..4 {
                assert_eq!(rec.get(x, y), c.get(x, y));
            }
        }
    }

    #[test]
    fn process_encryption_values() {
        let t = process_encryption(b"AB");
        assert_eq!(t.max_code, b'B');
        // 'A' = 65 → 190 + 66; 'B' = 66 → 189 + 66
        assert_eq!(t.values, vec![256, 255]);
    }

    #[test]
    fn embed_extract_roundtrip_even_and_odd_lengths() {
        let c = textured(16, 16);
        for msg in [&b"x"[..], b"wavelet", b"even len", b"Haar subbands carry this text."] {
            let stego = embed_text(&c, msg).unwrap();
            assert_eq!(extract_text(&stego).unwrap(), msg);
        }
    }

    #[test]
    fn roundtrip_full_byte_range() {
        let c = textured(32, 32);
        let msg: Vec<u8> = (1..=255u8).collect();
        let stego = embed_text(&c, &msg).unwrap();
        assert_eq!(extract_text(&stego).unwrap(), msg);
    }

    #[test]
    fn roundtrip_odd_dimensions() {
        let c = textured(9, 7);
        let stego = embed_text(&c, b"odd").unwrap();
        // Last column and row are untouched.
        for y in 0..7 {
            assert_eq!(stego.get(8, y), c.get(8, y));
        }
        assert_eq!(extract_text(&stego).unwrap(), b"odd");
    }

    #[test]
    fn untouched_blocks_unchanged() {
        let c = textured(16, 16);
        let stego = embed_text(&c, b"ab").unwrap();
        // Only blocks 0 and 1 (top-left 4x2 samples) may change.
        for y in 0..16 {
            for x in 0..16 {
                if y < 2 && x < 4 {
                    continue;
                }
                assert_eq!(stego.get(x, y), c.get(x, y), "({x},{y})");
            }
        }
    }

    #[test]
    fn capacity_boundary() {
        // 8x8 → 4x4 subbands → capacity 32.
        let c = textured(8, 8);
        assert_eq!(capacity(8, 8), 32);
        let msg = vec![b'q'; 32];
        let stego = embed_text(&c, &msg).unwrap();
        assert_eq!(extract_text(&stego).unwrap(), msg);
        assert_eq!(embed_text(&c, &[b'q'; 33]), Err(StegoError::CapacityExceeded));
    }

    #[test]
    fn tiny_channel_has_no_capacity() {
        let c = textured(2, 2);
        assert_eq!(capacity(2, 2), 0);
        assert_eq!(embed_text(&c, b"a"), Err(StegoError::CapacityExceeded));
        assert_eq!(extract_text(&c), Err(StegoError::NotFound));
    }

    #[test]
    fn empty_and_zero_messages_rejected() {
        let c = textured(8, 8);
        assert_eq!(embed_text(&c, b""), Err(StegoError::EmptyMessage));
        assert!(matches!(embed_text(&c, &[0, 0]), Err(StegoError::InvalidParams(_))));
    }

    #[test]
    fn clean_channel_not_found() {
        let c = Channel::new(8, 8, vec![128.0; 64]).unwrap();
        assert_eq!(extract_text(&c), Err(StegoError::NotFound));
    }

    #[test]
    fn bad_max_slot_is_malformed() {
        let c = textured(8, 8);
        let mut sb = dwt2(&c);
        sb.ch[0] = 3.0;
        sb.ch[1] = 300.0;
        assert_eq!(extract_text(&idwt2(&sb)), Err(StegoError::Malformed));
    }

    #[test]
    fn plane_export_leaves_other_channels() {
        let mut rgb = Vec::new();
        for i in 0..64u32 {
            rgb.extend_from_slice(&[(i * 3) as u8, 128, (255 - i) as u8]);
        }
        let plane = PixelPlane::new(8, 8, rgb).unwrap();
        let mut stego = plane.clone();
        embed_text(&Channel::from_plane(&plane, ColorChannel::Green), b"hi")
            .unwrap()
            .write_to_plane(&mut stego, ColorChannel::Green)
            .unwrap();
        for (a, b) in plane.rgb().chunks(3).zip(stego.rgb().chunks(3)) {
            assert_eq!(a[0], b[0]);
            assert_eq!(a[2], b[2]);
        }
    }

    #[test]
    fn plane_export_reports_clipping() {
        let plane = PixelPlane::filled(8, 8, [128, 128, 128]).unwrap();
        // n = 1, M = 'z' → cV[0] = 255 pushes samples far out of range.
        let stego = embed_text(&Channel::from_plane(&plane, ColorChannel::Green), b"z").unwrap();
        let mut out = plane.clone();
        assert!(stego.write_to_plane(&mut out, ColorChannel::Green).unwrap() > 0);
    }

    #[test]
    fn lossy_plane_export_is_an_error() {
        let plane = PixelPlane::filled(8, 8, [128, 128, 128]).unwrap();
        for msg in [&b"z"[..], b"hi", b"hello"] {
            assert_eq!(
                embed_in_plane(&plane, msg, ColorChannel::Green),
                Err(StegoError::SampleRangeExceeded)
            );
        }
    }

    #[test]
    fn get_is_bounds_checked() {
        let c = textured(4, 3);
        assert!(c.get(3, 2).is_some());
        assert_eq!(c.get(4, 0), None);
        assert_eq!(c.get(0, 3), None);
    }

    #[test]
    fn channel_new_validates() {
        assert!(Channel::new(2, 2, vec![0.0; 3]).is_err());
    }
}
