// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Distortion measurement for stego images.

use serde::Serialize;

use super::error::StegoError;
use crate::wavelet::PixelPlane;

/// Summary of one `encode` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    /// PSNR of the stego image against the cover, in dB (`inf` if identical).
    pub psnr_db: f64,
    /// Bits written, header copies included.
    pub bits_used: usize,
    /// Bits the coefficient plan could carry.
    pub bits_available: usize,
    /// QIM step used for the header region.
    pub header_q: f64,
    /// QIM step used for the frame body.
    pub body_q: f64,
}

/// Peak signal-to-noise ratio over all samples of all channels.
///
/// `10 * log10(255^2 / MSE)`; infinite when the images are identical.
///
/// # Errors
/// [`StegoError::ChannelMismatch`] if the channel counts differ or a pair of
/// planes differs in dimensions.
pub fn psnr(cover: &[PixelPlane], stego: &[PixelPlane]) -> Result<f64, StegoError> {
    if cover.len() != stego.len() {
        return Err(StegoError::ChannelMismatch);
    }
    let mut sum_sq = 0u64;
    let mut count = 0usize;
    for (c, s) in cover.iter().zip(stego) {
        if c.width() != s.width() || c.height() != s.height() {
            return Err(StegoError::ChannelMismatch);
        }
        for (&a, &b) in c.samples().iter().zip(s.samples()) {
            let d = a as i64 - b as i64;
            sum_sq += (d * d) as u64;
        }
        count += c.len();
    }
    if sum_sq == 0 || count == 0 {
        return Ok(f64::INFINITY);
    }
    let mse = sum_sq as f64 / count as f64;
    Ok(10.0 * (255.0f64 * 255.0 / mse).log10())
}
