// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Encode and decode pipelines.
//!
//! Bit layout over the combined coefficient plan (channel 0's plan, then
//! channel 1's, and so on):
//!
//! ```text
//! [ header x HEADER_COPIES @ q_factor ][ tree_block | body_block @ body_q ]
//! ```
//!
//! The header is read first with the step from the parameters. It yields
//! the block lengths, and with them the body step and the exact number of
//! bits left to read. The body step depends on the frame length and the
//! band budget (coefficients in the ordered bands), never on the plan
//! length: clipping can add or drop plan entries past the last embedded
//! bit, but cannot change the plane dimensions.

use serde::Serialize;
use tracing::{debug, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::ecc;
use super::error::StegoError;
use super::frame::{self, bits_to_bytes, bytes_to_bits, Frame, FrameHeader, HEADER_BITS};
use super::params::EmbeddingParameters;
use super::qim::{choose_q, embed_bit_above, extract_bit};
use super::quality::{psnr, QualityReport};
use super::selection::{self, CoefficientAddress, CoefficientPlan};
use crate::wavelet::{self, BandSet, PixelPlane};

/// Number of back-to-back header copies, read back by per-bit majority vote.
pub const HEADER_COPIES: usize = 3;

/// Bits occupied by all header copies.
pub const HEADER_REGION_BITS: usize = HEADER_BITS * HEADER_COPIES;

/// Result of [`capacity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacityInfo {
    /// Coefficients selected across all channels.
    pub bits_available: usize,
    /// Longest payload that fits assuming it does not compress.
    pub max_message_bytes_estimate: usize,
}

/// Hide `payload` in `cover`, returning the stego planes and a quality report.
///
/// Each plane is one channel; all must share the same dimensions.
///
/// # Errors
/// - [`StegoError::InvalidParameters`] / [`StegoError::UnknownBand`] for bad `params`.
/// - [`StegoError::NoChannels`] / [`StegoError::ChannelMismatch`] for bad input planes.
/// - [`StegoError::Transform`] if the dimensions do not allow `dwt_levels` levels.
/// - [`StegoError::CapacityExceeded`] if the framed payload does not fit.
///   No coefficient is modified in that case.
/// - [`StegoError::UnstableEmbedding`] if the stego image does not read back
///   (only possible when heavy sample clipping distorts coefficients).
pub fn encode(
    cover: &[PixelPlane],
    payload: &[u8],
    params: &EmbeddingParameters,
) -> Result<(Vec<PixelPlane>, QualityReport), StegoError> {
    params.validate()?;
    check_channels(cover)?;

    let frame = frame::frame(payload)?;
    let bits = layout_bits(&frame);
    let required = bits.len();

    let mut bandsets = decompose_all(cover, params.dwt_levels)?;
    let plans = plan_all(&bandsets, params)?;
    let available: usize = plans.iter().map(selection::capacity_bits).sum();

    if required > available {
        return Err(StegoError::CapacityExceeded { required_bits: required, available_bits: available });
    }

    let budget = band_budget(&bandsets, &params.band_order)?;
    let header_q = params.q_factor;
    let body_q = body_step(params.q_factor, frame.bit_len(), budget);
    debug!(
        payload = payload.len(),
        required,
        available,
        budget,
        header_q,
        body_q,
        channels = cover.len(),
        "embedding payload"
    );

    let offsets = channel_offsets(&plans);
    let ctx = EmbedContext { bits: &bits, header_q, body_q, threshold: params.magnitude_threshold };
    let band_order = params.band_order.as_slice();

    #[cfg(feature = "parallel")]
    let stabilized: Vec<usize> = bandsets
        .par_iter_mut()
        .zip(plans.par_iter())
        .zip(offsets.par_iter())
        .map(|((bands, plan), &offset)| ctx.embed_channel(bands, plan, offset, band_order))
        .collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let stabilized: Vec<usize> = bandsets
        .iter_mut()
        .zip(plans.iter())
        .zip(offsets.iter())
        .map(|((bands, plan), &offset)| ctx.embed_channel(bands, plan, offset, band_order))
        .collect::<Result<_, _>>()?;
    trace!(?stabilized, "guard-zone coefficients moved per channel");

    #[cfg(feature = "parallel")]
    let stego: Vec<PixelPlane> =
        bandsets.par_iter().map(wavelet::reconstruct).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let stego: Vec<PixelPlane> =
        bandsets.iter().map(wavelet::reconstruct).collect::<Result<_, _>>()?;

    let mismatched = verify(&stego, params, &bits, header_q, body_q)?;
    if mismatched > 0 {
        warn!(mismatched, "stego image does not reproduce embedded bits");
        return Err(StegoError::UnstableEmbedding { mismatched_bits: mismatched });
    }

    let report = QualityReport {
        psnr_db: psnr(cover, &stego)?,
        bits_used: required,
        bits_available: available,
        header_q,
        body_q,
    };
    debug!(psnr_db = report.psnr_db, "embedding complete");
    Ok((stego, report))
}

/// Recover the payload hidden in `stego` with the same `params` used to encode.
///
/// # Errors
/// - [`StegoError::ParameterMismatch`] if the header does not fit the plan,
///   is internally inconsistent, or implies more bits than the plan holds.
/// - [`StegoError::Frame`] if Reed-Solomon correction or Huffman decoding fails.
/// - The same parameter, channel and transform errors as [`encode`].
pub fn decode(stego: &[PixelPlane], params: &EmbeddingParameters) -> Result<Vec<u8>, StegoError> {
    params.validate()?;
    check_channels(stego)?;

    let bandsets = decompose_all(stego, params.dwt_levels)?;
    let plans = plan_all(&bandsets, params)?;
    let available: usize = plans.iter().map(selection::capacity_bits).sum();

    if available < HEADER_REGION_BITS {
        return Err(StegoError::ParameterMismatch("coefficient plan too short for the frame header"));
    }

    let region = read_bits(&bandsets, &plans, 0, HEADER_REGION_BITS, |_| params.q_factor)?;
    let header_bytes = bits_to_bytes(&majority_vote(&region));
    let header = FrameHeader::parse(&header_bytes)?;
    if header.validate().is_err() {
        return Err(StegoError::ParameterMismatch("frame header is inconsistent"));
    }

    let frame_bits = header.frame_len() * 8;
    let total = HEADER_REGION_BITS + header.blocks_len() * 8;
    if total > available {
        return Err(StegoError::ParameterMismatch(
            "frame header implies more bits than the coefficient plan holds",
        ));
    }

    let budget = band_budget(&bandsets, &params.band_order)?;
    let body_q = body_step(params.q_factor, frame_bits, budget);
    debug!(
        message_length = header.message_length,
        total,
        available,
        budget,
        body_q,
        "frame header read"
    );

    let blocks = bits_to_bytes(&read_bits(&bandsets, &plans, HEADER_REGION_BITS, total, |_| body_q)?);
    let tree_len = header.tree_block_len as usize;
    let frame = Frame {
        message_length: header.message_length,
        tree_ecc_strength: header.tree_ecc_strength,
        body_ecc_strength: header.body_ecc_strength,
        tree_block: blocks[..tree_len].to_vec(),
        body_block: blocks[tree_len..].to_vec(),
    };

    Ok(frame::unframe(&frame)?)
}

/// Report how many bits `cover` can carry under `params`.
///
/// # Errors
/// The same parameter, channel and transform errors as [`encode`].
pub fn capacity(cover: &[PixelPlane], params: &EmbeddingParameters) -> Result<CapacityInfo, StegoError> {
    params.validate()?;
    check_channels(cover)?;

    let bandsets = decompose_all(cover, params.dwt_levels)?;
    let plans = plan_all(&bandsets, params)?;
    let bits_available: usize = plans.iter().map(selection::capacity_bits).sum();

    Ok(CapacityInfo {
        bits_available,
        max_message_bytes_estimate: max_message_bytes(bits_available),
    })
}

/// Body QIM step: never below `q_factor`, coarser when the frame is sparse.
fn body_step(q_factor: f64, frame_bits: usize, budget: usize) -> f64 {
    q_factor.max(choose_q(frame_bits, budget))
}

/// Coefficients in the `band_order` bands, summed over all channels.
fn band_budget(bandsets: &[BandSet], band_order: &[wavelet::BandName]) -> Result<usize, StegoError> {
    let mut total = 0;
    for bands in bandsets {
        for &name in band_order {
            total += bands.band(name).ok_or(StegoError::UnknownBand(name))?.len();
        }
    }
    Ok(total)
}

/// Embedded bit sequence: header copies followed by the two blocks.
fn layout_bits(frame: &Frame) -> Vec<u8> {
    let header = bytes_to_bits(&frame.header().to_bytes());
    let mut bits = Vec::with_capacity(HEADER_REGION_BITS + frame.bit_len() - HEADER_BITS);
    for _ in 0..HEADER_COPIES {
        bits.extend_from_slice(&header);
    }
    bits.extend(bytes_to_bits(&frame.tree_block));
    bits.extend(bytes_to_bits(&frame.body_block));
    bits
}

/// Collapse the header region to one header by per-bit majority.
fn majority_vote(region: &[u8]) -> Vec<u8> {
    (0..HEADER_BITS)
        .map(|i| {
            let ones: usize = (0..HEADER_COPIES).map(|c| region[c * HEADER_BITS + i] as usize).sum();
            u8::from(ones * 2 > HEADER_COPIES)
        })
        .collect()
}

/// Largest payload whose incompressible framing fits in `bits_available`.
fn max_message_bytes(bits_available: usize) -> usize {
    let Some(block_bits) = bits_available.checked_sub(HEADER_REGION_BITS) else {
        return 0;
    };
    let budget = block_bits / 8;
    let framed = |m: usize| {
        let tree = 2 + 2 * m.min(256);
        ecc::rs_encoded_len(tree, ecc::choose_ecc_strength(tree))
            + ecc::rs_encoded_len(m, ecc::choose_ecc_strength(m))
    };
    if framed(0) > budget {
        return 0;
    }
    // framed() is monotone in m.
    let (mut lo, mut hi) = (0usize, budget);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if framed(mid) <= budget {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

fn check_channels(planes: &[PixelPlane]) -> Result<(), StegoError> {
    let first = planes.first().ok_or(StegoError::NoChannels)?;
    if planes.iter().any(|p| p.width() != first.width() || p.height() != first.height()) {
        return Err(StegoError::ChannelMismatch);
    }
    Ok(())
}

fn decompose_all(planes: &[PixelPlane], levels: u8) -> Result<Vec<BandSet>, StegoError> {
    #[cfg(feature = "parallel")]
    let bandsets = planes.par_iter().map(|p| wavelet::decompose(p, levels)).collect::<Result<_, _>>()?;
    #[cfg(not(feature = "parallel"))]
    let bandsets = planes.iter().map(|p| wavelet::decompose(p, levels)).collect::<Result<_, _>>()?;
    Ok(bandsets)
}

fn plan_all(bandsets: &[BandSet], params: &EmbeddingParameters) -> Result<Vec<CoefficientPlan>, StegoError> {
    bandsets
        .iter()
        .map(|b| selection::plan(b, &params.band_order, params.magnitude_threshold))
        .collect()
}

/// Index of each channel's first bit in the combined plan.
fn channel_offsets(plans: &[CoefficientPlan]) -> Vec<usize> {
    plans
        .iter()
        .scan(0usize, |acc, p| {
            let start = *acc;
            *acc += p.len();
            Some(start)
        })
        .collect()
}

fn coefficient(bands: &BandSet, addr: &CoefficientAddress) -> Result<f64, StegoError> {
    bands
        .band(addr.band)
        .map(|b| b.get(addr.row, addr.col))
        .ok_or(StegoError::UnknownBand(addr.band))
}

/// Extract bits `start..end` of the combined plan, with `q_at(index)` as step.
fn read_bits(
    bandsets: &[BandSet],
    plans: &[CoefficientPlan],
    start: usize,
    end: usize,
    q_at: impl Fn(usize) -> f64,
) -> Result<Vec<u8>, StegoError> {
    let mut out = Vec::with_capacity(end.saturating_sub(start));
    let addresses = plans
        .iter()
        .zip(bandsets)
        .flat_map(|(plan, bands)| plan.iter().map(move |a| (bands, a)));
    for (index, (bands, addr)) in addresses.enumerate().skip(start).take(end - start) {
        out.push(extract_bit(coefficient(bands, addr)?, q_at(index)));
    }
    Ok(out)
}

/// Count embedded bits the stego planes fail to reproduce.
fn verify(
    stego: &[PixelPlane],
    params: &EmbeddingParameters,
    bits: &[u8],
    header_q: f64,
    body_q: f64,
) -> Result<usize, StegoError> {
    let bandsets = decompose_all(stego, params.dwt_levels)?;
    let plans = plan_all(&bandsets, params)?;
    let available: usize = plans.iter().map(selection::capacity_bits).sum();
    let readable = bits.len().min(available);

    let q_at = |i: usize| if i < HEADER_REGION_BITS { header_q } else { body_q };
    let read = read_bits(&bandsets, &plans, 0, readable, q_at)?;
    let wrong = read.iter().zip(bits).filter(|(a, b)| a != b).count();
    Ok(wrong + (bits.len() - readable))
}

/// Per-encode state shared by all channels.
struct EmbedContext<'a> {
    bits: &'a [u8],
    header_q: f64,
    body_q: f64,
    threshold: f64,
}

impl EmbedContext<'_> {
    /// Stabilize one channel and write its share of the bits, starting at
    /// combined-plan index `offset`. Returns the number of coefficients the
    /// stabilization moved.
    fn embed_channel(
        &self,
        bands: &mut BandSet,
        plan: &CoefficientPlan,
        offset: usize,
        band_order: &[wavelet::BandName],
    ) -> Result<usize, StegoError> {
        let moved = selection::stabilize(bands, band_order, self.threshold)?;

        let end = (offset + plan.len()).min(self.bits.len());
        if offset >= end {
            return Ok(moved);
        }
        for (i, addr) in plan.iter().enumerate().take(end - offset) {
            let index = offset + i;
            let q = if index < HEADER_REGION_BITS { self.header_q } else { self.body_q };
            let floor = selection::embed_floor(addr.band, self.threshold);
            let band = bands.band_mut(addr.band).ok_or(StegoError::UnknownBand(addr.band))?;
            let c = band.get(addr.row, addr.col);
            band.set(addr.row, addr.col, embed_bit_above(c, self.bits[index], q, floor));
        }
        Ok(moved)
    }
}
