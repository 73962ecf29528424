// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Quantization Index Modulation on single wavelet coefficients.
//!
//! A bit is carried by the parity of `round(c / q)`: even levels encode 0,
//! odd levels encode 1. Embedding moves the coefficient to the nearest
//! level of the right parity; extraction just reads the parity back. Any
//! perturbation smaller than `q / 2` leaves the extracted bit unchanged.

/// Step-size tiers for [`choose_q`], as `(fill denominator, q)`.
///
/// A payload using at most `1/denominator` of the capacity gets the
/// corresponding step. The last entry is the fallback for fuller covers.
const Q_TIERS: [(usize, f64); 4] = [(16, 16.0), (4, 12.0), (2, 10.0), (1, 8.0)];

/// Bound on `|coeff / q|` for [`embed_bit`]: 2^52.
pub const MAX_LEVEL: f64 = 4_503_599_627_370_496.0;

fn parity(level: f64) -> u8 {
    if level.rem_euclid(2.0) == 0.0 { 0 } else { 1 }
}

/// Embed `bit` into `coeff` with step `q`, returning the new coefficient.
///
/// `level = round(coeff / q)`; if its parity differs from `bit` the level
/// moves by one toward `coeff / q`. The result is `level * q`.
///
/// # Domain
/// `|coeff / q|` must stay below [`MAX_LEVEL`]. Past 2^52 an `f64` has no
/// fractional part left and past 2^53 odd levels are not representable at
/// all. An overflow to infinity carries no bit. Wavelet coefficients of 8-bit planes
/// with the validated `q` range are many orders of magnitude inside it.
pub fn embed_bit(coeff: f64, bit: u8, q: f64) -> f64 {
    debug_assert!(bit <= 1);
    debug_assert!(q > 0.0);
    debug_assert!((coeff / q).abs() < MAX_LEVEL, "coeff / q outside the QIM domain");

    let x = coeff / q;
    let mut level = x.round();
    if parity(level) != bit & 1 {
        level += if x >= level { 1.0 } else { -1.0 };
    }
    level * q
}

/// Extract the bit carried by `coeff` at step `q`.
pub fn extract_bit(coeff: f64, q: f64) -> u8 {
    debug_assert!(q > 0.0);
    parity((coeff / q).round())
}

/// Embed `bit` like [`embed_bit`], but never return a magnitude below `floor`.
///
/// When the nearest level of the right parity falls inside `(-floor, floor)`
/// the coefficient is pushed outward, on the side of `coeff`, to the
/// smallest level of that parity clearing `floor`. This keeps embedded
/// coefficients above the selection threshold.
pub fn embed_bit_above(coeff: f64, bit: u8, q: f64, floor: f64) -> f64 {
    let v = embed_bit(coeff, bit, q);
    if v.abs() >= floor {
        return v;
    }
    let mut m = (floor / q).ceil();
    if parity(m) != bit & 1 {
        m += 1.0;
    }
    if coeff < 0.0 { -m * q } else { m * q }
}

/// Pick the body QIM step from the framed payload size and the capacity.
///
/// Pure function of two values the decoder knows after reading the frame
/// header: sparse payloads get a coarser, more robust step; payloads that
/// fill the cover get a finer step to bound distortion.
pub fn choose_q(payload_bits: usize, capacity_bits: usize) -> f64 {
    for &(den, q) in &Q_TIERS {
        if payload_bits.saturating_mul(den) <= capacity_bits {
            return q;
        }
    }
    Q_TIERS[Q_TIERS.len() - 1].1
}
