// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Deterministic coefficient selection.
//!
//! The coefficient plan is the ordered list of coefficient addresses that
//! carry payload bits. Encoder and decoder must derive the identical plan,
//! so it depends on nothing but the bands, the band order and the magnitude
//! threshold: bands are visited in `band_order`, each band in row-major
//! order, and a coefficient is taken iff `|c| > threshold`.
//!
//! Embedding changes coefficients and rounding the stego plane to integer
//! samples perturbs them again, which could move a coefficient across the
//! threshold and shift every later bit. [`stabilize`] prevents this on the
//! encoder side by clearing a guard zone around the threshold before any
//! bit is written.

use super::error::StegoError;
use crate::wavelet::{noise_bound, BandName, BandSet};

/// Extra margin on top of the rounding bound, absorbing float round-off.
const GUARD_SLACK: f64 = 0.25;

/// Half-width of the zone around the threshold that [`stabilize`] clears
/// for coefficients of a level-`level` band.
pub fn guard(level: u8) -> f64 {
    noise_bound(level) + GUARD_SLACK
}

/// Stable identifier of one coefficient inside a [`BandSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoefficientAddress {
    pub band: BandName,
    pub row: usize,
    pub col: usize,
}

/// Ordered sequence of embeddable coefficient addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoefficientPlan {
    addresses: Vec<CoefficientAddress>,
}

impl CoefficientPlan {
    pub fn addresses(&self) -> &[CoefficientAddress] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoefficientAddress> {
        self.addresses.iter()
    }
}

/// Build the coefficient plan for `bands`.
///
/// # Errors
/// [`StegoError::UnknownBand`] if `band_order` names a band absent from `bands`.
pub fn plan(
    bands: &BandSet,
    band_order: &[BandName],
    threshold: f64,
) -> Result<CoefficientPlan, StegoError> {
    let mut addresses = Vec::new();
    for &name in band_order {
        let band = bands.band(name).ok_or(StegoError::UnknownBand(name))?;
        for row in 0..band.rows {
            for col in 0..band.cols {
                if band.get(row, col).abs() > threshold {
                    addresses.push(CoefficientAddress { band: name, row, col });
                }
            }
        }
    }
    Ok(CoefficientPlan { addresses })
}

/// Number of bits the plan can carry (one per coefficient).
pub fn capacity_bits(plan: &CoefficientPlan) -> usize {
    plan.len()
}

/// Push every coefficient of the listed bands out of the guard zone around
/// `threshold`, returning the number of coefficients changed.
///
/// Selected coefficients (`|c| > threshold`) are raised to at least
/// `threshold + guard`, unselected ones lowered to at most
/// `threshold - guard`, keeping their sign. The plan computed before and
/// after is identical, and it survives rounding of the reconstructed plane.
///
/// # Errors
/// [`StegoError::UnknownBand`] if `band_order` names a band absent from `bands`.
pub fn stabilize(
    bands: &mut BandSet,
    band_order: &[BandName],
    threshold: f64,
) -> Result<usize, StegoError> {
    let mut changed = 0usize;
    for &name in band_order {
        let band = bands.band_mut(name).ok_or(StegoError::UnknownBand(name))?;
        let g = guard(name.level);
        let upper = threshold + g;
        let lower = (threshold - g).max(0.0);
        for c in band.coeffs.iter_mut() {
            let mag = c.abs();
            let target = if mag > threshold {
                if mag >= upper { continue; }
                upper
            } else {
                if mag <= lower { continue; }
                lower
            };
            *c = target.copysign(*c);
            changed += 1;
        }
    }
    Ok(changed)
}

/// Floor for embedded magnitudes in `band`: the upper edge of its guard zone.
pub fn embed_floor(band: BandName, threshold: f64) -> f64 {
    threshold + guard(band.level)
}
