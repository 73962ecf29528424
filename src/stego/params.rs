// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Embedding parameters shared by encoder and decoder.
//!
//! Every value that influences where and how bits are written lives in
//! [`EmbeddingParameters`]. The same value must be handed to both `encode`
//! and `decode`; nothing here is re-derived from the image. The struct is
//! serde-serializable so it can travel next to the stego image as metadata.

use serde::{Deserialize, Serialize};

use super::error::StegoError;
use super::selection::guard;
use crate::wavelet::{BandName, MAX_LEVELS};

/// Default QIM step for the header region (and floor for the body step).
pub const DEFAULT_Q_FACTOR: f64 = 10.0;

/// Default decomposition depth.
pub const DEFAULT_DWT_LEVELS: u8 = 2;

/// Default magnitude threshold for coefficient selection.
pub const DEFAULT_MAGNITUDE_THRESHOLD: f64 = 8.0;

/// Parameters that fully determine the coefficient plan and QIM steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingParameters {
    /// QIM step for the frame header; the body step never drops below it.
    pub q_factor: f64,
    /// Number of wavelet decomposition levels.
    pub dwt_levels: u8,
    /// Bands in embedding order (low frequencies first is most robust).
    pub band_order: Vec<BandName>,
    /// Only coefficients with `|c| > magnitude_threshold` carry bits.
    pub magnitude_threshold: f64,
}

impl Default for EmbeddingParameters {
    fn default() -> Self {
        Self {
            q_factor: DEFAULT_Q_FACTOR,
            dwt_levels: DEFAULT_DWT_LEVELS,
            band_order: default_band_order(DEFAULT_DWT_LEVELS),
            magnitude_threshold: DEFAULT_MAGNITUDE_THRESHOLD,
        }
    }
}

impl EmbeddingParameters {
    /// Default parameters for a given decomposition depth.
    pub fn with_levels(levels: u8) -> Self {
        Self {
            dwt_levels: levels,
            band_order: default_band_order(levels),
            ..Self::default()
        }
    }

    /// Deepest level among the bands in `band_order`.
    pub fn deepest_level(&self) -> u8 {
        self.band_order.iter().map(|b| b.level).max().unwrap_or(0)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// - [`StegoError::InvalidParameters`] for out-of-range values or an
    ///   empty/duplicated band order.
    /// - [`StegoError::UnknownBand`] if a band is not produced by a
    ///   `dwt_levels`-deep decomposition.
    pub fn validate(&self) -> Result<(), StegoError> {
        if self.dwt_levels == 0 || self.dwt_levels > MAX_LEVELS {
            return Err(StegoError::InvalidParameters("dwt_levels must be in 1..=6"));
        }
        if self.band_order.is_empty() {
            return Err(StegoError::InvalidParameters("band_order is empty"));
        }
        for (i, band) in self.band_order.iter().enumerate() {
            if !band.exists_in(self.dwt_levels) {
                return Err(StegoError::UnknownBand(*band));
            }
            if self.band_order[..i].contains(band) {
                return Err(StegoError::InvalidParameters("band_order contains duplicates"));
            }
        }

        let g = guard(self.deepest_level());
        if !self.q_factor.is_finite() || self.q_factor <= 2.0 * g {
            return Err(StegoError::InvalidParameters(
                "q_factor must exceed twice the rounding guard of the deepest band",
            ));
        }
        if !self.magnitude_threshold.is_finite() || self.magnitude_threshold < g {
            return Err(StegoError::InvalidParameters(
                "magnitude_threshold must be at least the rounding guard of the deepest band",
            ));
        }
        Ok(())
    }
}

/// Low-frequency-first band order for a `levels`-deep decomposition.
///
/// `LL_L`, then the `HL`/`LH` pairs from the deepest level up, then the
/// diagonal bands. For two levels: `[LL2, HL2, LH2, HL1, LH1, HH2, HH1]`.
pub fn default_band_order(levels: u8) -> Vec<BandName> {
    if levels == 0 {
        return Vec::new();
    }
    let mut order = Vec::with_capacity(3 * levels as usize + 1);
    order.push(BandName::ll(levels));
    for level in (1..=levels).rev() {
        order.push(BandName::hl(level));
        order.push(BandName::lh(level));
    }
    for level in (1..=levels).rev() {
        order.push(BandName::hh(level));
    }
    order
}
