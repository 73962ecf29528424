// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Multi-level discrete wavelet transform of single-channel pixel planes.
//!
//! [`decompose`] applies the orthonormal Haar step recursively: level `n+1`
//! decomposes the approximation band of level `n`. [`reconstruct`] inverts
//! the cascade and rounds/clamps back to 8-bit samples. Unmodified bands
//! reconstruct the original plane exactly.
//!
//! This layer performs no embedding and holds no shared state, so separate
//! color channels can be transformed on separate threads.

pub mod band;
pub mod error;
pub mod haar;

pub use band::{Band, BandKind, BandName, BandSet};
pub use error::{Result, WaveletError};

/// Maximum supported decomposition depth.
pub const MAX_LEVELS: u8 = 6;

/// Worst-case shift of a level-`level` coefficient caused by rounding the
/// reconstructed plane to integer samples.
///
/// Each sample moves by at most 0.5 and a level-`l` Haar basis function has
/// `4^l` taps of magnitude `2^-l`, so the coefficient moves by at most
/// `0.5 * 2^l`.
pub fn noise_bound(level: u8) -> f64 {
    0.5 * f64::from(1u32 << level.min(16))
}

/// One channel of 8-bit samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelPlane {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl PixelPlane {
    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    /// [`WaveletError::SampleCountMismatch`] if `samples.len() != width * height`.
    pub fn new(width: usize, height: usize, samples: Vec<u8>) -> Result<Self> {
        let expected = width * height;
        if samples.len() != expected {
            return Err(WaveletError::SampleCountMismatch { expected, actual: samples.len() });
        }
        Ok(Self { width, height, samples })
    }

    /// Build a plane by evaluating `f(row, col)` for every sample.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for r in 0..height {
            for c in 0..width {
                samples.push(f(r, c));
            }
        }
        Self { width, height, samples }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.samples[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.samples[row * self.width + col] = value;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Check that a `width × height` plane can be decomposed `levels` times.
pub fn check_dimensions(width: usize, height: usize, levels: u8) -> Result<()> {
    if levels == 0 || levels > MAX_LEVELS {
        return Err(WaveletError::InvalidLevels(levels));
    }
    let unit = 1usize << levels;
    if width == 0 || height == 0 || width % unit != 0 || height % unit != 0 {
        return Err(WaveletError::UnsupportedDimensions { width, height, levels });
    }
    Ok(())
}

/// Decompose `plane` into `levels` levels of Haar sub-bands.
///
/// # Errors
/// - [`WaveletError::InvalidLevels`] if `levels` is 0 or above [`MAX_LEVELS`].
/// - [`WaveletError::UnsupportedDimensions`] if width or height is not
///   divisible by `2^levels`.
pub fn decompose(plane: &PixelPlane, levels: u8) -> Result<BandSet> {
    check_dimensions(plane.width, plane.height, levels)?;

    let mut rows = plane.height;
    let mut cols = plane.width;
    let mut current: Vec<f64> = plane.samples.iter().map(|&s| f64::from(s)).collect();
    let mut bands = Vec::with_capacity(3 * levels as usize + 1);

    for level in 1..=levels {
        let step = haar::forward(&current, rows, cols);
        let (hr, hc) = (step.half_rows, step.half_cols);
        bands.push(Band::new(BandName::hl(level), hr, hc, step.hl));
        bands.push(Band::new(BandName::lh(level), hr, hc, step.lh));
        bands.push(Band::new(BandName::hh(level), hr, hc, step.hh));
        current = step.ll;
        rows = hr;
        cols = hc;
    }
    bands.push(Band::new(BandName::ll(levels), rows, cols, current));

    Ok(BandSet::from_parts(plane.width, plane.height, levels, bands))
}

/// Invert the decomposition without rounding or clamping.
///
/// # Errors
/// [`WaveletError::MalformedBandSet`] if any band is missing or mis-shaped.
pub fn reconstruct_unclamped(bands: &BandSet) -> Result<Vec<f64>> {
    let levels = bands.levels();
    let fetch = |name: BandName, rows: usize, cols: usize| -> Result<&[f64]> {
        match bands.band(name) {
            Some(b) if b.rows == rows && b.cols == cols => Ok(&b.coeffs),
            _ => Err(WaveletError::MalformedBandSet),
        }
    };

    let mut rows = bands.height() >> levels;
    let mut cols = bands.width() >> levels;
    let mut current = fetch(BandName::ll(levels), rows, cols)?.to_vec();

    for level in (1..=levels).rev() {
        let hl = fetch(BandName::hl(level), rows, cols)?;
        let lh = fetch(BandName::lh(level), rows, cols)?;
        let hh = fetch(BandName::hh(level), rows, cols)?;
        current = haar::inverse(&current, hl, lh, hh, rows, cols);
        rows *= 2;
        cols *= 2;
    }

    Ok(current)
}

/// Invert the decomposition, rounding to the nearest sample and clamping to
/// `[0, 255]`.
///
/// # Errors
/// [`WaveletError::MalformedBandSet`] if any band is missing or mis-shaped.
pub fn reconstruct(bands: &BandSet) -> Result<PixelPlane> {
    let values = reconstruct_unclamped(bands)?;
    let samples = values.iter().map(|&v| v.round().clamp(0.0, 255.0) as u8).collect();
    Ok(PixelPlane { width: bands.width(), height: bands.height(), samples })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: usize, height: usize) -> PixelPlane {
        PixelPlane::from_fn(width, height, |r, c| ((r * 31 + c * 17 + (r * c) % 13) % 256) as u8)
    }

    #[test]
    fn coefficient_count_matches_pixels() {
        let plane = textured(32, 16);
        for levels in 1..=3 {
            let bands = decompose(&plane, levels).unwrap();
            assert_eq!(bands.coefficient_count(), 32 * 16, "levels={levels}");
            assert_eq!(bands.bands().len(), 3 * levels as usize + 1);
        }
    }

    #[test]
    fn roundtrip_is_exact() {
        let plane = textured(64, 32);
        for levels in 1..=4 {
            let bands = decompose(&plane, levels).unwrap();
            assert_eq!(reconstruct(&bands).unwrap(), plane, "levels={levels}");
        }
    }

    #[test]
    fn band_shapes_halve_per_level() {
        let bands = decompose(&textured(64, 32), 3).unwrap();
        let hl1 = bands.band(BandName::hl(1)).unwrap();
        assert_eq!((hl1.rows, hl1.cols), (16, 32));
        let hh3 = bands.band(BandName::hh(3)).unwrap();
        assert_eq!((hh3.rows, hh3.cols), (4, 8));
        let ll3 = bands.band(BandName::ll(3)).unwrap();
        assert_eq!((ll3.rows, ll3.cols), (4, 8));
        assert!(bands.band(BandName::ll(1)).is_none());
    }

    #[test]
    fn flat_plane_has_zero_detail() {
        let plane = PixelPlane::from_fn(16, 16, |_, _| 100);
        let bands = decompose(&plane, 2).unwrap();
        for band in bands.bands() {
            if band.name.kind == BandKind::LL {
                // LL2 = 100 * 16 / 4
                assert!(band.coeffs.iter().all(|&c| c == 400.0));
            } else {
                assert!(band.coeffs.iter().all(|&c| c == 0.0), "{}", band.name);
            }
        }
    }

    #[test]
    fn rejects_indivisible_dimensions() {
        let plane = textured(24, 16);
        assert!(decompose(&plane, 3).is_ok());
        assert_eq!(
            decompose(&plane, 4),
            Err(WaveletError::UnsupportedDimensions { width: 24, height: 16, levels: 4 })
        );
        let odd = textured(10, 9);
        assert!(matches!(decompose(&odd, 1), Err(WaveletError::UnsupportedDimensions { .. })));
    }

    #[test]
    fn rejects_invalid_levels() {
        let plane = textured(128, 128);
        assert_eq!(decompose(&plane, 0), Err(WaveletError::InvalidLevels(0)));
        assert_eq!(decompose(&plane, 7), Err(WaveletError::InvalidLevels(7)));
    }

    #[test]
    fn reconstruct_clamps_out_of_range() {
        let plane = PixelPlane::from_fn(4, 4, |_, _| 250);
        let mut bands = decompose(&plane, 1).unwrap();
        for c in bands.band_mut(BandName::ll(1)).unwrap().coeffs.iter_mut() {
            *c += 40.0; // +20 per sample
        }
        let out = reconstruct(&bands).unwrap();
        assert!(out.samples().iter().all(|&s| s == 255));
    }

    #[test]
    fn malformed_band_set_rejected() {
        let mut bands = decompose(&textured(8, 8), 1).unwrap();
        bands.band_mut(BandName::hh(1)).unwrap().coeffs.pop();
        bands.band_mut(BandName::hh(1)).unwrap().rows = 3;
        assert_eq!(reconstruct(&bands), Err(WaveletError::MalformedBandSet));
    }

    #[test]
    fn sample_count_checked() {
        assert_eq!(
            PixelPlane::new(4, 4, vec![0; 15]),
            Err(WaveletError::SampleCountMismatch { expected: 16, actual: 15 })
        );
    }

    #[test]
    fn noise_bound_doubles_per_level() {
        assert_eq!(noise_bound(1), 1.0);
        assert_eq!(noise_bound(2), 2.0);
        assert_eq!(noise_bound(3), 4.0);
    }
}
