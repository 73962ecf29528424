// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Sub-band naming and storage.
//!
//! A [`BandSet`] holds every coefficient matrix produced by one multi-level
//! decomposition: the `HL`, `LH` and `HH` detail bands of each level plus
//! the approximation band `LL` of the deepest level. Bands are addressed by
//! [`BandName`], written `LL2`, `HL1`, … in parameters and metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Orientation of a sub-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BandKind {
    /// Approximation (low-pass in both directions).
    LL,
    /// Horizontal detail (high-pass across columns).
    HL,
    /// Vertical detail (high-pass across rows).
    LH,
    /// Diagonal detail.
    HH,
}

impl BandKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::LL => "LL",
            Self::HL => "HL",
            Self::LH => "LH",
            Self::HH => "HH",
        }
    }
}

/// A band identifier: orientation plus decomposition level (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BandName {
    pub kind: BandKind,
    pub level: u8,
}

impl BandName {
    pub const fn new(kind: BandKind, level: u8) -> Self {
        Self { kind, level }
    }

    pub const fn ll(level: u8) -> Self {
        Self::new(BandKind::LL, level)
    }

    pub const fn hl(level: u8) -> Self {
        Self::new(BandKind::HL, level)
    }

    pub const fn lh(level: u8) -> Self {
        Self::new(BandKind::LH, level)
    }

    pub const fn hh(level: u8) -> Self {
        Self::new(BandKind::HH, level)
    }

    /// Whether a decomposition of depth `levels` produces this band.
    ///
    /// Detail bands exist for every level in `1..=levels`; the
    /// approximation band only survives at the deepest level.
    pub fn exists_in(self, levels: u8) -> bool {
        match self.kind {
            BandKind::LL => self.level == levels && levels >= 1,
            _ => self.level >= 1 && self.level <= levels,
        }
    }
}

impl fmt::Display for BandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.as_str(), self.level)
    }
}

/// Error returned when a band name string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBandError(pub String);

impl fmt::Display for ParseBandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid band name: {:?}", self.0)
    }
}

impl std::error::Error for ParseBandError {}

impl FromStr for BandName {
    type Err = ParseBandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseBandError(s.to_string());
        if s.len() < 3 || !s.is_char_boundary(2) {
            return Err(err());
        }
        let (prefix, digits) = s.split_at(2);
        let kind = match prefix.to_ascii_uppercase().as_str() {
            "LL" => BandKind::LL,
            "HL" => BandKind::HL,
            "LH" => BandKind::LH,
            "HH" => BandKind::HH,
            _ => return Err(err()),
        };
        let level: u8 = digits.parse().map_err(|_| err())?;
        if level == 0 {
            return Err(err());
        }
        Ok(Self { kind, level })
    }
}

impl From<BandName> for String {
    fn from(b: BandName) -> Self {
        b.to_string()
    }
}

impl TryFrom<String> for BandName {
    type Error = ParseBandError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One coefficient matrix, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub name: BandName,
    pub rows: usize,
    pub cols: usize,
    pub coeffs: Vec<f64>,
}

impl Band {
    pub fn new(name: BandName, rows: usize, cols: usize, coeffs: Vec<f64>) -> Self {
        debug_assert_eq!(coeffs.len(), rows * cols);
        Self { name, rows, cols, coeffs }
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.coeffs[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.coeffs[row * self.cols + col] = value;
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }
}

/// All bands of a `levels`-deep decomposition of a `width × height` plane.
///
/// Bands are stored finest level first: `HL1, LH1, HH1, HL2, …, HH_L, LL_L`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSet {
    width: usize,
    height: usize,
    levels: u8,
    bands: Vec<Band>,
}

impl BandSet {
    pub(crate) fn from_parts(width: usize, height: usize, levels: u8, bands: Vec<Band>) -> Self {
        Self { width, height, levels, bands }
    }

    /// Width of the source plane.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the source plane.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band(&self, name: BandName) -> Option<&Band> {
        self.bands.iter().find(|b| b.name == name)
    }

    pub fn band_mut(&mut self, name: BandName) -> Option<&mut Band> {
        self.bands.iter_mut().find(|b| b.name == name)
    }

    /// Total number of coefficients across all bands.
    ///
    /// Always equals `width * height` for a set produced by `decompose`.
    pub fn coefficient_count(&self) -> usize {
        self.bands.iter().map(Band::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_roundtrip() {
        for name in [BandName::ll(2), BandName::hl(1), BandName::lh(3), BandName::hh(12)] {
            let s = name.to_string();
            assert_eq!(s.parse::<BandName>().unwrap(), name, "{s}");
        }
        assert_eq!(BandName::ll(2).to_string(), "LL2");
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("hl2".parse::<BandName>().unwrap(), BandName::hl(2));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "LL", "XX1", "LL0", "LLx", "L1", "HH-1"] {
            assert!(bad.parse::<BandName>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn existence_by_levels() {
        assert!(BandName::ll(2).exists_in(2));
        assert!(!BandName::ll(1).exists_in(2));
        assert!(BandName::hh(1).exists_in(2));
        assert!(BandName::hh(2).exists_in(2));
        assert!(!BandName::hh(3).exists_in(2));
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&BandName::hl(2)).unwrap();
        assert_eq!(json, "\"HL2\"");
        let back: BandName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BandName::hl(2));
        assert!(serde_json::from_str::<BandName>("\"QQ2\"").is_err());
    }
}
