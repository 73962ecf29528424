// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the wavelet transform layer.

use std::fmt;

/// Errors that can occur while decomposing or reconstructing a pixel plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveletError {
    /// Width or height is not divisible by `2^levels` (or is zero).
    UnsupportedDimensions { width: usize, height: usize, levels: u8 },
    /// Decomposition depth outside the supported range.
    InvalidLevels(u8),
    /// Sample buffer length does not match `width * height`.
    SampleCountMismatch { expected: usize, actual: usize },
    /// A band set is missing bands or has bands of the wrong shape.
    MalformedBandSet,
}

impl fmt::Display for WaveletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDimensions { width, height, levels } => write!(
                f,
                "unsupported dimensions {width}x{height} for {levels}-level decomposition"
            ),
            Self::InvalidLevels(l) => write!(f, "invalid decomposition depth: {l}"),
            Self::SampleCountMismatch { expected, actual } => {
                write!(f, "sample count mismatch: expected {expected}, got {actual}")
            }
            Self::MalformedBandSet => write!(f, "malformed band set"),
        }
    }
}

impl std::error::Error for WaveletError {}

pub type Result<T> = std::result::Result<T, WaveletError>;
