// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the steganography pipeline.
//!
//! [`FrameError`] covers payload framing (Huffman + Reed-Solomon);
//! [`StegoError`] covers everything from parameter validation through
//! embedding and extraction, wrapping the lower layers.

use core::fmt;

use crate::wavelet::{BandName, WaveletError};

/// Errors raised while building or opening a payload frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The payload length does not fit the 32-bit length field.
    PayloadTooLarge,
    /// The serialized frame ends before the lengths in its header say it should.
    Truncated,
    /// The header names an ECC strength outside the supported tiers.
    InvalidEccStrength(u8),
    /// A block length cannot have been produced with the stated ECC strength.
    InconsistentBlockLength,
    /// The Huffman tree block could not be corrected or parsed.
    TreeDecodingFailed,
    /// The compressed body block could not be corrected or decoded.
    BodyDecodingFailed,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge => write!(f, "payload exceeds 4 GiB frame limit"),
            Self::Truncated => write!(f, "frame truncated"),
            Self::InvalidEccStrength(s) => write!(f, "unsupported ECC strength: {s}"),
            Self::InconsistentBlockLength => write!(f, "block length inconsistent with ECC strength"),
            Self::TreeDecodingFailed => write!(f, "Huffman tree block unrecoverable"),
            Self::BodyDecodingFailed => write!(f, "compressed body block unrecoverable"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug)]
pub enum StegoError {
    /// The wavelet layer rejected a plane (e.g. unsupported dimensions).
    Transform(WaveletError),
    /// Payload framing or unframing failed.
    Frame(FrameError),
    /// The embedding parameters are internally inconsistent.
    InvalidParameters(&'static str),
    /// A band in the band order is not part of the decomposition.
    UnknownBand(BandName),
    /// Cover channels do not share the same dimensions.
    ChannelMismatch,
    /// No channel was supplied.
    NoChannels,
    /// The framed payload does not fit into the selected coefficients.
    CapacityExceeded { required_bits: usize, available_bits: usize },
    /// The extracted header disagrees with the decoder's parameters.
    ParameterMismatch(&'static str),
    /// The produced stego image does not reproduce the embedded bits.
    UnstableEmbedding { mismatched_bits: usize },
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(e) => write!(f, "wavelet transform: {e}"),
            Self::Frame(e) => write!(f, "payload frame: {e}"),
            Self::InvalidParameters(msg) => write!(f, "invalid embedding parameters: {msg}"),
            Self::UnknownBand(b) => write!(f, "band {b} not present in decomposition"),
            Self::ChannelMismatch => write!(f, "cover channels differ in size"),
            Self::NoChannels => write!(f, "no pixel planes supplied"),
            Self::CapacityExceeded { required_bits, available_bits } => write!(
                f,
                "payload needs {required_bits} bits but only {available_bits} are available"
            ),
            Self::ParameterMismatch(msg) => write!(f, "parameter mismatch: {msg}"),
            Self::UnstableEmbedding { mismatched_bits } => write!(
                f,
                "stego image does not reproduce {mismatched_bits} embedded bits (sample clipping)"
            ),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transform(e) => Some(e),
            Self::Frame(e) => Some(e),
            _ => None,
        }
    }
}

impl From<WaveletError> for StegoError {
    fn from(e: WaveletError) -> Self {
        Self::Transform(e)
    }
}

impl From<FrameError> for StegoError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}
