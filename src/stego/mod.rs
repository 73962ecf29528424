// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Steganographic encoding and decoding in the wavelet domain.
//!
//! A payload is framed (Huffman compression, Reed-Solomon protection of the
//! code table and body), written bit by bit into the wavelet coefficients
//! selected by a deterministic plan using Quantization Index Modulation,
//! and read back in the same order.
//!
//! - [`selection`]: which coefficients carry bits, and in what order.
//! - [`qim`]: how a single coefficient carries a bit.
//! - [`frame`]: how the payload is serialized and protected.
//! - [`encode`] / [`decode`] / [`capacity`]: the end-to-end pipelines.

pub mod bitio;
pub mod ecc;
pub mod error;
pub mod frame;
pub mod huffman;
pub mod params;
mod pipeline;
pub mod qim;
pub mod quality;
pub mod selection;

pub use error::{FrameError, StegoError};
pub use frame::{Frame, FrameHeader};
pub use params::{default_band_order, EmbeddingParameters};
pub use pipeline::{capacity, decode, encode, CapacityInfo, HEADER_COPIES};
pub use quality::{psnr, QualityReport};
pub use selection::{CoefficientAddress, CoefficientPlan};
