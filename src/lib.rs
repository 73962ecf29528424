// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # phasm-dwt
//!
//! Pure-Rust image steganography in the discrete wavelet domain. A byte
//! payload is compressed, protected with Reed-Solomon codes and hidden in
//! the Haar wavelet coefficients of one or more 8-bit pixel planes using
//! Quantization Index Modulation. Decoding with the same
//! [`EmbeddingParameters`] recovers the payload exactly.
//!
//! The crate works on raw sample planes; image file I/O, color conversion
//! and payload encryption are left to the caller.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use phasm_dwt::{decode, encode, EmbeddingParameters, PixelPlane};
//!
//! let cover = PixelPlane::new(width, height, gray_samples)?;
//! let params = EmbeddingParameters::default();
//! let (stego, report) = encode(&[cover], b"Hello Bob!", &params)?;
//! println!("PSNR {:.1} dB", report.psnr_db);
//! assert_eq!(decode(&stego, &params)?, b"Hello Bob!");
//! ```

pub mod stego;
pub mod wavelet;

pub use stego::{capacity, decode, encode, CapacityInfo, EmbeddingParameters, QualityReport};
pub use stego::{FrameError, StegoError};
pub use wavelet::{decompose, reconstruct, BandKind, BandName, BandSet, PixelPlane, WaveletError};
