// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Synthetic cover images shared by the integration tests.

#![allow(dead_code)]

use phasm_dwt::PixelPlane;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Smooth luminance field with seeded grain, kept inside [40, 216] so
/// embedding never clips.
pub fn photo_like(width: usize, height: usize, seed: u64) -> PixelPlane {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let phase = rng.gen_range(0.0..6.0);
    PixelPlane::from_fn(width, height, |r, c| {
        let y = r as f64 / 23.0;
        let x = c as f64 / 31.0;
        let base = 128.0 + 60.0 * (y + phase).sin() * (x - phase).cos();
        let grain: f64 = rng.gen_range(-12.0..=12.0);
        (base + grain).round().clamp(40.0, 216.0) as u8
    })
}

/// [`photo_like`] with 4x4 patches driven to the ends of the sample range
/// or replaced by noise. Embedding next to 0 and 255 clips.
pub fn saturated(width: usize, height: usize, seed: u64) -> PixelPlane {
    let base = photo_like(width, height, seed);
    let mut rng = ChaCha20Rng::seed_from_u64(seed ^ 0x5a5a);
    let cols = width.div_ceil(4);
    let patches: Vec<u8> = (0..cols * height.div_ceil(4)).map(|_| rng.gen_range(0..6)).collect();
    PixelPlane::from_fn(width, height, |r, c| match patches[(r / 4) * cols + c / 4] {
        0 => rng.gen_range(250..=255),
        1 => rng.gen_range(0..=5),
        2 => rng.gen(),
        _ => base.get(r, c),
    })
}

/// Three decorrelated channels of the same size.
pub fn rgb_like(width: usize, height: usize, seed: u64) -> Vec<PixelPlane> {
    (0..3).map(|i| photo_like(width, height, seed * 3 + i)).collect()
}

/// Uniform random samples, for transform tests that need no structure.
pub fn noise(width: usize, height: usize, seed: u64) -> PixelPlane {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    PixelPlane::from_fn(width, height, |_, _| rng.gen())
}
