// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! One level of the orthonormal 2D Haar transform.
//!
//! Each 2×2 input block `(a b / c d)` maps to four coefficients:
//!
//! ```text
//! LL = (a + b + c + d) / 2
//! HL = (a - b + c - d) / 2    horizontal detail
//! LH = (a + b - c - d) / 2    vertical detail
//! HH = (a - b - c + d) / 2    diagonal detail
//! ```
//!
//! The basis is orthonormal, so the inverse is the transpose and energy is
//! preserved. Only additions and exact halvings are used: integer input
//! yields dyadic-rational coefficients that `f64` represents exactly, which
//! keeps decomposition bit-identical across platforms.

/// The four sub-bands of a single decomposition step, each
/// `(rows / 2) × (cols / 2)` in row-major order.
pub struct HaarLevel {
    pub ll: Vec<f64>,
    pub hl: Vec<f64>,
    pub lh: Vec<f64>,
    pub hh: Vec<f64>,
    pub half_rows: usize,
    pub half_cols: usize,
}

/// Forward transform of a `rows × cols` plane (both even).
pub fn forward(data: &[f64], rows: usize, cols: usize) -> HaarLevel {
    assert!(rows % 2 == 0 && cols % 2 == 0, "dimensions must be even");
    assert_eq!(data.len(), rows * cols);

    let hr = rows / 2;
    let hc = cols / 2;
    let mut ll = vec![0.0f64; hr * hc];
    let mut hl = vec![0.0f64; hr * hc];
    let mut lh = vec![0.0f64; hr * hc];
    let mut hh = vec![0.0f64; hr * hc];

    for r in 0..hr {
        let top = 2 * r * cols;
        let bottom = top + cols;
        for c in 0..hc {
            let a = data[top + 2 * c];
            let b = data[top + 2 * c + 1];
            let cc = data[bottom + 2 * c];
            let d = data[bottom + 2 * c + 1];

            let idx = r * hc + c;
            ll[idx] = ((a + b) + (cc + d)) / 2.0;
            hl[idx] = ((a - b) + (cc - d)) / 2.0;
            lh[idx] = ((a + b) - (cc + d)) / 2.0;
            hh[idx] = ((a - b) - (cc - d)) / 2.0;
        }
    }

    HaarLevel { ll, hl, lh, hh, half_rows: hr, half_cols: hc }
}

/// Inverse transform: rebuilds the `(2 * half_rows) × (2 * half_cols)` plane.
pub fn inverse(
    ll: &[f64],
    hl: &[f64],
    lh: &[f64],
    hh: &[f64],
    half_rows: usize,
    half_cols: usize,
) -> Vec<f64> {
    let n = half_rows * half_cols;
    assert!(ll.len() == n && hl.len() == n && lh.len() == n && hh.len() == n);

    let cols = half_cols * 2;
    let mut out = vec![0.0f64; half_rows * 2 * cols];

    for r in 0..half_rows {
        let top = 2 * r * cols;
        let bottom = top + cols;
        for c in 0..half_cols {
            let idx = r * half_cols + c;
            let (s, h, v, d) = (ll[idx], hl[idx], lh[idx], hh[idx]);

            out[top + 2 * c] = ((s + h) + (v + d)) / 2.0;
            out[top + 2 * c + 1] = ((s - h) + (v - d)) / 2.0;
            out[bottom + 2 * c] = ((s + h) - (v + d)) / 2.0;
            out[bottom + 2 * c + 1] = ((s - h) - (v - d)) / 2.0;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_coefficients() {
        // a=10 b=20 / c=30 d=40
        let data = [10.0, 20.0, 30.0, 40.0];
        let lvl = forward(&data, 2, 2);
        assert_eq!(lvl.ll, vec![50.0]);
        assert_eq!(lvl.hl, vec![-10.0]);
        assert_eq!(lvl.lh, vec![-20.0]);
        assert_eq!(lvl.hh, vec![0.0]);
    }

    #[test]
    fn inverse_restores_block() {
        let data = [10.0, 20.0, 30.0, 40.0];
        let lvl = forward(&data, 2, 2);
        let back = inverse(&lvl.ll, &lvl.hl, &lvl.lh, &lvl.hh, 1, 1);
        assert_eq!(back, data.to_vec());
    }

    #[test]
    fn energy_preserved() {
        let data: Vec<f64> = (0..64).map(|i| ((i * 37) % 251) as f64).collect();
        let lvl = forward(&data, 8, 8);
        let e_in: f64 = data.iter().map(|x| x * x).sum();
        let e_out: f64 = [&lvl.ll, &lvl.hl, &lvl.lh, &lvl.hh]
            .iter()
            .flat_map(|b| b.iter())
            .map(|x| x * x)
            .sum();
        assert!((e_in - e_out).abs() < 1e-6, "in={e_in} out={e_out}");
    }

    #[test]
    fn integer_input_roundtrips_exactly() {
        let data: Vec<f64> = (0..12 * 6).map(|i| ((i * 91 + 7) % 256) as f64).collect();
        let lvl = forward(&data, 6, 12);
        let back = inverse(&lvl.ll, &lvl.hl, &lvl.lh, &lvl.hh, lvl.half_rows, lvl.half_cols);
        assert_eq!(back, data);
    }

    #[test]
    #[should_panic(expected = "dimensions must be even")]
    fn odd_dimensions_panic() {
        forward(&[0.0; 9], 3, 3);
    }
}
