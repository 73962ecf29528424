// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Reed-Solomon error correction over GF(2^8).
//!
//! RS(255, 255 - p) with the primitive polynomial 0x11D and first
//! consecutive root α^0. Encoding is systematic (data followed by `p`
//! parity symbols); decoding uses Berlekamp-Massey, Chien search and
//! Forney, correcting up to `p / 2` symbol errors per codeword. Inputs
//! longer than one codeword are split; short inputs use shortened codes.
//!
//! The parity count `p` is the frame's "ECC strength" and is restricted to
//! [`ECC_TIERS`].

use std::sync::OnceLock;

/// Primitive polynomial for GF(2^8): x^8 + x^4 + x^3 + x^2 + 1.
const PRIM_POLY: u16 = 0x11D;

/// Codeword length.
const N_MAX: usize = 255;

/// Supported parity counts, smallest first.
pub const ECC_TIERS: [usize; 3] = [30, 60, 120];

/// Data sizes (bytes) up to which each tier is chosen; larger data uses the last tier.
const ECC_TIER_LIMITS: [usize; 2] = [128, 2048];

// --- GF(2^8) arithmetic ---

struct GfTables {
    exp: [u8; 512],
    log: [u8; 256],
}

fn build_gf_tables() -> GfTables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];

    let mut x: u16 = 1;
    for i in 0..255usize {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIM_POLY;
        }
    }
    exp[510] = exp[0];
    exp[511] = exp[1];

    GfTables { exp, log }
}

fn gf() -> &'static GfTables {
    static TABLES: OnceLock<GfTables> = OnceLock::new();
    TABLES.get_or_init(build_gf_tables)
}

fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = gf();
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

/// Multiplicative inverse. Panics on zero.
fn gf_inv(a: u8) -> u8 {
    assert_ne!(a, 0, "cannot invert zero in GF(2^8)");
    let t = gf();
    t.exp[255 - t.log[a as usize] as usize]
}

/// α^e for any exponent (reduced mod 255).
fn alpha_pow(e: usize) -> u8 {
    gf().exp[e % 255]
}

/// α^-e.
fn alpha_inv_pow(e: usize) -> u8 {
    gf().exp[(255 - e % 255) % 255]
}

/// Evaluate a highest-degree-first polynomial at `x` (Horner).
fn poly_eval(poly: &[u8], x: u8) -> u8 {
    poly.iter().fold(0u8, |acc, &c| gf_mul(acc, x) ^ c)
}

/// Evaluate an ascending-power polynomial at `x`.
fn eval_asc(poly: &[u8], x: u8) -> u8 {
    let mut result = 0u8;
    let mut x_pow = 1u8;
    for &c in poly {
        result ^= gf_mul(c, x_pow);
        x_pow = gf_mul(x_pow, x);
    }
    result
}

fn poly_mul(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; a.len() + b.len() - 1];
    for (i, &ac) in a.iter().enumerate() {
        for (j, &bc) in b.iter().enumerate() {
            out[i + j] ^= gf_mul(ac, bc);
        }
    }
    out
}

// --- Generator polynomials ---

/// g(x) = Π_{i=0}^{p-1} (x - α^i), highest degree first.
fn build_gen_poly(parity_len: usize) -> Vec<u8> {
    (0..parity_len).fold(vec![1u8], |g, i| poly_mul(&g, &[1, alpha_pow(i)]))
}

fn tier_index(parity_len: usize) -> Option<usize> {
    ECC_TIERS.iter().position(|&t| t == parity_len)
}

fn gen_poly(parity_len: usize) -> &'static [u8] {
    static GEN: [OnceLock<Vec<u8>>; ECC_TIERS.len()] = [OnceLock::new(), OnceLock::new(), OnceLock::new()];
    let idx = tier_index(parity_len)
        .unwrap_or_else(|| panic!("unsupported parity length: {parity_len}"));
    GEN[idx].get_or_init(|| build_gen_poly(parity_len))
}

/// Whether `strength` is one of the supported parity counts.
pub fn is_valid_strength(strength: usize) -> bool {
    tier_index(strength).is_some()
}

/// Pick the parity count for a block of `data_len` bytes.
///
/// Larger blocks get more parity, bounded by [`ECC_TIERS`].
pub fn choose_ecc_strength(data_len: usize) -> usize {
    for (i, &limit) in ECC_TIER_LIMITS.iter().enumerate() {
        if data_len <= limit {
            return ECC_TIERS[i];
        }
    }
    ECC_TIERS[ECC_TIERS.len() - 1]
}

// --- Encoding ---

/// RS-encode one codeword's worth of data (systematic).
///
/// # Panics
/// If `parity_len` is not a supported tier or `data.len() > 255 - parity_len`.
pub fn rs_encode(data: &[u8], parity_len: usize) -> Vec<u8> {
    let k_max = N_MAX - parity_len;
    assert!(
        data.len() <= k_max,
        "data length {} exceeds max {} for parity_len={}",
        data.len(),
        k_max,
        parity_len
    );

    let g = gen_poly(parity_len);
    let mut reg = vec![0u8; parity_len];
    for &byte in data {
        let feedback = byte ^ reg[0];
        for j in 0..parity_len - 1 {
            reg[j] = reg[j + 1] ^ gf_mul(feedback, g[j + 1]);
        }
        reg[parity_len - 1] = gf_mul(feedback, g[parity_len]);
    }

    let mut out = Vec::with_capacity(data.len() + parity_len);
    out.extend_from_slice(data);
    out.extend_from_slice(&reg);
    out
}

/// RS-encode data of any length, splitting into `255 - parity_len`-byte chunks.
///
/// Empty input encodes to an empty block.
pub fn rs_encode_blocks(data: &[u8], parity_len: usize) -> Vec<u8> {
    let k_max = N_MAX - parity_len;
    let mut out = Vec::with_capacity(rs_encoded_len(data.len(), parity_len));
    for chunk in data.chunks(k_max) {
        out.extend_from_slice(&rs_encode(chunk, parity_len));
    }
    out
}

/// Encoded length of `data_len` bytes at `parity_len`.
pub fn rs_encoded_len(data_len: usize, parity_len: usize) -> usize {
    let k_max = N_MAX - parity_len;
    let full = data_len / k_max;
    let rem = data_len % k_max;
    full * N_MAX + if rem > 0 { rem + parity_len } else { 0 }
}

/// Inverse of [`rs_encoded_len`]: the data length that encodes to
/// `encoded_len` bytes, or `None` if no data length does.
pub fn rs_data_len(encoded_len: usize, parity_len: usize) -> Option<usize> {
    let k_max = N_MAX - parity_len;
    let full = encoded_len / N_MAX;
    let rem = encoded_len % N_MAX;
    match rem {
        0 => Some(full * k_max),
        r if r > parity_len => Some(full * k_max + r - parity_len),
        _ => None,
    }
}

// --- Decoding ---

/// Error returned when RS decoding fails (too many errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsDecodeError;

impl core::fmt::Display for RsDecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Reed-Solomon: too many errors to correct")
    }
}

impl std::error::Error for RsDecodeError {}

/// Berlekamp-Massey. Returns the error locator σ(x) in ascending powers.
fn berlekamp_massey(syndromes: &[u8]) -> Vec<u8> {
    let n = syndromes.len();
    let mut c = vec![0u8; n + 1];
    let mut b = vec![0u8; n + 1];
    c[0] = 1;
    b[0] = 1;
    let mut c_len = 1usize;
    let mut b_len = 1usize;
    let mut ell = 0usize;
    let mut b_disc = 1u8;
    let mut m = 1usize;

    for r in 0..n {
        let mut delta = syndromes[r];
        for i in 1..c_len {
            delta ^= gf_mul(c[i], syndromes[r - i]);
        }
        if delta == 0 {
            m += 1;
            continue;
        }

        let factor = gf_mul(delta, gf_inv(b_disc));
        let prev_c = c.clone();
        let prev_len = c_len;

        c_len = c_len.max(b_len + m);
        for j in 0..b_len {
            c[j + m] ^= gf_mul(factor, b[j]);
        }

        if 2 * ell <= r {
            b = prev_c;
            b_len = prev_len;
            ell = r + 1 - ell;
            b_disc = delta;
            m = 1;
        } else {
            m += 1;
        }
    }

    c.truncate(c_len);
    while c.len() > 1 && c[c.len() - 1] == 0 {
        c.pop();
    }
    c
}

/// Chien search over a full 255-symbol codeword.
///
/// Returns `(gf_position, array_index)` pairs, or `None` if the number of
/// roots differs from the locator degree.
fn chien_search(sigma: &[u8]) -> Option<Vec<(usize, usize)>> {
    let degree = sigma.len() - 1;
    let mut found = Vec::with_capacity(degree);
    for p in 0..N_MAX {
        if eval_asc(sigma, alpha_inv_pow(p)) == 0 {
            found.push((p, N_MAX - 1 - p));
        }
    }
    (found.len() == degree).then_some(found)
}

/// Forney: error magnitudes for first consecutive root α^0.
fn forney(sigma: &[u8], syndromes: &[u8], found: &[(usize, usize)]) -> Vec<u8> {
    let two_t = syndromes.len();

    // Ω(x) = S(x)·σ(x) mod x^{2t}
    let mut omega = vec![0u8; two_t];
    for (i, &s) in sigma.iter().enumerate().take(two_t) {
        for j in 0..two_t - i {
            omega[i + j] ^= gf_mul(s, syndromes[j]);
        }
    }

    // Formal derivative: only odd powers survive in characteristic 2.
    let mut sigma_prime = vec![0u8; sigma.len().saturating_sub(1)];
    for i in (1..sigma.len()).step_by(2) {
        sigma_prime[i - 1] = sigma[i];
    }

    found
        .iter()
        .map(|&(pos, _)| {
            let x_inv = alpha_inv_pow(pos);
            let denom = eval_asc(&sigma_prime, x_inv);
            if denom == 0 {
                return 0;
            }
            gf_mul(alpha_pow(pos), gf_mul(eval_asc(&omega, x_inv), gf_inv(denom)))
        })
        .collect()
}

fn syndromes(block: &[u8], parity_len: usize) -> Vec<u8> {
    (0..parity_len).map(|i| poly_eval(block, alpha_pow(i))).collect()
}

/// RS-decode one codeword of `data_len + parity_len` bytes.
///
/// Returns the corrected data and the number of symbol errors corrected.
///
/// # Errors
/// [`RsDecodeError`] if more than `parity_len / 2` symbols are wrong (or the
/// error pattern is otherwise uncorrectable).
///
/// # Panics
/// If `received.len() != data_len + parity_len` or the tier is unsupported.
pub fn rs_decode(
    received: &[u8],
    data_len: usize,
    parity_len: usize,
) -> Result<(Vec<u8>, usize), RsDecodeError> {
    let block_len = data_len + parity_len;
    assert_eq!(received.len(), block_len, "received length mismatch");
    assert!(block_len <= N_MAX, "block longer than a codeword");

    // Shortened code: virtual zero padding in front.
    let padding = N_MAX - block_len;
    let mut full = vec![0u8; N_MAX];
    full[padding..].copy_from_slice(received);

    let synd = syndromes(&full, parity_len);
    if synd.iter().all(|&s| s == 0) {
        return Ok((received[..data_len].to_vec(), 0));
    }

    let sigma = berlekamp_massey(&synd);
    let num_errors = sigma.len() - 1;
    if num_errors > parity_len / 2 {
        return Err(RsDecodeError);
    }

    let found = chien_search(&sigma).ok_or(RsDecodeError)?;
    let magnitudes = forney(&sigma, &synd, &found);

    for (&(_, idx), &mag) in found.iter().zip(&magnitudes) {
        if idx < padding {
            return Err(RsDecodeError);
        }
        full[idx] ^= mag;
    }

    if syndromes(&full, parity_len).iter().any(|&s| s != 0) {
        return Err(RsDecodeError);
    }

    Ok((full[padding..padding + data_len].to_vec(), num_errors))
}

/// Statistics from decoding a multi-codeword block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsDecodeStats {
    /// Symbol errors corrected across all codewords.
    pub total_errors: usize,
    /// Largest number of errors in one codeword.
    pub max_block_errors: usize,
    /// Number of codewords decoded.
    pub num_blocks: usize,
}

/// Decode a block produced by [`rs_encode_blocks`].
///
/// The data length is recovered from `encoded.len()` via [`rs_data_len`].
///
/// # Errors
/// [`RsDecodeError`] if the length is not a valid encoded length or any
/// codeword is uncorrectable.
pub fn rs_decode_blocks(
    encoded: &[u8],
    parity_len: usize,
) -> Result<(Vec<u8>, RsDecodeStats), RsDecodeError> {
    let data_len = rs_data_len(encoded.len(), parity_len).ok_or(RsDecodeError)?;
    let k_max = N_MAX - parity_len;

    let mut decoded = Vec::with_capacity(data_len);
    let mut stats = RsDecodeStats::default();
    let mut remaining = data_len;
    let mut offset = 0;

    while remaining > 0 {
        let chunk = remaining.min(k_max);
        let block = &encoded[offset..offset + chunk + parity_len];
        let (data, errors) = rs_decode(block, chunk, parity_len)?;
        decoded.extend_from_slice(&data);

        stats.total_errors += errors;
        stats.max_block_errors = stats.max_block_errors.max(errors);
        stats.num_blocks += 1;

        offset += chunk + parity_len;
        remaining -= chunk;
    }

    Ok((decoded, stats))
}
