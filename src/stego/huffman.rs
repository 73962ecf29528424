// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Byte-oriented canonical Huffman coding for payload compression.
//!
//! The code is fully described by one length per symbol. Canonical codes
//! are assigned in `(length, symbol)` order, so the serialized tree is just
//! the list of `(symbol, length)` pairs:
//!
//! ```text
//! count:u16 | (symbol:u8, length:u8) * count
//! ```
//!
//! Code lengths are capped at [`MAX_CODE_LEN`] bits.

use core::fmt;
use std::collections::VecDeque;

use super::bitio::{BitReader, BitWriter};

/// Longest code length produced or accepted.
pub const MAX_CODE_LEN: u8 = 16;

/// Errors from parsing a serialized tree or decoding a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanError {
    /// Serialized tree is malformed (bad length, duplicate symbol, over-full code).
    InvalidTree,
    /// Body ends before all symbols were decoded.
    TruncatedBody,
    /// Bit sequence matches no code.
    InvalidCode,
}

impl fmt::Display for HuffmanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTree => write!(f, "malformed Huffman tree"),
            Self::TruncatedBody => write!(f, "Huffman body truncated"),
            Self::InvalidCode => write!(f, "invalid Huffman code in body"),
        }
    }
}

impl std::error::Error for HuffmanError {}

/// A canonical Huffman code over byte symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCode {
    /// Code length per symbol; 0 means the symbol is unused.
    lengths: [u8; 256],
    /// Used symbols sorted by (length, symbol).
    canonical: Vec<u8>,
    /// `counts[len]` = number of codes of length `len`.
    counts: [u16; MAX_CODE_LEN as usize + 1],
    /// Canonical code per symbol (valid where `lengths[s] > 0`).
    codes: [u32; 256],
}

impl HuffmanCode {
    /// Build an optimal length-limited code for the byte frequencies of `data`.
    ///
    /// Empty input yields an empty code; a single distinct byte gets a 1-bit code.
    pub fn from_data(data: &[u8]) -> Self {
        let mut freq = [0u64; 256];
        for &b in data {
            freq[b as usize] += 1;
        }
        Self::from_lengths(code_lengths(&freq))
    }

    fn from_lengths(lengths: [u8; 256]) -> Self {
        let mut canonical: Vec<u8> = (0..=255u8).filter(|&s| lengths[s as usize] > 0).collect();
        canonical.sort_by_key(|&s| (lengths[s as usize], s));

        let mut counts = [0u16; MAX_CODE_LEN as usize + 1];
        for &s in &canonical {
            counts[lengths[s as usize] as usize] += 1;
        }

        let mut codes = [0u32; 256];
        let mut code = 0u32;
        let mut prev_len = 0u8;
        for &s in &canonical {
            let len = lengths[s as usize];
            code <<= len - prev_len;
            codes[s as usize] = code;
            code += 1;
            prev_len = len;
        }

        Self { lengths, canonical, counts, codes }
    }

    /// True when no symbol has a code (empty payload).
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Code length for `symbol`, 0 if unused.
    pub fn code_len(&self, symbol: u8) -> u8 {
        self.lengths[symbol as usize]
    }

    /// Serialize as `count:u16` followed by `(symbol, length)` pairs.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2 + 2 * self.canonical.len());
        out.extend_from_slice(&(self.canonical.len() as u16).to_be_bytes());
        for &s in &self.canonical {
            out.push(s);
            out.push(self.lengths[s as usize]);
        }
        out
    }

    /// Parse a tree written by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    /// [`HuffmanError::InvalidTree`] on wrong size, zero or over-long lengths,
    /// duplicate symbols, or lengths that violate the Kraft inequality.
    pub fn parse(bytes: &[u8]) -> Result<Self, HuffmanError> {
        if bytes.len() < 2 {
            return Err(HuffmanError::InvalidTree);
        }
        let count = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        if count > 256 || bytes.len() != 2 + 2 * count {
            return Err(HuffmanError::InvalidTree);
        }

        let mut lengths = [0u8; 256];
        // Kraft sum scaled by 2^MAX_CODE_LEN.
        let mut kraft = 0u64;
        for pair in bytes[2..].chunks_exact(2) {
            let (sym, len) = (pair[0] as usize, pair[1]);
            if len == 0 || len > MAX_CODE_LEN || lengths[sym] != 0 {
                return Err(HuffmanError::InvalidTree);
            }
            lengths[sym] = len;
            kraft += 1u64 << (MAX_CODE_LEN - len);
        }
        if kraft > 1u64 << MAX_CODE_LEN {
            return Err(HuffmanError::InvalidTree);
        }
        Ok(Self::from_lengths(lengths))
    }

    /// Compress `data`, MSB-first, zero-padded to a whole byte.
    ///
    /// # Panics
    /// If `data` contains a byte the code has no entry for.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut w = BitWriter::new();
        for &b in data {
            let len = self.lengths[b as usize];
            assert!(len > 0, "symbol {b} missing from Huffman code");
            w.write_bits(self.codes[b as usize], len);
        }
        w.finish()
    }

    /// Decode exactly `count` symbols from `body`. Trailing padding is ignored.
    ///
    /// # Errors
    /// [`HuffmanError::TruncatedBody`] if the body runs out,
    /// [`HuffmanError::InvalidCode`] on a bit pattern outside the code.
    pub fn decode(&self, body: &[u8], count: usize) -> Result<Vec<u8>, HuffmanError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if self.is_empty() {
            return Err(HuffmanError::InvalidCode);
        }

        let mut r = BitReader::new(body);
        // Every symbol takes at least one bit.
        if count > r.bits_remaining() {
            return Err(HuffmanError::TruncatedBody);
        }
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.decode_symbol(&mut r)?);
        }
        Ok(out)
    }

    /// Walk the canonical code one bit at a time using per-length counts.
    fn decode_symbol(&self, r: &mut BitReader<'_>) -> Result<u8, HuffmanError> {
        let mut code = 0i64;
        let mut first = 0i64;
        let mut index = 0i64;
        for len in 1..=MAX_CODE_LEN as usize {
            code |= r.read_bit().ok_or(HuffmanError::TruncatedBody)? as i64;
            let count = self.counts[len] as i64;
            if code - first < count {
                return Ok(self.canonical[(index + code - first) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }
        Err(HuffmanError::InvalidCode)
    }
}

/// Length-limited Huffman code lengths for the given frequencies.
///
/// Symbols are merged with the two-queue method after sorting by
/// `(frequency, symbol)`, so ties break the same way on every platform.
/// Over-long codes are then folded back to [`MAX_CODE_LEN`] by moving
/// leaves up the tree while keeping the code complete.
fn code_lengths(freq: &[u64; 256]) -> [u8; 256] {
    let mut lengths = [0u8; 256];
    let mut symbols: Vec<(u64, u8)> = (0..=255u8)
        .filter(|&s| freq[s as usize] > 0)
        .map(|s| (freq[s as usize], s))
        .collect();
    symbols.sort();

    let n = symbols.len();
    match n {
        0 => return lengths,
        1 => {
            lengths[symbols[0].1 as usize] = 1;
            return lengths;
        }
        _ => {}
    }

    // Leaves are 0..n, internal nodes n..2n-1 in creation order.
    let total_nodes = 2 * n - 1;
    let mut parent = vec![0usize; total_nodes];
    let mut leaves: VecDeque<(u64, usize)> =
        symbols.iter().enumerate().map(|(i, &(f, _))| (f, i)).collect();
    let mut merged: VecDeque<(u64, usize)> = VecDeque::new();

    let pop_min = |leaves: &mut VecDeque<(u64, usize)>,
                       merged: &mut VecDeque<(u64, usize)>| {
        match (leaves.front(), merged.front()) {
            (Some(a), Some(b)) if a.0 <= b.0 => leaves.pop_front(),
            (Some(_), Some(_)) => merged.pop_front(),
            (Some(_), None) => leaves.pop_front(),
            (None, _) => merged.pop_front(),
        }
        .unwrap_or((0, 0))
    };

    for next in n..total_nodes {
        let (f1, a) = pop_min(&mut leaves, &mut merged);
        let (f2, b) = pop_min(&mut leaves, &mut merged);
        parent[a] = next;
        parent[b] = next;
        merged.push_back((f1 + f2, next));
    }

    // Parents are always created after children, so depths resolve top-down.
    let root = total_nodes - 1;
    let mut depth = vec![0usize; total_nodes];
    for node in (0..root).rev() {
        depth[node] = depth[parent[node]] + 1;
    }

    let max_len = depth[..n].iter().copied().max().unwrap_or(0);
    let mut bl_count = vec![0usize; max_len.max(MAX_CODE_LEN as usize) + 1];
    for &d in &depth[..n] {
        bl_count[d] += 1;
    }

    let limit = MAX_CODE_LEN as usize;
    if max_len > limit {
        for i in (limit + 1..=max_len).rev() {
            while bl_count[i] > 0 {
                // Borrow a leaf from the deepest level above i-1 that has one.
                // A complete code with at most 256 leaves always has one.
                let mut j = i - 2;
                while bl_count[j] == 0 {
                    j -= 1;
                }
                bl_count[i] -= 2;
                bl_count[i - 1] += 1;
                bl_count[j + 1] += 2;
                bl_count[j] -= 1;
            }
        }
    }

    // Longest codes go to the least frequent symbols (front of `symbols`).
    let mut pos = 0;
    for len in (1..=limit).rev() {
        for _ in 0..bl_count[len] {
            lengths[symbols[pos].1 as usize] = len as u8;
            pos += 1;
        }
    }
    lengths
}
