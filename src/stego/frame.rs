// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload frame: self-describing container for the embedded message.
//!
//! The payload is Huffman-compressed; the serialized code table (tree) and
//! the compressed body are Reed-Solomon protected independently, each with
//! a parity count picked from its own size.
//!
//! Serialized layout (big-endian):
//!
//! ```text
//! message_length:u32 | tree_ecc:u8 | body_ecc:u8 | tree_block_len:u32 | body_block_len:u32
//! | tree_block | body_block
//! ```
//!
//! The first [`HEADER_LEN`] bytes carry no ECC of their own; the embedding
//! layer protects them by repetition.

use tracing::debug;

use super::ecc;
use super::error::FrameError;
use super::huffman::HuffmanCode;

/// Serialized header size in bytes.
pub const HEADER_LEN: usize = 14;

/// Serialized header size in bits.
pub const HEADER_BITS: usize = HEADER_LEN * 8;

/// Fixed-size frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub message_length: u32,
    pub tree_ecc_strength: u8,
    pub body_ecc_strength: u8,
    pub tree_block_len: u32,
    pub body_block_len: u32,
}

impl FrameHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.message_length.to_be_bytes());
        out[4] = self.tree_ecc_strength;
        out[5] = self.body_ecc_strength;
        out[6..10].copy_from_slice(&self.tree_block_len.to_be_bytes());
        out[10..14].copy_from_slice(&self.body_block_len.to_be_bytes());
        out
    }

    /// Parse the first [`HEADER_LEN`] bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameError::Truncated);
        }
        let u32_at = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        Ok(Self {
            message_length: u32_at(0),
            tree_ecc_strength: bytes[4],
            body_ecc_strength: bytes[5],
            tree_block_len: u32_at(6),
            body_block_len: u32_at(10),
        })
    }

    /// Check the header is self-consistent.
    ///
    /// ECC strengths must be supported tiers, block lengths must be valid
    /// encoded lengths for them, the tree must hold a whole number of
    /// entries, and the body must be able to carry `message_length`
    /// symbols of 1 to 16 bits.
    pub fn validate(&self) -> Result<(), FrameError> {
        let tree_ecc = self.tree_ecc_strength as usize;
        let body_ecc = self.body_ecc_strength as usize;
        for s in [self.tree_ecc_strength, self.body_ecc_strength] {
            if !ecc::is_valid_strength(s as usize) {
                return Err(FrameError::InvalidEccStrength(s));
            }
        }

        let tree_len = ecc::rs_data_len(self.tree_block_len as usize, tree_ecc)
            .ok_or(FrameError::InconsistentBlockLength)?;
        if tree_len < 2 || tree_len % 2 != 0 || tree_len > 2 + 2 * 256 {
            return Err(FrameError::InconsistentBlockLength);
        }

        let body_len = ecc::rs_data_len(self.body_block_len as usize, body_ecc)
            .ok_or(FrameError::InconsistentBlockLength)?;
        let symbols = self.message_length as usize;
        let min_body = symbols.div_ceil(8);
        let max_body = symbols.saturating_mul(2);
        if body_len < min_body || body_len > max_body {
            return Err(FrameError::InconsistentBlockLength);
        }
        Ok(())
    }

    /// Bytes following the header.
    pub fn blocks_len(&self) -> usize {
        self.tree_block_len as usize + self.body_block_len as usize
    }

    /// Total serialized frame size in bytes.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.blocks_len()
    }
}

/// A framed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_length: u32,
    pub tree_ecc_strength: u8,
    pub body_ecc_strength: u8,
    /// RS-encoded serialized Huffman tree.
    pub tree_block: Vec<u8>,
    /// RS-encoded compressed body.
    pub body_block: Vec<u8>,
}

impl Frame {
    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            message_length: self.message_length,
            tree_ecc_strength: self.tree_ecc_strength,
            body_ecc_strength: self.body_ecc_strength,
            tree_block_len: self.tree_block.len() as u32,
            body_block_len: self.body_block.len() as u32,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.tree_block.len() + self.body_block.len());
        out.extend_from_slice(&self.header().to_bytes());
        out.extend_from_slice(&self.tree_block);
        out.extend_from_slice(&self.body_block);
        out
    }

    /// Parse a serialized frame. The input must be exactly one frame long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        let header = FrameHeader::parse(bytes)?;
        header.validate()?;
        let total = header.frame_len();
        if bytes.len() < total {
            return Err(FrameError::Truncated);
        }
        if bytes.len() > total {
            return Err(FrameError::InconsistentBlockLength);
        }
        let tree_end = HEADER_LEN + header.tree_block_len as usize;
        Ok(Self {
            message_length: header.message_length,
            tree_ecc_strength: header.tree_ecc_strength,
            body_ecc_strength: header.body_ecc_strength,
            tree_block: bytes[HEADER_LEN..tree_end].to_vec(),
            body_block: bytes[tree_end..total].to_vec(),
        })
    }

    /// Serialized size in bits.
    pub fn bit_len(&self) -> usize {
        (HEADER_LEN + self.tree_block.len() + self.body_block.len()) * 8
    }
}

/// Compress and protect `payload`.
///
/// # Errors
/// [`FrameError::PayloadTooLarge`] if the length does not fit in 32 bits.
pub fn frame(payload: &[u8]) -> Result<Frame, FrameError> {
    let message_length = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge)?;

    let code = HuffmanCode::from_data(payload);
    let tree = code.to_bytes();
    let body = code.encode(payload);

    let tree_ecc = ecc::choose_ecc_strength(tree.len());
    let body_ecc = ecc::choose_ecc_strength(body.len());
    let tree_block = ecc::rs_encode_blocks(&tree, tree_ecc);
    let body_block = ecc::rs_encode_blocks(&body, body_ecc);

    debug!(
        payload = payload.len(),
        tree = tree.len(),
        body = body.len(),
        tree_ecc,
        body_ecc,
        "payload framed"
    );

    Ok(Frame {
        message_length,
        tree_ecc_strength: tree_ecc as u8,
        body_ecc_strength: body_ecc as u8,
        tree_block,
        body_block,
    })
}

/// Correct, decompress and return the payload carried by `frame`.
///
/// # Errors
/// - [`FrameError::InvalidEccStrength`] / [`FrameError::InconsistentBlockLength`]
///   for a malformed header.
/// - [`FrameError::TreeDecodingFailed`] / [`FrameError::BodyDecodingFailed`]
///   when a block has more corrupted symbols than its parity can correct.
pub fn unframe(frame: &Frame) -> Result<Vec<u8>, FrameError> {
    frame.header().validate()?;

    let (tree, tree_stats) =
        ecc::rs_decode_blocks(&frame.tree_block, frame.tree_ecc_strength as usize)
            .map_err(|_| FrameError::TreeDecodingFailed)?;
    let code = HuffmanCode::parse(&tree).map_err(|_| FrameError::TreeDecodingFailed)?;

    let (body, body_stats) =
        ecc::rs_decode_blocks(&frame.body_block, frame.body_ecc_strength as usize)
            .map_err(|_| FrameError::BodyDecodingFailed)?;

    debug!(
        tree_errors = tree_stats.total_errors,
        body_errors = body_stats.total_errors,
        body_max_block_errors = body_stats.max_block_errors,
        "frame blocks corrected"
    );

    code.decode(&body, frame.message_length as usize)
        .map_err(|_| FrameError::BodyDecodingFailed)
}

/// Expand bytes into one bit per element, MSB first.
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().flat_map(|&b| (0..8).rev().map(move |i| (b >> i) & 1)).collect()
}

/// Pack bits (MSB first) into bytes, zero-padding the last byte.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk.iter().enumerate().fold(0u8, |acc, (i, &bit)| acc | ((bit & 1) << (7 - i)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_hello() {
        let f = frame(b"Hello Bob!").unwrap();
        assert_eq!(f.message_length, 10);
        assert_eq!(unframe(&f).unwrap(), b"Hello Bob!");
    }

    #[test]
    fn roundtrip_empty() {
        let f = frame(b"").unwrap();
        assert_eq!(f.message_length, 0);
        assert!(f.body_block.is_empty());
        assert_eq!(unframe(&f).unwrap(), Vec::<u8>::new());
        assert_eq!(Frame::from_bytes(&f.to_bytes()).unwrap(), f);
    }

    #[test]
    fn roundtrip_all_byte_values() {
        let payload: Vec<u8> = (0..=255u8).collect();
        let f = frame(&payload).unwrap();
        assert_eq!(unframe(&f).unwrap(), payload);
    }

    #[test]
    fn serialized_roundtrip() {
        let f = frame(b"a longer message with some repetition, repetition, repetition").unwrap();
        let bytes = f.to_bytes();
        assert_eq!(bytes.len() * 8, f.bit_len());
        assert_eq!(Frame::from_bytes(&bytes).unwrap(), f);
    }

    #[test]
    fn header_layout() {
        let h = FrameHeader {
            message_length: 0x0102_0304,
            tree_ecc_strength: 30,
            body_ecc_strength: 60,
            tree_block_len: 0x10,
            body_block_len: 0x0A0B_0C0D,
        };
        let bytes = h.to_bytes();
        assert_eq!(bytes, [1, 2, 3, 4, 30, 60, 0, 0, 0, 0x10, 0x0A, 0x0B, 0x0C, 0x0D]);
        assert_eq!(FrameHeader::parse(&bytes).unwrap(), h);
        assert_eq!(FrameHeader::parse(&bytes[..13]), Err(FrameError::Truncated));
    }

    #[test]
    fn corrects_up_to_half_strength() {
        let payload = b"The quick brown fox jumps over the lazy dog";
        let mut f = frame(payload).unwrap();
        let t_tree = f.tree_ecc_strength as usize / 2;
        let t_body = f.body_ecc_strength as usize / 2;
        for i in 0..t_tree {
            f.tree_block[i] ^= 0x5A;
        }
        let n = f.body_block.len();
        for i in 0..t_body {
            f.body_block[n - 1 - i] ^= 0xC3;
        }
        assert_eq!(unframe(&f).unwrap(), payload);
    }

    #[test]
    fn reports_which_block_failed() {
        let payload = b"The quick brown fox jumps over the lazy dog";
        let clean = frame(payload).unwrap();

        let mut f = clean.clone();
        for b in f.tree_block.iter_mut() {
            *b = b.wrapping_add(0x37);
        }
        assert_eq!(unframe(&f), Err(FrameError::TreeDecodingFailed));

        let mut f = clean;
        for b in f.body_block.iter_mut() {
            *b = b.wrapping_add(0x37);
        }
        assert_eq!(unframe(&f), Err(FrameError::BodyDecodingFailed));
    }

    #[test]
    fn rejects_bad_headers() {
        let f = frame(b"abc").unwrap();
        let mut bytes = f.to_bytes();

        let mut bad = bytes.clone();
        bad[4] = 31;
        assert_eq!(Frame::from_bytes(&bad), Err(FrameError::InvalidEccStrength(31)));

        let mut bad = bytes.clone();
        bad[9] = bad[9].wrapping_add(1);
        assert!(Frame::from_bytes(&bad).is_err());

        bytes.pop();
        assert_eq!(Frame::from_bytes(&bytes), Err(FrameError::Truncated));
    }

    #[test]
    fn rejects_implausible_message_length() {
        let mut f = frame(b"abc").unwrap();
        f.message_length = 1_000_000;
        assert_eq!(unframe(&f), Err(FrameError::InconsistentBlockLength));
    }

    #[test]
    fn bit_conversion() {
        assert_eq!(bytes_to_bits(&[0xA5]), vec![1, 0, 1, 0, 0, 1, 0, 1]);
        assert_eq!(bits_to_bytes(&[1, 0, 1, 0, 0, 1, 0, 1]), vec![0xA5]);
        assert_eq!(bits_to_bytes(&[1, 1]), vec![0xC0]);
        let data = b"round trip";
        assert_eq!(bits_to_bytes(&bytes_to_bits(data)), data);
    }
}
