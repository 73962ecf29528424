// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! MSB-first bit packing for the compressed payload body.
//!
//! No byte stuffing: the writer zero-pads the final byte and the reader
//! reports end of data as `None`.

/// Packs variable-length codes into bytes, most significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    output: Vec<u8>,
    buf: u8,
    bits_used: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the low `count` bits (0–32) of `value`, highest first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 32);
        for i in (0..count).rev() {
            self.write_bit(((value >> i) & 1) as u8);
        }
    }

    pub fn write_bit(&mut self, bit: u8) {
        self.buf = (self.buf << 1) | (bit & 1);
        self.bits_used += 1;
        if self.bits_used == 8 {
            self.output.push(self.buf);
            self.buf = 0;
            self.bits_used = 0;
        }
    }

    /// Total bits written so far.
    pub fn bit_len(&self) -> usize {
        self.output.len() * 8 + self.bits_used as usize
    }

    /// Zero-pad to a byte boundary and return the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_used > 0 {
            self.output.push(self.buf << (8 - self.bits_used));
        }
        self.output
    }
}

/// Reads bits MSB-first from a byte slice.
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit: u8,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, bit: 0 }
    }

    /// Next bit, or `None` once the data is exhausted.
    pub fn read_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.pos)?;
        let b = (byte >> (7 - self.bit)) & 1;
        self.bit += 1;
        if self.bit == 8 {
            self.bit = 0;
            self.pos += 1;
        }
        Some(b)
    }

    /// Read `count` bits (0–32) right-aligned.
    pub fn read_bits(&mut self, count: u8) -> Option<u32> {
        debug_assert!(count <= 32);
        let mut v = 0u32;
        for _ in 0..count {
            v = (v << 1) | self.read_bit()? as u32;
        }
        Some(v)
    }

    pub fn bits_remaining(&self) -> usize {
        (self.data.len() - self.pos.min(self.data.len())) * 8 - self.bit as usize
    }
}
