//! Canonical Huffman decoding for one bzip2 coding table.
//!
//! BZIP2 only transmits a code length for every symbol. The codes themselves are canonical: shorter codes sort
//! before longer ones, and codes of equal length are handed out in ascending symbol order. That lets the decoder
//! describe each code length as a contiguous range of code values (a `Level`) and walk the levels from the
//! shortest length to the longest, pulling in just enough bits each time to reach the next length.
//!
use std::io::Read;

use log::trace;

use crate::bitstream::bitreader::BitReader;
use crate::error::{DecodeError, Result};

/// Longest code length allowed by the bzip2 format.
pub const MAX_CODE_LEN: u8 = 20;

#[derive(Debug, Clone)]
struct Level {
    /// Bits to append to the code to get from the previous level's length to this one.
    bits: u32,
    /// Index into the sorted symbol list of the first symbol at this level.
    offset: u32,
    /// First code value at this level.
    start_code: u32,
    /// One past the last code value at this level.
    end_code: u32,
}

/// Decode table for one set of bzip2 code lengths.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    levels: Vec<Level>,
    /// Symbols ordered by (code length, symbol).
    symbols: Vec<u16>,
    max_len: u32,
}

impl HuffmanTree {
    /// Build a decode table from per-symbol code lengths (each 1..=20).
    pub fn new(lengths: &[u8]) -> Result<Self> {
        if let Some(&bad) = lengths.iter().find(|&&l| l == 0 || l > MAX_CODE_LEN) {
            return Err(DecodeError::BadCodeLength(bad as i32));
        }

        // Maps must be sorted by length for the next step. The sort is stable, so symbols of equal length
        // stay in ascending order.
        let mut map: Vec<(u16, u32)> = lengths
            .iter()
            .enumerate()
            .map(|(sym, &len)| (sym as u16, len as u32))
            .collect();
        map.sort_by_key(|&(_, len)| len);

        let mut levels = Vec::new();
        let mut previous_len = 0;
        let mut code = 0_u32;
        let mut offset = 0_u32;
        let mut i = 0;
        while i < map.len() {
            let len = map[i].1;
            let count = map[i..].iter().take_while(|&&(_, l)| l == len).count() as u32;
            let bits = len - previous_len;
            code <<= bits;
            levels.push(Level {
                bits,
                offset,
                start_code: code,
                end_code: code + count,
            });
            code += count;
            offset += count;
            previous_len = len;
            i += count as usize;
        }

        Ok(Self {
            levels,
            symbols: map.iter().map(|&(s, _)| s).collect(),
            max_len: previous_len,
        })
    }

    /// Read one symbol from the bitstream.
    pub fn next_symbol<R: Read>(&self, br: &mut BitReader<R>) -> Result<u16> {
        let mut code = 0_u32;
        for level in &self.levels {
            // Left shift any code bits we are currently holding so we can add in the next level of bits
            code = code << level.bits | br.read(level.bits)?;
            // Codes below end_code belong to this level, anything else is a longer code.
            if code < level.end_code {
                let sym = self.symbols[(level.offset + code - level.start_code) as usize];
                trace!("\r\x1b[43m{:>3}     \x1b[0m", sym);
                return Ok(sym);
            }
        }
        Err(DecodeError::CorruptHuffmanCode(self.max_len))
    }

    /// Number of symbols in the table.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
