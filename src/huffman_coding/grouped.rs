//! Selector-switched Huffman decoding for one bzip2 block.
//!
//! A block carries between two and six coding tables. The symbol stream is cut into groups of 50 symbols and a
//! selector list, itself move-to-front and unary coded, names the table used for each group.
//!
use std::io::Read;

use log::{debug, warn};

use super::huffman::{HuffmanTree, MAX_CODE_LEN};
use crate::bitstream::bitreader::BitReader;
use crate::error::{DecodeError, Result};
use crate::tools::mtf::MoveToFrontDecoder;

/// Bzip2 group (chunk) size.
pub const GROUP_SIZE: usize = 50;
const MIN_TREES: u32 = 2;
const MAX_TREES: u32 = 6;

/// All coding tables of a block together with the selector list that switches between them.
#[derive(Debug)]
pub struct GroupedHuffman {
    trees: Vec<HuffmanTree>,
    selectors: Vec<u8>,
    next_selector: usize,
    remaining: usize,
    current: usize,
}

impl GroupedHuffman {
    /// Read tree count, selectors and code lengths for an alphabet of `alpha_size` symbols.
    /// `block_size` bounds how many selectors can ever be used.
    pub fn read<R: Read>(br: &mut BitReader<R>, alpha_size: usize, block_size: usize) -> Result<Self> {
        let table_count = br.read(3)?;
        if !(MIN_TREES..=MAX_TREES).contains(&table_count) {
            return Err(DecodeError::BadTreeCount(table_count));
        }

        let selector_count = br.read(15)? as usize;
        if selector_count == 0 {
            return Err(DecodeError::NoSelectors);
        }

        // Like Julian, read every selector but only keep the ones that can be used.
        let max_selectors = 2 + block_size / GROUP_SIZE;
        if selector_count > max_selectors {
            warn!(
                "Found {} selectors, but the maximum is {}. Ignoring the excess.",
                selector_count, max_selectors
            );
        }
        let mut table_idx = MoveToFrontDecoder::new();
        let mut selectors = Vec::with_capacity(selector_count.min(max_selectors));
        for i in 0..selector_count {
            let mut rank = 0;
            while br.bit()? {
                rank += 1;
                if rank >= table_count {
                    return Err(DecodeError::SelectorOverflow);
                }
            }
            if i < max_selectors {
                selectors.push(table_idx.get_and_move(rank as usize));
            }
        }
        debug!(
            "Decoded {} selectors for {} tables at {}.",
            selector_count,
            table_count,
            br.loc()
        );

        let mut trees = Vec::with_capacity(table_count as usize);
        let mut lengths = vec![0_u8; alpha_size];
        for _ in 0..table_count {
            // Read the origin length - five bits long. Every other length is a delta from the previous one.
            let mut len = br.read(5)? as i32;
            for slot in lengths.iter_mut() {
                loop {
                    if !(1..=MAX_CODE_LEN as i32).contains(&len) {
                        return Err(DecodeError::BadCodeLength(len));
                    }
                    if !br.bit()? {
                        break;
                    }
                    // "10" adds one, "11" subtracts one.
                    if br.bit()? {
                        len -= 1;
                    } else {
                        len += 1;
                    }
                }
                *slot = len as u8;
            }
            trees.push(HuffmanTree::new(&lengths)?);
        }

        Ok(Self {
            trees,
            selectors,
            next_selector: 0,
            remaining: 0,
            current: 0,
        })
    }

    /// Read the next symbol, switching tables every 50 symbols.
    pub fn next_symbol<R: Read>(&mut self, br: &mut BitReader<R>) -> Result<u16> {
        if self.remaining == 0 {
            let selector = self
                .selectors
                .get(self.next_selector)
                .ok_or(DecodeError::SelectorsExhausted)?;
            self.current = *selector as usize;
            self.next_selector += 1;
            self.remaining = GROUP_SIZE;
        }
        self.remaining -= 1;
        self.trees[self.current].next_symbol(br)
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn selector_count(&self) -> usize {
        self.selectors.len()
    }
}
