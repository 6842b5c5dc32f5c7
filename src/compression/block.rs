use std::io::Read;

use log::{debug, trace};

use crate::bitstream::bitreader::BitReader;
use crate::bwt_algorithms::bwt_inverse::InverseBwt;
use crate::error::{DecodeError, Result};
use crate::huffman_coding::grouped::GroupedHuffman;
use crate::tools::{
    mtf::MoveToFrontDecoder, randomize::derandomize, rle2_mtf_decode::rle2_mtf_decode,
    symbol_map::read_sym_map,
};

/// Start of a compressed block (BCD of pi).
pub const BLOCK_MAGIC: u64 = 0x3141_5926_5359;
/// End of a stream (BCD of sqrt(pi)).
pub const STREAM_MAGIC: u64 = 0x1772_4538_5090;

/// Header fields of the block just decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    /// CRC stored in the stream for the block's decompressed bytes.
    pub crc: u32,
    pub randomized: bool,
    /// Row of the original data in the sorted BWT matrix.
    pub key: u32,
    /// Bytes in the block before the RLE 1 expansion.
    pub len: usize,
}

/// Turns the bits of one compressed block into the block's pre-RLE 1 bytes.
///
/// The block buffer is owned here and reused for every block of a stream. It holds, in turn, the MTF output
/// (written by the symbol decoder), the original block order (rewritten in place by the inverse BWT) and finally
/// the derandomised bytes. Only the last state is visible through [`BlockDecoder::data`].
#[derive(Debug)]
pub struct BlockDecoder {
    buffer: Vec<u8>,
    len: usize,
    bwt: InverseBwt,
}

impl BlockDecoder {
    /// `block_size` is the header's digit times 100,000.
    pub fn new(block_size: usize) -> Self {
        Self {
            buffer: vec![0; block_size],
            len: 0,
            bwt: InverseBwt::with_capacity(block_size),
        }
    }

    /// Change the block size for a following stream, keeping the allocations where possible.
    pub fn resize(&mut self, block_size: usize) {
        self.buffer.resize(block_size, 0);
        self.len = 0;
    }

    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    /// Decode the block that follows a block magic.
    pub fn decode<R: Read>(&mut self, br: &mut BitReader<R>) -> Result<BlockInfo> {
        self.len = 0;

        let crc = br.read(32)?;
        // Get randomize flag - should almost always be zero
        let randomized = br.bit()?;
        let key = br.read(24)?;
        trace!("\nRandomized is {:?}, key is {} at {}.", randomized, key, br.loc());

        let symbol_set = read_sym_map(br)?;
        if symbol_set.is_empty() {
            return Err(DecodeError::NoSymbolsInUse);
        }
        // RUNA and RUNB replace rank 0, and EOB is added on top
        let alpha_size = symbol_set.len() + 2;

        let mut huffman = GroupedHuffman::read(br, alpha_size, self.buffer.len())?;
        debug!(
            "Block uses {} symbols, {} tables and {} selectors.",
            symbol_set.len(),
            huffman.tree_count(),
            huffman.selector_count()
        );

        let mut mtf_index = MoveToFrontDecoder::from_symbols(&symbol_set);
        let len = rle2_mtf_decode(
            br,
            &mut huffman,
            &mut mtf_index,
            symbol_set.len(),
            &mut self.buffer,
        )?;

        let block = &mut self.buffer[..len];
        self.bwt.invert(block, key)?;
        if randomized {
            debug!("Block is randomized.");
            derandomize(block);
        }
        self.len = len;

        Ok(BlockInfo {
            crc,
            randomized,
            key,
            len,
        })
    }

    /// The decoded block, ready for RLE 1 decoding.
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.len]
    }
}
