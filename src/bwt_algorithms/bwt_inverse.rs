use crate::error::{DecodeError, Result};

/// Inverse Burrows-Wheeler Transform, done in place on the block buffer.
///
/// Keeps its transformation vector between blocks so a stream of 900k blocks allocates it once.
#[derive(Debug, Default)]
pub struct InverseBwt {
    /// Low 8 bits: the block byte at this position. High 24 bits: the position of the next byte in original order.
    t_vec: Vec<u32>,
}

impl InverseBwt {
    pub fn with_capacity(block_size: usize) -> Self {
        Self {
            t_vec: Vec::with_capacity(block_size),
        }
    }

    /// Replace the BWT output in `block` with the original data. `key` is the row of the original data in the
    /// sorted rotations.
    pub fn invert(&mut self, block: &mut [u8], key: u32) -> Result<()> {
        let end = block.len();
        if key as usize >= end {
            return Err(DecodeError::BadOriginPointer {
                pointer: key,
                len: end,
            });
        }

        // Convert frequency count to a cumulative sum of frequencies
        let mut freq = [0_u32; 256];
        for &s in block.iter() {
            freq[s as usize] += 1;
        }
        let mut sum = 0;
        for f in freq.iter_mut() {
            let count = *f;
            *f = sum;
            sum += count;
        }

        // Build the transformation vector to find the next character in the original data. Every slot keeps its own
        // byte in the low bits, so the block itself can be overwritten while walking the chain.
        self.t_vec.clear();
        self.t_vec.extend(block.iter().map(|&s| s as u32));
        for (i, &s) in block.iter().enumerate() {
            let slot = &mut freq[s as usize];
            self.t_vec[*slot as usize] |= (i as u32) << 8;
            *slot += 1;
        }

        // Every pointer is below `end`, so a corrupt block can only produce wrong bytes, never a bad index.
        let mut pos = self.t_vec[key as usize] >> 8;
        for out in block.iter_mut() {
            let entry = self.t_vec[pos as usize];
            *out = entry as u8;
            pos = entry >> 8;
        }
        Ok(())
    }
}
