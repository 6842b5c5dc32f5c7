use std::io::Read;

use crate::bitstream::bitreader::BitReader;
use crate::error::{DecodeError, Result};
use crate::huffman_coding::grouped::GroupedHuffman;

use super::mtf::MoveToFrontDecoder;

const RUNA: u16 = 0;
const RUNB: u16 = 1;

/// Does run-length-decoding (RLE2) and MTF decoding straight from the huffman decoder into the block buffer.
///
/// `symbols_in_use` is the number of byte values named by the symbol map; the end-of-block symbol is one past
/// it. Returns the number of bytes written to `out`, which is the pre-BWT block. `out` must be sized to the
/// stream's block size; a block that would not fit is corrupt.
pub fn rle2_mtf_decode<R: Read>(
    br: &mut BitReader<R>,
    huffman: &mut GroupedHuffman,
    mtf_index: &mut MoveToFrontDecoder,
    symbols_in_use: usize,
    out: &mut [u8],
) -> Result<usize> {
    let eob = symbols_in_use as u16 + 1;
    let capacity = out.len();

    // Initialize counters
    let mut zeros = 0_usize;
    let mut bit_multiplier = 1_usize;
    let mut index = 0_usize;

    loop {
        let symbol = huffman.next_symbol(br)?;
        match symbol {
            // RUNA and RUNB spell the run length in bijective base 2, least significant digit first.
            RUNA => {
                zeros += bit_multiplier;
                bit_multiplier <<= 1;
            }
            RUNB => {
                zeros += bit_multiplier << 1;
                bit_multiplier <<= 1;
            }
            n => {
                // Output the run of the most recently used byte, if any
                if zeros > 0 {
                    out[index..index + zeros].fill(mtf_index.head());
                    index += zeros;
                    bit_multiplier = 1;
                    zeros = 0;
                }

                if n == eob {
                    return Ok(index);
                }
                if n > eob {
                    return Err(DecodeError::InvalidSymbol(n));
                }
                if index >= capacity {
                    return Err(DecodeError::BlockOverflow(capacity));
                }
                // Convert the RLE2 code into an MTF rank and output the byte at that rank
                out[index] = mtf_index.get_and_move(n as usize - 1);
                index += 1;
                continue;
            }
        }
        // Watch for malicious input: a run may not run past the end of the block.
        if index + zeros > capacity {
            return Err(DecodeError::BlockOverflow(capacity));
        }
    }
}

#[cfg(test)]
mod test {
    use super::rle2_mtf_decode;
    use crate::bitstream::bitreader::BitReader;
    use crate::error::DecodeError;
    use crate::huffman_coding::grouped::GroupedHuffman;
    use crate::tools::mtf::MoveToFrontDecoder;

    /// Builds a bitstream holding a single 4 bit fixed-length table set for an alphabet of up to 16 symbols,
    /// followed by the given symbols.
    fn stream(alpha_size: usize, symbols: &[u16]) -> Vec<u8> {
        let mut bits = String::new();
        bits += "010"; // two tables
        bits += &format!("{:015b}", (symbols.len() + 49) / 50);
        bits += &"0".repeat((symbols.len() + 49) / 50); // all selectors pick table 0
        for _ in 0..2 {
            bits += "00100"; // length 4 ...
            bits += &"0".repeat(alpha_size); // ... for every symbol
        }
        for &s in symbols {
            bits += &format!("{:04b}", s);
        }
        bits.push_str(&"0".repeat((8 - bits.len() % 8) % 8));
        bits.as_bytes()
            .chunks(8)
            .map(|c| c.iter().fold(0_u8, |acc, &b| acc << 1 | (b - b'0')))
            .collect()
    }

    fn decode(symbols_in_use: &[u8], symbols: &[u16], capacity: usize) -> Result<Vec<u8>, DecodeError> {
        let alpha_size = symbols_in_use.len() + 2;
        let data = stream(alpha_size, symbols);
        let mut br = BitReader::new(data.as_slice());
        let mut huffman = GroupedHuffman::read(&mut br, alpha_size, 100_000)?;
        let mut mtf = MoveToFrontDecoder::from_symbols(symbols_in_use);
        let mut out = vec![0_u8; capacity];
        let n = rle2_mtf_decode(&mut br, &mut huffman, &mut mtf, symbols_in_use.len(), &mut out)?;
        out.truncate(n);
        Ok(out)
    }

    #[test]
    fn literals_and_eob() {
        // In use: a b c. Symbols: 3 -> rank 2 (c), 2 -> rank 1 (a), 3 -> rank 2 (b), EOB = 4
        assert_eq!(decode(b"abc", &[3, 2, 3, 4], 100).unwrap(), b"cab");
    }

    #[test]
    fn runs_of_the_head() {
        // RUNA = 1, RUNB = 2, RUNA RUNA = 3, RUNB RUNA = 4, RUNA RUNB = 5
        assert_eq!(decode(b"ab", &[0, 3], 100).unwrap(), b"a");
        assert_eq!(decode(b"ab", &[1, 3], 100).unwrap(), b"aa");
        assert_eq!(decode(b"ab", &[0, 0, 3], 100).unwrap(), b"aaa");
        assert_eq!(decode(b"ab", &[1, 0, 3], 100).unwrap(), b"aaaa");
        assert_eq!(decode(b"ab", &[0, 1, 3], 100).unwrap(), b"aaaaa");
        // A run after a literal repeats that literal.
        assert_eq!(decode(b"ab", &[2, 1, 0, 2, 3], 100).unwrap(), b"bbbbba");
    }

    #[test]
    fn invalid_symbol() {
        // Four symbols in the tables but only one byte in use: EOB is 2, symbol 3 is outside the alphabet.
        let data = stream(4, &[3]);
        let mut br = BitReader::new(data.as_slice());
        let mut huffman = GroupedHuffman::read(&mut br, 4, 100_000).unwrap();
        let mut mtf = MoveToFrontDecoder::from_symbols(b"z");
        let mut out = vec![0_u8; 10];
        assert!(matches!(
            rle2_mtf_decode(&mut br, &mut huffman, &mut mtf, 1, &mut out),
            Err(DecodeError::InvalidSymbol(3))
        ));
    }

    #[test]
    fn block_overflow() {
        // Run of 5 into a block of 4.
        assert!(matches!(
            decode(b"ab", &[0, 1, 3], 4),
            Err(DecodeError::BlockOverflow(4))
        ));
        // Literals past the end.
        assert!(matches!(
            decode(b"ab", &[2, 2, 2], 2),
            Err(DecodeError::BlockOverflow(2))
        ));
    }

    #[test]
    fn groups_of_fifty() {
        // 60 literals need two selectors.
        let mut symbols = vec![2_u16; 60];
        symbols.push(3);
        let out = decode(b"ab", &symbols, 100).unwrap();
        assert_eq!(out.len(), 60);
        // b, then a, b, a, ... alternating as each rank 1 swaps the two.
        assert_eq!(&out[..4], b"baba");
    }
}
