//! The compression module drives decompression for the Rust version of the standard BZIP2 library.
//!
//! Decompression is single threaded. It follows the inverse of the compression process, one block at a time.
//! - Huffman decoding, switching between up to six tables every 50 symbols.
//! - RLE 2: Expand all runs of the zero byte.
//! - MTF transform: Convert from the Move-To-Front indecies to the symbols represented by the indecies.
//! - BWT reversal: Restore the original data from the BWT transform.
//! - Derandomization, for the rare blocks written by very old encoders.
//! - RLE 1: Expand all runs of 4+ identical bytes.
//!
//! `block` does the first five steps. `decoder_stream` wraps them, the RLE 1 stage and the CRC checks in a
//! `Read` implementation. `decompress` is the file handling used by the command line tool.
//!
pub mod block;
pub mod decoder_stream;
pub mod decompress;
