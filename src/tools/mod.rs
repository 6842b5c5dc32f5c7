//! The tools module provides the building blocks of the Rust bzip2 decoder.
//!
//! BZIP2 is a block-oriented approach to compress data.
//!
//! The tools are:
//! - cli: Command line interface for the decoder binary.
//! - crc: CRC32 checksum for BZIP2, both block and stream versions.
//! - mtf: Move-To-Front decoding table.
//! - randomize: Reversal of the legacy block randomisation.
//! - rle1: Run-Length-Encoding phase 1 decoding, the last stage before output.
//! - rle2_mtf_decode: Run-Length-Encoding phase 2 and Move-To-Front decoding (integrated for speed).
//! - symbol_map: Decode the symbol map used in BZIP2.
//!
pub mod cli;
pub mod crc;
pub mod mtf;
pub mod randomize;
pub mod rle1;
pub mod rle2_mtf_decode;
pub mod symbol_map;
