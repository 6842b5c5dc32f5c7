//! The bitstream module forms the I/O subsystem for the Rust bzip2 decoder.
//!
//! BZIP2 is a block-oriented approach to compress data, but the blocks are not byte aligned. Every block marker,
//! table and symbol lives somewhere in one continuous big-endian bitstream, so a single BitReader is created per
//! compressed stream and carried from block to block.
//!
//! This I/O subsystem is designed to efficiently interface with the other modules within the decoder. It is not
//! intended for more general use.
//!
pub mod bitreader;
