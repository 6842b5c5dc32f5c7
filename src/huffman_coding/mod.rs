//! The huffman module decodes the entropy coded symbol stream of the Rust bzip2 decoder.
//!
//! BZIP2 is a block-oriented approach to compress data.
//!
//! Huffman encoding is used in lieu of arithmetic encoding because of an historical problem with licensing restrictions.
//! While that has been resolved in more recent years, the BZIP2 standard was set based on the huffman standard.
//!
//! The huffman coding algorithm as used by BZIP2 is both block and chunk oriented. Within each block, chunks of 50
//! symbols are coded with one of up to six huffman tables, chosen by a selector list sent ahead of the data.
//! - huffman: one canonical table, built from code lengths.
//! - grouped: the set of tables for a block plus the selectors that switch between them.
//!
//! The process of decoding each block is inherently sequential and does not benefit from multithreading.
//!
pub mod grouped;
pub mod huffman;
