//! Rust decoder for the standard BZIP2 format.
//!
//! Version 0.1.0
//!
//! Provides safe, streaming decompression of data in the bzip2 format. [`DecoderStream`] wraps any
//! [`std::io::Read`] source of compressed bytes and is itself a `Read` of the decompressed bytes. Every block
//! is checked against its CRC before any of it is handed out, and the stream CRC is checked at the end.
//!
//! ```no_run
//! use std::{fs::File, io::Read};
//! use bzip2_decoder::DecoderStream;
//!
//! let mut text = String::new();
//! DecoderStream::new(File::open("notes.txt.bz2")?).read_to_string(&mut text)?;
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! The `bunzip2` binary built from this crate decompresses files from the command line:
//!
//! `$> bunzip2 test.txt.bz2`
//!
//! This will decompress the file and create the file test.txt.
//! The original file will be deleted.
//!
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::decoder_stream::{decompress_to, DecoderOptions, DecoderStream};
pub use error::{DecodeError, Result};
