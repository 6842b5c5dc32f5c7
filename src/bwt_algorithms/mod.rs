//! The bwt_algorithms module holds the Burrows-Wheeler Transform reversal for the Rust version of the standard
//! BZIP2 library.
//!
//! Compression sorts every rotation of a block and keeps the last column. Undoing that needs no sorting at all:
//! counting the bytes in the last column is enough to rebuild the chain that links each byte to its successor.
//!
pub mod bwt_inverse;
