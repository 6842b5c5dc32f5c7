//! Error type for the bzip2 decoder.
//!
//! Every error is fatal for the stream that raised it. The decoder never retries or repairs
//! corrupt input; once an error has been returned the [`DecoderStream`](crate::DecoderStream)
//! only answers with [`DecodeError::Faulted`].

use std::io;

use thiserror::Error;

/// Everything that can go wrong while decoding a bzip2 stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The compressed source failed.
    #[error("I/O error reading compressed data: {0}")]
    Io(#[from] io::Error),

    /// The stream does not start with `BZh`.
    #[error("bad magic at start of stream")]
    BadMagic,

    /// The block size digit after `BZh` is not `'1'..='9'`.
    #[error("unexpected block size in header: {0:#04x}")]
    BadBlockSize(u8),

    /// A 48 bit marker that is neither the block magic nor the end-of-stream magic.
    #[error("found invalid marker in stream: {0:#014x}")]
    InvalidMarker(u64),

    /// Number of Huffman trees outside `2..=6`.
    #[error("invalid number of huffman trees: {0}")]
    BadTreeCount(u32),

    /// A block declared zero selectors.
    #[error("no huffman selectors in block")]
    NoSelectors,

    /// The unary selector index reached the tree count.
    #[error("exceeded max number of consecutive bits for a selector")]
    SelectorOverflow,

    /// A code length left `1..=20` while reading the length deltas.
    #[error("invalid huffman code length: {0}")]
    BadCodeLength(i32),

    /// The in-use bitmap marks no byte values.
    #[error("no symbols in use in block")]
    NoSymbolsInUse,

    /// No symbol matched after reading the longest code length of a tree.
    #[error("corrupt huffman code: no symbol after {0} bits")]
    CorruptHuffmanCode(u32),

    /// More groups of 50 symbols than selectors.
    #[error("ran out of huffman selectors")]
    SelectorsExhausted,

    /// A decoded symbol outside the alphabet of the block.
    #[error("invalid symbol from Huffman table: {0}")]
    InvalidSymbol(u16),

    /// The symbol stream produced more bytes than the block size allows.
    #[error("block data exceeds the block size of {0} bytes")]
    BlockOverflow(usize),

    /// The BWT origin pointer does not index into the block.
    #[error("invalid BWT origin pointer {pointer} for a block of {len} bytes")]
    BadOriginPointer { pointer: u32, len: usize },

    /// The CRC of a decoded block does not match the stored one.
    #[error("block CRC mismatch: expected {expected:#010x}, found {found:#010x}")]
    BlockCrcMismatch { expected: u32, found: u32 },

    /// The combined CRC of all blocks does not match the stream trailer.
    #[error("stream CRC mismatch: expected {expected:#010x}, found {found:#010x}")]
    StreamCrcMismatch { expected: u32, found: u32 },

    /// The compressed source ended before the stream did.
    #[error("unexpected end of compressed data")]
    UnexpectedEof,

    /// A read after the stream already failed.
    #[error("decoder is unusable after an earlier error")]
    Faulted,
}

pub type Result<T> = std::result::Result<T, DecodeError>;

impl From<DecodeError> for io::Error {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::Io(e) => e,
            DecodeError::UnexpectedEof => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::DecodeError;
    use std::io;

    #[test]
    fn io_error_kinds() {
        let e: io::Error = DecodeError::UnexpectedEof.into();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);

        let e: io::Error = DecodeError::InvalidSymbol(300).into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert_eq!(e.to_string(), "invalid symbol from Huffman table: 300");

        let e: io::Error = DecodeError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no")).into();
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn messages_name_the_invariant() {
        let e = DecodeError::BlockCrcMismatch { expected: 1, found: 2 };
        assert!(e.to_string().starts_with("block CRC mismatch"));
        assert!(DecodeError::InvalidMarker(0x1234)
            .to_string()
            .starts_with("found invalid marker"));
    }
}
