//! `DecoderStream`: a forward-only `Read` adapter that turns a bzip2 stream into its decompressed bytes.
//!
//! Decoding is lazy. Nothing is read from the source until the first call to `read`, which checks the stream
//! header and decodes the first block. Each later block is decoded as soon as the previous one has been handed
//! out completely, so the stream CRC is checked as soon as the last byte is delivered, even by a caller that
//! never asks for more.
//!
//! ```text
//!   Header ──► Block ◄──┐
//!                │ drained: read marker
//!                ├──────┘ (block magic)
//!                └──► Done (stream magic, CRC ok)
//!   any fatal error ──► Faulted
//! ```
use std::io::{self, BufReader, Read};

use log::{error, info, warn};

use super::block::{BlockDecoder, BLOCK_MAGIC, STREAM_MAGIC};
use crate::bitstream::bitreader::BitReader;
use crate::error::{DecodeError, Result};
use crate::tools::{crc::StreamCrc, rle1::rle1_crc, rle1::Rle1Decoder};

/// `BZh`
const SIGNATURE: u32 = 0x42_5a_68;
const BLOCK_UNIT: usize = 100_000;
const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Settings for a [`DecoderStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Keep decoding when another bzip2 stream follows the end of the first, as the `bzip2` tool does.
    /// Bytes after the last stream that are not a bzip2 header are ignored with a warning.
    pub multi_stream: bool,
    /// Capacity of the read buffer placed in front of the compressed source.
    pub buffer_capacity: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            multi_stream: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    Block,
    Done,
    Faulted,
}

/// Decompressing reader over a bzip2 compressed source.
///
/// Not seekable and of unknown length. Errors surface as [`io::Error`]s of kind `InvalidData` (corrupt data)
/// or `UnexpectedEof` (truncated data); after the first error every read fails.
#[derive(Debug)]
pub struct DecoderStream<R> {
    br: BitReader<BufReader<R>>,
    options: DecoderOptions,
    state: State,
    block: Option<BlockDecoder>,
    rle: Rle1Decoder,
    stream_crc: StreamCrc,
    block_counter: usize,
    stream_counter: usize,
    /// Error hit while pre-reading, held back until the bytes already decoded have been delivered.
    pending: Option<DecodeError>,
}

impl<R: Read> DecoderStream<R> {
    /// Decoder for a single bzip2 stream.
    pub fn new(source: R) -> Self {
        Self::with_options(source, DecoderOptions::default())
    }

    pub fn with_options(source: R, options: DecoderOptions) -> Self {
        let capacity = options.buffer_capacity.max(2);
        Self {
            br: BitReader::new(BufReader::with_capacity(capacity, source)),
            options,
            state: State::Header,
            block: None,
            rle: Rle1Decoder::new(),
            stream_crc: StreamCrc::new(),
            block_counter: 0,
            stream_counter: 0,
            pending: None,
        }
    }

    pub fn get_ref(&self) -> &R {
        self.br.get_ref().get_ref()
    }

    pub fn get_mut(&mut self) -> &mut R {
        self.br.get_mut().get_mut()
    }

    /// Give back the compressed source. Bytes already buffered from it are lost.
    pub fn into_inner(self) -> R {
        self.br.into_inner().into_inner()
    }

    /// True once the end of the (last) stream has been reached and verified.
    pub fn is_finished(&self) -> bool {
        self.state == State::Done
    }

    /// Check the signature and block size of a stream header.
    fn read_header(&mut self) -> Result<()> {
        if self.br.read(24)? != SIGNATURE {
            return Err(DecodeError::BadMagic);
        }
        let digit = self.br.byte()?;
        if !(b'1'..=b'9').contains(&digit) {
            return Err(DecodeError::BadBlockSize(digit));
        }
        let block_size = (digit - b'0') as usize * BLOCK_UNIT;
        match self.block.as_mut() {
            Some(block) => block.resize(block_size),
            None => self.block = Some(BlockDecoder::new(block_size)),
        }
        self.stream_crc = StreamCrc::new();
        self.stream_counter += 1;
        info!(
            "Found a valid bzip2 signature for stream {} with block size {}.",
            self.stream_counter, block_size
        );
        Ok(())
    }

    /// Read the next marker. Decodes and verifies a block, or checks the stream CRC at the end of the stream.
    /// Returns false once there is nothing more to decode.
    fn next_block(&mut self) -> Result<bool> {
        loop {
            let marker = self.br.read_u64(48)?;
            match marker {
                BLOCK_MAGIC => {
                    self.block_counter += 1;
                    let block = self.block.as_mut().ok_or(DecodeError::Faulted)?;
                    let info = block.decode(&mut self.br)?;

                    // Check the block before any of it reaches the caller.
                    let (found, expanded) = rle1_crc(block.data());
                    if found != info.crc {
                        error!(
                            "Block {} CRC failed! Found {:#010x} looking for {:#010x}.",
                            self.block_counter, found, info.crc
                        );
                        return Err(DecodeError::BlockCrcMismatch {
                            expected: info.crc,
                            found,
                        });
                    }
                    self.stream_crc.combine(info.crc);
                    self.rle.reset(info.len);
                    info!(
                        "Block {} CRCs matched, {} bytes.",
                        self.block_counter, expanded
                    );
                    return Ok(true);
                }
                STREAM_MAGIC => {
                    let expected = self.br.read(32)?;
                    let found = self.stream_crc.value();
                    if expected != found {
                        error!(
                            "Stream CRC failed! Found {:#010x} looking for {:#010x}.",
                            found, expected
                        );
                        return Err(DecodeError::StreamCrcMismatch { expected, found });
                    }
                    if self.br.overrun() {
                        return Err(DecodeError::UnexpectedEof);
                    }
                    info!("Stream CRCs matched: {:#010x}.", expected);
                    if !self.options.multi_stream || !self.more_streams()? {
                        return Ok(false);
                    }
                }
                other => return Err(DecodeError::InvalidMarker(other)),
            }
        }
    }

    /// Look for another stream after the one just finished.
    fn more_streams(&mut self) -> Result<bool> {
        self.br.align_to_byte();
        if !self.br.has_more()? {
            return Ok(false);
        }
        match self.read_header() {
            Ok(()) => Ok(true),
            Err(DecodeError::BadMagic | DecodeError::BadBlockSize(_)) => {
                warn!("Trailing garbage after the end of the compressed data ignored.");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Move to the next block, or to Done. Truncation wins over whatever error it caused.
    fn advance(&mut self, from_header: bool) -> Result<()> {
        let result = if from_header {
            self.read_header().and_then(|_| self.next_block())
        } else {
            self.next_block()
        };
        let result = match result {
            Err(DecodeError::Io(e)) => Err(DecodeError::Io(e)),
            Ok(true) | Err(_) if self.br.overrun() => Err(DecodeError::UnexpectedEof),
            other => other,
        };
        match result {
            Ok(true) => self.state = State::Block,
            Ok(false) => self.state = State::Done,
            Err(e) => {
                self.state = State::Faulted;
                return Err(e);
            }
        }
        Ok(())
    }
}

impl<R: Read> Read for DecoderStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.state {
                State::Header => self.advance(true)?,
                State::Done => return Ok(0),
                State::Faulted => {
                    return Err(self.pending.take().unwrap_or(DecodeError::Faulted).into())
                }
                State::Block => {
                    let data = self.block.as_ref().map_or(&[][..], |b| b.data());
                    let n = self.rle.read(data, buf);
                    // Pre-read the next block so the CRCs are checked as soon as this one is drained.
                    if self.rle.at_eof() {
                        if let Err(e) = self.advance(false) {
                            if n == 0 {
                                return Err(e.into());
                            }
                            self.pending = Some(e);
                        }
                    }
                    if n > 0 {
                        return Ok(n);
                    }
                }
            }
        }
    }
}

/// Decompress everything from `source` into `sink`, returning the number of bytes written.
pub fn decompress_to<R: Read, W: io::Write>(
    source: R,
    sink: &mut W,
    options: DecoderOptions,
) -> io::Result<u64> {
    let mut stream = DecoderStream::with_options(source, options);
    io::copy(&mut stream, sink)
}

#[cfg(test)]
mod test {
    use super::{DecoderOptions, DecoderStream};
    use std::io::{self, Read};

    /// bzip2 -9 of "banana"
    const BANANA: &[u8] = &[
        0x42, 0x5a, 0x68, 0x39, 0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0xef, 0xb6, 0xec, 0x01, 0x00,
        0x00, 0x01, 0x81, 0x00, 0x30, 0x01, 0x20, 0x00, 0x30, 0xcc, 0x0c, 0x7a, 0x88, 0x5e, 0x2e,
        0xe4, 0x8a, 0x70, 0xa1, 0x21, 0xdf, 0x6d, 0xd8, 0x02,
    ];
    const EMPTY: &[u8] = &[
        0x42, 0x5a, 0x68, 0x39, 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn banana() {
        let mut out = String::new();
        DecoderStream::new(BANANA).read_to_string(&mut out).unwrap();
        assert_eq!(out, "banana");
    }

    #[test]
    fn one_byte_reads() {
        let mut stream = DecoderStream::new(BANANA);
        let mut out = Vec::new();
        let mut byte = [0_u8; 1];
        loop {
            match stream.read(&mut byte).unwrap() {
                0 => break,
                _ => out.push(byte[0]),
            }
        }
        assert_eq!(out, b"banana");
        // Clean EOF is sticky.
        assert_eq!(stream.read(&mut byte).unwrap(), 0);
    }

    #[test]
    fn stream_crc_checked_on_last_byte() {
        let mut stream = DecoderStream::new(BANANA);
        let mut buf = [0_u8; 6];
        assert_eq!(stream.read(&mut buf).unwrap(), 6);
        assert!(stream.is_finished());
    }

    #[test]
    fn empty_stream() {
        let mut out = Vec::new();
        DecoderStream::new(EMPTY).read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn lazy_header() {
        let mut stream = DecoderStream::new(&b"PK\x03\x04"[..]);
        let err = stream.read(&mut [0; 8]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(err.to_string(), "bad magic at start of stream");
        // Faulted for good.
        let err = stream.read(&mut [0; 8]).unwrap_err();
        assert!(err.to_string().contains("unusable"));
    }

    #[test]
    fn bad_block_size() {
        let err = DecoderStream::new(&b"BZh0"[..])
            .read(&mut [0; 8])
            .unwrap_err();
        assert!(err.to_string().starts_with("unexpected block size"));
    }

    #[test]
    fn invalid_marker() {
        let mut data = BANANA.to_vec();
        data[4..10].copy_from_slice(&[0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]);
        let err = DecoderStream::new(data.as_slice())
            .read(&mut [0; 8])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().starts_with("found invalid marker"));
    }

    #[test]
    fn bad_block_crc() {
        let mut data = BANANA.to_vec();
        data[13] ^= 0x01;
        let mut stream = DecoderStream::new(data.as_slice());
        let mut buf = [0_u8; 16];
        let err = stream.read(&mut buf).unwrap_err();
        assert!(err.to_string().starts_with("block CRC mismatch"));
        // Nothing of the bad block was handed out.
        assert_eq!(buf, [0; 16]);
    }

    #[test]
    fn truncated() {
        for cut in [5, 12, 20, BANANA.len() - 2] {
            let mut out = Vec::new();
            let err = DecoderStream::new(&BANANA[..cut])
                .read_to_end(&mut out)
                .unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof, "cut at {}", cut);
        }
    }

    #[test]
    fn source_errors_pass_through() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone"))
            }
        }
        let err = DecoderStream::new(Broken).read(&mut [0; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    fn concatenated_streams() {
        let mut data = BANANA.to_vec();
        data.extend_from_slice(EMPTY);
        data.extend_from_slice(BANANA);

        let mut single = Vec::new();
        DecoderStream::new(data.as_slice())
            .read_to_end(&mut single)
            .unwrap();
        assert_eq!(single, b"banana");

        let options = DecoderOptions {
            multi_stream: true,
            ..DecoderOptions::default()
        };
        let mut multi = Vec::new();
        DecoderStream::with_options(data.as_slice(), options.clone())
            .read_to_end(&mut multi)
            .unwrap();
        assert_eq!(multi, b"bananabanana");

        data.extend_from_slice(b"garbage");
        let mut multi = Vec::new();
        DecoderStream::with_options(data.as_slice(), options)
            .read_to_end(&mut multi)
            .unwrap();
        assert_eq!(multi, b"bananabanana");
    }

    #[test]
    fn into_inner_returns_source() {
        let stream = DecoderStream::new(io::Cursor::new(BANANA));
        assert_eq!(stream.get_ref().position(), 0);
        let cursor = stream.into_inner();
        assert_eq!(cursor.into_inner(), BANANA);
    }
}
