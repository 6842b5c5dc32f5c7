//! BitReader: A module for the Rust version of the standard BZIP2 library.
//!
//! Reads a packed, most-significant-bit-first bitstream from any I/O source that supports the read() call.
//!
//! Bits are buffered in a 32 bit accumulator which is refilled exactly two bytes at a time. When the source
//! runs dry the missing bytes are filled with zeros, so a read never fails for lack of data. The reader
//! remembers that it did this, and [`BitReader::overrun`] reports whether any of those invented bits have
//! been handed out.
//!
use std::io::{self, ErrorKind, Read};

/// Bits added to the accumulator by each refill.
const REFILL_BITS: u32 = 16;
/// Widest read served straight from the accumulator. Wider reads are split.
const MAX_CHUNK: u32 = 16;

/// Reads a binary Bzip2 stream bit by bit.
#[derive(Debug)]
pub struct BitReader<R> {
    source: R,
    /// Valid bits live in the low `count` bits, oldest bit highest.
    acc: u32,
    count: u32,
    /// How many of the lowest buffered bits are zero fill rather than source data.
    padding: u32,
    source_done: bool,
    overrun: bool,
    consumed: u64,
}

impl<R: Read> BitReader<R> {
    /// Creates a new BitReader over `source`.
    pub fn new(source: R) -> Self {
        Self {
            source,
            acc: 0,
            count: 0,
            padding: 0,
            source_done: false,
            overrun: false,
            consumed: 0,
        }
    }

    /// Pull two more bytes into the low end of the accumulator, zero filling past the end of the source.
    fn refill(&mut self) -> io::Result<()> {
        let mut pair = [0_u8; 2];
        let got = if self.source_done {
            0
        } else {
            read_up_to(&mut self.source, &mut pair)?
        };
        if got < pair.len() {
            self.source_done = true;
            self.padding += (pair.len() - got) as u32 * 8;
        }
        self.acc = self.acc << REFILL_BITS | u16::from_be_bytes(pair) as u32;
        self.count += REFILL_BITS;
        Ok(())
    }

    /// Make sure at least n (<= 16) bits are buffered.
    fn ensure(&mut self, n: u32) -> io::Result<()> {
        debug_assert!(n <= MAX_CHUNK);
        if self.count < n {
            self.refill()?;
        }
        Ok(())
    }

    fn buffered(&self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        (self.acc >> (self.count - n)) & (u32::MAX >> (32 - n))
    }

    fn advance(&mut self, n: u32) {
        self.count -= n;
        self.consumed += n as u64;
        if self.count < self.padding {
            self.overrun = true;
            self.padding = self.count;
        }
    }

    fn read_chunk(&mut self, n: u32) -> io::Result<u32> {
        self.ensure(n)?;
        let value = self.buffered(n);
        self.advance(n);
        Ok(value)
    }

    /// Return the next n bits (n <= 32), most significant bit first.
    pub fn read(&mut self, n: u32) -> io::Result<u32> {
        debug_assert!(n <= 32);
        if n > MAX_CHUNK {
            let high = self.read_chunk(n - MAX_CHUNK)?;
            let low = self.read_chunk(MAX_CHUNK)?;
            return Ok(high << MAX_CHUNK | low);
        }
        self.read_chunk(n)
    }

    /// Return the next n bits (n <= 64) as a u64. Used for the 48 bit block markers.
    pub fn read_u64(&mut self, mut n: u32) -> io::Result<u64> {
        debug_assert!(n <= 64);
        let mut result = 0_u64;
        while n > 0 {
            let take = n.min(MAX_CHUNK);
            result = result << take | self.read_chunk(take)? as u64;
            n -= take;
        }
        Ok(result)
    }

    /// Return the next n bits (n <= 16) without consuming them.
    pub fn peek(&mut self, n: u32) -> io::Result<u32> {
        self.ensure(n)?;
        Ok(self.buffered(n))
    }

    /// Skip n bits (n <= 16).
    pub fn consume(&mut self, n: u32) -> io::Result<()> {
        self.ensure(n)?;
        self.advance(n);
        Ok(())
    }

    /// Return true if the next bit is 1, consuming the bit.
    pub fn bit(&mut self) -> io::Result<bool> {
        Ok(self.read_chunk(1)? == 1)
    }

    /// Return the next byte.
    pub fn byte(&mut self) -> io::Result<u8> {
        Ok(self.read_chunk(8)? as u8)
    }

    /// Skip to the next byte boundary of the underlying source.
    pub fn align_to_byte(&mut self) {
        // Refills are whole bytes, so the partial byte is whatever is left over modulo 8.
        self.advance(self.count % 8);
    }

    /// True if real source data remains, either buffered or still unread.
    pub fn has_more(&mut self) -> io::Result<bool> {
        if self.count > self.padding {
            return Ok(true);
        }
        if self.source_done {
            return Ok(false);
        }
        if self.count <= REFILL_BITS {
            self.refill()?;
            return Ok(self.count > self.padding);
        }
        Ok(false)
    }

    /// True once any zero fill bit past the end of the source has been consumed.
    pub fn overrun(&self) -> bool {
        self.overrun
    }

    /// Debugging function. Report current position in the stream as [byte.bit].
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.consumed / 8, self.consumed % 8)
    }

    pub fn get_ref(&self) -> &R {
        &self.source
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

/// Fill as much of buf as the source allows. Returns how many bytes arrived.
fn read_up_to<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod test {
    use super::BitReader;

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8].as_slice();
        let mut br = BitReader::new(x);
        assert!(br.bit().unwrap());
        for _ in 0..6 {
            assert!(!br.bit().unwrap());
        }
        assert!(br.bit().unwrap());
        assert!(!br.overrun());
        // Past the end the reader zero fills and flags the overrun.
        assert!(!br.bit().unwrap());
        assert!(br.overrun());
    }

    #[test]
    fn read_test() {
        let x = [0b00011011].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read(5).unwrap(), 3);
        assert_eq!(br.read(1).unwrap(), 0);
        assert_eq!(br.read(2).unwrap(), 3);
    }

    #[test]
    fn wide_reads_split() {
        let x = [0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read(4).unwrap(), 0x1);
        assert_eq!(br.read(24).unwrap(), 0x234567);
        assert_eq!(br.read_u64(36).unwrap(), 0x89abcdef0);
        assert!(!br.overrun());
    }

    #[test]
    fn marker_test() {
        let x = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0xff].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read_u64(48).unwrap(), 0x314159265359);
        assert_eq!(br.byte().unwrap(), 0xff);
    }

    #[test]
    fn peek_does_not_consume() {
        let x = [0b1011_0000, 0b1111_0000].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.peek(4).unwrap(), 0b1011);
        assert_eq!(br.peek(4).unwrap(), 0b1011);
        br.consume(2).unwrap();
        assert_eq!(br.peek(8).unwrap(), 0b1100_0011);
        assert_eq!(br.read(16 - 2).unwrap(), 0b11_0000_1111_0000);
    }

    #[test]
    fn byte_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        assert_eq!(br.byte().unwrap(), b'H');
        assert_eq!(br.byte().unwrap(), b'e');
        assert_eq!(br.byte().unwrap(), b'l');
        assert_eq!(br.byte().unwrap(), b'l');
    }

    #[test]
    fn loc_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        for _ in 0..5 {
            br.byte().unwrap();
        }
        br.bit().unwrap();
        assert_eq!(br.loc(), "[5.1]");
    }

    #[test]
    fn align_and_has_more() {
        let x = [0b1010_0000, 0x42, 0x5a, 0x68].as_slice();
        let mut br = BitReader::new(x);
        br.read(3).unwrap();
        br.align_to_byte();
        assert_eq!(br.loc(), "[1.0]");
        assert!(br.has_more().unwrap());
        assert_eq!(br.read(24).unwrap(), 0x425a68);
        assert!(!br.has_more().unwrap());
        assert!(!br.overrun());
    }

    #[test]
    fn odd_length_source() {
        let x = [0xab, 0xcd, 0xef].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.read(24).unwrap(), 0xabcdef);
        assert!(!br.overrun());
        assert!(!br.has_more().unwrap());
        assert_eq!(br.read(8).unwrap(), 0);
        assert!(br.overrun());
    }
}
