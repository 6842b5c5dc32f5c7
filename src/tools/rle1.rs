use super::crc::BlockCrc;

/// Size of the scratch buffer used when expanding a block only to checksum it.
const CRC_CHUNK: usize = 4096;

/// Pull based decoder for the BZIP2 RLE 1 stage.
///
/// After four identical bytes the next byte of the block is a count (0-255) of further copies of that byte. The
/// count byte is never itself part of a run. State is kept between calls, so a block can be handed out in
/// slices of any size.
#[derive(Debug, Clone, Default)]
pub struct Rle1Decoder {
    pos: usize,
    len: usize,
    last: Option<u8>,
    run: u8,
    repeats: usize,
    repeat_byte: u8,
}

impl Rle1Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start over on a new block of `len` bytes.
    pub fn reset(&mut self, len: usize) {
        *self = Self {
            len,
            ..Self::default()
        };
    }

    /// Expand bytes from `block` into `out`. Returns how many bytes were written, 0 once the block is used up.
    pub fn read(&mut self, block: &[u8], out: &mut [u8]) -> usize {
        let end = self.len.min(block.len());
        let mut written = 0;
        while written < out.len() {
            // First write out any pending copies from a run.
            if self.repeats > 0 {
                let n = self.repeats.min(out.len() - written);
                out[written..written + n].fill(self.repeat_byte);
                written += n;
                self.repeats -= n;
                continue;
            }
            if self.pos >= end {
                break;
            }
            let byte = block[self.pos];
            self.pos += 1;

            // The byte after a run of four is the count of extra copies.
            if self.run == 4 {
                self.repeats = byte as usize;
                self.repeat_byte = self.last.take().unwrap_or_default();
                self.run = 0;
                continue;
            }
            if self.last == Some(byte) {
                self.run += 1;
            } else {
                self.last = Some(byte);
                self.run = 1;
            }
            out[written] = byte;
            written += 1;
        }
        written
    }

    /// True once every byte of the block, and every repeat it asked for, has been handed out.
    pub fn at_eof(&self) -> bool {
        self.repeats == 0 && self.pos >= self.len
    }
}

/// Expand a whole block without keeping the output. Returns the block CRC and the expanded length.
pub fn rle1_crc(block: &[u8]) -> (u32, usize) {
    let mut decoder = Rle1Decoder::new();
    decoder.reset(block.len());
    let mut crc = BlockCrc::new();
    let mut scratch = [0_u8; CRC_CHUNK];
    let mut total = 0;
    loop {
        let n = decoder.read(block, &mut scratch);
        if n == 0 {
            break;
        }
        crc.update(&scratch[..n]);
        total += n;
    }
    (crc.value(), total)
}
