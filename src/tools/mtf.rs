/// Move-To-Front decoding table over byte values.
///
/// Used twice per block: once over the table numbers while reading the selectors, and once over the byte values
/// in use while turning symbols back into bytes.
#[derive(Debug, Clone)]
pub struct MoveToFrontDecoder {
    index: [u8; 256],
}

impl MoveToFrontDecoder {
    /// Identity table: rank n holds value n.
    pub fn new() -> Self {
        let mut index = [0_u8; 256];
        for (i, slot) in index.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self { index }
    }

    /// Table to be filled slot by slot with [`MoveToFrontDecoder::set`].
    pub fn empty() -> Self {
        Self { index: [0; 256] }
    }

    /// Table seeded with the byte values in use, in ascending order.
    pub fn from_symbols(symbols: &[u8]) -> Self {
        let mut mtf = Self::empty();
        for (pos, &sym) in symbols.iter().enumerate() {
            mtf.set(pos, sym);
        }
        mtf
    }

    pub fn set(&mut self, pos: usize, value: u8) {
        self.index[pos] = value;
    }

    /// Return the value at `rank` and move it to the front.
    pub fn get_and_move(&mut self, rank: usize) -> u8 {
        let value = self.index[rank];
        // Shift everything in front of the rank back one, then put the value at the front.
        self.index.copy_within(0..rank, 1);
        self.index[0] = value;
        value
    }

    /// The most recently used value.
    pub fn head(&self) -> u8 {
        self.index[0]
    }
}

impl Default for MoveToFrontDecoder {
    fn default() -> Self {
        Self::new()
    }
}
