use std::io::Read;

use crate::bitstream::bitreader::BitReader;
use crate::error::Result;

/// Read the map of byte values used in a block and return them in ascending order.
///
/// The map is two level. A 16 bit index says which of the sixteen ranges of sixteen byte values (0-15, 16-31, ...)
/// occur at all; each set index bit, most significant first, is followed by a 16 bit map of the byte values
/// within that range.
pub fn read_sym_map<R: Read>(br: &mut BitReader<R>) -> Result<Vec<u8>> {
    let index = br.read(16)? as u16;
    let mut symbols = Vec::with_capacity(index.count_ones() as usize * 16);
    for range in set_bits(index) {
        let map = br.read(16)? as u16;
        symbols.extend(set_bits(map).map(|byte| range << 4 | byte));
    }
    Ok(symbols)
}

/// Positions (0 = most significant) of the set bits of `word`, in ascending order.
fn set_bits(word: u16) -> impl Iterator<Item = u8> {
    (0..16_u8).filter(move |&bit| word & (0x8000 >> bit) != 0)
}

#[cfg(test)]
mod test {
    use super::read_sym_map;
    use crate::bitstream::bitreader::BitReader;

    fn words(maps: &[u16]) -> Vec<u8> {
        maps.iter().flat_map(|m| m.to_be_bytes()).collect()
    }

    #[test]
    fn sentence() {
        let data = words(&[11008, 32770, 4, 17754, 6208]);
        let mut compare = "Making a silly test.".as_bytes().to_vec();
        compare.sort_unstable();
        compare.dedup();
        assert_eq!(read_sym_map(&mut BitReader::new(data.as_slice())).unwrap(), compare);
    }

    #[test]
    fn every_byte() {
        let data = words(&[0xffff; 17]);
        let compare = (0..=255).collect::<Vec<u8>>();
        assert_eq!(read_sym_map(&mut BitReader::new(data.as_slice())).unwrap(), compare);
    }

    #[test]
    fn stops_after_the_last_map() {
        // Index 0x6000 selects ranges 1 and 2; the two maps mark 0x10 and 0x2f.
        let data = [0x60, 0x00, 0x80, 0x00, 0x00, 0x01, 0xaa];
        let mut br = BitReader::new(data.as_slice());
        assert_eq!(read_sym_map(&mut br).unwrap(), vec![0x10, 0x2f]);
        assert_eq!(br.byte().unwrap(), 0xaa);
    }

    #[test]
    fn empty_index() {
        let data = [0x00, 0x00, 0xaa];
        let mut br = BitReader::new(data.as_slice());
        assert!(read_sym_map(&mut br).unwrap().is_empty());
        assert_eq!(br.byte().unwrap(), 0xaa);
    }
}
