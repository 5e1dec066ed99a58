//! A packed bit buffer and a matching cursor. Bits are addressed most
//! significant first within each byte, which is also the bit order of the
//! streams being compressed.

/// Return the number of bits needed to represent 'val'. Zero needs no bits.
pub fn num_bits(val: u32) -> usize {
    (32 - val.leading_zeros()) as usize
}

/// An append-only bit buffer backed by bytes. The engine uses one instance
/// for the committed bit history (where it is also read back at random
/// positions) and one for building the correction record stream.
#[derive(Default)]
pub struct BitBuf {
    /// The packed bits. Unused trailing bits of the last byte are zero.
    bytes: Vec<u8>,
    /// The number of valid bits.
    len: usize,
}

impl BitBuf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a whole byte buffer. Every bit of 'bytes' becomes addressable.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a single bit (the lowest bit of 'bit').
    pub fn push(&mut self, bit: u8) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        let byte = self.len / 8;
        let shift = 7 - self.len % 8;
        self.bytes[byte] |= (bit & 1) << shift;
        self.len += 1;
    }

    /// Append the lowest 'num' bits of 'val', most significant first.
    pub fn push_bits(&mut self, val: u32, num: usize) {
        debug_assert!(num <= 32, "Pushing too many bits");
        for i in (0..num).rev() {
            self.push(((val >> i) & 1) as u8);
        }
    }

    /// Read the bit at index 'pos'.
    pub fn get(&self, pos: usize) -> u8 {
        debug_assert!(pos < self.len, "Bit index out of range");
        (self.bytes[pos / 8] >> (7 - pos % 8)) & 1
    }

    /// Borrow the packed bytes. When the length is not a multiple of
    /// eight the last byte is padded with zero bits.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A forward-only cursor over packed bits.
pub struct BitReader<'a> {
    bytes: &'a [u8],
    /// Total number of readable bits; may be less than the byte capacity.
    len: usize,
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Read up to 'len' bits from 'bytes'. Returns None if the byte buffer
    /// cannot hold that many bits.
    pub fn new(bytes: &'a [u8], len: usize) -> Option<Self> {
        if len > bytes.len() * 8 {
            return None;
        }
        Some(Self { bytes, len, pos: 0 })
    }

    /// Take the next bit, or None when the stream is exhausted.
    pub fn read_bit(&mut self) -> Option<u8> {
        if self.pos >= self.len {
            return None;
        }
        let bit = (self.bytes[self.pos / 8] >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Some(bit)
    }

    /// Take the next 'num' bits as an unsigned value, most significant
    /// first. Reading zero bits yields zero.
    pub fn read_bits(&mut self, num: usize) -> Option<u32> {
        debug_assert!(num <= 32, "Taking too many bits");
        let mut val = 0;
        for _ in 0..num {
            val = (val << 1) | self.read_bit()? as u32;
        }
        Some(val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_bits() {
        assert_eq!(num_bits(0), 0);
        assert_eq!(num_bits(1), 1);
        assert_eq!(num_bits(2), 2);
        assert_eq!(num_bits(3), 2);
        assert_eq!(num_bits(63), 6);
        assert_eq!(num_bits(64), 7);
    }

    #[test]
    fn test_push_and_get() {
        let mut buf = BitBuf::new();
        let pattern = [1, 0, 0, 1, 0, 1, 1, 1, 0, 1];
        for bit in pattern {
            buf.push(bit);
        }
        assert_eq!(buf.len(), pattern.len());
        for (i, bit) in pattern.iter().enumerate() {
            assert_eq!(buf.get(i), *bit);
        }
    }

    #[test]
    fn test_from_bytes_msb_first() {
        let buf = BitBuf::from_bytes(&[0x80, 0x01]);
        assert_eq!(buf.len(), 16);
        assert_eq!(buf.get(0), 1);
        assert_eq!(buf.get(1), 0);
        assert_eq!(buf.get(14), 0);
        assert_eq!(buf.get(15), 1);
    }

    #[test]
    fn test_reader_round_trip() {
        let mut buf = BitBuf::new();
        buf.push_bits(0b101, 3);
        buf.push_bits(42, 9);
        buf.push(1);

        let mut reader = BitReader::new(buf.as_bytes(), buf.len()).unwrap();
        assert_eq!(reader.read_bits(3), Some(0b101));
        assert_eq!(reader.read_bits(9), Some(42));
        assert_eq!(reader.read_bit(), Some(1));
        assert_eq!(reader.read_bit(), None);
    }

    #[test]
    fn test_reader_rejects_short_buffer() {
        assert!(BitReader::new(&[0xff], 9).is_none());
        assert!(BitReader::new(&[], 0).is_some());
    }
}
