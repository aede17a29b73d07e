//! Growable bit sequence used for codewords and for the whole container
//! before it is packed.
//!
//! Bits are kept one per element and converted to bytes MSB-first, so
//! `0b1000_0001` unpacks to `[1, 0, 0, 0, 0, 0, 0, 1]`.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitBuf {
    bits: Vec<bool>,
}

impl BitBuf {
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bits: Vec::with_capacity(bits),
        }
    }

    /// Unpack bytes into bits, most significant bit first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::with_capacity(bytes.len() * 8);
        buf.push_bytes(bytes);
        buf
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn push_byte(&mut self, byte: u8) {
        for i in (0..8).rev() {
            self.bits.push((byte >> i) & 1 == 1);
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push_byte(byte);
        }
    }

    pub fn extend_from_slice(&mut self, bits: &[bool]) {
        self.bits.extend_from_slice(bits);
    }

    pub fn append(&mut self, other: &BitBuf) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Position of the first occurrence of `pattern` at or after `from`.
    pub fn find(&self, pattern: &[bool], from: usize) -> Option<usize> {
        find_pattern(&self.bits, pattern, from)
    }

    /// Pack into bytes MSB-first.
    ///
    /// The caller must have padded the sequence to a byte boundary; any other
    /// length is an internal consistency failure.
    pub fn pack(&self) -> Result<Vec<u8>> {
        bits_to_bytes(&self.bits).ok_or(Error::InternalPacking {
            bits: self.bits.len(),
        })
    }
}

impl FromIterator<bool> for BitBuf {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl From<&[bool]> for BitBuf {
    fn from(bits: &[bool]) -> Self {
        Self {
            bits: bits.to_vec(),
        }
    }
}

impl fmt::Display for BitBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

pub fn find_pattern(haystack: &[bool], pattern: &[bool], from: usize) -> Option<usize> {
    if pattern.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|i| i + from)
}

/// Convert a whole number of bytes' worth of bits, or `None` if the length
/// is not a multiple of 8.
pub fn bits_to_bytes(bits: &[bool]) -> Option<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(bits.len() / 8);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for &bit in chunk {
            byte = (byte << 1) | bit as u8;
        }
        bytes.push(byte);
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> BitBuf {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_unpack_msb_first() {
        let buf = BitBuf::from_bytes(&[0b1000_0001, 0xFF]);
        assert_eq!(buf.to_string(), "1000000111111111");
    }

    #[test]
    fn test_pack() {
        let buf = parse("1011001000000001");
        assert_eq!(buf.pack().unwrap(), vec![0b1011_0010, 0b0000_0001]);
    }

    #[test]
    fn test_pack_rejects_partial_byte() {
        let buf = parse("101");
        assert!(matches!(buf.pack(), Err(Error::InternalPacking { bits: 3 })));
    }

    #[test]
    fn test_pack_empty() {
        assert_eq!(BitBuf::new().pack().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_find() {
        let buf = parse("0010110101");
        let pat = [true, false, true];
        assert_eq!(buf.find(&pat, 0), Some(2));
        assert_eq!(buf.find(&pat, 3), Some(5));
        assert_eq!(buf.find(&pat, 8), None);
        assert_eq!(buf.find(&pat, 11), None);
        assert_eq!(buf.find(&[], 0), None);
    }

    #[test]
    fn test_append_and_display() {
        let mut a = parse("01");
        a.append(&parse("10"));
        a.push(true);
        assert_eq!(a.len(), 5);
        assert_eq!(a.to_string(), "01101");
    }

    #[test]
    fn test_push_byte() {
        let mut buf = BitBuf::new();
        buf.push_byte(0x05);
        assert_eq!(buf.to_string(), "00000101");
    }
}
