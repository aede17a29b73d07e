//! Byte-exact container layout.
//!
//! ```text
//! [pad count p: 8 bits, 1..=8]
//! [codebook: (symbol UTF-8 bits, SENTINEL, codeword bits, SENTINEL)*]
//! [payload bits]
//! [p zero bits]
//! ```
//!
//! The whole sequence is packed MSB-first. The codebook carries no entry
//! count; it ends once its codewords form a complete prefix code, or, for a
//! one-entry book, when no further sentinel follows.

use log::trace;

use crate::bits::{BitBuf, bits_to_bytes, find_pattern};
use crate::codebook::{Codebook, DecodeTrie};
use crate::error::MalformedStream;

pub const SENTINEL_CHAR: char = '\u{2980}';
pub const SENTINEL_BYTES: [u8; 3] = [0xE2, 0xA6, 0x80];
pub const SENTINEL_BITS: usize = SENTINEL_BYTES.len() * 8;
pub const SENTINEL: [bool; SENTINEL_BITS] = expand(SENTINEL_BYTES);

pub const PAD_HEADER_BITS: usize = 8;

const fn expand(bytes: [u8; 3]) -> [bool; SENTINEL_BITS] {
    let mut out = [false; SENTINEL_BITS];
    let mut i = 0;
    while i < SENTINEL_BITS {
        out[i] = (bytes[i / 8] >> (7 - i % 8)) & 1 == 1;
        i += 1;
    }
    out
}

/// Zero bits needed after `bits` of codebook and payload. Always in 1..=8:
/// an already aligned body still gets a full byte of padding.
pub fn pad_count(bits: usize) -> u8 {
    (8 - bits % 8) as u8
}

pub fn serialize_codebook(book: &Codebook) -> BitBuf {
    let mut out = BitBuf::new();
    let mut utf8 = [0u8; 4];
    for (symbol, code) in book.iter() {
        out.push_bytes(symbol.encode_utf8(&mut utf8).as_bytes());
        out.extend_from_slice(&SENTINEL);
        out.append(code);
        out.extend_from_slice(&SENTINEL);
    }
    out
}

/// Header parsed off the front of a container body.
#[derive(Debug, Clone)]
pub struct ParsedCodebook {
    pub codebook: Codebook,
    pub trie: DecodeTrie,
    /// Bit offset of the first payload bit.
    pub payload_start: usize,
}

/// Read (symbol, codeword) pairs from the start of `body`.
pub fn parse_codebook(body: &[bool]) -> Result<ParsedCodebook, MalformedStream> {
    let mut codebook = Codebook::new();
    let mut trie = DecodeTrie::new();
    let mut pos = 0;

    while !trie.is_complete() {
        let Some(symbol_end) = find_pattern(body, &SENTINEL, pos) else {
            if codebook.len() == 1 {
                break;
            }
            return Err(MalformedStream::MissingSentinel { position: pos });
        };
        let symbol = decode_symbol(&body[pos..symbol_end])
            .ok_or(MalformedStream::InvalidSymbol { position: pos })?;

        let code_start = symbol_end + SENTINEL_BITS;
        let code_end = find_pattern(body, &SENTINEL, code_start)
            .ok_or(MalformedStream::MissingSentinel {
                position: code_start,
            })?;
        let code = &body[code_start..code_end];

        if code.is_empty() {
            return Err(MalformedStream::EmptyCodeword {
                position: code_start,
            });
        }
        if codebook.contains_symbol(symbol) {
            return Err(MalformedStream::DuplicateSymbol { symbol });
        }
        if !trie.insert(code, symbol) {
            return Err(MalformedStream::CodewordConflict {
                position: code_start,
            });
        }
        let code = BitBuf::from(code);
        trace!("Codebook entry {:?} => '{}'", symbol, code);
        codebook.insert(symbol, code);

        pos = code_end + SENTINEL_BITS;
    }

    Ok(ParsedCodebook {
        codebook,
        trie,
        payload_start: pos,
    })
}

/// Bits that spell exactly one UTF-8 encoded character.
fn decode_symbol(bits: &[bool]) -> Option<char> {
    let bytes = bits_to_bytes(bits)?;
    let text = std::str::from_utf8(&bytes).ok()?;
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Some(symbol),
        _ => None,
    }
}

/// Split unpacked container bits into the body between the pad header and
/// the padding.
pub fn strip_padding(bits: &[bool]) -> Result<&[bool], MalformedStream> {
    if bits.len() < PAD_HEADER_BITS {
        return Err(MalformedStream::Empty);
    }
    let (header, rest) = bits.split_at(PAD_HEADER_BITS);
    let pad = header.iter().fold(0u8, |acc, &bit| (acc << 1) | bit as u8);
    if !(1..=8).contains(&pad) {
        return Err(MalformedStream::InvalidPadCount { pad });
    }
    let pad_bits = pad as usize;
    if pad_bits > rest.len() {
        return Err(MalformedStream::PaddingExceedsBody {
            pad,
            available: rest.len(),
        });
    }

    let (body, padding) = rest.split_at(rest.len() - pad_bits);
    if padding.iter().any(|&bit| bit) {
        return Err(MalformedStream::NonZeroPadding);
    }
    Ok(body)
}
