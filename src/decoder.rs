use std::time::Instant;

use log::{debug, trace, warn};

use crate::bits::BitBuf;
use crate::codebook::{DecodeTrie, Walk};
use crate::error::{MalformedStream, Result};
use crate::wire::{parse_codebook, strip_padding};

/// Reverses [`StreamEncoder`](crate::encoder::StreamEncoder): reads the
/// embedded codebook back and walks the payload into text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamDecoder;

impl StreamDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, encoded: &[u8]) -> Result<String> {
        decode_container(encoded).map_err(|e| {
            warn!("Rejecting compressed stream: {}", e);
            e.into()
        })
    }
}

fn decode_container(encoded: &[u8]) -> std::result::Result<String, MalformedStream> {
    if encoded.is_empty() {
        return Err(MalformedStream::Empty);
    }
    let bits = BitBuf::from_bytes(encoded);
    trace!("Expanded {} bytes into {} bits.", encoded.len(), bits.len());

    let body = strip_padding(bits.as_slice())?;
    let parsed = parse_codebook(body)?;
    debug!(
        "Codebook with {} entries, payload starts at bit {}",
        parsed.codebook.len(),
        parsed.payload_start
    );

    decode_payload(&body[parsed.payload_start..], &parsed.trie)
}

/// Walk the payload one bit at a time, emitting a symbol every time the
/// accumulated bits reach a leaf.
pub fn decode_payload(
    payload: &[bool],
    trie: &DecodeTrie,
) -> std::result::Result<String, MalformedStream> {
    debug!("Starting bitstream decoding...");
    let start_time = Instant::now();

    let mut result = String::new();
    let mut cursor = DecodeTrie::ROOT;
    let mut pending = 0usize;

    for (position, &bit) in payload.iter().enumerate() {
        match trie.walk(cursor, bit) {
            Some(Walk::Symbol(symbol)) => {
                result.push(symbol);
                cursor = DecodeTrie::ROOT;
                pending = 0;
            }
            Some(Walk::Continue(next)) => {
                cursor = next;
                pending += 1;
            }
            None => return Err(MalformedStream::UndecodableBits { position }),
        }
    }

    if pending > 0 {
        return Err(MalformedStream::TrailingBits { count: pending });
    }

    let duration = start_time.elapsed();
    debug!("Bitstream decoding finished in {:.2?}.", duration);
    debug!("Final decoded text size: {} bytes.", result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::{Codebook, build_code_table};
    use crate::encoder::{StreamEncoder, pack_container};
    use crate::error::Error;
    use crate::huffman::{MergeOrder, build_huffman_tree, count_frequencies};
    use crate::wire::serialize_codebook;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    fn trie_for(text: &str) -> DecodeTrie {
        let tree = build_huffman_tree(&count_frequencies(text), MergeOrder::Smallest).unwrap();
        DecodeTrie::from_codebook(&build_code_table(&tree)).unwrap()
    }

    #[test]
    fn test_decode_payload() {
        // c => 00, b => 01, a => 1
        let trie = trie_for("aaaaaaabbc");
        assert_eq!(decode_payload(&bits("1010011"), &trie).unwrap(), "abcaa");
    }

    #[test]
    fn test_decode_payload_trailing_bits() {
        let trie = trie_for("aaaaaaabbc");
        assert_eq!(
            decode_payload(&bits("10"), &trie).unwrap_err(),
            MalformedStream::TrailingBits { count: 1 }
        );
    }

    #[test]
    fn test_decode_payload_outside_single_symbol_code() {
        let trie = trie_for("zz");
        assert_eq!(
            decode_payload(&bits("001"), &trie).unwrap_err(),
            MalformedStream::UndecodableBits { position: 2 }
        );
    }

    #[test]
    fn test_roundtrip() {
        let text = "abracadabra, abracadabra!";
        let bytes = StreamEncoder::default().encode(text).unwrap();
        assert_eq!(StreamDecoder::new().decode(&bytes).unwrap(), text);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            StreamDecoder::new().decode(&[]),
            Err(Error::MalformedStream(MalformedStream::Empty))
        ));
    }

    #[test]
    fn test_zero_pad_header() {
        let mut bytes = StreamEncoder::default().encode("hello").unwrap();
        bytes[0] = 0;
        assert!(matches!(
            StreamDecoder::new().decode(&bytes),
            Err(Error::MalformedStream(MalformedStream::InvalidPadCount { pad: 0 }))
        ));
    }

    #[test]
    fn test_codebook_only_stream_decodes_to_empty_text() {
        let mut book = Codebook::new();
        book.insert('x', bits("0").as_slice().into());
        book.insert('y', bits("1").as_slice().into());
        let bytes = pack_container(&serialize_codebook(&book), &BitBuf::new()).unwrap();
        assert_eq!(StreamDecoder::new().decode(&bytes).unwrap(), "");
    }
}
