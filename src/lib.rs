//! Static, whole-message Huffman codec for text.
//!
//! [`compress`] counts symbol frequencies, builds a prefix-free code, and
//! writes a single self-describing container: a pad-count byte, the codebook,
//! the payload, and zero padding. [`decompress`] reads the codebook back out
//! of the container and walks the payload into the original text.
//!
//! ```
//! let packed = huffman_text_codec::compress("abracadabra").unwrap();
//! assert_eq!(huffman_text_codec::decompress(&packed).unwrap(), "abracadabra");
//! ```
//!
//! File handling, extension swapping and whitespace trimming are left to the
//! caller; see the `encode` and `decode` binaries.

pub mod bits;
pub mod codebook;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod huffman;
pub mod wire;

pub use codebook::{Codebook, Codeword, build_code_table};
pub use decoder::StreamDecoder;
pub use encoder::{CompressionReport, StreamEncoder};
pub use error::{Error, MalformedStream, Result};
pub use huffman::{
    FreqTable, HuffmanTree, MergeOrder, build_huffman_tree, count_frequencies, entropy_from_freq,
};

/// Compress `text` with the optimal (smallest-weights-first) merge order.
pub fn compress(text: &str) -> Result<Vec<u8>> {
    StreamEncoder::default().encode(text)
}

pub fn compress_with(text: &str, merge_order: MergeOrder) -> Result<Vec<u8>> {
    StreamEncoder::new(merge_order).encode(text)
}

pub fn compress_with_report(
    text: &str,
    merge_order: MergeOrder,
) -> Result<(Vec<u8>, CompressionReport)> {
    StreamEncoder::new(merge_order).encode_with_report(text)
}

pub fn decompress(encoded: &[u8]) -> Result<String> {
    StreamDecoder::new().decode(encoded)
}
