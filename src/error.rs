//! Error types for the codec.
//!
//! Every failure is surfaced as a distinct variant; nothing is retried or
//! defaulted because encode and decode are deterministic transformations.

use thiserror::Error;

/// Top-level error type returned by every codec operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The input contained no symbols, so no tree can be built.
    #[error("empty alphabet: cannot build a huffman tree from zero symbols")]
    EmptyAlphabet,

    /// The byte sequence handed to the decoder is not a valid container.
    #[error("malformed stream: {0}")]
    MalformedStream(#[from] MalformedStream),

    /// A bit sequence whose length is not a multiple of 8 reached the packer.
    #[error("internal packing error: {bits} bits is not a whole number of bytes")]
    InternalPacking { bits: usize },

    /// The serialized codebook would not parse back to the same entries.
    #[error("sentinel collision: codebook entry for {symbol:?} cannot be delimited")]
    SentinelCollision { symbol: char },

    /// The payload referenced a symbol the codebook does not cover.
    #[error("symbol {symbol:?} has no codeword")]
    UnknownSymbol { symbol: char },

    /// Reading or writing a file in the `encode` / `decode` binaries.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a compressed stream is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedStream {
    #[error("stream is empty")]
    Empty,

    #[error("invalid pad count {pad}: expected a value in 1..=8")]
    InvalidPadCount { pad: u8 },

    #[error("pad count {pad} exceeds body length of {available} bits")]
    PaddingExceedsBody { pad: u8, available: usize },

    #[error("padding bits are not all zero")]
    NonZeroPadding,

    #[error("missing sentinel after bit {position}")]
    MissingSentinel { position: usize },

    #[error("codebook entry at bit {position} does not encode exactly one character")]
    InvalidSymbol { position: usize },

    #[error("codeword at bit {position} is empty")]
    EmptyCodeword { position: usize },

    #[error("codeword at bit {position} conflicts with an earlier codeword")]
    CodewordConflict { position: usize },

    #[error("symbol {symbol:?} appears twice in the codebook")]
    DuplicateSymbol { symbol: char },

    #[error("payload bit {position} leads outside the codebook")]
    UndecodableBits { position: usize },

    #[error("{count} trailing bits do not form a codeword")]
    TrailingBits { count: usize },
}

/// Result alias used by every codec operation.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn read_text(path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    #[test]
    fn test_io_error_converts_with_question_mark() {
        let err = read_text("/nonexistent/dir/input.txt").unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected Error::Io, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_converts_with_question_mark() {
        fn reject() -> Result<()> {
            let parsed: std::result::Result<(), MalformedStream> = Err(MalformedStream::Empty);
            parsed?;
            Ok(())
        }
        assert!(matches!(reject(), Err(Error::MalformedStream(MalformedStream::Empty))));
    }
}
