use log::{debug, error, info, trace};

use crate::bits::BitBuf;
use crate::codebook::{Codebook, build_code_table};
use crate::error::{Error, Result};
use crate::huffman::{MergeOrder, build_huffman_tree, count_frequencies, entropy_from_freq};
use crate::wire::{self, SENTINEL, parse_codebook, serialize_codebook};

/// Summary of one compression run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionReport {
    pub input_bytes: usize,
    pub output_bytes: usize,
    pub unique_symbols: usize,
    pub entropy: f64,
    pub average_code_length: f64,
    pub merge_order: MergeOrder,
}

impl CompressionReport {
    /// Space saved, in percent of the input size. Negative when the output
    /// is larger.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes > 0 {
            100.0 * (1.0 - (self.output_bytes as f64) / (self.input_bytes as f64))
        } else {
            0.0
        }
    }
}

/// Turns a whole text buffer into a self-describing compressed container.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamEncoder {
    merge_order: MergeOrder,
}

impl StreamEncoder {
    pub fn new(merge_order: MergeOrder) -> Self {
        Self { merge_order }
    }

    pub fn merge_order(&self) -> MergeOrder {
        self.merge_order
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        self.encode_with_report(text).map(|(bytes, _)| bytes)
    }

    pub fn encode_with_report(&self, text: &str) -> Result<(Vec<u8>, CompressionReport)> {
        let freq = count_frequencies(text);
        let tree = build_huffman_tree(&freq, self.merge_order)?;
        let table = build_code_table(&tree);

        let payload = encode_payload(text, &table)?;
        let header = serialize_codebook(&table);
        debug!(
            "Codebook header: {} bits, payload: {} bits",
            header.len(),
            payload.len()
        );
        check_delimited(&table, &header, &payload)?;

        let bytes = pack_container(&header, &payload)?;

        let report = CompressionReport {
            input_bytes: text.len(),
            output_bytes: bytes.len(),
            unique_symbols: freq.len(),
            entropy: entropy_from_freq(&freq),
            average_code_length: table.average_length(&freq),
            merge_order: self.merge_order,
        };
        info!(
            "Encoded {} bytes into {} bytes ({} unique symbols)",
            report.input_bytes, report.output_bytes, report.unique_symbols
        );
        Ok((bytes, report))
    }
}

/// Concatenate each symbol's codeword in input order.
pub fn encode_payload(text: &str, table: &Codebook) -> Result<BitBuf> {
    debug!("Starting payload encoding...");
    let mut bits = BitBuf::with_capacity(text.len() * 2);

    for symbol in text.chars() {
        match table.codeword(symbol) {
            Some(code) => bits.append(code),
            None => {
                error!("Symbol {:?} found in data but not in code table!", symbol);
                return Err(Error::UnknownSymbol { symbol });
            }
        }
    }

    trace!("Payload encoded into {} bits.", bits.len());
    Ok(bits)
}

/// Prepend the pad-count byte, append the padding and pack MSB-first.
pub fn pack_container(header: &BitBuf, payload: &BitBuf) -> Result<Vec<u8>> {
    let body_len = header.len() + payload.len();
    let pad = wire::pad_count(body_len);
    debug!("Padding body of {} bits with {} zero bits", body_len, pad);

    let mut bits = BitBuf::with_capacity(wire::PAD_HEADER_BITS + body_len + pad as usize);
    bits.push_byte(pad);
    bits.append(header);
    bits.append(payload);
    for _ in 0..pad {
        bits.push(false);
    }
    bits.pack()
}

/// Re-parse the serialized header and make sure the decoder will see exactly
/// the entries that were written.
fn check_delimited(table: &Codebook, header: &BitBuf, payload: &BitBuf) -> Result<()> {
    let mut body = header.clone();
    body.append(payload);

    let intact = match parse_codebook(body.as_slice()) {
        Ok(parsed) => parsed.payload_start == header.len() && parsed.codebook == *table,
        Err(_) => false,
    };
    if intact {
        return Ok(());
    }

    let mut utf8 = [0u8; 4];
    let symbol = table
        .iter()
        .find(|(symbol, code)| {
            let symbol_bits = BitBuf::from_bytes(symbol.encode_utf8(&mut utf8).as_bytes());
            symbol_bits.find(&SENTINEL, 0).is_some() || code.find(&SENTINEL, 0).is_some()
        })
        .or_else(|| table.iter().next())
        .map(|(symbol, _)| symbol)
        .unwrap_or(wire::SENTINEL_CHAR);

    error!("Codebook entry for {:?} collides with the sentinel", symbol);
    Err(Error::SentinelCollision { symbol })
}
