//! Bag-of-cells (BOC) encoding
//!
//! Header of a serialized bag:
//! ```text
//! b5ee9c72                      -- magic
//! flags:u8                      -- has_idx(0x80) | has_crc32c(0x40) | has_cache_bits(0x20) | ref_size
//! off_size:u8
//! cells:ref_size  roots:ref_size  absent:ref_size  total_cells_size:off_size
//! ```
//!
//! Cell layout and the codec itself come from `tonlib_core`. Input from
//! callers is screened here first so a hostile header cannot make the
//! decoder size anything from the claimed cell count.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use swapbench_core::TxError;
use tonlib_core::cell::{ArcCell, BagOfCells, Cell};

const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

/// Smallest serialized cell: the two descriptor bytes
const MIN_CELL_SIZE: u64 = 2;

/// Serialize a single-root bag without index, optionally with a CRC32C trailer
pub fn serialize_boc(root: &Cell, has_crc32c: bool) -> Result<Vec<u8>, BocError> {
    BagOfCells::from_root(root.clone())
        .serialize(has_crc32c)
        .map_err(BocError::codec)
}

/// Parse a bag of cells that must contain exactly one root
pub fn deserialize_boc(bytes: &[u8]) -> Result<ArcCell, BocError> {
    check_header(bytes)?;
    BagOfCells::parse(bytes)
        .and_then(|boc| boc.single_root().cloned())
        .map_err(BocError::codec)
}

/// Serialize with a CRC32C trailer and encode as standard base64
pub fn cell_to_base64(cell: &Cell) -> Result<String, BocError> {
    Ok(STANDARD.encode(serialize_boc(cell, true)?))
}

/// Decode base64 (standard or url-safe) and parse a single-root bag
pub fn cell_from_base64(encoded: &str) -> Result<ArcCell, BocError> {
    let encoded = encoded.trim();
    let bytes = STANDARD
        .decode(encoded)
        .or_else(|_| URL_SAFE.decode(encoded))
        .map_err(|e| BocError::InvalidBase64(e.to_string()))?;
    deserialize_boc(&bytes)
}

/// Validate the fixed header against the buffer it arrived in.
fn check_header(bytes: &[u8]) -> Result<(), BocError> {
    let mut r = Reader::new(bytes);

    if r.take(4)? != BOC_MAGIC {
        return Err(BocError::InvalidMagic);
    }
    let flags = r.u8()?;
    let ref_size = (flags & 0x07) as usize;
    if ref_size == 0 || ref_size > 4 {
        return Err(BocError::InvalidHeader(format!("ref size {}", ref_size)));
    }
    let off_size = r.u8()? as usize;
    if off_size == 0 || off_size > 8 {
        return Err(BocError::InvalidHeader(format!("offset size {}", off_size)));
    }

    let cell_count = r.be(ref_size)?;
    let root_count = r.be(ref_size)?;
    let _absent = r.be(ref_size)?;
    let total_size = r.be(off_size)?;

    if root_count != 1 {
        return Err(BocError::RootCount(root_count as usize));
    }
    if cell_count == 0 || cell_count > total_size / MIN_CELL_SIZE {
        return Err(BocError::InvalidHeader(format!(
            "{} cells cannot fit in {} bytes",
            cell_count, total_size
        )));
    }
    if total_size > r.remaining() as u64 {
        return Err(BocError::InvalidHeader(format!(
            "cell data size {} exceeds the {} bytes present",
            total_size,
            r.remaining()
        )));
    }
    Ok(())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], BocError> {
        if len > self.remaining() {
            return Err(BocError::UnexpectedEof);
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, BocError> {
        Ok(self.take(1)?[0])
    }

    fn be(&mut self, size: usize) -> Result<u64, BocError> {
        Ok(self
            .take(size)?
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | *b as u64))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BocError {
    #[error("Invalid base64: {0}")]
    InvalidBase64(String),

    #[error("Invalid BOC magic")]
    InvalidMagic,

    #[error("Invalid BOC header: {0}")]
    InvalidHeader(String),

    #[error("Expected exactly one root, found {0}")]
    RootCount(usize),

    #[error("Unexpected end of BOC data")]
    UnexpectedEof,

    #[error("Cell codec: {0}")]
    Codec(String),
}

impl BocError {
    fn codec(err: impl fmt::Display) -> Self {
        BocError::Codec(err.to_string())
    }
}

impl From<BocError> for TxError {
    fn from(err: BocError) -> Self {
        TxError::SerializationFailed {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tonlib_core::cell::CellBuilder;

    fn empty_cell() -> Cell {
        CellBuilder::new().build().unwrap()
    }

    fn sample_tree() -> Cell {
        let leaf = Arc::new(CellBuilder::new().store_u32(16, 0xDEAD).unwrap().build().unwrap());

        let mid = CellBuilder::new()
            .store_u8(3, 0b101)
            .unwrap()
            .store_reference(&leaf)
            .unwrap()
            .build()
            .unwrap();

        CellBuilder::new()
            .store_u32(32, 42)
            .unwrap()
            .store_reference(&Arc::new(mid))
            .unwrap()
            .store_reference(&leaf)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_cell_boc() {
        let boc = serialize_boc(&empty_cell(), true).unwrap();
        assert_eq!(hex::encode(&boc[..boc.len() - 4]), "b5ee9c72410101010002000000");
        assert_eq!(
            cell_to_base64(&empty_cell()).unwrap(),
            "te6cckEBAQEAAgAAAEysuc0="
        );
        assert_eq!(
            hex::encode(empty_cell().cell_hash()),
            "96a296d224f285c67bee93c30f8a309157f0daa35dc5b87e410b78630a09cfc7"
        );
    }

    #[test]
    fn test_empty_cell_boc_without_crc() {
        let boc = serialize_boc(&empty_cell(), false).unwrap();
        assert_eq!(hex::encode(&boc), "b5ee9c72010101010002000000");
        let parsed = deserialize_boc(&boc).unwrap();
        assert_eq!(parsed.cell_hash(), empty_cell().cell_hash());
    }

    #[test]
    fn test_tree_parses_back() {
        let root = sample_tree();
        let encoded = cell_to_base64(&root).unwrap();
        assert!(encoded.starts_with("te6cck"));

        let parsed = cell_from_base64(&encoded).unwrap();
        assert_eq!(parsed.cell_hash(), root.cell_hash());
        assert_eq!(parsed.references().len(), 2);
    }

    #[test]
    fn test_shared_cells_are_deduplicated() {
        // root, mid, leaf: the leaf is referenced twice but stored once
        let boc = serialize_boc(&sample_tree(), false).unwrap();
        assert_eq!(boc[6], 3);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut boc = serialize_boc(&sample_tree(), true).unwrap();
        let last = boc.len() - 1;
        boc[last] ^= 0xFF;
        assert!(matches!(deserialize_boc(&boc), Err(BocError::Codec(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            deserialize_boc(&[0, 1, 2, 3, 4, 5]),
            Err(BocError::InvalidMagic)
        ));
        assert!(matches!(
            deserialize_boc(&BOC_MAGIC),
            Err(BocError::UnexpectedEof)
        ));
        assert!(matches!(
            cell_from_base64("!!!not base64!!!"),
            Err(BocError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_oversized_cell_count_rejected_before_decoding() {
        // ref_size 4 claiming 0xFFFFFFFF cells in two bytes of cell data
        let boc = hex::decode("b5ee9c720401ffffffff00000001000000000200000000000000").unwrap();
        assert!(matches!(
            deserialize_boc(&boc),
            Err(BocError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_total_size_beyond_buffer_rejected() {
        // one cell claiming 0xFF bytes of data with only 3 present
        let boc = hex::decode("b5ee9c720101010100ff00000000").unwrap();
        assert!(matches!(
            deserialize_boc(&boc),
            Err(BocError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let boc = hex::decode("b5ee9c7201010202000400010000000000").unwrap();
        assert!(matches!(deserialize_boc(&boc), Err(BocError::RootCount(2))));
    }
}
