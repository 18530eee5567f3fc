//! Map data codecs for isomap_editor
//!
//! This crate converts between the Base64 block-pack sections of a map file
//! and the in-memory [`CellGrid`](isomap_core::CellGrid):
//! - `[IsoMapPack5]` - the tile grid, MiniLZO blocks of 11-byte tile records
//! - `[OverlayPack]` / `[OverlayDataPack]` - two 512x512 byte grids, Format80 blocks
//!
//! It also contains the minimal INI document model used to read and write
//! those sections while preserving the rest of the file.

mod block;
pub mod format80;
pub mod ini;
mod iso_map_pack;
pub mod lzo;
mod overlay_pack;
mod section_data;

pub use block::{decode_blocks, encode_blocks, BlockFormat, MAX_BLOCK_INPUT};
pub use ini::{IniDocument, IniSection};
pub use iso_map_pack::{
    collect_tiles, decode_iso_map_pack, encode_iso_map_pack, read_iso_map_pack, IsoMapPack5Tile,
    IsoMapPackReport, ABSENT_TILE_INDEX, ISO_TILE_RECORD_SIZE,
};
pub use overlay_pack::{
    collect_overlays, decode_overlay_packs, encode_overlay_packs, read_overlay_packs, OverlayPackReport,
    NO_OVERLAY, OVERLAY_GRID_SIZE, OVERLAY_PACK_LEN,
};
pub use section_data::{decode_section_data, encode_section_data, BASE64_LINE_WIDTH};

use thiserror::Error;

/// Errors raised while decoding or encoding packed map data.
///
/// All of these are fatal for the load in progress; per-record problems
/// (unknown tile or overlay indices) are logged and skipped instead.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Compressed data is shorter than one block header ({0} bytes)")]
    MissingHeader(usize),
    #[error("Truncated block header at offset {0}")]
    TruncatedHeader(usize),
    #[error("Block at offset {offset} claims {size} bytes but only {available} remain")]
    BlockOverrun {
        offset: usize,
        size: usize,
        available: usize,
    },
    #[error("Corrupt {format:?} block: {reason}")]
    CorruptBlock {
        format: BlockFormat,
        reason: &'static str,
    },
    #[error("Block decompressed to {actual} bytes but its header says {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("Overlay data has {actual} bytes, expected {expected}")]
    UnexpectedLength { expected: usize, actual: usize },
    #[error("Compressed block too large to encode: {0} bytes")]
    BlockTooLarge(usize),
}
