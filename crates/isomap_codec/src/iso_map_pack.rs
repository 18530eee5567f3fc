//! `[IsoMapPack5]` tile grid codec

use isomap_core::{Cell, CellGrid, Point, TileCatalog};
use tracing::{info, warn};

use crate::ini::IniSection;
use crate::{decode_blocks, decode_section_data, encode_blocks, encode_section_data};
use crate::{BlockFormat, CodecError};

/// Size of one serialized tile record
pub const ISO_TILE_RECORD_SIZE: usize = 11;

/// Tile index marking a record that must not be materialized
pub const ABSENT_TILE_INDEX: u32 = 0xFFFF;

/// One tile record as stored in the pack (all fields little endian)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoMapPack5Tile {
    pub x: u16,
    pub y: u16,
    pub tile_index: u32,
    pub sub_tile_index: u8,
    pub level: u8,
    pub ice_growth: u8,
}

impl IsoMapPack5Tile {
    pub fn from_bytes(bytes: &[u8; ISO_TILE_RECORD_SIZE]) -> Self {
        Self {
            x: u16::from_le_bytes([bytes[0], bytes[1]]),
            y: u16::from_le_bytes([bytes[2], bytes[3]]),
            tile_index: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            sub_tile_index: bytes[8],
            level: bytes[9],
            ice_growth: bytes[10],
        }
    }

    pub fn to_bytes(&self) -> [u8; ISO_TILE_RECORD_SIZE] {
        let mut bytes = [0u8; ISO_TILE_RECORD_SIZE];
        bytes[0..2].copy_from_slice(&self.x.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.y.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.tile_index.to_le_bytes());
        bytes[8] = self.sub_tile_index;
        bytes[9] = self.level;
        bytes[10] = self.ice_growth;
        bytes
    }

    pub fn position(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }

    pub fn is_absent(&self) -> bool {
        self.tile_index == ABSENT_TILE_INDEX
    }
}

/// Counters collected while applying a tile pack to a grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoMapPackReport {
    /// Records read from the pack
    pub records: usize,
    /// Cells placed or overwritten
    pub placed: usize,
    /// Records carrying the absent sentinel
    pub absent: usize,
    /// Records outside the grid
    pub out_of_bounds: usize,
    /// Records whose tile index is not in the catalog
    pub unknown_tile: usize,
    /// Leftover bytes shorter than one record
    pub trailing_bytes: usize,
}

impl IsoMapPackReport {
    pub fn skipped(&self) -> usize {
        self.absent + self.out_of_bounds + self.unknown_tile
    }
}

/// Decode a compressed block sequence into tile records.
///
/// Returns the records and the number of trailing bytes that did not form a
/// complete record.
pub fn decode_iso_map_pack(data: &[u8]) -> Result<(Vec<IsoMapPack5Tile>, usize), CodecError> {
    let raw = decode_blocks(data, BlockFormat::MiniLzo)?;
    let chunks = raw.chunks_exact(ISO_TILE_RECORD_SIZE);
    let trailing = chunks.remainder().len();

    let tiles = chunks
        .map(|chunk| {
            let mut record = [0u8; ISO_TILE_RECORD_SIZE];
            record.copy_from_slice(chunk);
            IsoMapPack5Tile::from_bytes(&record)
        })
        .collect();

    Ok((tiles, trailing))
}

/// Read an `[IsoMapPack5]` section into the grid.
///
/// Existing cells at decoded positions get their terrain fields overwritten,
/// so reading the same pack twice leaves the grid unchanged the second time.
pub fn read_iso_map_pack<C>(
    section: &IniSection,
    grid: &mut CellGrid,
    catalog: &C,
) -> Result<IsoMapPackReport, CodecError>
where
    C: TileCatalog + ?Sized,
{
    let data = decode_section_data(section.entries())?;
    let (tiles, trailing) = decode_iso_map_pack(&data)?;

    let mut report = IsoMapPackReport {
        records: tiles.len(),
        trailing_bytes: trailing,
        ..Default::default()
    };
    if trailing > 0 {
        warn!("IsoMapPack5 has {} trailing bytes after the last record", trailing);
    }

    for tile in tiles {
        if tile.is_absent() {
            report.absent += 1;
            continue;
        }

        let point = tile.position();
        if !grid.contains(point) {
            warn!("IsoMapPack5 record at {} is outside the map, skipping", point);
            report.out_of_bounds += 1;
            continue;
        }
        if catalog.tile_graphics(tile.tile_index).is_none() {
            warn!(
                "IsoMapPack5 record at {} references unknown tile {}, skipping",
                point, tile.tile_index
            );
            report.unknown_tile += 1;
            continue;
        }

        match grid.cell_mut(point) {
            Some(cell) => {
                cell.tile_index = tile.tile_index;
                cell.sub_tile_index = tile.sub_tile_index;
                cell.level = tile.level;
                cell.ice_growth = tile.ice_growth;
            }
            None => {
                let cell = Cell::new(
                    tile.tile_index,
                    tile.sub_tile_index,
                    tile.level,
                    tile.ice_growth,
                );
                // Bounds were checked above
                let _ = grid.place_cell(point, cell);
            }
        }
        report.placed += 1;
    }

    info!(
        "Read IsoMapPack5: {} records, {} placed, {} skipped",
        report.records,
        report.placed,
        report.skipped()
    );
    Ok(report)
}

/// Collect the non-default cells of a grid as records in pack order:
/// ascending by `(x, level, tile_index)`.
pub fn collect_tiles(grid: &CellGrid) -> Vec<IsoMapPack5Tile> {
    let mut tiles: Vec<IsoMapPack5Tile> = grid
        .valid_cells()
        .filter(|(_, cell)| !cell.is_default_terrain())
        .filter_map(|(point, cell)| {
            let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                warn!("Cell {} does not fit a tile record, skipping", point);
                return None;
            };
            Some(IsoMapPack5Tile {
                x,
                y,
                tile_index: cell.tile_index,
                sub_tile_index: cell.sub_tile_index,
                level: cell.level,
                ice_growth: cell.ice_growth,
            })
        })
        .collect();

    tiles.sort_by_key(|t| (t.x, t.level, t.tile_index));
    tiles
}

/// Encode the grid as `[IsoMapPack5]` section entries
pub fn encode_iso_map_pack(grid: &CellGrid) -> Result<Vec<(String, String)>, CodecError> {
    let tiles = collect_tiles(grid);
    let mut raw = Vec::with_capacity(tiles.len() * ISO_TILE_RECORD_SIZE);
    for tile in &tiles {
        raw.extend_from_slice(&tile.to_bytes());
    }

    let packed = encode_blocks(&raw, BlockFormat::MiniLzo)?;
    info!(
        "Wrote IsoMapPack5: {} records, {} bytes compressed",
        tiles.len(),
        packed.len()
    );
    Ok(encode_section_data(&packed))
}
