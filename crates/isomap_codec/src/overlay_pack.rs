//! `[OverlayPack]` and `[OverlayDataPack]` codec
//!
//! Both sections hold a 512x512 byte array indexed `y * 512 + x`. The first
//! stores the overlay type per cell (`0xFF` for none), the second the frame.

use isomap_core::{CellGrid, Overlay, Point, TileCatalog};
use tracing::{debug, info, warn};

use crate::ini::IniSection;
use crate::{decode_blocks, decode_section_data, encode_blocks, encode_section_data};
use crate::{BlockFormat, CodecError};

/// Width and height of the overlay arrays
pub const OVERLAY_GRID_SIZE: usize = 512;

/// Byte length of one decoded overlay array
pub const OVERLAY_PACK_LEN: usize = OVERLAY_GRID_SIZE * OVERLAY_GRID_SIZE;

/// Overlay type byte for "no overlay"
pub const NO_OVERLAY: u8 = 0xFF;

/// Counters collected while applying overlay packs to a grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayPackReport {
    /// Overlays placed on existing cells
    pub placed: usize,
    /// Entries whose overlay type is not in the catalog
    pub unknown_type: usize,
    /// Entries on positions with no placed cell
    pub missing_cell: usize,
}

fn decode_array(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let array = decode_blocks(data, BlockFormat::Format80)?;
    if array.len() != OVERLAY_PACK_LEN {
        return Err(CodecError::UnexpectedLength {
            expected: OVERLAY_PACK_LEN,
            actual: array.len(),
        });
    }
    Ok(array)
}

/// Decode both compressed overlay arrays.
///
/// Without data bytes every frame index reads as 0.
pub fn decode_overlay_packs(
    pack: &[u8],
    data: Option<&[u8]>,
) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
    let types = decode_array(pack)?;
    let frames = match data {
        Some(data) => decode_array(data)?,
        None => vec![0; OVERLAY_PACK_LEN],
    };
    Ok((types, frames))
}

/// Read the overlay sections into the grid.
///
/// Positions marked `0xFF` clear any overlay the cell already has.
pub fn read_overlay_packs<C>(
    pack: &IniSection,
    data: Option<&IniSection>,
    grid: &mut CellGrid,
    catalog: &C,
) -> Result<OverlayPackReport, CodecError>
where
    C: TileCatalog + ?Sized,
{
    let pack_bytes = decode_section_data(pack.entries())?;
    let data_bytes = match data {
        Some(section) => Some(decode_section_data(section.entries())?),
        None => {
            warn!("OverlayPack present without OverlayDataPack, using frame 0");
            None
        }
    };
    let (types, frames) = decode_overlay_packs(&pack_bytes, data_bytes.as_deref())?;

    let type_count = catalog.overlay_type_count();
    let mut report = OverlayPackReport::default();

    for (index, (&overlay_type, &frame)) in types.iter().zip(frames.iter()).enumerate() {
        let point = Point::new(
            (index % OVERLAY_GRID_SIZE) as i32,
            (index / OVERLAY_GRID_SIZE) as i32,
        );

        if overlay_type == NO_OVERLAY {
            if grid.cell(point).is_some_and(|c| c.overlay.is_some()) {
                grid.set_overlay(point, None);
            }
            continue;
        }
        if overlay_type as usize >= type_count {
            warn!(
                "Overlay at {} references unknown overlay type {}, skipping",
                point, overlay_type
            );
            report.unknown_type += 1;
            continue;
        }
        if grid.cell(point).is_none() {
            debug!("Overlay at {} has no cell, skipping", point);
            report.missing_cell += 1;
            continue;
        }

        grid.set_overlay(point, Some(Overlay::new(overlay_type, frame)));
        report.placed += 1;
    }

    info!(
        "Read OverlayPack: {} placed, {} unknown, {} without cell",
        report.placed, report.unknown_type, report.missing_cell
    );
    Ok(report)
}

/// Build the raw type and frame arrays from the grid
pub fn collect_overlays(grid: &CellGrid) -> (Vec<u8>, Vec<u8>) {
    let mut types = vec![NO_OVERLAY; OVERLAY_PACK_LEN];
    let mut frames = vec![0u8; OVERLAY_PACK_LEN];

    for (point, cell) in grid.valid_cells() {
        let Some(overlay) = cell.overlay else {
            continue;
        };
        if point.x as usize >= OVERLAY_GRID_SIZE || point.y as usize >= OVERLAY_GRID_SIZE {
            warn!("Overlay at {} lies outside the overlay grid, dropping", point);
            continue;
        }
        let index = point.y as usize * OVERLAY_GRID_SIZE + point.x as usize;
        types[index] = overlay.overlay_type_index;
        frames[index] = overlay.frame_index;
    }

    (types, frames)
}

/// Encode the grid's overlays as `[OverlayPack]` and `[OverlayDataPack]` entries
pub fn encode_overlay_packs(
    grid: &CellGrid,
) -> Result<(Vec<(String, String)>, Vec<(String, String)>), CodecError> {
    let (types, frames) = collect_overlays(grid);
    let pack = encode_blocks(&types, BlockFormat::Format80)?;
    let data = encode_blocks(&frames, BlockFormat::Format80)?;
    debug!(
        "Wrote overlay packs: {} and {} bytes compressed",
        pack.len(),
        data.len()
    );
    Ok((encode_section_data(&pack), encode_section_data(&data)))
}
