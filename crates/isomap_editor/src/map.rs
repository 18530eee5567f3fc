//! The map document

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use isomap_codec::{
    encode_iso_map_pack, encode_overlay_packs, read_iso_map_pack, read_overlay_packs, CodecError,
    IniDocument, IsoMapPackReport, OverlayPackReport, OVERLAY_GRID_SIZE,
};
use isomap_core::{Cell, CellGrid, PlacedObject, Point, TileCatalog};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

const MAP_SECTION: &str = "Map";
const ISO_MAP_PACK_SECTION: &str = "IsoMapPack5";
const OVERLAY_PACK_SECTION: &str = "OverlayPack";
const OVERLAY_DATA_PACK_SECTION: &str = "OverlayDataPack";

/// Errors that can occur when loading or saving a map
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to access map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid map data: {0}")]
    Codec(#[from] CodecError),
    #[error("Missing [{section}] {key}=")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },
    #[error("Invalid map size '{0}'")]
    InvalidSize(String),
}

/// The `[Map] Size=` rectangle: `x,y,width,height`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSize {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Parse `x,y,width,height`. Sizes whose grid would not fit the
    /// 512x512 overlay arrays are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(',').map(|p| p.trim());
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        let width = parts.next()?.parse().ok()?;
        let height = parts.next()?.parse().ok()?;
        if parts.next().is_some() || width == 0 || height == 0 {
            return None;
        }
        let extent = u32::checked_add(width, height)?.checked_add(1)?;
        if extent as usize > OVERLAY_GRID_SIZE {
            return None;
        }
        Some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Side length of the square cell grid holding the isometric diamond
    pub fn grid_extent(&self) -> u32 {
        self.width + self.height + 1
    }

    /// Cells of the isometric diamond, two per display cell
    pub fn diamond_cells(&self) -> impl Iterator<Item = Point> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |dy| {
            (0..width).flat_map(move |dx| {
                let x = dx + dy + 1;
                let y = width - dx + dy - 1;
                [Point::new(x, y), Point::new(x + 1, y)]
            })
        })
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

/// What a map load read and skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapLoadReport {
    pub tiles: IsoMapPackReport,
    pub overlays: Option<OverlayPackReport>,
}

/// An open map: the cell grid, placed objects and the rest of the map file
#[derive(Debug, Clone)]
pub struct Map {
    theater_name: String,
    size: MapSize,
    grid: CellGrid,
    objects: HashMap<Uuid, PlacedObject>,
    ini: IniDocument,
    modified: bool,
}

impl Map {
    /// Create a map whose diamond is filled with clear ground (tile 0, level 0)
    pub fn new_blank(theater_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::blank_with_size(theater_name.into(), MapSize::new(width, height))
    }

    fn blank_with_size(theater_name: String, size: MapSize) -> Self {
        let extent = size.grid_extent();
        let mut grid = CellGrid::new(extent, extent);
        for point in size.diamond_cells() {
            let _ = grid.place_cell(point, Cell::new(0, 0, 0, 0));
        }
        grid.take_changed();

        Self {
            theater_name,
            size,
            grid,
            objects: HashMap::new(),
            ini: IniDocument::new(),
            modified: false,
        }
    }

    /// Build a map from a parsed map file
    pub fn load_from_ini<C>(
        ini: IniDocument,
        catalog: &C,
    ) -> Result<(Self, MapLoadReport), MapError>
    where
        C: TileCatalog + ?Sized,
    {
        let size_value = ini.get(MAP_SECTION, "Size").ok_or(MapError::MissingKey {
            section: MAP_SECTION,
            key: "Size",
        })?;
        let size = MapSize::parse(size_value)
            .ok_or_else(|| MapError::InvalidSize(size_value.to_string()))?;
        let theater_name = ini.get(MAP_SECTION, "Theater").unwrap_or_default().to_string();

        let mut map = Self::blank_with_size(theater_name, size);
        let mut report = MapLoadReport::default();

        match ini.section(ISO_MAP_PACK_SECTION) {
            Some(section) => {
                report.tiles = read_iso_map_pack(section, &mut map.grid, catalog)?;
            }
            None => warn!("Map has no [{}] section, using blank terrain", ISO_MAP_PACK_SECTION),
        }

        if let Some(section) = ini.section(OVERLAY_PACK_SECTION) {
            let data = ini.section(OVERLAY_DATA_PACK_SECTION);
            report.overlays = Some(read_overlay_packs(section, data, &mut map.grid, catalog)?);
        }

        map.grid.take_changed();
        map.ini = ini;
        Ok((map, report))
    }

    /// Produce the map file, replacing the sections this document owns
    pub fn save_to_ini(&self) -> Result<IniDocument, MapError> {
        let mut ini = self.ini.clone();

        let map_section = ini.section_or_insert(MAP_SECTION);
        map_section.set("Size", self.size.to_string());
        map_section.set("Theater", self.theater_name.clone());

        ini.replace_section(ISO_MAP_PACK_SECTION, encode_iso_map_pack(&self.grid)?);
        let (overlay_pack, overlay_data) = encode_overlay_packs(&self.grid)?;
        ini.replace_section(OVERLAY_PACK_SECTION, overlay_pack);
        ini.replace_section(OVERLAY_DATA_PACK_SECTION, overlay_data);

        Ok(ini)
    }

    /// Load a map file
    pub fn load<C>(path: &Path, catalog: &C) -> Result<(Self, MapLoadReport), MapError>
    where
        C: TileCatalog + ?Sized,
    {
        let content = std::fs::read_to_string(path)?;
        let result = Self::load_from_ini(IniDocument::parse(&content), catalog)?;
        info!("Loaded map {}", path.display());
        Ok(result)
    }

    /// Write the map file and clear the modified flag
    pub fn save(&mut self, path: &Path) -> Result<(), MapError> {
        let ini = self.save_to_ini()?;
        std::fs::write(path, ini.to_string())?;
        self.modified = false;
        info!("Saved map {}", path.display());
        Ok(())
    }

    pub fn theater_name(&self) -> &str {
        &self.theater_name
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    /// Grid writes are reserved to mutations
    pub(crate) fn grid_mut(&mut self) -> &mut CellGrid {
        &mut self.grid
    }

    /// Drain the coordinates written since the last drain (may contain duplicates)
    pub fn take_changed_cells(&mut self) -> Vec<Point> {
        self.grid.take_changed()
    }

    /// The parsed map file this document was loaded from
    pub fn ini(&self) -> &IniDocument {
        &self.ini
    }

    pub fn object(&self, id: Uuid) -> Option<&PlacedObject> {
        self.objects.get(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.values()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn insert_object(&mut self, object: PlacedObject) {
        self.objects.insert(object.id, object);
    }

    pub(crate) fn remove_object(&mut self, id: Uuid) -> Option<PlacedObject> {
        self.objects.remove(&id)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }
}
