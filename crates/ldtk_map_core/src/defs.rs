//! Definition catalog: tilesets, enums and entity templates
//!
//! Decoded once per project, before any level, then shared read-only by every
//! level through an `Arc`. Tilesets are decoded strictly before enums and
//! entities since both may point into a tileset.

use crate::color::Color;
use crate::error::{DecodeError, RefKind, Unsupported};
use crate::image::{ImageHandle, ImageProvider, ImageRequest, Rect, TileGrid, TileTexture};
use crate::options::LoadOptions;
use crate::raw::{
    decode_list, decode_optional, decode_record, RawCustomData, RawDefs, RawEntityDef, RawEnum,
    RawEnumTag, RawEnumValue, RawTileRect, RawTileset,
};
use serde_json::Value as Json;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A definition addressable by numeric uid and by identifier
pub trait Definition {
    const KIND: RefKind;

    fn uid(&self) -> i64;
    fn identifier(&self) -> &str;
}

/// Definitions keyed both by uid and by identifier.
///
/// Inserting over an existing uid or identifier replaces the older definition
/// under both keys (last write wins), so the two indexes always hold the same
/// set of definitions.
#[derive(Debug, Clone)]
pub struct DefMap<T> {
    by_uid: HashMap<i64, Arc<T>>,
    by_identifier: HashMap<String, Arc<T>>,
}

impl<T> Default for DefMap<T> {
    fn default() -> Self {
        Self {
            by_uid: HashMap::new(),
            by_identifier: HashMap::new(),
        }
    }
}

impl<T: Definition> DefMap<T> {
    pub fn insert(&mut self, def: T) -> Arc<T> {
        let def = Arc::new(def);
        if let Some(old) = self.by_uid.remove(&def.uid()) {
            self.by_identifier.remove(old.identifier());
        }
        if let Some(old) = self.by_identifier.remove(def.identifier()) {
            self.by_uid.remove(&old.uid());
        }
        self.by_uid.insert(def.uid(), Arc::clone(&def));
        self.by_identifier
            .insert(def.identifier().to_string(), Arc::clone(&def));
        def
    }

    /// Look up by uid, failing with [`DecodeError::UnresolvedReference`]
    pub fn get(&self, uid: i64) -> Result<&Arc<T>, DecodeError> {
        self.by_uid
            .get(&uid)
            .ok_or_else(|| DecodeError::unresolved(T::KIND, uid))
    }

    pub fn get_by_identifier(&self, identifier: &str) -> Result<&Arc<T>, DecodeError> {
        self.by_identifier
            .get(identifier)
            .ok_or_else(|| DecodeError::unresolved(T::KIND, identifier))
    }

    pub fn find(&self, uid: i64) -> Option<&Arc<T>> {
        self.by_uid.get(&uid)
    }

    pub fn contains(&self, uid: i64) -> bool {
        self.by_uid.contains_key(&uid)
    }

    /// Number of distinct uids
    pub fn len(&self) -> usize {
        self.by_uid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uid.is_empty()
    }

    /// Definitions in ascending uid order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> {
        let mut defs: Vec<_> = self.by_uid.values().collect();
        defs.sort_by_key(|d| d.uid());
        defs.into_iter()
    }
}

/// A tileset image cut into a grid of tiles
#[derive(Debug, Clone)]
pub struct TilesetDef {
    pub uid: i64,
    pub identifier: String,
    /// Resolved image path, `None` for tilesets without an image
    pub path: Option<PathBuf>,
    pub grid: TileGrid,
    pub image: Option<ImageHandle>,
    tiles: Vec<TileTexture>,
    /// Tile id to user data strings, in document order
    pub custom_data: HashMap<usize, Vec<String>>,
    /// Enum value id to tagged tile ids
    pub enum_tags: HashMap<String, Vec<usize>>,
    pub tags: Vec<String>,
    pub tags_source_enum_uid: Option<i64>,
}

impl TilesetDef {
    /// Texture of tile `index`
    pub fn tile(&self, index: usize) -> Option<&TileTexture> {
        self.tiles.get(index)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tile_size(&self) -> u32 {
        self.grid.tile_size
    }

    /// Arbitrary rectangle of the tileset image
    pub fn get_texture(&self, rect: Rect) -> Option<TileTexture> {
        self.image.as_ref().map(|image| TileTexture {
            image: Arc::clone(image),
            rect,
        })
    }

    pub fn custom_data(&self, tile: usize) -> &[String] {
        self.custom_data.get(&tile).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tiles tagged with an enum value
    pub fn tagged_tiles(&self, enum_value: &str) -> &[usize] {
        self.enum_tags
            .get(enum_value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Definition for TilesetDef {
    const KIND: RefKind = RefKind::Tileset;

    fn uid(&self) -> i64 {
        self.uid
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub id: String,
    pub color: Color,
    pub tile: Option<TileTexture>,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub uid: i64,
    pub identifier: String,
    pub values: Vec<EnumValue>,
    /// Set when the enum comes from an external file
    pub external_path: Option<String>,
    pub tags: Vec<String>,
}

impl EnumDef {
    pub fn value(&self, id: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.id == id)
    }

    pub fn value_ids(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.id.as_str())
    }

    pub fn is_external(&self) -> bool {
        self.external_path.is_some()
    }
}

impl Definition for EnumDef {
    const KIND: RefKind = RefKind::Enum;

    fn uid(&self) -> i64 {
        self.uid
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Entity template
#[derive(Debug, Clone)]
pub struct EntityDef {
    pub uid: i64,
    pub identifier: String,
    pub color: Color,
    pub width: i32,
    pub height: i32,
    /// Top, right, bottom, left
    pub nine_slice_borders: Option<[i32; 4]>,
    /// Fractions of width/height, both in `[0, 1]`
    pub pivot: (f64, f64),
    pub tileset_uid: Option<i64>,
    pub tile: Option<TileTexture>,
    pub tile_render_mode: String,
    pub ui_tile: Option<TileTexture>,
    pub tags: Vec<String>,
}

impl Definition for EntityDef {
    const KIND: RefKind = RefKind::EntityDef;

    fn uid(&self) -> i64 {
        self.uid
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Tileset records that survived the reserved-name filter
#[derive(Debug, Default)]
pub(crate) struct TilesetRecords {
    pub kept: Vec<(String, RawTileset)>,
    pub skipped: HashSet<i64>,
}

impl TilesetRecords {
    pub fn decode(defs: &RawDefs, options: &LoadOptions) -> Result<Self, DecodeError> {
        let mut records = TilesetRecords::default();
        for (i, json) in defs.tilesets.iter().enumerate() {
            let path = format!("defs.tilesets[{i}]");
            let raw: RawTileset = decode_record(json, &path)?;
            if options.skips_tileset(&raw.identifier) {
                warn!("Skipping reserved tileset '{}' (uid {})", raw.identifier, raw.uid);
                records.skipped.insert(raw.uid);
                continue;
            }
            records.kept.push((path, raw));
        }
        Ok(records)
    }

    /// Reject tilesets using features this decoder does not handle
    pub fn check_supported(&self) -> Result<(), DecodeError> {
        for (_, raw) in &self.kept {
            if raw.embed_atlas.is_some() {
                return Err(DecodeError::unsupported(Unsupported::EmbeddedAtlas));
            }
            if raw.padding > 0 {
                return Err(DecodeError::unsupported(Unsupported::TilesetPadding));
            }
        }
        Ok(())
    }
}

/// The definition catalog
#[derive(Debug, Default)]
pub struct Definitions {
    pub tilesets: DefMap<TilesetDef>,
    /// Inline and external enums merged, external last
    pub enums: DefMap<EnumDef>,
    pub entities: DefMap<EntityDef>,
    skipped_tilesets: HashSet<i64>,
}

impl Definitions {
    pub(crate) fn decode(
        base_dir: &Path,
        defs: &RawDefs,
        tilesets: TilesetRecords,
        provider: &dyn ImageProvider,
    ) -> Result<Self, DecodeError> {
        let mut catalog = Definitions {
            skipped_tilesets: tilesets.skipped,
            ..Default::default()
        };

        for (path, raw) in tilesets.kept {
            let tileset = decode_tileset(base_dir, raw, &path, provider)?;
            catalog.tilesets.insert(tileset);
        }

        let enum_lists = [("enums", &defs.enums), ("externalEnums", &defs.external_enums)];
        for (key, list) in enum_lists {
            for (i, json) in list.iter().enumerate() {
                let path = format!("defs.{key}[{i}]");
                let raw: RawEnum = decode_record(json, &path)?;
                let def = catalog.decode_enum(raw, &path)?;
                catalog.enums.insert(def);
            }
        }

        for (i, json) in defs.entities.iter().enumerate() {
            let path = format!("defs.entities[{i}]");
            let raw: RawEntityDef = decode_record(json, &path)?;
            let def = catalog.decode_entity_def(raw, &path)?;
            catalog.entities.insert(def);
        }

        debug!(
            "Decoded {} tilesets, {} enums, {} entity definitions",
            catalog.tilesets.len(),
            catalog.enums.len(),
            catalog.entities.len()
        );
        Ok(catalog)
    }

    /// Whether `uid` belongs to a tileset skipped by name
    pub fn is_skipped_tileset(&self, uid: i64) -> bool {
        self.skipped_tilesets.contains(&uid)
    }

    /// Resolve the tile rectangle found at `path` against the decoded tilesets.
    ///
    /// Rectangles into skipped tilesets resolve to nothing.
    fn resolve_rect(
        &self,
        rect: Option<&Json>,
        path: &str,
    ) -> Result<Option<TileTexture>, DecodeError> {
        let Some(rect) = decode_optional::<RawTileRect>(rect, path)? else {
            return Ok(None);
        };
        if let Some(tileset) = self.tilesets.find(rect.tileset_uid) {
            return Ok(tileset.get_texture(Rect::new(rect.x, rect.y, rect.w, rect.h)));
        }
        if self.is_skipped_tileset(rect.tileset_uid) {
            warn!("{path}: tile rectangle points at skipped tileset {}", rect.tileset_uid);
            return Ok(None);
        }
        Err(DecodeError::unresolved(RefKind::Tileset, rect.tileset_uid))
    }

    fn decode_enum(&self, raw: RawEnum, path: &str) -> Result<EnumDef, DecodeError> {
        let raw_values: Vec<RawEnumValue> = decode_list(&raw.values, &format!("{path}.values"))?;
        let mut values = Vec::with_capacity(raw_values.len());
        for (i, value) in raw_values.into_iter().enumerate() {
            let tile_path = format!("{path}.values[{i}].tileRect");
            let tile = self.resolve_rect(value.tile_rect.as_ref(), &tile_path)?;
            values.push(EnumValue {
                id: value.id,
                color: Color::from_packed_rgb(value.color),
                tile,
            });
        }
        Ok(EnumDef {
            uid: raw.uid,
            identifier: raw.identifier,
            values,
            external_path: raw.external_rel_path,
            tags: raw.tags,
        })
    }

    fn decode_entity_def(&self, raw: RawEntityDef, path: &str) -> Result<EntityDef, DecodeError> {
        let color = Color::from_hex(&raw.color).ok_or_else(|| {
            DecodeError::malformed(format!("{path}.color"), format!("bad color '{}'", raw.color))
        })?;

        let nine_slice_borders = match raw.nine_slice_borders.as_slice() {
            [] => None,
            &[top, right, bottom, left] => Some([top, right, bottom, left]),
            other => {
                return Err(DecodeError::malformed(
                    format!("{path}.nineSliceBorders"),
                    format!("expected 0 or 4 values, got {}", other.len()),
                ))
            }
        };

        let pivot_range = 0.0..=1.0;
        if !pivot_range.contains(&raw.pivot_x) || !pivot_range.contains(&raw.pivot_y) {
            return Err(DecodeError::malformed(
                format!("{path}.pivotX"),
                format!("pivot ({}, {}) is outside [0, 1]", raw.pivot_x, raw.pivot_y),
            ));
        }

        let tile = self.resolve_rect(raw.tile_rect.as_ref(), &format!("{path}.tileRect"))?;
        let ui_path = format!("{path}.uiTileRect");
        let ui_tile = self.resolve_rect(raw.ui_tile_rect.as_ref(), &ui_path)?;

        Ok(EntityDef {
            tile,
            ui_tile,
            uid: raw.uid,
            identifier: raw.identifier,
            color,
            width: raw.width,
            height: raw.height,
            nine_slice_borders,
            pivot: (raw.pivot_x, raw.pivot_y),
            tileset_uid: raw.tileset_id,
            tile_render_mode: raw.tile_render_mode,
            tags: raw.tags,
        })
    }
}

fn decode_tileset(
    base_dir: &Path,
    raw: RawTileset,
    path: &str,
    provider: &dyn ImageProvider,
) -> Result<TilesetDef, DecodeError> {
    let grid = TileGrid {
        tile_size: raw.tile_grid_size,
        columns: raw.c_wid,
        rows: raw.c_hei,
        spacing: raw.spacing,
    };
    if grid.extent().is_none() {
        return Err(DecodeError::malformed(
            path,
            format!(
                "tile grid {}x{} of {}px (spacing {}) is too large",
                grid.columns, grid.rows, grid.tile_size, grid.spacing
            ),
        ));
    }

    let custom_records: Vec<RawCustomData> =
        decode_list(&raw.custom_data, &format!("{path}.customData"))?;
    let tag_records: Vec<RawEnumTag> = decode_list(&raw.enum_tags, &format!("{path}.enumTags"))?;

    let (image_path, image, tiles) = match &raw.rel_path {
        Some(rel_path) => {
            let image_path = base_dir.join(rel_path);
            let image = provider.load(&ImageRequest {
                path: &image_path,
                declared_size: raw.px_wid.zip(raw.px_hei),
            })?;
            let tiles = provider.slice_grid(&image, &grid);
            (Some(image_path), Some(image), tiles)
        }
        None => {
            warn!("{path}: tileset '{}' has no image", raw.identifier);
            (None, None, Vec::new())
        }
    };

    let mut custom_data: HashMap<usize, Vec<String>> = HashMap::new();
    for data in custom_records {
        custom_data.entry(data.tile_id).or_default().push(data.data);
    }

    let enum_tags = tag_records
        .into_iter()
        .map(|tag| (tag.enum_value_id, tag.tile_ids))
        .collect();

    Ok(TilesetDef {
        uid: raw.uid,
        identifier: raw.identifier,
        path: image_path,
        grid,
        image,
        tiles,
        custom_data,
        enum_tags,
        tags: raw.tags,
        tags_source_enum_uid: raw.tags_source_enum_uid,
    })
}
