//! Layer instances (int grid, entities, tiles, auto-layer)

use crate::coords::{LevelSpace, Point};
use crate::defs::{Definitions, TilesetDef};
use crate::entity::EntityInstance;
use crate::error::{DecodeError, RefKind};
use crate::image::TileTexture;
use crate::raw::{decode_record, RawLayer};
use crate::tile::{decode_tiles, TileInstance};
use log::debug;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// The type of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum LayerType {
    IntGrid,
    Entities,
    Tiles,
    AutoLayer,
}

/// Content specific to each layer type
#[derive(Debug, Clone)]
pub enum LayerData {
    /// Row-major cell values, `0` is empty
    IntGrid { values: Vec<i32> },
    Entities {
        entities: Vec<EntityInstance>,
        by_iid: HashMap<Uuid, usize>,
        by_identifier: HashMap<String, Vec<usize>>,
    },
    Tiles,
    AutoLayer,
}

/// A tile ready to draw, derived from a [`TileInstance`]
#[derive(Debug, Clone, PartialEq)]
pub struct TileSprite {
    /// Center of the tile including the layer offset
    pub center: Point,
    pub size: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Final opacity: tile alpha times layer opacity
    pub alpha: f32,
    pub texture: TileTexture,
}

/// A layer of a level
#[derive(Debug, Clone)]
pub struct Layer {
    pub iid: Uuid,
    pub identifier: String,
    pub layer_def_uid: i64,
    pub level_id: i64,
    pub layer_type: LayerType,
    /// Grid width and height in cells
    pub c_wid: u32,
    pub c_hei: u32,
    pub grid_size: u32,
    pub opacity: f32,
    pub visible: bool,
    /// Instance offset, Y flipped
    pub px_offset: (i32, i32),
    /// Instance plus definition offset, Y flipped
    pub px_total_offset: (i32, i32),
    pub override_tileset_uid: Option<i64>,
    pub tileset: Option<Arc<TilesetDef>>,
    /// Rule-generated tiles in paint order, `None` without a tileset
    pub auto_layer_tiles: Option<Vec<TileInstance>>,
    /// Hand-placed tiles in paint order, `None` without a tileset
    pub grid_tiles: Option<Vec<TileInstance>>,
    pub data: LayerData,
    sprites: OnceLock<Vec<TileSprite>>,
}

impl Layer {
    pub(crate) fn decode(
        json: &Json,
        defs: &Definitions,
        space: &LevelSpace,
        path: &str,
    ) -> Result<Self, DecodeError> {
        let raw: RawLayer = decode_record(json, path)?;

        let tileset = raw
            .override_tileset_uid
            .or(raw.tileset_def_uid)
            .map(|uid| defs.tilesets.get(uid).map(Arc::clone))
            .transpose()?;

        let (auto_layer_tiles, grid_tiles) = match &tileset {
            Some(tileset) => (
                Some(decode_tiles(
                    &raw.auto_layer_tiles,
                    tileset,
                    space,
                    &format!("{path}.autoLayerTiles"),
                )?),
                Some(decode_tiles(
                    &raw.grid_tiles,
                    tileset,
                    space,
                    &format!("{path}.gridTiles"),
                )?),
            ),
            None => (None, None),
        };

        let data = match raw.layer_type {
            LayerType::IntGrid => {
                let expected = raw.c_wid as usize * raw.c_hei as usize;
                if raw.int_grid_csv.len() != expected {
                    return Err(DecodeError::malformed(
                        format!("{path}.intGridCsv"),
                        format!("expected {expected} cells, got {}", raw.int_grid_csv.len()),
                    ));
                }
                LayerData::IntGrid {
                    values: raw.int_grid_csv,
                }
            }
            LayerType::Entities => {
                let entities = raw
                    .entity_instances
                    .iter()
                    .enumerate()
                    .map(|(i, e)| {
                        let entity_path = format!("{path}.entityInstances[{i}]");
                        EntityInstance::decode(e, defs, space, raw.grid_size, &entity_path)
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                let by_iid: HashMap<Uuid, usize> =
                    entities.iter().enumerate().map(|(i, e)| (e.iid, i)).collect();
                let mut by_identifier: HashMap<String, Vec<usize>> = HashMap::new();
                for (i, entity) in entities.iter().enumerate() {
                    by_identifier
                        .entry(entity.identifier.clone())
                        .or_default()
                        .push(i);
                }
                LayerData::Entities {
                    entities,
                    by_iid,
                    by_identifier,
                }
            }
            LayerType::Tiles => LayerData::Tiles,
            LayerType::AutoLayer => LayerData::AutoLayer,
        };

        let flip = |y: i32, key: &str| {
            y.checked_neg().ok_or_else(|| {
                DecodeError::malformed(format!("{path}.{key}"), format!("offset {y} out of range"))
            })
        };
        let px_offset = (raw.px_offset_x, flip(raw.px_offset_y, "pxOffsetY")?);
        let px_total_offset = (
            raw.px_total_offset_x,
            flip(raw.px_total_offset_y, "__pxTotalOffsetY")?,
        );

        debug!(
            "Decoded {:?} layer '{}' ({} auto tiles, {} grid tiles)",
            raw.layer_type,
            raw.identifier,
            auto_layer_tiles.as_ref().map_or(0, Vec::len),
            grid_tiles.as_ref().map_or(0, Vec::len)
        );

        Ok(Layer {
            iid: raw.iid,
            identifier: raw.identifier,
            layer_def_uid: raw.layer_def_uid,
            level_id: raw.level_id,
            layer_type: raw.layer_type,
            c_wid: raw.c_wid,
            c_hei: raw.c_hei,
            grid_size: raw.grid_size,
            opacity: raw.opacity,
            visible: raw.visible,
            px_offset,
            px_total_offset,
            override_tileset_uid: raw.override_tileset_uid,
            tileset,
            auto_layer_tiles,
            grid_tiles,
            data,
            sprites: OnceLock::new(),
        })
    }

    /// True if a tileset is bound, even when both tile lists are empty
    pub fn has_tiles(&self) -> bool {
        self.auto_layer_tiles.is_some() || self.grid_tiles.is_some()
    }

    /// All tiles in paint order: auto-layer tiles, then grid tiles
    pub fn tiles(&self) -> impl Iterator<Item = &TileInstance> {
        self.auto_layer_tiles
            .iter()
            .flatten()
            .chain(self.grid_tiles.iter().flatten())
    }

    pub fn entities(&self) -> &[EntityInstance] {
        match &self.data {
            LayerData::Entities { entities, .. } => entities,
            _ => &[],
        }
    }

    pub fn entity(&self, iid: &Uuid) -> Option<&EntityInstance> {
        match &self.data {
            LayerData::Entities {
                entities, by_iid, ..
            } => by_iid.get(iid).map(|&i| &entities[i]),
            _ => None,
        }
    }

    /// Look up an entity, failing with [`DecodeError::UnresolvedReference`]
    pub fn get_entity(&self, iid: &Uuid) -> Result<&EntityInstance, DecodeError> {
        self.entity(iid)
            .ok_or_else(|| DecodeError::unresolved(RefKind::Entity, iid))
    }

    /// Entities of one definition, in document order
    pub fn entities_by_identifier(&self, identifier: &str) -> Vec<&EntityInstance> {
        match &self.data {
            LayerData::Entities {
                entities,
                by_identifier,
                ..
            } => by_identifier
                .get(identifier)
                .map(|indices| indices.iter().map(|&i| &entities[i]).collect())
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Int grid value at cell `(cx, cy)`, `None` outside the grid or on other layer types
    pub fn int_grid_value(&self, cx: u32, cy: u32) -> Option<i32> {
        match &self.data {
            LayerData::IntGrid { values } if cx < self.c_wid && cy < self.c_hei => {
                values
                    .get(cy as usize * self.c_wid as usize + cx as usize)
                    .copied()
            }
            _ => None,
        }
    }

    /// Drawable tiles, built on first use and cached.
    ///
    /// `None` when the layer has no tile content.
    pub fn sprites(&self) -> Option<&[TileSprite]> {
        if !self.has_tiles() {
            return None;
        }
        Some(self.sprites.get_or_init(|| self.build_sprites()).as_slice())
    }

    /// Drop the cached sprites; the next [`Layer::sprites`] call rebuilds them
    pub fn regenerate_sprites(&mut self) {
        self.sprites = OnceLock::new();
    }

    fn build_sprites(&self) -> Vec<TileSprite> {
        let size = f64::from(self.grid_size);
        let half = size / 2.0;
        let (offset_x, offset_y) = self.px_total_offset;
        self.tiles()
            .map(|tile| TileSprite {
                // Positions are top-left corners in a Y-up frame
                center: (
                    tile.position.0 + half + f64::from(offset_x),
                    tile.position.1 - half + f64::from(offset_y),
                ),
                size,
                flip_x: tile.flip_x,
                flip_y: tile.flip_y,
                alpha: tile.alpha * self.opacity,
                texture: tile.texture.clone(),
            })
            .collect()
    }
}
