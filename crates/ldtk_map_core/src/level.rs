//! Levels: geometry, background, fields and layers

use crate::color::Color;
use crate::coords::{LevelSpace, Point};
use crate::defs::Definitions;
use crate::error::{DecodeError, RefKind};
use crate::field::{decode_fields, FieldInstance, FieldMap};
use crate::image::{ImageHandle, ImageProvider, ImageRequest};
use crate::layer::{Layer, TileSprite};
use crate::options::LoadOptions;
use crate::raw::{decode_optional, RawBgPos, RawLevel};
use log::debug;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Shared inputs for decoding every level of a project
pub(crate) struct LevelContext<'a> {
    pub base_dir: &'a Path,
    pub defs: &'a Arc<Definitions>,
    pub options: &'a LoadOptions,
    pub provider: &'a dyn ImageProvider,
    /// Cell size for level-wide `Point` fields
    pub default_grid_size: u32,
}

/// Where the background image is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundPlacement {
    /// x, y, width, height of the visible part of the image
    pub crop_rect: [f64; 4],
    pub scale: (f64, f64),
    /// Converted position of the image's top-left corner
    pub top_left: Point,
}

/// Drawable tile layers of a level, in document order
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    pub layers: Vec<SceneLayer<'a>>,
}

/// One drawable layer. Layer opacity is already folded into each sprite's alpha.
#[derive(Debug, Clone)]
pub struct SceneLayer<'a> {
    pub identifier: &'a str,
    pub iid: Uuid,
    pub visible: bool,
    /// Tiles in paint order, back to front
    pub sprites: &'a [TileSprite],
}

#[derive(Debug, Clone)]
pub struct Level {
    pub uid: i64,
    pub iid: Uuid,
    pub identifier: String,
    pub width: i32,
    pub height: i32,
    pub world_x: i32,
    pub world_y: i32,
    pub world_depth: i32,
    pub bg_color: Color,
    pub bg_image: Option<ImageHandle>,
    pub bg_pos: Option<BackgroundPlacement>,
    pub fields: FieldMap,
    pub layers: Vec<Layer>,
    layers_by_iid: HashMap<Uuid, usize>,
    layers_by_identifier: HashMap<String, usize>,
    space: LevelSpace,
    defs: Arc<Definitions>,
}

impl Level {
    pub(crate) fn decode(
        raw: RawLevel,
        path: &str,
        ctx: &LevelContext<'_>,
    ) -> Result<Self, DecodeError> {
        // Everything below is converted through this space
        let space = LevelSpace::new(
            f64::from(raw.px_wid),
            f64::from(raw.px_hei),
            f64::from(raw.world_x),
            f64::from(raw.world_y),
        );

        let bg_color = Color::from_hex(&raw.bg_color).ok_or_else(|| {
            DecodeError::malformed(
                format!("{path}.__bgColor"),
                format!("bad color '{}'", raw.bg_color),
            )
        })?;

        let bg_pos = decode_optional::<RawBgPos>(raw.bg_pos.as_ref(), &format!("{path}.__bgPos"))?;
        let bg_pos = bg_pos.map(|pos| BackgroundPlacement {
            crop_rect: pos.crop_rect,
            scale: (pos.scale[0], pos.scale[1]),
            top_left: space.convert(f64::from(pos.top_left_px[0]), f64::from(pos.top_left_px[1])),
        });

        let bg_image = match &raw.bg_rel_path {
            Some(rel_path) if ctx.options.load_backgrounds => {
                let image_path = ctx.base_dir.join(rel_path);
                Some(ctx.provider.load(&ImageRequest {
                    path: &image_path,
                    declared_size: None,
                })?)
            }
            _ => None,
        };

        let cell = f64::from(ctx.default_grid_size);
        let convert = |cx: f64, cy: f64| space.convert_cell(cx, cy, cell);
        let owner = format!("level {} ({})", raw.identifier, raw.iid);
        let fields = decode_fields(&raw.field_instances, &owner, &convert, path)?;

        let layers = raw
            .layer_instances
            .as_deref()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, json)| {
                Layer::decode(json, ctx.defs, &space, &format!("{path}.layerInstances[{i}]"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let layers_by_iid = layers.iter().enumerate().map(|(i, l)| (l.iid, i)).collect();
        let layers_by_identifier = layers
            .iter()
            .enumerate()
            .map(|(i, l)| (l.identifier.clone(), i))
            .collect();

        debug!(
            "Decoded level '{}' ({}x{}, {} layers)",
            raw.identifier,
            raw.px_wid,
            raw.px_hei,
            layers.len()
        );

        Ok(Level {
            uid: raw.uid,
            iid: raw.iid,
            identifier: raw.identifier,
            width: raw.px_wid,
            height: raw.px_hei,
            world_x: raw.world_x,
            world_y: raw.world_y,
            world_depth: raw.world_depth,
            bg_color,
            bg_image,
            bg_pos,
            fields,
            layers,
            layers_by_iid,
            layers_by_identifier,
            space,
            defs: Arc::clone(ctx.defs),
        })
    }

    /// The project's definition catalog
    pub fn defs(&self) -> &Definitions {
        &self.defs
    }

    pub fn space(&self) -> &LevelSpace {
        &self.space
    }

    pub fn layer(&self, iid: &Uuid) -> Option<&Layer> {
        self.layers_by_iid.get(iid).map(|&i| &self.layers[i])
    }

    /// Look up a layer, failing with [`DecodeError::UnresolvedReference`]
    pub fn get_layer(&self, iid: &Uuid) -> Result<&Layer, DecodeError> {
        self.layer(iid)
            .ok_or_else(|| DecodeError::unresolved(RefKind::Layer, iid))
    }

    pub fn layer_by_identifier(&self, identifier: &str) -> Option<&Layer> {
        self.layers_by_identifier
            .get(identifier)
            .map(|&i| &self.layers[i])
    }

    pub fn field(&self, identifier: &str) -> Option<&FieldInstance> {
        self.fields.get(identifier)
    }

    /// Flip a point between document and Y-up conventions
    pub fn convert_coord(&self, x: f64, y: f64) -> Point {
        self.space.convert(x, y)
    }

    pub fn to_world_coord(&self, x: f64, y: f64) -> Point {
        self.space.to_world(x, y)
    }

    pub fn from_world_coord(&self, x: f64, y: f64) -> Point {
        self.space.from_world(x, y)
    }

    pub fn contains_coord(&self, x: f64, y: f64) -> bool {
        self.space.contains(x, y)
    }

    pub fn contains_world_coord(&self, x: f64, y: f64) -> bool {
        self.space.contains_world(x, y)
    }

    /// Sprite lists of every tile-bearing layer, in document order
    pub fn make_scene(&self) -> Scene<'_> {
        let layers = self
            .layers
            .iter()
            .filter_map(|layer| {
                layer.sprites().map(|sprites| SceneLayer {
                    identifier: &layer.identifier,
                    iid: layer.iid,
                    visible: layer.visible,
                    sprites,
                })
            })
            .collect();
        Scene { layers }
    }

    /// Drop every layer's sprite cache
    pub fn regenerate_scene(&mut self) {
        for layer in &mut self.layers {
            layer.regenerate_sprites();
        }
    }
}
