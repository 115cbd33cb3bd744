//! Entity instances placed in entity layers

use crate::coords::{LevelSpace, Point};
use crate::defs::{Definitions, EntityDef};
use crate::error::DecodeError;
use crate::field::{decode_fields, FieldInstance, FieldMap};
use crate::raw::{decode_record, RawEntity};
use serde_json::Value as Json;
use std::sync::Arc;
use uuid::Uuid;

/// An entity placed in a level
#[derive(Debug, Clone)]
pub struct EntityInstance {
    pub iid: Uuid,
    /// Identifier of the entity definition
    pub identifier: String,
    /// Grid cell, unflipped
    pub grid: (i32, i32),
    pub def: Arc<EntityDef>,
    pub tags: Vec<String>,
    /// World position, only present in GridVania and Free layouts
    pub world: Option<(i32, i32)>,
    /// Converted pixel position
    pub px: Point,
    pub width: i32,
    pub height: i32,
    pub fields: FieldMap,
}

impl EntityInstance {
    pub(crate) fn decode(
        json: &Json,
        defs: &Definitions,
        space: &LevelSpace,
        grid_size: u32,
        path: &str,
    ) -> Result<Self, DecodeError> {
        let raw: RawEntity = decode_record(json, path)?;
        let def = Arc::clone(defs.entities.get(raw.def_uid)?);

        let world = match (raw.world_x, raw.world_y) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        };

        let cell = f64::from(grid_size);
        let convert = |cx: f64, cy: f64| space.convert_cell(cx, cy, cell);
        let owner = format!("entity {} ({})", raw.identifier, raw.iid);
        let fields = decode_fields(&raw.field_instances, &owner, &convert, path)?;

        Ok(EntityInstance {
            iid: raw.iid,
            identifier: raw.identifier,
            grid: (raw.grid[0], raw.grid[1]),
            def,
            tags: raw.tags,
            world,
            px: space.convert(f64::from(raw.px[0]), f64::from(raw.px[1])),
            width: raw.width,
            height: raw.height,
            fields,
        })
    }

    pub fn def_uid(&self) -> i64 {
        self.def.uid
    }

    pub fn field(&self, identifier: &str) -> Option<&FieldInstance> {
        self.fields.get(identifier)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Center of the entity's bounding box, using the definition pivot
    pub fn center(&self) -> Point {
        let (pivot_x, pivot_y) = self.def.pivot;
        let (x, y) = self.px;
        // Y is flipped, so the pivot fraction runs downward from the anchor
        (
            x + (0.5 - pivot_x) * f64::from(self.width),
            y - (0.5 - pivot_y) * f64::from(self.height),
        )
    }
}
