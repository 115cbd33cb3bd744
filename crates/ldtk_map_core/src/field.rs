//! Typed field values
//!
//! Each field instance carries a declared type name. Only a handful of types
//! need conversion; everything else passes through as a [`Value`].

use crate::color::Color;
use crate::coords::Point;
use crate::error::DecodeError;
use crate::raw::{decode_record, RawField, RawGridPoint};
use crate::value::Value;
use serde::Deserialize;
use serde_json::Value as Json;
use std::collections::HashMap;
use uuid::Uuid;

/// Reference to an entity anywhere in the project.
///
/// Stored unresolved; resolve it with `Project::get_entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_iid: Uuid,
    pub layer_iid: Uuid,
    pub level_iid: Uuid,
    pub world_iid: Uuid,
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Color(Color),
    /// Converted pixel position
    Point(Point),
    PointArray(Vec<Point>),
    EntityRef(EntityRef),
    /// Any other declared type, unconverted
    Raw(Value),
}

impl FieldValue {
    pub fn as_color(&self) -> Option<Color> {
        match self {
            FieldValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            FieldValue::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_points(&self) -> Option<&[Point]> {
        match self {
            FieldValue::PointArray(points) => Some(points),
            _ => None,
        }
    }

    pub fn as_entity_ref(&self) -> Option<&EntityRef> {
        match self {
            FieldValue::EntityRef(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            FieldValue::Raw(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInstance {
    pub identifier: String,
    /// Declared type name, e.g. `Int`, `Point`, `Array<Point>`, `LocalEnum.Item`
    pub field_type: String,
    /// `None` when the document holds no value
    pub value: Option<FieldValue>,
}

impl FieldInstance {
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub fn as_int(&self) -> Option<i64> {
        self.value.as_ref()?.as_raw()?.as_int()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.value.as_ref()?.as_raw()?.as_float()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_ref()?.as_raw()?.as_bool()
    }

    pub fn as_string(&self) -> Option<&str> {
        self.value.as_ref()?.as_raw()?.as_string()
    }

    pub fn as_entity_ref(&self) -> Option<&EntityRef> {
        self.value.as_ref()?.as_entity_ref()
    }
}

/// Fields of one level or entity, keyed by identifier
pub type FieldMap = HashMap<String, FieldInstance>;

/// Decode one field value of `field_type`.
///
/// `convert` maps a `(cx, cy)` grid cell to a level pixel position; it is the
/// only context the decoder sees.
pub fn decode_value(
    field_type: &str,
    value: Option<&Json>,
    convert: &dyn Fn(f64, f64) -> Point,
    path: &str,
) -> Result<Option<FieldValue>, DecodeError> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    let decoded = match field_type {
        "Color" => {
            let hex = value
                .as_str()
                .ok_or_else(|| DecodeError::malformed(path, "color is not a string"))?;
            let color = Color::from_hex(hex)
                .ok_or_else(|| DecodeError::malformed(path, format!("bad color '{hex}'")))?;
            FieldValue::Color(color)
        }
        "Point" => {
            let cell: RawGridPoint = decode_record(value, path)?;
            FieldValue::Point(convert(cell.cx, cell.cy))
        }
        "Array<Point>" => {
            let cells: Vec<RawGridPoint> = decode_record(value, path)?;
            FieldValue::PointArray(cells.iter().map(|c| convert(c.cx, c.cy)).collect())
        }
        "EntityRef" => FieldValue::EntityRef(decode_record(value, path)?),
        _ => FieldValue::Raw(decode_record(value, path)?),
    };
    Ok(Some(decoded))
}

/// Decode a `fieldInstances` list.
///
/// `owner` names the level or entity in duplicate-identifier errors.
pub(crate) fn decode_fields(
    fields: &[Json],
    owner: &str,
    convert: &dyn Fn(f64, f64) -> Point,
    path: &str,
) -> Result<FieldMap, DecodeError> {
    let mut map = FieldMap::with_capacity(fields.len());
    for (i, json) in fields.iter().enumerate() {
        let field_path = format!("{path}.fieldInstances[{i}]");
        let raw: RawField = decode_record(json, &field_path)?;
        if map.contains_key(&raw.identifier) {
            return Err(DecodeError::DuplicateFieldIdentifier {
                owner: owner.to_string(),
                id: raw.identifier,
            });
        }
        let value = decode_value(
            &raw.field_type,
            raw.value.as_ref(),
            convert,
            &format!("{field_path}.__value"),
        )?;
        map.insert(
            raw.identifier.clone(),
            FieldInstance {
                identifier: raw.identifier,
                field_type: raw.field_type,
                value,
            },
        );
    }
    Ok(map)
}
